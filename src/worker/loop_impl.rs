//! Session worker loop.

use crate::session::SessionManager;
use crate::worker::request::SessionRequest;
use std::sync::mpsc;
use tracing::{debug, info, warn};

/// Log result with debug on success and warn on error.
macro_rules! log_result {
    ($result:expr, $ok_msg:literal, $err_msg:literal) => {
        match &$result {
            Ok(_) => debug!($ok_msg),
            Err(e) => warn!(error = %e, $err_msg),
        }
    };
}

/// Run the session worker loop on the current thread.
///
/// Blocks until `Shutdown` is received or every sender is dropped. The
/// manager is dropped on exit, which releases any open session.
pub fn run_session_loop(rx: mpsc::Receiver<SessionRequest>, mut manager: SessionManager) {
    while let Ok(req) = rx.recv() {
        match req {
            SessionRequest::Connect { resp } => {
                let result = manager.connect();
                match &result {
                    Ok(info) => info!(session = %info, "SSH session established"),
                    Err(e) => warn!(error = %e, "SSH connect failed"),
                }
                let _ = resp.send(result);
            }
            SessionRequest::Run { command, resp } => {
                debug!(command = %command, "Running remote command");
                let result = manager.run(&command);
                log_result!(result, "Remote command completed", "Remote command failed");
                let _ = resp.send(result);
            }
            SessionRequest::Close { resp } => {
                let closed = manager.close();
                if !closed {
                    debug!("Close requested with no open session");
                }
                let _ = resp.send(closed);
            }
            SessionRequest::Shutdown => {
                info!("Session worker shutting down");
                break;
            }
        }
    }
    manager.close();
    info!("Session worker loop finished");
}
