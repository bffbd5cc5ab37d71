//! Request types for the session worker.

use crate::session::{ExecOutput, SessionError, SessionInfo};
use tokio::sync::oneshot;

/// Request types for the session worker
pub enum SessionRequest {
    Connect {
        resp: oneshot::Sender<Result<SessionInfo, SessionError>>,
    },
    Run {
        command: String,
        resp: oneshot::Sender<Result<ExecOutput, SessionError>>,
    },
    /// Replies with whether a session was released.
    Close {
        resp: oneshot::Sender<bool>,
    },
    Shutdown,
}
