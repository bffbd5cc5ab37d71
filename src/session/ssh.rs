//! `ssh2`-backed transport.

use super::manager::SessionError;
use super::transport::{RemoteSession, Transport};
use super::types::ExecOutput;
use crate::config::SshConfig;
use ssh2::{DisconnectCode, ExtendedData, Session};
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, warn};

/// Dials real SSH servers. Host keys are not verified.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ssh2Transport;

impl Ssh2Transport {
    pub fn new() -> Self {
        Self
    }
}

fn network_error(err: impl std::fmt::Display) -> SessionError {
    SessionError::NetworkFailure(err.to_string())
}

fn open_tcp(config: &SshConfig) -> Result<TcpStream, SessionError> {
    let address = config.address();
    let Some(timeout) = config.connect_timeout else {
        return TcpStream::connect(&address).map_err(network_error);
    };

    let mut last_err = None;
    for addr in address.to_socket_addrs().map_err(network_error)? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(tcp) => {
                // Bound the handshake as well; cleared once authenticated.
                set_io_timeouts(&tcp, Some(timeout));
                return Ok(tcp);
            }
            Err(e) => {
                debug!(addr = %addr, error = %e, "TCP connect attempt failed");
                last_err = Some(e);
            }
        }
    }
    Err(match last_err {
        Some(e) => network_error(e),
        None => SessionError::NetworkFailure(format!("no addresses resolved for {address}")),
    })
}

fn set_io_timeouts(tcp: &TcpStream, timeout: Option<Duration>) {
    if let Err(e) = tcp.set_read_timeout(timeout) {
        warn!(error = %e, ?timeout, "Failed to set socket read timeout");
    }
    if let Err(e) = tcp.set_write_timeout(timeout) {
        warn!(error = %e, ?timeout, "Failed to set socket write timeout");
    }
}

/// Check the key file before handing it to libssh2, whose error for a
/// missing file is unhelpful.
fn check_key_file(path: &Path) -> Result<(), SessionError> {
    std::fs::File::open(path)
        .map(|_| ())
        .map_err(|e| SessionError::KeyUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
}

fn authenticate(session: &Session, config: &SshConfig) -> Result<(), SessionError> {
    if config.password.is_none() && config.private_key_path.is_none() {
        return Err(SessionError::AuthFailure(
            "no password or private key configured".to_string(),
        ));
    }

    let mut last_err: Option<ssh2::Error> = None;
    if let Some(password) = config.password.as_deref() {
        if let Err(e) = session.userauth_password(&config.username, password) {
            debug!(error = %e, "Password authentication rejected");
            last_err = Some(e);
        }
    }
    if !session.authenticated() {
        if let Some(key_path) = config.private_key_path.as_deref() {
            check_key_file(key_path)?;
            if let Err(e) = session.userauth_pubkey_file(&config.username, None, key_path, None) {
                debug!(error = %e, "Public key authentication rejected");
                last_err = Some(e);
            }
        }
    }

    if session.authenticated() {
        Ok(())
    } else {
        Err(SessionError::AuthFailure(
            last_err
                .map(|e| e.to_string())
                .unwrap_or_else(|| "server did not accept any offered method".to_string()),
        ))
    }
}

impl Transport for Ssh2Transport {
    fn connect(&self, config: &SshConfig) -> Result<Box<dyn RemoteSession>, SessionError> {
        let tcp = open_tcp(config)?;
        let mut session = Session::new().map_err(network_error)?;
        session.set_tcp_stream(tcp.try_clone().map_err(network_error)?);
        session.handshake().map_err(network_error)?;

        authenticate(&session, config)?;

        // Remote commands may legitimately run longer than the connect timeout.
        if config.connect_timeout.is_some() {
            set_io_timeouts(&tcp, None);
        }

        Ok(Box::new(Ssh2Session { session }))
    }
}

struct Ssh2Session {
    session: Session,
}

fn transport_error(err: impl std::fmt::Display) -> SessionError {
    SessionError::Transport(err.to_string())
}

impl RemoteSession for Ssh2Session {
    fn exec(&mut self, command: &str) -> Result<ExecOutput, SessionError> {
        let mut channel = self.session.channel_session().map_err(transport_error)?;
        channel
            .handle_extended_data(ExtendedData::Merge)
            .map_err(transport_error)?;
        channel.exec(command).map_err(transport_error)?;

        let mut raw = Vec::new();
        channel.read_to_end(&mut raw).map_err(transport_error)?;
        channel.wait_close().map_err(transport_error)?;

        let exit_status = channel.exit_status().map_err(transport_error)?;
        let exit_signal = channel
            .exit_signal()
            .ok()
            .and_then(|signal| signal.exit_signal);

        Ok(ExecOutput {
            stdout: String::from_utf8_lossy(&raw).into_owned(),
            stderr: String::new(),
            exit_status,
            exit_signal,
        })
    }

    fn close(&mut self) {
        if let Err(e) = self
            .session
            .disconnect(Some(DisconnectCode::ByApplication), "closing", None)
        {
            warn!(error = %e, "SSH disconnect failed");
        }
    }
}
