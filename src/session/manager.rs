//! Session manager owning at most one remote session.

use super::transport::{RemoteSession, Transport};
use super::types::{ExecOutput, SessionInfo};
use crate::config::SshConfig;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Error type for session management operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("SSH_HOST and SSH_USER required")]
    MissingConfig,
    #[error("failed to read private key {path}: {reason}")]
    KeyUnreadable { path: String, reason: String },
    #[error("authentication failed: {0}")]
    AuthFailure(String),
    #[error("{0}")]
    NetworkFailure(String),
    #[error("not connected")]
    NotConnected,
    #[error("{detail}")]
    CommandFailed {
        detail: String,
        stdout: String,
        stderr: String,
    },
    #[error("{0}")]
    Transport(String),
}

/// Active session plus its metadata.
struct ActiveSession {
    info: SessionInfo,
    handle: Box<dyn RemoteSession>,
}

/// Owns zero or one remote session and runs commands against it.
pub struct SessionManager {
    config: SshConfig,
    transport: Box<dyn Transport>,
    active: Option<ActiveSession>,
}

impl SessionManager {
    /// Create a manager with no session.
    pub fn new(config: SshConfig, transport: Box<dyn Transport>) -> Self {
        Self {
            config,
            transport,
            active: None,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.active.is_some()
    }

    /// Connect using the configured target.
    ///
    /// An existing session is released before the new one is dialed, so a
    /// failed reconnect leaves the manager disconnected.
    pub fn connect(&mut self) -> Result<SessionInfo, SessionError> {
        if !self.config.is_complete() {
            return Err(SessionError::MissingConfig);
        }
        if self.close() {
            debug!("Released previous session before reconnecting");
        }

        info!(
            host = %self.config.host,
            port = self.config.port,
            user = %self.config.username,
            "Connecting to SSH server"
        );
        let handle = self.transport.connect(&self.config)?;
        let info = SessionInfo {
            host: self.config.host.clone(),
            port: self.config.port,
            username: self.config.username.clone(),
            connected_at: Utc::now(),
        };
        self.active = Some(ActiveSession {
            info: info.clone(),
            handle,
        });
        Ok(info)
    }

    /// Run a command on the live session.
    ///
    /// A non-zero exit becomes [`SessionError::CommandFailed`] carrying the
    /// captured output. Channel failures come back without output.
    pub fn run(&mut self, command: &str) -> Result<ExecOutput, SessionError> {
        let active = self.active.as_mut().ok_or(SessionError::NotConnected)?;
        let output = active.handle.exec(command)?;
        if output.success() {
            Ok(output)
        } else {
            warn!(
                exit_status = output.exit_status,
                exit_signal = ?output.exit_signal,
                "Remote command failed"
            );
            Err(SessionError::CommandFailed {
                detail: output.failure_detail(),
                stdout: output.stdout,
                stderr: output.stderr,
            })
        }
    }

    /// Release the session if present. Returns whether one was released.
    pub fn close(&mut self) -> bool {
        match self.active.take() {
            Some(mut active) => {
                info!(
                    session = %active.info,
                    age_secs = active.info.age_secs(),
                    "Closing SSH session"
                );
                active.handle.close();
                true
            }
            None => false,
        }
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::fake::{FakeBehavior, FakeTransport};

    fn config() -> SshConfig {
        SshConfig {
            host: "test.invalid".to_string(),
            port: 22,
            username: "tester".to_string(),
            password: Some("secret".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_connect_requires_host_and_user() {
        let fake = FakeTransport::new();
        let mut manager = SessionManager::new(SshConfig::default(), Box::new(fake.clone()));
        assert_eq!(manager.connect(), Err(SessionError::MissingConfig));
        assert_eq!(fake.connect_attempts(), 0);

        let mut no_user = config();
        no_user.username.clear();
        let mut manager = SessionManager::new(no_user, Box::new(fake.clone()));
        assert_eq!(manager.connect(), Err(SessionError::MissingConfig));
    }

    #[test]
    fn test_run_without_connect() {
        let mut manager = SessionManager::new(config(), Box::new(FakeTransport::default()));
        assert_eq!(manager.run("uptime"), Err(SessionError::NotConnected));
    }

    #[test]
    fn test_connect_run_close() {
        let fake = FakeTransport::new();
        let mut manager = SessionManager::new(config(), Box::new(fake.clone()));
        let info = manager.connect().expect("connect should succeed");
        assert_eq!(info.to_string(), "tester@test.invalid:22");
        assert!(manager.is_connected());

        let out = manager.run("echo hi").expect("run should succeed");
        assert_eq!(out.stdout, "hi\n");
        // Sessions are reusable across commands.
        manager.run("echo again").expect("second run should succeed");
        assert_eq!(fake.executed(), vec!["echo hi", "echo again"]);

        assert!(manager.close());
        assert!(!manager.is_connected());
        assert_eq!(fake.live_sessions(), 0);
    }

    #[test]
    fn test_reconnect_releases_previous_session() {
        let fake = FakeTransport::new();
        let mut manager = SessionManager::new(config(), Box::new(fake.clone()));
        manager.connect().expect("first connect");
        manager.connect().expect("second connect");
        assert_eq!(fake.live_sessions(), 1);
        assert_eq!(fake.connect_attempts(), 2);
    }

    #[test]
    fn test_failed_reconnect_leaves_disconnected() {
        let fake = FakeTransport::new();
        let mut manager = SessionManager::new(config(), Box::new(fake.clone()));
        manager.connect().expect("first connect");
        fake.set_behavior(FakeBehavior::RejectAuth);
        assert!(matches!(
            manager.connect(),
            Err(SessionError::AuthFailure(_))
        ));
        assert!(!manager.is_connected());
        assert_eq!(fake.live_sessions(), 0);
    }

    #[test]
    fn test_nonzero_exit_carries_output() {
        let fake = FakeTransport::new();
        let mut manager = SessionManager::new(config(), Box::new(fake.clone()));
        manager.connect().expect("connect");
        let err = manager.run("grep nothing /etc/hosts").unwrap_err();
        match err {
            SessionError::CommandFailed {
                detail,
                stdout,
                stderr,
            } => {
                assert_eq!(detail, "Process exited with status 1");
                assert_eq!(stdout, "");
                assert_eq!(stderr, "no match\n");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // The session survives a failed command.
        assert!(manager.is_connected());
    }

    #[test]
    fn test_transport_failure_during_run() {
        let fake = FakeTransport::new();
        let mut manager = SessionManager::new(config(), Box::new(fake.clone()));
        manager.connect().expect("connect");
        fake.set_behavior(FakeBehavior::DropChannel);
        assert!(matches!(
            manager.run("ls"),
            Err(SessionError::Transport(_))
        ));
    }

    #[test]
    fn test_close_is_idempotent() {
        let fake = FakeTransport::new();
        let mut manager = SessionManager::new(config(), Box::new(fake.clone()));
        assert!(!manager.close());
        manager.connect().expect("connect");
        assert!(manager.close());
        assert!(!manager.close());
        assert_eq!(fake.live_sessions(), 0);
    }

    #[test]
    fn test_drop_releases_session() {
        let fake = FakeTransport::new();
        {
            let mut manager = SessionManager::new(config(), Box::new(fake.clone()));
            manager.connect().expect("connect");
            assert_eq!(fake.live_sessions(), 1);
        }
        assert_eq!(fake.live_sessions(), 0);
    }
}
