//! Session and command output types.

use chrono::{DateTime, Utc};

/// Information about the live remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Remote host the session is connected to.
    pub host: String,
    /// Remote TCP port.
    pub port: u16,
    /// Authenticated user.
    pub username: String,
    /// When the session was established.
    pub connected_at: DateTime<Utc>,
}

impl SessionInfo {
    /// Seconds since the session was established.
    pub fn age_secs(&self) -> i64 {
        (Utc::now() - self.connected_at).num_seconds()
    }
}

impl std::fmt::Display for SessionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}:{}", self.username, self.host, self.port)
    }
}

/// Raw result of one command on an execution channel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_status: i32,
    /// Signal name when the remote process was killed by a signal.
    pub exit_signal: Option<String>,
}

impl ExecOutput {
    pub fn success(&self) -> bool {
        self.exit_status == 0 && self.exit_signal.is_none()
    }

    /// Human-readable reason for a failed command.
    pub fn failure_detail(&self) -> String {
        match &self.exit_signal {
            Some(signal) => format!("Process exited with signal {signal}"),
            None => format!("Process exited with status {}", self.exit_status),
        }
    }
}
