//! Remote transport abstraction.
//!
//! The session manager only sees these traits, so tests can swap the `ssh2`
//! transport for an in-process fake.

use super::manager::SessionError;
use super::types::ExecOutput;
use crate::config::SshConfig;

/// Establishes authenticated remote sessions.
pub trait Transport: Send {
    /// Open and authenticate a new session.
    fn connect(&self, config: &SshConfig) -> Result<Box<dyn RemoteSession>, SessionError>;
}

/// An authenticated, reusable connection to one host.
pub trait RemoteSession: Send {
    /// Run `command` on a fresh execution channel and collect its output.
    ///
    /// A non-zero exit is not an error here; it is reported through
    /// [`ExecOutput::exit_status`]. Errors mean the channel itself failed.
    fn exec(&mut self, command: &str) -> Result<ExecOutput, SessionError>;

    /// Release the connection. Best-effort, never fails.
    fn close(&mut self);
}
