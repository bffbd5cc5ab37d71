//! Remote session lifecycle.
//!
//! [`SessionManager`] owns zero or one live session (none → connected → none)
//! and knows nothing about JSON-RPC. The network side sits behind the
//! [`Transport`] / [`RemoteSession`] traits; [`Ssh2Transport`] is the real one.
//!
//! ```text
//! SessionManager
//! ├─ config: SshConfig            (read once at startup)
//! ├─ transport: Box<dyn Transport>
//! └─ active: Option<ActiveSession>
//!        └─ handle: Box<dyn RemoteSession>   one exec channel per command
//! ```

#[cfg(test)]
pub(crate) mod fake;
mod manager;
mod ssh;
mod transport;
mod types;

pub use manager::{SessionError, SessionManager};
pub use ssh::Ssh2Transport;
pub use transport::{RemoteSession, Transport};
pub use types::{ExecOutput, SessionInfo};
