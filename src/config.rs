//! Process-wide SSH configuration.
//!
//! Values come from command-line flags with environment fallbacks and are read
//! once at startup. Host and user are validated when a connection is attempted,
//! not here, so the server can still answer `initialize` and `tools/list`
//! without them.

use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Default SSH port.
pub const DEFAULT_PORT: u16 = 22;

/// SSH connection arguments (flags or environment). Global, so they are
/// accepted before or after a subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct SshArgs {
    /// Remote host address
    #[arg(long, global = true, env = "SSH_HOST")]
    pub host: Option<String>,
    /// Remote login user
    #[arg(long, global = true, env = "SSH_USER")]
    pub user: Option<String>,
    /// Password for password authentication
    #[arg(long, global = true, env = "SSH_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    /// Path to a private key file (read at connect time)
    #[arg(long, global = true, env = "SSH_PRIVATE_KEY_PATH")]
    pub private_key: Option<PathBuf>,
    /// Remote TCP port
    #[arg(long, global = true, env = "SSH_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,
    /// TCP connect and handshake timeout in seconds (0 disables)
    #[arg(long, global = true, env = "SSH_CONNECT_TIMEOUT", default_value_t = 0)]
    pub connect_timeout_secs: u64,
    /// Timeout in seconds for each tool call reply (0 disables)
    #[arg(long, global = true, env = "SSH_COMMAND_TIMEOUT", default_value_t = 0)]
    pub command_timeout_secs: u64,
}

/// Resolved connection settings handed to the session manager.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SshConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Option<String>,
    pub private_key_path: Option<PathBuf>,
    pub connect_timeout: Option<Duration>,
}

impl SshConfig {
    /// Both host and username are present.
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && !self.username.trim().is_empty()
    }

    /// `host:port` for dialing.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// Hand-written so the password never reaches a log line.
impl std::fmt::Debug for SshConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("private_key_path", &self.private_key_path)
            .field("connect_timeout", &self.connect_timeout)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn secs(value: u64) -> Option<Duration> {
    (value > 0).then_some(Duration::from_secs(value))
}

impl SshArgs {
    /// Build the connection config. Empty values count as absent.
    pub fn to_config(&self) -> SshConfig {
        SshConfig {
            host: non_empty(self.host.clone()).unwrap_or_default(),
            port: self.port,
            username: non_empty(self.user.clone()).unwrap_or_default(),
            password: non_empty(self.password.clone()),
            private_key_path: self
                .private_key
                .clone()
                .filter(|p| !p.as_os_str().is_empty()),
            connect_timeout: secs(self.connect_timeout_secs),
        }
    }

    /// Per-request reply timeout for the session worker.
    pub fn command_timeout(&self) -> Option<Duration> {
        secs(self.command_timeout_secs)
    }
}
