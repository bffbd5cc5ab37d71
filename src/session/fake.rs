//! In-process transport for tests.
//!
//! Commands understood by the fake session:
//! - `echo <text>`: prints `<text>\n`, exit 0
//! - `grep ...`: prints `no match\n` on stderr, exit 1
//! - `exit <n>`: exits with status `n`
//! - anything else: empty output, exit 0

use super::manager::SessionError;
use super::transport::{RemoteSession, Transport};
use super::types::ExecOutput;
use crate::config::SshConfig;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeBehavior {
    Accept,
    RejectAuth,
    Unreachable,
    DropChannel,
}

#[derive(Debug)]
struct FakeState {
    behavior: FakeBehavior,
    exec_delay: Option<Duration>,
    live_sessions: usize,
    connect_attempts: usize,
    executed: Vec<String>,
}

#[derive(Clone)]
pub struct FakeTransport {
    state: Arc<Mutex<FakeState>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState {
                behavior: FakeBehavior::Accept,
                exec_delay: None,
                live_sessions: 0,
                connect_attempts: 0,
                executed: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_behavior(&self, behavior: FakeBehavior) {
        self.lock().behavior = behavior;
    }

    /// Make every `exec` block for `delay` before answering.
    pub fn set_exec_delay(&self, delay: Duration) {
        self.lock().exec_delay = Some(delay);
    }

    pub fn live_sessions(&self) -> usize {
        self.lock().live_sessions
    }

    pub fn connect_attempts(&self) -> usize {
        self.lock().connect_attempts
    }

    pub fn executed(&self) -> Vec<String> {
        self.lock().executed.clone()
    }
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for FakeTransport {
    fn connect(&self, config: &SshConfig) -> Result<Box<dyn RemoteSession>, SessionError> {
        let mut state = self.lock();
        state.connect_attempts += 1;
        match state.behavior {
            FakeBehavior::RejectAuth => Err(SessionError::AuthFailure(format!(
                "server rejected credentials for {}",
                config.username
            ))),
            FakeBehavior::Unreachable => Err(SessionError::NetworkFailure(format!(
                "connection refused: {}",
                config.address()
            ))),
            FakeBehavior::Accept | FakeBehavior::DropChannel => {
                state.live_sessions += 1;
                Ok(Box::new(FakeSession {
                    state: self.state.clone(),
                    open: true,
                }))
            }
        }
    }
}

struct FakeSession {
    state: Arc<Mutex<FakeState>>,
    open: bool,
}

impl FakeSession {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl RemoteSession for FakeSession {
    fn exec(&mut self, command: &str) -> Result<ExecOutput, SessionError> {
        let delay = {
            let mut state = self.lock();
            if state.behavior == FakeBehavior::DropChannel {
                return Err(SessionError::Transport(
                    "channel closed by remote".to_string(),
                ));
            }
            state.executed.push(command.to_string());
            state.exec_delay
        };
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }

        let mut out = ExecOutput::default();
        if let Some(text) = command.strip_prefix("echo ") {
            out.stdout = format!("{text}\n");
        } else if command.starts_with("grep ") {
            out.stderr = "no match\n".to_string();
            out.exit_status = 1;
        } else if let Some(code) = command.strip_prefix("exit ") {
            out.exit_status = code.trim().parse().unwrap_or(255);
        }
        Ok(out)
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.lock().live_sessions -= 1;
        }
    }
}

impl Drop for FakeSession {
    fn drop(&mut self) {
        self.close();
    }
}
