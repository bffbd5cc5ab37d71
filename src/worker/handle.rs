//! Session worker handle for async requests.

use crate::error::ToolError;
use crate::session::{ExecOutput, SessionInfo};
use crate::worker::request::SessionRequest;
use std::sync::mpsc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;

/// Maximum time to retry enqueuing close/shutdown requests when the queue is full.
const CONTROL_SEND_TIMEOUT_SECS: u64 = 5;
/// Backoff between control enqueue retries (milliseconds).
const CONTROL_SEND_BACKOFF_MS: u64 = 25;

/// Handle for sending requests to the session worker loop
#[derive(Clone)]
pub struct SessionWorker {
    tx: mpsc::SyncSender<SessionRequest>,
    timeout: Option<Duration>,
}

impl SessionWorker {
    /// Create a handle. `timeout` bounds how long each reply is awaited;
    /// `None` waits indefinitely.
    pub fn new(tx: mpsc::SyncSender<SessionRequest>, timeout: Option<Duration>) -> Self {
        Self { tx, timeout }
    }

    fn try_send(&self, req: SessionRequest) -> Result<(), ToolError> {
        match self.tx.try_send(req) {
            Ok(()) => Ok(()),
            Err(mpsc::TrySendError::Full(_)) => Err(ToolError::Busy),
            Err(mpsc::TrySendError::Disconnected(_)) => Err(ToolError::WorkerClosed),
        }
    }

    async fn send_with_retry(&self, req: SessionRequest) -> Result<(), ToolError> {
        let start = Instant::now();
        let max_wait = Duration::from_secs(CONTROL_SEND_TIMEOUT_SECS);
        let mut pending = req;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return Ok(()),
                Err(mpsc::TrySendError::Full(req)) => {
                    if start.elapsed() >= max_wait {
                        return Err(ToolError::Busy);
                    }
                    pending = req;
                    tokio::time::sleep(Duration::from_millis(CONTROL_SEND_BACKOFF_MS)).await;
                }
                Err(mpsc::TrySendError::Disconnected(_)) => return Err(ToolError::WorkerClosed),
            }
        }
    }

    /// Await a reply, bounded by the configured timeout.
    async fn recv<T>(&self, rx: oneshot::Receiver<T>) -> Result<T, ToolError> {
        match self.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, rx).await {
                Ok(result) => Ok(result?),
                Err(_) => Err(ToolError::Timeout(timeout)),
            },
            None => Ok(rx.await?),
        }
    }

    /// Connect (or reconnect) using the configured target.
    pub async fn connect(&self) -> Result<SessionInfo, ToolError> {
        let (tx, rx) = oneshot::channel();
        self.try_send(SessionRequest::Connect { resp: tx })?;
        self.recv(rx).await?.map_err(ToolError::ConnectFailed)
    }

    /// Run a command on the current session.
    pub async fn run(&self, command: &str) -> Result<ExecOutput, ToolError> {
        let (tx, rx) = oneshot::channel();
        self.try_send(SessionRequest::Run {
            command: command.to_string(),
            resp: tx,
        })?;
        self.recv(rx).await?.map_err(ToolError::from_run)
    }

    /// Close the current session. Returns whether one was open.
    pub async fn close(&self) -> Result<bool, ToolError> {
        let (tx, rx) = oneshot::channel();
        self.send_with_retry(SessionRequest::Close { resp: tx }).await?;
        self.recv(rx).await
    }

    /// Stop the worker loop.
    pub async fn shutdown(&self) -> Result<(), ToolError> {
        self.send_with_retry(SessionRequest::Shutdown).await
    }
}
