//! Error types for the SSH MCP server.
//!
//! Tool execution errors are returned with `isError: true` in a CallToolResult,
//! while protocol errors (unknown method or tool, malformed params) become
//! JSON-RPC error objects (see [`crate::protocol::RpcError`]).

use crate::protocol::CallToolResult;
use crate::session::SessionError;
use std::time::Duration;
use thiserror::Error;

/// Tool execution errors - returned with isError: true in CallToolResult
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Connection failed: {0}")]
    ConnectFailed(SessionError),

    #[error("Command failed: {detail}\nOutput: {stdout}\nError: {stderr}")]
    CommandFailed {
        detail: String,
        stdout: String,
        stderr: String,
    },

    #[error("Command failed: {0}")]
    ExecFailed(SessionError),

    #[error("command parameter required")]
    MissingCommand,

    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("Session worker is busy with a previous request")]
    Busy,

    #[error("Session worker closed")]
    WorkerClosed,
}

impl ToolError {
    /// Error from a `run` request, keeping command output when there is some.
    pub fn from_run(err: SessionError) -> Self {
        match err {
            SessionError::CommandFailed {
                detail,
                stdout,
                stderr,
            } => ToolError::CommandFailed {
                detail,
                stdout,
                stderr,
            },
            other => ToolError::ExecFailed(other),
        }
    }

    /// Convert to MCP CallToolResult with isError: true
    pub fn to_tool_result(&self) -> CallToolResult {
        CallToolResult::error(self.to_string())
    }
}

impl From<tokio::sync::oneshot::error::RecvError> for ToolError {
    fn from(_: tokio::sync::oneshot::error::RecvError) -> Self {
        ToolError::WorkerClosed
    }
}
