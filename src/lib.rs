//! SSH MCP Server
//!
//! This library provides an MCP (Model Context Protocol) server that lets an
//! agent run commands on one remote host over SSH. Requests arrive as
//! line-delimited JSON-RPC 2.0 on stdin; each request carrying an `id` gets
//! exactly one response line on stdout, in order.
//!
//! # Architecture
//!
//! - **Main thread**: runs the session worker loop
//!   ([`worker::run_session_loop`]), which owns the [`SessionManager`] and
//!   therefore the single remote session.
//!
//! - **Background thread**: runs a tokio runtime with [`McpServer`], which
//!   reads a line, dispatches it, awaits the worker's reply and writes the
//!   response before reading the next line.
//!
//! - **SessionWorker**: cloneable handle for sending requests to the worker.
//!
//! # Tools
//!
//! - `connect_ssh`: connect using the startup configuration (reconnects if already connected)
//! - `execute_command`: run a shell command and return its output
//! - `disconnect_ssh`: close the session; always succeeds
//!
//! # Errors
//!
//! Malformed `tools/call` params and unknown methods or tools are JSON-RPC
//! errors (`-32602`, `-32601`). Everything that goes wrong on the SSH side is
//! a successful response whose result has `isError: true`.

pub mod config;
pub mod error;
pub mod protocol;
pub mod server;
pub mod session;
pub mod tool_registry;
pub mod worker;

pub use config::{SshArgs, SshConfig};
pub use error::ToolError;
pub use server::McpServer;
pub use session::{
    ExecOutput, RemoteSession, SessionError, SessionInfo, SessionManager, Ssh2Transport, Transport,
};
pub use tool_registry::{ToolInfo, ToolName, TOOL_REGISTRY};
pub use worker::{run_session_loop, SessionRequest, SessionWorker};
