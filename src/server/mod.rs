//! MCP server: line-delimited JSON-RPC over stdin/stdout.
//!
//! One request is read, fully handled, and answered before the next line is
//! read. Unparseable lines and notifications (no `id`) produce no output.

mod requests;

pub use requests::*;

use crate::error::ToolError;
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeResult, ListToolsResult, Method, Request, Response,
    RpcError,
};
use crate::session::ExecOutput;
use crate::tool_registry::{self, ToolName};
use crate::worker::SessionWorker;
use serde::Serialize;
use serde_json::{Map, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, instrument, warn};

/// MCP server for remote command execution over SSH
#[derive(Clone)]
pub struct McpServer {
    worker: SessionWorker,
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, RpcError> {
    serde_json::to_value(value).map_err(|e| {
        warn!(error = %e, "Failed to serialize result");
        RpcError::internal_error()
    })
}

/// Text for a successful command: stdout, plus stderr when there is any.
fn format_output(output: &ExecOutput) -> String {
    let mut text = format!("Output:\n{}", output.stdout);
    if !output.stderr.is_empty() {
        text.push_str("\nStderr:\n");
        text.push_str(&output.stderr);
    }
    text
}

impl McpServer {
    pub fn new(worker: SessionWorker) -> Self {
        info!("Creating SSH MCP server");
        Self { worker }
    }

    /// Answer requests from `reader` on `writer` until end of input.
    ///
    /// Each response is written as one line and flushed immediately. Only
    /// I/O errors on the streams end the loop early.
    pub async fn serve<R, W>(&self, mut reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line).await? == 0 {
                break;
            }
            let Some(response) = self.handle_line(&line).await else {
                continue;
            };
            let mut out = serde_json::to_vec(&response)?;
            out.push(b'\n');
            writer.write_all(&out).await?;
            writer.flush().await?;
        }
        info!("Input closed");
        Ok(())
    }

    /// Handle one raw input line. `None` means nothing is written back.
    pub async fn handle_line(&self, line: &[u8]) -> Option<Response> {
        match Request::parse(line) {
            Some(req) => self.handle_request(req).await,
            None => {
                debug!(len = line.len(), "Skipping unparseable line");
                None
            }
        }
    }

    /// Handle a parsed request. Requests without an id are not answered.
    pub async fn handle_request(&self, req: Request) -> Option<Response> {
        let Some(id) = req.id else {
            debug!(method = %req.method, "Ignoring notification");
            return None;
        };
        let outcome = match req.method.parse::<Method>() {
            Ok(method) => self.dispatch(method, req.params).await,
            Err(e) => {
                debug!(id, method = %req.method, "Unknown method");
                Err(e)
            }
        };
        Some(Response::from_outcome(id, outcome))
    }

    async fn dispatch(&self, method: Method, params: Option<Value>) -> Result<Value, RpcError> {
        match method {
            Method::Initialize => to_json(&InitializeResult::current()),
            Method::ToolsList => to_json(&ListToolsResult {
                tools: tool_registry::descriptors(),
            }),
            Method::ToolsCall => {
                let result = self.call_tool(params).await?;
                to_json(&result)
            }
        }
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<CallToolResult, RpcError> {
        let params = CallToolParams::from_params(params)?;
        let Ok(tool) = params.name.parse::<ToolName>() else {
            debug!(name = %params.name, "Unknown tool");
            return Err(RpcError::method_not_found());
        };
        debug!(tool = %tool, "Tool call");
        Ok(match tool {
            ToolName::ConnectSsh => self.connect_ssh().await,
            ToolName::ExecuteCommand => self.execute_command(&params.arguments).await,
            ToolName::DisconnectSsh => self.disconnect_ssh().await,
        })
    }

    #[instrument(skip(self))]
    async fn connect_ssh(&self) -> CallToolResult {
        match self.worker.connect().await {
            Ok(info) => CallToolResult::success(format!("Connected to SSH server {info}")),
            Err(e) => e.to_tool_result(),
        }
    }

    #[instrument(skip(self, arguments))]
    async fn execute_command(&self, arguments: &Map<String, Value>) -> CallToolResult {
        let req = match ExecuteCommandRequest::from_arguments(arguments) {
            Ok(req) => req,
            Err(e) => return e.to_tool_result(),
        };
        match self.worker.run(&req.command).await {
            Ok(output) => CallToolResult::success(format_output(&output)),
            Err(e) => e.to_tool_result(),
        }
    }

    #[instrument(skip(self))]
    async fn disconnect_ssh(&self) -> CallToolResult {
        match self.worker.close().await {
            Ok(_) => CallToolResult::success("Disconnected from SSH server"),
            Err(e @ ToolError::Timeout(_)) | Err(e @ ToolError::Busy) => e.to_tool_result(),
            Err(e) => {
                // Worker gone: nothing left to close.
                warn!(error = %e, "Disconnect with no session worker");
                CallToolResult::success("Disconnected from SSH server")
            }
        }
    }
}
