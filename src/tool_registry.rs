//! Tool registry: the fixed catalog returned by `tools/list`.

use crate::protocol::ToolDescriptor;
use serde_json::{json, Map, Value};
use std::str::FromStr;

/// Tools this server exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolName {
    ConnectSsh,
    ExecuteCommand,
    DisconnectSsh,
}

impl ToolName {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConnectSsh => "connect_ssh",
            Self::ExecuteCommand => "execute_command",
            Self::DisconnectSsh => "disconnect_ssh",
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = ();

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "connect_ssh" => Ok(Self::ConnectSsh),
            "execute_command" => Ok(Self::ExecuteCommand),
            "disconnect_ssh" => Ok(Self::DisconnectSsh),
            _ => Err(()),
        }
    }
}

/// One declared tool argument.
#[derive(Debug, Clone)]
pub struct ToolArg {
    pub name: &'static str,
    /// JSON Schema type name.
    pub kind: &'static str,
    pub description: &'static str,
    pub required: bool,
}

/// Metadata for a single tool
#[derive(Debug, Clone)]
pub struct ToolInfo {
    pub name: ToolName,
    /// Short description - used in tools/list
    pub short_desc: &'static str,
    /// Full description with usage details - used in generated docs
    pub full_desc: &'static str,
    /// Example invocation (JSON arguments)
    pub example: &'static str,
    pub args: &'static [ToolArg],
}

/// Static registry of all tools, in `tools/list` order.
pub static TOOL_REGISTRY: &[ToolInfo] = &[
    ToolInfo {
        name: ToolName::ConnectSsh,
        short_desc: "Connect to SSH server",
        full_desc: "Open an SSH session to the server configured at startup \
                    (SSH_HOST, SSH_PORT, SSH_USER). Password authentication is tried first when \
                    SSH_PASSWORD is set, then the key at SSH_PRIVATE_KEY_PATH. Arguments are ignored. \
                    Calling it while connected closes the current session and opens a new one.",
        example: r#"{}"#,
        args: &[],
    },
    ToolInfo {
        name: ToolName::ExecuteCommand,
        short_desc: "Execute command on remote server",
        full_desc: "Run a shell command over the current SSH session and return its combined \
                    stdout/stderr. Requires a prior connect_ssh. A non-zero exit status is reported \
                    as a tool error that includes the exit detail and any output produced.",
        example: r#"{"command": "uname -a"}"#,
        args: &[ToolArg {
            name: "command",
            kind: "string",
            description: "Shell command to run on the remote host",
            required: true,
        }],
    },
    ToolInfo {
        name: ToolName::DisconnectSsh,
        short_desc: "Disconnect from SSH server",
        full_desc: "Close the current SSH session. Succeeds even when no session is open.",
        example: r#"{}"#,
        args: &[],
    },
];

impl ToolInfo {
    /// JSON Schema object describing the tool's arguments.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for arg in self.args {
            properties.insert(
                arg.name.to_string(),
                json!({ "type": arg.kind, "description": arg.description }),
            );
        }
        let mut schema = json!({ "type": "object", "properties": properties });
        let required: Vec<&str> = self
            .args
            .iter()
            .filter(|a| a.required)
            .map(|a| a.name)
            .collect();
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    pub fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name.as_str().to_string(),
            description: self.short_desc.to_string(),
            input_schema: self.input_schema(),
        }
    }
}

/// Get all tools
pub fn all_tools() -> impl Iterator<Item = &'static ToolInfo> {
    TOOL_REGISTRY.iter()
}

/// Get tool info by name
pub fn get_tool(name: &str) -> Option<&'static ToolInfo> {
    let name = name.parse::<ToolName>().ok()?;
    TOOL_REGISTRY.iter().find(|t| t.name == name)
}

/// Descriptors for `tools/list`.
pub fn descriptors() -> Vec<ToolDescriptor> {
    all_tools().map(ToolInfo::descriptor).collect()
}
