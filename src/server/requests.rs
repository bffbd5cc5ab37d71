//! Tool argument types.

use crate::error::ToolError;
use serde_json::{Map, Value};

/// Arguments of `execute_command`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteCommandRequest {
    /// Shell command to run on the remote host
    pub command: String,
}

impl ExecuteCommandRequest {
    /// `command` must be a string; anything else counts as missing.
    pub fn from_arguments(arguments: &Map<String, Value>) -> Result<Self, ToolError> {
        match arguments.get("command") {
            Some(Value::String(command)) => Ok(Self {
                command: command.clone(),
            }),
            _ => Err(ToolError::MissingCommand),
        }
    }
}
