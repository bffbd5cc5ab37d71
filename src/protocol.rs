//! JSON-RPC 2.0 envelopes and MCP payload types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

pub const JSONRPC_VERSION: &str = "2.0";
/// MCP protocol revision this server speaks.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
pub const SERVER_NAME: &str = "ssh-executor";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Incoming request envelope.
///
/// `id` is absent for notifications. Non-integer ids fail to parse, which the
/// server treats the same as any other unparseable line.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

impl Request {
    /// Parse one input line. Returns `None` for anything that is not a JSON
    /// object of the request shape.
    pub fn parse(line: &[u8]) -> Option<Self> {
        match serde_json::from_slice::<Value>(line).ok()? {
            obj @ Value::Object(_) => serde_json::from_value(obj).ok(),
            _ => None,
        }
    }
}

/// Outgoing response envelope. Exactly one of `result` / `error` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

impl Response {
    pub fn success(id: i64, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: i64, error: RpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    pub fn from_outcome(id: i64, outcome: Result<Value, RpcError>) -> Self {
        match outcome {
            Ok(result) => Self::success(id, result),
            Err(error) => Self::failure(id, error),
        }
    }
}

/// Protocol-level error object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcError {
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    pub fn method_not_found() -> Self {
        Self {
            code: Self::METHOD_NOT_FOUND,
            message: "Method not found".to_string(),
        }
    }

    pub fn invalid_params() -> Self {
        Self {
            code: Self::INVALID_PARAMS,
            message: "Invalid params".to_string(),
        }
    }

    pub fn internal_error() -> Self {
        Self {
            code: Self::INTERNAL_ERROR,
            message: "Internal error".to_string(),
        }
    }
}

/// Methods this server answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Initialize,
    ToolsList,
    ToolsCall,
}

impl FromStr for Method {
    type Err = RpcError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "initialize" => Ok(Self::Initialize),
            "tools/list" => Ok(Self::ToolsList),
            "tools/call" => Ok(Self::ToolsCall),
            _ => Err(RpcError::method_not_found()),
        }
    }
}

/// Validated `tools/call` params.
#[derive(Debug, Clone, PartialEq)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Map<String, Value>,
}

impl CallToolParams {
    /// `params` must be an object with a string `name`; `arguments`, when
    /// present and not null, must be an object.
    pub fn from_params(params: Option<Value>) -> Result<Self, RpcError> {
        let Some(Value::Object(mut params)) = params else {
            return Err(RpcError::invalid_params());
        };
        let name = match params.remove("name") {
            Some(Value::String(name)) => name,
            _ => return Err(RpcError::invalid_params()),
        };
        let arguments = match params.remove("arguments") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(arguments)) => arguments,
            Some(_) => return Err(RpcError::invalid_params()),
        };
        Ok(Self { name, arguments })
    }
}

/// A single content block in a tool result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text".to_string(),
            text: text.into(),
        }
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Domain-level payload of `tools/call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", default, skip_serializing_if = "is_false")]
    pub is_error: bool,
}

impl CallToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: true,
        }
    }
}

/// Tool entry as returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: Value,
    pub server_info: ServerInfo,
}

impl InitializeResult {
    /// Fixed capability descriptor: tools only.
    pub fn current() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: serde_json::json!({ "tools": {} }),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let req = Request::parse(br#"{"jsonrpc":"2.0","id":7,"method":"tools/list"}"#)
            .expect("should parse");
        assert_eq!(req.id, Some(7));
        assert_eq!(req.method, "tools/list");
        assert!(req.params.is_none());
    }

    #[test]
    fn test_parse_notification() {
        let req = Request::parse(br#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .expect("should parse");
        assert_eq!(req.id, None);
        let req = Request::parse(br#"{"jsonrpc":"2.0","id":null,"method":"x"}"#)
            .expect("should parse");
        assert_eq!(req.id, None);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Request::parse(b"not json").is_none());
        assert!(Request::parse(b"").is_none());
        assert!(Request::parse(br#"["2.0", 1, "tools/list"]"#).is_none());
        assert!(Request::parse(br#"{"id":"abc","method":"tools/list"}"#).is_none());
        assert!(Request::parse(br#"{"id":1.5,"method":"tools/list"}"#).is_none());
        assert!(Request::parse(b"{\"id\":1,\"method\":\"\xff\"}").is_none());
    }

    #[test]
    fn test_response_shape() {
        let ok = serde_json::to_value(Response::success(3, json!({"a": 1}))).unwrap();
        assert_eq!(ok, json!({"jsonrpc": "2.0", "id": 3, "result": {"a": 1}}));

        let err = serde_json::to_value(Response::failure(4, RpcError::method_not_found()))
            .unwrap();
        assert_eq!(
            err,
            json!({"jsonrpc": "2.0", "id": 4, "error": {"code": -32601, "message": "Method not found"}})
        );
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("initialize".parse::<Method>(), Ok(Method::Initialize));
        assert_eq!("tools/call".parse::<Method>(), Ok(Method::ToolsCall));
        assert_eq!(
            "resources/list".parse::<Method>().unwrap_err().code,
            RpcError::METHOD_NOT_FOUND
        );
    }

    #[test]
    fn test_call_tool_params() {
        let params = CallToolParams::from_params(Some(json!({
            "name": "execute_command",
            "arguments": {"command": "ls"}
        })))
        .expect("valid params");
        assert_eq!(params.name, "execute_command");
        assert_eq!(params.arguments.get("command"), Some(&json!("ls")));

        let bare = CallToolParams::from_params(Some(json!({"name": "connect_ssh"})))
            .expect("arguments are optional");
        assert!(bare.arguments.is_empty());

        for bad in [
            None,
            Some(json!([1, 2])),
            Some(json!("connect_ssh")),
            Some(json!({})),
            Some(json!({"name": 5})),
            Some(json!({"name": "execute_command", "arguments": "ls"})),
        ] {
            assert_eq!(
                CallToolParams::from_params(bad).unwrap_err().code,
                RpcError::INVALID_PARAMS
            );
        }
    }

    #[test]
    fn test_tool_result_is_error_omitted_when_false() {
        let ok = serde_json::to_value(CallToolResult::success("done")).unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "done"}]}));
        let err = serde_json::to_value(CallToolResult::error("boom")).unwrap();
        assert_eq!(err["isError"], json!(true));
    }

    #[test]
    fn test_initialize_shape() {
        let value = serde_json::to_value(InitializeResult::current()).unwrap();
        assert_eq!(value["protocolVersion"], json!(PROTOCOL_VERSION));
        assert_eq!(value["capabilities"], json!({"tools": {}}));
        assert_eq!(value["serverInfo"]["name"], json!("ssh-executor"));
        assert_eq!(value["serverInfo"]["version"], json!("1.0.0"));
    }
}
