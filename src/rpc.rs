// JSON-RPC 2.0 types and error helpers for the MCP endpoint.
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum JsonRpcRequest {
    WithParams(JsonRpcRequestWithParams),
    WithoutParams(JsonRpcRequestWithoutParams),
    Notification(JsonRpcNotification),
}

#[derive(Deserialize, Debug)]
pub struct JsonRpcRequestWithParams {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
    pub params: Value,
}

#[derive(Deserialize, Debug)]
pub struct JsonRpcRequestWithoutParams {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub id: Value,
    pub method: String,
}

#[derive(Deserialize, Debug)]
pub struct JsonRpcNotification {
    #[allow(dead_code)]
    pub jsonrpc: String,
    pub method: String,
    #[allow(dead_code)]
    pub params: Option<Value>,
}

#[derive(Deserialize, Debug)]
pub struct InitializeParams {
    #[serde(rename = "protocolVersion")]
    #[allow(dead_code)]
    pub protocol_version: String,
    #[allow(dead_code)]
    pub capabilities: Value,
    #[serde(rename = "clientInfo")]
    #[allow(dead_code)]
    pub client_info: Value,
}

#[derive(Deserialize, Debug)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Serialize, Debug)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    pub result: Value,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            id,
            result,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct JsonRpcErrorResponse {
    pub jsonrpc: String,
    pub id: Value,
    pub error: ErrorObject,
}

#[derive(Serialize, Debug)]
pub struct ErrorObject {
    pub code: i32,
    pub message: String,
}

impl JsonRpcErrorResponse {
    pub fn new(id: Value, code: i32, message: String) -> Self {
        JsonRpcErrorResponse {
            jsonrpc: "2.0".to_string(),
            id,
            error: ErrorObject { code, message },
        }
    }
}
