// Axum handlers: JSON-RPC method routing and the tool dispatcher.
use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::Response,
    Json,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::TimeError;
use crate::ops;
use crate::rpc::{
    InitializeParams, JsonRpcErrorResponse, JsonRpcNotification, JsonRpcRequest,
    JsonRpcRequestWithParams, JsonRpcRequestWithoutParams, JsonRpcResponse, ToolCallParams,
    INVALID_PARAMS, METHOD_NOT_FOUND, PARSE_ERROR,
};
use crate::tools::get_tools_description_json;
use crate::tzdb::ZoneDb;

pub const SERVER_NAME: &str = "mcp-timetools";
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Shared state handed to every request: the zone database is injected
/// once at startup.
pub struct AppState {
    pub zones: ZoneDb,
}

pub async fn mcp_handler(
    State(state): State<Arc<AppState>>,
    Json(request_value): Json<Value>,
) -> Response {
    let id = request_value.get("id").cloned().unwrap_or(Value::Null);
    let request: Result<JsonRpcRequest, _> = serde_json::from_value(request_value);
    match request {
        Ok(JsonRpcRequest::WithParams(req)) => handle_request_with_params(&state, req),
        Ok(JsonRpcRequest::WithoutParams(req)) => handle_request_without_params(req),
        Ok(JsonRpcRequest::Notification(req)) => handle_notification(&req),
        Err(_) => {
            let error = JsonRpcErrorResponse::new(id, PARSE_ERROR, "Parse error".to_string());
            json_response(&error)
        }
    }
}

fn handle_request_with_params(state: &AppState, req: JsonRpcRequestWithParams) -> Response {
    match req.method.as_str() {
        "initialize" => process_init(&req),
        "tools/list" => tools_list_response(req.id),
        "tools/call" => {
            let params: Result<ToolCallParams, _> = serde_json::from_value(req.params);
            match params {
                Ok(tool_params) => process_tool_call(state, req.id, tool_params),
                Err(_) => {
                    let error = JsonRpcErrorResponse::new(
                        req.id,
                        INVALID_PARAMS,
                        "Invalid params for tools/call".to_string(),
                    );
                    json_response(&error)
                }
            }
        }
        _ => {
            let error =
                JsonRpcErrorResponse::new(req.id, METHOD_NOT_FOUND, "Method not found".to_string());
            json_response(&error)
        }
    }
}

fn process_tool_call(state: &AppState, id: Value, params: ToolCallParams) -> Response {
    tracing::debug!(tool = %params.name, "dispatching tool call");
    match dispatch_tool(&state.zones, &params.name, params.arguments) {
        None => {
            let error = JsonRpcErrorResponse::new(
                id,
                METHOD_NOT_FOUND,
                format!("Unknown tool: {}", params.name),
            );
            json_response(&error)
        }
        Some(Ok(payload)) => json_response(&JsonRpcResponse::success(
            id,
            tool_content(payload.to_string(), false),
        )),
        Some(Err(e)) if e.is_invalid_argument() => {
            let error = JsonRpcErrorResponse::new(
                id,
                INVALID_PARAMS,
                format!("Invalid params for {}: {e}", params.name),
            );
            json_response(&error)
        }
        Some(Err(e)) => {
            tracing::debug!(tool = %params.name, error = %e, "tool call failed");
            json_response(&JsonRpcResponse::success(id, tool_content(e.to_string(), true)))
        }
    }
}

/// Routes a named tool invocation to its typed operation. `None` means the
/// tool name is not in the catalog.
pub fn dispatch_tool(
    zones: &ZoneDb,
    name: &str,
    arguments: Value,
) -> Option<Result<Value, TimeError>> {
    // Clients may omit `arguments` entirely for tools with no required params.
    let arguments = if arguments.is_null() { json!({}) } else { arguments };
    let result = match name {
        "get_current_time" => typed_args(arguments).and_then(|a| ops::get_current_time(zones, a)),
        "get_timezone_info" => typed_args(arguments).and_then(|a| ops::get_timezone_info(zones, a)),
        "list_timezones" => typed_args(arguments).and_then(|a| ops::list_timezones(zones, a)),
        "parse_datetime" => typed_args(arguments).and_then(ops::parse_datetime),
        "compare_times" => typed_args(arguments).and_then(ops::compare_times),
        "add_time_delta" => typed_args(arguments).and_then(ops::add_time_delta),
        "is_valid_datetime" => typed_args(arguments).and_then(ops::is_valid_datetime),
        "unix_to_datetime" => typed_args(arguments).and_then(|a| ops::unix_to_datetime(zones, a)),
        _ => return None,
    };
    Some(result)
}

fn typed_args<T: DeserializeOwned>(arguments: Value) -> Result<T, TimeError> {
    serde_json::from_value(arguments).map_err(|e| TimeError::InvalidArgument(e.to_string()))
}

fn tool_content(text: String, is_error: bool) -> Value {
    json!({
        "content": [
            {
                "type": "text",
                "text": text
            }
        ],
        "isError": is_error
    })
}

fn tools_list_response(id: Value) -> Response {
    json_response(&JsonRpcResponse::success(
        id,
        json!({ "tools": get_tools_description_json() }),
    ))
}

fn process_init(req: &JsonRpcRequestWithParams) -> Response {
    let params: Result<InitializeParams, _> = serde_json::from_value(req.params.clone());
    match params {
        Ok(_params) => json_response(&JsonRpcResponse::success(
            req.id.clone(),
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )),
        Err(e) => {
            let error = JsonRpcErrorResponse::new(
                req.id.clone(),
                INVALID_PARAMS,
                format!("Invalid params for initialize: {e}"),
            );
            json_response(&error)
        }
    }
}

fn handle_request_without_params(req: JsonRpcRequestWithoutParams) -> Response {
    if req.method.as_str() == "tools/list" {
        tools_list_response(req.id)
    } else {
        let error =
            JsonRpcErrorResponse::new(req.id, METHOD_NOT_FOUND, "Method not found".to_string());
        json_response(&error)
    }
}

fn handle_notification(_req: &JsonRpcNotification) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap_or_else(|_| Response::new(Body::from("{}")))
}

fn json_response<T: serde::Serialize>(value: &T) -> Response {
    match serde_json::to_string(value) {
        Ok(json_string) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json_string))
            .unwrap_or_else(|_| {
                Response::new(Body::from(r#"{"error":"failed to build response"}"#))
            }),
        Err(_) => Response::builder()
            .status(StatusCode::INTERNAL_SERVER_ERROR)
            .body(Body::from(r#"{"error":"failed to serialize response"}"#))
            .unwrap_or_else(|_| Response::new(Body::from(r#"{"error":"critical failure"}"#))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> Arc<AppState> {
        Arc::new(AppState {
            zones: ZoneDb::bundled(),
        })
    }

    async fn call(body: Value) -> Value {
        let response = mcp_handler(State(state()), Json(body)).await;
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn tool_call(name: &str, arguments: Value) -> Value {
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": { "name": name, "arguments": arguments }
        })
    }

    /// Tool results carry the payload as serialized JSON in a text block.
    fn result_text(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        serde_json::from_str(text).unwrap()
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let response = call(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": { "name": "test", "version": "0.0.0" }
            }
        }))
        .await;
        assert_eq!(response["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(response["result"]["serverInfo"]["name"], SERVER_NAME);
    }

    #[tokio::test]
    async fn tools_list_without_params() {
        let response = call(json!({
            "jsonrpc": "2.0",
            "id": 2,
            "method": "tools/list"
        }))
        .await;
        assert_eq!(response["result"]["tools"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn current_time_call_returns_payload() {
        let response = call(tool_call("get_current_time", json!({ "tz": "UTC" }))).await;
        assert_eq!(response["result"]["isError"], false);
        let payload = result_text(&response);
        assert_eq!(payload["timezone"], "UTC");
        assert!(payload["unix_timestamp"].is_i64());
    }

    #[tokio::test]
    async fn missing_arguments_defaults_to_empty_object() {
        let response = call(json!({
            "jsonrpc": "2.0",
            "id": 3,
            "method": "tools/call",
            "params": { "name": "get_current_time" }
        }))
        .await;
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(result_text(&response)["timezone"], "local");
    }

    #[tokio::test]
    async fn invalid_timezone_is_failed_tool_result() {
        let response = call(tool_call("get_timezone_info", json!({ "tz": "Not/AZone" }))).await;
        assert_eq!(response["result"]["isError"], true);
        let text = response["result"]["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Invalid timezone: Not/AZone"));
    }

    #[tokio::test]
    async fn missing_required_argument_is_invalid_params() {
        let response = call(tool_call("parse_datetime", json!({}))).await;
        assert_eq!(response["error"]["code"], INVALID_PARAMS);
    }

    #[tokio::test]
    async fn unknown_tool_is_method_not_found() {
        let response = call(tool_call("get_weather", json!({}))).await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
        assert!(response["error"]["message"]
            .as_str()
            .unwrap()
            .contains("get_weather"));
    }

    #[tokio::test]
    async fn unknown_method_is_method_not_found() {
        let response = call(json!({
            "jsonrpc": "2.0",
            "id": 4,
            "method": "resources/list",
            "params": {}
        }))
        .await;
        assert_eq!(response["error"]["code"], METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_request_is_parse_error() {
        let response = call(json!({ "id": 5, "method": 12 })).await;
        assert_eq!(response["error"]["code"], PARSE_ERROR);
        assert_eq!(response["id"], 5);
    }

    #[tokio::test]
    async fn invalid_datetime_is_not_an_error() {
        let response = call(tool_call(
            "is_valid_datetime",
            json!({ "date_string": "garbage", "format_string": "%Y-%m-%d" }),
        ))
        .await;
        assert_eq!(response["result"]["isError"], false);
        assert_eq!(result_text(&response)["valid"], false);
    }

    #[tokio::test]
    async fn compare_times_over_the_wire() {
        let response = call(tool_call(
            "compare_times",
            json!({
                "time1": "2025-01-01 00:00:00",
                "time2": "2025-01-02 00:00:00"
            }),
        ))
        .await;
        let payload = result_text(&response);
        assert_eq!(payload["difference_seconds"], 86400);
        assert_eq!(payload["time1_is_before_time2"], true);
    }

    #[tokio::test]
    async fn notification_is_acknowledged_with_empty_object() {
        let response = mcp_handler(
            State(state()),
            Json(json!({
                "jsonrpc": "2.0",
                "method": "notifications/initialized"
            })),
        )
        .await;
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"{}");
    }
}
