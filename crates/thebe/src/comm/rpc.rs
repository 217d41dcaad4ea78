/*
 * rpc.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;
use serde_json::Value;

/// JSON-RPC 2.0 error codes
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum JsonRpcErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
    ServerErrorStart = -32099,
    ServerErrorEnd = -32000,
}

/**
 * Create a JSON-RPC 2.0 error response
 *
 * - `code` - The error code
 * - `message` - The error message
 *
 * Returns a JSON object representing the error.
 */
pub fn json_rpc_error(code: JsonRpcErrorCode, message: String) -> Value {
    json!({
        "error": {
            "code": code,
            "message": message,
            "data": null,
        }
    })
}

/**
 * Extract the error message from a JSON-RPC error response, if the response is
 * one. Replies produced by `json_rpc_error` and error replies relayed by the
 * frontend both carry their message under `error.message`.
 */
pub fn rpc_error_message(reply: &Value) -> Option<String> {
    let error = reply.get("error")?;
    let message = error.get("message")?.as_str()?;
    Some(message.to_string())
}
