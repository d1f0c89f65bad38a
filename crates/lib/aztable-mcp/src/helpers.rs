use std::borrow::Cow;

use aztable_core::control::ControlError;
use rmcp::ErrorData;
use rmcp::model::{CallToolResult, Content, ErrorCode};
use serde::Serialize;

pub fn mcp_err(code: ErrorCode, message: impl Into<Cow<'static, str>>) -> ErrorData {
    ErrorData {
        code,
        message: message.into(),
        data: None,
    }
}

pub fn map_control_err(err: ControlError) -> ErrorData {
    match err {
        ControlError::InvalidArgument(message) => mcp_err(ErrorCode::INVALID_PARAMS, message),
        ControlError::Store(err) => mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string()),
    }
}

/// Wraps a payload as pretty-printed JSON text content.
pub fn json_result<T: Serialize>(payload: &T) -> Result<CallToolResult, ErrorData> {
    let text = serde_json::to_string_pretty(payload)
        .map_err(|err| mcp_err(ErrorCode::INTERNAL_ERROR, err.to_string()))?;
    Ok(CallToolResult::success(vec![Content::text(text)]))
}
