//! Shared API request/response types
//!
//! Every endpoint answers with the same `{ success, data?, error? }`
//! envelope so the desktop client can handle all responses uniformly.

use serde::Serialize;

/// Standard response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Successful response carrying a payload
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response with a human-readable message (never a stack trace)
    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Successful response with no payload (create/update/delete acks)
pub fn ok_empty() -> ApiResponse<()> {
    ApiResponse {
        success: true,
        data: None,
        error: None,
    }
}
