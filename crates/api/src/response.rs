//! API response types.
//!
//! Success payloads are wrapped in a `{"data": ...}` envelope; error
//! responses come from `AppError`'s `IntoResponse` impl and carry an
//! `{"error": {"code", "message"}}` body instead.

use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Standard API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_wrapped_in_data() {
        let resp = ApiResponse::ok(serde_json::json!({"id": "abc"}));
        let body = serde_json::to_value(&resp).unwrap();

        assert_eq!(body["data"]["id"], "abc");
        assert!(body.get("error").is_none());
    }
}
