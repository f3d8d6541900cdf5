//! Shared JSON response envelopes.
//!
//! Every response in the API carries a `status` field and a human-readable
//! `message`; no handler lets a fault escape without one of these envelopes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::OffsetDateTime;

/// The envelope returned for every failure path.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Always `"error"`.
    pub status: &'static str,
    /// A human-readable description safe to show to the caller.
    pub message: String,
    /// When the error response was produced, in UTC.
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

/// Build an error response with the standard envelope.
pub fn error_response(status_code: StatusCode, message: &str) -> Response {
    let body = ErrorBody {
        status: "error",
        message: message.to_owned(),
        timestamp: OffsetDateTime::now_utc(),
    };

    (status_code, Json(body)).into_response()
}

#[cfg(test)]
mod error_response_tests {
    use axum::http::StatusCode;

    use crate::responses::error_response;

    #[tokio::test]
    async fn envelope_carries_status_and_message() {
        let response = error_response(StatusCode::BAD_REQUEST, "amount must be greater than 0");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("could not read response body");
        let body: serde_json::Value =
            serde_json::from_slice(&bytes).expect("body should be JSON");

        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "amount must be greater than 0");
        assert!(body["timestamp"].is_string());
    }
}
