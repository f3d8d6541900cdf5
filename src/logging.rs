//! Middleware for logging requests and responses.

use axum::{extract::Request, middleware::Next, response::Response};

/// The number of body bytes logged at the `info` level before truncation.
pub const LOG_BODY_LENGTH_LIMIT: usize = 256;

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not buffer request body for logging: {error}");
            axum::body::Bytes::new()
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes).to_string();

    log_payload("Received request", &format!("{} {}", parts.method, parts.uri), &body_text);

    let request = Request::from_parts(parts, body_text.into());
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("could not buffer response body for logging: {error}");
            axum::body::Bytes::new()
        }
    };
    let body_text = String::from_utf8_lossy(&body_bytes).to_string();

    log_payload("Sending response", &parts.status.to_string(), &body_text);

    Response::from_parts(parts, body_text.into())
}

fn log_payload(direction: &str, summary: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{direction}: {summary} body: {}...",
            truncate_on_char_boundary(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{direction}: {summary} body: {body:?}");
    }
}

/// Truncate `text` to at most `limit` bytes without splitting a multi-byte
/// character; slicing at a fixed byte index would panic when that index
/// falls inside one.
fn truncate_on_char_boundary(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}
