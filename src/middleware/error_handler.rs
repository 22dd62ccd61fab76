// src/middleware/error_handler.rs - Request completion logging
use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Tags every response with request id / response time and logs completion.
pub async fn handle_error(request: Request, next: Next) -> Response {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let method = request.method().clone();
    let uri = request.uri().clone();
    let start_time = std::time::Instant::now();

    let mut response = next.run(request).await;
    let elapsed = start_time.elapsed();

    let headers = response.headers_mut();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        headers.insert("x-request-id", header_value);
    }
    if let Ok(response_time) = HeaderValue::from_str(&format!("{}ms", elapsed.as_millis())) {
        headers.insert("x-response-time", response_time);
    }

    if response.status().is_client_error() || response.status().is_server_error() {
        tracing::warn!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            elapsed_ms = elapsed.as_millis(),
            request_id = request_id,
            "request completed with error"
        );
    } else {
        tracing::debug!(
            method = %method,
            uri = %uri,
            status = %response.status(),
            elapsed_ms = elapsed.as_millis(),
            request_id = request_id,
            "request completed"
        );
    }

    response
}
