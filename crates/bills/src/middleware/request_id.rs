//! Request ID middleware for log and error correlation.
//!
//! Every response carries an `x-request-id`. An inbound value from a proxy is
//! reused when it looks sane; otherwise a UUID v4 is generated.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest inbound request ID that is reused as-is.
const MAX_INBOUND_LENGTH: usize = 128;

/// Reuse `inbound` if it is short, non-empty, visible ASCII; otherwise mint one.
fn resolve_request_id(inbound: Option<&str>) -> String {
    inbound
        .filter(|id| {
            !id.is_empty()
                && id.len() <= MAX_INBOUND_LENGTH
                && id.bytes().all(|b| b.is_ascii_graphic())
        })
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Attach a request ID to the tracing span, the Sentry scope and the response.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = resolve_request_id(
        request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|h| h.to_str().ok()),
    );

    Span::current().record("request_id", request_id.as_str());
    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
