use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest caller-supplied id we are willing to echo back
const MAX_INCOMING_ID_LEN: usize = 128;

/// Request id, available to handlers as an extension.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

fn incoming_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty() && s.len() <= MAX_INCOMING_ID_LEN)
        .map(str::to_string)
}

/// Reuses the proxy's `X-Request-Id` when present, otherwise mints a UUID v4.
/// The id is recorded on the current span and echoed on the response.
pub async fn request_id_middleware(headers: HeaderMap, mut request: Request, next: Next) -> Response {
    let id = incoming_id(&headers).unwrap_or_else(|| Uuid::new_v4().to_string());

    tracing::Span::current().record("request_id", id.as_str());
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(val) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, val);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incoming_id_is_trimmed_and_bounded() {
        let mut headers = HeaderMap::new();
        assert_eq!(incoming_id(&headers), None);

        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static("  abc-123 "));
        assert_eq!(incoming_id(&headers).as_deref(), Some("abc-123"));

        let long = "x".repeat(MAX_INCOMING_ID_LEN + 1);
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_str(&long).unwrap());
        assert_eq!(incoming_id(&headers), None);
    }
}
