use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};

/// Headers set on every response. The API serves JSON only, so nothing may
/// be framed, sniffed or loaded from it.
const STATIC_HEADERS: &[(&str, &str)] = &[
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "0"),
    ("content-security-policy", "default-src 'none'; frame-ancestors 'none'"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    // Owner names and mailing addresses are personal data
    ("cache-control", "no-store"),
];

const HSTS_VALUE: &str = "max-age=63072000; includeSubDomains";

fn hsts_enabled() -> bool {
    std::env::var("ENABLE_HSTS")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    for &(name, value) in STATIC_HEADERS {
        headers.insert(name, HeaderValue::from_static(value));
    }

    // Only meaningful behind TLS termination
    if hsts_enabled() {
        headers.insert("strict-transport-security", HeaderValue::from_static(HSTS_VALUE));
    }

    response
}
