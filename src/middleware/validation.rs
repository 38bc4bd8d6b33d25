use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::config::AppConfig;

/// Environment override for the early `Content-Length` check.
const MAX_BODY_ENV: &str = "UNIVERSITY_MAX_BODY_SIZE";

/// Rejects obviously hostile requests before routing.
///
/// Checks for path traversal in the URI (400) and for a declared `Content-Length`
/// above the configured body limit on `POST`/`PUT` (413). Suspicious user agents are
/// logged but let through.
pub async fn validate_request_middleware(
    State(cfg): State<Arc<AppConfig>>,
    req: Request,
    next: Next,
) -> Response {
    let uri_path = req.uri().path();
    if contains_path_traversal(uri_path) {
        tracing::warn!("Rejected path traversal attempt: {}", sanitize_for_logging(uri_path));
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": {
                    "code": "INVALID_PATH",
                    "message": "Path traversal detected in request",
                },
                "status": 400,
            })),
        )
            .into_response();
    }

    if let Some(user_agent) = req.headers().get("user-agent") {
        if let Ok(ua_str) = user_agent.to_str() {
            if is_suspicious_user_agent(ua_str) {
                tracing::warn!("Suspicious user agent detected: {}", sanitize_for_logging(ua_str));
            }
        }
    }

    // DefaultBodyLimit enforces the same limit while streaming; this rejects early.
    if matches!(req.method(), &axum::http::Method::POST | &axum::http::Method::PUT) {
        let declared = req
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<usize>().ok());
        if let Some(length) = declared {
            let max_body_size = max_body_size(&cfg);
            if length > max_body_size {
                return (
                    StatusCode::PAYLOAD_TOO_LARGE,
                    Json(json!({
                        "error": {
                            "code": "PAYLOAD_TOO_LARGE",
                            "message": format!("Request body exceeds maximum size of {} bytes", max_body_size),
                        },
                        "status": 413,
                    })),
                )
                    .into_response();
            }
        }
    }

    next.run(req).await
}

fn max_body_size(cfg: &AppConfig) -> usize {
    std::env::var(MAX_BODY_ENV)
        .ok()
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(cfg.server.max_body_bytes)
}

/// Detects directory traversal sequences, plain or percent-encoded.
fn contains_path_traversal(path: &str) -> bool {
    let lower = path.to_lowercase();

    if path.contains("/..") || path.contains("\\..") || path.starts_with("..") {
        return true;
    }
    if path.contains("/./") || path.contains("\\.\\") {
        return true;
    }

    let encoded_patterns = [
        "%2e%2e",
        "%252e%252e",
        "%2e/",
        "%252e%2f",
        "/%2e",
        "%2f%2e",
        "%2e\\",
        "%2e%5c",
        "%5c%2e",
        "%5c%5c",
        "%2f",
        "%00",
    ];
    if encoded_patterns.iter().any(|p| lower.contains(p)) {
        return true;
    }

    path.contains('\0')
}

fn is_suspicious_user_agent(ua: &str) -> bool {
    let ua_lower = ua.to_lowercase();
    ua_lower.contains("scanner")
        || (ua_lower.contains("crawler") && !ua_lower.contains("googlebot") && !ua_lower.contains("bingbot"))
        || ua_lower.contains("nikto")
        || ua_lower.contains("sqlmap")
        || ua_lower.contains("havij")
        || ua_lower.contains("acunetix")
}

/// Strips control characters, escapes quotes and caps the length at 200 chars.
pub fn sanitize_for_logging(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .take(200)
        .collect::<String>()
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\'', "\\\'")
}
