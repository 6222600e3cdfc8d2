use crate::api::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::warn;
use std::sync::Arc;
use subtle::ConstantTimeEq;

pub fn authorize_request(headers: &HeaderMap, expected: Option<&str>) -> Result<(), String> {
    let expected = match expected {
        Some(value) if !value.trim().is_empty() => value.trim(),
        _ => return Ok(()),
    };

    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        if constant_time_eq(value, expected) {
            return Ok(());
        }
    }
    Err("Unauthorized: Invalid API Key".to_string())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Route layer guarding everything except `/health`.
pub async fn auth_middleware(State(state): State<Arc<AppState>>, req: Request<Body>, next: Next) -> Response {
    if let Err(message) = authorize_request(req.headers(), state.api_key.as_deref()) {
        warn!("request rejected path={} reason=invalid_api_key", req.uri().path());
        return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({ "error": message }))).into_response();
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with_key(key: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(key).expect("header"));
        headers
    }

    #[test]
    fn matching_key_passes() {
        assert!(authorize_request(&headers_with_key("secret"), Some("secret")).is_ok());
    }

    #[test]
    fn missing_or_wrong_key_fails() {
        assert!(authorize_request(&HeaderMap::new(), Some("secret")).is_err());
        assert!(authorize_request(&headers_with_key("nope"), Some("secret")).is_err());
    }

    #[test]
    fn no_configured_key_disables_auth() {
        assert!(authorize_request(&HeaderMap::new(), None).is_ok());
        assert!(authorize_request(&HeaderMap::new(), Some("  ")).is_ok());
    }
}
