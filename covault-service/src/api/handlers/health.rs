use axum::response::IntoResponse;
use axum::Json;
use covault_core::foundation::util::time::rfc3339_now;
use log::trace;

pub async fn handle_health() -> impl IntoResponse {
    trace!("health check: ok");
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": rfc3339_now(),
    }))
}
