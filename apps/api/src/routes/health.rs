use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and live session counts.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": env!("CARGO_PKG_NAME"),
        "follow_up_generation": state.interviews.follow_ups().is_configured(),
        "job_description_generation": state.copilot.is_configured(),
        "sessions": {
            "live": state.interviews.store().len(),
            "chat": state.chat_interviews.store().len(),
        }
    }))
}
