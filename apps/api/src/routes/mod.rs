pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::copilot::handlers as copilot;
use crate::interview::{handlers as interview, socket};
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Live interview
        .route("/ws/interview", get(socket::interview_ws))
        // Chat interview
        .route("/api/v1/interviews/roles", get(interview::handle_list_roles))
        .route(
            "/api/v1/interviews/start",
            post(interview::handle_start_interview),
        )
        .route("/api/v1/interviews/answer", post(interview::handle_answer))
        // HR copilot
        .route("/api/v1/ai/chat", post(copilot::handle_chat))
        // Resume screening
        .route(
            "/api/v1/ai/resume-screening",
            post(screening::handle_resume_screening)
                .layer(DefaultBodyLimit::max(screening::MAX_RESUME_BYTES)),
        )
        .with_state(state)
}
