//! Axum route handler for the HR copilot chat.
//!
//! Only job-description drafting is served here; other questions get a help reply.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::copilot::job_description::requested_role;
use crate::errors::AppError;
use crate::interview::follow_up::GenerationError;
use crate::state::AppState;

pub const UNAVAILABLE_REPLY: &str =
    "The AI service is currently unavailable. Please try again later.";
pub const HELP_REPLY: &str = "I'm your AI HR Copilot. Ask me to write a job description, \
for example: \"Generate a job description for Data Analyst\".";
pub const MISSING_ROLE_REPLY: &str =
    "Which role should the job description be for? Try \"Generate a job description for Sales Executive\".";

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /api/v1/ai/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let reply = match requested_role(message) {
        None => HELP_REPLY.to_string(),
        Some(role) if role.is_empty() => MISSING_ROLE_REPLY.to_string(),
        Some(role) => match state.copilot.draft(&role).await {
            Ok(text) => {
                info!(%role, chars = text.len(), "Job description drafted");
                format!("**Job Description for {role}:**\n\n{text}")
            }
            Err(GenerationError::NotConfigured) => {
                debug!(%role, "No job-description writer configured");
                UNAVAILABLE_REPLY.to_string()
            }
            Err(e) => {
                warn!(%role, "Job description drafting failed: {e}");
                UNAVAILABLE_REPLY.to_string()
            }
        },
    };

    Ok(Json(ChatResponse { reply }))
}
