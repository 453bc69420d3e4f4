//! Axum route handlers for the chat (request/response) interview.
//!
//! Same state machine as the live channel, keyed by a server-issued interview id.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::machine::{Effect, InterviewEvent, UNKNOWN_ROLE_MESSAGE};
use crate::interview::question_bank::Role;
use crate::interview::scorer::FeedbackTier;
use crate::interview::session::Phase;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct RoleSummary {
    pub role: &'static str,
    pub question_count: usize,
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub interview_id: Uuid,
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub interview_id: Uuid,
    pub answer: String,
}

#[derive(Debug, Default, Serialize)]
pub struct AnswerResponse {
    pub finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_question: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tier: Option<FeedbackTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/interviews/roles
pub async fn handle_list_roles() -> Json<Vec<RoleSummary>> {
    Json(
        Role::ALL
            .into_iter()
            .map(|role| RoleSummary {
                role: role.key(),
                question_count: role.question_count(),
            })
            .collect(),
    )
}

/// POST /api/v1/interviews/start
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, AppError> {
    let role = Role::parse(&request.role)
        .map_err(|_| AppError::Validation(UNKNOWN_ROLE_MESSAGE.to_string()))?;

    let interview_id = Uuid::new_v4();
    let session = state
        .chat_interviews
        .store()
        .create(interview_id, role)
        .ok_or_else(|| anyhow::anyhow!("interview id {interview_id} already in use"))?;
    let question = session
        .current_question()
        .ok_or_else(|| anyhow::anyhow!("role {role} has no questions"))?;

    tracing::info!(%interview_id, %role, "Chat interview started");
    Ok(Json(StartInterviewResponse {
        interview_id,
        question: question.to_string(),
    }))
}

/// POST /api/v1/interviews/answer
///
/// Scores the answer and returns either the next question or the final result.
pub async fn handle_answer(
    State(state): State<AppState>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    if request.answer.trim().is_empty() {
        return Err(AppError::Validation("answer cannot be empty".to_string()));
    }

    let engine = &state.chat_interviews;
    let id = request.interview_id;

    let phase = engine
        .store()
        .mutate(id, |session| session.phase)
        .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
    if phase == Phase::AwaitingFollowUp {
        return Err(AppError::Conflict(
            "The previous answer is still being processed".to_string(),
        ));
    }

    let mut effects = engine.apply(id, InterviewEvent::Answer { text: request.answer });
    let mut response = None;

    while let Some(effect) = effects.pop() {
        match effect {
            Effect::RequestFollowUp(follow_up) => effects.extend(
                engine
                    .resolve_follow_up_detached(id, follow_up)
                    .await
                    .map_err(|e| AppError::Internal(e.into()))?,
            ),
            Effect::Say(question) => {
                response = Some(AnswerResponse {
                    next_question: Some(question),
                    ..Default::default()
                })
            }
            Effect::Conclude(result) => {
                tracing::info!(
                    interview_id = %id,
                    score = result.score,
                    tier = result.tier.label(),
                    "Chat interview completed"
                );
                response = Some(AnswerResponse {
                    finished: true,
                    total_score: Some(result.score),
                    tier: Some(result.tier),
                    feedback: Some(result.tier.message().to_string()),
                    message: Some(result.message),
                    ..Default::default()
                })
            }
        }
    }

    // Nothing happened: another request advanced this interview concurrently.
    response.map(Json).ok_or_else(|| {
        AppError::Conflict("The previous answer is still being processed".to_string())
    })
}
