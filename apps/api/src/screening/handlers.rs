//! Axum route handler for resume screening uploads.

use axum::{extract::Multipart, Json};
use bytes::Bytes;
use serde::Serialize;

use crate::errors::AppError;
use crate::screening::extract::{extract_text, ScreeningError};
use crate::screening::keywords::ScreeningRole;
use crate::screening::matcher::{ats_report, detect_skills, predict_best_role, AtsTier};

/// Upload cap for the resume field.
pub const MAX_RESUME_BYTES: usize = 10 * 1024 * 1024;

const UNKNOWN_ROLE_LABEL: &str = "Unknown";

// ────────────────────────────────────────────────────────────────────────────
// Response type
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    /// Role the recruiter asked about, lower-cased; `None` when not provided.
    pub selected_role: Option<String>,
    pub best_fit_role: String,
    pub confidence: u32, // 0 – 100
    pub detected_skills: Vec<String>,
    /// ATS fields are only present for a recognised `selected_role`.
    pub ats_score: Option<u32>,
    pub ats_tier: Option<AtsTier>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub feedback: Option<String>,
}

struct Upload {
    bytes: Bytes,
    content_type: Option<String>,
    file_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handler
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/ai/resume-screening
///
/// Multipart fields: `resume` (file, required) and `role` (text, optional).
pub async fn handle_resume_screening(
    mut multipart: Multipart,
) -> Result<Json<ScreeningResponse>, AppError> {
    let mut upload: Option<Upload> = None;
    let mut role: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?
    {
        match field.name() {
            Some("resume") => {
                let content_type = field.content_type().map(str::to_string);
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                upload = Some(Upload {
                    bytes,
                    content_type,
                    file_name,
                });
            }
            Some("role") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(e.to_string()))?;
                let value = value.trim().to_lowercase();
                if !value.is_empty() {
                    role = Some(value);
                }
            }
            _ => {}
        }
    }

    let upload = upload.ok_or(ScreeningError::MissingResume)?;
    tracing::info!(
        file_name = upload.file_name.as_deref().unwrap_or("<unnamed>"),
        size = upload.bytes.len(),
        role = role.as_deref().unwrap_or("<none>"),
        "Screening resume"
    );

    // PDF parsing is CPU-bound.
    let text = tokio::task::spawn_blocking(move || {
        extract_text(
            &upload.bytes,
            upload.content_type.as_deref(),
            upload.file_name.as_deref(),
        )
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;

    Ok(Json(screen(&text, role)))
}

/// Runs the matcher over extracted resume text.
fn screen(text: &str, selected_role: Option<String>) -> ScreeningResponse {
    let detected_skills = detect_skills(text);
    let prediction = predict_best_role(text);

    let report = selected_role
        .as_deref()
        .and_then(ScreeningRole::parse)
        .map(|role| ats_report(role, &detected_skills));

    if let (Some(requested), None) = (&selected_role, &report) {
        tracing::debug!(role = %requested, "No keyword set for role, skipping ATS score");
    }

    let (ats_score, ats_tier, matched_skills, missing_skills) = match report {
        Some(report) => (
            Some(report.score),
            Some(report.tier),
            report.matched_skills,
            report.missing_skills,
        ),
        None => (None, None, Vec::new(), Vec::new()),
    };

    ScreeningResponse {
        selected_role,
        best_fit_role: prediction
            .role
            .map(|role| role.key().to_string())
            .unwrap_or_else(|| UNKNOWN_ROLE_LABEL.to_string()),
        confidence: prediction.confidence,
        detected_skills,
        ats_score,
        ats_tier,
        matched_skills,
        missing_skills,
        feedback: ats_tier.map(|tier| tier.message().to_string()),
    }
}
