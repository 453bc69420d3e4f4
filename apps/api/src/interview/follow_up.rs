//! Follow-up Question Provider — prefers a generated follow-up, falls back to the bank.
//!
//! The generator is pluggable (`Arc<dyn QuestionGenerator>`) and optional. A missing
//! generator, an upstream error, an empty completion and a timeout all surface as a
//! typed `GenerationError`, and every one of them resolves to the same static fallback.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::interview::prompts::{build_follow_up_prompt, FOLLOW_UP_SYSTEM};
use crate::interview::question_bank::{Role, GENERIC_FOLLOW_UP};
use crate::llm_client::{LlmClient, LlmError};

/// Follow-up questions are one sentence; keep completions short.
const FOLLOW_UP_MAX_TOKENS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("follow-up generation is not configured")]
    NotConfigured,

    #[error("follow-up generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generator returned an empty question")]
    Empty,

    #[error("generator call failed: {0}")]
    Upstream(String),
}

/// An external source of follow-up questions.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self, role: Role, prior_answer: &str) -> Result<String, GenerationError>;
}

/// Generates follow-ups through the shared LLM client.
pub struct LlmQuestionGenerator {
    llm: LlmClient,
}

impl LlmQuestionGenerator {
    pub fn new(llm: LlmClient) -> Self {
        Self {
            llm: llm.with_max_tokens(FOLLOW_UP_MAX_TOKENS),
        }
    }
}

#[async_trait]
impl QuestionGenerator for LlmQuestionGenerator {
    async fn generate(&self, role: Role, prior_answer: &str) -> Result<String, GenerationError> {
        let prompt = build_follow_up_prompt(role.key(), prior_answer);
        self.llm
            .call_text(&prompt, FOLLOW_UP_SYSTEM)
            .await
            .map_err(|e| match e {
                LlmError::EmptyContent => GenerationError::Empty,
                other => GenerationError::Upstream(other.to_string()),
            })
    }
}

pub struct FollowUpProvider {
    generator: Option<Arc<dyn QuestionGenerator>>,
    timeout: Duration,
}

impl FollowUpProvider {
    pub fn new(generator: Option<Arc<dyn QuestionGenerator>>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.generator.is_some()
    }

    /// Asks the external generator for a follow-up, bounded by the configured timeout.
    pub async fn generate(&self, role: Role, prior_answer: &str) -> Result<String, GenerationError> {
        let generator = self
            .generator
            .as_ref()
            .ok_or(GenerationError::NotConfigured)?;

        let question = tokio::time::timeout(self.timeout, generator.generate(role, prior_answer))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))??;

        let question = question.trim();
        if question.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(question.to_string())
    }

    /// Static question for `turn_index`, or the generic prompt once the bank runs out.
    pub fn fallback(role: Role, turn_index: usize) -> String {
        role.question(turn_index)
            .unwrap_or(GENERIC_FOLLOW_UP)
            .to_string()
    }
}
