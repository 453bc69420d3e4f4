//! Job-description drafting for the HR copilot.
//!
//! Same shape as the interview follow-up provider: an optional, pluggable writer
//! behind a timeout, with every failure surfacing as a `GenerationError`. Output is
//! cleaned of control artifacts whichever writer produced it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::copilot::prompts::{build_job_description_prompt, JOB_DESCRIPTION_SYSTEM};
use crate::interview::follow_up::GenerationError;
use crate::llm_client::{clean_completion, LlmClient, LlmError};

#[async_trait]
pub trait JobDescriptionWriter: Send + Sync {
    async fn write(&self, role: &str) -> Result<String, GenerationError>;
}

/// Drafts job descriptions through the shared LLM client.
pub struct LlmJobDescriptionWriter {
    llm: LlmClient,
}

impl LlmJobDescriptionWriter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl JobDescriptionWriter for LlmJobDescriptionWriter {
    async fn write(&self, role: &str) -> Result<String, GenerationError> {
        let prompt = build_job_description_prompt(role);
        self.llm
            .call_text(&prompt, JOB_DESCRIPTION_SYSTEM)
            .await
            .map_err(|e| match e {
                LlmError::EmptyContent => GenerationError::Empty,
                other => GenerationError::Upstream(other.to_string()),
            })
    }
}

pub struct JobDescriptionDrafter {
    writer: Option<Arc<dyn JobDescriptionWriter>>,
    timeout: Duration,
}

impl JobDescriptionDrafter {
    pub fn new(writer: Option<Arc<dyn JobDescriptionWriter>>, timeout: Duration) -> Self {
        Self { writer, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.writer.is_some()
    }

    /// Drafts a job description for `role`, bounded by the configured timeout.
    pub async fn draft(&self, role: &str) -> Result<String, GenerationError> {
        let writer = self.writer.as_ref().ok_or(GenerationError::NotConfigured)?;

        let text = tokio::time::timeout(self.timeout, writer.write(role))
            .await
            .map_err(|_| GenerationError::Timeout(self.timeout))??;

        let text = collapse_blank_lines(&clean_completion(&text));
        if text.is_empty() {
            return Err(GenerationError::Empty);
        }
        Ok(text)
    }
}

/// Role named in a "generate ... job description for X" request.
///
/// `None` when the message is not a job-description request. The role is the text
/// after the last standalone "for"; without one, the whole message is used.
pub fn requested_role(message: &str) -> Option<String> {
    let lower = message.to_lowercase();
    if !(lower.contains("generate") && lower.contains("job description")) {
        return None;
    }

    let words: Vec<&str> = message.split_whitespace().collect();
    let role = match words.iter().rposition(|w| w.eq_ignore_ascii_case("for")) {
        Some(pos) => words[pos + 1..].join(" "),
        None => words.join(" "),
    };
    Some(
        role.trim_end_matches(|c: char| c.is_ascii_punctuation())
            .to_string(),
    )
}

/// Collapses runs of blank lines into a single blank line.
fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for c in text.chars() {
        if c == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(c);
            }
        } else {
            newlines = 0;
            out.push(c);
        }
    }
    out
}
