// LLM prompts for the HR copilot job-description writer.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::PLAIN_TEXT_INSTRUCTION;

/// System prompt for job-description drafting.
pub const JOB_DESCRIPTION_SYSTEM: &str =
    "You are an experienced HR specialist who writes clear, professional job descriptions.";

/// Job-description prompt template. Replace `{role}` before sending.
pub const JOB_DESCRIPTION_PROMPT_TEMPLATE: &str = "\
Write a detailed, professional job description for a {role}. Include:
Role Overview
Key Responsibilities
Required Skills
Preferred Qualifications
Work Environment";

pub fn build_job_description_prompt(role: &str) -> String {
    let body = JOB_DESCRIPTION_PROMPT_TEMPLATE.replace("{role}", role.trim());
    format!("{body}\n\n{PLAIN_TEXT_INSTRUCTION}")
}
