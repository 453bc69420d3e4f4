// LLM prompts for the live interview follow-up generator.
// Reuses cross-cutting fragments from llm_client::prompts.

use crate::llm_client::prompts::PLAIN_TEXT_INSTRUCTION;

/// System prompt for follow-up question generation.
pub const FOLLOW_UP_SYSTEM: &str =
    "You are a professional interviewer that asks concise, relevant follow-up questions.";

/// Follow-up prompt template. Replace `{role}` and `{answer}` before sending.
pub const FOLLOW_UP_PROMPT_TEMPLATE: &str = "\
You are an AI interviewer conducting a {role} interview.
Given the candidate's last answer: \"{answer}\",
generate the next logical interview question (1 short sentence).";

pub fn build_follow_up_prompt(role: &str, answer: &str) -> String {
    let body = FOLLOW_UP_PROMPT_TEMPLATE
        .replace("{role}", role)
        .replace("{answer}", answer.trim());
    format!("{body}\n\n{PLAIN_TEXT_INSTRUCTION}")
}
