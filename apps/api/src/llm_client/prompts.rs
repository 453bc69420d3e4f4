// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// Instruction appended to prompts whose output is shown to a user verbatim.
pub const PLAIN_TEXT_INSTRUCTION: &str = "\
    Respond with the requested text only. \
    Do NOT use markdown, numbering, or surrounding quotes. \
    Do NOT include explanations, preambles, or apologies.";
