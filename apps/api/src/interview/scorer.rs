//! Answer scoring — keyword overlap between a question and a free-text answer.
//!
//! Deterministic and side-effect free. Safe to call from any session concurrently.
//!
//! Algorithm:
//! 1. keywords = whitespace tokens of the question longer than 4 chars, lower-cased
//! 2. relevance = matched keywords / keywords × 100 (0 when there are none)
//! 3. score = min(10, round(relevance / 10) + 4)
//!
//! Relevance above 60% already saturates at 10. That clamp is part of the contract.

use serde::{Deserialize, Serialize};

pub const MIN_SCORE: u32 = 4;
pub const MAX_SCORE_PER_ANSWER: u32 = 10;
const MIN_KEYWORD_CHARS: usize = 5;

/// Scores a single answer against the question it responds to. Returns a value in `[4, 10]`.
pub fn score_answer(question: &str, answer: &str) -> u32 {
    let keywords = question_keywords(question);
    let answer_lower = answer.to_lowercase();

    let relevance = if keywords.is_empty() {
        0.0
    } else {
        let matched = keywords
            .iter()
            .filter(|k| answer_lower.contains(k.as_str()))
            .count();
        matched as f64 / keywords.len() as f64 * 100.0
    };

    let raw = (relevance / 10.0).round() as u32 + MIN_SCORE;
    raw.min(MAX_SCORE_PER_ANSWER)
}

fn question_keywords(question: &str) -> Vec<String> {
    question
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_KEYWORD_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Final interview percentage: `round(cumulative / (questions × 10) × 100)`.
pub fn final_percentage(cumulative_score: u32, question_count: usize) -> u32 {
    if question_count == 0 {
        return 0;
    }
    let max_total = question_count as f64 * MAX_SCORE_PER_ANSWER as f64;
    (cumulative_score as f64 / max_total * 100.0).round() as u32
}

/// Qualitative outcome of a finished interview.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    Excellent,
    Good,
    Average,
    NeedsImprovement,
}

impl FeedbackTier {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 85 {
            FeedbackTier::Excellent
        } else if percentage >= 70 {
            FeedbackTier::Good
        } else if percentage >= 50 {
            FeedbackTier::Average
        } else {
            FeedbackTier::NeedsImprovement
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => "excellent",
            FeedbackTier::Good => "good",
            FeedbackTier::Average => "average",
            FeedbackTier::NeedsImprovement => "needs improvement",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::Excellent => {
                "Excellent candidate with strong communication & technical skills."
            }
            FeedbackTier::Good => "Good candidate, solid understanding but can elaborate more.",
            FeedbackTier::Average => {
                "Average performance, needs improvement in clarity and detail."
            }
            FeedbackTier::NeedsImprovement => {
                "Needs improvement, revise fundamentals before next interview."
            }
        }
    }
}

/// Outcome emitted on the terminal turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewResult {
    pub score: u32, // 0 – 100
    pub tier: FeedbackTier,
    pub message: String,
}

impl InterviewResult {
    pub fn from_totals(cumulative_score: u32, question_count: usize) -> Self {
        let score = final_percentage(cumulative_score, question_count);
        let tier = FeedbackTier::from_percentage(score);
        Self {
            score,
            tier,
            message: format!(
                "Interview completed. Score: {score}/100. Feedback: {}",
                tier.message()
            ),
        }
    }
}
