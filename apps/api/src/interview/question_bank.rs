//! Question Bank — the static, per-role seed questions for live interviews.
//!
//! Roles are a closed set. Every `Role` maps to a non-empty question list, so a
//! successful `Role::parse` always yields an interview that can start.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prompt used when neither the generator nor the bank has a question for a turn.
pub const GENERIC_FOLLOW_UP: &str = "Can you elaborate on that?";

const SOFTWARE_ENGINEER: &[&str] = &[
    "Tell me about your experience with JavaScript frameworks like React or Node.js.",
    "How do you ensure code scalability in large applications?",
    "Describe a project where you solved a difficult technical problem.",
    "How do you test and deploy your code?",
    "What is your approach to working in a team environment?",
];

const DATA_ANALYST: &[&str] = &[
    "Which tools do you use for data visualization?",
    "How do you handle missing data?",
    "Can you explain a time you used SQL for analysis?",
    "What is your experience with Python or R?",
    "Describe how you present insights to stakeholders.",
];

const HR_RECRUITER: &[&str] = &[
    "How do you source candidates for niche roles?",
    "What tools do you use for tracking applicants?",
    "How do you ensure diversity in hiring?",
    "Describe a time you resolved a hiring challenge.",
    "How do you assess cultural fit?",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    SoftwareEngineer,
    DataAnalyst,
    HrRecruiter,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No questions available for role '{0}'")]
pub struct UnknownRole(pub String);

impl Role {
    pub const ALL: [Role; 3] = [Role::SoftwareEngineer, Role::DataAnalyst, Role::HrRecruiter];

    /// Resolves a user-supplied role name. Matching ignores case and
    /// surrounding/repeated whitespace.
    pub fn parse(raw: &str) -> Result<Role, UnknownRole> {
        let normalized = normalize_role_name(raw);
        Role::ALL
            .into_iter()
            .find(|role| role.key() == normalized)
            .ok_or_else(|| UnknownRole(raw.trim().to_string()))
    }

    /// The normalized bank key for this role.
    pub fn key(self) -> &'static str {
        match self {
            Role::SoftwareEngineer => "software engineer",
            Role::DataAnalyst => "data analyst",
            Role::HrRecruiter => "hr recruiter",
        }
    }

    pub fn questions(self) -> &'static [&'static str] {
        match self {
            Role::SoftwareEngineer => SOFTWARE_ENGINEER,
            Role::DataAnalyst => DATA_ANALYST,
            Role::HrRecruiter => HR_RECRUITER,
        }
    }

    pub fn question(self, index: usize) -> Option<&'static str> {
        self.questions().get(index).copied()
    }

    pub fn question_count(self) -> usize {
        self.questions().len()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::parse(s)
    }
}

fn normalize_role_name(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
