//! Static keyword tables for resume screening.

use serde::{Deserialize, Serialize};

/// Skills looked for in every resume regardless of target role.
pub const GENERAL_SKILLS: &[&str] = &[
    "react", "react.js", "node", "node.js", "express", "express.js", "mongodb", "sql", "python",
    "java", "javascript", "html", "css", "docker", "aws", "api", "git", "typescript", "redux",
    "next.js",
];

/// Variant spelling → canonical skill.
const SKILL_ALIASES: &[(&str, &str)] = &[
    ("react.js", "react"),
    ("node.js", "node"),
    ("express.js", "express"),
    ("next.js", "next"),
    ("redux toolkit", "redux"),
    ("html5", "html"),
    ("css3", "css"),
    ("aws cloud", "aws"),
];

pub fn normalize_skill(skill: &str) -> &str {
    SKILL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == skill)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(skill)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreeningRole {
    SoftwareEngineer,
    MernDeveloper,
    DataAnalyst,
    HrRecruiter,
    SalesExecutive,
}

impl ScreeningRole {
    /// Declaration order doubles as the tie-break order for role prediction.
    pub const ALL: [ScreeningRole; 5] = [
        ScreeningRole::SoftwareEngineer,
        ScreeningRole::MernDeveloper,
        ScreeningRole::DataAnalyst,
        ScreeningRole::HrRecruiter,
        ScreeningRole::SalesExecutive,
    ];

    /// Case-insensitive lookup with whitespace collapsed.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self::ALL.into_iter().find(|role| role.key() == normalized)
    }

    pub fn key(self) -> &'static str {
        match self {
            ScreeningRole::SoftwareEngineer => "software engineer",
            ScreeningRole::MernDeveloper => "mern developer",
            ScreeningRole::DataAnalyst => "data analyst",
            ScreeningRole::HrRecruiter => "hr recruiter",
            ScreeningRole::SalesExecutive => "sales executive",
        }
    }

    pub fn keywords(self) -> &'static [&'static str] {
        match self {
            ScreeningRole::SoftwareEngineer => &[
                "javascript", "react", "react.js", "node", "node.js", "python", "java", "mongodb",
                "express", "express.js", "api", "docker", "aws", "git", "html", "css",
            ],
            ScreeningRole::MernDeveloper => &[
                "react", "react.js", "node", "node.js", "express", "express.js", "mongodb",
                "javascript", "redux", "api", "next.js", "git", "html", "css",
            ],
            ScreeningRole::DataAnalyst => &[
                "excel",
                "sql",
                "python",
                "tableau",
                "power bi",
                "data visualization",
                "machine learning",
                "statistics",
                "analytics",
                "reporting",
            ],
            ScreeningRole::HrRecruiter => &[
                "recruitment",
                "talent acquisition",
                "screening",
                "onboarding",
                "communication",
                "employee engagement",
                "job description",
                "sourcing",
                "interviewing",
            ],
            ScreeningRole::SalesExecutive => &[
                "sales",
                "crm",
                "lead generation",
                "communication",
                "negotiation",
                "pipeline",
                "target",
                "b2b",
                "b2c",
                "presentation",
                "marketing",
            ],
        }
    }
}

impl std::fmt::Display for ScreeningRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
