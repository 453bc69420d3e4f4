//! Keyword matcher — skill detection, best-fit role prediction and ATS scoring.
//!
//! Pure functions over lower-cased resume text. Matching is plain substring
//! containment, the same way the fit scorer treats raw text.

use serde::{Deserialize, Serialize};

use crate::screening::keywords::{normalize_skill, ScreeningRole, GENERAL_SKILLS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtsTier {
    Excellent,
    Good,
    Average,
    Low,
}

impl AtsTier {
    pub fn from_score(score: u32) -> Self {
        if score >= 85 {
            AtsTier::Excellent
        } else if score >= 65 {
            AtsTier::Good
        } else if score >= 45 {
            AtsTier::Average
        } else {
            AtsTier::Low
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            AtsTier::Excellent => "Excellent match! Strong alignment with this role.",
            AtsTier::Good => "Good match. Candidate has most key skills.",
            AtsTier::Average => "Average match. Some key skills missing.",
            AtsTier::Low => "Low match. Candidate needs improvement.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolePrediction {
    /// `None` when no role keyword appears at all.
    pub role: Option<ScreeningRole>,
    pub confidence: u32, // 0 – 100
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AtsReport {
    pub score: u32, // 0 – 100
    pub tier: AtsTier,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
}

/// Canonical skills present in `text`, deduplicated, in first-seen order.
pub fn detect_skills(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let candidates = GENERAL_SKILLS
        .iter()
        .chain(ScreeningRole::ALL.iter().flat_map(|role| role.keywords()));

    let mut skills: Vec<String> = Vec::new();
    for keyword in candidates {
        if !text.contains(keyword) {
            continue;
        }
        let canonical = normalize_skill(keyword);
        if !skills.iter().any(|s| s == canonical) {
            skills.push(canonical.to_string());
        }
    }
    skills
}

/// Role whose keyword list has the most hits. Ties go to the earlier role.
pub fn predict_best_role(text: &str) -> RolePrediction {
    let text = text.to_lowercase();
    let mut best: Option<(ScreeningRole, usize)> = None;

    for role in ScreeningRole::ALL {
        let hits = role.keywords().iter().filter(|kw| text.contains(*kw)).count();
        if hits > 0 && best.map_or(true, |(_, top)| hits > top) {
            best = Some((role, hits));
        }
    }

    match best {
        Some((role, hits)) => RolePrediction {
            role: Some(role),
            confidence: percentage(hits, role.keywords().len()),
        },
        None => RolePrediction {
            role: None,
            confidence: 0,
        },
    }
}

/// Compares detected skills against the role's canonical keyword set.
pub fn ats_report(role: ScreeningRole, detected: &[String]) -> AtsReport {
    let mut expected: Vec<&str> = Vec::new();
    for keyword in role.keywords() {
        let canonical = normalize_skill(keyword);
        if !expected.contains(&canonical) {
            expected.push(canonical);
        }
    }

    let expected_count = expected.len();
    let (matched, missing): (Vec<&str>, Vec<&str>) = expected
        .into_iter()
        .partition(|skill| detected.iter().any(|d| d.as_str() == *skill));

    let score = percentage(matched.len(), expected_count);
    AtsReport {
        score,
        tier: AtsTier::from_score(score),
        matched_skills: matched.into_iter().map(String::from).collect(),
        missing_skills: missing.into_iter().map(String::from).collect(),
    }
}

fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
