use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Letter grade derived from the percentage of correct answers
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
pub enum ScoreLabel {
    #[strum(to_string = "A")]
    #[serde(rename = "A")]
    A,
    #[strum(to_string = "A-")]
    #[serde(rename = "A-")]
    AMinus,
    #[strum(to_string = "B+")]
    #[serde(rename = "B+")]
    BPlus,
    #[strum(to_string = "B")]
    #[serde(rename = "B")]
    B,
    #[strum(to_string = "B-")]
    #[serde(rename = "B-")]
    BMinus,
    #[strum(to_string = "C")]
    #[serde(rename = "C")]
    C,
    #[strum(to_string = "D")]
    #[serde(rename = "D")]
    D,
    #[strum(to_string = "E")]
    #[serde(rename = "E")]
    E,
}

/// Lower bounds (inclusive) checked from the top; anything below the last is an E.
const THRESHOLDS: [(f64, ScoreLabel); 7] = [
    (85.0, ScoreLabel::A),
    (80.0, ScoreLabel::AMinus),
    (75.0, ScoreLabel::BPlus),
    (70.0, ScoreLabel::B),
    (65.0, ScoreLabel::BMinus),
    (50.0, ScoreLabel::C),
    (40.0, ScoreLabel::D),
];

impl ScoreLabel {
    pub const ALL: [ScoreLabel; 8] = [
        ScoreLabel::A,
        ScoreLabel::AMinus,
        ScoreLabel::BPlus,
        ScoreLabel::B,
        ScoreLabel::BMinus,
        ScoreLabel::C,
        ScoreLabel::D,
        ScoreLabel::E,
    ];

    pub fn from_percent(correct_percent: f64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(lower, _)| correct_percent >= *lower)
            .map(|(_, label)| *label)
            .unwrap_or(ScoreLabel::E)
    }

    pub fn tier(&self) -> LabelTier {
        match self {
            ScoreLabel::A | ScoreLabel::AMinus => LabelTier::Excellent,
            ScoreLabel::BPlus | ScoreLabel::B | ScoreLabel::BMinus => LabelTier::Good,
            ScoreLabel::C => LabelTier::Fair,
            ScoreLabel::D | ScoreLabel::E => LabelTier::Poor,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown score label: {0:?}")]
pub struct ParseLabelError(pub String);

impl FromStr for ScoreLabel {
    type Err = ParseLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScoreLabel::ALL
            .into_iter()
            .find(|label| label.to_string() == s)
            .ok_or_else(|| ParseLabelError(s.to_string()))
    }
}

/// Display grouping used to colour labels in tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelTier {
    Excellent,
    Good,
    Fair,
    Poor,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("attempted questions ({attempted}) cannot exceed the total number of questions ({total})")]
    AttemptedExceedsTotal { total: u32, attempted: u32 },

    #[error("correct answers ({correct}) cannot exceed the number of attempted questions ({attempted})")]
    CorrectExceedsAttempted { attempted: u32, correct: u32 },

    #[error("the total number of questions must be at least 1")]
    NoQuestions,
}

/// Derived fields of a single attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Score {
    pub attempted_percent: f64,
    pub correct_percent: f64,
    pub label: ScoreLabel,
}

/// Check the counts, then compute percentages and the letter grade.
///
/// Inputs are never clamped: `attempted > total`, `correct > attempted`
/// and `total == 0` are all rejected before any ratio is taken.
pub fn score(total: u32, attempted: u32, correct: u32) -> Result<Score, ScoreError> {
    if attempted > total {
        return Err(ScoreError::AttemptedExceedsTotal { total, attempted });
    }
    if correct > attempted {
        return Err(ScoreError::CorrectExceedsAttempted { attempted, correct });
    }
    if total == 0 {
        return Err(ScoreError::NoQuestions);
    }

    let attempted_percent = percent(attempted, total);
    let correct_percent = percent(correct, total);

    Ok(Score {
        attempted_percent,
        correct_percent,
        label: ScoreLabel::from_percent(correct_percent),
    })
}

fn percent(part: u32, total: u32) -> f64 {
    (part as f64 / total as f64) * 100.0
}
