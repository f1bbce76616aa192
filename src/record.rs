use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::scoring::{score, ScoreError, ScoreLabel};

/// Date format used for attempt dates, both on input and in storage
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated attempt that has not been persisted yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub person: String,
    pub date: NaiveDate,
    pub subject: String,
    pub total_questions: u32,
    pub attempted: u32,
    pub correct: u32,
    pub attempted_percent: f64,
    pub correct_percent: f64,
    pub score_label: ScoreLabel,
}

impl NewAttempt {
    /// Score the counts and build the attempt; invalid counts never produce one.
    pub fn new(
        person: impl Into<String>,
        date: NaiveDate,
        subject: impl Into<String>,
        total_questions: u32,
        attempted: u32,
        correct: u32,
    ) -> Result<Self, ScoreError> {
        let s = score(total_questions, attempted, correct)?;
        Ok(Self {
            person: person.into(),
            date,
            subject: subject.into(),
            total_questions,
            attempted,
            correct,
            attempted_percent: s.attempted_percent,
            correct_percent: s.correct_percent,
            score_label: s.label,
        })
    }

    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> AttemptRecord {
        AttemptRecord {
            id,
            person: self.person,
            date: self.date,
            subject: self.subject,
            total_questions: self.total_questions,
            attempted: self.attempted,
            attempted_percent: self.attempted_percent,
            correct: self.correct,
            correct_percent: self.correct_percent,
            score_label: self.score_label,
            created_at,
        }
    }
}

/// One stored quiz session for a person, subject and date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttemptRecord {
    #[serde(skip)]
    pub id: i64,
    pub person: String,
    pub date: NaiveDate,
    pub subject: String,
    pub total_questions: u32,
    pub attempted: u32,
    pub attempted_percent: f64,
    pub correct: u32,
    pub correct_percent: f64,
    pub score_label: ScoreLabel,
    pub created_at: DateTime<Utc>,
}

/// Sort oldest-first by attempt date, then by store timestamp.
pub fn sort_chronologically(records: &mut [AttemptRecord]) {
    records.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(a.created_at.cmp(&b.created_at))
            .then(a.id.cmp(&b.id))
    });
}
