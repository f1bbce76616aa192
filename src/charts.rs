use itertools::Itertools;

use crate::analysis::correct_by_subject;
use crate::record::AttemptRecord;

/// Series shown on the dashboard, derived from one window of records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartData {
    /// (date label, correct) per record, in the order given
    pub correct_over_time: Vec<(String, u32)>,
    /// Summed correct answers per subject, first-seen order
    pub by_subject: Vec<(String, u64)>,
    /// Share of all correct answers per subject, in percent
    pub distribution: Vec<(String, f64)>,
    /// (attempted, correct) per record
    pub attempted_vs_correct: Vec<(f64, f64)>,
}

impl ChartData {
    pub fn from_records(records: &[AttemptRecord]) -> Self {
        let by_subject = correct_by_subject(records);
        let total: u64 = by_subject.iter().map(|(_, c)| c).sum();
        let distribution = by_subject
            .iter()
            .map(|(subject, correct)| {
                let share = if total == 0 {
                    0.0
                } else {
                    *correct as f64 / total as f64 * 100.0
                };
                (subject.clone(), share)
            })
            .collect();

        Self {
            correct_over_time: records
                .iter()
                .map(|r| (r.date.to_string(), r.correct))
                .collect(),
            by_subject,
            distribution,
            attempted_vs_correct: records
                .iter()
                .map(|r| (r.attempted as f64, r.correct as f64))
                .collect(),
        }
    }

    /// Line chart points with x as the 1-based position in the series
    pub fn line_points(&self) -> Vec<(f64, f64)> {
        self.correct_over_time
            .iter()
            .enumerate()
            .map(|(i, (_, correct))| ((i + 1) as f64, *correct as f64))
            .collect()
    }

    /// Distinct dates in the series, in order of appearance
    pub fn dates(&self) -> Vec<&str> {
        self.correct_over_time
            .iter()
            .map(|(d, _)| d.as_str())
            .unique()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.correct_over_time.is_empty()
    }
}
