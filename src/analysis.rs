//! Rule-based summary over a window of attempt records.
//!
//! The rules are deliberately coarse: overall performance is a ratio over
//! every question in the window, subjects are ranked by their raw number of
//! correct answers, and the trend only looks at the first and last record.

use serde::Serialize;
use thiserror::Error;

use crate::record::AttemptRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Performance {
    Good,
    Average,
    #[strum(to_string = "Needs Improvement")]
    #[serde(rename = "Needs Improvement")]
    NeedsImprovement,
}

impl Performance {
    /// `ratio` is correct answers over total questions, in `[0, 1]`
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.8 {
            Performance::Good
        } else if ratio > 0.5 {
            Performance::Average
        } else {
            Performance::NeedsImprovement
        }
    }

    pub fn recommendation(&self) -> &'static str {
        match self {
            Performance::NeedsImprovement => {
                "Focus on reviewing the materials and try more exercises."
            }
            Performance::Average => "Keep practicing and improve on weak areas.",
            Performance::Good => "Great job! Keep up the good work!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display)]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Trend {
    pub fn between(first_correct: u32, last_correct: u32) -> Self {
        match last_correct.cmp(&first_correct) {
            std::cmp::Ordering::Greater => Trend::Improving,
            std::cmp::Ordering::Less => Trend::Declining,
            std::cmp::Ordering::Equal => Trend::Stable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub overall_performance: Performance,
    pub best_subject: String,
    pub worst_subject: String,
    pub trend: Trend,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no records to analyze")]
    NoRecords,
    #[error("records contain no questions")]
    NoQuestions,
}

/// Summed correct answers per subject, in first-seen order
pub fn correct_by_subject(records: &[AttemptRecord]) -> Vec<(String, u64)> {
    let mut totals: Vec<(String, u64)> = Vec::new();
    for record in records {
        match totals.iter_mut().find(|(s, _)| *s == record.subject) {
            Some((_, sum)) => *sum += record.correct as u64,
            None => totals.push((record.subject.clone(), record.correct as u64)),
        }
    }
    totals
}

/// Summarize `records` in the order given.
///
/// The trend compares the first and the last element, so callers must pass
/// records in chronological order (oldest first) for "Improving" to mean
/// improvement over time.
pub fn analyze(records: &[AttemptRecord]) -> Result<AnalysisSummary, AnalysisError> {
    let (first, last) = match (records.first(), records.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(AnalysisError::NoRecords),
    };

    let total_correct: u64 = records.iter().map(|r| r.correct as u64).sum();
    let total_questions: u64 = records.iter().map(|r| r.total_questions as u64).sum();
    if total_questions == 0 {
        return Err(AnalysisError::NoQuestions);
    }
    let overall_performance =
        Performance::from_ratio(total_correct as f64 / total_questions as f64);

    let by_subject = correct_by_subject(records);
    // Strict comparisons keep the earliest subject on ties
    let mut best = &by_subject[0];
    let mut worst = &by_subject[0];
    for entry in &by_subject[1..] {
        if entry.1 > best.1 {
            best = entry;
        }
        if entry.1 < worst.1 {
            worst = entry;
        }
    }

    Ok(AnalysisSummary {
        overall_performance,
        best_subject: best.0.clone(),
        worst_subject: worst.0.clone(),
        trend: Trend::between(first.correct, last.correct),
        recommendation: overall_performance.recommendation().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewAttempt;
    use assert_matches::assert_matches;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn rec(subject: &str, correct: u32, total: u32) -> AttemptRecord {
        NewAttempt::new(
            "ana",
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            subject,
            total,
            correct,
            correct,
        )
        .unwrap()
        .into_record(0, Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_two_subjects_in_order() {
        let records = vec![rec("Math", 5, 10), rec("Science", 8, 10)];
        let summary = analyze(&records).unwrap();

        assert_eq!(summary.best_subject, "Science");
        assert_eq!(summary.worst_subject, "Math");
        assert_eq!(summary.overall_performance, Performance::Average);
        assert_eq!(summary.trend, Trend::Improving);
        assert_eq!(
            summary.recommendation,
            "Keep practicing and improve on weak areas."
        );
    }

    #[test]
    fn test_reversed_input_flips_only_trend() {
        let forward = analyze(&[rec("Math", 5, 10), rec("Science", 8, 10)]).unwrap();
        let reversed = analyze(&[rec("Science", 8, 10), rec("Math", 5, 10)]).unwrap();

        assert_eq!(reversed.trend, Trend::Declining);
        assert_eq!(reversed.best_subject, forward.best_subject);
        assert_eq!(reversed.worst_subject, forward.worst_subject);
        assert_eq!(reversed.overall_performance, forward.overall_performance);
    }

    #[test]
    fn test_ties_go_to_first_subject() {
        let records = vec![rec("History", 6, 10), rec("Art", 6, 10)];
        let summary = analyze(&records).unwrap();
        assert_eq!(summary.best_subject, "History");
        assert_eq!(summary.worst_subject, "History");
        assert_eq!(summary.trend, Trend::Stable);
    }

    #[test]
    fn test_subject_sums_are_not_normalized() {
        // Math has the lower rate but more correct answers in total
        let records = vec![rec("Math", 12, 30), rec("Art", 9, 10)];
        let summary = analyze(&records).unwrap();
        assert_eq!(summary.best_subject, "Math");
        assert_eq!(summary.worst_subject, "Art");
    }

    #[test]
    fn test_performance_thresholds_are_strict() {
        assert_eq!(Performance::from_ratio(0.81), Performance::Good);
        assert_eq!(Performance::from_ratio(0.8), Performance::Average);
        assert_eq!(Performance::from_ratio(0.51), Performance::Average);
        assert_eq!(Performance::from_ratio(0.5), Performance::NeedsImprovement);
        assert_eq!(Performance::from_ratio(0.0), Performance::NeedsImprovement);
    }

    #[test]
    fn test_good_and_poor_recommendations() {
        let good = analyze(&[rec("Math", 9, 10), rec("Math", 10, 10)]).unwrap();
        assert_eq!(good.overall_performance, Performance::Good);
        assert_eq!(good.recommendation, "Great job! Keep up the good work!");

        let poor = analyze(&[rec("Math", 2, 10)]).unwrap();
        assert_eq!(poor.overall_performance, Performance::NeedsImprovement);
        assert_eq!(poor.trend, Trend::Stable);
        assert_eq!(
            poor.recommendation,
            "Focus on reviewing the materials and try more exercises."
        );
    }

    #[test]
    fn test_empty_input_rejected() {
        assert_matches!(analyze(&[]), Err(AnalysisError::NoRecords));
    }

    #[test]
    fn test_zero_questions_rejected() {
        let mut r = rec("Math", 0, 1);
        r.total_questions = 0;
        assert_matches!(analyze(&[r]), Err(AnalysisError::NoQuestions));
    }

    #[test]
    fn test_correct_by_subject_keeps_first_seen_order() {
        let records = vec![
            rec("Science", 3, 10),
            rec("Math", 4, 10),
            rec("Science", 5, 10),
        ];
        assert_eq!(
            correct_by_subject(&records),
            vec![("Science".to_string(), 8), ("Math".to_string(), 4)]
        );
    }

    #[test]
    fn test_display_strings() {
        assert_eq!(Performance::NeedsImprovement.to_string(), "Needs Improvement");
        assert_eq!(Trend::Improving.to_string(), "Improving");
    }
}
