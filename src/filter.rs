use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::record::AttemptRecord;

/// Window of recent attempts fed into the dashboard and the analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "2weeks")]
    TwoWeeks,
    #[serde(rename = "1month")]
    OneMonth,
    #[serde(rename = "3months")]
    ThreeMonths,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::SevenDays,
        TimeRange::TwoWeeks,
        TimeRange::OneMonth,
        TimeRange::ThreeMonths,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            TimeRange::SevenDays => "7days",
            TimeRange::TwoWeeks => "2weeks",
            TimeRange::OneMonth => "1month",
            TimeRange::ThreeMonths => "3months",
        }
    }

    /// Human readable name, e.g. for the dashboard header
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::SevenDays => "7 Days",
            TimeRange::TwoWeeks => "2 Weeks",
            TimeRange::OneMonth => "1 Month",
            TimeRange::ThreeMonths => "3 Months",
        }
    }

    /// Earliest `createdAt` still inside the window ending at `now`.
    /// Month windows use calendar months, clamped to the end of shorter months.
    pub fn start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            TimeRange::SevenDays => now - Duration::days(7),
            TimeRange::TwoWeeks => now - Duration::days(14),
            TimeRange::OneMonth => now
                .checked_sub_months(Months::new(1))
                .unwrap_or(now - Duration::days(30)),
            TimeRange::ThreeMonths => now
                .checked_sub_months(Months::new(3))
                .unwrap_or(now - Duration::days(91)),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown time range {0:?} (expected one of 7days, 2weeks, 1month, 3months)")]
pub struct ParseRangeError(pub String);

impl FromStr for TimeRange {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeRange::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| ParseRangeError(s.to_string()))
    }
}

/// Selection applied to the stored attempts before analysis
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub range: TimeRange,
    pub person: Option<String>,
    /// Empty means every subject
    pub subjects: Vec<String>,
}

impl RecordFilter {
    pub fn new(range: TimeRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    pub fn with_person(mut self, person: Option<String>) -> Self {
        self.person = person;
        self
    }

    pub fn with_subjects(mut self, subjects: Vec<String>) -> Self {
        self.subjects = subjects;
        self
    }

    pub fn matches(&self, record: &AttemptRecord, now: DateTime<Utc>) -> bool {
        record.created_at >= self.range.start(now)
            && self.person.as_ref().map_or(true, |p| *p == record.person)
            && (self.subjects.is_empty() || self.subjects.contains(&record.subject))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NewAttempt;
    use chrono::{NaiveDate, TimeZone};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn rec(person: &str, subject: &str, created_at: DateTime<Utc>) -> AttemptRecord {
        NewAttempt::new(
            person,
            created_at.date_naive(),
            subject,
            10,
            5,
            5,
        )
        .unwrap()
        .into_record(1, created_at)
    }

    #[test]
    fn test_range_starts() {
        let now = at(2024, 3, 31);
        assert_eq!(TimeRange::SevenDays.start(now), at(2024, 3, 24));
        assert_eq!(TimeRange::TwoWeeks.start(now), at(2024, 3, 17));
        // Clamped to the last day of February in a leap year
        assert_eq!(TimeRange::OneMonth.start(now), at(2024, 2, 29));
        assert_eq!(TimeRange::ThreeMonths.start(now), at(2023, 12, 31));
    }

    #[test]
    fn test_range_parse_and_display() {
        for range in TimeRange::ALL {
            assert_eq!(range.to_string().parse::<TimeRange>().unwrap(), range);
        }
        assert_eq!("2weeks".parse::<TimeRange>().unwrap(), TimeRange::TwoWeeks);
        assert!("1year".parse::<TimeRange>().is_err());
        assert_eq!(TimeRange::default(), TimeRange::SevenDays);
    }

    #[test]
    fn test_range_serde_keys() {
        let json = serde_json::to_string(&TimeRange::ThreeMonths).unwrap();
        assert_eq!(json, "\"3months\"");
    }

    #[test]
    fn test_filter_window_is_inclusive() {
        let now = at(2024, 5, 10);
        let filter = RecordFilter::new(TimeRange::SevenDays);
        assert!(filter.matches(&rec("ana", "Math", at(2024, 5, 3)), now));
        assert!(!filter.matches(&rec("ana", "Math", at(2024, 5, 2)), now));
    }

    #[test]
    fn test_filter_person_and_subjects() {
        let now = at(2024, 5, 10);
        let filter = RecordFilter::new(TimeRange::TwoWeeks)
            .with_person(Some("ana".to_string()))
            .with_subjects(vec!["Math".to_string(), "Art".to_string()]);

        assert!(filter.matches(&rec("ana", "Math", at(2024, 5, 9)), now));
        assert!(filter.matches(&rec("ana", "Art", at(2024, 5, 9)), now));
        assert!(!filter.matches(&rec("ben", "Math", at(2024, 5, 9)), now));
        assert!(!filter.matches(&rec("ana", "Science", at(2024, 5, 9)), now));
    }

    #[test]
    fn test_record_date_is_independent_of_window() {
        // The window is on createdAt; a back-dated attempt entered today still counts
        let now = at(2024, 5, 10);
        let mut r = rec("ana", "Math", at(2024, 5, 10));
        r.date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(RecordFilter::new(TimeRange::SevenDays).matches(&r, now));
    }
}
