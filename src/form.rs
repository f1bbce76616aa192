use chrono::NaiveDate;
use thiserror::Error;

use crate::config::Roster;
use crate::record::{AttemptRecord, NewAttempt, DATE_FORMAT};
use crate::scoring::ScoreError;
use crate::store::{RecordSink, StoreError};

/// Raw values as entered by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub person: String,
    /// `YYYY-MM-DD`; today when absent
    pub date: Option<String>,
    pub subject: String,
    pub total: u32,
    pub attempted: u32,
    pub correct: u32,
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error("person must not be empty")]
    MissingPerson,
    #[error("subject must not be empty")]
    MissingSubject,
    #[error("unknown person {0:?}; choose one of the configured persons")]
    UnknownPerson(String),
    #[error("unknown subject {0:?}; choose one of the configured subjects")]
    UnknownSubject(String),
    #[error("invalid date {0:?}; expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error("failed to save attempt: {0}")]
    Store(#[from] StoreError),
}

impl FormError {
    /// Errors the user can fix by correcting the input
    pub fn is_validation(&self) -> bool {
        !matches!(self, FormError::Store(_))
    }
}

fn check_name(
    value: &str,
    open: bool,
    known: impl Fn(&str) -> bool,
    missing: FormError,
    unknown: fn(String) -> FormError,
) -> Result<String, FormError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(missing);
    }
    if open {
        tracing::warn!("no names configured; accepting {value:?} as entered");
    } else if !known(value) {
        return Err(unknown(value.to_string()));
    }
    Ok(value.to_string())
}

/// Validate `input` against the roster and the counting rules
pub fn validate(
    input: &FormInput,
    roster: &Roster,
    today: NaiveDate,
) -> Result<NewAttempt, FormError> {
    let person = check_name(
        &input.person,
        roster.persons.is_empty(),
        |name| roster.has_person(name),
        FormError::MissingPerson,
        FormError::UnknownPerson,
    )?;
    let subject = check_name(
        &input.subject,
        roster.subjects.is_empty(),
        |name| roster.has_subject(name),
        FormError::MissingSubject,
        FormError::UnknownSubject,
    )?;

    let date = match input.date.as_deref().map(str::trim) {
        None | Some("") => today,
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map_err(|_| FormError::InvalidDate(raw.to_string()))?,
    };

    Ok(NewAttempt::new(
        person,
        date,
        subject,
        input.total,
        input.attempted,
        input.correct,
    )?)
}

/// Validate and persist; nothing is written when validation fails
pub fn submit<S: RecordSink + ?Sized>(
    input: &FormInput,
    roster: &Roster,
    sink: &mut S,
    today: NaiveDate,
) -> Result<AttemptRecord, FormError> {
    let attempt = validate(input, roster, today)?;
    Ok(sink.insert(attempt)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoreLabel;
    use crate::store::MemoryStore;
    use assert_matches::assert_matches;

    fn roster() -> Roster {
        Roster::from_csv_lists("ana,ben", "Math,Science")
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn input() -> FormInput {
        FormInput {
            person: "ana".into(),
            date: Some("2024-05-09".into()),
            subject: "Math".into(),
            total: 20,
            attempted: 16,
            correct: 14,
        }
    }

    #[test]
    fn test_valid_submission_is_stored() {
        let mut store = MemoryStore::new();
        let record = submit(&input(), &roster(), &mut store, today()).unwrap();

        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 5, 9).unwrap());
        assert_eq!(record.attempted_percent, 80.0);
        assert_eq!(record.correct_percent, 70.0);
        assert_eq!(record.score_label, ScoreLabel::B);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_date_defaults_to_today() {
        let mut form = input();
        form.date = None;
        let attempt = validate(&form, &roster(), today()).unwrap();
        assert_eq!(attempt.date, today());
    }

    #[test]
    fn test_count_violations_write_nothing() {
        let mut store = MemoryStore::new();

        let mut form = input();
        form.attempted = 21;
        assert_matches!(
            submit(&form, &roster(), &mut store, today()),
            Err(FormError::Score(ScoreError::AttemptedExceedsTotal { .. }))
        );

        let mut form = input();
        form.correct = 17;
        assert_matches!(
            submit(&form, &roster(), &mut store, today()),
            Err(FormError::Score(ScoreError::CorrectExceedsAttempted { .. }))
        );

        let mut form = input();
        form.total = 0;
        form.attempted = 0;
        form.correct = 0;
        assert_matches!(
            submit(&form, &roster(), &mut store, today()),
            Err(FormError::Score(ScoreError::NoQuestions))
        );

        assert!(store.is_empty());
    }

    #[test]
    fn test_roster_is_enforced() {
        let mut form = input();
        form.person = "zed".into();
        assert_matches!(
            validate(&form, &roster(), today()),
            Err(FormError::UnknownPerson(p)) if p == "zed"
        );

        let mut form = input();
        form.subject = "Art".into();
        assert_matches!(
            validate(&form, &roster(), today()),
            Err(FormError::UnknownSubject(_))
        );

        let mut form = input();
        form.person = "  ".into();
        assert_matches!(
            validate(&form, &roster(), today()),
            Err(FormError::MissingPerson)
        );
    }

    #[test]
    fn test_rejected_names_and_dates_write_nothing() {
        let mut store = MemoryStore::new();

        let mut form = input();
        form.person = "zed".into();
        assert_matches!(
            submit(&form, &roster(), &mut store, today()),
            Err(FormError::UnknownPerson(_))
        );

        let mut form = input();
        form.subject = "Art".into();
        assert_matches!(
            submit(&form, &roster(), &mut store, today()),
            Err(FormError::UnknownSubject(_))
        );

        let mut form = input();
        form.date = Some("2024-13-01".into());
        assert_matches!(
            submit(&form, &roster(), &mut store, today()),
            Err(FormError::InvalidDate(_))
        );

        assert!(store.is_empty());
    }

    #[test]
    fn test_store_failure_is_not_a_validation_error() {
        let err = FormError::from(StoreError::Io(std::io::Error::other("disk full")));
        assert!(!err.is_validation());
        assert!(FormError::MissingSubject.is_validation());
    }

    #[test]
    fn test_empty_roster_accepts_any_name() {
        let mut form = input();
        form.subject = "Art".into();
        let attempt = validate(&form, &Roster::default(), today()).unwrap();
        assert_eq!(attempt.subject, "Art");
    }

    #[test]
    fn test_bad_date_rejected() {
        let mut form = input();
        form.date = Some("09/05/2024".into());
        let err = validate(&form, &roster(), today()).unwrap_err();
        assert_matches!(err, FormError::InvalidDate(_));
        assert!(err.is_validation());
    }
}
