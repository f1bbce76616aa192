use chrono::{DateTime, Duration, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, params_from_iter, types::Type, Connection, Row};
use std::path::Path;
use thiserror::Error;

use crate::filter::RecordFilter;
use crate::record::{AttemptRecord, NewAttempt, DATE_FORMAT};
use crate::scoring::ScoreLabel;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to create database directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Read side of the attempt store
pub trait RecordSource {
    /// Attempts matching `filter` as of `now`, oldest first
    fn fetch(
        &self,
        filter: &RecordFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<AttemptRecord>, StoreError>;

    /// Every stored attempt, newest first
    fn all_newest_first(&self) -> Result<Vec<AttemptRecord>, StoreError>;
}

/// Write side of the attempt store; the store assigns `created_at`
pub trait RecordSink {
    fn insert(&mut self, attempt: NewAttempt) -> Result<AttemptRecord, StoreError>;
}

/// Timestamps are stored at microsecond precision; a write never reuses or
/// goes behind the latest stored timestamp.
fn next_timestamp(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = now.trunc_subsecs(6);
    match last {
        Some(last) if now <= last => last + Duration::microseconds(1),
        _ => now,
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

const SELECT_COLUMNS: &str = r#"
    SELECT id, person, date, subject, total_questions, attempted, attempted_percent,
           correct, correct_percent, score_label, created_at
    FROM progress_data
"#;

/// SQLite-backed attempt store
#[derive(Debug)]
pub struct ProgressDb {
    conn: Connection,
}

impl ProgressDb {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS progress_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                person TEXT NOT NULL,
                date TEXT NOT NULL,
                subject TEXT NOT NULL,
                total_questions INTEGER NOT NULL,
                attempted INTEGER NOT NULL,
                attempted_percent REAL NOT NULL,
                correct INTEGER NOT NULL,
                correct_percent REAL NOT NULL,
                score_label TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_progress_data_created_at ON progress_data(created_at)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_progress_data_person ON progress_data(person)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_progress_data_subject ON progress_data(subject)",
            [],
        )?;

        Ok(ProgressDb { conn })
    }

    fn latest_created_at(&self) -> Result<Option<DateTime<Utc>>, StoreError> {
        let latest: Option<String> =
            self.conn
                .query_row("SELECT MAX(created_at) FROM progress_data", [], |row| {
                    row.get(0)
                })?;

        latest
            .map(|s| parse_timestamp(&s, 0))
            .transpose()
            .map_err(StoreError::from)
    }

    /// Persist `attempt` with a timestamp derived from `now`
    pub fn insert_at(
        &mut self,
        attempt: NewAttempt,
        now: DateTime<Utc>,
    ) -> Result<AttemptRecord, StoreError> {
        let created_at = next_timestamp(self.latest_created_at()?, now);

        self.conn.execute(
            r#"
            INSERT INTO progress_data
            (person, date, subject, total_questions, attempted, attempted_percent,
             correct, correct_percent, score_label, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                attempt.person,
                attempt.date.format(DATE_FORMAT).to_string(),
                attempt.subject,
                attempt.total_questions,
                attempt.attempted,
                attempt.attempted_percent,
                attempt.correct,
                attempt.correct_percent,
                attempt.score_label.to_string(),
                format_timestamp(&created_at),
            ],
        )?;

        let record = attempt.into_record(self.conn.last_insert_rowid(), created_at);
        tracing::info!(
            id = record.id,
            person = %record.person,
            subject = %record.subject,
            label = %record.score_label,
            "stored attempt"
        );
        Ok(record)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM progress_data", [], |row| row.get(0))?;
        Ok(count)
    }
}

impl RecordSink for ProgressDb {
    fn insert(&mut self, attempt: NewAttempt) -> Result<AttemptRecord, StoreError> {
        self.insert_at(attempt, Utc::now())
    }
}

impl RecordSource for ProgressDb {
    fn fetch(
        &self,
        filter: &RecordFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<AttemptRecord>, StoreError> {
        let mut sql = format!("{SELECT_COLUMNS} WHERE created_at >= ?");
        let mut values = vec![format_timestamp(&filter.range.start(now))];

        if let Some(person) = &filter.person {
            sql.push_str(" AND person = ?");
            values.push(person.clone());
        }
        if !filter.subjects.is_empty() {
            let placeholders = vec!["?"; filter.subjects.len()].join(", ");
            sql.push_str(&format!(" AND subject IN ({placeholders})"));
            values.extend(filter.subjects.iter().cloned());
        }
        sql.push_str(" ORDER BY created_at ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(values.iter()), row_to_record)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        tracing::debug!(
            range = %filter.range,
            count = records.len(),
            "fetched attempts"
        );
        Ok(records)
    }

    fn all_newest_first(&self) -> Result<Vec<AttemptRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} ORDER BY created_at DESC, id DESC"))?;
        let rows = stmt.query_map([], row_to_record)?;

        let mut records = Vec::new();
        for record in rows {
            records.push(record?);
        }
        Ok(records)
    }
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_timestamp(s: &str, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn row_to_record(row: &Row<'_>) -> Result<AttemptRecord, rusqlite::Error> {
    let date: String = row.get(2)?;
    let label: String = row.get(9)?;
    let created_at: String = row.get(10)?;

    Ok(AttemptRecord {
        id: row.get(0)?,
        person: row.get(1)?,
        date: NaiveDate::parse_from_str(&date, DATE_FORMAT).map_err(|e| conversion_error(2, e))?,
        subject: row.get(3)?,
        total_questions: row.get(4)?,
        attempted: row.get(5)?,
        attempted_percent: row.get(6)?,
        correct: row.get(7)?,
        correct_percent: row.get(8)?,
        score_label: label
            .parse::<ScoreLabel>()
            .map_err(|e| conversion_error(9, e))?,
        created_at: parse_timestamp(&created_at, 10)?,
    })
}

/// In-memory attempt store for tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Vec<AttemptRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_at(&mut self, attempt: NewAttempt, now: DateTime<Utc>) -> AttemptRecord {
        let last = self.records.last().map(|r| r.created_at);
        let record = attempt.into_record(
            self.records.len() as i64 + 1,
            next_timestamp(last, now),
        );
        self.records.push(record.clone());
        record
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordSink for MemoryStore {
    fn insert(&mut self, attempt: NewAttempt) -> Result<AttemptRecord, StoreError> {
        Ok(self.insert_at(attempt, Utc::now()))
    }
}

impl RecordSource for MemoryStore {
    fn fetch(
        &self,
        filter: &RecordFilter,
        now: DateTime<Utc>,
    ) -> Result<Vec<AttemptRecord>, StoreError> {
        Ok(self
            .records
            .iter()
            .filter(|r| filter.matches(r, now))
            .cloned()
            .collect())
    }

    fn all_newest_first(&self) -> Result<Vec<AttemptRecord>, StoreError> {
        Ok(self.records.iter().rev().cloned().collect())
    }
}
