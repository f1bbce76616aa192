//! Filter change -> fetch -> analyze -> render.
//!
//! Every stage is a plain function so the UI, the CLI and the tests drive
//! the same pipeline.

use chrono::{DateTime, Utc};

use crate::analysis::{analyze, AnalysisError, AnalysisSummary};
use crate::charts::ChartData;
use crate::filter::RecordFilter;
use crate::record::{sort_chronologically, AttemptRecord};
use crate::store::{RecordSource, StoreError};

/// Fetch the window and put it in chronological (oldest-first) order
pub fn fetch<S: RecordSource + ?Sized>(
    source: &S,
    filter: &RecordFilter,
    now: DateTime<Utc>,
) -> Result<Vec<AttemptRecord>, StoreError> {
    let mut records = source.fetch(filter, now)?;
    sort_chronologically(&mut records);
    Ok(records)
}

/// Run the analysis, producing nothing for an empty or degenerate window
pub fn summarize(records: &[AttemptRecord]) -> Option<AnalysisSummary> {
    match analyze(records) {
        Ok(summary) => Some(summary),
        Err(AnalysisError::NoRecords) => None,
        Err(e) => {
            tracing::warn!(records = records.len(), "skipping analysis: {e}");
            None
        }
    }
}

/// Everything the dashboard shows for one filter
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub filter: RecordFilter,
    pub records: Vec<AttemptRecord>,
    pub summary: Option<AnalysisSummary>,
    pub charts: ChartData,
    pub loaded_at: DateTime<Utc>,
}

impl Dashboard {
    pub fn load<S: RecordSource + ?Sized>(
        source: &S,
        filter: RecordFilter,
        now: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let records = fetch(source, &filter, now)?;
        let summary = summarize(&records);
        let charts = ChartData::from_records(&records);
        tracing::debug!(
            range = %filter.range,
            person = filter.person.as_deref().unwrap_or("all"),
            records = records.len(),
            "dashboard reloaded"
        );

        Ok(Self {
            filter,
            records,
            summary,
            charts,
            loaded_at: now,
        })
    }

    /// Recompute from scratch for `filter`; on error the current state is kept
    pub fn on_filter_change<S: RecordSource + ?Sized>(
        &mut self,
        source: &S,
        filter: RecordFilter,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        *self = Self::load(source, filter, now)?;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
