use chrono::{DateTime, Duration, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use itertools::Itertools;

use crate::config::Roster;
use crate::dashboard::Dashboard;
use crate::filter::{RecordFilter, TimeRange};
use crate::record::AttemptRecord;
use crate::store::{RecordSource, StoreError};

/// Attempts added from another shell show up after at most this long
pub const AUTO_REFRESH_SECS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Dashboard,
    Data,
}

#[derive(Debug, Default)]
pub struct DataTableState {
    pub scroll_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Continue,
    Quit,
}

/// Interactive dashboard state: the current filter window and the full data table
pub struct App {
    source: Box<dyn RecordSource>,
    pub roster: Roster,
    pub state: AppState,
    pub dashboard: Dashboard,
    /// All stored attempts, newest first
    pub rows: Vec<AttemptRecord>,
    pub data_state: DataTableState,
    /// Last failure shown to the user, cleared on the next successful reload
    pub status: Option<String>,
}

impl App {
    pub fn new(
        source: Box<dyn RecordSource>,
        roster: Roster,
        range: TimeRange,
        now: DateTime<Utc>,
    ) -> Result<Self, StoreError> {
        let dashboard = Dashboard::load(source.as_ref(), RecordFilter::new(range), now)?;
        let rows = source.all_newest_first()?;

        Ok(Self {
            source,
            roster,
            state: AppState::Dashboard,
            dashboard,
            rows,
            data_state: DataTableState::default(),
            status: None,
        })
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.dashboard.filter
    }

    fn apply_filter(&mut self, filter: RecordFilter, now: DateTime<Utc>) {
        match self
            .dashboard
            .on_filter_change(self.source.as_ref(), filter, now)
        {
            Ok(()) => self.status = None,
            Err(e) => {
                tracing::error!("reload failed: {e}");
                self.status = Some(format!("reload failed: {e}"));
            }
        }
    }

    pub fn set_range(&mut self, range: TimeRange, now: DateTime<Utc>) {
        let filter = RecordFilter {
            range,
            ..self.filter().clone()
        };
        self.apply_filter(filter, now);
    }

    /// Persons the filter cycles through: the roster, or whoever has data
    pub fn person_choices(&self) -> Vec<String> {
        if !self.roster.persons.is_empty() {
            return self.roster.persons.clone();
        }
        self.rows
            .iter()
            .map(|r| r.person.clone())
            .unique()
            .sorted()
            .collect()
    }

    /// all -> first person -> ... -> last person -> all
    pub fn cycle_person(&mut self, now: DateTime<Utc>) {
        let choices = self.person_choices();
        let next = match &self.filter().person {
            None => choices.first().cloned(),
            Some(current) => choices
                .iter()
                .position(|p| p == current)
                .and_then(|i| choices.get(i + 1))
                .cloned(),
        };
        let filter = self.filter().clone().with_person(next);
        self.apply_filter(filter, now);
    }

    pub fn refresh(&mut self, now: DateTime<Utc>) {
        match self.source.all_newest_first() {
            Ok(rows) => self.rows = rows,
            Err(e) => {
                tracing::error!("reload failed: {e}");
                self.status = Some(format!("reload failed: {e}"));
                return;
            }
        }
        let filter = self.filter().clone();
        self.apply_filter(filter, now);
    }

    /// Reload once the dashboard is older than [`AUTO_REFRESH_SECS`]; true if it did
    pub fn on_tick(&mut self, now: DateTime<Utc>) -> bool {
        if now - self.dashboard.loaded_at < Duration::seconds(AUTO_REFRESH_SECS) {
            return false;
        }
        self.refresh(now);
        true
    }

    pub fn toggle_data(&mut self) {
        self.state = match self.state {
            AppState::Dashboard => AppState::Data,
            AppState::Data => AppState::Dashboard,
        };
        self.data_state.scroll_offset = 0;
    }

    pub fn on_key(&mut self, key: KeyEvent, now: DateTime<Utc>) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return KeyOutcome::Quit;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return KeyOutcome::Quit,
            KeyCode::Char('d') | KeyCode::Tab => self.toggle_data(),
            KeyCode::Char('r') => self.refresh(now),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = c as usize - '1' as usize;
                self.set_range(TimeRange::ALL[idx], now);
            }
            KeyCode::Char('p') => self.cycle_person(now),
            _ if self.state == AppState::Data => self.on_table_key(key.code),
            _ => {}
        }
        KeyOutcome::Continue
    }

    // Upper bound is clamped at render time, when the table height is known
    fn on_table_key(&mut self, code: KeyCode) {
        let offset = &mut self.data_state.scroll_offset;
        match code {
            KeyCode::Up => *offset = offset.saturating_sub(1),
            KeyCode::Down => *offset += 1,
            KeyCode::PageUp => *offset = offset.saturating_sub(10),
            KeyCode::PageDown => *offset += 10,
            KeyCode::Home => *offset = 0,
            _ => {}
        }
    }
}
