// Library surface shared by the binary and the integration tests.
pub mod analysis;
pub mod app;
pub mod app_dirs;
pub mod charts;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod filter;
pub mod form;
pub mod record;
pub mod runtime;
pub mod scoring;
pub mod store;
pub mod ui;

pub use analysis::{analyze, AnalysisError, AnalysisSummary, Performance, Trend};
pub use record::{AttemptRecord, NewAttempt};
pub use scoring::{score, Score, ScoreError, ScoreLabel};
