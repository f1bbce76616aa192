use std::io::Write;
use thiserror::Error;

use crate::record::AttemptRecord;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write CSV: {0}")]
    Io(#[from] std::io::Error),
}

/// Write `records` as CSV with a camelCase header row; returns the row count
pub fn write_csv<W: Write>(records: &[AttemptRecord], writer: W) -> Result<usize, ExportError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(records.len())
}
