//! Read/write daily summary JSON files.
//!
//! Summary JSON is the portable form of one day's aggregation, using the same
//! camelCase shape the dashboard API serves. It can be reloaded later and
//! printed without the source records.

use std::fs::File;
use std::path::Path;

use crate::aggregate::aggregate_daily;
use crate::domain::DailySummary;
use crate::error::AppError;

/// Write a summary JSON file.
pub fn write_summary_json(path: &Path, summary: &DailySummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary JSON: {e}")))?;

    Ok(())
}

/// Read a summary JSON file.
///
/// Totals are recomputed from the hourly entries, so a hand-edited file with
/// stale totals is corrected and a structurally broken one is refused.
pub fn read_summary_json(path: &Path) -> Result<DailySummary, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open summary JSON '{}': {e}", path.display())))?;
    let summary: DailySummary =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid summary JSON: {e}")))?;

    aggregate_daily(summary.date, summary.hourly)
        .map_err(|e| AppError::new(2, format!("Inconsistent summary JSON '{}': {e}", path.display())))
}
