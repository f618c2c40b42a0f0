//! Error types.
//!
//! - `AppError`: what the binary reports (message + process exit code)
//! - typed pipeline errors (`RowParseError`, `FileTooLargeError`,
//!   `InvariantViolation`, `IngestError`, `StoreError`) that library callers
//!   can match on
//!
//! Exit codes: 2 = input/config, 3 = no data, 4 = internal.

use std::path::PathBuf;

use chrono::NaiveDate;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// A single CSV row that could not be turned into a call record.
///
/// Every kind carries the 1-based row number and the raw line so the source
/// data can be located and fixed. The `Display` form is what ends up in
/// `UploadResult::errors`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowParseError {
    #[error("Row {row}: expected at least 3 columns (date, time, close reason), found {found}")]
    MissingColumns { row: usize, line: String, found: usize },

    #[error("Row {row}: invalid date '{value}' (expected YYYYMMDD)")]
    InvalidDate { row: usize, line: String, value: String },

    #[error("Row {row}: invalid time '{value}' (expected HH:mm:ss)")]
    InvalidTime { row: usize, line: String, value: String },

    #[error("Row {row}: close reason '{value}' is not an integer")]
    InvalidCloseReason { row: usize, line: String, value: String },

    #[error("Row {row}: unreadable CSV row: {message}")]
    Malformed { row: usize, line: String, message: String },
}

impl RowParseError {
    pub fn row(&self) -> usize {
        match self {
            RowParseError::MissingColumns { row, .. }
            | RowParseError::InvalidDate { row, .. }
            | RowParseError::InvalidTime { row, .. }
            | RowParseError::InvalidCloseReason { row, .. }
            | RowParseError::Malformed { row, .. } => *row,
        }
    }

    /// Raw line content as it appeared in the upload.
    pub fn line(&self) -> &str {
        match self {
            RowParseError::MissingColumns { line, .. }
            | RowParseError::InvalidDate { line, .. }
            | RowParseError::InvalidTime { line, .. }
            | RowParseError::InvalidCloseReason { line, .. }
            | RowParseError::Malformed { line, .. } => line,
        }
    }
}

/// The whole upload was rejected before any row was looked at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("File is too large: {size} bytes exceeds the {limit} byte limit")]
pub struct FileTooLargeError {
    pub size: u64,
    pub limit: u64,
}

/// Broken aggregation contract. These indicate a bug in the pipeline, not bad input.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    #[error("expected {expected} hourly entries, found {found}")]
    WrongHourCount { expected: usize, found: usize },

    #[error("hour {0} appears more than once")]
    DuplicateHour(u8),

    #[error("hour {0} is outside 0..=23")]
    HourOutOfRange(u8),

    #[error("hourly entry for {found} passed to the summary for {expected}")]
    DateMismatch { expected: NaiveDate, found: NaiveDate },

    #[error("hour {hour}: category counts sum to {sum}, qty is {qty}")]
    CountMismatch { hour: u8, qty: u64, sum: u64 },
}

/// Whole-upload failure: the file could not be read or accepted, or the
/// store refused the parsed records.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error(transparent)]
    TooLarge(#[from] FileTooLargeError),

    #[error("Failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure reported by a `RecordStore` collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    #[error("store configuration error: {0}")]
    Config(String),

    #[error("record store lock poisoned")]
    Poisoned,
}

impl From<FileTooLargeError> for AppError {
    fn from(e: FileTooLargeError) -> Self {
        AppError::new(2, e.to_string())
    }
}

impl From<IngestError> for AppError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::Store(inner) => inner.into(),
            other => AppError::new(2, other.to_string()),
        }
    }
}

impl From<InvariantViolation> for AppError {
    fn from(e: InvariantViolation) -> Self {
        AppError::new(4, format!("Aggregation invariant violated: {e}"))
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Invariant(inner) => inner.into(),
            StoreError::Config(message) => AppError::new(2, format!("store configuration error: {message}")),
            other => AppError::new(4, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_error_display_leads_with_row_number() {
        let err = RowParseError::InvalidTime {
            row: 7,
            line: "20240115,25:00:00,1".to_string(),
            value: "25:00:00".to_string(),
        };
        assert_eq!(err.row(), 7);
        assert_eq!(err.line(), "20240115,25:00:00,1");
        assert!(err.to_string().starts_with("Row 7: invalid time"));
    }

    #[test]
    fn invariant_violation_maps_to_internal_exit_code() {
        let app: AppError = InvariantViolation::DuplicateHour(3).into();
        assert_eq!(app.exit_code(), 4);

        let app: AppError = FileTooLargeError { size: 10, limit: 5 }.into();
        assert_eq!(app.exit_code(), 2);
    }
}
