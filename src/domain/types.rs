//! Shared domain types.
//!
//! These types are plain values so they can be:
//!
//! - produced by one pipeline stage and consumed by the next without sharing state
//! - exported to JSON/CSV
//! - exchanged with the dashboard API (camelCase JSON)

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default upload limit: 100 MB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Why a call leg ended.
///
/// Codes 1, 2 and 3 are the known categories; anything else is kept as
/// `Unknown(code)`. Build values with `from_code` so that known codes never end
/// up inside `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum CloseReason {
    TeBusy,
    SystemBusy,
    Others,
    Unknown(i32),
}

impl CloseReason {
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => CloseReason::TeBusy,
            2 => CloseReason::SystemBusy,
            3 => CloseReason::Others,
            other => CloseReason::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            CloseReason::TeBusy => 1,
            CloseReason::SystemBusy => 2,
            CloseReason::Others => 3,
            CloseReason::Unknown(code) => code,
        }
    }

    /// Counting bucket. Unknown codes are counted as `Others`.
    pub fn category(self) -> ReasonCategory {
        match self {
            CloseReason::TeBusy => ReasonCategory::TeBusy,
            CloseReason::SystemBusy => ReasonCategory::SystemBusy,
            CloseReason::Others | CloseReason::Unknown(_) => ReasonCategory::Others,
        }
    }

    pub fn is_unknown(self) -> bool {
        matches!(self, CloseReason::Unknown(_))
    }
}

impl From<i32> for CloseReason {
    fn from(code: i32) -> Self {
        CloseReason::from_code(code)
    }
}

impl From<CloseReason> for i32 {
    fn from(reason: CloseReason) -> Self {
        reason.code()
    }
}

/// The three counted categories of the summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReasonCategory {
    TeBusy,
    SystemBusy,
    Others,
}

/// One observed call-close event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: u64,
    pub call_date: NaiveDate,
    pub call_time: NaiveTime,
    pub close_reason: CloseReason,
    /// Hour of `call_time` (0–23).
    pub hour_group: u8,
    pub created_at: DateTime<Utc>,
}

impl CallRecord {
    /// Build a record, deriving the hour group from the time of day.
    pub fn new(
        id: u64,
        call_date: NaiveDate,
        call_time: NaiveTime,
        close_reason: CloseReason,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            call_date,
            call_time,
            close_reason,
            hour_group: hour_group_of(call_time),
            created_at,
        }
    }
}

/// Hour-of-day bucket for a time. Depends on the time value only.
pub fn hour_group_of(time: NaiveTime) -> u8 {
    // `NaiveTime::hour` is always < 24.
    time.hour() as u8
}

/// Aggregate over all records sharing a date and hour group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlySummary {
    pub date: NaiveDate,
    pub hour_group: u8,
    pub hour_label: String,
    pub qty: u64,
    pub te_busy: u64,
    pub te_busy_percent: f64,
    pub sys_busy: u64,
    pub sys_busy_percent: f64,
    /// Code 3 plus every unknown code.
    pub others: u64,
    pub others_percent: f64,
    /// How many of `others` carried a code outside {1, 2, 3}.
    #[serde(default)]
    pub unknown: u64,
}

/// Aggregate over the 24 hourly summaries of one date.
///
/// Average percentages are ratio-of-totals, so quiet hours do not drag them
/// towards zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    pub date: NaiveDate,
    pub hourly: Vec<HourlySummary>,
    pub total_qty: u64,
    pub total_te_busy: u64,
    pub total_sys_busy: u64,
    pub total_others: u64,
    #[serde(default)]
    pub total_unknown: u64,
    pub avg_te_busy_percent: f64,
    pub avg_sys_busy_percent: f64,
    pub avg_others_percent: f64,
}

/// Outcome of one CSV ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub total_records: usize,
    pub successful_records: usize,
    pub failed_records: usize,
    /// One entry per failed row, in file order.
    pub errors: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl UploadResult {
    pub fn empty(uploaded_at: DateTime<Utc>) -> Self {
        Self {
            total_records: 0,
            successful_records: 0,
            failed_records: 0,
            errors: Vec::new(),
            uploaded_at,
        }
    }

    pub fn record_success(&mut self) {
        self.total_records += 1;
        self.successful_records += 1;
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.total_records += 1;
        self.failed_records += 1;
        self.errors.push(message.into());
    }
}

/// Whether the first line of an upload is a header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// Skip line 1 only if its first field is not a `YYYYMMDD` date.
    Auto,
    /// Line 1 is always a header.
    Present,
    /// There is no header; line 1 is data.
    Absent,
}

/// Ingestion settings, resolved from defaults, environment and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestConfig {
    pub max_upload_bytes: u64,
    pub header: HeaderMode,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            header: HeaderMode::Auto,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_never_become_unknown() {
        assert_eq!(CloseReason::from_code(1), CloseReason::TeBusy);
        assert_eq!(CloseReason::from_code(2), CloseReason::SystemBusy);
        assert_eq!(CloseReason::from_code(3), CloseReason::Others);
        assert_eq!(CloseReason::from_code(7), CloseReason::Unknown(7));
        assert_eq!(CloseReason::Unknown(7).code(), 7);
    }

    #[test]
    fn unknown_codes_count_as_others() {
        assert_eq!(CloseReason::Unknown(9).category(), ReasonCategory::Others);
        assert!(CloseReason::Unknown(9).is_unknown());
        assert!(!CloseReason::Others.is_unknown());
    }

    #[test]
    fn hour_group_comes_from_time() {
        let t = NaiveTime::from_hms_opt(23, 59, 59).unwrap();
        assert_eq!(hour_group_of(t), 23);
        let t = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        assert_eq!(hour_group_of(t), 0);
    }

    #[test]
    fn close_reason_serializes_as_code() {
        let json = serde_json::to_string(&CloseReason::Unknown(42)).unwrap();
        assert_eq!(json, "42");
        let back: CloseReason = serde_json::from_str("2").unwrap();
        assert_eq!(back, CloseReason::SystemBusy);
    }

    #[test]
    fn upload_result_keeps_counts_consistent() {
        let mut result = UploadResult::empty(Utc::now());
        result.record_success();
        result.record_failure("Row 2: bad");
        result.record_success();
        assert_eq!(result.total_records, 3);
        assert_eq!(result.successful_records + result.failed_records, result.total_records);
        assert_eq!(result.errors, vec!["Row 2: bad".to_string()]);
    }
}
