//! Hourly bucketing: records of one date → 24 `HourlySummary` entries.

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{CallRecord, CloseReason, HourlySummary, ReasonCategory};
use crate::error::InvariantViolation;

pub const HOURS_PER_DAY: usize = 24;

/// Running counters for one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReasonCounts {
    pub qty: u64,
    pub te_busy: u64,
    pub sys_busy: u64,
    pub others: u64,
    pub unknown: u64,
}

impl ReasonCounts {
    pub fn add(&mut self, reason: CloseReason) {
        self.qty += 1;
        match reason.category() {
            ReasonCategory::TeBusy => self.te_busy += 1,
            ReasonCategory::SystemBusy => self.sys_busy += 1,
            ReasonCategory::Others => self.others += 1,
        }
        if reason.is_unknown() {
            self.unknown += 1;
        }
    }
}

/// Bucket records of `date` by their stored hour group.
///
/// Always returns 24 entries, hours 0..=23 in order; empty hours are all zeros.
/// Records dated otherwise belong to another summary and are skipped. A record
/// of `date` with an hour group past 23 is an `InvariantViolation`.
pub fn bucket_by_hour(date: NaiveDate, records: &[CallRecord]) -> Result<Vec<HourlySummary>, InvariantViolation> {
    let mut counts = [ReasonCounts::default(); HOURS_PER_DAY];

    for rec in records {
        if rec.call_date != date {
            debug!(id = rec.id, record_date = %rec.call_date, %date, "record outside summary date skipped");
            continue;
        }
        let bucket = counts
            .get_mut(rec.hour_group as usize)
            .ok_or(InvariantViolation::HourOutOfRange(rec.hour_group))?;
        bucket.add(rec.close_reason);
    }

    Ok(counts
        .iter()
        .enumerate()
        .map(|(hour, c)| hourly_summary(date, hour as u8, c))
        .collect())
}

pub fn hourly_summary(date: NaiveDate, hour: u8, counts: &ReasonCounts) -> HourlySummary {
    HourlySummary {
        date,
        hour_group: hour,
        hour_label: hour_label(hour),
        qty: counts.qty,
        te_busy: counts.te_busy,
        te_busy_percent: percent(counts.te_busy, counts.qty),
        sys_busy: counts.sys_busy,
        sys_busy_percent: percent(counts.sys_busy, counts.qty),
        others: counts.others,
        others_percent: percent(counts.others, counts.qty),
        unknown: counts.unknown,
    }
}

/// `"08:00 - 09:00"`; the last hour reads `"23:00 - 24:00"`.
pub fn hour_label(hour: u8) -> String {
    format!("{:02}:00 - {:02}:00", hour, u32::from(hour) + 1)
}

/// `100 * part / whole`, one decimal place. Zero when `whole` is zero.
pub fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = 100.0 * part as f64 / whole as f64;
    (raw * 10.0).round() / 10.0
}
