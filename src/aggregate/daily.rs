//! Daily aggregation: 24 hourly entries → one `DailySummary`.

use chrono::{Days, NaiveDate};
use rayon::prelude::*;
use tracing::debug;

use crate::aggregate::hourly::{HOURS_PER_DAY, bucket_by_hour, percent};
use crate::domain::{CallRecord, DailySummary, HourlySummary};
use crate::error::InvariantViolation;

/// Fold the hourly entries of `date` into a daily summary.
///
/// The entries must be exactly hours 0..=23 of `date`, each internally
/// consistent. Anything else is a pipeline bug and is reported, not repaired.
/// Entries are re-ordered by hour in the output.
pub fn aggregate_daily(date: NaiveDate, hourly: Vec<HourlySummary>) -> Result<DailySummary, InvariantViolation> {
    check_hourly(date, &hourly)?;

    let mut hourly = hourly;
    hourly.sort_by_key(|h| h.hour_group);

    let total_qty: u64 = hourly.iter().map(|h| h.qty).sum();
    let total_te_busy: u64 = hourly.iter().map(|h| h.te_busy).sum();
    let total_sys_busy: u64 = hourly.iter().map(|h| h.sys_busy).sum();
    let total_others: u64 = hourly.iter().map(|h| h.others).sum();
    let total_unknown: u64 = hourly.iter().map(|h| h.unknown).sum();

    Ok(DailySummary {
        date,
        hourly,
        total_qty,
        total_te_busy,
        total_sys_busy,
        total_others,
        total_unknown,
        avg_te_busy_percent: percent(total_te_busy, total_qty),
        avg_sys_busy_percent: percent(total_sys_busy, total_qty),
        avg_others_percent: percent(total_others, total_qty),
    })
}

/// Bucket + aggregate in one step.
pub fn summarize_day(date: NaiveDate, records: &[CallRecord]) -> Result<DailySummary, InvariantViolation> {
    aggregate_daily(date, bucket_by_hour(date, records)?)
}

/// One summary per date in `start..=end`, in date order. Empty when `start > end`.
///
/// Dates are independent, so they are summarized in parallel.
pub fn summarize_range(
    records: &[CallRecord],
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<DailySummary>, InvariantViolation> {
    let dates = dates_between(start, end);
    debug!(days = dates.len(), %start, %end, "summarizing date range");
    dates
        .into_par_iter()
        .map(|date| summarize_day(date, records))
        .collect()
}

/// Inclusive list of dates from `start` to `end`.
pub fn dates_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut day = start;
    while day <= end {
        out.push(day);
        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }
    out
}

fn check_hourly(date: NaiveDate, hourly: &[HourlySummary]) -> Result<(), InvariantViolation> {
    if hourly.len() != HOURS_PER_DAY {
        return Err(InvariantViolation::WrongHourCount {
            expected: HOURS_PER_DAY,
            found: hourly.len(),
        });
    }

    let mut seen = [false; HOURS_PER_DAY];
    for h in hourly {
        if h.date != date {
            return Err(InvariantViolation::DateMismatch {
                expected: date,
                found: h.date,
            });
        }
        let Some(slot) = seen.get_mut(h.hour_group as usize) else {
            return Err(InvariantViolation::HourOutOfRange(h.hour_group));
        };
        if *slot {
            return Err(InvariantViolation::DuplicateHour(h.hour_group));
        }
        *slot = true;

        let sum = h.te_busy + h.sys_busy + h.others;
        if sum != h.qty {
            return Err(InvariantViolation::CountMismatch {
                hour: h.hour_group,
                qty: h.qty,
                sum,
            });
        }
    }

    Ok(())
}
