//! Aggregation pipeline: call records → hourly buckets → daily summary.
//!
//! Everything here is a pure function of its arguments.

pub mod daily;
pub mod hourly;

pub use daily::{aggregate_daily, dates_between, summarize_day, summarize_range};
pub use hourly::{HOURS_PER_DAY, ReasonCounts, bucket_by_hour, hour_label, percent};
