//! Synthetic call-log generation.
//!
//! Produces uploads in the switch export layout (`date,time,trunk,reason,`),
//! with hourly volumes drawn from a Poisson distribution around a business-day
//! traffic profile. Output is fully determined by the seed and the date.

use std::collections::hash_map::DefaultHasher;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Poisson;

use crate::aggregate::HOURS_PER_DAY;
use crate::error::AppError;

/// Relative call volume per hour of day (quiet nights, two daytime peaks).
const HOURLY_PROFILE: [f64; HOURS_PER_DAY] = [
    0.3, 0.2, 0.15, 0.1, 0.1, 0.2, 0.6, 1.2, 2.4, 3.2, 3.5, 3.1, 2.2, 2.6, 3.0, 3.1, 2.8, 2.3, 1.6, 1.2, 0.9, 0.7,
    0.5, 0.4,
];

/// Codes 1, 2, 3 with their relative frequency.
const REASON_CODES: [i32; 3] = [1, 2, 3];
const REASON_WEIGHTS: [f64; 3] = [0.35, 0.25, 0.40];

/// Codes emitted for the "unknown" share.
const UNKNOWN_CODES: std::ops::RangeInclusive<i32> = 4..=9;

const TRUNKS: u32 = 16;

pub const SAMPLE_HEADER: &str = "call_date,call_time,trunk,close_reason,";

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub date: NaiveDate,
    /// Expected number of calls over the whole day.
    pub expected_calls: usize,
    pub seed: u64,
    /// Probability that a call carries a code outside {1, 2, 3}.
    pub unknown_share: f64,
}

#[derive(Debug, Clone)]
pub struct SampleLog {
    pub date: NaiveDate,
    /// Data lines in time order (no header).
    pub lines: Vec<String>,
}

impl SampleLog {
    /// Full upload text, header included.
    pub fn to_csv(&self) -> String {
        let mut out = String::with_capacity(self.lines.len() * 32 + SAMPLE_HEADER.len() + 1);
        out.push_str(SAMPLE_HEADER);
        out.push('\n');
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

pub fn generate_call_log(config: &SampleConfig) -> Result<SampleLog, AppError> {
    if config.expected_calls == 0 {
        return Err(AppError::new(2, "Sample call count must be > 0."));
    }
    if !(config.unknown_share.is_finite() && (0.0..1.0).contains(&config.unknown_share)) {
        return Err(AppError::new(2, "Unknown-code share must be in [0, 1)."));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(config));
    let reasons = WeightedIndex::new(REASON_WEIGHTS)
        .map_err(|e| AppError::new(4, format!("Reason distribution error: {e}")))?;

    let profile_total: f64 = HOURLY_PROFILE.iter().sum();
    let mut calls: Vec<(NaiveTime, String)> = Vec::with_capacity(config.expected_calls + config.expected_calls / 4);

    for (hour, weight) in HOURLY_PROFILE.iter().enumerate() {
        let lambda = config.expected_calls as f64 * weight / profile_total;
        let volume = Poisson::new(lambda)
            .map_err(|e| AppError::new(4, format!("Volume distribution error: {e}")))?
            .sample(&mut rng) as u64;

        for _ in 0..volume {
            let time = NaiveTime::from_hms_opt(hour as u32, rng.gen_range(0..60), rng.gen_range(0..60))
                .ok_or_else(|| AppError::new(4, "Generated an invalid time of day."))?;
            let code = if rng.gen_bool(config.unknown_share) {
                rng.gen_range(UNKNOWN_CODES)
            } else {
                REASON_CODES[reasons.sample(&mut rng)]
            };
            let trunk = rng.gen_range(1..=TRUNKS);
            let line = format!(
                "{},{},TRK{trunk:02},{code},",
                config.date.format("%Y%m%d"),
                time.format("%H:%M:%S"),
            );
            calls.push((time, line));
        }
    }

    calls.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(SampleLog {
        date: config.date,
        lines: calls.into_iter().map(|(_, line)| line).collect(),
    })
}

/// Write a generated log (with header) to disk.
pub fn write_sample_file(path: &Path, log: &SampleLog) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create sample CSV '{}': {e}", path.display())))?;
    file.write_all(log.to_csv().as_bytes())
        .map_err(|e| AppError::new(2, format!("Failed to write sample CSV: {e}")))?;
    Ok(())
}

fn sample_seed(config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    config.date.hash(&mut hasher);
    config.seed.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize_day;
    use crate::domain::IngestConfig;
    use crate::io::ingest::ingest_bytes;
    use chrono::Utc;

    fn config(seed: u64) -> SampleConfig {
        SampleConfig {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            expected_calls: 500,
            seed,
            unknown_share: 0.05,
        }
    }

    #[test]
    fn same_seed_same_log() {
        let a = generate_call_log(&config(7)).unwrap();
        let b = generate_call_log(&config(7)).unwrap();
        assert_eq!(a.lines, b.lines);
        let c = generate_call_log(&config(8)).unwrap();
        assert_ne!(a.lines, c.lines);
    }

    #[test]
    fn generated_log_imports_cleanly() {
        let log = generate_call_log(&config(42)).unwrap();
        assert!(!log.lines.is_empty());

        let ingested = ingest_bytes(log.to_csv().as_bytes(), &IngestConfig::default(), Utc::now()).unwrap();
        assert_eq!(ingested.result.failed_records, 0);
        assert_eq!(ingested.result.total_records, log.lines.len());

        let summary = summarize_day(log.date, &ingested.records).unwrap();
        assert_eq!(summary.total_qty as usize, log.lines.len());
        // Midday is busier than the small hours.
        assert!(summary.hourly[10].qty > summary.hourly[3].qty);
    }

    #[test]
    fn rejects_bad_settings() {
        let mut bad = config(1);
        bad.expected_calls = 0;
        assert_eq!(generate_call_log(&bad).unwrap_err().exit_code(), 2);

        let mut bad = config(1);
        bad.unknown_share = 1.5;
        assert_eq!(generate_call_log(&bad).unwrap_err().exit_code(), 2);
    }
}
