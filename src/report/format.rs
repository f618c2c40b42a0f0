//! Formatted terminal output: daily tables and upload results.
//!
//! We keep formatting code in one place so:
//! - the aggregation code stays free of presentation concerns
//! - output changes are localized

use crate::domain::{CloseReason, DailySummary, HourlySummary, UploadResult};

/// Display label for a close reason.
pub fn reason_label(reason: CloseReason) -> String {
    match reason {
        CloseReason::TeBusy => "TE Busy".to_string(),
        CloseReason::SystemBusy => "System Busy".to_string(),
        CloseReason::Others => "Others".to_string(),
        CloseReason::Unknown(code) => format!("Unknown ({code})"),
    }
}

/// Format one day: headline totals followed by the hourly table.
///
/// With `include_empty = false`, hours without calls are left out of the table
/// (the totals are unaffected).
pub fn format_daily_summary(summary: &DailySummary, include_empty: bool) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== Call close reasons: {} ===\n", summary.date));
    out.push_str(&format!(
        "Calls: {} | {}: {} ({:.1}%) | {}: {} ({:.1}%) | {}: {} ({:.1}%)\n",
        summary.total_qty,
        reason_label(CloseReason::TeBusy),
        summary.total_te_busy,
        summary.avg_te_busy_percent,
        reason_label(CloseReason::SystemBusy),
        summary.total_sys_busy,
        summary.avg_sys_busy_percent,
        reason_label(CloseReason::Others),
        summary.total_others,
        summary.avg_others_percent,
    ));
    if summary.total_unknown > 0 {
        out.push_str(&format!(
            "Unknown codes (counted in Others): {}\n",
            summary.total_unknown
        ));
    }
    out.push('\n');

    out.push_str(&format_hourly_table(&summary.hourly, include_empty));
    out
}

fn format_hourly_table(rows: &[HourlySummary], include_empty: bool) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "{:<13} {:>6} {:>8} {:>6} {:>8} {:>6} {:>8} {:>6}\n",
            "hour", "qty", "te_busy", "te%", "sys_busy", "sys%", "others", "oth%"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(
        format!(
            "{:-<13} {:-<6} {:-<8} {:-<6} {:-<8} {:-<6} {:-<8} {:-<6}\n",
            "", "", "", "", "", "", "", ""
        )
        .trim_end(),
    );
    out.push('\n');

    for h in rows.iter().filter(|h| include_empty || h.qty > 0) {
        out.push_str(
            format!(
                "{:<13} {:>6} {:>8} {:>6.1} {:>8} {:>6.1} {:>8} {:>6.1}\n",
                h.hour_label,
                h.qty,
                h.te_busy,
                h.te_busy_percent,
                h.sys_busy,
                h.sys_busy_percent,
                h.others,
                h.others_percent,
            )
            .trim_end(),
        );
        out.push('\n');
    }

    out
}

/// Format the outcome of one upload.
pub fn format_upload_result(source: &str, result: &UploadResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{source}: {} rows, {} imported, {} failed ({})\n",
        result.total_records,
        result.successful_records,
        result.failed_records,
        result.uploaded_at.format("%Y-%m-%d %H:%M:%S UTC"),
    ));
    for err in &result.errors {
        out.push_str(&format!("  - {err}\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize_day;
    use crate::domain::CallRecord;
    use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

    fn day() -> DailySummary {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let recs = vec![
            CallRecord::new(1, date, at(9), CloseReason::SystemBusy, Utc::now()),
            CallRecord::new(2, date, at(9), CloseReason::SystemBusy, Utc::now()),
            CallRecord::new(3, date, at(14), CloseReason::Unknown(6), Utc::now()),
        ];
        summarize_day(date, &recs).unwrap()
    }

    #[test]
    fn labels() {
        assert_eq!(reason_label(CloseReason::TeBusy), "TE Busy");
        assert_eq!(reason_label(CloseReason::Others), "Others");
        assert_eq!(reason_label(CloseReason::Unknown(12)), "Unknown (12)");
    }

    #[test]
    fn daily_table_lists_busy_hours_only_when_asked() {
        let text = format_daily_summary(&day(), false);
        assert!(text.starts_with("=== Call close reasons: 2024-01-15 ===\n"));
        assert!(text.contains("Calls: 3 | TE Busy: 0 (0.0%) | System Busy: 2 (66.7%) | Others: 1 (33.3%)"));
        assert!(text.contains("Unknown codes (counted in Others): 1"));
        assert!(text.contains("09:00 - 10:00"));
        assert!(!text.contains("10:00 - 11:00"));

        let full = format_daily_summary(&day(), true);
        // title, headline, unknown line, blank, header, rule, 24 hours
        assert_eq!(full.lines().count(), 4 + 2 + 24);
        assert!(full.lines().all(|l| l == l.trim_end()));
    }

    #[test]
    fn upload_result_lists_errors() {
        let at = DateTime::parse_from_rfc3339("2024-01-16T08:00:00Z").unwrap().with_timezone(&Utc);
        let mut result = UploadResult::empty(at);
        result.record_success();
        result.record_failure("Row 2: invalid time 'xx' (expected HH:mm:ss)");
        let text = format_upload_result("calls.csv", &result);
        assert_eq!(
            text,
            "calls.csv: 2 rows, 1 imported, 1 failed (2024-01-16 08:00:00 UTC)\n  - Row 2: invalid time 'xx' (expected HH:mm:ss)\n"
        );
    }
}
