//! CSV exports.
//!
//! - call records, in the upload layout so an export can be re-imported
//! - the hourly table of a daily summary, for spreadsheets

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{CallRecord, DailySummary};
use crate::error::AppError;

/// Header of record exports. Date and time lead, the close reason is last.
pub const RECORD_EXPORT_HEADER: [&str; 4] = ["call_date", "call_time", "hour_group", "close_reason"];

/// Write records (header + one `YYYYMMDD,HH:MM:SS,<hour>,<code>` row each) to any writer.
pub fn write_records_csv<W: Write>(writer: W, records: &[CallRecord]) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(RECORD_EXPORT_HEADER)?;
    for r in records {
        out.write_record([
            r.call_date.format("%Y%m%d").to_string(),
            r.call_time.format("%H:%M:%S").to_string(),
            r.hour_group.to_string(),
            r.close_reason.code().to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Write the hourly table of a summary, followed by a `total` row.
pub fn write_hourly_csv<W: Write>(writer: W, summary: &DailySummary) -> Result<(), csv::Error> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "date",
        "hour",
        "qty",
        "te_busy",
        "te_busy_pct",
        "sys_busy",
        "sys_busy_pct",
        "others",
        "others_pct",
    ])?;

    let date = summary.date.to_string();
    for h in &summary.hourly {
        out.write_record([
            date.clone(),
            h.hour_label.clone(),
            h.qty.to_string(),
            h.te_busy.to_string(),
            format!("{:.1}", h.te_busy_percent),
            h.sys_busy.to_string(),
            format!("{:.1}", h.sys_busy_percent),
            h.others.to_string(),
            format!("{:.1}", h.others_percent),
        ])?;
    }
    out.write_record([
        date,
        "total".to_string(),
        summary.total_qty.to_string(),
        summary.total_te_busy.to_string(),
        format!("{:.1}", summary.avg_te_busy_percent),
        summary.total_sys_busy.to_string(),
        format!("{:.1}", summary.avg_sys_busy_percent),
        summary.total_others.to_string(),
        format!("{:.1}", summary.avg_others_percent),
    ])?;
    out.flush()?;
    Ok(())
}

/// Write raw export bytes (as returned by a record store) to a file.
pub fn write_export_file(path: &Path, bytes: &[u8]) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    file.write_all(bytes)
        .map_err(|e| AppError::new(2, format!("Failed to write export CSV '{}': {e}", path.display())))?;
    Ok(())
}

/// Write the hourly table of a summary to a file.
pub fn write_hourly_file(path: &Path, summary: &DailySummary) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create summary CSV '{}': {e}", path.display())))?;
    write_hourly_csv(file, summary)
        .map_err(|e| AppError::new(2, format!("Failed to write summary CSV '{}': {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::summarize_day;
    use crate::domain::CloseReason;
    use crate::io::ingest::parse_row;
    use chrono::{NaiveDate, NaiveTime, Utc};

    fn sample_record(code: i32) -> CallRecord {
        CallRecord::new(
            11,
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            NaiveTime::from_hms_opt(14, 2, 7).unwrap(),
            CloseReason::from_code(code),
            Utc::now(),
        )
    }

    #[test]
    fn serialized_row_parses_back() {
        for code in [1, 2, 3, 17] {
            let original = sample_record(code);
            let mut buf = Vec::new();
            write_records_csv(&mut buf, std::slice::from_ref(&original)).unwrap();
            let text = String::from_utf8(buf).unwrap();
            let row = text.lines().nth(1).unwrap();
            let parsed = parse_row(2, row, original.created_at).unwrap();
            assert_eq!(parsed.call_date, original.call_date);
            assert_eq!(parsed.call_time, original.call_time);
            assert_eq!(parsed.close_reason, original.close_reason);
            assert_eq!(parsed.hour_group, original.hour_group);
        }
    }

    #[test]
    fn record_export_has_header_and_rows() {
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &[sample_record(2)]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "call_date,call_time,hour_group,close_reason\n20240309,14:02:07,14,2\n");
    }

    #[test]
    fn hourly_export_ends_with_totals() {
        let summary = summarize_day(NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(), &[sample_record(1)]).unwrap();
        let mut buf = Vec::new();
        write_hourly_csv(&mut buf, &summary).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + 24 + 1);
        assert_eq!(lines[15], "2024-03-09,14:00 - 15:00,1,1,100.0,0,0.0,0,0.0");
        assert_eq!(lines[25], "2024-03-09,total,1,1,100.0,0,0.0,0,0.0");
    }
}
