use std::io::Write;

use callstats::aggregate::summarize_day;
use callstats::domain::{CloseReason, HeaderMode, IngestConfig};
use callstats::io::ingest::{import_bytes, import_path, ingest_bytes, parse_row};
use callstats::store::{InMemoryStore, RecordStore};
use chrono::{NaiveDate, NaiveTime, Utc};
use pretty_assertions::assert_eq;

fn jan15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
}

#[test]
fn reference_row_parses() {
    let record = parse_row(1, "20240115,08:30:45,x,x,1", Utc::now()).unwrap();
    assert_eq!(record.call_date, jan15());
    assert_eq!(record.call_time, NaiveTime::from_hms_opt(8, 30, 45).unwrap());
    assert_eq!(record.close_reason, CloseReason::TeBusy);
    assert_eq!(record.hour_group, 8);
}

#[test]
fn two_system_busy_calls_at_nine() {
    let store = InMemoryStore::new();
    let upload = "call_date,call_time,trunk,close_reason,\n\
                  20240115,09:05:00,TRK01,2,\n\
                  20240115,09:47:12,TRK02,2,\n";
    let result = import_bytes(&store, upload.as_bytes(), &IngestConfig::default(), Utc::now()).unwrap();
    assert_eq!(result.total_records, 2);
    assert_eq!(result.successful_records, 2);

    let summary = store.daily_summary(jan15()).unwrap().unwrap();
    assert_eq!(summary.hourly.len(), 24);
    let nine = &summary.hourly[9];
    assert_eq!(nine.hour_group, 9);
    assert_eq!(nine.hour_label, "09:00 - 10:00");
    assert_eq!((nine.qty, nine.sys_busy), (2, 2));
    assert_eq!(nine.sys_busy_percent, 100.0);
    assert_eq!(summary.total_qty, 2);
    assert_eq!(summary.total_sys_busy, 2);
    assert_eq!(summary.avg_sys_busy_percent, 100.0);
    assert!(summary.hourly.iter().filter(|h| h.hour_group != 9).all(|h| h.qty == 0));
}

#[test]
fn bad_time_is_reported_and_the_rest_import() {
    let store = InMemoryStore::new();
    let upload = "20240115,08:00:00,T,1,\n20240115,25:61:00,T,2,\n20240115,10:15:00,T,3,\n";
    let result = import_bytes(&store, upload.as_bytes(), &IngestConfig::default(), Utc::now()).unwrap();

    assert_eq!(result.total_records, 3);
    assert_eq!(result.successful_records, 2);
    assert_eq!(result.failed_records, 1);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Row 2:"), "{}", result.errors[0]);
    assert_eq!(store.len().unwrap(), 2);
}

#[test]
fn oversized_upload_processes_nothing() {
    let store = InMemoryStore::new();
    let config = IngestConfig {
        max_upload_bytes: 32,
        header: HeaderMode::Absent,
    };
    let upload = "20240115,08:00:00,T,1,\n".repeat(4);
    let err = import_bytes(&store, upload.as_bytes(), &config, Utc::now()).unwrap_err();
    assert!(err.to_string().contains("32"), "{err}");
    assert!(store.is_empty().unwrap());
}

#[test]
fn exported_range_imports_into_a_fresh_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("calls.csv");
    let mut file = std::fs::File::create(&path).unwrap();
    writeln!(file, "20240114,23:59:59,T,3,").unwrap();
    writeln!(file, "20240115,00:00:00,T,1,").unwrap();
    writeln!(file, "20240115,13:20:00,T,7,").unwrap();
    writeln!(file, "20240116,06:00:00,T,2,").unwrap();
    drop(file);

    let first = InMemoryStore::new();
    let result = import_path(&first, &path, &IngestConfig::default(), Utc::now()).unwrap();
    assert_eq!(result.successful_records, 4);

    let bytes = first.export_range(jan15(), jan15()).unwrap();
    let second = InMemoryStore::new();
    let reimported = import_bytes(&second, &bytes, &IngestConfig::default(), Utc::now()).unwrap();
    assert_eq!(reimported.total_records, 2);
    assert_eq!(reimported.failed_records, 0);

    assert_eq!(
        first.daily_summary(jan15()).unwrap(),
        second.daily_summary(jan15()).unwrap()
    );
    let summary = second.daily_summary(jan15()).unwrap().unwrap();
    assert_eq!(summary.total_others, 1);
    assert_eq!(summary.total_unknown, 1);
    assert!(second.daily_summary(NaiveDate::from_ymd_opt(2024, 1, 16).unwrap()).unwrap().is_none());
}

#[test]
fn totals_add_up_for_a_mixed_day() {
    let mut upload = String::new();
    for (i, code) in [1, 2, 3, 1, 1, 9, 2, 3].iter().enumerate() {
        upload.push_str(&format!("20240115,{:02}:1{}:00,T,{code},\n", i % 3 + 7, i % 6));
    }
    let ingested = ingest_bytes(upload.as_bytes(), &IngestConfig::default(), Utc::now()).unwrap();
    let r = &ingested.result;
    assert_eq!(r.successful_records + r.failed_records, r.total_records);

    let summary = summarize_day(jan15(), &ingested.records).unwrap();
    assert_eq!(summary.total_qty, 8);
    assert_eq!(summary.total_te_busy, 3);
    assert_eq!(summary.total_sys_busy, 2);
    assert_eq!(summary.total_others, 3);
    assert_eq!(summary.total_unknown, 1);
    assert_eq!(summary.avg_te_busy_percent, 37.5);
    for h in &summary.hourly {
        assert_eq!(h.te_busy + h.sys_busy + h.others, h.qty);
    }
}
