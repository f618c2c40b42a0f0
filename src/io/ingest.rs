//! CSV ingest for call-close-reason uploads.
//!
//! This module turns an uploaded call log into `CallRecord`s plus an
//! `UploadResult` describing what happened.
//!
//! Row layout (no fixed header names):
//! - column 1: call date, `YYYYMMDD`
//! - column 2: call time, `HH:mm:ss`
//! - close-reason code: second-to-last column of a line ending in a trailing
//!   delimiter (equivalently, the last non-trailing column)
//! - everything else is ignored
//!
//! Design goals:
//! - **Best-effort batch**: a bad row is reported and skipped, never fatal
//! - **Size guard** before any parsing (`FileTooLargeError`)
//! - **Stateless**: safe to call concurrently for different uploads

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use csv::{ByteRecord, StringRecord};
use tracing::{debug, info, warn};

use crate::domain::{CallRecord, CloseReason, HeaderMode, IngestConfig, UploadResult};
use crate::error::{FileTooLargeError, IngestError, RowParseError};
use crate::store::RecordStore;

const TIME_FORMAT: &str = "%H:%M:%S";

/// Date, time and close reason.
const MIN_COLUMNS: usize = 3;

/// Parsed upload: the records that made it + the per-row accounting.
#[derive(Debug, Clone)]
pub struct Ingested {
    pub records: Vec<CallRecord>,
    pub result: UploadResult,
}

/// Parse one CSV line into a call record.
///
/// `row` is the 1-based row number used for error reporting; it also becomes
/// the record id until a store assigns its own.
pub fn parse_row(row: usize, line: &str, created_at: DateTime<Utc>) -> Result<CallRecord, RowParseError> {
    let mut reader = csv_reader(line.as_bytes());
    let mut record = StringRecord::new();
    match reader.read_record(&mut record) {
        Ok(true) => parse_record(row, &record, line, created_at),
        Ok(false) => Err(RowParseError::MissingColumns {
            row,
            line: line.to_string(),
            found: 0,
        }),
        Err(e) => Err(RowParseError::Malformed {
            row,
            line: line.to_string(),
            message: e.to_string(),
        }),
    }
}

/// Parse an already-split CSV record. `raw` is kept for error context only.
pub fn parse_record(
    row: usize,
    record: &StringRecord,
    raw: &str,
    created_at: DateTime<Utc>,
) -> Result<CallRecord, RowParseError> {
    let mut fields: Vec<&str> = record.iter().map(str::trim).collect();

    // Uploads conventionally end every line with a delimiter; drop that one
    // empty field so the reason column is always the last one.
    if fields.len() > 1 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }

    if fields.len() < MIN_COLUMNS {
        return Err(RowParseError::MissingColumns {
            row,
            line: raw.to_string(),
            found: fields.len(),
        });
    }

    let date_field = strip_bom(fields[0]);
    let call_date = parse_compact_date(date_field).ok_or_else(|| RowParseError::InvalidDate {
        row,
        line: raw.to_string(),
        value: date_field.to_string(),
    })?;

    let call_time = NaiveTime::parse_from_str(fields[1], TIME_FORMAT).map_err(|_| RowParseError::InvalidTime {
        row,
        line: raw.to_string(),
        value: fields[1].to_string(),
    })?;

    let reason_field = fields[fields.len() - 1];
    let code = reason_field
        .parse::<i32>()
        .map_err(|_| RowParseError::InvalidCloseReason {
            row,
            line: raw.to_string(),
            value: reason_field.to_string(),
        })?;

    Ok(CallRecord::new(
        row as u64,
        call_date,
        call_time,
        CloseReason::from_code(code),
        created_at,
    ))
}

/// Parse an in-memory upload.
///
/// Oversized content is rejected as a whole; nothing is parsed.
pub fn ingest_bytes(
    content: &[u8],
    config: &IngestConfig,
    created_at: DateTime<Utc>,
) -> Result<Ingested, FileTooLargeError> {
    check_size(content.len() as u64, config.max_upload_bytes)?;
    Ok(parse_upload(content, config, created_at))
}

/// Parse an upload from disk. The size check uses file metadata, before reading.
pub fn ingest_path(path: &Path, config: &IngestConfig, created_at: DateTime<Utc>) -> Result<Ingested, IngestError> {
    let io_err = |source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(io_err)?;
    let size = file.metadata().map_err(io_err)?.len();
    check_size(size, config.max_upload_bytes)?;

    // The file may still grow after the metadata check.
    let mut limited = file.take(config.max_upload_bytes.saturating_add(1));
    let mut content = Vec::with_capacity(size as usize);
    limited.read_to_end(&mut content).map_err(io_err)?;
    check_size(content.len() as u64, config.max_upload_bytes)?;

    Ok(parse_upload(content.as_slice(), config, created_at))
}

/// Parse an upload and hand the good records to the store.
///
/// Rows the store refuses are moved from the successful to the failed count,
/// so `successful + failed == total` still holds.
pub fn import_bytes(
    store: &dyn RecordStore,
    content: &[u8],
    config: &IngestConfig,
    uploaded_at: DateTime<Utc>,
) -> Result<UploadResult, IngestError> {
    let ingested = ingest_bytes(content, config, uploaded_at)?;
    store_ingested(store, ingested)
}

/// Same as `import_bytes`, reading from disk.
pub fn import_path(
    store: &dyn RecordStore,
    path: &Path,
    config: &IngestConfig,
    uploaded_at: DateTime<Utc>,
) -> Result<UploadResult, IngestError> {
    let ingested = ingest_path(path, config, uploaded_at)?;
    store_ingested(store, ingested)
}

fn store_ingested(store: &dyn RecordStore, ingested: Ingested) -> Result<UploadResult, IngestError> {
    let Ingested { records, result } = ingested;
    if records.is_empty() {
        return Ok(result);
    }
    let stored = store.import_records(records)?;
    Ok(merge_store_result(result, stored))
}

fn merge_store_result(parsed: UploadResult, stored: UploadResult) -> UploadResult {
    let mut out = parsed;
    let rejected = stored.failed_records.min(out.successful_records);
    out.successful_records -= rejected;
    out.failed_records += rejected;
    out.errors.extend(stored.errors);
    out
}

fn check_size(size: u64, limit: u64) -> Result<(), FileTooLargeError> {
    if size > limit {
        warn!(size, limit, "upload rejected: file too large");
        return Err(FileTooLargeError { size, limit });
    }
    Ok(())
}

fn parse_upload<R: Read>(input: R, config: &IngestConfig, created_at: DateTime<Utc>) -> Ingested {
    let mut reader = csv_reader(input);
    let mut records = Vec::new();
    let mut result = UploadResult::empty(created_at);

    for (idx, item) in reader.byte_records().enumerate() {
        let bytes = match item {
            Ok(b) => b,
            Err(e) => {
                let row = e.position().map(|p| p.line() as usize).unwrap_or(idx + 1);
                let err = RowParseError::Malformed {
                    row,
                    line: String::new(),
                    message: e.to_string(),
                };
                debug!(row, error = %err, "row rejected");
                result.record_failure(err.to_string());
                continue;
            }
        };

        // Physical, 1-based line number (blank lines are skipped by the reader
        // but still counted here).
        let row = bytes.position().map(|p| p.line() as usize).unwrap_or(idx + 1);

        let record = match StringRecord::from_byte_record(bytes) {
            Ok(r) => r,
            Err(e) => {
                let err = RowParseError::Malformed {
                    row,
                    line: lossy_join(&e.into_byte_record()),
                    message: "invalid UTF-8".to_string(),
                };
                debug!(row, error = %err, "row rejected");
                result.record_failure(err.to_string());
                continue;
            }
        };

        if idx == 0 && is_header(&record, config.header) {
            debug!(row, "skipping header row");
            continue;
        }

        let raw = join_fields(&record);
        match parse_record(row, &record, &raw, created_at) {
            Ok(call) => {
                records.push(call);
                result.record_success();
            }
            Err(err) => {
                debug!(row, error = %err, "row rejected");
                result.record_failure(err.to_string());
            }
        }
    }

    info!(
        total = result.total_records,
        successful = result.successful_records,
        failed = result.failed_records,
        "parsed upload"
    );

    Ingested { records, result }
}

fn csv_reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        // Rows are line-oriented; a stray quote must not swallow the lines after it.
        .quoting(false)
        .from_reader(input)
}

fn is_header(record: &StringRecord, mode: HeaderMode) -> bool {
    match mode {
        HeaderMode::Present => true,
        HeaderMode::Absent => false,
        // Only a labelled first cell is a header. Digit typos stay data rows
        // so they are reported as `InvalidDate`.
        HeaderMode::Auto => record
            .get(0)
            .map(strip_bom)
            .is_some_and(|first| first.bytes().any(|b| b.is_ascii_alphabetic())),
    }
}

fn strip_bom(s: &str) -> &str {
    // Spreadsheet exports often prefix the first cell with a UTF-8 BOM.
    s.trim_start_matches('\u{feff}')
}

fn is_compact_date(s: &str) -> bool {
    s.len() == 8 && s.bytes().all(|b| b.is_ascii_digit())
}

/// `YYYYMMDD` → date. Exactly eight digits; the calendar date must exist.
fn parse_compact_date(s: &str) -> Option<NaiveDate> {
    if !is_compact_date(s) {
        return None;
    }
    let year = s[0..4].parse::<i32>().ok()?;
    let month = s[4..6].parse::<u32>().ok()?;
    let day = s[6..8].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn join_fields(record: &StringRecord) -> String {
    record.iter().collect::<Vec<_>>().join(",")
}

fn lossy_join(record: &ByteRecord) -> String {
    record
        .iter()
        .map(|f| String::from_utf8_lossy(f).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}
