//! In-memory `RecordStore`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use crate::aggregate::summarize_day;
use crate::domain::{CallRecord, DailySummary, UploadResult, hour_group_of};
use crate::error::StoreError;
use crate::io::export::write_records_csv;
use crate::store::RecordStore;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    by_date: BTreeMap<NaiveDate, Vec<CallRecord>>,
}

/// Records keyed by date behind a `RwLock`.
///
/// Ids are reassigned from a store-wide sequence on import; the parser's
/// row-number ids are only unique within one file.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> Result<usize, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        Ok(state.by_date.values().map(Vec::len).sum())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }

    /// Stored records dated `start..=end`, ordered by date then time.
    pub fn records_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<CallRecord>, StoreError> {
        if start > end {
            return Ok(Vec::new());
        }
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        let mut out: Vec<CallRecord> = state
            .by_date
            .range(start..=end)
            .flat_map(|(_, recs)| recs.iter().cloned())
            .collect();
        out.sort_by_key(|r| (r.call_date, r.call_time, r.id));
        Ok(out)
    }
}

impl RecordStore for InMemoryStore {
    fn daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, StoreError> {
        let state = self.state.read().map_err(|_| StoreError::Poisoned)?;
        let Some(records) = state.by_date.get(&date) else {
            return Ok(None);
        };
        Ok(Some(summarize_day(date, records)?))
    }

    fn import_records(&self, records: Vec<CallRecord>) -> Result<UploadResult, StoreError> {
        let mut result = UploadResult::empty(Utc::now());
        let mut state = self.state.write().map_err(|_| StoreError::Poisoned)?;

        for mut record in records {
            // Hour groups are derived data; a record that disagrees with its
            // own time was not produced by the parser.
            let expected = hour_group_of(record.call_time);
            if record.hour_group != expected {
                debug!(id = record.id, hour_group = record.hour_group, expected, "record refused");
                result.record_failure(format!(
                    "Record {}: hour group {} does not match call time {}",
                    record.id, record.hour_group, record.call_time
                ));
                continue;
            }

            state.next_id += 1;
            record.id = state.next_id;
            state.by_date.entry(record.call_date).or_default().push(record);
            result.record_success();
        }

        info!(
            stored = result.successful_records,
            refused = result.failed_records,
            "records imported"
        );
        Ok(result)
    }

    fn export_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<u8>, StoreError> {
        let records = self.records_between(start, end)?;
        let mut buf = Vec::new();
        write_records_csv(&mut buf, &records)?;
        Ok(buf)
    }
}
