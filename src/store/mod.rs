//! Record persistence/query collaborator.
//!
//! The aggregation core never owns storage. It talks to a `RecordStore`:
//!
//! - `InMemoryStore` (`memory`): process-local, used by the CLI and tests
//! - `HttpRecordStore` (`http`): the dashboard's call-record API

use chrono::NaiveDate;

use crate::domain::{CallRecord, DailySummary, UploadResult};
use crate::error::StoreError;

pub mod http;
pub mod memory;

pub use http::HttpRecordStore;
pub use memory::InMemoryStore;

pub trait RecordStore: Send + Sync {
    /// Summary for `date`, or `None` when the store holds nothing for it.
    fn daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, StoreError>;

    /// Persist parsed records. The result counts one entry per record handed in.
    fn import_records(&self, records: Vec<CallRecord>) -> Result<UploadResult, StoreError>;

    /// Records dated `start..=end` as CSV bytes.
    fn export_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<u8>, StoreError>;
}
