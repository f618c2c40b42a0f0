//! Input/output helpers.
//!
//! - CSV upload parsing + validation (`ingest`)
//! - CSV exports of records and hourly tables (`export`)
//! - daily summary JSON read/write (`summary`)

pub mod export;
pub mod ingest;
pub mod summary;

pub use export::*;
pub use ingest::*;
pub use summary::*;
