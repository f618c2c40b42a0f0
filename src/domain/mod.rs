//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the close-reason enumeration (`CloseReason`)
//! - call records and their hourly/daily aggregates
//! - upload outcomes and ingestion settings

pub mod types;

pub use types::*;
