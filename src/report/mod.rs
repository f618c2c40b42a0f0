//! Reporting utilities: terminal formatting of summaries and uploads.

pub mod format;

pub use format::{format_daily_summary, format_upload_result, reason_label};
