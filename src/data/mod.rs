//! Synthetic data sources.

pub mod sample;

pub use sample::{SampleConfig, SampleLog, generate_call_log, write_sample_file};
