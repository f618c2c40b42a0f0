//! `callstats` library crate.
//!
//! Call close-reason statistics: CSV call logs are parsed into records, bucketed
//! per hour of day and rolled up into daily summaries. The binary (`callstats`)
//! is a thin wrapper so the pipeline is testable without spawning processes.

pub mod aggregate;
pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod report;
pub mod store;
