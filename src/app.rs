//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module parses arguments, installs logging,
//! builds the record store and dispatches to the command handlers.

use chrono::Utc;
use clap::Parser;
use tracing::info;

use crate::cli::{Cli, Command, ExportArgs, ImportArgs, InputArgs, SampleArgs, ShowArgs, SummaryArgs};
use crate::config::resolve_ingest_config;
use crate::data::{SampleConfig, generate_call_log, write_sample_file};
use crate::error::AppError;
use crate::logging::{LoggingConfig, parse_log_level, setup_logging};
use crate::report::{format_daily_summary, format_upload_result};
use crate::store::RecordStore;

pub mod pipeline;

/// Entry point for the `callstats` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    setup_logging(&logging_config(&cli)?)?;

    match cli.command {
        Command::Import(args) => handle_import(cli.api_url, args),
        Command::Summary(args) => handle_summary(cli.api_url, args),
        Command::Export(args) => handle_export(cli.api_url, args),
        Command::Show(args) => handle_show(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_import(api_url: Option<String>, args: ImportArgs) -> Result<(), AppError> {
    if args.input.csv.is_empty() {
        return Err(AppError::new(2, "Nothing to import: pass at least one --csv file."));
    }
    let store = pipeline::open_store(api_url)?;
    let config = resolve_ingest_config(args.input.max_bytes, args.input.header)?;
    let imports = pipeline::import_files(store.as_ref(), &args.input.csv, &config, Utc::now());

    let mut first_error = None;
    for import in imports {
        let source = import.path.display().to_string();
        match import.outcome {
            Ok(result) => println!("{}\n", format_upload_result(&source, &result)),
            Err(err) => {
                eprintln!("{source}: {err}");
                first_error.get_or_insert(err);
            }
        }
    }

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn handle_summary(api_url: Option<String>, args: SummaryArgs) -> Result<(), AppError> {
    let store = pipeline::open_store(api_url)?;
    load_inputs(store.as_ref(), &args.input)?;

    let summary = store
        .daily_summary(args.date)?
        .ok_or_else(|| AppError::new(3, format!("No call records for {}.", args.date)))?;

    println!("{}", format_daily_summary(&summary, args.all_hours));

    if let Some(path) = &args.json {
        crate::io::summary::write_summary_json(path, &summary)?;
    }
    if let Some(path) = &args.export_csv {
        crate::io::export::write_hourly_file(path, &summary)?;
    }
    Ok(())
}

fn handle_export(api_url: Option<String>, args: ExportArgs) -> Result<(), AppError> {
    if args.from > args.to {
        return Err(AppError::new(
            2,
            format!("Empty date range: --from {} is after --to {}.", args.from, args.to),
        ));
    }
    let store = pipeline::open_store(api_url)?;
    load_inputs(store.as_ref(), &args.input)?;

    let bytes = store.export_range(args.from, args.to)?;
    crate::io::export::write_export_file(&args.out, &bytes)?;
    info!(path = %args.out.display(), bytes = bytes.len(), "export written");
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let summary = crate::io::summary::read_summary_json(&args.json)?;
    println!("{}", format_daily_summary(&summary, args.all_hours));
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = SampleConfig {
        date: args.date,
        expected_calls: args.count,
        seed: args.seed,
        unknown_share: args.unknown_share,
    };
    let log = generate_call_log(&config)?;
    write_sample_file(&args.out, &log)?;
    println!("Wrote {} calls for {} to {}", log.lines.len(), log.date, args.out.display());
    Ok(())
}

fn logging_config(cli: &Cli) -> Result<LoggingConfig, AppError> {
    let config = LoggingConfig::new(parse_log_level(&cli.log_level)?);
    Ok(if cli.log_source { config.with_file_info() } else { config })
}

/// Import the `--csv` inputs (if any) before querying the store.
fn load_inputs(store: &dyn RecordStore, input: &InputArgs) -> Result<(), AppError> {
    if input.csv.is_empty() {
        return Ok(());
    }
    let config = resolve_ingest_config(input.max_bytes, input.header)?;
    for import in pipeline::import_all(store, &input.csv, &config, Utc::now())? {
        if let Ok(result) = &import.outcome {
            if result.failed_records > 0 {
                eprintln!(
                    "{}: {} of {} rows rejected",
                    import.path.display(),
                    result.failed_records,
                    result.total_records
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_flags_shape_the_logging_config() {
        let cli = Cli::try_parse_from(["callstats", "--log-level", "info", "--log-source", "show", "--json", "d.json"]).unwrap();
        let config = logging_config(&cli).unwrap();
        assert_eq!(config.level, tracing::Level::INFO);
        assert!(config.file_info);

        let cli = Cli::try_parse_from(["callstats", "show", "--json", "d.json"]).unwrap();
        assert!(!logging_config(&cli).unwrap().file_info);

        let cli = Cli::try_parse_from(["callstats", "--log-level", "chatty", "show", "--json", "d.json"]).unwrap();
        assert_eq!(logging_config(&cli).unwrap_err().exit_code(), 2);
    }
}
