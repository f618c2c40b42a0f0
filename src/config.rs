//! Runtime configuration: defaults, then environment (`.env` honored), then CLI flags.

use crate::domain::{DEFAULT_MAX_UPLOAD_BYTES, HeaderMode, IngestConfig};
use crate::error::AppError;

pub const ENV_MAX_UPLOAD_BYTES: &str = "CALLSTATS_MAX_UPLOAD_BYTES";

/// Resolve the ingestion settings.
///
/// `max_bytes_flag` overrides `CALLSTATS_MAX_UPLOAD_BYTES`, which overrides the
/// 100 MB default.
pub fn resolve_ingest_config(max_bytes_flag: Option<u64>, header: HeaderMode) -> Result<IngestConfig, AppError> {
    dotenvy::dotenv().ok();
    let from_env = std::env::var(ENV_MAX_UPLOAD_BYTES).ok();
    ingest_config_from(max_bytes_flag, from_env.as_deref(), header)
}

fn ingest_config_from(
    max_bytes_flag: Option<u64>,
    env_value: Option<&str>,
    header: HeaderMode,
) -> Result<IngestConfig, AppError> {
    let max_upload_bytes = match (max_bytes_flag, env_value) {
        (Some(v), _) => v,
        (None, Some(raw)) => raw.trim().parse::<u64>().map_err(|_| {
            AppError::new(
                2,
                format!("{ENV_MAX_UPLOAD_BYTES} must be a byte count, got '{raw}'."),
            )
        })?,
        (None, None) => DEFAULT_MAX_UPLOAD_BYTES,
    };

    if max_upload_bytes == 0 {
        return Err(AppError::new(2, "Maximum upload size must be > 0 bytes."));
    }

    Ok(IngestConfig {
        max_upload_bytes,
        header,
    })
}
