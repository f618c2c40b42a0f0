//! Shared import workflow used by every command that reads call logs.
//!
//! store selection -> per-file size guard + row parsing -> store import

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::domain::{IngestConfig, UploadResult};
use crate::error::AppError;
use crate::io::ingest::import_path;
use crate::store::http::ENV_API_URL;
use crate::store::{HttpRecordStore, InMemoryStore, RecordStore};

/// Outcome of importing one file.
#[derive(Debug, Clone)]
pub struct FileImport {
    pub path: PathBuf,
    pub outcome: Result<UploadResult, AppError>,
}

/// Remote store when a URL is given (flag or `CALLSTATS_API_URL`), in-memory otherwise.
pub fn open_store(api_url: Option<String>) -> Result<Box<dyn RecordStore>, AppError> {
    dotenvy::dotenv().ok();
    if api_url.is_none() && std::env::var(ENV_API_URL).is_err() {
        return Ok(Box::new(InMemoryStore::new()));
    }
    let store = HttpRecordStore::from_env(api_url)?;
    info!(base_url = store.base_url(), "using remote record store");
    Ok(Box::new(store))
}

/// Import every file independently and in parallel. Results keep the input order.
pub fn import_files(
    store: &dyn RecordStore,
    paths: &[PathBuf],
    config: &IngestConfig,
    uploaded_at: DateTime<Utc>,
) -> Vec<FileImport> {
    paths
        .par_iter()
        .map(|path| FileImport {
            path: path.clone(),
            outcome: import_one(store, path, config, uploaded_at),
        })
        .collect()
}

/// Import all files, stopping at the first file-level failure.
pub fn import_all(
    store: &dyn RecordStore,
    paths: &[PathBuf],
    config: &IngestConfig,
    uploaded_at: DateTime<Utc>,
) -> Result<Vec<FileImport>, AppError> {
    let imports = import_files(store, paths, config, uploaded_at);
    if let Some(err) = imports.iter().find_map(|i| i.outcome.as_ref().err()) {
        return Err(err.clone());
    }
    Ok(imports)
}

fn import_one(
    store: &dyn RecordStore,
    path: &Path,
    config: &IngestConfig,
    uploaded_at: DateTime<Utc>,
) -> Result<UploadResult, AppError> {
    import_path(store, path, config, uploaded_at).map_err(|e| {
        warn!(path = %path.display(), error = %e, "import failed");
        AppError::from(e)
    })
}
