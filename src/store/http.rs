//! `RecordStore` backed by the dashboard's call-record HTTP API.
//!
//! Endpoints (relative to the base URL):
//! - `GET  call-records/daily-summary?date=YYYY-MM-DD` (404 = no data)
//! - `POST call-records/import` (JSON array of records → `UploadResult`)
//! - `GET  call-records/export?startDate=..&endDate=..` (CSV bytes)

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::{debug, info};

use crate::domain::{CallRecord, DailySummary, UploadResult};
use crate::error::StoreError;
use crate::store::RecordStore;

pub const ENV_API_URL: &str = "CALLSTATS_API_URL";
pub const ENV_API_TOKEN: &str = "CALLSTATS_API_TOKEN";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpRecordStore {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self, StoreError> {
        let base_url = base_url.into();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(StoreError::Config(format!("API URL must be http(s): '{base_url}'")));
        }
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Build from `CALLSTATS_API_URL` / `CALLSTATS_API_TOKEN` (a `.env` file is honored).
    ///
    /// An explicit `base_url` wins over the environment.
    pub fn from_env(base_url: Option<String>) -> Result<Self, StoreError> {
        dotenvy::dotenv().ok();
        let base_url = match base_url {
            Some(url) => url,
            None => std::env::var(ENV_API_URL)
                .map_err(|_| StoreError::Config(format!("Missing {ENV_API_URL} in environment (.env).")))?,
        };
        let token = std::env::var(ENV_API_TOKEN).ok();
        Self::new(base_url, token)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn authorized(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

fn ensure_success(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().unwrap_or_default();
    Err(StoreError::Status {
        status: status.as_u16(),
        message: message.trim().to_string(),
    })
}

impl RecordStore for HttpRecordStore {
    fn daily_summary(&self, date: NaiveDate) -> Result<Option<DailySummary>, StoreError> {
        let url = self.endpoint("call-records/daily-summary");
        debug!(%url, %date, "fetching daily summary");
        let resp = self
            .authorized(self.client.get(&url))
            .query(&[("date", date.to_string())])
            .send()?;

        if matches!(resp.status(), StatusCode::NOT_FOUND | StatusCode::NO_CONTENT) {
            return Ok(None);
        }
        let summary: DailySummary = ensure_success(resp)?.json()?;
        Ok(Some(summary))
    }

    fn import_records(&self, records: Vec<CallRecord>) -> Result<UploadResult, StoreError> {
        let url = self.endpoint("call-records/import");
        info!(%url, records = records.len(), "uploading records");
        let resp = self.authorized(self.client.post(&url)).json(&records).send()?;
        let result: UploadResult = ensure_success(resp)?.json()?;
        Ok(result)
    }

    fn export_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<u8>, StoreError> {
        let url = self.endpoint("call-records/export");
        debug!(%url, %start, %end, "exporting range");
        let resp = self
            .authorized(self.client.get(&url))
            .query(&[("startDate", start.to_string()), ("endDate", end.to_string())])
            .send()?;
        let bytes = ensure_success(resp)?.bytes()?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_join_cleanly() {
        let store = HttpRecordStore::new("https://dash.example.com/api/", None).unwrap();
        assert_eq!(store.base_url(), "https://dash.example.com/api");
        assert_eq!(
            store.endpoint("/call-records/import"),
            "https://dash.example.com/api/call-records/import"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        let err = HttpRecordStore::new("ftp://dash.example.com", None).err().unwrap();
        assert!(matches!(err, StoreError::Config(_)));
    }

    #[test]
    fn blank_token_is_dropped() {
        let store = HttpRecordStore::new("http://localhost:8080", Some("  ".to_string())).unwrap();
        assert!(store.token.is_none());
    }
}
