//! The remote JSON store.
//!
//! The endpoint keeps exactly one JSON document.  `GET` returns it (`{}` when
//! nothing has been written yet) and `POST` replaces it wholesale, answering
//! `{"status": "success"}` or `{"status": "error", "message": ...}`.
//!
//! ## For contributors
//!
//! [`RemoteStore`] is the seam the sync controller talks through.  Tests use
//! an in-memory implementation; [`HttpRemote`] is the real one.

use std::future::Future;

use reqwest::header::CONTENT_TYPE;
use serde_json::{Map, Value};
use tracing::{debug, error, info};

use super::SyncError;
use crate::dashboard::Document;

/// `text/plain` keeps the request "simple" so a browser-hosted endpoint never
/// has to answer a CORS preflight.
const SAVE_CONTENT_TYPE: &str = "text/plain;charset=utf-8";

/// Whole-document read/replace against a single URL.
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetch the stored document as a raw JSON object.
    ///
    /// `Ok(None)` means the store answered `{}`: it has never been written.
    /// Any other non-object answer is an error, never a document.
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<Option<Map<String, Value>>, SyncError>> + Send;

    /// Replace the stored document.
    fn save(&self, url: &str, doc: &Document) -> impl Future<Output = Result<(), SyncError>> + Send;
}

/// [`RemoteStore`] over HTTP.
#[derive(Clone, Default)]
pub struct HttpRemote {
    client: reqwest::Client,
}

impl HttpRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Send a request and return the body of a successful response.
    async fn body(&self, request: reqwest::RequestBuilder) -> Result<String, SyncError> {
        let response = request.send().await?;
        let status = response.status();
        debug!("remote store answered {status}");

        let text = response.text().await?;
        if !status.is_success() {
            error!("remote store request failed: {status}, body: {text}");
            return Err(SyncError::Network(format!("server answered {status}")));
        }
        Ok(text)
    }
}

impl RemoteStore for HttpRemote {
    async fn fetch(&self, url: &str) -> Result<Option<Map<String, Value>>, SyncError> {
        info!("fetching dashboard from {url}");
        let text = self.body(self.client.get(url)).await?;

        // `null`, arrays and scalars are rejected here: migrating them would
        // replace the user's data with defaults.
        let fields: Map<String, Value> = serde_json::from_str(&text).map_err(|e| {
            error!("fetch did not return a JSON object: {e}");
            SyncError::Protocol(e)
        })?;

        if fields.is_empty() {
            info!("remote store is empty");
            return Ok(None);
        }
        Ok(Some(fields))
    }

    async fn save(&self, url: &str, doc: &Document) -> Result<(), SyncError> {
        info!("saving dashboard to {url}");
        let payload = serde_json::to_string(doc).map_err(|e| {
            error!("could not encode dashboard: {e}");
            SyncError::Encode(e)
        })?;
        let request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, SAVE_CONTENT_TYPE)
            .body(payload);
        let text = self.body(request).await?;

        let response: Value = serde_json::from_str(&text).map_err(|e| {
            error!("save returned invalid JSON: {e}");
            SyncError::Protocol(e)
        })?;

        // Only an explicit `"error"` status is a failure.
        if response.get("status").and_then(Value::as_str) == Some("error") {
            let message = response
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            error!("remote store rejected save: {message}");
            return Err(SyncError::Remote(message));
        }

        info!("save successful");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
