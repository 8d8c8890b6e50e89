//! HTTP client for the translation backend.

use crate::config::BackendSettings;
use crate::error::ClientError;
use crate::models::{
    StatusResponse, TranslateRequest, TranslateResponse, TranslationRecord, UploadResponse,
};
use crate::services::upload::{progress_stream, ProgressSink};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Body;

/// Sent on every request so the backend's tunnel intermediary serves the API
/// response instead of its interstitial warning page.
const BYPASS_HEADER: &str = "ngrok-skip-browser-warning";

pub struct TranslationApi {
    http: reqwest::Client,
    base_url: String,
}

impl TranslationApi {
    pub fn new(settings: &BackendSettings) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(BYPASS_HEADER, HeaderValue::from_static("true"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(settings.request_timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn download_url(&self, translation_id: &str) -> String {
        format!("{}/download/{}", self.base_url, translation_id)
    }

    pub fn preview_url(&self, translation_id: &str) -> String {
        format!("{}/preview/{}", self.base_url, translation_id)
    }

    /// Submit a file to the remote store as a multipart upload.
    ///
    /// The body is streamed in chunks and `progress` observes the running
    /// percentage as each chunk is handed to the transport.
    pub async fn upload(
        &self,
        file_name: &str,
        data: Vec<u8>,
        chunk_size: usize,
        progress: ProgressSink,
    ) -> Result<UploadResponse, ClientError> {
        let total = data.len() as u64;
        let url = format!("{}/upload", self.base_url);

        tracing::info!(file_name = %file_name, size = total, "Uploading file");

        let body = Body::wrap_stream(progress_stream(data, chunk_size, progress));
        let part = Part::stream_with_length(body, total).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        let uploaded: UploadResponse = response.json().await?;
        tracing::info!(
            file_path = uploaded.file_path.as_deref().unwrap_or("<none>"),
            initial_format = uploaded.initial_format.as_deref().unwrap_or("<none>"),
            "File uploaded"
        );
        Ok(uploaded)
    }

    /// Request an asynchronous translation job for an uploaded file handle.
    ///
    /// There is no idempotency key; calling this twice for the same handle
    /// creates two independent jobs.
    pub async fn start_translation(
        &self,
        file_path: &str,
        initial_format: Option<&str>,
    ) -> Result<TranslateResponse, ClientError> {
        let url = format!("{}/translate", self.base_url);

        let response = self
            .http
            .post(&url)
            .json(&TranslateRequest {
                file_path,
                initial_format,
            })
            .send()
            .await?
            .error_for_status()?;

        let started: TranslateResponse = response.json().await?;
        if started.translation_id.is_empty() {
            return Err(ClientError::UnexpectedResponse(anyhow::anyhow!(
                "translate response carried an empty translation_id"
            )));
        }

        tracing::info!(translation_id = %started.translation_id, "Translation started");
        Ok(started)
    }

    pub async fn translation_status(
        &self,
        translation_id: &str,
    ) -> Result<StatusResponse, ClientError> {
        let url = format!("{}/translation_status/{}", self.base_url, translation_id);

        let response = self.http.get(&url).send().await?.error_for_status()?;
        Ok(response.json().await?)
    }

    /// Fetch the full translation history.
    ///
    /// The returned list replaces any previously fetched one wholesale; each
    /// record gets its `download_link` recomputed from its id.
    pub async fn list_translations(&self) -> Result<Vec<TranslationRecord>, ClientError> {
        let url = format!("{}/translations", self.base_url);

        let response = self.http.get(&url).send().await?.error_for_status()?;
        let mut records: Vec<TranslationRecord> = response.json().await?;
        for record in &mut records {
            record.download_link = Some(self.download_url(&record.translation_id));
        }

        tracing::debug!(count = records.len(), "Fetched translation history");
        Ok(records)
    }

    pub async fn download(&self, translation_id: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .get(self.download_url(translation_id))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    pub async fn preview(&self, translation_id: &str) -> Result<Vec<u8>, ClientError> {
        let response = self
            .http
            .get(self.preview_url(translation_id))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }
}
