use serde::{Deserialize, Serialize};

/// Server-reported state of a translation job.
///
/// Anything the backend sends outside the three known states maps to
/// `Unknown`; the poller treats it the same as `pending` and leaves progress
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    InProgress,
    Completed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub initial_format: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranslateRequest<'a> {
    pub file_path: &'a str,
    pub initial_format: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    #[serde(default)]
    pub message: String,
    pub translation_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: JobStatus,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// One entry of the translation history.
///
/// `download_link` is always recomputed on the client from `translation_id`;
/// whatever the server sends for it is discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub translation_id: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub translation_date: Option<String>,
    #[serde(default)]
    pub number_of_pages: Option<u32>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub download_link: Option<String>,
}
