use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response from backend: {0}")]
    UnexpectedResponse(anyhow::Error),

    #[error("File is empty")]
    EmptyFile,

    #[error("File too large: {size} bytes (limit {limit})")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Upload response did not include a file path")]
    MissingFilePath,

    #[error("Polling failed after {consecutive_errors} consecutive errors")]
    PollingFailed { consecutive_errors: u32 },

    #[error("Workflow cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
