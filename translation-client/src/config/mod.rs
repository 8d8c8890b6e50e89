use crate::error::ClientError;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    pub backend: BackendSettings,
    #[serde(default)]
    pub poller: PollerSettings,
    #[serde(default)]
    pub upload: UploadSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the translation backend, configured at deploy time.
    pub base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollerSettings {
    /// Status-check cadence in milliseconds.
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    /// Synthetic progress added per observed `in_progress` tick. This is an
    /// elapsed-tick counter, not a server-reported completion percentage.
    #[serde(default = "default_progress_increment")]
    pub progress_increment: f64,
    /// Consecutive status-fetch failures tolerated before the job is
    /// considered failed.
    #[serde(default = "default_max_consecutive_errors")]
    pub max_consecutive_errors: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadSettings {
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Multipart body chunk size; progress is reported per chunk handed to
    /// the transport.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_progress_increment() -> f64 {
    0.5
}

fn default_max_consecutive_errors() -> u32 {
    5
}

fn default_max_file_size() -> u64 {
    20 * 1024 * 1024
}

fn default_chunk_size() -> usize {
    64 * 1024
}

impl Default for PollerSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            progress_increment: default_progress_increment(),
            max_consecutive_errors: default_max_consecutive_errors(),
        }
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            chunk_size: default_chunk_size(),
        }
    }
}

impl BackendSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PollerSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl ClientConfig {
    pub fn load() -> Result<Self, ClientError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("configuration").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poller_defaults_match_observed_cadence() {
        let settings = PollerSettings::default();
        assert_eq!(settings.interval(), Duration::from_millis(1000));
        assert_eq!(settings.progress_increment, 0.5);
        assert_eq!(settings.max_consecutive_errors, 5);
    }

    #[test]
    fn upload_defaults() {
        let settings = UploadSettings::default();
        assert_eq!(settings.max_file_size, 20 * 1024 * 1024);
        assert_eq!(settings.chunk_size, 64 * 1024);
    }
}
