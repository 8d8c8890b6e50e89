//! Client for an asynchronous document translation backend.
//!
//! Drives the full upload-and-poll workflow against the backend's HTTP API:
//! upload a document, request a translation job for the returned file handle,
//! poll the job status at a fixed cadence until it completes (or fails), and
//! expose download/preview URLs for the finished artifact. Past translations
//! can be listed through the same API.
//!
//! The state of a running workflow is published as [`workflow::WorkflowState`]
//! snapshots through a `watch` channel, so callers can render progress without
//! reaching into the workflow internals.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod workflow;

pub use config::ClientConfig;
pub use error::ClientError;
pub use services::api::TranslationApi;
pub use workflow::{PollOutcome, TranslationWorkflow};
