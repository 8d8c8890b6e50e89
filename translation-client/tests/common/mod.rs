//! In-process mock of the translation backend for integration tests.
//!
//! Serves the same endpoints as the real backend on a random local port.
//! Each translation job runs a scripted sequence of status responses, so
//! tests can steer the polling loop tick by tick.

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use translation_client::config::{BackendSettings, ClientConfig, PollerSettings, UploadSettings};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptedTick {
    Pending,
    InProgress,
    Completed,
    ServerError,
}

/// Status responses for one job: the scripted ticks are served in order,
/// then `fallback` repeats forever.
#[derive(Debug, Clone)]
pub struct JobScript {
    pub ticks: Vec<ScriptedTick>,
    pub fallback: ScriptedTick,
}

impl JobScript {
    pub fn new(ticks: Vec<ScriptedTick>) -> Self {
        Self {
            ticks,
            fallback: ScriptedTick::Completed,
        }
    }

    pub fn looping(tick: ScriptedTick) -> Self {
        Self {
            ticks: Vec::new(),
            fallback: tick,
        }
    }
}

#[derive(Debug)]
struct JobState {
    ticks: VecDeque<ScriptedTick>,
    fallback: ScriptedTick,
    completed_served: bool,
}

#[derive(Debug, Default)]
pub struct BackendState {
    pending_scripts: VecDeque<JobScript>,
    jobs: HashMap<String, JobState>,
    pub status_requests: usize,
    pub requests_after_completion: usize,
    pub uploads: Vec<(String, usize)>,
    pub translate_calls: Vec<(String, Option<String>)>,
    pub records: Vec<serde_json::Value>,
}

type SharedState = Arc<Mutex<BackendState>>;

pub struct MockBackend {
    pub base_url: String,
    state: SharedState,
}

impl MockBackend {
    /// Spin up the mock on a random port. `scripts` are assigned to jobs in
    /// the order `/translate` is called; jobs beyond the list complete on
    /// their first status check.
    pub async fn spawn(scripts: Vec<JobScript>) -> Self {
        let state: SharedState = Arc::new(Mutex::new(BackendState {
            pending_scripts: scripts.into(),
            ..Default::default()
        }));

        let app = Router::new()
            .route("/upload", post(upload))
            .route("/translate", post(translate))
            .route("/translation_status/:id", get(translation_status))
            .route("/translations", get(list_translations))
            .route("/download/:id", get(download))
            .route("/preview/:id", get(preview))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock backend");
        let addr = listener.local_addr().expect("Failed to read local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    /// Client configuration pointed at this mock, with a fast poll cadence.
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            backend: BackendSettings {
                base_url: self.base_url.clone(),
                request_timeout_secs: 5,
            },
            poller: PollerSettings {
                interval_ms: 20,
                progress_increment: 0.5,
                max_consecutive_errors: 3,
            },
            upload: UploadSettings::default(),
        }
    }

    pub fn set_records(&self, records: Vec<serde_json::Value>) {
        self.state.lock().unwrap().records = records;
    }

    pub fn status_requests(&self) -> usize {
        self.state.lock().unwrap().status_requests
    }

    pub fn requests_after_completion(&self) -> usize {
        self.state.lock().unwrap().requests_after_completion
    }

    pub fn uploads(&self) -> Vec<(String, usize)> {
        self.state.lock().unwrap().uploads.clone()
    }

    pub fn translate_calls(&self) -> Vec<(String, Option<String>)> {
        self.state.lock().unwrap().translate_calls.clone()
    }
}

async fn upload(State(state): State<SharedState>, mut multipart: Multipart) -> Response {
    let mut file_name = String::from("unnamed");
    let mut size = 0usize;

    while let Ok(Some(field)) = multipart.next_field().await {
        file_name = field.file_name().unwrap_or("unnamed").to_string();
        size = field.bytes().await.map(|bytes| bytes.len()).unwrap_or(0);
    }

    state.lock().unwrap().uploads.push((file_name.clone(), size));

    let initial_format = std::path::Path::new(&file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_string);

    Json(json!({
        "message": "uploaded",
        "file_path": format!("uploads/{}", file_name),
        "initial_format": initial_format,
    }))
    .into_response()
}

async fn translate(
    State(state): State<SharedState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let file_path = body["file_path"].as_str().unwrap_or_default().to_string();
    let initial_format = body["initial_format"].as_str().map(str::to_string);

    let translation_id = format!("job-{}", Uuid::new_v4().simple());

    let mut state = state.lock().unwrap();
    state
        .translate_calls
        .push((file_path, initial_format));
    let script = state
        .pending_scripts
        .pop_front()
        .unwrap_or_else(|| JobScript::new(Vec::new()));
    state.jobs.insert(
        translation_id.clone(),
        JobState {
            ticks: script.ticks.into(),
            fallback: script.fallback,
            completed_served: false,
        },
    );

    Json(json!({
        "message": "translation started",
        "translation_id": translation_id,
    }))
    .into_response()
}

async fn translation_status(
    State(state): State<SharedState>,
    Path(translation_id): Path<String>,
) -> Response {
    let mut guard = state.lock().unwrap();
    let state = &mut *guard;
    state.status_requests += 1;

    let Some(job) = state.jobs.get_mut(&translation_id) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    if job.completed_served {
        state.requests_after_completion += 1;
        return Json(json!({ "status": "completed" })).into_response();
    }

    let tick = job.ticks.pop_front().unwrap_or(job.fallback);
    match tick {
        ScriptedTick::Pending => Json(json!({ "status": "pending" })).into_response(),
        ScriptedTick::InProgress => Json(json!({ "status": "in_progress" })).into_response(),
        ScriptedTick::Completed => {
            job.completed_served = true;
            Json(json!({
                "status": "completed",
                "file_path": format!("results/{}.pdf", translation_id),
            }))
            .into_response()
        }
        ScriptedTick::ServerError => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

async fn list_translations(State(state): State<SharedState>) -> Response {
    Json(state.lock().unwrap().records.clone()).into_response()
}

async fn download(Path(translation_id): Path<String>) -> Response {
    format!("TRANSLATED:{}", translation_id).into_response()
}

async fn preview(Path(translation_id): Path<String>) -> Response {
    format!("PREVIEW:{}", translation_id).into_response()
}
