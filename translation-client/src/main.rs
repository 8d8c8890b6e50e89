use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use translation_client::workflow::{Phase, PollOutcome, WorkflowState};
use translation_client::{ClientConfig, ClientError, TranslationApi, TranslationWorkflow};

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,translation_client=debug"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = ClientConfig::load().map_err(|e| {
        tracing::error!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    let api = Arc::new(TranslationApi::new(&config.backend).map_err(|e| {
        tracing::error!("Failed to build API client: {}", e);
        std::io::Error::other(format!("Client error: {}", e))
    })?);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let result = match args.first().map(String::as_str) {
        Some("--history") => print_history(&api).await,
        Some(path) => translate(api, &config, Path::new(path)).await,
        None => {
            eprintln!("Usage: translation-client <file> | translation-client --history");
            return Err(std::io::Error::other("missing argument"));
        }
    };

    result.map_err(|e| {
        tracing::error!("{}", e);
        std::io::Error::other(e.to_string())
    })
}

async fn print_history(api: &TranslationApi) -> Result<(), ClientError> {
    let records = api.list_translations().await?;

    println!(
        "{:<28} {:<16} {:<20} {:>5} {:>10} {:<8} {}",
        "FILE", "PROJECT", "DATE", "PAGES", "BYTES", "LANG", "DOWNLOAD"
    );
    for record in records {
        println!(
            "{:<28} {:<16} {:<20} {:>5} {:>10} {:<8} {}",
            record.file_name.unwrap_or_default(),
            record.project.unwrap_or_default(),
            record.translation_date.unwrap_or_default(),
            record
                .number_of_pages
                .map(|pages| pages.to_string())
                .unwrap_or_default(),
            record
                .file_size
                .map(|size| size.to_string())
                .unwrap_or_default(),
            record.language.unwrap_or_default(),
            record.download_link.unwrap_or_default(),
        );
    }

    Ok(())
}

async fn translate(
    api: Arc<TranslationApi>,
    config: &ClientConfig,
    input: &Path,
) -> Result<(), ClientError> {
    let workflow = TranslationWorkflow::new(api.clone(), config);
    let progress_task = tokio::spawn(watch_progress(workflow.subscribe()));

    let outcome = workflow.translate_file(input).await?;
    let state = workflow.state();
    drop(workflow);
    progress_task.await.ok();

    match outcome {
        PollOutcome::Completed {
            download_url,
            preview_url,
            ..
        } => {
            tracing::info!(download_url = %download_url, preview_url = %preview_url, "Translation finished");

            let translation_id = state
                .job_id
                .as_deref()
                .ok_or(ClientError::UnexpectedResponse(anyhow::anyhow!(
                    "completed workflow has no job id"
                )))?;
            let artifact = api.download(translation_id).await?;
            let output = output_path(input, state.initial_format.as_deref());
            tokio::fs::write(&output, artifact).await?;
            tracing::info!(output = %output.display(), "Translated file written");
            println!("{}", output.display());
            Ok(())
        }
        PollOutcome::Failed { consecutive_errors } => {
            Err(ClientError::PollingFailed { consecutive_errors })
        }
        PollOutcome::Cancelled => Err(ClientError::Cancelled),
    }
}

/// `report.docx` becomes `report.translated.docx` next to the input, keeping
/// the format the backend reported for the upload when it differs.
fn output_path(input: &Path, initial_format: Option<&str>) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("translated");
    let extension = initial_format
        .or_else(|| input.extension().and_then(|ext| ext.to_str()))
        .unwrap_or("bin");

    input.with_file_name(format!("{}.translated.{}", stem, extension))
}

async fn watch_progress(mut rx: watch::Receiver<WorkflowState>) {
    let mut last_phase = rx.borrow().phase;
    let mut last_upload = u8::MAX;
    let mut last_translation = f64::NAN;

    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();

        if state.phase != last_phase {
            tracing::info!(phase = ?state.phase, "Workflow phase changed");
            last_phase = state.phase;
        }
        if state.phase == Phase::Uploading && state.upload_progress != last_upload {
            tracing::info!(percent = state.upload_progress, "Upload progress");
            last_upload = state.upload_progress;
        }
        if state.phase == Phase::Translating && state.translation_progress != last_translation {
            tracing::debug!(progress = state.translation_progress, "Translation progress");
            last_translation = state.translation_progress;
        }
    }
}
