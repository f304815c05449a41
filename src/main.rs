//! Application entry point — Object Learner.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Create pipeline channels (`command`, `result`).
//! 5. Spawn the pipeline task on the tokio runtime.
//! 6. Run [`eframe::run_native`] — blocks the main thread until the window
//!    is closed.

use std::path::Path;

use anyhow::Context as _;
use eframe::egui;
use tokio::sync::mpsc;

use object_learner::{
    analysis::AnalysisOrchestrator,
    app::{LearnerApp, PipelineCommand, PipelineResult},
    config::{AppConfig, AppPaths},
    gemini::ApiClient,
    tts::{self, ApiSpeaker, TextToSpeech},
};

// ---------------------------------------------------------------------------
// Pipeline task
// ---------------------------------------------------------------------------

/// Background task that runs inside the tokio runtime.
///
/// Listens for [`PipelineCommand`]s, drives the analyze cycle, and emits
/// [`PipelineResult`]s back to the UI. Pronunciation clips are fetched after
/// the result is delivered so the vocabulary renders without waiting on TTS.
async fn run_pipeline(
    config: AppConfig,
    mut command_rx: mpsc::Receiver<PipelineCommand>,
    result_tx: mpsc::Sender<PipelineResult>,
) {
    let client = ApiClient::from_config(&config.gemini);
    let orchestrator = AnalysisOrchestrator::from_config(client.clone(), client, &config);
    let speaker = ApiSpeaker::from_config(&config.tts);
    let paths = AppPaths::new();

    while let Some(command) = command_rx.recv().await {
        match command {
            PipelineCommand::Analyze { image, shape } => {
                let _ = result_tx.send(PipelineResult::AnalysisStarted).await;

                match orchestrator.analyze(&image, shape).await {
                    Ok(report) => {
                        let words: Vec<String> = report
                            .analysis
                            .vocabulary
                            .iter()
                            .map(|item| item.word.clone())
                            .collect();

                        let _ = result_tx
                            .send(PipelineResult::AnalysisComplete { report })
                            .await;

                        if config.tts.enabled {
                            fetch_pronunciations(
                                &speaker,
                                &paths.audio_cache_dir,
                                &words,
                                &result_tx,
                            )
                            .await;
                        }
                    }
                    Err(err) => {
                        log::error!("analysis failed: {err}");
                        let _ = result_tx
                            .send(PipelineResult::AnalysisFailed {
                                headline: err.headline().to_string(),
                                detail: err.to_string(),
                            })
                            .await;
                    }
                }
            }
        }
    }
}

/// Fetch and cache a pronunciation clip per word. Strictly best effort:
/// failures are logged and skipped, never reported as errors.
async fn fetch_pronunciations(
    speaker: &ApiSpeaker,
    cache_dir: &Path,
    words: &[String],
    result_tx: &mpsc::Sender<PipelineResult>,
) {
    for word in words {
        if let Some(path) = tts::cached_clip(cache_dir, word) {
            let _ = result_tx
                .send(PipelineResult::PronunciationSaved {
                    word: word.clone(),
                    path,
                })
                .await;
            continue;
        }

        match speaker.synthesize(word).await {
            Ok(bytes) => match tts::cache_clip(cache_dir, word, &bytes) {
                Ok(path) => {
                    let _ = result_tx
                        .send(PipelineResult::PronunciationSaved {
                            word: word.clone(),
                            path,
                        })
                        .await;
                }
                Err(e) => log::warn!("could not cache clip for {word}: {e}"),
            },
            Err(e) => log::warn!("pronunciation fetch for {word} failed: {e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load().context("failed to load settings.toml")?;
    log::info!(
        "starting Object Learner (model: {})",
        config
            .selector
            .pinned_model
            .as_deref()
            .unwrap_or("auto-selected")
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let (command_tx, command_rx) = mpsc::channel::<PipelineCommand>(8);
    let (result_tx, result_rx) = mpsc::channel::<PipelineResult>(32);

    runtime.spawn(run_pipeline(config.clone(), command_rx, result_tx));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([460.0, 640.0])
            .with_min_inner_size([360.0, 420.0])
            .with_title("Object Learner"),
        ..Default::default()
    };

    eframe::run_native(
        "Object Learner",
        options,
        Box::new(move |_cc| Ok(Box::new(LearnerApp::new(command_tx, result_rx, config)))),
    )
    .map_err(|e| anyhow::anyhow!("eframe failed: {e}"))?;

    Ok(())
}
