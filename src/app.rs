//! Object Learner desktop window — egui/eframe application.
//!
//! # Architecture
//!
//! [`LearnerApp`] is the top-level [`eframe::App`]. It owns the UI state and
//! two channel endpoints:
//!
//! * `command_tx` — sends [`PipelineCommand`] to the background pipeline task.
//! * `result_rx`  — receives [`PipelineResult`] from the pipeline task.
//!
//! The user drops a photo onto the window, presses **Analyze**, and the
//! vocabulary cards (word, phonetic, meaning, location, example sentence)
//! appear once the pipeline answers; pronunciation clips trickle in after.
//!
//! # States
//!
//! | State | Visual |
//! |-------|--------|
//! | `AwaitingImage` | "Drop a photo here" hint |
//! | `ImageLoaded` | file name + Analyze button |
//! | `Analyzing` | spinner |
//! | `Result` | scrollable vocabulary cards + optional scenario panel |
//! | `Error` | classified headline + detail, Try again button |

use std::collections::HashMap;
use std::path::PathBuf;

use eframe::egui;
use tokio::sync::mpsc;

use crate::analysis::{ParseReport, ResponseShape};
use crate::config::AppConfig;
use crate::gemini::ImagePayload;

// ---------------------------------------------------------------------------
// Pipeline message types (the background task in main.rs imports them from
// here).
// ---------------------------------------------------------------------------

/// Commands sent from the UI thread to the pipeline task.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    /// Run one analyze cycle on the given photo.
    Analyze {
        image: ImagePayload,
        shape: ResponseShape,
    },
}

/// Results / progress events delivered from the pipeline to the UI.
#[derive(Debug, Clone)]
pub enum PipelineResult {
    /// The pipeline acknowledged the analyze command.
    AnalysisStarted,
    /// Analysis finished; vocabulary is ready to render.
    AnalysisComplete { report: ParseReport },
    /// A pronunciation clip was fetched and cached (best effort, arrives
    /// after `AnalysisComplete`).
    PronunciationSaved { word: String, path: PathBuf },
    /// Analysis failed; `headline` is the classified kind, `detail` the
    /// full error text.
    AnalysisFailed { headline: String, detail: String },
}

// ---------------------------------------------------------------------------
// AppState — UI-side state machine
// ---------------------------------------------------------------------------

/// Current state of the analyze pipeline, as seen by the UI.
#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    /// Waiting for the user to drop a photo.
    AwaitingImage,
    /// A photo is loaded and ready to analyze.
    ImageLoaded,
    /// The pipeline is running.
    Analyzing,
    /// Results are being displayed.
    Result,
    /// An error occurred.
    Error,
}

// ---------------------------------------------------------------------------
// LoadedImage
// ---------------------------------------------------------------------------

/// A photo the user dropped onto the window.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Display name (file name).
    pub name: String,
    /// Bytes + MIME type ready for the API.
    pub payload: ImagePayload,
}

/// MIME type for a supported image file extension, or `None`.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// LearnerApp
// ---------------------------------------------------------------------------

/// eframe application — the photo-to-vocabulary window.
pub struct LearnerApp {
    // ── Pipeline state ───────────────────────────────────────────────────
    /// Current logical state of the analyze pipeline.
    pub state: AppState,
    /// The currently loaded photo.
    pub image: Option<LoadedImage>,
    /// The last successful analysis.
    pub report: Option<ParseReport>,
    /// Cached pronunciation clips, keyed by word.
    pub clips: HashMap<String, PathBuf>,
    /// Classified error for the Error state: (headline, detail).
    pub error: Option<(String, String)>,

    // ── UI state ─────────────────────────────────────────────────────────
    /// Spinner animation phase (increases each frame).
    spinner_phase: f32,
    /// Whether the settings panel is expanded.
    show_settings: bool,

    // ── Channels ─────────────────────────────────────────────────────────
    /// Send commands to the background pipeline task.
    pub command_tx: mpsc::Sender<PipelineCommand>,
    /// Receive results / progress from the background pipeline task.
    pub result_rx: mpsc::Receiver<PipelineResult>,

    // ── Configuration ────────────────────────────────────────────────────
    /// Application configuration (read-only after startup).
    pub config: AppConfig,
}

impl LearnerApp {
    /// Create a new [`LearnerApp`].
    pub fn new(
        command_tx: mpsc::Sender<PipelineCommand>,
        result_rx: mpsc::Receiver<PipelineResult>,
        config: AppConfig,
    ) -> Self {
        Self {
            state: AppState::AwaitingImage,
            image: None,
            report: None,
            clips: HashMap::new(),
            error: None,
            spinner_phase: 0.0,
            show_settings: false,
            command_tx,
            result_rx,
            config,
        }
    }

    // ── Channel polling ──────────────────────────────────────────────────

    /// Drain all pending pipeline results (non-blocking).
    fn poll_results(&mut self) {
        while let Ok(result) = self.result_rx.try_recv() {
            match result {
                PipelineResult::AnalysisStarted => {
                    // State was already set to Analyzing on button press;
                    // this is just a confirmation.
                }
                PipelineResult::AnalysisComplete { report } => {
                    self.report = Some(report);
                    self.state = AppState::Result;
                }
                PipelineResult::PronunciationSaved { word, path } => {
                    self.clips.insert(word, path);
                }
                PipelineResult::AnalysisFailed { headline, detail } => {
                    self.error = Some((headline, detail));
                    self.state = AppState::Error;
                }
            }
        }
    }

    /// Pick up files dropped onto the window.
    fn poll_dropped_files(&mut self, ctx: &egui::Context) {
        if self.state == AppState::Analyzing {
            return; // ignore drops while a request is in flight
        }

        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            let Some(path) = file.path else { continue };
            if let Some(loaded) = load_image_file(&path) {
                log::info!(
                    "loaded {} ({} bytes)",
                    loaded.name,
                    loaded.payload.bytes.len()
                );
                self.image = Some(loaded);
                self.report = None;
                self.clips.clear();
                self.error = None;
                self.state = AppState::ImageLoaded;
                break;
            }
            log::warn!("ignoring unsupported file {}", path.display());
        }
    }

    // ── Actions ──────────────────────────────────────────────────────────

    /// Send the loaded photo down the pipeline.
    fn start_analysis(&mut self) {
        let Some(image) = &self.image else { return };

        let shape = if self.config.prompt.include_scenario {
            ResponseShape::ObjectWithScenario
        } else {
            ResponseShape::List
        };

        let command = PipelineCommand::Analyze {
            image: image.payload.clone(),
            shape,
        };
        if self.command_tx.try_send(command).is_ok() {
            self.state = AppState::Analyzing;
        } else {
            log::warn!("pipeline busy, analyze command dropped");
        }
    }

    /// Clear everything and wait for a new photo.
    fn reset(&mut self) {
        self.state = AppState::AwaitingImage;
        self.image = None;
        self.report = None;
        self.clips.clear();
        self.error = None;
    }

    // ── State-specific panel renderers ───────────────────────────────────

    /// Render the AwaitingImage state: drop hint.
    fn draw_awaiting(&self, ui: &mut egui::Ui) {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new("Drop a photo here")
                    .color(egui::Color32::from_rgb(150, 150, 150))
                    .size(18.0),
            );
            ui.add_space(6.0);
            ui.label(
                egui::RichText::new("jpg, png or webp — I will tell you what is inside!")
                    .color(egui::Color32::from_rgb(110, 110, 110))
                    .size(13.0),
            );
        });
    }

    /// Render the ImageLoaded state: file name + Analyze button.
    fn draw_loaded(&mut self, ui: &mut egui::Ui) {
        let name = self
            .image
            .as_ref()
            .map(|i| i.name.clone())
            .unwrap_or_default();

        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(name)
                    .color(egui::Color32::from_rgb(200, 200, 200))
                    .size(14.0),
            );
            ui.add_space(12.0);
            if ui
                .add(egui::Button::new(
                    egui::RichText::new("Analyze photo").size(15.0),
                ))
                .clicked()
            {
                self.start_analysis();
            }
            ui.add_space(6.0);
            ui.label(
                egui::RichText::new("or drop another photo to replace it")
                    .color(egui::Color32::from_rgb(110, 110, 110))
                    .size(11.0),
            );
        });
    }

    /// Render the Analyzing state: spinner.
    fn draw_analyzing(&self, ui: &mut egui::Ui) {
        ui.add_space(40.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(format!("{} Asking Gemini...", self.spinner_char()))
                    .color(egui::Color32::from_rgb(68, 136, 255))
                    .size(15.0),
            );
        });
    }

    /// Render the Result state: vocabulary cards + optional scenario.
    fn draw_result(&mut self, ui: &mut egui::Ui) {
        let Some(report) = self.report.clone() else {
            return;
        };

        ui.horizontal(|ui| {
            ui.label(
                egui::RichText::new(format!(
                    "{} word(s) found",
                    report.analysis.vocabulary.len()
                ))
                .color(egui::Color32::from_rgb(80, 200, 120))
                .size(13.0),
            );
            if report.dropped > 0 {
                ui.label(
                    egui::RichText::new(format!("({} unusable record(s) skipped)", report.dropped))
                        .color(egui::Color32::from_rgb(255, 190, 90))
                        .size(11.0),
                );
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("New photo").clicked() {
                    self.reset();
                }
            });
        });
        ui.separator();

        egui::ScrollArea::vertical().show(ui, |ui| {
            for item in &report.analysis.vocabulary {
                egui::Frame::group(ui.style()).show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.label(
                            egui::RichText::new(&item.word)
                                .color(egui::Color32::from_rgb(120, 190, 255))
                                .strong()
                                .size(16.0),
                        );
                        if !item.phonetic.is_empty() {
                            ui.label(
                                egui::RichText::new(&item.phonetic)
                                    .color(egui::Color32::from_rgb(150, 150, 150))
                                    .italics()
                                    .size(13.0),
                            );
                        }
                        if self.clips.contains_key(&item.word) {
                            ui.label(
                                egui::RichText::new("♪ saved")
                                    .color(egui::Color32::from_rgb(80, 200, 120))
                                    .size(11.0),
                            )
                            .on_hover_text(
                                self.clips
                                    .get(&item.word)
                                    .map(|p| p.display().to_string())
                                    .unwrap_or_default(),
                            );
                        }
                    });
                    if !item.meaning.is_empty() {
                        ui.label(
                            egui::RichText::new(&item.meaning)
                                .color(egui::Color32::from_rgb(210, 210, 210))
                                .size(13.0),
                        );
                    }
                    if !item.location.is_empty() {
                        ui.label(
                            egui::RichText::new(format!("in the photo: {}", item.location))
                                .color(egui::Color32::from_rgb(140, 140, 140))
                                .size(11.0),
                        );
                    }
                    if !item.sentence.is_empty() {
                        ui.label(
                            egui::RichText::new(format!("\u{201c}{}\u{201d}", item.sentence))
                                .color(egui::Color32::from_rgb(180, 180, 180))
                                .italics()
                                .size(12.0),
                        );
                    }
                });
                ui.add_space(4.0);
            }

            if let Some(scenario) = &report.analysis.scenario {
                if !scenario.body.is_empty() {
                    ui.add_space(6.0);
                    ui.label(
                        egui::RichText::new(if scenario.title.is_empty() {
                            "Scenario"
                        } else {
                            scenario.title.as_str()
                        })
                        .color(egui::Color32::from_rgb(120, 190, 255))
                        .strong()
                        .size(14.0),
                    );
                    ui.label(
                        egui::RichText::new(&scenario.body)
                            .color(egui::Color32::from_rgb(190, 190, 190))
                            .size(12.0),
                    );
                }
            }
        });
    }

    /// Render the Error state: classified headline + detail + retry.
    fn draw_error(&mut self, ui: &mut egui::Ui) {
        let (headline, detail) = self
            .error
            .clone()
            .unwrap_or_else(|| ("Something went wrong".into(), String::new()));

        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.label(
                egui::RichText::new(headline)
                    .color(egui::Color32::from_rgb(255, 136, 68))
                    .strong()
                    .size(15.0),
            );
            if !detail.is_empty() {
                ui.add_space(4.0);
                ui.label(
                    egui::RichText::new(detail)
                        .color(egui::Color32::from_rgb(160, 160, 160))
                        .size(12.0),
                );
            }
            ui.add_space(10.0);
            ui.horizontal(|ui| {
                if ui.button("Try again").clicked() {
                    if self.image.is_some() {
                        self.start_analysis();
                    } else {
                        self.reset();
                    }
                }
                if ui.button("Start over").clicked() {
                    self.reset();
                }
            });
        });
    }

    /// Render the settings panel.
    fn draw_settings(&self, ui: &mut egui::Ui) {
        ui.add_space(4.0);
        let dim = egui::Color32::from_rgb(140, 140, 140);
        ui.label(egui::RichText::new("Configuration").size(12.0));
        ui.label(
            egui::RichText::new(format!(
                "  Model: {}",
                self.config
                    .selector
                    .pinned_model
                    .as_deref()
                    .unwrap_or("(auto-selected from catalog)")
            ))
            .color(dim)
            .size(11.0),
        );
        ui.label(
            egui::RichText::new(format!(
                "  Meanings in: {}",
                self.config.prompt.learner_language
            ))
            .color(dim)
            .size(11.0),
        );
        ui.label(
            egui::RichText::new(format!("  Scenario: {}", self.config.prompt.include_scenario))
                .color(dim)
                .size(11.0),
        );
        ui.label(
            egui::RichText::new(format!("  Pronunciation clips: {}", self.config.tts.enabled))
                .color(dim)
                .size(11.0),
        );
    }

    // ── Helpers ───────────────────────────────────────────────────────────

    /// A simple rotating ASCII spinner character driven by `spinner_phase`.
    fn spinner_char(&self) -> char {
        let chars = ['|', '/', '-', '\\'];
        let idx = (self.spinner_phase as usize) % chars.len();
        chars[idx]
    }
}

/// Read an image file into a [`LoadedImage`], or `None` when the extension
/// is unsupported or the file cannot be read.
fn load_image_file(path: &std::path::Path) -> Option<LoadedImage> {
    let ext = path.extension()?.to_str()?;
    let mime = mime_for_extension(ext)?;
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("cannot read {}: {e}", path.display());
            return None;
        }
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".into());
    Some(LoadedImage {
        name,
        payload: ImagePayload::new(bytes, mime),
    })
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for LearnerApp {
    /// Called every frame by eframe. Polls channels, advances the spinner,
    /// then renders the current state.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_results();
        self.poll_dropped_files(ctx);

        self.spinner_phase += 0.08;
        if self.spinner_phase >= 4.0 {
            self.spinner_phase = 0.0;
        }

        // Keep repainting while the spinner is visible or clips may arrive.
        match self.state {
            AppState::Analyzing => ctx.request_repaint_after(std::time::Duration::from_millis(66)),
            AppState::Result => ctx.request_repaint_after(std::time::Duration::from_millis(500)),
            _ => {}
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("Object Learner");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });

            if self.show_settings {
                ui.separator();
                self.draw_settings(ui);
            }
            ui.separator();

            // Clone state to avoid borrow-check issues when calling &mut self
            // methods that also reference self.state.
            let state = self.state.clone();
            match state {
                AppState::AwaitingImage => self.draw_awaiting(ui),
                AppState::ImageLoaded => self.draw_loaded(ui),
                AppState::Analyzing => self.draw_analyzing(ui),
                AppState::Result => self.draw_result(ui),
                AppState::Error => self.draw_error(ui),
            }
        });
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        log::info!("Object Learner closing");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
