//! Main depth viewer application.
//!
//! This module contains the `DepthViewer` struct which implements the
//! `eframe::App` trait: model selector, drop/click target, submit button,
//! error line and the original/depth map comparison.

use super::rendering::{comparison_card, decode_color_image, fit_size, result_summary};
use super::settings::Settings;
use super::state::{UiEvent, ViewPhase};
use crate::config::Config;
use crate::depth_map;
use crate::error::{AppError, Result};
use crate::model::AVAILABLE_MODELS;
use crate::selection::{mime_type_for_path, SelectedFile, SelectionSource};
use crate::session::DepthSession;
use bytes::Bytes;
use eframe::egui;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use tokio::runtime::Runtime;
use tracing::{debug, warn};

/// Extensions offered by the file dialog.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

const DROPZONE_HEIGHT: f32 = 260.0;

/// A texture together with the reference it was built from.
struct LoadedTexture {
    source: String,
    texture: egui::TextureHandle,
}

/// The depth estimation window.
pub struct DepthViewer {
    session: DepthSession,
    settings: Settings,

    // Background work
    runtime: Runtime,
    rx: Receiver<UiEvent>,
    tx: Sender<UiEvent>,

    // Textures
    /// Preview URL the preview texture was built from.
    preview_source: Option<String>,
    preview: Option<egui::TextureHandle>,
    depth_map: Option<LoadedTexture>,
    depth_map_pending: Option<String>,
    /// Reference that failed to load, with the reason.
    depth_map_error: Option<(String, String)>,
}

impl DepthViewer {
    /// Creates a viewer for `config`.
    ///
    /// # Errors
    /// Returns an error if the HTTP client or the async runtime cannot be
    /// created.
    pub fn new(config: &Config) -> Result<Self> {
        let settings = Settings::load(config.default_model);
        let mut session = DepthSession::new(config)?;
        session.set_model(settings.model);

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| AppError::ui(format!("Failed to create async runtime: {}", e)))?;

        let (tx, rx) = channel();

        Ok(Self {
            session,
            settings,
            runtime,
            rx,
            tx,
            preview_source: None,
            preview: None,
            depth_map: None,
            depth_map_pending: None,
            depth_map_error: None,
        })
    }

    /// Preselects an image from disk, as if picked in the file dialog.
    pub fn preselect(&mut self, path: &Path) -> Result<()> {
        self.session.select_path(path)?;
        Ok(())
    }

    /// Picks an image through the OS file dialog.
    fn open_file_dialog(&mut self) {
        let mut dialog = rfd::FileDialog::new()
            .add_filter("Images", IMAGE_EXTENSIONS)
            .set_title("Select Image");
        if let Some(dir) = &self.settings.last_directory {
            dialog = dialog.set_directory(dir);
        }

        let Some(path) = dialog.pick_file() else {
            return;
        };
        self.settings.last_directory = path.parent().map(Path::to_path_buf);

        if let Err(e) = self.session.select_path(&path) {
            warn!(path = %path.display(), error = %e, "failed to load picked image");
        }
    }

    /// Offers the first file dropped this frame to the session.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        let bytes = match (&file.bytes, &file.path) {
            (Some(bytes), _) => Bytes::from(bytes.to_vec()),
            (None, Some(path)) => match fs::read(path) {
                Ok(bytes) => Bytes::from(bytes),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to read dropped file");
                    return;
                }
            },
            (None, None) => return,
        };

        // Native drops often carry no media type; fall back to the extension.
        let mime_type = if file.mime.is_empty() {
            file.path
                .as_deref()
                .map(mime_type_for_path)
                .unwrap_or_default()
        } else {
            file.mime.clone()
        };
        let name = if file.name.is_empty() {
            file.path
                .as_deref()
                .and_then(Path::file_name)
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string())
        } else {
            file.name.clone()
        };

        self.session
            .select_file(SelectedFile::new(name, mime_type, bytes), SelectionSource::Drop);
    }

    /// Submits the current selection on the background runtime.
    fn submit(&mut self, ctx: &egui::Context) {
        self.settings.model = self.session.model();
        if let Err(e) = self.settings.save() {
            warn!(error = %e, "failed to save settings");
        }

        let Some(pending) = self.session.submit() else {
            return;
        };
        let (generation, request) = pending.into_parts();
        let client = self.session.client().clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let outcome = client.predict_depth(request).await;
            let _ = tx.send(UiEvent::Inference {
                generation,
                outcome,
            });
            ctx.request_repaint();
        });
    }

    /// Fetches and decodes the depth map of the current result, once.
    fn request_depth_map(&mut self, ctx: &egui::Context) {
        let Some(result) = self.session.state().result() else {
            return;
        };
        let reference = result.depth_map.clone();

        let already_loaded = self
            .depth_map
            .as_ref()
            .is_some_and(|loaded| loaded.source == reference);
        let already_failed = self
            .depth_map_error
            .as_ref()
            .is_some_and(|(source, _)| *source == reference);
        if already_loaded
            || already_failed
            || self.depth_map_pending.as_deref() == Some(reference.as_str())
        {
            return;
        }

        self.depth_map_pending = Some(reference.clone());
        self.depth_map_error = None;

        let http = self.session.client().http().clone();
        let tx = self.tx.clone();
        let ctx = ctx.clone();

        self.runtime.spawn(async move {
            let image = match depth_map::resolve(&reference, &http).await {
                Ok(bytes) => decode_color_image(&bytes).map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            let _ = tx.send(UiEvent::DepthMap { reference, image });
            ctx.request_repaint();
        });
    }

    /// Processes events from background tasks.
    fn process_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                UiEvent::Inference {
                    generation,
                    outcome,
                } => {
                    if !self.session.complete(generation, outcome) {
                        debug!(generation, "ignored response for a previous selection");
                    }
                }
                UiEvent::DepthMap { reference, image } => {
                    if self.depth_map_pending.as_deref() != Some(reference.as_str()) {
                        continue;
                    }
                    self.depth_map_pending = None;
                    match image {
                        Ok(image) => {
                            let texture =
                                ctx.load_texture("depth-map", image, egui::TextureOptions::LINEAR);
                            self.depth_map = Some(LoadedTexture {
                                source: reference,
                                texture,
                            });
                        }
                        Err(e) => {
                            warn!(error = %e, "failed to display depth map");
                            self.depth_map_error = Some((reference, e));
                        }
                    }
                }
            }
        }
    }

    /// Keeps the preview texture in step with the current selection and
    /// drops depth map textures that no longer belong to a result.
    fn sync_textures(&mut self, ctx: &egui::Context) {
        let current_url = self
            .session
            .current_selection()
            .map(|selection| selection.preview().url().to_string());

        if self.preview_source != current_url {
            self.preview = current_url.as_deref().and_then(|url| {
                let bytes = self.session.previews().resolve(url)?;
                match decode_color_image(&bytes) {
                    Ok(image) => Some(ctx.load_texture("preview", image, egui::TextureOptions::LINEAR)),
                    Err(e) => {
                        debug!(error = %e, "selected file has no renderable preview");
                        None
                    }
                }
            });
            self.preview_source = current_url;
        }

        if self.session.state().result().is_none() {
            self.depth_map = None;
            self.depth_map_pending = None;
            self.depth_map_error = None;
        }
    }

    /// Renders the model selector.
    fn render_controls(&mut self, ui: &mut egui::Ui) {
        let mut model = self.session.model();
        ui.horizontal(|ui| {
            egui::ComboBox::from_label("Model")
                .selected_text(model.label())
                .show_ui(ui, |ui| {
                    for choice in AVAILABLE_MODELS {
                        ui.selectable_value(&mut model, *choice, choice.label());
                    }
                });
        });
        self.session.set_model(model);
    }

    /// Renders the click/drop target. Returns `true` when it was clicked.
    fn render_dropzone(&self, ui: &mut egui::Ui, hovering: bool) -> bool {
        let stroke_color = if hovering {
            egui::Color32::LIGHT_BLUE
        } else {
            egui::Color32::GRAY
        };

        let inner = egui::Frame::group(ui.style())
            .stroke(egui::Stroke::new(1.5, stroke_color))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_size(egui::vec2(ui.available_width(), DROPZONE_HEIGHT));
                ui.vertical_centered(|ui| match &self.preview {
                    Some(preview) => {
                        let max = egui::vec2(ui.available_width(), DROPZONE_HEIGHT);
                        let size = fit_size(preview.size_vec2(), max);
                        ui.add(egui::Image::new((preview.id(), size)));
                    }
                    None if self.session.current_selection().is_some() => {
                        ui.label("Preview unavailable");
                    }
                    None => {
                        ui.add_space(DROPZONE_HEIGHT / 2.0 - 20.0);
                        ui.heading("+");
                        ui.label("Click or drag an image here");
                    }
                });
            });

        inner
            .response
            .interact(egui::Sense::click())
            .on_hover_cursor(egui::CursorIcon::PointingHand)
            .clicked()
    }

    /// Renders the submit button. Returns `true` when it was clicked.
    fn render_submit(&self, ui: &mut egui::Ui, phase: ViewPhase) -> bool {
        if phase == ViewPhase::Empty {
            return false;
        }

        let submitting = phase == ViewPhase::Submitting;
        let label = if submitting {
            "Estimating depth..."
        } else {
            "Estimate Depth"
        };

        ui.horizontal(|ui| {
            let clicked = ui
                .add_enabled(self.session.can_submit(), egui::Button::new(label))
                .clicked();
            if submitting {
                ui.spinner();
            }
            clicked
        })
        .inner
    }

    /// Renders the side-by-side original/depth map comparison.
    fn render_results(&self, ui: &mut egui::Ui) {
        let Some(result) = self.session.state().result() else {
            return;
        };

        ui.separator();
        ui.heading("Results");
        ui.label(result_summary(result));

        let card_width = (ui.available_width() / 2.0 - 16.0).max(64.0);
        let max_size = egui::vec2(card_width, card_width);
        let depth_placeholder = match &self.depth_map_error {
            Some((_, e)) => e.as_str(),
            None => "Loading depth map...",
        };

        ui.horizontal_top(|ui| {
            comparison_card(
                ui,
                "Original",
                self.preview.as_ref(),
                "Preview unavailable",
                max_size,
            );
            comparison_card(
                ui,
                "Depth Map",
                self.depth_map.as_ref().map(|d| &d.texture),
                depth_placeholder,
                max_size,
            );
        });
    }
}

impl eframe::App for DepthViewer {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Enforce dark mode
        ctx.set_visuals(egui::Visuals::dark());

        self.process_events(ctx);
        self.handle_dropped_files(ctx);
        self.sync_textures(ctx);
        self.request_depth_map(ctx);

        let hovering = ctx.input(|i| !i.raw.hovered_files.is_empty());
        let phase = ViewPhase::of(&self.session);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.vertical_centered(|ui| {
                    ui.heading("Depth Estimation");
                    ui.label("Upload an image and predict its depth map using AI");
                });
                ui.add_space(8.0);

                self.render_controls(ui);
                ui.add_space(8.0);

                if self.render_dropzone(ui, hovering) {
                    self.open_file_dialog();
                }
                ui.add_space(8.0);

                if self.render_submit(ui, phase) {
                    self.submit(ctx);
                }

                if let Some(error) = self.session.state().error() {
                    ui.label(egui::RichText::new(error).color(egui::Color32::RED));
                }

                self.render_results(ui);
            });
        });
    }
}

/// Launches the depth viewer and returns when the window is closed.
///
/// # Arguments
/// * `config` - Application configuration
/// * `initial_image` - Image to preselect, if any
pub fn run(config: Config, initial_image: Option<PathBuf>) -> Result<()> {
    let mut viewer = DepthViewer::new(&config)?;
    if let Some(path) = initial_image {
        viewer.preselect(&path)?;
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([960.0, 760.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Depth Estimation",
        options,
        Box::new(move |_cc| Ok(Box::new(viewer) as Box<dyn eframe::App>)),
    )
    .map_err(|e| AppError::ui(format!("Failed to run UI: {}", e)))
}
