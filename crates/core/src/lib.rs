//! depth-lens Core Library
//!
//! This library provides the core functionality for depth-lens, a client
//! for a remote depth-estimation service: pick an image, upload it, and
//! view the returned depth map next to the original.
//!
//! # Overview
//!
//! - **Selection**: the current image and its revocable preview via
//!   [`selection`] and [`preview`]
//! - **Inference**: the single-request lifecycle via [`controller`], with
//!   the HTTP transport in [`client`]
//! - **Depth maps**: turning the service's reference into bytes via [`depth_map`]
//! - **User Interface**: the desktop window via [`ui`]
//!
//! # Quick Start
//!
//! ```ignore
//! use depth_lens_core::DepthLens;
//!
//! let app = DepthLens::new()?;
//! let mut session = app.session()?;
//! session.select_path("room.jpg")?;
//! let state = session.run_submit().await;
//! ```
//!
//! # Module Structure
//!
//! - [`client`]: Depth service HTTP client and wire types
//! - [`config`]: Configuration loading and management
//! - [`controller`]: Request state machine
//! - [`depth_map`]: Depth map reference resolution
//! - [`error`]: Error types and result aliases
//! - [`model`]: Inference model choice
//! - [`preview`]: Locally resolvable preview references
//! - [`selection`]: Image selection management
//! - [`session`]: Selection and controller wired together
//! - [`ui`]: User interface components

pub mod client;
pub mod config;
pub mod controller;
pub mod depth_map;
pub mod error;
pub mod model;
pub mod preview;
pub mod selection;
pub mod session;
pub mod ui;

// Re-export primary types for convenience
pub use client::{DepthClient, InferenceRequest, InferenceResult};
pub use config::Config;
pub use controller::{InferenceController, RequestState};
pub use error::{AppError, InferenceError, Result};
pub use model::ModelChoice;
pub use selection::{SelectedFile, SelectionEvent, SelectionSource};
pub use session::DepthSession;

use std::path::PathBuf;

/// Main entry point for depth-lens.
///
/// Holds the configuration and creates sessions or the desktop window
/// from it.
pub struct DepthLens {
    config: Config,
}

impl DepthLens {
    /// Creates an instance from environment configuration.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] if an environment variable holds an
    /// invalid value.
    pub fn new() -> Result<Self> {
        Ok(Self {
            config: Config::load()?,
        })
    }

    /// Creates an instance with custom configuration.
    pub fn with_config(config: Config) -> Self {
        Self { config }
    }

    /// Starts a fresh session against the configured service.
    pub fn session(&self) -> Result<DepthSession> {
        DepthSession::new(&self.config)
    }

    /// Opens the desktop window, optionally with an image preselected.
    pub fn run_interactive(&self, initial_image: Option<PathBuf>) -> Result<()> {
        ui::run_depth_viewer(self.config.clone(), initial_image)
    }

    /// Returns a reference to the current configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Initializes the library by loading environment variables.
///
/// Call this once at application startup before using any other functions.
pub fn init() {
    let _ = dotenvy::dotenv();
}
