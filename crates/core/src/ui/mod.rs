//! User interface components for depth-lens.
//!
//! This module provides a desktop window for picking an image, sending it
//! to the depth service and comparing the result with the original.
//!
//! # Architecture
//!
//! The UI is split into focused submodules:
//! - [`state`]: View phases and background event definitions
//! - [`settings`]: User preferences and persistence
//! - [`rendering`]: Texture decoding, sizing and comparison cards
//! - [`depth_viewer`]: Main application logic
//!
//! # Usage
//!
//! ```ignore
//! use depth_lens_core::{ui, Config};
//!
//! let config = Config::load()?;
//! ui::run_depth_viewer(config, None)?;
//! ```

mod depth_viewer;
mod rendering;
mod settings;
mod state;

// Public API exports
pub use depth_viewer::DepthViewer;
pub use rendering::{decode_color_image, fit_size, result_summary};
pub use settings::Settings;
pub use state::ViewPhase;

use crate::config::Config;
use crate::error::Result;
use std::path::PathBuf;

/// Opens the depth viewer window and blocks until it is closed.
///
/// # Arguments
/// * `config` - Application configuration with the service endpoint
/// * `initial_image` - Image to preselect, as if picked in the file dialog
///
/// # Errors
/// Returns an error if the initial image cannot be read or the window
/// cannot be created.
pub fn run_depth_viewer(config: Config, initial_image: Option<PathBuf>) -> Result<()> {
    depth_viewer::run(config, initial_image)
}
