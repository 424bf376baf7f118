//! Image selection and preview ownership.
//!
//! The [`SelectionManager`] holds at most one [`ImageSelection`]. Every
//! selection owns exactly one [`PreviewHandle`]; replacing or clearing the
//! selection drops the old handle before a new one is allocated, so a
//! session never has more than one live preview.
//!
//! # Example
//!
//! ```ignore
//! use depth_lens_core::selection::{SelectedFile, SelectionManager, SelectionSource};
//!
//! let mut manager = SelectionManager::new();
//! let file = SelectedFile::from_path("photo.jpg")?;
//! manager.select_file(file, SelectionSource::Picker);
//! assert!(manager.current_selection().is_some());
//! ```

use crate::error::{AppError, InferenceError, Result};
use crate::preview::{PreviewHandle, PreviewStore};
use bytes::Bytes;
use image::ImageFormat;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Media type used when nothing better can be determined.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A file handed over by the file picker or a drop, before it becomes a selection.
#[derive(Clone, Debug)]
pub struct SelectedFile {
    /// File name without directories, as sent in the upload.
    pub name: String,
    /// The media type the file declares.
    pub mime_type: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, deriving its media type from the content
    /// and then from the extension.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Io`] if the file cannot be read and
    /// [`AppError::ImageLoad`] if it is empty.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        if bytes.is_empty() {
            return Err(AppError::image(format!("{} is empty", path.display())));
        }

        let mime_type = image::guess_format(&bytes)
            .ok()
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|| mime_type_for_path(path));

        Ok(Self::new(file_name_of(path), mime_type, bytes))
    }

    /// Whether the declared media type is an image type.
    pub fn is_image(&self) -> bool {
        self.mime_type
            .trim()
            .to_ascii_lowercase()
            .starts_with("image/")
    }
}

/// Media type implied by a file extension, or [`FALLBACK_MIME_TYPE`].
pub fn mime_type_for_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME_TYPE.to_string())
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string())
}

/// How a file reached the selection manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// The OS file dialog, already filtered to images.
    Picker,
    /// Drag and drop. The declared media type must be an image type.
    Drop,
}

/// Result of offering a file to the selection manager.
#[derive(Debug, Clone, PartialEq)]
pub enum SelectionEvent {
    /// The file became the current selection.
    Changed,
    /// The file was ignored and nothing changed.
    Rejected(InferenceError),
}

impl SelectionEvent {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed)
    }
}

/// The currently chosen image and its preview.
#[derive(Debug)]
pub struct ImageSelection {
    file: SelectedFile,
    preview: PreviewHandle,
}

impl ImageSelection {
    pub fn bytes(&self) -> &Bytes {
        &self.file.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.file.mime_type
    }

    pub fn file_name(&self) -> &str {
        &self.file.name
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }
}

/// Owner of the current [`ImageSelection`].
#[derive(Debug, Default)]
pub struct SelectionManager {
    previews: PreviewStore,
    current: Option<ImageSelection>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager that issues previews from an existing store.
    pub fn with_store(previews: PreviewStore) -> Self {
        Self {
            previews,
            current: None,
        }
    }

    /// Offers a file as the new selection.
    ///
    /// Drops whose declared media type is not an image type are rejected
    /// without touching the current selection. Otherwise the previous
    /// preview is revoked, a new one is allocated and
    /// [`SelectionEvent::Changed`] is returned.
    pub fn select_file(&mut self, file: SelectedFile, source: SelectionSource) -> SelectionEvent {
        if source == SelectionSource::Drop && !file.is_image() {
            debug!(name = %file.name, mime = %file.mime_type, "ignoring non-image drop");
            return SelectionEvent::Rejected(InferenceError::SelectionRejected {
                mime_type: file.mime_type,
            });
        }

        // Revoke before allocating so two previews are never live at once.
        self.current = None;

        let preview = self.previews.create(file.bytes.clone());
        debug!(
            name = %file.name,
            mime = %file.mime_type,
            size = file.bytes.len(),
            ?source,
            "selection changed"
        );
        self.current = Some(ImageSelection { file, preview });

        SelectionEvent::Changed
    }

    pub fn current_selection(&self) -> Option<&ImageSelection> {
        self.current.as_ref()
    }

    /// Drops the current selection and revokes its preview.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// The store previews are issued from.
    pub fn previews(&self) -> &PreviewStore {
        &self.previews
    }
}
