//! Error types for the depth-lens-core library.
//!
//! Two layers live here:
//!
//! - [`InferenceError`] is the user-facing taxonomy of the upload-and-inference
//!   lifecycle. Each variant maps to the exact message shown to the user.
//! - [`AppError`] covers everything around it (configuration, I/O, UI,
//!   resolving depth map references).

use reqwest::StatusCode;
use thiserror::Error;

/// Shown when the depth service could not be reached at all.
pub const TRANSPORT_UNAVAILABLE_MESSAGE: &str = "Could not reach the server. Please try again later.";

/// Shown when the service rejected the request without saying why.
pub const SERVICE_FALLBACK_MESSAGE: &str = "Something went wrong.";

/// Failures of a single selection or inference attempt.
///
/// None of these are fatal: every variant leaves the session in a state
/// from which the user can pick another image or submit again.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// A dropped file did not declare an image media type.
    #[error("Dropped file is not an image (declared type: {mime_type})")]
    SelectionRejected {
        /// The media type the file declared.
        mime_type: String,
    },

    /// The request never produced a usable response.
    #[error("{}", TRANSPORT_UNAVAILABLE_MESSAGE)]
    TransportUnavailable,

    /// The service answered with a non-success status.
    #[error("{}", .message.as_deref().unwrap_or(SERVICE_FALLBACK_MESSAGE))]
    ServiceRejected {
        /// HTTP status returned by the service.
        status: StatusCode,
        /// The `error` field of the response body, if any.
        message: Option<String>,
    },
}

impl InferenceError {
    /// Creates a service rejection from a status and optional body message.
    pub fn rejected(status: StatusCode, message: Option<String>) -> Self {
        Self::ServiceRejected { status, message }
    }

    /// The text shown in the error region of the UI.
    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

/// Errors that can occur within the depth-lens-core library.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors (invalid URL, unknown model, bad timeout).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file could not be turned into an image selection.
    #[error("Could not load image: {0}")]
    ImageLoad(String),

    /// A depth map reference could not be resolved to image bytes.
    #[error("Could not resolve depth map: {0}")]
    DepthMap(String),

    /// UI-related errors (rendering, window management).
    #[error("UI error: {0}")]
    Ui(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an image loading error with the given message.
    pub fn image(msg: impl Into<String>) -> Self {
        Self::ImageLoad(msg.into())
    }

    /// Creates a depth map resolution error with the given message.
    pub fn depth_map(msg: impl Into<String>) -> Self {
        Self::DepthMap(msg.into())
    }

    /// Creates a UI error with the given message.
    pub fn ui(msg: impl Into<String>) -> Self {
        Self::Ui(msg.into())
    }
}

/// A convenient alias for Result with [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;
