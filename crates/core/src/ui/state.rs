//! UI state types and event definitions.

use crate::client::InferenceOutcome;
use crate::controller::RequestState;
use crate::session::DepthSession;
use eframe::egui;

/// What the window is currently showing.
///
/// Derived from the session on every frame:
/// `Empty` -> `Previewing` -> `Submitting` -> `Result` | `Error`,
/// and back to `Previewing` whenever a new image is picked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewPhase {
    /// No image selected yet.
    Empty,
    /// An image is selected and nothing has been submitted for it.
    Previewing,
    /// Waiting for the depth service.
    Submitting,
    /// A depth map is available.
    Result,
    /// The last attempt failed.
    Error,
}

impl ViewPhase {
    pub fn of(session: &DepthSession) -> Self {
        if session.current_selection().is_none() {
            return Self::Empty;
        }
        match session.state() {
            RequestState::Idle => Self::Previewing,
            RequestState::Submitting => Self::Submitting,
            RequestState::Succeeded(_) => Self::Result,
            RequestState::Failed(_) => Self::Error,
        }
    }
}

/// Events sent from background tasks to the UI thread.
pub(crate) enum UiEvent {
    /// The depth service call for `generation` finished.
    Inference {
        generation: u64,
        outcome: InferenceOutcome,
    },
    /// A depth map reference was fetched and decoded.
    DepthMap {
        reference: String,
        image: std::result::Result<egui::ColorImage, String>,
    },
}
