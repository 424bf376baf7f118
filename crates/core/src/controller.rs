//! The single-request inference lifecycle.
//!
//! The controller follows a small state machine:
//!
//! ```text
//! Idle --submit(valid selection)--> Submitting
//! Submitting --transport error--> Failed(fixed message)
//! Submitting --response not-ok--> Failed(server message or fallback)
//! Submitting --response ok--> Succeeded(result)
//! Succeeded | Failed --selection changed--> Idle
//! ```
//!
//! Submitting is split in two halves so the outbound call can run wherever
//! the caller likes (a background thread in the UI, the main runtime in the
//! CLI): [`InferenceController::submit`] hands out a [`PendingRequest`] and
//! [`InferenceController::complete`] applies its outcome. Every pending
//! request carries a generation number, and only the outcome of the latest
//! generation is ever applied. A selection change while a request is in
//! flight therefore discards its late response.

use crate::client::{DepthClient, InferenceOutcome, InferenceRequest, InferenceResult};
use crate::model::ModelChoice;
use crate::selection::ImageSelection;
use tracing::debug;

/// Where the current inference attempt stands.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestState {
    /// Nothing submitted for the current selection.
    #[default]
    Idle,
    /// A request is in flight.
    Submitting,
    /// The service returned a depth map.
    Succeeded(InferenceResult),
    /// The attempt failed; holds the message shown to the user.
    Failed(String),
}

impl RequestState {
    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }

    pub fn result(&self) -> Option<&InferenceResult> {
        match self {
            Self::Succeeded(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// A submitted request waiting for its outcome.
#[derive(Debug)]
pub struct PendingRequest {
    generation: u64,
    request: InferenceRequest,
}

impl PendingRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn request(&self) -> &InferenceRequest {
        &self.request
    }

    pub fn into_parts(self) -> (u64, InferenceRequest) {
        (self.generation, self.request)
    }
}

/// Owner of the [`RequestState`].
#[derive(Debug, Default)]
pub struct InferenceController {
    state: RequestState,
    generation: u64,
}

impl InferenceController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Generation the next outcome must carry to be applied.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Starts a request for `selection`.
    ///
    /// Returns `None` without changing anything when there is no selection
    /// or a request is already in flight.
    pub fn submit(
        &mut self,
        selection: Option<&ImageSelection>,
        model: ModelChoice,
    ) -> Option<PendingRequest> {
        let selection = selection?;
        if self.state.is_submitting() {
            debug!("submit ignored, request already in flight");
            return None;
        }

        self.generation += 1;
        self.state = RequestState::Submitting;
        debug!(generation = self.generation, %model, "request submitted");

        Some(PendingRequest {
            generation: self.generation,
            request: InferenceRequest::new(selection, model),
        })
    }

    /// Applies the outcome of the request issued as `generation`.
    ///
    /// Returns `false` if the outcome is stale and was dropped.
    pub fn complete(&mut self, generation: u64, outcome: InferenceOutcome) -> bool {
        if generation != self.generation || !self.state.is_submitting() {
            debug!(
                generation,
                current = self.generation,
                "dropping stale inference outcome"
            );
            return false;
        }

        self.state = match outcome {
            Ok(result) => RequestState::Succeeded(result),
            Err(err) => RequestState::Failed(err.user_message()),
        };
        true
    }

    /// Clears any result or error so nothing stale renders against a new
    /// selection. An in-flight request is abandoned.
    pub fn reset(&mut self) {
        match self.state {
            RequestState::Idle => {}
            RequestState::Submitting => {
                self.generation += 1;
                self.state = RequestState::Idle;
            }
            RequestState::Succeeded(_) | RequestState::Failed(_) => {
                self.state = RequestState::Idle;
            }
        }
    }

    /// Submits, awaits the call and applies its outcome in one go.
    pub async fn run(
        &mut self,
        client: &DepthClient,
        selection: Option<&ImageSelection>,
        model: ModelChoice,
    ) -> &RequestState {
        if let Some(pending) = self.submit(selection, model) {
            let (generation, request) = pending.into_parts();
            let outcome = client.predict_depth(request).await;
            self.complete(generation, outcome);
        }
        &self.state
    }
}
