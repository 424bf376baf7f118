//! One user's selection and inference state, wired together.
//!
//! [`DepthSession`] forwards every accepted selection change to the
//! controller's reset, so a result or error never outlives the image it
//! was produced for.

use crate::client::{DepthClient, InferenceOutcome};
use crate::config::Config;
use crate::controller::{InferenceController, PendingRequest, RequestState};
use crate::error::Result;
use crate::model::ModelChoice;
use crate::preview::PreviewStore;
use crate::selection::{ImageSelection, SelectedFile, SelectionEvent, SelectionManager, SelectionSource};
use std::path::Path;

pub struct DepthSession {
    client: DepthClient,
    selection: SelectionManager,
    controller: InferenceController,
    model: ModelChoice,
}

impl DepthSession {
    /// Creates a session talking to the endpoint in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::AppError::Config`] if the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_client(DepthClient::new(config)?, config.default_model))
    }

    pub fn with_client(client: DepthClient, model: ModelChoice) -> Self {
        Self {
            client,
            selection: SelectionManager::new(),
            controller: InferenceController::new(),
            model,
        }
    }

    /// Offers a file as the new selection; resets the request state when
    /// it is accepted.
    pub fn select_file(&mut self, file: SelectedFile, source: SelectionSource) -> SelectionEvent {
        let event = self.selection.select_file(file, source);
        if event.is_changed() {
            self.controller.reset();
        }
        event
    }

    /// Loads a file from disk through the picker path.
    pub fn select_path(&mut self, path: impl AsRef<Path>) -> Result<SelectionEvent> {
        let file = SelectedFile::from_path(path)?;
        Ok(self.select_file(file, SelectionSource::Picker))
    }

    pub fn current_selection(&self) -> Option<&ImageSelection> {
        self.selection.current_selection()
    }

    pub fn previews(&self) -> &PreviewStore {
        self.selection.previews()
    }

    pub fn model(&self) -> ModelChoice {
        self.model
    }

    pub fn set_model(&mut self, model: ModelChoice) {
        self.model = model;
    }

    pub fn state(&self) -> &RequestState {
        self.controller.state()
    }

    pub fn client(&self) -> &DepthClient {
        &self.client
    }

    /// Whether the submit trigger should be enabled.
    pub fn can_submit(&self) -> bool {
        self.current_selection().is_some() && !self.state().is_submitting()
    }

    /// Starts a request for the current selection; see
    /// [`InferenceController::submit`].
    pub fn submit(&mut self) -> Option<PendingRequest> {
        self.controller
            .submit(self.selection.current_selection(), self.model)
    }

    /// Applies an outcome; returns `false` if it was stale.
    pub fn complete(&mut self, generation: u64, outcome: InferenceOutcome) -> bool {
        self.controller.complete(generation, outcome)
    }

    /// Submits and awaits the result on the current task.
    pub async fn run_submit(&mut self) -> &RequestState {
        self.controller
            .run(&self.client, self.selection.current_selection(), self.model)
            .await
    }

    /// Drops the selection and any result tied to it.
    pub fn clear(&mut self) {
        self.selection.clear();
        self.controller.reset();
    }
}
