use std::collections::BTreeMap;
use std::sync::Arc;

use profile_spec::tenant::fields::PROFILE_PICTURE_URL;
use profile_spec::{FormValues, ProfileSchema, StepSpec, ValidationError, step_percentage};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::config::WizardConfig;
use crate::error::WizardError;
use crate::ports::{PictureUpload, PictureUploader, ProfileSource, ProfileStore};
use crate::session::{FormSession, NextStep, SessionState};
use crate::submission::{PendingSubmission, SubmissionCoordinator, SubmissionOutcome};

pub const NEXT_LABEL: &str = "Volgende";
pub const BACK_LABEL: &str = "Vorige";
pub const SUBMIT_LABEL: &str = "Profiel Opslaan";
pub const SUBMITTING_LABEL: &str = "Bezig met opslaan...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Current,
    /// Reached before and open for a direct jump.
    Available,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepperItem {
    pub index: usize,
    pub id: String,
    pub label: String,
    pub status: StepStatus,
}

/// What the navigation bar renders for the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavigationView {
    /// 1-based, as shown in "Stap 2 van 7".
    pub step_number: usize,
    pub step_count: usize,
    pub is_first: bool,
    pub is_last: bool,
    pub is_submitting: bool,
    pub can_submit: bool,
    pub back_label: &'static str,
    pub primary_label: &'static str,
    pub progress_percent: u8,
}

/// Composition root handed to the step views: one session, its coordinator and collaborators.
pub struct WizardController {
    session: FormSession,
    coordinator: SubmissionCoordinator,
    store: Arc<dyn ProfileStore>,
    uploader: Option<Arc<dyn PictureUploader>>,
}

impl WizardController {
    pub fn new(schema: &ProfileSchema, config: &WizardConfig, store: Arc<dyn ProfileStore>) -> Self {
        Self::with_initial(schema, config, store, None)
    }

    /// Edit mode: `initial` is merged over the defaults.
    pub fn with_initial(
        schema: &ProfileSchema,
        config: &WizardConfig,
        store: Arc<dyn ProfileStore>,
        initial: Option<FormValues>,
    ) -> Self {
        let schema = Arc::new(config.apply(schema));
        Self {
            session: FormSession::open(schema, initial),
            coordinator: SubmissionCoordinator::new(config.submit_timeout()),
            store,
            uploader: None,
        }
    }

    /// Opens the wizard with whatever `source` has for the current user.
    pub async fn open_from(
        schema: &ProfileSchema,
        config: &WizardConfig,
        store: Arc<dyn ProfileStore>,
        source: &dyn ProfileSource,
    ) -> Result<Self, WizardError> {
        let initial = source.load_initial_data().await?;
        Ok(Self::with_initial(schema, config, store, initial))
    }

    pub fn with_uploader(mut self, uploader: Arc<dyn PictureUploader>) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn session(&self) -> &FormSession {
        &self.session
    }

    pub fn get_current_step(&self) -> &StepSpec {
        self.session.current_step()
    }

    pub fn get_values(&self) -> &FormValues {
        self.session.values()
    }

    pub fn get_errors(&self) -> BTreeMap<String, String> {
        self.session.error_messages()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn update_field(&mut self, name: &str, value: impl Into<Value>) -> Result<(), WizardError> {
        self.session.update_field(name, value)
    }

    pub fn go_next(&mut self) -> Result<NextStep, WizardError> {
        self.session.go_next()
    }

    pub fn go_back(&mut self) -> bool {
        self.session.go_back()
    }

    pub fn go_to_step(&mut self, index: usize) -> bool {
        self.session.go_to_step(index)
    }

    pub fn validate_current_step(&self) -> Vec<ValidationError> {
        self.session.validate_current_step()
    }

    pub fn step_errors(&self, index: usize) -> Vec<ValidationError> {
        self.session.step_errors(index)
    }

    pub fn is_first_step(&self) -> bool {
        self.session.is_first_step()
    }

    pub fn is_last_step(&self) -> bool {
        self.session.is_last_step()
    }

    pub fn can_navigate_to_step(&self, index: usize) -> bool {
        self.session.can_navigate_to_step(index)
    }

    pub fn is_submitting(&self) -> bool {
        self.session.is_submitting()
    }

    /// Validates everything and saves through the store under the configured timeout.
    pub async fn submit(&mut self) -> Result<SubmissionOutcome, WizardError> {
        let outcome = self.start_submit()?.run().await;
        self.finish_submit(&outcome);
        Ok(outcome)
    }

    /// Detaches a submission of the current values; the session stays usable while it runs.
    pub fn start_submit(&self) -> Result<PendingSubmission, WizardError> {
        if self.session.state().is_closed() {
            return Err(WizardError::SessionClosed(self.session.state()));
        }
        Ok(PendingSubmission::new(
            self.coordinator,
            self.session.gate().clone(),
            self.session.shared_schema(),
            self.session.values().clone(),
            Arc::clone(&self.store),
        ))
    }

    /// Applies the outcome of a started submission. Returns false when the session
    /// ignored it (abandoned, already submitted, or the submission was busy).
    pub fn finish_submit(&mut self, outcome: &SubmissionOutcome) -> bool {
        self.session.apply_submission(outcome)
    }

    /// Uploads the picture and stores its URL in the snapshot. Schemas without a
    /// picture field are refused before anything is uploaded.
    pub async fn upload_profile_picture(
        &mut self,
        upload: PictureUpload,
    ) -> Result<String, WizardError> {
        let uploader = self.uploader.clone().ok_or(WizardError::NoUploader)?;
        if self.session.schema().field(PROFILE_PICTURE_URL).is_none() {
            return Err(WizardError::UnknownField(PROFILE_PICTURE_URL.to_string()));
        }
        let file_name = upload.file_name.clone();
        let url = uploader.upload_profile_picture(upload).await?;
        self.session
            .update_field(PROFILE_PICTURE_URL, Value::String(url.clone()))?;
        info!(file = %file_name, "profile picture uploaded");
        Ok(url)
    }

    pub fn abandon(&mut self) {
        self.session.abandon();
    }

    pub fn stepper(&self) -> Vec<StepperItem> {
        let current = self.session.current_index();
        let highest = self.session.highest_visited();
        self.session
            .schema()
            .steps()
            .iter()
            .enumerate()
            .map(|(index, step)| {
                let status = if index < current && self.session.step_errors(index).is_empty() {
                    StepStatus::Completed
                } else if index < current {
                    StepStatus::Available
                } else if index == current {
                    StepStatus::Current
                } else if index <= highest {
                    StepStatus::Available
                } else {
                    StepStatus::Locked
                };
                StepperItem {
                    index,
                    id: step.id.clone(),
                    label: step.label.clone(),
                    status,
                }
            })
            .collect()
    }

    pub fn navigation(&self) -> NavigationView {
        let is_last = self.session.is_last_step();
        let is_submitting = self.session.is_submitting();
        let primary_label = if is_submitting {
            SUBMITTING_LABEL
        } else if is_last {
            SUBMIT_LABEL
        } else {
            NEXT_LABEL
        };
        NavigationView {
            step_number: self.session.current_index() + 1,
            step_count: self.session.step_count(),
            is_first: self.session.is_first_step(),
            is_last,
            is_submitting,
            can_submit: is_last && !is_submitting && !self.session.state().is_closed(),
            back_label: BACK_LABEL,
            primary_label,
            progress_percent: step_percentage(
                self.session.current_index(),
                self.session.step_count(),
            ),
        }
    }
}
