use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use profile_spec::{
    FormValues, ProfileProgress, ProfileSchema, StepSpec, ValidationError, Validator,
    household_size,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::WizardError;
use crate::submission::{SubmissionGate, SubmissionOutcome};
use crate::summary::ValidationSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Editing,
    /// The last step validated; the profile can be submitted.
    ReadyToSubmit,
    Submitted,
    Abandoned,
}

impl SessionState {
    pub fn is_closed(self) -> bool {
        matches!(self, SessionState::Submitted | SessionState::Abandoned)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Editing => "editing",
            SessionState::ReadyToSubmit => "ready to submit",
            SessionState::Submitted => "submitted",
            SessionState::Abandoned => "abandoned",
        };
        f.write_str(name)
    }
}

/// Result of [`FormSession::go_next`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextStep {
    Advanced { to: usize },
    /// The last step passed validation.
    ReadyToSubmit,
    Blocked(ValidationSummary),
}

/// One wizard run: the snapshot, the step cursor and the latest field errors.
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: Arc<ProfileSchema>,
    values: FormValues,
    current: usize,
    highest_visited: usize,
    errors: BTreeMap<String, ValidationError>,
    state: SessionState,
    gate: SubmissionGate,
}

impl FormSession {
    /// Fresh session starting from the schema defaults.
    pub fn new(schema: Arc<ProfileSchema>) -> Self {
        Self::open(schema, None)
    }

    /// Opens a session, merging `initial` over the defaults for edit mode.
    ///
    /// `null` initial values keep the default; keys outside the registry are dropped.
    pub fn open(schema: Arc<ProfileSchema>, initial: Option<FormValues>) -> Self {
        let mut values = schema.defaults();
        let edit_mode = initial.is_some();
        if let Some(initial) = initial {
            for (name, value) in initial.iter() {
                if schema.field(name).is_none() {
                    warn!(field = %name, "dropping unknown initial value");
                    continue;
                }
                if value.is_null() {
                    continue;
                }
                values.set(name.clone(), value.clone());
            }
        }
        info!(
            schema = schema.id(),
            edit_mode,
            step_count = schema.step_count(),
            "profile session opened"
        );
        Self {
            schema,
            values,
            current: 0,
            highest_visited: 0,
            errors: BTreeMap::new(),
            state: SessionState::Editing,
            gate: SubmissionGate::new(),
        }
    }

    pub fn schema(&self) -> &ProfileSchema {
        &self.schema
    }

    pub fn shared_schema(&self) -> Arc<ProfileSchema> {
        Arc::clone(&self.schema)
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn value(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn highest_visited(&self) -> usize {
        self.highest_visited
    }

    pub fn step_count(&self) -> usize {
        self.schema.step_count()
    }

    pub fn current_step(&self) -> &StepSpec {
        // `current` never leaves 0..step_count and a schema always has a step.
        &self.schema.steps()[self.current]
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn errors(&self) -> &BTreeMap<String, ValidationError> {
        &self.errors
    }

    /// Latest error message per field.
    pub fn error_messages(&self) -> BTreeMap<String, String> {
        self.errors
            .iter()
            .map(|(name, error)| (name.clone(), error.message.clone()))
            .collect()
    }

    pub fn gate(&self) -> &SubmissionGate {
        &self.gate
    }

    pub fn is_submitting(&self) -> bool {
        self.gate.is_submitting()
    }

    pub fn is_first_step(&self) -> bool {
        self.current == 0
    }

    pub fn is_last_step(&self) -> bool {
        self.current + 1 == self.step_count()
    }

    pub fn can_navigate_to_step(&self, index: usize) -> bool {
        index <= self.highest_visited && index < self.step_count()
    }

    pub fn progress(&self) -> ProfileProgress {
        ProfileProgress::of(&self.schema, &self.values)
    }

    pub fn household_size(&self) -> u32 {
        household_size(&self.values)
    }

    /// Sets one value and clears that field's error until the next validation pass.
    pub fn update_field(
        &mut self,
        name: &str,
        value: impl Into<Value>,
    ) -> Result<(), WizardError> {
        self.ensure_open()?;
        if self.schema.field(name).is_none() {
            return Err(WizardError::UnknownField(name.to_string()));
        }
        self.values.set(name, value.into());
        self.errors.remove(name);
        if self.state == SessionState::ReadyToSubmit {
            self.state = SessionState::Editing;
        }
        Ok(())
    }

    /// Validates the current step without moving.
    pub fn validate_current_step(&self) -> Vec<ValidationError> {
        self.step_errors(self.current)
    }

    pub fn step_errors(&self, index: usize) -> Vec<ValidationError> {
        Validator::new(&self.schema).validate_step(index, &self.values)
    }

    /// Validates the current step and moves forward when it passes.
    pub fn go_next(&mut self) -> Result<NextStep, WizardError> {
        self.ensure_open()?;
        let step = self.current_step().clone();
        let errors = self.step_errors(self.current);

        for name in &step.fields {
            self.errors.remove(name);
        }
        if !errors.is_empty() {
            debug!(
                step = %step.id,
                error_count = errors.len(),
                "step blocked by validation"
            );
            for error in &errors {
                self.errors.insert(error.field.clone(), error.clone());
            }
            return Ok(NextStep::Blocked(ValidationSummary::new(
                step.id, step.label, errors,
            )));
        }

        if self.is_last_step() {
            self.state = SessionState::ReadyToSubmit;
            info!(step = %step.id, "last step validated");
            return Ok(NextStep::ReadyToSubmit);
        }

        self.current += 1;
        self.highest_visited = self.highest_visited.max(self.current);
        self.state = SessionState::Editing;
        info!(
            from = %step.id,
            step = self.current,
            highest_visited = self.highest_visited,
            "step advanced"
        );
        Ok(NextStep::Advanced { to: self.current })
    }

    /// Moves one step back without validation; false at the first step.
    pub fn go_back(&mut self) -> bool {
        if self.state.is_closed() || self.current == 0 {
            return false;
        }
        self.current -= 1;
        self.state = SessionState::Editing;
        true
    }

    /// Jumps to an already reached step; anything past the highest visited step is refused.
    pub fn go_to_step(&mut self, index: usize) -> bool {
        if self.state.is_closed() || !self.can_navigate_to_step(index) {
            debug!(
                requested = index,
                highest_visited = self.highest_visited,
                "step jump refused"
            );
            return false;
        }
        if index != self.current {
            self.current = index;
            self.state = SessionState::Editing;
        }
        true
    }

    /// Closes the wizard without saving.
    pub fn abandon(&mut self) {
        if self.state.is_closed() {
            return;
        }
        info!(
            schema = self.schema.id(),
            submitting = self.is_submitting(),
            "profile session abandoned"
        );
        self.state = SessionState::Abandoned;
    }

    /// Folds a submission outcome into the session; returns false when it was ignored.
    ///
    /// Outcomes arriving after the session was abandoned have no effect.
    pub fn apply_submission(&mut self, outcome: &SubmissionOutcome) -> bool {
        match self.state {
            SessionState::Abandoned => {
                warn!(?outcome, "ignoring submission outcome for an abandoned session");
                return false;
            }
            SessionState::Submitted => return false,
            SessionState::Editing | SessionState::ReadyToSubmit => {}
        }
        match outcome {
            SubmissionOutcome::Success => {
                self.errors.clear();
                self.state = SessionState::Submitted;
            }
            SubmissionOutcome::Invalid(errors) => {
                self.errors = errors
                    .iter()
                    .map(|error| (error.field.clone(), error.clone()))
                    .collect();
                self.state = SessionState::Editing;
            }
            SubmissionOutcome::Failed(_) => {
                self.state = SessionState::Editing;
            }
            SubmissionOutcome::Busy => return false,
        }
        true
    }

    fn ensure_open(&self) -> Result<(), WizardError> {
        if self.state.is_closed() {
            return Err(WizardError::SessionClosed(self.state));
        }
        Ok(())
    }
}
