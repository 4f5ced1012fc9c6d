use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use profile_spec::{FormValues, ProfileSchema, ValidationError, Validator};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::config::DEFAULT_SUBMIT_TIMEOUT_MS;
use crate::error::SaveError;
use crate::ports::ProfileStore;

pub const SAVE_FAILED_PREFIX: &str = "Er is een fout opgetreden bij het opslaan van je profiel";
pub const TIMEOUT_MESSAGE: &str = "Timeout: Profiel opslaan duurt te lang";

/// Shared "is submitting" flag of one session.
///
/// Clones observe the same flag, so a second submission through any handle is
/// rejected while the first one is in flight.
#[derive(Debug, Clone, Default)]
pub struct SubmissionGate {
    busy: Arc<AtomicBool>,
}

impl SubmissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_submitting(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn try_acquire(&self) -> Option<GateGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard { gate: self })
    }
}

/// Releases the gate when dropped, whatever the outcome (or when the submit future is dropped).
struct GateGuard<'a> {
    gate: &'a SubmissionGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.busy.store(false, Ordering::Release);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionFailure {
    #[error("saving the profile failed: {0}")]
    Save(SaveError),
    #[error("saving the profile timed out after {}ms", .after.as_millis())]
    Timeout { after: Duration },
}

impl SubmissionFailure {
    pub fn is_timeout(&self) -> bool {
        matches!(self, SubmissionFailure::Timeout { .. })
    }

    /// Retryable message for the user; timeouts and save failures share the prefix.
    pub fn user_message(&self) -> String {
        let detail = match self {
            SubmissionFailure::Save(err) => err.message.as_str(),
            SubmissionFailure::Timeout { .. } => TIMEOUT_MESSAGE,
        };
        format!("{}: {}", SAVE_FAILED_PREFIX, detail)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The store accepted the profile before the timeout.
    Success,
    /// Full validation failed; the store was not called.
    Invalid(Vec<ValidationError>),
    /// The store rejected the profile or did not answer in time.
    Failed(SubmissionFailure),
    /// Another submission of the same session is still in flight.
    Busy,
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Success)
    }
}

/// Runs the final all-or-nothing save: full validation, then the store call under a timeout.
#[derive(Debug, Clone, Copy)]
pub struct SubmissionCoordinator {
    timeout: Duration,
}

impl Default for SubmissionCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_SUBMIT_TIMEOUT_MS))
    }
}

impl SubmissionCoordinator {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn submit(
        &self,
        gate: &SubmissionGate,
        schema: &ProfileSchema,
        values: &FormValues,
        store: &dyn ProfileStore,
    ) -> SubmissionOutcome {
        if gate.is_submitting() {
            warn!("submission already in flight, ignoring");
            return SubmissionOutcome::Busy;
        }

        let errors = Validator::new(schema).validate_all(values);
        if !errors.is_empty() {
            info!(
                schema = schema.id(),
                error_count = errors.len(),
                "submission blocked by validation"
            );
            return SubmissionOutcome::Invalid(errors);
        }

        let Some(_guard) = gate.try_acquire() else {
            warn!("submission already in flight, ignoring");
            return SubmissionOutcome::Busy;
        };

        info!(
            schema = schema.id(),
            field_count = values.len(),
            timeout_ms = self.timeout.as_millis() as u64,
            "submission started"
        );
        let started = Instant::now();
        match tokio::time::timeout(self.timeout, store.save_profile(values)).await {
            Ok(Ok(())) => {
                info!(
                    schema = schema.id(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "submission succeeded"
                );
                SubmissionOutcome::Success
            }
            Ok(Err(err)) => {
                warn!(
                    schema = schema.id(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %err,
                    "submission failed"
                );
                SubmissionOutcome::Failed(SubmissionFailure::Save(err))
            }
            Err(_) => {
                warn!(
                    schema = schema.id(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "submission timed out"
                );
                SubmissionOutcome::Failed(SubmissionFailure::Timeout {
                    after: self.timeout,
                })
            }
        }
    }
}

/// A submission detached from its session, so the caller keeps driving the session
/// (navigation, edits, abandon) while the save is in flight.
///
/// Owns a snapshot of the values taken when it was started. Feed the outcome of
/// [`PendingSubmission::run`] back through the controller's `finish_submit`.
pub struct PendingSubmission {
    coordinator: SubmissionCoordinator,
    gate: SubmissionGate,
    schema: Arc<ProfileSchema>,
    values: FormValues,
    store: Arc<dyn ProfileStore>,
}

impl PendingSubmission {
    pub fn new(
        coordinator: SubmissionCoordinator,
        gate: SubmissionGate,
        schema: Arc<ProfileSchema>,
        values: FormValues,
        store: Arc<dyn ProfileStore>,
    ) -> Self {
        Self {
            coordinator,
            gate,
            schema,
            values,
            store,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub async fn run(self) -> SubmissionOutcome {
        self.coordinator
            .submit(&self.gate, &self.schema, &self.values, self.store.as_ref())
            .await
    }
}
