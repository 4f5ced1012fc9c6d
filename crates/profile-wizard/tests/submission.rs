use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use huurly_profile_wizard::{
    FormSession, ProfileStore, SaveError, SessionState, SubmissionCoordinator, SubmissionFailure,
    SubmissionGate, SubmissionOutcome, WizardConfig, WizardController, WizardError,
};
use profile_spec::{FieldKind, FieldSpec, FormValues, ProfileSchema, SchemaDef, StepSpec};
use serde_json::json;

/// Store answering each call after its scripted delay; `None` never answers.
struct ScriptedStore {
    delays: Vec<Option<Duration>>,
    fail_with: Option<&'static str>,
    calls: AtomicUsize,
}

impl ScriptedStore {
    fn answering_after(delay: Duration) -> Self {
        Self::scripted(vec![Some(delay)])
    }

    fn hanging() -> Self {
        Self::scripted(vec![None])
    }

    fn scripted(delays: Vec<Option<Duration>>) -> Self {
        Self {
            delays,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing(message: &'static str) -> Self {
        Self {
            delays: vec![Some(Duration::from_millis(50))],
            fail_with: Some(message),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for ScriptedStore {
    async fn save_profile(&self, _values: &FormValues) -> Result<(), SaveError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self
            .delays
            .get(call)
            .or_else(|| self.delays.last())
            .copied()
            .flatten();
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => std::future::pending::<()>().await,
        }
        match self.fail_with {
            Some(message) => Err(SaveError::new(message)),
            None => Ok(()),
        }
    }
}

fn schema() -> ProfileSchema {
    let field = |name: &str, label: &str| {
        FieldSpec::new(name, label, FieldKind::text(), format!("{label} is verplicht")).required()
    };
    ProfileSchema::new(SchemaDef {
        id: "submission".into(),
        title: "Submission".into(),
        version: "1.0.0".into(),
        description: None,
        fields: vec![field("first_name", "Voornaam"), field("bio", "Bio")],
        steps: vec![
            StepSpec::new("personal", "Persoonlijke Info", ["first_name"]),
            StepSpec::new("motivation", "Profiel & Motivatie", ["bio"]),
        ],
        rules: vec![],
    })
    .unwrap()
}

fn complete_values() -> FormValues {
    FormValues::from_value(json!({ "first_name": "Sanne", "bio": "Rustige huurder" }))
}

fn controller(store: Arc<ScriptedStore>, values: Option<FormValues>) -> WizardController {
    WizardController::with_initial(&schema(), &WizardConfig::default(), store, values)
}

#[tokio::test(start_paused = true)]
async fn save_before_the_timeout_succeeds() {
    let store = Arc::new(ScriptedStore::answering_after(Duration::from_millis(500)));
    let mut wizard = controller(store.clone(), Some(complete_values()));

    let outcome = wizard.submit().await.unwrap();

    assert_eq!(outcome, SubmissionOutcome::Success);
    assert_eq!(wizard.state(), SessionState::Submitted);
    assert!(!wizard.is_submitting());
    assert_eq!(store.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn hanging_save_times_out_at_the_bound_and_can_be_retried() {
    let store = Arc::new(ScriptedStore::scripted(vec![
        None,
        Some(Duration::from_millis(200)),
    ]));
    let mut wizard = controller(store.clone(), Some(complete_values()));

    let started = tokio::time::Instant::now();
    let outcome = wizard.submit().await.unwrap();
    let elapsed = started.elapsed();

    let SubmissionOutcome::Failed(failure) = outcome else {
        panic!("expected a timeout, got {outcome:?}");
    };
    assert!(failure.is_timeout());
    assert_eq!(
        failure,
        SubmissionFailure::Timeout {
            after: Duration::from_secs(30)
        }
    );
    assert_eq!(
        failure.user_message(),
        "Er is een fout opgetreden bij het opslaan van je profiel: Timeout: Profiel opslaan duurt te lang"
    );
    assert!(elapsed >= Duration::from_secs(30));
    assert!(elapsed < Duration::from_secs(31));
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.state(), SessionState::Editing);
    assert_eq!(wizard.get_values(), &complete_values());

    let retry = wizard.submit().await.unwrap();
    assert_eq!(retry, SubmissionOutcome::Success);
    assert_eq!(store.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn configured_timeout_bounds_the_wait() {
    let store = Arc::new(ScriptedStore::hanging());
    let config = WizardConfig::from_toml_str("submit_timeout_ms = 1500").unwrap();
    let mut wizard =
        WizardController::with_initial(&schema(), &config, store, Some(complete_values()));

    let outcome = wizard.submit().await.unwrap();
    assert_eq!(
        outcome,
        SubmissionOutcome::Failed(SubmissionFailure::Timeout {
            after: Duration::from_millis(1500)
        })
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_save_keeps_the_session_editable() {
    let store = Arc::new(ScriptedStore::failing("database offline"));
    let mut wizard = controller(store.clone(), Some(complete_values()));

    let outcome = wizard.submit().await.unwrap();
    let SubmissionOutcome::Failed(failure) = outcome else {
        panic!("expected a save failure, got {outcome:?}");
    };
    assert!(!failure.is_timeout());
    assert_eq!(
        failure.user_message(),
        "Er is een fout opgetreden bij het opslaan van je profiel: database offline"
    );
    assert_eq!(wizard.state(), SessionState::Editing);
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.get_values(), &complete_values());
}

#[tokio::test(start_paused = true)]
async fn invalid_snapshot_never_reaches_the_store() {
    let store = Arc::new(ScriptedStore::answering_after(Duration::from_millis(10)));
    let mut wizard = controller(
        store.clone(),
        Some(FormValues::from_value(json!({ "first_name": "Sanne" }))),
    );

    let outcome = wizard.submit().await.unwrap();
    let SubmissionOutcome::Invalid(errors) = outcome else {
        panic!("expected validation errors, got {outcome:?}");
    };
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field, "bio");
    assert_eq!(store.calls(), 0);
    assert_eq!(wizard.get_errors().get("bio").map(String::as_str), Some("Bio is verplicht"));
    assert_eq!(wizard.state(), SessionState::Editing);
}

#[tokio::test(start_paused = true)]
async fn concurrent_submit_is_rejected_without_a_second_save() {
    let schema = schema();
    let values = complete_values();
    let store = ScriptedStore::answering_after(Duration::from_millis(500));
    let coordinator = SubmissionCoordinator::new(Duration::from_secs(30));
    let gate = SubmissionGate::new();

    let (first, second) = tokio::join!(
        coordinator.submit(&gate, &schema, &values, &store),
        coordinator.submit(&gate, &schema, &values, &store),
    );

    assert_eq!(first, SubmissionOutcome::Success);
    assert_eq!(second, SubmissionOutcome::Busy);
    assert_eq!(store.calls(), 1);
    assert!(!gate.is_submitting());
}

#[tokio::test(start_paused = true)]
async fn dropping_an_in_flight_submit_releases_the_gate() {
    let schema = schema();
    let values = complete_values();
    let store = ScriptedStore::hanging();
    let coordinator = SubmissionCoordinator::default();
    let gate = SubmissionGate::new();

    {
        let submit = coordinator.submit(&gate, &schema, &values, &store);
        tokio::pin!(submit);
        let early = tokio::time::timeout(Duration::from_millis(10), &mut submit).await;
        assert!(early.is_err());
        assert!(gate.is_submitting());
    }

    assert!(!gate.is_submitting());
    assert_eq!(store.calls(), 1);
}

#[test]
fn late_outcomes_are_ignored_after_abandon() {
    let mut session = FormSession::open(Arc::new(schema()), Some(complete_values()));
    session.abandon();

    assert!(!session.apply_submission(&SubmissionOutcome::Success));
    assert_eq!(session.state(), SessionState::Abandoned);

    let failure = SubmissionOutcome::Failed(SubmissionFailure::Save(SaveError::new("boom")));
    assert!(!session.apply_submission(&failure));
    assert_eq!(session.state(), SessionState::Abandoned);
}

#[tokio::test]
async fn submitted_sessions_refuse_another_submit() {
    let store = Arc::new(ScriptedStore::answering_after(Duration::from_millis(1)));
    let mut wizard = controller(store.clone(), Some(complete_values()));
    assert!(wizard.submit().await.unwrap().is_success());

    let again = wizard.submit().await;
    assert!(matches!(
        again,
        Err(WizardError::SessionClosed(SessionState::Submitted))
    ));
    assert_eq!(store.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn in_flight_submission_shows_in_navigation_and_keeps_the_session_usable() {
    let store = Arc::new(ScriptedStore::answering_after(Duration::from_millis(500)));
    let mut wizard = controller(store.clone(), Some(complete_values()));
    wizard.go_next().unwrap();
    assert_eq!(wizard.navigation().primary_label, "Profiel Opslaan");

    let pending = wizard.start_submit().unwrap();
    let running = tokio::spawn(pending.run());
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert!(wizard.is_submitting());
    let navigation = wizard.navigation();
    assert!(navigation.is_submitting);
    assert!(!navigation.can_submit);
    assert_eq!(navigation.primary_label, "Bezig met opslaan...");

    wizard.update_field("bio", "Rustige huurder met een kat").unwrap();
    assert!(wizard.go_back());
    assert_eq!(wizard.submit().await.unwrap(), SubmissionOutcome::Busy);
    assert_eq!(wizard.state(), SessionState::Editing);

    let outcome = running.await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Success);
    assert!(wizard.finish_submit(&outcome));
    assert_eq!(wizard.state(), SessionState::Submitted);
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.navigation().primary_label, "Volgende");
    assert_eq!(store.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn abandoning_mid_flight_ignores_the_late_success() {
    let store = Arc::new(ScriptedStore::answering_after(Duration::from_millis(500)));
    let mut wizard = controller(store.clone(), Some(complete_values()));

    let running = tokio::spawn(wizard.start_submit().unwrap().run());
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(wizard.is_submitting());

    wizard.abandon();
    assert_eq!(wizard.state(), SessionState::Abandoned);

    let outcome = running.await.unwrap();
    assert_eq!(outcome, SubmissionOutcome::Success);
    assert!(!wizard.finish_submit(&outcome));
    assert_eq!(wizard.state(), SessionState::Abandoned);
    assert!(matches!(
        wizard.start_submit(),
        Err(WizardError::SessionClosed(SessionState::Abandoned))
    ));
    assert_eq!(store.calls(), 1);
}
