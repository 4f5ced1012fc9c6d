use std::sync::Arc;

use huurly_profile_wizard::{FormSession, NextStep, SessionState, WizardError};
use profile_spec::{
    Expr, FieldKind, FieldSpec, FormValues, ProfileSchema, SchemaDef, StepSpec, tenant_profile,
};
use proptest::prelude::*;
use serde_json::json;

fn text(name: &str, label: &str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::text(), format!("{label} is verplicht"))
}

/// Three steps: two required names, an optional partner block, and a bio.
fn household_schema() -> Arc<ProfileSchema> {
    let def = SchemaDef {
        id: "household".into(),
        title: "Household".into(),
        version: "1.0.0".into(),
        description: None,
        fields: vec![
            text("first_name", "Voornaam").required(),
            text("last_name", "Achternaam").required(),
            text("nickname", "Roepnaam"),
            FieldSpec::new("has_partner", "Partner", FieldKind::Boolean, "Ongeldig"),
            text("partner_name", "Naam partner").required_if(Expr::field("has_partner")),
            text("bio", "Bio").required(),
        ],
        steps: vec![
            StepSpec::new("personal", "Persoonlijke Info", ["first_name", "last_name", "nickname"]),
            StepSpec::new("household", "Huidige Woonsituatie", ["has_partner", "partner_name"]),
            StepSpec::new("motivation", "Profiel & Motivatie", ["bio"]),
        ],
        rules: vec![],
    };
    Arc::new(ProfileSchema::new(def).unwrap())
}

fn fill_names(session: &mut FormSession) {
    session.update_field("first_name", "Sanne").unwrap();
    session.update_field("last_name", "de Vries").unwrap();
}

#[test]
fn blocked_step_reports_every_missing_field() {
    let mut session = FormSession::new(household_schema());

    let NextStep::Blocked(summary) = session.go_next().unwrap() else {
        panic!("expected the first step to be blocked");
    };
    assert_eq!(summary.len(), 2);
    assert_eq!(summary.labels(), vec!["Voornaam", "Achternaam"]);
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.highest_visited(), 0);
    assert_eq!(session.errors().len(), 2);
    insta::assert_snapshot!(summary.to_string(), @r"
    Vul de volgende velden in om door te gaan naar de volgende stap:
    - Voornaam
    - Achternaam
    ");
    assert_eq!(
        summary.notice(),
        "Er ontbreken nog verplichte velden: Voornaam, Achternaam"
    );
}

#[test]
fn valid_step_advances_and_raises_highest_visited() {
    let mut session = FormSession::new(household_schema());
    fill_names(&mut session);

    assert_eq!(session.go_next().unwrap(), NextStep::Advanced { to: 1 });
    assert_eq!(session.current_index(), 1);
    assert_eq!(session.highest_visited(), 1);
    assert!(session.errors().is_empty());
}

#[test]
fn jumps_are_limited_to_visited_steps() {
    let mut session = FormSession::new(household_schema());
    fill_names(&mut session);
    session.go_next().unwrap();

    assert!(session.go_back());
    assert_eq!(session.current_index(), 0);
    assert!(session.go_to_step(1));
    assert_eq!(session.current_index(), 1);

    assert!(!session.go_to_step(2));
    assert!(!session.go_to_step(4));
    assert_eq!(session.current_index(), 1);
    assert!(session.can_navigate_to_step(0));
    assert!(!session.can_navigate_to_step(2));
}

#[test]
fn editing_a_field_clears_only_its_error() {
    let mut session = FormSession::new(household_schema());
    session.go_next().unwrap();
    assert_eq!(session.errors().len(), 2);

    session.update_field("first_name", "S").unwrap();
    assert!(!session.errors().contains_key("first_name"));
    assert!(session.errors().contains_key("last_name"));

    // Errors only come back on the next explicit pass.
    session.update_field("first_name", "").unwrap();
    assert!(!session.errors().contains_key("first_name"));
}

#[test]
fn going_back_needs_no_validation_and_keeps_values() {
    let mut session = FormSession::new(household_schema());
    assert!(!session.go_back());

    fill_names(&mut session);
    session.go_next().unwrap();
    session.update_field("has_partner", true).unwrap();
    assert!(matches!(session.go_next().unwrap(), NextStep::Blocked(_)));

    assert!(session.go_back());
    assert_eq!(session.current_index(), 0);
    assert_eq!(session.value("has_partner"), Some(&json!(true)));
    assert_eq!(session.value("first_name"), Some(&json!("Sanne")));
}

#[test]
fn partner_requirement_follows_the_toggle() {
    let mut session = FormSession::new(household_schema());
    fill_names(&mut session);
    session.go_next().unwrap();

    session.update_field("has_partner", true).unwrap();
    let NextStep::Blocked(summary) = session.go_next().unwrap() else {
        panic!("partner name should be required");
    };
    assert_eq!(summary.fields(), vec!["partner_name"]);

    session.update_field("has_partner", false).unwrap();
    assert_eq!(session.go_next().unwrap(), NextStep::Advanced { to: 2 });
    assert!(session.errors().is_empty());
}

#[test]
fn last_step_becomes_ready_to_submit() {
    let mut session = FormSession::new(household_schema());
    fill_names(&mut session);
    session.go_next().unwrap();
    session.go_next().unwrap();
    session.update_field("bio", "Rustige huurder").unwrap();

    assert!(session.is_last_step());
    assert_eq!(session.go_next().unwrap(), NextStep::ReadyToSubmit);
    assert_eq!(session.state(), SessionState::ReadyToSubmit);
    assert_eq!(session.current_index(), 2);

    session.update_field("bio", "Nog rustiger").unwrap();
    assert_eq!(session.state(), SessionState::Editing);
}

#[test]
fn edit_mode_merges_initial_values_over_defaults() {
    let schema = Arc::new(tenant_profile().unwrap());
    let initial = FormValues::from_value(json!({
        "first_name": "Joris",
        "nationality": null,
        "favourite_colour": "groen",
        "max_budget": 1750
    }));
    let session = FormSession::open(schema, Some(initial));

    assert_eq!(session.value("first_name"), Some(&json!("Joris")));
    assert_eq!(session.value("nationality"), Some(&json!("Nederlandse")));
    assert_eq!(session.value("max_budget"), Some(&json!(1750)));
    assert_eq!(session.value("favourite_colour"), None);
    assert_eq!(session.value("sex"), Some(&json!("zeg_ik_liever_niet")));
}

#[test]
fn unknown_fields_and_closed_sessions_are_errors() {
    let mut session = FormSession::new(household_schema());
    assert!(matches!(
        session.update_field("shoe_size", 44),
        Err(WizardError::UnknownField(name)) if name == "shoe_size"
    ));

    session.abandon();
    assert_eq!(session.state(), SessionState::Abandoned);
    assert!(matches!(
        session.update_field("first_name", "Sanne"),
        Err(WizardError::SessionClosed(SessionState::Abandoned))
    ));
    assert!(session.go_next().is_err());
    assert!(!session.go_back());
    assert!(!session.go_to_step(0));
}

#[test]
fn step_errors_can_be_checked_without_navigating() {
    let mut session = FormSession::new(household_schema());
    assert_eq!(session.validate_current_step().len(), 2);
    assert_eq!(session.step_errors(2).len(), 1);
    assert!(session.errors().is_empty());

    fill_names(&mut session);
    assert!(session.validate_current_step().is_empty());
    assert_eq!(session.current_index(), 0);
}

#[derive(Debug, Clone)]
enum Op {
    Next,
    Back,
    Jump(usize),
    Set(usize, bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Next),
        Just(Op::Back),
        (0usize..6).prop_map(Op::Jump),
        (0usize..4, any::<bool>()).prop_map(|(step, filled)| Op::Set(step, filled)),
    ]
}

fn four_step_schema() -> Arc<ProfileSchema> {
    let names = ["f0", "f1", "f2", "f3"];
    let def = SchemaDef {
        id: "four".into(),
        title: "Four".into(),
        version: "1.0.0".into(),
        description: None,
        fields: names.iter().map(|name| text(name, name).required()).collect(),
        steps: names
            .iter()
            .map(|name| StepSpec::new(format!("step-{name}"), *name, [*name]))
            .collect(),
        rules: vec![],
    };
    Arc::new(ProfileSchema::new(def).unwrap())
}

proptest! {
    #[test]
    fn navigation_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut session = FormSession::new(four_step_schema());
        let last = session.step_count() - 1;
        let mut highest = session.highest_visited();

        for op in ops {
            let before = session.current_index();
            match op {
                Op::Next => {
                    session.go_next().unwrap();
                }
                Op::Back => {
                    session.go_back();
                }
                Op::Jump(index) => {
                    let allowed = index <= session.highest_visited() && index <= last;
                    let moved = session.go_to_step(index);
                    prop_assert_eq!(moved, allowed);
                    if moved {
                        prop_assert_eq!(session.current_index(), index);
                    } else {
                        prop_assert_eq!(session.current_index(), before);
                    }
                }
                Op::Set(step, filled) => {
                    let value = if filled { "x" } else { "" };
                    session.update_field(&format!("f{step}"), value).unwrap();
                }
            }

            prop_assert!(session.highest_visited() >= highest);
            prop_assert!(session.highest_visited() <= last);
            prop_assert!(session.current_index() <= session.highest_visited());
            highest = session.highest_visited();
        }
    }
}
