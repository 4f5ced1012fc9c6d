//! Built-in Huurly tenant profile: seven steps with Dutch copy.

use crate::expr::Expr;
use crate::spec::{
    ArrayRule, CrossFieldRule, DateRule, FieldKind, FieldSpec, ItemKind, NumberRule,
    ProfileSchema, SchemaDef, SchemaError, StepSpec, TextRule,
};
use crate::values::FormValues;

pub const SCHEMA_ID: &str = "huurly.tenant-profile";

/// Field names the wizard and its callers refer to directly.
pub mod fields {
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const DATE_OF_BIRTH: &str = "date_of_birth";
    pub const HAS_PARTNER: &str = "has_partner";
    pub const PARTNER_NAME: &str = "partner_name";
    pub const HAS_CHILDREN: &str = "has_children";
    pub const NUMBER_OF_CHILDREN: &str = "number_of_children";
    pub const CHILDREN_AGES: &str = "children_ages";
    pub const GUARANTOR_AVAILABLE: &str = "guarantor_available";
    pub const MIN_BUDGET: &str = "min_budget";
    pub const MAX_BUDGET: &str = "max_budget";
    pub const MIN_ROOMS: &str = "min_rooms";
    pub const MAX_ROOMS: &str = "max_rooms";
    pub const PROFILE_PICTURE_URL: &str = "profile_picture_url";
}

const PHONE_PATTERN: &str = r"^\+?[0-9][0-9 ()\-]*$";

pub fn tenant_profile() -> Result<ProfileSchema, SchemaError> {
    ProfileSchema::new(tenant_profile_definition())
}

pub fn tenant_profile_definition() -> SchemaDef {
    let mut fields_def = Vec::new();
    let mut steps = Vec::new();

    let personal = vec![
        text("first_name", "Voornaam", "Voornaam is verplicht").required(),
        text("last_name", "Achternaam", "Achternaam is verplicht").required(),
        FieldSpec::new(
            "date_of_birth",
            "Geboortedatum",
            FieldKind::Date(DateRule {
                not_in_future: true,
                min_year: Some(1900),
            }),
            "Geboortedatum is verplicht en moet een geldige datum zijn in dd/mm/jjjj formaat",
        )
        .required()
        .message("invalid_date", "Ongeldige geboortedatum")
        .message("future_date", "Geboortedatum mag niet in de toekomst liggen")
        .message("date_too_old", "Ongeldige geboortedatum"),
        FieldSpec::new(
            "phone",
            "Telefoonnummer",
            FieldKind::Text(TextRule {
                pattern: Some(PHONE_PATTERN.into()),
                min_len: Some(10),
                max_len: None,
            }),
            "Ongeldig telefoonnummer",
        )
        .required()
        .message("required", "Telefoonnummer is verplicht"),
        choice(
            "sex",
            "Geslacht",
            &["man", "vrouw", "anders", "zeg_ik_liever_niet"],
            "Geslacht is verplicht",
        )
        .required()
        .default_value("zeg_ik_liever_niet"),
        text("nationality", "Nationaliteit", "Nationaliteit is verplicht")
            .required()
            .default_value("Nederlandse"),
        choice(
            "marital_status",
            "Burgerlijke staat",
            &["single", "samenwonend", "getrouwd", "gescheiden"],
            "Burgerlijke staat is verplicht",
        )
        .required()
        .default_value("single"),
    ];
    push_step(&mut fields_def, &mut steps, "personal_info", "Persoonlijke Info", personal);

    let employment = vec![
        text("profession", "Beroep", "Beroep is verplicht").required(),
        text("employer", "Werkgever", "Ongeldige werkgever"),
        choice(
            "employment_status",
            "Dienstverband",
            &["full-time", "part-time", "zzp", "student", "werkloos"],
            "Dienstverband is verplicht",
        )
        .required()
        .default_value("full-time"),
        text("work_contract_type", "Type contract", "Ongeldig contracttype"),
        number(
            "monthly_income",
            "Maandinkomen",
            bounds(Some(1.0), None),
            "Maandinkomen is verplicht en moet groter dan 0 zijn",
        )
        .required()
        .default_value(0),
        flag("income_proof_available", "Inkomensbewijs beschikbaar"),
        flag("work_from_home", "Thuiswerken"),
        number(
            "extra_income",
            "Extra inkomen",
            bounds(Some(0.0), None),
            "Extra inkomen mag niet negatief zijn",
        ),
        FieldSpec::new(
            "extra_income_description",
            "Omschrijving extra inkomen",
            FieldKind::Text(TextRule {
                max_len: Some(200),
                ..TextRule::default()
            }),
            "Beschrijving mag maximaal 200 karakters lang zijn",
        ),
    ];
    push_step(&mut fields_def, &mut steps, "employment", "Werk & Inkomen", employment);

    let has_partner = || Expr::field(fields::HAS_PARTNER);
    let has_children = || Expr::field(fields::HAS_CHILDREN);
    let household = vec![
        flag("has_partner", "Partner"),
        text("partner_name", "Naam partner", "Naam partner is verplicht").required_if(has_partner()),
        text("partner_profession", "Beroep partner", "Beroep partner is verplicht")
            .required_if(has_partner()),
        choice(
            "partner_employment_status",
            "Dienstverband partner",
            &[
                "vast_contract",
                "tijdelijk_contract",
                "zzp",
                "student",
                "werkloos",
                "pensioen",
            ],
            "Dienstverband partner is verplicht",
        )
        .required_if(has_partner()),
        number(
            "partner_monthly_income",
            "Inkomen partner",
            bounds(Some(0.0), None),
            "Partner inkomen mag niet negatief zijn",
        ),
        flag("has_children", "Kinderen"),
        number(
            "number_of_children",
            "Aantal kinderen",
            NumberRule {
                min: Some(0.0),
                max: Some(10.0),
                integer: true,
            },
            "Aantal kinderen is verplicht",
        )
        .required_if(has_children())
        .message("max", "Maximaal 10 kinderen")
        .default_value(0),
        FieldSpec::new(
            "children_ages",
            "Leeftijden kinderen",
            FieldKind::Array(ArrayRule {
                items: Some(ItemKind::Number(NumberRule {
                    min: Some(0.0),
                    max: Some(25.0),
                    integer: true,
                })),
                length_from: Some(fields::NUMBER_OF_CHILDREN.into()),
                ..ArrayRule::default()
            }),
            "Vul de leeftijd van elk kind in",
        )
        .required_if(has_children())
        .message("invalid_item", "Leeftijden moeten tussen 0 en 25 jaar liggen")
        .message(
            "length_mismatch",
            "Het aantal leeftijden moet gelijk zijn aan het aantal kinderen",
        ),
        number(
            "number_of_housemates",
            "Aantal huisgenoten",
            NumberRule {
                min: Some(0.0),
                max: Some(10.0),
                integer: true,
            },
            "Aantal huisgenoten moet tussen 0 en 10 liggen",
        ),
        choice(
            "current_living_situation",
            "Huidige woonsituatie",
            &[
                "studentenkamer",
                "huurwoning",
                "koopwoning",
                "bij_familie",
                "bij_vrienden",
                "tijdelijk",
                "anders",
            ],
            "Ongeldige woonsituatie",
        ),
    ];
    push_step(
        &mut fields_def,
        &mut steps,
        "household",
        "Huidige Woonsituatie",
        household,
    );

    let mut housing = vec![
        FieldSpec::new(
            "preferred_city",
            "Voorkeursstad",
            FieldKind::Array(ArrayRule {
                min_items: Some(1),
                items: Some(ItemKind::Location),
                ..ArrayRule::default()
            }),
            "Minimaal één voorkeursstad is verplicht",
        )
        .required()
        .message("invalid_item", "Straal moet tussen 1 en 50 km zijn"),
        choice(
            "preferred_property_type",
            "Woningtype",
            &["appartement", "huis", "studio", "kamer", "penthouse"],
            "Woningtype is verplicht",
        )
        .required()
        .default_value("appartement"),
        number(
            "preferred_bedrooms",
            "Aantal slaapkamers",
            NumberRule {
                min: Some(1.0),
                max: None,
                integer: true,
            },
            "Minimaal 1 slaapkamer",
        ),
        choice(
            "furnished_preference",
            "Inrichting",
            &["gemeubileerd", "ongemeubileerd", "geen_voorkeur"],
            "Ongeldige voorkeur voor inrichting",
        ),
        number(
            "min_budget",
            "Minimum budget",
            bounds(Some(0.0), None),
            "Budget mag niet negatief zijn",
        ),
        number(
            "max_budget",
            "Maximaal budget",
            bounds(Some(1.0), None),
            "Budget moet groter dan 0 zijn",
        )
        .required()
        .default_value(1000),
        number(
            "min_rooms",
            "Minimaal aantal kamers",
            NumberRule {
                min: Some(1.0),
                max: None,
                integer: true,
            },
            "Minimaal 1 kamer",
        ),
        number(
            "max_rooms",
            "Maximaal aantal kamers",
            NumberRule {
                min: Some(1.0),
                max: None,
                integer: true,
            },
            "Minimaal 1 kamer",
        ),
        text("move_in_date_preferred", "Gewenste verhuisdatum", "Ongeldige datum"),
        text("move_in_date_earliest", "Vroegste verhuisdatum", "Ongeldige datum"),
        flag("availability_flexible", "Flexibel in verhuisdatum"),
        choice(
            "lease_duration_preference",
            "Gewenste huurperiode",
            &["6_maanden", "1_jaar", "2_jaar", "langer", "flexibel"],
            "Ongeldige huurperiode",
        ),
        flag("parking_required", "Parkeerplaats nodig"),
    ];
    for (name, label) in [
        ("storage_kelder", "Kelder"),
        ("storage_zolder", "Zolder"),
        ("storage_berging", "Berging"),
        ("storage_garage", "Garage"),
        ("storage_schuur", "Schuur"),
    ] {
        housing.push(flag(name, label));
    }
    housing.extend([
        flag("has_pets", "Huisdieren"),
        text("pet_details", "Details huisdieren", "Ongeldige omschrijving"),
        flag("smokes", "Roker"),
        text("smoking_details", "Details roken", "Ongeldige omschrijving"),
    ]);
    push_step(&mut fields_def, &mut steps, "housing", "Woningvoorkeuren", housing);

    let has_guarantor = || Expr::field(fields::GUARANTOR_AVAILABLE);
    let guarantor = vec![
        flag("guarantor_available", "Borgsteller beschikbaar"),
        text("guarantor_name", "Naam borgsteller", "Naam borgsteller is verplicht")
            .required_if(has_guarantor()),
        text(
            "guarantor_relation",
            "Relatie tot borgsteller",
            "Relatie tot borgsteller is verplicht",
        )
        .required_if(has_guarantor()),
        FieldSpec::new(
            "guarantor_phone",
            "Telefoonnummer borgsteller",
            FieldKind::Text(TextRule {
                pattern: Some(PHONE_PATTERN.into()),
                min_len: Some(10),
                max_len: None,
            }),
            "Ongeldig telefoonnummer borgsteller",
        )
        .required_if(has_guarantor())
        .message("required", "Telefoonnummer borgsteller is verplicht"),
        number(
            "guarantor_income",
            "Inkomen borgsteller",
            bounds(Some(0.0), None),
            "Inkomen borgsteller mag niet negatief zijn",
        ),
    ];
    push_step(&mut fields_def, &mut steps, "guarantor", "Borgsteller", guarantor);

    let references = vec![
        flag("references_available", "Referenties beschikbaar"),
        number(
            "rental_history_years",
            "Jaren huurervaring",
            bounds(Some(0.0), Some(50.0)),
            "Huurervaring mag niet negatief zijn",
        )
        .message("max", "Maximaal 50 jaar ervaring"),
        FieldSpec::new(
            "reason_for_moving",
            "Reden voor verhuizing",
            FieldKind::Text(TextRule {
                min_len: Some(10),
                max_len: Some(300),
                ..TextRule::default()
            }),
            "Reden voor verhuizing moet minimaal 10 karakters lang zijn",
        )
        .message("max_length", "Reden mag maximaal 300 karakters lang zijn"),
    ];
    push_step(&mut fields_def, &mut steps, "references", "Referenties", references);

    let motivation = vec![
        text("profile_picture_url", "Profielfoto", "Ongeldige profielfoto"),
        story(
            "bio",
            "Bio",
            "Bio moet minimaal 50 karakters lang zijn",
            "Bio mag maximaal 500 karakters lang zijn",
        ),
        story(
            "motivation",
            "Motivatie",
            "Motivatie moet minimaal 50 karakters lang zijn",
            "Motivatie mag maximaal 500 karakters lang zijn",
        ),
    ];
    push_step(
        &mut fields_def,
        &mut steps,
        "motivation",
        "Profiel & Motivatie",
        motivation,
    );

    SchemaDef {
        id: SCHEMA_ID.into(),
        title: "Huurder profiel".into(),
        version: "1.0.0".into(),
        description: Some("Profiel dat huurders invullen voordat ze kunnen reageren op woningen.".into()),
        fields: fields_def,
        steps,
        rules: vec![
            CrossFieldRule::new(
                "budget_range",
                fields::MIN_BUDGET,
                "Minimum budget mag niet hoger zijn dan het maximaal budget",
                Expr::field(fields::MIN_BUDGET).gt(Expr::field(fields::MAX_BUDGET)),
            ),
            CrossFieldRule::new(
                "rooms_range",
                fields::MIN_ROOMS,
                "Minimaal aantal kamers mag niet hoger zijn dan het maximaal aantal kamers",
                Expr::field(fields::MIN_ROOMS).gt(Expr::field(fields::MAX_ROOMS)),
            ),
            CrossFieldRule::new(
                "children_count",
                fields::NUMBER_OF_CHILDREN,
                "Geef aan hoeveel kinderen je hebt",
                Expr::all(vec![
                    Expr::field(fields::HAS_CHILDREN),
                    Expr::field(fields::NUMBER_OF_CHILDREN).lt(Expr::literal(1)),
                ]),
            ),
        ],
    }
}

/// Adults plus children living in the household: the tenant, a partner when
/// present, and the declared number of children.
pub fn household_size(values: &FormValues) -> u32 {
    let partner = u32::from(values.flag(fields::HAS_PARTNER));
    let children = if values.flag(fields::HAS_CHILDREN) {
        values
            .number(fields::NUMBER_OF_CHILDREN)
            .filter(|count| *count > 0.0)
            .map(|count| count.floor() as u32)
            .unwrap_or(0)
    } else {
        0
    };
    1 + partner + children
}

fn push_step(
    fields_def: &mut Vec<FieldSpec>,
    steps: &mut Vec<StepSpec>,
    id: &str,
    label: &str,
    step_fields: Vec<FieldSpec>,
) {
    steps.push(StepSpec::new(
        id,
        label,
        step_fields.iter().map(|field| field.name.clone()),
    ));
    fields_def.extend(step_fields);
}

fn text(name: &str, label: &str, message: &str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::text(), message)
}

fn story(name: &str, label: &str, too_short: &str, too_long: &str) -> FieldSpec {
    FieldSpec::new(
        name,
        label,
        FieldKind::Text(TextRule {
            min_len: Some(50),
            max_len: Some(500),
            ..TextRule::default()
        }),
        too_short,
    )
    .required()
    .message("max_length", too_long)
}

fn number(name: &str, label: &str, rule: NumberRule, message: &str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Number(rule), message)
}

fn bounds(min: Option<f64>, max: Option<f64>) -> NumberRule {
    NumberRule {
        min,
        max,
        integer: false,
    }
}

fn choice(name: &str, label: &str, choices: &[&str], message: &str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::choices(choices.iter().copied()), message)
}

fn flag(name: &str, label: &str) -> FieldSpec {
    FieldSpec::new(name, label, FieldKind::Boolean, format!("{} is ongeldig", label))
}
