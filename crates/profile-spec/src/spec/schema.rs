use std::collections::BTreeMap;

use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::messages::{MessageMap, resolve_message};
use crate::requirement::resolve_required;
use crate::spec::field::{FieldKind, FieldSpec, ItemKind};
use crate::spec::rule::CrossFieldRule;
use crate::spec::step::StepSpec;
use crate::validate::code;
use crate::values::FormValues;

/// Serializable description of a profile form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SchemaDef {
    pub id: String,
    pub title: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub steps: Vec<StepSpec>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<CrossFieldRule>,
}

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("schema `{0}` defines no steps")]
    NoSteps(String),
    #[error("field `{0}` is defined more than once")]
    DuplicateField(String),
    #[error("step `{0}` is defined more than once")]
    DuplicateStep(String),
    #[error("rule `{0}` is defined more than once")]
    DuplicateRule(String),
    #[error("step `{step}` references unknown field `{field}`")]
    UnknownStepField { step: String, field: String },
    #[error("field `{field}` belongs to both step `{first}` and step `{second}`")]
    FieldInSeveralSteps {
        field: String,
        first: String,
        second: String,
    },
    #[error("field `{0}` does not belong to any step")]
    UnassignedField(String),
    #[error("{context} references unknown field `{field}`")]
    UnknownReference { context: String, field: String },
    #[error("enum field `{0}` has no choices")]
    EmptyChoices(String),
    #[error("invalid pattern for field `{field}`: {source}")]
    InvalidPattern {
        field: String,
        #[source]
        source: regex::Error,
    },
}

/// Validated field registry with its steps, rules and compiled patterns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SchemaDef", into = "SchemaDef")]
pub struct ProfileSchema {
    def: SchemaDef,
    field_index: BTreeMap<String, usize>,
    step_of: BTreeMap<String, usize>,
    rules_by_field: BTreeMap<String, Vec<usize>>,
    patterns: BTreeMap<String, Regex>,
}

impl ProfileSchema {
    pub fn new(def: SchemaDef) -> Result<Self, SchemaError> {
        if def.steps.is_empty() {
            return Err(SchemaError::NoSteps(def.id.clone()));
        }

        let mut field_index = BTreeMap::new();
        for (idx, field) in def.fields.iter().enumerate() {
            if field_index.insert(field.name.clone(), idx).is_some() {
                return Err(SchemaError::DuplicateField(field.name.clone()));
            }
        }

        let mut step_ids = BTreeMap::new();
        let mut step_of: BTreeMap<String, usize> = BTreeMap::new();
        for (idx, step) in def.steps.iter().enumerate() {
            if step_ids.insert(step.id.as_str(), idx).is_some() {
                return Err(SchemaError::DuplicateStep(step.id.clone()));
            }
            for name in &step.fields {
                if !field_index.contains_key(name) {
                    return Err(SchemaError::UnknownStepField {
                        step: step.id.clone(),
                        field: name.clone(),
                    });
                }
                if let Some(previous) = step_of.insert(name.clone(), idx) {
                    return Err(SchemaError::FieldInSeveralSteps {
                        field: name.clone(),
                        first: def.steps[previous].id.clone(),
                        second: step.id.clone(),
                    });
                }
            }
        }

        let mut patterns = BTreeMap::new();
        for field in &def.fields {
            if !step_of.contains_key(&field.name) {
                return Err(SchemaError::UnassignedField(field.name.clone()));
            }
            if let Some(expr) = &field.required_if {
                check_references(
                    &field_index,
                    expr.referenced_fields(),
                    format!("required_if of `{}`", field.name),
                )?;
            }
            match &field.kind {
                FieldKind::Text(rule) => {
                    if let Some(pattern) = &rule.pattern {
                        patterns.insert(field.name.clone(), compile(&field.name, pattern)?);
                    }
                }
                FieldKind::Enum { choices } if choices.is_empty() => {
                    return Err(SchemaError::EmptyChoices(field.name.clone()));
                }
                FieldKind::Array(rule) => {
                    if let Some(source) = &rule.length_from {
                        check_references(
                            &field_index,
                            [source.as_str()],
                            format!("length_from of `{}`", field.name),
                        )?;
                    }
                    if let Some(ItemKind::Text(items)) = &rule.items
                        && let Some(pattern) = &items.pattern
                    {
                        patterns.insert(item_pattern_key(&field.name), compile(&field.name, pattern)?);
                    }
                }
                _ => {}
            }
        }

        let mut rules_by_field: BTreeMap<String, Vec<usize>> = BTreeMap::new();
        let mut rule_ids = BTreeMap::new();
        for (idx, rule) in def.rules.iter().enumerate() {
            if rule_ids.insert(rule.id.as_str(), idx).is_some() {
                return Err(SchemaError::DuplicateRule(rule.id.clone()));
            }
            let context = format!("rule `{}`", rule.id);
            check_references(&field_index, [rule.field.as_str()], context.clone())?;
            check_references(&field_index, rule.condition.referenced_fields(), context)?;
            rules_by_field
                .entry(rule.field.clone())
                .or_default()
                .push(idx);
        }

        debug!(
            schema = %def.id,
            fields = def.fields.len(),
            steps = def.steps.len(),
            rules = def.rules.len(),
            "profile schema compiled"
        );

        Ok(Self {
            def,
            field_index,
            step_of,
            rules_by_field,
            patterns,
        })
    }

    pub fn definition(&self) -> &SchemaDef {
        &self.def
    }

    pub fn id(&self) -> &str {
        &self.def.id
    }

    pub fn title(&self) -> &str {
        &self.def.title
    }

    pub fn version(&self) -> &str {
        &self.def.version
    }

    /// Fields in registry order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.def.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.field_index.get(name).map(|idx| &self.def.fields[*idx])
    }

    pub fn steps(&self) -> &[StepSpec] {
        &self.def.steps
    }

    pub fn step(&self, index: usize) -> Option<&StepSpec> {
        self.def.steps.get(index)
    }

    pub fn step_count(&self) -> usize {
        self.def.steps.len()
    }

    pub fn step_index_of(&self, field: &str) -> Option<usize> {
        self.step_of.get(field).copied()
    }

    /// Fields of one step in display order; empty for an unknown index.
    pub fn step_fields(&self, index: usize) -> impl Iterator<Item = &FieldSpec> {
        self.def
            .steps
            .get(index)
            .into_iter()
            .flat_map(|step| step.fields.iter())
            .filter_map(|name| self.field(name))
    }

    pub fn rules(&self) -> &[CrossFieldRule] {
        &self.def.rules
    }

    /// Rules anchored on `field`, in definition order.
    pub fn rules_for(&self, field: &str) -> impl Iterator<Item = &CrossFieldRule> {
        self.rules_by_field
            .get(field)
            .into_iter()
            .flatten()
            .map(|idx| &self.def.rules[*idx])
    }

    pub(crate) fn pattern(&self, key: &str) -> Option<&Regex> {
        self.patterns.get(key)
    }

    /// Values a fresh session starts from.
    pub fn defaults(&self) -> FormValues {
        self.def
            .fields
            .iter()
            .map(|field| (field.name.clone(), field.initial_value()))
            .collect()
    }

    /// Effective required-ness of `name` for the given snapshot. Unknown fields are never required.
    pub fn is_required(&self, name: &str, values: &FormValues) -> bool {
        self.field(name)
            .is_some_and(|field| resolve_required(field, values))
    }

    /// Returns a copy whose labels and messages are replaced by the matching overrides.
    pub fn with_messages(&self, messages: &MessageMap, locale: Option<&str>) -> Self {
        let mut schema = self.clone();
        for field in &mut schema.def.fields {
            if let Some(label) = resolve_message(messages, &format!("{}.label", field.name), locale)
            {
                field.label = label.to_string();
            }
            if let Some(message) = resolve_message(messages, &field.name, locale) {
                field.error_message = message.to_string();
            }
            for error_code in code::ALL {
                let key = format!("{}.{}", field.name, error_code);
                if let Some(message) = resolve_message(messages, &key, locale) {
                    field
                        .messages
                        .insert((*error_code).to_string(), message.to_string());
                }
            }
        }
        for rule in &mut schema.def.rules {
            if let Some(message) = resolve_message(messages, &format!("rule.{}", rule.id), locale) {
                rule.message = message.to_string();
            }
        }
        for step in &mut schema.def.steps {
            if let Some(label) = resolve_message(messages, &format!("step.{}", step.id), locale) {
                step.label = label.to_string();
            }
        }
        schema
    }
}

impl TryFrom<SchemaDef> for ProfileSchema {
    type Error = SchemaError;

    fn try_from(def: SchemaDef) -> Result<Self, Self::Error> {
        Self::new(def)
    }
}

impl From<ProfileSchema> for SchemaDef {
    fn from(schema: ProfileSchema) -> Self {
        schema.def
    }
}

pub(crate) fn item_pattern_key(field: &str) -> String {
    format!("{}[]", field)
}

fn compile(field: &str, pattern: &str) -> Result<Regex, SchemaError> {
    Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
        field: field.to_string(),
        source,
    })
}

fn check_references<'a>(
    index: &BTreeMap<String, usize>,
    names: impl IntoIterator<Item = &'a str>,
    context: String,
) -> Result<(), SchemaError> {
    for name in names {
        if !index.contains_key(name) {
            return Err(SchemaError::UnknownReference {
                context,
                field: name.to_string(),
            });
        }
    }
    Ok(())
}
