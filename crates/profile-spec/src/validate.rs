use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::Date;
use tracing::trace;

use crate::date::{DateIssue, parse_profile_date, today_local};
use crate::messages::interpolate;
use crate::requirement::resolve_required;
use crate::spec::schema::item_pattern_key;
use crate::spec::{
    ArrayRule, DateRule, FieldKind, FieldSpec, ItemKind, NumberRule, ProfileSchema, TextRule,
};
use crate::values::{FormValues, as_number, is_empty_value};

/// Stable validation codes.
pub mod code {
    pub const REQUIRED: &str = "required";
    pub const TYPE_MISMATCH: &str = "type_mismatch";
    pub const PATTERN: &str = "pattern";
    pub const MIN_LENGTH: &str = "min_length";
    pub const MAX_LENGTH: &str = "max_length";
    pub const MIN: &str = "min";
    pub const MAX: &str = "max";
    pub const NOT_INTEGER: &str = "not_integer";
    pub const ENUM: &str = "enum";
    pub const INVALID_DATE: &str = "invalid_date";
    pub const FUTURE_DATE: &str = "future_date";
    pub const DATE_TOO_OLD: &str = "date_too_old";
    pub const MIN_ITEMS: &str = "min_items";
    pub const MAX_ITEMS: &str = "max_items";
    pub const INVALID_ITEM: &str = "invalid_item";
    pub const LENGTH_MISMATCH: &str = "length_mismatch";

    pub const ALL: &[&str] = &[
        REQUIRED,
        TYPE_MISMATCH,
        PATTERN,
        MIN_LENGTH,
        MAX_LENGTH,
        MIN,
        MAX,
        NOT_INTEGER,
        ENUM,
        INVALID_DATE,
        FUTURE_DATE,
        DATE_TOO_OLD,
        MIN_ITEMS,
        MAX_ITEMS,
        INVALID_ITEM,
        LENGTH_MISMATCH,
    ];
}

/// One failing field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    pub field: String,
    pub label: String,
    pub message: String,
    pub code: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.message)
    }
}

/// Checks field values against a schema.
///
/// Every requested field is checked (no fail-fast) and reports at most one error;
/// the result follows the order of the requested names.
#[derive(Debug, Clone, Copy)]
pub struct Validator<'a> {
    schema: &'a ProfileSchema,
    today: Date,
}

impl<'a> Validator<'a> {
    pub fn new(schema: &'a ProfileSchema) -> Self {
        Self::with_today(schema, today_local())
    }

    /// Uses `today` as the reference day for future-date checks.
    pub fn with_today(schema: &'a ProfileSchema, today: Date) -> Self {
        Self { schema, today }
    }

    pub fn validate_fields<S: AsRef<str>>(
        &self,
        names: &[S],
        values: &FormValues,
    ) -> Vec<ValidationError> {
        names
            .iter()
            .filter_map(|name| {
                let name = name.as_ref();
                match self.schema.field(name) {
                    Some(field) => self.check_field(field, values),
                    None => {
                        trace!(field = name, "skipping unknown field");
                        None
                    }
                }
            })
            .collect()
    }

    /// Validates the fields of step `index`; an unknown index has nothing to validate.
    pub fn validate_step(&self, index: usize, values: &FormValues) -> Vec<ValidationError> {
        self.schema
            .step_fields(index)
            .filter_map(|field| self.check_field(field, values))
            .collect()
    }

    /// Validates the whole registry, step by step.
    pub fn validate_all(&self, values: &FormValues) -> Vec<ValidationError> {
        (0..self.schema.step_count())
            .flat_map(|index| self.validate_step(index, values))
            .collect()
    }

    pub fn check_field(&self, field: &FieldSpec, values: &FormValues) -> Option<ValidationError> {
        let required = resolve_required(field, values);
        let value = match values.get(&field.name) {
            Some(value) if !is_blank(field, value) => value,
            _ => {
                return required.then(|| field_error(field, code::REQUIRED));
            }
        };

        if let Some(code) = self.check_kind(field, value, values, required) {
            return Some(field_error(field, code));
        }

        self.schema
            .rules_for(&field.name)
            .find(|rule| rule.condition.evaluate_bool(values) == Some(true))
            .map(|rule| ValidationError {
                field: field.name.clone(),
                label: field.label.clone(),
                message: interpolate(&rule.message, &[("label", field.label.as_str())]),
                code: rule.code(),
            })
    }

    fn check_kind(
        &self,
        field: &FieldSpec,
        value: &Value,
        values: &FormValues,
        required: bool,
    ) -> Option<&'static str> {
        match &field.kind {
            FieldKind::Text(rule) => self.check_text(&field.name, rule, value),
            FieldKind::Number(rule) => check_number(rule, value),
            FieldKind::Boolean => (!value.is_boolean()).then_some(code::TYPE_MISMATCH),
            FieldKind::Date(rule) => self.check_date(rule, value),
            FieldKind::Enum { choices } => match value.as_str() {
                None => Some(code::TYPE_MISMATCH),
                Some(text) if !choices.iter().any(|choice| choice == text) => Some(code::ENUM),
                Some(_) => None,
            },
            FieldKind::Array(rule) => self.check_array(&field.name, rule, value, values, required),
        }
    }

    fn check_text(&self, key: &str, rule: &TextRule, value: &Value) -> Option<&'static str> {
        let Some(text) = value.as_str() else {
            return Some(code::TYPE_MISMATCH);
        };
        if let Some(regex) = self.schema.pattern(key)
            && !regex.is_match(text)
        {
            return Some(code::PATTERN);
        }
        let length = text.chars().count();
        if let Some(min_len) = rule.min_len
            && length < min_len
        {
            return Some(code::MIN_LENGTH);
        }
        if let Some(max_len) = rule.max_len
            && length > max_len
        {
            return Some(code::MAX_LENGTH);
        }
        None
    }

    fn check_date(&self, rule: &DateRule, value: &Value) -> Option<&'static str> {
        let Some(text) = value.as_str() else {
            return Some(code::TYPE_MISMATCH);
        };
        let date = match parse_profile_date(text) {
            Ok(date) => date,
            Err(DateIssue::Format | DateIssue::Calendar) => return Some(code::INVALID_DATE),
        };
        if let Some(min_year) = rule.min_year
            && date.year() < min_year
        {
            return Some(code::DATE_TOO_OLD);
        }
        if rule.not_in_future && date > self.today {
            return Some(code::FUTURE_DATE);
        }
        None
    }

    fn check_array(
        &self,
        name: &str,
        rule: &ArrayRule,
        value: &Value,
        values: &FormValues,
        required: bool,
    ) -> Option<&'static str> {
        let Some(items) = value.as_array() else {
            return Some(code::TYPE_MISMATCH);
        };
        if let Some(min_items) = rule.min_items
            && items.len() < min_items
        {
            return Some(code::MIN_ITEMS);
        }
        if let Some(max_items) = rule.max_items
            && items.len() > max_items
        {
            return Some(code::MAX_ITEMS);
        }
        if let Some(kind) = &rule.items {
            let key = item_pattern_key(name);
            if !items.iter().all(|item| self.item_ok(&key, kind, item)) {
                return Some(code::INVALID_ITEM);
            }
        }
        if required
            && let Some(source) = &rule.length_from
            && let Some(expected) = values.number(source)
            && items.len() as f64 != expected
        {
            return Some(code::LENGTH_MISMATCH);
        }
        None
    }

    fn item_ok(&self, key: &str, kind: &ItemKind, item: &Value) -> bool {
        match kind {
            ItemKind::Number(rule) => !is_empty_value(item) && check_number(rule, item).is_none(),
            ItemKind::Text(rule) => self.check_text(key, rule, item).is_none(),
            ItemKind::Location => location_ok(item),
        }
    }
}

pub fn validate_fields<S: AsRef<str>>(
    schema: &ProfileSchema,
    names: &[S],
    values: &FormValues,
) -> Vec<ValidationError> {
    Validator::new(schema).validate_fields(names, values)
}

pub fn validate_all(schema: &ProfileSchema, values: &FormValues) -> Vec<ValidationError> {
    Validator::new(schema).validate_all(values)
}

// Unparseable numbers only count as values when the field declares bounds to enforce.
fn is_blank(field: &FieldSpec, value: &Value) -> bool {
    if is_empty_value(value) {
        return true;
    }
    match &field.kind {
        FieldKind::Number(rule) => as_number(value).is_none() && !rule.has_bounds(),
        _ => false,
    }
}

fn check_number(rule: &NumberRule, value: &Value) -> Option<&'static str> {
    let Some(number) = as_number(value) else {
        return Some(code::TYPE_MISMATCH);
    };
    if rule.integer && number.fract() != 0.0 {
        return Some(code::NOT_INTEGER);
    }
    if let Some(min) = rule.min
        && number < min
    {
        return Some(code::MIN);
    }
    if let Some(max) = rule.max
        && number > max
    {
        return Some(code::MAX);
    }
    None
}

fn location_ok(item: &Value) -> bool {
    let Some(entry) = item.as_object() else {
        return false;
    };
    if let Some(name) = entry.get("name")
        && !name.as_str().is_some_and(|text| !text.trim().is_empty())
    {
        return false;
    }
    for coordinate in ["lat", "lng"] {
        if let Some(value) = entry.get(coordinate)
            && !value.is_number()
        {
            return false;
        }
    }
    match entry.get("radius") {
        None => true,
        Some(radius) => radius
            .as_f64()
            .is_some_and(|radius| (1.0..=50.0).contains(&radius)),
    }
}

fn field_error(field: &FieldSpec, code: &str) -> ValidationError {
    ValidationError {
        field: field.name.clone(),
        label: field.label.clone(),
        message: interpolate(field.message_for(code), &[("label", field.label.as_str())]),
        code: code.to_string(),
    }
}
