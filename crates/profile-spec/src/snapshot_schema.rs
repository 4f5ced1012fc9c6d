use serde_json::{Map, Value, json};

use crate::spec::{FieldKind, FieldSpec, ItemKind, NumberRule, ProfileSchema, TextRule};

/// Numeric strings the validator parses as numbers.
const NUMERIC_STRING_PATTERN: &str = r"^\s*[-+]?(\d+(\.\d*)?|\.\d+)([eE][-+]?\d+)?\s*$";
const NON_BLANK_PATTERN: &str = r"\S";

/// Generates a JSON schema for the snapshot object of `schema`.
///
/// Only base requirements land in `required`; conditional ones depend on the values.
/// Fields that are not base-required also accept the empty values the validator treats
/// as unanswered (`null`, blank strings, empty arrays and objects). Numbers accept
/// numeric strings; bounds are only checked on JSON numbers.
pub fn generate(schema: &ProfileSchema) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for field in schema.fields() {
        properties.insert(field.name.clone(), field_schema(field));
        if field.required {
            required.push(Value::String(field.name.clone()));
        }
    }

    let mut root = Map::new();
    root.insert(
        "$schema".into(),
        Value::String("https://json-schema.org/draft/2020-12/schema".into()),
    );
    root.insert("title".into(), Value::String(schema.title().to_string()));
    root.insert("type".into(), Value::String("object".into()));
    root.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        root.insert("required".into(), Value::Array(required));
    }

    Value::Object(root)
}

fn field_schema(field: &FieldSpec) -> Value {
    let mut alternatives = kind_alternatives(field);
    if !field.required {
        alternatives.push(empty_schema());
    }

    let mut schema = match alternatives.len() {
        1 => match alternatives.pop() {
            Some(Value::Object(single)) => single,
            _ => Map::new(),
        },
        _ => {
            let mut schema = Map::new();
            schema.insert("anyOf".into(), Value::Array(alternatives));
            schema
        }
    };
    schema.insert("title".into(), Value::String(field.label.clone()));
    if let Some(default) = &field.default {
        schema.insert("default".into(), default.clone());
    }
    Value::Object(schema)
}

fn kind_alternatives(field: &FieldSpec) -> Vec<Value> {
    match &field.kind {
        FieldKind::Text(rule) => vec![text_schema(rule, field.required)],
        FieldKind::Number(rule) => number_alternatives(rule),
        FieldKind::Boolean => vec![json!({ "type": "boolean" })],
        FieldKind::Date(_) => vec![json!({
            "type": "string",
            "pattern": r"^\d{2}/\d{2}/\d{4}$",
        })],
        FieldKind::Enum { choices } => vec![json!({ "type": "string", "enum": choices })],
        FieldKind::Array(rule) => {
            let mut schema = Map::new();
            schema.insert("type".into(), Value::String("array".into()));
            let min_items = match rule.min_items {
                Some(min_items) => Some(min_items),
                None if field.required => Some(1),
                None => None,
            };
            if let Some(min_items) = min_items {
                schema.insert("minItems".into(), Value::Number(min_items.into()));
            }
            if let Some(max_items) = rule.max_items {
                schema.insert("maxItems".into(), Value::Number(max_items.into()));
            }
            let items = match &rule.items {
                Some(ItemKind::Number(item)) => json!({ "anyOf": number_alternatives(item) }),
                Some(ItemKind::Text(item)) => text_schema(item, false),
                Some(ItemKind::Location) => location_schema(),
                None => json!({}),
            };
            schema.insert("items".into(), items);
            vec![Value::Object(schema)]
        }
    }
}

fn text_schema(rule: &TextRule, required: bool) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("string".into()));
    match &rule.pattern {
        Some(pattern) => {
            schema.insert("pattern".into(), Value::String(pattern.clone()));
        }
        None if required => {
            schema.insert("pattern".into(), Value::String(NON_BLANK_PATTERN.into()));
        }
        None => {}
    }
    if let Some(min_len) = rule.min_len {
        schema.insert("minLength".into(), Value::Number(min_len.into()));
    }
    if let Some(max_len) = rule.max_len {
        schema.insert("maxLength".into(), Value::Number(max_len.into()));
    }
    Value::Object(schema)
}

fn number_alternatives(rule: &NumberRule) -> Vec<Value> {
    let kind = if rule.integer { "integer" } else { "number" };
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String(kind.into()));
    if let Some(min) = rule.min
        && let Some(num) = number_from_f64(min)
    {
        schema.insert("minimum".into(), num);
    }
    if let Some(max) = rule.max
        && let Some(num) = number_from_f64(max)
    {
        schema.insert("maximum".into(), num);
    }
    vec![
        Value::Object(schema),
        json!({ "type": "string", "pattern": NUMERIC_STRING_PATTERN }),
    ]
}

/// Values the validator counts as unanswered.
fn empty_schema() -> Value {
    json!({
        "anyOf": [
            { "type": "null" },
            { "type": "string", "pattern": r"^\s*$" },
            { "type": "array", "maxItems": 0 },
            { "type": "object", "maxProperties": 0 },
        ]
    })
}

fn location_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "name": { "type": "string", "pattern": NON_BLANK_PATTERN },
            "lat": { "type": "number" },
            "lng": { "type": "number" },
            "radius": { "type": "number", "minimum": 1, "maximum": 50 },
        },
    })
}

fn number_from_f64(value: f64) -> Option<Value> {
    serde_json::Number::from_f64(value).map(Value::Number)
}
