use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::expr::Expr;

/// Format constraints for free text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

/// Numeric bounds. Values may arrive as JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NumberRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default)]
    pub integer: bool,
}

impl NumberRule {
    pub fn has_bounds(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }
}

/// Calendar checks for `dd/mm/yyyy` dates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DateRule {
    #[serde(default)]
    pub not_in_future: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_year: Option<i32>,
}

/// Shape of the entries of an array field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ItemKind {
    Number(NumberRule),
    Text(TextRule),
    /// `{ name?, lat?, lng?, radius? }` with a radius in kilometres.
    Location,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ArrayRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<ItemKind>,
    /// Number field whose value the array length must match while the array is required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length_from: Option<String>,
}

/// Supported field kinds, each carrying its own constraint record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text(TextRule),
    Number(NumberRule),
    Boolean,
    Date(DateRule),
    Enum { choices: Vec<String> },
    Array(ArrayRule),
}

impl FieldKind {
    pub fn text() -> Self {
        FieldKind::Text(TextRule::default())
    }

    pub fn number() -> Self {
        FieldKind::Number(NumberRule::default())
    }

    pub fn choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldKind::Enum {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Text(_) => "text",
            FieldKind::Number(_) => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Date(_) => "date",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Array(_) => "array",
        }
    }
}

/// Definition of a single profile field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_if: Option<Expr>,
    pub error_message: String,
    /// Per-code overrides of `error_message`, keyed by validation code.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub messages: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        label: impl Into<String>,
        kind: FieldKind,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind,
            required: false,
            required_if: None,
            error_message: error_message.into(),
            messages: BTreeMap::new(),
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn required_if(mut self, condition: Expr) -> Self {
        self.required_if = Some(condition);
        self
    }

    pub fn message(mut self, code: impl Into<String>, message: impl Into<String>) -> Self {
        self.messages.insert(code.into(), message.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn message_for(&self, code: &str) -> &str {
        self.messages
            .get(code)
            .map(String::as_str)
            .unwrap_or(&self.error_message)
    }

    /// Value a fresh session starts with when the definition gives none.
    pub fn empty_value(&self) -> Value {
        match &self.kind {
            FieldKind::Boolean => Value::Bool(false),
            FieldKind::Array(_) => Value::Array(Vec::new()),
            FieldKind::Number(_) => Value::Null,
            FieldKind::Text(_) | FieldKind::Date(_) | FieldKind::Enum { .. } => {
                Value::String(String::new())
            }
        }
    }

    pub fn initial_value(&self) -> Value {
        self.default.clone().unwrap_or_else(|| self.empty_value())
    }
}
