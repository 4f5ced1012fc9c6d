use std::cmp::Ordering;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::values::{FormValues, as_number, is_empty_value};

/// Lightweight expression AST used for conditional requirements and cross-field rules.
///
/// Evaluation is three-valued: `None` means an operand was missing or the
/// operands could not be compared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Expr {
    Literal { value: Value },
    Field { name: String },
    IsSet { name: String },
    And { expressions: Vec<Expr> },
    Or { expressions: Vec<Expr> },
    Not { expression: Box<Expr> },
    Eq { left: Box<Expr>, right: Box<Expr> },
    Ne { left: Box<Expr>, right: Box<Expr> },
    Lt { left: Box<Expr>, right: Box<Expr> },
    Lte { left: Box<Expr>, right: Box<Expr> },
    Gt { left: Box<Expr>, right: Box<Expr> },
    Gte { left: Box<Expr>, right: Box<Expr> },
}

impl Expr {
    pub fn field(name: impl Into<String>) -> Self {
        Expr::Field { name: name.into() }
    }

    pub fn literal(value: impl Into<Value>) -> Self {
        Expr::Literal {
            value: value.into(),
        }
    }

    pub fn is_set(name: impl Into<String>) -> Self {
        Expr::IsSet { name: name.into() }
    }

    pub fn all(expressions: Vec<Expr>) -> Self {
        Expr::And { expressions }
    }

    pub fn any(expressions: Vec<Expr>) -> Self {
        Expr::Or { expressions }
    }

    pub fn negate(self) -> Self {
        Expr::Not {
            expression: Box::new(self),
        }
    }

    pub fn equals(self, other: Expr) -> Self {
        Expr::Eq {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn lt(self, other: Expr) -> Self {
        Expr::Lt {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    pub fn gt(self, other: Expr) -> Self {
        Expr::Gt {
            left: Box::new(self),
            right: Box::new(other),
        }
    }

    /// Evaluates the expression and returns a JSON value when possible.
    pub fn evaluate_value(&self, values: &FormValues) -> Option<Value> {
        match self {
            Expr::Literal { value } => Some(value.clone()),
            Expr::Field { name } => values.get(name).cloned(),
            Expr::IsSet { name } => Some(Value::Bool(
                values.get(name).is_some_and(|value| !is_empty_value(value)),
            )),
            Expr::And { expressions } => Self::evaluate_and(expressions, values),
            Expr::Or { expressions } => Self::evaluate_or(expressions, values),
            Expr::Not { expression } => expression
                .evaluate_bool(values)
                .map(|value| Value::Bool(!value)),
            Expr::Eq { left, right } => {
                let ordering = Self::compare(left, right, values);
                match ordering {
                    Some(ordering) => Some(Value::Bool(ordering == Ordering::Equal)),
                    None => {
                        let left_value = left.evaluate_value(values)?;
                        let right_value = right.evaluate_value(values)?;
                        Some(Value::Bool(left_value == right_value))
                    }
                }
            }
            Expr::Ne { left, right } => {
                let equal = Expr::Eq {
                    left: left.clone(),
                    right: right.clone(),
                };
                equal.evaluate_bool(values).map(|value| Value::Bool(!value))
            }
            Expr::Lt { left, right } => Self::evaluate_compare(left, right, values, |o| {
                matches!(o, Ordering::Less)
            }),
            Expr::Lte { left, right } => Self::evaluate_compare(left, right, values, |o| {
                matches!(o, Ordering::Less | Ordering::Equal)
            }),
            Expr::Gt { left, right } => Self::evaluate_compare(left, right, values, |o| {
                matches!(o, Ordering::Greater)
            }),
            Expr::Gte { left, right } => Self::evaluate_compare(left, right, values, |o| {
                matches!(o, Ordering::Greater | Ordering::Equal)
            }),
        }
    }

    /// Evaluates the expression and coerces the result into a boolean when possible.
    pub fn evaluate_bool(&self, values: &FormValues) -> Option<bool> {
        let value = self.evaluate_value(values)?;
        match value {
            Value::Bool(value) => Some(value),
            Value::Number(number) => number.as_f64().map(|value| value != 0.0),
            Value::String(text) => match text.to_lowercase().as_str() {
                "true" | "ja" | "yes" | "1" => Some(true),
                "false" | "nee" | "no" | "0" | "" => Some(false),
                _ => None,
            },
            Value::Null => Some(false),
            _ => None,
        }
    }

    /// Names of every field the expression reads, in first-seen order.
    pub fn referenced_fields(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_fields(&mut names);
        names
    }

    fn collect_fields<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Expr::Literal { .. } => {}
            Expr::Field { name } | Expr::IsSet { name } => {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
            Expr::And { expressions } | Expr::Or { expressions } => {
                for expression in expressions {
                    expression.collect_fields(names);
                }
            }
            Expr::Not { expression } => expression.collect_fields(names),
            Expr::Eq { left, right }
            | Expr::Ne { left, right }
            | Expr::Lt { left, right }
            | Expr::Lte { left, right }
            | Expr::Gt { left, right }
            | Expr::Gte { left, right } => {
                left.collect_fields(names);
                right.collect_fields(names);
            }
        }
    }

    fn evaluate_and(expressions: &[Expr], values: &FormValues) -> Option<Value> {
        let mut seen_none = false;
        for expression in expressions {
            match expression.evaluate_bool(values) {
                Some(false) => return Some(Value::Bool(false)),
                Some(true) => continue,
                None => seen_none = true,
            }
        }
        if seen_none {
            None
        } else {
            Some(Value::Bool(true))
        }
    }

    fn evaluate_or(expressions: &[Expr], values: &FormValues) -> Option<Value> {
        let mut seen_none = false;
        for expression in expressions {
            match expression.evaluate_bool(values) {
                Some(true) => return Some(Value::Bool(true)),
                Some(false) => continue,
                None => seen_none = true,
            }
        }
        if seen_none {
            None
        } else {
            Some(Value::Bool(false))
        }
    }

    fn evaluate_compare<F>(left: &Expr, right: &Expr, values: &FormValues, predicate: F) -> Option<Value>
    where
        F: Fn(Ordering) -> bool,
    {
        let ordering = Self::compare(left, right, values)?;
        Some(Value::Bool(predicate(ordering)))
    }

    fn compare(left: &Expr, right: &Expr, values: &FormValues) -> Option<Ordering> {
        let left_value = left.evaluate_value(values)?;
        let right_value = right.evaluate_value(values)?;
        Self::compare_values(&left_value, &right_value)
    }

    // Form inputs often carry numbers as strings; compare numerically whenever one side is a number.
    fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
        match (left, right) {
            (Value::Number(_), _) | (_, Value::Number(_)) => {
                let left_num = as_number(left)?;
                let right_num = as_number(right)?;
                left_num.partial_cmp(&right_num)
            }
            (Value::String(left_text), Value::String(right_text)) => {
                Some(left_text.cmp(right_text))
            }
            _ => None,
        }
    }
}
