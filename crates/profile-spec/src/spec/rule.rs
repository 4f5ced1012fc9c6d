use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/// Cross-field rule: when `condition` holds, `field` reports `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CrossFieldRule {
    pub id: String,
    pub field: String,
    pub message: String,
    pub condition: Expr,
}

impl CrossFieldRule {
    pub fn new(
        id: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
        condition: Expr,
    ) -> Self {
        Self {
            id: id.into(),
            field: field.into(),
            message: message.into(),
            condition,
        }
    }

    pub fn code(&self) -> String {
        format!("rule:{}", self.id)
    }
}
