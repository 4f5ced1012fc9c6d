use std::fmt;

use profile_spec::ValidationError;
use serde::Serialize;

pub const SUMMARY_TITLE: &str = "Ontbrekende velden";
pub const SUMMARY_HEADING: &str =
    "Vul de volgende velden in om door te gaan naar de volgende stap:";
pub const MISSING_FIELDS_NOTICE: &str = "Er ontbreken nog verplichte velden";

/// Blocking summary shown when a step (or the final submission) fails validation.
///
/// Lists exactly the failing field labels, in field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub step_id: String,
    pub step_label: String,
    pub errors: Vec<ValidationError>,
}

impl ValidationSummary {
    pub fn new(
        step_id: impl Into<String>,
        step_label: impl Into<String>,
        errors: Vec<ValidationError>,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            step_label: step_label.into(),
            errors,
        }
    }

    pub fn labels(&self) -> Vec<&str> {
        self.errors.iter().map(|error| error.label.as_str()).collect()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|error| error.field.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// One-line notice, e.g. `Er ontbreken nog verplichte velden: Voornaam, Bio`.
    pub fn notice(&self) -> String {
        format!("{}: {}", MISSING_FIELDS_NOTICE, self.labels().join(", "))
    }
}

impl fmt::Display for ValidationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", SUMMARY_HEADING)?;
        for error in &self.errors {
            write!(f, "\n- {}", error.label)?;
        }
        Ok(())
    }
}
