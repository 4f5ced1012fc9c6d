pub mod run;
pub mod schema;
pub mod steps;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::{Context as _, Result, bail};
use huurly_profile_wizard::WizardConfig;
use profile_spec::{FormValues, ProfileSchema, tenant_profile};
use serde_json::Value;
use tracing::debug;

/// Schema and configuration shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub schema: ProfileSchema,
    pub config: WizardConfig,
}

impl Context {
    /// Loads the schema (built-in tenant profile by default) and applies the config's
    /// message overrides to it.
    pub fn load(schema_path: Option<&Path>, config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => WizardConfig::load(path)?,
            None => WizardConfig::default(),
        };
        let schema = match schema_path {
            Some(path) => load_schema(path)?,
            None => tenant_profile().context("built-in tenant profile is invalid")?,
        };
        debug!(
            schema = schema.id(),
            step_count = schema.step_count(),
            custom_schema = schema_path.is_some(),
            "cli context loaded"
        );
        Ok(Self {
            schema: config.apply(&schema),
            config,
        })
    }
}

fn load_schema(path: &Path) -> Result<ProfileSchema> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read schema {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid schema {}", path.display()))
}

/// Reads an answers file holding one JSON object of field values.
pub fn read_answers(path: &Path) -> Result<FormValues> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read answers {}", path.display()))?;
    let value: Value = serde_json::from_str(&raw)
        .with_context(|| format!("answers {} are not valid JSON", path.display()))?;
    if !value.is_object() {
        bail!("answers {} must contain a JSON object", path.display());
    }
    Ok(FormValues::from_value(value))
}
