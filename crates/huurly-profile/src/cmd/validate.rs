use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, anyhow, bail};
use clap::Args;
use huurly_profile_wizard::FormSession;
use profile_spec::{ValidationError, Validator};
use serde::Serialize;

use super::{Context, read_answers};

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// JSON object with the profile values
    #[arg(long = "answers", value_name = "answers.json")]
    pub answers: PathBuf,
    /// Only check this step (1-based, as shown by `steps`)
    #[arg(long = "step", value_name = "N")]
    pub step: Option<usize>,
    /// Print the result as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct ValidateReport<'a> {
    schema: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<&'a str>,
    valid: bool,
    errors: &'a [ValidationError],
}

/// Validates the answers merged over the schema defaults, like an edit-mode session sees them.
pub fn run(args: &ValidateArgs, ctx: &Context) -> Result<()> {
    let answers = read_answers(&args.answers)?;
    let session = FormSession::open(Arc::new(ctx.schema.clone()), Some(answers));
    let values = session.values();
    let validator = Validator::new(&ctx.schema);

    let (step, errors) = match args.step {
        Some(number) => {
            let count = ctx.schema.step_count();
            let index = number
                .checked_sub(1)
                .filter(|index| *index < count)
                .ok_or_else(|| anyhow!("step {number} is out of range (1-{count})"))?;
            let step = ctx.schema.step(index).map(|step| step.id.as_str());
            (step, validator.validate_step(index, values))
        }
        None => (None, validator.validate_all(values)),
    };

    if args.json {
        let report = ValidateReport {
            schema: ctx.schema.id(),
            step,
            valid: errors.is_empty(),
            errors: &errors,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if errors.is_empty() {
        println!("profile is valid");
    } else {
        for error in &errors {
            println!("- {error}");
        }
    }

    if !errors.is_empty() {
        bail!("{} field(s) failed validation", errors.len());
    }
    Ok(())
}
