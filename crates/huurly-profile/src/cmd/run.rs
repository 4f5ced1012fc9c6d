use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Args;
use huurly_profile_wizard::{NextStep, SubmissionOutcome, WizardController};
use tracing::debug;

use super::{Context, read_answers};
use crate::store::JsonFileStore;

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// JSON object with the profile values
    #[arg(long = "answers", value_name = "answers.json")]
    pub answers: PathBuf,
    /// Where the saved profile is written
    #[arg(long = "out", value_name = "profile.json")]
    pub out: PathBuf,
}

/// Opens a session with the answers, walks every step and submits.
///
/// Stops at the first blocked step and prints its summary.
pub async fn run(args: &RunArgs, ctx: &Context) -> Result<()> {
    let answers = read_answers(&args.answers)?;
    let store = Arc::new(JsonFileStore::new(&args.out));
    let mut wizard =
        WizardController::open_from(&ctx.schema, &ctx.config, store, &answers).await?;

    loop {
        match wizard.go_next()? {
            NextStep::Advanced { to } => debug!(step = to, "advanced"),
            NextStep::ReadyToSubmit => break,
            NextStep::Blocked(summary) => {
                let navigation = wizard.navigation();
                println!(
                    "Stap {} van {}: {}",
                    navigation.step_number, navigation.step_count, summary.step_label
                );
                println!("{summary}");
                bail!("{}", summary.notice());
            }
        }
    }

    match wizard.submit().await? {
        SubmissionOutcome::Success => {
            println!("profile saved to {}", args.out.display());
            Ok(())
        }
        SubmissionOutcome::Invalid(errors) => {
            for error in &errors {
                println!("- {error}");
            }
            bail!("{} field(s) failed validation", errors.len())
        }
        SubmissionOutcome::Failed(failure) => bail!("{}", failure.user_message()),
        SubmissionOutcome::Busy => bail!("a submission is already in flight"),
    }
}
