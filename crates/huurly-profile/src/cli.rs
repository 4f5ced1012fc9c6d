use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::cmd::{
    self, Context, run::RunArgs, schema::SchemaArgs, steps::StepsArgs, validate::ValidateArgs,
};

#[derive(Parser, Debug)]
#[command(
    name = "huurly-profile",
    about = "Inspect, validate and submit Huurly tenant profiles",
    version,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Profile schema definition (JSON) to use instead of the built-in tenant profile
    #[arg(long = "schema", value_name = "schema.json", global = true)]
    schema: Option<PathBuf>,

    /// Wizard configuration (TOML): submit timeout, locale and message overrides
    #[arg(long = "config", value_name = "wizard.toml", global = true)]
    config: Option<PathBuf>,

    /// Log at debug level regardless of RUST_LOG
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the wizard steps and their fields
    Steps(StepsArgs),
    /// Validate an answers file against the whole profile or one step
    Validate(ValidateArgs),
    /// Walk every step with an answers file and save the profile
    Run(RunArgs),
    /// Print the JSON Schema of a profile snapshot or of the schema definition format
    Schema(SchemaArgs),
}

pub fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let context = Context::load(cli.schema.as_deref(), cli.config.as_deref())?;
    match cli.command {
        Commands::Steps(args) => cmd::steps::run(&args, &context),
        Commands::Validate(args) => cmd::validate::run(&args, &context),
        Commands::Run(args) => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("failed to start the async runtime")?;
            runtime.block_on(cmd::run::run(&args, &context))
        }
        Commands::Schema(args) => cmd::schema::run(&args, &context),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
