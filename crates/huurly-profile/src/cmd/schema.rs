use anyhow::Result;
use clap::Args;
use profile_spec::SchemaDef;

use super::Context;

#[derive(Args, Debug, Clone)]
pub struct SchemaArgs {
    /// Print the JSON Schema of the schema definition format instead
    #[arg(long = "definition", default_value_t = false)]
    pub definition: bool,
}

pub fn run(args: &SchemaArgs, ctx: &Context) -> Result<()> {
    let document = if args.definition {
        serde_json::to_value(schemars::schema_for!(SchemaDef))?
    } else {
        profile_spec::snapshot_schema(&ctx.schema)
    };
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
