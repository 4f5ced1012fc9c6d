use anyhow::Result;
use clap::Args;
use serde::Serialize;

use super::Context;

#[derive(Args, Debug, Clone)]
pub struct StepsArgs {
    /// Print the steps as JSON
    #[arg(long = "json", default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StepView<'a> {
    number: usize,
    id: &'a str,
    label: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    fields: Vec<FieldView<'a>>,
}

#[derive(Debug, Serialize)]
struct FieldView<'a> {
    name: &'a str,
    label: &'a str,
    kind: &'static str,
    required: bool,
    /// Required only while its condition holds.
    conditional: bool,
}

pub fn run(args: &StepsArgs, ctx: &Context) -> Result<()> {
    let views = step_views(ctx);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }

    println!("{} ({})", ctx.schema.title(), ctx.schema.version());
    for step in &views {
        println!("{}. {} ({})", step.number, step.label, step.id);
        for field in &step.fields {
            let marker = if field.required {
                " *"
            } else if field.conditional {
                " (*)"
            } else {
                ""
            };
            println!("   - {} [{}] {}{}", field.name, field.kind, field.label, marker);
        }
    }
    Ok(())
}

fn step_views(ctx: &Context) -> Vec<StepView<'_>> {
    ctx.schema
        .steps()
        .iter()
        .enumerate()
        .map(|(index, step)| StepView {
            number: index + 1,
            id: &step.id,
            label: &step.label,
            description: step.description.as_deref(),
            fields: ctx
                .schema
                .step_fields(index)
                .map(|field| FieldView {
                    name: &field.name,
                    label: &field.label,
                    kind: field.kind.name(),
                    required: field.required,
                    conditional: !field.required && field.required_if.is_some(),
                })
                .collect(),
        })
        .collect()
}
