use anyhow::{Context, Result};
use clap::Args;
use propschema::{compiler, with_id};

use super::resolve_model;
use crate::config::Config;
use crate::examples::ExampleGroup;
use crate::output::OutputManager;

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Print Documents",
    commands: &[
        "propschema schema User                    # $jsonSchema document for User",
        "propschema schema users --with-id         # Look up by collection and declare _id",
        "propschema schema User --validator        # Wrap as a collection validator",
        "propschema schema User --title user       # Set the document title",
    ],
}];

#[derive(Args)]
pub struct SchemaArgs {
    /// Model name or collection
    pub model: String,

    /// Title of the document (defaults to the model name when `title_from_name` is set)
    #[arg(long)]
    pub title: Option<String>,

    /// Declare `_id` on closed documents
    #[arg(long)]
    pub with_id: bool,

    /// Print `{"$jsonSchema": ...}` instead of the bare document
    #[arg(long)]
    pub validator: bool,
}

pub fn handle_schema(args: SchemaArgs, config: &Config, output: &OutputManager) -> Result<()> {
    let registration = resolve_model(&args.model)?;
    let model = registration
        .model(compiler())
        .with_context(|| format!("Failed to compile model {}", registration.name))?;

    let title = args
        .title
        .or_else(|| config.schema.title_from_name.then(|| model.name().to_string()));
    let mut document = match &title {
        Some(title) => model.to_json_titled(title),
        None => model.to_json(),
    }
    .with_context(|| format!("Failed to translate model {}", model.name()))?;

    if args.with_id || config.schema.with_id {
        document = with_id(document);
    }
    output.verbose(&format!("{} -> collection {}", model.name(), registration.collection));

    if args.validator {
        output.json(&propschema::validator(&document)?)
    } else {
        output.json(&document)
    }
}
