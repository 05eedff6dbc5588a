use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use propschema::{compiler, registered_models};
use serde::Serialize;

use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "List Models",
    commands: &[
        "propschema list                   # Show every registered model",
        "propschema --output json list     # Machine-readable listing",
    ],
}];

#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub name: &'static str,
    pub collection: &'static str,
    pub fields: usize,
    pub indexes: usize,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ModelList(pub Vec<ModelSummary>);

impl TableDisplay for ModelList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Model", "Collection", "Fields", "Indexes"]);
        for summary in &self.0 {
            table.add_row(vec![
                Cell::new(summary.name),
                Cell::new(summary.collection),
                Cell::new(summary.fields),
                Cell::new(summary.indexes),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0
            .iter()
            .map(|summary| format!("{}:{}", summary.name, summary.collection))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub fn handle_list(output: &OutputManager) -> Result<()> {
    let compiler = compiler();
    let mut summaries = Vec::new();
    for registration in registered_models() {
        let model = registration
            .model(compiler)
            .with_context(|| format!("Failed to compile model {}", registration.name))?;
        summaries.push(ModelSummary {
            name: registration.name,
            collection: registration.collection,
            fields: model.get_schema().as_object().map_or(0, |object| object.shape.len()),
            indexes: model.get_indexes().len(),
        });
    }
    summaries.sort_by(|a, b| a.name.cmp(b.name));

    if summaries.is_empty() {
        output.notice("No models are registered.");
        return Ok(());
    }
    output.heading("Registered Models");
    output.display(&ModelList(summaries))
}
