use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use propschema::{IndexDescription, compiler};
use serde::Serialize;

use super::resolve_model;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Show Indexes",
    commands: &[
        "propschema indexes User                   # Index descriptions for User",
        "propschema --output json indexes posts    # createIndexes payload for posts",
    ],
}];

#[derive(Args)]
pub struct IndexesArgs {
    /// Model name or collection
    pub model: String,
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct IndexList(pub Vec<IndexDescription>);

fn flag(set: bool) -> &'static str {
    if set { "yes" } else { "" }
}

impl TableDisplay for IndexList {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Name", "Key", "Unique", "Sparse", "TTL"]);
        for index in &self.0 {
            let key = index
                .key
                .iter()
                .map(|(path, direction)| format!("{path}: {direction}"))
                .collect::<Vec<_>>()
                .join(", ");
            table.add_row(vec![
                Cell::new(&index.name),
                Cell::new(key),
                Cell::new(flag(index.unique)),
                Cell::new(flag(index.sparse)),
                Cell::new(index.expire_after_seconds.map(|seconds| format!("{seconds}s")).unwrap_or_default()),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        self.0.iter().map(|index| index.name.as_str()).collect::<Vec<_>>().join(" ")
    }
}

pub fn handle_indexes(args: IndexesArgs, output: &OutputManager) -> Result<()> {
    let registration = resolve_model(&args.model)?;
    let compiler = compiler();
    let class = registration.class(compiler.registry());
    let indexes = compiler
        .build_indexes(class, None)
        .with_context(|| format!("Failed to build indexes for {}", registration.name))?;

    if indexes.is_empty() {
        output.notice(&format!("{} declares no indexes.", registration.name));
        return Ok(());
    }
    output.heading(&format!("Indexes on {}", registration.collection));
    output.display(&IndexList(indexes.to_vec()))
}
