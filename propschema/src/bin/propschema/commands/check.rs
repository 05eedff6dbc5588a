use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, Table};
use propschema::{SafeParse, compiler};
use serde::Serialize;
use serde_json::Value;

use super::resolve_model;
use crate::examples::ExampleGroup;
use crate::output::{OutputManager, TableDisplay};

pub const EXAMPLES: &[ExampleGroup] = &[ExampleGroup {
    title: "Validate Data",
    commands: &[
        "propschema check User user.json           # Validate one document",
        "propschema check posts export.json        # Validate every document of a JSON array",
    ],
}];

#[derive(Args)]
pub struct CheckArgs {
    /// Model name or collection
    pub model: String,

    /// JSON file holding one document or an array of documents
    pub file: PathBuf,
}

#[derive(Debug, Serialize)]
pub struct IssueRow {
    /// Position of the document in the file
    pub document: usize,
    pub field: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub model: String,
    pub documents: usize,
    pub issues: Vec<IssueRow>,
}

impl TableDisplay for CheckReport {
    fn to_table(&self, output: &OutputManager) -> Table {
        let mut table = output.create_table();
        output.add_table_header(&mut table, &["Document", "Field", "Code", "Message"]);
        for issue in &self.issues {
            table.add_row(vec![
                Cell::new(issue.document),
                Cell::new(if issue.field.is_empty() { "(root)" } else { issue.field.as_str() }),
                Cell::new(&issue.code),
                Cell::new(&issue.message),
            ]);
        }
        table
    }

    fn to_compact(&self) -> String {
        format!("{}: {} document(s), {} issue(s)", self.model, self.documents, self.issues.len())
    }
}

pub fn handle_check(args: CheckArgs, output: &OutputManager) -> Result<()> {
    let registration = resolve_model(&args.model)?;
    let model = registration
        .model(compiler())
        .with_context(|| format!("Failed to compile model {}", registration.name))?;

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;
    let input: Value =
        serde_json::from_str(&content).with_context(|| format!("{} is not valid JSON", args.file.display()))?;
    let documents = match input {
        Value::Array(documents) => documents,
        document => vec![document],
    };

    let mut issues = Vec::new();
    for (position, document) in documents.iter().enumerate() {
        if let SafeParse::Failure(error) = model.safe_parse(document) {
            issues.extend(error.issues.into_iter().map(|issue| IssueRow {
                document: position,
                field: issue.field,
                code: issue.code,
                message: issue.message,
            }));
        }
    }

    let report = CheckReport {
        model: model.name().to_string(),
        documents: documents.len(),
        issues,
    };
    if report.issues.is_empty() {
        output.success(&format!("{} document(s) match {}", report.documents, report.model));
        return Ok(());
    }

    output.display(&report)?;
    output.error(&format!("{} issue(s) found in {}", report.issues.len(), args.file.display()));
    anyhow::bail!("Validation failed")
}
