use anyhow::Result;
use clap::ValueEnum;
use comfy_table::{Attribute, Cell, Color as TableColor, Table};
use serde::{Deserialize, Serialize};

use crate::theme::Tone;

/// Output format options for CLI commands
#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Formatted table output (default)
    #[default]
    Table,
    /// JSON output for scripting
    Json,
    /// Compact single-line output
    Compact,
}

/// Options resolved from the command line and `propschema.toml`
#[derive(Clone, Debug)]
pub struct GlobalOptions {
    pub output_format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
    pub no_color: bool,
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for GlobalOptions {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Table,
            quiet: false,
            verbose: false,
            no_color: false,
            pretty: true,
        }
    }
}

/// Data that can be displayed as a table
pub trait TableDisplay {
    fn to_table(&self, output: &OutputManager) -> Table;
    fn to_compact(&self) -> String;
}

/// Formats and prints command results
pub struct OutputManager {
    pub options: GlobalOptions,
}

impl OutputManager {
    pub fn new(options: GlobalOptions) -> Self {
        if options.no_color {
            colored::control::set_override(false);
        }
        Self { options }
    }

    /// Display data according to the configured output format
    pub fn display<T>(&self, data: &T) -> Result<()>
    where
        T: Serialize + TableDisplay,
    {
        if self.options.quiet {
            return Ok(());
        }

        match self.options.output_format {
            OutputFormat::Json => self.json(data)?,
            OutputFormat::Table => println!("{}", data.to_table(self)),
            OutputFormat::Compact => println!("{}", data.to_compact()),
        }
        Ok(())
    }

    /// Print any serializable value as JSON, honoring `pretty`
    pub fn json<T: Serialize + ?Sized>(&self, data: &T) -> Result<()> {
        if self.options.quiet {
            return Ok(());
        }
        println!("{}", self.render_json(data)?);
        Ok(())
    }

    pub fn render_json<T: Serialize + ?Sized>(&self, data: &T) -> Result<String> {
        Ok(if self.options.pretty {
            serde_json::to_string_pretty(data)?
        } else {
            serde_json::to_string(data)?
        })
    }

    pub fn success(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", Tone::Pass.paint(message));
        }
    }

    /// Errors are printed even in quiet mode
    pub fn error(&self, message: &str) {
        eprintln!("{}", Tone::Fail.paint(message));
    }

    /// Something the user asked for came back empty
    pub fn notice(&self, message: &str) {
        if !self.options.quiet {
            println!("{}", Tone::Notice.paint(message));
        }
    }

    /// Only printed with `--verbose`
    pub fn verbose(&self, message: &str) {
        if self.options.verbose && !self.options.quiet {
            eprintln!("{}", Tone::Trace.paint(message));
        }
    }

    pub fn heading(&self, text: &str) {
        if self.options.quiet {
            return;
        }
        if self.options.no_color {
            println!("\n{text}\n{}", "=".repeat(text.chars().count()));
        } else {
            println!("\n{}", Tone::Heading.paint(text));
        }
    }

    pub fn create_table(&self) -> Table {
        let mut table = Table::new();
        if self.options.no_color {
            table.load_preset(comfy_table::presets::ASCII_FULL);
        } else {
            table.load_preset(comfy_table::presets::UTF8_FULL_CONDENSED);
        }
        table
    }

    pub fn add_table_header(&self, table: &mut Table, headers: &[&str]) {
        let header_cells: Vec<Cell> = headers
            .iter()
            .map(|header| {
                let cell = Cell::new(header).add_attribute(Attribute::Bold);
                if self.options.no_color { cell } else { cell.fg(TableColor::Cyan) }
            })
            .collect();
        table.set_header(header_cells);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct TestData {
        name: String,
        value: i32,
    }

    impl TableDisplay for TestData {
        fn to_table(&self, output: &OutputManager) -> Table {
            let mut table = output.create_table();
            table.add_row(vec![Cell::new("Name"), Cell::new(&self.name)]);
            table.add_row(vec![Cell::new("Value"), Cell::new(self.value.to_string())]);
            table
        }

        fn to_compact(&self) -> String {
            format!("{}={}", self.name, self.value)
        }
    }

    fn data() -> TestData {
        TestData {
            name: "test".to_string(),
            value: 42,
        }
    }

    #[test]
    fn json_rendering_honours_pretty() {
        let compact = OutputManager::new(GlobalOptions {
            pretty: false,
            ..Default::default()
        });
        assert_eq!(compact.render_json(&data()).expect("json"), r#"{"name":"test","value":42}"#);

        let pretty = OutputManager::new(GlobalOptions::default());
        assert!(pretty.render_json(&data()).expect("json").contains('\n'));
    }

    #[test]
    fn display_succeeds_in_every_format() {
        for output_format in [OutputFormat::Table, OutputFormat::Json, OutputFormat::Compact] {
            let manager = OutputManager::new(GlobalOptions {
                output_format,
                quiet: true,
                ..Default::default()
            });
            assert!(manager.display(&data()).is_ok());
        }
    }
}
