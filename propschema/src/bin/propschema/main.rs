mod commands;
mod config;
mod examples;
mod models;
mod output;
mod theme;

use anyhow::Result;
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, Style},
    },
    error::ErrorKind,
};

use colored::{Colorize, control::ShouldColorize};
use std::fmt::Write;
use std::io::{self, Write as IoWrite};

use commands::{
    check::{CheckArgs, handle_check},
    indexes::{IndexesArgs, handle_indexes},
    list::handle_list,
    schema::{SchemaArgs, handle_schema},
};
use config::ProjectContext;
use examples::{ExampleGroup, command_examples};
use output::{GlobalOptions, OutputFormat, OutputManager};
use theme::{ARROW, Tone};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[("RUST_LOG", "Log filter, e.g. propschema=debug")];

#[derive(Parser)]
#[command(name = "propschema")]
#[command(version)]
#[command(
    about = "Inspect compiled model schemas, validators and indexes",
    long_about = r#"Inspect the models compiled by propschema:

• List registered models with their collections
• Print $jsonSchema documents and collection validators
• Print index descriptions ready for createIndexes
• Validate JSON documents against a model

Settings are read from the nearest propschema.toml; flags take precedence.
"#
)]
#[command(subcommand_required = true, arg_required_else_help = true)]
struct Cli {
    /// Output format (overrides [output] format)
    #[arg(long, value_enum)]
    output: Option<OutputFormat>,

    /// Print JSON on a single line (overrides [output] pretty)
    #[arg(long)]
    no_pretty: bool,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let command = build_cli_command();
        match command.styles(help_styles()).try_get_matches() {
            Ok(matches) => Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit()),
            Err(err) => match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                    let _ = print_blank_line_stdout();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display help: {print_err}");
                    }
                    let _ = print_blank_line_stdout();
                    std::process::exit(0);
                }
                _ => {
                    let exit_code = err.exit_code();
                    let _ = print_blank_line_stderr();
                    if let Err(print_err) = err.print()
                        && print_err.kind() != io::ErrorKind::BrokenPipe
                    {
                        eprintln!("Failed to display error: {print_err}");
                    }
                    let _ = print_blank_line_stderr();
                    std::process::exit(exit_code);
                }
            },
        }
    }
}

fn build_cli_command() -> Command {
    let use_color = ShouldColorize::from_env().should_colorize();
    let appendix = render_top_level_appendix(use_color);
    let mut command = Cli::command().after_long_help(appendix);
    command = command.color(if use_color { ColorChoice::Auto } else { ColorChoice::Never });
    for example in command_examples() {
        if let Some(subcommand) = command.find_subcommand_mut(example.name) {
            let help_text = render_examples(example.groups, use_color);
            *subcommand = subcommand.clone().after_long_help(help_text);
        }
    }
    command
}

fn render_examples(groups: &[ExampleGroup], use_color: bool) -> String {
    let mut buffer = String::new();

    let heading = stylize("Examples:", Tone::Heading, true, use_color);
    let _ = writeln!(buffer, "{heading}");

    for (index, group) in groups.iter().enumerate() {
        let title = stylize(group.title, Tone::Heading, false, use_color);
        let _ = writeln!(buffer, "  {title}");

        for command in group.commands {
            let arrow = stylize(ARROW, Tone::Trace, false, use_color);
            let command_text = stylize(command, Tone::Literal, false, use_color);
            let _ = writeln!(buffer, "    {arrow} {command_text}");
        }

        if index + 1 < groups.len() {
            buffer.push('\n');
        }
    }

    buffer
}

fn render_top_level_appendix(use_color: bool) -> String {
    let mut buffer = String::new();

    let env_heading = stylize("Environment Variables:", Tone::Heading, true, use_color);
    let _ = writeln!(buffer, "{env_heading}");
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, Tone::Literal, true, use_color);
        let _ = writeln!(buffer, "  {key_text}  {description}");
    }

    buffer.push('\n');

    let tip_heading = stylize("Tip:", Tone::Heading, true, use_color);
    let tip_text = stylize(
        "Use 'propschema <command> --help' to view examples for each command.",
        Tone::Trace,
        false,
        use_color,
    );
    let _ = writeln!(buffer, "{tip_heading} {tip_text}");

    buffer
}

fn print_blank_line_stdout() -> io::Result<()> {
    let mut stdout = io::stdout();
    IoWrite::write_all(&mut stdout, b"\n")?;
    IoWrite::flush(&mut stdout)
}

fn print_blank_line_stderr() -> io::Result<()> {
    let mut stderr = io::stderr();
    IoWrite::write_all(&mut stderr, b"\n")?;
    IoWrite::flush(&mut stderr)
}

fn stylize(text: &str, tone: Tone, bold: bool, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let styled = text.color(tone.color());
    if bold { styled.bold().to_string() } else { styled.to_string() }
}

fn help_styles() -> Styles {
    Styles::styled()
        .usage(style_from_tone(Tone::Heading).bold())
        .header(style_from_tone(Tone::Heading).bold())
        .literal(style_from_tone(Tone::Literal))
        .placeholder(style_from_tone(Tone::Trace))
        .valid(style_from_tone(Tone::Pass))
        .invalid(style_from_tone(Tone::Notice))
        .error(style_from_tone(Tone::Fail).bold())
}

fn style_from_tone(tone: Tone) -> Style {
    let ansi = match tone {
        Tone::Pass => AnsiColor::Green,
        Tone::Fail => AnsiColor::Red,
        Tone::Notice => AnsiColor::Yellow,
        Tone::Trace => AnsiColor::BrightBlack,
        Tone::Heading => AnsiColor::Cyan,
        Tone::Literal => AnsiColor::Magenta,
    };
    Style::new().fg_color(Some(ClapColor::Ansi(ansi)))
}

#[derive(Subcommand)]
enum Commands {
    /// List registered models
    List,

    /// Print the $jsonSchema document of a model
    Schema(SchemaArgs),

    /// Print the index descriptions of a model
    Indexes(IndexesArgs),

    /// Validate a JSON file against a model
    Check(CheckArgs),
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();

    if let Err(err) = execute(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

fn execute(cli: Cli) -> Result<()> {
    let context = ProjectContext::find()?;
    let config = context.config;

    let global_options = GlobalOptions {
        output_format: cli.output.unwrap_or(config.output.format),
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
        pretty: config.output.pretty && !cli.no_pretty,
    };
    let output = OutputManager::new(global_options);
    if let Some(path) = &context.config_path {
        output.verbose(&format!("using {}", path.display()));
    }

    match cli.command {
        Commands::List => handle_list(&output),
        Commands::Schema(args) => handle_schema(args, &config, &output),
        Commands::Indexes(args) => handle_indexes(args, &output),
        Commands::Check(args) => handle_check(args, &output),
    }
}
