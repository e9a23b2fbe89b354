use atrender::fs_utils::read_file_contents;
use atrender::{
    AtReference, InputSource, ResolveConfig, Resolver, Result, decode_document, find_references,
    render_document,
};
use clap::builder::{NonEmptyStringValueParser, TypedValueParser};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const LONG_HELP: &str = r#"
Data references:
  "@file.txt"          - replaced by the contents of file.txt
  "@${DIR}/file.txt"   - $NAME and ${NAME} are expanded first (unset -> empty)
  "@/abs/path.txt"     - absolute paths are used as-is
Relative paths are resolved against --base-dir (default: working directory).
File contents are inserted verbatim and are never expanded again.

The outer --input @FILE is read literally: no variable expansion.

Options use GNU-style double dashes: write --input and --template, not the
single-dash -input / -template form (clap would read -input as -i nput).

Examples:
  # Inline data
  atrender --input '{"name":"world"}' --template hello.tmpl
  # Data from a file
  atrender --input @data.json --template page.tmpl
  # Template from stdin
  echo '{{.name}}' | atrender --input '{"name":"x"}' --template -
  # List the files the data refers to
  atrender --input @data.json --template page.tmpl --list=detailed
  # Output as JSON for scripting
  atrender --input @data.json --template page.tmpl --list=json
  # Check every reference is readable without rendering
  atrender --input @data.json --template page.tmpl --dry-run

Template example (Go text/template syntax):
  Hello {{.name}}!
  {{range .items}}- {{.}}
  {{end}}
"#;

/// Render a text template against JSON data with file-backed "@path" values.
#[derive(Parser, Debug)]
#[command(
    name = "atrender",
    version,
    about = "Render a text template against JSON data with file-backed \"@path\" values.",
    after_long_help = LONG_HELP
)]
struct Cli {
    /// Input data: a JSON document, or @FILE to read it from a file
    #[arg(short, long, value_name = "JSON|@FILE", value_parser = NonEmptyStringValueParser::new())]
    input: String,

    /// Template file to render. Use '-' for stdin. Not needed with --list or --dry-run.
    #[arg(
        short,
        long,
        value_name = "FILE",
        value_parser = NonEmptyStringValueParser::new().map(PathBuf::from),
        required_unless_present_any = ["list", "dry_run"]
    )]
    template: Option<PathBuf>,

    /// Base directory for resolving relative @ references in the data
    #[arg(short, long, value_name = "DIR")]
    base_dir: Option<PathBuf>,

    /// Check that every referenced file is readable, without rendering
    #[arg(long, conflicts_with = "list")]
    dry_run: bool,

    /// List references in the data (optionally with format: plain, detailed, json)
    #[arg(long, value_name = "FORMAT", num_args = 0..=1, default_missing_value = "plain", conflicts_with = "dry_run")]
    list: Option<ListFormat>,

    /// Increase verbosity (can be used multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq)]
enum ListFormat {
    /// Pointer and resolved path per reference
    Plain,
    /// Detailed information about each reference
    Detailed,
    /// JSON output for scripting
    Json,
}

#[derive(Serialize)]
struct ReferenceInfo<'a> {
    #[serde(flatten)]
    reference: &'a AtReference,
    exists: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version are reported through the same path
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    init_logging(cli.quiet, cli.verbose);

    let mut config = ResolveConfig::default();
    if let Some(dir) = cli.base_dir.clone() {
        config.base_dir = atrender::fs_utils::absolutize(&dir, &config.base_dir);
    }
    let resolver = Resolver::new(config);
    let input = InputSource::from_arg(&cli.input);

    let result = if cli.dry_run {
        dry_run(&input, &resolver)
    } else if let Some(format) = cli.list {
        list_references(&input, &resolver, format)
    } else if let Some(template) = cli.template.as_deref() {
        let mut stdout = io::stdout().lock();
        render_document(&input, template, &resolver, &mut stdout).map(|()| true)
    } else {
        // clap only lets a missing template through with --list or --dry-run
        Ok(false)
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries only rendered output.
fn init_logging(quiet: bool, verbose: u8) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

fn decode_references(input: &InputSource, resolver: &Resolver) -> Result<Vec<AtReference>> {
    let document = decode_document(&input.load()?)?;
    Ok(find_references(&Value::Object(document), resolver))
}

fn dry_run(input: &InputSource, resolver: &Resolver) -> Result<bool> {
    info!("Performing dry run - validating references...");

    let references = decode_references(input, resolver)?;
    let mut valid_count = 0;
    let mut invalid_count = 0;

    for reference in &references {
        match read_file_contents(&reference.path) {
            Ok(_) => {
                info!("✓ {} -> {}", reference.pointer, reference.path.display());
                valid_count += 1;
            }
            Err(e) => {
                warn!(
                    "✗ {} -> {} ({e})",
                    reference.pointer,
                    reference.path.display()
                );
                invalid_count += 1;
            }
        }
    }

    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Summary: {} references found", references.len())?;
    if valid_count > 0 {
        writeln!(stdout, "  ✓ {valid_count} valid")?;
    }
    if invalid_count > 0 {
        writeln!(stdout, "  ✗ {invalid_count} invalid")?;
    }

    Ok(invalid_count == 0)
}

fn list_references(input: &InputSource, resolver: &Resolver, format: ListFormat) -> Result<bool> {
    let references = decode_references(input, resolver)?;
    let mut stdout = io::stdout().lock();

    match format {
        ListFormat::Plain => {
            for reference in &references {
                writeln!(stdout, "{}\t{}", reference.pointer, reference.path.display())?;
            }
        }
        ListFormat::Detailed => {
            for reference in &references {
                let metadata = std::fs::metadata(&reference.path).ok();
                writeln!(stdout, "Reference: {}", reference.pointer)?;
                writeln!(stdout, "  Spec: @{}", reference.spec)?;
                writeln!(stdout, "  Path: {}", reference.path.display())?;
                writeln!(
                    stdout,
                    "  Exists: {}",
                    if metadata.is_some() { "yes" } else { "no" }
                )?;
                match metadata {
                    Some(m) if m.is_file() => writeln!(stdout, "  Type: File ({} bytes)", m.len())?,
                    Some(m) if m.is_dir() => writeln!(stdout, "  Type: Directory")?,
                    _ => {}
                }
                writeln!(stdout)?;
            }
        }
        ListFormat::Json => {
            let infos: Vec<_> = references
                .iter()
                .map(|reference| {
                    let metadata = std::fs::metadata(&reference.path).ok();
                    ReferenceInfo {
                        reference,
                        exists: metadata.is_some(),
                        size: metadata.filter(std::fs::Metadata::is_file).map(|m| m.len()),
                    }
                })
                .collect();

            serde_json::to_writer_pretty(&mut stdout, &infos).map_err(io::Error::from)?;
            writeln!(stdout)?;
        }
    }

    Ok(true)
}
