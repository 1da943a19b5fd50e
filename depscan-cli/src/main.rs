//! depscan CLI - unused file detector for JavaScript/TypeScript trees.
//!
//! Features:
//! - Regex-based import/require extraction with on-disk resolution
//! - Rayon-powered parallel file analysis
//! - Tree, statistics and JSON report formats
//! - Optional depscan.toml at the scan root
//!
//! stdout carries only the report. Progress and warnings go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};

use depscan_core::{
    analysis_timestamp, init_structured_logging, load_config, log_error, log_event, log_info,
    log_warn, render_json, render_statistics, render_tree, AnalysisResult, Depscan, DepscanError,
    OutputFormat, DEFAULT_TOP_N,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Unused file detector for JavaScript/TypeScript trees")]
pub struct Cli {
    /// Root directory to scan
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Report format: tree, json or both
    #[arg(short, long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Annotate files with the external packages they reference
    #[arg(short = 'e', long)]
    external: bool,

    /// Scan .test. and .spec. files as well
    #[arg(long)]
    include_tests: bool,

    /// Extra path-segment substrings to skip
    #[arg(long, num_args = 1..)]
    ignore: Vec<String>,

    /// Recognized extensions in resolution priority order (comma separated)
    #[arg(long, value_delimiter = ',')]
    extensions: Vec<String>,

    /// Number of external packages listed in the statistics
    #[arg(long)]
    top: Option<usize>,
}

fn parse_format(raw: &str) -> Result<OutputFormat, String> {
    raw.parse()
}

/// Settings after merging CLI flags over depscan.toml.
#[derive(Debug)]
struct Settings {
    format: OutputFormat,
    top: usize,
    analysis: Depscan,
}

/// CLI flags win over the config file, which wins over built-in defaults.
///
/// Runs before any scanning, so a bad format in depscan.toml fails early.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let config = load_config(&cli.path)?;

    let config_format = match &config {
        Some(cfg) => cfg.output_format()?,
        None => None,
    };
    let format = cli.format.or(config_format).unwrap_or_default();
    let top = cli
        .top
        .or_else(|| config.as_ref().and_then(|c| c.top()))
        .unwrap_or(DEFAULT_TOP_N);

    let mut analysis = Depscan::new(&cli.path);
    if let Some(cfg) = &config {
        analysis = analysis.with_config(cfg);
    }
    if !cli.extensions.is_empty() {
        analysis = analysis.extensions(cli.extensions.iter().cloned());
    }
    analysis = analysis.ignore(cli.ignore.iter().cloned());
    if cli.include_tests {
        analysis = analysis.include_tests(true);
    }

    Ok(Settings {
        format,
        top,
        analysis,
    })
}

/// Write `content` to `path`, or to stdout when no path is given.
fn write_report(content: &str, path: Option<&Path>) -> Result<(), DepscanError> {
    match path {
        Some(path) => {
            fs::write(path, content).map_err(|e| DepscanError::output(path, e.to_string()))?;
            log_info(&format!("report written to {}", path.display()));
            eprintln!("INFO: Report written to {}", path.display());
        }
        None => {
            print!("{}", content);
            if !content.ends_with('\n') {
                println!();
            }
        }
    }
    Ok(())
}

fn render_text(result: &AnalysisResult, show_external: bool, top: usize) -> String {
    format!(
        "{}\n{}",
        render_tree(result, show_external),
        render_statistics(result, top)
    )
}

/// Prints recorded non-fatal errors at the end of the run.
fn print_recorded_errors(result: &AnalysisResult) {
    if result.errors.is_empty() {
        return;
    }
    log_warn(&format!("{} errors recorded during analysis", result.errors.len()));
    eprintln!("[WARN] {} error(s) recorded during analysis:", result.errors.len());
    for e in &result.errors {
        log_event("WARN", &e.to_string());
        eprintln!("  - {}", e);
    }
}

/// Scan, render and route the report. Errors here end the process.
fn run(cli: &Cli) -> Result<()> {
    let settings = resolve_settings(cli)?;

    let result = settings
        .analysis
        .analyze()
        .with_context(|| format!("Analysis failed for {}", cli.path.display()))?;

    let output = cli.output.as_deref();
    match settings.format {
        OutputFormat::Tree => {
            write_report(&render_text(&result, cli.external, settings.top), output)?;
        }
        OutputFormat::Json => {
            let json = render_json(&result, analysis_timestamp())?;
            write_report(&json, output)?;
        }
        OutputFormat::Both => {
            write_report(&render_text(&result, cli.external, settings.top), None)?;
            let json = render_json(&result, analysis_timestamp())?;
            write_report(&json, output)?;
        }
    }

    print_recorded_errors(&result);

    // Finding unused files is not a failure
    Ok(())
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] depscan internal error: {}", info);
    }));

    // JSON logs to stderr, respects RUST_LOG
    init_structured_logging();

    let cli = Cli::parse();
    run(&cli).inspect_err(|e| log_error(&format!("{:#}", e)))
}
