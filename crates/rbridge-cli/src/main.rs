use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rbridge_core::{Config, DiffReport, ForeignValue, RowDiff};
use rbridge_engine::{coerce, CompareOptions, TableComparator};
use rbridge_host::{CallArgs, ProjectEnvironment, RscriptHost, ScriptSession};

mod table_io;

/// Rows listed per column in the summary
const SUMMARY_ROWS: usize = 10;

/// rbridge - call R functions and reconcile their tables with native ones
#[derive(Parser)]
#[command(name = "rbridge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: rbridge.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a native table against a table produced by R
    Compare {
        /// Native (reference) table, CSV
        left: PathBuf,

        /// Table produced by R, CSV
        right: PathBuf,

        /// Absolute tolerance for numeric columns
        #[arg(long)]
        float_tol: Option<f64>,

        /// Do not compare row indexes
        #[arg(long)]
        no_index_check: bool,

        /// Write the diff report as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        /// Also write a markdown report
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Call a function defined in an R script
    Call {
        /// Function name
        function: String,

        /// R script defining the function
        #[arg(short, long)]
        script: PathBuf,

        /// renv project directory
        #[arg(short, long)]
        project: Option<PathBuf>,

        /// Positional argument (repeatable)
        #[arg(short, long = "arg")]
        args: Vec<String>,

        /// Named argument as key=value (repeatable)
        #[arg(short, long, value_parser = parse_key_value)]
        named: Vec<(String, String)>,

        /// Print the raw foreign value instead of converting it
        #[arg(long)]
        raw: bool,
    },

    /// Check that a directory is a usable renv project
    CheckEnv {
        /// Project directory
        project: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    init_tracing(cli.verbose);

    // Load config if specified
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if Path::new("rbridge.toml").exists() {
        Config::from_file(Path::new("rbridge.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::Compare {
            left,
            right,
            float_tol,
            no_index_check,
            json,
            markdown,
        } => {
            let mut options = CompareOptions::from(&config);
            if let Some(tol) = float_tol {
                options.float_tol = tol;
            }
            if no_index_check {
                options.check_index = false;
            }
            compare_command(
                &left,
                &right,
                options,
                json.as_deref(),
                markdown.as_deref(),
                cli.verbose,
            )
        }
        Commands::Call {
            function,
            script,
            project,
            args,
            named,
            raw,
        } => call_command(
            &config,
            &function,
            &script,
            project.as_deref(),
            build_args(&args, &named),
            raw,
        ),
        Commands::CheckEnv { project } => check_env_command(&config, &project),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Compare command - reconcile two tables
fn compare_command(
    left: &Path,
    right: &Path,
    options: CompareOptions,
    json: Option<&Path>,
    markdown: Option<&Path>,
    verbose: bool,
) -> Result<()> {
    if verbose {
        eprintln!("{} {}", "Loading left table from:".cyan(), left.display());
        eprintln!("{} {}", "Loading right table from:".cyan(), right.display());
    }

    let left_table = table_io::read_csv(left)?;
    let right_table = table_io::read_csv(right)?;

    tracing::debug!(?options, "Comparing tables");
    let report = TableComparator::new(options).compare(&left_table, &right_table);

    if let Some(path) = json {
        report
            .save_to_file(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if verbose {
            eprintln!("{} {}", "Report saved to:".green(), path.display());
        }
    }

    if let Some(md_path) = markdown {
        std::fs::write(md_path, generate_markdown_report(&report, left, right))?;
        if verbose {
            eprintln!("{} {}", "Markdown report saved to:".green(), md_path.display());
        }
    }

    print_report_summary(&report, left, right);

    // Exit with error code if the tables differ
    if !report.is_equivalent() {
        std::process::exit(1);
    }

    Ok(())
}

/// Call command - run an R function through Rscript
fn call_command(
    config: &Config,
    function: &str,
    script: &Path,
    project: Option<&Path>,
    args: CallArgs,
    raw: bool,
) -> Result<()> {
    let host = RscriptHost::from_config(&config.host);
    let mut session = ScriptSession::open(host, project, script, &config.host)
        .with_context(|| format!("Failed to load {}", script.display()))?;

    let convert = raw.then_some(false);
    let result = session.call_with(function, &args, convert)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Check-env command - validate a project environment
fn check_env_command(config: &Config, project: &Path) -> Result<()> {
    let env = ProjectEnvironment::activate(project, &config.host)?;

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Project Environment".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("{} {}", "Project:".bold(), env.project_dir.display().to_string().green());
    println!("{} {}", "Activation script:".bold(), env.activate_script.display());
    println!("{} {}", "Lockfile:".bold(), env.lockfile.display());
    match env.renviron() {
        Some(path) => println!("{} {}", "Environment file:".bold(), path),
        None => println!("{} {}", "Environment file:".bold(), "none".dimmed()),
    }

    println!();
    println!("{}", "✓ Environment is complete".green().bold());
    println!("{}", "=".repeat(60).bright_blue());

    Ok(())
}

fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}

/// Command-line text to the closest foreign scalar
fn cli_value(text: &str) -> ForeignValue {
    if let Some(i) = coerce::parse_int(text).and_then(|i| i32::try_from(i).ok()) {
        return ForeignValue::from(i);
    }
    if let Some(f) = coerce::parse_float(text) {
        return ForeignValue::from(f);
    }
    if let Some(b) = coerce::parse_bool(text) {
        return ForeignValue::from(b);
    }
    ForeignValue::from(text)
}

fn build_args(positional: &[String], named: &[(String, String)]) -> CallArgs {
    let args = positional
        .iter()
        .fold(CallArgs::new(), |args, value| args.arg(cli_value(value)));
    named
        .iter()
        .fold(args, |args, (key, value)| args.named(key.as_str(), cli_value(value)))
}

/// Print report summary to stdout
fn print_report_summary(report: &DiffReport, left: &Path, right: &Path) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Table Comparison Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Left:  {}", left.display());
    println!("Right: {}", right.display());
    println!();

    println!("{}", "Summary:".bold());
    println!("  Shape mismatch:   {}", flag(report.shape_mismatch));
    println!("  Columns mismatch: {}", flag(report.columns_mismatch));
    println!("  Index mismatch:   {}", flag(report.index_mismatch));

    let diffs = report.diff_count();
    if diffs > 0 {
        println!("  Differing cells:  {}", format!("{}", diffs).red().bold());
    } else {
        println!("  Differing cells:  {}", format!("{}", diffs).green());
    }
    println!();

    if report.is_equivalent() {
        println!("{}", "✓ Tables are equivalent!".green().bold());
    } else {
        print_diffs("Numeric differences:", &report.numeric_diffs);
        print_diffs("Non-numeric differences:", &report.non_numeric_diffs);
    }

    println!();
    println!("{}", "=".repeat(60).bright_blue());
}

fn flag(set: bool) -> colored::ColoredString {
    if set {
        "yes".red().bold()
    } else {
        "no".green()
    }
}

fn print_diffs(title: &str, diffs: &std::collections::BTreeMap<String, Vec<RowDiff>>) {
    if diffs.is_empty() {
        return;
    }

    println!("{}", title.bold());
    for (column, rows) in diffs {
        println!("  {} ({} rows)", column.yellow(), rows.len());
        for diff in rows.iter().take(SUMMARY_ROWS) {
            println!("    row {}: {} != {}", diff.row, diff.left, diff.right);
        }
        if rows.len() > SUMMARY_ROWS {
            println!("    ... {} more", rows.len() - SUMMARY_ROWS);
        }
    }
}

/// Generate markdown report
fn generate_markdown_report(report: &DiffReport, left: &Path, right: &Path) -> String {
    let mut md = String::new();

    md.push_str("# Table Comparison Report\n\n");
    md.push_str(&format!("**Left:** `{}`\n\n", left.display()));
    md.push_str(&format!("**Right:** `{}`\n\n", right.display()));

    md.push_str("## Summary\n\n");
    md.push_str(&format!("- Shape mismatch: {}\n", report.shape_mismatch));
    md.push_str(&format!("- Columns mismatch: {}\n", report.columns_mismatch));
    md.push_str(&format!("- Index mismatch: {}\n", report.index_mismatch));
    md.push_str(&format!("- Differing cells: {}\n", report.diff_count()));
    md.push('\n');

    if report.is_equivalent() {
        md.push_str("✅ **Tables are equivalent!**\n");
        return md;
    }

    for (title, diffs) in [
        ("Numeric differences", &report.numeric_diffs),
        ("Non-numeric differences", &report.non_numeric_diffs),
    ] {
        if diffs.is_empty() {
            continue;
        }
        md.push_str(&format!("## {}\n\n", title));
        for (column, rows) in diffs {
            md.push_str(&format!("### {}\n\n", column));
            md.push_str("| Row | Left | Right |\n|-----|------|-------|\n");
            for diff in rows {
                md.push_str(&format!("| {} | {} | {} |\n", diff.row, diff.left, diff.right));
            }
            md.push('\n');
        }
    }

    md
}
