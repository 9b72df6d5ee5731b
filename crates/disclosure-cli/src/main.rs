// Clippy pedantic allows:
// - clap requires owned argument values
// - CLI functions don't need must_use
#![allow(clippy::needless_pass_by_value, clippy::must_use_candidate)]

//! Disclosure CLI - PDF disclosure extraction to coded workbooks
//!
//! Extracts page text from every PDF in a directory into the `Coding` sheets
//! of `tax_information.xlsx`, or merges reviewer-grouped rows of an existing
//! workbook back together with `--clean`.

mod config;
mod progress;

use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::Parser;
use colored::Colorize;
use config::Config;
use disclosure_backend::RunReport;
use disclosure_core::{DisclosureError, RunOptions};
use progress::ExtractProgress;
use std::path::{Path, PathBuf};

/// Process exit codes
const EXIT_FAILURE: i32 = 1;
const EXIT_INVALID_INPUT: i32 = 2;
const EXIT_EXTRACTION: i32 = 3;
const EXIT_WORKBOOK: i32 = 4;

/// Verbosity level for output control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Verbosity {
    /// Suppress all output except errors
    Quiet,
    /// Normal output (default)
    Normal,
    /// Progress bar and info-level diagnostics
    Verbose,
}

impl Verbosity {
    /// Create from CLI flags
    const fn from_flags(quiet: bool, verbose: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }

    /// Check if output should be shown (not quiet)
    const fn should_show_output(self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if verbose output is requested
    const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose)
    }

    /// Default log filter, overridable with `RUST_LOG`
    const fn log_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "disclosure",
    about = "Extract PDF disclosures into a coded XLSX workbook",
    long_about = "Extract the text of every PDF in a directory into the Coding sheets of\n\
                  tax_information.xlsx, one row per line or sentence.\n\
                  \n\
                  With --clean, rows that a reviewer marked with the same value in the\n\
                  group column are merged into one row and the workbook is rewritten.\n\
                  \n\
                  Defaults can be set via .disclosure.toml configuration file.",
    version
)]
struct Args {
    /// Directory of PDF files, or with --clean a directory or workbook
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Merge grouped rows of an existing workbook instead of extracting
    #[arg(short, long)]
    clean: bool,

    /// Sentence segmentation with numeric table detection
    #[arg(short, long)]
    segment: bool,

    /// Suppress all output except errors
    #[arg(short, long)]
    quiet: bool,

    /// Show progress and detailed processing information
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Maximum data rows per sheet
    #[arg(long, value_name = "N", value_parser = RangedU64ValueParser::<usize>::new().range(1..))]
    max_rows: Option<usize>,

    /// Read configuration from FILE instead of ~/.disclosure.toml and ./.disclosure.toml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Args {
    /// Run options from config defaults overridden by flags
    fn run_options(&self, config: &Config) -> RunOptions {
        let mut options = config
            .apply(RunOptions::default())
            .with_clean(self.clean)
            .with_verbose(self.verbose);
        if self.segment {
            options = options.with_advanced_segmentation(true);
        }
        if let Some(max_rows) = self.max_rows {
            options = options.with_max_rows_per_sheet(max_rows);
        }
        options
    }
}

fn init_logging(verbosity: Verbosity) {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(verbosity.log_filter()),
    )
    .target(env_logger::Target::Stderr)
    .init();
}

/// Reject a missing path, or a non-directory on the extraction path, before
/// any work starts.
fn validate_target(path: &Path, clean: bool) -> Result<(), DisclosureError> {
    if !path.exists() {
        return Err(DisclosureError::InvalidInput(format!(
            "{} does not exist",
            path.display()
        )));
    }
    if !clean && !path.is_dir() {
        return Err(DisclosureError::InvalidInput(format!(
            "{} is not a valid directory",
            path.display()
        )));
    }
    Ok(())
}

fn run(args: &Args, verbosity: Verbosity) -> Result<RunReport> {
    let config = Config::resolve(args.config.as_deref())?;
    let options = args.run_options(&config);
    options.validate()?;
    validate_target(&args.path, options.clean)?;

    let mut progress = ExtractProgress::new(verbosity.is_verbose());
    let report = disclosure_backend::run(&args.path, &options, &mut progress)
        .with_context(|| format!("Failed to process {}", args.path.display()))?;
    Ok(report)
}

/// Map the underlying error kind to a process exit code
fn exit_code(error: &anyhow::Error) -> i32 {
    match error
        .chain()
        .find_map(|cause| cause.downcast_ref::<DisclosureError>())
    {
        Some(DisclosureError::InvalidInput(_)) => EXIT_INVALID_INPUT,
        Some(DisclosureError::Extraction { .. }) => EXIT_EXTRACTION,
        Some(DisclosureError::Workbook(_)) => EXIT_WORKBOOK,
        _ => EXIT_FAILURE,
    }
}

fn print_report(report: &RunReport) {
    if let Some(summary) = &report.reconcile {
        println!(
            "{} Merged {} groups: {} rows in, {} rows out",
            "✓".green().bold(),
            summary.groups,
            summary.input_rows,
            summary.output_rows
        );
    }
    println!(
        "{} Wrote {} rows to {} ({} {})",
        "✓".green().bold(),
        report.rows,
        report.output.display(),
        report.sheets.len(),
        if report.sheets.len() == 1 { "sheet" } else { "sheets" }
    );
}

fn main() {
    let args = Args::parse();
    let verbosity = Verbosity::from_flags(args.quiet, args.verbose);
    init_logging(verbosity);

    match run(&args, verbosity) {
        Ok(report) => {
            if verbosity.should_show_output() {
                print_report(&report);
            }
        }
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red().bold());
            std::process::exit(exit_code(&e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_from_flags() {
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::Verbose.log_filter(), "info");
        assert!(!Verbosity::Quiet.should_show_output());
    }

    #[test]
    fn test_flags_override_config() {
        let config: Config =
            toml::from_str("[extract]\nsegment = false\n[output]\nmax_rows_per_sheet = 9\n")
                .unwrap();
        let args = Args::parse_from(["disclosure", "--segment", "--max-rows", "3", "dir"]);
        let options = args.run_options(&config);
        assert!(options.use_advanced_segmentation);
        assert_eq!(options.max_rows_per_sheet, 3);
        assert!(!options.clean);
    }

    #[test]
    fn test_config_applies_without_flags() {
        let config: Config = toml::from_str("[extract]\nsegment = true\n").unwrap();
        let args = Args::parse_from(["disclosure", "-c", "dir"]);
        let options = args.run_options(&config);
        assert!(options.use_advanced_segmentation);
        assert!(options.clean);
    }

    #[test]
    fn test_zero_max_rows_is_rejected_by_parser() {
        assert!(Args::try_parse_from(["disclosure", "--max-rows", "0", "dir"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Args::try_parse_from(["disclosure", "-q", "-v", "dir"]).is_err());
    }

    #[test]
    fn test_exit_codes_follow_error_kind() {
        let invalid = anyhow::Error::from(DisclosureError::InvalidInput("x".into()));
        let extraction = anyhow::Error::from(DisclosureError::extraction("a.pdf", "bad"))
            .context("Failed to process dir");
        let workbook = anyhow::Error::from(DisclosureError::Workbook("x".into()));
        let other = anyhow::anyhow!("something else");

        assert_eq!(exit_code(&invalid), EXIT_INVALID_INPUT);
        assert_eq!(exit_code(&extraction), EXIT_EXTRACTION);
        assert_eq!(exit_code(&workbook), EXIT_WORKBOOK);
        assert_eq!(exit_code(&other), EXIT_FAILURE);
    }

    #[test]
    fn test_validate_target() {
        let dir = tempfile::TempDir::new().unwrap();
        let file = dir.path().join("book.xlsx");
        std::fs::write(&file, b"").unwrap();

        assert!(validate_target(dir.path(), false).is_ok());
        assert!(validate_target(&file, true).is_ok());
        assert!(validate_target(&file, false).is_err());
        assert!(validate_target(&dir.path().join("missing"), true).is_err());
    }
}
