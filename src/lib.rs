//! Towerlabel: COCO annotation files from folders of tower site images.
//!
//! Images are labeled by where they live on disk. The root folder's name
//! gives the tower type (`guyedtower1` → `lattice-g`) and, for site layouts,
//! the `top/`, `bottom/` and `unclassified/` subfolders give the section.
//! Every label becomes a full-image COCO annotation.
//!
//! # Modules
//!
//! - [`walk`]: recursive image discovery in deterministic order
//! - [`labels`]: tower-type and section labels, synonym inference, category ids
//! - [`inspect`]: image size inspection and the unreadable-image policy
//! - [`build`]: the annotation builder and its report
//! - [`ir`]: dataset model and the COCO / flat JSON writers
//! - [`validation`]: invariant checks for written documents
//! - [`error`]: error types for towerlabel operations

pub mod build;
pub mod error;
pub mod inspect;
pub mod ir;
pub mod labels;
pub mod validation;
pub mod walk;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use build::{build_and_write, build_dataset, BuildOptions, BuildReport, LayoutMode};
pub use error::TowerLabelError;

use labels::{Section, TowerType};

/// The towerlabel CLI application.
#[derive(Parser)]
#[command(name = "towerlabel")]
#[command(version, about)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Build an annotation file from a folder of images.
    Build(BuildArgs),
    /// Check a COCO file written by `build` for broken invariants.
    Validate(ValidateArgs),
    /// Print the tower type inferred from a folder name.
    Infer(InferArgs),
}

/// Arguments for the build subcommand.
#[derive(clap::Args)]
struct BuildArgs {
    /// Dataset root (e.g. C:/data/guyedtower1).
    root: String,

    /// Output JSON path.
    #[arg(long, env = "TOWERLABEL_OUT", default_value = build::DEFAULT_OUTPUT)]
    out: PathBuf,

    /// Folder layout ('multi-section' or 'single-label').
    #[arg(long, default_value = "multi-section")]
    layout: String,

    /// Tower type ('monopole', 'lattice-s' or 'lattice-g'); overrides inference.
    #[arg(long)]
    tower: Option<String>,

    /// Section for every image ('top', 'bottom' or 'unclassified'); overrides
    /// the section folders.
    #[arg(long)]
    section: Option<String>,

    /// What to do with unreadable images ('skip' or 'record-zero-size').
    #[arg(long, default_value = "skip")]
    on_unreadable: String,

    /// Category ids ('full' or 'tower-only').
    #[arg(long, default_value = "full")]
    categories: String,

    /// Output shape ('coco' or 'flat').
    #[arg(long, default_value = "coco")]
    format: String,

    /// Year written to the info block.
    #[arg(long, default_value_t = build::DEFAULT_YEAR)]
    year: u32,

    /// Report format ('text' or 'json').
    #[arg(long, default_value = "text")]
    report: String,
}

/// Arguments for the validate subcommand.
#[derive(clap::Args)]
struct ValidateArgs {
    /// COCO JSON file to validate.
    input: PathBuf,

    /// Layout the file was built with; enables the per-image label count check.
    #[arg(long)]
    layout: Option<String>,

    /// Treat warnings as errors (exit non-zero if any warnings).
    #[arg(long)]
    strict: bool,

    /// Output format for the report ('text' or 'json').
    #[arg(long, default_value = "text")]
    output: String,
}

/// Arguments for the infer subcommand.
#[derive(clap::Args)]
struct InferArgs {
    /// Folder name to match against the tower synonyms.
    name: String,
}

/// Run the towerlabel CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), TowerLabelError> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Build(args)) => run_build(args),
        Some(Commands::Validate(args)) => run_validate(args),
        Some(Commands::Infer(args)) => run_infer(args),
        None => {
            println!("towerlabel {}", env!("CARGO_PKG_VERSION"));
            println!();
            println!("COCO annotation files from folders of tower site images.");
            println!();
            println!("Run 'towerlabel --help' for usage information.");
            Ok(())
        }
    }
}

/// Turns raw CLI strings into a checked [`BuildOptions`].
fn build_options(args: &BuildArgs) -> Result<BuildOptions, TowerLabelError> {
    let options = BuildOptions {
        root: args.root.clone(),
        output: args.out.clone(),
        format: args.format.parse()?,
        layout: args.layout.parse()?,
        tower: args
            .tower
            .as_deref()
            .map(str::parse::<TowerType>)
            .transpose()?,
        section: args
            .section
            .as_deref()
            .map(str::parse::<Section>)
            .transpose()?,
        on_unreadable: args.on_unreadable.parse()?,
        categories: args.categories.parse()?,
        year: args.year,
    };
    options.check()?;
    Ok(options)
}

/// Execute the build subcommand.
fn run_build(args: BuildArgs) -> Result<(), TowerLabelError> {
    let report_format = ReportFormat::parse(&args.report)?;
    let options = build_options(&args)?;

    let (_, report) = build_and_write(&options)?;

    match report_format {
        ReportFormat::Json => print_json(&report)?,
        ReportFormat::Text => print!("{}", report),
    }
    Ok(())
}

/// Execute the validate subcommand.
fn run_validate(args: ValidateArgs) -> Result<(), TowerLabelError> {
    let report_format = ReportFormat::parse(&args.output)?;
    let layout = args
        .layout
        .as_deref()
        .map(str::parse::<LayoutMode>)
        .transpose()?;

    let dataset = ir::io_coco_json::read_coco_json(&args.input)?;

    let opts = validation::ValidateOptions {
        strict: args.strict,
        layout,
    };
    let report = validation::validate_dataset(&dataset, &opts);

    match report_format {
        ReportFormat::Json => print_json(&serde_json::json!({
            "error_count": report.error_count(),
            "warning_count": report.warning_count(),
            "issues": &report.issues,
        }))?,
        ReportFormat::Text => print!("{}", report),
    }

    let has_errors = report.error_count() > 0;
    let has_warnings = report.warning_count() > 0;

    if has_errors || (args.strict && has_warnings) {
        Err(TowerLabelError::ValidationFailed {
            error_count: report.error_count(),
            warning_count: report.warning_count(),
            report,
        })
    } else {
        Ok(())
    }
}

/// Execute the infer subcommand.
fn run_infer(args: InferArgs) -> Result<(), TowerLabelError> {
    let tower = labels::resolve_tower_type(None, args.name.trim())?;
    println!("{}", tower);
    Ok(())
}

#[derive(Clone, Copy)]
enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    fn parse(value: &str) -> Result<Self, TowerLabelError> {
        match value {
            "text" => Ok(ReportFormat::Text),
            "json" => Ok(ReportFormat::Json),
            other => Err(TowerLabelError::UnsupportedFormat(format!(
                "'{}' report (supported: text, json)",
                other
            ))),
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), TowerLabelError> {
    let text = serde_json::to_string_pretty(value).map_err(TowerLabelError::ReportRender)?;
    println!("{}", text);
    Ok(())
}
