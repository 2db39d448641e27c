use std::path::PathBuf;
use thiserror::Error;

use crate::validation::ValidationReport;

/// The main error type for towerlabel operations.
#[derive(Debug, Error)]
pub enum TowerLabelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Root folder not found: {path}")]
    RootNotFound { path: PathBuf },

    #[error("No images found under {path}{hint}")]
    NoImagesFound { path: PathBuf, hint: String },

    #[error("Invalid {kind} label '{value}' (expected one of: {expected})")]
    InvalidLabel {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error(
        "Could not infer tower type from folder name '{folder}'; pass --tower with one of: monopole, lattice-s, lattice-g"
    )]
    UnresolvedTowerType { folder: String },

    #[error("Invalid options: {message}")]
    InvalidOptions { message: String },

    #[error("Failed to read image dimensions from {path}: {source}")]
    ImageDimensionRead {
        path: PathBuf,
        #[source]
        source: imagesize::ImageError,
    },

    #[error("Image {path} is {width}x{height}, larger than a u32 dimension")]
    ImageTooLarge {
        path: PathBuf,
        width: usize,
        height: usize,
    },

    #[error("Failed while walking {path}: {source}")]
    WalkFailed {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Failed to parse COCO JSON from {path}: {source}")]
    CocoJsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write COCO JSON to {path}: {source}")]
    CocoJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write classification JSON to {path}: {source}")]
    FlatJsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to render report: {0}")]
    ReportRender(#[source] serde_json::Error),

    #[error("Dataset is inconsistent: {message}")]
    DanglingReference { message: String },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}
