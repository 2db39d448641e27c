//! Dataset model and its on-disk renderings.
//!
//! The builder produces a [`Dataset`]; the writers turn it into either a COCO
//! document ([`io_coco_json`]) or a flat classification list
//! ([`io_flat_json`]). Both renderings come from the same model, so the
//! choice of output shape never changes which images or labels are included.
//!
//! # Example
//!
//! ```
//! use towerlabel::ir::{Annotation, Dataset, Image};
//! use towerlabel::labels::CategoryScheme;
//!
//! let dataset = Dataset {
//!     categories: CategoryScheme::Full.categories(),
//!     images: vec![Image::new(1u64, "top/a.jpg", 100, 50)],
//!     annotations: vec![Annotation::full_image(1u64, 1u64, 3u64, 100, 50)],
//!     ..Default::default()
//! };
//! assert_eq!(dataset.annotations[0].area, 5000.0);
//! ```

mod ids;
pub mod io_coco_json;
pub mod io_flat_json;
mod model;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{full_area, Annotation, Category, Dataset, DatasetInfo, Image};

use crate::error::TowerLabelError;

/// Output document shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// COCO detection JSON with full-image boxes.
    #[default]
    Coco,
    /// JSON array of `{image, class}` pairs.
    Flat,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Coco => "coco",
            OutputFormat::Flat => "flat",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = TowerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "coco" => Ok(OutputFormat::Coco),
            "flat" => Ok(OutputFormat::Flat),
            other => Err(TowerLabelError::UnsupportedFormat(format!(
                "'{}' (supported: coco, flat)",
                other
            ))),
        }
    }
}

/// Writes `dataset` to `path` in the requested shape.
pub fn write_dataset(
    path: &Path,
    dataset: &Dataset,
    format: OutputFormat,
) -> Result<(), TowerLabelError> {
    match format {
        OutputFormat::Coco => io_coco_json::write_coco_json(path, dataset),
        OutputFormat::Flat => io_flat_json::write_flat_json(path, dataset),
    }
}

/// Creates the parent directory of `path` and replaces the file with `bytes`.
fn write_output_file(path: &Path, bytes: &[u8]) -> Result<(), TowerLabelError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(TowerLabelError::Io)?;
    }
    fs::write(path, bytes).map_err(TowerLabelError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_parse() {
        assert_eq!("coco".parse::<OutputFormat>().unwrap(), OutputFormat::Coco);
        assert_eq!("flat".parse::<OutputFormat>().unwrap(), OutputFormat::Flat);
        assert!("coco-json".parse::<OutputFormat>().is_err());
        assert!(matches!(
            "yolo".parse::<OutputFormat>(),
            Err(TowerLabelError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn test_write_dataset_flat_to_relative_parentless_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let out = temp.path().join("labels.json");

        write_dataset(&out, &Dataset::default(), OutputFormat::Flat).expect("write flat");
        let text = fs::read_to_string(&out).unwrap();
        assert_eq!(text.trim(), "[]");
    }
}
