//! COCO JSON writer (and reader, for validating written files).
//!
//! Every annotation is a full-image box, so this is a classification dataset
//! expressed in the COCO detection schema:
//!
//! ```json
//! {
//!   "info": {"description": "...", "version": "1.0", "year": 2025},
//!   "licenses": [],
//!   "categories": [{"id": 1, "name": "monopole", "supercategory": "tower"}],
//!   "images": [{"id": 1, "file_name": "top/a.jpg", "width": 100, "height": 50}],
//!   "annotations": [{"id": 1, "image_id": 1, "category_id": 1, "iscrowd": 0,
//!                    "bbox": [0, 0, 100, 50], "area": 5000.0}]
//! }
//! ```
//!
//! # Deterministic Output
//!
//! Lists are written in id order and the document carries no clock-derived
//! fields, so the same folder snapshot always produces the same bytes.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{Annotation, Category, Dataset, DatasetInfo, Image};
use super::{AnnotationId, CategoryId, ImageId};
use crate::error::TowerLabelError;

// ============================================================================
// COCO Schema Types (internal to this module)
// ============================================================================

/// Top-level COCO document. Field order is the on-disk key order.
#[derive(Debug, Serialize, Deserialize)]
struct CocoDocument {
    info: CocoInfo,

    #[serde(default)]
    licenses: Vec<serde_json::Value>,

    categories: Vec<CocoCategory>,

    images: Vec<CocoImage>,

    annotations: Vec<CocoAnnotation>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoInfo {
    #[serde(default)]
    description: String,

    #[serde(default)]
    version: String,

    #[serde(default)]
    year: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    supercategory: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoAnnotation {
    id: u64,
    image_id: u64,
    category_id: u64,

    #[serde(default)]
    iscrowd: u8,

    /// `[x, y, width, height]`; always `[0, 0, w, h]` for written files.
    bbox: [u32; 4],

    area: f64,
}

// ============================================================================
// Public API
// ============================================================================

/// Writes a dataset to a COCO JSON file.
///
/// Parent directories are created as needed and an existing file at `path`
/// is replaced. The document is serialized in memory first, so a
/// serialization failure leaves the target untouched.
///
/// # Errors
/// Returns an error if the directory cannot be created or the file cannot
/// be written.
pub fn write_coco_json(path: &Path, dataset: &Dataset) -> Result<(), TowerLabelError> {
    let json = to_coco_string(dataset).map_err(|source| TowerLabelError::CocoJsonWrite {
        path: path.to_path_buf(),
        source,
    })?;

    super::write_output_file(path, json.as_bytes())
}

/// Reads a COCO JSON file written by [`write_coco_json`].
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use towerlabel::ir::io_coco_json::read_coco_json;
///
/// let dataset = read_coco_json(Path::new("data/coco_annotations.json"))?;
/// # Ok::<(), towerlabel::TowerLabelError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<Dataset, TowerLabelError> {
    let bytes = fs::read(path).map_err(TowerLabelError::Io)?;

    from_coco_slice(&bytes).map_err(|source| TowerLabelError::CocoJsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders a dataset as pretty-printed COCO JSON.
pub fn to_coco_string(dataset: &Dataset) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&dataset_to_coco(dataset))
}

/// Parses a dataset from a COCO JSON string.
pub fn from_coco_str(json: &str) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDocument = serde_json::from_str(json)?;
    Ok(coco_to_dataset(coco))
}

/// Parses a dataset from a COCO JSON byte slice.
pub fn from_coco_slice(bytes: &[u8]) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDocument = serde_json::from_slice(bytes)?;
    Ok(coco_to_dataset(coco))
}

// ============================================================================
// Conversion
// ============================================================================

fn dataset_to_coco(dataset: &Dataset) -> CocoDocument {
    let mut categories: Vec<CocoCategory> = dataset
        .categories
        .iter()
        .map(|cat| CocoCategory {
            id: cat.id.as_u64(),
            name: cat.name.clone(),
            supercategory: cat.supercategory.clone(),
        })
        .collect();
    categories.sort_by_key(|c| c.id);

    let mut images: Vec<CocoImage> = dataset
        .images
        .iter()
        .map(|img| CocoImage {
            id: img.id.as_u64(),
            file_name: img.file_name.clone(),
            width: img.width,
            height: img.height,
        })
        .collect();
    images.sort_by_key(|i| i.id);

    let mut annotations: Vec<CocoAnnotation> = dataset
        .annotations
        .iter()
        .map(|ann| CocoAnnotation {
            id: ann.id.as_u64(),
            image_id: ann.image_id.as_u64(),
            category_id: ann.category_id.as_u64(),
            iscrowd: ann.iscrowd,
            bbox: ann.bbox,
            area: ann.area,
        })
        .collect();
    annotations.sort_by_key(|a| a.id);

    CocoDocument {
        info: CocoInfo {
            description: dataset.info.description.clone(),
            version: dataset.info.version.clone(),
            year: dataset.info.year,
        },
        licenses: Vec::new(),
        categories,
        images,
        annotations,
    }
}

fn coco_to_dataset(coco: CocoDocument) -> Dataset {
    let info = DatasetInfo {
        description: coco.info.description,
        version: coco.info.version,
        year: coco.info.year,
    };

    let categories = coco
        .categories
        .into_iter()
        .map(|cat| Category {
            id: CategoryId::new(cat.id),
            name: cat.name,
            supercategory: cat.supercategory,
        })
        .collect();

    let images = coco
        .images
        .into_iter()
        .map(|img| Image::new(ImageId::new(img.id), img.file_name, img.width, img.height))
        .collect();

    let annotations = coco
        .annotations
        .into_iter()
        .map(|ann| Annotation {
            id: AnnotationId::new(ann.id),
            image_id: ImageId::new(ann.image_id),
            category_id: CategoryId::new(ann.category_id),
            bbox: ann.bbox,
            area: ann.area,
            iscrowd: ann.iscrowd,
        })
        .collect();

    Dataset {
        info,
        categories,
        images,
        annotations,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::CategoryScheme;

    fn sample_dataset() -> Dataset {
        Dataset {
            info: DatasetInfo {
                description: "Site 'guyedtower1'".to_string(),
                version: "1.0".to_string(),
                year: 2025,
            },
            categories: CategoryScheme::Full.categories(),
            images: vec![Image::new(1u64, "top/a.jpg", 100, 50)],
            annotations: vec![
                Annotation::full_image(1u64, 1u64, 3u64, 100, 50),
                Annotation::full_image(2u64, 1u64, 4u64, 100, 50),
            ],
        }
    }

    #[test]
    fn test_top_level_key_order() {
        let json = to_coco_string(&sample_dataset()).expect("serialize failed");

        let positions: Vec<usize> = [
            "\"info\"",
            "\"licenses\"",
            "\"categories\"",
            "\"images\"",
            "\"annotations\"",
        ]
        .iter()
        .map(|key| json.find(key).expect("key present"))
        .collect();

        let mut sorted = positions.clone();
        sorted.sort_unstable();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn test_annotation_fields() {
        let json = to_coco_string(&sample_dataset()).expect("serialize failed");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let ann = &parsed["annotations"][0];
        assert_eq!(ann["image_id"], 1);
        assert_eq!(ann["category_id"], 3);
        assert_eq!(ann["iscrowd"], 0);
        assert_eq!(ann["bbox"], serde_json::json!([0, 0, 100, 50]));
        assert_eq!(ann["area"], 5000.0);
        assert_eq!(parsed["licenses"], serde_json::json!([]));
        assert_eq!(parsed["info"]["year"], 2025);
    }

    #[test]
    fn test_area_keeps_fractional_form() {
        let json = to_coco_string(&sample_dataset()).expect("serialize failed");
        assert!(json.contains("\"area\": 5000.0"));
    }

    #[test]
    fn test_written_document_reads_back() {
        let written = sample_dataset();
        let json = to_coco_string(&written).expect("serialize failed");
        let restored = from_coco_str(&json).expect("parse failed");
        assert_eq!(written, restored);
    }

    #[test]
    fn test_lists_written_in_id_order() {
        let mut dataset = sample_dataset();
        dataset.annotations.reverse();
        dataset.categories.reverse();

        let parsed: serde_json::Value =
            serde_json::from_str(&to_coco_string(&dataset).unwrap()).unwrap();
        assert_eq!(parsed["annotations"][0]["id"], 1);
        assert_eq!(parsed["categories"][0]["id"], 1);
        assert_eq!(parsed["categories"][5]["id"], 6);
    }

    #[test]
    fn test_write_creates_parent_dirs_and_overwrites() {
        let temp = tempfile::tempdir().expect("tempdir");
        let out = temp.path().join("nested/dir/coco.json");

        fs::create_dir_all(out.parent().unwrap()).unwrap();
        fs::write(&out, "stale content that is longer than nothing").unwrap();

        write_coco_json(&out, &sample_dataset()).expect("write coco");
        let restored = read_coco_json(&out).expect("read coco");
        assert_eq!(restored.images.len(), 1);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = read_coco_json(&temp.path().join("missing.json")).unwrap_err();
        assert!(matches!(err, TowerLabelError::Io(_)));
    }
}
