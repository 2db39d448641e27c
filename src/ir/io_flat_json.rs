//! Flat classification JSON writer.
//!
//! The alternate output shape: a JSON array of `{"image": ..., "class": ...}`
//! pairs with no identifiers and no geometry. It is rendered from the same
//! [`Dataset`] as the COCO document, one pair per annotation in annotation id
//! order, so a multi-section image contributes one pair per label axis.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::model::Dataset;
use super::{CategoryId, ImageId};
use crate::error::TowerLabelError;

/// One `{image, class}` pair.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlatEntry {
    pub image: String,
    pub class: String,
}

/// Writes a dataset as a flat classification JSON array.
pub fn write_flat_json(path: &Path, dataset: &Dataset) -> Result<(), TowerLabelError> {
    let entries = flat_entries(dataset)?;
    let json = serde_json::to_string_pretty(&entries).map_err(|source| {
        TowerLabelError::FlatJsonWrite {
            path: path.to_path_buf(),
            source,
        }
    })?;

    super::write_output_file(path, json.as_bytes())
}

/// Renders a dataset as a flat classification JSON string.
pub fn to_flat_string(dataset: &Dataset) -> Result<String, TowerLabelError> {
    let entries = flat_entries(dataset)?;
    serde_json::to_string_pretty(&entries).map_err(|source| TowerLabelError::FlatJsonWrite {
        path: PathBuf::from("<in-memory>"),
        source,
    })
}

/// Resolves every annotation to its image file name and category name.
///
/// Fails rather than inventing a name when an annotation points at a missing
/// image or category.
pub fn flat_entries(dataset: &Dataset) -> Result<Vec<FlatEntry>, TowerLabelError> {
    let image_names: BTreeMap<ImageId, &str> = dataset
        .images
        .iter()
        .map(|img| (img.id, img.file_name.as_str()))
        .collect();
    let category_names: BTreeMap<CategoryId, &str> = dataset
        .categories
        .iter()
        .map(|cat| (cat.id, cat.name.as_str()))
        .collect();

    let mut annotations: Vec<_> = dataset.annotations.iter().collect();
    annotations.sort_by_key(|ann| ann.id);

    annotations
        .into_iter()
        .map(|ann| {
            let image = image_names.get(&ann.image_id).ok_or_else(|| {
                TowerLabelError::DanglingReference {
                    message: format!(
                        "annotation {} references missing image {}",
                        ann.id, ann.image_id
                    ),
                }
            })?;
            let class = category_names.get(&ann.category_id).ok_or_else(|| {
                TowerLabelError::DanglingReference {
                    message: format!(
                        "annotation {} references missing category {}",
                        ann.id, ann.category_id
                    ),
                }
            })?;

            Ok(FlatEntry {
                image: (*image).to_string(),
                class: (*class).to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Annotation, Image};
    use crate::labels::CategoryScheme;

    fn two_axis_dataset() -> Dataset {
        Dataset {
            categories: CategoryScheme::Full.categories(),
            images: vec![
                Image::new(1u64, "bottom/b.png", 200, 80),
                Image::new(2u64, "top/a.jpg", 100, 50),
            ],
            annotations: vec![
                Annotation::full_image(1u64, 1u64, 3u64, 200, 80),
                Annotation::full_image(2u64, 1u64, 5u64, 200, 80),
                Annotation::full_image(3u64, 2u64, 3u64, 100, 50),
                Annotation::full_image(4u64, 2u64, 4u64, 100, 50),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_one_pair_per_annotation() {
        let entries = flat_entries(&two_axis_dataset()).expect("entries");
        let pairs: Vec<(&str, &str)> = entries
            .iter()
            .map(|e| (e.image.as_str(), e.class.as_str()))
            .collect();

        assert_eq!(
            pairs,
            vec![
                ("bottom/b.png", "lattice-g"),
                ("bottom/b.png", "bottom"),
                ("top/a.jpg", "lattice-g"),
                ("top/a.jpg", "top"),
            ]
        );
    }

    #[test]
    fn test_flat_json_shape() {
        let json = to_flat_string(&two_axis_dataset()).expect("serialize");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();

        let first = &parsed[0];
        assert_eq!(first["image"], "bottom/b.png");
        assert_eq!(first["class"], "lattice-g");
        assert!(first.get("id").is_none());
        assert!(first.get("bbox").is_none());
    }

    #[test]
    fn test_dangling_category_is_an_error() {
        let mut dataset = two_axis_dataset();
        dataset.annotations[0].category_id = CategoryId(99);

        let err = flat_entries(&dataset).unwrap_err();
        assert!(matches!(err, TowerLabelError::DanglingReference { .. }));
    }
}
