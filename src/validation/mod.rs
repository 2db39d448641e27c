//! Invariant checks for built (or re-read) datasets.
//!
//! Checks, in order:
//! - id uniqueness and density (images and annotations numbered 1..=n)
//! - references from annotations to images and categories
//! - full-image geometry: `bbox == [0, 0, w, h]`, `area == w * h`, `iscrowd == 0`
//! - per-image label count, when the layout is known

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};

use crate::build::LayoutMode;
use crate::ir::{full_area, CategoryId, Dataset, ImageId};

/// Options for validation behavior.
#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
    /// Layout the document was built with; enables the label-count check.
    pub layout: Option<LayoutMode>,
}

/// Validates a dataset and returns a report of all issues found.
pub fn validate_dataset(dataset: &Dataset, opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    let category_ids = validate_categories(dataset, &mut report);
    let image_dims = validate_images(dataset, &mut report);
    validate_annotations(dataset, &image_dims, &category_ids, &mut report);

    if let Some(layout) = opts.layout {
        validate_label_counts(dataset, layout, &mut report);
    }

    report
}

fn validate_categories(dataset: &Dataset, report: &mut ValidationReport) -> HashSet<CategoryId> {
    let mut seen = HashSet::new();
    for category in &dataset.categories {
        if !seen.insert(category.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateCategoryId,
                format!("Duplicate category ID {}", category.id),
                IssueContext::Category {
                    id: category.id.as_u64(),
                },
            ));
        }
    }
    seen
}

fn validate_images(dataset: &Dataset, report: &mut ValidationReport) -> HashMap<ImageId, (u32, u32)> {
    let mut dims: HashMap<ImageId, (u32, u32)> = HashMap::new();

    for (idx, image) in dataset.images.iter().enumerate() {
        let id = image.id.as_u64();

        if dims.insert(image.id, (image.width, image.height)).is_some() {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateImageId,
                format!("Duplicate image ID {} (at index {})", id, idx),
                IssueContext::Image { id },
            ));
        }

        if image.width == 0 || image.height == 0 {
            report.add(ValidationIssue::warning(
                IssueCode::ZeroSizeImage,
                format!(
                    "Recorded with size {}x{} (image was unreadable)",
                    image.width, image.height
                ),
                IssueContext::Image { id },
            ));
        }

        if image.file_name.is_empty() {
            report.add(ValidationIssue::warning(
                IssueCode::EmptyFileName,
                "Empty filename",
                IssueContext::Image { id },
            ));
        }
    }

    let ids: Vec<u64> = dataset.images.iter().map(|img| img.id.as_u64()).collect();
    if !is_dense(&ids) {
        report.add(ValidationIssue::error(
            IssueCode::NonDenseImageIds,
            format!("Image IDs are not exactly 1..={}", ids.len()),
            IssueContext::Dataset,
        ));
    }

    dims
}

fn validate_annotations(
    dataset: &Dataset,
    image_dims: &HashMap<ImageId, (u32, u32)>,
    category_ids: &HashSet<CategoryId>,
    report: &mut ValidationReport,
) {
    let mut seen = HashSet::new();

    for annotation in &dataset.annotations {
        let id = annotation.id.as_u64();

        if !seen.insert(annotation.id) {
            report.add(ValidationIssue::error(
                IssueCode::DuplicateAnnotationId,
                format!("Duplicate annotation ID {}", id),
                IssueContext::Annotation { id },
            ));
        }

        if !category_ids.contains(&annotation.category_id) {
            report.add(ValidationIssue::error(
                IssueCode::MissingCategoryRef,
                format!(
                    "References non-existent category {}",
                    annotation.category_id
                ),
                IssueContext::Annotation { id },
            ));
        }

        if annotation.iscrowd != 0 {
            report.add(ValidationIssue::error(
                IssueCode::CrowdAnnotation,
                format!("iscrowd is {} (expected 0)", annotation.iscrowd),
                IssueContext::Annotation { id },
            ));
        }

        let [x, y, w, h] = annotation.bbox;
        let expected_area = full_area(w, h);
        if annotation.area != expected_area {
            report.add(ValidationIssue::error(
                IssueCode::AreaMismatch,
                format!(
                    "Area {} does not match bbox {}x{} ({})",
                    annotation.area, w, h, expected_area
                ),
                IssueContext::Annotation { id },
            ));
        }

        match image_dims.get(&annotation.image_id) {
            None => report.add(ValidationIssue::error(
                IssueCode::MissingImageRef,
                format!("References non-existent image {}", annotation.image_id),
                IssueContext::Annotation { id },
            )),
            Some(&(width, height)) => {
                if [x, y, w, h] != [0, 0, width, height] {
                    report.add(ValidationIssue::error(
                        IssueCode::BBoxNotFullImage,
                        format!(
                            "Bounding box [{}, {}, {}, {}] is not the full image [0, 0, {}, {}]",
                            x, y, w, h, width, height
                        ),
                        IssueContext::Annotation { id },
                    ));
                }
            }
        }
    }

    let ids: Vec<u64> = dataset
        .annotations
        .iter()
        .map(|ann| ann.id.as_u64())
        .collect();
    if !is_dense(&ids) {
        report.add(ValidationIssue::error(
            IssueCode::NonDenseAnnotationIds,
            format!("Annotation IDs are not exactly 1..={}", ids.len()),
            IssueContext::Dataset,
        ));
    }
}

fn validate_label_counts(dataset: &Dataset, layout: LayoutMode, report: &mut ValidationReport) {
    let expected = layout.labels_per_image();

    let mut counts: HashMap<ImageId, usize> = HashMap::new();
    for annotation in &dataset.annotations {
        *counts.entry(annotation.image_id).or_default() += 1;
    }

    for image in &dataset.images {
        let actual = counts.get(&image.id).copied().unwrap_or(0);
        if actual != expected {
            report.add(ValidationIssue::error(
                IssueCode::UnexpectedLabelCount,
                format!(
                    "Has {} annotation(s); the {} layout expects {}",
                    actual,
                    layout.as_str(),
                    expected
                ),
                IssueContext::Image {
                    id: image.id.as_u64(),
                },
            ));
        }
    }
}

/// True if `ids`, in any order, are exactly `1..=ids.len()`.
fn is_dense(ids: &[u64]) -> bool {
    let mut sorted = ids.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .zip(1u64..)
        .all(|(id, expected)| *id == expected)
}
