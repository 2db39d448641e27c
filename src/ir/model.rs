//! In-memory dataset model.
//!
//! A [`Dataset`] is built fresh per run, serialized once and dropped. The
//! writers in [`io_coco_json`](super::io_coco_json) and
//! [`io_flat_json`](super::io_flat_json) render it; nothing mutates it after
//! the builder hands it over.

use super::ids::{AnnotationId, CategoryId, ImageId};

/// A complete classification-as-detection dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    /// Free-text metadata written to the COCO `info` block.
    pub info: DatasetInfo,

    /// Category definitions of the active scheme, in id order.
    pub categories: Vec<Category>,

    /// Included images, in walk order.
    pub images: Vec<Image>,

    /// Full-image annotations, in allocation order.
    pub annotations: Vec<Annotation>,
}

impl Dataset {
    /// Returns the annotations attached to `image_id`, in id order.
    pub fn annotations_for(&self, image_id: ImageId) -> impl Iterator<Item = &Annotation> {
        self.annotations
            .iter()
            .filter(move |ann| ann.image_id == image_id)
    }

    /// Looks up a category by id.
    pub fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.iter().find(|cat| cat.id == id)
    }
}

/// Metadata about the dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatasetInfo {
    pub description: String,
    pub version: String,
    pub year: u32,
}

impl Default for DatasetInfo {
    fn default() -> Self {
        Self {
            description: String::new(),
            version: "1.0".to_string(),
            year: crate::build::DEFAULT_YEAR,
        }
    }
}

/// An image in the dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    pub id: ImageId,

    /// Path relative to the scanned root, `/`-separated.
    pub file_name: String,

    /// Width in pixels; 0 when the image was recorded without being readable.
    pub width: u32,

    /// Height in pixels; 0 when the image was recorded without being readable.
    pub height: u32,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }
}

/// A category (class label).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,

    /// `tower` or `section` for the built-in schemes.
    pub supercategory: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
        }
    }

    pub fn with_supercategory(
        id: impl Into<CategoryId>,
        name: impl Into<String>,
        supercategory: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: Some(supercategory.into()),
        }
    }
}

/// An annotation covering its whole image.
///
/// `bbox` is in COCO `[x, y, width, height]` order. Annotations produced by
/// the builder always have `x == y == 0` and `area == width * height`; the
/// fields stay public so that documents read back from disk can carry
/// whatever they contain and be checked by the validator.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,
    pub image_id: ImageId,
    pub category_id: CategoryId,
    pub bbox: [u32; 4],
    pub area: f64,
    pub iscrowd: u8,
}

impl Annotation {
    /// Creates an annotation whose box is the full `width` x `height` image.
    pub fn full_image(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            bbox: [0, 0, width, height],
            area: full_area(width, height),
            iscrowd: 0,
        }
    }

    pub fn width(&self) -> u32 {
        self.bbox[2]
    }

    pub fn height(&self) -> u32 {
        self.bbox[3]
    }
}

/// `width * height` computed without overflow.
pub fn full_area(width: u32, height: u32) -> f64 {
    (u64::from(width) * u64::from(height)) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_image_annotation_geometry() {
        let ann = Annotation::full_image(1u64, 1u64, 3u64, 100, 50);
        assert_eq!(ann.bbox, [0, 0, 100, 50]);
        assert_eq!(ann.area, 5000.0);
        assert_eq!(ann.iscrowd, 0);
    }

    #[test]
    fn test_full_area_does_not_overflow() {
        let area = full_area(u32::MAX, 2);
        assert_eq!(area, (u32::MAX as f64) * 2.0);
    }

    #[test]
    fn test_annotations_for_filters_by_image() {
        let dataset = Dataset {
            images: vec![Image::new(1u64, "a.jpg", 10, 10), Image::new(2u64, "b.jpg", 5, 5)],
            annotations: vec![
                Annotation::full_image(1u64, 1u64, 1u64, 10, 10),
                Annotation::full_image(2u64, 1u64, 4u64, 10, 10),
                Annotation::full_image(3u64, 2u64, 1u64, 5, 5),
            ],
            ..Default::default()
        };

        let ids: Vec<u64> = dataset
            .annotations_for(ImageId(1))
            .map(|ann| ann.id.as_u64())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }
}
