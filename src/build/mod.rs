//! Annotation builder: folder of images in, [`Dataset`] out.
//!
//! One forward pass over the walked files. For each file the builder
//! resolves its labels, measures it, then allocates one image id and one
//! annotation id per label. Files that end up excluded (no section folder)
//! or skipped (unreadable under [`UnreadableImagePolicy::Skip`]) never reach
//! the allocation step, so ids stay dense over the included files.

mod report;

pub use report::{BuildCounts, BuildReport};

use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use log::{debug, info};

use crate::error::TowerLabelError;
use crate::inspect::{inspect_image, Inspection, UnreadableImagePolicy};
use crate::ir::{
    write_dataset, Annotation, AnnotationId, Category, CategoryId, Dataset, DatasetInfo, Image,
    ImageId, OutputFormat,
};
use crate::labels::{
    resolve_tower_type, section_from_relative_path, CategoryScheme, Section, TowerType,
};
use crate::walk::{collect_images, normalize_root};

/// Year written to the `info` block unless overridden.
pub const DEFAULT_YEAR: u32 = 2025;

/// Default output location, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "data/coco_annotations.json";

/// How labels are laid out on disk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LayoutMode {
    /// Every image under the root gets the tower label only.
    SingleLabel,
    /// Images get the tower label plus the section from their folder;
    /// images outside `top/`, `bottom/` and `unclassified/` are left out.
    #[default]
    MultiSection,
}

impl LayoutMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LayoutMode::SingleLabel => "single-label",
            LayoutMode::MultiSection => "multi-section",
        }
    }

    /// Number of annotations every included image carries.
    pub fn labels_per_image(self) -> usize {
        match self {
            LayoutMode::SingleLabel => 1,
            LayoutMode::MultiSection => 2,
        }
    }
}

impl FromStr for LayoutMode {
    type Err = TowerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "single-label" => Ok(LayoutMode::SingleLabel),
            "multi-section" => Ok(LayoutMode::MultiSection),
            other => Err(TowerLabelError::InvalidOptions {
                message: format!(
                    "unknown layout '{other}' (expected single-label or multi-section)"
                ),
            }),
        }
    }
}

/// Fully resolved configuration for one run.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Dataset root as given by the caller; quotes and whitespace are trimmed.
    pub root: String,
    pub output: PathBuf,
    pub format: OutputFormat,
    pub layout: LayoutMode,
    /// Explicit tower type. When absent it is inferred from the root's name.
    pub tower: Option<TowerType>,
    /// Explicit section for every file (multi-section layout only). When
    /// absent it is taken from each file's path.
    pub section: Option<Section>,
    pub on_unreadable: UnreadableImagePolicy,
    pub categories: CategoryScheme,
    pub year: u32,
}

impl BuildOptions {
    /// Options with every setting at its default.
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            format: OutputFormat::default(),
            layout: LayoutMode::default(),
            tower: None,
            section: None,
            on_unreadable: UnreadableImagePolicy::default(),
            categories: CategoryScheme::default(),
            year: DEFAULT_YEAR,
        }
    }

    /// Rejects combinations that cannot produce a meaningful dataset.
    pub fn check(&self) -> Result<(), TowerLabelError> {
        if self.layout == LayoutMode::MultiSection && self.categories == CategoryScheme::TowerOnly
        {
            return Err(TowerLabelError::InvalidOptions {
                message: "the tower-only category scheme has no section categories; use it with the single-label layout".to_string(),
            });
        }
        if self.layout == LayoutMode::SingleLabel && self.section.is_some() {
            return Err(TowerLabelError::InvalidOptions {
                message: "a section label needs the multi-section layout".to_string(),
            });
        }
        Ok(())
    }
}

/// Accumulates image and annotation records with dense, 1-based ids.
#[derive(Debug)]
pub struct DatasetBuilder {
    categories: Vec<Category>,
    images: Vec<Image>,
    annotations: Vec<Annotation>,
    next_image_id: u64,
    next_annotation_id: u64,
}

impl DatasetBuilder {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            images: Vec::new(),
            annotations: Vec::new(),
            next_image_id: 1,
            next_annotation_id: 1,
        }
    }

    /// Records one image and a full-image annotation for each label, in
    /// the order given.
    pub fn push_image(
        &mut self,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
        labels: &[CategoryId],
    ) -> ImageId {
        let image_id = ImageId::new(self.next_image_id);
        self.next_image_id += 1;

        self.images
            .push(Image::new(image_id, file_name, width, height));

        for &category_id in labels {
            let annotation_id = AnnotationId::new(self.next_annotation_id);
            self.next_annotation_id += 1;
            self.annotations.push(Annotation::full_image(
                annotation_id,
                image_id,
                category_id,
                width,
                height,
            ));
        }

        image_id
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }

    pub fn finish(self, info: DatasetInfo) -> Dataset {
        Dataset {
            info,
            categories: self.categories,
            images: self.images,
            annotations: self.annotations,
        }
    }
}

/// Walks the root described by `options` and builds the dataset in memory.
///
/// # Errors
/// Configuration errors (bad option combination, missing root, unresolvable
/// tower type, no usable images) abort before anything is written.
/// Unreadable images are handled per [`BuildOptions::on_unreadable`] and
/// never abort the run.
pub fn build_dataset(options: &BuildOptions) -> Result<(Dataset, BuildReport), TowerLabelError> {
    options.check()?;

    let root = resolve_root(&options.root)?;
    let root_name = root
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    let tower = resolve_tower_type(options.tower, &root_name)?;
    let scheme = options.categories;
    let tower_category = scheme.tower_category(tower);

    let files = collect_images(&root)?;

    let mut report = BuildReport::new(&root, &root_name, options, tower);
    report.counts.walked = files.len();

    let mut builder = DatasetBuilder::new(scheme.categories());

    for file in &files {
        let section = match options.layout {
            LayoutMode::SingleLabel => None,
            LayoutMode::MultiSection => {
                match options
                    .section
                    .or_else(|| section_from_relative_path(file.relative_path()))
                {
                    Some(section) => Some(section),
                    None => {
                        debug!("excluding {} (not under a section folder)", file.relative);
                        report.excluded_files.push(file.relative.clone());
                        continue;
                    }
                }
            }
        };

        let inspection = inspect_image(&file.path, options.on_unreadable);
        let Some((width, height)) = inspection.dimensions() else {
            report.skipped_files.push(file.relative.clone());
            continue;
        };
        if inspection == Inspection::ZeroSize {
            report.zero_size_files.push(file.relative.clone());
        }

        let mut labels = vec![tower_category];
        if let Some(section) = section {
            labels.extend(scheme.section_category(section));
            report.count_section(section);
        }

        builder.push_image(file.relative.clone(), width, height, &labels);
    }

    if builder.image_count() == 0 {
        let hint = match options.layout {
            LayoutMode::MultiSection => {
                " under recognized section folders (top/bottom/unclassified)".to_string()
            }
            LayoutMode::SingleLabel => " that could be read".to_string(),
        };
        return Err(TowerLabelError::NoImagesFound { path: root, hint });
    }

    report.counts.images = builder.image_count();
    report.counts.annotations = builder.annotation_count();
    report.finalize_counts();

    let info = DatasetInfo {
        description: describe(options, &root_name, tower),
        version: "1.0".to_string(),
        year: options.year,
    };

    info!(
        "built {} images and {} annotations from {}",
        report.counts.images,
        report.counts.annotations,
        root.display()
    );

    Ok((builder.finish(info), report))
}

/// Builds the dataset and writes it to [`BuildOptions::output`].
///
/// Nothing is written unless the build succeeds.
pub fn build_and_write(options: &BuildOptions) -> Result<(Dataset, BuildReport), TowerLabelError> {
    let (dataset, mut report) = build_dataset(options)?;
    write_dataset(&options.output, &dataset, options.format)?;
    report.output = Some(options.output.display().to_string());
    Ok((dataset, report))
}

fn resolve_root(raw: &str) -> Result<PathBuf, TowerLabelError> {
    let root = normalize_root(raw);
    if !root.is_dir() {
        return Err(TowerLabelError::RootNotFound { path: root });
    }
    // Canonical form so that "." and trailing separators still have a name.
    fs::canonicalize(&root).map_err(TowerLabelError::Io)
}

fn describe(options: &BuildOptions, root_name: &str, tower: TowerType) -> String {
    match (options.layout, options.section) {
        (LayoutMode::SingleLabel, _) => format!("Folder '{root_name}' labeled {tower}"),
        (LayoutMode::MultiSection, Some(section)) => {
            format!("Site '{root_name}' labeled tower={tower}, section={section}")
        }
        (LayoutMode::MultiSection, None) => {
            format!("Site '{root_name}' labeled tower={tower}, section from subfolders")
        }
    }
}
