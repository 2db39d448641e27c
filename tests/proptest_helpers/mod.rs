#![allow(dead_code)]

use std::path::Path;

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(32);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 256;
    config
}

/// Folder an image is placed in, relative to the site root.
pub const FOLDERS: &[&str] = &["top", "bottom", "unclassified", "day1/TOP", "day2/bottom", "misc", ""];

/// True if images placed in `folder` fall under a section folder.
pub fn folder_has_section(folder: &str) -> bool {
    folder
        .split('/')
        .any(|segment| matches!(segment.to_ascii_lowercase().as_str(), "top" | "bottom" | "unclassified"))
}

/// One image file to create: its folder and size.
#[derive(Clone, Debug)]
pub struct PlannedImage {
    pub folder: &'static str,
    pub width: u32,
    pub height: u32,
}

impl PlannedImage {
    pub fn relative(&self, index: usize) -> String {
        let name = format!("img_{index:03}.jpg");
        if self.folder.is_empty() {
            name
        } else {
            format!("{}/{}", self.folder, name)
        }
    }
}

/// Between `min` and `max` images spread over [`FOLDERS`].
pub fn arb_site(min: usize, max: usize) -> BoxedStrategy<Vec<PlannedImage>> {
    proptest::collection::vec(
        (0..FOLDERS.len(), 1u32..=64, 1u32..=64).prop_map(|(folder, width, height)| PlannedImage {
            folder: FOLDERS[folder],
            width,
            height,
        }),
        min..=max,
    )
    .boxed()
}

/// Writes every planned image under `root` as a BMP with the planned size.
pub fn materialize(root: &Path, plan: &[PlannedImage]) {
    for (index, image) in plan.iter().enumerate() {
        crate::common::write_image(&root.join(image.relative(index)), image.width, image.height);
    }
}

/// Filler for folder names that contains no tower synonym.
pub fn arb_filler() -> BoxedStrategy<String> {
    "[0-9_ .-]{0,8}".prop_map(|s| s.to_string()).boxed()
}
