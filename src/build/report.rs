//! Build report: what went into the dataset and what was left out.
//!
//! Printed after a successful build, as text for people or JSON for scripts
//! that hand the output file to an uploader.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::Serialize;

use super::BuildOptions;
use crate::labels::{Section, TowerType};

/// Summary of one build run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BuildReport {
    /// Canonical root directory that was scanned.
    pub root: String,
    /// Name of the root folder (the tower type is inferred from it).
    pub root_name: String,
    pub layout: String,
    pub tower: String,
    /// Section applied to every file, when one was given explicitly.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub format: String,
    /// Output path, once the document has been written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    pub counts: BuildCounts,
    /// Included images per section; empty for the single-label layout.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub sections: BTreeMap<String, usize>,
    /// Files outside every section folder.
    pub excluded_files: Vec<String>,
    /// Unreadable files left out of the dataset.
    pub skipped_files: Vec<String>,
    /// Unreadable files recorded with zero size.
    pub zero_size_files: Vec<String>,
}

/// File and record counts for a build.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct BuildCounts {
    pub walked: usize,
    pub images: usize,
    pub annotations: usize,
    pub excluded: usize,
    pub skipped: usize,
    pub zero_size: usize,
}

impl BuildReport {
    pub(crate) fn new(
        root: &Path,
        root_name: &str,
        options: &BuildOptions,
        tower: TowerType,
    ) -> Self {
        let sections = match options.layout {
            super::LayoutMode::MultiSection => Section::ALL
                .into_iter()
                .map(|section| (section.as_str().to_string(), 0))
                .collect(),
            super::LayoutMode::SingleLabel => BTreeMap::new(),
        };

        Self {
            root: root.display().to_string(),
            root_name: root_name.to_string(),
            layout: options.layout.as_str().to_string(),
            tower: tower.as_str().to_string(),
            section: options.section.map(|s| s.as_str().to_string()),
            format: options.format.as_str().to_string(),
            sections,
            ..Default::default()
        }
    }

    pub(crate) fn count_section(&mut self, section: Section) {
        *self
            .sections
            .entry(section.as_str().to_string())
            .or_default() += 1;
    }

    pub(crate) fn finalize_counts(&mut self) {
        self.counts.excluded = self.excluded_files.len();
        self.counts.skipped = self.skipped_files.len();
        self.counts.zero_size = self.zero_size_files.len();
    }

    /// Included image count for `section`.
    pub fn section_count(&self, section: Section) -> usize {
        self.sections.get(section.as_str()).copied().unwrap_or(0)
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            Some(output) => writeln!(
                f,
                "Wrote {} with {} images from {}",
                output, self.counts.images, self.root
            )?,
            None => writeln!(
                f,
                "Built {} images from {}",
                self.counts.images, self.root
            )?,
        }

        writeln!(f, "  Tower label: {}", self.tower)?;

        if !self.sections.is_empty() {
            let parts: Vec<String> = Section::ALL
                .iter()
                .map(|section| format!("{}: {}", section, self.section_count(*section)))
                .collect();
            writeln!(f, "  Sections -> {}", parts.join(", "))?;
        }

        writeln!(
            f,
            "  {} annotations ({} files walked, {} excluded, {} unreadable skipped, {} recorded with zero size)",
            self.counts.annotations,
            self.counts.walked,
            self.counts.excluded,
            self.counts.skipped,
            self.counts.zero_size
        )?;

        for file in &self.skipped_files {
            writeln!(f, "  - skipped unreadable: {}", file)?;
        }

        Ok(())
    }
}
