//! Tower-type and section labels, and how they are resolved from folders.
//!
//! A run carries at most two label axes:
//!
//! - **tower type**, applied to the whole site and either given explicitly or
//!   inferred from the root folder's own name via [`TOWER_SYNONYMS`];
//! - **section**, taken per file from the first path segment (relative to the
//!   root) that is exactly a section name.

use std::fmt;
use std::path::{Component, Path};
use std::str::FromStr;

use crate::error::TowerLabelError;
use crate::ir::{Category, CategoryId};

/// Structural category of a tower site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TowerType {
    Monopole,
    LatticeS,
    LatticeG,
}

impl TowerType {
    pub const ALL: [TowerType; 3] = [TowerType::Monopole, TowerType::LatticeS, TowerType::LatticeG];

    pub fn as_str(self) -> &'static str {
        match self {
            TowerType::Monopole => "monopole",
            TowerType::LatticeS => "lattice-s",
            TowerType::LatticeG => "lattice-g",
        }
    }
}

/// Sub-region of a site, taken from folder placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Top,
    Bottom,
    Unclassified,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::Top, Section::Bottom, Section::Unclassified];

    pub fn as_str(self) -> &'static str {
        match self {
            Section::Top => "top",
            Section::Bottom => "bottom",
            Section::Unclassified => "unclassified",
        }
    }

    fn from_segment(segment: &str) -> Option<Section> {
        let lowered = segment.to_lowercase();
        Section::ALL
            .into_iter()
            .find(|section| section.as_str() == lowered)
    }
}

impl fmt::Display for TowerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TowerType {
    type Err = TowerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        TowerType::ALL
            .into_iter()
            .find(|tower| tower.as_str() == wanted)
            .ok_or_else(|| invalid_label("tower", s, TowerType::ALL.map(TowerType::as_str)))
    }
}

impl FromStr for Section {
    type Err = TowerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Section::from_segment(s.trim())
            .ok_or_else(|| invalid_label("section", s, Section::ALL.map(Section::as_str)))
    }
}

fn invalid_label(kind: &'static str, value: &str, expected: [&str; 3]) -> TowerLabelError {
    TowerLabelError::InvalidLabel {
        kind,
        value: value.to_string(),
        expected: expected.join(", "),
    }
}

/// Folder-name fragments and the tower type they imply, tried in order.
///
/// Order is significant: the first fragment contained in the folder name
/// wins, and short fragments such as `guy` match far more names than the
/// longer spellings listed before them.
pub const TOWER_SYNONYMS: &[(&str, TowerType)] = &[
    ("monopole", TowerType::Monopole),
    ("mono", TowerType::Monopole),
    ("self-support", TowerType::LatticeS),
    ("selfsupport", TowerType::LatticeS),
    ("lattice-s", TowerType::LatticeS),
    ("lattices", TowerType::LatticeS),
    ("guyed", TowerType::LatticeG),
    ("guyedtower", TowerType::LatticeG),
    ("lattice-g", TowerType::LatticeG),
    ("latticeg", TowerType::LatticeG),
    ("guy", TowerType::LatticeG),
];

/// Infers a tower type from a folder name, case-insensitively.
///
/// ```
/// use towerlabel::labels::{infer_tower_type, TowerType};
///
/// assert_eq!(infer_tower_type("guyedtower1"), Some(TowerType::LatticeG));
/// assert_eq!(infer_tower_type("Site_Mono_07"), Some(TowerType::Monopole));
/// assert_eq!(infer_tower_type("site42"), None);
/// ```
pub fn infer_tower_type(folder_name: &str) -> Option<TowerType> {
    let name = folder_name.to_lowercase();
    TOWER_SYNONYMS
        .iter()
        .find(|(fragment, _)| name.contains(fragment))
        .map(|(_, tower)| *tower)
}

/// Picks the run's tower type: the explicit label if given, otherwise the one
/// inferred from the root folder's name.
pub fn resolve_tower_type(
    explicit: Option<TowerType>,
    root_name: &str,
) -> Result<TowerType, TowerLabelError> {
    if let Some(tower) = explicit {
        return Ok(tower);
    }

    infer_tower_type(root_name).ok_or_else(|| TowerLabelError::UnresolvedTowerType {
        folder: root_name.to_string(),
    })
}

/// Returns the section named by the first matching segment of `relative`.
///
/// `relative` is a file path relative to the scan root; the file name itself
/// is a segment too. `None` means the file lies outside every section
/// folder.
pub fn section_from_relative_path(relative: &Path) -> Option<Section> {
    relative.components().find_map(|component| match component {
        Component::Normal(segment) => segment.to_str().and_then(Section::from_segment),
        _ => None,
    })
}

/// The fixed category id assignments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CategoryScheme {
    /// Tower types 1-3 and sections 4-6.
    #[default]
    Full,
    /// Tower types only, 0-based. Has no section categories.
    TowerOnly,
}

impl CategoryScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryScheme::Full => "full",
            CategoryScheme::TowerOnly => "tower-only",
        }
    }

    pub fn tower_category(self, tower: TowerType) -> CategoryId {
        let index = match tower {
            TowerType::Monopole => 0,
            TowerType::LatticeS => 1,
            TowerType::LatticeG => 2,
        };
        match self {
            CategoryScheme::Full => CategoryId(index + 1),
            CategoryScheme::TowerOnly => CategoryId(index),
        }
    }

    pub fn section_category(self, section: Section) -> Option<CategoryId> {
        match self {
            CategoryScheme::Full => Some(CategoryId(match section {
                Section::Top => 4,
                Section::Bottom => 5,
                Section::Unclassified => 6,
            })),
            CategoryScheme::TowerOnly => None,
        }
    }

    /// The category list written to the document, in id order.
    pub fn categories(self) -> Vec<Category> {
        let towers = TowerType::ALL.into_iter().map(|tower| {
            Category::with_supercategory(self.tower_category(tower), tower.as_str(), "tower")
        });
        let sections = Section::ALL.into_iter().filter_map(|section| {
            self.section_category(section)
                .map(|id| Category::with_supercategory(id, section.as_str(), "section"))
        });

        towers.chain(sections).collect()
    }
}

impl FromStr for CategoryScheme {
    type Err = TowerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full" => Ok(CategoryScheme::Full),
            "tower-only" => Ok(CategoryScheme::TowerOnly),
            other => Err(TowerLabelError::InvalidOptions {
                message: format!("unknown category scheme '{other}' (expected full or tower-only)"),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_infer_from_common_folder_names() {
        assert_eq!(infer_tower_type("guyedtower1"), Some(TowerType::LatticeG));
        assert_eq!(infer_tower_type("MONOPOLE_site"), Some(TowerType::Monopole));
        assert_eq!(infer_tower_type("selfsupport-17"), Some(TowerType::LatticeS));
        assert_eq!(infer_tower_type("Self-Support A"), Some(TowerType::LatticeS));
        assert_eq!(infer_tower_type("lattice-g north"), Some(TowerType::LatticeG));
        assert_eq!(infer_tower_type("latticeS_2"), Some(TowerType::LatticeS));
    }

    #[test]
    fn test_infer_first_synonym_wins() {
        // Contains both "mono" and "guy"; "mono" comes first in the table.
        assert_eq!(infer_tower_type("guy_mono"), Some(TowerType::Monopole));
        // "guy" alone is enough.
        assert_eq!(infer_tower_type("the-guy-wire-site"), Some(TowerType::LatticeG));
    }

    #[test]
    fn test_infer_no_match() {
        assert_eq!(infer_tower_type("site42"), None);
        assert_eq!(infer_tower_type(""), None);
    }

    #[test]
    fn test_resolve_prefers_explicit() {
        let tower = resolve_tower_type(Some(TowerType::Monopole), "guyedtower1").unwrap();
        assert_eq!(tower, TowerType::Monopole);
    }

    #[test]
    fn test_resolve_unmatched_is_error() {
        let err = resolve_tower_type(None, "site42").unwrap_err();
        assert!(matches!(
            err,
            TowerLabelError::UnresolvedTowerType { ref folder } if folder == "site42"
        ));
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("lattice-s".parse::<TowerType>().unwrap(), TowerType::LatticeS);
        assert_eq!(" Monopole ".parse::<TowerType>().unwrap(), TowerType::Monopole);
        assert_eq!("BOTTOM".parse::<Section>().unwrap(), Section::Bottom);
    }

    #[test]
    fn test_parse_rejects_unknown_labels() {
        assert!(matches!(
            "guyed".parse::<TowerType>(),
            Err(TowerLabelError::InvalidLabel { kind: "tower", .. })
        ));
        assert!(matches!(
            "unclassifed".parse::<Section>(),
            Err(TowerLabelError::InvalidLabel { kind: "section", .. })
        ));
    }

    #[test]
    fn test_section_from_path_first_segment_wins() {
        let rel = PathBuf::from("top").join("bottom").join("a.jpg");
        assert_eq!(section_from_relative_path(&rel), Some(Section::Top));

        let rel = PathBuf::from("day1").join("Bottom").join("b.png");
        assert_eq!(section_from_relative_path(&rel), Some(Section::Bottom));
    }

    #[test]
    fn test_section_requires_exact_segment() {
        let rel = PathBuf::from("topside").join("a.jpg");
        assert_eq!(section_from_relative_path(&rel), None);

        let rel = PathBuf::from("misc").join("c.png");
        assert_eq!(section_from_relative_path(&rel), None);
    }

    #[test]
    fn test_full_scheme_ids() {
        let ids: Vec<(u64, String)> = CategoryScheme::Full
            .categories()
            .into_iter()
            .map(|c| (c.id.as_u64(), c.name))
            .collect();
        assert_eq!(
            ids,
            vec![
                (1, "monopole".to_string()),
                (2, "lattice-s".to_string()),
                (3, "lattice-g".to_string()),
                (4, "top".to_string()),
                (5, "bottom".to_string()),
                (6, "unclassified".to_string()),
            ]
        );
    }

    #[test]
    fn test_tower_only_scheme_is_zero_based() {
        let cats = CategoryScheme::TowerOnly.categories();
        assert_eq!(cats.len(), 3);
        assert_eq!(cats[0].id, CategoryId(0));
        assert_eq!(cats[2].name, "lattice-g");
        assert_eq!(CategoryScheme::TowerOnly.section_category(Section::Top), None);
    }
}
