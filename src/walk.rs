//! Recursive image discovery under a dataset root.

use std::path::{Component, Path, PathBuf};

use log::warn;
use walkdir::WalkDir;

use crate::error::TowerLabelError;

/// Image file extensions picked up by the walker, matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// An image file found under the root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WalkedImage {
    /// Full path on disk.
    pub path: PathBuf,
    /// Path relative to the root, `/`-separated.
    pub relative: String,
}

impl WalkedImage {
    /// The relative path as a [`Path`], for segment inspection.
    pub fn relative_path(&self) -> &Path {
        Path::new(&self.relative)
    }
}

/// Cleans up a root path as typed or pasted by a user.
///
/// Surrounding whitespace is trimmed, then one pair of matching quotes, so
/// `  "C:\data\guyedtower1"  ` becomes `C:\data\guyedtower1`.
pub fn normalize_root(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let unquoted = ['"', '\'']
        .iter()
        .find_map(|quote| {
            trimmed
                .strip_prefix(*quote)
                .and_then(|rest| rest.strip_suffix(*quote))
        })
        .unwrap_or(trimmed);
    PathBuf::from(unquoted.trim())
}

/// Lists every image file under `root`, sorted by path.
///
/// Paths are compared component by component, so the order (and therefore
/// every id the builder assigns) only depends on the folder contents.
///
/// Symbolic links are not followed. An entry below the root that cannot be
/// read (a dangling link, a directory without permission) is logged and
/// skipped.
///
/// # Errors
/// [`TowerLabelError::RootNotFound`] if `root` is not a directory,
/// [`TowerLabelError::NoImagesFound`] if nothing qualifies, and
/// [`TowerLabelError::WalkFailed`] if the root itself cannot be read.
pub fn collect_images(root: &Path) -> Result<Vec<WalkedImage>, TowerLabelError> {
    if !root.is_dir() {
        return Err(TowerLabelError::RootNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) if source.depth() == 0 => {
                return Err(TowerLabelError::WalkFailed {
                    path: root.to_path_buf(),
                    source,
                });
            }
            Err(err) => {
                warn!("skipping unreadable entry under {}: {err}", root.display());
                continue;
            }
        };

        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            files.push(entry.into_path());
        }
    }

    if files.is_empty() {
        return Err(TowerLabelError::NoImagesFound {
            path: root.to_path_buf(),
            hint: String::new(),
        });
    }

    files.sort();

    Ok(files
        .into_iter()
        .map(|path| {
            let relative = relative_file_name(root, &path);
            WalkedImage { path, relative }
        })
        .collect())
}

/// Returns true if `path` has one of [`IMAGE_EXTENSIONS`].
pub fn has_image_extension(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
        return false;
    };

    IMAGE_EXTENSIONS
        .iter()
        .any(|allowed| ext.eq_ignore_ascii_case(allowed))
}

/// `path` relative to `root`, joined with `/` regardless of platform.
fn relative_file_name(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, b"x").unwrap();
    }

    #[test]
    fn test_normalize_root_strips_quotes_and_space() {
        assert_eq!(
            normalize_root("  \"C:/data/guyedtower1\" \n"),
            PathBuf::from("C:/data/guyedtower1")
        );
        assert_eq!(normalize_root("'site'"), PathBuf::from("site"));
        assert_eq!(normalize_root("plain/path"), PathBuf::from("plain/path"));
        // Unbalanced quotes are left alone.
        assert_eq!(normalize_root("\"half"), PathBuf::from("\"half"));
    }

    #[test]
    fn test_extension_filter_is_case_insensitive() {
        assert!(has_image_extension(Path::new("a.JPG")));
        assert!(has_image_extension(Path::new("b.TiFf")));
        assert!(has_image_extension(Path::new("c.webp")));
        assert!(!has_image_extension(Path::new("notes.txt")));
        assert!(!has_image_extension(Path::new("jpg")));
    }

    #[test]
    fn test_collect_sorted_and_relative() {
        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("top/b.jpg"));
        touch(&root.join("bottom/z.PNG"));
        touch(&root.join("top/a.jpeg"));
        touch(&root.join("top/readme.txt"));
        touch(&root.join("root.webp"));

        let files = collect_images(root).expect("collect");
        let relative: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(
            relative,
            vec!["bottom/z.PNG", "root.webp", "top/a.jpeg", "top/b.jpg"]
        );
        assert!(files.iter().all(|f| f.path.starts_with(root)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_are_not_followed() {
        use std::os::unix::fs::symlink;

        let temp = tempfile::tempdir().expect("tempdir");
        let root = temp.path();
        touch(&root.join("top/a.jpg"));
        touch(&root.join("bottom/b.png"));
        symlink(root.join("top/missing.jpg"), root.join("top/broken.jpg")).unwrap();
        symlink(root, root.join("top/loop")).unwrap();
        symlink(root.join("bottom"), root.join("top/alias")).unwrap();
        symlink(root.join("bottom/b.png"), root.join("top/linked.png")).unwrap();

        let files = collect_images(root).expect("collect");
        let relative: Vec<&str> = files.iter().map(|f| f.relative.as_str()).collect();
        assert_eq!(relative, vec!["bottom/b.png", "top/a.jpg"]);
    }

    #[test]
    fn test_missing_root_is_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = collect_images(&temp.path().join("nope")).unwrap_err();
        assert!(matches!(err, TowerLabelError::RootNotFound { .. }));
    }

    #[test]
    fn test_root_without_images_is_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        touch(&temp.path().join("notes.txt"));

        let err = collect_images(temp.path()).unwrap_err();
        assert!(matches!(err, TowerLabelError::NoImagesFound { .. }));
    }
}
