//! Image size inspection.
//!
//! Only the image header is read, via `imagesize`; the file handle is closed
//! before [`read_image_dimensions`] returns, whether decoding succeeded or not.

use std::path::Path;
use std::str::FromStr;

use log::warn;

use crate::error::TowerLabelError;

/// What to do with an image whose size cannot be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UnreadableImagePolicy {
    /// Leave the file out of the dataset and log a warning.
    #[default]
    Skip,
    /// Keep the file with `width = height = 0`.
    RecordZeroSize,
}

impl UnreadableImagePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            UnreadableImagePolicy::Skip => "skip",
            UnreadableImagePolicy::RecordZeroSize => "record-zero-size",
        }
    }
}

impl FromStr for UnreadableImagePolicy {
    type Err = TowerLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skip" => Ok(UnreadableImagePolicy::Skip),
            "record-zero-size" => Ok(UnreadableImagePolicy::RecordZeroSize),
            other => Err(TowerLabelError::InvalidOptions {
                message: format!(
                    "unknown unreadable-image policy '{other}' (expected skip or record-zero-size)"
                ),
            }),
        }
    }
}

/// Outcome of inspecting one file under a policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Inspection {
    Measured { width: u32, height: u32 },
    ZeroSize,
    Skipped,
}

impl Inspection {
    /// Dimensions to record, or `None` if the file is left out.
    pub fn dimensions(self) -> Option<(u32, u32)> {
        match self {
            Inspection::Measured { width, height } => Some((width, height)),
            Inspection::ZeroSize => Some((0, 0)),
            Inspection::Skipped => None,
        }
    }
}

/// Reads pixel width and height from an image header.
pub fn read_image_dimensions(path: &Path) -> Result<(u32, u32), TowerLabelError> {
    let size = imagesize::size(path).map_err(|source| TowerLabelError::ImageDimensionRead {
        path: path.to_path_buf(),
        source,
    })?;

    checked_dimensions(path, size.width, size.height)
}

fn checked_dimensions(
    path: &Path,
    width: usize,
    height: usize,
) -> Result<(u32, u32), TowerLabelError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(width), Ok(height)) => Ok((width, height)),
        _ => Err(TowerLabelError::ImageTooLarge {
            path: path.to_path_buf(),
            width,
            height,
        }),
    }
}

/// Measures `path`, applying `policy` when the header cannot be decoded.
///
/// Decode failures never propagate: they become [`Inspection::Skipped`] or
/// [`Inspection::ZeroSize`]. Only the policy decides which.
pub fn inspect_image(path: &Path, policy: UnreadableImagePolicy) -> Inspection {
    match read_image_dimensions(path) {
        Ok((width, height)) => Inspection::Measured { width, height },
        Err(err) => match policy {
            UnreadableImagePolicy::Skip => {
                warn!("skipping unreadable image: {err}");
                Inspection::Skipped
            }
            UnreadableImagePolicy::RecordZeroSize => {
                warn!("recording unreadable image with zero size: {err}");
                Inspection::ZeroSize
            }
        },
    }
}
