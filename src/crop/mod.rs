//! Screenshot Section Cropping
//!
//! Extracts a rectangular section from a screenshot so a single page region
//! can be compared in isolation. The crop preserves the source color mode.

use image::DynamicImage;
use tracing::debug;

use crate::error::{DiffError, Result};

/// Rectangle to keep, in pixel coordinates with exclusive bottom/right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    /// First row kept
    pub top: u32,
    /// One past the last row kept; `None` means the image height
    pub bottom: Option<u32>,
    /// First column kept
    pub left: u32,
    /// One past the last column kept; `None` means the image width
    pub right: Option<u32>,
}

impl CropRect {
    /// Resolve defaults against the image and validate the bounds
    fn resolve(&self, width: u32, height: u32) -> Result<(u32, u32, u32, u32)> {
        let right = self.right.unwrap_or(width);
        let bottom = self.bottom.unwrap_or(height);

        if right > width || bottom > height {
            return Err(DiffError::InvalidCropRegion(format!(
                "rectangle cols {}..{} rows {}..{} exceeds image {}x{}",
                self.left, right, self.top, bottom, width, height
            )));
        }
        if self.left >= right || self.top >= bottom {
            return Err(DiffError::InvalidCropRegion(format!(
                "empty rectangle cols {}..{} rows {}..{}",
                self.left, right, self.top, bottom
            )));
        }

        Ok((self.left, self.top, right, bottom))
    }
}

/// Crop `rect` out of `image`
pub fn crop_section(image: &DynamicImage, rect: &CropRect) -> Result<DynamicImage> {
    let (left, top, right, bottom) = rect.resolve(image.width(), image.height())?;
    let section = image.crop_imm(left, top, right - left, bottom - top);
    debug!(
        "Cropped cols {}..{} rows {}..{} -> {}x{}",
        left,
        right,
        top,
        bottom,
        section.width(),
        section.height()
    );
    Ok(section)
}
