//! Raster Image Loading and Normalization
//!
//! Decodes screenshots from disk, converts them to the 3-channel RGB
//! representation the analyzer compares, and resamples size-mismatched
//! inputs. Alpha and palette information never survives normalization.

use std::path::Path;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageReader, RgbImage};
use tracing::debug;

use crate::error::{DiffError, Result};

/// Decode an image file without changing its color mode
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)?.with_guessed_format()?;
    let decoded = reader
        .decode()
        .map_err(|e| DiffError::Decode(e.to_string()))?;
    debug!(
        "Loaded {} ({}x{})",
        path.display(),
        decoded.width(),
        decoded.height()
    );
    Ok(decoded)
}

/// Decode an image file and normalize it to 8-bit RGB
pub fn load_rgb(path: &Path) -> Result<RgbImage> {
    Ok(load_image(path)?.to_rgb8())
}

/// Resample an image to exactly `width` x `height`
pub fn resample(image: &RgbImage, width: u32, height: u32, filter: FilterType) -> RgbImage {
    imageops::resize(image, width, height, filter)
}

/// Save an RGB image, inferring the format from the file extension
pub fn save_rgb(image: &RgbImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|e| DiffError::Encode(e.to_string()))
}

/// Save a decoded image in its original color mode
pub fn save_image(image: &DynamicImage, path: &Path) -> Result<()> {
    image
        .save(path)
        .map_err(|e| DiffError::Encode(e.to_string()))
}

/// Map a configured filter name to the image crate's filter type
pub fn filter_from_name(name: &str) -> Option<FilterType> {
    match name {
        "nearest" => Some(FilterType::Nearest),
        "triangle" => Some(FilterType::Triangle),
        "catmullrom" => Some(FilterType::CatmullRom),
        "gaussian" => Some(FilterType::Gaussian),
        "lanczos3" => Some(FilterType::Lanczos3),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, Rgba, RgbaImage};
    use tempfile::tempdir;

    #[test]
    fn test_load_rgb_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("solid.png");
        let img = RgbImage::from_pixel(8, 6, Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let loaded = load_rgb(&path).unwrap();
        assert_eq!(loaded.dimensions(), (8, 6));
        assert_eq!(loaded.get_pixel(3, 3), &Rgb([10, 20, 30]));
    }

    #[test]
    fn test_load_rgb_discards_alpha() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rgba.png");
        let img = RgbaImage::from_pixel(4, 4, Rgba([50, 60, 70, 255]));
        img.save(&path).unwrap();

        let loaded = load_rgb(&path).unwrap();
        assert_eq!(loaded.get_pixel(0, 0), &Rgb([50, 60, 70]));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_rgb(&dir.path().join("missing.png")).unwrap_err();
        assert!(matches!(err, DiffError::Io(_)));
    }

    #[test]
    fn test_load_garbage_is_decode_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("garbage.png");
        std::fs::write(&path, b"definitely not a raster image").unwrap();

        let err = load_rgb(&path).unwrap_err();
        assert!(matches!(err, DiffError::Decode(_)));
    }

    #[test]
    fn test_resample_dimensions() {
        let img = RgbImage::from_pixel(8, 8, Rgb([100, 100, 100]));
        let resized = resample(&img, 4, 4, FilterType::Lanczos3);
        assert_eq!(resized.dimensions(), (4, 4));
    }

    #[test]
    fn test_filter_from_name() {
        assert!(filter_from_name("lanczos3").is_some());
        assert!(filter_from_name("nearest").is_some());
        assert!(filter_from_name("bicubic").is_none());
        assert!(filter_from_name("").is_none());
    }

    #[test]
    fn test_save_rgb_unwritable_path_is_encode_error() {
        let img = RgbImage::from_pixel(2, 2, Rgb([0, 0, 0]));
        let err = save_rgb(&img, Path::new("/nonexistent-dir/out.png")).unwrap_err();
        assert!(matches!(err, DiffError::Encode(_)));
    }
}
