//! Result Reporting
//!
//! Renders the human-readable comparison summary printed to stdout and
//! writes the optional machine-readable JSON report.

use std::fmt::Write;
use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::analysis::{ComparisonResult, Hotspot};
use crate::error::{DiffError, Result};

/// On-disk wrapper around a [`ComparisonResult`]
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// RFC 3339 generation timestamp
    pub generated_at: String,
    /// First input path as given
    pub image1: String,
    /// Second input path as given
    pub image2: String,
    /// The comparison itself
    pub result: &'a ComparisonResult,
}

/// Write the comparison as pretty-printed JSON
pub fn write_json(
    result: &ComparisonResult,
    image1: &Path,
    image2: &Path,
    path: &Path,
) -> Result<()> {
    let report = JsonReport {
        generated_at: Utc::now().to_rfc3339(),
        image1: image1.display().to_string(),
        image2: image2.display().to_string(),
        result,
    };

    let json = serde_json::to_string_pretty(&report).map_err(|e| DiffError::Report(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Render the comparison summary for stdout
pub fn render_summary(result: &ComparisonResult, image1: &Path, image2: &Path) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Comparison results");
    let _ = writeln!(
        out,
        "  Image 1: {} ({}x{})",
        image1.display(),
        result.width,
        result.height
    );
    let _ = writeln!(
        out,
        "  Image 2: {} ({}x{})",
        image2.display(),
        result.second_dimensions.0,
        result.second_dimensions.1
    );
    if result.resampled {
        let _ = writeln!(
            out,
            "  Note: image 2 resampled to {}x{}",
            result.width, result.height
        );
    }
    let _ = writeln!(
        out,
        "  Different pixels: {} / {} ({:.2}%)",
        result.differing, result.total, result.percent
    );
    let _ = writeln!(out, "  Threshold: {}", result.threshold);

    if let Some(bbox) = &result.bounding_box {
        let _ = writeln!(out);
        let _ = writeln!(out, "Difference bounding box");
        let _ = writeln!(out, "  Top: {}px, Left: {}px", bbox.top, bbox.left);
        let _ = writeln!(out, "  Bottom: {}px, Right: {}px", bbox.bottom, bbox.right);
        let _ = writeln!(
            out,
            "  Width: {}px, Height: {}px",
            bbox.width(),
            bbox.height()
        );
    }

    if let Some(thirds) = &result.thirds {
        let _ = writeln!(out);
        let _ = writeln!(out, "Differences by region");
        let _ = writeln!(
            out,
            "  Top: {} / {} ({:.2}%)",
            thirds.top.differing, thirds.top.total, thirds.top.percent
        );
        let _ = writeln!(
            out,
            "  Middle: {} / {} ({:.2}%)",
            thirds.middle.differing, thirds.middle.total, thirds.middle.percent
        );
        let _ = writeln!(
            out,
            "  Bottom: {} / {} ({:.2}%)",
            thirds.bottom.differing, thirds.bottom.total, thirds.bottom.percent
        );
    }

    if let Some(halves) = &result.halves {
        let _ = writeln!(out);
        let _ = writeln!(out, "Differences by side");
        let _ = writeln!(
            out,
            "  Left: {} / {} ({:.2}%)",
            halves.left.differing, halves.left.total, halves.left.percent
        );
        let _ = writeln!(
            out,
            "  Right: {} / {} ({:.2}%)",
            halves.right.differing, halves.right.total, halves.right.percent
        );
    }

    out
}

/// Render the layout analysis (distribution plus hotspot warnings)
pub fn render_layout(result: &ComparisonResult, hotspots: &[Hotspot]) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Layout analysis");
    let _ = writeln!(out, "  Image size: {}x{}", result.width, result.height);

    if result.differing == 0 {
        let _ = writeln!(out, "  No differences above threshold {}", result.threshold);
        return out;
    }

    if let Some(halves) = &result.halves {
        let _ = writeln!(
            out,
            "  Left half differences: {} ({:.1}%)",
            halves.left.differing, halves.left.percent
        );
        let _ = writeln!(
            out,
            "  Right half differences: {} ({:.1}%)",
            halves.right.differing, halves.right.percent
        );
    }

    if let Some(thirds) = &result.thirds {
        let _ = writeln!(out);
        let _ = writeln!(out, "Vertical distribution");
        let _ = writeln!(
            out,
            "  Top third: {} ({:.1}%)",
            thirds.top.differing, thirds.top.percent
        );
        let _ = writeln!(
            out,
            "  Middle third: {} ({:.1}%)",
            thirds.middle.differing, thirds.middle.percent
        );
        let _ = writeln!(
            out,
            "  Bottom third: {} ({:.1}%)",
            thirds.bottom.differing, thirds.bottom.percent
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "High difference regions");
    if hotspots.is_empty() {
        let _ = writeln!(out, "  None");
    }
    for hotspot in hotspots {
        let _ = writeln!(
            out,
            "  Warning: {}: {} / {} ({:.1}%) - likely {}",
            hotspot.area,
            hotspot.stats.differing,
            hotspot.stats.total,
            hotspot.stats.percent,
            hotspot.hint
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{compare_images, layout_hotspots, DiffOptions};
    use image::{Rgb, RgbImage};
    use std::path::PathBuf;

    fn comparison_with_one_diff() -> crate::analysis::Comparison {
        let first = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        let mut second = first.clone();
        second.put_pixel(3, 2, Rgb([120, 120, 120]));
        compare_images(&first, &second, &DiffOptions::default())
    }

    #[test]
    fn test_summary_mentions_counts_and_box() {
        let comparison = comparison_with_one_diff();
        let summary = render_summary(
            &comparison.result,
            &PathBuf::from("a.png"),
            &PathBuf::from("b.png"),
        );

        assert!(summary.contains("1 / 16 (6.25%)"));
        assert!(summary.contains("Top: 2px, Left: 3px"));
        assert!(summary.contains("Bottom: 3px, Right: 4px"));
        assert!(summary.contains("Differences by region"));
        assert!(summary.contains("Differences by side"));
    }

    #[test]
    fn test_summary_clean_comparison_has_no_box() {
        let img = RgbImage::from_pixel(4, 4, Rgb([50, 50, 50]));
        let comparison = compare_images(&img, &img.clone(), &DiffOptions::default());
        let summary = render_summary(
            &comparison.result,
            &PathBuf::from("a.png"),
            &PathBuf::from("b.png"),
        );

        assert!(summary.contains("0 / 16 (0.00%)"));
        assert!(!summary.contains("bounding box"));
    }

    #[test]
    fn test_layout_reports_hotspots() {
        let first = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let second = RgbImage::from_pixel(10, 10, Rgb([255, 255, 255]));
        let comparison = compare_images(&first, &second, &DiffOptions::default());
        let hotspots = layout_hotspots(&comparison.mask);

        let rendered = render_layout(&comparison.result, &hotspots);
        assert!(rendered.contains("Warning: top strip"));
        assert!(rendered.contains("Warning: left half"));
        assert!(rendered.contains("Vertical distribution"));
    }

    #[test]
    fn test_layout_clean_comparison() {
        let img = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let comparison = compare_images(&img, &img.clone(), &DiffOptions::default());

        let rendered = render_layout(&comparison.result, &[]);
        assert!(rendered.contains("No differences above threshold"));
    }
}
