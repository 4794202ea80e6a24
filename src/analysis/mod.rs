//! Pixel Difference Analysis
//!
//! This module implements threshold-based comparison of two screenshots,
//! producing a per-pixel difference mask, aggregate statistics, the bounding
//! box enclosing all changes, and region-bucketed breakdowns for layout
//! triage.
//!
//! # Algorithm
//!
//! ```text
//! Image A ──┐
//!           ├─> Resample B to A's size ─> per-channel |A−B| > threshold
//! Image B ──┘                                       │
//!                                                   v
//!                        DiffMask ─> totals / bounding box / thirds / halves
//!                                                   │
//!                                                   v
//!                                     optional red-highlight overlay
//! ```
//!
//! All reported indices live in the first image's coordinate space; a second
//! image with different dimensions is resampled to match (never the reverse).
//! The inputs are never mutated and the whole computation is deterministic.

use std::ops::Range;

use image::imageops::FilterType;
use image::{Rgb, RgbImage};
use serde::Serialize;
use tracing::{debug, warn};

use crate::raster;

// =============================================================================
// Types
// =============================================================================

/// Options for a single comparison run
#[derive(Debug, Clone)]
pub struct DiffOptions {
    /// Per-channel absolute difference a pixel must strictly exceed to count
    pub threshold: u8,

    /// Color painted over differing pixels in the overlay
    pub highlight: Rgb<u8>,

    /// Filter used when the second image needs resampling
    pub filter: FilterType,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            threshold: 10,
            highlight: Rgb([255, 0, 0]),
            filter: FilterType::Lanczos3,
        }
    }
}

/// Per-pixel difference mask, row-major, aligned 1:1 with the first image
#[derive(Debug, Clone)]
pub struct DiffMask {
    width: u32,
    height: u32,
    bits: Vec<bool>,
}

impl DiffMask {
    /// Build the mask for two equally-sized RGB images.
    ///
    /// A position is marked when any channel's absolute difference strictly
    /// exceeds `threshold`; a difference of exactly `threshold` does not
    /// count.
    ///
    /// # Panics
    ///
    /// Panics if the images' dimensions differ. Callers normalize sizes
    /// first; [`compare_images`] does this automatically.
    pub fn compute(first: &RgbImage, second: &RgbImage, threshold: u8) -> Self {
        assert_eq!(
            first.dimensions(),
            second.dimensions(),
            "Mask inputs must have equal dimensions: {:?} vs {:?}",
            first.dimensions(),
            second.dimensions()
        );

        let bits = first
            .pixels()
            .zip(second.pixels())
            .map(|(a, b)| pixel_differs(a, b, threshold))
            .collect();

        Self {
            width: first.width(),
            height: first.height(),
            bits,
        }
    }

    /// Mask width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Mask height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Total number of positions in the mask
    pub fn total_pixels(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Number of positions marked as differing
    pub fn differing_pixels(&self) -> u64 {
        self.bits.iter().filter(|&&bit| bit).count() as u64
    }

    /// Whether the position (x, y) is marked as differing
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> bool {
        self.bits[y as usize * self.width as usize + x as usize]
    }

    /// Count marked positions inside a half-open row band
    fn count_rows(&self, rows: Range<u32>) -> u64 {
        let width = self.width as usize;
        rows.map(|y| {
            let start = y as usize * width;
            self.bits[start..start + width]
                .iter()
                .filter(|&&bit| bit)
                .count() as u64
        })
        .sum()
    }

    /// Count marked positions inside a half-open column band
    fn count_cols(&self, cols: Range<u32>) -> u64 {
        let mut count = 0u64;
        for y in 0..self.height {
            for x in cols.clone() {
                if self.get(x, y) {
                    count += 1;
                }
            }
        }
        count
    }

    fn row_has_difference(&self, y: u32) -> bool {
        let width = self.width as usize;
        let start = y as usize * width;
        self.bits[start..start + width].iter().any(|&bit| bit)
    }

    fn col_has_difference(&self, x: u32) -> bool {
        (0..self.height).any(|y| self.get(x, y))
    }

    #[cfg(test)]
    fn from_bits(width: u32, height: u32, bits: Vec<bool>) -> Self {
        assert_eq!(bits.len(), (width * height) as usize);
        Self {
            width,
            height,
            bits,
        }
    }
}

/// Per-channel strict-greater-than comparison against the threshold
#[inline]
fn pixel_differs(a: &Rgb<u8>, b: &Rgb<u8>, threshold: u8) -> bool {
    a.0[0].abs_diff(b.0[0]) > threshold
        || a.0[1].abs_diff(b.0[1]) > threshold
        || a.0[2].abs_diff(b.0[2]) > threshold
}

/// Tightest rectangle enclosing all differing positions.
///
/// `bottom` and `right` are exclusive, matching slice semantics: a single
/// differing pixel at row 2, column 3 yields
/// `{ top: 2, left: 3, bottom: 3, right: 4 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    /// First row containing a difference
    pub top: u32,
    /// First column containing a difference
    pub left: u32,
    /// One past the last row containing a difference
    pub bottom: u32,
    /// One past the last column containing a difference
    pub right: u32,
}

impl BoundingBox {
    /// Box width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Box height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    /// Whether the position (x, y) falls inside the box
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// Differing/total counts over one region of the mask
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BandStats {
    /// Marked positions inside the region
    pub differing: u64,
    /// Total positions inside the region
    pub total: u64,
    /// differing / total × 100, or 0 for an empty region
    pub percent: f64,
}

impl BandStats {
    fn new(differing: u64, total: u64) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            differing as f64 / total as f64 * 100.0
        };
        Self {
            differing,
            total,
            percent,
        }
    }
}

/// Vertical view: three equal-height bands, bottom absorbs remainder rows
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VerticalThirds {
    /// Rows `0 .. h/3`
    pub top: BandStats,
    /// Rows `h/3 .. 2*h/3`
    pub middle: BandStats,
    /// Rows `2*h/3 .. h`
    pub bottom: BandStats,
}

/// Horizontal view: two halves, right absorbs the odd column
#[derive(Debug, Clone, Copy, Serialize)]
pub struct HorizontalHalves {
    /// Columns `0 .. w/2`
    pub left: BandStats,
    /// Columns `w/2 .. w`
    pub right: BandStats,
}

/// Aggregated output of one comparison run
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    /// Width of the comparison space (the first image's width)
    pub width: u32,
    /// Height of the comparison space (the first image's height)
    pub height: u32,
    /// Dimensions the second image had before any resampling
    pub second_dimensions: (u32, u32),
    /// Whether the second image was resampled to match the first
    pub resampled: bool,
    /// Threshold applied per channel
    pub threshold: u8,
    /// Number of differing positions
    pub differing: u64,
    /// Total positions compared
    pub total: u64,
    /// differing / total × 100
    pub percent: f64,
    /// Tightest box around all differences; absent when nothing differs
    pub bounding_box: Option<BoundingBox>,
    /// Vertical-thirds view; absent when nothing differs
    pub thirds: Option<VerticalThirds>,
    /// Left/right view; absent when nothing differs
    pub halves: Option<HorizontalHalves>,
}

/// A computed comparison: aggregate result plus the mask behind it
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Aggregated statistics
    pub result: ComparisonResult,
    /// The per-pixel mask the statistics were derived from
    pub mask: DiffMask,
}

// =============================================================================
// Comparison
// =============================================================================

/// Compare two images and aggregate the difference mask.
///
/// A second image with different dimensions is resampled to the first's
/// size before comparison; the first image's dimensions always win. Size
/// mismatch is a normalization step, not an error.
pub fn compare_images(first: &RgbImage, second: &RgbImage, options: &DiffOptions) -> Comparison {
    let second_dimensions = second.dimensions();
    let resampled = first.dimensions() != second.dimensions();

    let mask = if resampled {
        warn!(
            "Images have different sizes: {}x{} vs {}x{}, resampling second to {}x{}",
            first.width(),
            first.height(),
            second.width(),
            second.height(),
            first.width(),
            first.height()
        );
        let matched = raster::resample(second, first.width(), first.height(), options.filter);
        DiffMask::compute(first, &matched, options.threshold)
    } else {
        DiffMask::compute(first, second, options.threshold)
    };

    debug!(
        "Mask computed: {} / {} positions differ",
        mask.differing_pixels(),
        mask.total_pixels()
    );

    let result = aggregate(&mask, options.threshold, second_dimensions, resampled);
    Comparison { result, mask }
}

fn aggregate(
    mask: &DiffMask,
    threshold: u8,
    second_dimensions: (u32, u32),
    resampled: bool,
) -> ComparisonResult {
    let differing = mask.differing_pixels();
    let total = mask.total_pixels();
    let percent = if total == 0 {
        0.0
    } else {
        differing as f64 / total as f64 * 100.0
    };

    let (bounding, thirds, halves) = if differing > 0 {
        (
            bounding_box(mask),
            Some(vertical_thirds(mask)),
            Some(horizontal_halves(mask)),
        )
    } else {
        (None, None, None)
    };

    ComparisonResult {
        width: mask.width(),
        height: mask.height(),
        second_dimensions,
        resampled,
        threshold,
        differing,
        total,
        percent,
        bounding_box: bounding,
        thirds,
        halves,
    }
}

// =============================================================================
// Aggregation views
// =============================================================================

/// Tightest bounding box around all marked positions, if any.
///
/// Scans for the first and last rows and columns containing a mark;
/// `bottom`/`right` come out exclusive.
pub fn bounding_box(mask: &DiffMask) -> Option<BoundingBox> {
    let mut top = None;
    let mut bottom = 0;
    for y in 0..mask.height() {
        if mask.row_has_difference(y) {
            top.get_or_insert(y);
            bottom = y + 1;
        }
    }
    let top = top?;

    let mut left = None;
    let mut right = 0;
    for x in 0..mask.width() {
        if mask.col_has_difference(x) {
            left.get_or_insert(x);
            right = x + 1;
        }
    }

    Some(BoundingBox {
        top,
        left: left?,
        bottom,
        right,
    })
}

/// Partition the mask into three equal-height bands by integer division;
/// the bottom band absorbs any remainder rows.
pub fn vertical_thirds(mask: &DiffMask) -> VerticalThirds {
    let height = mask.height();
    let width = mask.width() as u64;
    let band = height / 3;

    VerticalThirds {
        top: BandStats::new(mask.count_rows(0..band), band as u64 * width),
        middle: BandStats::new(mask.count_rows(band..2 * band), band as u64 * width),
        bottom: BandStats::new(
            mask.count_rows(2 * band..height),
            (height - 2 * band) as u64 * width,
        ),
    }
}

/// Partition the mask into left/right halves by column; the right half
/// absorbs the odd column.
pub fn horizontal_halves(mask: &DiffMask) -> HorizontalHalves {
    let width = mask.width();
    let height = mask.height() as u64;
    let half = width / 2;

    HorizontalHalves {
        left: BandStats::new(mask.count_cols(0..half), half as u64 * height),
        right: BandStats::new(mask.count_cols(half..width), (width - half) as u64 * height),
    }
}

// =============================================================================
// Layout hotspots
// =============================================================================

/// Difference density a probe area must strictly exceed to be reported
pub const HOTSPOT_DENSITY: f64 = 50.0;

/// Rows scanned by the top probe
const TOP_STRIP_ROWS: u32 = 150;

/// Rows scanned by the bottom probe
const BOTTOM_STRIP_ROWS: u32 = 200;

/// A probe area whose difference density exceeded [`HOTSPOT_DENSITY`]
#[derive(Debug, Clone, Serialize)]
pub struct Hotspot {
    /// Probe area name
    pub area: &'static str,
    /// Suggested cause for the concentration of change
    pub hint: &'static str,
    /// Stats over the probe area
    pub stats: BandStats,
}

/// Probe fixed page areas for concentrated change.
///
/// Checks a strip at the top, the left and right halves, and a strip at the
/// bottom. Strips clamp to the image height when the image is shorter than
/// the strip.
pub fn layout_hotspots(mask: &DiffMask) -> Vec<Hotspot> {
    let width = mask.width();
    let height = mask.height();
    let mut hotspots = Vec::new();

    let mut probe = |area, hint, differing: u64, total: u64| {
        let stats = BandStats::new(differing, total);
        if stats.percent > HOTSPOT_DENSITY {
            hotspots.push(Hotspot { area, hint, stats });
        }
    };

    let top_rows = TOP_STRIP_ROWS.min(height);
    probe(
        "top strip",
        "element position issue near the top",
        mask.count_rows(0..top_rows),
        top_rows as u64 * width as u64,
    );

    let half = width / 2;
    probe(
        "left half",
        "imagery position or size issue",
        mask.count_cols(0..half),
        half as u64 * height as u64,
    );
    probe(
        "right half",
        "text position issue",
        mask.count_cols(half..width),
        (width - half) as u64 * height as u64,
    );

    let bottom_start = height.saturating_sub(BOTTOM_STRIP_ROWS);
    probe(
        "bottom strip",
        "element position issue near the bottom",
        mask.count_rows(bottom_start..height),
        (height - bottom_start) as u64 * width as u64,
    );

    hotspots
}

// =============================================================================
// Overlay rendering
// =============================================================================

/// Copy of `first` with every differing pixel replaced by the highlight
/// color. The original image is left untouched.
///
/// # Panics
///
/// Panics if the mask dimensions do not match the image.
pub fn render_overlay(first: &RgbImage, mask: &DiffMask, highlight: Rgb<u8>) -> RgbImage {
    assert_eq!(
        first.dimensions(),
        (mask.width(), mask.height()),
        "Overlay mask must match the image dimensions"
    );

    let mut overlay = first.clone();
    for y in 0..mask.height() {
        for x in 0..mask.width() {
            if mask.get(x, y) {
                overlay.put_pixel(x, y, highlight);
            }
        }
    }
    overlay
}

// =============================================================================
// Tests
// =============================================================================
