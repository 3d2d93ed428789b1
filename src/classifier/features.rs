use std::collections::HashMap;

use image::{GrayImage, ImageBuffer, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::filter::filter3x3;
use imageproc::morphology::open;
use imageproc::region_labelling::{connected_components, Connectivity};

/// Canonical analysis size; every input is resized to this before extraction.
pub const CANONICAL_SIZE: u32 = 224;

/// Hue bands on the 0..=255 byte scale (the rule table's native scale).
/// Green sits around byte 85 (120 degrees); yellow and orange/brown below it.
const GREEN_BAND: (usize, usize) = (35, 90);
const YELLOW_BAND: (usize, usize) = (20, 42);
const ORANGE_BAND: (usize, usize) = (10, 25);
/// Pixels with value below this are counted as near-black (necrotic tissue).
const DARK_VALUE_CUTOFF: usize = 60;
/// Damping applied to the necrosis sum; the orange band overlaps the yellow
/// band, so the raw count double-counts stressed tissue.
const NECROSIS_DAMPING: f32 = 1.5;

/// Value cutoff for the dark-spot mask used by the lesion-counting extractor.
const DARK_SPOT_VALUE: u8 = 50;

type GrayF32 = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Named visual indicators extracted from a single leaf image.
///
/// Ratios are in [0, 1]; `entropy` is Shannon entropy of the luminance
/// histogram in bits, in [0, 8]. The blob counts are `None` unless the
/// extractor that produced the set computes them.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSet {
    /// Fraction of pixels in the green hue band (healthy tissue).
    pub green_index: f32,
    /// Fraction of pixels in the yellow hue band (viral/bacterial stress).
    pub chlorosis_index: f32,
    /// Damped combination of near-black and orange/brown pixel fractions
    /// (fungal or late-stage disease).
    pub necrosis_index: f32,
    /// Texture entropy in bits; high values signal complex lesion patterns.
    pub entropy: f32,
    /// Mean intensity of the Laplacian edge map, normalized to [0, 1].
    pub edge_density: f32,
    /// 1 / (1 + mean channel stddev / 50); healthy foliage is more uniform.
    pub color_uniformity: f32,
    /// Count of large near-black blobs, when computed.
    pub dark_spot_count: Option<u32>,
    /// Count of lesion-sized contiguous regions, when computed.
    pub lesion_count: Option<u32>,
}

/// Capability interface for feature extraction strategies.
///
/// The classifier accepts any implementation, so a richer (or eventually a
/// learned) feature pipeline can be swapped in without touching the facade.
pub trait FeatureExtractor: Send + Sync {
    /// Computes the feature set for a decoded image of canonical dimensions.
    fn extract(&self, image: &RgbImage) -> FeatureSet;

    /// Short name used in diagnostics.
    fn name(&self) -> &'static str;
}

/// The canonical extractor: hue/value histogram bands, texture entropy, and
/// Laplacian edge density. Pure per-pixel statistics, no blob analysis.
#[derive(Debug, Default, Clone, Copy)]
pub struct ColorStatisticsExtractor;

impl FeatureExtractor for ColorStatisticsExtractor {
    fn extract(&self, image: &RgbImage) -> FeatureSet {
        let (green_index, chlorosis_index, necrosis_index) = analyze_color_health(image);
        let luma = luminance(image);
        FeatureSet {
            green_index,
            chlorosis_index,
            necrosis_index,
            entropy: shannon_entropy(&luma),
            edge_density: edge_density(image),
            color_uniformity: color_uniformity(image),
            dark_spot_count: None,
            lesion_count: None,
        }
    }

    fn name(&self) -> &'static str {
        "color-statistics"
    }
}

/// Richer extractor: everything the canonical extractor computes, plus counts
/// of discrete dark spots and lesion-sized regions from connected-component
/// labelling of thresholded masks.
#[derive(Debug, Clone, Copy)]
pub struct LesionCountExtractor {
    /// Dark blobs must exceed this area (px^2) to count as a spot.
    pub min_spot_area: u32,
    /// Lesion regions must fall strictly inside this area range (px^2).
    pub lesion_area: (u32, u32),
}

impl Default for LesionCountExtractor {
    fn default() -> Self {
        Self {
            min_spot_area: 100,
            lesion_area: (50, 2000),
        }
    }
}

impl FeatureExtractor for LesionCountExtractor {
    fn extract(&self, image: &RgbImage) -> FeatureSet {
        let mut features = ColorStatisticsExtractor.extract(image);
        features.dark_spot_count = Some(self.count_dark_spots(image));
        features.lesion_count = Some(self.count_lesions(image));
        features
    }

    fn name(&self) -> &'static str {
        "lesion-count"
    }
}

impl LesionCountExtractor {
    /// Counts large near-black blobs on a value-thresholded mask.
    fn count_dark_spots(&self, image: &RgbImage) -> u32 {
        if image.width() == 0 || image.height() == 0 {
            return 0;
        }
        let mask = GrayImage::from_fn(image.width(), image.height(), |x, y| {
            let [r, g, b] = image.get_pixel(x, y).0;
            let value = r.max(g).max(b);
            if value <= DARK_SPOT_VALUE {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        count_regions(&mask, self.min_spot_area, u32::MAX)
    }

    /// Counts lesion-sized regions on a morphologically opened Otsu mask.
    fn count_lesions(&self, image: &RgbImage) -> u32 {
        if image.width() == 0 || image.height() == 0 {
            return 0;
        }
        let luma = luminance(image);
        let level = otsu_level(&luma);
        let binary = GrayImage::from_fn(luma.width(), luma.height(), |x, y| {
            if luma.get_pixel(x, y).0[0] > level {
                Luma([255u8])
            } else {
                Luma([0u8])
            }
        });
        let opened = open(&binary, Norm::LInf, 1);
        let (min_area, max_area) = self.lesion_area;
        count_regions(&opened, min_area, max_area)
    }
}

/// Counts connected foreground regions whose area is strictly between the
/// given bounds.
fn count_regions(mask: &GrayImage, min_area: u32, max_area: u32) -> u32 {
    let labelled = connected_components(mask, Connectivity::Eight, Luma([0u8]));
    let mut areas: HashMap<u32, u32> = HashMap::new();
    for Luma([label]) in labelled.pixels() {
        if *label > 0 {
            *areas.entry(*label).or_insert(0) += 1;
        }
    }
    areas
        .values()
        .filter(|&&area| area > min_area && area < max_area)
        .count() as u32
}

/// Converts an RGB pixel to (hue, value) on the 0..=255 byte scale.
fn hue_value(r: u8, g: u8, b: u8) -> (u8, u8) {
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = (max - min) as f32;
    if delta == 0.0 {
        return (0, max);
    }
    let (rf, gf, bf) = (r as f32, g as f32, b as f32);
    let mut hue_deg = if max == r {
        60.0 * (((gf - bf) / delta) % 6.0)
    } else if max == g {
        60.0 * ((bf - rf) / delta + 2.0)
    } else {
        60.0 * ((rf - gf) / delta + 4.0)
    };
    if hue_deg < 0.0 {
        hue_deg += 360.0;
    }
    let hue = (hue_deg / 360.0 * 256.0) as u32 % 256;
    (hue as u8, max)
}

/// Partitions the hue and value histograms into the green, yellow, and
/// orange/dark bands and returns (green, chlorosis, necrosis) indices.
fn analyze_color_health(image: &RgbImage) -> (f32, f32, f32) {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return (0.0, 0.0, 0.0);
    }

    let mut hue_hist = [0u64; 256];
    let mut value_hist = [0u64; 256];
    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        let (hue, value) = hue_value(r, g, b);
        hue_hist[hue as usize] += 1;
        value_hist[value as usize] += 1;
    }

    let band_sum = |hist: &[u64; 256], lo: usize, hi: usize| -> u64 {
        hist[lo..hi.min(256)].iter().sum()
    };

    let green = band_sum(&hue_hist, GREEN_BAND.0, GREEN_BAND.1);
    let yellow = band_sum(&hue_hist, YELLOW_BAND.0, YELLOW_BAND.1);
    let orange = band_sum(&hue_hist, ORANGE_BAND.0, ORANGE_BAND.1);
    let dark = band_sum(&value_hist, 0, DARK_VALUE_CUTOFF);

    let total = total as f32;
    let green_index = green as f32 / total;
    let chlorosis_index = yellow as f32 / total;
    let necrosis_index = (dark + orange) as f32 / (total * NECROSIS_DAMPING);
    (green_index, chlorosis_index, necrosis_index)
}

/// Single-channel luminance via the standard Rec. 601 weights.
fn luminance(image: &RgbImage) -> GrayImage {
    GrayImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b] = image.get_pixel(x, y).0;
        let y601 = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([y601.round().clamp(0.0, 255.0) as u8])
    })
}

/// Shannon entropy of the 256-bin intensity histogram, in bits.
fn shannon_entropy(gray: &GrayImage) -> f32 {
    let total = gray.width() as u64 * gray.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let mut hist = [0u64; 256];
    for Luma([v]) in gray.pixels() {
        hist[*v as usize] += 1;
    }
    let total = total as f32;
    let mut entropy = 0.0f32;
    for &count in hist.iter() {
        if count > 0 {
            let p = count as f32 / total;
            entropy -= p * p.log2();
        }
    }
    entropy
}

/// Mean intensity of the Laplacian edge map, normalized to [0, 1].
fn edge_density(image: &RgbImage) -> f32 {
    const K_LAPLACIAN: [f32; 9] = [-1.0, -1.0, -1.0, -1.0, 8.0, -1.0, -1.0, -1.0, -1.0];

    let (w, h) = (image.width() as usize, image.height() as usize);
    if w == 0 || h == 0 {
        return 0.0;
    }
    let mut buf = Vec::<f32>::with_capacity(w * h);
    for pixel in image.pixels() {
        let [r, g, b] = pixel.0;
        buf.push((0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32) / 255.0);
    }
    let gray: GrayF32 = match ImageBuffer::from_raw(w as u32, h as u32, buf) {
        Some(img) => img,
        None => return 0.0,
    };
    let edges: Vec<f32> = filter3x3(&gray, &K_LAPLACIAN).into_raw();
    let sum: f32 = edges.iter().map(|&v| v.clamp(0.0, 1.0)).sum();
    sum / edges.len() as f32
}

/// Mean per-channel standard deviation mapped to [0, 1]; 1 is most uniform.
fn color_uniformity(image: &RgbImage) -> f32 {
    let total = image.width() as u64 * image.height() as u64;
    if total == 0 {
        return 0.0;
    }
    let n = total as f32;
    let mut sum = [0.0f32; 3];
    let mut sum_sq = [0.0f32; 3];
    for pixel in image.pixels() {
        for c in 0..3 {
            let v = pixel.0[c] as f32;
            sum[c] += v;
            sum_sq[c] += v * v;
        }
    }
    let mut avg_std = 0.0f32;
    for c in 0..3 {
        let mean = sum[c] / n;
        let var = (sum_sq[c] / n - mean * mean).max(0.0);
        avg_std += var.sqrt();
    }
    avg_std /= 3.0;
    1.0 / (1.0 + avg_std / 50.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn solid(w: u32, h: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(w, h, Rgb(color))
    }

    #[test]
    fn test_uniform_green_image() {
        let img = solid(64, 64, [60, 180, 60]);
        let features = ColorStatisticsExtractor.extract(&img);
        assert!(features.green_index > 0.99);
        assert!(features.chlorosis_index < 1e-6);
        assert!(features.necrosis_index < 1e-6);
        assert!(features.entropy < 1e-6);
        assert!(features.color_uniformity > 0.99);
        assert!(features.dark_spot_count.is_none());
    }

    #[test]
    fn test_dark_brown_image() {
        // Half orange-brown, half near-black.
        let img = RgbImage::from_fn(64, 64, |x, _| {
            if x < 32 {
                Rgb([100, 60, 20])
            } else {
                Rgb([15, 10, 8])
            }
        });
        let features = ColorStatisticsExtractor.extract(&img);
        assert!(features.green_index < 1e-6);
        // dark (0.5) + orange (0.5), damped by 1.5
        assert!((features.necrosis_index - 2.0 / 3.0).abs() < 0.02);
    }

    #[test]
    fn test_zero_pixel_image() {
        let img = RgbImage::new(0, 0);
        let features = LesionCountExtractor::default().extract(&img);
        assert_eq!(features.green_index, 0.0);
        assert_eq!(features.necrosis_index, 0.0);
        assert_eq!(features.entropy, 0.0);
        assert_eq!(features.edge_density, 0.0);
        assert_eq!(features.dark_spot_count, Some(0));
        assert_eq!(features.lesion_count, Some(0));
    }

    #[test]
    fn test_entropy_bounds() {
        // Two-value checkerboard: exactly one bit of histogram entropy.
        let img = RgbImage::from_fn(64, 64, |x, y| {
            if (x + y) % 2 == 0 {
                Rgb([255, 255, 255])
            } else {
                Rgb([0, 0, 0])
            }
        });
        let features = ColorStatisticsExtractor.extract(&img);
        assert!((features.entropy - 1.0).abs() < 1e-4);
        assert!(features.entropy <= 8.0);
        // Alternating black/white also produces strong edges.
        assert!(features.edge_density > 0.3);
    }

    #[test]
    fn test_dark_spot_counting() {
        // Three 16x16 black squares (area 256 > 100) on a green background.
        let mut img = solid(128, 128, [60, 180, 60]);
        for (sx, sy) in [(8u32, 8u32), (60, 20), (30, 90)] {
            for dx in 0..16 {
                for dy in 0..16 {
                    img.put_pixel(sx + dx, sy + dy, Rgb([10, 10, 10]));
                }
            }
        }
        let features = LesionCountExtractor::default().extract(&img);
        assert_eq!(features.dark_spot_count, Some(3));
    }

    #[test]
    fn test_small_dark_specks_ignored() {
        // 4x4 specks (area 16) fall below the 100 px^2 spot threshold.
        let mut img = solid(128, 128, [60, 180, 60]);
        for (sx, sy) in [(8u32, 8u32), (60, 20)] {
            for dx in 0..4 {
                for dy in 0..4 {
                    img.put_pixel(sx + dx, sy + dy, Rgb([10, 10, 10]));
                }
            }
        }
        let features = LesionCountExtractor::default().extract(&img);
        assert_eq!(features.dark_spot_count, Some(0));
    }

    #[test]
    fn test_hue_value_scale() {
        // Pure green is 120 degrees -> byte 85.
        let (hue, value) = hue_value(0, 255, 0);
        assert_eq!(hue, 85);
        assert_eq!(value, 255);
        // Grey pixels have no hue.
        let (hue, value) = hue_value(40, 40, 40);
        assert_eq!(hue, 0);
        assert_eq!(value, 40);
    }
}
