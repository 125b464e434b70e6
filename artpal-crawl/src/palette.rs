//! Palette Extractor
//!
//! Decodes the staged image into RGBA samples and clusters them into a short
//! list of representative colours, most prominent first.
//!
//! **Clustering:**
//! 1. Sample at most `max_samples` pixels with a fixed stride whose phase
//!    shifts by one pixel per sample, skipping pixels whose alpha is below
//!    `min_alpha`
//! 2. Bucket samples by the top 4 bits of each channel
//! 3. Merge buckets (most populous first) into the first cluster whose
//!    average lies within `distance` (normalized RGB, 0.0-1.0)
//! 4. Fold clusters that are within `hue_distance`, `saturation_distance`
//!    and `lightness_distance` of a more prominent cluster into it

use crate::error::DecodeError;
use artpal_common::PaletteOptions;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Decoded image as a flat RGBA sequence
#[derive(Debug, Clone)]
pub struct PixelGrid {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, 4 bytes per pixel
    pub data: Vec<u8>,
}

impl PixelGrid {
    /// `[width, height, channels]`
    pub fn shape(&self) -> [u32; 3] {
        [self.width, self.height, 4]
    }
}

/// One representative colour
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaletteColor {
    /// `#rrggbb`
    pub hex: String,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Share of the sampled pixels this colour stands for (0.0-1.0)
    pub area: f64,
}

/// Palette of one image together with its dimensions
#[derive(Debug, Clone, Serialize)]
pub struct Palette {
    pub width: u32,
    pub height: u32,
    pub colors: Vec<PaletteColor>,
}

impl Palette {
    pub fn hex_codes(&self) -> Vec<String> {
        self.colors.iter().map(|c| c.hex.clone()).collect()
    }
}

/// Decode an image file, sniffing the format from its content
///
/// The staging file is always named `.jpg`, whatever the server sent.
pub fn decode_pixels(path: &Path) -> Result<PixelGrid, DecodeError> {
    let open_error = |source| DecodeError::Open {
        path: path.to_path_buf(),
        source,
    };

    let image = image::ImageReader::open(path)
        .map_err(open_error)?
        .with_guessed_format()
        .map_err(open_error)?
        .decode()
        .map_err(|source| DecodeError::Image {
            path: path.to_path_buf(),
            source,
        })?;

    let rgba = image.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(PixelGrid {
        width,
        height,
        data: rgba.into_raw(),
    })
}

/// Running channel sums of a group of samples
#[derive(Debug, Clone, Copy, Default)]
struct Cluster {
    red: u64,
    green: u64,
    blue: u64,
    count: u64,
}

impl Cluster {
    fn add(&mut self, rgb: [u8; 3]) {
        self.red += rgb[0] as u64;
        self.green += rgb[1] as u64;
        self.blue += rgb[2] as u64;
        self.count += 1;
    }

    fn absorb(&mut self, other: &Cluster) {
        self.red += other.red;
        self.green += other.green;
        self.blue += other.blue;
        self.count += other.count;
    }

    fn average(&self) -> [u8; 3] {
        let mean = |sum: u64| ((sum + self.count / 2) / self.count.max(1)).min(255) as u8;
        [mean(self.red), mean(self.green), mean(self.blue)]
    }
}

/// Averaged colour with its sample weight
#[derive(Debug, Clone, Copy)]
struct Swatch {
    rgb: [u8; 3],
    hsl: [f64; 3],
    weight: u64,
}

/// Euclidean RGB distance scaled so black to white is 1.0
fn rgb_distance(a: [u8; 3], b: [u8; 3]) -> f64 {
    let sum: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| {
            let d = (x as f64 - y as f64) / 255.0;
            d * d
        })
        .sum();
    (sum / 3.0).sqrt()
}

/// HSL with every component in 0.0-1.0
fn to_hsl(rgb: [u8; 3]) -> [f64; 3] {
    let [r, g, b] = rgb.map(|c| c as f64 / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let lightness = (max + min) / 2.0;
    let delta = max - min;

    if delta == 0.0 {
        return [0.0, 0.0, lightness];
    }

    let saturation = if lightness > 0.5 {
        delta / (2.0 - max - min)
    } else {
        delta / (max + min)
    };

    let hue = if max == r {
        (g - b) / delta + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };

    [hue / 6.0, saturation, lightness]
}

fn is_similar(a: &Swatch, b: &Swatch, options: &PaletteOptions) -> bool {
    let hue = (a.hsl[0] - b.hsl[0]).abs();
    let hue = hue.min(1.0 - hue);
    hue < options.hue_distance
        && (a.hsl[1] - b.hsl[1]).abs() < options.saturation_distance
        && (a.hsl[2] - b.hsl[2]).abs() < options.lightness_distance
}

/// Representative colours of a pixel grid, most prominent first
pub fn extract_colors(
    grid: &PixelGrid,
    options: &PaletteOptions,
) -> Result<Vec<PaletteColor>, DecodeError> {
    let pixel_count = grid.data.len() / 4;
    let step = pixel_count.div_ceil(options.max_samples.max(1)).max(1);

    // Phase advances one pixel per sample; every residue of the stride is visited
    let samples = (0..)
        .map(|k: usize| k * step + k % step)
        .take_while(|&i| i < pixel_count);

    let mut buckets: HashMap<u16, Cluster> = HashMap::new();
    for i in samples {
        let pixel = &grid.data[i * 4..i * 4 + 4];
        if pixel[3] < options.min_alpha {
            continue;
        }
        let rgb = [pixel[0], pixel[1], pixel[2]];
        let key = ((rgb[0] as u16 >> 4) << 8) | ((rgb[1] as u16 >> 4) << 4) | (rgb[2] as u16 >> 4);
        buckets.entry(key).or_default().add(rgb);
    }

    if buckets.is_empty() {
        return Err(DecodeError::EmptyImage {
            width: grid.width,
            height: grid.height,
        });
    }

    let mut buckets: Vec<(u16, Cluster)> = buckets.into_iter().collect();
    buckets.sort_by(|a, b| b.1.count.cmp(&a.1.count).then(a.0.cmp(&b.0)));

    let mut clusters: Vec<Cluster> = Vec::new();
    for (_, bucket) in &buckets {
        let average = bucket.average();
        match clusters
            .iter_mut()
            .find(|c| rgb_distance(c.average(), average) < options.distance)
        {
            Some(cluster) => cluster.absorb(bucket),
            None => clusters.push(*bucket),
        }
    }
    clusters.sort_by(|a, b| b.count.cmp(&a.count));

    let mut swatches: Vec<Swatch> = Vec::new();
    for cluster in &clusters {
        let rgb = cluster.average();
        let swatch = Swatch {
            rgb,
            hsl: to_hsl(rgb),
            weight: cluster.count,
        };
        match swatches.iter_mut().find(|s| is_similar(s, &swatch, options)) {
            Some(kept) => kept.weight += swatch.weight,
            None => swatches.push(swatch),
        }
    }
    swatches.sort_by(|a, b| b.weight.cmp(&a.weight));

    let total: u64 = swatches.iter().map(|s| s.weight).sum();
    debug!(
        buckets = buckets.len(),
        clusters = clusters.len(),
        colors = swatches.len(),
        "Clustered palette"
    );

    Ok(swatches
        .into_iter()
        .map(|s| {
            let [red, green, blue] = s.rgb;
            PaletteColor {
                hex: format!("#{:02x}{:02x}{:02x}", red, green, blue),
                red,
                green,
                blue,
                area: s.weight as f64 / total as f64,
            }
        })
        .collect())
}

/// Decodes and clusters on the blocking thread pool
#[derive(Debug, Clone, Default)]
pub struct PaletteExtractor {
    options: PaletteOptions,
}

impl PaletteExtractor {
    pub fn new(options: PaletteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PaletteOptions {
        &self.options
    }

    /// Palette of the image stored at `path`
    pub async fn extract(&self, path: &Path) -> Result<Palette, DecodeError> {
        let path: PathBuf = path.to_path_buf();
        let options = self.options.clone();

        tokio::task::spawn_blocking(move || -> Result<Palette, DecodeError> {
            let grid = decode_pixels(&path)?;
            let colors = extract_colors(&grid, &options)?;
            Ok(Palette {
                width: grid.width,
                height: grid.height,
                colors,
            })
        })
        .await
        .map_err(|e| DecodeError::Task(e.to_string()))?
    }
}
