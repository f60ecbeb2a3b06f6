//! Per-cell color sampling.
//!
//! Every cell of the output grid summarizes a rectangular block of the
//! source image. [`SampleMode`] picks how that block is reduced to a single
//! color; edge exclusion optionally shrinks the block inward first so that
//! seams and gridlines already present in the source do not leak in.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use palette::Srgb;

use crate::error::PatternError;

/// Fraction of a block trimmed from each side when excluding edges, in percent.
const EDGE_MARGIN_PERCENT: u32 = 15;

/// Strategy used to pick a representative color for one cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleMode {
    /// Most frequent exact color in the block. On ties the color that
    /// reached the top count first wins.
    #[default]
    Dominant,
    /// Rounded per-channel mean over the block.
    Average,
    /// Single pixel at the block center.
    Center,
    /// Single pixel at 4/5 of the block's width and height.
    Fractional,
    /// The image is resized to the grid first; each cell reads one pixel.
    Predownscaled,
}

impl SampleMode {
    /// Whether cells map onto blocks of the full-resolution source.
    pub fn is_block_based(self) -> bool {
        !matches!(self, SampleMode::Predownscaled)
    }

    /// Reduce `region` of `buffer` to one color.
    pub fn sample(self, buffer: &RgbaImage, region: SampleRegion, exclude_edge: bool) -> Srgb<u8> {
        match self {
            SampleMode::Predownscaled => pixel(buffer, region.x, region.y),
            SampleMode::Dominant => dominant(buffer, region.inset(exclude_edge)),
            SampleMode::Average => average(buffer, region.inset(exclude_edge)),
            SampleMode::Center => {
                let r = region.inset(exclude_edge);
                pixel(buffer, r.x + r.width / 2, r.y + r.height / 2)
            }
            SampleMode::Fractional => {
                let r = region.inset(exclude_edge);
                pixel(buffer, r.x + r.width * 4 / 5, r.y + r.height * 4 / 5)
            }
        }
    }
}

impl fmt::Display for SampleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleMode::Dominant => "dominant",
            SampleMode::Average => "average",
            SampleMode::Center => "center",
            SampleMode::Fractional => "fractional",
            SampleMode::Predownscaled => "predownscaled",
        };
        f.write_str(name)
    }
}

impl FromStr for SampleMode {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dominant" | "main" => Ok(SampleMode::Dominant),
            "average" => Ok(SampleMode::Average),
            "center" => Ok(SampleMode::Center),
            "fractional" | "diagonal45" => Ok(SampleMode::Fractional),
            "predownscaled" | "original" | "scale" => Ok(SampleMode::Predownscaled),
            _ => Err(PatternError::UnknownSampleMode(s.to_string())),
        }
    }
}

/// Rectangle of source pixels summarized by one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SampleRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SampleRegion {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Shrink by 15% (at least one pixel) per side. An axis that would end up
    /// empty keeps its full extent.
    pub fn inset(self, exclude_edge: bool) -> Self {
        if !exclude_edge {
            return self;
        }
        let (x, width) = inset_axis(self.x, self.width);
        let (y, height) = inset_axis(self.y, self.height);
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

fn inset_axis(start: u32, len: u32) -> (u32, u32) {
    let margin = (len * EDGE_MARGIN_PERCENT / 100).max(1);
    if len > 2 * margin {
        (start + margin, len - 2 * margin)
    } else {
        (start, len)
    }
}

/// Maps grid cells onto regions of the source buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridGeometry {
    pub block_width: u32,
    pub block_height: u32,
}

impl GridGeometry {
    /// Block geometry for a `grid_width` x `grid_height` grid over an image.
    /// Remainder pixels on the right and bottom are not covered by any block.
    pub fn blocks(image_width: u32, image_height: u32, grid_width: u32, grid_height: u32) -> Self {
        Self {
            block_width: image_width / grid_width,
            block_height: image_height / grid_height,
        }
    }

    /// One pixel per cell, for pre-downscaled sources.
    pub fn unit() -> Self {
        Self {
            block_width: 1,
            block_height: 1,
        }
    }

    pub fn region(&self, cell_x: u32, cell_y: u32) -> SampleRegion {
        SampleRegion::new(
            cell_x * self.block_width,
            cell_y * self.block_height,
            self.block_width,
            self.block_height,
        )
    }
}

#[inline]
fn pixel(buffer: &RgbaImage, x: u32, y: u32) -> Srgb<u8> {
    let [r, g, b, _] = buffer.get_pixel(x, y).0;
    Srgb::new(r, g, b)
}

fn region_pixels(buffer: &RgbaImage, region: SampleRegion) -> impl Iterator<Item = [u8; 3]> + '_ {
    (region.y..region.y + region.height).flat_map(move |y| {
        (region.x..region.x + region.width).map(move |x| {
            let [r, g, b, _] = buffer.get_pixel(x, y).0;
            [r, g, b]
        })
    })
}

fn dominant(buffer: &RgbaImage, region: SampleRegion) -> Srgb<u8> {
    let mut counts: HashMap<[u8; 3], u32> = HashMap::new();
    let mut best = [0u8; 3];
    let mut best_count = 0u32;

    for rgb in region_pixels(buffer, region) {
        let count = counts.entry(rgb).or_insert(0);
        *count += 1;
        if *count > best_count {
            best_count = *count;
            best = rgb;
        }
    }

    Srgb::new(best[0], best[1], best[2])
}

fn average(buffer: &RgbaImage, region: SampleRegion) -> Srgb<u8> {
    let mut sums = [0u64; 3];
    let mut count = 0u64;

    for rgb in region_pixels(buffer, region) {
        for (sum, channel) in sums.iter_mut().zip(rgb) {
            *sum += channel as u64;
        }
        count += 1;
    }

    if count == 0 {
        return Srgb::new(0, 0, 0);
    }

    // Round half up.
    let round = |sum: u64| ((sum * 2 + count) / (count * 2)) as u8;
    Srgb::new(round(sums[0]), round(sums[1]), round(sums[2]))
}
