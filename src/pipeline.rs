//! End-to-end pattern generation.
//!
//! [`generate`] is a pure function of the source pixels, the palette and a
//! [`PatternRequest`]: it either returns a complete [`Pattern`] or fails
//! before producing anything.

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::color_table::{Palette, SkippedRow, parse_table, selection_filter};
use crate::error::{PatternError, Result};
use crate::grid::CellGrid;
use crate::matcher::PaletteMatcher;
use crate::render::{encode_png, render};
use crate::sample::{GridGeometry, SampleMode};
use crate::usage::{UsedColor, used_colors};

/// Parameters for one generation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PatternRequest {
    /// Cells per row.
    pub pixel_width: u32,
    /// Cells per column.
    pub pixel_height: u32,
    /// Edge length of one rendered cell, in output pixels.
    pub cell_size: u32,
    pub sample_mode: SampleMode,
    pub exclude_edge: bool,
    pub show_grid: bool,
}

impl Default for PatternRequest {
    fn default() -> Self {
        Self {
            pixel_width: 16,
            pixel_height: 16,
            cell_size: 24,
            sample_mode: SampleMode::Dominant,
            exclude_edge: false,
            show_grid: true,
        }
    }
}

impl PatternRequest {
    /// Check the request against a source image of the given size.
    pub fn validate(&self, image_width: u32, image_height: u32) -> Result<()> {
        if self.pixel_width == 0 || self.pixel_height == 0 {
            return Err(PatternError::InvalidGrid {
                width: self.pixel_width,
                height: self.pixel_height,
            });
        }
        if self.cell_size == 0 {
            return Err(PatternError::InvalidCellSize);
        }
        if self.pixel_width.checked_mul(self.cell_size).is_none()
            || self.pixel_height.checked_mul(self.cell_size).is_none()
        {
            return Err(PatternError::OutputTooLarge {
                width: self.pixel_width,
                height: self.pixel_height,
                cell_size: self.cell_size,
            });
        }

        let empty_source = image_width == 0 || image_height == 0;
        let exceeds = self.pixel_width > image_width || self.pixel_height > image_height;
        if empty_source || (self.sample_mode.is_block_based() && exceeds) {
            return Err(PatternError::GridExceedsImage {
                grid_width: self.pixel_width,
                grid_height: self.pixel_height,
                image_width,
                image_height,
            });
        }
        Ok(())
    }
}

/// A generated pattern. Cells borrow from the palette they were matched against.
#[derive(Clone, Debug)]
pub struct Pattern<'p> {
    pub image: RgbaImage,
    pub cells: CellGrid<'p>,
    pub used_colors: Vec<UsedColor>,
}

pub fn generate<'p>(
    source: &RgbaImage,
    palette: &'p Palette,
    request: &PatternRequest,
) -> Result<Pattern<'p>> {
    let (image_w, image_h) = source.dimensions();
    request.validate(image_w, image_h)?;
    let matcher = PaletteMatcher::new(palette)?;

    let PatternRequest {
        pixel_width,
        pixel_height,
        sample_mode,
        exclude_edge,
        ..
    } = *request;

    tracing::debug!(
        image_w,
        image_h,
        pixel_width,
        pixel_height,
        mode = %sample_mode,
        exclude_edge,
        colors = palette.len(),
        "Generating pattern"
    );

    let resized;
    let (buffer, geometry) = if sample_mode.is_block_based() {
        (
            source,
            GridGeometry::blocks(image_w, image_h, pixel_width, pixel_height),
        )
    } else if (image_w, image_h) == (pixel_width, pixel_height) {
        (source, GridGeometry::unit())
    } else {
        resized = imageops::resize(source, pixel_width, pixel_height, FilterType::Triangle);
        (&resized, GridGeometry::unit())
    };

    let mut cells = Vec::with_capacity(pixel_width as usize * pixel_height as usize);
    for y in 0..pixel_height {
        for x in 0..pixel_width {
            let rgb = sample_mode.sample(buffer, geometry.region(x, y), exclude_edge);
            cells.push(matcher.match_color(rgb));
        }
    }
    let cells = CellGrid::from_cells(pixel_width, pixel_height, cells).ok_or(
        PatternError::InvalidGrid {
            width: pixel_width,
            height: pixel_height,
        },
    )?;

    let image = render(&cells, request.cell_size, request.show_grid)?;
    let used_colors = used_colors(&cells);
    tracing::debug!(used = used_colors.len(), "Pattern generated");

    Ok(Pattern {
        image,
        cells,
        used_colors,
    })
}

/// Grid height that keeps the source aspect ratio for a given width.
pub fn fit_height(pixel_width: u32, image_width: u32, image_height: u32) -> u32 {
    if image_width == 0 {
        return pixel_width.max(1);
    }
    let h = (pixel_width as f64 * image_height as f64 / image_width as f64).round();
    (h as u32).max(1)
}

/// Grid width that keeps the source aspect ratio for a given height.
pub fn fit_width(pixel_height: u32, image_width: u32, image_height: u32) -> u32 {
    fit_height(pixel_height, image_height, image_width)
}

/// A pattern rendered straight to PNG bytes, for hosts that only move bytes around.
#[derive(Clone, Debug)]
pub struct EncodedPattern {
    pub png: Vec<u8>,
    pub used_colors: Vec<UsedColor>,
    pub codes: Vec<Vec<String>>,
    pub skipped_rows: Vec<SkippedRow>,
}

/// Decode an image, load the color table, generate and encode as PNG.
///
/// `selected` restricts the palette to those codes; when empty the
/// A–M baseline subset is used.
pub fn generate_png(
    input: &[u8],
    color_table: &str,
    selected: &[String],
    request: &PatternRequest,
) -> Result<EncodedPattern> {
    let source = image::load_from_memory(input)?.to_rgba8();
    let table = parse_table(color_table, selection_filter(selected));
    let pattern = generate(&source, &table.palette, request)?;
    let png = encode_png(&pattern.image)?;

    Ok(EncodedPattern {
        png,
        codes: pattern.cells.codes(),
        used_colors: pattern.used_colors,
        skipped_rows: table.skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_table::PaletteEntry;
    use image::Rgba;
    use pretty_assertions::assert_eq;

    fn black_white() -> Palette {
        Palette::new(vec![
            PaletteEntry::new("A1", "#000000").unwrap(),
            PaletteEntry::new("B2", "#FFFFFF").unwrap(),
        ])
    }

    #[test]
    fn test_validate_rejects_zero_grid() {
        let request = PatternRequest {
            pixel_width: 0,
            ..PatternRequest::default()
        };
        assert!(matches!(
            request.validate(100, 100),
            Err(PatternError::InvalidGrid { .. })
        ));
    }

    #[test]
    fn test_validate_block_modes_need_enough_pixels() {
        let request = PatternRequest::default();
        assert!(matches!(
            request.validate(15, 100),
            Err(PatternError::GridExceedsImage { .. })
        ));
        let scaled = PatternRequest {
            sample_mode: SampleMode::Predownscaled,
            ..request
        };
        assert!(scaled.validate(15, 100).is_ok());
        assert!(scaled.validate(0, 100).is_err());
    }

    #[test]
    fn test_validate_overflow() {
        let request = PatternRequest {
            cell_size: u32::MAX,
            ..PatternRequest::default()
        };
        assert!(matches!(
            request.validate(1000, 1000),
            Err(PatternError::OutputTooLarge { .. })
        ));
    }

    #[test]
    fn test_empty_palette_fails_request() {
        let source = RgbaImage::from_pixel(16, 16, Rgba([1, 2, 3, 255]));
        let palette = Palette::default();
        let result = generate(&source, &palette, &PatternRequest::default());
        assert!(matches!(result, Err(PatternError::EmptyPalette)));
    }

    #[test]
    fn test_block_sampling_per_cell() {
        // Left half black, right half white, with a 1px remainder column.
        let mut source = RgbaImage::from_pixel(9, 4, Rgba([0, 0, 0, 255]));
        for y in 0..4 {
            for x in 4..9 {
                source.put_pixel(x, y, Rgba([250, 250, 250, 255]));
            }
        }
        let palette = black_white();
        let request = PatternRequest {
            pixel_width: 2,
            pixel_height: 1,
            cell_size: 4,
            show_grid: false,
            ..PatternRequest::default()
        };
        let pattern = generate(&source, &palette, &request).unwrap();
        assert_eq!(pattern.cells.codes(), vec![vec!["A1".to_string(), "B2".to_string()]]);
        assert_eq!(pattern.image.dimensions(), (8, 4));
    }

    #[test]
    fn test_predownscaled_resizes_source() {
        let source = RgbaImage::from_pixel(40, 20, Rgba([240, 240, 240, 255]));
        let palette = black_white();
        let request = PatternRequest {
            pixel_width: 4,
            pixel_height: 2,
            sample_mode: SampleMode::Predownscaled,
            ..PatternRequest::default()
        };
        let pattern = generate(&source, &palette, &request).unwrap();
        assert!(pattern.cells.iter().all(|e| e.code() == "B2"));
        assert_eq!(pattern.used_colors.len(), 1);
    }

    #[test]
    fn test_cells_reference_palette_entries() {
        let source = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let palette = black_white();
        let request = PatternRequest {
            pixel_width: 2,
            pixel_height: 2,
            ..PatternRequest::default()
        };
        let pattern = generate(&source, &palette, &request).unwrap();
        let cell = pattern.cells.get(1, 1).unwrap();
        assert!(std::ptr::eq(cell, &palette.entries()[0]));
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_height(16, 400, 300), 12);
        assert_eq!(fit_width(12, 400, 300), 16);
        assert_eq!(fit_height(1, 1000, 10), 1);
        assert_eq!(fit_height(5, 0, 10), 5);
    }
}
