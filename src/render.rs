//! Pattern rasterization.
//!
//! Every cell becomes a `cell_size` square filled with its matched color and
//! labelled with the color code. Grid lines go on last, over all fills and
//! labels, so they are never painted over.

use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};

use crate::color_table::PaletteEntry;
use crate::error::{PatternError, Result};
use crate::glyphs::{GLYPH_HEIGHT, GLYPH_WIDTH, glyph};
use crate::grid::CellGrid;

pub const LABEL_COLOR: Rgba<u8> = Rgba([0x22, 0x22, 0x22, 0xFF]);
pub const GRID_COLOR: Rgba<u8> = Rgba([0x88, 0x88, 0x88, 0xFF]);

/// Glyph plus one column of bold overhang plus one column of spacing.
const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 2;

/// Render `grid` to an image of exactly `width * cell_size` by `height * cell_size`.
pub fn render(grid: &CellGrid<'_>, cell_size: u32, show_grid: bool) -> Result<RgbaImage> {
    if cell_size == 0 {
        return Err(PatternError::InvalidCellSize);
    }
    let too_large = || PatternError::OutputTooLarge {
        width: grid.width(),
        height: grid.height(),
        cell_size,
    };
    let out_w = grid.width().checked_mul(cell_size).ok_or_else(too_large)?;
    let out_h = grid.height().checked_mul(cell_size).ok_or_else(too_large)?;

    let mut img = RgbaImage::new(out_w, out_h);

    for (y, row) in grid.rows().enumerate() {
        for (x, entry) in row.iter().enumerate() {
            let x0 = x as u32 * cell_size;
            let y0 = y as u32 * cell_size;
            fill_cell(&mut img, x0, y0, cell_size, entry);
            draw_label(&mut img, entry.code(), x0, y0, cell_size);
        }
    }

    if show_grid {
        draw_grid_lines(&mut img, grid.width(), grid.height(), cell_size);
    }

    tracing::debug!(width = out_w, height = out_h, show_grid, "Rendered pattern");
    Ok(img)
}

fn fill_cell(img: &mut RgbaImage, x0: u32, y0: u32, cell_size: u32, entry: &PaletteEntry) {
    let rgb = entry.rgb();
    let color = Rgba([rgb.red, rgb.green, rgb.blue, 0xFF]);
    for y in y0..y0 + cell_size {
        for x in x0..x0 + cell_size {
            img.put_pixel(x, y, color);
        }
    }
}

/// Largest integer scale at which the label fits inside the cell with a
/// one-pixel border, capped at half the cell height. Never below 1.
fn label_scale(text_width: u32, cell_size: u32) -> u32 {
    let by_width = cell_size.saturating_sub(2) / text_width.max(1);
    let by_height = cell_size / (2 * GLYPH_HEIGHT);
    by_width.min(by_height).max(1)
}

/// Draw `text` centered in the cell, clipped to the cell.
fn draw_label(img: &mut RgbaImage, text: &str, x0: u32, y0: u32, cell_size: u32) {
    let len = text.chars().count() as u32;
    if len == 0 {
        return;
    }
    let text_width = len * GLYPH_ADVANCE - 1;
    let scale = label_scale(text_width, cell_size);

    let origin_x = x0 as i64 + (cell_size as i64 - (text_width * scale) as i64) / 2;
    let origin_y = y0 as i64 + (cell_size as i64 - (GLYPH_HEIGHT * scale) as i64) / 2;
    let clip_x = x0 as i64..(x0 + cell_size) as i64;
    let clip_y = y0 as i64..(y0 + cell_size) as i64;

    for (i, c) in text.chars().enumerate() {
        let Some(rows) = glyph(c) else {
            continue;
        };
        let glyph_x = origin_x + (i as u32 * GLYPH_ADVANCE * scale) as i64;
        for (row, &bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                // Bold: each lit column also lights the one to its right.
                let px = glyph_x + (col * scale) as i64;
                let py = origin_y + (row as u32 * scale) as i64;
                for y in py..py + scale as i64 {
                    for x in px..px + 2 * scale as i64 {
                        if clip_x.contains(&x) && clip_y.contains(&y) {
                            img.put_pixel(x as u32, y as u32, LABEL_COLOR);
                        }
                    }
                }
            }
        }
    }
}

/// One-pixel lines on every cell boundary. The far boundary of each axis
/// lands on the last pixel column/row.
fn draw_grid_lines(img: &mut RgbaImage, width: u32, height: u32, cell_size: u32) {
    let (out_w, out_h) = img.dimensions();
    if out_w == 0 || out_h == 0 {
        return;
    }

    for i in 0..=width {
        let x = (i * cell_size).min(out_w - 1);
        for y in 0..out_h {
            img.put_pixel(x, y, GRID_COLOR);
        }
    }
    for j in 0..=height {
        let y = (j * cell_size).min(out_h - 1);
        for x in 0..out_w {
            img.put_pixel(x, y, GRID_COLOR);
        }
    }
}

/// Encode as PNG.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries() -> (PaletteEntry, PaletteEntry) {
        (
            PaletteEntry::new("A1", "#FF0000").unwrap(),
            PaletteEntry::new("B2", "#0000FF").unwrap(),
        )
    }

    #[test]
    fn test_output_dimensions() {
        let (a, b) = entries();
        let grid = CellGrid::from_cells(3, 2, vec![&a, &b, &a, &b, &a, &b]).unwrap();
        let img = render(&grid, 7, false).unwrap();
        assert_eq!(img.dimensions(), (21, 14));
    }

    #[test]
    fn test_grid_lines_drawn() {
        let (a, b) = entries();
        let grid = CellGrid::from_cells(2, 2, vec![&a, &b, &b, &a]).unwrap();
        let img = render(&grid, 10, true).unwrap();
        assert_eq!(img.dimensions(), (20, 20));
        let fills = [Rgba([0xFF, 0, 0, 0xFF]), Rgba([0, 0, 0xFF, 0xFF])];
        for i in 0..20 {
            assert!(!fills.contains(img.get_pixel(10, i)));
            assert!(!fills.contains(img.get_pixel(i, 10)));
            assert_eq!(*img.get_pixel(0, i), GRID_COLOR);
            assert_eq!(*img.get_pixel(19, i), GRID_COLOR);
        }
    }

    #[test]
    fn test_no_grid_lines() {
        let (a, _) = entries();
        let grid = CellGrid::from_cells(2, 1, vec![&a, &a]).unwrap();
        let img = render(&grid, 24, false).unwrap();
        assert!(img.pixels().all(|p| *p != GRID_COLOR));
        assert_eq!(*img.get_pixel(0, 0), Rgba([0xFF, 0, 0, 0xFF]));
        assert_eq!(*img.get_pixel(24, 23), Rgba([0xFF, 0, 0, 0xFF]));
    }

    #[test]
    fn test_label_centered_in_cell() {
        let (a, _) = entries();
        let grid = CellGrid::from_cells(1, 1, vec![&a]).unwrap();
        let img = render(&grid, 24, false).unwrap();
        // "A1" is 13px wide and 7px tall at scale 1, so it starts at (5, 8);
        // the top row of 'A' lights columns 1..=3 plus the bold overhang.
        for x in 6..=9 {
            assert_eq!(*img.get_pixel(x, 8), LABEL_COLOR);
        }
        assert_eq!(*img.get_pixel(5, 8), Rgba([0xFF, 0, 0, 0xFF]));
        assert_eq!(*img.get_pixel(0, 0), Rgba([0xFF, 0, 0, 0xFF]));
    }

    #[test]
    fn test_label_clipped_to_cell() {
        let long = PaletteEntry::new("ABCDEFGH", "#00FF00").unwrap();
        let other = PaletteEntry::new("Z", "#FFFF00").unwrap();
        let grid = CellGrid::from_cells(2, 1, vec![&long, &other]).unwrap();
        let img = render(&grid, 8, false).unwrap();
        for y in 0..8 {
            for x in 8..16 {
                let p = *img.get_pixel(x, y);
                assert!(p == Rgba([0xFF, 0xFF, 0, 0xFF]) || p == LABEL_COLOR);
            }
        }
    }

    #[test]
    fn test_label_scale() {
        assert_eq!(label_scale(13, 24), 1);
        assert_eq!(label_scale(13, 48), 3);
        assert_eq!(label_scale(13, 4), 1);
    }

    #[test]
    fn test_zero_cell_size_rejected() {
        let (a, _) = entries();
        let grid = CellGrid::from_cells(1, 1, vec![&a]).unwrap();
        assert!(matches!(render(&grid, 0, true), Err(PatternError::InvalidCellSize)));
    }

    #[test]
    fn test_encode_png_signature() {
        let img = RgbaImage::from_pixel(2, 2, GRID_COLOR);
        let png = encode_png(&img).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
