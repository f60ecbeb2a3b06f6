//! Bead pattern generation.
//!
//! Turns a photo into a fixed grid of cells, each painted with one color
//! from a table of standard bead/thread colors, and renders the grid with
//! color codes so it can be built by hand.
//!
//! Pipeline:
//! 1. Load the color table ([`color_table::parse_table`]).
//! 2. Sample one representative color per cell ([`SampleMode`]).
//! 3. Match each sample to the perceptually closest standard color in Lab
//!    space ([`PaletteMatcher`]).
//! 4. Render filled, labelled cells and optional grid lines ([`render::render`]).
//! 5. Collect the used colors in first-appearance order ([`usage::used_colors`]).
//!
//! [`generate`] runs steps 2–5; [`generate_png`] also decodes the input and
//! encodes the output, and backs both the browser binding below and the CLI.

use js_sys::{Array, Object, Reflect, Uint8Array};
use wasm_bindgen::prelude::*;

pub mod color;
pub mod color_table;
pub mod error;
mod glyphs;
pub mod grid;
pub mod matcher;
pub mod pipeline;
pub mod render;
pub mod sample;
pub mod usage;

pub use color::{LabColor, perceptual_distance, to_perceptual};
pub use color_table::{LoadedTable, Palette, PaletteEntry, default_subset, parse_table};
pub use error::{PatternError, Result};
pub use grid::CellGrid;
pub use matcher::PaletteMatcher;
pub use pipeline::{EncodedPattern, Pattern, PatternRequest, generate, generate_png};
pub use sample::{SampleMode, SampleRegion};
pub use usage::UsedColor;

/// Generate a bead pattern from encoded image bytes.
///
/// `color_table` is the CSV text of the standard color table and `selected`
/// an optional list of codes to restrict it to (A–M codes when omitted or
/// empty).
///
/// Returns `{ image: Uint8Array (PNG), usedColors: [{code, hex}], cells:
/// [[code]], skippedRows: number }`.
#[wasm_bindgen]
#[allow(clippy::too_many_arguments)]
pub fn generate_pattern(
    input: Vec<u8>,
    color_table: &str,
    pixel_width: u32,
    pixel_height: u32,
    cell_size: u32,
    sample_mode: &str,
    exclude_edge: bool,
    show_grid: bool,
    selected: Option<Array>,
) -> std::result::Result<Object, JsValue> {
    let to_js = |e: PatternError| JsValue::from_str(&e.to_string());

    let sample_mode: SampleMode = sample_mode.parse().map_err(to_js)?;
    let mut codes = Vec::new();
    if let Some(list) = selected {
        for val in list.iter() {
            let code = val
                .as_string()
                .ok_or_else(|| JsValue::from_str("Selected codes must be strings"))?;
            codes.push(code);
        }
    }

    let request = PatternRequest {
        pixel_width,
        pixel_height,
        cell_size,
        sample_mode,
        exclude_edge,
        show_grid,
    };
    let encoded = generate_png(&input, color_table, &codes, &request).map_err(to_js)?;

    let used_js = Array::new();
    for used in &encoded.used_colors {
        let entry = Object::new();
        Reflect::set(&entry, &JsValue::from_str("code"), &JsValue::from_str(&used.code))?;
        Reflect::set(&entry, &JsValue::from_str("hex"), &JsValue::from_str(&used.hex))?;
        used_js.push(&entry);
    }

    let cells_js = Array::new();
    for row in &encoded.codes {
        let row_js = Array::new();
        for code in row {
            row_js.push(&JsValue::from_str(code));
        }
        cells_js.push(&row_js);
    }

    let result = Object::new();
    Reflect::set(
        &result,
        &JsValue::from_str("image"),
        &Uint8Array::from(encoded.png.as_slice()),
    )?;
    Reflect::set(&result, &JsValue::from_str("usedColors"), &used_js)?;
    Reflect::set(&result, &JsValue::from_str("cells"), &cells_js)?;
    Reflect::set(
        &result,
        &JsValue::from_str("skippedRows"),
        &JsValue::from_f64(encoded.skipped_rows.len() as f64),
    )?;

    Ok(result)
}
