//! Bill of materials: which standard colors a pattern uses.

use std::collections::{BTreeMap, HashSet};
use std::io::Write;

use serde::Serialize;

use crate::error::Result;
use crate::grid::CellGrid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UsedColor {
    pub code: String,
    pub hex: String,
}

/// Unique colors in the order they first appear, scanning rows top to bottom.
pub fn used_colors(grid: &CellGrid<'_>) -> Vec<UsedColor> {
    let mut seen = HashSet::new();
    grid.iter()
        .filter(|&entry| seen.insert(entry.code()))
        .map(|entry| UsedColor {
            code: entry.code().to_string(),
            hex: entry.hex().to_string(),
        })
        .collect()
}

/// Write the colors as CSV sorted by code, one row per code, with a header.
pub fn write_csv<W: Write>(colors: &[UsedColor], mut out: W) -> Result<()> {
    let by_code: BTreeMap<&str, &str> = colors
        .iter()
        .map(|c| (c.code.as_str(), c.hex.as_str()))
        .collect();

    writeln!(out, "code,hexColor")?;
    for (code, hex) in by_code {
        writeln!(out, "{code},{hex}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color_table::PaletteEntry;
    use pretty_assertions::assert_eq;

    fn used(code: &str, hex: &str) -> UsedColor {
        UsedColor {
            code: code.to_string(),
            hex: hex.to_string(),
        }
    }

    #[test]
    fn test_first_occurrence_order() {
        let a = PaletteEntry::new("A1", "#000000").unwrap();
        let b = PaletteEntry::new("B2", "#FFFFFF").unwrap();
        let c = PaletteEntry::new("C3", "#FF0000").unwrap();
        let grid = CellGrid::from_cells(3, 2, vec![&b, &b, &a, &c, &a, &b]).unwrap();
        assert_eq!(
            used_colors(&grid),
            vec![used("B2", "#FFFFFF"), used("A1", "#000000"), used("C3", "#FF0000")]
        );
    }

    #[test]
    fn test_csv_sorted_and_deduplicated() {
        let colors = vec![
            used("M2", "#222222"),
            used("A10", "#101010"),
            used("A2", "#020202"),
            used("M2", "#222222"),
        ];
        let mut buf = Vec::new();
        write_csv(&colors, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "code,hexColor\nA10,#101010\nA2,#020202\nM2,#222222\n"
        );
    }
}
