use palette::Srgb;

use crate::color::{LabColor, perceptual_distance, to_perceptual};
use crate::color_table::{Palette, PaletteEntry};
use crate::error::{PatternError, Result};

/// Nearest-color lookup against a palette pre-converted to Lab.
///
/// Linear scan; an entry replaces the current best only when strictly
/// closer, so on exact ties the entry that comes first in the palette wins.
pub struct PaletteMatcher<'p> {
    entries: Vec<(&'p PaletteEntry, LabColor)>,
}

impl<'p> PaletteMatcher<'p> {
    pub fn new(palette: &'p Palette) -> Result<Self> {
        if palette.is_empty() {
            return Err(PatternError::EmptyPalette);
        }
        let entries = palette
            .entries()
            .iter()
            .map(|entry| (entry, to_perceptual(entry.rgb())))
            .collect();
        Ok(Self { entries })
    }

    pub fn match_color(&self, rgb: Srgb<u8>) -> &'p PaletteEntry {
        self.match_lab(to_perceptual(rgb)).0
    }

    /// Closest entry and its distance.
    pub fn match_lab(&self, lab: LabColor) -> (&'p PaletteEntry, f32) {
        let (mut best, best_lab) = self.entries[0];
        let mut best_dist = perceptual_distance(lab, best_lab);

        for &(entry, entry_lab) in &self.entries[1..] {
            let dist = perceptual_distance(lab, entry_lab);
            if dist < best_dist {
                best_dist = dist;
                best = entry;
            }
        }

        (best, best_dist)
    }
}
