//! Standard-color table loading.
//!
//! The table is plain comma-separated text: a header row, then one
//! `code,hex` row per color. Rows that cannot be used are skipped and
//! reported instead of silently dropped.

use std::collections::HashSet;

use palette::Srgb;

use crate::color::{parse_hex, to_hex};
use crate::error::{PatternError, Result};

/// One standard color: a symbolic code and its sRGB value.
#[derive(Clone, Debug, PartialEq)]
pub struct PaletteEntry {
    code: String,
    hex: String,
    rgb: Srgb<u8>,
}

impl PaletteEntry {
    /// Build an entry from a code and a `#RRGGBB` / `RRGGBB` string.
    pub fn new(code: impl Into<String>, hex: &str) -> Result<Self> {
        let code = code.into();
        let rgb = parse_hex(hex).ok_or_else(|| PatternError::InvalidHex(hex.to_string()))?;
        Ok(Self {
            code,
            hex: to_hex(rgb),
            rgb,
        })
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    /// Uppercase `#RRGGBB`.
    pub fn hex(&self) -> &str {
        &self.hex
    }

    pub fn rgb(&self) -> Srgb<u8> {
        self.rgb
    }
}

/// Ordered list of standard colors. Order decides ties when matching.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    pub fn new(entries: Vec<PaletteEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, code: &str) -> Option<&PaletteEntry> {
        self.entries.iter().find(|e| e.code == code)
    }
}

/// Why a table row was not loaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    MissingField,
    InvalidHex(String),
    DuplicateCode(String),
}

/// A row that was dropped during loading. `line` is 1-based and counts the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
}

/// Result of loading a table: the palette plus everything that was skipped.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadedTable {
    pub palette: Palette,
    pub skipped: Vec<SkippedRow>,
}

/// The baseline subset: codes starting with a letter from A to M.
pub fn default_subset(code: &str) -> bool {
    code.chars()
        .next()
        .is_some_and(|c| matches!(c.to_ascii_uppercase(), 'A'..='M'))
}

/// Keep exactly the selected codes, or the baseline subset when nothing is selected.
pub fn selection_filter(selected: &[String]) -> impl Fn(&str) -> bool + '_ {
    let set: HashSet<&str> = selected.iter().map(|s| s.trim()).collect();
    move |code: &str| {
        if set.is_empty() {
            default_subset(code)
        } else {
            set.contains(code)
        }
    }
}

/// Load `(code, hex)` rows. The first row is treated as a header and
/// fully blank rows are ignored.
pub fn load_rows<I, S, F>(rows: I, include: F) -> LoadedTable
where
    I: IntoIterator<Item = (S, S)>,
    S: AsRef<str>,
    F: Fn(&str) -> bool,
{
    let mut loaded = LoadedTable::default();
    let mut seen: HashSet<String> = HashSet::new();

    for (idx, (code, hex)) in rows.into_iter().enumerate().skip(1) {
        let line = idx + 1;
        let code = code.as_ref().trim();
        let hex = hex.as_ref().trim();

        if code.is_empty() && hex.is_empty() {
            continue;
        }
        if code.is_empty() || hex.is_empty() {
            tracing::warn!(line, "Skipping color table row with missing field");
            loaded.skipped.push(SkippedRow {
                line,
                reason: SkipReason::MissingField,
            });
            continue;
        }

        let entry = match PaletteEntry::new(code, hex) {
            Ok(entry) => entry,
            Err(_) => {
                tracing::warn!(line, code, hex, "Skipping color table row with invalid hex");
                loaded.skipped.push(SkippedRow {
                    line,
                    reason: SkipReason::InvalidHex(hex.to_string()),
                });
                continue;
            }
        };

        if !include(code) {
            continue;
        }

        if !seen.insert(code.to_string()) {
            tracing::warn!(line, code, "Skipping duplicate color code");
            loaded.skipped.push(SkippedRow {
                line,
                reason: SkipReason::DuplicateCode(code.to_string()),
            });
            continue;
        }

        loaded.palette.entries.push(entry);
    }

    tracing::debug!(
        colors = loaded.palette.len(),
        skipped = loaded.skipped.len(),
        "Loaded color table"
    );
    loaded
}

/// Parse comma-separated table text. Columns past the second are ignored.
pub fn parse_table<F>(text: &str, include: F) -> LoadedTable
where
    F: Fn(&str) -> bool,
{
    let text = text.trim_start_matches('\u{feff}');
    let rows = text.lines().map(|line| {
        let mut fields = line.split(',');
        let code = fields.next().unwrap_or("");
        let hex = fields.next().unwrap_or("");
        (code, hex)
    });
    load_rows(rows, include)
}
