use crate::color_table::PaletteEntry;

/// Matched colors for every cell, row-major. Cells borrow their entry from
/// the palette the grid was matched against.
#[derive(Clone, Debug, PartialEq)]
pub struct CellGrid<'p> {
    width: u32,
    height: u32,
    cells: Vec<&'p PaletteEntry>,
}

impl<'p> CellGrid<'p> {
    /// Returns `None` unless `cells.len() == width * height`.
    pub fn from_cells(width: u32, height: u32, cells: Vec<&'p PaletteEntry>) -> Option<Self> {
        if cells.len() as u64 != width as u64 * height as u64 {
            return None;
        }
        Some(Self {
            width,
            height,
            cells,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&'p PaletteEntry> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.cells[(y * self.width + x) as usize])
    }

    /// Cells in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = &'p PaletteEntry> + '_ {
        self.cells.iter().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[&'p PaletteEntry]> {
        self.cells.chunks(self.width.max(1) as usize)
    }

    /// Codes per row, for display or serialization.
    pub fn codes(&self) -> Vec<Vec<String>> {
        self.rows()
            .map(|row| row.iter().map(|e| e.code().to_string()).collect())
            .collect()
    }
}
