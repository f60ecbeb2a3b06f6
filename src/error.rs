use thiserror::Error;

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Palette is empty")]
    EmptyPalette,

    #[error("Grid dimensions must be at least 1x1, got {width}x{height}")]
    InvalidGrid { width: u32, height: u32 },

    #[error("Cell size must be at least 1 pixel")]
    InvalidCellSize,

    #[error("Grid {grid_width}x{grid_height} exceeds source image {image_width}x{image_height}")]
    GridExceedsImage {
        grid_width: u32,
        grid_height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Output image too large: {width} cells x {height} cells at {cell_size}px")]
    OutputTooLarge {
        width: u32,
        height: u32,
        cell_size: u32,
    },

    #[error("Invalid hex color: {0:?}")]
    InvalidHex(String),

    #[error("Unknown sample mode: {0:?}")]
    UnknownSampleMode(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PatternError>;
