use thiserror::Error;

/// Errors surfaced by the synthesis and cost-map stages.
///
/// Every stage is a pure function of its inputs, so these always indicate a
/// caller or input error; nothing here is retryable.
#[derive(Debug, Error, PartialEq)]
pub enum TerrainError {
    #[error("grid must be non-empty, got {width}×{height}")]
    EmptyGrid { width: usize, height: usize },

    #[error("grid data has {actual} cells, expected {width}×{height}")]
    DataLength { width: usize, height: usize, actual: usize },

    #[error("image is {image_width}×{image_height} but label is {label_width}×{label_height}")]
    ShapeMismatch {
        image_width: u32,
        image_height: u32,
        label_width: u32,
        label_height: u32,
    },

    #[error("blur kernel size must be odd and positive, got {0}")]
    InvalidKernel(usize),

    #[error("invalid render options: {0}")]
    InvalidRender(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid class registry: {0}")]
    InvalidRegistry(String),

    #[error("unknown terrain style `{0}` (expected desert, rocky, mixed or composite)")]
    UnknownStyle(String),
}

pub type Result<T> = std::result::Result<T, TerrainError>;
