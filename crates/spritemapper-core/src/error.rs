use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpriteMapperError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    /// A sprite could not be placed on an otherwise empty page, even rotated.
    #[error("No free space found for sprite '{name}' ({width}x{height}) on page {page}")]
    NoFreeSpace {
        name: String,
        width: u32,
        height: u32,
        page: usize,
    },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Unsupported algorithm: {0}")]
    UnknownAlgorithm(String),
    #[error("No layout could place {total} sprites within the configured page size")]
    OutOfSpace { total: usize },
    #[error("Nothing to pack")]
    Empty,
}

pub type Result<T> = std::result::Result<T, SpriteMapperError>;
