//! Rendering error types.

use thiserror::Error;

pub type RenderResult<T> = Result<T, RenderError>;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid font: {0}")]
    InvalidFont(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
