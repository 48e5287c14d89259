use thiserror::Error;

/// Errors produced while preparing a photo for storage.
#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Image decode failed: {0}")]
    Decode(image::ImageError),

    #[error("Image encode failed: {0}")]
    Encode(image::ImageError),
}
