//! Profile-photo preparation.
//!
//! Uploaded images are decoded, downscaled so the longest edge fits
//! [`MAX_PHOTO_DIMENSION`], re-encoded as JPEG at a fixed quality, and
//! stored as base64 text. The bound keeps any single photo document well
//! under the store's per-document quota.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_PHOTO_DIMENSION, PHOTO_JPEG_QUALITY};
use crate::error::PhotoError;

/// A photo ready for persistence: JPEG bytes as base64 plus the BLAKE3
/// content hash and final dimensions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EncodedPhoto {
    /// BLAKE3 hash of the encoded JPEG bytes (hex).
    pub hash: String,
    pub data_base64: String,
    pub width: u32,
    pub height: u32,
}

/// Decode, bound, re-encode and base64 a raw uploaded image.
pub fn prepare_photo(bytes: &[u8]) -> Result<EncodedPhoto, PhotoError> {
    let img = image::load_from_memory(bytes).map_err(PhotoError::Decode)?;

    let img = bound_dimensions(img, MAX_PHOTO_DIMENSION);
    let (width, height) = (img.width(), img.height());

    // JPEG has no alpha channel; flatten before encoding.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());

    let mut jpeg = Vec::new();
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, PHOTO_JPEG_QUALITY);
    rgb.write_with_encoder(encoder).map_err(PhotoError::Encode)?;

    Ok(EncodedPhoto {
        hash: hex::encode(blake3::hash(&jpeg).as_bytes()),
        data_base64: BASE64.encode(&jpeg),
        width,
        height,
    })
}

/// Downscale only; images already inside the bound are left untouched.
fn bound_dimensions(img: DynamicImage, max_edge: u32) -> DynamicImage {
    if img.width() <= max_edge && img.height() <= max_edge {
        return img;
    }
    img.resize(max_edge, max_edge, FilterType::Lanczos3)
}

/// Decode a stored photo back to raw JPEG bytes.
pub fn decode_photo(photo: &EncodedPhoto) -> Option<Vec<u8>> {
    BASE64.decode(&photo.data_base64).ok()
}
