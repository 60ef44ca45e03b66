//! Convenience helpers for decoding and encoding images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::{EdgeMatchError, EdgeMatchResult};
use std::path::Path;

/// Creates a borrowed view from a grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> EdgeMatchResult<ImageView<'_, u8>> {
    let width = img.width() as usize;
    let height = img.height() as usize;
    ImageView::from_slice(img.as_raw(), width, height)
}

/// Creates an owned grayscale image from a dynamic image.
pub fn owned_from_dynamic_image(img: &image::DynamicImage) -> EdgeMatchResult<OwnedImage> {
    OwnedImage::from_gray_image(img.to_luma8())
}

/// Decodes an in-memory encoded image (PNG or JPEG) to grayscale.
pub fn decode_gray_image(bytes: &[u8]) -> EdgeMatchResult<OwnedImage> {
    let img = image::load_from_memory(bytes).map_err(|err| EdgeMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Loads an image from disk and converts it to a grayscale owned image.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> EdgeMatchResult<OwnedImage> {
    let img = image::open(path).map_err(|err| EdgeMatchError::ImageIo {
        reason: err.to_string(),
    })?;
    owned_from_dynamic_image(&img)
}

/// Encodes a grayscale view to disk; the format follows the file extension.
pub fn save_gray_image<P: AsRef<Path>>(path: P, img: ImageView<'_, u8>) -> EdgeMatchResult<()> {
    OwnedImage::from_view(img)
        .into_gray_image()
        .save(path)
        .map_err(|err| EdgeMatchError::ImageIo {
            reason: err.to_string(),
        })
}
