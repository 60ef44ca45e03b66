//! Geometric transforms applied to the reference image before edge sampling.

use crate::image::{ImageView, OwnedImage};
use image::imageops::FilterType;
use image::Luma;
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

/// Rotates a grayscale image about its center using bilinear sampling.
///
/// Positive angles rotate counter-clockwise as displayed (y axis pointing
/// down) about `(w / 2, h / 2)`. Pixels whose pre-image falls outside the
/// source are set to `fill`. The output keeps the input dimensions. An angle
/// that is a whole number of turns returns an exact copy.
pub fn rotate_u8_bilinear(src: ImageView<'_, u8>, angle_deg: f32, fill: u8) -> OwnedImage {
    let owned = OwnedImage::from_view(src);
    if angle_deg % 360.0 == 0.0 {
        return owned;
    }
    let (width, height) = (owned.width(), owned.height());
    // imageproc rotates clockwise for positive angles.
    let rotated = rotate_about_center(
        &owned.into_gray_image(),
        -angle_deg.to_radians(),
        Interpolation::Bilinear,
        Luma([fill]),
    );
    OwnedImage::from_raw_parts(rotated.into_raw(), width, height)
}

/// Output size of a uniform rescale, rounded to the nearest pixel.
///
/// Returns `None` when either side would collapse to zero.
pub fn scaled_size(width: usize, height: usize, scale: f32) -> Option<(usize, usize)> {
    let w = (width as f32 * scale).round();
    let h = (height as f32 * scale).round();
    if !w.is_finite() || !h.is_finite() || w < 1.0 || h < 1.0 {
        return None;
    }
    Some((w as usize, h as usize))
}

/// Uniformly rescales a grayscale image with bilinear (triangle) filtering.
///
/// Returns `None` for scales that collapse the image. A scale that keeps the
/// size unchanged returns an exact copy.
pub fn resize_u8_bilinear(src: ImageView<'_, u8>, scale: f32) -> Option<OwnedImage> {
    let (width, height) = scaled_size(src.width(), src.height(), scale)?;
    let owned = OwnedImage::from_view(src);
    if width == owned.width() && height == owned.height() {
        return Some(owned);
    }
    let resized = image::imageops::resize(
        &owned.into_gray_image(),
        width as u32,
        height as u32,
        FilterType::Triangle,
    );
    OwnedImage::from_gray_image(resized).ok()
}
