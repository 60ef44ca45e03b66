//! Transforms and edge sampling applied to the reference during training.

use crate::image::{ImageView, OwnedImage};

pub mod edges;
pub mod rotate;

pub use edges::{detect_edges, sample_edge_points, SampledPoint};

/// Rescales then rotates an image about its center.
///
/// This is the exact pixel pipeline used to build every template model, so
/// callers can synthesize targets that match a model bit for bit. Returns
/// `None` when the scale collapses the image.
pub fn transform_u8(
    src: ImageView<'_, u8>,
    scale: f32,
    angle_deg: f32,
    fill: u8,
) -> Option<OwnedImage> {
    let scaled = rotate::resize_u8_bilinear(src, scale)?;
    Some(rotate::rotate_u8_bilinear(scaled.view(), angle_deg, fill))
}
