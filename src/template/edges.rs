//! Edge detection and edge point sampling.
//!
//! Edges come from Canny hysteresis thresholding; the sampler then walks the
//! contours of the binary edge map and attaches the Sobel gradient of the
//! underlying image to every contour pixel.

use crate::image::gradient::GradientField;
use crate::image::{ImageView, OwnedImage};
use crate::util::{EdgeMatchError, EdgeMatchResult};
use imageproc::contours::find_contours;

/// Default lower Canny threshold.
pub const CANNY_LOW: f32 = 100.0;
/// Default upper Canny threshold.
pub const CANNY_HIGH: f32 = 200.0;

/// A contour pixel with the gradient sampled at that pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SampledPoint {
    /// Column of the edge pixel.
    pub x: usize,
    /// Row of the edge pixel.
    pub y: usize,
    /// Horizontal derivative at the pixel.
    pub dx: f32,
    /// Vertical derivative at the pixel.
    pub dy: f32,
    /// `1 / |(dx, dy)|`, or 0 for a vanishing gradient.
    pub weight: f32,
}

/// Runs Canny edge detection and returns a binary (0/255) edge map.
///
/// Images smaller than 3x3 have no interior and produce an empty map.
pub fn detect_edges(image: ImageView<'_, u8>, low: f32, high: f32) -> OwnedImage {
    let width = image.width();
    let height = image.height();
    if width < 3 || height < 3 {
        return OwnedImage::from_raw_parts(vec![0; width * height], width, height);
    }
    let gray = OwnedImage::from_view(image).into_gray_image();
    let edges = imageproc::edges::canny(&gray, low, high);
    OwnedImage::from_raw_parts(edges.into_raw(), width, height)
}

/// Collects every foreground pixel of the edge map exactly once.
///
/// Contours are retrieved as a flat list without approximation; a thin edge
/// is traced by both its outer and hole border, so a visited mask keeps the
/// first occurrence only. Output order is contour order, then trace order,
/// followed by any untraced foreground pixels in raster order.
pub fn sample_edge_points(
    edges: ImageView<'_, u8>,
    field: &GradientField,
) -> EdgeMatchResult<Vec<SampledPoint>> {
    let width = edges.width();
    let height = edges.height();
    if field.width() != width || field.height() != height {
        return Err(EdgeMatchError::InvalidDimensions {
            width: field.width(),
            height: field.height(),
        });
    }

    let gray = OwnedImage::from_view(edges).into_gray_image();
    let contours = find_contours::<i32>(&gray);

    let gx = field.gx();
    let gy = field.gy();
    let inv = field.inv_magnitude();
    let mut visited = vec![false; width * height];
    let mut points = Vec::new();
    for contour in &contours {
        for pt in &contour.points {
            if pt.x < 0 || pt.y < 0 {
                continue;
            }
            let (x, y) = (pt.x as usize, pt.y as usize);
            if x >= width || y >= height {
                continue;
            }
            let idx = y * width + x;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;
            points.push(SampledPoint {
                x,
                y,
                dx: gx[idx],
                dy: gy[idx],
                weight: inv[idx],
            });
        }
    }

    // Pixels of clumps thicker than one pixel can be interior to every border.
    for y in 0..height {
        let Some(row) = edges.row(y) else { continue };
        for (x, &value) in row.iter().enumerate() {
            let idx = y * width + x;
            if value != 0 && !visited[idx] {
                visited[idx] = true;
                points.push(SampledPoint {
                    x,
                    y,
                    dx: gx[idx],
                    dy: gy[idx],
                    weight: inv[idx],
                });
            }
        }
    }

    Ok(points)
}
