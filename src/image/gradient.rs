//! Sobel gradient fields.
//!
//! Derivatives come from `imageproc`'s 3x3 Sobel filters, which replicate
//! the border pixel. The field stores them together with the magnitude and
//! its reciprocal. The reciprocal is the normalization weight used by the
//! scoring kernel; it is zero wherever the magnitude is zero, so flat regions
//! contribute nothing instead of producing non-finite values.

use crate::image::{ImageView, OwnedImage};
use imageproc::gradients::{horizontal_sobel, vertical_sobel};

/// Gradient sample at a single pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GradientSample {
    /// Horizontal derivative.
    pub gx: f32,
    /// Vertical derivative.
    pub gy: f32,
    /// Euclidean magnitude of `(gx, gy)`.
    pub magnitude: f32,
    /// `1 / magnitude`, or 0 when the magnitude is 0.
    pub inv_magnitude: f32,
}

/// Dense gradient field of a grayscale image.
#[derive(Clone, Debug)]
pub struct GradientField {
    width: usize,
    height: usize,
    gx: Vec<f32>,
    gy: Vec<f32>,
    magnitude: Vec<f32>,
    inv_magnitude: Vec<f32>,
}

#[inline]
fn inverse_or_zero(value: f32) -> f32 {
    if value > 0.0 && value.is_finite() {
        1.0 / value
    } else {
        0.0
    }
}

impl GradientField {
    /// Computes 3x3 Sobel derivatives of `image`.
    pub fn sobel(image: ImageView<'_, u8>) -> Self {
        let width = image.width();
        let height = image.height();
        let gray = OwnedImage::from_view(image).into_gray_image();
        let gx: Vec<f32> = horizontal_sobel(&gray)
            .into_raw()
            .into_iter()
            .map(f32::from)
            .collect();
        let gy: Vec<f32> = vertical_sobel(&gray)
            .into_raw()
            .into_iter()
            .map(f32::from)
            .collect();

        let magnitude: Vec<f32> = gx.iter().zip(&gy).map(|(x, y)| x.hypot(*y)).collect();
        let inv_magnitude = magnitude.iter().copied().map(inverse_or_zero).collect();

        Self {
            width,
            height,
            gx,
            gy,
            magnitude,
            inv_magnitude,
        }
    }

    /// Returns the field width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns the field height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Row-major horizontal derivatives.
    pub fn gx(&self) -> &[f32] {
        &self.gx
    }

    /// Row-major vertical derivatives.
    pub fn gy(&self) -> &[f32] {
        &self.gy
    }

    /// Row-major gradient magnitudes.
    pub fn magnitude(&self) -> &[f32] {
        &self.magnitude
    }

    /// Row-major reciprocal magnitudes (0 where there is no gradient).
    pub fn inv_magnitude(&self) -> &[f32] {
        &self.inv_magnitude
    }

    /// Returns the sample at `(x, y)` if it is within bounds.
    pub fn at(&self, x: usize, y: usize) -> Option<GradientSample> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y * self.width + x;
        Some(GradientSample {
            gx: self.gx[idx],
            gy: self.gy[idx],
            magnitude: self.magnitude[idx],
            inv_magnitude: self.inv_magnitude[idx],
        })
    }

    /// Gradient direction in radians, `atan2(gy, gx)`.
    pub fn orientation_at(&self, x: usize, y: usize) -> Option<f32> {
        self.at(x, y).map(|s| s.gy.atan2(s.gx))
    }
}
