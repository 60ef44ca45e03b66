//! Gaussian image pyramid for grayscale `u8` images.
//!
//! Each level is blurred with the separable 5-tap binomial kernel
//! `[1 4 6 4 1] / 16` and decimated by two, giving a level of size
//! `((w + 1) / 2, (h + 1) / 2)`. Borders are mirrored without repeating the
//! edge sample. Arithmetic is integer-only with round-half-up, so pyramids of
//! the same input are bit-identical across runs and platforms.

use crate::image::{ImageView, OwnedImage};
use crate::util::math::reflect101;
use crate::util::EdgeMatchResult;

const TAPS: [u32; 5] = [1, 4, 6, 4, 1];

/// Downsamples one level with the 5x5 Gaussian kernel.
pub fn pyr_down(src: ImageView<'_, u8>) -> OwnedImage {
    let src_w = src.width();
    let src_h = src.height();
    let dst_w = src_w.div_ceil(2);
    let dst_h = src_h.div_ceil(2);

    // Horizontal pass over every source row, decimated in x.
    let mut horiz = vec![0u32; dst_w * src_h];
    for y in 0..src_h {
        let Some(row) = src.row(y) else { continue };
        let out = &mut horiz[y * dst_w..(y + 1) * dst_w];
        for (dx, slot) in out.iter_mut().enumerate() {
            let cx = (2 * dx) as isize;
            let mut acc = 0u32;
            for (k, &w) in TAPS.iter().enumerate() {
                let sx = reflect101(cx + k as isize - 2, src_w);
                acc += w * u32::from(row[sx]);
            }
            *slot = acc;
        }
    }

    // Vertical pass, decimated in y.
    let mut dst = vec![0u8; dst_w * dst_h];
    for dy in 0..dst_h {
        let cy = (2 * dy) as isize;
        for dx in 0..dst_w {
            let mut acc = 0u32;
            for (k, &w) in TAPS.iter().enumerate() {
                let sy = reflect101(cy + k as isize - 2, src_h);
                acc += w * horiz[sy * dst_w + dx];
            }
            dst[dy * dst_w + dx] = ((acc + 128) >> 8) as u8;
        }
    }

    OwnedImage::from_raw_parts(dst, dst_w, dst_h)
}

/// Owned image pyramid built from a base level.
#[derive(Clone, Debug)]
pub struct ImagePyramid {
    levels: Vec<OwnedImage>,
}

impl ImagePyramid {
    /// Builds a pyramid with exactly `max(levels, 1)` levels.
    ///
    /// Level 0 is a contiguous copy of `base`. A 1x1 level downsamples to 1x1,
    /// so small inputs still yield the requested depth.
    pub fn build_u8(base: ImageView<'_, u8>, levels: usize) -> EdgeMatchResult<Self> {
        let levels = levels.max(1);
        let mut out = Vec::with_capacity(levels);
        out.push(OwnedImage::from_view(base));
        while out.len() < levels {
            let next = match out.last() {
                Some(prev) => pyr_down(prev.view()),
                None => break,
            };
            out.push(next);
        }
        Ok(Self { levels: out })
    }

    /// Returns all pyramid levels (level 0 is the base resolution).
    pub fn levels(&self) -> &[OwnedImage] {
        &self.levels
    }

    /// Returns the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Always false; a pyramid holds at least the base level.
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Returns a view for a specific pyramid level.
    pub fn level(&self, index: usize) -> Option<ImageView<'_, u8>> {
        self.levels.get(index).map(|level| level.view())
    }

    /// Consumes the pyramid and returns its levels.
    pub fn into_levels(self) -> Vec<OwnedImage> {
        self.levels
    }
}
