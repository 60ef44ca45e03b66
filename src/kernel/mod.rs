//! Edge-model scoring kernels.
//!
//! A model is scored at a placement by averaging, over its edge points, the
//! cosine between the model gradient and the image gradient under that point.
//! The scan helpers evaluate a set of models over a window of placements.

/// Scan configuration for kernel evaluations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScanParams {
    /// Distance in pixels between evaluated placements along both axes.
    pub step: usize,
    /// Placements must score strictly above this value.
    pub min_score: f32,
    /// Pruning aggressiveness in `[0, 1]`.
    ///
    /// Unevaluated points are assumed to score `1 - greediness * (1 - min_score)`
    /// when bounding the final score. At 0 every remaining point is assumed to
    /// score a perfect 1, the classic early-termination bound, so pruning never
    /// drops a placement that would pass; at 1 a placement is dropped as soon as
    /// its running average falls below `min_score`.
    pub greediness: f32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            step: 1,
            min_score: 0.7,
            greediness: 0.8,
        }
    }
}

/// Half-open rectangle `[x0, x1) x [y0, y1)` of placements, in level coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScanWindow {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl ScanWindow {
    /// Every placement of a `width x height` level.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    /// A `size x size` square centered on `(cx, cy)`, clipped to the level.
    pub fn centered(cx: usize, cy: usize, size: usize, width: usize, height: usize) -> Self {
        let half = (size / 2) as isize;
        let clip = |start: isize, len: usize| -> (usize, usize) {
            let lo = start.clamp(0, len as isize) as usize;
            let hi = (start + size as isize).clamp(0, len as isize) as usize;
            (lo, hi.max(lo))
        };
        let (x0, x1) = clip(cx as isize - half, width);
        let (y0, y1) = clip(cy as isize - half, height);
        Self { x0, y0, x1, y1 }
    }

    /// Window width in placements.
    pub fn width(&self) -> usize {
        self.x1.saturating_sub(self.x0)
    }

    /// Window height in placements.
    pub fn height(&self) -> usize {
        self.y1.saturating_sub(self.y0)
    }

    /// True when the window contains no placement.
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub(crate) fn rows(&self, step: usize) -> impl Iterator<Item = usize> {
        (self.y0..self.y1).step_by(step.max(1))
    }

    pub(crate) fn cols(&self, step: usize) -> impl Iterator<Item = usize> {
        (self.x0..self.x1).step_by(step.max(1))
    }
}

pub mod scalar;

#[cfg(feature = "rayon")]
pub mod rayon;
