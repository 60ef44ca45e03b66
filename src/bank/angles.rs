//! Angle grid generation for rotation sweeps.

use crate::util::math::wrap_deg;
use crate::util::{EdgeMatchError, EdgeMatchResult};

/// Discrete angle grid in degrees over `[min_deg, max_deg)`.
#[derive(Clone, Debug)]
pub struct AngleGrid {
    min_deg: f32,
    max_deg: f32,
    step_deg: f32,
    len: usize,
}

impl AngleGrid {
    /// Creates a full grid over [-180, 180).
    pub fn full(step_deg: f32) -> EdgeMatchResult<Self> {
        Self::new(-180.0, 180.0, step_deg)
    }

    /// Creates a grid over `[min_deg, max_deg)` with a positive step.
    pub fn new(min_deg: f32, max_deg: f32, step_deg: f32) -> EdgeMatchResult<Self> {
        if !min_deg.is_finite() || !max_deg.is_finite() || !step_deg.is_finite() {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "non-finite angle grid parameters",
            });
        }
        if step_deg <= 0.0 {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "angle step must be > 0",
            });
        }
        if max_deg <= min_deg {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "max angle must be greater than min angle",
            });
        }

        let mut len = 0usize;
        while min_deg + (len as f32) * step_deg < max_deg {
            len += 1;
        }

        Ok(Self {
            min_deg,
            max_deg,
            step_deg,
            len,
        })
    }

    /// Returns the number of discrete angles in the grid.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the grid has no angles.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the minimum angle in degrees (inclusive).
    pub fn min_deg(&self) -> f32 {
        self.min_deg
    }

    /// Returns the maximum angle in degrees (exclusive).
    pub fn max_deg(&self) -> f32 {
        self.max_deg
    }

    /// Returns the grid step size in degrees.
    pub fn step_deg(&self) -> f32 {
        self.step_deg
    }

    /// Returns the wrapped angle for the given index.
    pub fn angle_at(&self, idx: usize) -> f32 {
        debug_assert!(idx < self.len);
        wrap_deg(self.min_deg + (idx as f32) * self.step_deg)
    }

    /// Iterates over all angles in the grid.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        (0..self.len).map(|idx| self.angle_at(idx))
    }

    /// Collects the grid into a rotation list.
    pub fn to_vec(&self) -> Vec<f32> {
        self.iter().collect()
    }
}
