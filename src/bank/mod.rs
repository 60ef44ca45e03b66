//! Template model library built once per reference image ("training").
//!
//! Every pyramid level of the reference is rescaled and rotated for each
//! requested `(scale, rotation)` variant. The transformed image is reduced to
//! its Canny edge pixels, each carrying the Sobel gradient at that pixel, and
//! the point set is re-expressed relative to its centroid. The resulting
//! `TemplateLibrary` is immutable and is shared read-only by all searches.

mod angles;

pub use angles::AngleGrid;

use crate::image::gradient::GradientField;
use crate::image::pyramid::ImagePyramid;
use crate::image::{ImageView, OwnedImage};
use crate::template::edges::{detect_edges, sample_edge_points, CANNY_HIGH, CANNY_LOW};
use crate::template::transform_u8;
use crate::trace::{trace_event, trace_span};
use crate::util::math::centroid;
use crate::util::{EdgeMatchError, EdgeMatchResult};
#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Configuration for building a template library.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrainConfig {
    /// Number of pyramid levels; searches use the same depth.
    pub pyramid_levels: usize,
    /// Scale factors applied to the reference at every level.
    pub scales: Vec<f32>,
    /// Rotations in degrees (counter-clockwise) applied after scaling.
    pub rotations_deg: Vec<f32>,
    /// Lower Canny hysteresis threshold.
    pub canny_low: f32,
    /// Upper Canny hysteresis threshold.
    pub canny_high: f32,
    /// Fill value for pixels rotated in from outside the reference.
    pub fill_value: u8,
    /// Build the variants of each level on the rayon pool.
    pub parallel: bool,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            pyramid_levels: 3,
            scales: vec![1.0],
            rotations_deg: vec![0.0],
            canny_low: CANNY_LOW,
            canny_high: CANNY_HIGH,
            fill_value: 0,
            parallel: false,
        }
    }
}

impl TrainConfig {
    /// Replaces the rotation list with an evenly spaced sweep over `[min_deg, max_deg)`.
    pub fn with_rotation_range(
        mut self,
        min_deg: f32,
        max_deg: f32,
        step_deg: f32,
    ) -> EdgeMatchResult<Self> {
        self.rotations_deg = AngleGrid::new(min_deg, max_deg, step_deg)?.to_vec();
        Ok(self)
    }

    fn validate(&self) -> EdgeMatchResult<()> {
        if self.pyramid_levels == 0 {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "pyramid_levels must be >= 1",
            });
        }
        if self.scales.is_empty() {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "at least one scale is required",
            });
        }
        if self.scales.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "scales must be finite and > 0",
            });
        }
        if self.rotations_deg.is_empty() {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "at least one rotation is required",
            });
        }
        if self.rotations_deg.iter().any(|a| !a.is_finite()) {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "rotations must be finite",
            });
        }
        if !(self.canny_low >= 0.0 && self.canny_low <= self.canny_high) {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "canny thresholds must satisfy 0 <= low <= high",
            });
        }
        Ok(())
    }

    fn variants(&self) -> Vec<Variant> {
        let mut out = Vec::with_capacity(self.scales.len() * self.rotations_deg.len());
        for &scale in &self.scales {
            for &angle_deg in &self.rotations_deg {
                out.push(Variant { scale, angle_deg });
            }
        }
        out
    }
}

/// One `(scale, rotation)` combination; its index is stable across levels.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Variant {
    /// Scale factor applied to the reference.
    pub scale: f32,
    /// Rotation in degrees applied after scaling.
    pub angle_deg: f32,
}

/// Edge pixel of a transformed template, relative to the point-set centroid.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgePoint {
    /// Column offset from the centroid.
    pub offset_x: f32,
    /// Row offset from the centroid.
    pub offset_y: f32,
    /// Horizontal Sobel derivative.
    pub dx: f32,
    /// Vertical Sobel derivative.
    pub dy: f32,
    /// `1 / |(dx, dy)|`, or 0 for a vanishing gradient.
    pub weight: f32,
}

/// Edge model of one `(level, scale, rotation)` transform of the reference.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateModel {
    level: usize,
    variant: usize,
    scale: f32,
    angle_deg: f32,
    width: usize,
    height: usize,
    anchor_x: f32,
    anchor_y: f32,
    points: Vec<EdgePoint>,
}

impl TemplateModel {
    /// Pyramid level this model is matched against.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Index of the `(scale, rotation)` variant.
    pub fn variant(&self) -> usize {
        self.variant
    }

    /// Scale factor of the transform.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Rotation in degrees of the transform.
    pub fn angle_deg(&self) -> f32 {
        self.angle_deg
    }

    /// Width of the transformed template in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height of the transformed template in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Centroid of the edge pixels in transformed-template coordinates.
    pub fn anchor(&self) -> (f32, f32) {
        (self.anchor_x, self.anchor_y)
    }

    /// Edge points in contour order.
    pub fn points(&self) -> &[EdgePoint] {
        &self.points
    }

    /// Number of edge points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for models stored in a library.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Draws the edge points (255 on 0) at their template-space positions.
    pub fn render_points(&self) -> OwnedImage {
        let width = self.width.max(1);
        let height = self.height.max(1);
        let mut img = OwnedImage::from_raw_parts(vec![0; width * height], width, height);
        let data = img.data_mut();
        for p in &self.points {
            let x = (self.anchor_x + p.offset_x).round();
            let y = (self.anchor_y + p.offset_y).round();
            if x < 0.0 || y < 0.0 {
                continue;
            }
            let (x, y) = (x as usize, y as usize);
            if x < width && y < height {
                data[y * width + x] = 255;
            }
        }
        img
    }
}

/// Immutable set of template models grouped by pyramid level.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TemplateLibrary {
    levels: Vec<Vec<TemplateModel>>,
    variants: Vec<Variant>,
    config: TrainConfig,
}

impl TemplateLibrary {
    /// Builds the model library for a reference image.
    ///
    /// Transforms whose edge map is empty are skipped, so a featureless
    /// reference yields an empty library rather than an error.
    pub fn train(reference: ImageView<'_, u8>, cfg: TrainConfig) -> EdgeMatchResult<Self> {
        cfg.validate()?;
        let variants = cfg.variants();
        let _span = trace_span!(
            "train",
            levels = cfg.pyramid_levels,
            variants = variants.len()
        )
        .entered();

        let pyramid = ImagePyramid::build_u8(reference, cfg.pyramid_levels)?;
        let mut levels = Vec::with_capacity(pyramid.len());
        for (level, level_img) in pyramid.levels().iter().enumerate() {
            let built = build_level(level_img.view(), level, &variants, &cfg)?;
            trace_event!("train_level", level = level, models = built.len());
            levels.push(built);
        }

        let library = Self {
            levels,
            variants,
            config: cfg,
        };
        trace_event!("train_complete", models = library.len());
        Ok(library)
    }

    /// Loads a reference image from disk and trains on it.
    ///
    /// Decoding failures are returned as `ImageIo` and no library is built.
    #[cfg(feature = "image-io")]
    pub fn train_from_path<P: AsRef<std::path::Path>>(
        path: P,
        cfg: TrainConfig,
    ) -> EdgeMatchResult<Self> {
        let reference = crate::image::io::load_gray_image(path)?;
        Self::train(reference.view(), cfg)
    }

    /// Number of pyramid levels the library was trained with.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// The `(scale, rotation)` table, indexed by `TemplateModel::variant`.
    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    /// Training parameters used to build this library.
    pub fn config(&self) -> &TrainConfig {
        &self.config
    }

    /// Models of one level ordered by variant; empty for unknown levels.
    pub fn models_at(&self, level: usize) -> &[TemplateModel] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Looks up the model of a given level and variant.
    pub fn model(&self, level: usize, variant: usize) -> Option<&TemplateModel> {
        let models = self.models_at(level);
        models
            .binary_search_by_key(&variant, |m| m.variant)
            .ok()
            .map(|idx| &models[idx])
    }

    /// Iterates over all models, level by level.
    pub fn iter(&self) -> impl Iterator<Item = &TemplateModel> + '_ {
        self.levels.iter().flatten()
    }

    /// Total number of models across levels.
    pub fn len(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// True when no transform produced any edge points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn build_level(
    level_img: ImageView<'_, u8>,
    level: usize,
    variants: &[Variant],
    cfg: &TrainConfig,
) -> EdgeMatchResult<Vec<TemplateModel>> {
    #[cfg(feature = "rayon")]
    {
        if cfg.parallel {
            let built: Vec<Option<TemplateModel>> = variants
                .par_iter()
                .enumerate()
                .map(|(idx, v)| build_model(level_img, level, idx, *v, cfg))
                .collect::<EdgeMatchResult<_>>()?;
            return Ok(built.into_iter().flatten().collect());
        }
    }

    let mut out = Vec::with_capacity(variants.len());
    for (idx, v) in variants.iter().enumerate() {
        if let Some(model) = build_model(level_img, level, idx, *v, cfg)? {
            out.push(model);
        }
    }
    Ok(out)
}

fn build_model(
    level_img: ImageView<'_, u8>,
    level: usize,
    variant: usize,
    v: Variant,
    cfg: &TrainConfig,
) -> EdgeMatchResult<Option<TemplateModel>> {
    let Some(instance) = transform_u8(level_img, v.scale, v.angle_deg, cfg.fill_value) else {
        return Ok(None);
    };
    let field = GradientField::sobel(instance.view());
    let edges = detect_edges(instance.view(), cfg.canny_low, cfg.canny_high);
    let sampled = sample_edge_points(edges.view(), &field)?;

    let Some((cx, cy)) = centroid(sampled.iter().map(|p| (p.x as f32, p.y as f32))) else {
        return Ok(None);
    };
    let points = sampled
        .iter()
        .map(|p| EdgePoint {
            offset_x: p.x as f32 - cx,
            offset_y: p.y as f32 - cy,
            dx: p.dx,
            dy: p.dy,
            weight: p.weight,
        })
        .collect();

    Ok(Some(TemplateModel {
        level,
        variant,
        scale: v.scale,
        angle_deg: v.angle_deg,
        width: instance.width(),
        height: instance.height(),
        anchor_x: cx,
        anchor_y: cy,
        points,
    }))
}
