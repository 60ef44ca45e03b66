//! Scalar reference kernel with greedy early termination.

use crate::bank::TemplateModel;
use crate::candidate::topk::Candidate;
use crate::image::gradient::GradientField;
use crate::kernel::{ScanParams, ScanWindow};

/// Scores `model` with its centroid placed at `(x, y)`.
///
/// Each edge point contributes the cosine between its gradient and the image
/// gradient at `round(x + offset)`, clamped to `[-1, 1]` and 0 where either
/// gradient vanishes. Points that land outside the image are skipped and do
/// not count toward the average. Returns `None` when the placement is pruned,
/// no point lands inside the image, or the final average is not strictly above
/// `params.min_score`.
pub fn score_model_at(
    field: &GradientField,
    model: &TemplateModel,
    x: usize,
    y: usize,
    params: &ScanParams,
) -> Option<f32> {
    let points = model.points();
    let total = points.len();
    if total == 0 {
        return None;
    }

    let width = field.width();
    let max_x = field.width() as f32;
    let max_y = field.height() as f32;
    let gx = field.gx();
    let gy = field.gy();
    let inv = field.inv_magnitude();
    let min_score = params.min_score;
    let ceiling = 1.0 - params.greediness * (1.0 - min_score);
    let (xf, yf) = (x as f32, y as f32);

    let mut sum = 0.0f32;
    let mut evaluated = 0usize;
    for (idx, p) in points.iter().enumerate() {
        let sx = (xf + p.offset_x).round();
        let sy = (yf + p.offset_y).round();
        if sx < 0.0 || sy < 0.0 || sx >= max_x || sy >= max_y {
            continue;
        }
        let i = sy as usize * width + sx as usize;
        let cos = (p.dx * gx[i] + p.dy * gy[i]) * p.weight * inv[i];
        sum += cos.clamp(-1.0, 1.0);
        evaluated += 1;

        let remaining = total - idx - 1;
        let bound = (sum + remaining as f32 * ceiling) / (evaluated + remaining) as f32;
        if bound < min_score {
            return None;
        }
    }

    if evaluated == 0 {
        return None;
    }
    let score = (sum / evaluated as f32).min(1.0);
    (score > min_score).then_some(score)
}

/// Scores every model at every sampled column of row `y`.
pub(crate) fn scan_row(
    field: &GradientField,
    models: &[&TemplateModel],
    window: ScanWindow,
    y: usize,
    params: &ScanParams,
    out: &mut Vec<Candidate>,
) {
    for x in window.cols(params.step) {
        for model in models {
            if let Some(score) = score_model_at(field, model, x, y, params) {
                out.push(Candidate {
                    level: model.level(),
                    x,
                    y,
                    score,
                    variant: model.variant(),
                });
            }
        }
    }
}

/// Sequential scan over the sampled rows of `window`.
pub(crate) fn scan_window(
    field: &GradientField,
    models: &[&TemplateModel],
    window: ScanWindow,
    params: &ScanParams,
) -> Vec<Candidate> {
    let mut out = Vec::new();
    if models.is_empty() || window.is_empty() {
        return out;
    }
    for y in window.rows(params.step) {
        scan_row(field, models, window, y, params, &mut out);
    }
    out
}
