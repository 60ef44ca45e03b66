//! Refinement of coarse candidates on successively finer levels.
//!
//! Each candidate is promoted to the finer level (position x2) and rescanned
//! with step 1 inside a square ROI, using only the model of its own
//! `(scale, rotation)` variant. The ROI grows with the level index since
//! position error compounds with every upsampling.

use crate::bank::TemplateLibrary;
use crate::candidate::topk::{select_topk, Candidate};
use crate::image::gradient::GradientField;
use crate::kernel::{ScanParams, ScanWindow};
use crate::search::scan::search_level;
use crate::search::MatchConfig;
use crate::trace::{trace_debug, trace_event, trace_span};
use crate::ImageView;
#[cfg(feature = "rayon")]
use rayon::prelude::*;

fn upscale_pos(x: usize, y: usize) -> (usize, usize) {
    (x.saturating_mul(2), y.saturating_mul(2))
}

/// ROI side length used when refining into `level`.
pub(crate) fn roi_size_for_level(roi_size: usize, level: usize) -> usize {
    let grown = u32::try_from(level)
        .ok()
        .and_then(|shift| 1usize.checked_shl(shift))
        .and_then(|factor| roi_size.checked_mul(factor))
        .unwrap_or(usize::MAX);
    roi_size.max(grown)
}

struct RefineCtx<'a> {
    field: &'a GradientField,
    library: &'a TemplateLibrary,
    level: usize,
    roi_size: usize,
    min_roi_size: usize,
    params: ScanParams,
}

impl RefineCtx<'_> {
    fn refine_one(&self, cand: &Candidate) -> Vec<Candidate> {
        let (cx, cy) = upscale_pos(cand.x, cand.y);
        let roi = ScanWindow::centered(
            cx,
            cy,
            self.roi_size,
            self.field.width(),
            self.field.height(),
        );
        if roi.width() < self.min_roi_size || roi.height() < self.min_roi_size {
            trace_debug!(
                "roi_dropped",
                x = cx,
                y = cy,
                width = roi.width(),
                height = roi.height()
            );
            return Vec::new();
        }
        search_level(
            self.field,
            self.library,
            self.level,
            roi,
            &self.params,
            Some(cand.variant),
            false,
        )
    }
}

/// Refines every candidate; per-ROI results are concatenated in input order.
fn refine_all(ctx: &RefineCtx<'_>, prev: &[Candidate], parallel: bool) -> Vec<Candidate> {
    #[cfg(feature = "rayon")]
    {
        if parallel {
            let per_roi: Vec<Vec<Candidate>> =
                prev.par_iter().map(|cand| ctx.refine_one(cand)).collect();
            return per_roi.into_iter().flatten().collect();
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    prev.iter().flat_map(|cand| ctx.refine_one(cand)).collect()
}

pub(crate) fn refine_to_finer_level(
    image: ImageView<'_, u8>,
    library: &TemplateLibrary,
    finer_level: usize,
    prev: &[Candidate],
    cfg: &MatchConfig,
) -> Vec<Candidate> {
    if prev.is_empty() {
        return Vec::new();
    }
    let roi_size = roi_size_for_level(cfg.roi_size, finer_level);
    let _span = trace_span!(
        "refine_level",
        level = finer_level,
        candidates = prev.len(),
        roi = roi_size
    )
    .entered();

    let field = GradientField::sobel(image);
    let ctx = RefineCtx {
        field: &field,
        library,
        level: finer_level,
        roi_size,
        min_roi_size: cfg.min_roi_size,
        params: ScanParams {
            step: 1,
            min_score: cfg.min_score,
            greediness: cfg.greediness,
        },
    };

    let mut refined = refine_all(&ctx, prev, cfg.parallel);

    // Overlapping ROIs of neighbouring coarse hits rediscover the same placement.
    refined.sort_by(|a, b| (a.variant, a.y, a.x).cmp(&(b.variant, b.y, b.x)));
    refined.dedup_by(|a, b| a.variant == b.variant && a.x == b.x && a.y == b.y);
    trace_event!("refined_candidates", level = finer_level, count = refined.len());

    select_topk(refined, cfg.top_k)
}

#[cfg(test)]
mod tests {
    use super::{refine_to_finer_level, roi_size_for_level, upscale_pos};
    use crate::bank::{TemplateLibrary, TrainConfig};
    use crate::candidate::topk::Candidate;
    use crate::image::OwnedImage;
    use crate::search::MatchConfig;

    fn filled_square() -> OwnedImage {
        let size = 48;
        let mut img = OwnedImage::filled(size, size, 0).unwrap();
        for y in 12..36 {
            for x in 12..36 {
                img.data_mut()[y * size + x] = 255;
            }
        }
        img
    }

    #[test]
    fn clipped_roi_below_minimum_is_dropped() {
        let img = filled_square();
        let cfg = TrainConfig {
            pyramid_levels: 2,
            ..TrainConfig::default()
        };
        let library = TemplateLibrary::train(img.view(), cfg).unwrap();
        // (3, 3) promotes to (6, 6); a 40 px ROI there clips to 26 x 26.
        let prev = [Candidate {
            level: 1,
            x: 3,
            y: 3,
            score: 0.5,
            variant: 0,
        }];

        let keep = MatchConfig {
            min_roi_size: 26,
            ..MatchConfig::default()
        };
        let kept = refine_to_finer_level(img.view(), &library, 0, &prev, &keep);
        assert!(!kept.is_empty());
        assert!(kept.iter().all(|c| c.level == 0 && c.x < 26 && c.y < 26));

        let strict = MatchConfig {
            min_roi_size: 27,
            ..MatchConfig::default()
        };
        assert!(refine_to_finer_level(img.view(), &library, 0, &prev, &strict).is_empty());
    }

    #[test]
    fn roi_grows_with_level() {
        assert_eq!(roi_size_for_level(40, 0), 40);
        assert_eq!(roi_size_for_level(40, 1), 80);
        assert_eq!(roi_size_for_level(40, 2), 160);
        assert_eq!(roi_size_for_level(40, 200), usize::MAX);
    }

    #[test]
    fn upscale_doubles_position() {
        assert_eq!(upscale_pos(7, 3), (14, 6));
    }
}
