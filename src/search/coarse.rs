//! Coarse pass over the coarsest pyramid level.
//!
//! Every model of the level is evaluated on a sparse placement grid with a
//! permissive threshold; only the top-K hypotheses move on to refinement.
//! A single-level library has no refinement stage, so its coarse pass scans
//! every placement.

use crate::bank::TemplateLibrary;
use crate::candidate::topk::{select_topk, Candidate};
use crate::image::gradient::GradientField;
use crate::kernel::{ScanParams, ScanWindow};
use crate::search::scan::search_level;
use crate::search::MatchConfig;
use crate::trace::{trace_event, trace_span};
use crate::ImageView;

pub(crate) fn coarse_search_level(
    image: ImageView<'_, u8>,
    library: &TemplateLibrary,
    level: usize,
    cfg: &MatchConfig,
) -> Vec<Candidate> {
    let _span = trace_span!(
        "coarse_search",
        level = level,
        models = library.models_at(level).len()
    )
    .entered();

    // Nothing refines a base-level pass, so it scans densely with the final threshold.
    let (step, min_score) = if level == 0 {
        (1, cfg.min_score)
    } else {
        (cfg.coarse_step, cfg.coarse_min_score)
    };
    let params = ScanParams {
        step,
        min_score,
        greediness: cfg.greediness,
    };

    let field = GradientField::sobel(image);
    let window = ScanWindow::full(field.width(), field.height());
    let found = search_level(&field, library, level, window, &params, None, cfg.parallel);
    trace_event!("coarse_candidates", level = level, count = found.len());

    let kept = select_topk(found, cfg.top_k);
    trace_event!("coarse_kept", count = kept.len());
    kept
}
