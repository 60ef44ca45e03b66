//! Level search: every selected model of one pyramid level at every sampled
//! placement of a window.

use crate::bank::{TemplateLibrary, TemplateModel};
use crate::candidate::topk::{sort_candidates_desc, Candidate};
use crate::image::gradient::GradientField;
use crate::kernel::scalar::scan_window;
use crate::kernel::{ScanParams, ScanWindow};
use crate::search::Match;
use crate::util::{EdgeMatchError, EdgeMatchResult};

/// Models of `level`, or only the one built for `variant` when it is given.
pub(crate) fn select_models(
    library: &TemplateLibrary,
    level: usize,
    variant: Option<usize>,
) -> Vec<&TemplateModel> {
    match variant {
        Some(v) => library.model(level, v).into_iter().collect(),
        None => library.models_at(level).iter().collect(),
    }
}

/// Scans `window` of a level's gradient field, sequentially or row-parallel.
pub(crate) fn search_level(
    field: &GradientField,
    library: &TemplateLibrary,
    level: usize,
    window: ScanWindow,
    params: &ScanParams,
    variant: Option<usize>,
    parallel: bool,
) -> Vec<Candidate> {
    let models = select_models(library, level, variant);

    #[cfg(feature = "rayon")]
    {
        if parallel {
            return crate::kernel::rayon::scan_window_par(field, &models, window, params);
        }
    }
    #[cfg(not(feature = "rayon"))]
    let _ = parallel;

    scan_window(field, &models, window, params)
}

/// Runs one level search and returns every placement above `params.min_score`.
///
/// Positions are in the coordinate frame of `level`; `window` restricts the
/// placements (pass `ScanWindow::full` for the whole level) while gradients
/// are read from the full field. `variant` restricts the search to the model
/// of one `(scale, rotation)` pair. Results are sorted best first.
pub fn scan_level(
    field: &GradientField,
    library: &TemplateLibrary,
    level: usize,
    window: ScanWindow,
    params: &ScanParams,
    variant: Option<usize>,
) -> EdgeMatchResult<Vec<Match>> {
    if level >= library.num_levels() {
        return Err(EdgeMatchError::IndexOutOfBounds {
            index: level,
            len: library.num_levels(),
            context: "level",
        });
    }
    if params.step == 0 {
        return Err(EdgeMatchError::InvalidConfig {
            reason: "step must be >= 1",
        });
    }
    let window = ScanWindow {
        x0: window.x0.min(field.width()),
        y0: window.y0.min(field.height()),
        x1: window.x1.min(field.width()),
        y1: window.y1.min(field.height()),
    };

    let mut found = search_level(field, library, level, window, params, variant, false);
    sort_candidates_desc(&mut found);
    Ok(found
        .into_iter()
        .filter_map(|cand| Match::from_candidate(library, cand))
        .collect())
}
