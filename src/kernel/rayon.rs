//! Rayon row-parallel scans (feature-gated).
//!
//! Rows are independent: each worker fills its own vector and the vectors are
//! concatenated in row order once the parallel phase is over, so the output
//! is identical to the sequential scan.

use crate::bank::TemplateModel;
use crate::candidate::topk::Candidate;
use crate::image::gradient::GradientField;
use crate::kernel::scalar::scan_row;
use crate::kernel::{ScanParams, ScanWindow};
use rayon::prelude::*;

/// Row-parallel scan over the sampled rows of `window`.
pub(crate) fn scan_window_par(
    field: &GradientField,
    models: &[&TemplateModel],
    window: ScanWindow,
    params: &ScanParams,
) -> Vec<Candidate> {
    if models.is_empty() || window.is_empty() {
        return Vec::new();
    }

    let rows: Vec<usize> = window.rows(params.step).collect();
    let row_results: Vec<Vec<Candidate>> = rows
        .par_iter()
        .map(|&y| {
            let mut row = Vec::new();
            scan_row(field, models, window, y, params, &mut row);
            row
        })
        .collect();

    row_results.into_iter().flatten().collect()
}
