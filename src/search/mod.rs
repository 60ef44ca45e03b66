//! Coarse-to-fine search for trained template libraries.
//!
//! The target is decomposed into the same number of pyramid levels the
//! library was trained with. The coarsest level is scanned exhaustively on a
//! sparse grid; the best hypotheses are then promoted level by level and
//! rescanned inside shrinking regions until level 0 is reached.

pub(crate) mod coarse;
pub(crate) mod refine;
pub(crate) mod scan;

use crate::bank::TemplateLibrary;
use crate::candidate::topk::Candidate;
use crate::image::pyramid::ImagePyramid;
use crate::trace::{trace_event, trace_span};
use crate::util::{EdgeMatchError, EdgeMatchResult};
use crate::ImageView;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A located template instance.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    /// Column of the template centroid.
    pub x: usize,
    /// Row of the template centroid.
    pub y: usize,
    /// Mean gradient-direction agreement in `[0, 1]`.
    pub score: f32,
    /// Scale factor of the matching variant.
    pub scale: f32,
    /// Rotation in degrees of the matching variant.
    pub angle_deg: f32,
    /// Width of the transformed template at `level`.
    pub width: usize,
    /// Height of the transformed template at `level`.
    pub height: usize,
    /// Pyramid level the position refers to; 0 for search results.
    pub level: usize,
    /// Index into `TemplateLibrary::variants`.
    pub variant: usize,
}

impl Match {
    /// Top-left corner of the axis-aligned `width x height` box centered on the match.
    pub fn top_left(&self) -> (isize, isize) {
        (
            self.x as isize - (self.width / 2) as isize,
            self.y as isize - (self.height / 2) as isize,
        )
    }

    pub(crate) fn from_candidate(library: &TemplateLibrary, cand: Candidate) -> Option<Self> {
        let model = library.model(cand.level, cand.variant)?;
        Some(Self {
            x: cand.x,
            y: cand.y,
            score: cand.score,
            scale: model.scale(),
            angle_deg: model.angle_deg(),
            width: model.width(),
            height: model.height(),
            level: cand.level,
            variant: cand.variant,
        })
    }
}

/// Configuration for coarse-to-fine matching.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatchConfig {
    /// Acceptance threshold for refined (and final) matches.
    pub min_score: f32,
    /// Base side length of the refinement ROI; grows as `roi_size * 2^level`.
    pub roi_size: usize,
    /// Candidates kept after every level and in the final result.
    pub top_k: usize,
    /// Pruning aggressiveness in `[0, 1]`; 0 assumes unscored points score 1
    /// and never discards a viable placement. See `ScanParams::greediness`.
    pub greediness: f32,
    /// Placement stride of the coarse scan; ignored for single-level libraries.
    pub coarse_step: usize,
    /// Permissive threshold of the coarse scan; single-level libraries use `min_score`.
    pub coarse_min_score: f32,
    /// ROIs narrower or shorter than this after clipping are dropped.
    pub min_roi_size: usize,
    /// Scan rows and refine ROIs on the rayon pool.
    pub parallel: bool,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            min_score: 0.7,
            roi_size: 40,
            top_k: 5,
            greediness: 0.8,
            coarse_step: 4,
            coarse_min_score: 0.3,
            min_roi_size: 5,
            parallel: false,
        }
    }
}

impl MatchConfig {
    /// Checks parameter ranges.
    pub fn validate(&self) -> EdgeMatchResult<()> {
        if !(0.0..1.0).contains(&self.min_score) {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "min_score must be in [0, 1)",
            });
        }
        if !(0.0..1.0).contains(&self.coarse_min_score) {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "coarse_min_score must be in [0, 1)",
            });
        }
        if !(0.0..=1.0).contains(&self.greediness) {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "greediness must be in [0, 1]",
            });
        }
        if self.top_k == 0 {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "top_k must be >= 1",
            });
        }
        if self.coarse_step == 0 {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "coarse_step must be >= 1",
            });
        }
        if self.roi_size == 0 {
            return Err(EdgeMatchError::InvalidConfig {
                reason: "roi_size must be >= 1",
            });
        }
        Ok(())
    }
}

/// Matcher bound to a shared template library.
#[derive(Clone, Debug)]
pub struct Matcher {
    library: Arc<TemplateLibrary>,
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher with default configuration.
    pub fn new(library: impl Into<Arc<TemplateLibrary>>) -> Self {
        Self {
            library: library.into(),
            cfg: MatchConfig::default(),
        }
    }

    /// Replaces the match configuration.
    pub fn with_config(mut self, cfg: MatchConfig) -> Self {
        self.cfg = cfg;
        self
    }

    /// Current match configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Shared template library.
    pub fn library(&self) -> &Arc<TemplateLibrary> {
        &self.library
    }

    /// Finds up to `top_k` matches, best first, in level-0 coordinates.
    pub fn match_image(&self, image: ImageView<'_, u8>) -> EdgeMatchResult<Vec<Match>> {
        run_search(image, &self.library, &self.cfg, None)
    }

    /// Like `match_image`, but returns `Cancelled` once `cancel` is observed set.
    ///
    /// The flag is polled before each pyramid level.
    pub fn match_image_cancellable(
        &self,
        image: ImageView<'_, u8>,
        cancel: &AtomicBool,
    ) -> EdgeMatchResult<Vec<Match>> {
        run_search(image, &self.library, &self.cfg, Some(cancel))
    }

    /// Highest-scoring match, if any placement passes `min_score`.
    pub fn best_match(&self, image: ImageView<'_, u8>) -> EdgeMatchResult<Option<Match>> {
        Ok(self.match_image(image)?.into_iter().next())
    }
}

fn check_cancel(cancel: Option<&AtomicBool>) -> EdgeMatchResult<()> {
    match cancel {
        Some(flag) if flag.load(Ordering::Relaxed) => Err(EdgeMatchError::Cancelled),
        _ => Ok(()),
    }
}

pub(crate) fn run_search(
    image: ImageView<'_, u8>,
    library: &TemplateLibrary,
    cfg: &MatchConfig,
    cancel: Option<&AtomicBool>,
) -> EdgeMatchResult<Vec<Match>> {
    cfg.validate()?;
    let levels = library.num_levels();
    let _span = trace_span!(
        "match_image",
        width = image.width(),
        height = image.height(),
        levels = levels
    )
    .entered();
    if levels == 0 || library.is_empty() {
        return Ok(Vec::new());
    }

    let pyramid = ImagePyramid::build_u8(image, levels)?;
    let coarsest = levels - 1;

    check_cancel(cancel)?;
    let coarse_img = pyramid
        .level(coarsest)
        .ok_or(EdgeMatchError::IndexOutOfBounds {
            index: coarsest,
            len: pyramid.len(),
            context: "level",
        })?;
    let mut candidates = coarse::coarse_search_level(coarse_img, library, coarsest, cfg);

    for level in (0..coarsest).rev() {
        if candidates.is_empty() {
            break;
        }
        check_cancel(cancel)?;
        let level_img = pyramid.level(level).ok_or(EdgeMatchError::IndexOutOfBounds {
            index: level,
            len: pyramid.len(),
            context: "level",
        })?;
        candidates = refine::refine_to_finer_level(level_img, library, level, &candidates, cfg);
    }

    let matches: Vec<Match> = candidates
        .into_iter()
        .filter_map(|cand| Match::from_candidate(library, cand))
        .collect();
    trace_event!("match_complete", matches = matches.len());
    Ok(matches)
}
