//! EdgeMatch is a CPU-first, edge-based template matching library.
//!
//! A reference image is trained once into a `TemplateLibrary` of sparse edge
//! point sets (one per pyramid level, scale and rotation). Searches compare
//! gradient directions of those points against a target image, coarse to
//! fine, with optional parallelism via the `rayon` feature.

pub mod bank;
mod candidate;
pub mod image;
pub mod kernel;
pub mod lowlevel;
pub mod search;
pub mod template;
mod trace;
pub mod util;

pub use bank::{EdgePoint, TemplateLibrary, TemplateModel, TrainConfig, Variant};
pub use image::gradient::GradientField;
pub use image::pyramid::ImagePyramid;
pub use image::{ImageView, OwnedImage};
pub use kernel::{ScanParams, ScanWindow};
pub use search::{Match, MatchConfig, Matcher};
pub use util::{EdgeMatchError, EdgeMatchResult};

/// Trains a template library from a reference image.
pub fn train(reference: ImageView<'_, u8>, cfg: TrainConfig) -> EdgeMatchResult<TemplateLibrary> {
    TemplateLibrary::train(reference, cfg)
}

/// Runs a coarse-to-fine search of `library` in `image`.
///
/// Returns up to `cfg.top_k` matches in level-0 coordinates, best first.
pub fn search(
    image: ImageView<'_, u8>,
    library: &TemplateLibrary,
    cfg: &MatchConfig,
) -> EdgeMatchResult<Vec<Match>> {
    search::run_search(image, library, cfg, None)
}
