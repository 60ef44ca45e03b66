//! Low-level building blocks for custom matching pipelines.
//!
//! These expose the gradient, edge sampling, transform and per-level scan
//! stages behind the high-level `Matcher` API. Most users should prefer
//! `TemplateLibrary::train` and `Matcher`.

pub use crate::bank::AngleGrid;
pub use crate::image::gradient::{GradientField, GradientSample};
pub use crate::image::pyramid::pyr_down;
pub use crate::kernel::scalar::score_model_at;
pub use crate::kernel::{ScanParams, ScanWindow};
pub use crate::search::scan::scan_level;
pub use crate::template::edges::{detect_edges, sample_edge_points, SampledPoint};
pub use crate::template::rotate::{resize_u8_bilinear, rotate_u8_bilinear};
pub use crate::template::transform_u8;
