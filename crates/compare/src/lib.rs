//! Screenlly comparison
//!
//! Pairs freshly captured screenshots with their baselines and scores each
//! pair with an external image tool:
//!
//! ```text
//! ComparisonWalker ── per file ──▶ DiffEngine ──▶ normalize_dimensions
//!                                      │                 │
//!                                      └────── ImageTool ┘  (ImageMagick)
//! ```

pub mod diff;
pub mod error;
pub mod normalize;
pub mod tool;
pub mod walker;

pub use diff::{DiffEngine, DEFAULT_DIFF_COLOR};
pub use error::{CompareError, CompareResult};
pub use normalize::{normalize_dimensions, Normalized, PAD_BACKGROUND};
pub use tool::{ImageMagick, ImageTool};
pub use walker::{is_image, CompareHooks, CompareReportHook, CompareRoots, ComparisonWalker};
