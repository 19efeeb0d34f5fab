//! Core types for Screenlly

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Error, Result};

/// A point in document pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: u32,
    pub y: u32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Width and height in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Axis-aligned rectangle in document coordinates.
///
/// `bottom_right` is exclusive and never lies above or left of `top_left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    top_left: Point,
    bottom_right: Point,
}

impl Rect {
    pub fn new(top_left: Point, bottom_right: Point) -> Result<Self> {
        if bottom_right.x < top_left.x || bottom_right.y < top_left.y {
            return Err(Error::InvalidRect {
                left: top_left.x,
                top: top_left.y,
                right: bottom_right.x,
                bottom: bottom_right.y,
            });
        }
        Ok(Self {
            top_left,
            bottom_right,
        })
    }

    /// Rectangle anchored at the origin covering `size`
    pub fn from_size(size: Size) -> Self {
        Self {
            top_left: Point::ORIGIN,
            bottom_right: Point::new(size.width, size.height),
        }
    }

    pub fn from_xywh(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            top_left: Point::new(x, y),
            bottom_right: Point::new(x.saturating_add(width), y.saturating_add(height)),
        }
    }

    pub fn left(&self) -> u32 {
        self.top_left.x
    }

    pub fn top(&self) -> u32 {
        self.top_left.y
    }

    pub fn right(&self) -> u32 {
        self.bottom_right.x
    }

    pub fn bottom(&self) -> u32 {
        self.bottom_right.y
    }

    pub fn width(&self) -> u32 {
        self.bottom_right.x - self.top_left.x
    }

    pub fn height(&self) -> u32 {
        self.bottom_right.y - self.top_left.y
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Overlap of two rectangles, `None` when they do not share any pixel
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left >= right || top >= bottom {
            return None;
        }
        Some(Rect {
            top_left: Point::new(left, top),
            bottom_right: Point::new(right, bottom),
        })
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.top_left, self.bottom_right)
    }
}

/// Outcome of comparing one expected image with one tested image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    /// Absolute-error score; zero means pixel-identical after normalization
    pub dissimilarity: f64,

    /// Highlighted diff raster, only written when the score is nonzero
    pub diff_artifact_path: Option<PathBuf>,
}

impl DiffResult {
    pub fn identical() -> Self {
        Self {
            dissimilarity: 0.0,
            diff_artifact_path: None,
        }
    }

    pub fn is_identical(&self) -> bool {
        self.dissimilarity == 0.0
    }
}

/// One compared pair recorded by the comparison walker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonEntry {
    pub relative_path: PathBuf,
    pub expected: PathBuf,
    pub tested: PathBuf,
    pub result: PathBuf,
    pub dissimilarity: f64,
}

/// Result of one compare run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Result paths whose dissimilarity was nonzero, in walk order
    pub mismatches: Vec<PathBuf>,

    /// Every pair that was compared
    pub compared: Vec<ComparisonEntry>,

    /// Tested files with no counterpart under the expected root
    pub missing_baselines: Vec<PathBuf>,

    pub warnings: Vec<RunWarning>,
}

impl ComparisonReport {
    pub fn is_clean(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Files written for one page under one browser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPage {
    pub browser: String,
    pub url: String,
    pub paths: Vec<PathBuf>,
}

/// Result of one capture run: what was written and what was skipped
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CaptureReport {
    pub captured: Vec<CapturedPage>,
    pub warnings: Vec<RunWarning>,
}

impl CaptureReport {
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.captured.iter().flat_map(|page| page.paths.iter())
    }
}

/// Where a non-fatal problem happened
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum WarningScope {
    Browser { browser: String },
    Page { browser: String, url: String },
    Element { selector: String, index: usize },
    Baseline { path: PathBuf },
}

impl std::fmt::Display for WarningScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WarningScope::Browser { browser } => write!(f, "browser {}", browser),
            WarningScope::Page { browser, url } => write!(f, "page {} ({})", url, browser),
            WarningScope::Element { selector, index } => {
                write!(f, "element #{} of {}", index, selector)
            }
            WarningScope::Baseline { path } => write!(f, "baseline {}", path.display()),
        }
    }
}

/// A recorded non-fatal problem; the run continues after it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunWarning {
    #[serde(flatten)]
    pub scope: WarningScope,
    pub message: String,
}

impl RunWarning {
    pub fn new(scope: WarningScope, message: impl Into<String>) -> Self {
        Self {
            scope,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for RunWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.scope, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_rejects_inverted_corners() {
        let err = Rect::new(Point::new(10, 10), Point::new(5, 20)).unwrap_err();
        assert!(matches!(err, Error::InvalidRect { left: 10, .. }));

        let rect = Rect::new(Point::new(10, 10), Point::new(10, 30)).unwrap();
        assert_eq!(rect.width(), 0);
        assert!(rect.is_empty());
    }

    #[test]
    fn test_rect_intersect() {
        let a = Rect::from_xywh(0, 0, 100, 100);
        let b = Rect::from_xywh(50, 80, 100, 100);
        assert_eq!(a.intersect(&b), Some(Rect::from_xywh(50, 80, 50, 20)));

        let c = Rect::from_xywh(100, 0, 10, 10);
        assert_eq!(a.intersect(&c), None);
    }

    #[test]
    fn test_warning_serializes_flat() {
        let warning = RunWarning::new(
            WarningScope::Page {
                browser: "firefox".into(),
                url: "/about".into(),
            },
            "navigation failed",
        );
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["scope"], "page");
        assert_eq!(json["url"], "/about");
        assert_eq!(json["message"], "navigation failed");
    }
}
