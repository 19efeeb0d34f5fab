//! Browser driving capability
//!
//! Everything the capture engine needs from a browser session: navigation,
//! script execution, element lookup and geometry, and raw raster captures.
//! [`crate::webdriver::WebDriverSession`] implements it over WebDriver; tests
//! implement it against an in-memory page.

use std::sync::Arc;

use async_trait::async_trait;
use screenlly_common::{BrowserProfile, Rect, Selector};
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("WebDriver command failed: {0}")]
    Command(String),

    #[error("Stale element reference: {0}")]
    StaleElement(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("No element matches {0}")]
    NoSuchElement(String),

    #[error("Could not decode raster: {0}")]
    Decode(String),

    #[error("Unexpected script result for {what}: {value}")]
    UnexpectedValue { what: String, value: String },
}

pub type DriverResult<T> = Result<T, DriverError>;

/// Opaque reference to an element in the current page
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn id(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Script argument: plain JSON or an element reference
#[derive(Debug, Clone)]
pub enum ScriptArg {
    Value(Value),
    Element(ElementHandle),
}

impl ScriptArg {
    pub fn number(n: u32) -> Self {
        ScriptArg::Value(Value::from(n))
    }

    pub fn string(s: impl Into<String>) -> Self {
        ScriptArg::Value(Value::String(s.into()))
    }

    pub fn element(handle: &ElementHandle) -> Self {
        ScriptArg::Element(handle.clone())
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            ScriptArg::Value(v) => v.as_f64().map(|n| n.max(0.0) as u32),
            ScriptArg::Element(_) => None,
        }
    }
}

/// Element location and size as reported by the browser, document-relative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ElementRect {
    /// Whole-pixel bounding box; fractional positions truncate, negative
    /// positions clamp to the document origin
    pub fn to_rect(&self) -> Rect {
        let x = self.x.max(0.0) as u32;
        let y = self.y.max(0.0) as u32;
        Rect::from_xywh(x, y, self.width.max(0.0) as u32, self.height.max(0.0) as u32)
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[async_trait]
pub trait Driver: Send + Sync {
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    async fn execute_script(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value>;

    async fn find_elements(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>>;

    /// First element matching `selector`
    async fn find_element(&self, selector: &Selector) -> DriverResult<ElementHandle> {
        self.find_elements(selector)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NoSuchElement(selector.to_string()))
    }

    async fn element_rect(&self, element: &ElementHandle) -> DriverResult<ElementRect>;

    /// Encoded raster of a single element
    async fn capture_element(&self, element: &ElementHandle) -> DriverResult<Vec<u8>>;

    /// Encoded raster of the current viewport
    async fn capture_viewport(&self) -> DriverResult<Vec<u8>>;

    async fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()>;

    async fn maximize_window(&self) -> DriverResult<()>;

    /// End the session; further calls fail
    async fn dispose(&self) -> DriverResult<()>;
}

/// Opens one driving session per browser profile
#[async_trait]
pub trait DriverFactory: Send + Sync {
    async fn connect(&self, browser: &str, profile: &BrowserProfile) -> DriverResult<Arc<dyn Driver>>;
}
