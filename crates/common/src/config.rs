//! Run configuration
//!
//! A [`RunConfig`] is built once per run (from YAML plus CLI overrides) and
//! handed by reference to every component. Nothing in the workspace reads
//! configuration from globals.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::error::{Error, Result};

pub const DEFAULT_GRID_URL: &str = "http://127.0.0.1:4444/wd/hub";

/// Top-level configuration for a capture or compare run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Root directory screenshots are written under
    pub screenshots_dir: PathBuf,

    /// Base URL each entry of `urls` is joined onto; empty means absolute URLs
    pub host: String,

    /// WebDriver endpoint (Selenium grid or a standalone driver)
    pub grid_url: String,

    /// Pages to capture
    pub urls: Vec<String>,

    /// Named browser profiles, visited in name order
    pub browsers: BTreeMap<String, BrowserProfile>,

    /// Capture these elements instead of the full page
    pub elements: Vec<Selector>,

    /// Elements painted over with a solid block before capture
    pub mask_elements: Vec<Selector>,

    /// Elements pinned at the top of the viewport while scrolling
    pub fixed_header: Option<Selector>,

    /// Custom scroll container used instead of the document
    pub scrollable_element: Option<Selector>,

    pub settle: SettleConfig,

    /// Colour used for differing pixels in diff artifacts
    pub diff_color: String,

    /// Background of masked elements
    pub mask_color: String,

    pub imagemagick: ImageMagickConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            screenshots_dir: PathBuf::from("screenshots"),
            host: String::new(),
            grid_url: DEFAULT_GRID_URL.to_string(),
            urls: Vec::new(),
            browsers: BTreeMap::new(),
            elements: Vec::new(),
            mask_elements: Vec::new(),
            fixed_header: None,
            scrollable_element: None,
            settle: SettleConfig::default(),
            diff_color: "magenta".to_string(),
            mask_color: "yellow".to_string(),
            imagemagick: ImageMagickConfig::default(),
        }
    }
}

impl RunConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&content)?;
        debug!(
            "Loaded {} with {} URL(s) and {} browser(s)",
            path.display(),
            config.urls.len(),
            config.browsers.len()
        );
        Ok(config)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_url.trim().is_empty() {
            return Err(Error::InvalidConfig("grid_url must not be empty".into()));
        }
        if self.settle.attempts == 0 {
            return Err(Error::InvalidConfig(
                "settle.attempts must be at least 1".into(),
            ));
        }
        for (name, profile) in &self.browsers {
            if let Some(size) = profile.window_size {
                if size.width == 0 || size.height == 0 {
                    return Err(Error::InvalidConfig(format!(
                        "browser '{}' has an empty window size",
                        name
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve a configured URL against `host`
    pub fn full_url(&self, url: &str) -> Result<String> {
        if self.host.is_empty() {
            return Ok(url.to_string());
        }
        let base = url::Url::parse(&self.host).map_err(|e| Error::InvalidUrl {
            url: self.host.clone(),
            reason: e.to_string(),
        })?;
        let joined = base.join(url).map_err(|e| Error::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(joined.to_string())
    }
}

/// Capabilities and window setup for one browser
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrowserProfile {
    /// WebDriver capabilities sent when the session is created
    #[serde(default)]
    pub capabilities: serde_json::Map<String, serde_json::Value>,

    /// Explicit window size; the window is maximized when absent
    #[serde(default)]
    pub window_size: Option<WindowSize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    pub width: u32,
    pub height: u32,
}

/// Element locator
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selector {
    Xpath(String),
    Css(String),
}

impl Selector {
    pub fn xpath(expr: impl Into<String>) -> Self {
        Selector::Xpath(expr.into())
    }

    pub fn css(expr: impl Into<String>) -> Self {
        Selector::Css(expr.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Selector::Xpath(s) | Selector::Css(s) => s,
        }
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selector::Xpath(s) => write!(f, "xpath:{}", s),
            Selector::Css(s) => write!(f, "css:{}", s),
        }
    }
}

/// Bounded polling after each scroll command
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct SettleConfig {
    /// Maximum number of offset polls per scroll
    pub attempts: u32,

    /// Delay between polls
    pub interval_ms: u64,
}

impl SettleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            interval_ms: 500,
        }
    }
}

/// Program names for the ImageMagick command-line tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageMagickConfig {
    pub identify: String,
    pub convert: String,
    pub compare: String,
}

impl Default for ImageMagickConfig {
    fn default() -> Self {
        Self {
            identify: "identify".to_string(),
            convert: "convert".to_string(),
            compare: "compare".to_string(),
        }
    }
}
