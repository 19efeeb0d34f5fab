//! Capture runs: every page under every configured browser

use std::path::{Path, PathBuf};
use std::sync::Arc;

use screenlly_common::naming::{screenshot_path, selector_path};
use screenlly_common::{
    BrowserProfile, CaptureReport, CapturedPage, RunConfig, RunWarning, Selector, WarningScope,
};
use tracing::{debug, info, warn};

use crate::driver::{Driver, DriverFactory, DriverResult};
use crate::element::ElementCapture;
use crate::error::CaptureResult;
use crate::hooks::CaptureHooks;
use crate::mask::mask_elements;
use crate::tiler::{TileOptions, ViewportTiler};

/// A live browser session that is always disposed.
///
/// [`Session::close`] disposes it explicitly. If the session is dropped
/// without being closed (early return, panic, cancelled future) disposal is
/// spawned on the current runtime.
pub struct Session {
    browser: String,
    driver: Arc<dyn Driver>,
    closed: bool,
}

impl Session {
    pub fn new(browser: impl Into<String>, driver: Arc<dyn Driver>) -> Self {
        Self {
            browser: browser.into(),
            driver,
            closed: false,
        }
    }

    pub fn driver(&self) -> &dyn Driver {
        self.driver.as_ref()
    }

    pub async fn close(mut self) -> DriverResult<()> {
        self.closed = true;
        debug!("Disposing {} session", self.browser);
        self.driver.dispose().await
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        warn!("{} session dropped without close, disposing in background", self.browser);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let driver = Arc::clone(&self.driver);
            let browser = self.browser.clone();
            handle.spawn(async move {
                if let Err(e) = driver.dispose().await {
                    warn!("Failed to dispose {} session: {}", browser, e);
                }
            });
        }
    }
}

/// Overrides for one call of [`CaptureRunner::take_screenshots`]; `None`
/// falls back to the run configuration
#[derive(Debug, Clone, Default)]
pub struct CaptureRequest {
    pub urls: Option<Vec<String>>,

    /// Browser profile names to use
    pub browsers: Option<Vec<String>>,

    pub elements: Option<Vec<Selector>>,
}

/// Captures configured pages in every configured browser.
///
/// Failures are contained: a browser that cannot start or a page that
/// cannot be captured becomes a [`RunWarning`] and the run moves on.
pub struct CaptureRunner<F: DriverFactory> {
    config: RunConfig,
    factory: F,
    hooks: CaptureHooks,
}

impl<F: DriverFactory> CaptureRunner<F> {
    pub fn new(config: RunConfig, factory: F) -> Self {
        Self {
            config,
            factory,
            hooks: CaptureHooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: CaptureHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub async fn take_screenshots(&self, request: &CaptureRequest) -> CaptureReport {
        let urls = request.urls.as_ref().unwrap_or(&self.config.urls);
        let elements = request.elements.as_ref().unwrap_or(&self.config.elements);

        let mut report = CaptureReport::default();
        for (name, profile) in &self.config.browsers {
            if let Some(wanted) = &request.browsers {
                if !wanted.iter().any(|b| b == name) {
                    continue;
                }
            }

            let driver = match self.factory.connect(name, profile).await {
                Ok(driver) => driver,
                Err(e) => {
                    warn!("Could not start {}: {}", name, e);
                    report.warnings.push(RunWarning::new(
                        WarningScope::Browser {
                            browser: name.clone(),
                        },
                        format!("session setup failed: {}", e),
                    ));
                    continue;
                }
            };

            let session = Session::new(name.clone(), driver);
            if let Err(e) = self
                .run_browser(session.driver(), name, profile, urls, elements, &mut report)
                .await
            {
                warn!("Browser {} setup failed: {}", name, e);
                report.warnings.push(RunWarning::new(
                    WarningScope::Browser {
                        browser: name.clone(),
                    },
                    format!("session setup failed: {}", e),
                ));
            }

            if let Err(e) = session.close().await {
                warn!("Failed to dispose {} session: {}", name, e);
            }
        }

        info!(
            "Captured {} page(s), {} warning(s)",
            report.captured.len(),
            report.warnings.len()
        );
        report
    }

    async fn run_browser(
        &self,
        driver: &dyn Driver,
        browser: &str,
        profile: &BrowserProfile,
        urls: &[String],
        elements: &[Selector],
        report: &mut CaptureReport,
    ) -> CaptureResult<()> {
        match profile.window_size {
            Some(size) => driver.set_window_size(size.width, size.height).await?,
            None => driver.maximize_window().await?,
        }
        self.hooks.prepare_global(driver).await?;

        for url in urls {
            match self.capture_page(driver, browser, url, elements, report).await {
                Ok(paths) => {
                    self.hooks.update_report(&paths, browser, url);
                    report.captured.push(CapturedPage {
                        browser: browser.to_string(),
                        url: url.clone(),
                        paths,
                    });
                }
                Err(e) => {
                    warn!("Capture of {} in {} failed: {}", url, browser, e);
                    report.warnings.push(RunWarning::new(
                        WarningScope::Page {
                            browser: browser.to_string(),
                            url: url.clone(),
                        },
                        e.to_string(),
                    ));
                }
            }
        }
        Ok(())
    }

    async fn capture_page(
        &self,
        driver: &dyn Driver,
        browser: &str,
        url: &str,
        elements: &[Selector],
        report: &mut CaptureReport,
    ) -> CaptureResult<Vec<PathBuf>> {
        let full_url = self.config.full_url(url)?;
        driver.navigate(&full_url).await?;

        let path = screenshot_path(&self.config.screenshots_dir, url, browser);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        mask_elements(driver, &self.config.mask_elements, &self.config.mask_color).await?;
        self.hooks.prepare_page(driver, url).await?;

        self.take_page_screenshot(driver, &path, elements, &mut report.warnings)
            .await
    }

    /// Full page when `elements` is empty, otherwise every element of every
    /// selector. Several selectors get numbered sub-directories.
    pub async fn take_page_screenshot(
        &self,
        driver: &dyn Driver,
        path: &Path,
        elements: &[Selector],
        warnings: &mut Vec<RunWarning>,
    ) -> CaptureResult<Vec<PathBuf>> {
        if elements.is_empty() {
            let options = TileOptions {
                target: None,
                fixed_header: self.config.fixed_header.clone(),
                scrollable_element: self.config.scrollable_element.clone(),
            };
            let path = ViewportTiler::new(driver, self.config.settle)
                .capture_to_file(&options, path)
                .await?;
            return Ok(vec![path]);
        }

        let capture = ElementCapture::new(driver, &self.hooks, self.config.settle);
        let mut paths = Vec::new();
        for (index, selector) in elements.iter().enumerate() {
            let selector_file = selector_path(path, index, elements.len());
            let outcome = capture.capture(selector, &selector_file).await?;
            paths.extend(outcome.paths);
            warnings.extend(outcome.warnings);
        }
        Ok(paths)
    }
}
