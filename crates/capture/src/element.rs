//! Element screenshots with a tiled fallback

use std::path::{Path, PathBuf};

use screenlly_common::naming::element_path;
use screenlly_common::{RunWarning, Selector, SettleConfig, WarningScope};
use tracing::{debug, warn};

use crate::driver::{Driver, DriverError, ElementHandle};
use crate::error::{CaptureError, CaptureResult};
use crate::geometry::GeometryProber;
use crate::hooks::CaptureHooks;
use crate::tiler::{TileOptions, ViewportTiler};

/// Files written for one selector and the fallbacks that were needed
#[derive(Debug, Clone, Default)]
pub struct ElementCaptureOutcome {
    pub paths: Vec<PathBuf>,
    pub warnings: Vec<RunWarning>,
}

/// Captures every element matching a selector.
///
/// Each element is first captured directly by the browser. When that fails
/// (stale reference, unsupported command, zero-size element) the element's
/// bounding box is captured through the [`ViewportTiler`] instead.
pub struct ElementCapture<'a> {
    driver: &'a dyn Driver,
    hooks: &'a CaptureHooks,
    settle: SettleConfig,
}

impl<'a> ElementCapture<'a> {
    pub fn new(driver: &'a dyn Driver, hooks: &'a CaptureHooks, settle: SettleConfig) -> Self {
        Self { driver, hooks, settle }
    }

    /// Capture all matches of `selector`. With more than one match each
    /// path gets an `_{index}` suffix before the extension.
    pub async fn capture(&self, selector: &Selector, file_path: &Path) -> CaptureResult<ElementCaptureOutcome> {
        let elements = self.driver.find_elements(selector).await?;
        let total = elements.len();
        debug!("{} element(s) match {}", total, selector);

        let mut outcome = ElementCaptureOutcome::default();
        for (index, element) in elements.iter().enumerate() {
            self.hooks.prepare_element(self.driver, element, selector).await?;

            let path = element_path(file_path, index, total);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            if let Err(e) = self.capture_direct(element, &path).await {
                warn!(
                    "Direct capture of element #{} of {} failed, capturing from the page instead: {}",
                    index, selector, e
                );
                outcome.warnings.push(RunWarning::new(
                    WarningScope::Element {
                        selector: selector.to_string(),
                        index,
                    },
                    format!("direct capture failed, used page tiles: {}", e),
                ));
                self.capture_from_page(element, &path).await?;
            }
            outcome.paths.push(path);
        }

        Ok(outcome)
    }

    async fn capture_direct(&self, element: &ElementHandle, path: &Path) -> CaptureResult<()> {
        let bytes = self.driver.capture_element(element).await?;
        let raster = image::load_from_memory(&bytes)?;
        if raster.width() == 0 || raster.height() == 0 {
            return Err(CaptureError::Element(format!("element {} has no area", element)));
        }
        std::fs::write(path, &bytes)?;
        Ok(())
    }

    async fn capture_from_page(&self, element: &ElementHandle, path: &Path) -> CaptureResult<()> {
        let rect = GeometryProber::new(self.driver).element_rect(element).await?;
        if rect.is_empty() {
            return Err(DriverError::Unsupported(format!("element {} has zero size {}", element, rect)).into());
        }
        let options = TileOptions::default().with_target(rect);
        ViewportTiler::new(self.driver, self.settle)
            .capture_to_file(&options, path)
            .await?;
        Ok(())
    }
}
