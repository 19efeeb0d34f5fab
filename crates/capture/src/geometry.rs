//! Page, viewport and element geometry

use screenlly_common::{Rect, Selector, Size};
use serde_json::Value;
use tracing::debug;

use crate::driver::{Driver, DriverError, DriverResult, ElementHandle, ScriptArg};
use crate::scripts;

/// Reads dimensions and offsets through the driving capability
pub struct GeometryProber<'a> {
    driver: &'a dyn Driver,
}

impl<'a> GeometryProber<'a> {
    pub fn new(driver: &'a dyn Driver) -> Self {
        Self { driver }
    }

    /// Scrollable content size of the document.
    ///
    /// With a scroll container the height is the larger of the document's and
    /// the container's own content height.
    pub async fn content_size(&self, container: Option<&ElementHandle>) -> DriverResult<Size> {
        let width = self.script_px(scripts::CONTENT_WIDTH, vec![], "content width").await?;
        let mut height = self.script_px(scripts::CONTENT_HEIGHT, vec![], "content height").await?;

        if let Some(container) = container {
            let inner = self
                .script_px(
                    scripts::ELEMENT_CONTENT_HEIGHT,
                    vec![ScriptArg::element(container)],
                    "container height",
                )
                .await?;
            height = height.max(inner);
        }

        debug!("Content size {}x{}", width, height);
        Ok(Size::new(width, height))
    }

    /// Live `innerWidth` x `innerHeight`
    pub async fn viewport_size(&self) -> DriverResult<Size> {
        let value = self.driver.execute_script(scripts::VIEWPORT_SIZE, vec![]).await?;
        let width = px_field(&value, "width", "viewport size")?;
        let height = px_field(&value, "height", "viewport size")?;
        Ok(Size::new(width, height))
    }

    /// Document-relative bounding box of an element
    pub async fn element_rect(&self, element: &ElementHandle) -> DriverResult<Rect> {
        Ok(self.driver.element_rect(element).await?.to_rect())
    }

    /// Lowest bottom edge among elements matching the fixed-header selector,
    /// zero when there is no selector or nothing matches
    pub async fn fixed_header_height(&self, selector: Option<&Selector>) -> DriverResult<u32> {
        let Some(selector) = selector else {
            return Ok(0);
        };

        let mut height = 0u32;
        for element in self.driver.find_elements(selector).await? {
            let rect = self.driver.element_rect(&element).await?;
            height = height.max(rect.bottom().max(0.0) as u32);
        }

        debug!("Fixed header height for {}: {}", selector, height);
        Ok(height)
    }

    async fn script_px(&self, script: &str, args: Vec<ScriptArg>, what: &str) -> DriverResult<u32> {
        let value = self.driver.execute_script(script, args).await?;
        as_px(&value, what)
    }
}

/// Interpret a script result as a whole, non-negative pixel count
pub(crate) fn as_px(value: &Value, what: &str) -> DriverResult<u32> {
    value
        .as_f64()
        .map(|n| n.max(0.0) as u32)
        .ok_or_else(|| DriverError::UnexpectedValue {
            what: what.to_string(),
            value: value.to_string(),
        })
}

pub(crate) fn px_field(value: &Value, field: &str, what: &str) -> DriverResult<u32> {
    match value.get(field) {
        Some(v) => as_px(v, what),
        None => Err(DriverError::UnexpectedValue {
            what: what.to_string(),
            value: value.to_string(),
        }),
    }
}
