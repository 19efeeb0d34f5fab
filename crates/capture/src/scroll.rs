//! Scroll commands and settle polling

use screenlly_common::{Point, SettleConfig};
use tracing::{debug, trace};

use crate::driver::{Driver, DriverResult, ElementHandle, ScriptArg};
use crate::geometry::px_field;
use crate::scripts;

/// What receives scroll commands: the document or a custom container
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ScrollTarget {
    #[default]
    Document,
    Element(ElementHandle),
}

/// Offset observed once polling stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settled {
    pub offset: Point,

    /// Delayed re-reads performed after the first read
    pub polls: u32,
}

/// Issues absolute scrolls and waits, boundedly, for the offset to settle.
///
/// Settling never fails: after `settle.attempts` delayed polls the last
/// observed offset is returned whatever it is. Callers place tiles using
/// that observed offset, never the requested one, since browsers clamp
/// scroll requests near the content edge.
pub struct ScrollSync<'a> {
    driver: &'a dyn Driver,
    target: &'a ScrollTarget,
    max_offset: Point,
    settle: SettleConfig,
}

impl<'a> ScrollSync<'a> {
    pub fn new(
        driver: &'a dyn Driver,
        target: &'a ScrollTarget,
        max_offset: Point,
        settle: SettleConfig,
    ) -> Self {
        Self {
            driver,
            target,
            max_offset,
            settle,
        }
    }

    pub async fn scroll_to(&self, position: Point) -> DriverResult<()> {
        trace!("Scrolling {:?} to {}", self.target, position);
        match self.target {
            ScrollTarget::Document => {
                self.driver
                    .execute_script(
                        scripts::WINDOW_SCROLL_TO,
                        vec![ScriptArg::number(position.x), ScriptArg::number(position.y)],
                    )
                    .await?;
            }
            ScrollTarget::Element(element) => {
                self.driver
                    .execute_script(
                        scripts::ELEMENT_SCROLL_TO,
                        vec![
                            ScriptArg::element(element),
                            ScriptArg::number(position.x),
                            ScriptArg::number(position.y),
                        ],
                    )
                    .await?;
            }
        }
        Ok(())
    }

    pub async fn current_offset(&self) -> DriverResult<Point> {
        let value = match self.target {
            ScrollTarget::Document => {
                self.driver
                    .execute_script(scripts::WINDOW_SCROLL_OFFSET, vec![])
                    .await?
            }
            ScrollTarget::Element(element) => {
                self.driver
                    .execute_script(scripts::ELEMENT_SCROLL_OFFSET, vec![ScriptArg::element(element)])
                    .await?
            }
        };
        Ok(Point::new(
            px_field(&value, "x", "scroll offset")?,
            px_field(&value, "y", "scroll offset")?,
        ))
    }

    /// Poll until the offset reaches `target` clamped to the maximum
    /// reachable offset, or the attempt budget runs out
    pub async fn wait_stable(&self, target: Point) -> DriverResult<Settled> {
        let reachable = self.reachable(target);
        let mut polls = 0;
        loop {
            let offset = self.current_offset().await?;
            if offset == reachable || polls >= self.settle.attempts {
                if offset != target {
                    debug!(
                        "Scroll settled at {} (requested {}, {} polls)",
                        offset, target, polls
                    );
                }
                return Ok(Settled { offset, polls });
            }
            tokio::time::sleep(self.settle.interval()).await;
            polls += 1;
        }
    }

    /// Scroll and wait; returns the observed offset
    pub async fn scroll_and_settle(&self, position: Point) -> DriverResult<Settled> {
        self.scroll_to(position).await?;
        self.wait_stable(position).await
    }

    /// Where a browser can actually land when asked for `target`
    fn reachable(&self, target: Point) -> Point {
        Point::new(target.x.min(self.max_offset.x), target.y.min(self.max_offset.y))
    }
}
