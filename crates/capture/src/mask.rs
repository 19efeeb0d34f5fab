//! Paint over dynamic elements before capture

use screenlly_common::Selector;
use tracing::{debug, trace};

use crate::driver::{Driver, DriverError, DriverResult, ScriptArg};
use crate::scripts;

/// Replace the content of every element matching `selectors` with a solid
/// block of `color` the size of the element. Returns how many were masked.
///
/// Elements that go stale between lookup and masking are skipped.
pub async fn mask_elements(driver: &dyn Driver, selectors: &[Selector], color: &str) -> DriverResult<usize> {
    let mut masked = 0;
    for selector in selectors {
        for element in driver.find_elements(selector).await? {
            let result = async {
                let rect = driver.element_rect(&element).await?;
                driver
                    .execute_script(
                        scripts::MASK_ELEMENT,
                        vec![
                            ScriptArg::element(&element),
                            ScriptArg::number(rect.width.max(0.0) as u32),
                            ScriptArg::number(rect.height.max(0.0) as u32),
                            ScriptArg::string(color),
                        ],
                    )
                    .await
            }
            .await;

            match result {
                Ok(_) => masked += 1,
                Err(DriverError::StaleElement(e)) => {
                    trace!("Skipping stale element {} for {}: {}", element, selector, e);
                }
                Err(e) => return Err(e),
            }
        }
    }
    if masked > 0 {
        debug!("Masked {} element(s)", masked);
    }
    Ok(masked)
}
