//! WebDriver implementation of the driving capability

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use fantoccini::elements::Element;
use fantoccini::error::CmdError;
use fantoccini::{Client, ClientBuilder, Locator};
use parking_lot::Mutex;
use screenlly_common::{BrowserProfile, Selector};
use serde_json::Value;
use tracing::{debug, info};

use crate::driver::{Driver, DriverError, DriverFactory, DriverResult, ElementHandle, ElementRect, ScriptArg};

/// A remote WebDriver session (Selenium grid, geckodriver, chromedriver)
pub struct WebDriverSession {
    client: Client,

    /// Elements handed out for the current page, keyed by handle id
    elements: Mutex<HashMap<String, Element>>,
    next_id: AtomicU64,
}

impl WebDriverSession {
    pub async fn connect(grid_url: &str, capabilities: serde_json::Map<String, Value>) -> DriverResult<Self> {
        debug!("Connecting to WebDriver at {}", grid_url);
        let client = ClientBuilder::native()
            .capabilities(capabilities)
            .connect(grid_url)
            .await
            .map_err(|e| DriverError::Session(format!("{}: {}", grid_url, e)))?;

        Ok(Self {
            client,
            elements: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(0),
        })
    }

    fn register(&self, element: Element) -> ElementHandle {
        let id = format!("el-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        self.elements.lock().insert(id.clone(), element);
        ElementHandle::new(id)
    }

    fn element(&self, handle: &ElementHandle) -> DriverResult<Element> {
        self.elements
            .lock()
            .get(handle.id())
            .cloned()
            .ok_or_else(|| DriverError::StaleElement(handle.to_string()))
    }

    fn script_arg(&self, arg: ScriptArg) -> DriverResult<Value> {
        match arg {
            ScriptArg::Value(value) => Ok(value),
            ScriptArg::Element(handle) => {
                let element = self.element(&handle)?;
                serde_json::to_value(&element).map_err(|e| DriverError::Command(e.to_string()))
            }
        }
    }
}

fn command_error(e: CmdError) -> DriverError {
    let message = e.to_string();
    if message.contains("stale element") {
        DriverError::StaleElement(message)
    } else if message.contains("unsupported operation") || message.contains("unknown command") {
        DriverError::Unsupported(message)
    } else {
        DriverError::Command(message)
    }
}

#[async_trait]
impl Driver for WebDriverSession {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        info!("Navigating to {}", url);
        // Handles from the previous page are meaningless now.
        self.elements.lock().clear();
        self.client.goto(url).await.map_err(command_error)
    }

    async fn execute_script(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value> {
        let args = args
            .into_iter()
            .map(|arg| self.script_arg(arg))
            .collect::<DriverResult<Vec<_>>>()?;
        self.client.execute(script, args).await.map_err(command_error)
    }

    async fn find_elements(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>> {
        let locator = match selector {
            Selector::Xpath(expr) => Locator::XPath(expr),
            Selector::Css(expr) => Locator::Css(expr),
        };
        let found = self.client.find_all(locator).await.map_err(command_error)?;
        Ok(found.into_iter().map(|element| self.register(element)).collect())
    }

    async fn element_rect(&self, element: &ElementHandle) -> DriverResult<ElementRect> {
        let (x, y, width, height) = self
            .element(element)?
            .rectangle()
            .await
            .map_err(command_error)?;
        Ok(ElementRect { x, y, width, height })
    }

    async fn capture_element(&self, element: &ElementHandle) -> DriverResult<Vec<u8>> {
        self.element(element)?
            .screenshot()
            .await
            .map_err(command_error)
    }

    async fn capture_viewport(&self) -> DriverResult<Vec<u8>> {
        self.client.screenshot().await.map_err(command_error)
    }

    async fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()> {
        self.client
            .set_window_size(width, height)
            .await
            .map_err(command_error)
    }

    async fn maximize_window(&self) -> DriverResult<()> {
        self.client.maximize_window().await.map_err(command_error)
    }

    async fn dispose(&self) -> DriverResult<()> {
        self.elements.lock().clear();
        self.client
            .clone()
            .close()
            .await
            .map_err(|e| DriverError::Session(e.to_string()))
    }
}

/// Opens [`WebDriverSession`]s against one grid endpoint
#[derive(Debug, Clone)]
pub struct WebDriverFactory {
    grid_url: String,
}

impl WebDriverFactory {
    pub fn new(grid_url: impl Into<String>) -> Self {
        Self {
            grid_url: grid_url.into(),
        }
    }
}

#[async_trait]
impl DriverFactory for WebDriverFactory {
    async fn connect(&self, browser: &str, profile: &BrowserProfile) -> DriverResult<Arc<dyn Driver>> {
        info!("Starting {} session on {}", browser, self.grid_url);
        let session = WebDriverSession::connect(&self.grid_url, profile.capabilities.clone()).await?;
        Ok(Arc::new(session))
    }
}
