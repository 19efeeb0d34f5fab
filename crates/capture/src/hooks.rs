//! Optional callbacks invoked at fixed points of a capture run

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use screenlly_common::Selector;

use crate::driver::{Driver, DriverResult, ElementHandle};

/// Runs once per browser session, after the window is sized
#[async_trait]
pub trait SessionHook: Send + Sync {
    async fn call(&self, driver: &dyn Driver) -> DriverResult<()>;
}

/// Runs once per page, after navigation and masking, before capture
#[async_trait]
pub trait PageHook: Send + Sync {
    async fn call(&self, driver: &dyn Driver, url: &str) -> DriverResult<()>;
}

/// Runs exactly once per matched element, before either capture path
#[async_trait]
pub trait ElementHook: Send + Sync {
    async fn call(&self, driver: &dyn Driver, element: &ElementHandle, selector: &Selector) -> DriverResult<()>;
}

/// Receives `(paths, browser, url)` after each page is captured
pub type ReportHook = Arc<dyn Fn(&[PathBuf], &str, &str) + Send + Sync>;

#[derive(Clone, Default)]
pub struct CaptureHooks {
    pub prepare_global: Option<Arc<dyn SessionHook>>,
    pub prepare_page: Option<Arc<dyn PageHook>>,
    pub prepare_element: Option<Arc<dyn ElementHook>>,
    pub update_report: Option<ReportHook>,
}

impl CaptureHooks {
    pub async fn prepare_global(&self, driver: &dyn Driver) -> DriverResult<()> {
        match &self.prepare_global {
            Some(hook) => hook.call(driver).await,
            None => Ok(()),
        }
    }

    pub async fn prepare_page(&self, driver: &dyn Driver, url: &str) -> DriverResult<()> {
        match &self.prepare_page {
            Some(hook) => hook.call(driver, url).await,
            None => Ok(()),
        }
    }

    pub async fn prepare_element(&self, driver: &dyn Driver, element: &ElementHandle, selector: &Selector) -> DriverResult<()> {
        match &self.prepare_element {
            Some(hook) => hook.call(driver, element, selector).await,
            None => Ok(()),
        }
    }

    pub fn update_report(&self, paths: &[PathBuf], browser: &str, url: &str) {
        if let Some(hook) = &self.update_report {
            hook(paths, browser, url);
        }
    }
}

impl std::fmt::Debug for CaptureHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHooks")
            .field("prepare_global", &self.prepare_global.is_some())
            .field("prepare_page", &self.prepare_page.is_some())
            .field("prepare_element", &self.prepare_element.is_some())
            .field("update_report", &self.update_report.is_some())
            .finish()
    }
}
