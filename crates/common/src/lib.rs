//! Screenlly Common Library
//!
//! Shared data model, configuration and screenshot path naming used by the
//! capture and compare crates.

pub mod config;
pub mod error;
pub mod naming;
pub mod types;

pub use config::{
    BrowserProfile, ImageMagickConfig, RunConfig, Selector, SettleConfig, WindowSize,
};
pub use error::{Error, Result};
pub use types::*;

/// Screenlly version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
