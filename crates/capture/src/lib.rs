//! Screenlly capture engine
//!
//! Reconstructs full-page (and full-element) screenshots from a sequence of
//! viewport-sized captures taken through a browser driving capability.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CaptureRunner                                              │
//! │    ├── per browser: Session (always disposed)               │
//! │    │     └── per url: navigate, mask, prepare_page          │
//! │    │           ├── ViewportTiler ── full page               │
//! │    │           └── ElementCapture ── per selector           │
//! │    │                 └── falls back to ViewportTiler        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ViewportTiler                                              │
//! │    ├── GeometryProber   content / viewport / header sizes   │
//! │    ├── TileGrid         scroll positions, row-major         │
//! │    ├── ScrollSync       scroll + bounded settle polling     │
//! │    └── Canvas           crop each frame, paste at offset    │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod driver;
pub mod element;
pub mod error;
pub mod geometry;
pub mod grid;
pub mod hooks;
pub mod mask;
pub mod scripts;
pub mod scroll;
pub mod session;
pub mod tiler;
pub mod webdriver;

pub use driver::{Driver, DriverError, DriverFactory, DriverResult, ElementHandle, ElementRect, ScriptArg};
pub use element::{ElementCapture, ElementCaptureOutcome};
pub use error::{CaptureError, CaptureResult};
pub use geometry::GeometryProber;
pub use grid::TileGrid;
pub use hooks::CaptureHooks;
pub use scroll::{ScrollSync, ScrollTarget, Settled};
pub use session::{CaptureRequest, CaptureRunner, Session};
pub use tiler::{CaptureOutput, OutputTarget, TileOptions, ViewportFrame, ViewportTiler};
pub use webdriver::{WebDriverFactory, WebDriverSession};
