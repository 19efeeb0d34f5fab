//! Error types for capture

use screenlly_common::Rect;
use thiserror::Error;

use crate::driver::DriverError;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Driver error: {0}")]
    Driver(#[from] DriverError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] screenlly_common::Error),

    #[error("Capture target {0} has no area")]
    EmptyTarget(Rect),

    #[error("Element capture failed: {0}")]
    Element(String),
}

pub type CaptureResult<T> = Result<T, CaptureError>;
