//! Error types for Screenlly

use thiserror::Error;

/// Result type alias using the common Screenlly error
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid rectangle: top-left ({left}, {top}) lies past bottom-right ({right}, {bottom})")]
    InvalidRect {
        left: u32,
        top: u32,
        right: u32,
        bottom: u32,
    },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}
