//! Error types for comparison

use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Tool {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("Unparsable dissimilarity score: {0:?}")]
    UnparsableScore(String),

    #[error("Unparsable image dimensions: {0:?}")]
    UnparsableDimensions(String),
}

pub type CompareResult<T> = Result<T, CompareError>;
