//! Dissimilarity scoring and diff artifacts

use std::path::Path;
use std::sync::Arc;

use screenlly_common::DiffResult;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::error::CompareResult;
use crate::normalize::normalize_dimensions;
use crate::tool::ImageTool;

pub const DEFAULT_DIFF_COLOR: &str = "magenta";

/// Compares an expected image with a tested one through an [`ImageTool`]
#[derive(Clone)]
pub struct DiffEngine {
    tool: Arc<dyn ImageTool>,
    diff_color: String,
}

impl DiffEngine {
    pub fn new(tool: Arc<dyn ImageTool>) -> Self {
        Self {
            tool,
            diff_color: DEFAULT_DIFF_COLOR.to_string(),
        }
    }

    pub fn with_diff_color(mut self, color: impl Into<String>) -> Self {
        self.diff_color = color.into();
        self
    }

    pub fn diff_color(&self) -> &str {
        &self.diff_color
    }

    /// Score `tested` against `expected`; a nonzero score also writes the
    /// highlighted diff to `result`
    pub async fn compare(&self, expected: &Path, tested: &Path, result: &Path) -> CompareResult<DiffResult> {
        if hash_file(expected).await? == hash_file(tested).await? {
            debug!("{} and {} are byte-identical", expected.display(), tested.display());
            return Ok(DiffResult::identical());
        }

        let normalized = normalize_dimensions(self.tool.as_ref(), expected, tested).await?;
        let dissimilarity = self
            .tool
            .dissimilarity(normalized.first(), normalized.second())
            .await?;
        if dissimilarity == 0.0 {
            return Ok(DiffResult::identical());
        }

        self.tool
            .composite_diff(normalized.first(), normalized.second(), &self.diff_color, result)
            .await?;
        info!(
            "{} differs from baseline by {} pixel(s), diff written to {}",
            tested.display(),
            dissimilarity,
            result.display()
        );

        Ok(DiffResult {
            dissimilarity,
            diff_artifact_path: Some(result.to_path_buf()),
        })
    }
}

impl std::fmt::Debug for DiffEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiffEngine")
            .field("diff_color", &self.diff_color)
            .finish_non_exhaustive()
    }
}

async fn hash_file(path: &Path) -> CompareResult<String> {
    let data = tokio::fs::read(path).await?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}
