//! Canvas size equalization before comparison

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::error::CompareResult;
use crate::tool::ImageTool;

/// Fill used for the area added by padding
pub const PAD_BACKGROUND: &str = "white";

/// A pair of same-sized images ready for comparison.
///
/// When padding was needed the padded copies live in a temporary directory
/// owned by this value and removed when it is dropped.
#[derive(Debug)]
pub struct Normalized {
    first: PathBuf,
    second: PathBuf,
    workspace: Option<TempDir>,
}

impl Normalized {
    pub fn first(&self) -> &Path {
        &self.first
    }

    pub fn second(&self) -> &Path {
        &self.second
    }

    pub fn is_padded(&self) -> bool {
        self.workspace.is_some()
    }
}

/// Pad both images to the larger width and the larger height.
///
/// Images that already have the same dimensions are returned as-is and no
/// temporary files are created.
pub async fn normalize_dimensions(tool: &dyn ImageTool, first: &Path, second: &Path) -> CompareResult<Normalized> {
    let first_size = tool.identify(first).await?;
    let second_size = tool.identify(second).await?;
    if first_size == second_size {
        return Ok(Normalized {
            first: first.to_path_buf(),
            second: second.to_path_buf(),
            workspace: None,
        });
    }

    let size = screenlly_common::Size::new(
        first_size.width.max(second_size.width),
        first_size.height.max(second_size.height),
    );
    debug!(
        "Dimensions differ ({} vs {}), padding both to {}",
        first_size, second_size, size
    );

    let workspace = tempfile::Builder::new().prefix("screenlly-").tempdir()?;
    let padded_first = workspace.path().join(padded_name("1", first));
    let padded_second = workspace.path().join(padded_name("2", second));
    tool.pad(first, size, PAD_BACKGROUND, &padded_first).await?;
    tool.pad(second, size, PAD_BACKGROUND, &padded_second).await?;

    Ok(Normalized {
        first: padded_first,
        second: padded_second,
        workspace: Some(workspace),
    })
}

fn padded_name(prefix: &str, path: &Path) -> String {
    let base = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image.png".to_string());
    format!("{}{}", prefix, base)
}
