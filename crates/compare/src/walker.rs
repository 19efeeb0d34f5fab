//! Pairs a tested screenshot tree with its baseline tree

use std::path::{Path, PathBuf};
use std::sync::Arc;

use screenlly_common::{ComparisonEntry, ComparisonReport, RunWarning, WarningScope};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::diff::DiffEngine;
use crate::error::CompareResult;

/// The three trees of one comparison run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompareRoots {
    pub expected: PathBuf,
    pub tested: PathBuf,
    pub result: PathBuf,
}

/// Extensions of files the walker treats as screenshots
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tif", "tiff"];

/// Whether `path` carries one of [`IMAGE_EXTENSIONS`], ignoring case
pub fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

/// Receives every compared pair together with the run's roots
pub type CompareReportHook = Arc<dyn Fn(&ComparisonEntry, &CompareRoots) + Send + Sync>;

#[derive(Clone, Default)]
pub struct CompareHooks {
    pub update_report_compare: Option<CompareReportHook>,
}

impl CompareHooks {
    pub fn update_report_compare(&self, entry: &ComparisonEntry, roots: &CompareRoots) {
        if let Some(hook) = &self.update_report_compare {
            hook(entry, roots);
        }
    }
}

impl std::fmt::Debug for CompareHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompareHooks")
            .field("update_report_compare", &self.update_report_compare.is_some())
            .finish()
    }
}

/// Walks the tested tree and diffs each file against the same relative path
/// in the expected tree.
///
/// Only image files are compared; reports and other files sharing the tree
/// are skipped. A missing baseline is a warning, not a failure. A failing
/// image tool aborts the walk.
#[derive(Debug, Clone)]
pub struct ComparisonWalker {
    engine: DiffEngine,
    hooks: CompareHooks,
}

impl ComparisonWalker {
    pub fn new(engine: DiffEngine) -> Self {
        Self {
            engine,
            hooks: CompareHooks::default(),
        }
    }

    pub fn with_hooks(mut self, hooks: CompareHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub async fn walk(&self, expected: &Path, tested: &Path, result: &Path) -> CompareResult<ComparisonReport> {
        let roots = CompareRoots {
            expected: expected.to_path_buf(),
            tested: tested.to_path_buf(),
            result: result.to_path_buf(),
        };
        let mut report = ComparisonReport::default();

        for entry in WalkDir::new(tested).sort_by_file_name() {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            if !is_image(entry.path()) {
                debug!("Skipping non-image file {}", entry.path().display());
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(tested) else {
                continue;
            };
            let relative = relative.to_path_buf();

            let baseline = expected.join(&relative);
            if !baseline.is_file() {
                warn!(
                    "No expected image for {} at {}",
                    relative.display(),
                    baseline.display()
                );
                report.warnings.push(RunWarning::new(
                    WarningScope::Baseline {
                        path: baseline.clone(),
                    },
                    format!("no expected image for {}", relative.display()),
                ));
                report.missing_baselines.push(relative);
                continue;
            }

            let result_path = result.join(&relative);
            if let Some(parent) = result_path.parent() {
                std::fs::create_dir_all(parent)?;
            }

            let diff = self.engine.compare(&baseline, entry.path(), &result_path).await?;
            let compared = ComparisonEntry {
                relative_path: relative,
                expected: baseline,
                tested: entry.path().to_path_buf(),
                result: result_path.clone(),
                dissimilarity: diff.dissimilarity,
            };
            self.hooks.update_report_compare(&compared, &roots);

            if !diff.is_identical() {
                report.mismatches.push(result_path);
            }
            report.compared.push(compared);
        }

        info!(
            "Compared {} image(s): {} mismatch(es), {} without baseline",
            report.compared.len(),
            report.mismatches.len(),
            report.missing_baselines.len()
        );
        Ok(report)
    }
}
