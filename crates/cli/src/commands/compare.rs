//! Compare Command

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;
use screenlly_common::{ComparisonEntry, ComparisonReport, RunConfig};
use screenlly_compare::{ComparisonWalker, DiffEngine, ImageMagick};
use serde::Serialize;

use crate::output::{print_error, print_list, print_success, print_warnings, write_report, OutputFormat, TableDisplay};

/// Written to the results root, which is never walked
const COMPARE_REPORT: &str = "compare-report.json";

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Baseline screenshot tree
    pub expected: PathBuf,

    /// Freshly captured screenshot tree
    pub tested: PathBuf,

    /// Where diff images and the report are written
    pub result: PathBuf,

    /// Colour for differing pixels in diff images
    #[arg(long)]
    pub diff_color: Option<String>,
}

/// Comparison entry display wrapper for serialization
#[derive(Serialize)]
pub struct ComparisonDisplay {
    pub file: String,
    pub dissimilarity: f64,
    pub diff: Option<String>,
}

impl From<&ComparisonEntry> for ComparisonDisplay {
    fn from(entry: &ComparisonEntry) -> Self {
        Self {
            file: entry.relative_path.display().to_string(),
            dissimilarity: entry.dissimilarity,
            diff: (entry.dissimilarity > 0.0).then(|| entry.result.display().to_string()),
        }
    }
}

impl TableDisplay for ComparisonDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Status", "File", "Dissimilarity", "Diff"]
    }

    fn row(&self) -> Vec<String> {
        let status = if self.dissimilarity > 0.0 {
            "✗ Changed".red().to_string()
        } else {
            "✓ Same".green().to_string()
        };
        vec![
            status,
            self.file.clone(),
            format!("{}", self.dissimilarity),
            self.diff.clone().unwrap_or_default(),
        ]
    }
}

pub async fn execute(args: CompareArgs, config: RunConfig, format: OutputFormat) -> Result<()> {
    let tool = ImageMagick::from_config(&config.imagemagick);
    if !tool.is_available().await {
        bail!(
            "ImageMagick `{}` is not available; install ImageMagick or set `imagemagick` in the configuration",
            config.imagemagick.identify
        );
    }

    let diff_color = args.diff_color.clone().unwrap_or(config.diff_color);
    let engine = DiffEngine::new(Arc::new(tool)).with_diff_color(diff_color);
    let report = ComparisonWalker::new(engine)
        .walk(&args.expected, &args.tested, &args.result)
        .await?;

    write_report(&args.result.join(COMPARE_REPORT), &report)?;
    print_report(&report, format);

    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &ComparisonReport, format: OutputFormat) {
    let rows: Vec<ComparisonDisplay> = report.compared.iter().map(ComparisonDisplay::from).collect();
    print_list(&rows, format);
    if format == OutputFormat::Json {
        return;
    }

    print_warnings(&report.warnings);
    if report.is_clean() {
        print_success(&format!("{} image(s) match their baseline", report.compared.len()));
    } else {
        print_error(&format!(
            "{} of {} image(s) differ from their baseline",
            report.mismatches.len(),
            report.compared.len()
        ));
    }
}
