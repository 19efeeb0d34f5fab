//! Output formatting for CLI

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use screenlly_common::RunWarning;
use serde::Serialize;
use tracing::info;

/// Output format
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Trait for items that can be displayed in a table
pub trait TableDisplay {
    fn headers() -> Vec<&'static str>;
    fn row(&self) -> Vec<String>;
}

/// Print a list of items
pub fn print_list<T: Serialize + TableDisplay>(items: &[T], format: OutputFormat) {
    match format {
        OutputFormat::Table => {
            if items.is_empty() {
                println!("No items found.");
                return;
            }
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic);

            table.set_header(T::headers());
            for item in items {
                table.add_row(item.row());
            }

            println!("{table}");
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(items).unwrap_or_default());
        }
    }
}

/// Print run warnings, one per line
pub fn print_warnings(warnings: &[RunWarning]) {
    for warning in warnings {
        print_warning(&warning.to_string());
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("✅ {}", message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("❌ {}", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("⚠️  {}", message);
}

/// JSON report envelope written next to the screenshots
#[derive(Debug, Serialize)]
pub struct ReportFile<'a, T: Serialize> {
    pub generated_at: DateTime<Utc>,
    pub version: &'static str,
    pub report: &'a T,
}

/// Write `report` as pretty JSON to `path`, creating parent directories
pub fn write_report<T: Serialize>(path: &Path, report: &T) -> anyhow::Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let envelope = ReportFile {
        generated_at: Utc::now(),
        version: screenlly_common::VERSION,
        report,
    };
    std::fs::write(path, serde_json::to_string_pretty(&envelope)?)?;

    info!("Report written to: {}", path.display());
    Ok(path.to_path_buf())
}
