//! Capture Command

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use screenlly_capture::{CaptureRequest, CaptureRunner, WebDriverFactory};
use screenlly_common::{CapturedPage, RunConfig};
use serde::Serialize;

use crate::output::{print_list, print_success, print_warnings, write_report, OutputFormat, TableDisplay};

#[derive(Args, Debug)]
pub struct CaptureArgs {
    /// WebDriver endpoint
    #[arg(long, env = "SCREENLLY_GRID_URL")]
    pub grid_url: Option<String>,

    /// Base URL joined with every page URL
    #[arg(long)]
    pub host: Option<String>,

    /// Directory screenshots are written under
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Page to capture (repeatable; replaces the configured list)
    #[arg(short, long = "url")]
    pub urls: Vec<String>,

    /// Only use these browser profiles (repeatable)
    #[arg(short, long = "browser")]
    pub browsers: Vec<String>,

    /// JSON capture report path, outside the screenshot directory
    #[arg(long, default_value = "capture-report.json")]
    pub report: PathBuf,
}

impl CaptureArgs {
    /// Fold command-line overrides into the loaded configuration
    fn apply(&self, config: &mut RunConfig) {
        if let Some(grid_url) = &self.grid_url {
            config.grid_url = grid_url.clone();
        }
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(output) = &self.output {
            config.screenshots_dir = output.clone();
        }
        if !self.urls.is_empty() {
            config.urls = self.urls.clone();
        }
    }

    /// Reject a report path inside the screenshot tree
    fn check_report_path(&self, config: &RunConfig) -> Result<()> {
        if self.report.starts_with(&config.screenshots_dir) {
            bail!(
                "Capture report {} lies inside the screenshot directory {}; pass --report with a path outside it",
                self.report.display(),
                config.screenshots_dir.display()
            );
        }
        Ok(())
    }

    fn request(&self) -> CaptureRequest {
        CaptureRequest {
            browsers: (!self.browsers.is_empty()).then(|| self.browsers.clone()),
            ..CaptureRequest::default()
        }
    }
}

/// Captured page display wrapper for serialization
#[derive(Serialize)]
pub struct CapturedDisplay {
    pub browser: String,
    pub url: String,
    pub files: Vec<String>,
}

impl From<&CapturedPage> for CapturedDisplay {
    fn from(page: &CapturedPage) -> Self {
        Self {
            browser: page.browser.clone(),
            url: page.url.clone(),
            files: page.paths.iter().map(|p| p.display().to_string()).collect(),
        }
    }
}

impl TableDisplay for CapturedDisplay {
    fn headers() -> Vec<&'static str> {
        vec!["Browser", "URL", "Files"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.browser.clone(), self.url.clone(), self.files.join("\n")]
    }
}

pub async fn execute(args: CaptureArgs, mut config: RunConfig, format: OutputFormat) -> Result<()> {
    args.apply(&mut config);
    config.validate()?;
    args.check_report_path(&config)?;

    if config.urls.is_empty() {
        bail!("No URLs to capture; set `urls` in the configuration or pass --url");
    }
    if config.browsers.is_empty() {
        bail!("No browser profiles configured");
    }

    let factory = WebDriverFactory::new(config.grid_url.clone());
    let runner = CaptureRunner::new(config, factory);
    let report = runner.take_screenshots(&args.request()).await;

    write_report(&args.report, &report)?;

    let rows: Vec<CapturedDisplay> = report.captured.iter().map(CapturedDisplay::from).collect();
    print_list(&rows, format);
    if format == OutputFormat::Table {
        print_warnings(&report.warnings);
        print_success(&format!(
            "Captured {} page(s) with {} warning(s)",
            report.captured.len(),
            report.warnings.len()
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    impl Default for CaptureArgs {
        fn default() -> Self {
            Self {
                grid_url: None,
                host: None,
                output: None,
                urls: Vec::new(),
                browsers: Vec::new(),
                report: PathBuf::from("capture-report.json"),
            }
        }
    }

    #[test]
    fn test_overrides_replace_configured_values() {
        let mut config = RunConfig {
            urls: vec!["/".into()],
            ..RunConfig::default()
        };
        let args = CaptureArgs {
            grid_url: Some("http://grid:4444/wd/hub".into()),
            output: Some(PathBuf::from("shots")),
            urls: vec!["/about".into(), "/pricing".into()],
            ..CaptureArgs::default()
        };

        args.apply(&mut config);

        assert_eq!(config.grid_url, "http://grid:4444/wd/hub");
        assert_eq!(config.screenshots_dir, PathBuf::from("shots"));
        assert_eq!(config.urls, vec!["/about".to_string(), "/pricing".to_string()]);
        assert!(config.host.is_empty());
    }

    #[test]
    fn test_browser_filter_only_when_given() {
        assert!(CaptureArgs::default().request().browsers.is_none());

        let args = CaptureArgs {
            browsers: vec!["firefox".into()],
            ..CaptureArgs::default()
        };
        assert_eq!(args.request().browsers, Some(vec!["firefox".to_string()]));
    }

    #[test]
    fn test_report_must_stay_outside_screenshots() {
        let config = RunConfig {
            screenshots_dir: PathBuf::from("shots"),
            ..RunConfig::default()
        };
        assert!(CaptureArgs::default().check_report_path(&config).is_ok());

        let inside = CaptureArgs {
            report: PathBuf::from("shots/capture-report.json"),
            ..CaptureArgs::default()
        };
        assert!(inside.check_report_path(&config).is_err());
    }
}
