//! External image tool capability and its ImageMagick implementation

use std::ffi::OsStr;
use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use screenlly_common::{ImageMagickConfig, Size};
use tokio::process::Command;
use tracing::{debug, trace};

use crate::error::{CompareError, CompareResult};

/// Everything the diff engine needs from an image tool
#[async_trait]
pub trait ImageTool: Send + Sync {
    /// Pixel dimensions of the image at `path`
    async fn identify(&self, path: &Path) -> CompareResult<Size>;

    /// Write `source` extended to `size` with `background` fill, anchored at
    /// the origin and never scaled
    async fn pad(&self, source: &Path, size: Size, background: &str, dest: &Path) -> CompareResult<()>;

    /// Absolute-error count of differing pixels; zero means identical
    async fn dissimilarity(&self, first: &Path, second: &Path) -> CompareResult<f64>;

    /// Write `first` with every pixel that differs from `second` painted `color`
    async fn composite_diff(&self, first: &Path, second: &Path, color: &str, dest: &Path) -> CompareResult<()>;
}

/// The `identify`, `convert` and `compare` command-line programs
#[derive(Debug, Clone)]
pub struct ImageMagick {
    identify: String,
    convert: String,
    compare: String,
}

impl Default for ImageMagick {
    fn default() -> Self {
        Self::from_config(&ImageMagickConfig::default())
    }
}

impl ImageMagick {
    pub fn from_config(config: &ImageMagickConfig) -> Self {
        Self {
            identify: config.identify.clone(),
            convert: config.convert.clone(),
            compare: config.compare.clone(),
        }
    }

    /// Whether `identify -version` runs successfully
    pub async fn is_available(&self) -> bool {
        match Command::new(&self.identify).arg("-version").output().await {
            Ok(output) => output.status.success(),
            Err(_) => false,
        }
    }

    async fn run<I, S>(&self, program: &str, args: I) -> CompareResult<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(program);
        command.args(args);
        trace!("Running {:?}", command);
        command.output().await.map_err(|source| CompareError::Spawn {
            program: program.to_string(),
            source,
        })
    }

    async fn run_checked<I, S>(&self, program: &str, args: I) -> CompareResult<Output>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.run(program, args).await?;
        if !output.status.success() {
            return Err(tool_error(program, &output));
        }
        Ok(output)
    }
}

fn tool_error(program: &str, output: &Output) -> CompareError {
    CompareError::Tool {
        program: program.to_string(),
        status: output.status,
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
    }
}

#[async_trait]
impl ImageTool for ImageMagick {
    async fn identify(&self, path: &Path) -> CompareResult<Size> {
        let output = self
            .run_checked(&self.identify, [OsStr::new("-format"), OsStr::new("%w,%h"), path.as_os_str()])
            .await?;
        parse_dimensions(&String::from_utf8_lossy(&output.stdout))
    }

    async fn pad(&self, source: &Path, size: Size, background: &str, dest: &Path) -> CompareResult<()> {
        debug!("Padding {} to {}", source.display(), size);
        let extent = size.to_string();
        self.run_checked(
            &self.convert,
            [
                source.as_os_str(),
                OsStr::new("-background"),
                OsStr::new(background),
                OsStr::new("-extent"),
                OsStr::new(&extent),
                dest.as_os_str(),
            ],
        )
        .await?;
        Ok(())
    }

    async fn dissimilarity(&self, first: &Path, second: &Path) -> CompareResult<f64> {
        let output = self
            .run(
                &self.compare,
                [
                    OsStr::new("-dissimilarity-threshold"),
                    OsStr::new("1"),
                    OsStr::new("-metric"),
                    OsStr::new("AE"),
                    first.as_os_str(),
                    second.as_os_str(),
                    OsStr::new("null:"),
                ],
            )
            .await?;

        // compare exits 1 when the images differ and 2 on trouble.
        match output.status.code() {
            Some(0) | Some(1) => {}
            _ => return Err(tool_error(&self.compare, &output)),
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).into_owned()
        } else {
            stdout.into_owned()
        };
        parse_score(&text)
    }

    async fn composite_diff(&self, first: &Path, second: &Path, color: &str, dest: &Path) -> CompareResult<()> {
        self.run_checked(
            &self.convert,
            [
                first.as_os_str(),
                OsStr::new("("),
                OsStr::new("-clone"),
                OsStr::new("0"),
                second.as_os_str(),
                OsStr::new("-compose"),
                OsStr::new("difference"),
                OsStr::new("-composite"),
                OsStr::new("-threshold"),
                OsStr::new("5%"),
                OsStr::new("-fill"),
                OsStr::new(color),
                OsStr::new("-opaque"),
                OsStr::new("white"),
                OsStr::new("-transparent"),
                OsStr::new("black"),
                OsStr::new(")"),
                OsStr::new("-compose"),
                OsStr::new("over"),
                OsStr::new("-composite"),
                dest.as_os_str(),
            ],
        )
        .await?;
        Ok(())
    }
}

/// Parse `identify -format %w,%h` output
pub fn parse_dimensions(text: &str) -> CompareResult<Size> {
    let unparsable = || CompareError::UnparsableDimensions(text.to_string());
    let (width, height) = text.trim().split_once(',').ok_or_else(unparsable)?;
    let width = width.trim().parse().map_err(|_| unparsable())?;
    let height = height.trim().parse().map_err(|_| unparsable())?;
    Ok(Size::new(width, height))
}

/// Parse the score `compare -metric AE` prints. Newer releases append the
/// normalized value in parentheses; only the first token counts.
pub fn parse_score(text: &str) -> CompareResult<f64> {
    let token = text
        .split_whitespace()
        .next()
        .ok_or_else(|| CompareError::UnparsableScore(text.to_string()))?;
    let score: f64 = token
        .parse()
        .map_err(|_| CompareError::UnparsableScore(text.to_string()))?;
    if !score.is_finite() || score < 0.0 {
        return Err(CompareError::UnparsableScore(text.to_string()));
    }
    Ok(score)
}
