//! Viewport tiling: one raster for an arbitrary rectangle

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use screenlly_common::{Point, Rect, Selector, SettleConfig, Size};
use tracing::{debug, info, warn};

use crate::driver::{Driver, DriverError};
use crate::error::{CaptureError, CaptureResult};
use crate::geometry::GeometryProber;
use crate::grid::{place_tile, TileGrid};
use crate::scroll::{ScrollSync, ScrollTarget};

/// One viewport capture and the scroll state it was taken at
#[derive(Debug, Clone)]
pub struct ViewportFrame {
    pub raster: RgbaImage,
    pub offset: Point,
    pub viewport: Size,
}

/// What to capture
#[derive(Debug, Clone, Default)]
pub struct TileOptions {
    /// Document-relative target; the full content box when `None`
    pub target: Option<Rect>,

    pub fixed_header: Option<Selector>,

    pub scrollable_element: Option<Selector>,
}

impl TileOptions {
    pub fn with_target(mut self, target: Rect) -> Self {
        self.target = Some(target);
        self
    }
}

/// How the composed canvas is handed back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Image,
    Png,
    /// Written as PNG; parent directories are created
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub enum CaptureOutput {
    Image(RgbaImage),
    Png(Vec<u8>),
    File(PathBuf),
}

impl CaptureOutput {
    pub fn path(&self) -> Option<&Path> {
        match self {
            CaptureOutput::File(path) => Some(path),
            _ => None,
        }
    }
}

/// Stitches viewport captures into one canvas.
///
/// Tiles are taken strictly in row-major order: each capture depends on the
/// scroll state left by the previous one.
pub struct ViewportTiler<'a> {
    driver: &'a dyn Driver,
    settle: SettleConfig,
}

impl<'a> ViewportTiler<'a> {
    pub fn new(driver: &'a dyn Driver, settle: SettleConfig) -> Self {
        Self { driver, settle }
    }

    pub async fn capture_as(&self, options: &TileOptions, output: OutputTarget) -> CaptureResult<CaptureOutput> {
        let canvas = self.capture(options).await?;
        match output {
            OutputTarget::Image => Ok(CaptureOutput::Image(canvas)),
            OutputTarget::Png => Ok(CaptureOutput::Png(encode_png(&canvas)?)),
            OutputTarget::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                canvas.save_with_format(&path, ImageFormat::Png)?;
                info!("Saved {}x{} capture to {}", canvas.width(), canvas.height(), path.display());
                Ok(CaptureOutput::File(path))
            }
        }
    }

    pub async fn capture_to_file(&self, options: &TileOptions, path: &Path) -> CaptureResult<PathBuf> {
        self.capture_as(options, OutputTarget::File(path.to_path_buf()))
            .await?;
        Ok(path.to_path_buf())
    }

    /// Compose the canvas for `options.target`
    pub async fn capture(&self, options: &TileOptions) -> CaptureResult<RgbaImage> {
        let prober = GeometryProber::new(self.driver);

        let scroll_target = match &options.scrollable_element {
            Some(selector) => ScrollTarget::Element(self.driver.find_element(selector).await?),
            None => ScrollTarget::Document,
        };
        let container = match &scroll_target {
            ScrollTarget::Element(element) => Some(element),
            ScrollTarget::Document => None,
        };

        let content = prober.content_size(container).await?;
        let viewport = prober.viewport_size().await?;
        if viewport.is_empty() {
            return Err(DriverError::UnexpectedValue {
                what: "viewport size".into(),
                value: viewport.to_string(),
            }
            .into());
        }

        let max_offset = Point::new(
            content.width.saturating_sub(viewport.width),
            content.height.saturating_sub(viewport.height),
        );
        let sync = ScrollSync::new(self.driver, &scroll_target, max_offset, self.settle);

        // Measure from the top so pinned elements report their resting position.
        sync.scroll_and_settle(Point::ORIGIN).await?;
        let mut header = prober.fixed_header_height(options.fixed_header.as_ref()).await?;
        if header >= viewport.height {
            warn!(
                "Fixed header ({}px) fills the {}px viewport, ignoring it",
                header, viewport.height
            );
            header = 0;
        }

        let target = options.target.unwrap_or_else(|| Rect::from_size(content));
        if target.is_empty() {
            return Err(CaptureError::EmptyTarget(target));
        }

        let grid = TileGrid::plan(target, content, viewport, header);

        debug!(
            "Tiling {} over content {} with viewport {}: {} rows x {} columns, header {}px",
            target,
            content,
            viewport,
            grid.rows().len(),
            grid.columns().len(),
            header
        );

        let mut canvas = RgbaImage::new(target.width(), target.height());
        for (row, position) in grid.positions() {
            let settled = sync.scroll_and_settle(position).await?;
            let frame = self.capture_frame(settled.offset, viewport).await?;
            self.paste(&mut canvas, &frame, target, header, row == 0);
        }

        Ok(canvas)
    }

    /// Grab the viewport and scale it to CSS pixels when the device pixel
    /// ratio is not 1
    async fn capture_frame(&self, offset: Point, viewport: Size) -> CaptureResult<ViewportFrame> {
        let bytes = self.driver.capture_viewport().await?;
        let mut raster = image::load_from_memory(&bytes)?.to_rgba8();
        if raster.dimensions() != (viewport.width, viewport.height) {
            debug!(
                "Resizing {}x{} capture to viewport {}",
                raster.width(),
                raster.height(),
                viewport
            );
            raster = imageops::resize(&raster, viewport.width, viewport.height, FilterType::Triangle);
        }
        Ok(ViewportFrame {
            raster,
            offset,
            viewport,
        })
    }

    fn paste(&self, canvas: &mut RgbaImage, frame: &ViewportFrame, target: Rect, header: u32, first_row: bool) {
        let raster_size = Size::new(frame.raster.width(), frame.raster.height());
        let Some(placement) = place_tile(target, frame.offset, raster_size, header, first_row) else {
            debug!("Frame at {} adds nothing to {}", frame.offset, target);
            return;
        };

        let source = placement.source;
        let tile = imageops::crop_imm(
            &frame.raster,
            source.left(),
            source.top(),
            source.width(),
            source.height(),
        )
        .to_image();
        imageops::replace(canvas, &tile, placement.dest.x as i64, placement.dest.y as i64);
    }
}

pub fn encode_png(image: &RgbaImage) -> CaptureResult<Vec<u8>> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}
