//! Pure-Rust image tool double and fixture helpers

#![allow(dead_code)]

use std::path::Path;

use async_trait::async_trait;
use image::{Rgba, RgbaImage};
use parking_lot::Mutex;
use screenlly_common::Size;
use screenlly_compare::{CompareError, CompareResult, ImageTool};

/// Implements the tool capability with the `image` crate and records calls
#[derive(Default)]
pub struct PixelTool {
    pub calls: Mutex<Vec<&'static str>>,
}

impl PixelTool {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().push(call);
    }
}

fn open(path: &Path) -> RgbaImage {
    image::open(path).unwrap().to_rgba8()
}

pub fn named_color(name: &str) -> Rgba<u8> {
    match name {
        "white" => Rgba([255, 255, 255, 255]),
        "black" => Rgba([0, 0, 0, 255]),
        "red" => Rgba([255, 0, 0, 255]),
        _ => Rgba([255, 0, 255, 255]),
    }
}

fn differs(a: &Rgba<u8>, b: &Rgba<u8>) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .take(3)
        .any(|(x, y)| (*x as i16 - *y as i16).unsigned_abs() as f32 > 255.0 * 0.05)
}

#[async_trait]
impl ImageTool for PixelTool {
    async fn identify(&self, path: &Path) -> CompareResult<Size> {
        self.record("identify");
        // Non-images fail the way `identify` does.
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| CompareError::UnparsableDimensions(format!("{}: {}", path.display(), e)))?;
        Ok(Size::new(width, height))
    }

    async fn pad(&self, source: &Path, size: Size, background: &str, dest: &Path) -> CompareResult<()> {
        self.record("pad");
        let mut canvas = RgbaImage::from_pixel(size.width, size.height, named_color(background));
        image::imageops::replace(&mut canvas, &open(source), 0, 0);
        canvas.save(dest).unwrap();
        Ok(())
    }

    async fn dissimilarity(&self, first: &Path, second: &Path) -> CompareResult<f64> {
        self.record("dissimilarity");
        let (a, b) = (open(first), open(second));
        let count = a.pixels().zip(b.pixels()).filter(|(x, y)| x != y).count();
        Ok(count as f64)
    }

    async fn composite_diff(&self, first: &Path, second: &Path, color: &str, dest: &Path) -> CompareResult<()> {
        self.record("composite_diff");
        let (a, b) = (open(first), open(second));
        let mut out = a.clone();
        for (x, y, pixel) in out.enumerate_pixels_mut() {
            if differs(a.get_pixel(x, y), b.get_pixel(x, y)) {
                *pixel = named_color(color);
            }
        }
        out.save(dest).unwrap();
        Ok(())
    }
}

/// Smooth gradient fixture
pub fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x * 3 % 256) as u8, (y * 5 % 256) as u8, 90, 255])
    })
}

/// `image` with a `10x10` block at `(left, top)` painted solid green
pub fn with_block(image: &RgbaImage, left: u32, top: u32) -> RgbaImage {
    let mut changed = image.clone();
    for y in top..top + 10 {
        for x in left..left + 10 {
            changed.put_pixel(x, y, Rgba([0, 255, 0, 255]));
        }
    }
    changed
}

pub fn save(image: &RgbaImage, path: &Path) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image.save(path).unwrap();
}
