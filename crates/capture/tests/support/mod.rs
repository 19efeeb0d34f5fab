//! Scripted in-memory browser for capture tests
//!
//! Renders viewport captures out of a synthetic page raster, clamps scroll
//! requests like a real browser, optionally pins a header band at the top of
//! every capture and lets scrolls lag behind a number of offset reads.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;
use screenlly_capture::driver::{Driver, DriverError, DriverFactory, DriverResult, ElementHandle, ElementRect, ScriptArg};
use screenlly_capture::scripts;
use screenlly_common::{BrowserProfile, Point, Rect, Selector, Size};
use serde_json::{json, Value};

/// Every row gets its own colour so gaps and duplicated bands show up as
/// pixel mismatches.
pub fn striped_page(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(y % 251) as u8, (y / 251) as u8, (x % 256) as u8, 255])
    })
}

/// Paint the top `height` rows of `page` with a single header colour
pub fn with_header_band(mut page: RgbaImage, height: u32) -> RgbaImage {
    for y in 0..height.min(page.height()) {
        for x in 0..page.width() {
            page.put_pixel(x, y, Rgba([250, 10, 10, 255]));
        }
    }
    page
}

pub fn crop(page: &RgbaImage, rect: Rect) -> RgbaImage {
    image::imageops::crop_imm(page, rect.left(), rect.top(), rect.width(), rect.height()).to_image()
}

pub fn encode(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

#[derive(Debug, Clone)]
pub struct FakeElement {
    pub rect: Rect,

    /// Whether the direct element screenshot command succeeds
    pub capturable: bool,
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub scroll: Point,
    pending: Option<(Point, u32)>,
    pub scroll_requests: Vec<Point>,
    pub window_scrolls: usize,
    pub offset_reads: usize,
    pub captures: Vec<Point>,
    pub element_captures: usize,
    pub navigations: Vec<String>,
    pub masked: Vec<String>,
    pub window_size: Option<Size>,
    pub maximized: bool,
    pub disposed: bool,
}

pub struct FakeBrowser {
    page: RgbaImage,
    viewport: Size,

    /// Height of the pinned header drawn over every capture
    header: u32,

    /// Offset reads before a scroll request takes effect
    lag: u32,

    /// Device pixel ratio applied to viewport captures
    scale: u32,

    /// Scroll container selector; when set the document itself never scrolls
    container: Option<String>,

    elements: HashMap<String, Vec<FakeElement>>,
    fail_navigation: Vec<String>,
    fail_window: bool,
    pub state: Mutex<FakeState>,
}

impl FakeBrowser {
    pub fn new(page: RgbaImage, viewport: Size) -> Self {
        Self {
            page,
            viewport,
            header: 0,
            lag: 0,
            scale: 1,
            container: None,
            elements: HashMap::new(),
            fail_navigation: Vec::new(),
            fail_window: false,
            state: Mutex::new(FakeState::default()),
        }
    }

    /// Pin the page's top `height` rows over every capture and expose them
    /// through `selector`
    pub fn with_fixed_header(mut self, selector: &Selector, height: u32) -> Self {
        self.header = height;
        let width = self.page.width();
        self.elements.insert(
            selector.as_str().to_string(),
            vec![FakeElement {
                rect: Rect::from_xywh(0, 0, width, height),
                capturable: true,
            }],
        );
        self
    }

    pub fn with_lag(mut self, reads: u32) -> Self {
        self.lag = reads;
        self
    }

    pub fn with_scale(mut self, scale: u32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_container(mut self, selector: &Selector) -> Self {
        self.container = Some(selector.as_str().to_string());
        self.elements.insert(
            selector.as_str().to_string(),
            vec![FakeElement {
                rect: Rect::from_size(self.viewport),
                capturable: true,
            }],
        );
        self
    }

    pub fn with_elements(mut self, selector: &Selector, elements: Vec<FakeElement>) -> Self {
        self.elements.insert(selector.as_str().to_string(), elements);
        self
    }

    pub fn failing_navigation(mut self, url: &str) -> Self {
        self.fail_navigation.push(url.to_string());
        self
    }

    /// Reject both window sizing commands
    pub fn failing_window(mut self) -> Self {
        self.fail_window = true;
        self
    }

    pub fn max_scroll(&self) -> Point {
        Point::new(
            self.page.width().saturating_sub(self.viewport.width),
            self.page.height().saturating_sub(self.viewport.height),
        )
    }

    fn clamp(&self, requested: Point) -> Point {
        let max = self.max_scroll();
        Point::new(requested.x.min(max.x), requested.y.min(max.y))
    }

    fn request_scroll(&self, x: u32, y: u32) {
        let target = self.clamp(Point::new(x, y));
        let mut state = self.state.lock();
        state.scroll_requests.push(Point::new(x, y));
        if self.lag == 0 {
            state.scroll = target;
        } else {
            state.pending = Some((target, self.lag));
        }
    }

    fn read_offset(&self) -> Value {
        let mut state = self.state.lock();
        state.offset_reads += 1;
        if let Some((target, remaining)) = state.pending.take() {
            if remaining <= 1 {
                state.scroll = target;
            } else {
                state.pending = Some((target, remaining - 1));
            }
        }
        json!({"x": state.scroll.x, "y": state.scroll.y})
    }

    fn document_size(&self) -> Size {
        if self.container.is_some() {
            self.viewport
        } else {
            Size::new(self.page.width(), self.page.height())
        }
    }

    fn render_viewport(&self) -> RgbaImage {
        let scroll = self.state.lock().scroll;
        let mut frame = RgbaImage::from_pixel(self.viewport.width, self.viewport.height, Rgba([255, 255, 255, 255]));
        for y in 0..self.viewport.height {
            // Pinned rows always show the header, whatever the scroll offset.
            let source_y = if y < self.header { y } else { scroll.y + y };
            for x in 0..self.viewport.width {
                let source_x = scroll.x + x;
                if source_x < self.page.width() && source_y < self.page.height() {
                    frame.put_pixel(x, y, *self.page.get_pixel(source_x, source_y));
                }
            }
        }
        if self.scale > 1 {
            frame = image::imageops::resize(
                &frame,
                self.viewport.width * self.scale,
                self.viewport.height * self.scale,
                image::imageops::FilterType::Nearest,
            );
        }
        frame
    }

    fn lookup(&self, handle: &ElementHandle) -> DriverResult<FakeElement> {
        let (selector, index) = handle
            .id()
            .rsplit_once('#')
            .ok_or_else(|| DriverError::StaleElement(handle.to_string()))?;
        let index: usize = index
            .parse()
            .map_err(|_| DriverError::StaleElement(handle.to_string()))?;
        self.elements
            .get(selector)
            .and_then(|elements| elements.get(index))
            .cloned()
            .ok_or_else(|| DriverError::StaleElement(handle.to_string()))
    }

    fn arg_u32(args: &[ScriptArg], index: usize) -> u32 {
        args.get(index).and_then(ScriptArg::as_u32).unwrap_or(0)
    }
}

#[async_trait]
impl Driver for FakeBrowser {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        if self.fail_navigation.iter().any(|u| url.ends_with(u.as_str())) {
            return Err(DriverError::Command(format!("net::ERR_NAME_NOT_RESOLVED {}", url)));
        }
        let mut state = self.state.lock();
        state.navigations.push(url.to_string());
        state.scroll = Point::ORIGIN;
        state.pending = None;
        Ok(())
    }

    async fn execute_script(&self, script: &str, args: Vec<ScriptArg>) -> DriverResult<Value> {
        match script {
            s if s == scripts::CONTENT_WIDTH => Ok(json!(self.document_size().width)),
            s if s == scripts::CONTENT_HEIGHT => Ok(json!(self.document_size().height)),
            s if s == scripts::ELEMENT_CONTENT_HEIGHT => Ok(json!(self.page.height())),
            s if s == scripts::VIEWPORT_SIZE => {
                Ok(json!({"width": self.viewport.width, "height": self.viewport.height}))
            }
            s if s == scripts::WINDOW_SCROLL_TO => {
                self.state.lock().window_scrolls += 1;
                if self.container.is_none() {
                    self.request_scroll(Self::arg_u32(&args, 0), Self::arg_u32(&args, 1));
                }
                Ok(Value::Null)
            }
            s if s == scripts::ELEMENT_SCROLL_TO => {
                self.request_scroll(Self::arg_u32(&args, 1), Self::arg_u32(&args, 2));
                Ok(Value::Null)
            }
            s if s == scripts::WINDOW_SCROLL_OFFSET => {
                if self.container.is_some() {
                    return Ok(json!({"x": 0, "y": 0}));
                }
                Ok(self.read_offset())
            }
            s if s == scripts::ELEMENT_SCROLL_OFFSET => Ok(self.read_offset()),
            s if s == scripts::MASK_ELEMENT => {
                if let Some(ScriptArg::Element(handle)) = args.first() {
                    self.lookup(handle)?;
                    self.state.lock().masked.push(handle.id().to_string());
                }
                Ok(Value::Null)
            }
            other => Err(DriverError::Unsupported(format!("script not scripted: {}", other))),
        }
    }

    async fn find_elements(&self, selector: &Selector) -> DriverResult<Vec<ElementHandle>> {
        let count = self.elements.get(selector.as_str()).map_or(0, Vec::len);
        Ok((0..count)
            .map(|i| ElementHandle::new(format!("{}#{}", selector.as_str(), i)))
            .collect())
    }

    async fn element_rect(&self, element: &ElementHandle) -> DriverResult<ElementRect> {
        let rect = self.lookup(element)?.rect;
        Ok(ElementRect {
            x: rect.left() as f64,
            y: rect.top() as f64,
            width: rect.width() as f64,
            height: rect.height() as f64,
        })
    }

    async fn capture_element(&self, element: &ElementHandle) -> DriverResult<Vec<u8>> {
        let found = self.lookup(element)?;
        self.state.lock().element_captures += 1;
        if !found.capturable {
            return Err(DriverError::Unsupported("element screenshots".into()));
        }
        Ok(encode(&crop(&self.page, found.rect)))
    }

    async fn capture_viewport(&self) -> DriverResult<Vec<u8>> {
        let frame = self.render_viewport();
        let scroll = self.state.lock().scroll;
        self.state.lock().captures.push(scroll);
        Ok(encode(&frame))
    }

    async fn set_window_size(&self, width: u32, height: u32) -> DriverResult<()> {
        if self.fail_window {
            return Err(DriverError::Command("window manager refused resize".into()));
        }
        self.state.lock().window_size = Some(Size::new(width, height));
        Ok(())
    }

    async fn maximize_window(&self) -> DriverResult<()> {
        if self.fail_window {
            return Err(DriverError::Command("window manager refused maximize".into()));
        }
        self.state.lock().maximized = true;
        Ok(())
    }

    async fn dispose(&self) -> DriverResult<()> {
        self.state.lock().disposed = true;
        Ok(())
    }
}

/// Hands out pre-built browsers by profile name; unknown names fail to connect
#[derive(Default)]
pub struct FakeFactory {
    pub browsers: HashMap<String, Arc<FakeBrowser>>,
}

impl FakeFactory {
    pub fn with(mut self, name: &str, browser: Arc<FakeBrowser>) -> Self {
        self.browsers.insert(name.to_string(), browser);
        self
    }
}

#[async_trait]
impl DriverFactory for FakeFactory {
    async fn connect(&self, browser: &str, _profile: &BrowserProfile) -> DriverResult<Arc<dyn Driver>> {
        match self.browsers.get(browser) {
            Some(fake) => Ok(Arc::clone(fake) as Arc<dyn Driver>),
            None => Err(DriverError::Session(format!("no node offers {}", browser))),
        }
    }
}

/// Fail with the first differing pixel instead of dumping both buffers
pub fn assert_same_image(actual: &RgbaImage, expected: &RgbaImage) {
    assert_eq!(actual.dimensions(), expected.dimensions(), "dimensions differ");
    if let Some((x, y, pixel)) = actual
        .enumerate_pixels()
        .find(|(x, y, pixel)| *pixel != expected.get_pixel(*x, *y))
    {
        panic!(
            "pixel ({}, {}) is {:?}, expected {:?}",
            x,
            y,
            pixel,
            expected.get_pixel(x, y)
        );
    }
}

pub fn fast_settle() -> screenlly_common::SettleConfig {
    screenlly_common::SettleConfig {
        attempts: 3,
        interval_ms: 0,
    }
}
