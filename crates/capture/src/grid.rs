//! Tile grid: where to scroll for each capture

use screenlly_common::{Point, Rect, Size};

/// Scroll positions covering a target rectangle.
///
/// Both axes are non-decreasing. When an axis needs more than one tile its
/// last position is exactly `min(content_extent, target_end)`, so the last
/// tile reaches the true edge even if it overlaps the one before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    columns: Vec<u32>,
    rows: Vec<u32>,
}

impl TileGrid {
    /// Plan positions for `target`.
    ///
    /// Rows step by `viewport.height - header_height`; every row after the
    /// first loses its top `header_height` pixels to the pinned header.
    /// Columns step by the full viewport width.
    pub fn plan(target: Rect, content: Size, viewport: Size, header_height: u32) -> Self {
        let row_step = viewport.height.saturating_sub(header_height).max(1);
        let rows = axis_positions(
            target.top(),
            target.bottom(),
            content.height,
            viewport.height,
            row_step,
        );
        let columns = axis_positions(
            target.left(),
            target.right(),
            content.width,
            viewport.width,
            viewport.width.max(1),
        );
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[u32] {
        &self.columns
    }

    pub fn rows(&self) -> &[u32] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.columns.len() * self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `(row index, scroll position)` in row-major order
    pub fn positions(&self) -> impl Iterator<Item = (usize, Point)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(row, &y)| {
            self.columns.iter().map(move |&x| (row, Point::new(x, y)))
        })
    }
}

fn axis_positions(start: u32, target_end: u32, content_extent: u32, viewport_extent: u32, step: u32) -> Vec<u32> {
    let limit = content_extent.min(target_end);
    if limit.saturating_sub(start) <= viewport_extent {
        return vec![start];
    }

    let mut positions = vec![start];
    let mut next = start.saturating_add(step);
    while next < limit {
        positions.push(next);
        next = next.saturating_add(step);
    }
    if positions.last() != Some(&limit) {
        positions.push(limit);
    }
    positions
}

/// Where a captured frame lands on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TilePlacement {
    /// Region of the captured raster to keep
    pub source: Rect,

    /// Canvas position of the source's top-left pixel
    pub dest: Point,
}

/// Crop window and paste position for one frame.
///
/// `offset` is the observed scroll offset, `raster` the captured frame size.
/// Frames after the first row skip the top `header_height` rows since the
/// pinned header covers the content under it. Returns `None` when the frame
/// contributes nothing inside `target`.
pub fn place_tile(target: Rect, offset: Point, raster: Size, header_height: u32, first_row: bool) -> Option<TilePlacement> {
    let skip = if first_row { 0 } else { header_height };
    if skip >= raster.height {
        return None;
    }

    let visible = Rect::from_xywh(offset.x, offset.y + skip, raster.width, raster.height - skip);
    let region = visible.intersect(&target)?;

    Some(TilePlacement {
        source: Rect::from_xywh(
            region.left() - offset.x,
            region.top() - offset.y,
            region.width(),
            region.height(),
        ),
        dest: Point::new(region.left() - target.left(), region.top() - target.top()),
    })
}
