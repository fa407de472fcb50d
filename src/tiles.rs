// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Cutting the image into tiles.
//!
//! The image is split into `⌊W/gw⌋ × ⌊H/gh⌋` tiles of exactly
//! `gw × gh` pixels, enumerated row by row.  Any strip on the right or
//! bottom edge too narrow to hold a whole tile is left uncovered and
//! never computed.

use itertools::iproduct;

use crate::errors::RenderError;

/// Inclusive pixel bounds of a tile.  Always `x_start <= x_end` and
/// `y_start <= y_end`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rectangle {
    x_start: usize,
    x_end: usize,
    y_start: usize,
    y_end: usize,
}

impl Rectangle {
    /// A rectangle of `width × height` pixels whose upper-left pixel is
    /// `(x, y)`.  Returns `None` for an empty rectangle.
    pub fn new(x: usize, y: usize, width: usize, height: usize) -> Option<Rectangle> {
        if width == 0 || height == 0 {
            return None;
        }
        Some(Rectangle {
            x_start: x,
            x_end: x + width - 1,
            y_start: y,
            y_end: y + height - 1,
        })
    }

    /// First column.
    pub fn x_start(&self) -> usize {
        self.x_start
    }

    /// Last column, inclusive.
    pub fn x_end(&self) -> usize {
        self.x_end
    }

    /// First row.
    pub fn y_start(&self) -> usize {
        self.y_start
    }

    /// Last row, inclusive.
    pub fn y_end(&self) -> usize {
        self.y_end
    }

    /// Columns covered.
    pub fn width(&self) -> usize {
        self.x_end - self.x_start + 1
    }

    /// Rows covered.
    pub fn height(&self) -> usize {
        self.y_end - self.y_start + 1
    }

    /// Number of pixels covered.
    pub fn len(&self) -> usize {
        self.width() * self.height()
    }

    /// A rectangle always has at least one pixel; this exists for the
    /// benefit of clippy.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether the pixel `(x, y)` lies inside the rectangle.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x >= self.x_start && x <= self.x_end && y >= self.y_start && y <= self.y_end
    }
}

/// Splits a `width × height` image into `tile_width × tile_height`
/// tiles, in row-major order.  The length of the returned list is the
/// task count of the pass.
pub fn partition(
    width: usize,
    height: usize,
    tile_width: usize,
    tile_height: usize,
) -> Result<Vec<Rectangle>, RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyImage { width, height });
    }
    if tile_width == 0 || tile_height == 0 {
        return Err(RenderError::EmptyTile {
            width: tile_width,
            height: tile_height,
        });
    }
    if tile_width > width || tile_height > height {
        return Err(RenderError::TileTooLarge {
            tile_width,
            tile_height,
            width,
            height,
        });
    }

    let columns = width / tile_width;
    let rows = height / tile_height;
    Ok(iproduct!(0..rows, 0..columns)
        .map(|(row, column)| Rectangle {
            x_start: column * tile_width,
            x_end: (column + 1) * tile_width - 1,
            y_start: row * tile_height,
            y_end: (row + 1) * tile_height - 1,
        })
        .collect())
}
