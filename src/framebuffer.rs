// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A display sink that paints tiles into an in-memory image, which can
//! then be written out as a PNG or PPM.

use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};

use crate::drain::TileSink;
use crate::palette::{to_rgb, INSIDE};
use crate::tiles::Rectangle;

/// A `width × height` grid of packed colours.  Pixels no tile covers
/// stay black.
#[derive(Clone, Debug, PartialEq)]
pub struct Framebuffer {
    width: usize,
    height: usize,
    pixels: Vec<u32>,
}

impl Framebuffer {
    /// An all-black framebuffer.
    pub fn new(width: usize, height: usize) -> Framebuffer {
        Framebuffer {
            width,
            height,
            pixels: vec![INSIDE; width * height],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// The packed colour at `(x, y)`.
    pub fn get(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.pixels[y * self.width + x])
        } else {
            None
        }
    }

    /// Copies the framebuffer into an `image` buffer.
    pub fn to_image(&self) -> RgbImage {
        RgbImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            Rgb(to_rgb(self.pixels[(y as usize) * self.width + (x as usize)]))
        })
    }

    /// Writes the image; the format follows the file extension.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        self.to_image().save(path)
    }
}

impl TileSink for Framebuffer {
    fn render_tile(&mut self, rect: &Rectangle, pixels: &[u32]) {
        if rect.x_start() >= self.width {
            return;
        }
        let width = rect.width();
        for (row, line) in pixels.chunks(width).enumerate() {
            let y = rect.y_start() + row;
            if y >= self.height {
                break;
            }
            let start = y * self.width + rect.x_start();
            let visible = width.min(self.width.saturating_sub(rect.x_start()));
            self.pixels[start..start + visible].copy_from_slice(&line[..visible]);
        }
    }
}
