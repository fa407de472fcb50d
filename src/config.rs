// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render settings that stay fixed across passes.

use crate::errors::RenderError;

/// Image and tile geometry, iteration cap, and pipeline sizing.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderConfig {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Tile width in pixels; at most `width`.
    pub tile_width: usize,
    /// Tile height in pixels; at most `height`.
    pub tile_height: usize,
    /// Escape-time iteration cap.
    pub max_iterations: usize,
    /// Number of worker threads.
    pub workers: usize,
    /// How many finished tiles may wait for the drain before workers
    /// block.
    pub queue_capacity: usize,
}

impl Default for RenderConfig {
    fn default() -> RenderConfig {
        RenderConfig {
            width: 800,
            height: 800,
            tile_width: 400,
            tile_height: 400,
            max_iterations: 1024,
            workers: num_cpus::get(),
            queue_capacity: 100,
        }
    }
}

impl RenderConfig {
    /// Checks every setting, so a bad one stops us before any thread
    /// starts.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.width == 0 || self.height == 0 {
            return Err(RenderError::EmptyImage {
                width: self.width,
                height: self.height,
            });
        }
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(RenderError::EmptyTile {
                width: self.tile_width,
                height: self.tile_height,
            });
        }
        if self.tile_width > self.width || self.tile_height > self.height {
            return Err(RenderError::TileTooLarge {
                tile_width: self.tile_width,
                tile_height: self.tile_height,
                width: self.width,
                height: self.height,
            });
        }
        if self.max_iterations == 0 {
            return Err(RenderError::NoIterations);
        }
        if self.workers == 0 {
            return Err(RenderError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(RenderError::ZeroCapacity);
        }
        Ok(())
    }
}
