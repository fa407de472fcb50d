// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Everything that can stop a render pass.  None of these are
//! recoverable mid-pass: a pass that fails is torn down completely and
//! the caller decides whether to try again with a different setup.

use failure::Fail;

/// The failure classes of the renderer: misconfiguration, detected
/// before any thread starts, and thread death during a pass.
#[derive(Debug, Fail, Clone, PartialEq)]
pub enum RenderError {
    /// A bounded queue of capacity zero can never make progress.
    #[fail(display = "queue capacity must be at least 1")]
    ZeroCapacity,

    /// The image must have at least one pixel in each direction.
    #[fail(display = "image dimensions must be positive, got {}x{}", width, height)]
    EmptyImage {
        /// Requested image width.
        width: usize,
        /// Requested image height.
        height: usize,
    },

    /// Tiles must have at least one pixel in each direction.
    #[fail(display = "tile dimensions must be positive, got {}x{}", width, height)]
    EmptyTile {
        /// Requested tile width.
        width: usize,
        /// Requested tile height.
        height: usize,
    },

    /// A tile that does not fit in the image would produce no tasks.
    #[fail(
        display = "tile {}x{} does not fit in image {}x{}",
        tile_width, tile_height, width, height
    )]
    TileTooLarge {
        /// Requested tile width.
        tile_width: usize,
        /// Requested tile height.
        tile_height: usize,
        /// Image width.
        width: usize,
        /// Image height.
        height: usize,
    },

    /// At least one worker is needed to drain the task queue.
    #[fail(display = "worker count must be at least 1")]
    NoWorkers,

    /// The palette needs room for at least one escape colour.
    #[fail(display = "iteration cap must be at least 1")]
    NoIterations,

    /// The complex-plane rectangle is empty, inverted, or not finite.
    #[fail(display = "invalid viewport: {}", _0)]
    InvalidViewport(String),

    /// A worker thread panicked while computing a tile.
    #[fail(display = "worker {} panicked during the pass", _0)]
    WorkerPanicked(usize),

    /// The operating system refused to start a thread.
    #[fail(display = "could not start a thread: {}", _0)]
    Spawn(String),

    /// The drain thread panicked, typically inside the display sink.
    #[fail(display = "result drain panicked during the pass")]
    DrainPanicked,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_values() {
        let e = RenderError::TileTooLarge {
            tile_width: 900,
            tile_height: 100,
            width: 800,
            height: 800,
        };
        assert_eq!(format!("{}", e), "tile 900x100 does not fit in image 800x800");
        assert_eq!(
            format!("{}", RenderError::WorkerPanicked(3)),
            "worker 3 panicked during the pass"
        );
    }
}
