#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tiled Mandelbrot renderer
//!
//! The Mandelbrot set is the set of points `c` on the complex plane
//! for which repeatedly squaring and adding `c` never runs off to
//! infinity.  The usual picture colours each pixel by how many
//! iterations its point survived before it was clearly escaping.
//!
//! Every pixel is independent, so the image is cut into rectangular
//! tiles and the tiles are computed in parallel.  One render pass
//! works like this: the partitioner fills a task queue with tile
//! rectangles, a fixed pool of worker threads takes tiles off that
//! queue and pushes finished, coloured tiles onto a bounded result
//! queue, and a single drain thread hands each finished tile to a
//! display sink.  The result queue is bounded, so a slow sink holds
//! the workers back rather than letting finished tiles pile up.
//!
//! ```no_run
//! use mandelbrot::{Framebuffer, RenderConfig, Renderer, Viewport};
//!
//! let config = RenderConfig::default();
//! let mut renderer = Renderer::new(config, Viewport::default()).unwrap();
//! let mut image = Framebuffer::new(config.width, config.height);
//! renderer.start_pass(&mut image).unwrap();
//! image.save("mandelbrot.png").unwrap();
//! ```

extern crate crossbeam;
extern crate failure;
extern crate image;
extern crate itertools;
extern crate num;
extern crate num_cpus;

pub mod config;
pub mod drain;
pub mod errors;
pub mod framebuffer;
pub mod kernel;
pub mod palette;
pub mod planes;
pub mod pool;
pub mod queue;
pub mod renderer;
pub mod tiles;

pub use config::RenderConfig;
pub use drain::{ResultDrain, TileSink};
pub use errors::RenderError;
pub use framebuffer::Framebuffer;
pub use kernel::{escape_time, escape_time_naive};
pub use palette::Palette;
pub use planes::{PlaneMapper, Viewport};
pub use pool::{Tile, WorkerPool};
pub use queue::BoundedQueue;
pub use renderer::{start_pass, PassReport, Renderer};
pub use tiles::{partition, Rectangle};
