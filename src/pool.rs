// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The worker pool.  Every worker runs the same loop: take a tile
//! rectangle off the task queue, compute the escape time of each of
//! its pixels, colour them, and push the finished tile onto the result
//! queue.  The task queue is filled completely before any worker
//! starts and nothing is added to it afterwards, so a worker that
//! finds it empty can stop for good.

use std::thread;

use crossbeam::thread::{Scope, ScopedJoinHandle};
use log::{debug, trace};

use crate::errors::RenderError;
use crate::kernel::escape_time;
use crate::palette::Palette;
use crate::planes::PlaneMapper;
use crate::queue::BoundedQueue;
use crate::tiles::Rectangle;

/// A computed tile: its rectangle and one colour per pixel, row by
/// row, `width × height` long.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    rect: Rectangle,
    pixels: Vec<u32>,
}

impl Tile {
    /// Where the tile goes in the image.
    pub fn rect(&self) -> &Rectangle {
        &self.rect
    }

    /// Packed colours, row-major within the tile.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Gives up the tile's parts.
    pub fn into_parts(self) -> (Rectangle, Vec<u32>) {
        (self.rect, self.pixels)
    }
}

/// What a worker delivers for each task it took: the tile, or word
/// that it died computing it.
pub type Outcome = Result<Tile, RenderError>;

/// Computes and colours every pixel of `rect`.
pub fn compute_tile(rect: Rectangle, plane: &PlaneMapper, palette: &Palette) -> Tile {
    let max_iterations = palette.max_iterations();
    let mut pixels = Vec::with_capacity(rect.len());
    for y in rect.y_start()..=rect.y_end() {
        for x in rect.x_start()..=rect.x_end() {
            let c = plane.pixel_to_point(x, y);
            pixels.push(palette.color(escape_time(c, max_iterations)));
        }
    }
    Tile { rect, pixels }
}

/// Everything a worker reads during a pass.  All of it is shared and
/// none of it is written, except through the queues.
#[derive(Copy, Clone)]
pub struct Job<'a> {
    /// Rectangles waiting to be computed.
    pub tasks: &'a BoundedQueue<Rectangle>,
    /// Finished tiles waiting for the drain.
    pub results: &'a BoundedQueue<Outcome>,
    /// Pixel-to-plane mapping for this pass.
    pub plane: &'a PlaneMapper,
    /// Colour table for this pass.
    pub palette: &'a Palette,
}

// Makes sure the drain hears about every task even if a worker
// panicked, so it never waits for a tile that will not come.  The
// dying worker may be the last one, so it also fails every task still
// queued rather than leave them to nobody.
struct Delivery<'a> {
    worker: usize,
    tasks: &'a BoundedQueue<Rectangle>,
    results: &'a BoundedQueue<Outcome>,
    delivered: bool,
}

impl<'a> Drop for Delivery<'a> {
    fn drop(&mut self) {
        if self.delivered || !thread::panicking() {
            return;
        }
        self.results.push(Err(RenderError::WorkerPanicked(self.worker)));
        let mut abandoned = 0;
        while self.tasks.try_pop().is_some() {
            self.results.push(Err(RenderError::WorkerPanicked(self.worker)));
            abandoned += 1;
        }
        debug!("worker {} panicked, failed {} queued tasks", self.worker, abandoned);
    }
}

/// The body of one worker.  Returns how many tiles it computed.
pub fn work(worker: usize, job: Job) -> usize {
    debug!("worker {} starting", worker);
    let mut done = 0;
    while let Some(rect) = job.tasks.try_pop() {
        let mut delivery = Delivery {
            worker,
            tasks: job.tasks,
            results: job.results,
            delivered: false,
        };
        let tile = compute_tile(rect, job.plane, job.palette);
        trace!(
            "worker {}: processed {} {} {} {}",
            worker,
            rect.x_start(),
            rect.x_end(),
            rect.y_start(),
            rect.y_end()
        );
        job.results.push(Ok(tile));
        delivery.delivered = true;
        done += 1;
    }
    debug!("worker {}: task queue is empty, finishing after {} tiles", worker, done);
    done
}

/// A fixed number of worker threads.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// A pool of `workers` threads.  Zero is refused.
    pub fn new(workers: usize) -> Result<WorkerPool, RenderError> {
        if workers == 0 {
            return Err(RenderError::NoWorkers);
        }
        Ok(WorkerPool { workers })
    }

    /// Number of worker threads.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Starts the workers inside `scope`.  The scope joins them.
    ///
    /// If the operating system refuses a thread, the calling thread
    /// works through whatever tasks remain, so the pass can still be
    /// drained and torn down, and the failure is reported afterwards.
    pub fn spawn<'scope, 'env>(
        &self,
        scope: &'scope Scope<'env>,
        job: Job<'env>,
    ) -> Result<Vec<ScopedJoinHandle<'scope, usize>>, RenderError> {
        let mut handles = Vec::with_capacity(self.workers);
        for worker in 0..self.workers {
            let spawned = scope
                .builder()
                .name(format!("worker-{}", worker))
                .spawn(move |_| work(worker, job));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(e) => {
                    debug!("could not start worker {}: {}", worker, e);
                    work(worker, job);
                    return Err(RenderError::Spawn(e.to_string()));
                }
            }
        }
        Ok(handles)
    }
}
