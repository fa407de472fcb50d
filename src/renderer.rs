// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render passes.
//!
//! A pass partitions the image, fills a task queue sized to hold every
//! task, then starts one drain thread and the worker pool.  The workers
//! empty the task queue into a bounded result queue, the drain empties
//! that into the sink, and the pass is over once the drain has seen one
//! result per task and every thread has been joined.  Both queues live
//! only as long as the pass.
//!
//! Passes never overlap: `start_pass` blocks until its pass is
//! complete, and the viewport can only be changed through `&mut self`,
//! so never while a pass is running.  A pass moves through
//! `Idle → Filling → Running → Complete → Idle`; the transitions are
//! logged at debug level.

use std::fmt;
use std::time::{Duration, Instant};

use log::{debug, info};
use num::Complex;

use crate::config::RenderConfig;
use crate::drain::{ResultDrain, TileSink};
use crate::errors::RenderError;
use crate::palette::Palette;
use crate::planes::{PlaneMapper, Viewport};
use crate::pool::{Job, Outcome, WorkerPool};
use crate::queue::BoundedQueue;
use crate::tiles::{partition, Rectangle};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PassState {
    Idle,
    Filling,
    Running,
    Complete,
}

impl fmt::Display for PassState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            PassState::Idle => "idle",
            PassState::Filling => "filling",
            PassState::Running => "running",
            PassState::Complete => "complete",
        };
        f.write_str(name)
    }
}

/// What the last successful pass did.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PassReport {
    /// Tasks the partitioner produced.
    pub tasks: usize,
    /// Tiles the sink received.
    pub drained: usize,
    /// Wall-clock time from partitioning to the last join.
    pub elapsed: Duration,
}

/// Owns the settings, the viewport and the palette between passes.
pub struct Renderer {
    config: RenderConfig,
    viewport: Viewport,
    palette: Palette,
    pool: WorkerPool,
    last_pass: Option<PassReport>,
}

impl Renderer {
    /// Validates `config` and builds the palette for its iteration cap.
    pub fn new(config: RenderConfig, viewport: Viewport) -> Result<Renderer, RenderError> {
        config.validate()?;
        Ok(Renderer {
            palette: Palette::new(config.max_iterations)?,
            pool: WorkerPool::new(config.workers)?,
            config,
            viewport,
            last_pass: None,
        })
    }

    /// Current settings.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// The viewport the next pass will draw.
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The colour table in use.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Report of the last pass that completed.
    pub fn last_pass(&self) -> Option<PassReport> {
        self.last_pass
    }

    /// Replaces the viewport.  The palette is kept.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Moves the viewport by a fraction of its span.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<(), RenderError> {
        self.viewport = self.viewport.pan(dx, dy)?;
        Ok(())
    }

    /// Scales the viewport about its centre.
    pub fn zoom(&mut self, factor: f64) -> Result<(), RenderError> {
        self.viewport = self.viewport.zoom(factor)?;
        Ok(())
    }

    /// Scales the viewport about `anchor`.
    pub fn zoom_at(&mut self, anchor: Complex<f64>, factor: f64) -> Result<(), RenderError> {
        self.viewport = self.viewport.zoom_at(anchor, factor)?;
        Ok(())
    }

    /// Changes the iteration cap; the palette is rebuilt only if the
    /// cap actually changed.
    pub fn set_max_iterations(&mut self, max_iterations: usize) -> Result<(), RenderError> {
        if max_iterations != self.config.max_iterations {
            self.palette = Palette::new(max_iterations)?;
            self.config.max_iterations = max_iterations;
        }
        Ok(())
    }

    /// Renders the current viewport into `sink` and returns the task
    /// count.  Blocks until every tile has been drained and every
    /// thread joined, or until the pass has failed and been torn down.
    pub fn start_pass<S>(&mut self, sink: &mut S) -> Result<usize, RenderError>
    where
        S: TileSink + Send + ?Sized,
    {
        let mut state = PassState::Idle;
        enter(&mut state, PassState::Filling);
        let outcome = self.run_pass(sink, &mut state);
        if let Ok(report) = &outcome {
            let report = *report;
            enter(&mut state, PassState::Complete);
            info!(
                "pass complete: {} tasks, {} tiles drained in {:?}",
                report.tasks, report.drained, report.elapsed
            );
            self.last_pass = Some(report);
        }
        enter(&mut state, PassState::Idle);
        outcome.map(|report| report.tasks)
    }

    fn run_pass<S>(
        &mut self,
        sink: &mut S,
        state: &mut PassState,
    ) -> Result<PassReport, RenderError>
    where
        S: TileSink + Send + ?Sized,
    {
        let started = Instant::now();
        let config = self.config;

        let rects = partition(config.width, config.height, config.tile_width, config.tile_height)?;
        let expected = rects.len();
        info!(
            "pass starting: {} tiles of {}x{} over {:?}, {} workers",
            expected, config.tile_width, config.tile_height, self.viewport, config.workers
        );
        let tasks: BoundedQueue<Rectangle> = BoundedQueue::new(expected)?;
        for rect in rects {
            tasks.push(rect);
        }
        let results: BoundedQueue<Outcome> = BoundedQueue::new(config.queue_capacity)?;
        let plane = PlaneMapper::new(self.viewport, config.width, config.height)?;

        enter(state, PassState::Running);
        let pool = self.pool;
        let drain = ResultDrain::new(expected);
        let job = Job {
            tasks: &tasks,
            results: &results,
            plane: &plane,
            palette: &self.palette,
        };

        let joined = crossbeam::scope(|s| -> Result<usize, RenderError> {
            let results = &results;
            let drain_thread = s
                .builder()
                .name("drain".to_string())
                .spawn(move |_| drain.run(results, sink))
                .map_err(|e| RenderError::Spawn(e.to_string()))?;

            let spawned = pool.spawn(s, job);
            let drained = drain_thread
                .join()
                .unwrap_or(Err(RenderError::DrainPanicked));
            let computed = spawned.and_then(|handles| {
                let mut computed = 0;
                let mut panicked = None;
                for (worker, handle) in handles.into_iter().enumerate() {
                    match handle.join() {
                        Ok(tiles) => computed += tiles,
                        Err(_) => panicked = panicked.or(Some(RenderError::WorkerPanicked(worker))),
                    }
                }
                match panicked {
                    Some(e) => Err(e),
                    None => Ok(computed),
                }
            });

            let drained = drained?;
            let computed = computed?;
            debug!("workers computed {} tiles", computed);
            Ok(drained)
        });
        // Every handle is joined above, so the scope itself only fails
        // if a thread we could not join panicked.
        let drained = joined.unwrap_or(Err(RenderError::DrainPanicked))?;

        Ok(PassReport {
            tasks: expected,
            drained,
            elapsed: started.elapsed(),
        })
    }
}

fn enter(state: &mut PassState, next: PassState) {
    debug!("pass: {} -> {}", state, next);
    *state = next;
}

/// Renders one pass of `viewport` into `sink` with default pipeline
/// sizing, one worker per CPU, and returns the task count.
pub fn start_pass<S>(
    viewport: Viewport,
    width: usize,
    height: usize,
    tile_width: usize,
    tile_height: usize,
    max_iterations: usize,
    sink: &mut S,
) -> Result<usize, RenderError>
where
    S: TileSink + Send + ?Sized,
{
    let config = RenderConfig {
        width,
        height,
        tile_width,
        tile_height,
        max_iterations,
        ..RenderConfig::default()
    };
    Renderer::new(config, viewport)?.start_pass(sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn small_config() -> RenderConfig {
        RenderConfig {
            width: 64,
            height: 48,
            tile_width: 16,
            tile_height: 16,
            max_iterations: 128,
            workers: 3,
            queue_capacity: 2,
        }
    }

    #[test]
    fn pass_delivers_every_tile_once() {
        let mut renderer = Renderer::new(small_config(), Viewport::default()).unwrap();
        let mut seen = HashSet::new();
        let mut sink = |rect: &Rectangle, pixels: &[u32]| {
            assert_eq!(pixels.len(), rect.len());
            assert!(seen.insert(*rect));
        };
        assert_eq!(renderer.start_pass(&mut sink), Ok(12));
        assert_eq!(seen.len(), 12);
        let report = renderer.last_pass().unwrap();
        assert_eq!((report.tasks, report.drained), (12, 12));
    }

    #[test]
    fn single_slot_queue_and_single_worker_still_finish() {
        let config = RenderConfig {
            workers: 1,
            queue_capacity: 1,
            ..small_config()
        };
        let mut renderer = Renderer::new(config, Viewport::default()).unwrap();
        let mut count = 0;
        let mut sink = |_: &Rectangle, _: &[u32]| count += 1;
        assert_eq!(renderer.start_pass(&mut sink), Ok(12));
        assert_eq!(count, 12);
    }

    #[test]
    fn passes_are_repeatable_across_worker_counts() {
        let mut images = vec![];
        for &workers in &[1, 2, 5] {
            let config = RenderConfig {
                workers,
                ..small_config()
            };
            let mut renderer = Renderer::new(config, Viewport::default()).unwrap();
            let mut image = vec![0u32; 64 * 48];
            let mut sink = |rect: &Rectangle, pixels: &[u32]| {
                for (i, color) in pixels.iter().enumerate() {
                    let x = rect.x_start() + i % rect.width();
                    let y = rect.y_start() + i / rect.width();
                    image[y * 64 + x] = *color;
                }
            };
            renderer.start_pass(&mut sink).unwrap();
            images.push(image);
        }
        assert_eq!(images[0], images[1]);
        assert_eq!(images[0], images[2]);
    }

    #[test]
    fn panning_keeps_the_palette_and_iteration_change_rebuilds_it() {
        let mut renderer = Renderer::new(small_config(), Viewport::default()).unwrap();
        let before = renderer.palette().clone();
        renderer.pan(0.1, 0.0).unwrap();
        renderer.zoom(0.5).unwrap();
        assert_eq!(renderer.palette(), &before);
        assert!(renderer.viewport() != Viewport::default());

        renderer.set_max_iterations(256).unwrap();
        assert_eq!(renderer.palette().max_iterations(), 256);
        assert_eq!(renderer.config().max_iterations, 256);
        assert!(renderer.set_max_iterations(0).is_err());
        assert_eq!(renderer.config().max_iterations, 256);
    }

    #[test]
    fn bad_configuration_fails_before_any_pass() {
        let config = RenderConfig {
            queue_capacity: 0,
            ..small_config()
        };
        assert_eq!(
            Renderer::new(config, Viewport::default()).err(),
            Some(RenderError::ZeroCapacity)
        );
    }

    #[test]
    fn sink_panic_fails_the_pass_without_hanging() {
        let mut renderer = Renderer::new(small_config(), Viewport::default()).unwrap();
        let mut calls = 0;
        let mut sink = |_: &Rectangle, _: &[u32]| {
            calls += 1;
            if calls == 2 {
                panic!("display lost");
            }
        };
        assert_eq!(renderer.start_pass(&mut sink), Err(RenderError::DrainPanicked));
        assert!(renderer.last_pass().is_none());
    }

    // Four tiles too large to allocate: every worker that takes one
    // panics.
    fn doomed_config(workers: usize) -> RenderConfig {
        RenderConfig {
            width: 1 << 32,
            height: 1 << 32,
            tile_width: 1 << 31,
            tile_height: 1 << 31,
            max_iterations: 16,
            workers,
            queue_capacity: 1,
        }
    }

    #[test]
    fn lone_worker_panic_fails_the_pass_without_hanging() {
        let mut renderer = Renderer::new(doomed_config(1), Viewport::default()).unwrap();
        let mut sink = |_: &Rectangle, _: &[u32]| {};
        assert_eq!(renderer.start_pass(&mut sink), Err(RenderError::WorkerPanicked(0)));
        assert!(renderer.last_pass().is_none());
        // nothing is left over from the failed pass
        assert_eq!(renderer.start_pass(&mut sink), Err(RenderError::WorkerPanicked(0)));
    }

    #[test]
    fn panicking_workers_in_a_larger_pool_fail_the_pass() {
        let mut renderer = Renderer::new(doomed_config(3), Viewport::default()).unwrap();
        let mut sink = |_: &Rectangle, _: &[u32]| {};
        match renderer.start_pass(&mut sink) {
            Err(RenderError::WorkerPanicked(worker)) => assert!(worker < 3),
            other => panic!("expected a worker failure, got {:?}", other),
        }
        assert!(renderer.last_pass().is_none());
    }
}
