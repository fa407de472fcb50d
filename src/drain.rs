// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The single consumer of finished tiles.

use std::panic::{catch_unwind, AssertUnwindSafe};

use log::{debug, trace};

use crate::errors::RenderError;
use crate::pool::Outcome;
use crate::queue::BoundedQueue;
use crate::tiles::Rectangle;

/// Where finished tiles go.  Tiles arrive in no particular order, one
/// at a time, all from the same thread.  `pixels` is only borrowed for
/// the call; a sink that wants to keep it must copy it.
pub trait TileSink {
    /// Receives one tile: its place in the image and its packed
    /// colours, row-major, `rect.width() * rect.height()` long.
    fn render_tile(&mut self, rect: &Rectangle, pixels: &[u32]);
}

impl<F> TileSink for F
where
    F: FnMut(&Rectangle, &[u32]),
{
    fn render_tile(&mut self, rect: &Rectangle, pixels: &[u32]) {
        (self)(rect, pixels)
    }
}

/// Pops results until the expected number of tiles has been seen.
#[derive(Copy, Clone, Debug)]
pub struct ResultDrain {
    expected: usize,
}

impl ResultDrain {
    /// A drain for a pass that produced `expected` tasks.
    pub fn new(expected: usize) -> ResultDrain {
        ResultDrain { expected }
    }

    /// Number of results this drain waits for.
    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Forwards every tile to `sink` and returns how many were
    /// delivered.
    ///
    /// Every task accounts for exactly one result, so the drain keeps
    /// counting even after something has gone wrong: a worker that
    /// died or a sink that panicked.  It stops forwarding once that
    /// happens, keeps popping so no worker is left blocked on a full
    /// queue, and reports the first failure when the count is reached.
    pub fn run<S>(
        &self,
        results: &BoundedQueue<Outcome>,
        sink: &mut S,
    ) -> Result<usize, RenderError>
    where
        S: TileSink + ?Sized,
    {
        let mut consumed = 0;
        let mut delivered = 0;
        let mut failure: Option<RenderError> = None;

        debug!("drain waiting for {} tiles", self.expected);
        while consumed < self.expected {
            let outcome = results.pop();
            consumed += 1;
            match outcome {
                Ok(tile) if failure.is_none() => {
                    let rect = *tile.rect();
                    let forwarded =
                        catch_unwind(AssertUnwindSafe(|| sink.render_tile(&rect, tile.pixels())));
                    match forwarded {
                        Ok(()) => {
                            delivered += 1;
                            trace!(
                                "drain: consumed {} {} {} {}",
                                rect.x_start(),
                                rect.x_end(),
                                rect.y_start(),
                                rect.y_end()
                            );
                        }
                        Err(_) => failure = Some(RenderError::DrainPanicked),
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    debug!("drain: {}", e);
                    if failure.is_none() {
                        failure = Some(e);
                    }
                }
            }
        }
        debug!("drain finished after {} tiles", consumed);

        match failure {
            Some(e) => Err(e),
            None => Ok(delivered),
        }
    }
}
