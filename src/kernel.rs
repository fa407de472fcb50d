// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The escape-time function.
//!
//! Starting from `z = c`, we repeatedly compute `z = z² + c` and count
//! the steps taken before `|z|² > 4`.  A point that never gets there
//! within `max_iterations` steps is taken to be inside the Mandelbrot
//! set and gets `max_iterations` itself.
//!
//! Interior points are the expensive ones, because they burn the whole
//! iteration budget.  Most of them settle into a cycle, though, and a
//! cycle in floating point is an exact repeat of some earlier `z`.  So
//! we keep a checkpoint of `z` and compare every new value against it;
//! the checkpoint is refreshed after windows of 8, 16, 32, ... steps,
//! which catches any cycle shorter than the current window.  The escape
//! test runs before the comparison on every step, so escaping points
//! get exactly the count the plain iteration would give them.

use num::Complex;

const FIRST_PERIOD: usize = 8;

/// Escape-time of `c`, in `[0, max_iterations]`, with periodicity
/// detection.
#[inline]
pub fn escape_time(c: Complex<f64>, max_iterations: usize) -> usize {
    let mut z = c;
    let mut checkpoint = z;
    let mut period = FIRST_PERIOD.min(max_iterations).max(1);
    let mut steps = 0;

    for i in 0..max_iterations {
        z = z * z + c;
        if z.norm_sqr() > 4.0 {
            return i;
        }
        if z == checkpoint {
            return max_iterations;
        }
        steps += 1;
        if steps == period {
            steps = 0;
            period = (period * 2).min(max_iterations);
            checkpoint = z;
        }
    }
    max_iterations
}

/// Escape-time of `c` by plain iteration, spending the whole budget on
/// interior points.  Kept as the reference `escape_time` must agree
/// with.
pub fn escape_time_naive(c: Complex<f64>, max_iterations: usize) -> usize {
    let mut z = c;
    for i in 0..max_iterations {
        z = z * z + c;
        if z.norm_sqr() > 4.0 {
            return i;
        }
    }
    max_iterations
}
