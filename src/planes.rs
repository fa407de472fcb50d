// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the Viewport, the rectangle of the complex plane we are
//! looking at, and the PlaneMapper, which relates the integral plane
//! of image pixels (origin at 0,0) to that rectangle.
use num::Complex;

use crate::errors::RenderError;

/// The complex-plane rectangle mapped onto the image.  Pixel `(0, 0)`
/// sits at `(re_min, im_min)`.  The viewport only changes between
/// passes; the renderer hands workers a copy.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    re_min: f64,
    re_max: f64,
    im_min: f64,
    im_max: f64,
}

impl Viewport {
    /// Constructor.  The bounds must be finite and each minimum must
    /// be strictly below its maximum.
    pub fn new(
        re_min: f64,
        re_max: f64,
        im_min: f64,
        im_max: f64,
    ) -> Result<Viewport, RenderError> {
        if ![re_min, re_max, im_min, im_max].iter().all(|v| v.is_finite()) {
            return Err(RenderError::InvalidViewport(
                "bounds must be finite numbers".to_string(),
            ));
        }
        if re_min >= re_max {
            return Err(RenderError::InvalidViewport(format!(
                "real bounds inverted or empty: {} >= {}",
                re_min, re_max
            )));
        }
        if im_min >= im_max {
            return Err(RenderError::InvalidViewport(format!(
                "imaginary bounds inverted or empty: {} >= {}",
                im_min, im_max
            )));
        }
        Ok(Viewport {
            re_min,
            re_max,
            im_min,
            im_max,
        })
    }

    /// Builds the viewport from its left-lower and right-upper corners.
    pub fn from_corners(
        leftlower: Complex<f64>,
        rightupper: Complex<f64>,
    ) -> Result<Viewport, RenderError> {
        Viewport::new(leftlower.re, rightupper.re, leftlower.im, rightupper.im)
    }

    /// Smallest real part shown.
    pub fn re_min(&self) -> f64 {
        self.re_min
    }

    /// Largest real part shown.
    pub fn re_max(&self) -> f64 {
        self.re_max
    }

    /// Smallest imaginary part shown.
    pub fn im_min(&self) -> f64 {
        self.im_min
    }

    /// Largest imaginary part shown.
    pub fn im_max(&self) -> f64 {
        self.im_max
    }

    /// The point in the middle of the viewport.
    pub fn center(&self) -> Complex<f64> {
        Complex::new(
            (self.re_min + self.re_max) / 2.0,
            (self.im_min + self.im_max) / 2.0,
        )
    }

    /// Shifts the viewport by a fraction of its own width (`dx`) and
    /// height (`dy`).  `pan(0.1, 0.0)` moves the view a tenth of the
    /// way to the right.
    pub fn pan(&self, dx: f64, dy: f64) -> Result<Viewport, RenderError> {
        let dre = (self.re_max - self.re_min) * dx;
        let dim = (self.im_max - self.im_min) * dy;
        Viewport::new(
            self.re_min + dre,
            self.re_max + dre,
            self.im_min + dim,
            self.im_max + dim,
        )
    }

    /// Scales the viewport about its centre.  A factor below 1 zooms
    /// in, above 1 zooms out.
    pub fn zoom(&self, factor: f64) -> Result<Viewport, RenderError> {
        self.zoom_at(self.center(), factor)
    }

    /// Scales the viewport about `anchor`, which keeps its position
    /// relative to the edges.
    pub fn zoom_at(&self, anchor: Complex<f64>, factor: f64) -> Result<Viewport, RenderError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(RenderError::InvalidViewport(format!(
                "zoom factor must be positive, got {}",
                factor
            )));
        }
        Viewport::new(
            anchor.re + (self.re_min - anchor.re) * factor,
            anchor.re + (self.re_max - anchor.re) * factor,
            anchor.im + (self.im_min - anchor.im) * factor,
            anchor.im + (self.im_max - anchor.im) * factor,
        )
    }
}

impl Default for Viewport {
    /// The whole set: re ∈ [-2.5, 1.5], im ∈ [-2, 2].
    fn default() -> Viewport {
        Viewport {
            re_min: -2.5,
            re_max: 1.5,
            im_min: -2.0,
            im_max: 2.0,
        }
    }
}

/// Maps pixels of a `width × height` image onto a viewport.
#[derive(Copy, Clone, Debug)]
pub struct PlaneMapper {
    viewport: Viewport,
    // The size of one pixel on the complex plane, along each axis.
    pixel_size: (f64, f64),
}

impl PlaneMapper {
    /// Constructor.  Takes the viewport and the integral plane it is
    /// drawn on.
    pub fn new(
        viewport: Viewport,
        width: usize,
        height: usize,
    ) -> Result<PlaneMapper, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage { width, height });
        }
        Ok(PlaneMapper {
            viewport,
            pixel_size: (
                (viewport.re_max - viewport.re_min) / (width as f64),
                (viewport.im_max - viewport.im_min) / (height as f64),
            ),
        })
    }

    /// Given the column and row of a pixel on the integral cartesian
    /// plane, return the complex number at that pixel's corner.
    #[inline]
    pub fn pixel_to_point(&self, x: usize, y: usize) -> Complex<f64> {
        Complex::new(
            self.viewport.re_min + (x as f64) * self.pixel_size.0,
            self.viewport.im_min + (y as f64) * self.pixel_size.1,
        )
    }
}
