// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Iteration counts to colours.  Colours are packed `0x00RRGGBB`.

use crate::errors::RenderError;

/// Sixteen steps from deep blue through white to brown; escape counts
/// cycle through them.
const BANDS: [u32; 16] = [
    0x42_1E0F, 0x19_071A, 0x09_012F, 0x04_0449, 0x00_0764, 0x0C_2C8A, 0x18_52B1, 0x39_7DD1,
    0x86_B5E5, 0xD3_ECF8, 0xF1_E9BF, 0xF8_C95F, 0xFF_AA00, 0xCC_8000, 0x99_5700, 0x6A_3403,
];

/// Colour of points that never escape.
pub const INSIDE: u32 = 0x00_0000;

/// A lookup table of `max_iterations + 1` colours.  Built once and
/// read concurrently by every worker during a pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    colors: Vec<u32>,
}

impl Palette {
    /// Builds the table for a given iteration cap.  The last entry,
    /// index `max_iterations`, is black.
    pub fn new(max_iterations: usize) -> Result<Palette, RenderError> {
        if max_iterations == 0 {
            return Err(RenderError::NoIterations);
        }
        let colors = (0..max_iterations)
            .map(|i| BANDS[i % BANDS.len()])
            .chain(Some(INSIDE))
            .collect();
        Ok(Palette { colors })
    }

    /// The iteration cap the table was built for.
    pub fn max_iterations(&self) -> usize {
        self.colors.len() - 1
    }

    /// Colour for an escape count.  Counts past the cap are clamped to
    /// it.
    #[inline]
    pub fn color(&self, iterations: usize) -> u32 {
        self.colors[iterations.min(self.max_iterations())]
    }
}

/// Splits a packed colour into its red, green and blue bytes.
#[inline]
pub fn to_rgb(color: u32) -> [u8; 3] {
    [(color >> 16) as u8, (color >> 8) as u8, color as u8]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_room_for_the_inside_colour() {
        let p = Palette::new(1024).unwrap();
        assert_eq!(p.max_iterations(), 1024);
        assert_eq!(p.color(1024), INSIDE);
    }

    #[test]
    fn escape_counts_cycle_through_the_bands() {
        let p = Palette::new(100).unwrap();
        assert_eq!(p.color(0), BANDS[0]);
        assert_eq!(p.color(15), BANDS[15]);
        assert_eq!(p.color(16), BANDS[0]);
        assert_eq!(p.color(99), BANDS[99 % 16]);
    }

    #[test]
    fn large_counts_are_clamped() {
        let p = Palette::new(10).unwrap();
        assert_eq!(p.color(11), INSIDE);
        assert_eq!(p.color(usize::max_value()), INSIDE);
    }

    #[test]
    fn zero_cap_is_refused() {
        assert_eq!(Palette::new(0), Err(RenderError::NoIterations));
    }

    #[test]
    fn rgb_unpacking() {
        assert_eq!(to_rgb(0xFF_AA00), [0xFF, 0xAA, 0x00]);
        assert_eq!(to_rgb(INSIDE), [0, 0, 0]);
    }
}
