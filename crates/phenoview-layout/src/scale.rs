//! Linear value to pixel mapping

use serde::{Deserialize, Serialize};

/// Maps a value domain linearly onto a pixel range.
///
/// The range may be inverted (`start > end`), as for a vertical axis whose
/// origin is at the bottom of the chart. Values outside the domain are
/// extrapolated, not clamped.
///
/// # Examples
///
/// ```
/// use phenoview_layout::scale::LinearScale;
///
/// let scale = LinearScale::new((10.0, 20.0), (400.0, 0.0));
/// assert_eq!(scale.apply(10.0), 400.0);
/// assert_eq!(scale.apply(15.0), 200.0);
/// assert_eq!(scale.invert(0.0), 20.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    fn is_degenerate(&self) -> bool {
        is_empty_span(self.domain)
    }

    /// Pixel position of `value`.
    ///
    /// A degenerate domain maps every value to the middle of the range.
    #[must_use]
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if self.is_degenerate() {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Value at pixel position `pixel`.
    #[must_use]
    pub fn invert(&self, pixel: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if is_empty_span(self.range) {
            return (d0 + d1) / 2.0;
        }
        d0 + (pixel - r0) / (r1 - r0) * (d1 - d0)
    }
}

/// Whether `start` and `end` are equal up to rounding, relative to their magnitude.
fn is_empty_span((start, end): (f64, f64)) -> bool {
    (end - start).abs() <= f64::EPSILON * start.abs().max(end.abs())
}
