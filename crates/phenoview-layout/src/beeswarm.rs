//! Beeswarm layout
//!
//! Places circles of a uniform radius at fixed vertical positions, moving them
//! horizontally away from an anchor until they no longer overlap.
//!
//! # Algorithm
//!
//! Points are swept in ascending vertical order. For each point, the circles
//! already placed within one diameter vertically form the active set. Every
//! active circle contributes the two horizontal positions at which the new
//! circle would touch it:
//!
//! ```text
//!            dx = sqrt((2r)² - dy²)
//!        <-------->
//!   ( l )    (cx)    ( r )        l = cx - dx, r = cx + dx
//! ```
//!
//! The anchor itself is always a candidate. A candidate lying strictly inside
//! some active circle's `(l, r)` interval would overlap that circle and is
//! dropped. Of the rest, the one closest to the anchor wins; on ties the first
//! in candidate order (anchor, then circles in placement order, left before
//! right) is taken. The result is clamped to `anchor ± bound`.
//!
//! This is a greedy sweep, not an optimal packing. When the bound is too
//! narrow for the swarm, clamped circles may overlap.
//!
//! # Examples
//!
//! ```
//! use phenoview_layout::beeswarm::{Beeswarm, Leaning};
//!
//! let swarm = Beeswarm {
//!     anchor_x: 0.0,
//!     radius: 5.0,
//!     bound: 70.0,
//!     leaning: Leaning::None,
//! };
//! let points = swarm.layout([("a", 10.0), ("b", 10.0), ("c", 10.0)]);
//! let xs = points.iter().map(|p| p.x).collect::<Vec<_>>();
//! assert_eq!(xs, [0.0, -10.0, 10.0]);
//! ```

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

const EPSILON: f64 = 1e-9;

/// Side of the anchor points may be moved to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Leaning {
    /// Either side.
    #[default]
    None,
    /// At or left of the anchor.
    Left,
    /// At or right of the anchor.
    Right,
}

impl Leaning {
    fn admits(self, candidate: f64, anchor: f64) -> bool {
        match self {
            Self::None => true,
            Self::Left => candidate <= anchor,
            Self::Right => candidate >= anchor,
        }
    }
}

/// Layout parameters of one swarm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Beeswarm {
    /// Preferred horizontal position.
    pub anchor_x: f64,
    /// Radius of every circle.
    pub radius: f64,
    /// Maximum horizontal distance from the anchor. Must be non-negative.
    pub bound: f64,
    pub leaning: Leaning,
}

/// A laid out point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwarmPoint<R> {
    /// Caller's reference to the source record.
    pub source: R,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone, Copy)]
struct Circle {
    x: f64,
    y: f64,
}

impl Beeswarm {
    /// Assigns a horizontal position to every point.
    ///
    /// # Arguments
    ///
    /// * `points` - `(reference, y)` pairs; `y` is kept as is
    ///
    /// # Returns
    ///
    /// One [`SwarmPoint`] per input, in ascending `y` order.
    pub fn layout<R, I>(&self, points: I) -> Vec<SwarmPoint<R>>
    where
        I: IntoIterator<Item = (R, f64)>,
    {
        let mut points = points.into_iter().collect::<Vec<_>>();
        points.sort_by(|a, b| a.1.total_cmp(&b.1));

        let diameter = 2.0 * self.radius;
        let mut active = VecDeque::<Circle>::new();
        let mut candidates = vec![];
        let mut intervals = vec![];

        points
            .into_iter()
            .map(|(source, y)| {
                // placement order is ascending y, so stale circles are at the front
                while active.front().is_some_and(|c| y - c.y > diameter) {
                    active.pop_front();
                }

                candidates.clear();
                intervals.clear();
                candidates.extend([self.anchor_x, self.anchor_x]);
                for circle in &active {
                    let dy = y - circle.y;
                    let dx = (diameter * diameter - dy * dy).max(0.0).sqrt();
                    let (left, right) = (circle.x - dx, circle.x + dx);
                    candidates.extend([left, right]);
                    intervals.push((left, right));
                }

                let x = self.choose(&candidates, &intervals);
                active.push_back(Circle { x, y });
                SwarmPoint {
                    source,
                    x,
                    y,
                    radius: self.radius,
                }
            })
            .collect()
    }

    fn choose(&self, candidates: &[f64], intervals: &[(f64, f64)]) -> f64 {
        let inside = |c: f64| {
            intervals
                .iter()
                .any(|&(left, right)| left + EPSILON < c && c < right - EPSILON)
        };
        let distance = |c: f64| (c - self.anchor_x).abs();
        let chosen = candidates
            .iter()
            .copied()
            .filter(|&c| !inside(c))
            .filter(|&c| self.leaning.admits(c, self.anchor_x))
            .min_by(|&a, &b| distance(a).total_cmp(&distance(b)))
            .unwrap_or(self.anchor_x);
        chosen
            .max(self.anchor_x - self.bound)
            .min(self.anchor_x + self.bound)
    }
}
