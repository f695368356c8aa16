//! De Casteljau evaluation with per-parameter memoization.
//!
//! `B(start, len, t)` is the point of the sub-curve over control points
//! `start..start+len`:
//!
//! ```text
//! B(i, 1, t)   = P[i]
//! B(i, k, t)   = lerp(B(i, k−1, t), B(i+1, k−1, t), t)
//! ```
//!
//! Without a cache the recursion visits `2^(n−1)` leaves per parameter. The
//! table below holds one entry per `(start, len)` pair and is cleared for
//! every `t`, so each evaluation is `O(n²)`.

use serde::{Deserialize, Serialize};

/// Segments produced when no resolution is configured.
pub const DEFAULT_RESOLUTION: usize = 50;

/// A point in graph or data space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

impl CurvePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn lerp(self, other: CurvePoint, t: f64) -> CurvePoint {
        CurvePoint {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

impl From<(f64, f64)> for CurvePoint {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Largest accepted number of curve segments.
pub const MAX_RESOLUTION: usize = 10_000;

/// Fits one Bézier curve of degree `n − 1` through `n` control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurveFitter {
    resolution: usize,
}

impl CurveFitter {
    /// `resolution` is the number of segments; the output has one more point.
    pub fn new(resolution: usize) -> Self {
        Self { resolution }
    }

    pub fn resolution(&self) -> usize {
        self.resolution
    }

    /// Evaluate the curve at `resolution + 1` evenly spaced parameters.
    ///
    /// Empty input yields an empty curve. A single point is repeated.
    pub fn fit(&self, control: &[CurvePoint]) -> Vec<CurvePoint> {
        if control.is_empty() {
            return Vec::new();
        }

        let mut memo = Memo::new(control.len());
        (0..=self.resolution)
            .map(|i| {
                let t = if self.resolution == 0 {
                    0.0
                } else {
                    i as f64 / self.resolution as f64
                };
                memo.clear();
                evaluate(control, 0, control.len(), t, &mut memo)
            })
            .collect()
    }
}

impl Default for CurveFitter {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLUTION)
    }
}

/// `(start, len)` → point, valid for a single `t`.
struct Memo {
    n: usize,
    table: Vec<Option<CurvePoint>>,
}

impl Memo {
    fn new(n: usize) -> Self {
        Self {
            n,
            table: vec![None; n * n],
        }
    }

    fn clear(&mut self) {
        self.table.iter_mut().for_each(|slot| *slot = None);
    }

    fn slot(&mut self, start: usize, len: usize) -> &mut Option<CurvePoint> {
        &mut self.table[start * self.n + (len - 1)]
    }
}

fn evaluate(control: &[CurvePoint], start: usize, len: usize, t: f64, memo: &mut Memo) -> CurvePoint {
    if len == 1 {
        return control[start];
    }
    if let Some(point) = *memo.slot(start, len) {
        return point;
    }
    let left = evaluate(control, start, len - 1, t, memo);
    let right = evaluate(control, start + 1, len - 1, t, memo);
    let point = left.lerp(right, t);
    *memo.slot(start, len) = Some(point);
    point
}
