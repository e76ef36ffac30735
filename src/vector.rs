//! 2D vector helpers shared by every force
//!
//! Forces work on raw `f64` components rather than a point type so the inner
//! pair loops stay allocation-free and easy to read.

use serde::{Deserialize, Serialize};

/// A position in layout space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Both coordinates are finite (not NaN or infinite)
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Euclidean distance between two points
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Unit vector along `(dx, dy)` given its precomputed length
///
/// Returns `None` when `distance` is zero or not finite; callers treat that
/// pair as contributing no directional force.
pub fn unit(dx: f64, dy: f64, distance: f64) -> Option<(f64, f64)> {
    if distance > 0.0 && distance.is_finite() {
        Some((dx / distance, dy / distance))
    } else {
        None
    }
}

/// Mean of a set of points, `None` for an empty set
pub fn centroid(points: impl IntoIterator<Item = Point>) -> Option<Point> {
    let (sum, count) = points
        .into_iter()
        .fold((Point::default(), 0usize), |(acc, n), p| {
            (Point::new(acc.x + p.x, acc.y + p.y), n + 1)
        });
    (count > 0).then(|| Point::new(sum.x / count as f64, sum.y / count as f64))
}

/// Point with the smallest summed distance to all others
///
/// Ties go to the earlier point. `None` for an empty set.
pub fn medoid(points: &[Point]) -> Option<Point> {
    let n = points.len();
    let mut totals = vec![0.0; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = distance(points[i], points[j]);
            totals[i] += d;
            totals[j] += d;
        }
    }

    let best = (0..n).min_by(|&a, &b| totals[a].total_cmp(&totals[b]))?;
    Some(points[best])
}
