//! Dash decomposition for straight lines
//!
//! A dashed line is replaced by the list of its visible sub-segments. The
//! stylesheet dash pattern is expressed in stroke-dasharray units and is
//! scaled down by [`DASH_UNIT_DIVISOR`] before it is laid along the line.

use super::Point;

/// Divisor applied to both entries of a `[dash, gap]` pattern
pub const DASH_UNIT_DIVISOR: f64 = 6.0;

/// Remainders shorter than this are treated as the end of the line
const REMAINDER_EPSILON: f64 = 1e-9;

/// Lines that would need more dashes than this are drawn solid
pub const MAX_DASHES: f64 = 100_000.0;

/// Split the line `from -> to` into its drawn dashes.
///
/// Full dashes of length `dash / 6` are laid every `(dash + gap) / 6` along
/// the line direction; the last dash is clipped to whatever length remains.
/// A pattern without a positive period yields the solid line, and so does a
/// line whose length is not finite or would take more than [`MAX_DASHES`].
pub fn dash_segments(from: Point, to: Point, pattern: [f64; 2]) -> Vec<(Point, Point)> {
    let stroke = pattern[0] / DASH_UNIT_DIVISOR;
    let gap = pattern[1] / DASH_UNIT_DIVISOR;
    let period = stroke + gap;

    if !(period > 0.0) || !period.is_finite() {
        return vec![(from, to)];
    }
    if stroke <= 0.0 {
        return Vec::new();
    }

    let length = from.distance(to);
    if !length.is_finite() || length / period > MAX_DASHES {
        return vec![(from, to)];
    }
    if length <= REMAINDER_EPSILON {
        return Vec::new();
    }
    let count = (length / period).floor() as usize;
    let (ux, uy) = ((to.x - from.x) / length, (to.y - from.y) / length);

    let advance = |p: Point, distance: f64| Point::new(p.x + ux * distance, p.y + uy * distance);

    let mut segments = Vec::new();
    let mut cursor = from;
    for _ in 0..count {
        segments.push((cursor, advance(cursor, stroke)));
        cursor = advance(cursor, period);
    }

    let remaining = cursor.distance(to);
    if remaining > REMAINDER_EPSILON {
        segments.push((cursor, advance(cursor, remaining.min(stroke))));
    }

    segments
}
