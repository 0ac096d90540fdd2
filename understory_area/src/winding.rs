// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Point classification against an [`Outline`].
//!
//! The fill rule is non-zero winding. Winding numbers are accumulated along a ray towards
//! `+x` using the half-open rule (an edge counts when `y0 <= p.y < y1`), so a ray through a
//! vertex is counted exactly once. Curves are split at their y-extrema into monotone
//! pieces and each piece is solved by bisection.

use kurbo::{ParamCurve, ParamCurveNearest, PathSeg, Point};
use smallvec::SmallVec;

use crate::boundary::Outline;
use crate::geom::{EPSILON, NEAREST_ACCURACY, control_bounds, rect_contains};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Iterations used to locate the ray crossing on a monotone curve piece.
const BISECT_STEPS: usize = 64;

/// Where a point lies relative to a region.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Containment {
    /// Strictly inside: non-zero winding and not on the boundary.
    Inside,
    /// Strictly outside: zero winding and not on the boundary.
    Outside,
    /// Within [`EPSILON`](crate::EPSILON) of an edge.
    Boundary,
}

/// Classify `p`. The on-boundary test takes precedence over the winding number.
pub(crate) fn containment(outline: &Outline, p: Point) -> Containment {
    if on_boundary(outline, p) {
        Containment::Boundary
    } else if winding(outline, p) != 0 {
        Containment::Inside
    } else {
        Containment::Outside
    }
}

/// Whether `p` lies within [`EPSILON`] of any edge.
pub(crate) fn on_boundary(outline: &Outline, p: Point) -> bool {
    outline.edges().any(|e| near_segment(e.seg, p))
}

/// Non-zero winding number of `outline` around `p`.
pub(crate) fn winding(outline: &Outline, p: Point) -> i32 {
    outline.edges().map(|e| segment_winding(e.seg, p)).sum()
}

fn near_segment(seg: PathSeg, p: Point) -> bool {
    if !rect_contains(control_bounds(seg), p) {
        return false;
    }
    match seg {
        PathSeg::Line(line) => {
            let d = line.p1 - line.p0;
            let len2 = d.hypot2();
            let t = if len2 == 0.0 {
                0.0
            } else {
                ((p - line.p0).dot(d) / len2).clamp(0.0, 1.0)
            };
            (line.eval(t) - p).hypot2() <= EPSILON * EPSILON
        }
        _ => seg.nearest(p, NEAREST_ACCURACY).distance_sq <= EPSILON * EPSILON,
    }
}

/// Contribution of one segment to the winding number around `p`.
pub(crate) fn segment_winding(seg: PathSeg, p: Point) -> i32 {
    let bounds = control_bounds(seg);
    if p.y < bounds.y0 || p.y > bounds.y1 || p.x > bounds.x1 {
        return 0;
    }
    if let PathSeg::Line(line) = seg {
        return monotone_winding(seg, 0.0, 1.0, line.p0.y, line.p1.y, p);
    }
    let mut splits: SmallVec<[f64; 4]> = SmallVec::new();
    splits.push(0.0);
    splits.extend(y_extrema(seg));
    splits.push(1.0);
    splits
        .windows(2)
        .map(|w| monotone_winding(seg, w[0], w[1], seg.eval(w[0]).y, seg.eval(w[1]).y, p))
        .sum()
}

/// Winding of the piece of `seg` on `[ta, tb]`, which must be monotone in y.
fn monotone_winding(seg: PathSeg, ta: f64, tb: f64, ya: f64, yb: f64, p: Point) -> i32 {
    let dir = if ya <= p.y && yb > p.y {
        1
    } else if yb <= p.y && ya > p.y {
        -1
    } else {
        return 0;
    };
    let x = match seg {
        PathSeg::Line(line) => {
            let (a, b) = (line.p0, line.p1);
            a.x + (b.x - a.x) * (p.y - a.y) / (b.y - a.y)
        }
        _ => {
            let (mut lo, mut hi) = (ta, tb);
            // Keep y(lo) <= p.y < y(hi) for the upward case; swap roles otherwise.
            let rising = dir > 0;
            for _ in 0..BISECT_STEPS {
                let mid = 0.5 * (lo + hi);
                if (seg.eval(mid).y <= p.y) == rising {
                    lo = mid;
                } else {
                    hi = mid;
                }
            }
            seg.eval(0.5 * (lo + hi)).x
        }
    };
    if x > p.x { dir } else { 0 }
}

/// Parameters in `(0, 1)` where the y-derivative of a curve vanishes, ascending.
fn y_extrema(seg: PathSeg) -> SmallVec<[f64; 2]> {
    let mut out: SmallVec<[f64; 2]> = SmallVec::new();
    match seg {
        PathSeg::Line(_) => {}
        PathSeg::Quad(q) => {
            let denom = q.p0.y - 2.0 * q.p1.y + q.p2.y;
            if denom.abs() > f64::EPSILON {
                out.push((q.p0.y - q.p1.y) / denom);
            }
        }
        PathSeg::Cubic(c) => {
            let a = c.p1.y - c.p0.y;
            let b = c.p2.y - c.p1.y;
            let d = c.p3.y - c.p2.y;
            out.extend(kurbo::common::solve_quadratic(a, 2.0 * (b - a), a - 2.0 * b + d));
        }
    }
    out.retain(|t| *t > 0.0 && *t < 1.0);
    out.sort_unstable_by(f64::total_cmp);
    out
}
