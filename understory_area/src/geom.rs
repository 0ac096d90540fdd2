// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed-form geometric predicates used by the Boolean engine.
//!
//! Everything here is a pure function over [`kurbo`] segments:
//!
//! - [`intersect_lines`] and [`collinear_contacts`] for line/line pairs.
//! - [`intersect_line_and_quad`] and [`intersect_line_and_cubic`] for line/curve pairs,
//!   solved in closed form on the curve's signed distance to the line.
//! - [`sub_quad`], [`sub_cubic`] and [`trim`] for cutting curves at a parameter.
//!
//! All "is this effectively zero" decisions go through [`EPSILON`]. Parameters reported
//! in a [`ParamHit`] are clamped to `[0, 1]`, and a hit that lands on a segment endpoint
//! reports that endpoint's exact coordinates.

use kurbo::common::{solve_cubic, solve_quadratic};
use kurbo::{CubicBez, Line, ParamCurve, ParamCurveNearest, PathSeg, Point, QuadBez, Rect, Vec2};
use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Package-wide tolerance for near-degenerate configurations.
///
/// Used for point coincidence (absolute distance), for the sine of the angle between
/// two segments when deciding whether they are parallel, and as the bounding-box area
/// below which a Boolean result collapses to the empty region.
pub const EPSILON: f64 = 1e-9;

/// Two roots closer than this (in curve parameter space) are reported once.
pub(crate) const ROOT_EPSILON: f64 = 1e-7;

/// Accuracy requested from kurbo's nearest-point solver.
pub(crate) const NEAREST_ACCURACY: f64 = 1e-12;

/// A crossing between two segments.
///
/// `t0` is the parameter on the first segment passed to the predicate, `t1` the
/// parameter on the second. Both lie in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamHit {
    /// Location of the crossing.
    pub point: Point,
    /// Parameter on the first segment.
    pub t0: f64,
    /// Parameter on the second segment.
    pub t1: f64,
}

/// Whether two points are the same within [`EPSILON`].
#[inline]
pub fn points_coincide(a: Point, b: Point) -> bool {
    (a - b).hypot2() <= EPSILON * EPSILON
}

/// Intersect two line segments.
///
/// Endpoints are inclusive, so segments that merely touch (a T-junction or a shared
/// vertex) report a hit. Parallel segments, including collinear overlapping ones,
/// return `None`; see [`collinear_contacts`] for those.
pub fn intersect_lines(a: Line, b: Line) -> Option<ParamHit> {
    let r = a.p1 - a.p0;
    let s = b.p1 - b.p0;
    let len_r = r.hypot();
    let len_s = s.hypot();
    if len_r == 0.0 || len_s == 0.0 {
        return None;
    }
    let denom = r.cross(s);
    if denom.abs() <= EPSILON * len_r * len_s {
        return None;
    }
    let qp = b.p0 - a.p0;
    let t = snap_param(qp.cross(s) / denom, EPSILON / len_r)?;
    let u = snap_param(qp.cross(r) / denom, EPSILON / len_s)?;
    let point = if t == 0.0 {
        a.p0
    } else if t == 1.0 {
        a.p1
    } else if u == 0.0 {
        b.p0
    } else if u == 1.0 {
        b.p1
    } else {
        a.p0 + r * t
    };
    Some(ParamHit { point, t0: t, t1: u })
}

/// Contacts between two collinear, overlapping line segments.
///
/// Returns every endpoint of either segment that lies on the other one. These are the
/// places where both boundaries must be split so that a shared stretch of edge becomes
/// one fragment on each side. Segments that are not collinear produce no contacts.
pub fn collinear_contacts(a: Line, b: Line) -> SmallVec<[ParamHit; 4]> {
    let mut out = SmallVec::new();
    let r = a.p1 - a.p0;
    let s = b.p1 - b.p0;
    let len_r = r.hypot();
    let len_s = s.hypot();
    if len_r == 0.0 || len_s == 0.0 {
        return out;
    }
    if r.cross(s).abs() > EPSILON * len_r * len_s || (b.p0 - a.p0).cross(r).abs() > EPSILON * len_r
    {
        return out;
    }
    for (p, u) in [(b.p0, 0.0), (b.p1, 1.0)] {
        if let Some(t) = snap_param((p - a.p0).dot(r) / (len_r * len_r), EPSILON / len_r) {
            out.push(ParamHit { point: p, t0: t, t1: u });
        }
    }
    for (p, t) in [(a.p0, 0.0), (a.p1, 1.0)] {
        if let Some(u) = snap_param((p - b.p0).dot(s) / (len_s * len_s), EPSILON / len_s) {
            out.push(ParamHit { point: p, t0: t, t1: u });
        }
    }
    out
}

/// Intersect a line segment with a quadratic Bézier.
///
/// `t0` of each hit is on the line, `t1` on the curve. A tangential touch (double root)
/// is reported once. A curve lying on the line reports only endpoint contacts.
pub fn intersect_line_and_quad(line: Line, quad: QuadBez) -> SmallVec<[ParamHit; 3]> {
    let Some(frame) = LineFrame::new(line) else {
        return SmallVec::new();
    };
    let (p0, p1, p2) = (quad.p0.to_vec2(), quad.p1.to_vec2(), quad.p2.to_vec2());
    let c0 = frame.distance(quad.p0);
    let c1 = 2.0 * frame.dir.cross(p1 - p0);
    let c2 = frame.dir.cross(p0 - p1 * 2.0 + p2);
    if [c0, c1, c2].iter().all(|c| c.abs() <= EPSILON) {
        return coincident_contacts(line, PathSeg::Quad(quad));
    }
    frame.collect(PathSeg::Quad(quad), solve_quadratic(c0, c1, c2))
}

/// Intersect a line segment with a cubic Bézier.
///
/// `t0` of each hit is on the line, `t1` on the curve. Near-degenerate cubics (control
/// points collinear with the endpoints) do not produce duplicate roots.
pub fn intersect_line_and_cubic(line: Line, cubic: CubicBez) -> SmallVec<[ParamHit; 3]> {
    let Some(frame) = LineFrame::new(line) else {
        return SmallVec::new();
    };
    let (p0, p1, p2, p3) = (
        cubic.p0.to_vec2(),
        cubic.p1.to_vec2(),
        cubic.p2.to_vec2(),
        cubic.p3.to_vec2(),
    );
    let c0 = frame.distance(cubic.p0);
    let c1 = 3.0 * frame.dir.cross(p1 - p0);
    let c2 = 3.0 * frame.dir.cross(p0 - p1 * 2.0 + p2);
    let c3 = frame.dir.cross(p3 - p0 + (p1 - p2) * 3.0);
    if [c0, c1, c2, c3].iter().all(|c| c.abs() <= EPSILON) {
        return coincident_contacts(line, PathSeg::Cubic(cubic));
    }
    frame.collect(PathSeg::Cubic(cubic), solve_cubic(c0, c1, c2, c3))
}

/// A line segment expressed as origin plus unit direction.
struct LineFrame {
    line: Line,
    dir: Vec2,
    len: f64,
}

impl LineFrame {
    fn new(line: Line) -> Option<Self> {
        let d = line.p1 - line.p0;
        let len = d.hypot();
        (len > 0.0).then(|| Self {
            line,
            dir: d / len,
            len,
        })
    }

    /// Signed distance of `p` from the infinite line.
    fn distance(&self, p: Point) -> f64 {
        self.dir.cross(p - self.line.p0)
    }

    fn collect(
        &self,
        curve: PathSeg,
        roots: impl IntoIterator<Item = f64>,
    ) -> SmallVec<[ParamHit; 3]> {
        let mut hits: SmallVec<[ParamHit; 3]> = SmallVec::new();
        for root in roots {
            let Some(t) = snap_param(root, EPSILON) else {
                continue;
            };
            let point = curve.eval(t);
            let along = (point - self.line.p0).dot(self.dir) / self.len;
            let Some(s) = snap_param(along, EPSILON / self.len) else {
                continue;
            };
            if hits.iter().any(|h| (h.t1 - t).abs() <= ROOT_EPSILON) {
                continue;
            }
            let point = if t == 0.0 {
                curve.start()
            } else if t == 1.0 {
                curve.end()
            } else if s == 0.0 {
                self.line.p0
            } else if s == 1.0 {
                self.line.p1
            } else {
                point
            };
            hits.push(ParamHit { point, t0: s, t1: t });
        }
        hits
    }
}

/// Endpoint contacts between a line and a curve that lies along it.
fn coincident_contacts(line: Line, curve: PathSeg) -> SmallVec<[ParamHit; 3]> {
    let mut hits: SmallVec<[ParamHit; 3]> = SmallVec::new();
    let Some(frame) = LineFrame::new(line) else {
        return hits;
    };
    for (p, t) in [(curve.start(), 0.0), (curve.end(), 1.0)] {
        if let Some(s) = snap_param((p - line.p0).dot(frame.dir) / frame.len, EPSILON / frame.len) {
            hits.push(ParamHit { point: p, t0: s, t1: t });
        }
    }
    for (p, s) in [(line.p0, 0.0), (line.p1, 1.0)] {
        let nearest = curve.nearest(p, NEAREST_ACCURACY);
        if nearest.distance_sq <= EPSILON * EPSILON
            && !hits.iter().any(|h| points_coincide(h.point, p))
        {
            hits.push(ParamHit {
                point: p,
                t0: s,
                t1: nearest.t,
            });
        }
    }
    hits
}

/// Map a raw parameter onto `[0, 1]`, snapping values within `tolerance` of either end.
///
/// Returns `None` when the parameter lies outside the segment.
#[inline]
fn snap_param(t: f64, tolerance: f64) -> Option<f64> {
    if t.is_nan() || t < -tolerance || t > 1.0 + tolerance {
        None
    } else if t <= tolerance {
        Some(0.0)
    } else if t >= 1.0 - tolerance {
        Some(1.0)
    } else {
        Some(t)
    }
}

/// Split a quadratic at `t` and return the left (`[0, t]`) or right (`[t, 1]`) part.
pub fn sub_quad(quad: QuadBez, t: f64, left: bool) -> QuadBez {
    let p01 = quad.p0.lerp(quad.p1, t);
    let p12 = quad.p1.lerp(quad.p2, t);
    let mid = p01.lerp(p12, t);
    if left {
        QuadBez::new(quad.p0, p01, mid)
    } else {
        QuadBez::new(mid, p12, quad.p2)
    }
}

/// Split a cubic at `t` and return the left (`[0, t]`) or right (`[t, 1]`) part.
pub fn sub_cubic(cubic: CubicBez, t: f64, left: bool) -> CubicBez {
    let p01 = cubic.p0.lerp(cubic.p1, t);
    let p12 = cubic.p1.lerp(cubic.p2, t);
    let p23 = cubic.p2.lerp(cubic.p3, t);
    let p012 = p01.lerp(p12, t);
    let p123 = p12.lerp(p23, t);
    let mid = p012.lerp(p123, t);
    if left {
        CubicBez::new(cubic.p0, p01, p012, mid)
    } else {
        CubicBez::new(mid, p123, p23, cubic.p3)
    }
}

/// The part of `seg` between parameters `t0 <= t1`.
pub fn trim(seg: PathSeg, t0: f64, t1: f64) -> PathSeg {
    // After cutting at t1, the old t0 sits at t0 / t1 on the left part.
    let inner = if t1 > 0.0 { t0 / t1 } else { 0.0 };
    match seg {
        PathSeg::Line(line) => PathSeg::Line(Line::new(line.eval(t0), line.eval(t1))),
        PathSeg::Quad(quad) => {
            let left = if t1 < 1.0 { sub_quad(quad, t1, true) } else { quad };
            PathSeg::Quad(if inner > 0.0 { sub_quad(left, inner, false) } else { left })
        }
        PathSeg::Cubic(cubic) => {
            let left = if t1 < 1.0 {
                sub_cubic(cubic, t1, true)
            } else {
                cubic
            };
            PathSeg::Cubic(if inner > 0.0 {
                sub_cubic(left, inner, false)
            } else {
                left
            })
        }
    }
}

/// First derivative of `seg` at `t`.
///
/// Falls back to the chord when the derivative vanishes (a control point sitting on an
/// endpoint).
pub fn tangent(seg: PathSeg, t: f64) -> Vec2 {
    let mt = 1.0 - t;
    let d = match seg {
        PathSeg::Line(line) => line.p1 - line.p0,
        PathSeg::Quad(q) => ((q.p1 - q.p0) * mt + (q.p2 - q.p1) * t) * 2.0,
        PathSeg::Cubic(c) => {
            ((c.p1 - c.p0) * (mt * mt) + (c.p2 - c.p1) * (2.0 * t * mt) + (c.p3 - c.p2) * (t * t))
                * 3.0
        }
    };
    if d.hypot2() <= EPSILON * EPSILON {
        seg.end() - seg.start()
    } else {
        d
    }
}

/// Bounds of the control polygon, which contain the segment.
pub(crate) fn control_bounds(seg: PathSeg) -> Rect {
    match seg {
        PathSeg::Line(l) => Rect::from_points(l.p0, l.p1),
        PathSeg::Quad(q) => Rect::from_points(q.p0, q.p2).union_pt(q.p1),
        PathSeg::Cubic(c) => Rect::from_points(c.p0, c.p3)
            .union_pt(c.p1)
            .union_pt(c.p2),
    }
}

/// Closed-interval overlap of two rectangles, grown by [`EPSILON`].
#[inline]
pub(crate) fn rects_overlap(a: Rect, b: Rect) -> bool {
    a.x0 <= b.x1 + EPSILON
        && b.x0 <= a.x1 + EPSILON
        && a.y0 <= b.y1 + EPSILON
        && b.y0 <= a.y1 + EPSILON
}

/// Closed containment of `pt` in `rect`, grown by [`EPSILON`].
#[inline]
pub(crate) fn rect_contains(rect: Rect, pt: Point) -> bool {
    pt.x >= rect.x0 - EPSILON
        && pt.x <= rect.x1 + EPSILON
        && pt.y >= rect.y0 - EPSILON
        && pt.y <= rect.y1 + EPSILON
}

/// Whether every control point of `seg` is within `tolerance` of its chord.
pub(crate) fn is_flat(seg: PathSeg, tolerance: f64) -> bool {
    let (start, end) = (seg.start(), seg.end());
    let chord = end - start;
    let len = chord.hypot();
    let off = |p: Point| {
        if len == 0.0 {
            (p - start).hypot()
        } else {
            chord.cross(p - start).abs() / len
        }
    };
    match seg {
        PathSeg::Line(_) => true,
        PathSeg::Quad(q) => off(q.p1) <= tolerance,
        PathSeg::Cubic(c) => off(c.p1) <= tolerance && off(c.p2) <= tolerance,
    }
}

/// Whether two segments trace the same curve, in either direction.
pub(crate) fn same_curve(a: PathSeg, b: PathSeg) -> bool {
    let same = |p: &[Point], q: &[Point]| p.iter().zip(q).all(|(&x, &y)| points_coincide(x, y));
    match (a, b) {
        (PathSeg::Line(x), PathSeg::Line(y)) => {
            same(&[x.p0, x.p1], &[y.p0, y.p1]) || same(&[x.p0, x.p1], &[y.p1, y.p0])
        }
        (PathSeg::Quad(x), PathSeg::Quad(y)) => {
            same(&[x.p0, x.p1, x.p2], &[y.p0, y.p1, y.p2])
                || same(&[x.p0, x.p1, x.p2], &[y.p2, y.p1, y.p0])
        }
        (PathSeg::Cubic(x), PathSeg::Cubic(y)) => {
            same(&[x.p0, x.p1, x.p2, x.p3], &[y.p0, y.p1, y.p2, y.p3])
                || same(&[x.p0, x.p1, x.p2, x.p3], &[y.p3, y.p2, y.p1, y.p0])
        }
        _ => false,
    }
}

/// Replace the endpoints of `seg`, leaving interior control points alone.
pub(crate) fn with_endpoints(seg: PathSeg, start: Point, end: Point) -> PathSeg {
    match seg {
        PathSeg::Line(_) => PathSeg::Line(Line::new(start, end)),
        PathSeg::Quad(q) => PathSeg::Quad(QuadBez::new(start, q.p1, end)),
        PathSeg::Cubic(c) => PathSeg::Cubic(CubicBez::new(start, c.p1, c.p2, end)),
    }
}
