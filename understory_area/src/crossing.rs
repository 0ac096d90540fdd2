// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Crossing detection between outlines.
//!
//! Both helpers test edges pairwise, rejecting pairs whose control bounds are disjoint.
//! They differ only in the per-pair predicate: [`PolygonCrossings`] expects line segments
//! on both sides, while [`CurveCrossings`] also handles quadratic and cubic edges.
//!
//! [`CrossingFinder::find_crossings`] pairs every edge of `a` with every edge of `b`.
//! [`CrossingFinder::find_self_crossings`] pairs the edges of one outline with each
//! other, so that contours which overlap or cross themselves can be split as well. The
//! shared vertex of two consecutive edges is not a self crossing.
//!
//! The raw hits are then normalised so that each geometric crossing is reported once:
//! a hit at the end of an edge is re-expressed as `t = 0` on the following edge of the
//! same contour, duplicates are removed, and the list is sorted along `a`.

use alloc::vec::Vec;

use kurbo::{Line, ParamCurve, PathSeg, Point, Rect};
use smallvec::SmallVec;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::boundary::{Contour, Edge, Outline};
use crate::geom::{
    EPSILON, ParamHit, ROOT_EPSILON, collinear_contacts, control_bounds, intersect_line_and_cubic,
    intersect_line_and_quad, intersect_lines, is_flat, points_coincide, rects_overlap, same_curve,
};

/// Recursion cap for curve/curve bisection.
const MAX_DEPTH: u32 = 48;

/// Piece pairs one curve/curve bisection may visit.
///
/// Curves that cross at isolated points stay far below this. Nearly coincident curves
/// overlap along their whole length and would otherwise visit an exponential number
/// of pairs.
const BISECT_BUDGET: usize = 1 << 14;

/// Hit list for a single pair of segments.
pub(crate) type PairHits = SmallVec<[ParamHit; 4]>;

/// Location of a crossing on one of the two outlines.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct EdgeHit {
    /// Contour index within the outline.
    pub(crate) contour: usize,
    /// Edge index within the contour.
    pub(crate) edge: usize,
    /// Boundary element the edge was drawn by.
    pub(crate) rule: usize,
    /// Parameter on the edge, in `[0, 1)` after normalisation.
    pub(crate) t: f64,
}

/// A point where two boundaries meet, or where one boundary meets itself.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct IntersectionPoint {
    pub(crate) point: Point,
    pub(crate) a: EdgeHit,
    pub(crate) b: EdgeHit,
}

/// An edge together with its position in the outline.
#[derive(Clone, Copy, Debug)]
struct Located<'a> {
    contour: usize,
    edge: usize,
    inner: &'a Edge,
}

impl Located<'_> {
    fn hit(&self, t: f64) -> EdgeHit {
        EdgeHit {
            contour: self.contour,
            edge: self.edge,
            rule: self.inner.rule,
            t,
        }
    }
}

fn located(outline: &Outline) -> impl Iterator<Item = Located<'_>> + Clone {
    outline.contours.iter().enumerate().flat_map(|(contour, c)| {
        c.edges.iter().enumerate().map(move |(edge, inner)| Located {
            contour,
            edge,
            inner,
        })
    })
}

/// Finds every point where two outlines touch or cross.
pub(crate) trait CrossingFinder {
    /// Hits between one edge of `a` and one edge of `b`; `t0` is on `a`, `t1` on `b`.
    fn segment_hits(a: PathSeg, b: PathSeg) -> PairHits;

    /// All crossings, de-duplicated and ordered along `a`.
    fn find_crossings(a: &Outline, b: &Outline) -> Vec<IntersectionPoint> {
        let mut raw = Vec::new();
        for ea in located(a) {
            let bounds_a = control_bounds(ea.inner.seg);
            for eb in located(b) {
                push_hits::<Self>(ea, bounds_a, eb, &[], &mut raw);
            }
        }
        normalize(raw, a, b)
    }

    /// Places where an outline touches or crosses itself.
    ///
    /// Both sides of each result refer to `outline`. Every unordered pair of distinct
    /// edges is tested once.
    fn find_self_crossings(outline: &Outline) -> Vec<IntersectionPoint> {
        let mut raw = Vec::new();
        let edges = located(outline);
        for (k, ea) in edges.clone().enumerate() {
            let bounds_a = control_bounds(ea.inner.seg);
            for eb in edges.clone().skip(k + 1) {
                let shared = if ea.contour == eb.contour {
                    joints(&outline.contours[ea.contour], ea.edge, eb.edge)
                } else {
                    SmallVec::new()
                };
                push_hits::<Self>(ea, bounds_a, eb, &shared, &mut raw);
            }
        }
        normalize(raw, outline, outline)
    }
}

/// Record the hits of one edge pair, skipping any at the vertices in `joints`.
fn push_hits<F: CrossingFinder + ?Sized>(
    ea: Located<'_>,
    bounds_a: Rect,
    eb: Located<'_>,
    joints: &[Point],
    raw: &mut Vec<IntersectionPoint>,
) {
    if !rects_overlap(bounds_a, control_bounds(eb.inner.seg)) {
        return;
    }
    for hit in F::segment_hits(ea.inner.seg, eb.inner.seg) {
        if joints.iter().any(|&v| points_coincide(v, hit.point)) {
            continue;
        }
        raw.push(IntersectionPoint {
            point: hit.point,
            a: ea.hit(hit.t0),
            b: eb.hit(hit.t1),
        });
    }
}

/// Vertices shared by the consecutive edges `i < j` of `contour`.
fn joints(contour: &Contour, i: usize, j: usize) -> SmallVec<[Point; 2]> {
    let edges = &contour.edges;
    let mut out = SmallVec::new();
    if j == i + 1 {
        out.push(edges[i].seg.end());
    }
    if i == 0 && j == edges.len() - 1 {
        out.push(edges[0].seg.start());
    }
    out
}

/// Crossing helper for outlines made only of line segments.
#[derive(Debug)]
pub(crate) struct PolygonCrossings;

impl CrossingFinder for PolygonCrossings {
    fn segment_hits(a: PathSeg, b: PathSeg) -> PairHits {
        match (a, b) {
            (PathSeg::Line(a), PathSeg::Line(b)) => line_hits(a, b),
            _ => {
                debug_assert!(false, "polygon crossings given a curved edge");
                PairHits::new()
            }
        }
    }
}

/// Crossing helper for outlines that may contain quadratic or cubic edges.
#[derive(Debug)]
pub(crate) struct CurveCrossings;

impl CrossingFinder for CurveCrossings {
    fn segment_hits(a: PathSeg, b: PathSeg) -> PairHits {
        match (a, b) {
            (PathSeg::Line(a), PathSeg::Line(b)) => line_hits(a, b),
            (PathSeg::Line(l), PathSeg::Quad(q)) => {
                intersect_line_and_quad(l, q).into_iter().collect()
            }
            (PathSeg::Line(l), PathSeg::Cubic(c)) => {
                intersect_line_and_cubic(l, c).into_iter().collect()
            }
            (PathSeg::Quad(q), PathSeg::Line(l)) => {
                intersect_line_and_quad(l, q).into_iter().map(swap).collect()
            }
            (PathSeg::Cubic(c), PathSeg::Line(l)) => {
                intersect_line_and_cubic(l, c).into_iter().map(swap).collect()
            }
            _ if same_curve(a, b) => shared_endpoints(a, b),
            _ => {
                let mut bisection = Bisection {
                    out: PairHits::new(),
                    budget: BISECT_BUDGET,
                };
                bisection.run(a, (0.0, 1.0), b, (0.0, 1.0), 0);
                if bisection.budget == 0 {
                    tracing::debug!(
                        hits = bisection.out.len(),
                        "curve bisection ran out of budget; curves nearly coincide"
                    );
                }
                bisection.out
            }
        }
    }
}

fn swap(hit: ParamHit) -> ParamHit {
    ParamHit {
        point: hit.point,
        t0: hit.t1,
        t1: hit.t0,
    }
}

fn line_hits(a: Line, b: Line) -> PairHits {
    match intersect_lines(a, b) {
        Some(hit) => core::iter::once(hit).collect(),
        None => collinear_contacts(a, b),
    }
}

/// Contacts between two segments tracing the same curve: only their endpoints.
fn shared_endpoints(a: PathSeg, b: PathSeg) -> PairHits {
    let mut out = PairHits::new();
    for (p, t0) in [(a.start(), 0.0), (a.end(), 1.0)] {
        for (q, t1) in [(b.start(), 0.0), (b.end(), 1.0)] {
            if points_coincide(p, q) {
                out.push(ParamHit { point: p, t0, t1 });
            }
        }
    }
    out
}

/// Curve/curve intersection by recursive bisection of control-polygon bounds.
struct Bisection {
    out: PairHits,
    /// Piece pairs that may still be visited.
    budget: usize,
}

impl Bisection {
    /// `ra` and `rb` are the parameter ranges of the pieces within the original segments.
    fn run(&mut self, a: PathSeg, ra: (f64, f64), b: PathSeg, rb: (f64, f64), depth: u32) {
        let (bounds_a, bounds_b) = (control_bounds(a), control_bounds(b));
        if self.budget == 0 || !rects_overlap(bounds_a, bounds_b) {
            return;
        }
        self.budget -= 1;
        let flat_a = is_flat(a, EPSILON);
        let flat_b = is_flat(b, EPSILON);
        if (flat_a && flat_b) || (tiny(bounds_a) && tiny(bounds_b)) || depth >= MAX_DEPTH {
            self.chords(a, ra, b, rb);
            return;
        }
        // Split the curved piece with the wider parameter range.
        let split_a = !flat_a && (flat_b || ra.1 - ra.0 >= rb.1 - rb.0);
        if split_a {
            let mid = 0.5 * (ra.0 + ra.1);
            let (left, right) = a.subdivide();
            self.run(left, (ra.0, mid), b, rb, depth + 1);
            self.run(right, (mid, ra.1), b, rb, depth + 1);
        } else {
            let mid = 0.5 * (rb.0 + rb.1);
            let (left, right) = b.subdivide();
            self.run(a, ra, left, (rb.0, mid), depth + 1);
            self.run(a, ra, right, (mid, rb.1), depth + 1);
        }
    }

    /// Intersect the chords of two pieces that are flat enough to stand for them.
    fn chords(&mut self, a: PathSeg, ra: (f64, f64), b: PathSeg, rb: (f64, f64)) {
        let chord_a = Line::new(a.start(), a.end());
        let chord_b = Line::new(b.start(), b.end());
        for hit in line_hits(chord_a, chord_b) {
            let t0 = ra.0 + hit.t0 * (ra.1 - ra.0);
            let t1 = rb.0 + hit.t1 * (rb.1 - rb.0);
            let duplicate = self.out.iter().any(|h| {
                points_coincide(h.point, hit.point)
                    || ((h.t0 - t0).abs() <= ROOT_EPSILON && (h.t1 - t1).abs() <= ROOT_EPSILON)
            });
            if !duplicate {
                self.out.push(ParamHit {
                    point: hit.point,
                    t0,
                    t1,
                });
            }
        }
    }
}

/// Whether a piece's control bounds fit within [`EPSILON`] in both directions.
fn tiny(bounds: Rect) -> bool {
    bounds.width() <= EPSILON && bounds.height() <= EPSILON
}

/// Snap hits onto edge starts, drop duplicates and order them along `a`.
fn normalize(raw: Vec<IntersectionPoint>, a: &Outline, b: &Outline) -> Vec<IntersectionPoint> {
    let mut out: Vec<IntersectionPoint> = Vec::with_capacity(raw.len());
    for mut hit in raw {
        hit.point = snap_to_vertex(&mut hit.a, hit.point, a);
        hit.point = snap_to_vertex(&mut hit.b, hit.point, b);
        let duplicate = out.iter().any(|h| {
            same_place(&h.a, &hit.a, h.point, hit.point)
                && same_place(&h.b, &hit.b, h.point, hit.point)
        });
        if !duplicate {
            out.push(hit);
        }
    }
    out.sort_by(|x, y| {
        (x.a.contour, x.a.edge)
            .cmp(&(y.a.contour, y.a.edge))
            .then(x.a.t.total_cmp(&y.a.t))
    });
    out
}

fn same_place(x: &EdgeHit, y: &EdgeHit, px: Point, py: Point) -> bool {
    x.contour == y.contour
        && x.edge == y.edge
        && ((x.t - y.t).abs() <= ROOT_EPSILON || points_coincide(px, py))
}

/// Move a hit at an edge end onto the next edge and give vertex hits exact coordinates.
fn snap_to_vertex(hit: &mut EdgeHit, point: Point, outline: &Outline) -> Point {
    let contour = &outline.contours[hit.contour];
    let seg = contour.edges[hit.edge].seg;
    if hit.t == 0.0 || points_coincide(point, seg.start()) {
        hit.t = 0.0;
        return seg.start();
    }
    if hit.t == 1.0 || points_coincide(point, seg.end()) {
        hit.edge = (hit.edge + 1) % contour.edges.len();
        let next = contour.edges[hit.edge];
        hit.rule = next.rule;
        hit.t = 0.0;
        return next.seg.start();
    }
    point
}
