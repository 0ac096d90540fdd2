// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The Boolean combination engine.
//!
//! A combination runs in four steps:
//!
//! 1. Find every point where the two boundaries meet ([`CrossingFinder`]), and every
//!    point where one of them meets itself, and cluster the points into nodes.
//! 2. Cut every contour of both boundaries at its nodes into fragments. A contour without
//!    a node becomes one closed fragment.
//! 3. Classify each fragment. The operation is evaluated on both sides of the fragment;
//!    the fragment is part of the result boundary iff the two sides disagree, and it is
//!    oriented so that the result lies on its left.
//! 4. Stitch the kept fragments back into contours, walking from node to node and
//!    switching between the two boundaries where possible.
//!
//! Fragments shared by both boundaries (coincident edges) are decided once, from the
//! copy in `a`, so the shared stretch is never emitted twice. Stitched contours that
//! enclose no area are dropped.

use alloc::vec;
use alloc::vec::Vec;

use kurbo::{Line, ParamCurve, ParamCurveArea, PathEl, PathSeg, Point, Rect, Vec2};

use crate::boundary::{Boundary, Outline};
use crate::crossing::{CrossingFinder, EdgeHit};
use crate::geom::{
    EPSILON, ROOT_EPSILON, points_coincide, rects_overlap, tangent, trim, with_endpoints,
};
use crate::winding::{Containment, containment, winding};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Side probe distance, relative to the magnitude of the coordinates.
const PROBE_FACTOR: f64 = 1e-7;

/// A Boolean operation on two regions.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Op {
    /// Points in either region.
    Union,
    /// Points in both regions.
    Intersection,
    /// Points in the first region but not the second.
    Difference,
}

impl Op {
    fn apply(self, in_a: bool, in_b: bool) -> bool {
        match self {
            Self::Union => in_a || in_b,
            Self::Intersection => in_a && in_b,
            Self::Difference => in_a && !in_b,
        }
    }
}

/// Which boundary a fragment was cut from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Tracing {
    A,
    B,
}

#[derive(Clone, Debug)]
struct Fragment {
    side: Tracing,
    pieces: Vec<PathSeg>,
    /// Start and end node; `None` for a whole contour that met no node.
    ends: Option<(usize, usize)>,
}

impl Fragment {
    fn reverse(&mut self) {
        self.pieces.reverse();
        for piece in &mut self.pieces {
            *piece = piece.reverse();
        }
        self.ends = self.ends.map(|(start, end)| (end, start));
    }
}

/// A split point on one contour.
#[derive(Copy, Clone, Debug)]
struct Split {
    edge: usize,
    t: f64,
    node: usize,
}

impl Split {
    fn at(hit: &EdgeHit, node: usize) -> Self {
        Self {
            edge: hit.edge,
            t: hit.t,
            node,
        }
    }
}

/// Combine `a` and `b` with `op`, finding crossings with `F`.
pub(crate) fn combine<F: CrossingFinder>(a: &Boundary, b: &Boundary, op: Op) -> Boundary {
    let result = if a.is_empty() || b.is_empty() {
        tracing::trace!(?op, "empty operand");
        trivial(a, b, op)
    } else {
        let oa = a.outline();
        let ob = b.outline();
        let (ra, rb) = (oa.bounds(), ob.bounds());
        if rects_overlap(ra, rb) {
            stitch_result::<F>(&oa, &ob, ra.union(rb), op)
        } else {
            tracing::trace!(?op, "disjoint bounds");
            disjoint(a, b, op)
        }
    };
    collapse_slivers(result)
}

/// Result when one operand is empty.
fn trivial(a: &Boundary, b: &Boundary, op: Op) -> Boundary {
    match op {
        Op::Union if a.is_empty() => b.clone(),
        Op::Union | Op::Difference => a.clone(),
        Op::Intersection => Boundary::default(),
    }
}

/// Result when the operands' bounds do not overlap.
fn disjoint(a: &Boundary, b: &Boundary, op: Op) -> Boundary {
    match op {
        Op::Union => Boundary::from_elements(a.elements().iter().chain(b.elements()).copied()),
        Op::Intersection => Boundary::default(),
        Op::Difference => a.clone(),
    }
}

fn stitch_result<F: CrossingFinder>(
    oa: &Outline,
    ob: &Outline,
    bounds: Rect,
    op: Op,
) -> Boundary {
    let crossings = F::find_crossings(oa, ob);
    let own_a = F::find_self_crossings(oa);
    let own_b = F::find_self_crossings(ob);
    let points = crossings.iter().chain(&own_a).chain(&own_b).map(|hit| hit.point);
    let (nodes, node_of) = cluster(points);
    tracing::trace!(
        crossings = crossings.len(),
        self_a = own_a.len(),
        self_b = own_b.len(),
        nodes = nodes.len(),
        "found crossings"
    );
    let (crossing_nodes, own_nodes) = node_of.split_at(crossings.len());
    let (own_nodes_a, own_nodes_b) = own_nodes.split_at(own_a.len());

    let mut splits_a = vec![Vec::new(); oa.contours.len()];
    let mut splits_b = vec![Vec::new(); ob.contours.len()];
    for (hit, &node) in crossings.iter().zip(crossing_nodes) {
        tracing::trace!(
            x = hit.point.x,
            y = hit.point.y,
            a_rule = hit.a.rule,
            b_rule = hit.b.rule,
            node,
            "crossing"
        );
        splits_a[hit.a.contour].push(Split::at(&hit.a, node));
        splits_b[hit.b.contour].push(Split::at(&hit.b, node));
    }
    for (splits, hits, hit_nodes) in [
        (&mut splits_a, &own_a, own_nodes_a),
        (&mut splits_b, &own_b, own_nodes_b),
    ] {
        for (hit, &node) in hits.iter().zip(hit_nodes) {
            splits[hit.a.contour].push(Split::at(&hit.a, node));
            splits[hit.b.contour].push(Split::at(&hit.b, node));
        }
    }

    let mut fragments = cut(oa, splits_a, Tracing::A, &nodes);
    fragments.extend(cut(ob, splits_b, Tracing::B, &nodes));

    let classifier = Classifier::new(oa, ob, bounds, op);
    let kept: Vec<Fragment> = fragments
        .into_iter()
        .filter_map(|mut fragment| {
            let reversed = classifier.classify(&fragment)?;
            if reversed {
                fragment.reverse();
            }
            Some(fragment)
        })
        .collect();
    tracing::trace!(kept = kept.len(), "classified fragments");

    Boundary::from_elements(stitch(&kept, nodes.len()))
}

/// Distinct locations among `points`, and the location index of each point.
///
/// Epsilon-equal points share the coordinates of the first one seen.
fn cluster(points: impl IntoIterator<Item = Point>) -> (Vec<Point>, Vec<usize>) {
    let mut nodes: Vec<Point> = Vec::new();
    let mut node_of = Vec::new();
    for point in points {
        let node = match nodes.iter().position(|&n| points_coincide(n, point)) {
            Some(node) => node,
            None => {
                nodes.push(point);
                nodes.len() - 1
            }
        };
        node_of.push(node);
    }
    (nodes, node_of)
}

/// Cut each contour of `outline` at its splits.
fn cut(
    outline: &Outline,
    splits: Vec<Vec<Split>>,
    side: Tracing,
    nodes: &[Point],
) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    for (contour, mut splits) in outline.contours.iter().zip(splits) {
        let edges = &contour.edges;
        if splits.is_empty() {
            fragments.push(Fragment {
                side,
                pieces: edges.iter().map(|e| e.seg).collect(),
                ends: None,
            });
            continue;
        }
        splits.sort_by(|x, y| x.edge.cmp(&y.edge).then(x.t.total_cmp(&y.t)));
        splits.dedup_by(|later, earlier| {
            later.edge == earlier.edge && (later.t - earlier.t).abs() <= ROOT_EPSILON
        });

        let n = edges.len();
        let count = splits.len();
        for k in 0..count {
            let from = splits[k];
            let to = splits[(k + 1) % count];
            let wraps = count == 1 || (to.edge, to.t) <= (from.edge, from.t);
            let last = if wraps { to.edge + n } else { to.edge };
            let mut pieces = Vec::new();
            for step in from.edge..=last {
                let lo = if step == from.edge { from.t } else { 0.0 };
                let hi = if step == last { to.t } else { 1.0 };
                if hi - lo <= EPSILON {
                    continue;
                }
                let seg = edges[step % n].seg;
                pieces.push(if lo == 0.0 && hi == 1.0 {
                    seg
                } else {
                    trim(seg, lo, hi)
                });
            }
            let (Some(first), Some(end)) = (pieces.first().copied(), pieces.last().copied()) else {
                continue;
            };
            let start_pt = nodes[from.node];
            let end_pt = nodes[to.node];
            if pieces.len() == 1 {
                pieces[0] = with_endpoints(first, start_pt, end_pt);
            } else {
                pieces[0] = with_endpoints(first, start_pt, first.end());
                let tail = pieces.len() - 1;
                pieces[tail] = with_endpoints(end, end.start(), end_pt);
            }
            fragments.push(Fragment {
                side,
                pieces,
                ends: Some((from.node, to.node)),
            });
        }
    }
    fragments
}

/// Decides which fragments belong to the result.
struct Classifier<'a> {
    a: &'a Outline,
    b: &'a Outline,
    op: Op,
    probe: f64,
}

impl<'a> Classifier<'a> {
    fn new(a: &'a Outline, b: &'a Outline, bounds: Rect, op: Op) -> Self {
        let scale = [bounds.x0, bounds.y0, bounds.x1, bounds.y1]
            .iter()
            .fold(1.0_f64, |m, v| m.max(v.abs()));
        Self {
            a,
            b,
            op,
            probe: PROBE_FACTOR * scale,
        }
    }

    /// `Some(false)` keeps the fragment as is, `Some(true)` keeps it reversed, `None`
    /// drops it.
    fn classify(&self, fragment: &Fragment) -> Option<bool> {
        let piece = fragment.pieces[fragment.pieces.len() / 2];
        let mid = piece.eval(0.5);
        let dir = tangent(piece, 0.5);
        let len = dir.hypot();
        if len == 0.0 {
            return None;
        }
        let chord = (piece.end() - piece.start()).hypot();
        let delta = if chord > 0.0 {
            self.probe.min(0.25 * chord)
        } else {
            self.probe
        };
        let normal = Vec2::new(-dir.y, dir.x) * (delta / len);
        let (left, right) = (mid + normal, mid - normal);

        let (own, other) = match fragment.side {
            Tracing::A => (self.a, self.b),
            Tracing::B => (self.b, self.a),
        };
        let other_sides = match containment(other, mid) {
            Containment::Inside => (true, true),
            Containment::Outside => (false, false),
            // Shared stretch: decided by the copy in `a`.
            Containment::Boundary => match fragment.side {
                Tracing::A => (winding(other, left) != 0, winding(other, right) != 0),
                Tracing::B => return None,
            },
        };
        let own_sides = (winding(own, left) != 0, winding(own, right) != 0);
        let ((a_left, a_right), (b_left, b_right)) = match fragment.side {
            Tracing::A => (own_sides, other_sides),
            Tracing::B => (other_sides, own_sides),
        };
        match (self.op.apply(a_left, b_left), self.op.apply(a_right, b_right)) {
            (true, false) => Some(false),
            (false, true) => Some(true),
            _ => None,
        }
    }
}

/// Join kept fragments into closed contours.
///
/// Open fragments are chained end node to start node, preferring a fragment from the
/// other boundary, until the walk returns to the node it started from.
fn stitch(fragments: &[Fragment], node_count: usize) -> Vec<PathEl> {
    let mut outgoing: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (i, fragment) in fragments.iter().enumerate() {
        if let Some((start, _)) = fragment.ends {
            outgoing[start].push(i);
        }
    }

    let mut elements = Vec::new();
    let mut used = vec![false; fragments.len()];
    for i in 0..fragments.len() {
        if used[i] {
            continue;
        }
        let Some((origin, _)) = fragments[i].ends else {
            used[i] = true;
            emit(&mut elements, &fragments[i].pieces);
            continue;
        };
        let mut pieces: Vec<PathSeg> = Vec::new();
        let mut current = i;
        loop {
            used[current] = true;
            let fragment = &fragments[current];
            pieces.extend_from_slice(&fragment.pieces);
            let Some((_, end)) = fragment.ends else {
                break;
            };
            if end == origin {
                break;
            }
            let mut candidates = outgoing[end].iter().copied().filter(|&j| !used[j]);
            let first = candidates.next();
            let other = first
                .filter(|&j| fragments[j].side != fragment.side)
                .or_else(|| candidates.find(|&j| fragments[j].side != fragment.side));
            match other.or(first) {
                Some(next) => current = next,
                None => {
                    tracing::debug!(
                        node = end,
                        "stitching stopped at a dead end; closing contour"
                    );
                    break;
                }
            }
        }
        emit(&mut elements, &pieces);
    }
    elements
}

/// Append `pieces` as one closed contour, unless it encloses no area.
fn emit(elements: &mut Vec<PathEl>, pieces: &[PathSeg]) {
    let (Some(first), Some(last)) = (pieces.first(), pieces.last()) else {
        return;
    };
    let closing = Line::new(last.end(), first.start()).signed_area();
    let area = pieces.iter().map(|p| p.signed_area()).sum::<f64>() + closing;
    if area.abs() < EPSILON {
        tracing::trace!(pieces = pieces.len(), area, "dropped degenerate contour");
        return;
    }
    elements.push(PathEl::MoveTo(first.start()));
    elements.extend(pieces.iter().map(PathSeg::as_path_el));
    elements.push(PathEl::ClosePath);
}

/// A result whose bounds have (almost) no area is the empty region.
fn collapse_slivers(boundary: Boundary) -> Boundary {
    if boundary.is_empty() || boundary.bounds().area() < EPSILON {
        Boundary::default()
    } else {
        boundary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossing::{CurveCrossings, PolygonCrossings};
    use core::f64::consts::PI;
    use kurbo::{BezPath, Circle, Shape};

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Boundary {
        Boundary::from_elements(Rect::new(x0, y0, x1, y1).path_elements(0.1))
    }

    fn inside(b: &Boundary, x: f64, y: f64) -> bool {
        containment(&b.outline(), Point::new(x, y)) == Containment::Inside
    }

    fn signed_area(b: &Boundary) -> f64 {
        b.outline().edges().map(|e| e.seg.signed_area()).sum()
    }

    #[test]
    fn union_of_overlapping_squares() {
        let r = combine::<PolygonCrossings>(
            &rect(0.0, 0.0, 10.0, 10.0),
            &rect(5.0, 5.0, 15.0, 15.0),
            Op::Union,
        );
        assert_eq!(r.bounds(), Rect::new(0.0, 0.0, 15.0, 15.0));
        assert_eq!(r.contour_count(), 1);
        assert!(inside(&r, 7.0, 7.0));
        assert!(inside(&r, 12.0, 12.0));
        assert!(!inside(&r, 12.0, 2.0));
        // Eight vertices; the closing line is implicit.
        assert_eq!(r.elements().len(), 9);
    }

    #[test]
    fn intersection_of_overlapping_squares() {
        let r = combine::<PolygonCrossings>(
            &rect(0.0, 0.0, 10.0, 10.0),
            &rect(5.0, 5.0, 15.0, 15.0),
            Op::Intersection,
        );
        assert_eq!(r.bounds(), Rect::new(5.0, 5.0, 10.0, 10.0));
        assert!(inside(&r, 7.0, 7.0));
        assert!(!inside(&r, 2.0, 2.0));
    }

    #[test]
    fn difference_of_overlapping_squares() {
        let r = combine::<PolygonCrossings>(
            &rect(0.0, 0.0, 10.0, 10.0),
            &rect(5.0, 5.0, 15.0, 15.0),
            Op::Difference,
        );
        assert_eq!(r.bounds(), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(inside(&r, 2.0, 2.0));
        assert!(inside(&r, 8.0, 2.0));
        assert!(!inside(&r, 7.0, 7.0));
    }

    #[test]
    fn subtracting_a_contained_square_leaves_a_hole() {
        let r = combine::<PolygonCrossings>(
            &rect(0.0, 0.0, 10.0, 10.0),
            &rect(3.0, 3.0, 6.0, 6.0),
            Op::Difference,
        );
        assert_eq!(r.contour_count(), 2);
        assert!(!inside(&r, 4.0, 4.0));
        assert!(inside(&r, 1.0, 1.0));

        let i = combine::<PolygonCrossings>(
            &rect(0.0, 0.0, 10.0, 10.0),
            &rect(3.0, 3.0, 6.0, 6.0),
            Op::Intersection,
        );
        assert_eq!(i.bounds(), Rect::new(3.0, 3.0, 6.0, 6.0));
    }

    #[test]
    fn adjacent_squares_merge_along_shared_edge() {
        let r = combine::<PolygonCrossings>(
            &rect(0.0, 0.0, 10.0, 10.0),
            &rect(10.0, 0.0, 20.0, 10.0),
            Op::Union,
        );
        assert_eq!(r.contour_count(), 1);
        assert_eq!(r.bounds(), Rect::new(0.0, 0.0, 20.0, 10.0));
        assert!(inside(&r, 10.0, 5.0));

        let i = combine::<PolygonCrossings>(
            &rect(0.0, 0.0, 10.0, 10.0),
            &rect(10.0, 0.0, 20.0, 10.0),
            Op::Intersection,
        );
        assert!(i.is_empty());
    }

    #[test]
    fn self_difference_is_empty() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        assert!(combine::<PolygonCrossings>(&a, &a, Op::Difference).is_empty());
        let u = combine::<PolygonCrossings>(&a, &a, Op::Union);
        assert_eq!(u.bounds(), a.bounds());
    }

    #[test]
    fn fast_paths() {
        let a = rect(0.0, 0.0, 1.0, 1.0);
        let b = rect(5.0, 5.0, 6.0, 6.0);
        let empty = Boundary::default();
        assert_eq!(combine::<PolygonCrossings>(&a, &b, Op::Union).contour_count(), 2);
        assert!(combine::<PolygonCrossings>(&a, &b, Op::Intersection).is_empty());
        assert_eq!(combine::<PolygonCrossings>(&a, &b, Op::Difference), a);
        assert_eq!(combine::<PolygonCrossings>(&empty, &b, Op::Union), b);
        assert!(combine::<PolygonCrossings>(&a, &empty, Op::Intersection).is_empty());
        assert!(combine::<PolygonCrossings>(&empty, &a, Op::Difference).is_empty());
    }

    #[test]
    fn sliver_results_collapse() {
        let sliver = Boundary::from_elements([
            PathEl::MoveTo(Point::new(0.0, 0.0)),
            PathEl::LineTo(Point::new(10.0, 0.0)),
            PathEl::LineTo(Point::new(10.0, 1e-12)),
            PathEl::ClosePath,
        ]);
        assert!(collapse_slivers(sliver).is_empty());
    }

    #[test]
    fn circle_clipped_by_square() {
        let square = rect(0.0, 0.0, 12.0, 12.0);
        let circle = Boundary::from_elements(Circle::new((10.0, 10.0), 5.0).path_elements(1e-3));
        let i = combine::<CurveCrossings>(&square, &circle, Op::Intersection);
        assert!(!i.is_polygonal());
        assert!(inside(&i, 11.0, 11.0));
        assert!(!inside(&i, 6.0, 6.0));
        assert!(!inside(&i, 13.0, 11.0));
        let bounds = i.bounds();
        assert!((bounds.x1 - 12.0).abs() < 1e-9 && (bounds.y1 - 12.0).abs() < 1e-9, "{bounds:?}");

        let u = combine::<CurveCrossings>(&square, &circle, Op::Union);
        assert!(inside(&u, 13.0, 11.0));
        assert!(inside(&u, 1.0, 1.0));
        assert!(!inside(&u, 14.5, 14.5));
    }

    #[test]
    fn overlapping_contours_in_one_operand() {
        let a = Boundary::from_elements(
            Rect::new(0.0, 0.0, 10.0, 10.0)
                .path_elements(0.1)
                .chain(Rect::new(5.0, 5.0, 15.0, 15.0).path_elements(0.1)),
        );
        let strip = rect(8.0, -2.0, 12.0, 20.0);
        let i = combine::<PolygonCrossings>(&a, &strip, Op::Intersection);
        assert_eq!(i.contour_count(), 1, "{:?}", i.elements());
        assert!((signed_area(&i) - 50.0).abs() < 1e-9, "{}", signed_area(&i));
        assert!(inside(&i, 8.3, 0.25));
        assert!(inside(&i, 9.0, 12.0));
        assert!(inside(&i, 11.0, 10.0));
        assert!(!inside(&i, 11.0, 2.0));

        // The operand's own overlap is filled once.
        let u = combine::<PolygonCrossings>(&a, &strip, Op::Union);
        assert!(inside(&u, 7.0, 7.0));
        assert!((signed_area(&u) - (175.0 + 88.0 - 50.0)).abs() < 1e-9, "{}", signed_area(&u));
    }

    #[test]
    fn pentagram_clipped_by_strip() {
        let mut star = BezPath::new();
        for k in 0..5 {
            let angle = -0.5 * PI + f64::from(k) * 0.8 * PI;
            let p = Point::new(10.0 * angle.cos(), 10.0 * angle.sin());
            if k == 0 {
                star.move_to(p);
            } else {
                star.line_to(p);
            }
        }
        star.close_path();
        let a = Boundary::from_elements(star.elements().iter().copied());
        let i = combine::<PolygonCrossings>(&a, &rect(-20.0, -1.0, 20.0, 1.0), Op::Intersection);

        for contour in &i.outline().contours {
            let area: f64 = contour.edges.iter().map(|e| e.seg.signed_area()).sum();
            assert!(area.abs() > 1e-3, "degenerate contour {contour:?}");
        }
        for xi in -19..=19 {
            for y in [-0.75, -0.25, 0.25, 0.75] {
                let x = f64::from(xi) * 0.5 + 0.125;
                let expected = star.winding(Point::new(x, y)) != 0;
                assert_eq!(inside(&i, x, y), expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn contours_enclosing_nothing_are_not_emitted() {
        let there = PathSeg::Line(Line::new((0.0, 0.0), (10.0, 0.0)));
        let mut elements = Vec::new();
        emit(&mut elements, &[there, there.reverse()]);
        assert!(elements.is_empty());
        let outline = rect(0.0, 0.0, 1.0, 1.0).outline();
        let square: Vec<PathSeg> = outline.edges().map(|e| e.seg).collect();
        emit(&mut elements, &square);
        assert_eq!(elements.len(), 6);
    }
}
