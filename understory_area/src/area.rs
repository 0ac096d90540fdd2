// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Area`] region type.

use kurbo::{Affine, BezPath, ParamCurveArclen, ParamCurveArea, PathEl, Point, Rect, Shape};

use crate::boundary::{Boundary, Checked};
use crate::combine::{Op, combine};
use crate::crossing::{CurveCrossings, PolygonCrossings};
use crate::error::AreaError;
use crate::geom::{EPSILON, rects_overlap};
use crate::winding::{self, Containment};

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

/// Flattening tolerance used when converting a [`Shape`] with [`Area::from_shape`].
pub const DEFAULT_TOLERANCE: f64 = 1e-3;

/// A closed 2D region with support for Boolean operations.
///
/// An `Area` owns one boundary: zero or more closed contours of lines, quadratic and
/// cubic Béziers, filled with the non-zero winding rule. The Boolean operations
/// ([`add`](Self::add), [`intersect`](Self::intersect), [`subtract`](Self::subtract),
/// [`exclusive_or`](Self::exclusive_or)) compute a fresh boundary and replace the current
/// one. Results whose bounds have (almost) no area collapse to the empty region.
///
/// Equality is set equality: two areas are equal when they cover the same points,
/// regardless of how their boundaries are drawn.
///
/// ```
/// use kurbo::{Point, Rect};
/// use understory_area::Area;
///
/// let mut area = Area::from(Rect::new(0.0, 0.0, 10.0, 10.0));
/// area.add(&Area::from(Rect::new(5.0, 5.0, 15.0, 15.0)));
///
/// assert_eq!(area.bounds(), Rect::new(0.0, 0.0, 15.0, 15.0));
/// assert!(area.contains(Point::new(7.0, 7.0)));
/// assert!(!area.contains(Point::new(12.0, 2.0)));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Area {
    boundary: Boundary,
}

impl Area {
    /// The empty region.
    pub fn new() -> Self {
        Self::default()
    }

    /// The region enclosed by `shape`, flattened at [`DEFAULT_TOLERANCE`].
    pub fn from_shape(shape: &impl Shape) -> Self {
        Self::from_shape_with_tolerance(shape, DEFAULT_TOLERANCE)
    }

    /// The region enclosed by `shape`, requesting path elements at `tolerance`.
    pub fn from_shape_with_tolerance(shape: &impl Shape, tolerance: f64) -> Self {
        Self::from_path_elements(shape.path_elements(tolerance))
    }

    /// The region enclosed by a sequence of path elements.
    ///
    /// Open contours are closed, a final `LineTo` back to the contour start is dropped,
    /// and drawing commands before any `MoveTo` start at the origin. Coordinates are not
    /// validated; see [`try_from_path_elements`](Self::try_from_path_elements).
    pub fn from_path_elements(elements: impl IntoIterator<Item = PathEl>) -> Self {
        Self {
            boundary: Boundary::from_elements(elements),
        }
    }

    /// Like [`from_path_elements`](Self::from_path_elements), but reports allocation
    /// failure and rejects non-finite coordinates.
    pub fn try_from_path_elements(
        elements: impl IntoIterator<Item = PathEl>,
    ) -> Result<Self, AreaError> {
        Ok(Self {
            boundary: Boundary::load::<Checked>(elements)?,
        })
    }

    /// Replace this area with its union with `other`.
    pub fn add(&mut self, other: &Self) {
        self.boundary = self.combine(other, Op::Union);
    }

    /// Replace this area with its intersection with `other`.
    pub fn intersect(&mut self, other: &Self) {
        self.boundary = self.combine(other, Op::Intersection);
    }

    /// Remove the points of `other` from this area.
    pub fn subtract(&mut self, other: &Self) {
        self.boundary = self.combine(other, Op::Difference);
    }

    /// Replace this area with the points in exactly one of `self` and `other`.
    ///
    /// Computed as the union minus the intersection.
    pub fn exclusive_or(&mut self, other: &Self) {
        let mut both = self.clone();
        both.intersect(other);
        self.add(other);
        self.subtract(&both);
    }

    /// The union of `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            boundary: self.combine(other, Op::Union),
        }
    }

    /// The intersection of `self` and `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            boundary: self.combine(other, Op::Intersection),
        }
    }

    /// The points of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            boundary: self.combine(other, Op::Difference),
        }
    }

    /// The points in exactly one of `self` and `other`.
    #[must_use]
    pub fn symmetric_difference(&self, other: &Self) -> Self {
        let mut out = self.clone();
        out.exclusive_or(other);
        out
    }

    fn combine(&self, other: &Self, op: Op) -> Boundary {
        if self.boundary.is_polygonal() && other.boundary.is_polygonal() {
            combine::<PolygonCrossings>(&self.boundary, &other.boundary, op)
        } else {
            combine::<CurveCrossings>(&self.boundary, &other.boundary, op)
        }
    }

    /// Apply `affine` to every coordinate and reload the boundary.
    pub fn transform(&mut self, affine: Affine) {
        self.boundary =
            Boundary::from_elements(self.boundary.elements().iter().map(|&el| affine * el));
    }

    /// A transformed copy of this area.
    #[must_use]
    pub fn transformed(&self, affine: Affine) -> Self {
        let mut out = self.clone();
        out.transform(affine);
        out
    }

    /// Classify `pt` as inside, outside, or on the boundary.
    pub fn containment(&self, pt: Point) -> Containment {
        if self.is_empty() {
            return Containment::Outside;
        }
        winding::containment(&self.boundary.outline(), pt)
    }

    /// Whether `pt` is strictly inside. Points on the boundary are not contained.
    pub fn contains(&self, pt: Point) -> bool {
        self.containment(pt) == Containment::Inside
    }

    /// Whether every point of `rect` belongs to this area (boundary included).
    ///
    /// Rectangles with no area are never contained.
    pub fn contains_rect(&self, rect: Rect) -> bool {
        let rect = rect.abs();
        if self.is_empty() || rect.area() <= 0.0 {
            return false;
        }
        let bounds = self.bounds();
        if rect.x0 < bounds.x0 - EPSILON
            || rect.y0 < bounds.y0 - EPSILON
            || rect.x1 > bounds.x1 + EPSILON
            || rect.y1 > bounds.y1 + EPSILON
        {
            return false;
        }
        Self::from(rect).difference(self).is_empty()
    }

    /// Whether `rect` and this area share interior points.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        let rect = rect.abs();
        if self.is_empty() || rect.area() <= 0.0 || !rects_overlap(self.bounds(), rect) {
            return false;
        }
        !self.intersection(&Self::from(rect)).is_empty()
    }

    /// Tight bounds of the boundary; [`Rect::ZERO`] when empty.
    pub fn bounds(&self) -> Rect {
        self.boundary.bounds()
    }

    /// Whether this is the empty region.
    pub fn is_empty(&self) -> bool {
        self.boundary.is_empty()
    }

    /// Whether the boundary has only straight edges.
    pub fn is_polygonal(&self) -> bool {
        self.boundary.is_polygonal()
    }

    /// Whether the boundary is exactly one axis-aligned four-corner box.
    pub fn is_rectangular(&self) -> bool {
        self.rectangle().is_some()
    }

    /// Whether the boundary has at most one contour.
    pub fn is_singular(&self) -> bool {
        self.contour_count() <= 1
    }

    /// Number of contours in the boundary.
    pub fn contour_count(&self) -> usize {
        self.boundary.contour_count()
    }

    /// The boundary as path elements. Every contour starts with `MoveTo` and ends with
    /// `ClosePath`.
    pub fn elements(&self) -> &[PathEl] {
        self.boundary.elements()
    }

    /// Make this the empty region.
    pub fn reset(&mut self) {
        self.boundary = Boundary::default();
    }

    /// The boundary as a [`BezPath`].
    pub fn to_bez_path(&self) -> BezPath {
        BezPath::from_vec(self.elements().to_vec())
    }

    /// Set equality: both differences are empty.
    pub fn equals(&self, other: &Self) -> bool {
        self.difference(other).is_empty() && other.difference(self).is_empty()
    }

    fn rectangle(&self) -> Option<Rect> {
        let corners = match self.elements() {
            [
                PathEl::MoveTo(p0),
                PathEl::LineTo(p1),
                PathEl::LineTo(p2),
                PathEl::LineTo(p3),
                PathEl::ClosePath,
            ] => [*p0, *p1, *p2, *p3],
            _ => return None,
        };
        let same = |a: f64, b: f64| (a - b).abs() <= EPSILON;
        let horizontal_first = (0..4).all(|i| {
            let (p, q) = (corners[i], corners[(i + 1) % 4]);
            if i % 2 == 0 { same(p.y, q.y) } else { same(p.x, q.x) }
        });
        let vertical_first = (0..4).all(|i| {
            let (p, q) = (corners[i], corners[(i + 1) % 4]);
            if i % 2 == 0 { same(p.x, q.x) } else { same(p.y, q.y) }
        });
        (horizontal_first || vertical_first).then(|| Rect::from_points(corners[0], corners[2]))
    }
}

impl PartialEq for Area {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl From<Rect> for Area {
    fn from(rect: Rect) -> Self {
        Self::from_path_elements(rect.abs().path_elements(0.0))
    }
}

impl From<BezPath> for Area {
    fn from(path: BezPath) -> Self {
        Self::from(&path)
    }
}

impl From<&BezPath> for Area {
    fn from(path: &BezPath) -> Self {
        Self::from_path_elements(path.elements().iter().copied())
    }
}

impl Shape for Area {
    type PathElementsIter<'iter> = core::iter::Copied<core::slice::Iter<'iter, PathEl>>;

    fn path_elements(&self, _tolerance: f64) -> Self::PathElementsIter<'_> {
        self.elements().iter().copied()
    }

    /// Signed area; positive for contours wound the way [`Rect`] draws itself.
    fn area(&self) -> f64 {
        self.boundary
            .outline()
            .edges()
            .map(|e| e.seg.signed_area())
            .sum()
    }

    fn perimeter(&self, accuracy: f64) -> f64 {
        self.boundary
            .outline()
            .edges()
            .map(|e| e.seg.arclen(accuracy))
            .sum()
    }

    fn winding(&self, pt: Point) -> i32 {
        winding::winding(&self.boundary.outline(), pt)
    }

    fn bounding_box(&self) -> Rect {
        self.bounds()
    }

    fn contains(&self, pt: Point) -> bool {
        Self::contains(self, pt)
    }

    fn as_rect(&self) -> Option<Rect> {
        self.rectangle()
    }

    fn as_path_slice(&self) -> Option<&[PathEl]> {
        Some(self.elements())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use kurbo::{Circle, Vec2};

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> Area {
        Area::from(Rect::new(x0, y0, x1, y1))
    }

    #[test]
    fn union_of_squares() {
        let mut a = square(0.0, 0.0, 10.0, 10.0);
        a.add(&square(5.0, 5.0, 15.0, 15.0));
        assert_eq!(a.bounds(), Rect::new(0.0, 0.0, 15.0, 15.0));
        assert!(a.contains(Point::new(7.0, 7.0)));
        assert!(!a.contains(Point::new(12.0, 2.0)));
        assert!((a.area() - 175.0).abs() < 1e-9, "{}", a.area());
        assert!(a.is_singular());
    }

    #[test]
    fn intersection_of_squares() {
        let mut a = square(0.0, 0.0, 10.0, 10.0);
        a.intersect(&square(5.0, 5.0, 15.0, 15.0));
        assert_eq!(a.bounds(), Rect::new(5.0, 5.0, 10.0, 10.0));
        assert!(a.is_rectangular());
        assert_eq!(a, square(5.0, 5.0, 10.0, 10.0));
    }

    #[test]
    fn subtract_and_xor() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        let b = square(5.0, 5.0, 15.0, 15.0);
        let d = a.difference(&b);
        assert!((d.area() - 75.0).abs() < 1e-9, "{}", d.area());
        assert!(d.contains(Point::new(2.0, 8.0)));
        assert!(!d.contains(Point::new(7.0, 7.0)));

        let x = a.symmetric_difference(&b);
        assert_eq!(x.bounds(), Rect::new(0.0, 0.0, 15.0, 15.0));
        assert!(x.contains(Point::new(2.0, 2.0)));
        assert!(x.contains(Point::new(12.0, 12.0)));
        assert!(!x.contains(Point::new(7.0, 7.0)));
        assert!((x.area() - 150.0).abs() < 1e-9, "{}", x.area());
    }

    #[test]
    fn subtracting_self_is_empty() {
        let mut a = square(0.0, 0.0, 10.0, 10.0);
        let copy = a.clone();
        a.subtract(&copy);
        assert!(a.is_empty());
        assert_eq!(a.bounds(), Rect::ZERO);
        assert_eq!(a, Area::new());
    }

    #[test]
    fn closing_line_to_start_is_redundant() {
        for n in [9_usize, 10, 11] {
            let points: Vec<Point> = (0..n)
                .map(|i| {
                    let angle = core::f64::consts::TAU * i as f64 / n as f64;
                    let radius = if i % 2 == 0 { 10.0 } else { 4.0 };
                    Point::new(radius * angle.cos(), radius * angle.sin())
                })
                .collect();
            let mut explicit_close = vec![PathEl::MoveTo(points[0])];
            explicit_close.extend(points[1..].iter().map(|&p| PathEl::LineTo(p)));
            explicit_close.push(PathEl::ClosePath);

            let mut line_back = explicit_close.clone();
            line_back.insert(n, PathEl::LineTo(points[0]));

            let mut line_back_unclosed = line_back.clone();
            line_back_unclosed.pop();

            let expected = Area::from_path_elements(explicit_close);
            for variant in [line_back, line_back_unclosed] {
                let area = Area::from_path_elements(variant);
                assert_eq!(area.elements(), expected.elements(), "n = {n}");
            }
            assert_eq!(expected.elements().len(), n + 1);
        }
    }

    #[test]
    fn construction_flags() {
        assert!(square(0.0, 0.0, 4.0, 3.0).is_rectangular());
        assert!(square(4.0, 3.0, 0.0, 0.0).is_rectangular());
        let circle = Area::from_shape(&Circle::new((0.0, 0.0), 5.0));
        assert!(!circle.is_polygonal());
        assert!(!circle.is_rectangular());
        let diamond = Area::from_path_elements([
            PathEl::MoveTo(Point::new(0.0, 5.0)),
            PathEl::LineTo(Point::new(5.0, 0.0)),
            PathEl::LineTo(Point::new(10.0, 5.0)),
            PathEl::LineTo(Point::new(5.0, 10.0)),
        ]);
        assert!(diamond.is_polygonal());
        assert!(!diamond.is_rectangular());
        assert!(Area::new().is_singular());
    }

    #[test]
    fn checked_construction() {
        let unit = Rect::new(0.0, 0.0, 1.0, 1.0);
        assert!(Area::try_from_path_elements(unit.path_elements(0.0)).is_ok());
        let err = Area::try_from_path_elements([
            PathEl::MoveTo(Point::new(0.0, 0.0)),
            PathEl::LineTo(Point::new(1.0, 0.0)),
            PathEl::LineTo(Point::new(1.0, f64::INFINITY)),
        ])
        .unwrap_err();
        assert_eq!(err, AreaError::NonFiniteCoordinate { index: 2 });
    }

    #[test]
    fn transform_reloads_boundary() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        let moved = a.transformed(Affine::translate(Vec2::new(5.0, 5.0)));
        assert_eq!(moved.bounds(), Rect::new(5.0, 5.0, 15.0, 15.0));
        assert_eq!(moved, square(5.0, 5.0, 15.0, 15.0));

        let mut flipped = a.clone();
        flipped.transform(Affine::FLIP_X);
        assert_eq!(flipped.bounds(), Rect::new(-10.0, 0.0, 0.0, 10.0));
        assert!(flipped.contains(Point::new(-5.0, 5.0)));
    }

    #[test]
    fn rect_queries() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        assert!(a.contains_rect(Rect::new(2.0, 2.0, 8.0, 8.0)));
        assert!(a.contains_rect(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert!(!a.contains_rect(Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(a.intersects_rect(Rect::new(5.0, 5.0, 15.0, 15.0)));
        assert!(!a.intersects_rect(Rect::new(20.0, 20.0, 30.0, 30.0)));
        assert!(!a.intersects_rect(Rect::new(10.0, 0.0, 20.0, 10.0)));

        let mut ring = a.clone();
        ring.subtract(&square(3.0, 3.0, 7.0, 7.0));
        assert!(!ring.contains_rect(Rect::new(2.0, 2.0, 8.0, 8.0)));
        assert!(ring.contains_rect(Rect::new(0.5, 0.5, 2.5, 9.5)));
        assert!(!ring.intersects_rect(Rect::new(4.0, 4.0, 6.0, 6.0)));
    }

    #[test]
    fn containment_states() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        assert_eq!(a.containment(Point::new(5.0, 5.0)), Containment::Inside);
        assert_eq!(a.containment(Point::new(10.0, 5.0)), Containment::Boundary);
        assert_eq!(a.containment(Point::new(11.0, 5.0)), Containment::Outside);
        assert!(!a.contains(Point::new(10.0, 5.0)));
        assert_eq!(Area::new().containment(Point::ZERO), Containment::Outside);
    }

    #[test]
    fn curved_operations() {
        let square = square(0.0, 0.0, 12.0, 12.0);
        let circle = Area::from_shape(&Circle::new((10.0, 10.0), 5.0));
        let both = square.intersection(&circle);
        assert!(!both.is_polygonal());
        assert!(both.contains(Point::new(11.0, 11.0)));
        assert!(!both.contains(Point::new(6.0, 6.0)));
        assert!(!both.contains(Point::new(1.0, 1.0)));

        let either = square.union(&circle);
        assert!(either.contains(Point::new(13.0, 11.0)));
        assert!(either.contains(Point::new(1.0, 1.0)));
        assert_eq!(either.contour_count(), 1);
        assert!(either.area() > square.area());
    }

    #[test]
    fn overlapping_circles() {
        let a = Area::from_shape(&Circle::new((0.0, 0.0), 5.0));
        let b = Area::from_shape(&Circle::new((6.0, 1.0), 4.0));
        let u = a.union(&b);
        let i = a.intersection(&b);
        let d = a.difference(&b);
        let x = a.symmetric_difference(&b);

        assert!(i.area() > 1.0, "{}", i.area());
        assert!((u.area() - (a.area() + b.area() - i.area())).abs() < 1e-6);
        assert!((d.area() - (a.area() - i.area())).abs() < 1e-6);
        assert!((x.area() - (u.area() - i.area())).abs() < 1e-6);

        let common = Point::new(3.0, 0.5);
        let only_a = Point::new(-4.0, 0.0);
        let only_b = Point::new(9.0, 1.0);
        assert!(u.contains(common) && u.contains(only_a) && u.contains(only_b));
        assert!(i.contains(common) && !i.contains(only_a) && !i.contains(only_b));
        assert!(!d.contains(common) && d.contains(only_a) && !d.contains(only_b));
        assert!(!x.contains(common) && x.contains(only_a) && x.contains(only_b));
        assert!(!i.is_polygonal());
    }

    #[test]
    fn identical_curved_areas_are_equal() {
        let circle = Circle::new((2.0, 3.0), 4.0);
        assert!(Area::from_shape(&circle).equals(&Area::from_shape(&circle)));
        assert!(Area::from_shape(&circle).difference(&Area::from_shape(&circle)).is_empty());
    }

    #[test]
    fn non_finite_input_does_not_panic() {
        // Unchecked construction keeps the NaN; results are unspecified.
        let broken = Area::from_path_elements([
            PathEl::MoveTo(Point::new(0.0, 0.0)),
            PathEl::LineTo(Point::new(10.0, 0.0)),
            PathEl::LineTo(Point::new(f64::NAN, 5.0)),
            PathEl::LineTo(Point::new(0.0, 10.0)),
            PathEl::ClosePath,
        ]);
        let other = square(5.0, 5.0, 15.0, 15.0);
        let _ = broken.union(&other);
        let _ = broken.intersection(&other);
        let _ = other.difference(&broken);
        let _ = broken.contains(Point::new(2.0, 2.0));
        let _ = broken.containment(Point::new(10.0, 0.0));
    }

    #[test]
    fn shape_impl() {
        let a = square(0.0, 0.0, 10.0, 10.0);
        assert!((a.area() - 100.0).abs() < 1e-12);
        assert!((a.perimeter(1e-6) - 40.0).abs() < 1e-9);
        assert_eq!(Shape::winding(&a, Point::new(5.0, 5.0)), 1);
        assert_eq!(a.as_rect(), Some(Rect::new(0.0, 0.0, 10.0, 10.0)));
        assert_eq!(a.to_bez_path().elements(), a.elements());
        assert_eq!(Area::from(a.to_bez_path()), a);
    }
}
