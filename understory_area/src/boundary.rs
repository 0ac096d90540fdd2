// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boundary representation and the path loader.
//!
//! A [`Boundary`] is a flat list of [`PathEl`]s in which every contour starts with
//! `MoveTo` and ends with `ClosePath`. It is always produced by [`BoundaryBuilder`], which
//! normalises whatever the source path iterator yields.
//!
//! The engine does not work on elements directly. It asks for an [`Outline`]: the same
//! contours as explicit [`PathSeg`] edges, with the closing line spelled out.

use alloc::vec::Vec;
use core::convert::Infallible;
use core::marker::PhantomData;

use kurbo::{Line, ParamCurve, ParamCurveExtrema, PathEl, PathSeg, Point, Rect};

use crate::error::AreaError;
use crate::geom::{control_bounds, points_coincide};

/// Smallest growth step for the element buffer.
const MIN_GROWTH: usize = 8;

/// How the loader grows storage and whether it validates coordinates.
pub(crate) trait LoadPolicy {
    /// Error surfaced while loading.
    type Error;

    /// Make room for at least one more element, doubling capacity when full.
    fn grow(elements: &mut Vec<PathEl>) -> Result<(), Self::Error>;

    /// Inspect element `index` of the source before it is recorded.
    fn check(index: usize, el: &PathEl) -> Result<(), Self::Error>;
}

/// Infallible loading: allocation failure aborts and coordinates are trusted.
#[derive(Debug)]
pub(crate) struct Unchecked;

impl LoadPolicy for Unchecked {
    type Error = Infallible;

    #[inline]
    fn grow(elements: &mut Vec<PathEl>) -> Result<(), Infallible> {
        if elements.len() == elements.capacity() {
            elements.reserve(elements.len().max(MIN_GROWTH));
        }
        Ok(())
    }

    #[inline]
    fn check(_index: usize, _el: &PathEl) -> Result<(), Infallible> {
        Ok(())
    }
}

/// Fallible loading: allocation failure and non-finite coordinates are errors.
#[derive(Debug)]
pub(crate) struct Checked;

impl LoadPolicy for Checked {
    type Error = AreaError;

    fn grow(elements: &mut Vec<PathEl>) -> Result<(), AreaError> {
        if elements.len() == elements.capacity() {
            elements
                .try_reserve(elements.len().max(MIN_GROWTH))
                .map_err(AreaError::Allocation)?;
        }
        Ok(())
    }

    fn check(index: usize, el: &PathEl) -> Result<(), AreaError> {
        let finite = |p: &Point| p.x.is_finite() && p.y.is_finite();
        let ok = match el {
            PathEl::MoveTo(p) | PathEl::LineTo(p) => finite(p),
            PathEl::QuadTo(p1, p2) => finite(p1) && finite(p2),
            PathEl::CurveTo(p1, p2, p3) => finite(p1) && finite(p2) && finite(p3),
            PathEl::ClosePath => true,
        };
        if ok {
            Ok(())
        } else {
            Err(AreaError::NonFiniteCoordinate { index })
        }
    }
}

/// A region boundary: zero or more closed contours.
///
/// Invariants:
/// - the first element is `MoveTo` when the boundary is non-empty;
/// - every contour ends with `ClosePath`, and a `LineTo` back to the contour start
///   immediately before it is elided;
/// - `polygonal` is true iff no `QuadTo`/`CurveTo` was recorded.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Boundary {
    elements: Vec<PathEl>,
    polygonal: bool,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            polygonal: true,
        }
    }
}

impl Boundary {
    /// Load a boundary with the infallible policy.
    pub(crate) fn from_elements(elements: impl IntoIterator<Item = PathEl>) -> Self {
        let Ok(boundary) = Self::load::<Unchecked>(elements);
        boundary
    }

    /// Load a boundary, growing storage and validating input per `P`.
    pub(crate) fn load<P: LoadPolicy>(
        elements: impl IntoIterator<Item = PathEl>,
    ) -> Result<Self, P::Error> {
        let mut builder = BoundaryBuilder::<P>::new();
        for (index, el) in elements.into_iter().enumerate() {
            P::check(index, &el)?;
            builder.push(el)?;
        }
        builder.finish()
    }

    pub(crate) fn elements(&self) -> &[PathEl] {
        &self.elements
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub(crate) fn is_polygonal(&self) -> bool {
        self.polygonal
    }

    /// Number of contours (one per `MoveTo`).
    pub(crate) fn contour_count(&self) -> usize {
        self.elements
            .iter()
            .filter(|el| matches!(el, PathEl::MoveTo(_)))
            .count()
    }

    /// Tight bounds of the drawn segments; [`Rect::ZERO`] when empty.
    pub(crate) fn bounds(&self) -> Rect {
        self.outline().bounds()
    }

    /// The edge view of this boundary.
    pub(crate) fn outline(&self) -> Outline {
        Outline::new(&self.elements)
    }
}

/// Incremental loader enforcing the [`Boundary`] invariants.
pub(crate) struct BoundaryBuilder<P> {
    elements: Vec<PathEl>,
    polygonal: bool,
    /// Point of the most recent `MoveTo`.
    move_point: Point,
    current: Point,
    open: bool,
    _policy: PhantomData<P>,
}

impl<P> core::fmt::Debug for BoundaryBuilder<P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BoundaryBuilder")
            .field("elements", &self.elements.len())
            .field("polygonal", &self.polygonal)
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl<P: LoadPolicy> BoundaryBuilder<P> {
    pub(crate) fn new() -> Self {
        Self {
            elements: Vec::new(),
            polygonal: true,
            move_point: Point::ZERO,
            current: Point::ZERO,
            open: false,
            _policy: PhantomData,
        }
    }

    pub(crate) fn push(&mut self, el: PathEl) -> Result<(), P::Error> {
        match el {
            PathEl::MoveTo(p) => {
                self.close_contour()?;
                self.move_point = p;
                self.current = p;
                self.record(PathEl::MoveTo(p))?;
                self.open = true;
            }
            PathEl::LineTo(p) => {
                self.ensure_open()?;
                if !points_coincide(p, self.current) {
                    self.record(el)?;
                    self.current = p;
                }
            }
            PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                self.ensure_open()?;
                self.record(el)?;
                self.polygonal = false;
                self.current = p;
            }
            PathEl::ClosePath => self.close_contour()?,
        }
        Ok(())
    }

    pub(crate) fn finish(mut self) -> Result<Boundary, P::Error> {
        self.close_contour()?;
        Ok(Boundary {
            elements: self.elements,
            polygonal: self.polygonal,
        })
    }

    fn record(&mut self, el: PathEl) -> Result<(), P::Error> {
        P::grow(&mut self.elements)?;
        self.elements.push(el);
        Ok(())
    }

    /// Drawing without a current contour starts one at the last `MoveTo` point.
    fn ensure_open(&mut self) -> Result<(), P::Error> {
        if !self.open {
            self.current = self.move_point;
            self.record(PathEl::MoveTo(self.move_point))?;
            self.open = true;
        }
        Ok(())
    }

    fn close_contour(&mut self) -> Result<(), P::Error> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        self.current = self.move_point;
        if let Some(&PathEl::LineTo(p)) = self.elements.last() {
            if points_coincide(p, self.move_point) {
                self.elements.pop();
            }
        }
        if let Some(PathEl::MoveTo(_)) = self.elements.last() {
            // Nothing was drawn.
            self.elements.pop();
            return Ok(());
        }
        self.record(PathEl::ClosePath)
    }
}

/// One edge of an [`Outline`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Edge {
    pub(crate) seg: PathSeg,
    /// Index of the element this edge was drawn by (the `ClosePath` for closing lines).
    pub(crate) rule: usize,
}

/// A closed loop of edges.
#[derive(Clone, Debug, Default)]
pub(crate) struct Contour {
    pub(crate) edges: Vec<Edge>,
}

/// Edge view of a [`Boundary`]. Zero-length edges and empty contours are dropped.
#[derive(Clone, Debug, Default)]
pub(crate) struct Outline {
    pub(crate) contours: Vec<Contour>,
}

impl Outline {
    pub(crate) fn new(elements: &[PathEl]) -> Self {
        let mut contours = Vec::new();
        let mut contour = Contour::default();
        let mut start = Point::ZERO;
        let mut current = Point::ZERO;
        for (rule, el) in elements.iter().enumerate() {
            let seg = match *el {
                PathEl::MoveTo(p) => {
                    if !contour.edges.is_empty() {
                        contours.push(core::mem::take(&mut contour));
                    }
                    start = p;
                    current = p;
                    continue;
                }
                PathEl::LineTo(p) => PathSeg::Line(Line::new(current, p)),
                PathEl::QuadTo(p1, p2) => PathSeg::Quad(kurbo::QuadBez::new(current, p1, p2)),
                PathEl::CurveTo(p1, p2, p3) => {
                    PathSeg::Cubic(kurbo::CubicBez::new(current, p1, p2, p3))
                }
                PathEl::ClosePath => {
                    if !points_coincide(current, start) {
                        contour.edges.push(Edge {
                            seg: PathSeg::Line(Line::new(current, start)),
                            rule,
                        });
                    }
                    current = start;
                    if !contour.edges.is_empty() {
                        contours.push(core::mem::take(&mut contour));
                    }
                    continue;
                }
            };
            current = seg.end();
            if !is_degenerate(seg) {
                contour.edges.push(Edge { seg, rule });
            }
        }
        if !contour.edges.is_empty() {
            contours.push(contour);
        }
        Self { contours }
    }

    pub(crate) fn edges(&self) -> impl Iterator<Item = &Edge> + '_ {
        self.contours.iter().flat_map(|c| c.edges.iter())
    }

    /// Tight bounds; [`Rect::ZERO`] when there are no edges.
    pub(crate) fn bounds(&self) -> Rect {
        self.edges()
            .map(|e| e.seg.bounding_box())
            .reduce(|a, b| a.union(b))
            .unwrap_or(Rect::ZERO)
    }
}

fn is_degenerate(seg: PathSeg) -> bool {
    let b = control_bounds(seg);
    points_coincide(Point::new(b.x0, b.y0), Point::new(b.x1, b.y1))
}
