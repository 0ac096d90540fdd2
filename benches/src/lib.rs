// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic input regions for the `understory_area` benchmarks.

use std::f64::consts::TAU;

use kurbo::{Circle, PathEl, Point, Rect, Vec2};
use understory_area::Area;

/// A star polygon with `points` outer vertices centred on `center`.
pub fn star(center: Point, points: usize, outer: f64, inner: f64) -> Area {
    let n = points.max(3) * 2;
    let vertex = |i: usize| {
        let angle = TAU * i as f64 / n as f64;
        let radius = if i % 2 == 0 { outer } else { inner };
        center + Vec2::new(radius * angle.cos(), radius * angle.sin())
    };
    let mut elements = vec![PathEl::MoveTo(vertex(0))];
    elements.extend((1..n).map(|i| PathEl::LineTo(vertex(i))));
    elements.push(PathEl::ClosePath);
    Area::from_path_elements(elements)
}

/// A `cols` by `rows` grid of separated unit squares, unioned into one area.
pub fn grid(cols: usize, rows: usize) -> Area {
    let mut area = Area::new();
    for i in 0..cols {
        for j in 0..rows {
            let (x, y) = (i as f64 * 1.5, j as f64 * 1.5);
            area.add(&Area::from(Rect::new(x, y, x + 1.0, y + 1.0)));
        }
    }
    area
}

/// A circle flattened at the crate's default tolerance.
pub fn disk(center: Point, radius: f64) -> Area {
    Area::from_shape(&Circle::new(center, radius))
}
