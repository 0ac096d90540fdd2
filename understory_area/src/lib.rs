// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_area --heading-base-level=0

//! Understory Area: Boolean operations on curved 2D regions.
//!
//! An [`Area`] is a region bounded by closed contours of lines, quadratic and cubic
//! Béziers, built on top of [`kurbo`]. Areas can be combined with union
//! ([`Area::add`]), intersection ([`Area::intersect`]), difference ([`Area::subtract`])
//! and symmetric difference ([`Area::exclusive_or`]), and queried for point and
//! rectangle containment.
//!
//! - Any [`kurbo::Shape`] can be turned into an area, and an area is itself a
//!   [`kurbo::Shape`], so results can be rendered or hit tested like any other path.
//! - Regions are filled with the non-zero winding rule.
//! - Boundaries made only of lines take a cheaper crossing path than curved ones; the
//!   choice is made per operation from the operands.
//! - Point queries distinguish the boundary from the interior with [`Containment`].
//!
//! # Example
//!
//! ```
//! use kurbo::{Circle, Point, Rect};
//! use understory_area::{Area, Containment};
//!
//! let mut area = Area::from(Rect::new(0.0, 0.0, 10.0, 10.0));
//! area.subtract(&Area::from_shape(&Circle::new((9.0, 11.0), 4.0)));
//!
//! assert!(area.contains(Point::new(2.0, 2.0)));
//! assert!(!area.contains(Point::new(9.0, 9.0)));
//! assert_eq!(area.containment(Point::new(0.0, 5.0)), Containment::Boundary);
//! assert!(!area.is_polygonal());
//! ```
//!
//! ## Tolerances
//!
//! Near-degenerate geometry is resolved with the absolute tolerance [`EPSILON`]: points
//! closer than it coincide, and a Boolean result whose bounding box has less area than it
//! is empty. Curved shapes are requested from [`kurbo::Shape::path_elements`] at
//! [`DEFAULT_TOLERANCE`] unless [`Area::from_shape_with_tolerance`] is used.
//!
//! ## Errors
//!
//! Boolean operations never fail. [`Area::try_from_path_elements`] is the one fallible
//! entry point: it reports allocation failure and non-finite coordinates as
//! [`AreaError`].
//!
//! ## Features
//!
//! - `std` (default): use the standard library's float functions.
//! - `libm`: `no_std` float support through `kurbo/libm`.
//!
//! The [`geom`] module exposes the underlying segment predicates.

#![no_std]

extern crate alloc;

mod area;
mod boundary;
mod combine;
mod crossing;
mod error;
pub mod geom;
mod winding;

pub use area::{Area, DEFAULT_TOLERANCE};
pub use error::AreaError;
pub use geom::EPSILON;
pub use winding::Containment;
