// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by checked construction.

use alloc::collections::TryReserveError;

/// Failure while loading a path into an [`Area`](crate::Area) with
/// [`Area::try_from_path_elements`](crate::Area::try_from_path_elements).
///
/// Boolean operations never fail; only the checked constructor reports errors.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AreaError {
    /// Growing the boundary storage failed.
    #[error("failed to grow boundary storage: {0}")]
    Allocation(TryReserveError),
    /// A path element carried a NaN or infinite coordinate.
    #[error("path element {index} has a non-finite coordinate")]
    NonFiniteCoordinate {
        /// Position of the offending element in the source path.
        index: usize,
    },
}
