// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::Location;

/// Maximum difference (in degrees), on both axes, between two duplicate [Locations](Location).
pub const DUPLICATE_TOLERANCE: f64 = 0.00001;

/// Checks whether two [Locations](Location) are duplicates of each other,
/// that is, both their latitudes and their longitudes differ by at most
/// [DUPLICATE_TOLERANCE].
///
/// This is an axis-wise check, not a radius check: points on the diagonal
/// of the tolerance square are still considered duplicates.
#[inline]
pub fn is_duplicate<A, B>(a: &Location<A>, b: &Location<B>) -> bool {
    (a.lat - b.lat).abs() <= DUPLICATE_TOLERANCE && (a.lon - b.lon).abs() <= DUPLICATE_TOLERANCE
}

/// Collapses [duplicate](is_duplicate) locations, keeping the first-seen representative
/// of every group. Relative order of the kept locations is preserved.
///
/// Every candidate is compared against all accepted locations, making this
/// function quadratic. It's meant to be run once, when building an index.
pub fn dedup<T, I: IntoIterator<Item = Location<T>>>(locations: I) -> Vec<Location<T>> {
    let mut unique: Vec<Location<T>> = Vec::new();
    for candidate in locations {
        if !unique.iter().any(|kept| is_duplicate(kept, &candidate)) {
            unique.push(candidate);
        }
    }
    unique
}
