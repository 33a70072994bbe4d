// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

//! Nearest-location lookup over a static set of geographic points.
//!
//! Locations are deduplicated, organized into a [k-d tree](KDTree) once,
//! and then queried repeatedly for the point closest to a given position.
//! Every [Location] carries an arbitrary payload, which is never inspected -
//! only stored and copied into query results.
//!
//! # Example
//!
//! ```
//! use nearloc::{Location, SpatialIndex};
//!
//! let mut index = SpatialIndex::new();
//! index.build([
//!     Location::new(-122.41, 37.77, "A"),
//!     Location::new(-122.42, 37.78, "B"),
//!     Location::new(-73.98, 40.75, "C"),
//! ]);
//!
//! let nearest = index.nearest(-122.40, 37.76).expect("index is not empty");
//! assert_eq!(nearest.data, "A");
//! ```

mod dedup;
mod distance;
mod index;
mod kd;
pub mod reader;
mod shared;

pub use dedup::{dedup, is_duplicate, DUPLICATE_TOLERANCE};
pub use distance::{axis_distance, planar_distance, KM_PER_DEGREE};
pub use index::SpatialIndex;
pub use kd::{Iter as KDTreeIter, KDTree};
pub use shared::SharedIndex;

/// Represents a single geographic point, together with an opaque payload.
///
/// Coordinates are in degrees. They are not validated in any way -
/// NaNs or out-of-range values result in unspecified (but memory-safe)
/// query results.
#[derive(Debug, Clone, PartialEq)]
pub struct Location<T> {
    pub lon: f64,
    pub lat: f64,
    pub data: T,
}

impl<T> Location<T> {
    pub fn new(lon: f64, lat: f64, data: T) -> Self {
        Self { lon, lat, data }
    }

    /// Returns the [planar_distance] from this location to the provided position.
    #[inline]
    pub fn distance_to(&self, lon: f64, lat: f64) -> f64 {
        planar_distance(self.lon, self.lat, lon, lat)
    }
}
