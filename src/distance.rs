// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

/// Kilometers per degree, assumed uniformly for both latitude and longitude.
///
/// Longitude compression away from the equator is not accounted for,
/// so distances far from the equator are overestimated along the east-west axis.
pub const KM_PER_DEGREE: f64 = 112.0;

/// Calculates the planar distance between two lon-lat positions, treating
/// both degrees of latitude and degrees of longitude as [KM_PER_DEGREE] kilometers.
/// Returns the result in kilometers.
pub fn planar_distance(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    KM_PER_DEGREE * (lon2 - lon1).hypot(lat2 - lat1)
}

/// Converts a gap along a single axis (in degrees) into kilometers.
///
/// The result never exceeds [planar_distance] between any two points
/// separated by that gap on that axis.
#[inline]
pub fn axis_distance(gap: f64) -> f64 {
    gap.abs() * KM_PER_DEGREE
}
