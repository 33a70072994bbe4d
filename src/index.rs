// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{dedup, KDTree, Location};

/// SpatialIndex answers "which stored [Location] is closest to this position" queries
/// over a static set of locations.
///
/// The index is [built](SpatialIndex::build) once from a batch of locations,
/// which are [deduplicated](dedup) and organized into a [KDTree]. Afterwards,
/// it can be queried any number of times with [SpatialIndex::nearest].
/// Rebuilding replaces all stored locations; there is no incremental insertion
/// or removal.
#[derive(Debug, Clone)]
pub struct SpatialIndex<T> {
    tree: Option<KDTree<T>>,
}

impl<T> Default for SpatialIndex<T> {
    fn default() -> Self {
        Self { tree: None }
    }
}

impl<T> SpatialIndex<T> {
    /// Creates a new, empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new index over the provided locations, see [SpatialIndex::build].
    pub fn from_locations<I: IntoIterator<Item = Location<T>>>(locations: I) -> Self {
        let mut index = Self::new();
        index.build(locations);
        index
    }

    /// Replaces all locations in the index with the provided ones.
    ///
    /// [Duplicate](crate::is_duplicate) locations are collapsed into the first-seen one.
    /// An empty input results in an empty index.
    pub fn build<I: IntoIterator<Item = Location<T>>>(&mut self, locations: I) {
        let mut raw_count = 0;
        let unique = dedup(locations.into_iter().inspect(|_| raw_count += 1));
        log::debug!(
            "building spatial index over {} unique locations ({} duplicates dropped)",
            unique.len(),
            raw_count - unique.len(),
        );
        self.tree = KDTree::build(unique);
    }

    /// Returns the number of (unique) locations in the index.
    pub fn len(&self) -> usize {
        self.tree.as_ref().map_or(0, |t| t.len())
    }

    /// Returns `true` if the index holds no locations.
    pub fn is_empty(&self) -> bool {
        self.tree.is_none()
    }

    /// Returns the underlying [KDTree], or `None` if the index is empty.
    pub fn tree(&self) -> Option<&KDTree<T>> {
        self.tree.as_ref()
    }

    /// Returns an iterator over all stored [Locations](Location), in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &Location<T>> {
        self.tree.iter().flat_map(|t| t.iter())
    }
}

impl<T: Clone> SpatialIndex<T> {
    /// Returns a copy of the stored [Location] closest to the given position,
    /// or `None` if the index is empty.
    ///
    /// The returned value is independent of the index - modifying it
    /// has no effect on the stored locations.
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<Location<T>> {
        self.nearest_with_distance(lon, lat).map(|(l, _)| l)
    }

    /// Like [SpatialIndex::nearest], but also returns the
    /// [planar distance](crate::planar_distance) to the found location, in kilometers.
    pub fn nearest_with_distance(&self, lon: f64, lat: f64) -> Option<(Location<T>, f64)> {
        self.tree.as_ref().map(|t| {
            let (nearest, dist) = t.find_nearest(lon, lat);
            (nearest.clone(), dist)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn nearest_scenario() {
        let index = SpatialIndex::from_locations([
            Location::new(-122.41, 37.77, "A"),
            Location::new(-122.42, 37.78, "B"),
            Location::new(-73.98, 40.75, "C"),
        ]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.nearest(-122.40, 37.76).unwrap().data, "A");
        assert_eq!(index.nearest(-122.43, 37.79).unwrap().data, "B");
        assert_eq!(index.nearest(-74.0, 40.7).unwrap().data, "C");
    }

    #[test]
    fn nearest_empty() {
        let mut index = SpatialIndex::<()>::new();
        assert!(index.is_empty());
        assert_eq!(index.nearest(0.0, 0.0), None);

        index.build([]);
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert_eq!(index.nearest(0.0, 0.0), None);
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn nearest_deduplicated() {
        let index = SpatialIndex::from_locations([
            Location::new(0.0, 0.0, "X"),
            Location::new(0.000005, 0.000005, "Y"),
        ]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.nearest(0.0, 0.0).unwrap().data, "X");
        assert_eq!(index.nearest(0.000005, 0.000005).unwrap().data, "X");
    }

    #[test]
    fn nearest_returns_a_copy() {
        let index = SpatialIndex::from_locations([
            Location::new(19.94, 50.06, String::from("Kraków")),
            Location::new(21.01, 52.23, String::from("Warszawa")),
        ]);

        let mut found = index.nearest(20.0, 50.0).unwrap();
        found.data.push_str(" (modified)");
        found.lat = 0.0;

        let again = index.nearest(20.0, 50.0).unwrap();
        assert_eq!(again.data, "Kraków");
        assert_eq!(again.lat, 50.06);
        assert!(index.iter().all(|l| !l.data.contains("modified")));
    }

    #[test]
    fn nearest_is_deterministic() {
        let index = SpatialIndex::from_locations(
            (0..100i32).map(|i| Location::new(f64::from(i % 10), f64::from(i / 10), i)),
        );
        let first = index.nearest(4.4, 6.6).unwrap();
        for _ in 0..10 {
            assert_eq!(index.nearest(4.4, 6.6).unwrap(), first);
        }
        assert_eq!(first.data, 74);
    }

    #[test]
    fn rebuild_replaces_locations() {
        let mut index = SpatialIndex::from_locations([Location::new(1.0, 1.0, 1)]);
        index.build([Location::new(2.0, 2.0, 2), Location::new(3.0, 3.0, 3)]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.nearest(1.0, 1.0).unwrap().data, 2);

        index.build([]);
        assert_eq!(index.nearest(1.0, 1.0), None);
    }

    #[test]
    fn nearest_with_distance() {
        let index = SpatialIndex::from_locations([Location::new(0.0, 0.0, ())]);
        let (_, dist) = index.nearest_with_distance(0.3, 0.4).unwrap();
        assert!((dist - 56.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn nearest_matches_brute_force(
            points in prop::collection::vec((-10.0f64..10.0, -10.0f64..10.0), 0..150),
            lon in -12.0f64..12.0,
            lat in -12.0f64..12.0,
        ) {
            let locations = points
                .iter()
                .enumerate()
                .map(|(i, &(lon, lat))| Location::new(lon, lat, i))
                .collect::<Vec<_>>();
            let unique = dedup(locations.clone());
            let index = SpatialIndex::from_locations(locations);
            prop_assert_eq!(index.len(), unique.len());

            let expected = unique
                .iter()
                .map(|l| l.distance_to(lon, lat))
                .min_by(|a, b| a.total_cmp(b));
            let got = index.nearest_with_distance(lon, lat).map(|(_, d)| d);
            prop_assert_eq!(got, expected);
        }
    }
}
