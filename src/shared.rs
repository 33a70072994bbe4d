// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use std::sync::{Arc, PoisonError, RwLock};

use crate::{Location, SpatialIndex};

/// SharedIndex wraps a [SpatialIndex] for concurrent use: any number of threads
/// may query the index while another one rebuilds it.
///
/// Rebuilding constructs the new [SpatialIndex] without holding any locks,
/// and then publishes it by swapping a single [Arc]. Queries run against a
/// [snapshot](SharedIndex::snapshot), so a query in flight always completes
/// against either the old or the new index, never a partially built one.
#[derive(Debug)]
pub struct SharedIndex<T> {
    current: RwLock<Arc<SpatialIndex<T>>>,
}

impl<T> Default for SharedIndex<T> {
    fn default() -> Self {
        Self::new(SpatialIndex::default())
    }
}

impl<T> SharedIndex<T> {
    /// Creates a shared wrapper around an existing [SpatialIndex].
    pub fn new(index: SpatialIndex<T>) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    /// Returns the currently published [SpatialIndex].
    /// The snapshot stays valid (and unchanged) even if the index is rebuilt.
    pub fn snapshot(&self) -> Arc<SpatialIndex<T>> {
        // The lock only guards an Arc swap, which can't leave the value half-written.
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Builds a new [SpatialIndex] from the provided locations and atomically
    /// replaces the published one with it. Returns the replaced index.
    pub fn rebuild<I: IntoIterator<Item = Location<T>>>(
        &self,
        locations: I,
    ) -> Arc<SpatialIndex<T>> {
        let fresh = Arc::new(SpatialIndex::from_locations(locations));
        log::trace!("publishing rebuilt spatial index with {} locations", fresh.len());

        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, fresh)
    }

    /// Returns the number of locations in the currently published index.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Returns `true` if the currently published index holds no locations.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}

impl<T: Clone> SharedIndex<T> {
    /// Returns a copy of the [Location] closest to the given position
    /// in the currently published index, see [SpatialIndex::nearest].
    pub fn nearest(&self, lon: f64, lat: f64) -> Option<Location<T>> {
        self.snapshot().nearest(lon, lat)
    }
}

impl<T> From<SpatialIndex<T>> for SharedIndex<T> {
    fn from(index: SpatialIndex<T>) -> Self {
        Self::new(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn rebuild_swaps_index() {
        let shared = SharedIndex::default();
        assert!(shared.is_empty());
        assert_eq!(shared.nearest(0.0, 0.0), None);

        let old = shared.rebuild([Location::new(1.0, 1.0, "first")]);
        assert!(old.is_empty());
        assert_eq!(shared.nearest(0.0, 0.0).unwrap().data, "first");

        let snapshot = shared.snapshot();
        shared.rebuild([Location::new(2.0, 2.0, "second")]);
        assert_eq!(snapshot.nearest(0.0, 0.0).unwrap().data, "first");
        assert_eq!(shared.nearest(0.0, 0.0).unwrap().data, "second");
        assert_eq!(shared.len(), 1);
    }

    #[test]
    fn concurrent_queries_during_rebuild() {
        let shared = SharedIndex::from(SpatialIndex::from_locations(
            (0..100i32).map(|i| Location::new(f64::from(i), 0.0, 0)),
        ));

        thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for i in 0..200i32 {
                        // Every published index has a location at every integer longitude
                        let found = shared.nearest(f64::from(i % 100), 0.0).unwrap();
                        assert_eq!(found.lon, f64::from(i % 100));
                    }
                });
            }

            s.spawn(|| {
                for generation in 1..20i32 {
                    shared.rebuild(
                        (0..100i32).map(|i| Location::new(f64::from(i), 0.0, generation)),
                    );
                }
            });
        });

        assert_eq!(shared.nearest(50.0, 0.0).unwrap().data, 19);
    }
}
