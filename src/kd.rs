// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use crate::{axis_distance, Location};

/// KDTree implements the [k-d tree data structure](https://en.wikipedia.org/wiki/K-d_tree)
/// over [Locations](Location), which speeds up nearest-neighbor search from linear
/// to (expected) logarithmic time.
///
/// The root divides locations by longitude, its children by latitude,
/// grandchildren by longitude again, and so on. Every node keeps locations
/// with a smaller or equal coordinate on its dividing axis in the left branch,
/// and locations with a greater or equal coordinate in the right branch.
///
/// Distances are computed with [planar_distance](crate::planar_distance), and the tree
/// assumes planar geometry. Results are exact with respect to that metric, but not
/// with respect to the great-circle distance, especially close to the poles or
/// the ante meridian (180°/-180° longitude).
///
/// The tree is immutable once built; use [crate::SpatialIndex] to replace it.
#[derive(Debug, Clone)]
pub struct KDTree<T> {
    pivot: Location<T>,
    lat_divides: bool,
    left: Option<Box<KDTree<T>>>,
    right: Option<Box<KDTree<T>>>,
}

impl<T> KDTree<T> {
    /// Finds the [Location] closest to the given position, returning
    /// it together with its distance in kilometers.
    pub fn find_nearest(&self, lon: f64, lat: f64) -> (&Location<T>, f64) {
        let best_dist = self.pivot.distance_to(lon, lat);
        self.find_nearest_impl(lon, lat, &self.pivot, best_dist)
    }

    fn find_nearest_impl<'a>(
        &'a self,
        lon: f64,
        lat: f64,
        mut best: &'a Location<T>,
        mut best_dist: f64,
    ) -> (&'a Location<T>, f64) {
        // Check if the pivot is closer than the best candidate
        let pivot_dist = self.pivot.distance_to(lon, lat);
        if pivot_dist < best_dist {
            best = &self.pivot;
            best_dist = pivot_dist;
        }

        // Select which branch to recurse into first
        let (query, pivot) = if self.lat_divides {
            (lat, self.pivot.lat)
        } else {
            (lon, self.pivot.lon)
        };
        let (first, second) = if query < pivot {
            (&self.left, &self.right)
        } else {
            (&self.right, &self.left)
        };

        // Recurse into the first branch
        if let Some(ref branch) = first {
            (best, best_dist) = branch.find_nearest_impl(lon, lat, best, best_dist);
        }

        // (Optionally) recurse into the second branch.
        // A closer location is possible in the second branch if and only if
        // the dividing axis is closer than the current best candidate.
        if let Some(ref branch) = second {
            if axis_distance(query - pivot) < best_dist {
                (best, best_dist) = branch.find_nearest_impl(lon, lat, best, best_dist);
            }
        }

        (best, best_dist)
    }

    /// Builds a k-d tree from an iterable of [Locations](Location).
    /// Returns `None` if no locations were provided.
    ///
    /// Locations are not [deduplicated](crate::dedup) - use [crate::SpatialIndex] for that.
    pub fn from_iter<I: IntoIterator<Item = Location<T>>>(locations: I) -> Option<Self> {
        let locations = locations.into_iter().collect::<Vec<_>>();
        Self::build(locations)
    }

    /// Builds a k-d tree from a vector of [Locations](Location).
    /// Returns `None` if the vector is empty.
    ///
    /// At every level the (sub)list is stable-sorted by the dividing axis,
    /// and the element at index `len / 2` becomes the pivot. Locations with equal
    /// coordinates on the dividing axis thus keep their relative order from the
    /// previous level (or from the input, at the root).
    pub fn build(locations: Vec<Location<T>>) -> Option<Self> {
        Self::build_impl(locations, false)
    }

    fn build_impl(mut locations: Vec<Location<T>>, lat_divides: bool) -> Option<Self> {
        match locations.len() {
            0 => None,
            1 => locations.pop().map(|pivot| Self {
                pivot,
                lat_divides,
                left: None,
                right: None,
            }),
            _ => {
                if lat_divides {
                    locations.sort_by(|a, b| a.lat.total_cmp(&b.lat));
                } else {
                    locations.sort_by(|a, b| a.lon.total_cmp(&b.lon));
                }

                // Split into [left..., pivot, right...]
                let median = locations.len() / 2;
                let right = locations.split_off(median + 1);
                let pivot = locations.pop()?;
                let left = locations;

                Some(Self {
                    pivot,
                    lat_divides,
                    left: box_option(Self::build_impl(left, !lat_divides)),
                    right: box_option(Self::build_impl(right, !lat_divides)),
                })
            }
        }
    }

    /// Returns the number of [Locations](Location) stored in the tree.
    pub fn len(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |b| b.len()) + self.right.as_ref().map_or(0, |b| b.len())
    }

    /// Returns the depth of the tree; a single-node tree has a depth of 1.
    pub fn depth(&self) -> usize {
        1 + self
            .left
            .as_ref()
            .map_or(0, |b| b.depth())
            .max(self.right.as_ref().map_or(0, |b| b.depth()))
    }

    /// Returns an iterator over all stored [Locations](Location), in pre-order
    /// (pivot, left branch, right branch).
    pub fn iter(&self) -> Iter<'_, T> {
        Iter { stack: vec![self] }
    }
}

#[inline]
fn box_option<T>(o: Option<T>) -> Option<Box<T>> {
    o.map(|thing| Box::new(thing))
}

/// Pre-order iterator over [Locations](Location) in a [KDTree], see [KDTree::iter].
#[derive(Debug, Clone)]
pub struct Iter<'a, T> {
    stack: Vec<&'a KDTree<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a Location<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        if let Some(ref right) = node.right {
            self.stack.push(right);
        }
        if let Some(ref left) = node.left {
            self.stack.push(left);
        }
        Some(&node.pivot)
    }
}
