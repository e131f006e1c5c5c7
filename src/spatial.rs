use nalgebra::Vector3;
use ordered_float::OrderedFloat;

use crate::pointcloud::PointCloud;

/// Nearest neighbor acceleration structure over a fixed point set.
pub trait SpatialIndex: Sync {
    /// Finds the indices of all points within `radius` of `query`.
    ///
    /// Results are ordered by increasing distance (ties broken by index) and
    /// truncated to `max_results` entries.
    fn radius_search(&self, query: &Vector3<f64>, radius: f64, max_results: usize) -> Vec<usize>;
}

/// Sorts `(squared distance, index)` candidates and keeps the closest `max_results`.
pub(crate) fn closest_indices(
    mut candidates: Vec<(OrderedFloat<f64>, usize)>,
    max_results: usize,
) -> Vec<usize> {
    candidates.sort_unstable();
    candidates.truncate(max_results);
    candidates.into_iter().map(|(_, index)| index).collect()
}

/// Exhaustive search, useful for small clouds and as a reference for the
/// tree based search.
pub struct BruteForceIndex {
    points: Vec<Vector3<f64>>,
}

impl BruteForceIndex {
    pub fn new(cloud: &PointCloud) -> Self {
        Self {
            points: cloud.iter().collect(),
        }
    }
}

impl SpatialIndex for BruteForceIndex {
    fn radius_search(&self, query: &Vector3<f64>, radius: f64, max_results: usize) -> Vec<usize> {
        let radius_sqr = radius * radius;
        let candidates = self
            .points
            .iter()
            .enumerate()
            .filter_map(|(index, point)| {
                let distance_sqr = (point - query).norm_squared();
                (distance_sqr <= radius_sqr).then_some((OrderedFloat(distance_sqr), index))
            })
            .collect();
        closest_indices(candidates, max_results)
    }
}
