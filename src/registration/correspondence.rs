use rayon::prelude::*;

use crate::pointcloud::PointCloud;
use crate::spatial::SpatialIndex;

/// Sparse one-to-many association from source indices to target indices,
/// stored in compressed row form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    offsets: Vec<usize>,
    targets: Vec<usize>,
}

impl Association {
    /// Builds the association by querying every source point in the target
    /// index. Source points are processed in parallel.
    ///
    /// # Arguments
    ///
    /// * source - Current (aligned) source cloud.
    /// * target_index - Spatial index over the target cloud.
    /// * radius - Maximum distance of a correspondence.
    /// * max_neighbours - Maximum number of correspondences per source point.
    pub fn build<I: SpatialIndex>(
        source: &PointCloud,
        target_index: &I,
        radius: f64,
        max_neighbours: usize,
    ) -> Self {
        let neighbours: Vec<Vec<usize>> = (0..source.len())
            .into_par_iter()
            .map(|i| target_index.radius_search(&source.point(i), radius, max_neighbours))
            .collect();

        Self::from_neighbours(neighbours)
    }

    /// Creates an association from per source point lists of target indices.
    pub fn from_neighbours(neighbours: Vec<Vec<usize>>) -> Self {
        let mut offsets = Vec::with_capacity(neighbours.len() + 1);
        offsets.push(0);
        let mut targets = Vec::with_capacity(neighbours.iter().map(Vec::len).sum());
        for list in neighbours {
            targets.extend(list);
            offsets.push(targets.len());
        }

        Self { offsets, targets }
    }

    /// Number of source points.
    pub fn num_sources(&self) -> usize {
        self.offsets.len() - 1
    }

    /// Total number of (source, target) pairs.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Target indices associated with the source point `source_index`.
    pub fn targets_of(&self, source_index: usize) -> &[usize] {
        &self.targets[self.offsets[source_index]..self.offsets[source_index + 1]]
    }

    /// Iterates over all (source, target) pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.num_sources()).flat_map(move |i| self.targets_of(i).iter().map(move |j| (i, *j)))
    }
}
