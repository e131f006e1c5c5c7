use nalgebra::Vector3;
use ndarray::prelude::*;
use ordered_float::OrderedFloat;

use crate::spatial::{closest_indices, SpatialIndex};

const LEAF_SIZE: usize = 16;

enum KdNode {
    Leaf {
        points: Array2<f64>,
        indices: Vec<usize>,
    },
    NonLeaf {
        axis: usize,
        middle_value: f64,
        left: Box<KdNode>,
        right: Box<KdNode>,
    },
}

/// KdTree for fast radius search over 3D points.
pub struct KdTree {
    root: Box<KdNode>,
    len: usize,
}

impl KdTree {
    /// Create a new KdTree from a set of points.
    /// The points are stored in a 2D array, where each row is a point.
    ///
    /// # Arguments
    ///
    /// * points - (N x 3) array of points.
    pub fn new(points: &ArrayView2<f64>) -> Self {
        // Recursive creation.
        fn rec(points: &ArrayView2<f64>, mut indices: Vec<usize>, depth: usize) -> KdNode {
            // Stop recursion if this should be a leaf node.
            if indices.len() <= LEAF_SIZE {
                return KdNode::Leaf {
                    points: points.select(Axis(0), &indices),
                    indices,
                };
            }

            let axis = depth % 3;
            indices.sort_by(|idx1, idx2| points[[*idx1, axis]].total_cmp(&points[[*idx2, axis]]));

            let mid = indices.len() / 2;
            let right = indices.split_off(mid);
            KdNode::NonLeaf {
                axis,
                middle_value: points[[right[0], axis]],
                left: Box::new(rec(points, indices, depth + 1)),
                right: Box::new(rec(points, right, depth + 1)),
            }
        }

        let len = points.nrows();
        KdTree {
            root: Box::new(rec(points, (0..len).collect(), 0)),
            len,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl SpatialIndex for KdTree {
    fn radius_search(&self, query: &Vector3<f64>, radius: f64, max_results: usize) -> Vec<usize> {
        fn rec(
            node: &KdNode,
            query: &Vector3<f64>,
            radius: f64,
            found: &mut Vec<(OrderedFloat<f64>, usize)>,
        ) {
            match node {
                KdNode::NonLeaf {
                    axis,
                    middle_value,
                    left,
                    right,
                } => {
                    // Left holds values <= middle, right holds values >= middle.
                    let value = query[*axis];
                    if value - radius <= *middle_value {
                        rec(left, query, radius, found);
                    }
                    if value + radius >= *middle_value {
                        rec(right, query, radius, found);
                    }
                }
                KdNode::Leaf { points, indices } => {
                    let radius_sqr = radius * radius;
                    for (leaf_point, index) in points.outer_iter().zip(indices) {
                        let distance_sqr = (leaf_point[0] - query[0]).powi(2)
                            + (leaf_point[1] - query[1]).powi(2)
                            + (leaf_point[2] - query[2]).powi(2);
                        if distance_sqr <= radius_sqr {
                            found.push((OrderedFloat(distance_sqr), *index));
                        }
                    }
                }
            }
        }

        if max_results == 0 {
            return Vec::new();
        }
        let mut found = Vec::new();
        rec(&self.root, query, radius, &mut found);
        closest_indices(found, max_results)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Vector3;
    use ndarray::prelude::*;
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::kdtree::KdTree;
    use crate::pointcloud::PointCloud;
    use crate::spatial::{BruteForceIndex, SpatialIndex};

    #[test]
    fn should_find_points_in_radius() {
        let points = array![[1., 2., 3.], [2., 3., 4.], [5., 6., 7.], [8., 9., 1.]];
        let tree = KdTree::new(&points.view());

        assert_eq!(
            tree.radius_search(&Vector3::new(8., 9.1, 1.3), 0.5, 5),
            vec![3]
        );
        assert_eq!(
            tree.radius_search(&Vector3::new(1.5, 2.5, 3.5), 1.0, 5),
            vec![0, 1]
        );
        assert_eq!(
            tree.radius_search(&Vector3::new(1.5, 2.5, 3.5), 1.0, 1).len(),
            1
        );
        assert!(tree
            .radius_search(&Vector3::new(20., 20., 20.), 1.0, 5)
            .is_empty());
    }

    #[test]
    fn should_handle_empty_tree() {
        let points = Array2::<f64>::zeros((0, 3));
        let tree = KdTree::new(&points.view());
        assert!(tree.is_empty());
        assert!(tree.radius_search(&Vector3::zeros(), 10.0, 5).is_empty());
    }

    #[test]
    fn should_match_brute_force_big() {
        let mut rng = SmallRng::seed_from_u64(5);
        let points = Array2::from_shape_fn((2000, 3), |_| rng.gen_range(-10.0..10.0));
        let cloud = PointCloud::new(points).unwrap();

        let tree = KdTree::new(&cloud.points.view());
        let brute_force = BruteForceIndex::new(&cloud);
        assert_eq!(tree.len(), 2000);

        for _ in 0..200 {
            let query = Vector3::new(
                rng.gen_range(-11.0..11.0),
                rng.gen_range(-11.0..11.0),
                rng.gen_range(-11.0..11.0),
            );
            for (radius, cap) in [(0.5, 100), (2.0, 100), (2.0, 7)] {
                assert_eq!(
                    tree.radius_search(&query, radius, cap),
                    brute_force.radius_search(&query, radius, cap)
                );
            }
        }
    }
}
