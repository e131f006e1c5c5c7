use nalgebra::Vector3;
use ndarray::prelude::*;

use crate::error::Error;
use crate::transform::Transform;

/// Ordered set of 3D points stored as a (N x 3) array.
///
/// The row index of a point is its address, correspondences between clouds
/// are expressed with these indices.
#[derive(Clone, Debug, PartialEq)]
pub struct PointCloud {
    pub points: Array2<f64>,
}

impl Default for PointCloud {
    fn default() -> Self {
        Self::zeros(0)
    }
}

impl PointCloud {
    /// Wraps a (N x 3) array.
    pub fn new(points: Array2<f64>) -> Result<Self, Error> {
        if points.ncols() != 3 {
            return Err(Error::invalid_parameter(format!(
                "Point arrays must have 3 columns, got {}",
                points.ncols()
            )));
        }
        Ok(Self { points })
    }

    pub fn from_points(points: &[Vector3<f64>]) -> Self {
        Self {
            points: Array2::from_shape_fn((points.len(), 3), |(i, c)| points[i][c]),
        }
    }

    pub fn zeros(len: usize) -> Self {
        Self {
            points: Array2::<f64>::zeros((len, 3)),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len_of(Axis(0))
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the point at `index`.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn point(&self, index: usize) -> Vector3<f64> {
        let row = self.points.row(index);
        Vector3::new(row[0], row[1], row[2])
    }

    pub fn iter(&self) -> impl Iterator<Item = Vector3<f64>> + '_ {
        self.points
            .outer_iter()
            .map(|row| Vector3::new(row[0], row[1], row[2]))
    }

    /// Applies a transform to all points, modifying the cloud.
    pub fn transform_mut(&mut self, transform: &Transform) {
        let points = std::mem::take(&mut self.points);
        self.points = transform.transform(points);
    }
}

impl std::ops::Mul<&PointCloud> for &Transform {
    type Output = PointCloud;

    fn mul(self, rhs: &PointCloud) -> PointCloud {
        PointCloud {
            points: self * &rhs.points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PointCloud;
    use crate::transform::Transform;
    use nalgebra::{Vector3, Vector6};
    use ndarray::array;
    use rstest::*;

    #[fixture]
    fn sample_pcl1() -> PointCloud {
        PointCloud::from_points(&[
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ])
    }

    #[rstest]
    fn test_from_points(sample_pcl1: PointCloud) {
        assert_eq!(sample_pcl1.len(), 3);
        assert!(!sample_pcl1.is_empty());
        assert_eq!(sample_pcl1.point(1), Vector3::new(1.0, 0.0, 0.0));
        assert_eq!(sample_pcl1.iter().count(), 3);
    }

    #[test]
    fn test_new_rejects_bad_shape() {
        assert!(PointCloud::new(array![[1.0, 2.0], [3.0, 4.0]]).is_err());
        assert!(PointCloud::new(array![[1.0, 2.0, 3.0]]).is_ok());
    }

    #[test]
    fn test_empty() {
        let pcl = PointCloud::default();
        assert!(pcl.is_empty());
        assert_eq!(pcl.len(), 0);
    }

    #[rstest]
    fn test_transform_mut(sample_pcl1: PointCloud) {
        let transform = Transform::from_se3_exp(&Vector6::new(1.0, 2.0, 3.0, 0.0, 0.0, 0.0));
        let expected = &transform * &sample_pcl1;

        let mut moved = sample_pcl1.clone();
        moved.transform_mut(&transform);

        assert_eq!(moved, expected);
        assert_eq!(moved.point(2), Vector3::new(1.0, 3.0, 3.0));
        // The input of the multiplication is left untouched.
        assert_eq!(sample_pcl1.point(2), Vector3::new(0.0, 1.0, 0.0));
    }
}
