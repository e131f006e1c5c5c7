use crate::transform::Transform;

/// Metrics for comparing two transforms.
#[derive(Clone, Debug, Default)]
pub struct TransformMetrics {
    /// Angle between the two transforms in radians.
    pub angle: f64,
    /// Translation vector size between the two transforms.
    pub translation: f64,
}

impl TransformMetrics {
    /// Creates a new `TransformMetrics` from two transforms.
    pub fn new(lfs: &Transform, rhs: &Transform) -> Self {
        let lfs_inv = lfs.inverse();
        let diff = &lfs_inv * rhs;

        Self {
            angle: diff.angle(),
            translation: diff.translation().norm(),
        }
    }

    /// Returns the total error of the two transforms.
    pub fn total(&self) -> f64 {
        self.angle + self.translation
    }
}

impl std::fmt::Display for TransformMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "angle: {:.4}°, translation: {:.6}",
            self.angle.to_degrees(),
            self.translation
        )
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Quaternion, Vector3, Vector6};

    use super::*;

    #[test]
    fn test_transform_metrics() {
        let sample0 = Transform::new(
            &Vector3::new(0.00022050377, 7.3633055e-5, -1.51071e-5),
            &Quaternion::new(0.99996024, 2.059626e-5, 0.00888227, 0.0008264509),
        );
        let sample1 = sample0.clone();

        let metrics = TransformMetrics::new(&sample0, &sample1);

        assert!(metrics.angle.abs() < 1e-7);
        assert!(metrics.translation.abs() < 1e-12);
        assert!(metrics.total() < 1e-7);
    }

    #[test]
    fn test_known_difference() {
        let shift = Transform::from_se3_exp(&Vector6::new(3.0, 4.0, 0.0, 0.0, 0.0, 0.0));
        let turn = Transform::from_se3_exp(&Vector6::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.25));

        let metrics = TransformMetrics::new(&Transform::eye(), &shift);
        assert!((metrics.translation - 5.0).abs() < 1e-12);
        assert!(metrics.angle.abs() < 1e-12);

        let metrics = TransformMetrics::new(&Transform::eye(), &turn);
        assert!((metrics.angle - 0.25).abs() < 1e-12);
        assert!(metrics.translation.abs() < 1e-12);
    }
}
