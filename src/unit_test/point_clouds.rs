use nalgebra::Vector3;
use rstest::fixture;

use crate::pointcloud::PointCloud;

/// Three points at unit distance from the origin vertex.
#[fixture]
pub fn sample_triangle() -> PointCloud {
    PointCloud::from_points(&[
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    ])
}

/// A 4 x 4 x 2 grid with 6 units of spacing, centered at the origin.
#[fixture]
pub fn sample_lattice() -> PointCloud {
    let mut points = Vec::new();
    for i in 0..4 {
        for j in 0..4 {
            for k in 0..2 {
                points.push(Vector3::new(
                    6.0 * i as f64 - 9.0,
                    6.0 * j as f64 - 9.0,
                    6.0 * k as f64 - 3.0,
                ));
            }
        }
    }
    PointCloud::from_points(&points)
}
