use std::collections::HashMap;

use nalgebra::Vector3;

use crate::error::Error;
use crate::pointcloud::PointCloud;

/// Removes points with NaN or infinite coordinates.
///
/// # Returns
///
/// The filtered cloud and the number of removed points.
pub fn remove_non_finite(cloud: &PointCloud) -> (PointCloud, usize) {
    let points: Vec<Vector3<f64>> = cloud
        .iter()
        .filter(|point| point.iter().all(|v| v.is_finite()))
        .collect();
    let removed = cloud.len() - points.len();
    (PointCloud::from_points(&points), removed)
}

/// Replaces the points inside each occupied voxel by their centroid.
///
/// Output points are sorted by voxel coordinate, non finite points are dropped.
///
/// # Arguments
///
/// * cloud - Input cloud.
/// * leaf_size - Edge length of the voxels.
pub fn voxel_downsample(cloud: &PointCloud, leaf_size: f64) -> Result<PointCloud, Error> {
    if !(leaf_size > 0.0 && leaf_size.is_finite()) {
        return Err(Error::invalid_parameter(format!(
            "Voxel leaf size must be a positive finite number, got {leaf_size}"
        )));
    }

    let mut voxels: HashMap<(i64, i64, i64), (Vector3<f64>, usize)> = HashMap::new();
    for point in cloud.iter().filter(|point| point.iter().all(|v| v.is_finite())) {
        let key = (
            (point[0] / leaf_size).floor() as i64,
            (point[1] / leaf_size).floor() as i64,
            (point[2] / leaf_size).floor() as i64,
        );
        let (sum, count) = voxels.entry(key).or_insert((Vector3::zeros(), 0));
        *sum += point;
        *count += 1;
    }

    let mut voxels: Vec<_> = voxels.into_iter().collect();
    voxels.sort_unstable_by_key(|(key, _)| *key);

    let centroids: Vec<Vector3<f64>> = voxels
        .into_iter()
        .map(|(_, (sum, count))| sum / count as f64)
        .collect();
    Ok(PointCloud::from_points(&centroids))
}
