use nalgebra::{UnitQuaternion, Vector3};
use rstest::*;

use point_cloud_registration::{
    metrics::TransformMetrics, pointcloud::PointCloud, transform::Transform,
    PointCloudRegistration, RegistrationParams,
};

#[fixture]
fn lattice() -> PointCloud {
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

#[fixture]
fn motion() -> Transform {
    Transform::new(
        &Vector3::new(0.6, -0.4, 0.2),
        UnitQuaternion::from_euler_angles(0.0, 0.0, 0.03).quaternion(),
    )
}

fn params(radius: f64, n_iter: usize, dof: f64) -> RegistrationParams {
    RegistrationParams {
        radius,
        max_neighbours: 5,
        n_iter,
        dof,
        ..Default::default()
    }
}

fn max_distance(lhs: &PointCloud, rhs: &PointCloud) -> f64 {
    lhs.iter()
        .zip(rhs.iter())
        .map(|(a, b)| (a - b).norm())
        .fold(0.0, f64::max)
}

fn rms_distance(lhs: &PointCloud, rhs: &PointCloud) -> f64 {
    let sum: f64 = lhs
        .iter()
        .zip(rhs.iter())
        .map(|(a, b)| (a - b).norm_squared())
        .sum();
    (sum / lhs.len() as f64).sqrt()
}

#[rstest]
fn test_zero_iterations_keeps_identity(lattice: PointCloud, motion: Transform) {
    let source = &motion * &lattice;
    let mut registration =
        PointCloudRegistration::new(&source, &lattice, params(4.5, 0, 5.0)).unwrap();
    registration.align();

    assert_eq!(*registration.transformation(), Transform::eye());
    assert_eq!(*registration.aligned_cloud(), source);
}

#[rstest]
fn test_identical_clouds(lattice: PointCloud) {
    let mut registration = PointCloudRegistration::new(
        &lattice,
        &lattice,
        RegistrationParams {
            max_neighbours: 10,
            ..params(7.0, 3, 5.0)
        },
    )
    .unwrap();
    registration.align();

    assert_eq!(registration.iteration(), 3);
    let metrics = TransformMetrics::new(&Transform::eye(), registration.transformation());
    assert!(metrics.total() < 1e-6, "{metrics}");
}

#[test]
fn test_triangle_scenario() {
    let triangle = PointCloud::from_points(&[
        Vector3::new(0.0, 0.0, 0.0),
        Vector3::new(1.0, 0.0, 0.0),
        Vector3::new(0.0, 1.0, 0.0),
    ]);
    let mut registration =
        PointCloudRegistration::new(&triangle, &triangle, params(0.5, 3, f64::INFINITY)).unwrap();
    registration.align();

    let transform = registration.transformation();
    assert!(transform.translation().norm() < 1e-6);
    assert!(transform.angle() < 1e-6);
}

#[rstest]
fn test_accumulation_matches_sequential_increments(lattice: PointCloud, motion: Transform) {
    let source = &motion.inverse() * &lattice;
    let mut registration =
        PointCloudRegistration::new(&source, &lattice, params(4.5, 4, 5.0)).unwrap();

    let mut sequential = source.clone();
    while let Some(report) = registration.step() {
        sequential = &report.increment * &sequential;
    }

    let accumulated = registration.transformation() * &source;
    assert!(max_distance(&accumulated, &sequential) < 1e-9);
    assert!(max_distance(registration.aligned_cloud(), &sequential) < 1e-9);
}

#[rstest]
fn test_recovers_motion_and_is_idempotent(lattice: PointCloud, motion: Transform) {
    let source = &motion.inverse() * &lattice;
    let mut registration =
        PointCloudRegistration::new(&source, &lattice, params(4.5, 5, 5.0)).unwrap();
    registration.align();

    let metrics = TransformMetrics::new(registration.transformation(), &motion);
    assert!(metrics.total() < 1e-6, "{metrics}");

    let aligned = registration.aligned_cloud().clone();
    let mut realignment =
        PointCloudRegistration::new(&aligned, &lattice, params(4.5, 5, 5.0)).unwrap();
    realignment.align();

    let change = TransformMetrics::new(&Transform::eye(), realignment.transformation());
    assert!(change.total() < 1e-6, "{change}");
}

#[rstest]
fn test_outlier_is_down_weighted(lattice: PointCloud) {
    let shift = Transform::new(
        &Vector3::new(1.0, 0.0, 0.0),
        UnitQuaternion::identity().quaternion(),
    );
    let inliers = &shift * &lattice;
    let source = {
        let mut points: Vec<Vector3<f64>> = inliers.iter().collect();
        points.push(Vector3::new(-8.0, -13.0, -3.0));
        PointCloud::from_points(&points)
    };

    let run = |dof: f64| {
        let mut registration =
            PointCloudRegistration::new(&source, &lattice, params(4.5, 10, dof)).unwrap();
        registration.align();
        registration.transformation().clone()
    };
    let robust = run(5.0);
    let gaussian = run(f64::INFINITY);

    assert!((robust.translation() - Vector3::new(-1.0, 0.0, 0.0)).norm() < 0.1);
    assert!(robust.angle() < 0.05);

    let robust_rms = rms_distance(&(&robust * &inliers), &lattice);
    let gaussian_rms = rms_distance(&(&gaussian * &inliers), &lattice);
    assert!(
        robust_rms < gaussian_rms,
        "robust: {robust_rms}, gaussian: {gaussian_rms}"
    );
}

#[rstest]
#[case(RegistrationParams { radius: -1.0, ..Default::default() })]
#[case(RegistrationParams { radius: f64::NAN, ..Default::default() })]
#[case(RegistrationParams { max_neighbours: 0, ..Default::default() })]
#[case(RegistrationParams { dof: 0.0, ..Default::default() })]
#[case(RegistrationParams { num_threads: Some(0), ..Default::default() })]
fn test_invalid_params(lattice: PointCloud, #[case] params: RegistrationParams) {
    assert!(PointCloudRegistration::new(&lattice, &lattice, params).is_err());
}
