use nalgebra::{
    Isometry3, Matrix4, Point3, Quaternion, Translation3, UnitQuaternion, Vector3, Vector6,
};
use ndarray::{Array2, Axis};

use std::ops;

/// Rigid body transform: a unit quaternion rotation followed by a translation.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform(Isometry3<f64>);

impl Default for Transform {
    fn default() -> Self {
        Self::eye()
    }
}

impl Transform {
    /// The identity transform.
    pub fn eye() -> Self {
        Self(Isometry3::identity())
    }

    /// Creates a transform from its translation and rotation.
    ///
    /// The quaternion is normalized, so callers may pass values read from
    /// files or other sources with small numerical drift.
    pub fn new(translation: &Vector3<f64>, rotation: &Quaternion<f64>) -> Self {
        Self(Isometry3::from_parts(
            Translation3::from(*translation),
            UnitQuaternion::from_quaternion(*rotation),
        ))
    }

    /// Creates a transform from the exponential map of a twist vector
    /// `[translation; scaled rotation axis]`.
    pub fn from_se3_exp(twist: &Vector6<f64>) -> Self {
        let translation = Translation3::new(twist[0], twist[1], twist[2]);
        let so3 = Vector3::new(twist[3], twist[4], twist[5]);

        Self(Isometry3::from_parts(
            translation,
            UnitQuaternion::from_scaled_axis(so3),
        ))
    }

    pub fn translation(&self) -> Vector3<f64> {
        self.0.translation.vector
    }

    pub fn rotation(&self) -> UnitQuaternion<f64> {
        self.0.rotation
    }

    /// Rotation angle in radians.
    pub fn angle(&self) -> f64 {
        self.0.rotation.angle()
    }

    pub fn inverse(&self) -> Self {
        Self(self.0.inverse())
    }

    /// Tangent space update of the transform.
    ///
    /// The translation part of `delta` is added to the translation, while the
    /// rotation part is an angular velocity composed on the left of the
    /// current quaternion. The quaternion is renormalized afterwards so the
    /// unit norm holds exactly under repeated updates.
    ///
    /// # Arguments
    ///
    /// * delta - `[dx, dy, dz, wx, wy, wz]` increment.
    pub fn plus(&self, delta: &Vector6<f64>) -> Self {
        let translation = self.0.translation.vector + delta.fixed_rows::<3>(0);
        let omega = Vector3::new(delta[3], delta[4], delta[5]);
        let mut rotation = UnitQuaternion::from_scaled_axis(omega) * self.0.rotation;
        rotation.renormalize();

        Self(Isometry3::from_parts(
            Translation3::from(translation),
            rotation,
        ))
    }

    /// Applies only the rotation to a vector.
    pub fn rotate(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        self.0.rotation * vector
    }

    /// Applies the rigid transform to a point.
    pub fn transform_point(&self, point: &Vector3<f64>) -> Vector3<f64> {
        self.0.transform_point(&Point3::from(*point)).coords
    }

    /// Transforms every row of a (N x 3) array in place and returns it.
    pub fn transform(&self, mut points: Array2<f64>) -> Array2<f64> {
        for mut point in points.axis_iter_mut(Axis(0)) {
            let v = self.transform_point(&Vector3::new(point[0], point[1], point[2]));
            point[0] = v[0];
            point[1] = v[1];
            point[2] = v[2];
        }

        points
    }
}

impl ops::Mul<&Array2<f64>> for &Transform {
    type Output = Array2<f64>;

    fn mul(self, rhs: &Array2<f64>) -> Self::Output {
        self.transform(rhs.clone())
    }
}

impl ops::Mul<&Vector3<f64>> for &Transform {
    type Output = Vector3<f64>;

    fn mul(self, rhs: &Vector3<f64>) -> Self::Output {
        self.transform_point(rhs)
    }
}

impl ops::Mul<&Transform> for &Transform {
    type Output = Transform;

    /// Composition: `(a * b)(p) = a(b(p))`.
    fn mul(self, rhs: &Transform) -> Self::Output {
        Transform(self.0 * rhs.0)
    }
}

impl From<Transform> for Matrix4<f64> {
    fn from(transform: Transform) -> Self {
        transform.0.to_homogeneous()
    }
}

impl approx::AbsDiffEq for Transform {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.0.abs_diff_eq(&other.0, epsilon)
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = self.translation();
        let q = self.rotation();
        write!(
            f,
            "translation: [{:.6} {:.6} {:.6}], rotation (w x y z): [{:.6} {:.6} {:.6} {:.6}]",
            t[0], t[1], t[2], q.w, q.i, q.j, q.k
        )
    }
}
