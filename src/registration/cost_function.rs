use nalgebra::Vector3;

use crate::optim::GaussNewton;

/// Point to point distance between a transformed source point and a target
/// point.
pub struct PointPointDistance;

impl PointPointDistance {
    /// Residual `R * source + t - target` of a transformed source point.
    ///
    /// # Arguments
    ///
    /// * rotated_source - Source point after the rotation, `R * source`.
    /// * translation - Translation of the transform.
    /// * target_point - Target point.
    pub fn residual(
        &self,
        rotated_source: &Vector3<f64>,
        translation: &Vector3<f64>,
        target_point: &Vector3<f64>,
    ) -> Vector3<f64> {
        rotated_source + translation - target_point
    }

    /// Jacobian rows of the residual with respect to the tangent increment
    /// `[dt; w]`, where the rotation increment is composed on the left:
    /// `d(exp(w) R s) / dw = -[R s]x`.
    pub fn jacobian(&self, rotated_source: &Vector3<f64>) -> [[f64; 6]; 3] {
        let p = rotated_source;
        [
            [1.0, 0.0, 0.0, 0.0, p[2], -p[1]],
            [0.0, 1.0, 0.0, -p[2], 0.0, p[0]],
            [0.0, 0.0, 1.0, p[1], -p[0], 0.0],
        ]
    }

    /// Adds the three scalar residuals of a correspondence to the system.
    pub fn linearize(
        &self,
        system: &mut GaussNewton<6>,
        rotated_source: &Vector3<f64>,
        translation: &Vector3<f64>,
        target_point: &Vector3<f64>,
        weight: f64,
    ) {
        let residual = self.residual(rotated_source, translation, target_point);
        for (r, row) in residual.iter().zip(self.jacobian(rotated_source).iter()) {
            system.step(*r, row, weight);
        }
    }
}
