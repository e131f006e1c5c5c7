/// Confidence weight of a residual given its squared norm.
pub trait RobustEstimator {
    fn weight(&self, squared_residual: f64) -> f64;
}

/// Student-t noise model for 3D residuals.
///
/// The weight `(dof + 3) / (dof + r^t r)` is the expected precision of a
/// residual under the t-distribution, it decreases monotonically with the
/// residual so outlier correspondences lose influence without being dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StudentT {
    pub dof: f64,
}

impl RobustEstimator for StudentT {
    fn weight(&self, squared_residual: f64) -> f64 {
        (self.dof + 3.0) / (self.dof + squared_residual)
    }
}

/// Gaussian noise, every residual has the same weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gaussian;

impl RobustEstimator for Gaussian {
    fn weight(&self, _squared_residual: f64) -> f64 {
        1.0
    }
}

/// Noise model selected from the degrees of freedom parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseModel {
    StudentT(StudentT),
    Gaussian(Gaussian),
}

impl NoiseModel {
    /// Infinite degrees of freedom select the Gaussian model.
    pub fn from_dof(dof: f64) -> Self {
        if dof.is_infinite() {
            NoiseModel::Gaussian(Gaussian)
        } else {
            NoiseModel::StudentT(StudentT { dof })
        }
    }
}

impl RobustEstimator for NoiseModel {
    fn weight(&self, squared_residual: f64) -> f64 {
        match self {
            NoiseModel::StudentT(model) => model.weight(squared_residual),
            NoiseModel::Gaussian(model) => model.weight(squared_residual),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::*;

    #[rstest]
    #[case(1.0)]
    #[case(5.0)]
    #[case(30.0)]
    fn test_student_t_is_decreasing(#[case] dof: f64) {
        let model = NoiseModel::from_dof(dof);
        assert_eq!(model.weight(0.0), (dof + 3.0) / dof);

        let mut last = model.weight(0.0);
        for i in 1..100 {
            let weight = model.weight(i as f64 * 0.25);
            assert!(weight < last);
            assert!(weight > 0.0);
            last = weight;
        }
    }

    #[test]
    fn test_gaussian_is_constant() {
        let model = NoiseModel::from_dof(f64::INFINITY);
        assert_eq!(model, NoiseModel::Gaussian(Gaussian));
        for squared_residual in [0.0, 1.0, 1e3, 1e12] {
            assert_eq!(model.weight(squared_residual), 1.0);
        }
    }

    #[test]
    fn test_student_t_value() {
        let model = StudentT { dof: 5.0 };
        assert_eq!(model.weight(3.0), 1.0);
        assert_eq!(model.weight(11.0), 0.5);
    }
}
