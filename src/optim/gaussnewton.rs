use nalgebra::{SMatrix, SVector};

/// Accumulates the weighted normal equations `J^t W J` and `J^t W r` of a
/// least squares problem, one scalar residual at a time.
///
/// # Type parameters
///
/// * `DIM` - The dimension of the problem.
#[derive(Clone, Debug)]
pub struct GaussNewton<const DIM: usize> {
    hessian: SMatrix<f64, DIM, DIM>,
    gradient: SVector<f64, DIM>,
    weighted_squared_residual_sum: f64,
    count: usize,
}

impl<const DIM: usize> Default for GaussNewton<DIM> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const DIM: usize> GaussNewton<DIM> {
    /// Creates a new empty system.
    pub fn new() -> Self {
        Self {
            hessian: SMatrix::zeros(),
            gradient: SVector::zeros(),
            weighted_squared_residual_sum: 0.0,
            count: 0,
        }
    }

    /// Adds a new residual to the system.
    ///
    /// # Arguments
    ///
    /// * `residual` - The scalar residual.
    /// * `jacobian` - Derivative of the residual with respect to the parameters.
    /// * `weight` - Confidence of the residual.
    pub fn step(&mut self, residual: f64, jacobian: &[f64; DIM], weight: f64) {
        for i in 0..DIM {
            let ival = jacobian[i] * weight;
            self.gradient[i] += ival * residual;

            self.hessian[(i, i)] += ival * jacobian[i];
            for j in i + 1..DIM {
                let mul = ival * jacobian[j];
                self.hessian[(i, j)] += mul;
                self.hessian[(j, i)] += mul;
            }
        }

        self.weighted_squared_residual_sum += weight * residual * residual;
        self.count += 1;
    }

    /// Adds the values of another system to this one.
    /// Use this to combine the state of sub systems built in parallel.
    ///
    /// # Arguments
    ///
    /// * `other` - The other system.
    pub fn add(mut self, other: &Self) -> Self {
        self.hessian += other.hessian;
        self.gradient += other.gradient;
        self.weighted_squared_residual_sum += other.weighted_squared_residual_sum;
        self.count += other.count;
        self
    }

    /// `J^t W J`
    pub fn hessian(&self) -> &SMatrix<f64, DIM, DIM> {
        &self.hessian
    }

    /// `J^t W r`
    pub fn gradient(&self) -> &SVector<f64, DIM> {
        &self.gradient
    }

    /// The objective value, `sum(w * r^2)`, at the linearization point.
    pub fn cost(&self) -> f64 {
        self.weighted_squared_residual_sum
    }

    /// Number of scalar residuals added.
    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{SMatrix, SVector};

    use super::GaussNewton;

    #[test]
    fn test_gauss_newton() {
        let mut gn = GaussNewton::<6>::new();

        gn.step(1.0, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 1.0);
        gn.step(2.0, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 1.0);
        gn.step(3.0, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 1.0);

        let expected_hessian = SMatrix::<f64, 6, 6>::from_row_slice(&[
            3.0, 6.0, 9.0, 12.0, 15.0, 18.0, //
            6.0, 12.0, 18.0, 24.0, 30.0, 36.0, //
            9.0, 18.0, 27.0, 36.0, 45.0, 54.0, //
            12.0, 24.0, 36.0, 48.0, 60.0, 72.0, //
            15.0, 30.0, 45.0, 60.0, 75.0, 90.0, //
            18.0, 36.0, 54.0, 72.0, 90.0, 108.0,
        ]);
        assert_eq!(*gn.hessian(), expected_hessian);

        let expected_gradient = SVector::<f64, 6>::from_row_slice(&[6.0, 12.0, 18.0, 24.0, 30.0, 36.0]);
        assert_eq!(*gn.gradient(), expected_gradient);
        assert_eq!(gn.cost(), 14.0);
        assert_eq!(gn.len(), 3);
    }

    #[test]
    fn test_weights_scale_contributions() {
        let mut weighted = GaussNewton::<2>::new();
        weighted.step(2.0, &[1.0, 3.0], 0.5);

        let mut unit = GaussNewton::<2>::new();
        unit.step(2.0, &[1.0, 3.0], 1.0);

        assert_eq!(*weighted.hessian(), unit.hessian() * 0.5);
        assert_eq!(*weighted.gradient(), unit.gradient() * 0.5);
        assert_eq!(weighted.cost(), 2.0);
    }

    #[test]
    fn test_add() {
        let mut first = GaussNewton::<2>::new();
        first.step(1.0, &[1.0, 0.0], 1.0);
        let mut second = GaussNewton::<2>::new();
        second.step(2.0, &[0.0, 1.0], 1.0);

        let sum = first.add(&second);
        assert_eq!(sum.len(), 2);
        assert_eq!(sum.cost(), 5.0);
        assert_eq!(*sum.gradient(), SVector::<f64, 2>::new(1.0, 2.0));
        assert_eq!(*sum.hessian(), SMatrix::<f64, 2, 2>::identity());
    }
}
