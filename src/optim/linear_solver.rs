use nalgebra::{Cholesky, SMatrix, SVector};
use serde_derive::{Deserialize, Serialize};

/// Strategy used to solve the (damped) normal equations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinearSolverType {
    /// Direct Cholesky factorization.
    DenseCholesky,
    /// Jacobi preconditioned conjugate gradient.
    ConjugateGradient,
}

impl Default for LinearSolverType {
    fn default() -> Self {
        LinearSolverType::DenseCholesky
    }
}

impl LinearSolverType {
    /// Solves `lhs * x = rhs` for a symmetric positive definite `lhs`.
    ///
    /// # Returns
    ///
    /// None if the system is not positive definite or the solution is not finite.
    pub fn solve<const DIM: usize>(
        &self,
        lhs: &SMatrix<f64, DIM, DIM>,
        rhs: &SVector<f64, DIM>,
    ) -> Option<SVector<f64, DIM>> {
        let solution = match self {
            LinearSolverType::DenseCholesky => Cholesky::new(*lhs).map(|chol| chol.solve(rhs)),
            LinearSolverType::ConjugateGradient => conjugate_gradient(lhs, rhs),
        }?;

        solution.iter().all(|v| v.is_finite()).then_some(solution)
    }
}

fn conjugate_gradient<const DIM: usize>(
    lhs: &SMatrix<f64, DIM, DIM>,
    rhs: &SVector<f64, DIM>,
) -> Option<SVector<f64, DIM>> {
    const RELATIVE_TOLERANCE: f64 = 1e-14;

    let preconditioner = {
        let diagonal = lhs.diagonal();
        if diagonal.iter().any(|v| *v <= 0.0) {
            return None;
        }
        diagonal.map(|v| 1.0 / v)
    };

    let rhs_norm = rhs.norm();
    let mut x = SVector::<f64, DIM>::zeros();
    if rhs_norm == 0.0 {
        return Some(x);
    }

    let mut residual = *rhs;
    let mut z = residual.component_mul(&preconditioner);
    let mut direction = z;
    let mut rz = residual.dot(&z);

    for _ in 0..10 * DIM {
        let lhs_direction = lhs * direction;
        let curvature = direction.dot(&lhs_direction);
        if curvature <= 0.0 {
            return None;
        }

        let alpha = rz / curvature;
        x += direction * alpha;
        residual -= lhs_direction * alpha;
        if residual.norm() <= RELATIVE_TOLERANCE * rhs_norm {
            break;
        }

        z = residual.component_mul(&preconditioner);
        let next_rz = residual.dot(&z);
        direction = z + direction * (next_rz / rz);
        rz = next_rz;
    }

    Some(x)
}
