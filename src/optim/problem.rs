use nalgebra::SVector;

use super::{GaussNewton, SolverSummary};

/// A parameter that lives on a manifold of dimension `DIM` and is updated
/// through its tangent space.
pub trait Manifold<const DIM: usize>: Clone {
    /// Applies a tangent space increment, returning a value that still
    /// satisfies the manifold constraints.
    fn plus(&self, delta: &SVector<f64, DIM>) -> Self;

    /// Magnitude of the parameter, used by relative step tolerances.
    fn norm(&self) -> f64;
}

/// Weighted nonlinear least squares problem `sum(w * |r(x)|^2)`.
pub trait LeastSquaresProblem<const DIM: usize> {
    type Parameters: Manifold<DIM>;

    /// Number of scalar residuals.
    fn num_residuals(&self) -> usize;

    /// Objective value at `params`.
    fn cost(&self, params: &Self::Parameters) -> f64;

    /// Normal equations at `params`, with derivatives taken with respect to
    /// the tangent space of the parameters.
    fn linearize(&self, params: &Self::Parameters) -> GaussNewton<DIM>;
}

/// Minimizes a least squares problem starting from an initial estimate.
pub trait NonlinearSolver {
    fn solve<const DIM: usize, P>(
        &self,
        problem: &P,
        initial: P::Parameters,
    ) -> (P::Parameters, SolverSummary)
    where
        P: LeastSquaresProblem<DIM>;
}
