use nalgebra::{SVector, Vector3, Vector6};
use rayon::prelude::*;

use super::correspondence::Association;
use super::cost_function::PointPointDistance;
use crate::optim::{
    GaussNewton, LeastSquaresProblem, Manifold, NoiseModel, NonlinearSolver, RobustEstimator,
    SolverSummary,
};
use crate::pointcloud::PointCloud;
use crate::transform::Transform;

impl Manifold<6> for Transform {
    fn plus(&self, delta: &SVector<f64, 6>) -> Self {
        Transform::plus(self, delta)
    }

    fn norm(&self) -> f64 {
        Vector6::new(
            self.translation()[0],
            self.translation()[1],
            self.translation()[2],
            self.rotation().i,
            self.rotation().j,
            self.rotation().k,
        )
        .norm()
    }
}

/// A correspondence with the weight given by the noise model.
#[derive(Debug, Clone, Copy)]
struct WeightedPair {
    source: Vector3<f64>,
    target: Vector3<f64>,
    weight: f64,
}

/// Weighted point to point problem over the correspondences of one
/// iteration. Weights are computed once, when the problem is built, from the
/// residuals at the identity transform.
pub struct PointToPointProblem {
    pairs: Vec<WeightedPair>,
}

impl PointToPointProblem {
    pub fn new(
        source: &PointCloud,
        target: &PointCloud,
        association: &Association,
        noise_model: &NoiseModel,
    ) -> Self {
        let pairs = association
            .pairs()
            .map(|(i, j)| {
                let source = source.point(i);
                let target = target.point(j);
                WeightedPair {
                    source,
                    target,
                    weight: noise_model.weight((source - target).norm_squared()),
                }
            })
            .collect();
        Self { pairs }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Sum of the correspondence weights.
    pub fn total_weight(&self) -> f64 {
        self.pairs.iter().map(|pair| pair.weight).sum()
    }
}

impl LeastSquaresProblem<6> for PointToPointProblem {
    type Parameters = Transform;

    fn num_residuals(&self) -> usize {
        self.pairs.len() * 3
    }

    fn cost(&self, params: &Transform) -> f64 {
        let translation = params.translation();
        self.pairs
            .par_iter()
            .map(|pair| {
                let residual =
                    PointPointDistance.residual(&params.rotate(&pair.source), &translation, &pair.target);
                pair.weight * residual.norm_squared()
            })
            .sum()
    }

    fn linearize(&self, params: &Transform) -> GaussNewton<6> {
        let translation = params.translation();
        self.pairs
            .par_iter()
            .fold(GaussNewton::<6>::new, |mut system, pair| {
                PointPointDistance.linearize(
                    &mut system,
                    &params.rotate(&pair.source),
                    &translation,
                    &pair.target,
                    pair.weight,
                );
                system
            })
            .reduce(GaussNewton::<6>::new, |lhs, rhs| lhs.add(&rhs))
    }
}

/// Estimates the rigid transform that best aligns the associated points.
#[derive(Debug, Clone)]
pub struct TransformEstimator<S> {
    solver: S,
    noise_model: NoiseModel,
}

impl<S: NonlinearSolver> TransformEstimator<S> {
    pub fn new(solver: S, noise_model: NoiseModel) -> Self {
        Self {
            solver,
            noise_model,
        }
    }

    pub fn noise_model(&self) -> &NoiseModel {
        &self.noise_model
    }

    /// Solves for the incremental transform that moves the source cloud
    /// onto the target cloud.
    ///
    /// # Returns
    ///
    /// The transform and the solver report. Without correspondences the
    /// transform is the identity and the report has no residuals.
    pub fn estimate(
        &self,
        source: &PointCloud,
        target: &PointCloud,
        association: &Association,
    ) -> (Transform, SolverSummary) {
        let problem = PointToPointProblem::new(source, target, association, &self.noise_model);
        if problem.is_empty() {
            return (Transform::eye(), SolverSummary::empty());
        }

        self.solver.solve::<6, _>(&problem, Transform::eye())
    }
}
