use nalgebra::SVector;
use serde_derive::{Deserialize, Serialize};

use super::{
    LeastSquaresProblem, LinearSolverType, Manifold, NonlinearSolver, SolverSummary, Termination,
};
use crate::error::Error;

const MIN_DIAGONAL: f64 = 1e-6;
const MAX_DIAGONAL: f64 = 1e32;
const MIN_RELATIVE_DECREASE: f64 = 1e-3;
const MAX_DAMPING: f64 = 1e32;

/// Options of the Levenberg-Marquardt solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverOptions {
    /// Maximum number of solver iterations.
    pub max_iterations: usize,
    /// Stops when `|cost change| <= function_tolerance * cost`.
    pub function_tolerance: f64,
    /// Stops when the max norm of the gradient is below this value.
    pub gradient_tolerance: f64,
    /// Stops when `|step| <= parameter_tolerance * (|x| + parameter_tolerance)`.
    pub parameter_tolerance: f64,
    /// Inverse of the initial damping.
    pub initial_trust_region_radius: f64,
    pub linear_solver: LinearSolverType,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            function_tolerance: 1e-15,
            gradient_tolerance: 1e-10,
            parameter_tolerance: 1e-8,
            initial_trust_region_radius: 1e4,
            linear_solver: LinearSolverType::DenseCholesky,
        }
    }
}

impl SolverOptions {
    pub fn validate(&self) -> Result<(), Error> {
        let tolerances = [
            ("function_tolerance", self.function_tolerance),
            ("gradient_tolerance", self.gradient_tolerance),
            ("parameter_tolerance", self.parameter_tolerance),
        ];
        for (name, value) in tolerances {
            if !(value >= 0.0 && value.is_finite()) {
                return Err(Error::invalid_parameter(format!(
                    "{name} must be a finite non negative number, got {value}"
                )));
            }
        }

        if !(self.initial_trust_region_radius > 0.0) {
            return Err(Error::invalid_parameter(format!(
                "initial_trust_region_radius must be positive, got {}",
                self.initial_trust_region_radius
            )));
        }
        Ok(())
    }
}

/// Trust region solver that interpolates between Gauss-Newton and gradient
/// descent by damping the normal equations.
#[derive(Debug, Clone, Default)]
pub struct LevenbergMarquardt {
    pub options: SolverOptions,
}

impl LevenbergMarquardt {
    pub fn new(options: SolverOptions) -> Self {
        Self { options }
    }
}

impl NonlinearSolver for LevenbergMarquardt {
    fn solve<const DIM: usize, P>(
        &self,
        problem: &P,
        initial: P::Parameters,
    ) -> (P::Parameters, SolverSummary)
    where
        P: LeastSquaresProblem<DIM>,
    {
        let options = &self.options;
        let mut params = initial;
        let mut system = problem.linearize(&params);
        if system.is_empty() {
            return (params, SolverSummary::empty());
        }

        let mut summary = SolverSummary::new(problem.num_residuals(), system.cost());
        let mut cost = system.cost();
        let mut damping = 1.0 / options.initial_trust_region_radius;
        let mut damping_factor = 2.0;

        for _ in 0..options.max_iterations {
            summary.iterations += 1;

            let gradient = *system.gradient();
            if gradient.amax() <= options.gradient_tolerance {
                summary.termination = Termination::GradientTolerance;
                break;
            }

            let hessian = *system.hessian();
            let mut damped = hessian;
            for i in 0..DIM {
                damped[(i, i)] += damping * hessian[(i, i)].clamp(MIN_DIAGONAL, MAX_DIAGONAL);
            }

            let step = options
                .linear_solver
                .solve(&damped, &-gradient)
                .and_then(|delta| {
                    // Reduction predicted by the linearized model.
                    let model_reduction =
                        -(2.0 * gradient.dot(&delta) + delta.dot(&(hessian * delta)));
                    (model_reduction > 0.0).then_some((delta, model_reduction))
                });

            if let Some((delta, model_reduction)) = step {
                if delta.norm()
                    <= options.parameter_tolerance
                        * (params.norm() + options.parameter_tolerance)
                {
                    summary.termination = Termination::ParameterTolerance;
                    break;
                }

                let candidate = params.plus(&delta);
                let candidate_cost = problem.cost(&candidate);
                let cost_change = cost - candidate_cost;
                let relative_decrease = cost_change / model_reduction;

                if candidate_cost.is_finite() && relative_decrease > MIN_RELATIVE_DECREASE {
                    summary.successful_steps += 1;
                    params = candidate;
                    system = problem.linearize(&params);
                    let previous_cost = cost;
                    cost = system.cost();

                    damping *= f64::max(1.0 / 3.0, 1.0 - (2.0 * relative_decrease - 1.0).powi(3));
                    damping_factor = 2.0;

                    if cost_change.abs() <= options.function_tolerance * previous_cost {
                        summary.termination = Termination::FunctionTolerance;
                        break;
                    }
                    continue;
                }
            }

            summary.unsuccessful_steps += 1;
            damping *= damping_factor;
            damping_factor *= 2.0;
            if damping > MAX_DAMPING {
                summary.termination = Termination::NoConvergence;
                break;
            }
        }

        summary.final_cost = cost;
        (params, summary)
    }
}
