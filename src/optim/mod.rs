//! Nonlinear least squares machinery.

mod gaussnewton;
pub use gaussnewton::GaussNewton;

mod robust_estimator;
pub use robust_estimator::{Gaussian, NoiseModel, RobustEstimator, StudentT};

mod linear_solver;
pub use linear_solver::LinearSolverType;

mod problem;
pub use problem::{LeastSquaresProblem, Manifold, NonlinearSolver};

mod summary;
pub use summary::{SolverSummary, Termination};

mod levenberg_marquardt;
pub use levenberg_marquardt::{LevenbergMarquardt, SolverOptions};
