//! Robust rigid registration of point clouds.

mod params;
pub use params::RegistrationParams;

mod correspondence;
pub use correspondence::Association;

mod cost_function;
pub use cost_function::PointPointDistance;

mod estimator;
pub use estimator::{PointToPointProblem, TransformEstimator};

#[allow(clippy::module_inception)]
mod registration;
pub use registration::{PointCloudRegistration, RegistrationState, Status, StepReport};
