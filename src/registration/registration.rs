use log::{debug, info, log, warn, Level};

use super::correspondence::Association;
use super::estimator::TransformEstimator;
use super::params::RegistrationParams;
use crate::error::Error;
use crate::kdtree::KdTree;
use crate::metrics::TransformMetrics;
use crate::optim::{LevenbergMarquardt, NonlinearSolver, SolverSummary};
use crate::pointcloud::PointCloud;
use crate::spatial::SpatialIndex;
use crate::transform::Transform;

/// Stage of the registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Converged,
}

/// Accumulated result of the registration.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// Transform from the input source cloud to the target frame.
    pub transformation: Transform,
    /// Number of completed outer iterations.
    pub iteration: usize,
    pub status: Status,
}

/// Outcome of one outer iteration.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Index of the iteration, starting at zero.
    pub iteration: usize,
    /// Transform applied to the aligned cloud in this iteration.
    pub increment: Transform,
    pub num_correspondences: usize,
    pub summary: SolverSummary,
}

/// Robust rigid registration of a source point cloud onto a target point
/// cloud.
///
/// Every iteration associates each source point with the target points
/// inside a search radius, weights the pairs with a t-distribution noise
/// model and solves for the incremental transform, which is then applied to
/// the working copy of the source cloud.
pub struct PointCloudRegistration<'target_lt, I = KdTree, S = LevenbergMarquardt> {
    params: RegistrationParams,
    target: &'target_lt PointCloud,
    target_index: I,
    estimator: TransformEstimator<S>,
    aligned: PointCloud,
    state: RegistrationState,
    pool: Option<rayon::ThreadPool>,
}

impl<'target_lt> PointCloudRegistration<'target_lt> {
    /// Create a new registration with a kd-tree over the target and a
    /// Levenberg-Marquardt solver.
    ///
    /// # Arguments
    ///
    /// * source - Source point cloud, it is copied and never modified.
    /// * target - Target point cloud.
    /// * params - Parameters of the registration.
    pub fn new(
        source: &PointCloud,
        target: &'target_lt PointCloud,
        params: RegistrationParams,
    ) -> Result<Self, Error> {
        Self::with_parts(
            source,
            target,
            KdTree::new(&target.points.view()),
            LevenbergMarquardt::new(params.solver),
            params,
        )
    }
}

impl<'target_lt, I, S> PointCloudRegistration<'target_lt, I, S>
where
    I: SpatialIndex,
    S: NonlinearSolver + Sync,
{
    /// Create a new registration with custom spatial index and solver.
    ///
    /// # Arguments
    ///
    /// * source - Source point cloud, it is copied and never modified.
    /// * target - Target point cloud.
    /// * target_index - Spatial index built over `target`.
    /// * solver - Solver for the incremental transforms.
    /// * params - Parameters of the registration.
    pub fn with_parts(
        source: &PointCloud,
        target: &'target_lt PointCloud,
        target_index: I,
        solver: S,
        params: RegistrationParams,
    ) -> Result<Self, Error> {
        params.validate()?;

        let pool = params
            .num_threads
            .map(|num_threads| {
                rayon::ThreadPoolBuilder::new()
                    .num_threads(num_threads)
                    .build()
                    .map_err(|err| Error::invalid_parameter(err.to_string()))
            })
            .transpose()?;

        Ok(Self {
            params,
            target,
            target_index,
            estimator: TransformEstimator::new(solver, params.noise_model()),
            aligned: source.clone(),
            state: RegistrationState {
                transformation: Transform::eye(),
                iteration: 0,
                status: if params.n_iter == 0 {
                    Status::Converged
                } else {
                    Status::Running
                },
            },
            pool,
        })
    }

    /// Starts from a previously estimated transform instead of the identity.
    ///
    /// The transform is applied to the working cloud and becomes the
    /// starting value of the accumulated transform.
    pub fn with_initial_transform(mut self, initial: Transform) -> Self {
        self.aligned.transform_mut(&initial);
        self.state.transformation = &initial * &self.state.transformation;
        self
    }

    pub fn params(&self) -> &RegistrationParams {
        &self.params
    }

    /// Accumulated transform from the input source cloud to the target.
    pub fn transformation(&self) -> &Transform {
        &self.state.transformation
    }

    /// The source cloud moved by the accumulated transform.
    pub fn aligned_cloud(&self) -> &PointCloud {
        &self.aligned
    }

    pub fn state(&self) -> &RegistrationState {
        &self.state
    }

    /// Number of completed iterations.
    pub fn iteration(&self) -> usize {
        self.state.iteration
    }

    pub fn has_converged(&self) -> bool {
        self.state.status == Status::Converged
    }

    /// Runs iterations until convergence.
    pub fn align(&mut self) {
        while self.step().is_some() {}
    }

    /// Runs one iteration.
    ///
    /// # Returns
    ///
    /// The report of the iteration, or None if the registration has
    /// already converged.
    pub fn step(&mut self) -> Option<StepReport> {
        if self.has_converged() {
            return None;
        }

        let (association, (increment, summary)) = self.run_in_pool(|| {
            let association = Association::build(
                &self.aligned,
                &self.target_index,
                self.params.radius,
                self.params.max_neighbours,
            );
            let estimation = self
                .estimator
                .estimate(&self.aligned, self.target, &association);
            (association, estimation)
        });

        let report = StepReport {
            iteration: self.state.iteration,
            increment,
            num_correspondences: association.len(),
            summary,
        };
        self.log_step(&report);

        self.state.transformation = &report.increment * &self.state.transformation;
        self.aligned.transform_mut(&report.increment);
        self.state.iteration += 1;
        self.update_status(&report);

        Some(report)
    }

    fn run_in_pool<R, F>(&self, func: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(func),
            None => func(),
        }
    }

    fn update_status(&mut self, report: &StepReport) {
        let level = self.report_level();
        if self.state.iteration >= self.params.n_iter {
            log!(
                level,
                "Terminating because maximum number of iterations has been reached ({} iter)",
                self.state.iteration
            );
            self.state.status = Status::Converged;
            return;
        }

        if let Some(threshold) = self.params.convergence_threshold {
            let change = TransformMetrics::new(&Transform::eye(), &report.increment);
            if change.total() < threshold {
                log!(
                    level,
                    "Terminating because the transform change ({}) is below {threshold} ({} iter)",
                    change,
                    self.state.iteration
                );
                self.state.status = Status::Converged;
            }
        }
    }

    fn log_step(&self, report: &StepReport) {
        if report.num_correspondences == 0 {
            warn!(
                "Iteration {}: no correspondences within radius {}, keeping the current transform",
                report.iteration, self.params.radius
            );
            return;
        }

        debug!(
            "Iteration {}: {} correspondences, {}",
            report.iteration,
            report.num_correspondences,
            report.summary.brief_report()
        );
        if !report.summary.is_converged() {
            warn!(
                "Iteration {}: solver did not converge ({:?}), using the best transform found",
                report.iteration, report.summary.termination
            );
        }
        if self.params.verbose {
            info!("{}", report.summary);
        }
    }

    fn report_level(&self) -> Level {
        if self.params.verbose {
            Level::Info
        } else {
            Level::Debug
        }
    }
}
