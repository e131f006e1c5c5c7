/// Why the solver stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Relative decrease of the cost fell below the function tolerance.
    FunctionTolerance,
    /// Max norm of the gradient fell below the gradient tolerance.
    GradientTolerance,
    /// Step size fell below the parameter tolerance.
    ParameterTolerance,
    /// The iteration budget ran out.
    MaxIterations,
    /// No improving step could be found.
    NoConvergence,
    /// The problem has no residuals.
    NoResiduals,
}

impl Termination {
    /// Whether the termination implies a local minimum was reached.
    pub fn is_converged(&self) -> bool {
        matches!(
            self,
            Termination::FunctionTolerance
                | Termination::GradientTolerance
                | Termination::ParameterTolerance
        )
    }
}

/// Report of a solver run.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverSummary {
    pub num_residuals: usize,
    pub initial_cost: f64,
    pub final_cost: f64,
    pub iterations: usize,
    pub successful_steps: usize,
    pub unsuccessful_steps: usize,
    pub termination: Termination,
}

impl SolverSummary {
    pub fn new(num_residuals: usize, initial_cost: f64) -> Self {
        Self {
            num_residuals,
            initial_cost,
            final_cost: initial_cost,
            iterations: 0,
            successful_steps: 0,
            unsuccessful_steps: 0,
            termination: Termination::MaxIterations,
        }
    }

    /// Summary of a problem without residuals.
    pub fn empty() -> Self {
        Self {
            termination: Termination::NoResiduals,
            ..Self::new(0, 0.0)
        }
    }

    pub fn is_converged(&self) -> bool {
        self.termination.is_converged()
    }

    /// One line report.
    pub fn brief_report(&self) -> String {
        format!(
            "Iterations: {}, Initial cost: {:e}, Final cost: {:e}, Termination: {:?}",
            self.iterations, self.initial_cost, self.final_cost, self.termination
        )
    }
}

impl std::fmt::Display for SolverSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Solver Summary")?;
        writeln!(f, "  Residuals            {}", self.num_residuals)?;
        writeln!(f, "  Initial cost         {:e}", self.initial_cost)?;
        writeln!(f, "  Final cost           {:e}", self.final_cost)?;
        writeln!(f, "  Change               {:e}", self.initial_cost - self.final_cost)?;
        writeln!(f, "  Iterations           {}", self.iterations)?;
        writeln!(f, "  Successful steps     {}", self.successful_steps)?;
        writeln!(f, "  Unsuccessful steps   {}", self.unsuccessful_steps)?;
        write!(
            f,
            "  Termination          {:?} ({})",
            self.termination,
            if self.is_converged() {
                "CONVERGENCE"
            } else {
                "NO_CONVERGENCE"
            }
        )
    }
}
