use std::path::Path;

use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::optim::{NoiseModel, SolverOptions};

/// Parameters of the registration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationParams {
    /// Radius of the neighborhood search used to find correspondences.
    pub radius: f64,
    /// Maximum number of correspondences per source point.
    pub max_neighbours: usize,
    /// Number of outer iterations.
    pub n_iter: usize,
    /// Degrees of freedom of the t-distribution noise model. Infinity
    /// selects the Gaussian model and is written as `null` in JSON.
    #[serde(with = "dof_serde")]
    pub dof: f64,
    /// Logs the solver reports at info level.
    pub verbose: bool,
    /// Options of the solver run at every iteration.
    pub solver: SolverOptions,
    /// Size of a dedicated worker pool. `None` uses the global pool.
    pub num_threads: Option<usize>,
    /// Stops before `n_iter` when the angle plus translation of an
    /// incremental transform falls below this value. Disabled by default.
    pub convergence_threshold: Option<f64>,
}

impl Default for RegistrationParams {
    fn default() -> Self {
        Self {
            radius: 3.0,
            max_neighbours: 10,
            n_iter: 10,
            dof: 5.0,
            verbose: false,
            solver: SolverOptions::default(),
            num_threads: None,
            convergence_threshold: None,
        }
    }
}

impl RegistrationParams {
    /// Loads the parameters from a JSON file. Missing fields take their
    /// default values.
    pub fn from_json_file<P: AsRef<Path>>(filepath: P) -> Result<Self, Error> {
        let file = std::fs::File::open(filepath)?;
        let params: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        params.validate()?;
        Ok(params)
    }

    pub fn radius(&'_ mut self, value: f64) -> &'_ mut Self {
        self.radius = value;
        self
    }

    pub fn max_neighbours(&'_ mut self, value: usize) -> &'_ mut Self {
        self.max_neighbours = value;
        self
    }

    pub fn n_iter(&'_ mut self, value: usize) -> &'_ mut Self {
        self.n_iter = value;
        self
    }

    pub fn dof(&'_ mut self, value: f64) -> &'_ mut Self {
        self.dof = value;
        self
    }

    /// Switches to the Gaussian noise model.
    pub fn use_gaussian(&'_ mut self) -> &'_ mut Self {
        self.dof = f64::INFINITY;
        self
    }

    pub fn verbose(&'_ mut self, value: bool) -> &'_ mut Self {
        self.verbose = value;
        self
    }

    pub fn noise_model(&self) -> NoiseModel {
        NoiseModel::from_dof(self.dof)
    }

    /// Checks that the parameters describe a valid registration.
    pub fn validate(&self) -> Result<(), Error> {
        if !(self.radius > 0.0 && self.radius.is_finite()) {
            return Err(Error::invalid_parameter(format!(
                "radius must be a positive finite number, got {}",
                self.radius
            )));
        }

        if self.max_neighbours == 0 {
            return Err(Error::invalid_parameter(
                "max_neighbours must be greater than zero",
            ));
        }

        if !(self.dof > 0.0) {
            return Err(Error::invalid_parameter(format!(
                "dof must be positive or infinite, got {}",
                self.dof
            )));
        }

        if self.num_threads == Some(0) {
            return Err(Error::invalid_parameter(
                "num_threads must be greater than zero",
            ));
        }

        if let Some(threshold) = self.convergence_threshold {
            if !(threshold > 0.0 && threshold.is_finite()) {
                return Err(Error::invalid_parameter(format!(
                    "convergence_threshold must be a positive finite number, got {threshold}"
                )));
            }
        }

        self.solver.validate()
    }
}

mod dof_serde {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dof: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if dof.is_infinite() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(dof)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}
