pub mod error;
pub mod filters;
pub mod io;
pub mod kdtree;
pub mod metrics;
pub mod optim;
pub mod pointcloud;
pub mod registration;
pub mod spatial;
pub mod transform;

#[cfg(test)]
mod unit_test;

pub use crate::registration::{PointCloudRegistration, RegistrationParams};
