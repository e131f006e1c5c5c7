mod point_clouds;
pub(crate) use point_clouds::{sample_lattice, sample_triangle};
