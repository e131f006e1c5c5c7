mod ply;
pub use ply::{read_ply, write_ply};
mod transform;
pub use transform::{read_transform, write_transform, TransformRecord};
