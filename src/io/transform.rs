use std::path::Path;

use nalgebra::{Quaternion, Vector3};
use serde_derive::{Deserialize, Serialize};

use crate::error::Error;
use crate::transform::Transform;

/// File representation of a rigid transform.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TransformRecord {
    pub translation: [f64; 3],
    /// Quaternion as `[w, x, y, z]`.
    pub rotation: [f64; 4],
}

impl From<&Transform> for TransformRecord {
    fn from(transform: &Transform) -> Self {
        let t = transform.translation();
        let q = transform.rotation();
        Self {
            translation: [t[0], t[1], t[2]],
            rotation: [q.w, q.i, q.j, q.k],
        }
    }
}

impl TryFrom<TransformRecord> for Transform {
    type Error = Error;

    fn try_from(record: TransformRecord) -> Result<Self, Error> {
        let [w, x, y, z] = record.rotation;
        let rotation = Quaternion::new(w, x, y, z);
        let norm = rotation.norm();
        if !(norm > 0.0 && norm.is_finite()) || record.translation.iter().any(|v| !v.is_finite()) {
            return Err(Error::parser(format!("Invalid transform: {record:?}")));
        }
        Ok(Transform::new(&Vector3::from(record.translation), &rotation))
    }
}

/// Reads a transform from a JSON file.
pub fn read_transform<P: AsRef<Path>>(filepath: P) -> Result<Transform, Error> {
    let buffer = std::io::BufReader::new(std::fs::File::open(filepath)?);
    let record: TransformRecord = serde_json::from_reader(buffer)?;
    Transform::try_from(record)
}

/// Writes a transform to a JSON file.
pub fn write_transform<P: AsRef<Path>>(filepath: P, transform: &Transform) -> Result<(), Error> {
    let buffer = std::io::BufWriter::new(std::fs::File::create(filepath)?);
    serde_json::to_writer_pretty(buffer, &TransformRecord::from(transform))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use nalgebra::{Quaternion, Vector3};

    use super::{read_transform, write_transform, TransformRecord};
    use crate::transform::Transform;

    #[test]
    fn test_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transform.json");
        let transform = Transform::new(
            &Vector3::new(1.0, -2.0, 0.5),
            &Quaternion::new(0.9, 0.1, -0.3, 0.2),
        );

        write_transform(&path, &transform).unwrap();
        let loaded = read_transform(&path).unwrap();
        assert_abs_diff_eq!(loaded, transform, epsilon = 1e-12);
    }

    #[test]
    fn test_rejects_zero_quaternion() {
        let record = TransformRecord {
            translation: [0.0; 3],
            rotation: [0.0; 4],
        };
        assert!(Transform::try_from(record).is_err());
    }

    #[test]
    fn test_parse_record() {
        let record: TransformRecord =
            serde_json::from_str(r#"{"translation": [1, 2, 3], "rotation": [1, 0, 0, 0]}"#).unwrap();
        let transform = Transform::try_from(record).unwrap();
        assert_eq!(transform.translation(), Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(transform.angle(), 0.0);
    }
}
