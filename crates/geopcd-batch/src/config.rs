use std::path::Path;

use geopcd_linalg::{estimate_rigid_transform, RigidError, RigidTransform};
use serde::{Deserialize, Serialize};

use crate::error::BatchError;

/// Corresponding points expressed in the local (cloud) frame and the global
/// (target) frame. Index `i` of `local` matches index `i` of `global`.
///
/// Deserializes from JSON such as:
///
/// ```json
/// { "local": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
///   "global": [[10, 0, 0], [11, 0, 0], [10, 1, 0]] }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrespondenceSet {
    /// Points in the local frame.
    pub local: Vec<[f64; 3]>,
    /// The same points in the global frame.
    pub global: Vec<[f64; 3]>,
}

impl CorrespondenceSet {
    /// Create a correspondence set from two index-matched point lists.
    pub fn new(local: Vec<[f64; 3]>, global: Vec<[f64; 3]>) -> Self {
        Self { local, global }
    }

    /// Parse a correspondence set from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, BatchError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a correspondence set from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, BatchError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Number of correspondence pairs.
    ///
    /// Returns `None` if the two lists disagree in length.
    pub fn len(&self) -> Option<usize> {
        (self.local.len() == self.global.len()).then_some(self.local.len())
    }

    /// Whether the set holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.global.is_empty()
    }

    /// Estimate the rigid transform mapping local onto global points.
    pub fn estimate(&self) -> Result<RigidTransform, RigidError> {
        estimate_rigid_transform(&self.local, &self.global)
    }

    /// Root mean squared residual of `transform` over the pairs.
    pub fn rmse(&self, transform: &RigidTransform) -> Result<f64, RigidError> {
        transform.rmse(&self.local, &self.global)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    const JSON: &str = r#"{
        "local": [[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]],
        "global": [[10, 0, 0], [11, 0, 0], [10, 1, 0], [10, 0, 1]]
    }"#;

    #[test]
    fn test_from_json_and_estimate() -> Result<(), Box<dyn std::error::Error>> {
        let set = CorrespondenceSet::from_json_str(JSON)?;
        assert_eq!(set.len(), Some(4));
        let transform = set.estimate()?;
        assert_relative_eq!(transform.translation()[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(set.rmse(&transform)?, 0.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_from_json_file() -> Result<(), Box<dyn std::error::Error>> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(JSON.as_bytes())?;
        let set = CorrespondenceSet::from_json_file(file.path())?;
        assert_eq!(set.local.len(), 4);
        Ok(())
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            CorrespondenceSet::from_json_str(r#"{"local": [[0, 0]], "global": []}"#),
            Err(BatchError::Config(_))
        ));
        assert!(matches!(
            CorrespondenceSet::from_json_file("/definitely/not/here.json"),
            Err(BatchError::ConfigIo(_))
        ));
    }

    #[test]
    fn test_length_mismatch() {
        let set = CorrespondenceSet::new(vec![[0.0; 3]; 3], vec![[0.0; 3]; 4]);
        assert_eq!(set.len(), None);
        assert!(matches!(
            set.estimate(),
            Err(RigidError::MismatchedInputLengths(3, 4))
        ));
    }
}
