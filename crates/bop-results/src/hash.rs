//! Content-based hashing for run IDs.

use crate::ResultsResult;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 over the serialized project and the solver version, hex encoded.
///
/// A project that cannot be serialized has no identity, so the error is
/// returned rather than hashing an empty string.
pub fn compute_run_id<T: Serialize>(project: &T, solver_version: &str) -> ResultsResult<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(project)?);
    hasher.update(solver_version.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ResultsError;
    use serde::ser::{Error as _, Serializer};
    use std::collections::HashMap;

    #[derive(Serialize)]
    struct Demo {
        name: &'static str,
        end_time: f64,
    }

    #[test]
    fn hash_stability() {
        let demo = Demo {
            name: "heater",
            end_time: 600.0,
        };
        let hash1 = compute_run_id(&demo, "v1").unwrap();
        let hash2 = compute_run_id(&demo, "v1").unwrap();
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = Demo {
            name: "heater",
            end_time: 600.0,
        };
        let b = Demo {
            name: "heater",
            end_time: 900.0,
        };
        let id = |d: &Demo, v| compute_run_id(d, v).unwrap();
        assert_ne!(id(&a, "v1"), id(&b, "v1"));
        assert_ne!(id(&a, "v1"), id(&a, "v2"));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("refused"))
        }
    }

    #[test]
    fn serialization_failure_is_an_error() {
        assert!(matches!(
            compute_run_id(&Unserializable, "v1"),
            Err(ResultsError::Json(_))
        ));

        // JSON object keys must be strings.
        let mut tuple_keys = HashMap::new();
        tuple_keys.insert((1, 2), "pair");
        assert!(compute_run_id(&tuple_keys, "v1").is_err());
    }
}
