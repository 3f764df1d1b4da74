//! Run identifiers and request fingerprints.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Generates a time-ordered identifier for an analysis run.
#[must_use]
pub fn generate_run_id() -> Uuid {
    Uuid::now_v7()
}

/// Builds a stable fingerprint from ordered components.
///
/// The same components in the same order always give the same key, so two
/// requests for identical period windows can be recognised as duplicates.
#[must_use]
pub fn fingerprint(components: &[&str]) -> String {
    let combined = components.join(":");
    let mut hasher = Sha256::new();
    hasher.update(combined.as_bytes());
    let result = hasher.finalize();
    format!("batch:{}", hex::encode(&result[..16]))
}
