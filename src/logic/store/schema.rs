//! Feature Schema - ordered feature names with a layout hash
//!
//! The schema is derived from the dataset header at load time and is fixed
//! for the process lifetime. The CRC32 hash of the ordered names is used to
//! detect store/model layout drift.

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Ordered feature names plus a CRC32 hash of the layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSchema {
    names: Vec<String>,
    hash: u32,
}

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        let hash = compute_layout_hash(&names);
        Self { names, hash }
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Feature names in vector order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// CRC32 hash of the ordered layout
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Get feature index by name (O(n) but features are few)
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Get feature name by index
    pub fn feature_name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(|s| s.as_str())
    }
}

/// Compute the CRC32 hash of an ordered feature layout
pub fn compute_layout_hash(names: &[String]) -> u32 {
    let mut hasher = Hasher::new();
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }
    hasher.finalize()
}
