//! Feature Vector - one customer's encoded row
//!
//! Carries the schema hash alongside the values so downstream consumers can
//! check which layout the vector was cut from.

use serde::{Deserialize, Serialize};

use super::schema::FeatureSchema;

/// One row of the encoded dataset: ordered values plus the layout hash of
/// the schema they were read under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureVector {
    schema_hash: u32,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(schema_hash: u32, values: Vec<f64>) -> Self {
        Self { schema_hash, values }
    }

    pub fn schema_hash(&self) -> u32 {
        self.schema_hash
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get value by index
    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    /// Get value by feature name, resolved through the schema
    pub fn get_by_name(&self, schema: &FeatureSchema, name: &str) -> Option<f64> {
        schema.feature_index(name).and_then(|i| self.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_by_name() {
        let schema = FeatureSchema::new(vec!["tenure".to_string(), "contract".to_string()]);
        let vector = FeatureVector::new(schema.hash(), vec![12.0, 1.0]);

        assert_eq!(vector.get_by_name(&schema, "tenure"), Some(12.0));
        assert_eq!(vector.get_by_name(&schema, "contract"), Some(1.0));
        assert_eq!(vector.get_by_name(&schema, "nonexistent"), None);
    }

    #[test]
    fn test_get_out_of_range() {
        let vector = FeatureVector::new(0, vec![1.0]);
        assert_eq!(vector.get(0), Some(1.0));
        assert_eq!(vector.get(1), None);
    }
}
