//! Feature Store - loads the encoded customer dataset
//!
//! The dataset is a CSV with a header row, strictly numeric cells, and a
//! binary label column. It is loaded once at start-up, held in memory, and
//! never mutated. Load failures are unrecoverable by design.

pub mod schema;
pub mod vector;

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use thiserror::Error;

pub use schema::FeatureSchema;
pub use vector::FeatureVector;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("dataset not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("dataset has no data rows: {0}")]
    Empty(PathBuf),

    #[error("label column '{0}' not present in dataset header")]
    MissingLabelColumn(String),

    #[error("dataset header has no feature columns")]
    NoFeatures,

    #[error("line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("line {line}, column '{column}': invalid numeric value '{value}'")]
    BadValue {
        line: usize,
        column: String,
        value: String,
    },
}

/// In-memory, read-only view of the encoded dataset.
#[derive(Debug)]
pub struct FeatureStore {
    schema: FeatureSchema,
    matrix: Array2<f64>,
    labels: Vec<f64>,
    source: PathBuf,
}

impl FeatureStore {
    /// Load the dataset from `path`, splitting off `label_column` as the
    /// training label. Fails fast on a missing file, missing label column,
    /// or any malformed cell.
    pub fn load(path: &Path, label_column: &str) -> Result<Self, StoreError> {
        if !path.exists() {
            return Err(StoreError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let mut lines = content.lines().enumerate();

        let header = loop {
            match lines.next() {
                Some((_, line)) if line.trim().is_empty() => continue,
                Some((_, line)) => break line,
                None => return Err(StoreError::Empty(path.to_path_buf())),
            }
        };

        let columns: Vec<String> = header.split(',').map(|c| c.trim().to_string()).collect();
        let label_idx = columns
            .iter()
            .position(|c| c == label_column)
            .ok_or_else(|| StoreError::MissingLabelColumn(label_column.to_string()))?;

        let feature_names: Vec<String> = columns
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != label_idx)
            .map(|(_, c)| c.clone())
            .collect();
        if feature_names.is_empty() {
            return Err(StoreError::NoFeatures);
        }

        let mut flat: Vec<f64> = Vec::new();
        let mut labels: Vec<f64> = Vec::new();

        for (line_no, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let cells: Vec<&str> = line.split(',').map(|c| c.trim()).collect();
            if cells.len() != columns.len() {
                return Err(StoreError::ColumnCount {
                    line: line_no + 1,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            for (col, cell) in cells.iter().enumerate() {
                let value: f64 = cell.parse().ok().filter(|v: &f64| v.is_finite()).ok_or_else(|| {
                    StoreError::BadValue {
                        line: line_no + 1,
                        column: columns[col].clone(),
                        value: cell.to_string(),
                    }
                })?;
                if col == label_idx {
                    labels.push(value);
                } else {
                    flat.push(value);
                }
            }
        }

        if labels.is_empty() {
            return Err(StoreError::Empty(path.to_path_buf()));
        }

        let n_rows = labels.len();
        let n_features = feature_names.len();
        let matrix = Array2::from_shape_vec((n_rows, n_features), flat)
            .map_err(|_| StoreError::Empty(path.to_path_buf()))?;

        log::debug!(
            "Feature store: {} rows, {} features, layout hash {:08x}",
            n_rows,
            n_features,
            schema::compute_layout_hash(&feature_names)
        );

        Ok(Self {
            schema: FeatureSchema::new(feature_names),
            matrix,
            labels,
            source: path.to_path_buf(),
        })
    }

    /// Number of customer rows
    pub fn len(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Full feature matrix (rows x features), for training
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    /// Historical churn labels, one per row
    pub fn labels(&self) -> &[f64] {
        &self.labels
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Indexed row access. Returns `None` when `index` is out of range.
    pub fn row(&self, index: usize) -> Option<FeatureVector> {
        if index >= self.len() {
            return None;
        }
        let values = self.matrix.row(index).to_vec();
        Some(FeatureVector::new(self.schema.hash(), values))
    }
}
