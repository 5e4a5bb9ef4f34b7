use serde::{Deserialize, Serialize};

/// One feature's signed contribution to a single prediction, on the
/// model's raw (log-odds) scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribution {
    pub feature: String,
    pub value: f64,
}
