use serde::{Deserialize, Serialize};

/// Latest live inference window. Each poll replaces the previous snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamSnapshot {
    #[serde(default)]
    pub timestamps: Vec<String>,
    #[serde(default)]
    pub prices: Vec<Option<f64>>,
    #[serde(default)]
    pub probabilities: Vec<Option<f64>>,
}
