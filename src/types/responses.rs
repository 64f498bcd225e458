use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{HistoryPayload, StreamSnapshot};

pub type EvaluationMetrics = Map<String, Value>;

pub const TRAIN_SUCCESS: &str = "success";

/// The `metrics` document the backend stores after training.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsPayload {
    #[serde(default)]
    pub evaluation: Option<EvaluationMetrics>,
}

impl MetricsPayload {
    pub fn from_evaluation(evaluation: Option<EvaluationMetrics>) -> Self {
        Self { evaluation }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub metrics: Option<MetricsPayload>,
    #[serde(default)]
    pub history_plot: Option<HistoryPayload>,
    #[serde(default)]
    pub model_config: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamResponse {
    #[serde(default)]
    pub stream: Option<StreamSnapshot>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub evaluation: Option<EvaluationMetrics>,
    #[serde(default)]
    pub history: Option<HistoryPayload>,
    #[serde(default)]
    pub report: Option<Value>,
}

impl TrainResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some(TRAIN_SUCCESS)
    }
}

/// Values the hosting page provides before the first network round-trip.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InitialState {
    #[serde(default)]
    pub metrics: Option<MetricsPayload>,
    #[serde(default)]
    pub history_plot: Option<HistoryPayload>,
}
