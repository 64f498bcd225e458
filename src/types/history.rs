use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

const EPOCH_KEY: &str = "epoch";

/// Chart-ready training history: epoch labels plus one value series per metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryPlot {
    #[serde(default)]
    pub epochs: Vec<Value>,
    #[serde(default)]
    pub metrics: BTreeMap<String, Vec<Value>>,
}

/// History as the backend sends it. `/status` returns the plot shape,
/// `/train` returns raw per-epoch records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HistoryPayload {
    Records(Vec<Map<String, Value>>),
    Plot(HistoryPlot),
}

impl HistoryPayload {
    pub fn normalize(self) -> HistoryPlot {
        match self {
            HistoryPayload::Plot(plot) => plot,
            HistoryPayload::Records(records) => records_to_plot(&records),
        }
    }
}

/// Metric names come from the first record; later records missing a
/// metric leave a `null` gap in that series.
fn records_to_plot(records: &[Map<String, Value>]) -> HistoryPlot {
    let Some(first) = records.first() else {
        return HistoryPlot::default();
    };

    let epochs = records
        .iter()
        .map(|r| r.get(EPOCH_KEY).cloned().unwrap_or(Value::Null))
        .collect();

    let metrics = first
        .keys()
        .filter(|k| k.as_str() != EPOCH_KEY)
        .map(|key| {
            let series = records
                .iter()
                .map(|r| r.get(key).cloned().unwrap_or(Value::Null))
                .collect();
            (key.clone(), series)
        })
        .collect();

    HistoryPlot { epochs, metrics }
}
