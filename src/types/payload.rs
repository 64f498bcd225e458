use serde::Serialize;
use std::collections::BTreeMap;

/// Model discriminator injected into every training request.
pub const MODEL_ID: &str = "day_trading";

pub const FIELD_MODEL: &str = "model";
pub const FIELD_FORCE_DOWNLOAD: &str = "force_download";
pub const FIELD_LOOKBACK_DAYS: &str = "lookback_days";
pub const FIELD_EPOCHS: &str = "epochs";
pub const FIELD_THRESHOLD: &str = "threshold";

/// A coerced form value. Unparseable numbers are kept as NaN and go out on
/// the wire as `null`; the backend is the one that rejects them.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum FormValue {
    Text(String),
    /// `None` is an integer field whose input had no leading digits.
    Integer(Option<i64>),
    Float(f64),
    Flag(bool),
}

/// Body of `POST /day_trading/train`.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct TrainingRequest {
    fields: BTreeMap<String, FormValue>,
}

impl TrainingRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FormValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }
}
