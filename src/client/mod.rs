pub mod http;

pub use http::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{StatusResponse, StreamResponse, TrainResponse, TrainingRequest};

/// The backend training service as seen by the dashboard.
///
/// Implementations return `Err` for transport failures and non-2xx
/// responses. `train` also returns `Err` when the body reports a status
/// other than `"success"`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrainingService: Send + Sync {
    async fn status(&self) -> Result<StatusResponse>;
    async fn stream(&self) -> Result<StreamResponse>;
    async fn train(&self, request: &TrainingRequest) -> Result<TrainResponse>;
}
