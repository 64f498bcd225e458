use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

use super::TrainingService;
use crate::error::{DashboardError, Result};
use crate::types::{StatusResponse, StreamResponse, TrainResponse, TrainingRequest};

const ROUTE_PREFIX: &str = "day_trading";

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, ROUTE_PREFIX, name)
    }

    async fn get_json<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let url = self.endpoint(name);
        let resp = self.client.get(&url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            debug!("GET {} -> {}", url, status);
            return Err(DashboardError::HttpStatus {
                status: status.as_u16(),
                message: None,
            });
        }
        let body = resp.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl TrainingService for BackendClient {
    async fn status(&self) -> Result<StatusResponse> {
        self.get_json("status").await
    }

    async fn stream(&self) -> Result<StreamResponse> {
        self.get_json("stream").await
    }

    async fn train(&self, request: &TrainingRequest) -> Result<TrainResponse> {
        let url = self.endpoint("train");
        let resp = self.client.post(&url).json(request).send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;

        if !status.is_success() {
            // Error bodies still carry a message when the backend caught the failure.
            let message = serde_json::from_slice::<TrainResponse>(&body)
                .ok()
                .and_then(|r| r.message);
            return Err(DashboardError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: TrainResponse = serde_json::from_slice(&body)?;
        if !parsed.is_success() {
            return Err(DashboardError::Rejected {
                status: parsed.status,
                message: parsed.message,
            });
        }
        Ok(parsed)
    }
}
