use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::form::serialize_form;
use super::status::Severity;
use super::view::{DashboardSnapshot, DashboardView};
use crate::client::TrainingService;
use crate::error::{DashboardError, Result};
use crate::types::{
    HistoryPlot, InitialState, MetricsPayload, TrainResponse, FIELD_EPOCHS, FIELD_FORCE_DOWNLOAD,
    FIELD_LOOKBACK_DAYS,
};

pub const TRAINING_IN_PROGRESS: &str =
    "Training in progress... this may take a couple of minutes depending on lookback size.";
pub const TRAINING_COMPLETED: &str = "Training completed successfully!";

/// Owns the dashboard widgets and the trigger control.
///
/// Widget locks are only held for synchronous updates, never across a
/// request. Polls and training therefore interleave at request boundaries
/// and whichever response lands last is what the page shows.
pub struct DashboardController {
    service: Arc<dyn TrainingService>,
    view: Arc<RwLock<DashboardView>>,
    trigger_enabled: AtomicBool,
    clear_timer: Mutex<Option<JoinHandle<()>>>,
    status_clear_delay: Duration,
}

impl DashboardController {
    pub fn new(service: Arc<dyn TrainingService>, status_clear_delay: Duration) -> Self {
        Self {
            service,
            view: Arc::new(RwLock::new(DashboardView::new())),
            trigger_enabled: AtomicBool::new(true),
            clear_timer: Mutex::new(None),
            status_clear_delay,
        }
    }

    pub async fn apply_initial_state(&self, initial: InitialState) {
        self.view.write().await.apply_initial_state(initial);
    }

    pub fn is_trigger_enabled(&self) -> bool {
        self.trigger_enabled.load(Ordering::Acquire)
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        DashboardSnapshot {
            view: self.view.read().await.clone(),
            trigger_enabled: self.is_trigger_enabled(),
        }
    }

    pub async fn show_status(&self, message: &str, severity: Severity) {
        self.view.write().await.banner.show(message, severity);
    }

    /// Arms the banner auto-clear, replacing any timer already armed.
    /// Showing a message does not disarm it.
    pub fn schedule_status_clear(&self) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let view = Arc::clone(&self.view);
        let delay = self.status_clear_delay;
        let task = handle.spawn(async move {
            tokio::time::sleep(delay).await;
            view.write().await.banner.clear();
        });

        let mut slot = match self.clear_timer.lock() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = slot.replace(task) {
            previous.abort();
        }
    }

    /// Fetches `/status` and refreshes the table and history chart.
    /// Failures are dropped; the next tick tries again.
    pub async fn poll_status(&self) -> bool {
        match self.service.status().await {
            Ok(resp) => {
                let history: Option<HistoryPlot> = resp.history_plot.map(|h| h.normalize());
                let mut view = self.view.write().await;
                if let Some(metrics) = &resp.metrics {
                    view.apply_metrics(metrics);
                }
                if let Some(plot) = &history {
                    view.apply_history(plot);
                }
                true
            }
            Err(e) => {
                debug!("Status poll skipped: {}", e);
                false
            }
        }
    }

    /// Fetches `/stream` and refreshes the price and probability charts.
    pub async fn poll_stream(&self) -> bool {
        match self.service.stream().await {
            Ok(resp) => {
                self.view.write().await.apply_stream(resp.stream.as_ref());
                true
            }
            Err(e) => {
                debug!("Stream poll skipped: {}", e);
                false
            }
        }
    }

    /// Disables the trigger and shows the in-progress banner. Fails when a
    /// run is already outstanding.
    pub async fn begin_training(self: &Arc<Self>) -> Result<TrainCycle> {
        if self
            .trigger_enabled
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Training request ignored: a run is already in progress");
            return Err(DashboardError::TrainingInProgress);
        }
        let cycle = TrainCycle {
            controller: Arc::clone(self),
        };
        self.show_status(TRAINING_IN_PROGRESS, Severity::Info).await;
        Ok(cycle)
    }

    /// Full train action: guard, request, render, cleanup.
    pub async fn train<K, V>(self: &Arc<Self>, entries: &[(K, V)]) -> Result<TrainResponse>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.begin_training().await?.run(entries).await
    }
}

/// One Training state. Dropping it returns the controller to Idle: the
/// trigger is re-enabled and the banner auto-clear is armed, whatever the
/// outcome and even if the run is cancelled or panics.
pub struct TrainCycle {
    controller: Arc<DashboardController>,
}

impl TrainCycle {
    pub async fn run<K, V>(self, entries: &[(K, V)]) -> Result<TrainResponse>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let controller = &self.controller;
        let request = serialize_form(entries);
        let field = |name: &str| {
            request
                .get(name)
                .map(ToString::to_string)
                .unwrap_or_else(|| "-".to_string())
        };
        info!(
            "Submitting training request: symbol={} lookback_days={} epochs={} force_download={}",
            field("symbol"),
            field(FIELD_LOOKBACK_DAYS),
            field(FIELD_EPOCHS),
            field(FIELD_FORCE_DOWNLOAD)
        );

        match controller.service.train(&request).await {
            Ok(resp) => {
                let plot = resp
                    .history
                    .clone()
                    .map(|h| h.normalize())
                    .unwrap_or_default();
                {
                    let mut view = controller.view.write().await;
                    view.apply_metrics(&MetricsPayload::from_evaluation(resp.evaluation.clone()));
                    view.apply_history(&plot);
                    view.banner.show(TRAINING_COMPLETED, Severity::Success);
                }
                info!("Training completed: {} epochs charted", plot.epochs.len());
                controller.poll_stream().await;
                Ok(resp)
            }
            Err(e) => {
                error!("Training failed: {}", e);
                controller
                    .show_status(&e.user_message(), Severity::Danger)
                    .await;
                Err(e)
            }
        }
    }
}

impl Drop for TrainCycle {
    fn drop(&mut self) {
        self.controller.trigger_enabled.store(true, Ordering::Release);
        self.controller.schedule_status_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockTrainingService;
    use crate::types::{StatusResponse, StreamResponse, StreamSnapshot};
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio_test::{assert_err, assert_ok};

    const CLEAR_DELAY: Duration = Duration::from_secs(5);

    fn controller(mock: MockTrainingService) -> Arc<DashboardController> {
        Arc::new(DashboardController::new(Arc::new(mock), CLEAR_DELAY))
    }

    fn success_response() -> TrainResponse {
        serde_json::from_value(json!({
            "status": "success",
            "evaluation": {"acc": "0.8"},
            "history": [{"epoch": 1, "acc": 0.8}]
        }))
        .unwrap()
    }

    fn stream_response() -> StreamResponse {
        StreamResponse {
            stream: Some(StreamSnapshot {
                timestamps: vec!["10:00".into(), "10:01".into()],
                prices: vec![Some(190.0), Some(190.5)],
                probabilities: vec![Some(0.48), Some(0.52)],
            }),
        }
    }

    fn form() -> Vec<(String, String)> {
        vec![
            ("symbol".to_string(), "AAPL".to_string()),
            ("epochs".to_string(), "1".to_string()),
        ]
    }

    #[tokio::test(start_paused = true)]
    async fn test_train_success_end_to_end() {
        let mut mock = MockTrainingService::new();
        mock.expect_train()
            .withf(|req| {
                let body = serde_json::to_value(req).unwrap();
                body["model"] == "day_trading"
                    && body["epochs"] == 1
                    && body["force_download"] == false
            })
            .times(1)
            .returning(|_| Ok(success_response()));
        mock.expect_stream()
            .times(1)
            .returning(|| Ok(stream_response()));
        let controller = controller(mock);

        let resp = assert_ok!(controller.train(&form()).await);
        assert!(resp.is_success());

        let snap = controller.snapshot().await;
        assert!(snap.trigger_enabled);
        assert!(snap.view.metrics.visible);
        assert_eq!(snap.view.metrics.rows.len(), 1);
        assert_eq!(snap.view.metrics.rows[0].name, "acc");
        assert_eq!(snap.view.metrics.rows[0].value, "0.8000");
        assert_eq!(snap.view.history.labels, vec!["1"]);
        assert_eq!(snap.view.history.datasets.len(), 1);
        assert_eq!(snap.view.history.datasets[0].data, vec![Some(0.8)]);
        assert_eq!(snap.view.stream.price.point_count(), 2);
        assert!(snap.view.banner.visible);
        assert_eq!(snap.view.banner.severity, Severity::Success);
        assert_eq!(snap.view.banner.message, TRAINING_COMPLETED);

        tokio::time::sleep(Duration::from_secs(4)).await;
        assert!(controller.snapshot().await.view.banner.visible);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!controller.snapshot().await.view.banner.visible);
    }

    #[tokio::test(start_paused = true)]
    async fn test_train_http_failure_leaves_widgets_untouched() {
        let mut mock = MockTrainingService::new();
        mock.expect_train().times(1).returning(|_| {
            Err(DashboardError::HttpStatus {
                status: 500,
                message: None,
            })
        });
        mock.expect_stream().never();
        let controller = controller(mock);

        let before = controller.snapshot().await;
        let err = assert_err!(controller.train(&form()).await);
        assert!(matches!(err, DashboardError::HttpStatus { status: 500, .. }));

        let snap = controller.snapshot().await;
        assert!(snap.trigger_enabled);
        assert_eq!(snap.view.banner.severity, Severity::Danger);
        assert_eq!(snap.view.banner.message, "Training failed");
        assert_eq!(snap.view.history.revision, before.view.history.revision);
        assert!(!snap.view.metrics.visible);
        assert_eq!(snap.view.stream.price.revision, 0);

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(!controller.snapshot().await.view.banner.visible);
    }

    #[tokio::test]
    async fn test_train_rejection_surfaces_server_message() {
        let mut mock = MockTrainingService::new();
        mock.expect_train().returning(|_| {
            Err(DashboardError::Rejected {
                status: Some("error".to_string()),
                message: Some("Not enough rows after feature engineering".to_string()),
            })
        });
        let controller = controller(mock);

        assert_err!(controller.train(&form()).await);

        let snap = controller.snapshot().await;
        assert_eq!(
            snap.view.banner.message,
            "Not enough rows after feature engineering"
        );
        assert_eq!(snap.view.banner.css_class(), "alert alert-danger");
    }

    #[tokio::test]
    async fn test_second_submit_rejected_while_training() {
        let mut mock = MockTrainingService::new();
        mock.expect_train().never();
        let controller = controller(mock);

        let cycle = assert_ok!(controller.begin_training().await);
        assert!(!controller.is_trigger_enabled());
        let banner = controller.snapshot().await.view.banner;
        assert_eq!(banner.message, TRAINING_IN_PROGRESS);
        assert_eq!(banner.severity, Severity::Info);

        let err = assert_err!(controller.train(&form()).await);
        assert!(matches!(err, DashboardError::TrainingInProgress));

        drop(cycle);
        assert!(controller.is_trigger_enabled());
    }

    #[tokio::test]
    async fn test_stream_failure_after_training_is_swallowed() {
        let mut mock = MockTrainingService::new();
        mock.expect_train().returning(|_| Ok(success_response()));
        mock.expect_stream().returning(|| {
            Err(DashboardError::HttpStatus {
                status: 404,
                message: None,
            })
        });
        let controller = controller(mock);

        assert_ok!(controller.train(&form()).await);
        let banner = controller.snapshot().await.view.banner;
        assert_eq!(banner.severity, Severity::Success);
    }

    #[tokio::test]
    async fn test_success_without_history_empties_chart() {
        let mut mock = MockTrainingService::new();
        mock.expect_status().returning(|| {
            Ok(serde_json::from_value::<StatusResponse>(json!({
                "history_plot": {"epochs": [1, 2], "metrics": {"loss": [0.5, 0.4]}}
            }))
            .unwrap())
        });
        mock.expect_train().returning(|_| {
            Ok(serde_json::from_value(json!({"status": "success"})).unwrap())
        });
        mock.expect_stream().returning(|| Ok(StreamResponse::default()));
        let controller = controller(mock);

        assert!(controller.poll_status().await);
        assert_eq!(controller.snapshot().await.view.history.labels.len(), 2);

        assert_ok!(controller.train(&form()).await);
        let snap = controller.snapshot().await;
        assert!(snap.view.history.labels.is_empty());
        assert!(snap.view.history.datasets.is_empty());
        assert!(!snap.view.metrics.visible);
    }

    #[tokio::test]
    async fn test_poll_status_updates_table_and_chart() {
        let mut mock = MockTrainingService::new();
        mock.expect_status().returning(|| {
            Ok(serde_json::from_value::<StatusResponse>(json!({
                "status": "ok",
                "metrics": {"evaluation": {"accuracy": 0.55, "f1": 0.5}},
                "history_plot": {"epochs": [1], "metrics": {"loss": [0.7]}}
            }))
            .unwrap())
        });
        let controller = controller(mock);

        assert!(controller.poll_status().await);

        let snap = controller.snapshot().await;
        assert_eq!(snap.view.metrics.rows.len(), 2);
        assert_eq!(snap.view.history.datasets[0].label, "loss");
    }

    #[tokio::test]
    async fn test_poll_status_without_fields_keeps_widgets() {
        let mut mock = MockTrainingService::new();
        mock.expect_status()
            .returning(|| Ok(StatusResponse::default()));
        let controller = controller(mock);
        controller
            .apply_initial_state(
                serde_json::from_value(json!({
                    "metrics": {"evaluation": {"acc": 0.9}},
                    "history_plot": [{"epoch": 1, "acc": 0.9}]
                }))
                .unwrap(),
            )
            .await;

        assert!(controller.poll_status().await);

        let snap = controller.snapshot().await;
        assert!(snap.view.metrics.visible);
        assert_eq!(snap.view.history.revision, 1);
    }

    #[tokio::test]
    async fn test_failed_polls_are_silent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let status_calls = Arc::clone(&calls);
        let mut mock = MockTrainingService::new();
        mock.expect_status().returning(move || {
            status_calls.fetch_add(1, Ordering::SeqCst);
            Err(DashboardError::HttpStatus {
                status: 503,
                message: None,
            })
        });
        mock.expect_stream().returning(|| {
            Err(DashboardError::HttpStatus {
                status: 404,
                message: None,
            })
        });
        let controller = controller(mock);

        assert!(!controller.poll_status().await);
        assert!(!controller.poll_stream().await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let snap = controller.snapshot().await;
        assert!(!snap.view.banner.visible);
        assert_eq!(snap.view.stream.price.revision, 0);
    }

    #[tokio::test]
    async fn test_stream_without_snapshot_keeps_previous_window() {
        let responses = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&responses);
        let mut mock = MockTrainingService::new();
        mock.expect_stream().returning(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(stream_response())
            } else {
                Ok(StreamResponse::default())
            }
        });
        let controller = controller(mock);

        assert!(controller.poll_stream().await);
        assert!(controller.poll_stream().await);

        let snap = controller.snapshot().await;
        assert_eq!(snap.view.stream.price.labels, vec!["10:00", "10:01"]);
        assert_eq!(snap.view.stream.probability.revision, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearming_clear_replaces_previous_timer() {
        let controller = controller(MockTrainingService::new());

        controller.show_status("first", Severity::Info).await;
        controller.schedule_status_clear();
        tokio::time::sleep(Duration::from_secs(3)).await;

        controller.show_status("second", Severity::Success).await;
        controller.schedule_status_clear();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(controller.snapshot().await.view.banner.visible);

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!(!controller.snapshot().await.view.banner.visible);
    }
}
