use serde::Serialize;

use super::charts::{LineChart, StreamCharts};
use super::status::StatusBanner;
use super::table::MetricsTable;
use crate::types::{HistoryPlot, InitialState, MetricsPayload, StreamSnapshot};

/// Every widget on the dashboard page.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub banner: StatusBanner,
    pub metrics: MetricsTable,
    pub history: LineChart,
    pub stream: StreamCharts,
}

impl DashboardView {
    pub fn new() -> Self {
        Self {
            banner: StatusBanner::default(),
            metrics: MetricsTable::default(),
            history: LineChart::history(),
            stream: StreamCharts::new(),
        }
    }

    pub fn apply_initial_state(&mut self, initial: InitialState) {
        self.metrics.render(initial.metrics.as_ref());
        let plot = initial
            .history_plot
            .map(|h| h.normalize())
            .unwrap_or_default();
        self.history.set_history(&plot);
    }

    pub fn apply_metrics(&mut self, metrics: &MetricsPayload) {
        self.metrics.render(Some(metrics));
    }

    pub fn apply_history(&mut self, plot: &HistoryPlot) {
        self.history.set_history(plot);
    }

    pub fn apply_stream(&mut self, snapshot: Option<&StreamSnapshot>) {
        self.stream.update(snapshot);
    }
}

impl Default for DashboardView {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only copy of the view handed to the page and the JSON API.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    #[serde(flatten)]
    pub view: DashboardView,
    pub trigger_enabled: bool,
}
