use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::types::{HistoryPlot, StreamSnapshot};

const LINE_TENSION: f64 = 0.3;
const PRICE_COLOR: &str = "#38bdf8";
const PROBABILITY_COLOR: &str = "#facc15";

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<&'static str>,
    pub show_ticks: bool,
    pub begin_at_zero: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl AxisConfig {
    fn titled(title: &'static str) -> Self {
        Self {
            title: Some(title),
            show_ticks: true,
            ..Self::default()
        }
    }
}

/// Fixed at construction; updates only ever touch labels and datasets.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartConfig {
    pub responsive: bool,
    pub animation: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legend_position: Option<&'static str>,
    pub x: AxisConfig,
    pub y: AxisConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub label: String,
    pub data: Vec<Option<f64>>,
    pub tension: f64,
    pub fill: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_color: Option<&'static str>,
}

impl Dataset {
    fn history_line(label: String, data: Vec<Option<f64>>) -> Self {
        Self {
            label,
            data,
            tension: LINE_TENSION,
            fill: false,
            border_width: Some(2),
            border_color: None,
        }
    }

    fn series(label: &str, color: &'static str) -> Self {
        Self {
            label: label.to_string(),
            data: Vec::new(),
            tension: LINE_TENSION,
            fill: false,
            border_width: None,
            border_color: Some(color),
        }
    }
}

/// Data and configuration of one line chart on the page. `revision` counts
/// redraws so the page can tell when a chart changed.
#[derive(Debug, Clone, Serialize)]
pub struct LineChart {
    pub config: ChartConfig,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub revision: u64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl LineChart {
    fn new(config: ChartConfig, datasets: Vec<Dataset>) -> Self {
        Self {
            config,
            labels: Vec::new(),
            datasets,
            revision: 0,
            updated_at: None,
        }
    }

    /// One line per metric against epoch number.
    pub fn history() -> Self {
        Self::new(
            ChartConfig {
                responsive: true,
                animation: true,
                legend_position: Some("bottom"),
                x: AxisConfig::titled("Epoch"),
                y: AxisConfig {
                    begin_at_zero: true,
                    show_ticks: true,
                    ..AxisConfig::default()
                },
            },
            Vec::new(),
        )
    }

    pub fn price() -> Self {
        Self::new(
            ChartConfig {
                responsive: true,
                animation: false,
                legend_position: None,
                x: AxisConfig::default(),
                y: AxisConfig::titled("Price (USD)"),
            },
            vec![Dataset::series("Close price", PRICE_COLOR)],
        )
    }

    pub fn probability() -> Self {
        Self::new(
            ChartConfig {
                responsive: true,
                animation: false,
                legend_position: None,
                x: AxisConfig::titled("Time"),
                y: AxisConfig {
                    min: Some(0.0),
                    max: Some(1.0),
                    ..AxisConfig::titled("Probability")
                },
            },
            vec![Dataset::series("Long probability", PROBABILITY_COLOR)],
        )
    }

    /// Replaces labels and every dataset with the given plot.
    pub fn set_history(&mut self, plot: &HistoryPlot) {
        self.labels = plot.epochs.iter().map(label_text).collect();
        self.datasets = plot
            .metrics
            .iter()
            .map(|(metric, values)| {
                Dataset::history_line(metric.clone(), values.iter().map(data_point).collect())
            })
            .collect();
        self.redraw();
    }

    /// Replaces labels and the data of the single series.
    pub fn set_series(&mut self, labels: Vec<String>, data: Vec<Option<f64>>) {
        self.labels = labels;
        if let Some(dataset) = self.datasets.first_mut() {
            dataset.data = data;
        }
        self.redraw();
    }

    pub fn point_count(&self) -> usize {
        self.labels.len()
    }

    fn redraw(&mut self) {
        self.revision += 1;
        self.updated_at = Some(Utc::now());
    }
}

/// Price and probability charts share the timestamp axis of one snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct StreamCharts {
    pub price: LineChart,
    pub probability: LineChart,
}

impl StreamCharts {
    pub fn new() -> Self {
        Self {
            price: LineChart::price(),
            probability: LineChart::probability(),
        }
    }

    /// No-op without a snapshot so a poll with no stream data keeps the
    /// previous window on screen.
    pub fn update(&mut self, snapshot: Option<&StreamSnapshot>) {
        let Some(snapshot) = snapshot else {
            return;
        };
        self.price
            .set_series(snapshot.timestamps.clone(), snapshot.prices.clone());
        self.probability
            .set_series(snapshot.timestamps.clone(), snapshot.probabilities.clone());
    }
}

impl Default for StreamCharts {
    fn default() -> Self {
        Self::new()
    }
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn data_point(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
