use serde::Serialize;
use serde_json::Value;

use super::form::parse_float_prefix;
use crate::types::MetricsPayload;

pub const MISSING_VALUE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricRow {
    pub name: String,
    pub value: String,
}

/// Evaluation metrics table. Hidden until a payload with an `evaluation`
/// mapping arrives.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MetricsTable {
    pub visible: bool,
    pub rows: Vec<MetricRow>,
}

impl MetricsTable {
    /// Replaces every row. Without an evaluation mapping the table is hidden
    /// and the old rows are left untouched.
    pub fn render(&mut self, metrics: Option<&MetricsPayload>) {
        let Some(evaluation) = metrics.and_then(|m| m.evaluation.as_ref()) else {
            self.visible = false;
            return;
        };

        self.visible = true;
        self.rows = evaluation
            .iter()
            .map(|(name, value)| MetricRow {
                name: name.clone(),
                value: format_metric(value),
            })
            .collect();
    }
}

/// Four decimals for anything that reads as a finite number, `N/A` otherwise.
/// Numeric strings such as `"0.8"` count as numbers.
pub fn format_metric(value: &Value) -> String {
    let parsed = match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_float_prefix(s),
        _ => f64::NAN,
    };
    if parsed.is_finite() {
        fixed_4(parsed)
    } else {
        MISSING_VALUE.to_string()
    }
}

/// Four-decimal rendering that breaks exact ties away from zero, so
/// `0.03125` reads `0.0313`. `{:.4}` alone would round the tie to even.
fn fixed_4(value: f64) -> String {
    let doubled = (value * 20_000.0).round();
    let is_tie = doubled % 2.0 != 0.0 && value.mul_add(20_000.0, -doubled) == 0.0;
    if is_tie {
        format!("{:.4}", (doubled + doubled.signum()) / 20_000.0)
    } else {
        format!("{:.4}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> MetricsPayload {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_render_rows() {
        let mut table = MetricsTable::default();
        table.render(Some(&payload(json!({
            "evaluation": {"accuracy": 0.61234, "f1": "0.8", "support": null}
        }))));

        assert!(table.visible);
        assert_eq!(
            table.rows,
            vec![
                MetricRow { name: "accuracy".into(), value: "0.6123".into() },
                MetricRow { name: "f1".into(), value: "0.8000".into() },
                MetricRow { name: "support".into(), value: "N/A".into() },
            ]
        );
    }

    #[test]
    fn test_render_is_idempotent() {
        let metrics = payload(json!({"evaluation": {"precision": 0.5, "recall": 0.25}}));
        let mut table = MetricsTable::default();

        table.render(Some(&metrics));
        let first = table.rows.clone();
        table.render(Some(&metrics));

        assert_eq!(table.rows, first);
        assert_eq!(table.rows.len(), 2);
    }

    #[test]
    fn test_absent_evaluation_hides_table() {
        let mut table = MetricsTable::default();
        table.render(Some(&payload(json!({"evaluation": {"acc": 1}}))));
        assert!(table.visible);

        table.render(None);
        assert!(!table.visible);

        table.render(Some(&MetricsPayload::default()));
        assert!(!table.visible);
    }

    #[test]
    fn test_new_render_drops_old_rows() {
        let mut table = MetricsTable::default();
        table.render(Some(&payload(json!({"evaluation": {"a": 1, "b": 2}}))));
        table.render(Some(&payload(json!({"evaluation": {"c": 3}}))));

        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].name, "c");
        assert_eq!(table.rows[0].value, "3.0000");
    }

    #[test]
    fn test_format_metric_non_numeric() {
        assert_eq!(format_metric(&json!(true)), "N/A");
        assert_eq!(format_metric(&json!("n/a")), "N/A");
        assert_eq!(format_metric(&json!({"nested": 1})), "N/A");
        assert_eq!(format_metric(&json!(-0.12345)), "-0.1235");
    }

    #[test]
    fn test_format_metric_rounds_ties_away_from_zero() {
        assert_eq!(format_metric(&json!(0.03125)), "0.0313");
        assert_eq!(format_metric(&json!(-0.03125)), "-0.0313");
        assert_eq!(format_metric(&json!("0.00005")), "0.0001");
        // Below the tie once stored as f64.
        assert_eq!(format_metric(&json!(0.00015)), "0.0001");
        assert_eq!(format_metric(&json!(0.5)), "0.5000");
    }
}
