use askama::Template;
use serde_json::json;

use crate::config::FormDefaults;
use crate::dashboard::DashboardSnapshot;

/// How often the page script pulls `/api/dashboard` and updates the widgets
/// in place. The page itself is never reloaded, so form input survives.
const PAGE_POLL_MILLIS: u64 = 5_000;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage<'a> {
    pub snapshot: &'a DashboardSnapshot,
    pub form: &'a FormDefaults,
    pub charts_json: String,
    pub poll_millis: u64,
}

impl<'a> DashboardPage<'a> {
    pub fn new(snapshot: &'a DashboardSnapshot, form: &'a FormDefaults) -> Self {
        let charts = json!({
            "history": &snapshot.view.history,
            "price": &snapshot.view.stream.price,
            "probability": &snapshot.view.stream.probability,
        });
        Self {
            snapshot,
            form,
            charts_json: script_safe_json(&charts.to_string()),
            poll_millis: PAGE_POLL_MILLIS,
        }
    }
}

/// Chart data is inlined in a `<script>` block, so a `</` inside any label
/// must not close it.
fn script_safe_json(raw: &str) -> String {
    raw.replace("</", "<\\/")
}
