use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Danger,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Success => "success",
            Severity::Danger => "danger",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Transient banner above the training form. A new message replaces the
/// current one; there is no queue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusBanner {
    pub visible: bool,
    pub message: String,
    pub severity: Severity,
}

impl StatusBanner {
    pub fn show(&mut self, message: impl Into<String>, severity: Severity) {
        self.message = message.into();
        self.severity = severity;
        self.visible = true;
    }

    pub fn clear(&mut self) {
        self.visible = false;
    }

    pub fn css_class(&self) -> String {
        format!("alert alert-{}", self.severity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_then_clear() {
        let mut banner = StatusBanner::default();
        assert!(!banner.visible);

        banner.show("Training completed successfully!", Severity::Success);
        assert!(banner.visible);
        assert_eq!(banner.css_class(), "alert alert-success");

        banner.clear();
        assert!(!banner.visible);
    }

    #[test]
    fn test_show_overwrites_previous_message() {
        let mut banner = StatusBanner::default();
        banner.show("first", Severity::Danger);
        banner.show("second", Severity::default());

        assert_eq!(banner.message, "second");
        assert_eq!(banner.severity, Severity::Info);
        assert_eq!(banner.css_class(), "alert alert-info");
    }
}
