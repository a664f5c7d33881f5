use crate::logging::{LogEvent, LogFields, LogLevel};
use serde_json::json;
use std::time::Duration;

/// Running counters for navigator activity.
#[derive(Debug, Default, Clone)]
pub struct NavigationMetrics {
    pushes: u64,
    attachments: u64,
    transactions: u64,
    dismissals: u64,
    results_delivered: u64,
    foreign_dialogs_dismissed: u64,
    presentations_refused: u64,
    commit_failures: u64,
}

impl NavigationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_push(&mut self) {
        self.pushes = self.pushes.saturating_add(1);
    }

    pub fn record_attachment(&mut self) {
        self.attachments = self.attachments.saturating_add(1);
    }

    pub fn record_transaction(&mut self) {
        self.transactions = self.transactions.saturating_add(1);
    }

    pub fn record_dismissal(&mut self) {
        self.dismissals = self.dismissals.saturating_add(1);
    }

    pub fn record_result_delivered(&mut self) {
        self.results_delivered = self.results_delivered.saturating_add(1);
    }

    pub fn record_foreign_dismissal(&mut self) {
        self.foreign_dialogs_dismissed = self.foreign_dialogs_dismissed.saturating_add(1);
    }

    pub fn record_refusal(&mut self) {
        self.presentations_refused = self.presentations_refused.saturating_add(1);
    }

    pub fn record_commit_failure(&mut self) {
        self.commit_failures = self.commit_failures.saturating_add(1);
    }

    pub fn snapshot(&self, uptime: Duration) -> MetricSnapshot {
        MetricSnapshot {
            uptime_ms: uptime.as_millis() as u64,
            pushes: self.pushes,
            attachments: self.attachments,
            transactions: self.transactions,
            dismissals: self.dismissals,
            results_delivered: self.results_delivered,
            foreign_dialogs_dismissed: self.foreign_dialogs_dismissed,
            presentations_refused: self.presentations_refused,
            commit_failures: self.commit_failures,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub uptime_ms: u64,
    pub pushes: u64,
    pub attachments: u64,
    pub transactions: u64,
    pub dismissals: u64,
    pub results_delivered: u64,
    pub foreign_dialogs_dismissed: u64,
    pub presentations_refused: u64,
    pub commit_failures: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "navigation_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("uptime_ms".to_string(), json!(self.uptime_ms));
        map.insert("pushes".to_string(), json!(self.pushes));
        map.insert("attachments".to_string(), json!(self.attachments));
        map.insert("transactions".to_string(), json!(self.transactions));
        map.insert("dismissals".to_string(), json!(self.dismissals));
        map.insert("results_delivered".to_string(), json!(self.results_delivered));
        map.insert(
            "foreign_dialogs_dismissed".to_string(),
            json!(self.foreign_dialogs_dismissed),
        );
        map.insert(
            "presentations_refused".to_string(),
            json!(self.presentations_refused),
        );
        map.insert("commit_failures".to_string(), json!(self.commit_failures));
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_reports_counters_as_fields() {
        let mut metrics = NavigationMetrics::new();
        metrics.record_push();
        metrics.record_push();
        metrics.record_commit_failure();

        let snapshot = metrics.snapshot(Duration::from_millis(1500));
        assert_eq!(snapshot.pushes, 2);
        assert_eq!(snapshot.commit_failures, 1);

        let event = snapshot.to_log_event("scene_nav::metrics");
        assert_eq!(event.message, "navigation_metrics");
        assert_eq!(event.fields["uptime_ms"], json!(1500));
        assert_eq!(event.fields["pushes"], json!(2));
    }
}
