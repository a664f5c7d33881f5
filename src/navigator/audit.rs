//! Navigation audit hooks.
//!
//! Callers that want a trail of what the navigator did (tests, debugging
//! overlays, crash breadcrumbs) install a [`NavigationAudit`] on the config.
//! Records carry a stage plus structured details.

use std::sync::Mutex;
use std::time::SystemTime;

use serde_json::Value;

/// Checkpoints the navigator reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAuditStage {
    /// A scene was pushed onto a back stack.
    ScenePushed,
    /// A scene was attached outside stack semantics.
    SceneAttached,
    /// A transaction reached the host.
    TransitionCommitted,
    /// The host rejected a commit; structural state was kept.
    CommitFailed,
    /// A foreign dialog was removed to make room.
    ForeignDialogDismissed,
    /// A presentation or dialog request was refused.
    PresentationRefused,
    /// A modal chain was popped.
    DismissalCompleted,
    /// A result reached the presenter.
    ResultDelivered,
}

#[derive(Debug, Clone)]
pub struct NavigationAuditEvent {
    pub timestamp: SystemTime,
    pub stage: NavigationAuditStage,
    pub details: Vec<(String, Value)>,
}

impl NavigationAuditEvent {
    pub fn new(stage: NavigationAuditStage) -> Self {
        Self {
            timestamp: SystemTime::now(),
            stage,
            details: Vec::new(),
        }
    }

    pub fn detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }
}

pub trait NavigationAudit: Send + Sync {
    fn record(&self, event: NavigationAuditEvent);
}

#[derive(Debug, Default)]
pub struct NullNavigationAudit;

impl NavigationAudit for NullNavigationAudit {
    fn record(&self, _event: NavigationAuditEvent) {}
}

/// Keeps every record in memory.
#[derive(Debug, Default)]
pub struct BufferedNavigationAudit {
    events: Mutex<Vec<NavigationAuditEvent>>,
}

impl BufferedNavigationAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> Vec<NavigationAuditStage> {
        self.events
            .lock()
            .map(|guard| guard.iter().map(|event| event.stage).collect())
            .unwrap_or_default()
    }

    pub fn events(&self) -> Vec<NavigationAuditEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

impl NavigationAudit for BufferedNavigationAudit {
    fn record(&self, event: NavigationAuditEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event);
        }
    }
}
