//! Scene navigation core.
//!
//! Scenes live in nested containers. Each container keeps an ordered back
//! stack, at most one modal presentation per presenter and at most one
//! managed dialog on screen. The [`Navigator`] mutates that structure and
//! hands every resulting [`Transaction`] to a [`TransitionHost`] for
//! rendering, then delivers results back to presenters on dismissal.

pub mod error;
pub mod logging;
pub mod metrics;
pub mod navigator;
pub mod scene;
pub mod transaction;
pub mod tree;

pub use error::{HostError, HostResult, NavError, Result};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, NavigationMetrics};
pub use navigator::audit::{
    BufferedNavigationAudit, NavigationAudit, NavigationAuditEvent, NavigationAuditStage,
    NullNavigationAudit,
};
pub use navigator::host::{HostCall, NullHost, RecordingHost, TransitionHost};
pub use navigator::{Navigator, NavigatorConfig};
pub use scene::{AnimationKind, Scene, SceneBuilder, SceneId, SceneKey, SceneKind, SceneResult};
pub use transaction::{Transaction, Transit, TransitionOp};
pub use tree::{BackStackEntry, Container, ContainerKey, SceneTree};
