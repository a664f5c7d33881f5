use thiserror::Error;

use crate::scene::SceneKey;
use crate::tree::ContainerKey;

/// Unified result type for the navigation core.
pub type Result<T> = std::result::Result<T, NavError>;

/// Errors surfaced by navigator entry points.
///
/// Races with teardown (destroyed containers, absent targets) are not errors;
/// those calls return quietly. These variants cover keys the caller should
/// never have handed over.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("scene {0} is not live")]
    UnknownScene(SceneKey),
    #[error("scene `{0}` cannot be attached inside its own subtree")]
    WouldNest(String),
    #[error("scene `{0}` is already attached")]
    AlreadyAttached(String),
    #[error("scene `{0}` is not dialog capable")]
    NotDialogCapable(String),
}

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Failure reported by the rendering collaborator while committing a transition.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("transition commit failed: {0}")]
    Commit(String),
    #[error("host view for container {0} is gone")]
    MissingView(ContainerKey),
}
