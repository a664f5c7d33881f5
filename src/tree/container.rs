use std::fmt;

use crate::scene::{SceneId, SceneKey};
use crate::transaction::TransitionOp;

use super::ArenaKey;

/// Handle to a container stored in the [`SceneTree`](super::SceneTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerKey(pub(crate) ArenaKey);

impl fmt::Display for ContainerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container#{}v{}", self.0.index(), self.0.generation())
    }
}

/// Named back-stack record. `reverse` holds the ops that undo the recorded
/// transaction, already in the order they must run.
#[derive(Debug, Clone)]
pub struct BackStackEntry {
    name: SceneId,
    pub(crate) reverse: Vec<TransitionOp>,
}

impl BackStackEntry {
    pub(crate) fn new(name: SceneId, reverse: Vec<TransitionOp>) -> Self {
        Self { name, reverse }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Host slot holding attached scenes and their back stack.
#[derive(Debug, Clone, Default)]
pub struct Container {
    pub(crate) host: Option<SceneKey>,
    pub(crate) attached: Vec<SceneKey>,
    pub(crate) back_stack: Vec<BackStackEntry>,
    pub(crate) primary: Option<SceneKey>,
    pub(crate) destroyed: bool,
}

impl Container {
    /// Scene owning this container; `None` for the navigator root.
    pub fn host(&self) -> Option<SceneKey> {
        self.host
    }

    /// Attached scenes in attachment order, hidden ones included.
    pub fn attached(&self) -> &[SceneKey] {
        &self.attached
    }

    pub fn back_stack(&self) -> &[BackStackEntry] {
        &self.back_stack
    }

    pub fn back_stack_len(&self) -> usize {
        self.back_stack.len()
    }

    pub fn primary(&self) -> Option<SceneKey> {
        self.primary
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
