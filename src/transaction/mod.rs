//! Batched structural edits against one container.
//!
//! A [`Transaction`] is built up front and then applied to the
//! [`SceneTree`](crate::SceneTree) and committed to the host in one step, so
//! no navigator operation ever observes a half-applied transition.

use crate::scene::{SceneId, SceneKey};
use crate::tree::ContainerKey;

/// Single structural edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOp {
    /// Attach the scene to the transaction's container.
    Add(SceneKey),
    /// Detach the scene from whatever container holds it.
    Remove(SceneKey),
    Show(SceneKey),
    /// Keep the scene attached but stop rendering it.
    Hide(SceneKey),
    /// Replace the container's primary routable scene.
    SetPrimary(Option<SceneKey>),
}

impl TransitionOp {
    pub fn scene(&self) -> Option<SceneKey> {
        match *self {
            TransitionOp::Add(scene)
            | TransitionOp::Remove(scene)
            | TransitionOp::Show(scene)
            | TransitionOp::Hide(scene) => Some(scene),
            TransitionOp::SetPrimary(scene) => scene,
        }
    }
}

/// Hint for the host about the direction of the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transit {
    #[default]
    None,
    Open,
    Close,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    container: ContainerKey,
    ops: Vec<TransitionOp>,
    back_stack_name: Option<SceneId>,
    transit: Transit,
}

impl Transaction {
    pub fn new(container: ContainerKey) -> Self {
        Self {
            container,
            ops: Vec::new(),
            back_stack_name: None,
            transit: Transit::None,
        }
    }

    pub fn add(mut self, scene: SceneKey) -> Self {
        self.ops.push(TransitionOp::Add(scene));
        self
    }

    pub fn remove(mut self, scene: SceneKey) -> Self {
        self.ops.push(TransitionOp::Remove(scene));
        self
    }

    pub fn show(mut self, scene: SceneKey) -> Self {
        self.ops.push(TransitionOp::Show(scene));
        self
    }

    pub fn hide(mut self, scene: SceneKey) -> Self {
        self.ops.push(TransitionOp::Hide(scene));
        self
    }

    pub fn set_primary(mut self, scene: Option<SceneKey>) -> Self {
        self.ops.push(TransitionOp::SetPrimary(scene));
        self
    }

    /// Record the transaction on the container's back stack under `name`.
    /// Recorded transactions can be reversed by popping that entry.
    pub fn add_to_back_stack(mut self, name: impl Into<SceneId>) -> Self {
        self.back_stack_name = Some(name.into());
        self
    }

    pub fn with_transit(mut self, transit: Transit) -> Self {
        self.transit = transit;
        self
    }

    pub(crate) fn push_op(&mut self, op: TransitionOp) {
        self.ops.push(op);
    }

    pub fn container(&self) -> ContainerKey {
        self.container
    }

    pub fn ops(&self) -> &[TransitionOp] {
        &self.ops
    }

    pub fn back_stack_name(&self) -> Option<&str> {
        self.back_stack_name.as_deref()
    }

    pub fn transit(&self) -> Transit {
        self.transit
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
