use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::tree::{ArenaKey, ContainerKey};

/// Caller supplied identifier; doubles as the back-stack entry name.
pub type SceneId = String;

/// Handle to a scene stored in the [`SceneTree`](crate::SceneTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SceneKey(pub(crate) ArenaKey);

impl fmt::Display for SceneKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene#{}v{}", self.0.index(), self.0.generation())
    }
}

/// Transition style recorded on a scene before a commit. The host reads it to
/// pick the animation it plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    #[default]
    None,
    Push,
    Modal,
    Fade,
}

/// Whether a scene was created through this navigation model.
///
/// Foreign scenes are tolerated in the tree but get no protection: a foreign
/// dialog standing in the way of a presentation is dismissed by force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    #[default]
    Managed,
    Foreign,
}

/// Outcome a scene hands back to its presenter when it is dismissed.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SceneResult {
    pub request_code: i32,
    pub result_code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Declarative description of a scene before it enters the tree.
#[derive(Debug, Clone)]
pub struct SceneBuilder {
    id: SceneId,
    kind: SceneKind,
    dialog_capable: bool,
}

impl SceneBuilder {
    pub fn new(id: impl Into<SceneId>) -> Self {
        Self {
            id: id.into(),
            kind: SceneKind::Managed,
            dialog_capable: false,
        }
    }

    pub fn foreign(mut self) -> Self {
        self.kind = SceneKind::Foreign;
        self
    }

    /// Mark the scene as able to render as a dialog. Foreign dialog scenes
    /// render as dialogs as soon as they are attached.
    pub fn dialog(mut self) -> Self {
        self.dialog_capable = true;
        self
    }

    pub(crate) fn build(self, child_container: ContainerKey) -> Scene {
        Scene {
            id: self.id,
            kind: self.kind,
            container: None,
            child_container,
            presented: None,
            presenting: None,
            animation: AnimationKind::None,
            added: false,
            hidden: false,
            removing: false,
            user_visible: true,
            dialog_capable: self.dialog_capable,
            shows_dialog: self.dialog_capable && self.kind == SceneKind::Foreign,
            restore_primary: None,
            result: SceneResult::default(),
        }
    }
}

/// One presentable unit tracked by the navigator.
///
/// Lifecycle flags (`added`, `hidden`, `removing`) are only written while a
/// transaction is applied; coordination code reads them.
#[derive(Debug, Clone)]
pub struct Scene {
    id: SceneId,
    kind: SceneKind,
    pub(crate) container: Option<ContainerKey>,
    child_container: ContainerKey,
    pub(crate) presented: Option<SceneKey>,
    pub(crate) presenting: Option<SceneKey>,
    pub(crate) animation: AnimationKind,
    pub(crate) added: bool,
    pub(crate) hidden: bool,
    pub(crate) removing: bool,
    pub(crate) user_visible: bool,
    dialog_capable: bool,
    pub(crate) shows_dialog: bool,
    pub(crate) restore_primary: Option<SceneKey>,
    pub(crate) result: SceneResult,
}

impl Scene {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn is_managed(&self) -> bool {
        self.kind == SceneKind::Managed
    }

    /// Container the scene is attached into, `None` while detached.
    pub fn container(&self) -> Option<ContainerKey> {
        self.container
    }

    /// Nested container owned by this scene.
    pub fn child_container(&self) -> ContainerKey {
        self.child_container
    }

    pub fn presented_scene(&self) -> Option<SceneKey> {
        self.presented
    }

    pub fn presenting_scene(&self) -> Option<SceneKey> {
        self.presenting
    }

    pub fn animation(&self) -> AnimationKind {
        self.animation
    }

    pub fn is_added(&self) -> bool {
        self.added
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn is_removing(&self) -> bool {
        self.removing
    }

    pub fn is_user_visible(&self) -> bool {
        self.user_visible
    }

    pub fn is_dialog_capable(&self) -> bool {
        self.dialog_capable
    }

    /// True when the scene renders as a dialog rather than in the container slot.
    pub fn shows_dialog(&self) -> bool {
        self.dialog_capable && self.shows_dialog
    }

    pub fn result(&self) -> &SceneResult {
        &self.result
    }
}
