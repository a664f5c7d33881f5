use serde_json::json;

use crate::error::{NavError, Result};
use crate::logging::{LogLevel, json_kv};
use crate::metrics::NavigationMetrics;
use crate::scene::{AnimationKind, SceneKey};
use crate::transaction::{Transaction, Transit};
use crate::tree::ContainerKey;

use super::Navigator;
use super::audit::{NavigationAuditEvent, NavigationAuditStage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModalRequest {
    Present,
    Dialog,
}

impl ModalRequest {
    fn label(self) -> &'static str {
        match self {
            ModalRequest::Present => "present",
            ModalRequest::Dialog => "show_dialog",
        }
    }
}

impl Navigator {
    /// Frontmost scene rendering as a dialog under `container`.
    ///
    /// Descends through the primary scene when one is attached; otherwise only
    /// the most recently attached scene is considered at each level.
    pub fn find_active_dialog(&self, container: ContainerKey) -> Option<SceneKey> {
        self.find_active_dialog_at_depth(container, 0)
    }

    fn find_active_dialog_at_depth(&self, container: ContainerKey, depth: usize) -> Option<SceneKey> {
        if depth > self.config.max_depth {
            self.log_depth_exceeded("find_active_dialog", depth);
            return None;
        }
        if self.tree.is_container_destroyed(container) {
            return None;
        }
        let node = self.tree.container(container)?;

        let primary = node
            .primary()
            .and_then(|key| self.tree.scene(key).map(|scene| (key, scene)))
            .filter(|(_, scene)| scene.is_added());
        if let Some((key, scene)) = primary {
            if scene.shows_dialog() {
                return Some(key);
            }
            return self.find_active_dialog_at_depth(scene.child_container(), depth + 1);
        }

        let latest = node
            .attached()
            .iter()
            .rev()
            .copied()
            .find(|key| self.tree.is_added(*key))?;
        let scene = self.tree.scene(latest)?;
        if scene.shows_dialog() {
            return Some(latest);
        }
        self.find_active_dialog_at_depth(scene.child_container(), depth + 1)
    }

    /// Whether `scene` may present another scene right now.
    ///
    /// A foreign dialog in the way is dismissed and the check runs again; a
    /// managed dialog always wins.
    pub fn can_present(&mut self, scene: SceneKey, host_container: ContainerKey) -> bool {
        self.admit_modal(scene, host_container, ModalRequest::Present)
    }

    /// Like [`can_present`](Self::can_present), except that `scene` already
    /// being the active dialog is not a conflict.
    pub fn can_show_dialog(&mut self, scene: SceneKey, host_container: ContainerKey) -> bool {
        self.admit_modal(scene, host_container, ModalRequest::Dialog)
    }

    fn admit_modal(
        &mut self,
        scene: SceneKey,
        host_container: ContainerKey,
        request: ModalRequest,
    ) -> bool {
        loop {
            let Some(node) = self.tree.scene(scene) else {
                return false;
            };
            if node.presented_scene().is_some() {
                self.refuse(scene, request, "already_presenting");
                return false;
            }

            let Some(dialog) = self.find_active_dialog(host_container) else {
                return true;
            };
            if request == ModalRequest::Dialog && dialog == scene {
                return true;
            }

            let foreign = self
                .tree
                .scene(dialog)
                .is_some_and(|candidate| !candidate.is_managed());
            if !foreign {
                self.refuse(scene, request, "dialog_showing");
                return false;
            }

            // Each pass removes one foreign dialog, so the loop ends once
            // none are left or one refuses to go.
            if !self.remove_dialog(dialog) || self.find_active_dialog(host_container) == Some(dialog)
            {
                self.log_nav_event(
                    LogLevel::Error,
                    "foreign_dialog_stuck",
                    [json_kv("dialog", json!(self.scene_label(dialog)))],
                );
                return false;
            }
            self.with_metrics(NavigationMetrics::record_foreign_dismissal);
            self.audit(
                NavigationAuditEvent::new(NavigationAuditStage::ForeignDialogDismissed)
                    .detail("request", request.label()),
            );
        }
    }

    fn refuse(&self, scene: SceneKey, request: ModalRequest, reason: &str) {
        self.with_metrics(NavigationMetrics::record_refusal);
        self.audit(
            NavigationAuditEvent::new(NavigationAuditStage::PresentationRefused)
                .detail("scene", self.scene_label(scene))
                .detail("reason", reason),
        );
        self.log_nav_event(
            LogLevel::Warn,
            "modal_refused",
            [
                json_kv("scene", json!(self.scene_label(scene))),
                json_kv("request", json!(request.label())),
                json_kv("reason", json!(reason)),
            ],
        );
    }

    /// Present `scene` modally over `presenter`.
    ///
    /// The presentation is anchored at the presenter's top-level ancestor:
    /// that scene records the link and `scene` is pushed into its container
    /// with a modal animation. Returns `Ok(false)` when presentation is not
    /// currently allowed.
    pub fn present(
        &mut self,
        presenter: SceneKey,
        scene: SceneKey,
        request_code: i32,
    ) -> Result<bool> {
        self.require_scene(presenter)?;
        self.require_scene(scene)?;
        let anchor = self.top_level_ancestor(presenter);
        let Some(container) = self.tree.scene(anchor).and_then(|node| node.container()) else {
            return Ok(false);
        };
        if self.tree.is_container_destroyed(container) {
            return Ok(false);
        }
        self.ensure_attachable(container, scene)?;
        // Clearing a foreign dialog can take the target container with it.
        if !self.can_present(anchor, self.tree.root()) || self.tree.is_container_destroyed(container)
        {
            return Ok(false);
        }

        if let Some(node) = self.tree.scene_mut(anchor) {
            node.presented = Some(scene);
        }
        if let Some(node) = self.tree.scene_mut(scene) {
            node.presenting = Some(anchor);
            node.result.request_code = request_code;
        }
        self.push(container, scene, AnimationKind::Modal)?;
        Ok(true)
    }

    /// Show a dialog capable scene as a dialog in `container`.
    ///
    /// The dialog becomes the container's primary scene for as long as it is
    /// shown; the previous primary is restored by [`hide_dialog`](Self::hide_dialog).
    /// Showing the dialog that is already active succeeds without changes.
    pub fn show_dialog(&mut self, scene: SceneKey, container: ContainerKey) -> Result<bool> {
        let node = self.require_scene(scene)?;
        if !node.is_dialog_capable() {
            return Err(NavError::NotDialogCapable(node.id().to_string()));
        }
        if node.is_added() && node.shows_dialog() {
            return Ok(self.can_show_dialog(scene, self.tree.root()));
        }
        if self.tree.is_container_destroyed(container) {
            return Ok(false);
        }
        self.ensure_attachable(container, scene)?;
        if !self.can_show_dialog(scene, self.tree.root())
            || self.tree.is_container_destroyed(container)
        {
            return Ok(false);
        }

        let previous = self
            .tree
            .container(container)
            .and_then(|target| target.primary());
        if let Some(node) = self.tree.scene_mut(scene) {
            node.shows_dialog = true;
            node.restore_primary = previous;
            node.animation = AnimationKind::Fade;
        }
        let tx = Transaction::new(container)
            .with_transit(Transit::Open)
            .add(scene)
            .set_primary(Some(scene));
        self.commit_now(tx);

        self.with_metrics(NavigationMetrics::record_attachment);
        self.audit(
            NavigationAuditEvent::new(NavigationAuditStage::SceneAttached)
                .detail("scene", self.scene_label(scene))
                .detail("dialog", true),
        );
        Ok(true)
    }

    /// Remove a dialog shown with [`show_dialog`](Self::show_dialog). Scenes
    /// that are not showing as a dialog are left alone.
    pub fn hide_dialog(&mut self, scene: SceneKey) -> Result<()> {
        let node = self.require_scene(scene)?;
        if !node.is_added() || !node.shows_dialog() {
            return Ok(());
        }
        self.remove_dialog(scene);
        Ok(())
    }

    fn remove_dialog(&mut self, dialog: SceneKey) -> bool {
        let Some(node) = self.tree.scene(dialog) else {
            return false;
        };
        let Some(container) = node.container().filter(|_| node.is_added()) else {
            return false;
        };
        let restore = node.restore_primary;

        let mut tx = Transaction::new(container)
            .with_transit(Transit::Close)
            .remove(dialog);
        let was_primary = self
            .tree
            .container(container)
            .is_some_and(|target| target.primary() == Some(dialog));
        let restore = restore.filter(|key| {
            self.tree
                .scene(*key)
                .is_some_and(|scene| scene.is_added() && scene.container() == Some(container))
        });
        if was_primary {
            if let Some(previous) = restore {
                tx = tx.set_primary(Some(previous));
            }
        }
        self.commit_now(tx);
        true
    }

    fn top_level_ancestor(&self, scene: SceneKey) -> SceneKey {
        let mut current = scene;
        for _ in 0..=self.config.max_depth {
            match self.tree.parent_scene(current) {
                Some(parent) => current = parent,
                None => break,
            }
        }
        current
    }
}
