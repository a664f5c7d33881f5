use serde_json::json;

use crate::error::Result;
use crate::logging::{LogLevel, json_kv};
use crate::metrics::NavigationMetrics;
use crate::scene::{AnimationKind, SceneKey};
use crate::transaction::{Transaction, Transit};
use crate::tree::ContainerKey;

use super::Navigator;
use super::audit::{NavigationAuditEvent, NavigationAuditStage};

impl Navigator {
    /// Push `scene` on top of `container`'s back stack.
    ///
    /// The previous front scene stays attached but hidden so its state
    /// survives until it is revealed again by a pop. Both changes go out in a
    /// single commit. Pushing into a destroyed container does nothing.
    pub fn push(
        &mut self,
        container: ContainerKey,
        scene: SceneKey,
        animation: AnimationKind,
    ) -> Result<()> {
        if self.tree.is_container_destroyed(container) {
            self.log_nav_event(
                LogLevel::Debug,
                "push_skipped",
                [json_kv("reason", json!("container_destroyed"))],
            );
            return Ok(());
        }
        self.ensure_attachable(container, scene)?;

        let mut tx = Transaction::new(container).with_transit(Transit::Open);
        if let Some(top) = self.tree.front_scene(container) {
            if let Some(node) = self.tree.scene_mut(top) {
                node.animation = animation;
            }
            tx = tx.hide(top);
        }

        let scene_id = match self.tree.scene_mut(scene) {
            Some(node) => {
                node.animation = animation;
                node.id().to_string()
            }
            None => return Ok(()),
        };
        let previous_len = self.back_stack_len(container);
        self.commit_now(tx.add(scene).add_to_back_stack(scene_id.clone()));

        self.with_metrics(NavigationMetrics::record_push);
        self.audit(
            NavigationAuditEvent::new(NavigationAuditStage::ScenePushed)
                .detail("scene", scene_id.clone())
                .detail("index", previous_len),
        );
        self.log_nav_event(
            LogLevel::Debug,
            "scene_pushed",
            [
                json_kv("scene", json!(scene_id)),
                json_kv("index", json!(previous_len)),
                json_kv("animation", json!(animation)),
            ],
        );
        Ok(())
    }

    /// Attach `scene` without recording a back-stack entry. With `primary`
    /// set it becomes the container's primary routable scene.
    pub fn add_to_added_list(
        &mut self,
        container: ContainerKey,
        scene: SceneKey,
        primary: bool,
    ) -> Result<()> {
        if self.tree.is_container_destroyed(container) {
            return Ok(());
        }
        self.ensure_attachable(container, scene)?;

        let mut tx = Transaction::new(container).add(scene);
        if primary {
            tx = tx.set_primary(Some(scene));
        }
        self.commit_now(tx);

        self.with_metrics(NavigationMetrics::record_attachment);
        self.audit(
            NavigationAuditEvent::new(NavigationAuditStage::SceneAttached)
                .detail("scene", self.scene_label(scene))
                .detail("primary", primary),
        );
        Ok(())
    }

    /// Position of the most recent back-stack entry named after `scene`.
    /// Earlier entries with the same name are history and lose to later ones.
    pub fn index_of(&self, container: ContainerKey, scene: SceneKey) -> Option<usize> {
        let scene_id = self.tree.scene(scene)?.id();
        self.tree
            .container(container)?
            .back_stack()
            .iter()
            .rposition(|entry| entry.name() == scene_id)
    }

    /// Scene one entry above `scene`, if it is still attached.
    pub fn neighbor_after(&self, container: ContainerKey, scene: SceneKey) -> Option<SceneKey> {
        let index = self.index_of(container, scene)?.checked_add(1)?;
        self.attached_entry(container, index)
    }

    /// Scene one entry below `scene`, if it is still attached.
    pub fn neighbor_before(&self, container: ContainerKey, scene: SceneKey) -> Option<SceneKey> {
        let index = self.index_of(container, scene)?.checked_sub(1)?;
        self.attached_entry(container, index)
    }

    pub fn back_stack_len(&self, container: ContainerKey) -> usize {
        self.tree
            .container(container)
            .map(|node| node.back_stack_len())
            .unwrap_or(0)
    }

    /// Pop every entry above the last one named `scene_id`, and that entry too
    /// when `inclusive`. Returns false when nothing matched.
    pub fn pop_back_stack(
        &mut self,
        container: ContainerKey,
        scene_id: &str,
        inclusive: bool,
    ) -> bool {
        if self.tree.is_container_destroyed(container) {
            return false;
        }
        let Some(tx) = self.tree.take_back_stack(container, scene_id, inclusive) else {
            self.log_nav_event(
                LogLevel::Debug,
                "pop_skipped",
                [json_kv("scene", json!(scene_id))],
            );
            return false;
        };
        self.commit_now(tx);
        true
    }

    fn attached_entry(&self, container: ContainerKey, index: usize) -> Option<SceneKey> {
        self.tree
            .back_stack_scene(container, index)
            .filter(|key| self.tree.is_added(*key))
    }
}

#[cfg(test)]
mod tests {
    use crate::navigator::test_support::Harness;
    use crate::scene::AnimationKind;
    use crate::transaction::TransitionOp;

    #[test]
    fn push_hides_previous_and_appends() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let s1 = h.scene("s1");
        let s2 = h.scene("s2");

        h.nav.push(root, s1, AnimationKind::Push).unwrap();
        h.nav.push(root, s2, AnimationKind::Push).unwrap();

        assert_eq!(h.nav.index_of(root, s1), Some(0));
        assert_eq!(h.nav.index_of(root, s2), Some(1));
        assert!(h.nav.scene(s1).unwrap().is_hidden());
        assert!(h.nav.scene(s1).unwrap().is_added());
        assert!(!h.nav.scene(s2).unwrap().is_hidden());
        assert_eq!(h.nav.front_scene(root), Some(s2));
        assert_eq!(h.nav.scene(s1).unwrap().animation(), AnimationKind::Push);

        let commits = h.host.commits();
        assert_eq!(commits.len(), 2);
        assert_eq!(
            commits[1].ops(),
            &[TransitionOp::Hide(s1), TransitionOp::Add(s2)]
        );
        assert_eq!(commits[1].back_stack_name(), Some("s2"));
    }

    #[test]
    fn index_after_push_equals_previous_length() {
        let mut h = Harness::new();
        let root = h.nav.root();
        for n in 0..5 {
            let scene = h.scene(&format!("scene-{n}"));
            let before = h.nav.back_stack_len(root);
            h.nav.push(root, scene, AnimationKind::Fade).unwrap();
            assert_eq!(h.nav.index_of(root, scene), Some(before));
        }
        assert_eq!(h.snapshot().pushes, 5);
    }

    #[test]
    fn push_into_destroyed_container_is_noop() {
        let mut h = Harness::new();
        let root = h.nav.root();
        h.nav.destroy_container(root);
        let s1 = h.scene("s1");
        let commits_before = h.host.commits().len();

        h.nav.push(root, s1, AnimationKind::Push).unwrap();

        assert!(!h.nav.is_added(s1));
        assert_eq!(h.nav.index_of(root, s1), None);
        assert_eq!(h.host.commits().len(), commits_before);
        assert_eq!(h.snapshot().pushes, 0);
    }

    #[test]
    fn neighbors_are_inverse() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let keys: Vec<_> = ["a", "b", "c"].iter().map(|id| h.scene(id)).collect();
        for key in &keys {
            h.nav.push(root, *key, AnimationKind::Push).unwrap();
        }

        assert_eq!(h.nav.neighbor_before(root, keys[0]), None);
        assert_eq!(h.nav.neighbor_after(root, keys[2]), None);
        for pair in keys.windows(2) {
            assert_eq!(h.nav.neighbor_after(root, pair[0]), Some(pair[1]));
            assert_eq!(h.nav.neighbor_before(root, pair[1]), Some(pair[0]));
        }
    }

    #[test]
    fn neighbors_skip_detached_scenes() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let a = h.scene("a");
        let b = h.scene("b");
        let c = h.scene("c");
        h.nav.push(root, a, AnimationKind::Push).unwrap();
        h.nav.push(root, b, AnimationKind::Push).unwrap();

        assert!(h.nav.pop_back_stack(root, "b", true));
        assert!(h.nav.is_destroyed(b));
        assert_eq!(h.nav.neighbor_after(root, a), None);
        assert!(!h.nav.scene(a).unwrap().is_hidden());

        h.nav.push(root, c, AnimationKind::Push).unwrap();
        assert_eq!(h.nav.neighbor_after(root, a), Some(c));
        assert!(!h.nav.pop_back_stack(root, "b", true));
    }

    #[test]
    fn latest_duplicate_entry_wins() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let first = h.scene("dup");
        let middle = h.scene("middle");
        h.nav.push(root, first, AnimationKind::Push).unwrap();
        h.nav.push(root, middle, AnimationKind::Push).unwrap();

        let second = h.scene("dup");
        h.nav.push(root, second, AnimationKind::Push).unwrap();
        assert_eq!(h.nav.back_stack_len(root), 3);
        assert_eq!(h.nav.index_of(root, second), Some(2));
        assert_eq!(h.nav.index_of(root, first), Some(2));
    }

    #[test]
    fn primary_attachment_sets_container_primary() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let tab = h.scene("tab");
        let other = h.scene("other");
        h.nav.add_to_added_list(root, tab, true).unwrap();
        h.nav.add_to_added_list(root, other, false).unwrap();

        let container = h.nav.container(root).unwrap();
        assert_eq!(container.primary(), Some(tab));
        assert_eq!(container.back_stack_len(), 0);
        assert_eq!(h.snapshot().attachments, 2);
    }
}
