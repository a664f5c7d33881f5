use crate::scene::SceneKey;
use crate::tree::ContainerKey;

use super::Navigator;

impl Navigator {
    /// Resolve an attached scene by id anywhere under `container`.
    ///
    /// The container's own scenes are checked first, then each attached
    /// scene's child container, most recently attached first. `None` is an
    /// ordinary answer, also for destroyed containers.
    pub fn find_scene(&self, container: ContainerKey, scene_id: &str) -> Option<SceneKey> {
        self.find_scene_at_depth(container, scene_id, 0)
    }

    fn find_scene_at_depth(
        &self,
        container: ContainerKey,
        scene_id: &str,
        depth: usize,
    ) -> Option<SceneKey> {
        if depth > self.config.max_depth {
            self.log_depth_exceeded("find_scene", depth);
            return None;
        }
        let node = self.tree.container(container)?;
        if node.is_destroyed() {
            return None;
        }

        let own = node.attached().iter().rev().copied().find(|key| {
            self.tree
                .scene(*key)
                .is_some_and(|scene| scene.id() == scene_id)
        });
        if own.is_some() {
            return own;
        }

        for key in node.attached().iter().rev() {
            let Some(scene) = self.tree.scene(*key) else {
                continue;
            };
            if !scene.is_added() {
                continue;
            }
            if let Some(hit) =
                self.find_scene_at_depth(scene.child_container(), scene_id, depth + 1)
            {
                return Some(hit);
            }
        }
        None
    }

    /// Attached managed scenes of `container` in attachment order. Used by
    /// hosts that enumerate siblings, such as tab bars.
    pub fn scenes_at_added_list(&self, container: ContainerKey) -> Vec<SceneKey> {
        let Some(node) = self.tree.container(container) else {
            return Vec::new();
        };
        if node.is_destroyed() {
            return Vec::new();
        }
        node.attached()
            .iter()
            .copied()
            .filter(|key| {
                self.tree
                    .scene(*key)
                    .is_some_and(|scene| scene.is_added() && scene.is_managed())
            })
            .collect()
    }

    /// Scene currently occupying the container slot.
    pub fn front_scene(&self, container: ContainerKey) -> Option<SceneKey> {
        if self.tree.is_container_destroyed(container) {
            return None;
        }
        self.tree.front_scene(container)
    }
}

#[cfg(test)]
mod tests {
    use crate::logging::LogLevel;
    use crate::navigator::test_support::Harness;
    use crate::scene::AnimationKind;

    #[test]
    fn finds_scenes_in_nested_containers() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let tabs = h.scene("tabs");
        h.nav.add_to_added_list(root, tabs, true).unwrap();
        let tab_container = h.child_of(tabs);
        let home = h.scene("home");
        let profile = h.scene("profile");
        h.nav.add_to_added_list(tab_container, home, false).unwrap();
        h.nav.add_to_added_list(tab_container, profile, false).unwrap();
        let detail = h.scene("detail");
        let home_stack = h.child_of(home);
        h.nav.push(home_stack, detail, AnimationKind::Push).unwrap();

        assert_eq!(h.nav.find_scene(root, "tabs"), Some(tabs));
        assert_eq!(h.nav.find_scene(root, "profile"), Some(profile));
        assert_eq!(h.nav.find_scene(root, "detail"), Some(detail));
        assert_eq!(h.nav.find_scene(tab_container, "detail"), Some(detail));
        assert_eq!(h.nav.find_scene(home_stack, "profile"), None);
        assert_eq!(h.nav.find_scene(root, "missing"), None);
    }

    #[test]
    fn destroyed_container_finds_nothing() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let a = h.scene("a");
        h.nav.push(root, a, AnimationKind::Push).unwrap();
        h.nav.destroy_container(root);

        assert_eq!(h.nav.find_scene(root, "a"), None);
        assert!(h.nav.scenes_at_added_list(root).is_empty());
        assert_eq!(h.nav.front_scene(root), None);
    }

    #[test]
    fn added_list_skips_foreign_scenes_and_keeps_order() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let first = h.scene("first");
        let foreign = h.foreign_dialog("foreign");
        let second = h.scene("second");
        h.nav.add_to_added_list(root, first, false).unwrap();
        h.nav.add_to_added_list(root, foreign, false).unwrap();
        h.nav.add_to_added_list(root, second, true).unwrap();

        assert_eq!(h.nav.scenes_at_added_list(root), vec![first, second]);
    }

    #[test]
    fn lookups_past_max_depth_fail_closed() {
        let mut h = Harness::new();
        h.nav.config_mut().max_depth = 1;
        let root = h.nav.root();
        let outer = h.scene("outer");
        h.nav.add_to_added_list(root, outer, true).unwrap();
        let middle = h.scene("middle");
        let outer_child = h.child_of(outer);
        h.nav.add_to_added_list(outer_child, middle, true).unwrap();
        let deep = h.scene("deep");
        let middle_child = h.child_of(middle);
        h.nav.add_to_added_list(middle_child, deep, true).unwrap();

        assert_eq!(h.nav.find_scene(root, "middle"), Some(middle));
        assert_eq!(h.nav.find_scene(root, "deep"), None);
        assert!(
            h.logs
                .messages_at(LogLevel::Warn)
                .contains(&"depth_limit_reached".to_string())
        );
    }
}
