use crate::scene::{Scene, SceneBuilder, SceneKey};
use crate::transaction::{Transaction, Transit, TransitionOp};

use super::arena::Arena;
use super::container::{BackStackEntry, Container, ContainerKey};

/// Scenes detached by a transaction. They are destroyed only after the host
/// has seen the commit, so it can still inspect them while animating out.
#[derive(Debug, Default)]
pub(crate) struct Applied {
    doomed: Vec<SceneKey>,
}

/// Arena backed scene hierarchy.
///
/// Every scene owns one child container; the tree owns the root container.
/// Parent links are derived from `container -> host` lookups and never keep
/// anything alive.
#[derive(Debug)]
pub struct SceneTree {
    scenes: Arena<Scene>,
    containers: Arena<Container>,
    root: ContainerKey,
}

impl Default for SceneTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneTree {
    pub fn new() -> Self {
        let mut containers = Arena::new();
        let root = ContainerKey(containers.insert(Container::default()));
        Self {
            scenes: Arena::new(),
            containers,
            root,
        }
    }

    pub fn root(&self) -> ContainerKey {
        self.root
    }

    pub fn scene(&self, key: SceneKey) -> Option<&Scene> {
        self.scenes.get(key.0)
    }

    pub(crate) fn scene_mut(&mut self, key: SceneKey) -> Option<&mut Scene> {
        self.scenes.get_mut(key.0)
    }

    pub fn container(&self, key: ContainerKey) -> Option<&Container> {
        self.containers.get(key.0)
    }

    pub(crate) fn container_mut(&mut self, key: ContainerKey) -> Option<&mut Container> {
        self.containers.get_mut(key.0)
    }

    /// Number of live scenes, attached or not.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    pub(crate) fn insert_scene(&mut self, builder: SceneBuilder) -> SceneKey {
        let child = ContainerKey(self.containers.insert(Container::default()));
        let key = SceneKey(self.scenes.insert(builder.build(child)));
        if let Some(container) = self.containers.get_mut(child.0) {
            container.host = Some(key);
        }
        key
    }

    pub fn is_container_destroyed(&self, key: ContainerKey) -> bool {
        self.container(key).is_none_or(|container| container.destroyed)
    }

    pub fn is_added(&self, scene: SceneKey) -> bool {
        self.scene(scene).is_some_and(|scene| scene.added)
    }

    pub fn is_destroyed(&self, scene: SceneKey) -> bool {
        !self.scenes.contains(scene.0)
    }

    pub fn is_removing(&self, scene: SceneKey) -> bool {
        self.scene(scene).is_some_and(|scene| scene.removing)
    }

    /// Scene hosting the container `scene` is attached into.
    pub fn parent_scene(&self, scene: SceneKey) -> Option<SceneKey> {
        let container = self.scene(scene)?.container?;
        self.container(container)?.host
    }

    /// True when the scene or any scene above it is being torn down.
    pub fn is_removing_along_with_parent(&self, scene: SceneKey) -> bool {
        let mut cursor = Some(scene);
        while let Some(key) = cursor {
            match self.scene(key) {
                Some(node) if node.removing => return true,
                Some(_) => cursor = self.parent_scene(key),
                None => return false,
            }
        }
        false
    }

    /// Whether attaching `scene` into `container` would make the scene its own ancestor.
    pub fn is_ancestor_or_self(&self, scene: SceneKey, container: ContainerKey) -> bool {
        let mut cursor = self.container(container).and_then(|c| c.host);
        while let Some(key) = cursor {
            if key == scene {
                return true;
            }
            cursor = self.parent_scene(key);
        }
        false
    }

    /// Scene currently occupying the container slot: the most recently
    /// attached scene that is not rendering as a dialog.
    pub fn front_scene(&self, container: ContainerKey) -> Option<SceneKey> {
        let container = self.container(container)?;
        container.attached.iter().rev().copied().find(|key| {
            self.scene(*key)
                .is_some_and(|scene| scene.added && !scene.shows_dialog())
        })
    }

    /// Scene recorded under the back-stack entry at `index`, if it is still live.
    pub fn back_stack_scene(&self, container: ContainerKey, index: usize) -> Option<SceneKey> {
        let container_ref = self.container(container)?;
        let name = container_ref.back_stack.get(index)?.name();
        container_ref
            .attached
            .iter()
            .rev()
            .copied()
            .find(|key| self.scene(*key).is_some_and(|scene| scene.id() == name))
    }

    /// Apply every op of `tx` in order. Recorded transactions push a
    /// back-stack entry holding their reversal; their removals keep the scene
    /// alive so a later pop can re-attach it.
    pub(crate) fn apply(&mut self, tx: &Transaction) -> Applied {
        let recorded = tx.back_stack_name().is_some();
        let container = tx.container();
        let mut reverse = Vec::new();
        let mut applied = Applied::default();

        for op in tx.ops() {
            match *op {
                TransitionOp::Add(scene) => {
                    if self.attach(container, scene) {
                        reverse.push(TransitionOp::Remove(scene));
                    }
                }
                TransitionOp::Remove(scene) => {
                    if self.detach(scene) {
                        reverse.push(TransitionOp::Add(scene));
                        if !recorded {
                            applied.doomed.push(scene);
                        }
                    }
                }
                TransitionOp::Show(scene) => {
                    if self.set_hidden(scene, false) {
                        reverse.push(TransitionOp::Hide(scene));
                    }
                }
                TransitionOp::Hide(scene) => {
                    if self.set_hidden(scene, true) {
                        reverse.push(TransitionOp::Show(scene));
                    }
                }
                TransitionOp::SetPrimary(scene) => {
                    if let Some(target) = self.container_mut(container) {
                        let previous = std::mem::replace(&mut target.primary, scene);
                        reverse.push(TransitionOp::SetPrimary(previous));
                    }
                }
            }
        }

        if let Some(name) = tx.back_stack_name() {
            reverse.reverse();
            if let Some(target) = self.container_mut(container) {
                target
                    .back_stack
                    .push(BackStackEntry::new(name.to_string(), reverse));
            }
        }

        applied
    }

    /// Destroy the scenes a committed transaction detached.
    pub(crate) fn finalize(&mut self, applied: Applied) {
        for scene in applied.doomed {
            self.destroy_scene(scene);
        }
    }

    /// Cut the back stack at the last entry named `name` and return the
    /// transaction that undoes everything cut. `None` when no entry matches.
    pub(crate) fn take_back_stack(
        &mut self,
        container: ContainerKey,
        name: &str,
        inclusive: bool,
    ) -> Option<Transaction> {
        let target = self.container_mut(container)?;
        let index = target
            .back_stack
            .iter()
            .rposition(|entry| entry.name() == name)?;
        let cut = if inclusive { index } else { index + 1 };
        let popped: Vec<BackStackEntry> = target.back_stack.drain(cut..).collect();

        let mut tx = Transaction::new(container).with_transit(Transit::Close);
        for entry in popped.into_iter().rev() {
            for op in entry.reverse {
                tx.push_op(op);
            }
        }
        Some(tx)
    }

    /// Host driven teardown: every scene in the container goes, recursively.
    pub(crate) fn destroy_container(&mut self, key: ContainerKey) {
        let Some(container) = self.container_mut(key) else {
            return;
        };
        container.destroyed = true;
        container.primary = None;
        let mut victims: Vec<SceneKey> = container.attached.drain(..).collect();
        for entry in container.back_stack.drain(..) {
            victims.extend(entry.reverse.iter().filter_map(|op| match op {
                TransitionOp::Add(scene) => Some(*scene),
                _ => None,
            }));
        }

        for victim in victims {
            let Some(scene) = self.scene_mut(victim) else {
                continue;
            };
            // Retained scenes that were re-attached elsewhere are not ours.
            if scene.added && scene.container != Some(key) {
                continue;
            }
            scene.added = false;
            scene.removing = true;
            self.destroy_scene(victim);
        }
    }

    fn attach(&mut self, container: ContainerKey, scene: SceneKey) -> bool {
        if self.is_container_destroyed(container) {
            return false;
        }
        let Some(node) = self.scene_mut(scene) else {
            return false;
        };
        if node.added {
            return false;
        }
        node.container = Some(container);
        node.added = true;
        node.hidden = false;
        node.removing = false;
        if let Some(target) = self.container_mut(container) {
            target.attached.push(scene);
        }
        true
    }

    fn detach(&mut self, scene: SceneKey) -> bool {
        let Some(node) = self.scene_mut(scene) else {
            return false;
        };
        if !node.added {
            return false;
        }
        node.added = false;
        node.hidden = false;
        node.removing = true;
        let owner = node.container;

        if let Some(target) = owner.and_then(|key| self.container_mut(key)) {
            target.attached.retain(|key| *key != scene);
            if target.primary == Some(scene) {
                target.primary = None;
            }
        }
        true
    }

    fn set_hidden(&mut self, scene: SceneKey, hidden: bool) -> bool {
        match self.scene_mut(scene) {
            Some(node) if node.added && node.hidden != hidden => {
                node.hidden = hidden;
                true
            }
            _ => false,
        }
    }

    fn destroy_scene(&mut self, key: SceneKey) {
        match self.scene(key) {
            // Re-attached later in the same transaction.
            Some(scene) if scene.added => return,
            Some(_) => {}
            None => return,
        }

        let Some(scene) = self.scenes.remove(key.0) else {
            return;
        };
        let child = scene.child_container();
        self.destroy_container(child);
        self.containers.remove(child.0);

        if let Some(presenter) = scene.presenting.and_then(|p| self.scene_mut(p)) {
            if presenter.presented == Some(key) {
                presenter.presented = None;
            }
        }
        if let Some(presented) = scene.presented.and_then(|p| self.scene_mut(p)) {
            if presented.presenting == Some(key) {
                presented.presenting = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(ids: &[&str]) -> (SceneTree, Vec<SceneKey>) {
        let mut tree = SceneTree::new();
        let keys = ids
            .iter()
            .map(|id| tree.insert_scene(SceneBuilder::new(*id)))
            .collect();
        (tree, keys)
    }

    fn commit(tree: &mut SceneTree, tx: Transaction) {
        let applied = tree.apply(&tx);
        tree.finalize(applied);
    }

    #[test]
    fn recorded_push_is_reversed_by_pop() {
        let (mut tree, keys) = tree_with(&["a", "b"]);
        let root = tree.root();
        commit(&mut tree, Transaction::new(root).add(keys[0]).add_to_back_stack("a"));
        commit(
            &mut tree,
            Transaction::new(root)
                .hide(keys[0])
                .add(keys[1])
                .add_to_back_stack("b"),
        );
        assert!(tree.scene(keys[0]).unwrap().is_hidden());
        assert_eq!(tree.front_scene(root), Some(keys[1]));

        let pop = tree.take_back_stack(root, "b", true).expect("entry");
        assert_eq!(
            pop.ops(),
            &[TransitionOp::Remove(keys[1]), TransitionOp::Show(keys[0])]
        );
        commit(&mut tree, pop);

        assert!(tree.is_destroyed(keys[1]));
        assert!(!tree.scene(keys[0]).unwrap().is_hidden());
        assert_eq!(tree.container(root).unwrap().back_stack_len(), 1);
    }

    #[test]
    fn missing_back_stack_name_yields_nothing() {
        let (mut tree, _) = tree_with(&[]);
        let root = tree.root();
        assert!(tree.take_back_stack(root, "ghost", true).is_none());
    }

    #[test]
    fn destroying_a_scene_cascades_into_children() {
        let (mut tree, keys) = tree_with(&["host", "child", "grandchild"]);
        let root = tree.root();
        let host_child = tree.scene(keys[0]).unwrap().child_container();
        let child_child = tree.scene(keys[1]).unwrap().child_container();
        commit(&mut tree, Transaction::new(root).add(keys[0]));
        commit(&mut tree, Transaction::new(host_child).add(keys[1]));
        commit(&mut tree, Transaction::new(child_child).add(keys[2]));

        commit(&mut tree, Transaction::new(root).remove(keys[0]));

        assert!(keys.iter().all(|key| tree.is_destroyed(*key)));
        assert!(tree.is_container_destroyed(host_child));
        assert!(tree.is_container_destroyed(child_child));
        assert_eq!(tree.scene_count(), 0);
    }

    #[test]
    fn removing_flag_propagates_to_descendants() {
        let (mut tree, keys) = tree_with(&["host", "child"]);
        let root = tree.root();
        let host_child = tree.scene(keys[0]).unwrap().child_container();
        commit(&mut tree, Transaction::new(root).add(keys[0]));
        commit(&mut tree, Transaction::new(host_child).add(keys[1]));
        assert!(!tree.is_removing_along_with_parent(keys[1]));

        tree.scene_mut(keys[0]).unwrap().removing = true;
        assert!(tree.is_removing_along_with_parent(keys[1]));
        assert!(!tree.is_removing(keys[1]));
    }

    #[test]
    fn destroyed_presented_scene_clears_presenter_link() {
        let (mut tree, keys) = tree_with(&["presenter", "modal"]);
        let root = tree.root();
        commit(&mut tree, Transaction::new(root).add(keys[0]).add(keys[1]));
        tree.scene_mut(keys[0]).unwrap().presented = Some(keys[1]);
        tree.scene_mut(keys[1]).unwrap().presenting = Some(keys[0]);

        commit(&mut tree, Transaction::new(root).remove(keys[1]));
        assert_eq!(tree.scene(keys[0]).unwrap().presented_scene(), None);
    }

    #[test]
    fn ancestor_check_walks_hosts() {
        let (mut tree, keys) = tree_with(&["outer", "inner"]);
        let root = tree.root();
        let outer_child = tree.scene(keys[0]).unwrap().child_container();
        let inner_child = tree.scene(keys[1]).unwrap().child_container();
        commit(&mut tree, Transaction::new(root).add(keys[0]));
        commit(&mut tree, Transaction::new(outer_child).add(keys[1]));

        assert!(tree.is_ancestor_or_self(keys[0], inner_child));
        assert!(tree.is_ancestor_or_self(keys[1], inner_child));
        assert!(!tree.is_ancestor_or_self(keys[1], root));
    }
}
