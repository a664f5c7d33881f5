use serde_json::json;

use crate::logging::{LogLevel, json_kv};
use crate::metrics::NavigationMetrics;
use crate::scene::{AnimationKind, SceneKey};

use super::Navigator;
use super::audit::{NavigationAuditEvent, NavigationAuditStage};

impl Navigator {
    /// Tear down the chain `target` presented, starting at `presented`.
    ///
    /// `top_hint` names the frontmost scene when the caller already knows it;
    /// otherwise the scene in `target`'s container slot is used. The back
    /// stack is popped through `presented`'s entry and committed, and only
    /// then is `top`'s stored result delivered to `target`, exactly once.
    ///
    /// Without a resolvable top scene, or for a target that is gone, nothing
    /// happens and `false` is returned. A missing back-stack entry for
    /// `presented` only skips the pop; the result is still delivered.
    pub fn dismiss(
        &mut self,
        target: SceneKey,
        presented: SceneKey,
        top_hint: Option<SceneKey>,
    ) -> bool {
        // Container teardown destroys its scenes, so a destroyed container
        // shows up here as a stale target.
        let Some(container) = self.tree.scene(target).and_then(|node| node.container()) else {
            self.log_nav_event(
                LogLevel::Debug,
                "dismiss_skipped",
                [json_kv("reason", json!("target_gone"))],
            );
            return false;
        };
        let presented_id = self.scene_label(presented);

        if let Some(node) = self.tree.scene_mut(target) {
            node.animation = AnimationKind::Modal;
        }
        let top = top_hint
            .filter(|key| !self.tree.is_destroyed(*key))
            .or_else(|| self.tree.front_scene(container));
        let Some(top) = top else {
            self.log_nav_event(
                LogLevel::Debug,
                "dismiss_skipped",
                [json_kv("reason", json!("no_top_scene"))],
            );
            return false;
        };

        let result = match self.tree.scene_mut(top) {
            Some(node) => {
                node.animation = AnimationKind::Modal;
                node.user_visible = false;
                node.result.clone()
            }
            None => return false,
        };

        let popped = match self.tree.take_back_stack(container, &presented_id, true) {
            Some(tx) => {
                self.commit_now(tx);
                true
            }
            None => false,
        };

        self.with_metrics(NavigationMetrics::record_dismissal);
        self.audit(
            NavigationAuditEvent::new(NavigationAuditStage::DismissalCompleted)
                .detail("presented", presented_id.clone())
                .detail("popped", popped),
        );

        if self.tree.is_destroyed(target) {
            self.log_nav_event(
                LogLevel::Warn,
                "result_undeliverable",
                [json_kv("presented", json!(presented_id))],
            );
            return true;
        }
        self.host.deliver_result(target, &result);
        self.with_metrics(NavigationMetrics::record_result_delivered);
        self.audit(
            NavigationAuditEvent::new(NavigationAuditStage::ResultDelivered)
                .detail("target", self.scene_label(target))
                .detail("request_code", result.request_code),
        );
        self.log_nav_event(
            LogLevel::Debug,
            "scene_dismissed",
            [
                json_kv("target", json!(self.scene_label(target))),
                json_kv("presented", json!(presented_id)),
                json_kv("popped", json!(popped)),
                json_kv("result_code", json!(result.result_code)),
            ],
        );
        true
    }

    /// Dismiss `presented` back to whichever scene presented it.
    pub fn dismiss_presentation(&mut self, presented: SceneKey) -> bool {
        let Some(target) = self
            .tree
            .scene(presented)
            .and_then(|node| node.presenting_scene())
        else {
            return false;
        };
        self.dismiss(target, presented, None)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::navigator::audit::NavigationAuditStage;
    use crate::navigator::host::HostCall;
    use crate::navigator::test_support::Harness;
    use crate::scene::AnimationKind;

    #[test]
    fn dismiss_pops_chain_then_delivers_once() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let s1 = h.scene("S1");
        let s2 = h.scene("S2");
        let s3 = h.scene("S3");
        h.nav.push(root, s1, AnimationKind::Push).unwrap();
        assert!(h.nav.present(s1, s2, 42).unwrap());
        h.nav.push(root, s3, AnimationKind::Push).unwrap();
        h.nav.set_result(s3, 7, Some(json!({"picked": 3}))).unwrap();
        let calls_before = h.host.calls().len();

        assert!(h.nav.dismiss(s1, s2, Some(s3)));

        let calls = h.host.calls();
        let tail = &calls[calls_before..];
        assert_eq!(tail.len(), 2);
        assert!(matches!(&tail[0], HostCall::Commit(_)));
        match &tail[1] {
            HostCall::Result(target, result) => {
                assert_eq!(*target, s1);
                assert_eq!(result.result_code, 7);
                assert_eq!(result.data, Some(json!({"picked": 3})));
            }
            other => panic!("expected result delivery, got {other:?}"),
        }

        assert!(h.nav.is_destroyed(s2));
        assert!(h.nav.is_destroyed(s3));
        let presenter = h.nav.scene(s1).unwrap();
        assert!(!presenter.is_hidden());
        assert_eq!(presenter.presented_scene(), None);
        assert_eq!(presenter.animation(), AnimationKind::Modal);
        assert_eq!(h.nav.back_stack_len(root), 1);
        assert_eq!(h.nav.front_scene(root), Some(s1));

        let snapshot = h.snapshot();
        assert_eq!(snapshot.dismissals, 1);
        assert_eq!(snapshot.results_delivered, 1);
        let stages = h.audit.stages();
        let completed = stages
            .iter()
            .position(|stage| *stage == NavigationAuditStage::DismissalCompleted);
        let delivered = stages
            .iter()
            .position(|stage| *stage == NavigationAuditStage::ResultDelivered);
        assert!(completed < delivered);
    }

    #[test]
    fn dismiss_without_hint_uses_front_scene() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let home = h.scene("home");
        let modal = h.scene("modal");
        h.nav.push(root, home, AnimationKind::Push).unwrap();
        assert!(h.nav.present(home, modal, 5).unwrap());
        h.nav.set_result(modal, -1, None).unwrap();

        assert!(h.nav.dismiss_presentation(modal));

        let results = h.host.results();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, home);
        assert_eq!(results[0].1.request_code, 5);
        assert_eq!(results[0].1.result_code, -1);
        assert!(h.nav.is_destroyed(modal));
        assert!(h.nav.can_present(home, root));
    }

    #[test]
    fn dismiss_in_destroyed_container_is_noop() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let tabs = h.scene("tabs");
        h.nav.add_to_added_list(root, tabs, true).unwrap();
        let stack = h.child_of(tabs);
        let s1 = h.scene("s1");
        let s2 = h.scene("s2");
        h.nav.push(stack, s1, AnimationKind::Push).unwrap();
        h.nav.push(stack, s2, AnimationKind::Push).unwrap();
        h.nav.destroy_container(stack);
        let calls_before = h.host.calls().len();

        assert!(h.nav.is_destroyed(s1));
        assert!(!h.nav.dismiss(s1, s2, None));
        assert_eq!(h.host.calls().len(), calls_before);
        assert!(h.host.results().is_empty());
        assert_eq!(h.snapshot().dismissals, 0);
        assert!(
            h.logs
                .events()
                .iter()
                .any(|event| event.message == "dismiss_skipped"
                    && event.field("reason") == Some(&json!("target_gone")))
        );
    }

    #[test]
    fn second_dismissal_of_same_presentation_does_nothing() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let home = h.scene("home");
        let modal = h.scene("modal");
        h.nav.push(root, home, AnimationKind::Push).unwrap();
        assert!(h.nav.present(home, modal, 3).unwrap());

        assert!(h.nav.dismiss_presentation(modal));
        assert!(!h.nav.dismiss_presentation(modal));

        assert_eq!(h.host.results().len(), 1);
        assert_eq!(h.snapshot().dismissals, 1);
    }

    #[test]
    fn dismiss_without_top_scene_is_noop() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let only = h.dialog("only");
        assert!(h.nav.show_dialog(only, root).unwrap());
        let ghost = h.scene("ghost");
        let calls_before = h.host.calls().len();

        assert!(!h.nav.dismiss(only, ghost, None));
        assert_eq!(h.host.calls().len(), calls_before);
        assert!(h.host.results().is_empty());
        assert_eq!(h.snapshot().dismissals, 0);
    }

    #[test]
    fn missing_entry_still_delivers_result() {
        let mut h = Harness::new();
        let root = h.nav.root();
        let base = h.scene("base");
        h.nav.add_to_added_list(root, base, true).unwrap();
        let detached = h.scene("never-pushed");

        assert!(h.nav.dismiss(base, detached, None));

        assert_eq!(h.host.results().len(), 1);
        assert!(h.nav.is_added(base));
        assert!(!h.nav.scene(base).unwrap().is_user_visible());
        assert_eq!(h.snapshot().results_delivered, 1);
    }
}
