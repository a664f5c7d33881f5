//! Navigation controller.
//!
//! A [`Navigator`] owns one [`SceneTree`], the host collaborator and the
//! ambient plumbing (logger, metrics, audit). Operations are grouped by
//! concern across the submodules:
//!
//! - `registry`: scene lookup through nested containers.
//! - `back_stack`: push, attach, index and neighbour queries, popping.
//! - `modal`: active dialog resolution, presentation and dialog admission.
//! - `dismissal`: tearing down a presented chain and delivering results.
//!
//! Every structural change is applied and committed to the host before the
//! call returns.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use serde_json::{Value, json};

use crate::error::{NavError, Result};
use crate::logging::{LogLevel, Logger, event_with_fields, json_kv};
use crate::metrics::{MetricSnapshot, NavigationMetrics};
use crate::scene::{Scene, SceneBuilder, SceneKey};
use crate::transaction::Transaction;
use crate::tree::{Container, ContainerKey, SceneTree};

pub mod audit;
mod back_stack;
mod dismissal;
pub mod host;
mod modal;
mod registry;

use audit::{NavigationAudit, NavigationAuditEvent, NavigationAuditStage, NullNavigationAudit};
use host::TransitionHost;

const LOG_TARGET: &str = "scene_nav::navigator";

/// Configuration knobs for a navigator.
#[derive(Clone)]
pub struct NavigatorConfig {
    /// Optional structured logger.
    pub logger: Option<Logger>,
    /// Shared counters; `None` disables collection.
    pub metrics: Option<Arc<Mutex<NavigationMetrics>>>,
    /// Target used when emitting metrics snapshots.
    pub metrics_target: String,
    /// Deepest container nesting recursive lookups will descend into.
    pub max_depth: usize,
    pub audit: Arc<dyn NavigationAudit>,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            logger: None,
            metrics: None,
            metrics_target: "scene_nav::metrics".to_string(),
            max_depth: 32,
            audit: Arc::new(NullNavigationAudit),
        }
    }
}

impl NavigatorConfig {
    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn with_audit(mut self, audit: Arc<dyn NavigationAudit>) -> Self {
        self.audit = audit;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Enable metrics collection if it has not already been configured.
    pub fn enable_metrics(&mut self) {
        if self.metrics.is_none() {
            self.metrics = Some(Arc::new(Mutex::new(NavigationMetrics::new())));
        }
    }

    pub fn disable_metrics(&mut self) {
        self.metrics = None;
    }

    pub fn metrics_handle(&self) -> Option<Arc<Mutex<NavigationMetrics>>> {
        self.metrics.as_ref().map(Arc::clone)
    }
}

pub struct Navigator {
    tree: SceneTree,
    host: Box<dyn TransitionHost>,
    config: NavigatorConfig,
    started: Instant,
}

impl Navigator {
    pub fn new<H>(host: H) -> Self
    where
        H: TransitionHost + 'static,
    {
        Self::with_config(host, NavigatorConfig::default())
    }

    pub fn with_config<H>(host: H, config: NavigatorConfig) -> Self
    where
        H: TransitionHost + 'static,
    {
        Self {
            tree: SceneTree::new(),
            host: Box::new(host),
            config,
            started: Instant::now(),
        }
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut NavigatorConfig {
        &mut self.config
    }

    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    /// Top-level container every other container nests under.
    pub fn root(&self) -> ContainerKey {
        self.tree.root()
    }

    pub fn scene(&self, key: SceneKey) -> Option<&Scene> {
        self.tree.scene(key)
    }

    pub fn container(&self, key: ContainerKey) -> Option<&Container> {
        self.tree.container(key)
    }

    /// Insert a detached scene. It becomes visible once pushed, attached,
    /// presented or shown as a dialog.
    pub fn create_scene(&mut self, builder: SceneBuilder) -> SceneKey {
        self.tree.insert_scene(builder)
    }

    /// Store the result handed to the presenter when `scene` is dismissed.
    pub fn set_result(
        &mut self,
        scene: SceneKey,
        result_code: i32,
        data: Option<Value>,
    ) -> Result<()> {
        let node = self
            .tree
            .scene_mut(scene)
            .ok_or(NavError::UnknownScene(scene))?;
        node.result.result_code = result_code;
        node.result.data = data;
        Ok(())
    }

    pub fn is_container_destroyed(&self, container: ContainerKey) -> bool {
        self.tree.is_container_destroyed(container)
    }

    pub fn is_added(&self, scene: SceneKey) -> bool {
        self.tree.is_added(scene)
    }

    pub fn is_destroyed(&self, scene: SceneKey) -> bool {
        self.tree.is_destroyed(scene)
    }

    pub fn is_removing(&self, scene: SceneKey) -> bool {
        self.tree.is_removing(scene)
    }

    pub fn is_removing_along_with_parent(&self, scene: SceneKey) -> bool {
        self.tree.is_removing_along_with_parent(scene)
    }

    /// Tear down a container and everything attached under it. Called by the
    /// host when the view backing the container goes away.
    pub fn destroy_container(&mut self, container: ContainerKey) {
        if self.tree.is_container_destroyed(container) {
            return;
        }
        self.tree.destroy_container(container);
        self.log_nav_event(
            LogLevel::Info,
            "container_destroyed",
            [json_kv("container", json!(container.to_string()))],
        );
    }

    pub fn metrics_snapshot(&self) -> Option<MetricSnapshot> {
        let metrics = self.config.metrics.as_ref()?;
        let guard = metrics.lock().ok()?;
        Some(guard.snapshot(self.started.elapsed()))
    }

    /// Write a metrics snapshot to the configured logger.
    pub fn emit_metrics(&self) {
        let (Some(logger), Some(snapshot)) = (self.config.logger.as_ref(), self.metrics_snapshot())
        else {
            return;
        };
        let _ = logger.log_event(snapshot.to_log_event(&self.config.metrics_target));
    }

    /// Apply `tx` to the tree and flush it to the host.
    ///
    /// A host failure at this point cannot be undone: the tree already holds
    /// the new structure. It is reported at error level and dropped.
    pub(crate) fn commit_now(&mut self, tx: Transaction) {
        if tx.is_empty() && tx.back_stack_name().is_none() {
            return;
        }

        let applied = self.tree.apply(&tx);
        self.with_metrics(NavigationMetrics::record_transaction);

        match self.host.commit(&self.tree, &tx) {
            Ok(()) => {
                self.log_nav_event(
                    LogLevel::Trace,
                    "transition_committed",
                    [
                        json_kv("container", json!(tx.container().to_string())),
                        json_kv("ops", json!(tx.ops().len())),
                        json_kv("transit", json!(format!("{:?}", tx.transit()))),
                    ],
                );
                self.audit(
                    NavigationAuditEvent::new(NavigationAuditStage::TransitionCommitted)
                        .detail("ops", tx.ops().len()),
                );
            }
            Err(err) => {
                self.with_metrics(NavigationMetrics::record_commit_failure);
                self.log_nav_event(
                    LogLevel::Error,
                    "transition_commit_failed",
                    [
                        json_kv("container", json!(tx.container().to_string())),
                        json_kv("error", json!(err.to_string())),
                    ],
                );
                self.audit(
                    NavigationAuditEvent::new(NavigationAuditStage::CommitFailed)
                        .detail("error", err.to_string()),
                );
            }
        }

        self.tree.finalize(applied);
    }

    pub(crate) fn require_scene(&self, scene: SceneKey) -> Result<&Scene> {
        self.tree.scene(scene).ok_or(NavError::UnknownScene(scene))
    }

    /// Checks shared by every entry point that attaches a scene.
    pub(crate) fn ensure_attachable(&self, container: ContainerKey, scene: SceneKey) -> Result<()> {
        let node = self.require_scene(scene)?;
        if node.is_added() {
            return Err(NavError::AlreadyAttached(node.id().to_string()));
        }
        if self.tree.is_ancestor_or_self(scene, container) {
            return Err(NavError::WouldNest(node.id().to_string()));
        }
        Ok(())
    }

    pub(crate) fn scene_label(&self, scene: SceneKey) -> String {
        self.tree
            .scene(scene)
            .map(|node| node.id().to_string())
            .unwrap_or_else(|| scene.to_string())
    }

    pub(crate) fn log_nav_event<I>(&self, level: LogLevel, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.config.logger.as_ref() {
            if !logger.enabled(level) {
                return;
            }
            let event = event_with_fields(level, LOG_TARGET, message, fields);
            let _ = logger.log_event(event);
        }
    }

    pub(crate) fn log_depth_exceeded(&self, operation: &str, depth: usize) {
        self.log_nav_event(
            LogLevel::Warn,
            "depth_limit_reached",
            [
                json_kv("operation", json!(operation)),
                json_kv("depth", json!(depth)),
                json_kv("max_depth", json!(self.config.max_depth)),
            ],
        );
    }

    pub(crate) fn with_metrics(&self, record: impl FnOnce(&mut NavigationMetrics)) {
        if let Some(metrics) = self.config.metrics.as_ref() {
            if let Ok(mut guard) = metrics.lock() {
                record(&mut guard);
            }
        }
    }

    pub(crate) fn audit(&self, event: NavigationAuditEvent) {
        self.config.audit.record(event);
    }
}
