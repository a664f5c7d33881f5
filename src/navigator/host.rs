use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::error::{HostError, HostResult};
use crate::scene::{SceneKey, SceneResult};
use crate::transaction::Transaction;
use crate::tree::{ContainerKey, SceneTree};

/// Rendering collaborator the navigator hands transitions to.
///
/// `commit` runs after the tree already reflects the transaction and before
/// the navigator returns, so the host sees the final structure and can still
/// inspect scenes that are on their way out (`is_removing` is set on them).
pub trait TransitionHost: Send {
    fn commit(&mut self, tree: &SceneTree, transaction: &Transaction) -> HostResult<()>;

    fn deliver_result(&mut self, target: SceneKey, result: &SceneResult);
}

/// Host that accepts everything and renders nothing.
#[derive(Debug, Default)]
pub struct NullHost;

impl TransitionHost for NullHost {
    fn commit(&mut self, _tree: &SceneTree, _transaction: &Transaction) -> HostResult<()> {
        Ok(())
    }

    fn deliver_result(&mut self, _target: SceneKey, _result: &SceneResult) {}
}

/// What a [`RecordingHost`] saw, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Commit(Transaction),
    Result(SceneKey, SceneResult),
}

/// Host that records calls into a shared log and can be told to fail commits,
/// either wholesale or for containers whose view it has dropped.
#[derive(Clone, Default)]
pub struct RecordingHost {
    calls: Arc<Mutex<Vec<HostCall>>>,
    fail_commits: Arc<Mutex<bool>>,
    dropped_views: Arc<Mutex<HashSet<ContainerKey>>>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn commits(&self) -> Vec<Transaction> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Commit(tx) => Some(tx),
                HostCall::Result(..) => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<(SceneKey, SceneResult)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Result(target, result) => Some((target, result)),
                HostCall::Commit(_) => None,
            })
            .collect()
    }

    pub fn fail_commits(&self, fail: bool) {
        if let Ok(mut guard) = self.fail_commits.lock() {
            *guard = fail;
        }
    }

    /// Forget the view backing `container`; later commits against it fail
    /// with [`HostError::MissingView`].
    pub fn drop_view(&self, container: ContainerKey) {
        if let Ok(mut guard) = self.dropped_views.lock() {
            guard.insert(container);
        }
    }

    fn has_view(&self, container: ContainerKey) -> bool {
        self.dropped_views
            .lock()
            .map(|guard| !guard.contains(&container))
            .unwrap_or(true)
    }

    fn push(&self, call: HostCall) {
        if let Ok(mut guard) = self.calls.lock() {
            guard.push(call);
        }
    }
}

impl TransitionHost for RecordingHost {
    fn commit(&mut self, _tree: &SceneTree, transaction: &Transaction) -> HostResult<()> {
        self.push(HostCall::Commit(transaction.clone()));
        let failing = self.fail_commits.lock().map(|guard| *guard).unwrap_or(false);
        if failing {
            return Err(HostError::Commit("recording host set to fail".to_string()));
        }
        if !self.has_view(transaction.container()) {
            return Err(HostError::MissingView(transaction.container()));
        }
        Ok(())
    }

    fn deliver_result(&mut self, target: SceneKey, result: &SceneResult) {
        self.push(HostCall::Result(target, result.clone()));
    }
}
