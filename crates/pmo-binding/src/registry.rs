#![forbid(unsafe_code)]

//! Thread-safe registries shared by a [`BindingManager`](crate::BindingManager).
//!
//! Bindings and contexts live on the UI thread. Two structures may be
//! touched from elsewhere: the list of [`UiUpdateObserver`]s and the names of
//! the managed contexts. Both are copy-on-write snapshots behind
//! [`arc_swap::ArcSwap`]; a [`ManagerHandle`] is the `Send + Sync` view of
//! them.
//!
//! | Operation | Cost |
//! |-----------|------|
//! | snapshot (`load_full`) | wait-free, one `Arc` clone |
//! | register / unregister | one `Vec` copy, retried on contention |
//!
//! # Invariants
//!
//! 1. An observer appears at most once (pointer identity).
//! 2. Iteration works on a snapshot: observers registered while a
//!    notification pass runs are seen from the next pass on, observers
//!    removed during a pass may still receive that pass.
//! 3. Context names keep creation order and match the manager's contexts
//!    after every manager operation returns.

use std::fmt;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::manager::UiUpdateObserver;

/// An observer that may be registered from any thread.
pub type SharedObserver = Arc<dyn UiUpdateObserver + Send + Sync>;

pub(crate) struct SharedRegistry {
    observers: ArcSwap<Vec<SharedObserver>>,
    context_names: ArcSwap<Vec<String>>,
}

impl SharedRegistry {
    pub(crate) fn new() -> Self {
        Self {
            observers: ArcSwap::from_pointee(Vec::new()),
            context_names: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub(crate) fn add_observer(&self, observer: &SharedObserver) {
        self.observers.rcu(|current| {
            let mut next: Vec<SharedObserver> = current.iter().cloned().collect();
            if !next.iter().any(|o| Arc::ptr_eq(o, observer)) {
                next.push(Arc::clone(observer));
            }
            next
        });
    }

    pub(crate) fn remove_observer(&self, observer: &SharedObserver) {
        self.observers.rcu(|current| {
            current
                .iter()
                .filter(|o| !Arc::ptr_eq(o, observer))
                .cloned()
                .collect::<Vec<_>>()
        });
    }

    pub(crate) fn observers(&self) -> Arc<Vec<SharedObserver>> {
        self.observers.load_full()
    }

    pub(crate) fn push_name(&self, name: &str) {
        self.context_names.rcu(|current| {
            let mut next: Vec<String> = current.iter().cloned().collect();
            next.push(name.to_owned());
            next
        });
    }

    pub(crate) fn remove_name(&self, name: &str) {
        self.context_names.rcu(|current| {
            current
                .iter()
                .filter(|n| n.as_str() != name)
                .cloned()
                .collect::<Vec<_>>()
        });
    }

    pub(crate) fn clear_names(&self) {
        self.context_names.store(Arc::new(Vec::new()));
    }

    pub(crate) fn names(&self) -> Arc<Vec<String>> {
        self.context_names.load_full()
    }
}

/// `Send + Sync` access to a manager's observers and context names.
///
/// Obtained from [`BindingManager::handle`](crate::BindingManager::handle).
/// Contexts themselves stay on the UI thread; other threads can only see
/// which ones exist.
#[derive(Clone)]
pub struct ManagerHandle {
    shared: Arc<SharedRegistry>,
}

impl ManagerHandle {
    pub(crate) fn new(shared: Arc<SharedRegistry>) -> Self {
        Self { shared }
    }

    /// Register `observer`. Registering the same observer twice has no effect.
    pub fn add_ui_update_observer(&self, observer: SharedObserver) {
        self.shared.add_observer(&observer);
    }

    /// Unregister `observer`.
    pub fn remove_ui_update_observer(&self, observer: &SharedObserver) {
        self.shared.remove_observer(observer);
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.shared.observers().len()
    }

    /// Names of the managed contexts in creation order.
    pub fn context_names(&self) -> Vec<String> {
        self.shared.names().as_ref().clone()
    }

    /// Whether a context called `name` is managed.
    pub fn has_context(&self, name: &str) -> bool {
        self.shared.names().iter().any(|n| n == name)
    }
}

impl fmt::Debug for ManagerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagerHandle")
            .field("contexts", &*self.shared.names())
            .field("observers", &self.observer_count())
            .finish()
    }
}
