#![forbid(unsafe_code)]

//! Registry of named binding contexts.
//!
//! The [`BindingManager`] owns every [`BindingContext`] of an application
//! session, keyed by name, and runs the post-update hook after any of them
//! reacted to a user change.
//!
//! # Context Lifecycle
//!
//! ```text
//!  absent ──create_context──▶ active ──remove_context──▶ absent
//!    │                          ▲
//!    └───────context(name)──────┘   (lazy, default behaviors)
//! ```
//!
//! `create_context` on an active name fails with
//! [`BindingError::DuplicateContext`]; the existing context is untouched.
//!
//! # After Update
//!
//! [`BindingManager::after_update_ui`] runs after every model change of a
//! managed context:
//!
//! 1. each registered [`UiUpdateObserver`] is notified once, on a snapshot of
//!    the registry, so observers may register or unregister while notified;
//! 2. messages from the [`ValidationService`] are sorted by descending
//!    severity and displayed in every context, in creation order.
//!
//! # Threads
//!
//! The manager and its contexts belong to the UI thread. The observer list
//! and the context names live in a [`registry`](crate::registry) shared
//! through [`ManagerHandle`], so other threads may register observers while
//! a pass runs.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use ahash::AHashMap;
use pmo_core::{BindingError, MessageList};
use pmo_dispatch::{PropertyBehaviorProvider, no_behavior_provider};
use tracing::{debug, info, info_span};
use web_time::Instant;

use crate::config::BindingConfig;
use crate::context::{BindingContext, elapsed_us};
use crate::registry::{ManagerHandle, SharedObserver, SharedRegistry};

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Supplies the current validation messages.
pub trait ValidationService {
    /// All current messages, in no particular order.
    fn filtered_messages(&self) -> MessageList;
}

impl<F: Fn() -> MessageList> ValidationService for F {
    fn filtered_messages(&self) -> MessageList {
        self()
    }
}

/// A validation service that never reports anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidation;

impl ValidationService for NoValidation {
    fn filtered_messages(&self) -> MessageList {
        MessageList::new()
    }
}

/// Notified after the UI of a managed context was updated.
///
/// The manager's registry holds [`SharedObserver`]s, so registered observers
/// are `Send + Sync`.
pub trait UiUpdateObserver {
    /// The UI has been updated.
    fn ui_updated(&self);
}

// ---------------------------------------------------------------------------
// BindingManager
// ---------------------------------------------------------------------------

struct ManagerInner {
    validation: Rc<dyn ValidationService>,
    behavior: Rc<dyn PropertyBehaviorProvider>,
    config: BindingConfig,
    contexts: RefCell<AHashMap<String, BindingContext>>,
    shared: Arc<SharedRegistry>,
}

/// Owns named binding contexts and the post-update hook.
///
/// Handles are cheap clones of state owned by the UI thread; use
/// [`BindingManager::handle`] to reach the registries from other threads.
#[derive(Clone)]
pub struct BindingManager {
    inner: Rc<ManagerInner>,
}

impl BindingManager {
    /// A manager using `validation` and default settings.
    pub fn new(validation: Rc<dyn ValidationService>) -> Self {
        Self::with_config(BindingConfig::default(), validation)
    }

    /// A manager using `validation` and `config`.
    pub fn with_config(config: BindingConfig, validation: Rc<dyn ValidationService>) -> Self {
        Self::build(config, validation, no_behavior_provider())
    }

    /// A manager whose lazily created contexts use `behavior`.
    pub fn with_default_behavior(
        config: BindingConfig,
        validation: Rc<dyn ValidationService>,
        behavior: Rc<dyn PropertyBehaviorProvider>,
    ) -> Self {
        Self::build(config, validation, behavior)
    }

    fn build(
        config: BindingConfig,
        validation: Rc<dyn ValidationService>,
        behavior: Rc<dyn PropertyBehaviorProvider>,
    ) -> Self {
        Self {
            inner: Rc::new(ManagerInner {
                validation,
                behavior,
                config,
                contexts: RefCell::new(AHashMap::new()),
                shared: Arc::new(SharedRegistry::new()),
            }),
        }
    }

    /// Settings handed to every context.
    pub fn config(&self) -> &BindingConfig {
        &self.inner.config
    }

    /// A `Send + Sync` handle to the observer and context-name registries.
    pub fn handle(&self) -> ManagerHandle {
        ManagerHandle::new(Arc::clone(&self.inner.shared))
    }

    // -----------------------------------------------------------------------
    // Contexts
    // -----------------------------------------------------------------------

    /// Create the context `name` with `behavior`.
    ///
    /// Fails if a context of that name exists.
    pub fn create_context(
        &self,
        name: &str,
        behavior: Rc<dyn PropertyBehaviorProvider>,
    ) -> Result<BindingContext, BindingError> {
        if self.inner.contexts.borrow().contains_key(name) {
            return Err(BindingError::DuplicateContext {
                name: name.to_owned(),
            });
        }
        Ok(self.insert(name, behavior))
    }

    /// The context `name`, created with the default behaviors if absent.
    pub fn context(&self, name: &str) -> BindingContext {
        if let Some(existing) = self.existing_context(name) {
            return existing;
        }
        self.insert(name, Rc::clone(&self.inner.behavior))
    }

    /// Alias of [`context`](Self::context).
    pub fn get_context(&self, name: &str) -> BindingContext {
        self.context(name)
    }

    /// The context `name` if it exists. Never creates.
    pub fn existing_context(&self, name: &str) -> Option<BindingContext> {
        self.inner.contexts.borrow().get(name).cloned()
    }

    /// Remove the context `name`, returning it.
    pub fn remove_context(&self, name: &str) -> Option<BindingContext> {
        let removed = self.inner.contexts.borrow_mut().remove(name);
        if removed.is_some() {
            self.inner.shared.remove_name(name);
            debug!(context = name, "binding context removed");
        }
        removed
    }

    /// Remove every context.
    pub fn remove_all_contexts(&self) {
        self.inner.contexts.borrow_mut().clear();
        self.inner.shared.clear_names();
    }

    /// Managed contexts in creation order.
    pub fn contexts(&self) -> Vec<BindingContext> {
        let contexts = self.inner.contexts.borrow();
        self.inner
            .shared
            .names()
            .iter()
            .filter_map(|name| contexts.get(name).cloned())
            .collect()
    }

    fn insert(&self, name: &str, behavior: Rc<dyn PropertyBehaviorProvider>) -> BindingContext {
        let weak: Weak<ManagerInner> = Rc::downgrade(&self.inner);
        let context = BindingContext::builder(name)
            .behavior(behavior)
            .config(self.inner.config.clone())
            .after_update(move || {
                if let Some(inner) = weak.upgrade() {
                    BindingManager { inner }.after_update_ui();
                }
                Ok(())
            })
            .build();
        self.inner
            .contexts
            .borrow_mut()
            .insert(name.to_owned(), context.clone());
        self.inner.shared.push_name(name);
        debug!(context = name, "binding context created");
        context
    }

    // -----------------------------------------------------------------------
    // Observers
    // -----------------------------------------------------------------------

    /// Register `observer`. Registering the same observer twice has no effect.
    pub fn add_ui_update_observer(&self, observer: SharedObserver) {
        self.inner.shared.add_observer(&observer);
    }

    /// Unregister `observer`.
    pub fn remove_ui_update_observer(&self, observer: &SharedObserver) {
        self.inner.shared.remove_observer(observer);
    }

    /// Number of registered observers.
    pub fn observer_count(&self) -> usize {
        self.inner.shared.observers().len()
    }

    // -----------------------------------------------------------------------
    // After update
    // -----------------------------------------------------------------------

    /// Notify observers, then display sorted validation messages everywhere.
    pub fn after_update_ui(&self) {
        let start = Instant::now();
        let observers = self.inner.shared.observers();
        let contexts = self.contexts();
        let _span = info_span!(
            "binding_manager.after_update_ui",
            observers = observers.len(),
            contexts = contexts.len(),
            duration_us = tracing::field::Empty
        )
        .entered();

        for observer in observers.iter() {
            observer.ui_updated();
        }

        let messages = self.inner.validation.filtered_messages();
        let messages = if self.inner.config.sort_messages {
            messages.sorted_by_severity()
        } else {
            messages
        };
        for context in &contexts {
            context.display_messages(&messages);
        }

        let duration_us = elapsed_us(start);
        tracing::Span::current().record("duration_us", duration_us);
        info!(
            messages = messages.len(),
            severity = ?messages.severity(),
            duration_us,
            "validation messages displayed"
        );
    }
}

impl fmt::Debug for BindingManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingManager")
            .field("contexts", &*self.inner.shared.names())
            .field("observers", &self.observer_count())
            .field("config", &self.inner.config)
            .finish()
    }
}
