#![forbid(unsafe_code)]

//! Binding contexts: the live bindings of one view.
//!
//! A [`BindingContext`] owns an ordered list of bindings. When the user edits
//! a bound component, the binding calls back into its context, which refreshes
//! every binding it owns and then runs its after-update callback (usually
//! [`BindingManager::after_update_ui`](crate::BindingManager::after_update_ui)).
//!
//! # Invariants
//!
//! 1. Bindings update in registration order.
//! 2. A component is bound at most once per context; binding it again
//!    replaces the previous binding in place.
//! 3. A failing binding never stops the rest of an update pass.
//! 4. Nested contexts of container bindings route model changes to their
//!    parent, so the whole view refreshes once per change.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | Binding fails during a pass | `warn!`, pass continues, failure collected |
//! | Any failure with `ui_update_errors = propagate` | [`BindingError::ContextUpdate`] listing all failures |
//! | Any failure with `ui_update_errors = log` | `Ok(())` |
//! | Pass slower than `slow_update_threshold_us` | `warn!` with the duration |
//! | Initial update of a new binding fails | binding stays registered, error returned |
//!
//! Handles are cheap clones of a shared, single-threaded context.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use pmo_aspect::{CompositeAspectDefinition, ModelChanged};
use pmo_core::{BindingError, BoundObject, BoundProperty, ComponentWrapper, MessageList, ObjectId};
use pmo_dispatch::{PropertyBehaviorProvider, PropertyDispatcher, no_behavior_provider};
use tracing::{debug, info_span, warn};
use web_time::{Duration, Instant};

use crate::config::{BindingConfig, UiUpdateErrors};
use crate::container::ContainerBinding;
use crate::descriptor::PmoDescriptor;
use crate::element::{Binding, ElementBinding, bound_object_id, wrapper_id};
use crate::manager::UiUpdateObserver;

/// Callback run after a context refreshed its bindings.
pub type AfterUpdate = Rc<dyn Fn() -> Result<(), BindingError>>;

struct ContextInner {
    name: String,
    behavior: Rc<dyn PropertyBehaviorProvider>,
    after_update: Option<AfterUpdate>,
    config: BindingConfig,
    parent: Option<Weak<ContextInner>>,
    bindings: RefCell<Vec<Rc<dyn Binding>>>,
}

/// The bindings of one view, updated together.
#[derive(Clone)]
pub struct BindingContext {
    inner: Rc<ContextInner>,
}

impl BindingContext {
    /// A standalone context without behaviors or after-update callback.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Start configuring a context.
    pub fn builder(name: impl Into<String>) -> BindingContextBuilder {
        BindingContextBuilder {
            name: name.into(),
            behavior: None,
            after_update: None,
            config: BindingConfig::default(),
        }
    }

    /// The context name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Behaviors consulted by every dispatcher this context builds.
    pub fn behavior_provider(&self) -> &Rc<dyn PropertyBehaviorProvider> {
        &self.inner.behavior
    }

    /// Settings this context was built with.
    pub fn config(&self) -> &BindingConfig {
        &self.inner.config
    }

    /// Identity of this context, shared by all its handles.
    pub fn id(&self) -> ObjectId {
        ObjectId::of(&self.inner)
    }

    /// The context a container binding nested this one in.
    pub fn parent(&self) -> Option<BindingContext> {
        self.inner
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Self { inner })
    }

    // -----------------------------------------------------------------------
    // Binding
    // -----------------------------------------------------------------------

    /// Bind `property` of `pmo` to `wrapper` and update the component.
    ///
    /// Replaces an existing binding of the same component.
    pub fn bind(
        &self,
        pmo: Rc<dyn BoundObject>,
        property: &BoundProperty,
        definition: CompositeAspectDefinition,
        wrapper: Rc<dyn ComponentWrapper>,
    ) -> Result<Rc<ElementBinding>, BindingError> {
        let binding = Rc::new(self.element_binding(pmo, property, definition, wrapper)?);
        self.add(Rc::clone(&binding) as Rc<dyn Binding>)?;
        Ok(binding)
    }

    /// Bind a layout to `property` of `pmo`.
    ///
    /// The returned binding owns a nested context for the layout's children;
    /// bind them through [`ContainerBinding::children`].
    pub fn bind_container(
        &self,
        pmo: Rc<dyn BoundObject>,
        property: &BoundProperty,
        definition: CompositeAspectDefinition,
        wrapper: Rc<dyn ComponentWrapper>,
    ) -> Result<Rc<ContainerBinding>, BindingError> {
        let children = self.child(&wrapper.id());
        let binding = self.element_binding(pmo, property, definition, wrapper)?;
        let container = Rc::new(ContainerBinding::new(binding, children));
        self.add(Rc::clone(&container) as Rc<dyn Binding>)?;
        Ok(container)
    }

    /// Bind every described property of `pmo` to the component `lookup`
    /// returns for the property name.
    ///
    /// Properties without a component are skipped. Stops at the first
    /// binding that fails to wire.
    pub fn bind_pmo(
        &self,
        pmo: &Rc<dyn BoundObject>,
        descriptor: &PmoDescriptor,
        lookup: impl Fn(&str) -> Option<Rc<dyn ComponentWrapper>>,
    ) -> Result<Vec<Rc<ElementBinding>>, BindingError> {
        let mut bound = Vec::with_capacity(descriptor.len());
        for property in descriptor.properties() {
            let name = property.bound_property().pmo_property();
            let Some(wrapper) = lookup(name) else {
                debug!(
                    context = %self.inner.name,
                    pmo = pmo.type_name(),
                    property = name,
                    "no component for described property"
                );
                continue;
            };
            bound.push(self.bind(
                Rc::clone(pmo),
                property.bound_property(),
                property.definition().clone(),
                wrapper,
            )?);
        }
        Ok(bound)
    }

    /// Register `binding` and update its component.
    ///
    /// A binding of the same component is replaced, keeping its position.
    pub fn add(&self, binding: Rc<dyn Binding>) -> Result<(), BindingError> {
        {
            let mut bindings = self.inner.bindings.borrow_mut();
            let key = wrapper_id(binding.as_ref());
            match bindings.iter_mut().find(|b| wrapper_id(b.as_ref()) == key) {
                Some(slot) => {
                    debug!(
                        context = %self.inner.name,
                        binding = %binding.describe(),
                        "replacing binding of component"
                    );
                    *slot = Rc::clone(&binding);
                }
                None => bindings.push(Rc::clone(&binding)),
            }
        }
        binding.update_from_pmo()
    }

    /// Snapshot of the registered bindings in registration order.
    pub fn bindings(&self) -> Vec<Rc<dyn Binding>> {
        self.inner.bindings.borrow().clone()
    }

    /// Number of bindings directly registered here.
    pub fn len(&self) -> usize {
        self.inner.bindings.borrow().len()
    }

    /// Whether no binding is registered here.
    pub fn is_empty(&self) -> bool {
        self.inner.bindings.borrow().is_empty()
    }

    /// Drop the bindings of the component with id `component_id`.
    pub fn remove_bindings_for_component(&self, component_id: &str) {
        self.inner
            .bindings
            .borrow_mut()
            .retain(|b| b.wrapper().id() != component_id);
    }

    /// Drop every binding reading from `pmo`, here and in nested contexts.
    pub fn remove_bindings_for_pmo(&self, pmo: ObjectId) {
        let kept = {
            let mut bindings = self.inner.bindings.borrow_mut();
            bindings.retain(|b| bound_object_id(b.as_ref()) != pmo);
            bindings.clone()
        };
        for binding in kept {
            if let Some(nested) = binding.nested_context() {
                nested.remove_bindings_for_pmo(pmo);
            }
        }
    }

    /// Drop all bindings.
    pub fn clear(&self) {
        self.inner.bindings.borrow_mut().clear();
    }

    // -----------------------------------------------------------------------
    // Updating
    // -----------------------------------------------------------------------

    /// React to a user change: refresh the view, then run the after-update
    /// callback.
    ///
    /// Nested contexts delegate to their parent. The callback runs even when
    /// the refresh failed; the refresh error takes precedence.
    pub fn model_changed(&self) -> Result<(), BindingError> {
        if let Some(parent) = self.parent() {
            return parent.model_changed();
        }
        let updated = self.update_ui();
        let after = match &self.inner.after_update {
            Some(after_update) => after_update(),
            None => Ok(()),
        };
        updated.and(after)
    }

    /// A [`ModelChanged`] callback for bindings of this context.
    ///
    /// Holds the context weakly; once the context is gone the callback does
    /// nothing.
    pub fn model_changed_callback(&self) -> ModelChanged {
        let weak = Rc::downgrade(&self.inner);
        Rc::new(move || match weak.upgrade() {
            Some(inner) => BindingContext { inner }.model_changed(),
            None => Ok(()),
        })
    }

    /// Refresh every binding, isolating failures.
    pub fn update_ui(&self) -> Result<(), BindingError> {
        let start = Instant::now();
        let bindings = self.bindings();
        let _span = info_span!(
            "binding_context.update_ui",
            context = %self.inner.name,
            bindings = bindings.len(),
            duration_us = tracing::field::Empty
        )
        .entered();

        let mut failures = Vec::new();
        for binding in &bindings {
            if let Err(err) = binding.update_from_pmo() {
                warn!(
                    context = %self.inner.name,
                    binding = %binding.describe(),
                    error = %err,
                    "binding failed to update"
                );
                failures.push(err);
            }
        }

        let duration_us = elapsed_us(start);
        tracing::Span::current().record("duration_us", duration_us);
        let threshold = self.inner.config.slow_update_threshold_us;
        if threshold > 0 && duration_us > threshold {
            warn!(
                context = %self.inner.name,
                bindings = bindings.len(),
                duration_us,
                threshold_us = threshold,
                "slow UI update pass"
            );
        }

        if failures.is_empty() || self.inner.config.ui_update_errors == UiUpdateErrors::Log {
            Ok(())
        } else {
            Err(BindingError::ContextUpdate {
                context: self.inner.name.clone(),
                failures,
            })
        }
    }

    /// Show the messages relevant to each binding; returns all shown messages.
    pub fn display_messages(&self, messages: &MessageList) -> MessageList {
        self.bindings()
            .iter()
            .flat_map(|binding| binding.display_messages(messages))
            .collect()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn element_binding(
        &self,
        pmo: Rc<dyn BoundObject>,
        property: &BoundProperty,
        definition: CompositeAspectDefinition,
        wrapper: Rc<dyn ComponentWrapper>,
    ) -> Result<ElementBinding, BindingError> {
        let dispatcher =
            PropertyDispatcher::standard(pmo, property, Rc::clone(&self.inner.behavior));
        ElementBinding::new(
            wrapper,
            Rc::new(dispatcher),
            self.model_changed_callback(),
            definition,
        )
    }

    fn child(&self, component_id: &str) -> BindingContext {
        BindingContext {
            inner: Rc::new(ContextInner {
                name: format!("{}/{component_id}", self.inner.name),
                behavior: Rc::clone(&self.inner.behavior),
                after_update: None,
                config: self.inner.config.clone(),
                parent: Some(Rc::downgrade(&self.inner)),
                bindings: RefCell::new(Vec::new()),
            }),
        }
    }
}

/// Lets a UI-thread notifier refresh a context. Contexts are not `Send`, so
/// they cannot join a manager's shared observer registry.
impl UiUpdateObserver for BindingContext {
    fn ui_updated(&self) {
        if let Err(err) = self.update_ui() {
            warn!(
                context = %self.inner.name,
                error = %err,
                "context refresh after UI update failed"
            );
        }
    }
}

impl fmt::Debug for BindingContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingContext")
            .field("name", &self.inner.name)
            .field("bindings", &self.len())
            .field("nested", &self.inner.parent.is_some())
            .finish()
    }
}

/// Microseconds since `start`, saturating at `u64::MAX`.
pub(crate) fn elapsed_us(start: Instant) -> u64 {
    saturating_micros(start.elapsed())
}

fn saturating_micros(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX)
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Configures a [`BindingContext`].
pub struct BindingContextBuilder {
    name: String,
    behavior: Option<Rc<dyn PropertyBehaviorProvider>>,
    after_update: Option<AfterUpdate>,
    config: BindingConfig,
}

impl BindingContextBuilder {
    /// Behaviors for every dispatcher of the context.
    #[must_use]
    pub fn behavior(mut self, provider: Rc<dyn PropertyBehaviorProvider>) -> Self {
        self.behavior = Some(provider);
        self
    }

    /// Callback run after each model change.
    #[must_use]
    pub fn after_update(
        mut self,
        after_update: impl Fn() -> Result<(), BindingError> + 'static,
    ) -> Self {
        self.after_update = Some(Rc::new(after_update));
        self
    }

    /// Update settings.
    #[must_use]
    pub fn config(mut self, config: BindingConfig) -> Self {
        self.config = config;
        self
    }

    /// Finish the context.
    #[must_use]
    pub fn build(self) -> BindingContext {
        BindingContext {
            inner: Rc::new(ContextInner {
                name: self.name,
                behavior: self.behavior.unwrap_or_else(no_behavior_provider),
                after_update: self.after_update,
                config: self.config,
                parent: None,
                bindings: RefCell::new(Vec::new()),
            }),
        }
    }
}
