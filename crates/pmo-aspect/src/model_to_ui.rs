#![forbid(unsafe_code)]

//! The common base of aspects flowing from model to UI.
//!
//! A [`ModelToUiAspectDefinition`] pulls its aspect from the dispatcher and
//! hands the value to a component setter. A null value goes to the null
//! hook, which by default passes `None` to the setter. Anything failing on
//! the way is routed through the definition's [`UiUpdateErrorPolicy`].
//!
//! Static definitions ([`ModelToUiAspectDefinition::once`]) update the
//! component while the updater is created and hand back a no-op updater.

use std::fmt;
use std::rc::Rc;

use pmo_core::{Aspect, BindingError, ComponentWrapper, FromValue, Value, WrapperType};
use pmo_dispatch::PropertyDispatcher;
use tracing::{error, trace};

use crate::definition::{AspectDefinition, UiUpdater};

type Setter<V> = Rc<dyn Fn(&dyn ComponentWrapper, Option<V>) -> Result<(), BindingError>>;
type NullHook = Rc<dyn Fn(&dyn ComponentWrapper) -> Result<(), BindingError>>;
type PolicyFn = Rc<dyn Fn(BindingError, &PropertyDispatcher, &Aspect<Value>) -> Result<(), BindingError>>;

/// What a model-to-UI definition does with a failed pull or apply.
///
/// The policy receives the original error, the dispatcher and the aspect.
/// Returning `Ok` lets the update pass continue.
#[derive(Clone)]
pub struct UiUpdateErrorPolicy {
    name: &'static str,
    handle: PolicyFn,
}

fn wrap_ui_update(
    source: BindingError,
    dispatcher: &PropertyDispatcher,
    aspect: &Aspect<Value>,
) -> Result<(), BindingError> {
    Err(BindingError::UiUpdate {
        aspect: aspect.to_string(),
        dispatcher: dispatcher.to_string(),
        source: Box::new(source),
    })
}

fn log_ui_update(
    source: BindingError,
    dispatcher: &PropertyDispatcher,
    aspect: &Aspect<Value>,
) -> Result<(), BindingError> {
    error!(
        aspect = %aspect,
        dispatcher = %dispatcher,
        error = %source,
        "ui update failed"
    );
    Ok(())
}

impl UiUpdateErrorPolicy {
    /// Wrap the failure in [`BindingError::UiUpdate`] and return it.
    #[must_use]
    pub fn propagate() -> Self {
        Self {
            name: "propagate",
            handle: Rc::new(wrap_ui_update),
        }
    }

    /// Report the failure through `tracing` and continue.
    #[must_use]
    pub fn log() -> Self {
        Self {
            name: "log",
            handle: Rc::new(log_ui_update),
        }
    }

    /// A caller-supplied policy.
    pub fn custom(
        name: &'static str,
        handle: impl Fn(BindingError, &PropertyDispatcher, &Aspect<Value>) -> Result<(), BindingError>
        + 'static,
    ) -> Self {
        Self {
            name,
            handle: Rc::new(handle),
        }
    }

    /// Policy name, for diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Apply the policy to `error`.
    pub fn handle(
        &self,
        error: BindingError,
        dispatcher: &PropertyDispatcher,
        aspect: &Aspect<Value>,
    ) -> Result<(), BindingError> {
        (self.handle)(error, dispatcher, aspect)
    }
}

impl Default for UiUpdateErrorPolicy {
    fn default() -> Self {
        Self::propagate()
    }
}

impl fmt::Debug for UiUpdateErrorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UiUpdateErrorPolicy({})", self.name)
    }
}

/// Pulls an aspect and applies it to the component through a setter.
pub struct ModelToUiAspectDefinition<V> {
    aspect: Aspect<V>,
    supported: WrapperType,
    setter: Setter<V>,
    null_hook: Option<NullHook>,
    policy: UiUpdateErrorPolicy,
    once: bool,
}

impl<V> Clone for ModelToUiAspectDefinition<V>
where
    V: Clone,
{
    fn clone(&self) -> Self {
        Self {
            aspect: self.aspect.clone(),
            supported: self.supported,
            setter: Rc::clone(&self.setter),
            null_hook: self.null_hook.clone(),
            policy: self.policy.clone(),
            once: self.once,
        }
    }
}

impl<V> ModelToUiAspectDefinition<V>
where
    V: FromValue + Into<Value> + Clone + 'static,
{
    /// Apply `aspect` to components of `supported` type (or derived types).
    pub fn new(
        aspect: Aspect<V>,
        supported: WrapperType,
        setter: impl Fn(&dyn ComponentWrapper, Option<V>) -> Result<(), BindingError> + 'static,
    ) -> Self {
        Self {
            aspect,
            supported,
            setter: Rc::new(setter),
            null_hook: None,
            policy: UiUpdateErrorPolicy::default(),
            once: false,
        }
    }

    /// Handle null values with `hook` instead of passing `None` to the setter.
    #[must_use]
    pub fn on_null(
        mut self,
        hook: impl Fn(&dyn ComponentWrapper) -> Result<(), BindingError> + 'static,
    ) -> Self {
        self.null_hook = Some(Rc::new(hook));
        self
    }

    /// Replace the error policy.
    #[must_use]
    pub fn error_policy(mut self, policy: UiUpdateErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Update once at creation; the returned updater does nothing.
    #[must_use]
    pub fn once(mut self) -> Self {
        self.once = true;
        self
    }

    /// The aspect pulled on every update.
    #[must_use]
    pub fn aspect(&self) -> &Aspect<V> {
        &self.aspect
    }

    /// Whether this is a static, update-once definition.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.once
    }

    fn update(
        &self,
        dispatcher: &PropertyDispatcher,
        wrapper: &dyn ComponentWrapper,
    ) -> Result<(), BindingError> {
        let applied = dispatcher
            .pull_as(&self.aspect)
            .and_then(|value| match (value, &self.null_hook) {
                (Some(value), _) => (self.setter)(wrapper, Some(value)),
                (None, Some(hook)) => hook(wrapper),
                (None, None) => (self.setter)(wrapper, None),
            });
        match applied {
            Ok(()) => {
                trace!(aspect = %self.aspect, dispatcher = %dispatcher, "aspect applied");
                Ok(())
            }
            Err(err) => {
                let erased = self.aspect.clone().map(Into::into);
                self.policy.handle(err, dispatcher, &erased)
            }
        }
    }
}

impl<V> AspectDefinition for ModelToUiAspectDefinition<V>
where
    V: FromValue + Into<Value> + Clone + 'static,
{
    fn name(&self) -> String {
        self.aspect.to_string()
    }

    fn supports(&self, wrapper_type: WrapperType) -> bool {
        wrapper_type.is(self.supported)
    }

    fn create_ui_updater(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError> {
        if self.once {
            self.update(dispatcher, wrapper.as_ref())?;
            return Ok(UiUpdater::noop());
        }
        let definition = self.clone();
        let dispatcher = Rc::clone(dispatcher);
        let wrapper = Rc::clone(wrapper);
        Ok(UiUpdater::new(move || {
            definition.update(&dispatcher, wrapper.as_ref())
        }))
    }
}

impl<V: fmt::Debug> fmt::Debug for ModelToUiAspectDefinition<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelToUiAspectDefinition")
            .field("aspect", &self.aspect)
            .field("supported", &self.supported)
            .field("policy", &self.policy)
            .field("once", &self.once)
            .finish()
    }
}
