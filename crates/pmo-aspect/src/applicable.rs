#![forbid(unsafe_code)]

//! Aspect definitions gated on the concrete component.
//!
//! [`WrapperType`] filtering decides applicability per kind of element. The
//! wrappers here narrow it further, per component: by an arbitrary predicate
//! or by the runtime type of the wrapped widget. When the gate is closed the
//! inner definition is never called and a no-op updater is returned.

use std::any::{Any, TypeId, type_name};
use std::fmt;
use std::rc::Rc;

use pmo_core::{BindingError, ComponentWrapper, WrapperType};
use pmo_dispatch::PropertyDispatcher;

use crate::definition::{AspectDefinition, ModelChanged, UiUpdater};

type Predicate = Rc<dyn Fn(&dyn ComponentWrapper) -> bool>;

/// Applies the inner definition only when a predicate over the wrapper holds.
#[derive(Clone)]
pub struct ApplicableAspectDefinition {
    predicate: Predicate,
    inner: Rc<dyn AspectDefinition>,
}

impl ApplicableAspectDefinition {
    /// Gate `inner` on `predicate`.
    pub fn conditional(
        predicate: impl Fn(&dyn ComponentWrapper) -> bool + 'static,
        inner: impl AspectDefinition + 'static,
    ) -> Self {
        Self {
            predicate: Rc::new(predicate),
            inner: Rc::new(inner),
        }
    }

    fn applies(&self, wrapper: &Rc<dyn ComponentWrapper>) -> bool {
        (self.predicate)(wrapper.as_ref())
    }
}

impl AspectDefinition for ApplicableAspectDefinition {
    fn name(&self) -> String {
        format!("conditional({})", self.inner.name())
    }

    fn supports(&self, wrapper_type: WrapperType) -> bool {
        self.inner.supports(wrapper_type)
    }

    fn create_ui_updater(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError> {
        if self.applies(wrapper) {
            self.inner.create_ui_updater(dispatcher, wrapper)
        } else {
            Ok(UiUpdater::noop())
        }
    }

    fn init_model_update(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
        model_changed: &ModelChanged,
    ) -> Result<(), BindingError> {
        if self.applies(wrapper) {
            self.inner
                .init_model_update(dispatcher, wrapper, model_changed)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for ApplicableAspectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Applies the inner definition only to widgets of one concrete type.
#[derive(Clone)]
pub struct ApplicableTypeAspectDefinition {
    component_type: TypeId,
    component_type_name: &'static str,
    inner: Rc<dyn AspectDefinition>,
}

impl ApplicableTypeAspectDefinition {
    /// Delegate to `inner` iff the wrapped component is a `T`.
    pub fn if_component_type_is<T: Any>(inner: impl AspectDefinition + 'static) -> Self {
        Self {
            component_type: TypeId::of::<T>(),
            component_type_name: type_name::<T>(),
            inner: Rc::new(inner),
        }
    }

    fn applies(&self, wrapper: &Rc<dyn ComponentWrapper>) -> bool {
        wrapper.component().type_id() == self.component_type
    }
}

impl AspectDefinition for ApplicableTypeAspectDefinition {
    fn name(&self) -> String {
        format!("if {}: {}", self.component_type_name, self.inner.name())
    }

    fn supports(&self, wrapper_type: WrapperType) -> bool {
        self.inner.supports(wrapper_type)
    }

    fn create_ui_updater(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError> {
        if self.applies(wrapper) {
            self.inner.create_ui_updater(dispatcher, wrapper)
        } else {
            Ok(UiUpdater::noop())
        }
    }

    fn init_model_update(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
        model_changed: &ModelChanged,
    ) -> Result<(), BindingError> {
        if self.applies(wrapper) {
            self.inner
                .init_model_update(dispatcher, wrapper, model_changed)
        } else {
            Ok(())
        }
    }
}

impl fmt::Debug for ApplicableTypeAspectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}
