#![forbid(unsafe_code)]

//! Bindings between one component and one bound property.
//!
//! An [`ElementBinding`] owns the dispatcher of a property, the composite
//! aspect definition describing which aspects apply, and the combined
//! [`UiUpdater`] built from it. Creating the binding wires the UI-to-model
//! direction first, so a user edit arriving during the first update is
//! already routed to the model.
//!
//! # Failure Modes
//!
//! - Wiring or creating the updater fails: [`ElementBinding::new`] returns the
//!   error and no binding exists.
//! - The updater fails: [`Binding::update_from_pmo`] returns
//!   [`BindingError::BindingUpdate`] wrapping the cause; `post_update` is
//!   skipped for that pass.

use std::fmt;
use std::rc::Rc;

use pmo_aspect::{AspectDefinition, CompositeAspectDefinition, ModelChanged, UiUpdater};
use pmo_core::{BindingError, BoundObject, ComponentWrapper, MessageList, ObjectId};
use pmo_dispatch::PropertyDispatcher;

use crate::context::BindingContext;

/// A live link between a component and presentation model state.
pub trait Binding {
    /// Pull every applicable aspect and apply it to the component.
    fn update_from_pmo(&self) -> Result<(), BindingError>;

    /// Show the messages relevant to this binding and return them.
    fn display_messages(&self, messages: &MessageList) -> MessageList;

    /// The wrapper of the bound component.
    fn wrapper(&self) -> &Rc<dyn ComponentWrapper>;

    /// The presentation model object this binding reads from.
    fn bound_object(&self) -> &Rc<dyn BoundObject>;

    /// Bindings nested below this one, if it binds a container.
    fn nested_context(&self) -> Option<&BindingContext> {
        None
    }

    /// Human-readable identity used in errors and logs.
    fn describe(&self) -> String;
}

/// Binds one component to one property through a dispatcher chain.
pub struct ElementBinding {
    wrapper: Rc<dyn ComponentWrapper>,
    dispatcher: Rc<PropertyDispatcher>,
    definition: CompositeAspectDefinition,
    updater: UiUpdater,
}

impl ElementBinding {
    /// Wire model updates and build the UI updater.
    ///
    /// Does not update the component; the owning context does that once the
    /// binding is registered.
    pub fn new(
        wrapper: Rc<dyn ComponentWrapper>,
        dispatcher: Rc<PropertyDispatcher>,
        model_changed: ModelChanged,
        definition: CompositeAspectDefinition,
    ) -> Result<Self, BindingError> {
        definition.init_model_update(&dispatcher, &wrapper, &model_changed)?;
        let updater = definition.create_ui_updater(&dispatcher, &wrapper)?;
        Ok(Self {
            wrapper,
            dispatcher,
            definition,
            updater,
        })
    }

    /// The dispatcher resolving this binding's aspects.
    pub fn dispatcher(&self) -> &Rc<PropertyDispatcher> {
        &self.dispatcher
    }

    /// The aspect definitions of the bound property.
    pub fn definition(&self) -> &CompositeAspectDefinition {
        &self.definition
    }
}

impl Binding for ElementBinding {
    fn update_from_pmo(&self) -> Result<(), BindingError> {
        self.updater
            .apply()
            .map_err(|source| BindingError::BindingUpdate {
                binding: self.describe(),
                source: Box::new(source),
            })?;
        self.wrapper.post_update();
        Ok(())
    }

    fn display_messages(&self, messages: &MessageList) -> MessageList {
        let relevant = self.dispatcher.messages(messages);
        self.wrapper.set_validation_messages(&relevant);
        relevant
    }

    fn wrapper(&self) -> &Rc<dyn ComponentWrapper> {
        &self.wrapper
    }

    fn bound_object(&self) -> &Rc<dyn BoundObject> {
        self.dispatcher.bound_object()
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ElementBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ElementBinding({} -> {})",
            self.wrapper.describe(),
            self.dispatcher
        )
    }
}

impl fmt::Debug for ElementBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBinding")
            .field("wrapper", &self.wrapper.describe())
            .field("dispatcher", &self.dispatcher)
            .field("definition", &self.definition.name())
            .finish()
    }
}

/// Identity of the object a binding reads from.
pub(crate) fn bound_object_id(binding: &dyn Binding) -> ObjectId {
    binding.bound_object().object_id()
}

/// Identity of the component a binding writes to.
pub(crate) fn wrapper_id(binding: &dyn Binding) -> ObjectId {
    ObjectId::of(binding.wrapper())
}
