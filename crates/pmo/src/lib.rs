#![forbid(unsafe_code)]

//! Presentation-model data binding: public facade crate.
//!
//! This crate provides the stable, ergonomic surface area for users. It
//! re-exports common types from the internal crates and offers a prelude for
//! day-to-day usage.
//!
//! # Layers
//!
//! | Crate | Role |
//! |-------|------|
//! | `pmo-core` | aspects, values, messages, accessor tables, component capabilities |
//! | `pmo-dispatch` | dispatcher chains and behavior policies |
//! | `pmo-aspect` | aspect definitions and stock aspects |
//! | `pmo-binding` | element/container bindings, contexts, manager, config |
//!
//! # Example
//!
//! ```rust,ignore
//! use pmo::prelude::*;
//!
//! let manager = BindingManager::new(Rc::new(NoValidation));
//! let context = manager.context("person");
//! context.bind(pmo, &BoundProperty::new("name"), stock::field_aspects(), name_field)?;
//! ```

// --- Core re-exports -------------------------------------------------------

pub use pmo_core::aspect::names;
pub use pmo_core::{
    Accessors, Aspect, BindingError, Bound, BoundObject, BoundProperty, ComponentWrapper,
    DERIVED_BY_LINKKI, FromValue, HasValue, Message, MessageList, ObjectId, ObjectProperty,
    Severity, Value, ValueChangeListener, WrapperType,
};

// --- Dispatch re-exports ---------------------------------------------------

pub use pmo_dispatch::{
    BehaviorList, ConditionBehavior, DispatcherBuilder, DispatcherNode, PropertyBehavior,
    PropertyBehaviorProvider, PropertyDispatcher, no_behavior_provider,
};

// --- Aspect re-exports -----------------------------------------------------

pub use pmo_aspect::stock;
pub use pmo_aspect::{
    ApplicableAspectDefinition, ApplicableTypeAspectDefinition, AspectDefinition,
    CompositeAspectDefinition, EnabledType, ModelChanged, ModelToUiAspectDefinition, RequiredType,
    UiUpdateErrorPolicy, UiUpdater, VisibleType,
};

// --- Binding re-exports ----------------------------------------------------

pub use pmo_binding::{
    Binding, BindingConfig, BindingContext, BindingManager, ConfigError, ContainerBinding,
    ElementBinding, ManagerHandle, NoValidation, PmoDescriptor, PropertyDescriptor,
    SharedObserver, UiUpdateErrors, UiUpdateObserver, ValidationService,
};

/// Standard result type for binding APIs.
pub type Result<T> = std::result::Result<T, BindingError>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use std::rc::Rc;

    pub use crate::{
        Accessors, AspectDefinition, Binding, BindingConfig, BindingContext, BindingError,
        BindingManager, Bound, BoundObject, BoundProperty, ComponentWrapper,
        CompositeAspectDefinition, EnabledType, HasValue, ManagerHandle, Message, MessageList,
        NoValidation, PmoDescriptor, RequiredType, Result, Severity, SharedObserver,
        UiUpdateObserver, ValidationService, Value, VisibleType, WrapperType, names, stock,
    };

    pub use crate::{aspect, binding, core, dispatch};
}

pub use pmo_aspect as aspect;
pub use pmo_binding as binding;
pub use pmo_core as core;
pub use pmo_dispatch as dispatch;
