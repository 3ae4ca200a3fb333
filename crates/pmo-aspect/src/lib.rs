#![forbid(unsafe_code)]

//! Aspect definitions: how each aspect of a bound property reaches its
//! component, and how user input flows back.
//!
//! # Key Components
//!
//! - [`AspectDefinition`]: the strategy trait, with [`UiUpdater`] actions.
//! - [`CompositeAspectDefinition`]: the ordered definitions of one property,
//!   filtered by [`WrapperType`](pmo_core::WrapperType).
//! - [`ModelToUiAspectDefinition`]: pull-and-set base with an injectable
//!   [`UiUpdateErrorPolicy`] and a static, update-once variant.
//! - [`ApplicableAspectDefinition`] / [`ApplicableTypeAspectDefinition`]:
//!   per-component gates.
//! - [`stock`]: enabled, visible, label, tooltip, required, read only, value,
//!   available values and component id.

pub mod applicable;
pub mod definition;
pub mod model_to_ui;
pub mod stock;

#[cfg(test)]
mod test_support;

pub use applicable::{ApplicableAspectDefinition, ApplicableTypeAspectDefinition};
pub use definition::{AspectDefinition, CompositeAspectDefinition, ModelChanged, UiUpdater};
pub use model_to_ui::{ModelToUiAspectDefinition, UiUpdateErrorPolicy};
pub use stock::{EnabledType, ReadOnlyAspectDefinition, RequiredType, ValueAspectDefinition, VisibleType};
