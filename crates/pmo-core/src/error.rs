#![forbid(unsafe_code)]

//! Error taxonomy of the binding core.
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `UnsupportedAspect` | dispatcher chain | nothing can answer the aspect (programming error) |
//! | `NotWritable` | behavior gate | push refused because the property is not writable |
//! | `MissingValue` | dispatcher chain | push of an aspect that carries no value |
//! | `TypeMismatch` | value conversion | aspect value has the wrong shape |
//! | `Accessor` | PMO / model accessors | a setter reported failure |
//! | `MissingCapability` | field aspects | the wrapper lacks a capability the aspect needs |
//! | `ModelUpdate` | composite aspect definition | wiring UI-to-model updates failed |
//! | `UiUpdate` | model-to-UI aspect definition | pulling or applying a value failed |
//! | `BindingUpdate` | element binding | refreshing one binding failed |
//! | `ContextUpdate` | binding context | one or more bindings failed during a pass |
//! | `DuplicateContext` | binding manager | context name already taken |
//!
//! Wrapping variants keep the original error as their `source`, so the full
//! diagnostic chain survives every layer.

use thiserror::Error;

/// Errors raised while binding, pulling, pushing or refreshing.
#[derive(Debug, Error)]
pub enum BindingError {
    /// No dispatcher in the chain handles the aspect.
    #[error("no dispatcher handles aspect '{aspect}' of property '{property}' on {object}")]
    UnsupportedAspect {
        /// Aspect name (empty for the value aspect).
        aspect: String,
        /// PMO property name.
        property: String,
        /// Description of the bound object.
        object: String,
    },

    /// A push was refused because the property is not writable.
    #[error("property '{property}' is not writable")]
    NotWritable {
        /// PMO property name.
        property: String,
    },

    /// A push carried no value. Nothing was written.
    #[error("push of aspect '{aspect}' of property '{property}' carries no value")]
    MissingValue {
        /// Aspect name.
        aspect: String,
        /// PMO property name.
        property: String,
    },

    /// An aspect value had an unexpected shape.
    #[error("aspect '{aspect}' expected a {expected} value but got {found}")]
    TypeMismatch {
        /// Aspect name.
        aspect: String,
        /// Expected type name.
        expected: &'static str,
        /// Kind of the value actually found.
        found: &'static str,
    },

    /// A getter or setter of a bound object reported failure.
    #[error("accessor for aspect '{aspect}' of property '{property}' failed: {message}")]
    Accessor {
        /// Property name on the bound object.
        property: String,
        /// Aspect name.
        aspect: String,
        /// Failure description from the accessor.
        message: String,
    },

    /// A wrapper lacks a capability an aspect definition relies on.
    #[error("{wrapper} does not provide {capability}")]
    MissingCapability {
        /// Component wrapper description.
        wrapper: String,
        /// Name of the missing capability.
        capability: &'static str,
    },

    /// An aspect definition failed to wire its model update.
    #[error("cannot initialize model update of {definition} for {wrapper} with {dispatcher}")]
    ModelUpdate {
        /// Aspect definition identity.
        definition: String,
        /// Component wrapper description.
        wrapper: String,
        /// Dispatcher description.
        dispatcher: String,
        /// The original failure.
        #[source]
        source: Box<BindingError>,
    },

    /// An aspect definition failed to pull or apply its value.
    #[error("cannot update aspect '{aspect}' from {dispatcher}")]
    UiUpdate {
        /// Aspect name.
        aspect: String,
        /// Dispatcher description.
        dispatcher: String,
        /// The original failure.
        #[source]
        source: Box<BindingError>,
    },

    /// A binding failed while refreshing its component.
    #[error("error while updating UI in {binding}")]
    BindingUpdate {
        /// Binding description.
        binding: String,
        /// The original failure.
        #[source]
        source: Box<BindingError>,
    },

    /// One or more bindings of a context failed during an update pass.
    ///
    /// Every other binding of the pass was still updated.
    #[error("{} binding(s) failed to update in context '{context}'", .failures.len())]
    ContextUpdate {
        /// Context name.
        context: String,
        /// Failures in binding registration order.
        failures: Vec<BindingError>,
    },

    /// A context with the same name is already registered.
    #[error("a binding context named '{name}' already exists")]
    DuplicateContext {
        /// The rejected name.
        name: String,
    },
}

impl BindingError {
    /// Build an [`BindingError::Accessor`] from any displayable failure.
    pub fn accessor(
        property: impl Into<String>,
        aspect: impl Into<String>,
        message: impl std::fmt::Display,
    ) -> Self {
        Self::Accessor {
            property: property.into(),
            aspect: aspect.into(),
            message: message.to_string(),
        }
    }

    /// The innermost error of a wrapping chain.
    ///
    /// `ContextUpdate` is not unwrapped since it holds several causes.
    #[must_use]
    pub fn root_cause(&self) -> &BindingError {
        match self {
            Self::ModelUpdate { source, .. }
            | Self::UiUpdate { source, .. }
            | Self::BindingUpdate { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
