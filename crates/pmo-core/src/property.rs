#![forbid(unsafe_code)]

//! Identification of the property a binding targets.

use std::fmt;

/// Default name under which a PMO exposes its model object.
pub const DEFAULT_MODEL_OBJECT: &str = "modelObject";

/// Which PMO property, and optionally which model attribute, a binding
/// targets.
///
/// When `model_attribute` is empty the PMO property name is used to look up
/// the attribute on the model object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BoundProperty {
    pmo_property: String,
    model_attribute: String,
    model_object: String,
}

impl BoundProperty {
    /// Bind the PMO property `name`; model attribute defaults to the same name.
    #[must_use]
    pub fn new(pmo_property: impl Into<String>) -> Self {
        Self {
            pmo_property: pmo_property.into(),
            model_attribute: String::new(),
            model_object: DEFAULT_MODEL_OBJECT.to_owned(),
        }
    }

    /// Bind to a differently named attribute of the model object.
    #[must_use]
    pub fn model_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.model_attribute = attribute.into();
        self
    }

    /// Use a model object other than the default one.
    #[must_use]
    pub fn model_object(mut self, name: impl Into<String>) -> Self {
        self.model_object = name.into();
        self
    }

    /// The PMO property name.
    #[must_use]
    pub fn pmo_property(&self) -> &str {
        &self.pmo_property
    }

    /// The explicitly declared model attribute (may be empty).
    #[must_use]
    pub fn declared_model_attribute(&self) -> &str {
        &self.model_attribute
    }

    /// The attribute looked up on the model object.
    #[must_use]
    pub fn effective_model_attribute(&self) -> &str {
        if self.model_attribute.is_empty() {
            &self.pmo_property
        } else {
            &self.model_attribute
        }
    }

    /// Name of the model object the attribute lives on.
    #[must_use]
    pub fn model_object_name(&self) -> &str {
        &self.model_object
    }
}

impl fmt::Display for BoundProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pmo_property)?;
        if !self.model_attribute.is_empty() {
            write!(f, " -> {}.{}", self.model_object, self.model_attribute)?;
        }
        Ok(())
    }
}
