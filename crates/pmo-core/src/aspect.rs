#![forbid(unsafe_code)]

//! Named, optionally valued units of UI-affecting state.
//!
//! An [`Aspect`] names one facet of a bound property (its value, whether it
//! is visible, its label, ...). An aspect either carries a value supplied up
//! front (a static label, a fixed `enabled = false`) or none, in which case
//! the dispatcher chain is asked to produce it.
//!
//! # Invariants
//!
//! 1. Aspects are immutable once built.
//! 2. "No value" and "a value that happens to be null" are distinct:
//!    [`Aspect::with_value`] always sets the present flag, even for
//!    [`Value::Null`](crate::Value::Null).

use std::borrow::Cow;
use std::fmt;

/// Well-known aspect names.
pub mod names {
    /// The property value itself.
    pub const VALUE: &str = "";
    /// Whether the component accepts input.
    pub const ENABLED: &str = "enabled";
    /// Whether the component is shown.
    pub const VISIBLE: &str = "visible";
    /// Caption shown next to the component.
    pub const LABEL: &str = "label";
    /// Hover text.
    pub const TOOLTIP: &str = "tooltip";
    /// Whether input is mandatory.
    pub const REQUIRED: &str = "required";
    /// Whether the field is read only.
    pub const READ_ONLY: &str = "readOnly";
    /// Choices offered by a selection field.
    pub const AVAILABLE_VALUES: &str = "availableValues";
    /// Component identifier.
    pub const COMPONENT_ID: &str = "componentId";
}

/// Sentinel text value asking the dispatcher chain to derive a caption from
/// the property name.
pub const DERIVED_BY_LINKKI: &str = "derived.by.linkki";

/// A named facet of UI state, optionally carrying a value.
#[derive(Clone, PartialEq)]
pub struct Aspect<V> {
    name: Cow<'static, str>,
    value: Option<V>,
}

impl<V> Aspect<V> {
    /// An aspect without a value; the dispatcher chain supplies it.
    #[must_use]
    pub fn of(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    /// An aspect with a value supplied up front.
    #[must_use]
    pub fn with_value(name: impl Into<Cow<'static, str>>, value: V) -> Self {
        Self {
            name: name.into(),
            value: Some(value),
        }
    }

    /// The aspect name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The supplied value, if present.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Whether a value was supplied.
    #[must_use]
    pub fn is_value_present(&self) -> bool {
        self.value.is_some()
    }

    /// Consume the aspect, returning its value.
    #[must_use]
    pub fn into_value(self) -> Option<V> {
        self.value
    }

    /// Map the value, keeping the name and the present flag.
    pub fn map<U>(self, f: impl FnOnce(V) -> U) -> Aspect<U> {
        Aspect {
            name: self.name,
            value: self.value.map(f),
        }
    }

    /// Same name, different value.
    #[must_use]
    pub fn replace_value<U>(&self, value: U) -> Aspect<U> {
        Aspect {
            name: self.name.clone(),
            value: Some(value),
        }
    }

    /// Same name, no value.
    #[must_use]
    pub fn without_value<U>(&self) -> Aspect<U> {
        Aspect {
            name: self.name.clone(),
            value: None,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Aspect<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Aspect");
        s.field("name", &self.name);
        match &self.value {
            Some(v) => s.field("value", v),
            None => s.field("value", &format_args!("<absent>")),
        };
        s.finish()
    }
}

impl<V> fmt::Display for Aspect<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            f.write_str("<value>")
        } else {
            f.write_str(&self.name)
        }
    }
}
