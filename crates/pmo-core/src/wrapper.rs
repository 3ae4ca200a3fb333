#![forbid(unsafe_code)]

//! Minimal capability surface over concrete UI components.
//!
//! Toolkit adapters implement [`ComponentWrapper`] once per widget family.
//! The binding core never touches a widget directly; everything it needs
//! goes through this trait, and value-carrying widgets additionally expose
//! [`HasValue`].
//!
//! All methods take `&self`: components are shared handles owned by the
//! toolkit, mutated through interior mutability on the UI thread.

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::error::BindingError;
use crate::message::MessageList;
use crate::value::Value;

/// Capability tag classifying what kind of element a wrapper adapts.
///
/// Types form a single-parent hierarchy: a type *is* another type when it
/// is equal to it or derived from it (directly or transitively).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperType {
    name: &'static str,
    parent: Option<&'static WrapperType>,
}

impl WrapperType {
    /// Any component.
    pub const COMPONENT: WrapperType = WrapperType::of("component");
    /// A component holding a user-editable value.
    pub const FIELD: WrapperType = WrapperType::derived("field", &WrapperType::COMPONENT);
    /// A component arranging other components.
    pub const LAYOUT: WrapperType = WrapperType::derived("layout", &WrapperType::COMPONENT);
    /// A root element (page, view); not a component.
    pub const ROOT: WrapperType = WrapperType::of("root");

    /// A type without parent.
    #[must_use]
    pub const fn of(name: &'static str) -> Self {
        Self { name, parent: None }
    }

    /// A type derived from `parent`.
    #[must_use]
    pub const fn derived(name: &'static str, parent: &'static WrapperType) -> Self {
        Self {
            name,
            parent: Some(parent),
        }
    }

    /// The type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// The declared parent type.
    #[must_use]
    pub const fn parent(&self) -> Option<&'static WrapperType> {
        self.parent
    }

    /// Whether `self` equals `other` or derives from it.
    #[must_use]
    pub fn is(&self, other: WrapperType) -> bool {
        if *self == other {
            return true;
        }
        self.parent.is_some_and(|p| p.is(other))
    }
}

impl fmt::Debug for WrapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WrapperType({})", self.name)
    }
}

impl fmt::Display for WrapperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Listener invoked with a user-entered value.
///
/// The returned error is for the toolkit adapter to surface (error dialog,
/// log); the binding core does not swallow it.
pub type ValueChangeListener = Rc<dyn Fn(Value) -> Result<(), BindingError>>;

/// Adapter over one concrete UI component.
pub trait ComponentWrapper {
    /// The wrapped widget, for type-gated aspects.
    fn component(&self) -> &dyn Any;

    /// Capability tag used to filter aspect definitions.
    fn wrapper_type(&self) -> WrapperType;

    /// Current component id.
    fn id(&self) -> String;

    /// Set the component id.
    fn set_id(&self, id: &str);

    /// Set or clear the caption.
    fn set_label(&self, label: Option<&str>);

    /// Enable or disable input.
    fn set_enabled(&self, enabled: bool);

    /// Show or hide the component.
    fn set_visible(&self, visible: bool);

    /// Set or clear the hover text.
    fn set_tooltip(&self, tooltip: Option<&str>);

    /// Display validation messages relevant to this component.
    fn set_validation_messages(&self, messages: &MessageList);

    /// Value capabilities, for fields.
    fn value_component(&self) -> Option<&dyn HasValue> {
        None
    }

    /// Called after every aspect of a binding has been applied.
    fn post_update(&self) {}

    /// Short description for diagnostics.
    fn describe(&self) -> String {
        format!("{}[{}]", self.wrapper_type(), self.id())
    }
}

/// Value capabilities of a field component.
pub trait HasValue {
    /// Current value shown by the field.
    fn value(&self) -> Value;

    /// Programmatically set the value. Must not notify listeners.
    fn set_value(&self, value: Value);

    /// Toggle read-only mode.
    fn set_read_only(&self, read_only: bool);

    /// Whether the field is read only.
    fn is_read_only(&self) -> bool;

    /// Toggle the required indicator.
    fn set_required(&self, required: bool);

    /// Replace the choices offered by a selection field.
    fn set_items(&self, _items: Vec<Value>) {}

    /// Register a listener for user-originated value changes.
    fn add_value_change_listener(&self, listener: ValueChangeListener);
}
