#![forbid(unsafe_code)]

//! In-memory components standing in for a UI toolkit.
//!
//! Every [`InMemoryComponent`] records the state the binding core pushed into
//! it and a log of the calls that did so, and can simulate user input.
//!
//! | Constructor | Component | Wrapper type | Value |
//! |-------------|-----------|--------------|-------|
//! | [`text_field`](InMemoryComponent::text_field) | [`TextField`] | FIELD | yes |
//! | [`combo_box`](InMemoryComponent::combo_box) | [`ComboBox`] | FIELD | yes |
//! | [`check_box`](InMemoryComponent::check_box) | [`CheckBox`] | FIELD | yes |
//! | [`label`](InMemoryComponent::label) | [`Label`] | COMPONENT | no |
//! | [`section`](InMemoryComponent::section) | [`Section`] | LAYOUT | no |

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use pmo_core::{
    BindingError, ComponentWrapper, HasValue, MessageList, Value, ValueChangeListener, WrapperType,
};

/// Single-line text input.
#[derive(Debug, Default)]
pub struct TextField;

/// Drop-down selection.
#[derive(Debug, Default)]
pub struct ComboBox;

/// Boolean toggle.
#[derive(Debug, Default)]
pub struct CheckBox;

/// Read-only caption.
#[derive(Debug, Default)]
pub struct Label;

/// Layout grouping other components.
#[derive(Debug, Default)]
pub struct Section;

/// Everything the binding core pushed into a component.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentState {
    pub id: String,
    pub label: Option<String>,
    pub tooltip: Option<String>,
    pub enabled: bool,
    pub visible: bool,
    pub required: bool,
    pub read_only: bool,
    pub value: Value,
    pub items: Vec<Value>,
    pub messages: MessageList,
    pub post_updates: usize,
}

impl ComponentState {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            label: None,
            tooltip: None,
            enabled: true,
            visible: true,
            required: false,
            read_only: false,
            value: Value::Null,
            items: Vec::new(),
            messages: MessageList::new(),
            post_updates: 0,
        }
    }
}

/// A toolkit-free component wrapper.
pub struct InMemoryComponent {
    component: Box<dyn Any>,
    wrapper_type: WrapperType,
    has_value: bool,
    state: RefCell<ComponentState>,
    calls: RefCell<Vec<String>>,
    listeners: RefCell<Vec<ValueChangeListener>>,
}

impl InMemoryComponent {
    fn new(component: impl Any, wrapper_type: WrapperType, has_value: bool, id: &str) -> Rc<Self> {
        Rc::new(Self {
            component: Box::new(component),
            wrapper_type,
            has_value,
            state: RefCell::new(ComponentState::new(id)),
            calls: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
        })
    }

    pub fn text_field(id: &str) -> Rc<Self> {
        Self::new(TextField, WrapperType::FIELD, true, id)
    }

    pub fn combo_box(id: &str) -> Rc<Self> {
        Self::new(ComboBox, WrapperType::FIELD, true, id)
    }

    pub fn check_box(id: &str) -> Rc<Self> {
        Self::new(CheckBox, WrapperType::FIELD, true, id)
    }

    pub fn label(id: &str) -> Rc<Self> {
        Self::new(Label, WrapperType::COMPONENT, false, id)
    }

    pub fn section(id: &str) -> Rc<Self> {
        Self::new(Section, WrapperType::LAYOUT, false, id)
    }

    /// This component as a wrapper handle.
    pub fn wrapper(self: &Rc<Self>) -> Rc<dyn ComponentWrapper> {
        Rc::clone(self) as Rc<dyn ComponentWrapper>
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> ComponentState {
        self.state.borrow().clone()
    }

    /// Setter calls in the order they happened, e.g. `set_enabled(false)`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Number of registered value change listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// Simulate the user entering `value`.
    ///
    /// Returns the first listener failure; later listeners are not notified.
    pub fn user_input(&self, value: impl Into<Value>) -> Result<(), BindingError> {
        let value = value.into();
        self.state.borrow_mut().value = value.clone();
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(value.clone())?;
        }
        Ok(())
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl ComponentWrapper for InMemoryComponent {
    fn component(&self) -> &dyn Any {
        self.component.as_ref()
    }

    fn wrapper_type(&self) -> WrapperType {
        self.wrapper_type
    }

    fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    fn set_id(&self, id: &str) {
        self.record(format!("set_id({id})"));
        self.state.borrow_mut().id = id.to_owned();
    }

    fn set_label(&self, label: Option<&str>) {
        self.record(format!("set_label({label:?})"));
        self.state.borrow_mut().label = label.map(str::to_owned);
    }

    fn set_enabled(&self, enabled: bool) {
        self.record(format!("set_enabled({enabled})"));
        self.state.borrow_mut().enabled = enabled;
    }

    fn set_visible(&self, visible: bool) {
        self.record(format!("set_visible({visible})"));
        self.state.borrow_mut().visible = visible;
    }

    fn set_tooltip(&self, tooltip: Option<&str>) {
        self.record(format!("set_tooltip({tooltip:?})"));
        self.state.borrow_mut().tooltip = tooltip.map(str::to_owned);
    }

    fn set_validation_messages(&self, messages: &MessageList) {
        self.record(format!("set_validation_messages({})", messages.len()));
        self.state.borrow_mut().messages = messages.clone();
    }

    fn value_component(&self) -> Option<&dyn HasValue> {
        self.has_value.then_some(self as &dyn HasValue)
    }

    fn post_update(&self) {
        self.state.borrow_mut().post_updates += 1;
    }
}

impl HasValue for InMemoryComponent {
    fn value(&self) -> Value {
        self.state.borrow().value.clone()
    }

    fn set_value(&self, value: Value) {
        self.record(format!("set_value({value})"));
        self.state.borrow_mut().value = value;
    }

    fn set_read_only(&self, read_only: bool) {
        self.record(format!("set_read_only({read_only})"));
        self.state.borrow_mut().read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.state.borrow().read_only
    }

    fn set_required(&self, required: bool) {
        self.record(format!("set_required({required})"));
        self.state.borrow_mut().required = required;
    }

    fn set_items(&self, items: Vec<Value>) {
        self.record(format!("set_items({})", items.len()));
        self.state.borrow_mut().items = items;
    }

    fn add_value_change_listener(&self, listener: ValueChangeListener) {
        self.listeners.borrow_mut().push(listener);
    }
}

impl fmt::Debug for InMemoryComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryComponent")
            .field("type", &self.wrapper_type)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Form
// ---------------------------------------------------------------------------

/// Components addressable by name, for descriptor-driven binding.
#[derive(Debug, Default)]
pub struct Form {
    components: Vec<(String, Rc<InMemoryComponent>)>,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `component` under `name`.
    #[must_use]
    pub fn with(mut self, name: &str, component: Rc<InMemoryComponent>) -> Self {
        self.components.push((name.to_owned(), component));
        self
    }

    /// The component registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Rc<InMemoryComponent>> {
        self.components
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, c)| c)
    }

    /// Lookup function for [`BindingContext::bind_pmo`](pmo_binding::BindingContext::bind_pmo).
    pub fn lookup(&self, name: &str) -> Option<Rc<dyn ComponentWrapper>> {
        self.get(name).map(|c| c.wrapper())
    }
}
