//! In-crate fixtures for unit tests.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pmo_core::aspect::names;
use pmo_core::{
    Accessors, BindingError, Bound, BoundObject, ComponentWrapper, HasValue, MessageList, Value,
    ValueChangeListener, WrapperType,
};

pub struct TestField {
    wrapper_type: WrapperType,
    has_value: bool,
    id: RefCell<String>,
    label: RefCell<Option<String>>,
    enabled: Cell<bool>,
    visible: Cell<bool>,
    read_only: Cell<bool>,
    value: RefCell<Value>,
    messages: RefCell<MessageList>,
    post_updates: Cell<usize>,
    listeners: RefCell<Vec<ValueChangeListener>>,
}

impl TestField {
    fn build(wrapper_type: WrapperType, has_value: bool, id: &str) -> Self {
        Self {
            wrapper_type,
            has_value,
            id: RefCell::new(id.to_owned()),
            label: RefCell::new(None),
            enabled: Cell::new(true),
            visible: Cell::new(true),
            read_only: Cell::new(false),
            value: RefCell::new(Value::Null),
            messages: RefCell::new(MessageList::new()),
            post_updates: Cell::new(0),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn new(id: &str) -> Self {
        Self::build(WrapperType::FIELD, true, id)
    }

    pub fn caption(id: &str) -> Self {
        Self::build(WrapperType::COMPONENT, false, id)
    }

    pub fn layout(id: &str) -> Self {
        Self::build(WrapperType::LAYOUT, false, id)
    }

    /// A field type whose widget exposes no value.
    pub fn without_value(id: &str) -> Self {
        Self::build(WrapperType::FIELD, false, id)
    }

    pub fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    pub fn label(&self) -> Option<String> {
        self.label.borrow().clone()
    }

    pub fn enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn messages(&self) -> MessageList {
        self.messages.borrow().clone()
    }

    pub fn post_updates(&self) -> usize {
        self.post_updates.get()
    }

    pub fn user_input(&self, value: Value) -> Result<(), BindingError> {
        *self.value.borrow_mut() = value.clone();
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(value.clone())?;
        }
        Ok(())
    }
}

impl ComponentWrapper for TestField {
    fn component(&self) -> &dyn Any {
        self
    }

    fn wrapper_type(&self) -> WrapperType {
        self.wrapper_type
    }

    fn id(&self) -> String {
        self.id.borrow().clone()
    }

    fn set_id(&self, id: &str) {
        *self.id.borrow_mut() = id.to_owned();
    }

    fn set_label(&self, label: Option<&str>) {
        *self.label.borrow_mut() = label.map(str::to_owned);
    }

    fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }

    fn set_tooltip(&self, _tooltip: Option<&str>) {}

    fn set_validation_messages(&self, messages: &MessageList) {
        *self.messages.borrow_mut() = messages.clone();
    }

    fn value_component(&self) -> Option<&dyn HasValue> {
        self.has_value.then_some(self as &dyn HasValue)
    }

    fn post_update(&self) {
        self.post_updates.set(self.post_updates.get() + 1);
    }
}

impl HasValue for TestField {
    fn value(&self) -> Value {
        self.value.borrow().clone()
    }

    fn set_value(&self, value: Value) {
        *self.value.borrow_mut() = value;
    }

    fn set_read_only(&self, read_only: bool) {
        self.read_only.set(read_only);
    }

    fn is_read_only(&self) -> bool {
        self.read_only.get()
    }

    fn set_required(&self, _required: bool) {}

    fn add_value_change_listener(&self, listener: ValueChangeListener) {
        self.listeners.borrow_mut().push(listener);
    }
}

pub struct Person {
    pub name: String,
    pub locked: bool,
}

/// A person PMO with a writable `name` whose enabled state follows `locked`.
pub fn person(name: &str) -> (Rc<dyn BoundObject>, Rc<RefCell<Person>>) {
    let accessors = Accessors::<Person>::new("PersonPmo")
        .getter("name", |p| p.name.clone())
        .setter("name", |p, v: Option<String>| p.name = v.unwrap_or_default())
        .aspect("name", names::ENABLED, |p| !p.locked)
        .getter("details", |_| Value::Null);
    let state = Rc::new(RefCell::new(Person {
        name: name.to_owned(),
        locked: false,
    }));
    (Bound::new(Rc::clone(&state), Rc::new(accessors)), state)
}
