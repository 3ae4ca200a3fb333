//! In-crate fixtures for unit tests.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use pmo_core::aspect::names;
use pmo_core::{
    Accessors, BindingError, Bound, BoundObject, ComponentWrapper, HasValue, MessageList,
    ObjectId, Value, ValueChangeListener, WrapperType,
};
use pmo_dispatch::{BehaviorList, PropertyDispatcher};

use crate::definition::{AspectDefinition, ModelChanged, UiUpdater};

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

/// Widget type behind [`TestWrapper::field`].
pub struct TextBox;

/// Widget type behind [`TestWrapper::label`].
pub struct Caption;

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
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
}

pub struct TestWrapper {
    component: Box<dyn Any>,
    wrapper_type: WrapperType,
    state: RefCell<WidgetState>,
    listeners: RefCell<Vec<ValueChangeListener>>,
}

impl TestWrapper {
    fn new(component: Box<dyn Any>, wrapper_type: WrapperType, id: &str) -> Self {
        Self {
            component,
            wrapper_type,
            state: RefCell::new(WidgetState {
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
            }),
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn field(id: &str) -> Self {
        Self::new(Box::new(TextBox), WrapperType::FIELD, id)
    }

    pub fn label(id: &str) -> Self {
        Self::new(Box::new(Caption), WrapperType::COMPONENT, id)
    }

    pub fn state(&self) -> WidgetState {
        self.state.borrow().clone()
    }

    /// Simulate the user typing `value`.
    pub fn user_input(&self, value: Value) -> Result<(), BindingError> {
        self.state.borrow_mut().value = value.clone();
        let listeners = self.listeners.borrow().clone();
        for listener in listeners {
            listener(value.clone())?;
        }
        Ok(())
    }
}

impl ComponentWrapper for TestWrapper {
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
        self.state.borrow_mut().id = id.to_owned();
    }

    fn set_label(&self, label: Option<&str>) {
        self.state.borrow_mut().label = label.map(str::to_owned);
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.borrow_mut().enabled = enabled;
    }

    fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    fn set_tooltip(&self, tooltip: Option<&str>) {
        self.state.borrow_mut().tooltip = tooltip.map(str::to_owned);
    }

    fn set_validation_messages(&self, messages: &MessageList) {
        self.state.borrow_mut().messages = messages.clone();
    }

    fn value_component(&self) -> Option<&dyn HasValue> {
        (self.wrapper_type == WrapperType::FIELD).then_some(self as &dyn HasValue)
    }
}

impl HasValue for TestWrapper {
    fn value(&self) -> Value {
        self.state.borrow().value.clone()
    }

    fn set_value(&self, value: Value) {
        self.state.borrow_mut().value = value;
    }

    fn set_read_only(&self, read_only: bool) {
        self.state.borrow_mut().read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.state.borrow().read_only
    }

    fn set_required(&self, required: bool) {
        self.state.borrow_mut().required = required;
    }

    fn set_items(&self, items: Vec<Value>) {
        self.state.borrow_mut().items = items;
    }

    fn add_value_change_listener(&self, listener: ValueChangeListener) {
        self.listeners.borrow_mut().push(listener);
    }
}

// ---------------------------------------------------------------------------
// Recording definitions
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<String>>>,
}

impl Recorder {
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn definition(&self, name: &'static str, supported: WrapperType) -> RecordingDefinition {
        RecordingDefinition {
            name,
            supported,
            fail_init: false,
            calls: Rc::clone(&self.calls),
        }
    }

    pub fn failing_init(&self, name: &'static str, supported: WrapperType) -> RecordingDefinition {
        RecordingDefinition {
            fail_init: true,
            ..self.definition(name, supported)
        }
    }
}

pub struct RecordingDefinition {
    name: &'static str,
    supported: WrapperType,
    fail_init: bool,
    calls: Rc<RefCell<Vec<String>>>,
}

impl AspectDefinition for RecordingDefinition {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn supports(&self, wrapper_type: WrapperType) -> bool {
        wrapper_type.is(self.supported)
    }

    fn create_ui_updater(
        &self,
        _dispatcher: &Rc<PropertyDispatcher>,
        _wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError> {
        self.calls.borrow_mut().push(format!("create:{}", self.name));
        let calls = Rc::clone(&self.calls);
        let name = self.name;
        Ok(UiUpdater::new(move || {
            calls.borrow_mut().push(format!("apply:{name}"));
            Ok(())
        }))
    }

    fn init_model_update(
        &self,
        _dispatcher: &Rc<PropertyDispatcher>,
        _wrapper: &Rc<dyn ComponentWrapper>,
        _model_changed: &ModelChanged,
    ) -> Result<(), BindingError> {
        self.calls.borrow_mut().push(format!("init:{}", self.name));
        if self.fail_init {
            return Err(BindingError::accessor(self.name, names::VALUE, "refused"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatchers
// ---------------------------------------------------------------------------

type Failure = Box<dyn Fn() -> BindingError>;

/// A bound object answering every aspect of `street` with one shared value.
struct Scripted {
    value: RefCell<Value>,
    pulls: Cell<usize>,
    failure: RefCell<Option<Failure>>,
}

#[derive(Clone)]
pub struct ScriptedSource(Rc<Scripted>);

impl ScriptedSource {
    pub fn pulls(&self) -> usize {
        self.0.pulls.get()
    }

    pub fn set(&self, value: Value) {
        *self.0.value.borrow_mut() = value;
    }

    pub fn fail_with(&self, failure: impl Fn() -> BindingError + 'static) {
        *self.0.failure.borrow_mut() = Some(Box::new(failure));
    }
}

struct ScriptedObject(Rc<Scripted>);

impl BoundObject for ScriptedObject {
    fn object_id(&self) -> ObjectId {
        ObjectId::of(&self.0)
    }

    fn type_name(&self) -> &str {
        "Scripted"
    }

    fn read(&self, property: &str, _aspect: &str) -> Option<Result<Value, BindingError>> {
        if property != "street" {
            return None;
        }
        self.0.pulls.set(self.0.pulls.get() + 1);
        Some(match &*self.0.failure.borrow() {
            Some(failure) => Err(failure()),
            None => Ok(self.0.value.borrow().clone()),
        })
    }

    fn write(&self, _: &str, _: &str, _: Value) -> Option<Result<(), BindingError>> {
        None
    }

    fn can_read(&self, property: &str, _aspect: &str) -> bool {
        property == "street"
    }

    fn can_write(&self, _: &str, _: &str) -> bool {
        false
    }

    fn value_type(&self, _: &str) -> Option<&'static str> {
        None
    }

    fn has_model_object(&self, _: &str) -> bool {
        false
    }

    fn model_object(&self, _: &str) -> Option<Rc<dyn BoundObject>> {
        None
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A dispatcher for `street` whose reads are counted.
pub fn counting_dispatcher(initial: Value) -> (Rc<PropertyDispatcher>, ScriptedSource) {
    let scripted = Rc::new(Scripted {
        value: RefCell::new(initial),
        pulls: Cell::new(0),
        failure: RefCell::new(None),
    });
    let object: Rc<dyn BoundObject> = Rc::new(ScriptedObject(Rc::clone(&scripted)));
    let dispatcher = PropertyDispatcher::builder(object, "street")
        .static_values()
        .pmo()
        .build();
    (Rc::new(dispatcher), ScriptedSource(scripted))
}

/// A dispatcher over an object without accessors.
pub fn dispatcher() -> Rc<PropertyDispatcher> {
    counting_dispatcher(Value::Null).0
}

pub struct PersonPmo {
    pub name: String,
    pub locked: bool,
}

/// The standard chain for `name` of a person PMO.
pub fn person_dispatcher(
    behaviors: BehaviorList,
) -> (Rc<PropertyDispatcher>, Rc<RefCell<PersonPmo>>) {
    let accessors = Accessors::<PersonPmo>::new("PersonPmo")
        .getter("name", |p| p.name.clone())
        .setter("name", |p, v: Option<String>| p.name = v.unwrap_or_default())
        .aspect("name", names::ENABLED, |p| !p.locked)
        .aspect("name", names::AVAILABLE_VALUES, |_| vec!["Ada", "Grace"]);
    let pmo = Rc::new(RefCell::new(PersonPmo {
        name: "Ada".into(),
        locked: false,
    }));
    let dispatcher = PropertyDispatcher::standard(
        Bound::new(Rc::clone(&pmo), Rc::new(accessors)),
        &pmo_core::BoundProperty::new("name"),
        Rc::new(behaviors),
    );
    (Rc::new(dispatcher), pmo)
}
