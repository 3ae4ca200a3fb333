#![forbid(unsafe_code)]

//! Ready-made aspect definitions for the common component capabilities.
//!
//! | Constructor | Applies to | Aspect | Component call |
//! |-------------|------------|--------|----------------|
//! | [`enabled`] | component | `enabled` | `set_enabled` |
//! | [`visible`] | component | `visible` | `set_visible` |
//! | [`label`], [`derived_label`], [`dynamic_label`] | component | `label` | `set_label` |
//! | [`tooltip`], [`dynamic_tooltip`] | component | `tooltip` | `set_tooltip` |
//! | [`component_id`] | component | `componentId` | `set_id` |
//! | [`required`] | field | `required` | `HasValue::set_required` |
//! | [`read_only`] | field | `readOnly` | `HasValue::set_read_only` |
//! | [`available_values`] | field | `availableValues` | `HasValue::set_items` |
//! | [`value`] | field | value | `HasValue::set_value`, plus UI-to-model listener |
//!
//! Static texts (labels, tooltips, ids) are applied once; everything else is
//! pulled on every update.

use std::fmt;
use std::rc::Rc;

use pmo_core::aspect::names;
use pmo_core::{
    Aspect, BindingError, ComponentWrapper, DERIVED_BY_LINKKI, HasValue, Value, WrapperType,
};
use pmo_dispatch::PropertyDispatcher;
use tracing::debug;

use crate::definition::{
    AspectDefinition, CompositeAspectDefinition, ModelChanged, UiUpdater,
};
use crate::model_to_ui::{ModelToUiAspectDefinition, UiUpdateErrorPolicy};

/// Source of the `enabled` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnabledType {
    /// Always enabled (unless a behavior says otherwise).
    #[default]
    Enabled,
    /// Always disabled.
    Disabled,
    /// Pulled from the PMO's `enabled` aspect accessor.
    Dynamic,
}

/// Source of the `visible` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisibleType {
    /// Always visible (unless a behavior says otherwise).
    #[default]
    Visible,
    /// Always hidden.
    Invisible,
    /// Pulled from the PMO's `visible` aspect accessor.
    Dynamic,
}

/// Source of the `required` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequiredType {
    /// Always required.
    Required,
    /// Never required.
    #[default]
    NotRequired,
    /// Pulled from the PMO's `required` aspect accessor.
    Dynamic,
}

fn flag_aspect(name: &'static str, fixed: Option<bool>) -> Aspect<bool> {
    match fixed {
        Some(flag) => Aspect::with_value(name, flag),
        None => Aspect::of(name),
    }
}

fn require_flag(aspect: &str, flag: Option<bool>) -> Result<bool, BindingError> {
    flag.ok_or_else(|| BindingError::TypeMismatch {
        aspect: aspect.to_owned(),
        expected: "bool",
        found: "null",
    })
}

fn has_value(wrapper: &dyn ComponentWrapper) -> Result<&dyn HasValue, BindingError> {
    wrapper
        .value_component()
        .ok_or_else(|| BindingError::MissingCapability {
            wrapper: wrapper.describe(),
            capability: "a value",
        })
}

/// Enable or disable the component.
#[must_use]
pub fn enabled(kind: EnabledType) -> ModelToUiAspectDefinition<bool> {
    let fixed = match kind {
        EnabledType::Enabled => Some(true),
        EnabledType::Disabled => Some(false),
        EnabledType::Dynamic => None,
    };
    ModelToUiAspectDefinition::new(
        flag_aspect(names::ENABLED, fixed),
        WrapperType::COMPONENT,
        |wrapper, flag| {
            wrapper.set_enabled(require_flag(names::ENABLED, flag)?);
            Ok(())
        },
    )
}

/// Show or hide the component.
#[must_use]
pub fn visible(kind: VisibleType) -> ModelToUiAspectDefinition<bool> {
    let fixed = match kind {
        VisibleType::Visible => Some(true),
        VisibleType::Invisible => Some(false),
        VisibleType::Dynamic => None,
    };
    ModelToUiAspectDefinition::new(
        flag_aspect(names::VISIBLE, fixed),
        WrapperType::COMPONENT,
        |wrapper, flag| {
            wrapper.set_visible(require_flag(names::VISIBLE, flag)?);
            Ok(())
        },
    )
}

fn text_aspect(
    aspect: Aspect<String>,
    apply: fn(&dyn ComponentWrapper, Option<&str>),
) -> ModelToUiAspectDefinition<String> {
    ModelToUiAspectDefinition::new(aspect, WrapperType::COMPONENT, move |wrapper, text| {
        apply(wrapper, text.as_deref().filter(|t| !t.is_empty()));
        Ok(())
    })
}

fn apply_label(wrapper: &dyn ComponentWrapper, text: Option<&str>) {
    wrapper.set_label(text);
}

fn apply_tooltip(wrapper: &dyn ComponentWrapper, text: Option<&str>) {
    wrapper.set_tooltip(text);
}

/// A fixed caption. An empty text clears the caption.
#[must_use]
pub fn label(text: impl Into<String>) -> ModelToUiAspectDefinition<String> {
    text_aspect(Aspect::with_value(names::LABEL, text.into()), apply_label).once()
}

/// A caption derived from the property name (`street` becomes `Street`).
#[must_use]
pub fn derived_label() -> ModelToUiAspectDefinition<String> {
    label(DERIVED_BY_LINKKI)
}

/// A caption pulled from the PMO on every update.
#[must_use]
pub fn dynamic_label() -> ModelToUiAspectDefinition<String> {
    text_aspect(Aspect::of(names::LABEL), apply_label)
}

/// A fixed hover text. An empty text clears it.
#[must_use]
pub fn tooltip(text: impl Into<String>) -> ModelToUiAspectDefinition<String> {
    text_aspect(Aspect::with_value(names::TOOLTIP, text.into()), apply_tooltip).once()
}

/// A hover text pulled from the PMO on every update.
#[must_use]
pub fn dynamic_tooltip() -> ModelToUiAspectDefinition<String> {
    text_aspect(Aspect::of(names::TOOLTIP), apply_tooltip)
}

/// A fixed component id.
#[must_use]
pub fn component_id(id: impl Into<String>) -> ModelToUiAspectDefinition<String> {
    ModelToUiAspectDefinition::new(
        Aspect::with_value(names::COMPONENT_ID, id.into()),
        WrapperType::COMPONENT,
        |wrapper, id| {
            wrapper.set_id(id.as_deref().unwrap_or_default());
            Ok(())
        },
    )
    .once()
}

/// Toggle the required indicator of a field.
#[must_use]
pub fn required(kind: RequiredType) -> ModelToUiAspectDefinition<bool> {
    let fixed = match kind {
        RequiredType::Required => Some(true),
        RequiredType::NotRequired => Some(false),
        RequiredType::Dynamic => None,
    };
    ModelToUiAspectDefinition::new(
        flag_aspect(names::REQUIRED, fixed),
        WrapperType::FIELD,
        |wrapper, flag| {
            has_value(wrapper)?.set_required(flag.unwrap_or(false));
            Ok(())
        },
    )
}

/// Push the choices of a selection field.
#[must_use]
pub fn available_values() -> ModelToUiAspectDefinition<Vec<Value>> {
    ModelToUiAspectDefinition::new(
        Aspect::of(names::AVAILABLE_VALUES),
        WrapperType::FIELD,
        |wrapper, items| {
            has_value(wrapper)?.set_items(items.unwrap_or_default());
            Ok(())
        },
    )
}

/// Make a field read only whenever the value cannot be pushed.
#[must_use]
pub fn read_only() -> ReadOnlyAspectDefinition {
    ReadOnlyAspectDefinition::default()
}

/// Keep a field's value in sync in both directions.
#[must_use]
pub fn value() -> ValueAspectDefinition {
    ValueAspectDefinition::default()
}

/// The usual aspects of an editable field, in application order.
#[must_use]
pub fn field_aspects() -> CompositeAspectDefinition {
    CompositeAspectDefinition::default()
        .with(derived_label())
        .with(visible(VisibleType::Visible))
        .with(enabled(EnabledType::Enabled))
        .with(required(RequiredType::NotRequired))
        .with(read_only())
        .with(value())
}

// ---------------------------------------------------------------------------
// read only
// ---------------------------------------------------------------------------

/// Sets a field read only when the value aspect is not writable.
///
/// The decision is pulled through the chain as the `readOnly` aspect, so a
/// behavior denying writes also marks the field read only.
#[derive(Clone, Debug, Default)]
pub struct ReadOnlyAspectDefinition {
    policy: UiUpdateErrorPolicy,
}

impl ReadOnlyAspectDefinition {
    /// Replace the error policy.
    #[must_use]
    pub fn error_policy(mut self, policy: UiUpdateErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn update(
        &self,
        dispatcher: &PropertyDispatcher,
        wrapper: &dyn ComponentWrapper,
    ) -> Result<(), BindingError> {
        let not_writable = !dispatcher.is_writable(names::VALUE);
        let aspect = Aspect::with_value(names::READ_ONLY, Value::Bool(not_writable));
        let applied = dispatcher.pull(&aspect).and_then(|pulled| {
            let read_only = pulled.as_bool().ok_or(BindingError::TypeMismatch {
                aspect: names::READ_ONLY.to_owned(),
                expected: "bool",
                found: pulled.kind(),
            })?;
            has_value(wrapper)?.set_read_only(read_only);
            Ok(())
        });
        applied.or_else(|err| self.policy.handle(err, dispatcher, &aspect))
    }
}

impl AspectDefinition for ReadOnlyAspectDefinition {
    fn name(&self) -> String {
        names::READ_ONLY.to_owned()
    }

    fn supports(&self, wrapper_type: WrapperType) -> bool {
        wrapper_type.is(WrapperType::FIELD)
    }

    fn create_ui_updater(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError> {
        let definition = self.clone();
        let dispatcher = Rc::clone(dispatcher);
        let wrapper = Rc::clone(wrapper);
        Ok(UiUpdater::new(move || {
            definition.update(&dispatcher, wrapper.as_ref())
        }))
    }
}

// ---------------------------------------------------------------------------
// value
// ---------------------------------------------------------------------------

/// Two-way synchronization of a field's value.
///
/// Model to UI pulls the value aspect and calls [`HasValue::set_value`].
/// UI to model registers a listener that pushes user input when the value
/// aspect is pushable, then announces the model change.
#[derive(Clone)]
pub struct ValueAspectDefinition {
    model_to_ui: ModelToUiAspectDefinition<Value>,
}

impl Default for ValueAspectDefinition {
    fn default() -> Self {
        Self {
            model_to_ui: ModelToUiAspectDefinition::new(
                Aspect::of(names::VALUE),
                WrapperType::FIELD,
                |wrapper, value| {
                    has_value(wrapper)?.set_value(value.unwrap_or_default());
                    Ok(())
                },
            ),
        }
    }
}

impl ValueAspectDefinition {
    /// Replace the error policy of the model-to-UI direction.
    #[must_use]
    pub fn error_policy(self, policy: UiUpdateErrorPolicy) -> Self {
        Self {
            model_to_ui: self.model_to_ui.error_policy(policy),
        }
    }
}

impl AspectDefinition for ValueAspectDefinition {
    fn name(&self) -> String {
        self.model_to_ui.name()
    }

    fn supports(&self, wrapper_type: WrapperType) -> bool {
        self.model_to_ui.supports(wrapper_type)
    }

    fn create_ui_updater(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError> {
        self.model_to_ui.create_ui_updater(dispatcher, wrapper)
    }

    fn init_model_update(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
        model_changed: &ModelChanged,
    ) -> Result<(), BindingError> {
        let field = has_value(wrapper.as_ref())?;
        let dispatcher = Rc::clone(dispatcher);
        let model_changed = Rc::clone(model_changed);
        field.add_value_change_listener(Rc::new(move |value: Value| {
            let aspect = Aspect::with_value(names::VALUE, value);
            if !dispatcher.is_pushable(&aspect) {
                debug!(dispatcher = %dispatcher, "user input on a non-pushable property");
                return Err(BindingError::NotWritable {
                    property: dispatcher.property().to_owned(),
                });
            }
            dispatcher.push(&aspect)?;
            model_changed()
        }));
        Ok(())
    }
}

impl fmt::Debug for ValueAspectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueAspectDefinition")
            .field("model_to_ui", &self.model_to_ui)
            .finish()
    }
}
