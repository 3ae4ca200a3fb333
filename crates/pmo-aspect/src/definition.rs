#![forbid(unsafe_code)]

//! Aspect definitions and their composition.
//!
//! An [`AspectDefinition`] describes how one kind of aspect is kept in sync
//! between a bound property and its component: [`create_ui_updater`] builds
//! the model-to-UI action, [`init_model_update`] wires the UI-to-model
//! direction. [`CompositeAspectDefinition`] combines the definitions of one
//! property and applies only those supporting the component's
//! [`WrapperType`].
//!
//! # Invariants
//!
//! 1. `CompositeAspectDefinition::supports(t)` holds iff some child supports `t`.
//! 2. Updaters run in declaration order; unsupported children are never called.
//! 3. [`UiUpdater::noop`] is the identity of [`UiUpdater::and_then`].
//!
//! # Failure Modes
//!
//! - A child failing in `init_model_update` aborts wiring of the remaining
//!   children; the failure is returned as [`BindingError::ModelUpdate`]
//!   naming the definition, the wrapper and the dispatcher.
//! - A combined updater stops at the first failing child and returns its error.
//!
//! [`create_ui_updater`]: AspectDefinition::create_ui_updater
//! [`init_model_update`]: AspectDefinition::init_model_update

use std::fmt;
use std::rc::Rc;

use pmo_core::{BindingError, ComponentWrapper, WrapperType};
use pmo_dispatch::PropertyDispatcher;

/// Callback announcing that the user changed model state.
pub type ModelChanged = Rc<dyn Fn() -> Result<(), BindingError>>;

type Action = Rc<dyn Fn() -> Result<(), BindingError>>;

// ---------------------------------------------------------------------------
// UiUpdater
// ---------------------------------------------------------------------------

/// A shared, repeatable model-to-UI action.
#[derive(Clone, Default)]
pub struct UiUpdater {
    action: Option<Action>,
}

impl UiUpdater {
    /// Wrap `action`.
    pub fn new(action: impl Fn() -> Result<(), BindingError> + 'static) -> Self {
        Self {
            action: Some(Rc::new(action)),
        }
    }

    /// An updater doing nothing.
    #[must_use]
    pub fn noop() -> Self {
        Self::default()
    }

    /// Whether this updater does nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.action.is_none()
    }

    /// Run `self`, then `next`. Stops at the first error.
    #[must_use]
    pub fn and_then(self, next: UiUpdater) -> UiUpdater {
        match (self.action, next.action) {
            (None, action) | (action, None) => Self { action },
            (Some(first), Some(second)) => Self::new(move || {
                first()?;
                second()
            }),
        }
    }

    /// Run the action.
    pub fn apply(&self) -> Result<(), BindingError> {
        match &self.action {
            Some(action) => action(),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for UiUpdater {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiUpdater")
            .field("noop", &self.is_noop())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AspectDefinition
// ---------------------------------------------------------------------------

/// Strategy keeping one aspect of a bound property in sync with a component.
pub trait AspectDefinition {
    /// Identity used in diagnostics.
    fn name(&self) -> String;

    /// Whether the definition applies to components of `wrapper_type`.
    fn supports(&self, wrapper_type: WrapperType) -> bool;

    /// Build the action applying the current aspect value to `wrapper`.
    fn create_ui_updater(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError>;

    /// Wire the UI-to-model direction. Most aspects only flow model-to-UI.
    fn init_model_update(
        &self,
        _dispatcher: &Rc<PropertyDispatcher>,
        _wrapper: &Rc<dyn ComponentWrapper>,
        _model_changed: &ModelChanged,
    ) -> Result<(), BindingError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// CompositeAspectDefinition
// ---------------------------------------------------------------------------

/// The ordered aspect definitions of one bound property.
#[derive(Clone, Default)]
pub struct CompositeAspectDefinition {
    definitions: Vec<Rc<dyn AspectDefinition>>,
}

impl CompositeAspectDefinition {
    /// Compose `definitions`, keeping their order.
    #[must_use]
    pub fn new(definitions: Vec<Rc<dyn AspectDefinition>>) -> Self {
        Self { definitions }
    }

    /// Append a definition.
    #[must_use]
    pub fn with(mut self, definition: impl AspectDefinition + 'static) -> Self {
        self.definitions.push(Rc::new(definition));
        self
    }

    /// The children, in declaration order.
    #[must_use]
    pub fn definitions(&self) -> &[Rc<dyn AspectDefinition>] {
        &self.definitions
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether there are no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    fn applicable(
        &self,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> impl Iterator<Item = &Rc<dyn AspectDefinition>> {
        let wrapper_type = wrapper.wrapper_type();
        self.definitions
            .iter()
            .filter(move |d| d.supports(wrapper_type))
    }
}

impl AspectDefinition for CompositeAspectDefinition {
    fn name(&self) -> String {
        let names: Vec<String> = self.definitions.iter().map(|d| d.name()).collect();
        format!("composite[{}]", names.join(", "))
    }

    fn supports(&self, wrapper_type: WrapperType) -> bool {
        self.definitions.iter().any(|d| d.supports(wrapper_type))
    }

    fn create_ui_updater(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
    ) -> Result<UiUpdater, BindingError> {
        self.applicable(wrapper)
            .try_fold(UiUpdater::noop(), |combined, definition| {
                Ok(combined.and_then(definition.create_ui_updater(dispatcher, wrapper)?))
            })
    }

    fn init_model_update(
        &self,
        dispatcher: &Rc<PropertyDispatcher>,
        wrapper: &Rc<dyn ComponentWrapper>,
        model_changed: &ModelChanged,
    ) -> Result<(), BindingError> {
        for definition in self.applicable(wrapper) {
            definition
                .init_model_update(dispatcher, wrapper, model_changed)
                .map_err(|source| BindingError::ModelUpdate {
                    definition: definition.name(),
                    wrapper: wrapper.describe(),
                    dispatcher: dispatcher.to_string(),
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}

impl fmt::Debug for CompositeAspectDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Recorder, TestWrapper, dispatcher};
    use std::cell::Cell;

    #[test]
    fn noop_is_identity() {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let updater = UiUpdater::new(move || {
            h.set(h.get() + 1);
            Ok(())
        });
        assert!(UiUpdater::noop().and_then(UiUpdater::noop()).is_noop());
        let left = UiUpdater::noop().and_then(updater.clone());
        let right = updater.and_then(UiUpdater::noop());
        left.apply().unwrap();
        right.apply().unwrap();
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn and_then_stops_at_first_error() {
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        let failing = UiUpdater::new(|| Err(BindingError::NotWritable { property: "x".into() }));
        let after = UiUpdater::new(move || {
            r.set(true);
            Ok(())
        });
        assert!(failing.and_then(after).apply().is_err());
        assert!(!ran.get());
    }

    #[test]
    fn only_supporting_children_run_in_order() {
        let recorder = Recorder::default();
        let composite = CompositeAspectDefinition::default()
            .with(recorder.definition("one", WrapperType::FIELD))
            .with(recorder.definition("two", WrapperType::LAYOUT))
            .with(recorder.definition("three", WrapperType::COMPONENT));
        let wrapper: Rc<dyn ComponentWrapper> = Rc::new(TestWrapper::field("f"));
        let dispatcher = dispatcher();
        let changed: ModelChanged = Rc::new(|| Ok(()));

        composite
            .init_model_update(&dispatcher, &wrapper, &changed)
            .unwrap();
        let updater = composite.create_ui_updater(&dispatcher, &wrapper).unwrap();
        updater.apply().unwrap();

        assert_eq!(
            recorder.calls(),
            [
                "init:one",
                "init:three",
                "create:one",
                "create:three",
                "apply:one",
                "apply:three"
            ]
        );
    }

    #[test]
    fn supports_any_child() {
        let recorder = Recorder::default();
        let composite = CompositeAspectDefinition::default()
            .with(recorder.definition("a", WrapperType::FIELD))
            .with(recorder.definition("b", WrapperType::LAYOUT));
        assert!(composite.supports(WrapperType::FIELD));
        assert!(composite.supports(WrapperType::LAYOUT));
        assert!(!composite.supports(WrapperType::COMPONENT));
        assert!(!composite.supports(WrapperType::ROOT));
        assert!(!CompositeAspectDefinition::default().supports(WrapperType::FIELD));
    }

    #[test]
    fn init_failure_is_wrapped_with_context() {
        let recorder = Recorder::default();
        let composite = CompositeAspectDefinition::default()
            .with(recorder.failing_init("broken", WrapperType::FIELD))
            .with(recorder.definition("after", WrapperType::FIELD));
        let wrapper: Rc<dyn ComponentWrapper> = Rc::new(TestWrapper::field("street"));
        let dispatcher = dispatcher();
        let changed: ModelChanged = Rc::new(|| Ok(()));

        let err = composite
            .init_model_update(&dispatcher, &wrapper, &changed)
            .unwrap_err();
        match &err {
            BindingError::ModelUpdate {
                definition,
                wrapper,
                dispatcher,
                source,
            } => {
                assert_eq!(definition, "broken");
                assert_eq!(wrapper, "field[street]");
                assert!(dispatcher.starts_with("dispatcher("), "{dispatcher}");
                assert!(matches!(**source, BindingError::Accessor { .. }));
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(recorder.calls(), ["init:broken"]);
    }

    #[test]
    fn composite_name_lists_children() {
        let recorder = Recorder::default();
        let composite = CompositeAspectDefinition::default()
            .with(recorder.definition("a", WrapperType::FIELD))
            .with(recorder.definition("b", WrapperType::FIELD));
        assert_eq!(composite.name(), "composite[a, b]");
        assert_eq!(composite.len(), 2);
    }
}
