#![forbid(unsafe_code)]

//! Externally injectable policies gating pulls and pushes.
//!
//! A [`PropertyBehaviorProvider`] hands the dispatcher chain a set of
//! [`PropertyBehavior`]s. The chain asks for *consensus*: a property is
//! writable, visible or shows validation messages only when every behavior
//! agrees. An empty provider agrees with everything.

use std::fmt;
use std::rc::Rc;

use pmo_core::BoundObject;

/// A policy consulted for every bound property.
///
/// Every method defaults to `true`, so implementations only override the
/// decisions they care about.
pub trait PropertyBehavior {
    /// Whether the property may be written.
    fn is_writable(&self, _object: &dyn BoundObject, _property: &str) -> bool {
        true
    }

    /// Whether the property may be shown.
    fn is_visible(&self, _object: &dyn BoundObject, _property: &str) -> bool {
        true
    }

    /// Whether validation messages for the property are displayed.
    fn is_show_validation_messages(&self, _object: &dyn BoundObject, _property: &str) -> bool {
        true
    }
}

/// Supplies the behaviors a binding context applies.
pub trait PropertyBehaviorProvider {
    /// The behaviors, in no particular order.
    fn behaviors(&self) -> Vec<Rc<dyn PropertyBehavior>>;
}

/// Whether every behavior of `provider` accepts `(object, property)`.
pub fn consensus(
    provider: &dyn PropertyBehaviorProvider,
    object: &dyn BoundObject,
    property: &str,
    predicate: impl Fn(&dyn PropertyBehavior, &dyn BoundObject, &str) -> bool,
) -> bool {
    provider
        .behaviors()
        .iter()
        .all(|b| predicate(b.as_ref(), object, property))
}

/// A provider with a fixed list of behaviors.
#[derive(Clone, Default)]
pub struct BehaviorList {
    behaviors: Vec<Rc<dyn PropertyBehavior>>,
}

impl BehaviorList {
    /// A provider with no behaviors; every consensus holds.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// A provider with the given behaviors.
    #[must_use]
    pub fn new(behaviors: Vec<Rc<dyn PropertyBehavior>>) -> Self {
        Self { behaviors }
    }

    /// Add a behavior.
    #[must_use]
    pub fn with(mut self, behavior: impl PropertyBehavior + 'static) -> Self {
        self.behaviors.push(Rc::new(behavior));
        self
    }

    /// Number of behaviors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.behaviors.len()
    }

    /// Whether there are no behaviors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }
}

impl PropertyBehaviorProvider for BehaviorList {
    fn behaviors(&self) -> Vec<Rc<dyn PropertyBehavior>> {
        self.behaviors.clone()
    }
}

impl fmt::Debug for BehaviorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BehaviorList")
            .field("behaviors", &self.behaviors.len())
            .finish()
    }
}

/// Shared provider with no behaviors.
#[must_use]
pub fn no_behavior_provider() -> Rc<dyn PropertyBehaviorProvider> {
    Rc::new(BehaviorList::none())
}

type Condition = Rc<dyn Fn() -> bool>;

/// A behavior driven by global conditions, independent of object and property.
///
/// ```
/// use std::cell::Cell;
/// use std::rc::Rc;
/// use pmo_dispatch::behavior::{BehaviorList, ConditionBehavior, PropertyBehaviorProvider};
///
/// let editing = Rc::new(Cell::new(false));
/// let flag = Rc::clone(&editing);
/// let provider = BehaviorList::none().with(ConditionBehavior::writable(move || flag.get()));
/// assert_eq!(provider.behaviors().len(), 1);
/// ```
#[derive(Clone)]
pub struct ConditionBehavior {
    writable: Option<Condition>,
    visible: Option<Condition>,
    show_messages: Option<Condition>,
}

impl ConditionBehavior {
    /// Never writable.
    #[must_use]
    pub fn read_only() -> Self {
        Self::writable(|| false)
    }

    /// Writable while `condition` holds.
    #[must_use]
    pub fn writable(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            writable: Some(Rc::new(condition)),
            visible: None,
            show_messages: None,
        }
    }

    /// Visible while `condition` holds.
    #[must_use]
    pub fn visible(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            writable: None,
            visible: Some(Rc::new(condition)),
            show_messages: None,
        }
    }

    /// Validation messages shown while `condition` holds.
    #[must_use]
    pub fn show_validation_messages(condition: impl Fn() -> bool + 'static) -> Self {
        Self {
            writable: None,
            visible: None,
            show_messages: Some(Rc::new(condition)),
        }
    }
}

impl PropertyBehavior for ConditionBehavior {
    fn is_writable(&self, _object: &dyn BoundObject, _property: &str) -> bool {
        self.writable.as_ref().is_none_or(|c| c())
    }

    fn is_visible(&self, _object: &dyn BoundObject, _property: &str) -> bool {
        self.visible.as_ref().is_none_or(|c| c())
    }

    fn is_show_validation_messages(&self, _object: &dyn BoundObject, _property: &str) -> bool {
        self.show_messages.as_ref().is_none_or(|c| c())
    }
}

impl fmt::Debug for ConditionBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionBehavior")
            .field("writable", &self.writable.is_some())
            .field("visible", &self.visible.is_some())
            .field("show_messages", &self.show_messages.is_some())
            .finish()
    }
}
