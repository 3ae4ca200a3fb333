#![forbid(unsafe_code)]

//! Property dispatcher chains.
//!
//! A [`PropertyDispatcher`] resolves reads (`pull`) and writes (`push`) of
//! the aspects of one bound property. It is an ordered list of
//! [`DispatcherNode`]s processed by a single dispatch routine: each node
//! either answers the aspect or hands it on, unchanged, to the next node.
//!
//! The standard chain, outermost first:
//!
//! | Node | Answers |
//! |------|---------|
//! | `BehaviorDependent` | gates `visible`, `enabled`, `readOnly`, value pushes and messages |
//! | `StaticValue` | any aspect that already carries a value |
//! | `Pmo` | aspects the PMO declares accessors for |
//! | `ModelObject` | aspects the model object declares accessors for |
//! | `Exception` | nothing: fails with [`BindingError::UnsupportedAspect`] |
//!
//! # Invariants
//!
//! 1. The chain is immutable after [`DispatcherBuilder::build`].
//! 2. The last node is always `Exception`, so no aspect is ever silently
//!    defaulted.
//! 3. Model objects are resolved on every call; replacing the PMO's model
//!    object is picked up without rebuilding the chain.
//! 4. Behavior gates short-circuit: a property hidden by behavior is not
//!    asked for its own visibility.
//! 5. A push without value never reaches a writer; it fails with
//!    [`BindingError::MissingValue`].

use std::fmt;
use std::rc::Rc;

use pmo_core::aspect::names;
use pmo_core::{
    Aspect, BindingError, BoundObject, BoundProperty, DERIVED_BY_LINKKI, FromValue, MessageList,
    Value,
};
use smallvec::SmallVec;
use tracing::trace;

use crate::behavior::{PropertyBehavior, PropertyBehaviorProvider, consensus};

/// One link of a dispatcher chain.
pub enum DispatcherNode {
    /// Gates aspects on the consensus of the provider's behaviors.
    BehaviorDependent(Rc<dyn PropertyBehaviorProvider>),
    /// Answers aspects carrying a value.
    StaticValue,
    /// Reads and writes through the PMO's accessors.
    Pmo,
    /// Reads and writes through a model object of the PMO.
    ModelObject {
        /// Name under which the PMO exposes the model object.
        model_object: String,
        /// Attribute on the model object.
        attribute: String,
    },
    /// Terminal node; fails for every aspect.
    Exception,
}

impl DispatcherNode {
    /// Short node name for diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BehaviorDependent(_) => "behavior",
            Self::StaticValue => "static",
            Self::Pmo => "pmo",
            Self::ModelObject { .. } => "model",
            Self::Exception => "exception",
        }
    }
}

impl fmt::Debug for DispatcherNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ModelObject {
                model_object,
                attribute,
            } => write!(f, "ModelObject({model_object}.{attribute})"),
            other => f.write_str(other.kind()),
        }
    }
}

/// Dispatcher chain for one property of one PMO.
pub struct PropertyDispatcher {
    pmo: Rc<dyn BoundObject>,
    property: String,
    nodes: SmallVec<[DispatcherNode; 5]>,
}

impl PropertyDispatcher {
    /// Start building a chain for `property` of `pmo`.
    #[must_use]
    pub fn builder(pmo: Rc<dyn BoundObject>, property: impl Into<String>) -> DispatcherBuilder {
        DispatcherBuilder {
            pmo,
            property: property.into(),
            nodes: SmallVec::new(),
        }
    }

    /// The standard chain for `bound` on `pmo`.
    ///
    /// The model-object node is only included when the PMO declares the
    /// model object named by `bound`.
    #[must_use]
    pub fn standard(
        pmo: Rc<dyn BoundObject>,
        bound: &BoundProperty,
        behavior: Rc<dyn PropertyBehaviorProvider>,
    ) -> Self {
        let has_model = pmo.has_model_object(bound.model_object_name());
        let mut builder = Self::builder(pmo, bound.pmo_property())
            .behavior(behavior)
            .static_values()
            .pmo();
        if has_model {
            builder = builder.model_object(
                bound.model_object_name(),
                bound.effective_model_attribute(),
            );
        }
        builder.build()
    }

    /// The PMO this chain dispatches for.
    #[must_use]
    pub fn bound_object(&self) -> &Rc<dyn BoundObject> {
        &self.pmo
    }

    /// The PMO property name.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// The chain, outermost first.
    #[must_use]
    pub fn nodes(&self) -> &[DispatcherNode] {
        &self.nodes
    }

    /// Declared value type of the property, from the PMO or the model object.
    #[must_use]
    pub fn value_type(&self) -> Option<&'static str> {
        self.nodes.iter().find_map(|node| match node {
            DispatcherNode::Pmo => self.pmo.value_type(&self.property),
            DispatcherNode::ModelObject {
                model_object,
                attribute,
            } => self.pmo.model_object(model_object)?.value_type(attribute),
            _ => None,
        })
    }

    /// Read the current value of `aspect`.
    pub fn pull(&self, aspect: &Aspect<Value>) -> Result<Value, BindingError> {
        self.pull_from(0, aspect)
    }

    /// Read `aspect` and convert it to `V`. `Null` becomes `None`.
    pub fn pull_as<V>(&self, aspect: &Aspect<V>) -> Result<Option<V>, BindingError>
    where
        V: FromValue + Into<Value> + Clone,
    {
        let erased = aspect.clone().map(Into::into);
        let value = self.pull(&erased)?;
        V::from_value(aspect.name(), value)
    }

    /// Write the value carried by `aspect`.
    ///
    /// An aspect without value is refused with
    /// [`BindingError::MissingValue`] before any writer runs; clearing a
    /// property takes an explicit `Value::Null`.
    pub fn push(&self, aspect: &Aspect<Value>) -> Result<(), BindingError> {
        let Some(value) = aspect.value() else {
            return Err(BindingError::MissingValue {
                aspect: aspect.to_string(),
                property: self.property.clone(),
            });
        };
        self.push_from(0, aspect.name(), value)
    }

    /// Whether a push of `aspect` would be accepted. False for an aspect
    /// without value.
    #[must_use]
    pub fn is_pushable(&self, aspect: &Aspect<Value>) -> bool {
        aspect.is_value_present() && self.pushable_from(0, aspect.name())
    }

    /// Whether some node would accept writes of the aspect called `aspect`.
    #[must_use]
    pub fn is_writable(&self, aspect: &str) -> bool {
        self.pushable_from(0, aspect)
    }

    /// Messages from `messages` relevant to this property.
    #[must_use]
    pub fn messages(&self, messages: &MessageList) -> MessageList {
        self.messages_from(0, messages)
    }

    fn consensus(
        &self,
        provider: &Rc<dyn PropertyBehaviorProvider>,
        predicate: impl Fn(&dyn PropertyBehavior, &dyn BoundObject, &str) -> bool,
    ) -> bool {
        consensus(
            provider.as_ref(),
            self.pmo.as_ref(),
            &self.property,
            predicate,
        )
    }

    fn pull_bool(&self, index: usize, aspect: &Aspect<Value>) -> Result<bool, BindingError> {
        let value = self.pull_from(index, aspect)?;
        Ok(bool::from_value(aspect.name(), value)?.unwrap_or(false))
    }

    fn unsupported(&self, aspect: &Aspect<Value>) -> BindingError {
        BindingError::UnsupportedAspect {
            aspect: aspect.to_string(),
            property: self.property.clone(),
            object: format!("{:?}", self.pmo),
        }
    }

    fn pull_from(&self, index: usize, aspect: &Aspect<Value>) -> Result<Value, BindingError> {
        let Some(node) = self.nodes.get(index) else {
            return Err(self.unsupported(aspect));
        };
        let next = index + 1;
        match node {
            DispatcherNode::BehaviorDependent(provider) => match aspect.name() {
                names::VISIBLE => {
                    let visible = self.consensus(provider, |b, o, p| b.is_visible(o, p))
                        && self.pull_bool(next, aspect)?;
                    Ok(Value::Bool(visible))
                }
                names::ENABLED => {
                    let enabled = self.consensus(provider, |b, o, p| b.is_writable(o, p))
                        && self.pull_bool(next, aspect)?;
                    Ok(Value::Bool(enabled))
                }
                names::READ_ONLY => {
                    let read_only = !self.consensus(provider, |b, o, p| b.is_writable(o, p))
                        || self.pull_bool(next, aspect)?;
                    Ok(Value::Bool(read_only))
                }
                _ => self.pull_from(next, aspect),
            },
            DispatcherNode::StaticValue => match aspect.value() {
                Some(Value::Text(text)) if text == DERIVED_BY_LINKKI => {
                    Ok(Value::Text(derive_caption(&self.property)))
                }
                Some(value) => {
                    trace!(property = %self.property, aspect = %aspect, "static value");
                    Ok(value.clone())
                }
                None => self.pull_from(next, aspect),
            },
            DispatcherNode::Pmo => match self.pmo.read(&self.property, aspect.name()) {
                Some(result) => result,
                None => self.pull_from(next, aspect),
            },
            DispatcherNode::ModelObject {
                model_object,
                attribute,
            } => {
                let read = self
                    .pmo
                    .model_object(model_object)
                    .and_then(|model| model.read(attribute, aspect.name()));
                match read {
                    Some(result) => result,
                    None => self.pull_from(next, aspect),
                }
            }
            DispatcherNode::Exception => Err(self.unsupported(aspect)),
        }
    }

    fn push_from(&self, index: usize, aspect: &str, value: &Value) -> Result<(), BindingError> {
        let Some(node) = self.nodes.get(index) else {
            return Err(self.unsupported(&Aspect::of(aspect.to_owned())));
        };
        let next = index + 1;
        match node {
            DispatcherNode::BehaviorDependent(provider) => {
                if aspect == names::VALUE
                    && !self.consensus(provider, |b, o, p| b.is_writable(o, p))
                {
                    return Err(BindingError::NotWritable {
                        property: self.property.clone(),
                    });
                }
                self.push_from(next, aspect, value)
            }
            DispatcherNode::StaticValue => self.push_from(next, aspect, value),
            DispatcherNode::Pmo => match self.pmo.write(&self.property, aspect, value.clone()) {
                Some(result) => result,
                None => self.push_from(next, aspect, value),
            },
            DispatcherNode::ModelObject {
                model_object,
                attribute,
            } => {
                let written = self
                    .pmo
                    .model_object(model_object)
                    .and_then(|model| model.write(attribute, aspect, value.clone()));
                match written {
                    Some(result) => result,
                    None => self.push_from(next, aspect, value),
                }
            }
            DispatcherNode::Exception => Err(self.unsupported(&Aspect::of(aspect.to_owned()))),
        }
    }

    fn pushable_from(&self, index: usize, aspect: &str) -> bool {
        let Some(node) = self.nodes.get(index) else {
            return false;
        };
        let next = index + 1;
        match node {
            DispatcherNode::BehaviorDependent(provider) => {
                if aspect == names::VALUE
                    && !self.consensus(provider, |b, o, p| b.is_writable(o, p))
                {
                    return false;
                }
                self.pushable_from(next, aspect)
            }
            DispatcherNode::StaticValue => self.pushable_from(next, aspect),
            DispatcherNode::Pmo => {
                self.pmo.can_write(&self.property, aspect) || self.pushable_from(next, aspect)
            }
            DispatcherNode::ModelObject {
                model_object,
                attribute,
            } => {
                self.pmo
                    .model_object(model_object)
                    .is_some_and(|model| model.can_write(attribute, aspect))
                    || self.pushable_from(next, aspect)
            }
            DispatcherNode::Exception => false,
        }
    }

    fn messages_from(&self, index: usize, messages: &MessageList) -> MessageList {
        let Some(node) = self.nodes.get(index) else {
            return MessageList::new();
        };
        let next = index + 1;
        match node {
            DispatcherNode::BehaviorDependent(provider) => {
                if self.consensus(provider, |b, o, p| b.is_show_validation_messages(o, p)) {
                    self.messages_from(next, messages)
                } else {
                    MessageList::new()
                }
            }
            DispatcherNode::StaticValue => self.messages_from(next, messages),
            DispatcherNode::Pmo => {
                let mut own = messages.messages_for(self.pmo.object_id(), &self.property);
                own.extend(self.messages_from(next, messages));
                own
            }
            DispatcherNode::ModelObject {
                model_object,
                attribute,
            } => {
                let mut own = self
                    .pmo
                    .model_object(model_object)
                    .map(|model| messages.messages_for(model.object_id(), attribute))
                    .unwrap_or_default();
                own.extend(self.messages_from(next, messages));
                own
            }
            DispatcherNode::Exception => MessageList::new(),
        }
    }
}

impl fmt::Debug for PropertyDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDispatcher")
            .field("pmo", &self.pmo)
            .field("property", &self.property)
            .field("nodes", &self.nodes)
            .finish()
    }
}

impl fmt::Display for PropertyDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatcher({}.{})", self.pmo.type_name(), self.property)
    }
}

/// Builder for custom chains. [`build`](Self::build) appends the terminal node.
pub struct DispatcherBuilder {
    pmo: Rc<dyn BoundObject>,
    property: String,
    nodes: SmallVec<[DispatcherNode; 5]>,
}

impl DispatcherBuilder {
    /// Append a behavior gate.
    #[must_use]
    pub fn behavior(mut self, provider: Rc<dyn PropertyBehaviorProvider>) -> Self {
        self.nodes.push(DispatcherNode::BehaviorDependent(provider));
        self
    }

    /// Append the static value node.
    #[must_use]
    pub fn static_values(mut self) -> Self {
        self.nodes.push(DispatcherNode::StaticValue);
        self
    }

    /// Append the PMO accessor node.
    #[must_use]
    pub fn pmo(mut self) -> Self {
        self.nodes.push(DispatcherNode::Pmo);
        self
    }

    /// Append a model object node.
    #[must_use]
    pub fn model_object(mut self, model_object: &str, attribute: &str) -> Self {
        self.nodes.push(DispatcherNode::ModelObject {
            model_object: model_object.to_owned(),
            attribute: attribute.to_owned(),
        });
        self
    }

    /// Finish the chain with the terminal node.
    #[must_use]
    pub fn build(mut self) -> PropertyDispatcher {
        self.nodes.push(DispatcherNode::Exception);
        PropertyDispatcher {
            pmo: self.pmo,
            property: self.property,
            nodes: self.nodes,
        }
    }
}

/// `street` becomes `Street`.
fn derive_caption(property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
