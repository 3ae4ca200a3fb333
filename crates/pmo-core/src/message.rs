#![forbid(unsafe_code)]

//! Validation messages and their attachment to bound properties.
//!
//! A [`Message`] marks zero or more `(object, property)` pairs as invalid.
//! Bindings pick the messages relevant to their property with
//! [`MessageList::messages_for`] and hand them to the component.
//!
//! # Invariants
//!
//! 1. [`MessageList::sorted_by_severity`] is stable: messages of equal
//!    severity keep their relative order.
//! 2. [`MessageList::severity`] of an empty list is `None`.

use std::fmt;
use std::rc::Rc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identity of a bound object, derived from its shared allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectId(usize);

impl ObjectId {
    /// Identity of the object behind `rc`. Clones of the same `Rc` share it.
    ///
    /// The identity is the allocation address, so it is unique only while
    /// the object is alive. Once the last `Rc` is dropped the address may be
    /// reused, and a new object can then match messages created for the old
    /// one. Keep the object alive as long as its messages are displayed, or
    /// recompute the messages after replacing it.
    #[must_use]
    pub fn of<T: ?Sized>(rc: &Rc<T>) -> Self {
        Self(Rc::as_ptr(rc) as *const () as usize)
    }

    /// An explicitly numbered identity, for objects without an `Rc`.
    #[must_use]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// The raw identity value.
    #[must_use]
    pub const fn raw(self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// An `(object, property)` pair a message refers to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ObjectProperty {
    /// The object.
    pub object: ObjectId,
    /// The property on that object.
    pub property: String,
}

impl ObjectProperty {
    /// Create a new object property reference.
    #[must_use]
    pub fn new(object: ObjectId, property: impl Into<String>) -> Self {
        Self {
            object,
            property: property.into(),
        }
    }
}

/// Message severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Informational.
    Info,
    /// Something looks wrong but input is accepted.
    Warning,
    /// Invalid input.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// A single validation message.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Message {
    /// Machine-readable code.
    pub code: String,
    /// Human-readable text.
    pub text: String,
    /// Severity.
    pub severity: Severity,
    /// Properties marked invalid by this message.
    pub invalid_properties: Vec<ObjectProperty>,
}

impl Message {
    /// Create a message without invalid properties.
    #[must_use]
    pub fn new(code: impl Into<String>, text: impl Into<String>, severity: Severity) -> Self {
        Self {
            code: code.into(),
            text: text.into(),
            severity,
            invalid_properties: Vec::new(),
        }
    }

    /// Shorthand for an error message.
    #[must_use]
    pub fn error(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(code, text, Severity::Error)
    }

    /// Shorthand for a warning message.
    #[must_use]
    pub fn warning(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(code, text, Severity::Warning)
    }

    /// Shorthand for an info message.
    #[must_use]
    pub fn info(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(code, text, Severity::Info)
    }

    /// Mark `property` of `object` as invalid.
    #[must_use]
    pub fn invalid(mut self, object: ObjectId, property: impl Into<String>) -> Self {
        self.invalid_properties
            .push(ObjectProperty::new(object, property));
        self
    }

    /// Whether the message refers to `property` of `object`.
    #[must_use]
    pub fn refers_to(&self, object: ObjectId, property: &str) -> bool {
        self.invalid_properties
            .iter()
            .any(|op| op.object == object && op.property == property)
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.code, self.text)
    }
}

/// An ordered collection of messages.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct MessageList {
    messages: Vec<Message>,
}

impl MessageList {
    /// An empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message.
    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the list has no messages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Iterate over the messages in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    /// The message at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    /// Highest severity in the list.
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.messages.iter().map(|m| m.severity).max()
    }

    /// Whether any message is an error.
    #[must_use]
    pub fn contains_errors(&self) -> bool {
        self.severity() == Some(Severity::Error)
    }

    /// First message with [`Severity::Error`].
    #[must_use]
    pub fn first_error(&self) -> Option<&Message> {
        self.messages.iter().find(|m| m.severity == Severity::Error)
    }

    /// Messages referring to `property` of `object`, in list order.
    #[must_use]
    pub fn messages_for(&self, object: ObjectId, property: &str) -> Self {
        self.filter(|m| m.refers_to(object, property))
    }

    /// Messages matching `predicate`, in list order.
    #[must_use]
    pub fn filter(&self, predicate: impl Fn(&Message) -> bool) -> Self {
        self.messages
            .iter()
            .filter(|m| predicate(m))
            .cloned()
            .collect()
    }

    /// A copy sorted by descending severity. Equal severities keep their order.
    #[must_use]
    pub fn sorted_by_severity(&self) -> Self {
        let mut messages = self.messages.clone();
        messages.sort_by(|a, b| b.severity.cmp(&a.severity));
        Self { messages }
    }
}

impl Extend<Message> for MessageList {
    fn extend<I: IntoIterator<Item = Message>>(&mut self, iter: I) {
        self.messages.extend(iter);
    }
}

impl FromIterator<Message> for MessageList {
    fn from_iter<I: IntoIterator<Item = Message>>(iter: I) -> Self {
        Self {
            messages: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Message>> for MessageList {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl IntoIterator for MessageList {
    type Item = Message;
    type IntoIter = std::vec::IntoIter<Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.into_iter()
    }
}

impl<'a> IntoIterator for &'a MessageList {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> MessageList {
        vec![
            Message::info("i1", "note"),
            Message::error("e1", "bad"),
            Message::warning("w1", "hmm"),
            Message::error("e2", "worse"),
        ]
        .into()
    }

    #[test]
    fn sorted_by_severity_is_descending_and_stable() {
        let codes: Vec<_> = list()
            .sorted_by_severity()
            .iter()
            .map(|m| m.code.clone())
            .collect();
        assert_eq!(codes, ["e1", "e2", "w1", "i1"]);
    }

    #[test]
    fn severity_is_max() {
        assert_eq!(list().severity(), Some(Severity::Error));
        assert_eq!(MessageList::new().severity(), None);
        assert!(list().contains_errors());
        assert_eq!(list().first_error().map(|m| m.code.as_str()), Some("e1"));
    }

    #[test]
    fn messages_for_filters_by_object_and_property() {
        let a = ObjectId::from_raw(1);
        let b = ObjectId::from_raw(2);
        let msgs: MessageList = vec![
            Message::error("x", "x").invalid(a, "name"),
            Message::error("y", "y").invalid(b, "name"),
            Message::error("z", "z").invalid(a, "street"),
        ]
        .into();
        let for_a = msgs.messages_for(a, "name");
        assert_eq!(for_a.len(), 1);
        assert_eq!(for_a.get(0).map(|m| m.code.as_str()), Some("x"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn severity_serializes_lowercase() {
        let json = serde_json::to_string(&Message::warning("w", "careful")).unwrap();
        assert!(json.contains("\"severity\":\"warning\""), "{json}");
        let back: Message = serde_json::from_str(&json).unwrap();
        assert_eq!(back.severity, Severity::Warning);
    }

    #[test]
    fn object_id_follows_rc_identity() {
        let rc = Rc::new(5);
        let other = Rc::new(5);
        assert_eq!(ObjectId::of(&rc), ObjectId::of(&Rc::clone(&rc)));
        assert_ne!(ObjectId::of(&rc), ObjectId::of(&other));
    }

    #[test]
    fn object_ids_are_unique_among_live_objects() {
        let live: Vec<Rc<dyn fmt::Debug>> = (0..64)
            .map(|i| Rc::new(i) as Rc<dyn fmt::Debug>)
            .collect();
        let ids: std::collections::HashSet<ObjectId> = live.iter().map(ObjectId::of).collect();
        assert_eq!(ids.len(), live.len());

        let concrete = Rc::new(String::from("street"));
        let erased: Rc<dyn fmt::Debug> = concrete.clone();
        assert_eq!(ObjectId::of(&concrete), ObjectId::of(&erased));

        let messages: MessageList =
            vec![Message::error("E", "bad").invalid(ObjectId::of(&concrete), "street")].into();
        for other in &live {
            assert!(messages.messages_for(ObjectId::of(other), "street").is_empty());
        }
        assert_eq!(messages.messages_for(ObjectId::of(&concrete), "street").len(), 1);
    }
}
