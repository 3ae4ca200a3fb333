#![forbid(unsafe_code)]

//! Core types for the PMO binding framework.
//!
//! This crate provides the leaf types every other layer builds on:
//!
//! - [`Aspect`]: a named, optionally valued unit of UI state.
//! - [`Value`] / [`FromValue`]: the dynamically typed values dispatchers
//!   exchange, with strict typed extraction.
//! - [`BoundProperty`]: which PMO property and model attribute a binding
//!   targets.
//! - [`WrapperType`], [`ComponentWrapper`], [`HasValue`]: the capability
//!   surface toolkit adapters implement.
//! - [`Message`], [`MessageList`], [`Severity`]: validation results.
//! - [`Accessors`], [`Bound`], [`BoundObject`]: explicit accessor tables
//!   standing in for reflective getter/setter lookup.
//! - [`BindingError`]: the error taxonomy shared by all layers.

pub mod aspect;
pub mod error;
pub mod message;
pub mod object;
pub mod property;
pub mod value;
pub mod wrapper;

pub use aspect::{Aspect, DERIVED_BY_LINKKI};
pub use error::BindingError;
pub use message::{Message, MessageList, ObjectId, ObjectProperty, Severity};
pub use object::{Accessors, Bound, BoundObject};
pub use property::{BoundProperty, DEFAULT_MODEL_OBJECT};
pub use value::{FromValue, Value};
pub use wrapper::{ComponentWrapper, HasValue, ValueChangeListener, WrapperType};
