#![forbid(unsafe_code)]

//! Explicit accessor tables for PMOs and model objects.
//!
//! Bound objects expose their readable and writable `(property, aspect)`
//! pairs through an [`Accessors`] table built once at startup. A [`Bound`]
//! pairs a shared object with its table and implements the type-erased
//! [`BoundObject`] trait the dispatcher chain works against.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use pmo_core::{Accessors, Bound, BoundObject, Value, aspect::names};
//!
//! struct PersonPmo {
//!     name: String,
//!     locked: bool,
//! }
//!
//! let accessors = Accessors::<PersonPmo>::new("PersonPmo")
//!     .getter("name", |p| p.name.clone())
//!     .setter("name", |p, v: Option<String>| p.name = v.unwrap_or_default())
//!     .aspect("name", names::ENABLED, |p| !p.locked);
//!
//! let pmo = Rc::new(RefCell::new(PersonPmo { name: "Ada".into(), locked: false }));
//! let bound = Bound::new(pmo, Rc::new(accessors));
//!
//! let read = bound.read("name", names::VALUE).unwrap().unwrap();
//! assert_eq!(read, Value::from("Ada"));
//! assert!(bound.can_write("name", names::VALUE));
//! assert!(!bound.can_write("name", names::ENABLED));
//! ```
//!
//! # Failure Modes
//!
//! - Missing accessor: `read`/`write` return `None`, letting the dispatcher
//!   chain fall through to the next node.
//! - Re-entrant access while the object is mutably borrowed: reported as
//!   [`BindingError::Accessor`] instead of panicking.
//! - Setter given a value of the wrong shape: [`BindingError::TypeMismatch`].

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use ahash::AHashMap;

use crate::aspect::names;
use crate::error::BindingError;
use crate::message::ObjectId;
use crate::value::{FromValue, Value};

/// Type-erased view of a PMO or model object.
pub trait BoundObject {
    /// Identity used to match validation messages.
    fn object_id(&self) -> ObjectId;

    /// Name of the object's type, for diagnostics.
    fn type_name(&self) -> &str;

    /// Read an aspect of a property. `None` when no reader is declared.
    fn read(&self, property: &str, aspect: &str) -> Option<Result<Value, BindingError>>;

    /// Write an aspect of a property. `None` when no writer is declared.
    fn write(&self, property: &str, aspect: &str, value: Value)
    -> Option<Result<(), BindingError>>;

    /// Whether a reader is declared.
    fn can_read(&self, property: &str, aspect: &str) -> bool;

    /// Whether a writer is declared.
    fn can_write(&self, property: &str, aspect: &str) -> bool;

    /// Declared value type of a property, if known.
    fn value_type(&self, property: &str) -> Option<&'static str>;

    /// Whether a model object with this name is declared.
    fn has_model_object(&self, name: &str) -> bool;

    /// Resolve the named model object. Evaluated on every call.
    fn model_object(&self, name: &str) -> Option<Rc<dyn BoundObject>>;

    /// Access to the concrete type, for behaviors inspecting the object.
    fn as_any(&self) -> &dyn Any;
}

impl fmt::Debug for dyn BoundObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.type_name(), self.object_id())
    }
}

type Reader<P> = Box<dyn Fn(&P) -> Result<Value, BindingError>>;
type Writer<P> = Box<dyn Fn(&mut P, Value) -> Result<(), BindingError>>;
type ModelObjectGetter<P> = Box<dyn Fn(&P) -> Option<Rc<dyn BoundObject>>>;

struct PropertyAccess<P> {
    readers: AHashMap<String, Reader<P>>,
    writers: AHashMap<String, Writer<P>>,
    value_type: Option<&'static str>,
}

impl<P> Default for PropertyAccess<P> {
    fn default() -> Self {
        Self {
            readers: AHashMap::new(),
            writers: AHashMap::new(),
            value_type: None,
        }
    }
}

/// Accessor table for objects of type `P`.
///
/// Built once, shared by every [`Bound`] of the same type.
pub struct Accessors<P> {
    type_name: &'static str,
    properties: AHashMap<String, PropertyAccess<P>>,
    model_objects: AHashMap<String, ModelObjectGetter<P>>,
}

impl<P: 'static> Accessors<P> {
    /// An empty table for the type called `type_name`.
    #[must_use]
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            properties: AHashMap::new(),
            model_objects: AHashMap::new(),
        }
    }

    fn property_mut(&mut self, property: &str) -> &mut PropertyAccess<P> {
        self.properties.entry(property.to_owned()).or_default()
    }

    /// Declare the value getter of `property`.
    #[must_use]
    pub fn getter<V: Into<Value> + 'static>(
        self,
        property: &str,
        get: impl Fn(&P) -> V + 'static,
    ) -> Self {
        self.aspect(property, names::VALUE, get)
    }

    /// Declare the value setter of `property`.
    ///
    /// The incoming [`Value`] is converted to `V`; `Null` arrives as `None`.
    #[must_use]
    pub fn setter<V: FromValue + 'static>(
        self,
        property: &str,
        set: impl Fn(&mut P, Option<V>) + 'static,
    ) -> Self {
        self.aspect_setter(property, names::VALUE, set)
    }

    /// Declare a value setter that can reject the new value.
    #[must_use]
    pub fn try_setter<V: FromValue + 'static, E: fmt::Display + 'static>(
        mut self,
        property: &str,
        set: impl Fn(&mut P, Option<V>) -> Result<(), E> + 'static,
    ) -> Self {
        let owned = property.to_owned();
        let access = self.property_mut(property);
        access.value_type = Some(V::TYPE_NAME);
        access.writers.insert(
            names::VALUE.to_owned(),
            Box::new(move |p: &mut P, value: Value| -> Result<(), BindingError> {
                let typed = V::from_value(names::VALUE, value)?;
                set(p, typed).map_err(|e| BindingError::accessor(&owned, names::VALUE, e))
            }),
        );
        self
    }

    /// Declare a getter for a non-value aspect of `property`.
    #[must_use]
    pub fn aspect<V: Into<Value> + 'static>(
        mut self,
        property: &str,
        aspect: &str,
        get: impl Fn(&P) -> V + 'static,
    ) -> Self {
        self.property_mut(property).readers.insert(
            aspect.to_owned(),
            Box::new(move |p: &P| -> Result<Value, BindingError> { Ok(get(p).into()) }),
        );
        self
    }

    /// Declare a setter for an aspect of `property`.
    #[must_use]
    pub fn aspect_setter<V: FromValue + 'static>(
        mut self,
        property: &str,
        aspect: &str,
        set: impl Fn(&mut P, Option<V>) + 'static,
    ) -> Self {
        let aspect_name = aspect.to_owned();
        let access = self.property_mut(property);
        if aspect == names::VALUE {
            access.value_type = Some(V::TYPE_NAME);
        }
        access.writers.insert(
            aspect.to_owned(),
            Box::new(move |p: &mut P, value: Value| -> Result<(), BindingError> {
                let typed = V::from_value(&aspect_name, value)?;
                set(p, typed);
                Ok(())
            }),
        );
        self
    }

    /// Declare a model object reachable under `name`.
    #[must_use]
    pub fn model_object(
        mut self,
        name: &str,
        get: impl Fn(&P) -> Option<Rc<dyn BoundObject>> + 'static,
    ) -> Self {
        self.model_objects.insert(name.to_owned(), Box::new(get));
        self
    }

    /// Declare the default model object.
    #[must_use]
    pub fn default_model_object(
        self,
        get: impl Fn(&P) -> Option<Rc<dyn BoundObject>> + 'static,
    ) -> Self {
        self.model_object(crate::property::DEFAULT_MODEL_OBJECT, get)
    }

    /// The declared type name.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Names of properties with at least one accessor.
    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }
}

impl<P> fmt::Debug for Accessors<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accessors")
            .field("type_name", &self.type_name)
            .field("properties", &self.properties.len())
            .field("model_objects", &self.model_objects.len())
            .finish()
    }
}

/// A shared object paired with its accessor table.
pub struct Bound<P> {
    object: Rc<RefCell<P>>,
    accessors: Rc<Accessors<P>>,
}

impl<P: 'static> Bound<P> {
    /// Pair `object` with `accessors`, type-erased for dispatching.
    #[must_use]
    pub fn new(object: Rc<RefCell<P>>, accessors: Rc<Accessors<P>>) -> Rc<dyn BoundObject> {
        Rc::new(Self { object, accessors })
    }

    /// The shared object.
    #[must_use]
    pub fn object(&self) -> &Rc<RefCell<P>> {
        &self.object
    }

    fn borrow_err(&self, property: &str, aspect: &str) -> BindingError {
        BindingError::accessor(
            property,
            aspect,
            format_args!("{} is already mutably borrowed", self.accessors.type_name),
        )
    }
}

impl<P: 'static> BoundObject for Bound<P> {
    fn object_id(&self) -> ObjectId {
        ObjectId::of(&self.object)
    }

    fn type_name(&self) -> &str {
        self.accessors.type_name
    }

    fn read(&self, property: &str, aspect: &str) -> Option<Result<Value, BindingError>> {
        let reader = self.accessors.properties.get(property)?.readers.get(aspect)?;
        Some(match self.object.try_borrow() {
            Ok(object) => reader(&*object),
            Err(_) => Err(self.borrow_err(property, aspect)),
        })
    }

    fn write(
        &self,
        property: &str,
        aspect: &str,
        value: Value,
    ) -> Option<Result<(), BindingError>> {
        let writer = self.accessors.properties.get(property)?.writers.get(aspect)?;
        Some(match self.object.try_borrow_mut() {
            Ok(mut object) => writer(&mut *object, value),
            Err(_) => Err(self.borrow_err(property, aspect)),
        })
    }

    fn can_read(&self, property: &str, aspect: &str) -> bool {
        self.accessors
            .properties
            .get(property)
            .is_some_and(|p| p.readers.contains_key(aspect))
    }

    fn can_write(&self, property: &str, aspect: &str) -> bool {
        self.accessors
            .properties
            .get(property)
            .is_some_and(|p| p.writers.contains_key(aspect))
    }

    fn value_type(&self, property: &str) -> Option<&'static str> {
        self.accessors.properties.get(property)?.value_type
    }

    fn has_model_object(&self, name: &str) -> bool {
        self.accessors.model_objects.contains_key(name)
    }

    fn model_object(&self, name: &str) -> Option<Rc<dyn BoundObject>> {
        let get = self.accessors.model_objects.get(name)?;
        let object = self.object.try_borrow().ok()?;
        get(&*object)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
