#![forbid(unsafe_code)]

//! Reference PMOs, validation services and observers.
//!
//! The address fixture covers the binding paths a real form exercises:
//!
//! | Property | Value comes from | Dynamic aspects |
//! |----------|------------------|-----------------|
//! | `street` | model object | enabled (`editable`) |
//! | `zip` | model attribute `postalCode` | required |
//! | `city` | model object | visible (`show_city`) |
//! | `country` | PMO getter/setter | available values |
//! | `details` | (layout) | visible (`show_details`) |

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pmo_aspect::stock::{self, EnabledType, RequiredType, VisibleType};
use pmo_aspect::CompositeAspectDefinition;
use pmo_binding::{PmoDescriptor, UiUpdateObserver, ValidationService};
use pmo_core::aspect::names;
use pmo_core::{Accessors, Bound, BoundObject, BoundProperty, MessageList};

/// Model of the address fixture.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Address {
    pub street: String,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// Presentation state of the address fixture.
#[derive(Debug)]
pub struct AddressPmo {
    pub address: Rc<RefCell<Address>>,
    pub editable: bool,
    pub show_city: bool,
    pub show_details: bool,
}

/// A bound address PMO with handles to its state.
pub struct AddressFixture {
    pub pmo: Rc<RefCell<AddressPmo>>,
    pub bound: Rc<dyn BoundObject>,
}

impl AddressFixture {
    /// An editable address in Berlin.
    pub fn new() -> Self {
        Self::with_address(Address {
            street: "Unter den Linden 1".into(),
            postal_code: "10117".into(),
            city: "Berlin".into(),
            country: "DE".into(),
        })
    }

    pub fn with_address(address: Address) -> Self {
        let pmo = Rc::new(RefCell::new(AddressPmo {
            address: Rc::new(RefCell::new(address)),
            editable: true,
            show_city: true,
            show_details: true,
        }));
        let bound = Bound::new(Rc::clone(&pmo), address_pmo_accessors());
        Self { pmo, bound }
    }

    /// The current model.
    pub fn address(&self) -> Address {
        self.pmo.borrow().address.borrow().clone()
    }

    /// Replace the model object the PMO presents.
    pub fn replace_address(&self, address: Address) {
        self.pmo.borrow_mut().address = Rc::new(RefCell::new(address));
    }
}

impl Default for AddressFixture {
    fn default() -> Self {
        Self::new()
    }
}

fn address_accessors() -> Rc<Accessors<Address>> {
    Rc::new(
        Accessors::new("Address")
            .getter("street", |a: &Address| a.street.clone())
            .setter("street", |a: &mut Address, v: Option<String>| {
                a.street = v.unwrap_or_default();
            })
            .getter("postalCode", |a: &Address| a.postal_code.clone())
            .try_setter("postalCode", |a: &mut Address, v: Option<String>| {
                let code = v.unwrap_or_default();
                if code.chars().all(|c| c.is_ascii_digit()) {
                    a.postal_code = code;
                    Ok(())
                } else {
                    Err(format!("'{code}' is not a postal code"))
                }
            })
            .getter("city", |a: &Address| a.city.clone())
            .setter("city", |a: &mut Address, v: Option<String>| {
                a.city = v.unwrap_or_default();
            }),
    )
}

fn address_pmo_accessors() -> Rc<Accessors<AddressPmo>> {
    let model = address_accessors();
    Rc::new(
        Accessors::new("AddressPmo")
            .aspect("street", names::ENABLED, |p: &AddressPmo| p.editable)
            .aspect("zip", names::REQUIRED, |p: &AddressPmo| p.editable)
            .aspect("city", names::VISIBLE, |p: &AddressPmo| p.show_city)
            .getter("country", |p: &AddressPmo| p.address.borrow().country.clone())
            .setter("country", |p: &mut AddressPmo, v: Option<String>| {
                p.address.borrow_mut().country = v.unwrap_or_default();
            })
            .aspect("country", names::AVAILABLE_VALUES, |_: &AddressPmo| {
                vec!["AT", "CH", "DE"]
            })
            .aspect("details", names::VISIBLE, |p: &AddressPmo| p.show_details)
            .default_model_object(move |p: &AddressPmo| {
                Some(Bound::new(Rc::clone(&p.address), Rc::clone(&model)))
            }),
    )
}

/// Which properties of the address PMO are bound and how.
pub fn address_descriptor() -> PmoDescriptor {
    PmoDescriptor::builder("AddressPmo")
        .property(
            BoundProperty::new("street"),
            stock::field_aspects().with(stock::enabled(EnabledType::Dynamic)),
        )
        .property(
            BoundProperty::new("zip").model_attribute("postalCode"),
            stock::field_aspects().with(stock::required(RequiredType::Dynamic)),
        )
        .property(
            BoundProperty::new("city"),
            stock::field_aspects().with(stock::visible(VisibleType::Dynamic)),
        )
        .property(
            BoundProperty::new("country"),
            stock::field_aspects().with(stock::available_values()),
        )
        .build()
}

/// Aspects of the `details` section.
pub fn details_aspects() -> CompositeAspectDefinition {
    CompositeAspectDefinition::default()
        .with(stock::derived_label())
        .with(stock::visible(VisibleType::Dynamic))
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// A validation service returning whatever it was last given.
#[derive(Debug, Default)]
pub struct FixedValidation {
    messages: RefCell<MessageList>,
    queries: Cell<usize>,
}

impl FixedValidation {
    pub fn new(messages: impl Into<MessageList>) -> Rc<Self> {
        Rc::new(Self {
            messages: RefCell::new(messages.into()),
            queries: Cell::new(0),
        })
    }

    /// Replace the reported messages.
    pub fn set(&self, messages: impl Into<MessageList>) {
        *self.messages.borrow_mut() = messages.into();
    }

    /// How often the messages were requested.
    pub fn queries(&self) -> usize {
        self.queries.get()
    }
}

impl ValidationService for FixedValidation {
    fn filtered_messages(&self) -> MessageList {
        self.queries.set(self.queries.get() + 1);
        self.messages.borrow().clone()
    }
}

/// Journal shared by [`RecordingObserver`]s, in notification order.
pub type Journal = Arc<Mutex<Vec<String>>>;

/// Counts notifications and appends its tag to a shared journal.
///
/// `Send + Sync`, so it can be registered from any thread.
#[derive(Debug)]
pub struct RecordingObserver {
    tag: String,
    journal: Journal,
    notified: AtomicUsize,
}

impl RecordingObserver {
    pub fn new(tag: &str, journal: &Journal) -> Arc<Self> {
        Arc::new(Self {
            tag: tag.to_owned(),
            journal: Arc::clone(journal),
            notified: AtomicUsize::new(0),
        })
    }

    pub fn notified(&self) -> usize {
        self.notified.load(Ordering::SeqCst)
    }

    /// Tags recorded so far in `journal`.
    pub fn entries(journal: &Journal) -> Vec<String> {
        journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl UiUpdateObserver for RecordingObserver {
    fn ui_updated(&self) {
        self.notified.fetch_add(1, Ordering::SeqCst);
        self.journal
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(self.tag.clone());
    }
}
