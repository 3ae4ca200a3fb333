#![forbid(unsafe_code)]

//! Test harness and reference fixtures for PMO bindings.
//!
//! - [`components`]: toolkit-free components recording what the binding
//!   core pushed into them, with simulated user input.
//! - [`fixtures`]: an address PMO over a model object, its descriptor, a
//!   scripted validation service and recording observers.
//!
//! ```rust,ignore
//! let fixture = AddressFixture::new();
//! let street = InMemoryComponent::text_field("street");
//! let form = Form::new().with("street", Rc::clone(&street));
//! context.bind_pmo(&fixture.bound, &address_descriptor(), |n| form.lookup(n))?;
//! street.user_input("Friedrichstr. 43")?;
//! ```

pub mod components;
pub mod fixtures;

pub use components::{
    CheckBox, ComboBox, ComponentState, Form, InMemoryComponent, Label, Section, TextField,
};
pub use fixtures::{
    Address, AddressFixture, AddressPmo, FixedValidation, Journal, RecordingObserver,
    address_descriptor,
    details_aspects,
};
