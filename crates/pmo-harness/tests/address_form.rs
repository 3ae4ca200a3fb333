#![forbid(unsafe_code)]

//! Integration tests: an address form bound through its descriptor.
//!
//! Covers model-to-UI refresh, UI-to-model pushes through model objects,
//! behavior gating, container sections, component-type gates and failure
//! isolation across a whole view.
//!
//! Run:
//!   cargo test -p pmo-harness --test address_form

use std::rc::Rc;

use pmo_aspect::stock::{self, EnabledType};
use pmo_aspect::{ApplicableTypeAspectDefinition, CompositeAspectDefinition, UiUpdateErrorPolicy};
use pmo_binding::{BindingConfig, BindingContext, BindingManager, UiUpdateErrors};
use pmo_core::{BindingError, BoundProperty, MessageList, Value};
use pmo_dispatch::{BehaviorList, ConditionBehavior};
use pmo_harness::{
    Address, AddressFixture, ComboBox, FixedValidation, Form, InMemoryComponent, address_descriptor,
    details_aspects,
};

struct AddressForm {
    fixture: AddressFixture,
    street: Rc<InMemoryComponent>,
    zip: Rc<InMemoryComponent>,
    city: Rc<InMemoryComponent>,
    country: Rc<InMemoryComponent>,
}

impl AddressForm {
    fn bind(context: &BindingContext) -> Self {
        let fixture = AddressFixture::new();
        let form = Form::new()
            .with("street", InMemoryComponent::text_field("street"))
            .with("zip", InMemoryComponent::text_field("zip"))
            .with("city", InMemoryComponent::text_field("city"))
            .with("country", InMemoryComponent::combo_box("country"));
        context
            .bind_pmo(&fixture.bound, &address_descriptor(), |name| form.lookup(name))
            .unwrap();
        let get = |name: &str| Rc::clone(form.get(name).unwrap());
        Self {
            street: get("street"),
            zip: get("zip"),
            city: get("city"),
            country: get("country"),
            fixture,
        }
    }
}

// ============================================================================
// Model to UI
// ============================================================================

#[test]
fn initial_bind_shows_model_state() {
    let context = BindingContext::new("address");
    let form = AddressForm::bind(&context);

    let street = form.street.state();
    assert_eq!(street.value, Value::from("Unter den Linden 1"));
    assert_eq!(street.label.as_deref(), Some("Street"));
    assert!(street.enabled);
    assert!(!street.read_only);
    assert_eq!(street.post_updates, 1);

    assert_eq!(form.zip.state().value, Value::from("10117"));
    assert!(form.zip.state().required);
    assert_eq!(
        form.country.state().items,
        [Value::from("AT"), Value::from("CH"), Value::from("DE")]
    );
    assert_eq!(context.len(), 4);
}

#[test]
fn pmo_state_changes_appear_after_update() {
    let context = BindingContext::new("address");
    let form = AddressForm::bind(&context);

    {
        let mut pmo = form.fixture.pmo.borrow_mut();
        pmo.editable = false;
        pmo.show_city = false;
    }
    context.update_ui().unwrap();

    assert!(!form.street.state().enabled);
    assert!(!form.zip.state().required);
    assert!(!form.city.state().visible);
}

#[test]
fn replaced_model_object_is_picked_up() {
    let context = BindingContext::new("address");
    let form = AddressForm::bind(&context);

    form.fixture.replace_address(Address {
        street: "Bahnhofstrasse 1".into(),
        postal_code: "8001".into(),
        city: "Zürich".into(),
        country: "CH".into(),
    });
    context.update_ui().unwrap();

    assert_eq!(form.city.state().value, Value::from("Zürich"));
    assert_eq!(form.country.state().value, Value::from("CH"));
}

// ============================================================================
// UI to model
// ============================================================================

#[test]
fn edits_reach_model_and_refresh_siblings() {
    let manager = BindingManager::new(FixedValidation::new(MessageList::new()));
    let context = manager.context("address");
    let form = AddressForm::bind(&context);

    form.zip.user_input("10178").unwrap();
    form.country.user_input("AT").unwrap();

    let address = form.fixture.address();
    assert_eq!(address.postal_code, "10178");
    assert_eq!(address.country, "AT");
    assert_eq!(form.zip.state().post_updates, 3);
}

#[test]
fn rejected_edit_surfaces_accessor_error() {
    let context = BindingContext::new("address");
    let form = AddressForm::bind(&context);

    let err = form.zip.user_input("ABC").unwrap_err();

    assert!(matches!(err, BindingError::Accessor { .. }));
    assert_eq!(form.fixture.address().postal_code, "10117");
}

#[test]
fn read_only_behavior_blocks_every_edit() {
    let context = BindingContext::builder("address")
        .behavior(Rc::new(
            BehaviorList::none().with(ConditionBehavior::read_only()),
        ))
        .build();
    let form = AddressForm::bind(&context);

    assert!(form.street.state().read_only);
    assert!(!form.street.state().enabled);
    let err = form.street.user_input("Elsewhere 2").unwrap_err();
    assert!(matches!(err, BindingError::NotWritable { ref property } if property == "street"));
    assert_eq!(form.fixture.address().street, "Unter den Linden 1");
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn section_hides_and_refreshes_nested_fields() {
    let context = BindingContext::new("address");
    let fixture = AddressFixture::new();
    let section = InMemoryComponent::section("details");
    let container = context
        .bind_container(
            Rc::clone(&fixture.bound),
            &BoundProperty::new("details"),
            details_aspects(),
            section.wrapper(),
        )
        .unwrap();
    let city = InMemoryComponent::text_field("city");
    container
        .children()
        .bind(
            Rc::clone(&fixture.bound),
            &BoundProperty::new("city"),
            stock::field_aspects(),
            city.wrapper(),
        )
        .unwrap();
    assert_eq!(section.state().label.as_deref(), Some("Details"));

    fixture.pmo.borrow_mut().show_details = false;
    fixture.pmo.borrow().address.borrow_mut().city = "Potsdam".into();
    context.update_ui().unwrap();

    assert!(!section.state().visible);
    assert_eq!(city.state().value, Value::from("Potsdam"));
}

// ============================================================================
// Component-type gates
// ============================================================================

#[test]
fn available_values_only_for_combo_boxes() {
    let context = BindingContext::new("address");
    let fixture = AddressFixture::new();
    let definition = stock::field_aspects().with(
        ApplicableTypeAspectDefinition::if_component_type_is::<ComboBox>(stock::available_values()),
    );
    let combo = InMemoryComponent::combo_box("countryCombo");
    let text = InMemoryComponent::text_field("countryText");
    for component in [&combo, &text] {
        context
            .bind(
                Rc::clone(&fixture.bound),
                &BoundProperty::new("country"),
                definition.clone(),
                component.wrapper(),
            )
            .unwrap();
    }

    assert_eq!(combo.state().items.len(), 3);
    assert!(text.state().items.is_empty());
    assert!(!text.calls().iter().any(|c| c.starts_with("set_items")));
}

// ============================================================================
// Failure isolation
// ============================================================================

#[test]
fn broken_binding_is_reported_while_others_update() {
    let context = BindingContext::new("address");
    let form = AddressForm::bind(&context);
    let broken = InMemoryComponent::text_field("broken");
    let bind = context.bind(
        Rc::clone(&form.fixture.bound),
        &BoundProperty::new("zip"),
        CompositeAspectDefinition::default().with(stock::enabled(EnabledType::Dynamic)),
        broken.wrapper(),
    );
    assert!(bind.is_err());

    form.fixture.pmo.borrow_mut().show_city = false;
    let err = context.update_ui().unwrap_err();

    assert!(!form.city.state().visible);
    let BindingError::ContextUpdate { failures, .. } = err else {
        panic!("expected a context update error");
    };
    assert_eq!(failures.len(), 1);
    assert!(matches!(
        failures[0].root_cause(),
        BindingError::UnsupportedAspect { aspect, .. } if aspect == "enabled"
    ));
}

#[test]
fn log_policy_keeps_refreshing_remaining_aspects() {
    let context = BindingContext::builder("address")
        .config(BindingConfig {
            ui_update_errors: UiUpdateErrors::Log,
            ..BindingConfig::default()
        })
        .build();
    let fixture = AddressFixture::new();
    let city = InMemoryComponent::text_field("city");
    let definition = CompositeAspectDefinition::default()
        .with(stock::dynamic_tooltip().error_policy(UiUpdateErrorPolicy::log()))
        .with(stock::value());
    context
        .bind(
            Rc::clone(&fixture.bound),
            &BoundProperty::new("city"),
            definition,
            city.wrapper(),
        )
        .unwrap();

    fixture.pmo.borrow().address.borrow_mut().city = "Hamburg".into();
    context.update_ui().unwrap();

    assert_eq!(city.state().value, Value::from("Hamburg"));
}
