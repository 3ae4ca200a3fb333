#![forbid(unsafe_code)]

//! Integration tests: tracing emitted by update passes.
//!
//! Verifies:
//! 1. `binding_context.update_ui` span carries context name, binding count
//!    and a recorded `duration_us`
//! 2. WARN event per failing binding, naming the binding
//! 3. WARN for passes slower than the configured threshold
//! 4. ERROR from the `log` UI-update policy
//! 5. No WARN or ERROR during a healthy pass
//! 6. WARN naming the context when a refresh triggered as a UI-update
//!    observer fails
//!
//! Run:
//!   cargo test -p pmo-harness --test tracing_spans

use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use pmo_aspect::stock::{self, EnabledType};
use pmo_aspect::{CompositeAspectDefinition, UiUpdateErrorPolicy};
use pmo_binding::{BindingConfig, BindingContext, UiUpdateObserver};
use pmo_core::BoundProperty;
use pmo_harness::{AddressFixture, InMemoryComponent};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

// ============================================================================
// Tracing capture infrastructure
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedSpan {
    name: String,
    fields: HashMap<String, String>,
}

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    fields: HashMap<String, String>,
}

struct SpanCapture {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct CaptureHandle {
    spans: Arc<Mutex<Vec<CapturedSpan>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl SpanCapture {
    fn new() -> (Self, CaptureHandle) {
        let spans = Arc::new(Mutex::new(Vec::new()));
        let events = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle {
            spans: spans.clone(),
            events: events.clone(),
        };
        (Self { spans, events }, handle)
    }
}

impl CaptureHandle {
    fn spans(&self) -> Vec<CapturedSpan> {
        self.spans.lock().unwrap().clone()
    }

    fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().unwrap().clone()
    }

    fn at_least(&self, level: tracing::Level) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level <= level)
            .collect()
    }
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }
    fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for SpanCapture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        attrs.record(&mut visitor);
        self.spans.lock().unwrap().push(CapturedSpan {
            name: attrs.metadata().name().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }

    fn on_record(
        &self,
        id: &tracing::span::Id,
        values: &tracing::span::Record<'_>,
        ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let Some(span) = ctx.span(id) else { return };
        let mut visitor = FieldVisitor(Vec::new());
        values.record(&mut visitor);
        let name = span.metadata().name();
        let mut spans = self.spans.lock().unwrap();
        if let Some(captured) = spans.iter_mut().rev().find(|s| s.name == name) {
            captured.fields.extend(visitor.0);
        }
    }

    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_captured_tracing<F, R>(f: F) -> (R, CaptureHandle)
where
    F: FnOnce() -> R,
{
    let (layer, handle) = SpanCapture::new();
    let subscriber = tracing_subscriber::registry().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, handle)
}

// ============================================================================
// Helpers
// ============================================================================

fn bind_street(context: &BindingContext, fixture: &AddressFixture, id: &str) {
    context
        .bind(
            Rc::clone(&fixture.bound),
            &BoundProperty::new("street"),
            stock::field_aspects(),
            InMemoryComponent::text_field(id).wrapper(),
        )
        .unwrap();
}

fn bind_broken(context: &BindingContext, fixture: &AddressFixture) {
    let _ = context.bind(
        Rc::clone(&fixture.bound),
        &BoundProperty::new("city"),
        CompositeAspectDefinition::default().with(stock::enabled(EnabledType::Dynamic)),
        InMemoryComponent::text_field("broken").wrapper(),
    );
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn update_pass_span_has_context_and_duration() {
    let fixture = AddressFixture::new();
    let context = BindingContext::new("address");
    bind_street(&context, &fixture, "a");
    bind_street(&context, &fixture, "b");

    let (result, capture) = with_captured_tracing(|| context.update_ui());
    result.unwrap();

    let spans = capture.spans();
    let span = spans
        .iter()
        .find(|s| s.name == "binding_context.update_ui")
        .expect("update_ui span");
    assert_eq!(span.fields.get("context").map(String::as_str), Some("address"));
    assert_eq!(span.fields.get("bindings").map(String::as_str), Some("2"));
    assert!(span.fields.contains_key("duration_us"), "{span:?}");
}

#[test]
fn healthy_pass_logs_nothing_alarming() {
    let fixture = AddressFixture::new();
    let context = BindingContext::new("address");
    bind_street(&context, &fixture, "street");

    let (result, capture) = with_captured_tracing(|| context.update_ui());
    result.unwrap();

    assert!(capture.at_least(tracing::Level::WARN).is_empty());
}

#[test]
fn failing_binding_logs_warn_with_binding_name() {
    let fixture = AddressFixture::new();
    let context = BindingContext::new("address");
    bind_street(&context, &fixture, "street");
    bind_broken(&context, &fixture);

    let (result, capture) = with_captured_tracing(|| context.update_ui());
    assert!(result.is_err());

    let warnings = capture.at_least(tracing::Level::WARN);
    assert_eq!(warnings.len(), 1, "{warnings:?}");
    let binding = warnings[0].fields.get("binding").cloned().unwrap_or_default();
    assert!(binding.contains("field[broken]"), "{binding}");
}

#[test]
fn observer_refresh_failure_is_logged_for_the_context() {
    let fixture = AddressFixture::new();
    let context = BindingContext::new("address");
    bind_street(&context, &fixture, "street");
    bind_broken(&context, &fixture);

    let ((), capture) = with_captured_tracing(|| context.ui_updated());

    let warnings = capture.at_least(tracing::Level::WARN);
    assert_eq!(warnings.len(), 2, "{warnings:?}");
    let refresh = warnings
        .iter()
        .find(|e| !e.fields.contains_key("binding"))
        .expect("context-level warning");
    assert_eq!(refresh.fields.get("context").map(String::as_str), Some("address"));
    let error = refresh.fields.get("error").cloned().unwrap_or_default();
    assert!(error.contains("1 binding(s) failed"), "{error}");
}

#[test]
fn slow_pass_warns() {
    let fixture = AddressFixture::new();
    let context = BindingContext::builder("address")
        .config(BindingConfig {
            slow_update_threshold_us: 1,
            ..BindingConfig::default()
        })
        .build();
    let slow = InMemoryComponent::label("slow");
    context
        .bind(
            Rc::clone(&fixture.bound),
            &BoundProperty::new("street"),
            CompositeAspectDefinition::default().with(
                pmo_aspect::ModelToUiAspectDefinition::<bool>::new(
                    pmo_core::Aspect::with_value(pmo_core::aspect::names::VISIBLE, true),
                    pmo_core::WrapperType::COMPONENT,
                    |_, _| {
                        std::thread::sleep(std::time::Duration::from_millis(2));
                        Ok(())
                    },
                ),
            ),
            slow.wrapper(),
        )
        .unwrap();

    let (result, capture) = with_captured_tracing(|| context.update_ui());
    result.unwrap();

    let warnings = capture.at_least(tracing::Level::WARN);
    assert!(
        warnings
            .iter()
            .any(|e| e.fields.get("message").is_some_and(|m| m.contains("slow"))),
        "{warnings:?}"
    );
}

#[test]
fn log_policy_reports_at_error_level() {
    let fixture = AddressFixture::new();
    let context = BindingContext::new("address");
    let field = InMemoryComponent::text_field("street");
    let definition = CompositeAspectDefinition::default()
        .with(stock::dynamic_tooltip().error_policy(UiUpdateErrorPolicy::log()));

    let (result, capture) = with_captured_tracing(|| {
        context.bind(
            Rc::clone(&fixture.bound),
            &BoundProperty::new("street"),
            definition,
            field.wrapper(),
        )
    });

    assert!(result.is_ok());
    assert!(
        capture
            .events()
            .iter()
            .any(|e| e.level == tracing::Level::ERROR),
        "expected an ERROR event"
    );
}
