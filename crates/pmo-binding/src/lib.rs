#![forbid(unsafe_code)]

//! Binding contexts and their manager.
//!
//! # Key Components
//!
//! - [`ElementBinding`] / [`ContainerBinding`]: one component bound to one
//!   property, optionally owning the bindings of nested components.
//! - [`BindingContext`]: the ordered bindings of one view, refreshed together
//!   after every user change.
//! - [`BindingManager`]: named contexts, [`UiUpdateObserver`]s and the
//!   display of [`ValidationService`] messages.
//! - [`ManagerHandle`]: `Send + Sync` access to a manager's observers and
//!   context names from other threads.
//! - [`PmoDescriptor`]: declare once which properties of a PMO type are bound
//!   and with which aspects.
//! - [`BindingConfig`]: failure reporting, slow-pass threshold and message
//!   ordering, loadable from TOML/JSON with the `config` feature.
//!
//! # Example
//!
//! ```rust,ignore
//! let manager = BindingManager::new(Rc::new(validation));
//! let context = manager.context("address");
//! context.bind(pmo, &BoundProperty::new("street"), stock::field_aspects(), street)?;
//! // User edits now flow to the PMO; every binding of the context refreshes
//! // and validation messages are displayed.
//! ```

pub mod config;
pub mod container;
pub mod context;
pub mod descriptor;
pub mod element;
pub mod manager;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use config::{BindingConfig, ConfigError, UiUpdateErrors};
pub use container::ContainerBinding;
pub use context::{AfterUpdate, BindingContext, BindingContextBuilder};
pub use descriptor::{PmoDescriptor, PmoDescriptorBuilder, PropertyDescriptor};
pub use element::{Binding, ElementBinding};
pub use manager::{BindingManager, NoValidation, UiUpdateObserver, ValidationService};
pub use registry::{ManagerHandle, SharedObserver};
