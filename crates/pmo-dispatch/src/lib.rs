#![forbid(unsafe_code)]

//! Resolution of aspect reads and writes for bound properties.
//!
//! - [`dispatcher`]: the [`PropertyDispatcher`] chain (behavior gate, static
//!   values, PMO accessors, model object accessors, terminal failure).
//! - [`behavior`]: [`PropertyBehavior`] policies consulted by the chain.

pub mod behavior;
pub mod dispatcher;

pub use behavior::{
    BehaviorList, ConditionBehavior, PropertyBehavior, PropertyBehaviorProvider,
    no_behavior_provider,
};
pub use dispatcher::{DispatcherBuilder, DispatcherNode, PropertyDispatcher};
