#![forbid(unsafe_code)]

//! Bindings of layouts that contain further bound components.
//!
//! A [`ContainerBinding`] binds the layout itself like any element (for
//! example its visibility) and owns a nested [`BindingContext`] for the
//! components inside it. The nested context shares the parent's behaviors
//! and settings and forwards model changes to the parent.

use std::fmt;
use std::rc::Rc;

use pmo_core::{BindingError, BoundObject, ComponentWrapper, MessageList};

use crate::context::BindingContext;
use crate::element::{Binding, ElementBinding};

/// An element binding for a layout plus the bindings of its children.
pub struct ContainerBinding {
    binding: ElementBinding,
    children: BindingContext,
}

impl ContainerBinding {
    pub(crate) fn new(binding: ElementBinding, children: BindingContext) -> Self {
        Self { binding, children }
    }

    /// The context to bind the layout's children in.
    pub fn children(&self) -> &BindingContext {
        &self.children
    }

    /// The binding of the layout itself.
    pub fn element(&self) -> &ElementBinding {
        &self.binding
    }
}

impl Binding for ContainerBinding {
    /// Update the layout first, then its children.
    fn update_from_pmo(&self) -> Result<(), BindingError> {
        self.binding.update_from_pmo()?;
        self.children.update_ui()
    }

    fn display_messages(&self, messages: &MessageList) -> MessageList {
        let mut shown = self.binding.display_messages(messages);
        shown.extend(self.children.display_messages(messages));
        shown
    }

    fn wrapper(&self) -> &Rc<dyn ComponentWrapper> {
        self.binding.wrapper()
    }

    fn bound_object(&self) -> &Rc<dyn BoundObject> {
        self.binding.bound_object()
    }

    fn nested_context(&self) -> Option<&BindingContext> {
        Some(&self.children)
    }

    fn describe(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ContainerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ContainerBinding({}, {} children)",
            self.binding,
            self.children.len()
        )
    }
}

impl fmt::Debug for ContainerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContainerBinding")
            .field("binding", &self.binding)
            .field("children", &self.children)
            .finish()
    }
}
