#![forbid(unsafe_code)]

//! Statically built descriptions of which properties of a PMO type are bound
//! and how.
//!
//! A [`PmoDescriptor`] is declared once per PMO type and reused for every
//! instance:
//!
//! ```rust,ignore
//! let descriptor = PmoDescriptor::builder("AddressPmo")
//!     .property(BoundProperty::new("street"), stock::field_aspects())
//!     .property(
//!         BoundProperty::new("zip").model_attribute("postalCode"),
//!         stock::field_aspects().with(stock::available_values()),
//!     )
//!     .build();
//! context.bind_pmo(&pmo, &descriptor, |name| form.component(name))?;
//! ```

use ahash::AHashMap;

use pmo_aspect::CompositeAspectDefinition;
use pmo_core::BoundProperty;

/// How one property is bound.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    bound_property: BoundProperty,
    definition: CompositeAspectDefinition,
}

impl PropertyDescriptor {
    /// Describe `bound_property` with the aspects of `definition`.
    pub fn new(bound_property: BoundProperty, definition: CompositeAspectDefinition) -> Self {
        Self {
            bound_property,
            definition,
        }
    }

    /// The PMO property and model attribute.
    pub fn bound_property(&self) -> &BoundProperty {
        &self.bound_property
    }

    /// The aspects applied to the bound component.
    pub fn definition(&self) -> &CompositeAspectDefinition {
        &self.definition
    }
}

/// Ordered property descriptions of one PMO type.
#[derive(Debug, Clone, Default)]
pub struct PmoDescriptor {
    type_name: String,
    properties: Vec<PropertyDescriptor>,
    index: AHashMap<String, usize>,
}

impl PmoDescriptor {
    /// Start describing `type_name`.
    pub fn builder(type_name: impl Into<String>) -> PmoDescriptorBuilder {
        PmoDescriptorBuilder {
            descriptor: PmoDescriptor {
                type_name: type_name.into(),
                ..PmoDescriptor::default()
            },
        }
    }

    /// The described PMO type.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Property descriptions in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties.iter()
    }

    /// The description of `property`.
    pub fn property(&self, property: &str) -> Option<&PropertyDescriptor> {
        self.index.get(property).map(|&i| &self.properties[i])
    }

    /// Number of described properties.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether nothing is described.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// Builds a [`PmoDescriptor`].
#[derive(Debug)]
pub struct PmoDescriptorBuilder {
    descriptor: PmoDescriptor,
}

impl PmoDescriptorBuilder {
    /// Describe a property.
    ///
    /// Declaring a property twice replaces its description but keeps its
    /// original position.
    #[must_use]
    pub fn property(
        mut self,
        bound_property: BoundProperty,
        definition: CompositeAspectDefinition,
    ) -> Self {
        let name = bound_property.pmo_property().to_owned();
        let described = PropertyDescriptor::new(bound_property, definition);
        let d = &mut self.descriptor;
        match d.index.get(&name) {
            Some(&i) => d.properties[i] = described,
            None => {
                d.index.insert(name, d.properties.len());
                d.properties.push(described);
            }
        }
        self
    }

    /// Finish the descriptor.
    #[must_use]
    pub fn build(self) -> PmoDescriptor {
        self.descriptor
    }
}
