//! Built-in extension handlers
//!
//! Each handler wires one extension's decoders, marshallers and validation
//! rules into the [`ExtensionHandler`](crate::extension::ExtensionHandler)
//! hooks. [`create_default_registry`] returns a registry holding all of them,
//! which seeds the process-wide registry.

mod beam_lattice;
mod boolean_ops;
mod production;
mod slice;

use std::sync::Arc;

pub use beam_lattice::BeamLatticeExtensionHandler;
pub use boolean_ops::BooleanOperationsExtensionHandler;
pub use production::ProductionExtensionHandler;
pub use slice::SliceExtensionHandler;

use crate::extension::ExtensionRegistry;
use crate::model::{ExtensionAttrs, Model};

/// Create a registry with every built-in extension handler
///
/// ```
/// use threemf::extension::Extension;
/// use threemf::extensions::create_default_registry;
///
/// let registry = create_default_registry();
/// assert_eq!(registry.len(), 4);
/// assert!(registry.contains(Extension::Slice.namespace()));
/// ```
pub fn create_default_registry() -> ExtensionRegistry {
    let mut registry = ExtensionRegistry::new();
    registry.register(Arc::new(BeamLatticeExtensionHandler));
    registry.register(Arc::new(SliceExtensionHandler));
    registry.register(Arc::new(ProductionExtensionHandler));
    registry.register(Arc::new(BooleanOperationsExtensionHandler));
    registry
}

/// Returns true if any side-car set in the model satisfies `pred`
fn any_ext_attrs(model: &Model, pred: impl Fn(&ExtensionAttrs) -> bool) -> bool {
    if pred(&model.build.ext_attrs) || model.build.items.iter().any(|item| pred(&item.ext_attrs)) {
        return true;
    }
    model.parts().any(|(_, resources)| {
        resources.objects.iter().any(|object| {
            pred(&object.ext_attrs)
                || object.components.as_ref().is_some_and(|components| {
                    pred(&components.ext_attrs)
                        || components.components.iter().any(|c| pred(&c.ext_attrs))
                })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ExtensionAttr, Item, ProductionAttr};

    #[test]
    fn test_registration_order() {
        let registry = create_default_registry();
        let names: Vec<_> = registry.handlers().iter().map(|h| h.name()).collect();
        assert_eq!(names, ["BeamLattice", "Slice", "Production", "BooleanOperations"]);
    }

    #[test]
    fn test_any_ext_attrs_sees_items() {
        let mut model = Model::new();
        assert!(!any_ext_attrs(&model, |attrs| !attrs.is_empty()));
        let mut item = Item::new(1);
        item.ext_attrs
            .insert(ExtensionAttr::Production(ProductionAttr::with_uuid("u")));
        model.build.items.push(item);
        assert!(any_ext_attrs(&model, |attrs| !attrs.is_empty()));
    }
}
