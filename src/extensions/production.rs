//! Production extension handler

use crate::codec::XmlAttr;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::extension::{AttrOwner, Extension, ExtensionHandler};
use crate::model::{ExtensionAttr, ExtensionAttrs, Model, ProductionAttr};
use crate::parser::decode_production_attribute;
use crate::validator::validate_production;
use crate::writer::production_attrs;

use super::any_ext_attrs;

/// Extension handler for the Production extension
///
/// Production data is attribute-only: `p:UUID` on the build, items, objects
/// and components, and `p:path` on items and components that point into other
/// model parts.
#[derive(Debug, Clone, Copy)]
pub struct ProductionExtensionHandler;

impl ExtensionHandler for ProductionExtensionHandler {
    fn namespace(&self) -> &'static str {
        Extension::Production.namespace()
    }

    fn name(&self) -> &'static str {
        Extension::Production.name()
    }

    fn default_prefix(&self) -> &'static str {
        Extension::Production.default_prefix()
    }

    fn is_used_in_model(&self, model: &Model) -> bool {
        any_ext_attrs(model, |attrs| attrs.get::<ProductionAttr>().is_some())
    }

    fn decode_attribute(
        &self,
        owner: AttrOwner,
        attrs: &mut ExtensionAttrs,
        attr: &XmlAttr,
    ) -> std::result::Result<(), DiagnosticKind> {
        decode_production_attribute(owner, attrs, attr)
    }

    fn encode_attribute(&self, attr: &ExtensionAttr, out: &mut Vec<XmlAttr>) {
        match attr {
            ExtensionAttr::Production(production) => production_attrs(production, out),
            ExtensionAttr::Other { attrs, .. } => out.extend(attrs.iter().cloned()),
            _ => {}
        }
    }

    fn validate_model(&self, model: &Model, diagnostics: &mut Vec<Diagnostic>) {
        validate_production(model, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Component, Object};

    #[test]
    fn test_is_used_by_component() {
        let handler = ProductionExtensionHandler;
        let mut model = Model::new();
        let mut component = Component::new(1);
        component.ext_attrs.insert(ExtensionAttr::Production(ProductionAttr {
            uuid: None,
            path: Some("/3D/other.model".to_string()),
        }));
        model
            .resources
            .objects
            .push(Object::with_components(2, vec![component]));
        assert!(handler.is_used_in_model(&model));
    }

    #[test]
    fn test_not_required_when_used() {
        assert!(!ProductionExtensionHandler.required_when_used());
    }
}
