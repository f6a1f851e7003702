//! Boolean Operations extension handler

use crate::codec::XmlAttr;
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::extension::{AttrOwner, Extension, ExtensionHandler};
use crate::model::{BooleanOperationAttr, ExtensionAttr, ExtensionAttrs, Model, Object};
use crate::parser::decode_boolean_attribute;
use crate::validator::validate_boolean_operation;
use crate::writer::boolean_operation_attrs;

use super::any_ext_attrs;

/// Extension handler for the Boolean Operations extension
///
/// A `<components>` element tagged with `bo:operation` combines its first
/// component with the others instead of forming a plain assembly.
#[derive(Debug, Clone, Copy)]
pub struct BooleanOperationsExtensionHandler;

impl ExtensionHandler for BooleanOperationsExtensionHandler {
    fn namespace(&self) -> &'static str {
        Extension::BooleanOperations.namespace()
    }

    fn name(&self) -> &'static str {
        Extension::BooleanOperations.name()
    }

    fn default_prefix(&self) -> &'static str {
        Extension::BooleanOperations.default_prefix()
    }

    fn required_when_used(&self) -> bool {
        true
    }

    fn is_used_in_model(&self, model: &Model) -> bool {
        any_ext_attrs(model, |attrs| attrs.get::<BooleanOperationAttr>().is_some())
    }

    fn decode_attribute(
        &self,
        owner: AttrOwner,
        attrs: &mut ExtensionAttrs,
        attr: &XmlAttr,
    ) -> std::result::Result<(), DiagnosticKind> {
        decode_boolean_attribute(owner, attrs, attr)
    }

    fn encode_attribute(&self, attr: &ExtensionAttr, out: &mut Vec<XmlAttr>) {
        match attr {
            ExtensionAttr::BooleanOperation(op) => boolean_operation_attrs(op, out),
            ExtensionAttr::Other { attrs, .. } => out.extend(attrs.iter().cloned()),
            _ => {}
        }
    }

    fn validate_object(
        &self,
        model: &Model,
        part: &str,
        path: &DiagnosticPath,
        object: &Object,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        validate_boolean_operation(model, part, path, object, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BooleanOpType, Component};

    #[test]
    fn test_is_used_by_components() {
        let handler = BooleanOperationsExtensionHandler;
        let mut model = Model::new();
        let mut object = Object::with_components(3, vec![Component::new(1), Component::new(2)]);
        assert!(!handler.is_used_in_model(&model));
        if let Some(components) = object.components.as_mut() {
            components.ext_attrs.insert(ExtensionAttr::BooleanOperation(BooleanOperationAttr {
                operation: BooleanOpType::Intersection,
                ..Default::default()
            }));
        }
        model.resources.objects.push(object);
        assert!(handler.is_used_in_model(&model));
    }

    #[test]
    fn test_encode_writes_both_attributes() {
        let mut out = Vec::new();
        BooleanOperationsExtensionHandler.encode_attribute(
            &ExtensionAttr::BooleanOperation(BooleanOperationAttr::default()),
            &mut out,
        );
        let names: Vec<_> = out.iter().map(|a| a.name.local.as_str()).collect();
        assert_eq!(names, ["association", "operation"]);
    }
}
