//! Boolean operations rules

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::model::{BooleanOperationAttr, Model, Object};

/// A boolean group needs two or more operands, each a mesh object
pub(crate) fn validate_boolean_operation(
    model: &Model,
    part: &str,
    path: &DiagnosticPath,
    object: &Object,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(components) = &object.components else {
        return;
    };
    if components.ext_attrs.get::<BooleanOperationAttr>().is_none() {
        return;
    }
    let path = path.child("Components");
    if components.components.len() < 2 {
        diagnostics.push(Diagnostic::new(&path, DiagnosticKind::BooleanInsufficientComponents));
    }
    for (index, component) in components.components.iter().enumerate() {
        let target = component.object_path().unwrap_or(part);
        // Unresolved targets are reported by the core rules
        if let Some(operand) = model.find_object(target, component.object_id) {
            if operand.mesh.is_none() {
                diagnostics.push(Diagnostic::new(
                    &path.indexed("Component", index),
                    DiagnosticKind::BooleanNonMeshOperand,
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::DiagnosticKind;
    use crate::extension::global_registry;
    use crate::model::{
        BooleanOpType, BooleanOperationAttr, Component, Mesh, Model, Object, ObjectType,
    };
    use crate::validator::validate_model;

    fn model(operands: Vec<Component>) -> Model {
        let mut model = Model::new();
        for id in [1, 2] {
            let mut object = Object::with_mesh(id, Mesh::new());
            object.object_type = ObjectType::Other;
            model.resources.objects.push(object);
        }
        let mut group = Object::with_components(3, vec![Component::new(1)]);
        group.object_type = ObjectType::Other;
        model.resources.objects.push(group);

        let mut object = Object::with_components(4, operands);
        object.object_type = ObjectType::Other;
        if let Some(components) = object.components.as_mut() {
            components
                .ext_attrs
                .update::<BooleanOperationAttr>(|b| b.operation = BooleanOpType::Difference);
        }
        model.resources.objects.push(object);
        model
    }

    fn kinds(model: &Model) -> Vec<DiagnosticKind> {
        validate_model(model, &global_registry())
            .into_iter()
            .map(|d| d.kind)
            .collect()
    }

    #[test]
    fn test_two_mesh_operands() {
        assert!(kinds(&model(vec![Component::new(1), Component::new(2)])).is_empty());
    }

    #[test]
    fn test_insufficient_components() {
        assert_eq!(
            kinds(&model(vec![Component::new(1)])),
            vec![DiagnosticKind::BooleanInsufficientComponents]
        );
    }

    #[test]
    fn test_non_mesh_operand() {
        let diagnostics = validate_model(
            &model(vec![Component::new(1), Component::new(3)]),
            &global_registry(),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::BooleanNonMeshOperand);
        assert!(diagnostics[0].path_ends_with("Object#3@Components@Component#1"));
    }
}
