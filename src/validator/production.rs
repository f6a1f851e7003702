//! Production extension rules
//!
//! These only apply once the model declares the production namespace.

use std::collections::HashSet;

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::extension::Extension;
use crate::model::{ExtensionAttrs, Model, ProductionAttr};

struct UuidCheck<'a> {
    seen: HashSet<&'a str>,
}

impl<'a> UuidCheck<'a> {
    fn check(&mut self, ext_attrs: &'a ExtensionAttrs, path: &DiagnosticPath, diagnostics: &mut Vec<Diagnostic>) {
        match ext_attrs.get::<ProductionAttr>().and_then(|p| p.uuid.as_deref()) {
            None => diagnostics.push(Diagnostic::new(path, DiagnosticKind::missing_field("UUID"))),
            Some(uuid) => {
                if !self.seen.insert(uuid) {
                    diagnostics.push(Diagnostic::new(path, DiagnosticKind::DuplicatedUuid));
                }
            }
        }
    }
}

fn check_path(ext_attrs: &ExtensionAttrs, path: &DiagnosticPath, diagnostics: &mut Vec<Diagnostic>) {
    let target = ext_attrs.get::<ProductionAttr>().and_then(|p| p.path.as_deref());
    if target.is_some_and(|p| !p.starts_with('/')) {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::PathNotAbsolute));
    }
}

pub(crate) fn validate_production(model: &Model, diagnostics: &mut Vec<Diagnostic>) {
    if !model.declares(Extension::Production.namespace()) {
        return;
    }
    let mut uuids = UuidCheck { seen: HashSet::new() };

    let build_path = DiagnosticPath::new(model.root_path()).child("Build");
    uuids.check(&model.build.ext_attrs, &build_path, diagnostics);
    for (index, item) in model.build.items.iter().enumerate() {
        let item_path = build_path.indexed("Item", index);
        uuids.check(&item.ext_attrs, &item_path, diagnostics);
        check_path(&item.ext_attrs, &item_path, diagnostics);
    }

    for (part, resources) in model.parts() {
        let is_root = model.is_root_path(part);
        let resources_path = DiagnosticPath::new(part).child("Resources");
        for (i, object) in resources.objects.iter().enumerate() {
            let object_path = resources_path.indexed("Object", i);
            uuids.check(&object.ext_attrs, &object_path, diagnostics);
            let Some(components) = &object.components else {
                continue;
            };
            let components_path = object_path.child("Components");
            for (j, component) in components.components.iter().enumerate() {
                let component_path = components_path.indexed("Component", j);
                uuids.check(&component.ext_attrs, &component_path, diagnostics);
                check_path(&component.ext_attrs, &component_path, diagnostics);
                if !is_root && component.object_path().is_some() {
                    diagnostics.push(Diagnostic::new(&component_path, DiagnosticKind::ProdRefInNonRoot));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::DiagnosticKind;
    use crate::extension::{Extension, global_registry};
    use crate::model::{
        ChildModel, Component, ExtensionAttr, Item, Model, Object, ObjectType, ProductionAttr,
    };
    use crate::validator::validate_model;

    const UUIDS: [&str; 4] = [
        "3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d11",
        "3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d12",
        "3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d13",
        "3e93ab1c-1a6c-4d8f-9f5a-0f0b2c6b6d14",
    ];

    fn production_model() -> Model {
        let mut model = Model::new();
        model.declare_extension(Extension::Production.namespace(), "p", false);
        model
            .build
            .ext_attrs
            .insert(ExtensionAttr::Production(ProductionAttr::with_uuid(UUIDS[0])));
        let mut object = Object::with_components(1, Vec::new());
        object.object_type = ObjectType::Other;
        object
            .ext_attrs
            .insert(ExtensionAttr::Production(ProductionAttr::with_uuid(UUIDS[1])));
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
    fn test_not_declared_means_no_rules() {
        let mut model = production_model();
        model.extensions.clear();
        model.build.items.push(Item::new(1));
        assert_eq!(kinds(&model), vec![DiagnosticKind::OtherItem]);
    }

    #[test]
    fn test_missing_and_duplicated_uuid() {
        let mut model = production_model();
        model.build.items.push(Item::new(1));
        let mut item = Item::new(1);
        item.ext_attrs
            .insert(ExtensionAttr::Production(ProductionAttr::with_uuid(UUIDS[0])));
        model.build.items.push(item);
        let diagnostics = validate_model(&model, &global_registry());
        let production: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.kind != DiagnosticKind::OtherItem)
            .collect();
        assert_eq!(production.len(), 2);
        assert_eq!(production[0].kind, DiagnosticKind::missing_field("UUID"));
        assert!(production[0].path_ends_with("Build@Item#0"));
        assert_eq!(production[1].kind, DiagnosticKind::DuplicatedUuid);
        assert!(production[1].path_ends_with("Build@Item#1"));
    }

    #[test]
    fn test_component_paths() {
        let mut model = production_model();
        let mut relative = Component::new(1);
        relative.ext_attrs.insert(ExtensionAttr::Production(ProductionAttr {
            uuid: Some(UUIDS[2].to_string()),
            path: Some("3D/child.model".to_string()),
        }));
        let mut object = Object::with_components(7, vec![relative]);
        object.object_type = ObjectType::Other;
        object
            .ext_attrs
            .insert(ExtensionAttr::Production(ProductionAttr::with_uuid(UUIDS[3])));
        let mut child = ChildModel::default();
        child.resources.objects.push(object);
        model.children.insert("/3D/child.model".to_string(), child);

        let found = kinds(&model);
        assert!(found.contains(&DiagnosticKind::PathNotAbsolute));
        assert!(found.contains(&DiagnosticKind::ProdRefInNonRoot));
    }
}
