//! Property reference rules for base materials

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::model::{Asset, BaseMaterials, Model, Object};

/// Resolve a property group id; `Err` when nothing in the part has that id
fn property_group<'a>(model: &'a Model, part: &str, pid: u32) -> Result<Option<&'a BaseMaterials>, ()> {
    match model.find_asset(part, pid) {
        Some(Asset::BaseMaterials(group)) => Ok(Some(group)),
        Some(_) => Ok(None),
        None => Err(()),
    }
}

/// `pid`/`pindex` on the object and per-triangle property references
///
/// Property groups from namespaces without a registered handler are opaque:
/// they resolve by id but their indices are not checked.
pub(super) fn validate_object_properties(
    model: &Model,
    part: &str,
    path: &DiagnosticPath,
    object: &Object,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let object_group = match object.pid {
        Some(pid) => match property_group(model, part, pid) {
            Ok(group) => group,
            Err(()) => {
                diagnostics.push(Diagnostic::new(path, DiagnosticKind::MissingResource { id: pid }));
                None
            }
        },
        None => None,
    };
    if let (Some(group), Some(pindex)) = (object_group, object.pindex) {
        if pindex as usize >= group.bases.len() {
            diagnostics.push(Diagnostic::new(path, DiagnosticKind::IndexOutOfBounds { index: pindex }));
        }
    }

    let Some(mesh) = &object.mesh else {
        return;
    };
    let mesh_path = path.child("Mesh");
    for (index, triangle) in mesh.triangles.iter().enumerate() {
        let group = match triangle.pid {
            Some(pid) if Some(pid) != object.pid => match property_group(model, part, pid) {
                Ok(group) => group,
                Err(()) => {
                    diagnostics.push(Diagnostic::new(
                        &mesh_path.indexed("Triangle", index),
                        DiagnosticKind::MissingResource { id: pid },
                    ));
                    continue;
                }
            },
            _ => object_group,
        };
        let (Some(group), Some(p1)) = (group, triangle.p1) else {
            continue;
        };
        let p2 = triangle.p2.unwrap_or(p1);
        let p3 = triangle.p3.unwrap_or(p1);
        let triangle_path = mesh_path.indexed("Triangle", index);
        if let Some(out) = [p1, p2, p3].into_iter().find(|&p| p as usize >= group.bases.len()) {
            diagnostics.push(Diagnostic::new(&triangle_path, DiagnosticKind::IndexOutOfBounds { index: out }));
        } else if p1 != p2 || p1 != p3 {
            diagnostics.push(Diagnostic::new(&triangle_path, DiagnosticKind::BaseMaterialGradient));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::DiagnosticKind;
    use crate::extension::global_registry;
    use crate::geometry::Point3D;
    use crate::model::{Asset, Base, BaseMaterials, Mesh, Model, Object, ObjectType, Rgba, Triangle};
    use crate::validator::validate_model;

    fn model_with(triangle: Triangle, pid: Option<u32>) -> Model {
        let mut group = BaseMaterials::new(1);
        group.bases.push(Base::new("Red", Rgba::new(255, 0, 0, 255)));
        group.bases.push(Base::new("Blue", Rgba::new(0, 0, 255, 255)));
        let mut mesh = Mesh::new();
        mesh.vertices = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(1.0, 0.0, 0.0),
            Point3D::new(0.0, 1.0, 0.0),
        ];
        mesh.triangles.push(triangle);
        let mut object = Object::with_mesh(2, mesh);
        object.object_type = ObjectType::Surface;
        object.pid = pid;
        let mut model = Model::new();
        model.resources.assets.push(Asset::BaseMaterials(group));
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
    fn test_uniform_material_is_valid() {
        let mut triangle = Triangle::new(0, 1, 2);
        triangle.pid = Some(1);
        triangle.p1 = Some(1);
        assert!(kinds(&model_with(triangle, None)).is_empty());
    }

    #[test]
    fn test_gradient_is_rejected() {
        let mut triangle = Triangle::new(0, 1, 2);
        triangle.p1 = Some(0);
        triangle.p2 = Some(1);
        let diagnostics = validate_model(&model_with(triangle, Some(1)), &global_registry());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::BaseMaterialGradient);
        assert!(diagnostics[0].path_ends_with("Object#0@Mesh@Triangle#0"));
    }

    #[test]
    fn test_property_index_out_of_bounds() {
        let mut triangle = Triangle::new(0, 1, 2);
        triangle.pid = Some(1);
        triangle.p1 = Some(5);
        assert_eq!(
            kinds(&model_with(triangle, None)),
            vec![DiagnosticKind::IndexOutOfBounds { index: 5 }]
        );
    }

    #[test]
    fn test_missing_property_group() {
        let mut triangle = Triangle::new(0, 1, 2);
        triangle.pid = Some(7);
        triangle.p1 = Some(0);
        assert_eq!(
            kinds(&model_with(triangle, Some(9))),
            vec![
                DiagnosticKind::MissingResource { id: 9 },
                DiagnosticKind::MissingResource { id: 7 }
            ]
        );
    }
}
