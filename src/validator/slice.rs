//! Slice extension rules

use super::canonical_part;
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::geometry::Matrix;
use crate::model::{Asset, Model, Object, Slice, SliceStack, SliceStackInfo};

/// Rules for one slice stack resource
pub(crate) fn validate_slice_stack(
    model: &Model,
    part: &str,
    path: &DiagnosticPath,
    stack: &SliceStack,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if !stack.slices.is_empty() && !stack.refs.is_empty() {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::SlicesAndRefs));
    }

    let mut previous: Option<f32> = None;
    for (index, slice) in stack.slices.iter().enumerate() {
        let slice_path = path.indexed("Slice", index);
        if slice.top_z <= stack.bottom_z {
            diagnostics.push(Diagnostic::new(&slice_path, DiagnosticKind::SliceSmallTopZ));
        }
        if previous.is_some_and(|z| slice.top_z <= z) {
            diagnostics.push(Diagnostic::new(&slice_path, DiagnosticKind::SliceNoMonotonic));
        }
        previous = Some(slice.top_z);
        validate_slice(&slice_path, slice, diagnostics);
    }

    for (index, slice_ref) in stack.refs.iter().enumerate() {
        let ref_path = path.indexed("SliceRef", index);
        if canonical_part(model, &slice_ref.path) == canonical_part(model, part) {
            diagnostics.push(Diagnostic::new(&ref_path, DiagnosticKind::SliceRefSamePart));
            continue;
        }
        let target = model.find_asset(&slice_ref.path, slice_ref.slice_stack_id);
        if !matches!(target, Some(Asset::SliceStack(_))) {
            diagnostics.push(Diagnostic::new(
                &ref_path,
                DiagnosticKind::MissingResource {
                    id: slice_ref.slice_stack_id,
                },
            ));
        }
    }
}

fn validate_slice(path: &DiagnosticPath, slice: &Slice, diagnostics: &mut Vec<Diagnostic>) {
    // An empty slice marks an empty layer
    if slice.vertices.is_empty() && slice.polygons.is_empty() {
        return;
    }
    if slice.vertices.len() < 2 {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::SliceInsufficientVertices));
    }
    if slice.polygons.is_empty() {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::SliceInsufficientSegments));
    }
    let vertex_count = slice.vertices.len();
    for (index, polygon) in slice.polygons.iter().enumerate() {
        let polygon_path = path.indexed("Polygon", index);
        if polygon.segments.is_empty() {
            diagnostics.push(Diagnostic::new(&polygon_path, DiagnosticKind::SliceInsufficientSegments));
        }
        if polygon.start_v as usize >= vertex_count {
            diagnostics.push(Diagnostic::new(
                &polygon_path,
                DiagnosticKind::IndexOutOfBounds {
                    index: polygon.start_v,
                },
            ));
        }
        for (j, segment) in polygon.segments.iter().enumerate() {
            if segment.v2 as usize >= vertex_count {
                diagnostics.push(Diagnostic::new(
                    &polygon_path.indexed("Segment", j),
                    DiagnosticKind::IndexOutOfBounds { index: segment.v2 },
                ));
            }
        }
    }
}

/// Slice stack lookup for an object carrying `s:slicestackid`
fn sliced_stack<'a>(model: &'a Model, part: &str, object: &Object) -> Option<Result<&'a SliceStack, u32>> {
    let info = object.ext_attrs.get::<SliceStackInfo>()?;
    match model.find_asset(part, info.slice_stack_id) {
        Some(Asset::SliceStack(stack)) => Some(Ok(stack)),
        _ => Some(Err(info.slice_stack_id)),
    }
}

/// Object rules: the stack must exist and, for solids, every polygon must be closed
pub(crate) fn validate_sliced_object(
    model: &Model,
    part: &str,
    path: &DiagnosticPath,
    object: &Object,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let stack = match sliced_stack(model, part, object) {
        None => return,
        Some(Err(id)) => {
            diagnostics.push(Diagnostic::new(path, DiagnosticKind::MissingResource { id }));
            return;
        }
        Some(Ok(stack)) => stack,
    };
    if !object.object_type.is_solid() {
        return;
    }

    // References are followed one level into the part that holds the slices
    let mut stacks = vec![stack];
    for slice_ref in &stack.refs {
        if let Some(Asset::SliceStack(target)) = model.find_asset(&slice_ref.path, slice_ref.slice_stack_id) {
            stacks.push(target);
        }
    }
    let open = stacks
        .iter()
        .flat_map(|stack| &stack.slices)
        .flat_map(|slice| &slice.polygons)
        .any(|polygon| !polygon.is_closed());
    if open {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::SlicePolygonNotClosed));
    }
}

fn is_sliced(model: &Model, part: &str, object_id: u32) -> bool {
    model
        .find_object(part, object_id)
        .is_some_and(|object| object.ext_attrs.get::<SliceStackInfo>().is_some())
}

fn check_transform(transform: Option<&Matrix>, path: &DiagnosticPath, diagnostics: &mut Vec<Diagnostic>) {
    if transform.is_some_and(|m| !m.is_planar()) {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::SliceInvalidTransform));
    }
}

/// Build items and components placing a sliced object must keep slices horizontal
pub(crate) fn validate_slice_transforms(model: &Model, diagnostics: &mut Vec<Diagnostic>) {
    let build = DiagnosticPath::new(model.root_path()).child("Build");
    for (index, item) in model.build.items.iter().enumerate() {
        let target = item.object_path().unwrap_or_else(|| model.root_path());
        if is_sliced(model, target, item.object_id) {
            check_transform(item.transform.as_ref(), &build.indexed("Item", index), diagnostics);
        }
    }

    for (part, resources) in model.parts() {
        let resources_path = DiagnosticPath::new(part).child("Resources");
        for (i, object) in resources.objects.iter().enumerate() {
            let Some(components) = &object.components else {
                continue;
            };
            for (j, component) in components.components.iter().enumerate() {
                let target = component.object_path().unwrap_or(part);
                if is_sliced(model, target, component.object_id) {
                    let path = resources_path
                        .indexed("Object", i)
                        .child("Components")
                        .indexed("Component", j);
                    check_transform(component.transform.as_ref(), &path, diagnostics);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::DiagnosticKind;
    use crate::extension::global_registry;
    use crate::geometry::{Matrix, Point2D};
    use crate::model::{
        Asset, Item, Mesh, Model, Object, ObjectType, Polygon, Segment, Slice, SliceRef,
        SliceStack, SliceStackInfo,
    };
    use crate::validator::validate_model;

    fn square_slice(top_z: f32, closed: bool) -> Slice {
        let mut slice = Slice::new(top_z);
        slice.vertices = vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ];
        let mut polygon = Polygon::new(0);
        polygon.segments = vec![Segment::new(1), Segment::new(2), Segment::new(3)];
        if closed {
            polygon.segments.push(Segment::new(0));
        }
        slice.polygons.push(polygon);
        slice
    }

    fn sliced_model(stack: SliceStack, object_type: ObjectType) -> Model {
        let mut object = Object::with_mesh(2, Mesh::new());
        object.object_type = object_type;
        object.ext_attrs.update::<SliceStackInfo>(|info| info.slice_stack_id = stack.id);
        let mut model = Model::new();
        model.resources.assets.push(Asset::SliceStack(stack));
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
    fn test_valid_stack() {
        let mut stack = SliceStack::new(1, 0.0);
        stack.slices.push(square_slice(0.1, true));
        stack.slices.push(square_slice(0.2, true));
        assert!(kinds(&sliced_model(stack, ObjectType::Surface)).is_empty());
    }

    #[test]
    fn test_top_z_rules() {
        let mut stack = SliceStack::new(1, 1.0);
        stack.slices.push(square_slice(0.5, true));
        stack.slices.push(square_slice(2.0, true));
        stack.slices.push(square_slice(2.0, true));
        let diagnostics = validate_model(&sliced_model(stack, ObjectType::Surface), &global_registry());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::SliceSmallTopZ);
        assert!(diagnostics[0].path_ends_with("Resources@SliceStack#0@Slice#0"));
        assert_eq!(diagnostics[1].kind, DiagnosticKind::SliceNoMonotonic);
        assert!(diagnostics[1].path_ends_with("SliceStack#0@Slice#2"));

        let mut level = SliceStack::new(1, 1.0);
        level.slices.push(square_slice(1.0, true));
        assert_eq!(
            kinds(&sliced_model(level, ObjectType::Surface)),
            vec![DiagnosticKind::SliceSmallTopZ]
        );
    }

    #[test]
    fn test_open_polygon_on_solid() {
        let mut stack = SliceStack::new(1, 0.0);
        stack.slices.push(square_slice(0.1, false));
        assert!(kinds(&sliced_model(stack.clone(), ObjectType::Surface)).is_empty());
        let found = kinds(&sliced_model(stack, ObjectType::Model));
        assert!(found.contains(&DiagnosticKind::SlicePolygonNotClosed));
    }

    #[test]
    fn test_slices_and_refs() {
        let mut stack = SliceStack::new(1, 0.0);
        stack.slices.push(square_slice(0.1, true));
        stack.refs.push(SliceRef {
            slice_stack_id: 1,
            path: String::new(),
        });
        let found = kinds(&sliced_model(stack, ObjectType::Surface));
        assert_eq!(
            found,
            vec![DiagnosticKind::SlicesAndRefs, DiagnosticKind::SliceRefSamePart]
        );
    }

    #[test]
    fn test_missing_stack_and_transform() {
        let mut model = sliced_model(SliceStack::new(1, 0.0), ObjectType::Surface);
        model.resources.objects[0]
            .ext_attrs
            .update::<SliceStackInfo>(|info| info.slice_stack_id = 8);
        let mut item = Item::new(2);
        item.transform = Some(Matrix::from_values([
            1.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0,
        ]));
        model.build.items.push(item);
        let found = kinds(&model);
        assert_eq!(
            found,
            vec![
                DiagnosticKind::MissingResource { id: 8 },
                DiagnosticKind::SliceInvalidTransform
            ]
        );
    }
}
