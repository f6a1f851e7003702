//! Core schema rules

use std::collections::{HashMap, HashSet};

use super::canonical_part;
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::model::{Asset, Mesh, Metadata, Model, Object, ObjectType, Resources};

/// Metadata names reserved by the 3MF core
const PREDEFINED_METADATA: &[&str] = &[
    "Title",
    "Designer",
    "Description",
    "Copyright",
    "LicenseTerms",
    "Rating",
    "CreationDate",
    "ModificationDate",
    "Application",
];

/// Ids must be positive and unique across objects and assets of one part
pub(super) fn validate_ids(resources: &Resources, path: &DiagnosticPath, diagnostics: &mut Vec<Diagnostic>) {
    let mut seen = HashSet::new();
    let assets = resources
        .assets
        .iter()
        .enumerate()
        .filter_map(|(i, asset)| {
            let segment = match asset {
                Asset::BaseMaterials(_) => "BaseMaterials",
                Asset::SliceStack(_) => "SliceStack",
                Asset::Unknown(_) => return None,
            };
            asset.id().map(|id| (path.indexed(segment, i), id))
        });
    let objects = resources
        .objects
        .iter()
        .enumerate()
        .map(|(i, object)| (path.indexed("Object", i), object.id));

    for (element, id) in assets.chain(objects) {
        if id == 0 {
            diagnostics.push(Diagnostic::new(&element, DiagnosticKind::missing_field("id")));
        } else if !seen.insert(id) {
            diagnostics.push(Diagnostic::new(&element, DiagnosticKind::DuplicatedId { id }));
        }
    }
}

pub(super) fn validate_object(
    model: &Model,
    part: &str,
    path: &DiagnosticPath,
    object: &Object,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if object.mesh.is_some() == object.components.is_some() {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::InvalidObject));
    }
    if object.components.is_some() && object.pid.is_some() {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::ComponentsPid));
    }

    if let Some(mesh) = &object.mesh {
        validate_mesh(&path.child("Mesh"), object.object_type, mesh, diagnostics);
    }

    if let Some(components) = &object.components {
        let components_path = path.child("Components");
        for (index, component) in components.components.iter().enumerate() {
            let target = component.object_path().unwrap_or(part);
            if model.find_object(target, component.object_id).is_none() {
                diagnostics.push(Diagnostic::new(
                    &components_path.indexed("Component", index),
                    DiagnosticKind::MissingResource {
                        id: component.object_id,
                    },
                ));
            }
        }
    }

    validate_metadata_list(model, path, "Metadata", &object.metadata, diagnostics);
}

fn validate_mesh(path: &DiagnosticPath, object_type: ObjectType, mesh: &Mesh, diagnostics: &mut Vec<Diagnostic>) {
    let vertex_count = mesh.vertices.len();
    let mut sane = true;
    for (index, triangle) in mesh.triangles.iter().enumerate() {
        let [v1, v2, v3] = triangle.indices();
        if let Some(out) = [v1, v2, v3].into_iter().find(|&v| v as usize >= vertex_count) {
            diagnostics.push(Diagnostic::new(
                &path.indexed("Triangle", index),
                DiagnosticKind::IndexOutOfBounds { index: out },
            ));
            sane = false;
        } else if v1 == v2 || v2 == v3 || v1 == v3 {
            diagnostics.push(Diagnostic::new(
                &path.indexed("Triangle", index),
                DiagnosticKind::DuplicatedIndices,
            ));
            sane = false;
        }
    }

    if !object_type.is_solid() {
        return;
    }
    if vertex_count < 3 {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::InsufficientVertices));
        return;
    }
    // Meshes carrying an extension payload, such as a beam lattice, may have no triangles
    if mesh.triangles.is_empty() && !mesh.extensions.is_empty() {
        return;
    }
    if mesh.triangles.len() < 4 {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::InsufficientTriangles));
        return;
    }
    if sane && !mesh.is_manifold_and_oriented() {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::MeshConsistency));
    }
}

/// Items must reference existing objects that are not of type `other`
pub(super) fn validate_build(model: &Model, path: &DiagnosticPath, diagnostics: &mut Vec<Diagnostic>) {
    for (index, item) in model.build.items.iter().enumerate() {
        let item_path = path.indexed("Item", index);
        let target = item.object_path().unwrap_or_else(|| model.root_path());
        match model.find_object(target, item.object_id) {
            None => diagnostics.push(Diagnostic::new(
                &item_path,
                DiagnosticKind::MissingResource { id: item.object_id },
            )),
            Some(object) if object.object_type == ObjectType::Other => {
                diagnostics.push(Diagnostic::new(&item_path, DiagnosticKind::OtherItem))
            }
            Some(_) => {}
        }
        validate_metadata_list(model, &item_path, "Metadata", &item.metadata, diagnostics);
    }
}

/// Name rules for one metadata list; duplicates are checked within the list
pub(super) fn validate_metadata_list(
    model: &Model,
    path: &DiagnosticPath,
    segment: &str,
    metadata: &[Metadata],
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut seen = HashSet::new();
    for (index, entry) in metadata.iter().enumerate() {
        let entry_path = path.indexed(segment, index);
        if entry.name.space.is_empty() {
            if !PREDEFINED_METADATA.contains(&entry.name.local.as_str()) {
                diagnostics.push(Diagnostic::new(&entry_path, DiagnosticKind::MetadataName));
            }
        } else if !model.declares(&entry.name.space) {
            diagnostics.push(Diagnostic::new(&entry_path, DiagnosticKind::MetadataNamespace));
        }
        if !seen.insert(&entry.name) {
            diagnostics.push(Diagnostic::new(&entry_path, DiagnosticKind::MetadataDuplicated));
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    Active,
    Done,
}

/// Depth-first search over component references across parts
///
/// A reference to an object still on the search stack closes a cycle and is
/// reported at the component that makes it.
pub(super) fn validate_recursion(model: &Model, diagnostics: &mut Vec<Diagnostic>) {
    let mut state = HashMap::new();
    for (part, resources) in model.parts() {
        for object in &resources.objects {
            visit(model, part, object.id, &mut state, diagnostics);
        }
    }
}

fn visit<'a>(
    model: &'a Model,
    part: &'a str,
    id: u32,
    state: &mut HashMap<(&'a str, u32), Visit>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if state.contains_key(&(part, id)) {
        return;
    }
    let Some(resources) = model.resources_at(part) else {
        return;
    };
    let Some((index, object)) = resources.objects.iter().enumerate().find(|(_, o)| o.id == id) else {
        return;
    };
    let Some(components) = &object.components else {
        state.insert((part, id), Visit::Done);
        return;
    };

    state.insert((part, id), Visit::Active);
    for (j, component) in components.components.iter().enumerate() {
        let target = canonical_part(model, component.object_path().unwrap_or(part));
        match state.get(&(target, component.object_id)) {
            Some(Visit::Active) => diagnostics.push(Diagnostic::new(
                &DiagnosticPath::new(part)
                    .child("Resources")
                    .indexed("Object", index)
                    .child("Components")
                    .indexed("Component", j),
                DiagnosticKind::Recursion,
            )),
            Some(Visit::Done) => {}
            None => visit(model, target, component.object_id, state, diagnostics),
        }
    }
    state.insert((part, id), Visit::Done);
}
