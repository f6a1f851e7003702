//! Beam lattice rules

use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::model::{BeamLattice, ClipMode, Model, Object};

/// Rules for the lattice of one object, if it has one
pub(crate) fn validate_beam_lattice(
    model: &Model,
    part: &str,
    path: &DiagnosticPath,
    object: &Object,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let Some(mesh) = &object.mesh else {
        return;
    };
    let Some(lattice) = mesh.beam_lattice() else {
        return;
    };
    let path = path.child("Mesh").child("BeamLattice");

    // A lattice only adds volume to objects that are printed as solids
    if !object.object_type.is_solid() {
        diagnostics.push(Diagnostic::new(&path, DiagnosticKind::LatticeObjectType));
    }
    if lattice.radius <= 0.0 {
        diagnostics.push(Diagnostic::new(&path, DiagnosticKind::missing_field("radius")));
    }
    if lattice.min_length <= 0.0 {
        diagnostics.push(Diagnostic::new(&path, DiagnosticKind::missing_field("minlength")));
    }
    if lattice.clip_mode != ClipMode::None && lattice.clipping_mesh.is_none() {
        diagnostics.push(Diagnostic::new(&path, DiagnosticKind::LatticeClippedNoMesh));
    }
    for id in [lattice.clipping_mesh, lattice.representation_mesh].into_iter().flatten() {
        validate_mesh_reference(model, part, &path, object.id, id, diagnostics);
    }
    if let Some(pid) = lattice.pid {
        if model.find_asset(part, pid).is_none() {
            diagnostics.push(Diagnostic::new(&path, DiagnosticKind::MissingResource { id: pid }));
        }
    }

    validate_beams(&path, lattice, mesh.vertices.len(), diagnostics);
}

fn validate_mesh_reference(
    model: &Model,
    part: &str,
    path: &DiagnosticPath,
    owner: u32,
    id: u32,
    diagnostics: &mut Vec<Diagnostic>,
) {
    if id == owner {
        diagnostics.push(Diagnostic::new(path, DiagnosticKind::LatticeSelfReference));
        return;
    }
    match model.find_object(part, id) {
        None => diagnostics.push(Diagnostic::new(path, DiagnosticKind::MissingResource { id })),
        Some(target) => {
            let plain_mesh = target
                .mesh
                .as_ref()
                .is_some_and(|mesh| mesh.beam_lattice().is_none());
            if !plain_mesh {
                diagnostics.push(Diagnostic::new(path, DiagnosticKind::LatticeInvalidMesh));
            }
        }
    }
}

fn validate_beams(path: &DiagnosticPath, lattice: &BeamLattice, vertex_count: usize, diagnostics: &mut Vec<Diagnostic>) {
    for (index, beam) in lattice.beams.iter().enumerate() {
        let beam_path = path.indexed("Beam", index);
        if let Some(out) = [beam.v1, beam.v2].into_iter().find(|&v| v as usize >= vertex_count) {
            diagnostics.push(Diagnostic::new(&beam_path, DiagnosticKind::IndexOutOfBounds { index: out }));
        } else if beam.v1 == beam.v2 {
            diagnostics.push(Diagnostic::new(&beam_path, DiagnosticKind::LatticeSameVertex));
        }
        // r2 defaults to r1, so it cannot be given alone
        if beam.r2 != 0.0 && beam.r1 == 0.0 {
            diagnostics.push(Diagnostic::new(&beam_path, DiagnosticKind::missing_field("r1")));
        }
    }

    for (index, set) in lattice.beam_sets.iter().enumerate() {
        if let Some(&out) = set.refs.iter().find(|&&r| r as usize >= lattice.beams.len()) {
            diagnostics.push(Diagnostic::new(
                &path.indexed("BeamSet", index),
                DiagnosticKind::IndexOutOfBounds { index: out },
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::diagnostic::DiagnosticKind;
    use crate::extension::global_registry;
    use crate::geometry::Point3D;
    use crate::model::{Beam, BeamLattice, BeamSet, ClipMode, Mesh, MeshExtension, Model, Object, ObjectType};
    use crate::validator::validate_model;

    fn lattice_model(object_type: ObjectType, lattice: BeamLattice) -> Model {
        let mut mesh = Mesh::new();
        mesh.vertices = vec![
            Point3D::new(0.0, 0.0, 0.0),
            Point3D::new(0.0, 0.0, 10.0),
            Point3D::new(10.0, 0.0, 10.0),
        ];
        mesh.extensions.push(MeshExtension::BeamLattice(lattice));
        let mut object = Object::with_mesh(1, mesh);
        object.object_type = object_type;
        let mut model = Model::new();
        model.resources.objects.push(object);
        model
    }

    fn valid_lattice() -> BeamLattice {
        let mut lattice = BeamLattice::new(1.0, 0.1);
        lattice.beams.push(Beam::new(0, 1));
        lattice.beams.push(Beam::with_radii(1, 2, 1.0, 2.0));
        lattice
    }

    #[test]
    fn test_valid_lattice() {
        let model = lattice_model(ObjectType::Model, valid_lattice());
        assert!(validate_model(&model, &global_registry()).is_empty());
    }

    #[test]
    fn test_object_type_reported_once() {
        let model = lattice_model(ObjectType::Support, valid_lattice());
        let diagnostics = validate_model(&model, &global_registry());
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].kind, DiagnosticKind::LatticeObjectType);
        assert!(diagnostics[0].path_ends_with("Object#0@Mesh@BeamLattice"));
    }

    #[test]
    fn test_clipping_rules() {
        let mut lattice = valid_lattice();
        lattice.clip_mode = ClipMode::Inside;
        let kinds: Vec<_> = validate_model(&lattice_model(ObjectType::Model, lattice.clone()), &global_registry())
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(kinds, vec![DiagnosticKind::LatticeClippedNoMesh]);

        lattice.clipping_mesh = Some(1);
        let kinds: Vec<_> = validate_model(&lattice_model(ObjectType::Model, lattice.clone()), &global_registry())
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(kinds, vec![DiagnosticKind::LatticeSelfReference]);

        lattice.clipping_mesh = Some(4);
        let kinds: Vec<_> = validate_model(&lattice_model(ObjectType::Model, lattice), &global_registry())
            .into_iter()
            .map(|d| d.kind)
            .collect();
        assert_eq!(kinds, vec![DiagnosticKind::MissingResource { id: 4 }]);
    }

    #[test]
    fn test_beam_rules() {
        let mut lattice = valid_lattice();
        lattice.beams.push(Beam::new(2, 2));
        lattice.beams.push(Beam::new(0, 9));
        lattice.beams.push(Beam::with_radii(0, 2, 0.0, 1.0));
        lattice.beam_sets.push(BeamSet {
            refs: vec![0, 5],
            ..Default::default()
        });
        let diagnostics = validate_model(&lattice_model(ObjectType::Model, lattice), &global_registry());
        let kinds: Vec<_> = diagnostics.iter().map(|d| d.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::LatticeSameVertex,
                DiagnosticKind::IndexOutOfBounds { index: 9 },
                DiagnosticKind::missing_field("r1"),
                DiagnosticKind::IndexOutOfBounds { index: 5 },
            ]
        );
        assert!(diagnostics[0].path_ends_with("BeamLattice@Beam#2"));
        assert!(diagnostics[3].path_ends_with("BeamLattice@BeamSet#0"));
    }
}
