//! Beam Lattice extension handler

use crate::codec::{ElementDecoder, XmlEncoder};
use crate::diagnostic::{Diagnostic, DiagnosticPath};
use crate::error::Result;
use crate::extension::{Extension, ExtensionHandler};
use crate::model::{MeshExtension, Model, Object};
use crate::parser::BeamLatticeDecoder;
use crate::validator::validate_beam_lattice;
use crate::writer::write_beam_lattice;

/// Extension handler for the Beam Lattice extension
///
/// The lattice lives inside `<mesh>` as a `<b:beamlattice>` element and
/// replaces or complements the triangles of a solid object.
///
/// # Example
///
/// ```
/// use threemf::extensions::BeamLatticeExtensionHandler;
/// use threemf::extension::{ExtensionHandler, ExtensionRegistry};
/// use std::sync::Arc;
///
/// let mut registry = ExtensionRegistry::new();
/// registry.register(Arc::new(BeamLatticeExtensionHandler));
/// assert!(registry.get(BeamLatticeExtensionHandler.namespace()).is_some());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct BeamLatticeExtensionHandler;

impl ExtensionHandler for BeamLatticeExtensionHandler {
    fn namespace(&self) -> &'static str {
        Extension::BeamLattice.namespace()
    }

    fn name(&self) -> &'static str {
        Extension::BeamLattice.name()
    }

    fn default_prefix(&self) -> &'static str {
        Extension::BeamLattice.default_prefix()
    }

    fn required_when_used(&self) -> bool {
        true
    }

    fn is_used_in_model(&self, model: &Model) -> bool {
        model.parts().any(|(_, resources)| {
            resources
                .objects
                .iter()
                .filter_map(|object| object.mesh.as_ref())
                .any(|mesh| mesh.beam_lattice().is_some())
        })
    }

    fn new_mesh_decoder(&self, local: &str) -> Option<Box<dyn ElementDecoder>> {
        (local == "beamlattice").then(|| Box::new(BeamLatticeDecoder::new()) as Box<dyn ElementDecoder>)
    }

    fn encode_mesh_extension(&self, extension: &MeshExtension, encoder: &mut XmlEncoder<'_>) -> Result<bool> {
        match extension {
            MeshExtension::BeamLattice(lattice) => {
                write_beam_lattice(encoder, lattice)?;
                Ok(true)
            }
            MeshExtension::Unknown(_) => Ok(false),
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
        validate_beam_lattice(model, part, path, object, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BeamLattice, Mesh};

    #[test]
    fn test_identity() {
        let handler = BeamLatticeExtensionHandler;
        assert_eq!(
            handler.namespace(),
            "http://schemas.microsoft.com/3dmanufacturing/beamlattice/2017/02"
        );
        assert_eq!(handler.name(), "BeamLattice");
        assert_eq!(handler.default_prefix(), "b");
    }

    #[test]
    fn test_is_used_in_model() {
        let handler = BeamLatticeExtensionHandler;
        let mut model = Model::new();
        model.resources.objects.push(Object::with_mesh(1, Mesh::new()));
        assert!(!handler.is_used_in_model(&model));

        if let Some(mesh) = model.resources.objects[0].mesh.as_mut() {
            mesh.extensions
                .push(MeshExtension::BeamLattice(BeamLattice::new(1.0, 0.1)));
        }
        assert!(handler.is_used_in_model(&model));
    }

    #[test]
    fn test_only_beamlattice_has_a_decoder() {
        let handler = BeamLatticeExtensionHandler;
        assert!(handler.new_mesh_decoder("beamlattice").is_some());
        assert!(handler.new_mesh_decoder("beams").is_none());
    }
}
