//! Validation of decoded 3MF models
//!
//! Validation is a separate pass over an already decoded [`Model`]; decoding
//! never runs it. Every rule appends to one flat list of [`Diagnostic`]s and
//! nothing short-circuits, so a single call reports every problem found.
//!
//! Core rules live in this module tree. Each registered extension adds its
//! own through the [`ExtensionHandler`](crate::extension::ExtensionHandler)
//! validation hooks, which the walk calls for every part, asset and object.

mod beam_lattice;
mod boolean_ops;
mod core;
mod material;
mod production;
mod slice;

pub(crate) use beam_lattice::validate_beam_lattice;
pub(crate) use boolean_ops::validate_boolean_operation;
pub(crate) use production::validate_production;
pub(crate) use slice::{validate_slice_stack, validate_sliced_object, validate_slice_transforms};

use tracing::debug;

use crate::diagnostic::{Diagnostic, DiagnosticPath};
use crate::extension::{ExtensionRegistry, global_registry};
use crate::model::{Asset, Model};

/// Validate `model` with the rules of the core schema and of every handler in `registry`
///
/// ```
/// use threemf::model::{Item, Model};
/// use threemf::validator::validate_model;
/// use threemf::extension::global_registry;
///
/// let mut model = Model::new();
/// model.build.items.push(Item::new(99));
/// let diagnostics = validate_model(&model, &global_registry());
/// assert_eq!(diagnostics.len(), 1);
/// assert_eq!(
///     diagnostics[0].to_string(),
///     "/3D/3dmodel.model@Build@Item#0: missing resource 99"
/// );
/// ```
pub fn validate_model(model: &Model, registry: &ExtensionRegistry) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    let root = DiagnosticPath::new(model.root_path());

    core::validate_metadata_list(model, &root, "Metadata", &model.metadata, &mut diagnostics);

    for (part, resources) in model.parts() {
        let part_path = DiagnosticPath::new(part);
        let resources_path = part_path.child("Resources");
        core::validate_ids(resources, &resources_path, &mut diagnostics);

        for (index, asset) in resources.assets.iter().enumerate() {
            let Some(path) = asset_path(&resources_path, asset, index) else {
                continue;
            };
            if let Some(handler) = registry.get(asset.namespace()) {
                handler.validate_asset(model, part, &path, asset, &mut diagnostics);
            }
        }

        for (index, object) in resources.objects.iter().enumerate() {
            let path = resources_path.indexed("Object", index);
            core::validate_object(model, part, &path, object, &mut diagnostics);
            material::validate_object_properties(model, part, &path, object, &mut diagnostics);
            for handler in registry.handlers() {
                handler.validate_object(model, part, &path, object, &mut diagnostics);
            }
        }
    }

    core::validate_build(model, &root.child("Build"), &mut diagnostics);
    core::validate_recursion(model, &mut diagnostics);

    for handler in registry.handlers() {
        handler.validate_model(model, &mut diagnostics);
    }

    debug!(
        part = model.root_path(),
        diagnostics = diagnostics.len(),
        "validated model"
    );
    diagnostics
}

/// Path of an asset, `None` for unknown assets which carry no rules
fn asset_path(resources: &DiagnosticPath, asset: &Asset, index: usize) -> Option<DiagnosticPath> {
    match asset {
        Asset::BaseMaterials(_) => Some(resources.indexed("BaseMaterials", index)),
        Asset::SliceStack(_) => Some(resources.indexed("SliceStack", index)),
        Asset::Unknown(_) => None,
    }
}

impl Model {
    /// Validate against the process-wide extension registry
    pub fn validate(&self) -> Vec<Diagnostic> {
        validate_model(self, &global_registry())
    }
}

/// Canonical form of a part path: the root part is always named by its full path
pub(crate) fn canonical_part<'a>(model: &'a Model, part: &'a str) -> &'a str {
    if model.is_root_path(part) {
        model.root_path()
    } else {
        part
    }
}
