//! Slice extension handler

use crate::codec::{ElementDecoder, XmlAttr, XmlEncoder};
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::error::Result;
use crate::extension::{AttrOwner, Extension, ExtensionHandler};
use crate::model::{Asset, ExtensionAttr, ExtensionAttrs, Model, Object, SliceStackInfo};
use crate::parser::{SliceStackDecoder, decode_slice_attribute};
use crate::validator::{validate_slice_stack, validate_slice_transforms, validate_sliced_object};
use crate::writer::{slice_stack_info_attrs, write_slice_stack};

/// Extension handler for the Slice extension
///
/// Owns the `<s:slicestack>` resource and the `s:slicestackid` /
/// `s:meshresolution` attributes on objects.
///
/// ```
/// use threemf::extension::ExtensionHandler;
/// use threemf::extensions::SliceExtensionHandler;
///
/// assert_eq!(SliceExtensionHandler.default_prefix(), "s");
/// assert!(!SliceExtensionHandler.required_when_used());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SliceExtensionHandler;

impl ExtensionHandler for SliceExtensionHandler {
    fn namespace(&self) -> &'static str {
        Extension::Slice.namespace()
    }

    fn name(&self) -> &'static str {
        Extension::Slice.name()
    }

    fn default_prefix(&self) -> &'static str {
        Extension::Slice.default_prefix()
    }

    fn is_used_in_model(&self, model: &Model) -> bool {
        model.parts().any(|(_, resources)| {
            resources
                .assets
                .iter()
                .any(|asset| matches!(asset, Asset::SliceStack(_)))
                || resources
                    .objects
                    .iter()
                    .any(|object| object.ext_attrs.get::<SliceStackInfo>().is_some())
        })
    }

    fn new_resources_decoder(&self, local: &str, index: usize) -> Option<Box<dyn ElementDecoder>> {
        (local == "slicestack").then(|| Box::new(SliceStackDecoder::new(index)) as Box<dyn ElementDecoder>)
    }

    fn decode_attribute(
        &self,
        owner: AttrOwner,
        attrs: &mut ExtensionAttrs,
        attr: &XmlAttr,
    ) -> std::result::Result<(), DiagnosticKind> {
        decode_slice_attribute(owner, attrs, attr)
    }

    fn encode_attribute(&self, attr: &ExtensionAttr, out: &mut Vec<XmlAttr>) {
        match attr {
            ExtensionAttr::SliceStack(info) => slice_stack_info_attrs(info, out),
            ExtensionAttr::Other { attrs, .. } => out.extend(attrs.iter().cloned()),
            _ => {}
        }
    }

    fn encode_asset(&self, asset: &Asset, encoder: &mut XmlEncoder<'_>) -> Result<bool> {
        match asset {
            Asset::SliceStack(stack) => {
                write_slice_stack(encoder, stack)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    fn validate_model(&self, model: &Model, diagnostics: &mut Vec<Diagnostic>) {
        validate_slice_transforms(model, diagnostics);
    }

    fn validate_asset(
        &self,
        model: &Model,
        part: &str,
        path: &DiagnosticPath,
        asset: &Asset,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        if let Asset::SliceStack(stack) = asset {
            validate_slice_stack(model, part, path, stack, diagnostics);
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
        validate_sliced_object(model, part, path, object, diagnostics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MeshResolution, SliceStack};

    #[test]
    fn test_is_used_by_asset_or_object() {
        let handler = SliceExtensionHandler;
        let mut model = Model::new();
        assert!(!handler.is_used_in_model(&model));

        model
            .resources
            .assets
            .push(Asset::SliceStack(SliceStack::new(1, 0.0)));
        assert!(handler.is_used_in_model(&model));

        let mut model = Model::new();
        let mut object = Object::new(2);
        object.ext_attrs.insert(ExtensionAttr::SliceStack(SliceStackInfo {
            slice_stack_id: 1,
            mesh_resolution: MeshResolution::Low,
        }));
        model.resources.objects.push(object);
        assert!(handler.is_used_in_model(&model));
    }

    #[test]
    fn test_encode_attribute() {
        let mut out = Vec::new();
        SliceExtensionHandler.encode_attribute(
            &ExtensionAttr::SliceStack(SliceStackInfo {
                slice_stack_id: 4,
                mesh_resolution: MeshResolution::Full,
            }),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].value, "4");
    }
}
