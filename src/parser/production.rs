//! Production extension attribute decoding

use crate::codec::XmlAttr;
use crate::diagnostic::DiagnosticKind;
use crate::extension::AttrOwner;
use crate::model::{ExtensionAttrs, ProductionAttr, is_valid_uuid};

/// Decode `p:UUID` and `p:path` on build, item, object and component elements
///
/// A malformed UUID is reported and not stored.
pub(crate) fn decode_production_attribute(
    owner: AttrOwner,
    attrs: &mut ExtensionAttrs,
    attr: &XmlAttr,
) -> Result<(), DiagnosticKind> {
    match (owner, attr.name.local.as_str()) {
        (AttrOwner::Model | AttrOwner::Components, _) => attrs.push_other(attr.clone()),
        (_, "UUID") => {
            let uuid = attr.value.trim();
            if !is_valid_uuid(uuid) {
                return Err(DiagnosticKind::parse_attr("UUID", false));
            }
            attrs.update::<ProductionAttr>(|p| p.uuid = Some(uuid.to_string()));
        }
        (AttrOwner::Item | AttrOwner::Component, "path") => {
            attrs.update::<ProductionAttr>(|p| p.path = Some(attr.value.clone()));
        }
        _ => attrs.push_other(attr.clone()),
    }
    Ok(())
}
