//! Boolean Operations extension attribute decoding

use crate::codec::XmlAttr;
use crate::diagnostic::DiagnosticKind;
use crate::extension::AttrOwner;
use crate::model::{Association, BooleanOpType, BooleanOperationAttr, ExtensionAttrs};

/// Decode `bo:association` and `bo:operation` on a `<components>` element
pub(crate) fn decode_boolean_attribute(
    owner: AttrOwner,
    attrs: &mut ExtensionAttrs,
    attr: &XmlAttr,
) -> Result<(), DiagnosticKind> {
    if owner != AttrOwner::Components {
        attrs.push_other(attr.clone());
        return Ok(());
    }
    match attr.name.local.as_str() {
        "association" => {
            let association = attr
                .value
                .trim()
                .parse::<Association>()
                .map_err(|_| DiagnosticKind::parse_attr("association", false))?;
            attrs.update::<BooleanOperationAttr>(|b| b.association = association);
        }
        "operation" => {
            let operation = attr
                .value
                .trim()
                .parse::<BooleanOpType>()
                .map_err(|_| DiagnosticKind::parse_attr("operation", false))?;
            attrs.update::<BooleanOperationAttr>(|b| b.operation = operation);
        }
        _ => attrs.push_other(attr.clone()),
    }
    Ok(())
}
