//! Boolean Operations extension attribute writing

use crate::codec::XmlAttr;
use crate::extension::Extension;
use crate::model::BooleanOperationAttr;

/// Append `bo:association` and `bo:operation`
///
/// Both are always written; a group carrying the side-car is a boolean
/// group even when it holds the default values.
pub(crate) fn boolean_operation_attrs(attr: &BooleanOperationAttr, out: &mut Vec<XmlAttr>) {
    let ns = Extension::BooleanOperations.namespace();
    out.push(XmlAttr::namespaced(ns, "association", attr.association.as_str()));
    out.push(XmlAttr::namespaced(ns, "operation", attr.operation.as_str()));
}
