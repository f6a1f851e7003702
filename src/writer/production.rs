//! Production extension attribute writing

use crate::codec::XmlAttr;
use crate::extension::Extension;
use crate::model::ProductionAttr;

/// Append `p:UUID` and `p:path`
pub(crate) fn production_attrs(attr: &ProductionAttr, out: &mut Vec<XmlAttr>) {
    let ns = Extension::Production.namespace();
    if let Some(uuid) = &attr.uuid {
        out.push(XmlAttr::namespaced(ns, "UUID", uuid.as_str()));
    }
    if let Some(path) = &attr.path {
        out.push(XmlAttr::namespaced(ns, "path", path.as_str()));
    }
}
