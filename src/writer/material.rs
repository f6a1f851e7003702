//! Base material writing

use crate::codec::{XmlAttr, XmlEncoder, XmlName};
use crate::error::Result;
use crate::model::BaseMaterials;

/// Write a `<basematerials>` group
pub(super) fn write_base_materials(enc: &mut XmlEncoder<'_>, group: &BaseMaterials) -> Result<()> {
    enc.write_start(
        &XmlName::core("basematerials"),
        &[XmlAttr::new("id", group.id.to_string())],
    )?;
    let base = XmlName::core("base");
    for material in &group.bases {
        let attrs = [
            XmlAttr::new("name", material.name.as_str()),
            XmlAttr::new("displaycolor", material.color.to_string()),
        ];
        enc.write_element(&base, &attrs)?;
    }
    enc.write_end()
}
