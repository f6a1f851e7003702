//! XML parsing for 3MF model parts
//!
//! A model part is decoded by a tree of [`ElementDecoder`]s driven by the
//! streaming engine in [`crate::codec`]. Core elements are handled here;
//! elements and attributes in an extension namespace are handed to the
//! [`ExtensionHandler`](crate::extension::ExtensionHandler) registered for it,
//! and anything else is preserved verbatim.
//!
//! Decoding never stops at a malformed attribute. Findings are collected as
//! [`Diagnostic`]s; [`ParserConfig::strict`] decides whether they fail the
//! decode or come back as warnings.

mod beam_lattice;
mod boolean_ops;
mod core;
mod material;
mod production;
mod slice;

use std::io::BufRead;

use tracing::{debug, warn};

use crate::codec::{DecodeContext, Node, XML_NAMESPACE, XMLNS_NAMESPACE, XmlAttr, decode};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::{Error, Result};
use crate::extension::AttrOwner;
use crate::model::{DEFAULT_MODEL_PATH, ExtensionAttrs, Model, ParserConfig};

pub(crate) use self::beam_lattice::BeamLatticeDecoder;
pub(crate) use self::boolean_ops::decode_boolean_attribute;
pub(crate) use self::production::decode_production_attribute;
pub(crate) use self::slice::{SliceStackDecoder, decode_slice_attribute};

use self::core::DocumentDecoder;

/// A decoded model part together with the findings of a non-strict decode
#[derive(Debug, Clone)]
pub struct ParseOutcome {
    /// The decoded model
    pub model: Model,
    /// Diagnostics recorded while decoding; always empty after a strict decode
    pub warnings: Vec<Diagnostic>,
}

/// Parse the XML of a root model part with the default configuration
///
/// ```
/// use threemf::parser::parse_model_xml;
///
/// let xml = r#"<model xmlns="http://schemas.microsoft.com/3dmanufacturing/core/2015/02"
///                     unit="inch"><resources/><build/></model>"#;
/// let model = parse_model_xml(xml).unwrap();
/// assert_eq!(model.units.as_str(), "inch");
/// ```
pub fn parse_model_xml(xml: &str) -> Result<Model> {
    parse_model_xml_with_config(xml, &ParserConfig::default()).map(|outcome| outcome.model)
}

/// Parse the XML of a root model part with a custom configuration
pub fn parse_model_xml_with_config(xml: &str, config: &ParserConfig) -> Result<ParseOutcome> {
    decode_part(xml.as_bytes(), DEFAULT_MODEL_PATH, config)
}

/// Decode one model part read from `reader`
///
/// `path` is the part name used as the first segment of every diagnostic path.
/// Unless it is the default root part name it is also stored in
/// [`Model::path`].
pub fn decode_part<R: BufRead>(reader: R, path: &str, config: &ParserConfig) -> Result<ParseOutcome> {
    let (model, diagnostics) = decode_part_collecting(reader, path, config)?;
    finish_decode(model, diagnostics, path, config)
}

/// Decode one part and return every diagnostic regardless of strict mode
pub(crate) fn decode_part_collecting<R: BufRead>(
    reader: R,
    path: &str,
    config: &ParserConfig,
) -> Result<(Model, Vec<Diagnostic>)> {
    let mut ctx = DecodeContext::new(config.registry(), path);
    let node = decode(reader, Box::new(DocumentDecoder::default()), &mut ctx)?;
    let mut model = match node {
        Some(Node::Model(model)) => *model,
        _ => {
            return Err(Error::InvalidFormat(format!(
                "{} does not have a 3MF <model> root element",
                path
            )));
        }
    };
    if path != DEFAULT_MODEL_PATH {
        model.path = path.to_string();
    }

    let diagnostics = ctx.into_diagnostics();
    debug!(
        part = path,
        objects = model.resources.objects.len(),
        assets = model.resources.assets.len(),
        items = model.build.items.len(),
        diagnostics = diagnostics.len(),
        "decoded model part"
    );
    Ok((model, diagnostics))
}

/// Apply strict mode to the diagnostics of a finished decode
pub(crate) fn finish_decode(
    model: Model,
    diagnostics: Vec<Diagnostic>,
    part: &str,
    config: &ParserConfig,
) -> Result<ParseOutcome> {
    if diagnostics.is_empty() {
        return Ok(ParseOutcome {
            model,
            warnings: diagnostics,
        });
    }

    if config.is_strict() {
        let unsupported = diagnostics.iter().find_map(|d| match &d.kind {
            DiagnosticKind::UnsupportedExtension { namespace } => Some(namespace.clone()),
            _ => None,
        });
        if let Some(namespace) = unsupported {
            return Err(Error::UnsupportedExtension(namespace));
        }
        return Err(Error::Diagnostics(diagnostics));
    }

    for diagnostic in &diagnostics {
        warn!(part, "{}", diagnostic);
    }
    Ok(ParseOutcome {
        model,
        warnings: diagnostics,
    })
}

/// Route an attribute a core decoder does not handle itself
///
/// Attributes in a registered extension namespace are decoded into the
/// element's side-cars by their handler; every other attribute is kept raw.
/// Namespace declarations are dropped, the encoder writes its own.
pub(crate) fn decode_foreign_attr(
    ctx: &mut DecodeContext<'_>,
    owner: AttrOwner,
    attr: &XmlAttr,
    ext_attrs: &mut ExtensionAttrs,
    any_attr: &mut Vec<XmlAttr>,
) {
    let space = attr.name.space.as_str();
    if space.is_empty() || space == XML_NAMESPACE {
        keep_unknown_attr(attr, any_attr);
        return;
    }
    if space == XMLNS_NAMESPACE {
        return;
    }
    match ctx.registry().get(space) {
        Some(handler) => {
            if let Err(kind) = handler.decode_attribute(owner, ext_attrs, attr) {
                ctx.report(kind);
            }
        }
        None => any_attr.push(attr.clone()),
    }
}

/// Keep an attribute the decoder has no field for, unless it declares a namespace
pub(crate) fn keep_unknown_attr(attr: &XmlAttr, any_attr: &mut Vec<XmlAttr>) {
    if !attr.name.is_namespace_declaration() {
        any_attr.push(attr.clone());
    }
}

/// Returns true for the XML boolean literals `1` and `true`
pub(crate) fn parse_bool(value: &str) -> bool {
    matches!(value.trim(), "1" | "true")
}
