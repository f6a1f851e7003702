//! Streaming decoder engine
//!
//! The engine reads XML events with `quick_xml`, resolves namespace prefixes
//! itself and drives a stack of [`ElementDecoder`]s. Every start tag is offered
//! to the nearest decoder on the stack, which either supplies a child decoder,
//! handles the element inline, or declines. Declined elements are recorded
//! token by token into [`UnknownTokens`] and handed back to the owner through
//! [`ElementDecoder::attach`], so nothing the decoders do not understand is lost.
//!
//! Decoders report problems into the [`DecodeContext`] and keep going; only
//! I/O and XML syntax errors end a decode early.

use std::any::Any;
use std::io::BufRead;
use std::str::FromStr;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::trace;

use super::xml::{StartElement, Token, UnknownTokens, XML_NAMESPACE, XMLNS_NAMESPACE, XmlAttr, XmlName};
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath, PathSegment};
use crate::error::{Error, Result};
use crate::extension::ExtensionRegistry;
use crate::model::{
    Asset, Build, Components, Item, Mesh, MeshExtension, Metadata, Model, Object, Resources,
};

/// Value produced by a finished element decoder and handed to its parent
pub enum Node {
    /// A complete model
    Model(Box<Model>),
    /// A `<metadata>` entry
    Metadata(Metadata),
    /// A `<resources>` table
    Resources(Resources),
    /// A `<build>` list
    Build(Build),
    /// An `<object>`
    Object(Object),
    /// An asset (core or extension)
    Asset(Asset),
    /// A `<mesh>`
    Mesh(Mesh),
    /// A `<components>` group
    Components(Components),
    /// An `<item>`
    Item(Item),
    /// An extension payload inside `<mesh>`
    MeshExtension(MeshExtension),
    /// A subtree recorded by the pass-through decoder
    Unknown(UnknownTokens),
    /// Extension-private intermediate value
    Extension(Box<dyn Any + Send>),
}

/// What to do with a child element
pub enum Child {
    /// Push a dedicated decoder for the element
    Decoder(Box<dyn ElementDecoder>),
    /// The current decoder handles the element through its inline hooks
    Inline,
    /// Record the subtree verbatim
    Unknown,
}

/// A decoder for one element and, through inline handling, its leaf children
pub trait ElementDecoder {
    /// Path segment pushed while this element is open
    fn segment(&self) -> Option<PathSegment> {
        None
    }

    /// The element's start tag, delivered before any child
    fn start(&mut self, _start: &StartElement, _ctx: &mut DecodeContext<'_>) {}

    /// Choose how a child element is decoded
    fn child(&mut self, _name: &XmlName, _ctx: &mut DecodeContext<'_>) -> Child {
        Child::Unknown
    }

    /// Start of an element this decoder chose to handle inline
    fn inline_start(&mut self, _start: &StartElement, _ctx: &mut DecodeContext<'_>) {}

    /// End of an element this decoder chose to handle inline
    fn inline_end(&mut self, _name: &XmlName, _ctx: &mut DecodeContext<'_>) {}

    /// Opt in to character data
    fn wants_char_data(&self) -> bool {
        false
    }

    /// Character data of the element or of an inline child
    fn char_data(&mut self, _text: &str, _ctx: &mut DecodeContext<'_>) {}

    /// Product of a finished child decoder, or a recorded unknown subtree
    fn attach(&mut self, _node: Node, _ctx: &mut DecodeContext<'_>) {}

    /// End tag; returns the node handed to the parent
    fn end(self: Box<Self>, ctx: &mut DecodeContext<'_>) -> Option<Node>;
}

/// State shared by all decoders of one model part
pub struct DecodeContext<'a> {
    registry: &'a ExtensionRegistry,
    part: String,
    path: DiagnosticPath,
    diagnostics: Vec<Diagnostic>,
    namespaces: Vec<Vec<(String, String)>>,
}

impl<'a> DecodeContext<'a> {
    /// Context for decoding the part at `part`
    pub fn new(registry: &'a ExtensionRegistry, part: &str) -> Self {
        Self {
            registry,
            part: part.to_string(),
            path: DiagnosticPath::new(part),
            diagnostics: Vec::new(),
            namespaces: vec![vec![("xml".to_string(), XML_NAMESPACE.to_string())]],
        }
    }

    /// Registry of extension handlers
    pub fn registry(&self) -> &'a ExtensionRegistry {
        self.registry
    }

    /// Path of the part being decoded
    pub fn part(&self) -> &str {
        &self.part
    }

    /// Current diagnostic path
    pub fn path(&self) -> &DiagnosticPath {
        &self.path
    }

    /// Record a diagnostic at the current path
    pub fn report(&mut self, kind: DiagnosticKind) {
        self.diagnostics.push(Diagnostic::new(&self.path, kind));
    }

    /// Record a diagnostic one segment below the current path
    pub fn report_at(&mut self, segment: PathSegment, kind: DiagnosticKind) {
        self.diagnostics
            .push(Diagnostic::new(&self.path.with(segment), kind));
    }

    /// Enter an inline element for diagnostic purposes
    pub fn push_segment(&mut self, segment: PathSegment) {
        self.path.push(segment);
    }

    /// Leave an inline element
    pub fn pop_segment(&mut self) {
        self.path.pop();
    }

    /// Parse an attribute value, reporting a parse diagnostic on failure
    pub fn parse_attr<T: FromStr>(&mut self, attr: &XmlAttr, required: bool) -> Option<T> {
        match attr.value.trim().parse::<T>() {
            Ok(value) => Some(value),
            Err(_) => {
                self.report(DiagnosticKind::parse_attr(attr.name.local.clone(), required));
                None
            }
        }
    }

    /// Namespace bound to `prefix` in the current scope
    pub fn resolve_prefix(&self, prefix: &str) -> Option<&str> {
        self.namespaces
            .iter()
            .rev()
            .flat_map(|scope| scope.iter().rev())
            .find(|(p, _)| p == prefix)
            .map(|(_, uri)| uri.as_str())
    }

    /// Resolve a `prefix:local` value; unbound prefixes are kept as the namespace
    pub fn resolve_qualified(&self, qname: &str) -> XmlName {
        match qname.split_once(':') {
            Some((prefix, local)) => {
                let space = self.resolve_prefix(prefix).unwrap_or(prefix);
                XmlName::new(space, local)
            }
            None => XmlName::local(qname),
        }
    }

    /// Diagnostics recorded so far
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the context, returning its diagnostics
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn push_scope(&mut self, bindings: Vec<(String, String)>) {
        self.namespaces.push(bindings);
    }

    fn pop_scope(&mut self) {
        if self.namespaces.len() > 1 {
            self.namespaces.pop();
        }
    }

    fn resolve(&self, qname: &str, is_attr: bool) -> XmlName {
        match qname.split_once(':') {
            Some(("xmlns", local)) => XmlName::new(XMLNS_NAMESPACE, local),
            Some((prefix, local)) => {
                let space = self.resolve_prefix(prefix).unwrap_or(prefix);
                XmlName::new(space, local)
            }
            None if is_attr => XmlName::local(qname),
            None => XmlName::new(self.resolve_prefix("").unwrap_or(""), qname),
        }
    }
}

enum Frame {
    Decoder {
        decoder: Box<dyn ElementDecoder>,
        segment: bool,
    },
    Inline(XmlName),
    PassThrough {
        tokens: UnknownTokens,
        depth: usize,
    },
}

struct Engine {
    frames: Vec<Frame>,
}

impl Engine {
    fn owner(&mut self) -> Result<&mut Box<dyn ElementDecoder>> {
        self.frames
            .iter_mut()
            .rev()
            .find_map(|frame| match frame {
                Frame::Decoder { decoder, .. } => Some(decoder),
                _ => None,
            })
            .ok_or_else(|| Error::InvalidXml("element outside of the document".to_string()))
    }

    fn start(&mut self, start: StartElement, ctx: &mut DecodeContext<'_>) -> Result<()> {
        if let Some(Frame::PassThrough { tokens, depth }) = self.frames.last_mut() {
            tokens.push(Token::Start(start));
            *depth += 1;
            return Ok(());
        }

        let owner = self.owner()?;
        match owner.child(&start.name, ctx) {
            Child::Decoder(mut decoder) => {
                let segment = decoder.segment();
                let pushed = segment.is_some();
                if let Some(segment) = segment {
                    ctx.path.push(segment);
                }
                decoder.start(&start, ctx);
                self.frames.push(Frame::Decoder {
                    decoder,
                    segment: pushed,
                });
            }
            Child::Inline => {
                owner.inline_start(&start, ctx);
                self.frames.push(Frame::Inline(start.name));
            }
            Child::Unknown => {
                trace!(element = %start.name, "recording unknown element");
                let mut tokens = UnknownTokens::new();
                tokens.push(Token::Start(start));
                self.frames.push(Frame::PassThrough { tokens, depth: 0 });
            }
        }
        Ok(())
    }

    fn end(&mut self, name: XmlName, ctx: &mut DecodeContext<'_>) -> Result<()> {
        if self.frames.len() <= 1 {
            return Err(Error::InvalidXml(format!("unbalanced end tag {}", name)));
        }
        match self.frames.pop() {
            Some(Frame::PassThrough { mut tokens, depth }) => {
                tokens.push(Token::End(name));
                if depth > 0 {
                    self.frames.push(Frame::PassThrough {
                        tokens,
                        depth: depth - 1,
                    });
                } else {
                    self.owner()?.attach(Node::Unknown(tokens), ctx);
                }
            }
            Some(Frame::Inline(name)) => self.owner()?.inline_end(&name, ctx),
            Some(Frame::Decoder { decoder, segment }) => {
                let node = decoder.end(ctx);
                if segment {
                    ctx.path.pop();
                }
                if let Some(node) = node {
                    self.owner()?.attach(node, ctx);
                }
            }
            None => {}
        }
        Ok(())
    }

    fn text(&mut self, text: &mut String, ctx: &mut DecodeContext<'_>) -> Result<()> {
        if text.trim().is_empty() {
            text.clear();
            return Ok(());
        }
        let content = std::mem::take(text);
        if let Some(Frame::PassThrough { tokens, .. }) = self.frames.last_mut() {
            tokens.push(Token::Text(content));
            return Ok(());
        }
        let owner = self.owner()?;
        if owner.wants_char_data() {
            owner.char_data(&content, ctx);
        }
        Ok(())
    }
}

fn start_element(e: &BytesStart<'_>, ctx: &mut DecodeContext<'_>) -> Result<StartElement> {
    let qname = std::str::from_utf8(e.name().as_ref())?.to_string();

    let mut raw = Vec::new();
    let mut bindings = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let value = unescape(std::str::from_utf8(&attr.value)?)?;
        if key == "xmlns" {
            bindings.push((String::new(), value.clone()));
        } else if let Some(prefix) = key.strip_prefix("xmlns:") {
            bindings.push((prefix.to_string(), value.clone()));
        }
        raw.push((key, value));
    }
    ctx.push_scope(bindings);

    let attrs = raw
        .into_iter()
        .map(|(key, value)| XmlAttr {
            name: ctx.resolve(&key, true),
            value,
        })
        .collect();
    Ok(StartElement {
        name: ctx.resolve(&qname, false),
        attrs,
    })
}

fn unescape(raw: &str) -> Result<String> {
    quick_xml::escape::unescape(raw)
        .map(|value| value.into_owned())
        .map_err(|e| Error::InvalidXml(format!("cannot unescape '{}': {}", raw, e)))
}

fn resolve_reference(name: &str) -> Result<String> {
    let invalid = || Error::InvalidXml(format!("unknown entity reference &{};", name));
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        }
        .map_err(|_| invalid())?;
        return char::from_u32(code).map(String::from).ok_or_else(invalid);
    }
    quick_xml::escape::resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(invalid)
}

/// Run `root` over an XML document
///
/// `root` is offered the document element as its only child. The node it
/// returns from [`ElementDecoder::end`] is the result of the decode.
pub fn decode<R: BufRead>(
    source: R,
    root: Box<dyn ElementDecoder>,
    ctx: &mut DecodeContext<'_>,
) -> Result<Option<Node>> {
    let mut reader = Reader::from_reader(source);
    let mut engine = Engine {
        frames: vec![Frame::Decoder {
            decoder: root,
            segment: false,
        }],
    };
    let mut buf = Vec::new();
    let mut text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                engine.text(&mut text, ctx)?;
                let start = start_element(&e, ctx)?;
                engine.start(start, ctx)?;
            }
            Event::Empty(e) => {
                engine.text(&mut text, ctx)?;
                let start = start_element(&e, ctx)?;
                let name = start.name.clone();
                engine.start(start, ctx)?;
                engine.end(name, ctx)?;
                ctx.pop_scope();
            }
            Event::End(e) => {
                engine.text(&mut text, ctx)?;
                let qname = std::str::from_utf8(e.name().as_ref())?.to_string();
                let name = ctx.resolve(&qname, false);
                engine.end(name, ctx)?;
                ctx.pop_scope();
            }
            Event::Text(e) => text.push_str(&unescape(std::str::from_utf8(&e)?)?),
            Event::CData(e) => text.push_str(std::str::from_utf8(&e)?),
            Event::GeneralRef(e) => text.push_str(&resolve_reference(std::str::from_utf8(&e)?)?),
            Event::DocType(_) => {
                return Err(Error::InvalidXml(
                    "DOCTYPE declarations are not allowed".to_string(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if engine.frames.len() != 1 {
        return Err(Error::InvalidXml("unexpected end of document".to_string()));
    }
    match engine.frames.pop() {
        Some(Frame::Decoder { decoder, .. }) => Ok(decoder.end(ctx)),
        _ => Ok(None),
    }
}
