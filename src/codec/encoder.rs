//! Streaming XML encoder
//!
//! A thin layer over `quick_xml::Writer` that knows about namespaces and
//! float formatting. Elements are written by [`XmlName`]; the encoder picks
//! the prefix bound to the namespace, and declares a generated one when a
//! namespace has no binding in scope. A start tag is held back until the next
//! event so an element without content is written self-closed.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use super::xml::{CORE_NAMESPACE, Token, UnknownTokens, XML_NAMESPACE, XMLNS_NAMESPACE, XmlAttr, XmlName};
use crate::error::{Error, Result};

/// Namespace-aware, float-precision-aware XML writer
pub struct XmlEncoder<'w> {
    writer: Writer<&'w mut dyn Write>,
    float_precision: Option<usize>,
    auto_close: bool,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
    // (namespace, prefix); an empty prefix is a default namespace binding
    scopes: Vec<Vec<(String, String)>>,
    generated: usize,
}

impl<'w> XmlEncoder<'w> {
    /// Create an encoder; `indent` selects two-space pretty printing
    pub fn new(out: &'w mut dyn Write, float_precision: Option<usize>, indent: bool) -> Self {
        let writer = if indent {
            Writer::new_with_indent(out, b' ', 2)
        } else {
            Writer::new(out)
        };
        Self {
            writer,
            float_precision,
            auto_close: false,
            pending: None,
            open: Vec::new(),
            scopes: vec![vec![
                (CORE_NAMESPACE.to_string(), String::new()),
                (XML_NAMESPACE.to_string(), "xml".to_string()),
            ]],
            generated: 0,
        }
    }

    /// Bind `prefix` to `namespace` for the whole document
    ///
    /// The binding is only recorded; the caller writes the matching `xmlns`
    /// attribute on the root element.
    pub fn declare(&mut self, namespace: &str, prefix: &str) {
        if let Some(root) = self.scopes.first_mut() {
            root.push((namespace.to_string(), prefix.to_string()));
        }
    }

    /// Configured number of fractional digits
    pub fn float_precision(&self) -> Option<usize> {
        self.float_precision
    }

    /// Format an `f32` with the configured precision
    pub fn format_f32(&self, value: f32) -> String {
        match self.float_precision {
            Some(precision) => format!("{:.*}", precision, value),
            None => value.to_string(),
        }
    }

    /// Format an `f64` with the configured precision
    pub fn format_f64(&self, value: f64) -> String {
        match self.float_precision {
            Some(precision) => format!("{:.*}", precision, value),
            None => value.to_string(),
        }
    }

    /// While active, every start element is closed immediately
    pub fn set_auto_close(&mut self, auto_close: bool) {
        self.auto_close = auto_close;
    }

    /// Write the `<?xml ...?>` declaration
    pub fn write_declaration(&mut self) -> Result<()> {
        self.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(|e| Error::xml_write(format!("Failed to write XML declaration: {}", e)))
    }

    /// Write a start tag
    pub fn write_start(&mut self, name: &XmlName, attrs: &[XmlAttr]) -> Result<()> {
        self.flush_pending()?;

        let bindings = attrs
            .iter()
            .filter_map(|attr| {
                if attr.name.space == XMLNS_NAMESPACE {
                    Some((attr.value.clone(), attr.name.local.clone()))
                } else if attr.name.space.is_empty() && attr.name.local == "xmlns" {
                    Some((attr.value.clone(), String::new()))
                } else {
                    None
                }
            })
            .collect();
        self.scopes.push(bindings);

        let mut declarations = Vec::new();
        let qname = self.qualify(name, false, &mut declarations);
        let mut elem = BytesStart::new(qname.clone());
        for attr in attrs {
            let key = self.qualify(&attr.name, true, &mut declarations);
            elem.push_attribute((key.as_str(), attr.value.as_str()));
        }
        for (key, value) in &declarations {
            elem.push_attribute((key.as_str(), value.as_str()));
        }

        if self.auto_close {
            self.scopes.pop();
            return self
                .writer
                .write_event(Event::Empty(elem))
                .map_err(|e| Error::xml_write(format!("Failed to write {}: {}", qname, e)));
        }
        self.pending = Some(elem);
        self.open.push(qname);
        Ok(())
    }

    /// Close the most recently opened element
    pub fn write_end(&mut self) -> Result<()> {
        let qname = self
            .open
            .pop()
            .ok_or_else(|| Error::xml_write("end tag without matching start".to_string()))?;
        self.scopes.pop();
        let event = match self.pending.take() {
            Some(elem) => Event::Empty(elem),
            None => Event::End(BytesEnd::new(qname.clone())),
        };
        self.writer
            .write_event(event)
            .map_err(|e| Error::xml_write(format!("Failed to close {}: {}", qname, e)))
    }

    /// Write an element without content
    pub fn write_element(&mut self, name: &XmlName, attrs: &[XmlAttr]) -> Result<()> {
        if self.auto_close {
            return self.write_start(name, attrs);
        }
        self.write_start(name, attrs)?;
        self.write_end()
    }

    /// Write character data, escaping as needed
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        self.flush_pending()?;
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(|e| Error::xml_write(format!("Failed to write text: {}", e)))
    }

    /// Replay a recorded subtree
    pub fn write_tokens(&mut self, tokens: &UnknownTokens) -> Result<()> {
        let auto_close = std::mem::replace(&mut self.auto_close, false);
        for token in tokens.tokens() {
            match token {
                Token::Start(start) => self.write_start(&start.name, &start.attrs)?,
                Token::End(_) => self.write_end()?,
                Token::Text(text) => self.write_text(text)?,
            }
        }
        self.auto_close = auto_close;
        Ok(())
    }

    /// Flush held-back output and check every element was closed
    pub fn finish(mut self) -> Result<()> {
        self.flush_pending()?;
        if let Some(open) = self.open.last() {
            return Err(Error::xml_write(format!("element {} was never closed", open)));
        }
        Ok(())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(elem) = self.pending.take() {
            self.writer
                .write_event(Event::Start(elem))
                .map_err(|e| Error::xml_write(format!("Failed to write start tag: {}", e)))?;
        }
        Ok(())
    }

    fn prefix_for(&self, namespace: &str, is_attr: bool) -> Option<&str> {
        let mut default_shadowed = false;
        for scope in self.scopes.iter().rev() {
            for (uri, prefix) in scope.iter().rev() {
                if prefix.is_empty() {
                    if uri == namespace && !default_shadowed && !is_attr {
                        return Some("");
                    }
                    default_shadowed = true;
                } else if uri == namespace {
                    return Some(prefix);
                }
            }
        }
        None
    }

    fn prefix_in_use(&self, prefix: &str) -> bool {
        self.scopes
            .iter()
            .flat_map(|scope| scope.iter())
            .any(|(_, p)| p == prefix)
    }

    fn qualify(
        &mut self,
        name: &XmlName,
        is_attr: bool,
        declarations: &mut Vec<(String, String)>,
    ) -> String {
        if name.space.is_empty() {
            return name.local.clone();
        }
        if name.space == XMLNS_NAMESPACE {
            return format!("xmlns:{}", name.local);
        }
        if name.space == XML_NAMESPACE {
            return format!("xml:{}", name.local);
        }
        match self.prefix_for(&name.space, is_attr) {
            Some("") => name.local.clone(),
            Some(prefix) => format!("{}:{}", prefix, name.local),
            None => {
                let prefix = loop {
                    let candidate = format!("ns{}", self.generated);
                    self.generated += 1;
                    if !self.prefix_in_use(&candidate) {
                        break candidate;
                    }
                };
                if let Some(scope) = self.scopes.last_mut() {
                    scope.push((name.space.clone(), prefix.clone()));
                }
                declarations.push((format!("xmlns:{}", prefix), name.space.clone()));
                format!("{}:{}", prefix, name.local)
            }
        }
    }
}
