//! Namespace-resolved XML names, attributes and tokens

use std::fmt;

/// Core 3MF namespace
pub const CORE_NAMESPACE: &str = "http://schemas.microsoft.com/3dmanufacturing/core/2015/02";

/// Namespace bound to the reserved `xml` prefix
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Namespace of `xmlns:prefix` declarations
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// An element or attribute name with its prefix resolved to a namespace URI
///
/// Unprefixed attributes have an empty `space`. Namespace declarations keep
/// their form: `xmlns:p` is `(XMLNS_NAMESPACE, "p")` and a default
/// declaration `xmlns` is `("", "xmlns")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct XmlName {
    /// Namespace URI
    pub space: String,
    /// Local name
    pub local: String,
}

impl XmlName {
    /// Create a name
    pub fn new(space: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            space: space.into(),
            local: local.into(),
        }
    }

    /// An element in the core namespace
    pub fn core(local: &str) -> Self {
        Self::new(CORE_NAMESPACE, local)
    }

    /// A name without namespace
    pub fn local(local: impl Into<String>) -> Self {
        Self::new("", local)
    }

    /// Returns true if this name is in `space` with local part `local`
    pub fn is(&self, space: &str, local: &str) -> bool {
        self.space == space && self.local == local
    }

    /// Returns true for `xmlns` and `xmlns:*` attributes
    pub fn is_namespace_declaration(&self) -> bool {
        self.space == XMLNS_NAMESPACE || (self.space.is_empty() && self.local == "xmlns")
    }
}

impl fmt::Display for XmlName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.space.is_empty() {
            f.write_str(&self.local)
        } else {
            write!(f, "{{{}}}{}", self.space, self.local)
        }
    }
}

/// A decoded attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttr {
    /// Resolved name
    pub name: XmlName,
    /// Unescaped value
    pub value: String,
}

impl XmlAttr {
    /// An attribute without namespace
    pub fn new(local: &str, value: impl Into<String>) -> Self {
        Self {
            name: XmlName::local(local),
            value: value.into(),
        }
    }

    /// An attribute in `space`
    pub fn namespaced(space: &str, local: &str, value: impl Into<String>) -> Self {
        Self {
            name: XmlName::new(space, local),
            value: value.into(),
        }
    }
}

/// A start tag with its attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartElement {
    /// Element name
    pub name: XmlName,
    /// Attributes in document order, namespace declarations included
    pub attrs: Vec<XmlAttr>,
}

impl StartElement {
    /// Value of the unprefixed attribute `local`, if present
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.space.is_empty() && a.name.local == local)
            .map(|a| a.value.as_str())
    }
}

/// One recorded XML token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A start tag
    Start(StartElement),
    /// An end tag
    End(XmlName),
    /// Character data, already unescaped
    Text(String),
}

/// A verbatim recording of one element subtree the decoder did not understand
///
/// The first token is always the subtree's start tag and the last its end tag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UnknownTokens {
    tokens: Vec<Token>,
}

impl UnknownTokens {
    /// Create an empty recording
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a token
    pub fn push(&mut self, token: Token) {
        self.tokens.push(token);
    }

    /// Recorded tokens in document order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Name of the recorded root element
    pub fn name(&self) -> Option<&XmlName> {
        match self.tokens.first() {
            Some(Token::Start(start)) => Some(&start.name),
            _ => None,
        }
    }

    /// Value of an unprefixed attribute on the recorded root element
    pub fn attr(&self, local: &str) -> Option<&str> {
        match self.tokens.first() {
            Some(Token::Start(start)) => start.attr(local),
            _ => None,
        }
    }
}

impl From<Vec<Token>> for UnknownTokens {
    fn from(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }
}
