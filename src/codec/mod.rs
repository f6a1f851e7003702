//! XML codec: streaming decoder engine, namespace-aware encoder and the
//! token types shared by both

mod decoder;
mod encoder;
mod xml;

pub use decoder::{Child, DecodeContext, ElementDecoder, Node, decode};
pub use encoder::XmlEncoder;
pub use xml::{
    CORE_NAMESPACE, StartElement, Token, UnknownTokens, XML_NAMESPACE, XMLNS_NAMESPACE, XmlAttr,
    XmlName,
};
