//! Error types for 3MF and STL codecs
//!
//! Fatal failures are reported through [`Error`]. Findings that do not stop a
//! decode (attribute parse failures, broken references, mesh defects) are
//! [`Diagnostic`](crate::diagnostic::Diagnostic) values and only become an
//! [`Error::Diagnostics`] when a strict decode is requested.
//!
//! # Error Codes
//!
//! Error codes follow the pattern: `E<category><number>`
//!
//! Categories:
//! - **E1xxx**: I/O and archive errors
//! - **E2xxx**: XML parsing and structure errors
//! - **E3xxx**: Model and STL content errors
//! - **E4xxx**: Unsupported features and interrupted operations
//!
//! ## Common Error Codes
//!
//! - `E1001`: I/O error reading or writing
//! - `E1002`: ZIP archive format error
//! - `E1003`: Missing required file in archive
//! - `E2001`: XML parsing error
//! - `E2002`: XML attribute error
//! - `E2003`: Invalid XML structure
//! - `E2004`: Invalid 3MF format
//! - `E2005`: XML writing error
//! - `E3001`: Strict decode produced diagnostics
//! - `E3003`: Malformed STL data
//! - `E4002`: Required extension not supported
//! - `E4003`: Operation cancelled

use std::io;
use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Result type for 3MF operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort the current decode, encode or package operation
#[derive(Error, Debug)]
pub enum Error {
    /// IO error occurred while reading or writing
    ///
    /// **Error Code**: E1001
    ///
    /// **Common Causes**:
    /// - File not found
    /// - Insufficient permissions
    /// - Truncated stream
    #[error("[E1001] I/O error: {0}")]
    Io(#[from] io::Error),

    /// ZIP archive error
    ///
    /// **Error Code**: E1002
    ///
    /// **Common Causes**:
    /// - Corrupted ZIP file
    /// - Unsupported compression method
    #[error("[E1002] ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Missing required file in the 3MF archive
    ///
    /// **Error Code**: E1003
    ///
    /// **Common Causes**:
    /// - Incomplete 3MF package
    /// - Relationship targets a part that is not in the archive
    #[error("[E1003] Missing required file: {0}")]
    MissingFile(String),

    /// XML parsing error
    ///
    /// **Error Code**: E2001
    ///
    /// **Common Causes**:
    /// - Malformed XML syntax
    /// - Unclosed tags
    #[error("[E2001] XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    ///
    /// **Error Code**: E2002
    ///
    /// **Common Causes**:
    /// - Duplicate attribute
    /// - Attribute without a quoted value
    #[error("[E2002] XML attribute error: {0}")]
    XmlAttr(String),

    /// Invalid XML structure
    ///
    /// **Error Code**: E2003
    ///
    /// **Common Causes**:
    /// - Document type declarations (rejected)
    /// - Non UTF-8 names or values
    /// - Unbalanced end tags
    #[error("[E2003] Invalid XML structure: {0}")]
    InvalidXml(String),

    /// Invalid 3MF format
    ///
    /// **Error Code**: E2004
    ///
    /// **Common Causes**:
    /// - Non-compliant OPC structure
    /// - Missing 3D model relationship
    #[error("[E2004] Invalid 3MF format: {0}")]
    InvalidFormat(String),

    /// XML writing error
    ///
    /// **Error Code**: E2005
    #[error("[E2005] XML writing error: {0}")]
    XmlWrite(String),

    /// A strict decode finished with a non-empty diagnostic list
    ///
    /// **Error Code**: E3001
    ///
    /// The full list is carried so callers can still inspect every finding.
    #[error("[E3001] Invalid model: {}", summarize(.0))]
    Diagnostics(Vec<Diagnostic>),

    /// Malformed STL data
    ///
    /// **Error Code**: E3003
    ///
    /// **Common Causes**:
    /// - Binary STL shorter than its declared face count
    /// - ASCII `vertex` line with non-numeric coordinates
    #[error("[E3003] Invalid STL: {0}")]
    InvalidStl(String),

    /// Required extension not supported
    ///
    /// **Error Code**: E4002
    #[error("[E4002] Required extension not supported: {0}")]
    UnsupportedExtension(String),

    /// The operation observed a tripped cancellation token
    ///
    /// **Error Code**: E4003
    #[error("[E4003] Operation cancelled")]
    Cancelled,
}

fn summarize(diagnostics: &[Diagnostic]) -> String {
    match diagnostics {
        [] => "no diagnostics".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{} (and {} more)", first, rest.len()),
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(format!("Attribute parsing failed: {}", err))
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Error::InvalidXml(format!("Invalid UTF-8: {}", err))
    }
}

impl Error {
    /// Create an XmlWrite error
    pub fn xml_write(message: String) -> Self {
        Error::XmlWrite(message)
    }

    /// Create an InvalidFormat error with context about what structure is invalid
    ///
    /// # Arguments
    /// * `context` - What part of the format is invalid (e.g., "OPC structure")
    /// * `message` - Description of the error
    pub fn invalid_format_context(context: &str, message: &str) -> Self {
        Error::InvalidFormat(format!("{}: {}", context, message))
    }

    /// The diagnostics carried by a strict decode failure, if any
    pub fn diagnostics(&self) -> Option<&[Diagnostic]> {
        match self {
            Error::Diagnostics(list) => Some(list),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{DiagnosticKind, DiagnosticPath};

    #[test]
    fn test_error_codes_in_messages() {
        let err = Error::MissingFile("3D/3dmodel.model".to_string());
        assert!(err.to_string().starts_with("[E1003]"));

        let err = Error::InvalidStl("truncated".to_string());
        assert_eq!(err.to_string(), "[E3003] Invalid STL: truncated");

        assert_eq!(Error::Cancelled.to_string(), "[E4003] Operation cancelled");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("[E1001]"));
    }

    #[test]
    fn test_diagnostics_summary() {
        let path = DiagnosticPath::new("/3D/3dmodel.model").child("Build");
        let first = Diagnostic::new(&path, DiagnosticKind::MissingResource { id: 9 });
        let second = Diagnostic::new(&path, DiagnosticKind::OtherItem);
        let err = Error::Diagnostics(vec![first.clone(), second]);

        let message = err.to_string();
        assert!(message.starts_with("[E3001]"));
        assert!(message.contains(&first.to_string()));
        assert!(message.contains("and 1 more"));
        assert_eq!(err.diagnostics().map(|d| d.len()), Some(2));
    }
}
