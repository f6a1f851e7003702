//! # threemf
//!
//! A pure Rust codec for 3MF (3D Manufacturing Format) models.
//!
//! 3MF files are ZIP-based containers following the Open Packaging
//! Conventions (OPC) standard and holding XML model parts. This crate decodes
//! model parts into an in-memory [`Model`], encodes them back, validates them
//! against the core rules and the rules of every registered extension, and
//! imports and exports STL.
//!
//! ## Features
//!
//! - Pure Rust implementation with no unsafe code
//! - Streaming XML decoder; unknown elements and attributes survive a round trip
//! - Pluggable extensions: beam lattice, slice, production and boolean
//!   operations are built in, more can be registered at startup
//! - Path-annotated diagnostics instead of fail-fast errors
//! - ASCII and binary STL with vertex deduplication and cancellation
//!
//! ## Example
//!
//! ```no_run
//! use threemf::Model;
//! use std::fs::File;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let file = File::open("model.3mf")?;
//! let model = Model::from_reader(file)?;
//!
//! println!("Model contains {} objects", model.resources.objects.len());
//! for diagnostic in model.validate() {
//!     println!("{}", diagnostic);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cancellation;
pub mod codec;
pub mod diagnostic;
pub mod error;
pub mod extension;
pub mod extensions;
pub mod geometry;
pub mod model;
pub mod opc;
pub mod parser;
pub mod stl;
pub mod validator;
pub mod writer;

pub use cancellation::CancellationToken;
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use error::{Error, Result};
pub use extension::{Extension, ExtensionHandler, ExtensionRegistry, register_extension};
pub use model::{
    Build, Component, Item, Mesh, MeshBuilder, Metadata, Model, Object, ObjectType, ParserConfig,
    Resources, Triangle, WriterConfig,
};
pub use parser::ParseOutcome;
pub use stl::{StlDecoder, StlEncoder, StlFormat};

use std::io::{Read, Seek, Write};

impl Model {
    /// Read a 3MF package with the default, strict configuration
    ///
    /// Any diagnostic found while decoding fails the call with
    /// [`Error::Diagnostics`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf::Model;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let file = File::open("model.3mf")?;
    /// let model = Model::from_reader(file)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        Self::from_reader_with_config(reader, &ParserConfig::default()).map(|outcome| outcome.model)
    }

    /// Read a 3MF package with a custom configuration
    ///
    /// In non-strict mode the diagnostics of every part come back as
    /// [`ParseOutcome::warnings`].
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf::{Model, ParserConfig};
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let file = File::open("model.3mf")?;
    /// let outcome = Model::from_reader_with_config(file, &ParserConfig::new().strict(false))?;
    /// for warning in &outcome.warnings {
    ///     eprintln!("{}", warning);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader_with_config<R: Read + Seek>(
        reader: R,
        config: &ParserConfig,
    ) -> Result<ParseOutcome> {
        opc::read_package(reader, config)
    }

    /// Write a 3MF package with the default configuration
    ///
    /// Returns the writer after finishing the ZIP archive.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf::Model;
    /// use std::fs::File;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let model = Model::new();
    /// let file = File::create("output.3mf")?;
    /// model.to_writer(file)?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn to_writer<W: Write + Seek>(&self, writer: W) -> Result<W> {
        self.to_writer_with_config(writer, &WriterConfig::default())
    }

    /// Write a 3MF package with a custom configuration
    pub fn to_writer_with_config<W: Write + Seek>(&self, writer: W, config: &WriterConfig) -> Result<W> {
        opc::write_package(self, writer, config)
    }

    /// Write a 3MF package to a file path
    ///
    /// # Example
    ///
    /// ```no_run
    /// use threemf::Model;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let model = Model::new();
    /// model.write_to_file("output.3mf")?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn write_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file)?;
        Ok(())
    }
}
