//! Extension trait system for pluggable 3MF extension architecture
//!
//! An extension is a namespace-scoped set of elements and attributes. Each one
//! is implemented as an [`ExtensionHandler`] that contributes element decoders,
//! attribute decoders, marshallers and validation rules; the core codec only
//! talks to extensions through this trait.
//!
//! Handlers live in an [`ExtensionRegistry`]. A process-wide registry seeded
//! with the built-in extensions is available through [`global_registry`];
//! [`register_extension`] adds handlers to it, normally once at startup.

use std::fmt;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::codec::{ElementDecoder, XmlAttr, XmlEncoder};
use crate::diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPath};
use crate::error::Result;
use crate::model::{Asset, ExtensionAttr, ExtensionAttrs, MeshExtension, Model, Object};

/// Built-in extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Extension {
    /// Core 3MF specification
    Core,
    /// Beam Lattice Extension
    BeamLattice,
    /// Slice Extension
    Slice,
    /// Production Extension
    Production,
    /// Boolean Operations Extension
    BooleanOperations,
}

impl Extension {
    /// Get the namespace URI for this extension
    pub const fn namespace(&self) -> &'static str {
        match self {
            Extension::Core => "http://schemas.microsoft.com/3dmanufacturing/core/2015/02",
            Extension::BeamLattice => {
                "http://schemas.microsoft.com/3dmanufacturing/beamlattice/2017/02"
            }
            Extension::Slice => "http://schemas.microsoft.com/3dmanufacturing/slice/2015/07",
            Extension::Production => {
                "http://schemas.microsoft.com/3dmanufacturing/production/2015/06"
            }
            Extension::BooleanOperations => {
                "http://schemas.3mf.io/3dmanufacturing/booleanoperations/2023/07"
            }
        }
    }

    /// Get extension from namespace URI
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        [
            Extension::Core,
            Extension::BeamLattice,
            Extension::Slice,
            Extension::Production,
            Extension::BooleanOperations,
        ]
        .into_iter()
        .find(|ext| ext.namespace() == namespace)
    }

    /// Get a human-readable name for this extension
    pub const fn name(&self) -> &'static str {
        match self {
            Extension::Core => "Core",
            Extension::BeamLattice => "BeamLattice",
            Extension::Slice => "Slice",
            Extension::Production => "Production",
            Extension::BooleanOperations => "BooleanOperations",
        }
    }

    /// Conventional namespace prefix
    pub const fn default_prefix(&self) -> &'static str {
        match self {
            Extension::Core => "",
            Extension::BeamLattice => "b",
            Extension::Slice => "s",
            Extension::Production => "p",
            Extension::BooleanOperations => "bo",
        }
    }
}

/// Core element carrying an extension attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOwner {
    /// `<model>`
    Model,
    /// `<build>`
    Build,
    /// `<item>`
    Item,
    /// `<object>`
    Object,
    /// `<components>`
    Components,
    /// `<component>`
    Component,
}

/// Handler trait for 3MF extensions
///
/// Only the identity methods are required; every hook has a no-op default.
///
/// # Example
///
/// ```
/// use threemf::extension::ExtensionHandler;
///
/// struct MyExtensionHandler;
///
/// impl ExtensionHandler for MyExtensionHandler {
///     fn namespace(&self) -> &'static str {
///         "http://example.com/my-extension/2024/01"
///     }
///
///     fn name(&self) -> &'static str {
///         "MyExtension"
///     }
///
///     fn default_prefix(&self) -> &'static str {
///         "my"
///     }
/// }
/// ```
pub trait ExtensionHandler: Send + Sync {
    /// Returns the namespace URI for this extension
    fn namespace(&self) -> &'static str;

    /// Returns a human-readable name for this extension
    fn name(&self) -> &'static str;

    /// Prefix used when the encoder has to declare the namespace itself
    fn default_prefix(&self) -> &'static str;

    /// Whether an auto-declared namespace is listed in `requiredextensions`
    fn required_when_used(&self) -> bool {
        false
    }

    /// Check if the extension is present in the model
    ///
    /// The encoder declares the namespace of every handler that reports true.
    fn is_used_in_model(&self, _model: &Model) -> bool {
        false
    }

    /// Decoder for an extension element found directly under `<resources>`
    ///
    /// `index` is the position the decoded asset will take in
    /// [`Resources::assets`](crate::model::Resources::assets).
    fn new_resources_decoder(&self, _local: &str, _index: usize) -> Option<Box<dyn ElementDecoder>> {
        None
    }

    /// Decoder for an extension element found under `<mesh>`
    fn new_mesh_decoder(&self, _local: &str) -> Option<Box<dyn ElementDecoder>> {
        None
    }

    /// Decode one attribute in this extension's namespace found on a core element
    ///
    /// The default keeps the raw attribute so it survives a round trip.
    fn decode_attribute(
        &self,
        _owner: AttrOwner,
        attrs: &mut ExtensionAttrs,
        attr: &XmlAttr,
    ) -> std::result::Result<(), DiagnosticKind> {
        attrs.push_other(attr.clone());
        Ok(())
    }

    /// Write the attributes of one side-car owned by this extension
    fn encode_attribute(&self, attr: &ExtensionAttr, out: &mut Vec<XmlAttr>) {
        if let ExtensionAttr::Other { attrs, .. } = attr {
            out.extend(attrs.iter().cloned());
        }
    }

    /// Write an asset owned by this extension; returns false if the asset is not one of its kinds
    fn encode_asset(&self, _asset: &Asset, _encoder: &mut XmlEncoder<'_>) -> Result<bool> {
        Ok(false)
    }

    /// Write a mesh payload owned by this extension; returns false if it is not one of its kinds
    fn encode_mesh_extension(
        &self,
        _extension: &MeshExtension,
        _encoder: &mut XmlEncoder<'_>,
    ) -> Result<bool> {
        Ok(false)
    }

    /// Model-wide rules, run once per validation
    fn validate_model(&self, _model: &Model, _diagnostics: &mut Vec<Diagnostic>) {}

    /// Rules for one asset of the part at `part`
    fn validate_asset(
        &self,
        _model: &Model,
        _part: &str,
        _path: &DiagnosticPath,
        _asset: &Asset,
        _diagnostics: &mut Vec<Diagnostic>,
    ) {
    }

    /// Rules for one object of the part at `part`
    fn validate_object(
        &self,
        _model: &Model,
        _part: &str,
        _path: &DiagnosticPath,
        _object: &Object,
        _diagnostics: &mut Vec<Diagnostic>,
    ) {
    }
}

/// Registry for extension handlers, keyed by namespace URI
///
/// Handlers are kept in registration order so iteration is deterministic.
///
/// ```
/// use threemf::extension::ExtensionRegistry;
/// use threemf::extensions::BeamLatticeExtensionHandler;
/// use std::sync::Arc;
///
/// let mut registry = ExtensionRegistry::new();
/// registry.register(Arc::new(BeamLatticeExtensionHandler));
/// assert_eq!(registry.len(), 1);
/// ```
#[derive(Clone, Default)]
pub struct ExtensionRegistry {
    handlers: Vec<Arc<dyn ExtensionHandler>>,
}

impl ExtensionRegistry {
    /// Create a new empty extension registry
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Register an extension handler
    ///
    /// A handler for an already registered namespace replaces the old one in place.
    pub fn register(&mut self, handler: Arc<dyn ExtensionHandler>) {
        match self
            .handlers
            .iter_mut()
            .find(|h| h.namespace() == handler.namespace())
        {
            Some(slot) => *slot = handler,
            None => self.handlers.push(handler),
        }
    }

    /// Handler for `namespace`
    pub fn get(&self, namespace: &str) -> Option<&dyn ExtensionHandler> {
        self.handlers
            .iter()
            .find(|h| h.namespace() == namespace)
            .map(|h| h.as_ref())
    }

    /// Returns true if a handler for `namespace` is registered
    pub fn contains(&self, namespace: &str) -> bool {
        self.get(namespace).is_some()
    }

    /// All handlers in registration order
    pub fn handlers(&self) -> &[Arc<dyn ExtensionHandler>] {
        &self.handlers
    }

    /// Number of registered handlers
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no handler is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.handlers.iter().map(|h| h.namespace()))
            .finish()
    }
}

static GLOBAL_REGISTRY: LazyLock<RwLock<ExtensionRegistry>> =
    LazyLock::new(|| RwLock::new(crate::extensions::create_default_registry()));

/// Add a handler to the process-wide registry
///
/// Meant to be called during startup, before models are decoded.
pub fn register_extension(handler: Arc<dyn ExtensionHandler>) {
    let mut registry = GLOBAL_REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    tracing::debug!(namespace = handler.namespace(), "registering extension");
    registry.register(handler);
}

/// Snapshot of the process-wide registry
pub fn global_registry() -> ExtensionRegistry {
    GLOBAL_REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
