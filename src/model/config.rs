//! Decoder and encoder configuration

use std::sync::Arc;

use crate::extension::{ExtensionHandler, ExtensionRegistry, global_registry};

/// Configuration for decoding 3MF model parts
///
/// ```
/// use threemf::model::ParserConfig;
///
/// let config = ParserConfig::new().strict(false);
/// assert!(!config.is_strict());
/// ```
#[derive(Clone)]
pub struct ParserConfig {
    strict: bool,
    registry: ExtensionRegistry,
}

impl ParserConfig {
    /// Strict decoding against a snapshot of the process-wide registry
    pub fn new() -> Self {
        Self {
            strict: true,
            registry: global_registry(),
        }
    }

    /// Treat a non-empty diagnostic list as an error (the default), or return
    /// the diagnostics as warnings next to the model
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Replace the registry consulted while decoding
    pub fn with_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Add or replace one extension handler for this decode only
    pub fn with_extension_handler(mut self, handler: Arc<dyn ExtensionHandler>) -> Self {
        self.registry.register(handler);
        self
    }

    /// Whether strict mode is on
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Registry consulted while decoding
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for encoding 3MF model parts
#[derive(Clone)]
pub struct WriterConfig {
    float_precision: Option<usize>,
    indent: bool,
    registry: ExtensionRegistry,
}

impl WriterConfig {
    /// Shortest round-trip float formatting, two-space indentation
    pub fn new() -> Self {
        Self {
            float_precision: None,
            indent: true,
            registry: global_registry(),
        }
    }

    /// Number of fractional digits used for every float, `None` for the
    /// shortest representation that parses back to the same value
    pub fn float_precision(mut self, precision: Option<usize>) -> Self {
        self.float_precision = precision;
        self
    }

    /// Pretty-print with two-space indentation
    pub fn indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Replace the registry providing extension marshallers
    pub fn with_registry(mut self, registry: ExtensionRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Configured float precision
    pub fn precision(&self) -> Option<usize> {
        self.float_precision
    }

    /// Whether output is indented
    pub fn is_indented(&self) -> bool {
        self.indent
    }

    /// Registry providing extension marshallers
    pub fn registry(&self) -> &ExtensionRegistry {
        &self.registry
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self::new()
    }
}
