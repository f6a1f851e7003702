//! Typed extension side-cars on core elements
//!
//! Extension attributes found on core elements (`p:UUID` on an item,
//! `s:slicestackid` on an object, ...) are stored next to the element as one
//! [`ExtensionAttr`] per extension namespace.

use super::boolean_ops::BooleanOperationAttr;
use super::production::ProductionAttr;
use super::slice::SliceStackInfo;
use crate::codec::XmlAttr;
use crate::extension::Extension;

/// One extension's attributes on a core element
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionAttr {
    /// Production `UUID` / `path`
    Production(ProductionAttr),
    /// Slice `slicestackid` / `meshresolution`
    SliceStack(SliceStackInfo),
    /// Boolean `association` / `operation`
    BooleanOperation(BooleanOperationAttr),
    /// Raw attributes owned by a handler without a typed side-car
    Other {
        /// Namespace URI of the owning extension
        namespace: String,
        /// Attributes in document order
        attrs: Vec<XmlAttr>,
    },
}

impl ExtensionAttr {
    /// Namespace URI of the owning extension
    pub fn namespace(&self) -> &str {
        match self {
            ExtensionAttr::Production(_) => Extension::Production.namespace(),
            ExtensionAttr::SliceStack(_) => Extension::Slice.namespace(),
            ExtensionAttr::BooleanOperation(_) => Extension::BooleanOperations.namespace(),
            ExtensionAttr::Other { namespace, .. } => namespace,
        }
    }
}

/// A typed side-car that can be looked up in [`ExtensionAttrs`]
pub trait ExtensionAttrKind: Default + Sized {
    /// Namespace the side-car is keyed by
    fn namespace() -> &'static str;
    /// Borrow this kind out of the union
    fn from_attr(attr: &ExtensionAttr) -> Option<&Self>;
    /// Mutably borrow this kind out of the union
    fn from_attr_mut(attr: &mut ExtensionAttr) -> Option<&mut Self>;
    /// Wrap into the union
    fn into_attr(self) -> ExtensionAttr;
}

macro_rules! attr_kind {
    ($ty:ty, $variant:ident, $ext:expr) => {
        impl ExtensionAttrKind for $ty {
            fn namespace() -> &'static str {
                $ext.namespace()
            }

            fn from_attr(attr: &ExtensionAttr) -> Option<&Self> {
                match attr {
                    ExtensionAttr::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn from_attr_mut(attr: &mut ExtensionAttr) -> Option<&mut Self> {
                match attr {
                    ExtensionAttr::$variant(value) => Some(value),
                    _ => None,
                }
            }

            fn into_attr(self) -> ExtensionAttr {
                ExtensionAttr::$variant(self)
            }
        }
    };
}

attr_kind!(ProductionAttr, Production, Extension::Production);
attr_kind!(SliceStackInfo, SliceStack, Extension::Slice);
attr_kind!(BooleanOperationAttr, BooleanOperation, Extension::BooleanOperations);

/// Extension side-cars of one element, at most one per namespace
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtensionAttrs {
    entries: Vec<ExtensionAttr>,
}

impl ExtensionAttrs {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Typed side-car lookup
    pub fn get<T: ExtensionAttrKind>(&self) -> Option<&T> {
        self.by_namespace(T::namespace()).and_then(T::from_attr)
    }

    /// Mutable typed side-car lookup
    pub fn get_mut<T: ExtensionAttrKind>(&mut self) -> Option<&mut T> {
        self.entries
            .iter_mut()
            .find(|entry| entry.namespace() == T::namespace())
            .and_then(T::from_attr_mut)
    }

    /// Update the side-car of kind `T`, creating a default one first if absent
    pub fn update<T: ExtensionAttrKind>(&mut self, f: impl FnOnce(&mut T)) {
        if let Some(existing) = self.get_mut::<T>() {
            f(existing);
            return;
        }
        let mut value = T::default();
        f(&mut value);
        self.insert(value.into_attr());
    }

    /// Insert a side-car, replacing any entry of the same namespace
    pub fn insert(&mut self, attr: ExtensionAttr) {
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.namespace() == attr.namespace())
        {
            Some(slot) => *slot = attr,
            None => self.entries.push(attr),
        }
    }

    /// Raw side-car lookup by namespace
    pub fn by_namespace(&self, namespace: &str) -> Option<&ExtensionAttr> {
        self.entries.iter().find(|entry| entry.namespace() == namespace)
    }

    /// Append a raw attribute to the `Other` side-car of its namespace
    pub fn push_other(&mut self, attr: XmlAttr) {
        let namespace = attr.name.space.clone();
        for entry in &mut self.entries {
            if let ExtensionAttr::Other {
                namespace: ns,
                attrs,
            } = entry
            {
                if *ns == namespace {
                    attrs.push(attr);
                    return;
                }
            }
        }
        self.entries.push(ExtensionAttr::Other {
            namespace,
            attrs: vec![attr],
        });
    }

    /// Remove the side-car of `namespace`
    pub fn remove(&mut self, namespace: &str) -> Option<ExtensionAttr> {
        let pos = self
            .entries
            .iter()
            .position(|entry| entry.namespace() == namespace)?;
        Some(self.entries.remove(pos))
    }

    /// Side-cars in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &ExtensionAttr> {
        self.entries.iter()
    }

    /// Number of side-cars
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no side-cars
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
