//! Core 3MF model types

use std::collections::BTreeMap;

use super::attrs::ExtensionAttrs;
use super::material::BaseMaterials;
use super::mesh::Mesh;
use super::production::ProductionAttr;
use super::slice::SliceStack;
use crate::codec::{CORE_NAMESPACE, UnknownTokens, XmlAttr, XmlName};
use crate::error::Error;
use crate::extension::Extension;
use crate::geometry::Matrix;

/// Part path of the root model when none is set explicitly
pub const DEFAULT_MODEL_PATH: &str = "/3D/3dmodel.model";

/// Unit of all coordinates in a model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    /// Micrometer (`micron`)
    Micrometer,
    /// Millimeter
    #[default]
    Millimeter,
    /// Centimeter
    Centimeter,
    /// Inch
    Inch,
    /// Foot
    Foot,
    /// Meter
    Meter,
}

impl Units {
    /// XML value
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Micrometer => "micron",
            Units::Millimeter => "millimeter",
            Units::Centimeter => "centimeter",
            Units::Inch => "inch",
            Units::Foot => "foot",
            Units::Meter => "meter",
        }
    }
}

impl std::str::FromStr for Units {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "micron" => Ok(Units::Micrometer),
            "millimeter" => Ok(Units::Millimeter),
            "centimeter" => Ok(Units::Centimeter),
            "inch" => Ok(Units::Inch),
            "foot" => Ok(Units::Foot),
            "meter" => Ok(Units::Meter),
            _ => Err(Error::InvalidFormat(format!("Invalid unit '{}'", s))),
        }
    }
}

/// Type of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectType {
    /// A printable model
    #[default]
    Model,
    /// Support that is part of the solid
    SolidSupport,
    /// Support structure
    Support,
    /// Surface (non-solid)
    Surface,
    /// Other, never printed
    Other,
}

impl ObjectType {
    /// XML value
    pub fn as_str(&self) -> &'static str {
        match self {
            ObjectType::Model => "model",
            ObjectType::SolidSupport => "solidsupport",
            ObjectType::Support => "support",
            ObjectType::Surface => "surface",
            ObjectType::Other => "other",
        }
    }

    /// Returns true for `model` and `solidsupport`, the types that must be closed solids
    pub fn is_solid(&self) -> bool {
        matches!(self, ObjectType::Model | ObjectType::SolidSupport)
    }
}

impl std::str::FromStr for ObjectType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "model" => Ok(ObjectType::Model),
            "solidsupport" => Ok(ObjectType::SolidSupport),
            "support" => Ok(ObjectType::Support),
            "surface" => Ok(ObjectType::Surface),
            "other" => Ok(ObjectType::Other),
            _ => Err(Error::InvalidFormat(format!("Invalid object type '{}'", s))),
        }
    }
}

/// A namespace declared on `<model>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionDecl {
    /// Namespace URI
    pub namespace: String,
    /// Prefix bound to the namespace
    pub local_name: String,
    /// Listed in `requiredextensions`
    pub is_required: bool,
}

impl ExtensionDecl {
    /// Create a declaration
    pub fn new(namespace: impl Into<String>, local_name: impl Into<String>, is_required: bool) -> Self {
        Self {
            namespace: namespace.into(),
            local_name: local_name.into(),
            is_required,
        }
    }
}

/// A metadata entry
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// Name; a non-empty `space` means a namespaced name
    pub name: XmlName,
    /// Must be kept when the model is edited
    pub preserve: bool,
    /// XML schema type of the value
    pub value_type: Option<String>,
    /// Text value
    pub value: String,
    /// Attributes the core schema does not define
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

impl Metadata {
    /// A metadata entry with a non-namespaced name
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: XmlName::local(name),
            value: value.into(),
            ..Default::default()
        }
    }
}

/// A reference to another object with an optional transform
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    /// Target object id
    pub object_id: u32,
    /// Placement of the target
    pub transform: Option<Matrix>,
    /// Extension side-cars
    pub ext_attrs: ExtensionAttrs,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
}

impl Component {
    /// Create a component referencing `object_id`
    pub fn new(object_id: u32) -> Self {
        Self {
            object_id,
            ..Default::default()
        }
    }

    /// Part path holding the target object, when it lives in another part
    pub fn object_path(&self) -> Option<&str> {
        self.ext_attrs
            .get::<ProductionAttr>()
            .and_then(|p| p.path.as_deref())
    }
}

/// A component group
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Components {
    /// Components in document order
    pub components: Vec<Component>,
    /// Extension side-cars
    pub ext_attrs: ExtensionAttrs,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

/// An object resource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Object {
    /// Resource id
    pub id: u32,
    /// Human-readable name
    pub name: Option<String>,
    /// Object type
    pub object_type: ObjectType,
    /// Property group id
    pub pid: Option<u32>,
    /// Property index inside the group
    pub pindex: Option<u32>,
    /// Thumbnail part path
    pub thumbnail: Option<String>,
    /// Part number
    pub part_number: Option<String>,
    /// Geometry; exclusive with `components`
    pub mesh: Option<Mesh>,
    /// Assembly; exclusive with `mesh`
    pub components: Option<Components>,
    /// `<metadatagroup>` entries
    pub metadata: Vec<Metadata>,
    /// Extension side-cars
    pub ext_attrs: ExtensionAttrs,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

impl Object {
    /// An object with the given id and no content
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// A mesh object
    pub fn with_mesh(id: u32, mesh: Mesh) -> Self {
        Self {
            id,
            mesh: Some(mesh),
            ..Default::default()
        }
    }

    /// A component object
    pub fn with_components(id: u32, components: Vec<Component>) -> Self {
        Self {
            id,
            components: Some(Components {
                components,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// A non-object resource
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    /// `<basematerials>`
    BaseMaterials(BaseMaterials),
    /// `<s:slicestack>`
    SliceStack(SliceStack),
    /// An element from an unregistered namespace
    Unknown(UnknownTokens),
}

impl Asset {
    /// Resource id; for unknown assets the value of their `id` attribute
    pub fn id(&self) -> Option<u32> {
        match self {
            Asset::BaseMaterials(group) => Some(group.id),
            Asset::SliceStack(stack) => Some(stack.id),
            Asset::Unknown(tokens) => tokens.attr("id").and_then(|v| v.parse().ok()),
        }
    }

    /// Namespace of the asset element
    pub fn namespace(&self) -> &str {
        match self {
            Asset::BaseMaterials(_) => CORE_NAMESPACE,
            Asset::SliceStack(_) => Extension::Slice.namespace(),
            Asset::Unknown(tokens) => tokens.name().map_or("", |name| name.space.as_str()),
        }
    }
}

/// Resources of one model part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Resources {
    /// Assets in document order
    pub assets: Vec<Asset>,
    /// Objects in document order
    pub objects: Vec<Object>,
}

impl Resources {
    /// Find an object by id
    pub fn find_object(&self, id: u32) -> Option<&Object> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Find an asset by id
    pub fn find_asset(&self, id: u32) -> Option<&Asset> {
        self.assets.iter().find(|a| a.id() == Some(id))
    }

    /// Smallest id greater than every id used in this part
    ///
    /// `None` once `u32::MAX` is taken.
    pub fn next_id(&self) -> Option<u32> {
        let max_object = self.objects.iter().map(|o| o.id).max().unwrap_or(0);
        let max_asset = self.assets.iter().filter_map(Asset::id).max().unwrap_or(0);
        max_object.max(max_asset).checked_add(1)
    }
}

/// An instance of an object on the build plate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Item {
    /// Target object id
    pub object_id: u32,
    /// Placement of the target
    pub transform: Option<Matrix>,
    /// Part number
    pub part_number: Option<String>,
    /// `<metadatagroup>` entries
    pub metadata: Vec<Metadata>,
    /// Extension side-cars
    pub ext_attrs: ExtensionAttrs,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

impl Item {
    /// Create an item referencing `object_id`
    pub fn new(object_id: u32) -> Self {
        Self {
            object_id,
            ..Default::default()
        }
    }

    /// Part path holding the target object, when it lives in another part
    pub fn object_path(&self) -> Option<&str> {
        self.ext_attrs
            .get::<ProductionAttr>()
            .and_then(|p| p.path.as_deref())
    }
}

/// The build list
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Build {
    /// Items in document order
    pub items: Vec<Item>,
    /// Extension side-cars
    pub ext_attrs: ExtensionAttrs,
    /// Attributes from unknown namespaces
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

/// A non-root model part
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ChildModel {
    /// Resources of the part
    pub resources: Resources,
    /// Attributes from unknown namespaces on `<model>`
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

/// A 3MF model: the root part plus its child parts
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Model {
    /// Part path of the root model, empty for the default path
    pub path: String,
    /// Coordinate unit
    pub units: Units,
    /// `xml:lang`
    pub language: Option<String>,
    /// Deprecated `thumbnail` attribute
    pub thumbnail: Option<String>,
    /// Declared namespaces, in declaration order
    pub extensions: Vec<ExtensionDecl>,
    /// Model metadata
    pub metadata: Vec<Metadata>,
    /// Resources of the root part
    pub resources: Resources,
    /// Build list
    pub build: Build,
    /// Child parts keyed by part path
    pub children: BTreeMap<String, ChildModel>,
    /// Attributes from unknown namespaces on `<model>`
    pub any_attr: Vec<XmlAttr>,
    /// Child elements from unknown namespaces
    pub any: Vec<UnknownTokens>,
}

impl Model {
    /// Create a new empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Part path of the root model
    pub fn root_path(&self) -> &str {
        if self.path.is_empty() {
            DEFAULT_MODEL_PATH
        } else {
            &self.path
        }
    }

    /// Returns true if `path` names the root part (an empty path does)
    pub fn is_root_path(&self, path: &str) -> bool {
        path.is_empty() || path == self.root_path()
    }

    /// Resources of the part at `path`
    pub fn resources_at(&self, path: &str) -> Option<&Resources> {
        if self.is_root_path(path) {
            Some(&self.resources)
        } else {
            self.children.get(path).map(|child| &child.resources)
        }
    }

    /// Find an object by part path and id
    pub fn find_object(&self, path: &str, id: u32) -> Option<&Object> {
        self.resources_at(path)?.find_object(id)
    }

    /// Find an asset by part path and id
    pub fn find_asset(&self, path: &str, id: u32) -> Option<&Asset> {
        self.resources_at(path)?.find_asset(id)
    }

    /// Declaration of `namespace`, if the model declares it
    pub fn extension(&self, namespace: &str) -> Option<&ExtensionDecl> {
        self.extensions.iter().find(|e| e.namespace == namespace)
    }

    /// Returns true if the model declares `namespace`
    pub fn declares(&self, namespace: &str) -> bool {
        self.extension(namespace).is_some()
    }

    /// Declare a namespace, updating the prefix and flag if already declared
    pub fn declare_extension(&mut self, namespace: &str, local_name: &str, is_required: bool) {
        match self.extensions.iter_mut().find(|e| e.namespace == namespace) {
            Some(decl) => {
                decl.local_name = local_name.to_string();
                decl.is_required = is_required;
            }
            None => self
                .extensions
                .push(ExtensionDecl::new(namespace, local_name, is_required)),
        }
    }

    /// Root and child parts as `(path, resources)` pairs, root first
    pub fn parts(&self) -> impl Iterator<Item = (&str, &Resources)> {
        std::iter::once((self.root_path(), &self.resources)).chain(
            self.children
                .iter()
                .map(|(path, child)| (path.as_str(), &child.resources)),
        )
    }
}
