//! Typed node model for Sketch archives.
//!
//! Every JSON object in an archive carries a `_class` tag. Known tags map to
//! typed structs (`Artboard`, `Bitmap`, `Style`, ...). Each struct declares
//! the fields it understands and keeps everything else in a flattened
//! [`FieldMap`], so unknown keys survive a read/write cycle untouched.
//!
//! Layers are held in the [`Layer`] sum type. Layer objects are decoded in two
//! phases: first into an untyped [`FieldMap`], then into the variant selected
//! by `_class`. Tags without a typed variant become [`Opaque`] layers that
//! carry their raw fields.
//!
//! Generic code works through the object-safe [`Node`] trait, which gives
//! attribute access by JSON field name on every variant.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::common::{Error, Result};

/// Untyped JSON object, in archive key order.
pub type FieldMap = serde_json::Map<String, Value>;

/// Implements [`ClassName`] and [`NodeKind`] for a struct with an `extra` map.
///
/// The `id:` form also gives the type identity equality over its object
/// identifier, and the `layers:` form marks it as a container.
macro_rules! node_kind {
    ($ty:ident => $class:expr, id: $($id:ident).+, layers: $layers:ident, $fields:expr) => {
        impl $crate::sketch::node::ClassName for $ty {
            const CLASS: &'static str = $class;
        }

        impl $crate::sketch::node::NodeKind for $ty {
            const FIELDS: &'static [&'static str] = &$fields;

            fn extra(&self) -> &$crate::sketch::node::FieldMap {
                &self.extra
            }

            fn id_field(&self) -> Option<&str> {
                Some(&self.$($id).+)
            }

            fn child_layers(&self) -> Option<&[$crate::sketch::node::Layer]> {
                Some(&self.$layers)
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.$($id).+ == other.$($id).+
            }
        }

        impl Eq for $ty {}
    };
    ($ty:ident => $class:expr, id: $($id:ident).+, $fields:expr) => {
        impl $crate::sketch::node::ClassName for $ty {
            const CLASS: &'static str = $class;
        }

        impl $crate::sketch::node::NodeKind for $ty {
            const FIELDS: &'static [&'static str] = &$fields;

            fn extra(&self) -> &$crate::sketch::node::FieldMap {
                &self.extra
            }

            fn id_field(&self) -> Option<&str> {
                Some(&self.$($id).+)
            }
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.$($id).+ == other.$($id).+
            }
        }

        impl Eq for $ty {}
    };
    ($ty:ident => $class:expr, $fields:expr) => {
        impl $crate::sketch::node::ClassName for $ty {
            const CLASS: &'static str = $class;
        }

        impl $crate::sketch::node::NodeKind for $ty {
            const FIELDS: &'static [&'static str] = &$fields;

            fn extra(&self) -> &$crate::sketch::node::FieldMap {
                &self.extra
            }
        }
    };
}

pub mod document;
pub mod geometry;
pub mod layer;
pub mod style;

pub use document::{Document, Meta, User};
pub use geometry::{CurvePoint, Rect, format_point, parse_point};
pub use layer::{
    Artboard, AttributedString, Bitmap, Group, LayerProps, Oval, Page, Rectangle, ShapeGroup, Text,
};
pub use style::{Border, Color, ExportFormat, ExportOptions, FileReference, Fill, Style};

/// Class tag values used by the archive format.
pub mod class {
    pub const DOCUMENT: &str = "document";
    pub const USER: &str = "user";
    pub const META: &str = "meta";
    pub const PAGE: &str = "page";
    pub const ARTBOARD: &str = "artboard";
    pub const GROUP: &str = "group";
    pub const SHAPE_GROUP: &str = "shapeGroup";
    pub const RECTANGLE: &str = "rectangle";
    pub const OVAL: &str = "oval";
    pub const BITMAP: &str = "bitmap";
    pub const TEXT: &str = "text";
    pub const ATTRIBUTED_STRING: &str = "attributedString";
    pub const STYLE: &str = "style";
    pub const FILL: &str = "fill";
    pub const BORDER: &str = "border";
    pub const COLOR: &str = "color";
    pub const RECT: &str = "rect";
    pub const CURVE_POINT: &str = "curvePoint";
    pub const EXPORT_OPTIONS: &str = "exportOptions";
    pub const EXPORT_FORMAT: &str = "exportFormat";
    pub const FILE_REFERENCE: &str = "MSJSONFileReference";
}

/// JSON key holding the class tag.
pub const CLASS_KEY: &str = "_class";
/// JSON key holding the object identifier.
pub const ID_KEY: &str = "do_objectID";
/// JSON key holding the ordered children of a container.
pub const LAYERS_KEY: &str = "layers";

/// Static class tag of a typed node.
pub trait ClassName {
    const CLASS: &'static str;
}

/// A typed node variant.
///
/// Implementors serialize to the archive's JSON shape and keep unrecognized
/// keys in a flattened map returned by [`NodeKind::extra`].
pub trait NodeKind: ClassName + Serialize + DeserializeOwned {
    /// JSON keys this variant round-trips through typed fields.
    const FIELDS: &'static [&'static str];

    /// Keys read from the archive that this variant does not declare.
    fn extra(&self) -> &FieldMap;

    /// Object identifier, for variants that carry one.
    fn id_field(&self) -> Option<&str> {
        None
    }

    /// Ordered children, for container variants.
    fn child_layers(&self) -> Option<&[Layer]> {
        None
    }
}

/// Uniform attribute access over every node variant.
pub trait Node {
    /// The `_class` tag of this node.
    fn class(&self) -> &str;

    /// The `do_objectID` of this node, if it has one.
    fn object_id(&self) -> Option<&str>;

    /// JSON keys declared by this node's variant.
    fn declared_fields(&self) -> &[&'static str];

    /// Keys preserved verbatim because the variant does not declare them.
    fn unknown_fields(&self) -> &FieldMap;

    /// The full JSON object this node serializes to.
    fn fields(&self) -> FieldMap;

    /// Value of a single field, by JSON key.
    fn get(&self, name: &str) -> Option<Value> {
        self.fields().remove(name)
    }

    /// Replace a single field, by JSON key.
    ///
    /// The class tag cannot be changed. A value of the wrong shape for a
    /// declared field is rejected with [`Error::InvalidNode`] and leaves the
    /// node unchanged.
    fn set(&mut self, name: &str, value: Value) -> Result<()>;

    /// Ordered children; empty for leaf variants.
    fn children(&self) -> &[Layer];

    /// Whether this variant holds children at all.
    fn is_container(&self) -> bool;
}

impl<T: NodeKind> Node for T {
    fn class(&self) -> &str {
        T::CLASS
    }

    fn object_id(&self) -> Option<&str> {
        self.id_field()
    }

    fn declared_fields(&self) -> &[&'static str] {
        T::FIELDS
    }

    fn unknown_fields(&self) -> &FieldMap {
        self.extra()
    }

    fn fields(&self) -> FieldMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => FieldMap::new(),
        }
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        if name == CLASS_KEY {
            return Err(Error::InvalidNode(format!(
                "cannot change the class of a {} node",
                T::CLASS
            )));
        }
        let mut fields = self.fields();
        fields.insert(name.to_string(), value);
        *self = serde_json::from_value(Value::Object(fields))
            .map_err(|e| Error::InvalidNode(format!("{}.{}: {}", T::CLASS, name, e)))?;
        Ok(())
    }

    fn children(&self) -> &[Layer] {
        self.child_layers().unwrap_or(&[])
    }

    fn is_container(&self) -> bool {
        self.child_layers().is_some()
    }
}

/// Zero-sized `_class` field of a typed node.
///
/// Serializes as the owner's class tag and rejects any other tag when read.
pub struct ClassTag<K>(PhantomData<fn() -> K>);

impl<K> ClassTag<K> {
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<K> Default for ClassTag<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Clone for ClassTag<K> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K> Copy for ClassTag<K> {}

impl<K> PartialEq for ClassTag<K> {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl<K> Eq for ClassTag<K> {}

impl<K: ClassName> fmt::Debug for ClassTag<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(K::CLASS)
    }
}

impl<K: ClassName> Serialize for ClassTag<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(K::CLASS)
    }
}

impl<'de, K: ClassName> Deserialize<'de> for ClassTag<K> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        if tag == K::CLASS {
            Ok(Self::new())
        } else {
            Err(de::Error::custom(format!(
                "expected class \"{}\", found \"{}\"",
                K::CLASS,
                tag
            )))
        }
    }
}

/// A layer node whose class tag has no typed variant.
///
/// The raw fields are kept as read. A `layers` array, when present and
/// decodable, is parsed into typed children so nested bitmaps and text stay
/// reachable by generic walkers.
#[derive(Debug, Clone, PartialEq)]
pub struct Opaque {
    class: String,
    fields: FieldMap,
    layers: Option<Vec<Layer>>,
}

impl Opaque {
    /// Build an opaque node from a decoded field map.
    pub fn from_fields(class: impl Into<String>, mut fields: FieldMap) -> Self {
        fields.remove(CLASS_KEY);
        let layers = match fields.remove(LAYERS_KEY) {
            Some(Value::Array(items)) => {
                match serde_json::from_value::<Vec<Layer>>(Value::Array(items.clone())) {
                    Ok(children) => Some(children),
                    Err(_) => {
                        fields.insert(LAYERS_KEY.to_string(), Value::Array(items));
                        None
                    },
                }
            },
            Some(other) => {
                fields.insert(LAYERS_KEY.to_string(), other);
                None
            },
            None => None,
        };
        Self {
            class: class.into(),
            fields,
            layers,
        }
    }

    fn from_value(class: String, object: Value) -> Self {
        match object {
            Value::Object(fields) => Self::from_fields(class, fields),
            other => {
                let mut fields = FieldMap::new();
                fields.insert("value".to_string(), other);
                Self::from_fields(class, fields)
            },
        }
    }

    /// Whether the class tag has a typed variant that this object did not fit.
    pub fn has_typed_class(&self) -> bool {
        TYPED_LAYER_CLASSES.contains(&self.class.as_str())
    }

    /// Raw fields, excluding the class tag and any decoded children.
    pub fn raw_fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Decoded children, if the object carried a `layers` array.
    pub fn layers_mut(&mut self) -> Option<&mut Vec<Layer>> {
        self.layers.as_mut()
    }
}

impl Serialize for Opaque {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let extra = usize::from(self.layers.is_some());
        let mut map = serializer.serialize_map(Some(self.fields.len() + 1 + extra))?;
        map.serialize_entry(CLASS_KEY, &self.class)?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        if let Some(layers) = &self.layers {
            map.serialize_entry(LAYERS_KEY, layers)?;
        }
        map.end()
    }
}

impl Node for Opaque {
    fn class(&self) -> &str {
        &self.class
    }

    fn object_id(&self) -> Option<&str> {
        self.fields.get(ID_KEY).and_then(Value::as_str)
    }

    fn declared_fields(&self) -> &[&'static str] {
        &[CLASS_KEY]
    }

    fn unknown_fields(&self) -> &FieldMap {
        &self.fields
    }

    fn fields(&self) -> FieldMap {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => FieldMap::new(),
        }
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        match name {
            CLASS_KEY => Err(Error::InvalidNode(format!(
                "cannot change the class of a {} node",
                self.class
            ))),
            LAYERS_KEY => {
                let layers = serde_json::from_value(value)
                    .map_err(|e| Error::InvalidNode(format!("{}.layers: {}", self.class, e)))?;
                self.layers = Some(layers);
                Ok(())
            },
            _ => {
                self.fields.insert(name.to_string(), value);
                Ok(())
            },
        }
    }

    fn children(&self) -> &[Layer] {
        self.layers.as_deref().unwrap_or(&[])
    }

    fn is_container(&self) -> bool {
        self.layers.is_some()
    }
}

/// Any node that can appear in a `layers` array.
#[derive(Debug, Clone)]
pub enum Layer {
    Artboard(Artboard),
    Group(Group),
    ShapeGroup(ShapeGroup),
    Rectangle(Rectangle),
    Oval(Oval),
    Bitmap(Bitmap),
    Text(Text),
    Opaque(Opaque),
}

impl Layer {
    /// Decode a layer from its untyped field map, dispatching on `_class`.
    pub fn from_fields(fields: FieldMap) -> Result<Self> {
        let tag = match fields.get(CLASS_KEY) {
            Some(Value::String(tag)) => tag.clone(),
            Some(other) => {
                return Err(Error::InvalidNode(format!("layer class tag is not a string: {}", other)));
            },
            None => return Err(Error::InvalidNode("layer has no class tag".to_string())),
        };
        let object = Value::Object(fields);
        let typed = match tag.as_str() {
            class::ARTBOARD => decode(&object).map(Layer::Artboard),
            class::GROUP => decode(&object).map(Layer::Group),
            class::SHAPE_GROUP => decode(&object).map(Layer::ShapeGroup),
            class::RECTANGLE => decode(&object).map(Layer::Rectangle),
            class::OVAL => decode(&object).map(Layer::Oval),
            class::BITMAP => decode(&object).map(Layer::Bitmap),
            class::TEXT => decode(&object).map(Layer::Text),
            _ => return Ok(Layer::Opaque(Opaque::from_value(tag, object))),
        };
        match typed {
            Ok(layer) => Ok(layer),
            Err(e) => {
                // Shape drift on a known class keeps the raw object.
                log::debug!("{} layer kept untyped: {}", tag, e);
                Ok(Layer::Opaque(Opaque::from_value(tag, object)))
            },
        }
    }

    /// Borrow the variant as a generic node.
    pub fn as_node(&self) -> &dyn Node {
        match self {
            Layer::Artboard(n) => n,
            Layer::Group(n) => n,
            Layer::ShapeGroup(n) => n,
            Layer::Rectangle(n) => n,
            Layer::Oval(n) => n,
            Layer::Bitmap(n) => n,
            Layer::Text(n) => n,
            Layer::Opaque(n) => n,
        }
    }

    /// Mutably borrow the variant as a generic node.
    pub fn as_node_mut(&mut self) -> &mut dyn Node {
        match self {
            Layer::Artboard(n) => n,
            Layer::Group(n) => n,
            Layer::ShapeGroup(n) => n,
            Layer::Rectangle(n) => n,
            Layer::Oval(n) => n,
            Layer::Bitmap(n) => n,
            Layer::Text(n) => n,
            Layer::Opaque(n) => n,
        }
    }

    /// Shared layer properties, for typed variants.
    pub fn props(&self) -> Option<&LayerProps> {
        match self {
            Layer::Artboard(n) => Some(&n.props),
            Layer::Group(n) => Some(&n.props),
            Layer::ShapeGroup(n) => Some(&n.props),
            Layer::Rectangle(n) => Some(&n.props),
            Layer::Oval(n) => Some(&n.props),
            Layer::Bitmap(n) => Some(&n.props),
            Layer::Text(n) => Some(&n.props),
            Layer::Opaque(_) => None,
        }
    }

    /// Layer name. Opaque layers report their raw `name` field.
    pub fn name(&self) -> &str {
        match self {
            Layer::Opaque(n) => n.fields.get("name").and_then(Value::as_str).unwrap_or(""),
            _ => self.props().map(|p| p.name.as_str()).unwrap_or(""),
        }
    }

    /// Layer frame, for typed variants.
    pub fn frame(&self) -> Option<&Rect> {
        self.props().map(|p| &p.frame)
    }

    /// Ordered children; empty for leaves.
    pub fn children(&self) -> &[Layer] {
        self.as_node().children()
    }

    /// Mutable children, for containers.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Layer>> {
        match self {
            Layer::Artboard(n) => Some(&mut n.layers),
            Layer::Group(n) => Some(&mut n.layers),
            Layer::ShapeGroup(n) => Some(&mut n.layers),
            Layer::Opaque(n) => n.layers_mut(),
            _ => None,
        }
    }

    /// The bitmap variant, if this is one.
    pub fn as_bitmap(&self) -> Option<&Bitmap> {
        match self {
            Layer::Bitmap(bitmap) => Some(bitmap),
            _ => None,
        }
    }

    /// Archive-relative image path of a bitmap layer.
    ///
    /// Bitmaps kept untyped still report the raw `image._ref`, whatever the
    /// reference object's own class tag.
    pub fn asset_ref(&self) -> Option<&str> {
        match self {
            Layer::Bitmap(bitmap) => bitmap.asset_ref(),
            Layer::Opaque(n) if n.class == class::BITMAP => n
                .fields
                .get("image")
                .and_then(|image| image.get("_ref"))
                .and_then(Value::as_str),
            _ => None,
        }
    }
}

fn decode<T: DeserializeOwned>(object: &Value) -> std::result::Result<T, serde_json::Error> {
    T::deserialize(object)
}

/// Class tags decoded into typed layer variants.
const TYPED_LAYER_CLASSES: &[&str] = &[
    class::ARTBOARD,
    class::GROUP,
    class::SHAPE_GROUP,
    class::RECTANGLE,
    class::OVAL,
    class::BITMAP,
    class::TEXT,
];

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        match (self.object_id(), other.object_id()) {
            (Some(a), Some(b)) => self.class() == other.class() && a == b,
            _ => match (self, other) {
                (Layer::Opaque(a), Layer::Opaque(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl Node for Layer {
    fn class(&self) -> &str {
        self.as_node().class()
    }

    fn object_id(&self) -> Option<&str> {
        self.as_node().object_id()
    }

    fn declared_fields(&self) -> &[&'static str] {
        self.as_node().declared_fields()
    }

    fn unknown_fields(&self) -> &FieldMap {
        self.as_node().unknown_fields()
    }

    fn fields(&self) -> FieldMap {
        self.as_node().fields()
    }

    fn get(&self, name: &str) -> Option<Value> {
        self.as_node().get(name)
    }

    fn set(&mut self, name: &str, value: Value) -> Result<()> {
        self.as_node_mut().set(name, value)
    }

    fn children(&self) -> &[Layer] {
        self.as_node().children()
    }

    fn is_container(&self) -> bool {
        self.as_node().is_container()
    }
}

impl Serialize for Layer {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Layer::Artboard(n) => n.serialize(serializer),
            Layer::Group(n) => n.serialize(serializer),
            Layer::ShapeGroup(n) => n.serialize(serializer),
            Layer::Rectangle(n) => n.serialize(serializer),
            Layer::Oval(n) => n.serialize(serializer),
            Layer::Bitmap(n) => n.serialize(serializer),
            Layer::Text(n) => n.serialize(serializer),
            Layer::Opaque(n) => n.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Layer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let fields = FieldMap::deserialize(deserializer)?;
        Layer::from_fields(fields).map_err(de::Error::custom)
    }
}

macro_rules! layer_from {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for Layer {
                fn from(node: $variant) -> Self {
                    Layer::$variant(node)
                }
            }
        )*
    };
}

layer_from!(Artboard, Group, ShapeGroup, Rectangle, Oval, Bitmap, Text, Opaque);

/// Visit every layer in pre-order, parents before their children.
pub fn walk<'a>(layers: &'a [Layer], visit: &mut dyn FnMut(&'a Layer)) {
    for layer in layers {
        visit(layer);
        walk(layer.children(), visit);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(value: Value) -> Layer {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_dispatch_on_class_tag() {
        let l = layer(json!({
            "_class": "rectangle",
            "do_objectID": "R1",
            "name": "Box",
            "frame": {"_class": "rect", "x": 0, "y": 0, "width": 10, "height": 20}
        }));
        assert!(matches!(l, Layer::Rectangle(_)));
        assert_eq!(l.class(), "rectangle");
        assert_eq!(l.object_id(), Some("R1"));
        assert_eq!(l.name(), "Box");
        assert_eq!(l.frame().unwrap().height, 20.0);
        assert!(!l.is_container());
    }

    #[test]
    fn test_unknown_class_is_opaque() {
        let raw = json!({
            "_class": "hotspot",
            "do_objectID": "H1",
            "flow": {"destinationArtboardID": "A1"}
        });
        let l = layer(raw.clone());
        assert!(matches!(l, Layer::Opaque(_)));
        assert_eq!(l.class(), "hotspot");
        assert_eq!(l.object_id(), Some("H1"));
        assert_eq!(serde_json::to_value(&l).unwrap(), raw);
    }

    #[test]
    fn test_opaque_children_are_typed() {
        let l = layer(json!({
            "_class": "symbolMaster",
            "do_objectID": "S1",
            "layers": [
                {"_class": "bitmap", "do_objectID": "B1", "name": "Logo",
                 "image": {"_class": "MSJSONFileReference", "_ref_class": "MSImageData", "_ref": "images/logo.png"}}
            ]
        }));
        assert!(l.is_container());
        assert_eq!(l.children().len(), 1);
        let bitmap = l.children()[0].as_bitmap().unwrap();
        assert_eq!(bitmap.asset_ref(), Some("images/logo.png"));
    }

    #[test]
    fn test_known_class_with_foreign_shape_kept_raw() {
        let raw = json!({
            "_class": "text",
            "do_objectID": "T1",
            "attributedString": {"_class": "MSAttributedString", "archivedAttributedString": {"_archive": "YnBsaXN0"}}
        });
        let l = layer(raw.clone());
        match &l {
            Layer::Opaque(opaque) => assert!(opaque.has_typed_class()),
            other => panic!("expected opaque layer, got {:?}", other),
        }
        assert_eq!(serde_json::to_value(&l).unwrap(), raw);
    }

    #[test]
    fn test_untyped_bitmap_keeps_asset_ref() {
        let l = layer(json!({
            "_class": "bitmap",
            "do_objectID": "B1",
            "name": "Scan",
            "image": {"_class": "MSJSONOriginalDataReference", "_ref_class": "MSImageData", "_ref": "images/scan.png"}
        }));
        assert!(matches!(l, Layer::Opaque(_)));
        assert!(l.as_bitmap().is_none());
        assert_eq!(l.asset_ref(), Some("images/scan.png"));
        assert_eq!(l.name(), "Scan");

        let other = layer(json!({"_class": "hotspot", "image": {"_ref": "images/x.png"}}));
        assert_eq!(other.asset_ref(), None);
    }

    #[test]
    fn test_missing_class_is_rejected() {
        let result: std::result::Result<Layer, _> = serde_json::from_value(json!({"name": "x"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_fields_preserved() {
        let l = layer(json!({
            "_class": "oval",
            "do_objectID": "O1",
            "sharedStyleID": "abc",
            "futureFlag": [1, 2, 3]
        }));
        assert_eq!(l.unknown_fields().get("futureFlag"), Some(&json!([1, 2, 3])));
        let out = serde_json::to_value(&l).unwrap();
        assert_eq!(out["futureFlag"], json!([1, 2, 3]));
        assert_eq!(out["sharedStyleID"], json!("abc"));
    }

    #[test]
    fn test_get_and_set() {
        let mut l = layer(json!({"_class": "group", "do_objectID": "G1", "name": "Old"}));
        assert_eq!(l.get("name"), Some(json!("Old")));
        l.set("name", json!("New")).unwrap();
        assert_eq!(l.name(), "New");
        l.set("custom", json!(7)).unwrap();
        assert_eq!(l.unknown_fields().get("custom"), Some(&json!(7)));

        assert!(matches!(l.set("_class", json!("oval")), Err(Error::InvalidNode(_))));
        assert!(matches!(l.set("isVisible", json!("yes")), Err(Error::InvalidNode(_))));
        assert_eq!(l.name(), "New");
    }

    #[test]
    fn test_equality_by_identifier() {
        let a = layer(json!({"_class": "group", "do_objectID": "G1", "name": "A"}));
        let b = layer(json!({"_class": "group", "do_objectID": "G1", "name": "B"}));
        let c = layer(json!({"_class": "group", "do_objectID": "G2", "name": "A"}));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_walk_pre_order() {
        let l = layer(json!({
            "_class": "artboard", "do_objectID": "A",
            "layers": [
                {"_class": "group", "do_objectID": "G",
                 "layers": [{"_class": "text", "do_objectID": "T"}]},
                {"_class": "oval", "do_objectID": "O"}
            ]
        }));
        let mut ids = Vec::new();
        walk(std::slice::from_ref(&l), &mut |layer| {
            ids.push(layer.object_id().unwrap().to_string())
        });
        assert_eq!(ids, ["A", "G", "T", "O"]);
    }
}
