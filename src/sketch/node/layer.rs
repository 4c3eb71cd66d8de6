//! Page and layer variants.
//!
//! Every layer shares [`LayerProps`] (identifier, name, frame, visibility,
//! style) and adds its own fields. Containers hold their children in an
//! ordered `layers` vector that owns them exclusively.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ClassTag, CurvePoint, ExportOptions, FieldMap, Layer, Rect, Style, class};
use super::{Color, FileReference};
use crate::common::{new_object_id, number};

/// Properties shared by pages and every typed layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerProps {
    #[serde(rename = "do_objectID", default = "new_object_id")]
    pub object_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub frame: Rect,
    #[serde(default = "visible")]
    pub is_visible: bool,
    #[serde(default)]
    pub is_locked: bool,
    #[serde(default, serialize_with = "number::serialize")]
    pub rotation: f64,
    #[serde(default = "no_boolean_operation")]
    pub boolean_operation: i64,
    #[serde(default = "pinned")]
    pub resizing_constraint: i64,
    #[serde(default)]
    pub export_options: ExportOptions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Style>,
}

fn visible() -> bool {
    true
}

fn no_boolean_operation() -> i64 {
    -1
}

fn pinned() -> i64 {
    63
}

impl LayerProps {
    /// Fresh properties with a new object identifier.
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            object_id: new_object_id(),
            name: name.into(),
            frame,
            is_visible: true,
            is_locked: false,
            rotation: 0.0,
            boolean_operation: no_boolean_operation(),
            resizing_constraint: pinned(),
            export_options: ExportOptions::default(),
            style: None,
        }
    }
}

impl Default for LayerProps {
    fn default() -> Self {
        Self::new("", Rect::default())
    }
}

/// JSON keys held by [`LayerProps`].
macro_rules! layer_fields {
    ($($field:literal),* $(,)?) => {
        [
            "_class", "do_objectID", "name", "frame", "isVisible", "isLocked", "rotation",
            "booleanOperation", "resizingConstraint", "exportOptions", "style",
            $($field),*
        ]
    };
}

/// A page: the root of one `pages/<id>.json` member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    #[serde(rename = "_class", default)]
    class: ClassTag<Page>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Page => class::PAGE, id: props.object_id, layers: layers, layer_fields!("layers"));

impl Page {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            class: ClassTag::new(),
            props: LayerProps::new(name, Rect::default()),
            layers: Vec::new(),
            extra: FieldMap::new(),
        }
    }

    /// Object identifier, also the base name of the page's archive member.
    #[inline]
    pub fn id(&self) -> &str {
        &self.props.object_id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.props.name
    }

    /// Top-level artboards, in layer order.
    pub fn artboards(&self) -> impl Iterator<Item = &Artboard> {
        self.layers.iter().filter_map(|layer| match layer {
            Layer::Artboard(artboard) => Some(artboard),
            _ => None,
        })
    }

    pub fn push_layer(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }
}

/// A fixed-size drawing surface on a page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artboard {
    #[serde(rename = "_class", default)]
    class: ClassTag<Artboard>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<Color>,
    #[serde(default)]
    pub has_background_color: bool,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Artboard => class::ARTBOARD, id: props.object_id, layers: layers,
    layer_fields!("backgroundColor", "hasBackgroundColor", "layers"));

impl Artboard {
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            class: ClassTag::new(),
            props: LayerProps::new(name, frame),
            background_color: None,
            has_background_color: false,
            layers: Vec::new(),
            extra: FieldMap::new(),
        }
    }

    /// Set a background colour and enable it.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self.has_background_color = true;
        self
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.props.frame.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.props.frame.height
    }

    #[inline]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn push_layer(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }
}

/// A plain grouping of layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    #[serde(rename = "_class", default)]
    class: ClassTag<Group>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Group => class::GROUP, id: props.object_id, layers: layers, layer_fields!("layers"));

impl Group {
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            class: ClassTag::new(),
            props: LayerProps::new(name, frame),
            layers: Vec::new(),
            extra: FieldMap::new(),
        }
    }

    pub fn push_layer(&mut self, layer: impl Into<Layer>) {
        self.layers.push(layer.into());
    }
}

/// A styled shape built from one or more path children.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeGroup {
    #[serde(rename = "_class", default)]
    class: ClassTag<ShapeGroup>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(ShapeGroup => class::SHAPE_GROUP, id: props.object_id, layers: layers,
    layer_fields!("layers"));

impl ShapeGroup {
    fn styled(name: impl Into<String>, frame: Rect, fill: Option<Color>) -> Self {
        let mut props = LayerProps::new(name, frame);
        props.style = Some(match fill {
            Some(color) => Style::filled(color),
            None => Style::default(),
        });
        Self {
            class: ClassTag::new(),
            props,
            layers: Vec::new(),
            extra: FieldMap::new(),
        }
    }

    /// A shape group holding one rectangle path that spans its frame.
    pub fn rectangle(name: impl Into<String>, frame: Rect, fill: Option<Color>) -> Self {
        let path = Rectangle::new("Path", Rect::new(0.0, 0.0, frame.width, frame.height));
        let mut group = Self::styled(name, frame, fill);
        group.layers.push(Layer::Rectangle(path));
        group
    }

    /// A shape group holding one oval path that spans its frame.
    pub fn oval(name: impl Into<String>, frame: Rect, fill: Option<Color>) -> Self {
        let path = Oval::new("Path", Rect::new(0.0, 0.0, frame.width, frame.height));
        let mut group = Self::styled(name, frame, fill);
        group.layers.push(Layer::Oval(path));
        group
    }
}

/// Corner points of the unit square, clockwise from the origin.
fn unit_square() -> Vec<CurvePoint> {
    vec![
        CurvePoint::corner(0.0, 0.0),
        CurvePoint::corner(1.0, 0.0),
        CurvePoint::corner(1.0, 1.0),
        CurvePoint::corner(0.0, 1.0),
    ]
}

/// Rectangle path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rectangle {
    #[serde(rename = "_class", default)]
    class: ClassTag<Rectangle>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default, serialize_with = "number::serialize")]
    pub fixed_radius: f64,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub points: Vec<CurvePoint>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Rectangle => class::RECTANGLE, id: props.object_id,
    layer_fields!("fixedRadius", "isClosed", "points"));

impl Rectangle {
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            class: ClassTag::new(),
            props: LayerProps::new(name, frame),
            fixed_radius: 0.0,
            is_closed: true,
            points: unit_square(),
            extra: FieldMap::new(),
        }
    }
}

/// Oval path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Oval {
    #[serde(rename = "_class", default)]
    class: ClassTag<Oval>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default)]
    pub is_closed: bool,
    #[serde(default)]
    pub points: Vec<CurvePoint>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Oval => class::OVAL, id: props.object_id, layer_fields!("isClosed", "points"));

impl Oval {
    pub fn new(name: impl Into<String>, frame: Rect) -> Self {
        Self {
            class: ClassTag::new(),
            props: LayerProps::new(name, frame),
            is_closed: true,
            points: unit_square(),
            extra: FieldMap::new(),
        }
    }
}

/// An image layer. The pixels live in an `images/` member named by the
/// layer's file reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bitmap {
    #[serde(rename = "_class", default)]
    class: ClassTag<Bitmap>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<FileReference>,
    #[serde(default)]
    pub fill_replaces_image: bool,
    #[serde(rename = "intendedDPI", default = "screen_dpi")]
    pub intended_dpi: i64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Bitmap => class::BITMAP, id: props.object_id,
    layer_fields!("image", "fillReplacesImage", "intendedDPI"));

fn screen_dpi() -> i64 {
    72
}

impl Bitmap {
    /// A bitmap showing the image member at `reference`, e.g. `images/abc.png`.
    pub fn new(name: impl Into<String>, frame: Rect, reference: impl Into<String>) -> Self {
        Self {
            class: ClassTag::new(),
            props: LayerProps::new(name, frame),
            image: Some(FileReference::image(reference)),
            fill_replaces_image: false,
            intended_dpi: screen_dpi(),
            extra: FieldMap::new(),
        }
    }

    /// Archive-relative path of the referenced image.
    pub fn asset_ref(&self) -> Option<&str> {
        self.image.as_ref().map(|image| image.reference.as_str())
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.props.name
    }
}

/// Rich text content of a text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributedString {
    #[serde(rename = "_class", default)]
    class: ClassTag<AttributedString>,
    #[serde(default)]
    pub string: String,
    #[serde(default)]
    pub attributes: Vec<Value>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(AttributedString => class::ATTRIBUTED_STRING, ["_class", "string", "attributes"]);

impl AttributedString {
    pub fn new(string: impl Into<String>) -> Self {
        Self {
            class: ClassTag::new(),
            string: string.into(),
            attributes: Vec::new(),
            extra: FieldMap::new(),
        }
    }
}

/// A text layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(rename = "_class", default)]
    class: ClassTag<Text>,
    #[serde(flatten)]
    pub props: LayerProps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributed_string: Option<AttributedString>,
    #[serde(rename = "sharedStyleID", default, skip_serializing_if = "Option::is_none")]
    pub shared_style_id: Option<String>,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Text => class::TEXT, id: props.object_id,
    layer_fields!("attributedString", "sharedStyleID"));

impl Text {
    pub fn new(name: impl Into<String>, frame: Rect, content: impl Into<String>) -> Self {
        Self {
            class: ClassTag::new(),
            props: LayerProps::new(name, frame),
            attributed_string: Some(AttributedString::new(content)),
            shared_style_id: None,
            extra: FieldMap::new(),
        }
    }

    /// Plain string content.
    pub fn content(&self) -> Option<&str> {
        self.attributed_string.as_ref().map(|s| s.string.as_str())
    }
}
