//! Style value types: colours, fills, borders, export settings and file
//! references.

use serde::{Deserialize, Serialize};

use super::{ClassName, ClassTag, FieldMap, NodeKind, class};
use crate::common::number;

/// RGBA colour with channels in `0..=1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Color {
    #[serde(rename = "_class", default)]
    class: ClassTag<Color>,
    #[serde(default = "one", serialize_with = "number::serialize")]
    pub alpha: f64,
    #[serde(default, serialize_with = "number::serialize")]
    pub blue: f64,
    #[serde(default, serialize_with = "number::serialize")]
    pub green: f64,
    #[serde(default, serialize_with = "number::serialize")]
    pub red: f64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Color => class::COLOR, ["_class", "alpha", "blue", "green", "red"]);

fn one() -> f64 {
    1.0
}

fn clamp_channel(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

impl Color {
    /// Build a colour, clamping every channel into `0..=1`.
    pub fn rgba(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self {
            class: ClassTag::new(),
            alpha: clamp_channel(alpha),
            blue: clamp_channel(blue),
            green: clamp_channel(green),
            red: clamp_channel(red),
            extra: FieldMap::new(),
        }
    }

    pub fn black() -> Self {
        Self::rgba(0.0, 0.0, 0.0, 1.0)
    }

    pub fn white() -> Self {
        Self::rgba(1.0, 1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// One entry of a style's fill stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fill {
    #[serde(rename = "_class", default)]
    class: ClassTag<Fill>,
    #[serde(default = "enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub fill_type: i64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Fill => class::FILL, ["_class", "isEnabled", "color", "fillType"]);

fn enabled() -> bool {
    true
}

impl Fill {
    /// A solid colour fill.
    pub fn solid(color: Color) -> Self {
        Self {
            class: ClassTag::new(),
            is_enabled: true,
            color,
            fill_type: 0,
            extra: FieldMap::new(),
        }
    }
}

/// One entry of a style's border stack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Border {
    #[serde(rename = "_class", default)]
    class: ClassTag<Border>,
    #[serde(default = "enabled")]
    pub is_enabled: bool,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub fill_type: i64,
    #[serde(default)]
    pub position: i64,
    #[serde(default = "one", serialize_with = "number::serialize")]
    pub thickness: f64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Border => class::BORDER, [
    "_class", "isEnabled", "color", "fillType", "position", "thickness",
]);

impl Border {
    /// A solid centred border.
    pub fn solid(color: Color, thickness: f64) -> Self {
        Self {
            class: ClassTag::new(),
            is_enabled: true,
            color,
            fill_type: 0,
            position: 0,
            thickness,
            extra: FieldMap::new(),
        }
    }
}

/// Layer style: border and fill stacks plus path rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(rename = "_class", default)]
    class: ClassTag<Style>,
    #[serde(rename = "do_objectID", default, skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(default)]
    pub borders: Vec<Border>,
    #[serde(default)]
    pub fills: Vec<Fill>,
    #[serde(default = "miter_limit", serialize_with = "number::serialize")]
    pub miter_limit: f64,
    #[serde(default)]
    pub start_marker_type: i64,
    #[serde(default)]
    pub end_marker_type: i64,
    #[serde(default = "non_zero")]
    pub winding_rule: i64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

impl ClassName for Style {
    const CLASS: &'static str = class::STYLE;
}

impl NodeKind for Style {
    const FIELDS: &'static [&'static str] = &[
        "_class",
        "do_objectID",
        "borders",
        "fills",
        "miterLimit",
        "startMarkerType",
        "endMarkerType",
        "windingRule",
    ];

    fn extra(&self) -> &FieldMap {
        &self.extra
    }

    fn id_field(&self) -> Option<&str> {
        self.object_id.as_deref()
    }
}

fn miter_limit() -> f64 {
    10.0
}

fn non_zero() -> i64 {
    1
}

impl Default for Style {
    fn default() -> Self {
        Self {
            class: ClassTag::new(),
            object_id: Some(crate::common::new_object_id()),
            borders: Vec::new(),
            fills: Vec::new(),
            miter_limit: miter_limit(),
            start_marker_type: 0,
            end_marker_type: 0,
            winding_rule: non_zero(),
            extra: FieldMap::new(),
        }
    }
}

impl Style {
    /// A style with a single solid fill.
    pub fn filled(color: Color) -> Self {
        Self {
            fills: vec![Fill::solid(color)],
            ..Self::default()
        }
    }

    /// Colour of the first enabled fill.
    pub fn fill_color(&self) -> Option<&Color> {
        self.fills.iter().find(|f| f.is_enabled).map(|f| &f.color)
    }
}

/// One export preset of a layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFormat {
    #[serde(rename = "_class", default)]
    class: ClassTag<ExportFormat>,
    #[serde(default, serialize_with = "number::serialize")]
    pub absolute_size: f64,
    #[serde(default)]
    pub file_format: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub naming_scheme: i64,
    #[serde(default = "one", serialize_with = "number::serialize")]
    pub scale: f64,
    #[serde(default)]
    pub visible_scale_type: i64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(ExportFormat => class::EXPORT_FORMAT, [
    "_class", "absoluteSize", "fileFormat", "name", "namingScheme", "scale", "visibleScaleType",
]);

/// Export settings of a layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(rename = "_class", default)]
    class: ClassTag<ExportOptions>,
    #[serde(default)]
    pub export_formats: Vec<ExportFormat>,
    #[serde(default)]
    pub included_layer_ids: Vec<String>,
    #[serde(default)]
    pub layer_options: i64,
    #[serde(default)]
    pub should_trim: bool,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(ExportOptions => class::EXPORT_OPTIONS, [
    "_class", "exportFormats", "includedLayerIds", "layerOptions", "shouldTrim",
]);

/// Reference from a node to another archive member, such as a page from the
/// document or an image from a bitmap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReference {
    #[serde(rename = "_class", default)]
    class: ClassTag<FileReference>,
    #[serde(rename = "_ref_class")]
    pub ref_class: String,
    #[serde(rename = "_ref")]
    pub reference: String,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(FileReference => class::FILE_REFERENCE, ["_class", "_ref_class", "_ref"]);

impl FileReference {
    pub fn new(ref_class: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            class: ClassTag::new(),
            ref_class: ref_class.into(),
            reference: reference.into(),
            extra: FieldMap::new(),
        }
    }

    /// Reference to the page member `pages/<id>`.
    pub fn page(object_id: &str) -> Self {
        Self::new(
            crate::sketch::MS_IMMUTABLE_PAGE,
            format!("{}{}", crate::sketch::PAGES_DIR, object_id),
        )
    }

    /// Reference to an image member such as `images/abc.png`.
    pub fn image(reference: impl Into<String>) -> Self {
        Self::new(crate::sketch::MS_IMAGE_DATA, reference)
    }

    /// Page identifier named by a page reference.
    pub fn page_id(&self) -> Option<&str> {
        let id = self.reference.strip_prefix(crate::sketch::PAGES_DIR)?;
        Some(id.strip_suffix(".json").unwrap_or(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_color_clamped() {
        let c = Color::rgba(1.5, -0.2, 0.5, f64::NAN);
        assert_eq!((c.red, c.green, c.blue, c.alpha), (1.0, 0.0, 0.5, 0.0));
    }

    #[test]
    fn test_style_keeps_object_id_when_present() {
        let style: Style = serde_json::from_value(json!({
            "_class": "style",
            "do_objectID": "S1",
            "fills": [{"_class": "fill", "isEnabled": true, "fillType": 0,
                       "color": {"_class": "color", "alpha": 1, "blue": 0, "green": 0, "red": 1}}],
            "contextSettings": {"_class": "graphicsContextSettings", "blendMode": 0, "opacity": 1}
        }))
        .unwrap();
        assert_eq!(style.object_id.as_deref(), Some("S1"));
        assert_eq!(style.fill_color().unwrap().red, 1.0);
        assert!(style.extra.contains_key("contextSettings"));

        let bare: Style = serde_json::from_value(json!({"_class": "style"})).unwrap();
        assert!(bare.object_id.is_none());
        assert!(serde_json::to_value(&bare).unwrap().get("do_objectID").is_none());
    }

    #[test]
    fn test_file_reference_shape() {
        let r = FileReference::page("ABC");
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"_class": "MSJSONFileReference", "_ref_class": "MSImmutablePage", "_ref": "pages/ABC"})
        );
        assert_eq!(r.page_id(), Some("ABC"));
        assert_eq!(FileReference::image("images/a.png").page_id(), None);
    }
}
