//! Geometry value types: frames and path curve points.

use serde::{Deserialize, Serialize};

use super::{ClassTag, FieldMap, class};
use crate::common::number;

/// Layer frame (`_class: "rect"`), in the parent's coordinate space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rect {
    #[serde(rename = "_class", default)]
    class: ClassTag<Rect>,
    #[serde(default)]
    pub constrain_proportions: bool,
    #[serde(default, serialize_with = "number::serialize")]
    pub height: f64,
    #[serde(default, serialize_with = "number::serialize")]
    pub width: f64,
    #[serde(default, serialize_with = "number::serialize")]
    pub x: f64,
    #[serde(default, serialize_with = "number::serialize")]
    pub y: f64,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(Rect => class::RECT, [
    "_class", "constrainProportions", "height", "width", "x", "y",
]);

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Self::default()
        }
    }

    /// Right edge, `x + width`.
    #[inline]
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge, `y + height`.
    #[inline]
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }
}

/// A point on a shape path. Positions are `"{x, y}"` strings in the unit
/// square of the owning layer's frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
    #[serde(rename = "_class", default)]
    class: ClassTag<CurvePoint>,
    #[serde(default, serialize_with = "number::serialize")]
    pub corner_radius: f64,
    #[serde(default = "origin")]
    pub curve_from: String,
    #[serde(default = "straight")]
    pub curve_mode: i64,
    #[serde(default = "origin")]
    pub curve_to: String,
    #[serde(default)]
    pub has_curve_from: bool,
    #[serde(default)]
    pub has_curve_to: bool,
    #[serde(default = "origin")]
    pub point: String,
    #[serde(flatten)]
    pub extra: FieldMap,
}

node_kind!(CurvePoint => class::CURVE_POINT, [
    "_class", "cornerRadius", "curveFrom", "curveMode", "curveTo",
    "hasCurveFrom", "hasCurveTo", "point",
]);

fn origin() -> String {
    format_point(0.0, 0.0)
}

fn straight() -> i64 {
    1
}

impl CurvePoint {
    /// A straight corner point at `(x, y)`.
    pub fn corner(x: f64, y: f64) -> Self {
        let position = format_point(x, y);
        Self {
            class: ClassTag::new(),
            corner_radius: 0.0,
            curve_from: position.clone(),
            curve_mode: straight(),
            curve_to: position.clone(),
            has_curve_from: false,
            has_curve_to: false,
            point: position,
            extra: FieldMap::new(),
        }
    }

    /// The `point` position, if it parses.
    pub fn position(&self) -> Option<(f64, f64)> {
        parse_point(&self.point)
    }
}

impl Default for CurvePoint {
    fn default() -> Self {
        Self::corner(0.0, 0.0)
    }
}

/// Parse a `"{x, y}"` position string.
pub fn parse_point(s: &str) -> Option<(f64, f64)> {
    let inner = s.trim().strip_prefix('{')?.strip_suffix('}')?;
    let (x, y) = inner.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Format a position as `"{x, y}"`, integral values without a fraction.
pub fn format_point(x: f64, y: f64) -> String {
    format!("{{{}, {}}}", fmt_coord(x), fmt_coord(y))
}

fn fmt_coord(v: f64) -> String {
    match number::as_integer(v) {
        Some(int) => int.to_string(),
        None => v.to_string(),
    }
}
