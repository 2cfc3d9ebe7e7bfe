//! Symbolizers.
//!
//! Each symbolizer kind models the properties that can be translated
//! explicitly. Everything else ends up in the `extra` map of the
//! symbolizer where it is kept for auditing and written back unchanged.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use super::function::{Expression, Function};


//------------ Symbolizer ----------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Symbolizer {
    Mark(MarkSymbolizer),
    Icon(IconSymbolizer),
    Line(LineSymbolizer),
    Fill(FillSymbolizer),
    Text(TextSymbolizer),
    Raster(RasterSymbolizer),
}

impl Symbolizer {
    pub fn kind_name(&self) -> &'static str {
        match *self {
            Symbolizer::Mark(_) => "Mark",
            Symbolizer::Icon(_) => "Icon",
            Symbolizer::Line(_) => "Line",
            Symbolizer::Fill(_) => "Fill",
            Symbolizer::Text(_) => "Text",
            Symbolizer::Raster(_) => "Raster",
        }
    }

    pub fn visibility(&self) -> Option<&Expression<bool>> {
        match *self {
            Symbolizer::Mark(ref sym) => sym.visibility.as_ref(),
            Symbolizer::Icon(ref sym) => sym.visibility.as_ref(),
            Symbolizer::Line(ref sym) => sym.visibility.as_ref(),
            Symbolizer::Fill(ref sym) => sym.visibility.as_ref(),
            Symbolizer::Text(ref sym) => sym.visibility.as_ref(),
            Symbolizer::Raster(ref sym) => sym.visibility.as_ref(),
        }
    }

    /// Returns whether the symbolizer is switched off by a literal.
    pub fn is_hidden(&self) -> bool {
        matches!(self.visibility(), Some(Expression::Literal(false)))
    }

    /// Returns whether the icon image contains an attribute template.
    pub fn is_templated_icon(&self) -> bool {
        match *self {
            Symbolizer::Icon(ref sym) => {
                match sym.image {
                    Some(Expression::Literal(IconImage::Url(ref url))) => {
                        url.contains("{{")
                    }
                    _ => false
                }
            }
            _ => false
        }
    }

    /// Returns whether any property of the symbolizer is a function.
    ///
    /// This includes properties the symbolizer doesn't model.
    pub fn has_functions(&self) -> bool {
        let mut found = false;
        self.walk_functions(&mut |_| found = true);
        found
    }

    /// Calls `op` for every function used by the symbolizer.
    pub fn walk_functions(&self, op: &mut impl FnMut(&Function)) {
        if let Ok(value) = serde_json::to_value(self) {
            walk_value_functions(&value, op)
        }
    }
}

/// Calls `op` for every function found anywhere in a JSON value.
pub fn walk_value_functions(value: &Value, op: &mut impl FnMut(&Function)) {
    match *value {
        Value::Array(ref items) => {
            items.iter().for_each(|item| walk_value_functions(item, op))
        }
        Value::Object(ref map) => {
            if matches!(map.get("name"), Some(Value::String(_))) {
                if let Ok(func) = serde_json::from_value::<Function>(
                    value.clone()
                ) {
                    func.walk(op);
                    return
                }
            }
            map.values().for_each(|item| walk_value_functions(item, op))
        }
        _ => { }
    }
}


//------------ MarkSymbolizer ------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkSymbolizer {
    pub well_known_name: Expression<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<Expression<f64>>,

    /// Rotation in degrees clockwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expression<[f64; 2]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Expression<bool>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl MarkSymbolizer {
    pub fn new(well_known_name: impl Into<String>) -> Self {
        MarkSymbolizer {
            well_known_name: Expression::Literal(well_known_name.into()),
            .. Default::default()
        }
    }
}

impl Default for Expression<String> {
    fn default() -> Self {
        Expression::Literal(String::new())
    }
}


//------------ IconSymbolizer ------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Expression<IconImage>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Expression<f64>>,

    /// Rotation in degrees clockwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Expression<f64>>,

    /// The width of the icon.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expression<[f64; 2]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Expression<bool>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}


//------------ IconImage -----------------------------------------------------

/// The image of an icon.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum IconImage {
    /// A part of a larger sprite image.
    Sprite(Sprite),

    /// The URL of an image.
    Url(String),
}

impl IconImage {
    pub fn source(&self) -> &str {
        match *self {
            IconImage::Sprite(ref sprite) => &sprite.source,
            IconImage::Url(ref url) => url,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Sprite {
    pub source: String,
    pub position: [f64; 2],
    pub size: [f64; 2],
}


//------------ LineSymbolizer ------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cap: Option<Expression<LineCap>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join: Option<Expression<LineJoin>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dasharray: Option<Expression<Vec<f64>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dash_offset: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Expression<bool>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}


//------------ FillSymbolizer ------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_color: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_width: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_dasharray: Option<Expression<Vec<f64>>>,

    /// A mark or icon repeated across the area.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graphic_fill: Option<Box<Symbolizer>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Expression<bool>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}


//------------ TextSymbolizer ------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSymbolizer {
    /// The label, possibly containing `{{attribute}}` templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Expression<TextPlacement>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo_color: Option<Expression<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo_opacity: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo_width: Option<Expression<f64>>,

    /// The font families in order of preference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<Expression<Vec<String>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<Expression<FontWeight>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<Expression<FontStyle>>,

    /// Rotation in degrees clockwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Expression<[f64; 2]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_overlap: Option<Expression<bool>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Expression<bool>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}


//------------ RasterSymbolizer ----------------------------------------------

/// A raster symbolizer.
///
/// Raster styling has no native counterpart. The symbolizer is only kept
/// so it can be reported.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RasterSymbolizer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Expression<bool>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}


//------------ Enumerated property values ------------------------------------

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineJoin {
    Bevel,
    Round,
    Miter,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextPlacement {
    Point,
    Line,
    LineCenter,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Normal,
    Bold,
}

impl FontWeight {
    pub fn as_str(self) -> &'static str {
        match self {
            FontWeight::Normal => "normal",
            FontWeight::Bold => "bold",
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
            FontStyle::Oblique => "oblique",
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn unmodelled_properties_are_kept() {
        let src = json!({
            "kind": "Fill",
            "color": "#ff0000",
            "opacity": 0.5,
            "antialias": true
        });
        let sym: Symbolizer = serde_json::from_value(src.clone()).unwrap();
        match sym {
            Symbolizer::Fill(ref fill) => {
                assert_eq!(
                    fill.color, Some(Expression::Literal("#ff0000".into()))
                );
                assert_eq!(fill.extra.get("opacity"), Some(&json!(0.5)));
                assert_eq!(fill.extra.get("antialias"), Some(&json!(true)));
            }
            _ => panic!("expected fill")
        }
        assert_eq!(serde_json::to_value(&sym).unwrap(), src);
    }

    #[test]
    fn detect_functions() {
        let sym: Symbolizer = serde_json::from_value(json!({
            "kind": "Mark",
            "wellKnownName": "circle",
            "radius": {"name": "property", "args": ["size"]}
        })).unwrap();
        assert!(sym.has_functions());

        let sym: Symbolizer = serde_json::from_value(json!({
            "kind": "Line",
            "color": "#000000",
            "width": 3
        })).unwrap();
        assert!(!sym.has_functions());
    }

    #[test]
    fn sprite_image() {
        let sym: Symbolizer = serde_json::from_value(json!({
            "kind": "Icon",
            "image": {
                "source": "sprite.png", "position": [10, 20], "size": [16, 16]
            }
        })).unwrap();
        match sym {
            Symbolizer::Icon(IconSymbolizer {
                image: Some(Expression::Literal(IconImage::Sprite(sprite))),
                ..
            }) => {
                assert_eq!(sprite.position, [10., 20.]);
            }
            _ => panic!("expected sprite")
        }
    }

    #[test]
    fn templated_icon() {
        let sym: Symbolizer = serde_json::from_value(json!({
            "kind": "Icon",
            "image": "https://example.com/{{type}}.png"
        })).unwrap();
        assert!(sym.is_templated_icon());
    }

    #[test]
    fn placement_names() {
        let placement: TextPlacement = serde_json::from_value(
            json!("line-center")
        ).unwrap();
        assert_eq!(placement, TextPlacement::LineCenter);
    }
}
