//! The native style model.
//!
//! These types mirror the style objects of OpenLayers: a style has an
//! optional image, fill, stroke, and text. Images are circles, regular
//! shapes, or icons. Icons and patterns are shared via `Arc` because the
//! translator caches them.

use std::sync::Arc;
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use crate::assembly::StyleFunction;
use crate::pattern::Pattern;
use crate::style::{LineCap, LineJoin};

pub use self::constructors::{DefaultConstructors, StyleConstructors};
pub use self::flat::FlatStyleLike;

pub mod constructors;
pub mod flat;
pub mod shape;


//------------ OlStyleLike ---------------------------------------------------

/// Everything that can be used as a native style.
#[derive(Clone, Debug)]
pub enum OlStyleLike {
    Style(OlStyle),
    Styles(Vec<OlStyle>),
    Function(StyleFunction),
    Flat(FlatStyleLike),
}

impl OlStyleLike {
    /// Returns the static style if there is exactly one.
    pub fn as_style(&self) -> Option<&OlStyle> {
        match *self {
            OlStyleLike::Style(ref style) => Some(style),
            _ => None
        }
    }

    pub fn as_styles(&self) -> Option<&[OlStyle]> {
        match *self {
            OlStyleLike::Styles(ref styles) => Some(styles),
            _ => None
        }
    }

    pub fn as_function(&self) -> Option<&StyleFunction> {
        match *self {
            OlStyleLike::Function(ref func) => Some(func),
            _ => None
        }
    }
}

impl From<OlStyle> for OlStyleLike {
    fn from(style: OlStyle) -> Self {
        OlStyleLike::Style(style)
    }
}

impl From<Vec<OlStyle>> for OlStyleLike {
    fn from(styles: Vec<OlStyle>) -> Self {
        OlStyleLike::Styles(styles)
    }
}


//------------ OlStyle -------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct OlStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
}

impl OlStyle {
    /// Returns the style the engine uses when nothing else is given.
    pub fn engine_default() -> Self {
        let fill = Fill::color("rgba(255,255,255,0.4)");
        let stroke = Stroke {
            color: Some("#3399CC".into()),
            width: Some(1.25),
            .. Default::default()
        };
        OlStyle {
            image: Some(Image::Circle(Circle {
                radius: 5.,
                fill: Some(fill.clone()),
                stroke: Some(stroke.clone()),
                .. Default::default()
            })),
            fill: Some(fill),
            stroke: Some(stroke),
            text: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.fill.is_none() && self.stroke.is_none()
            && self.text.is_none()
    }
}


//------------ Image ---------------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum Image {
    Circle(Circle),
    RegularShape(RegularShape),
    Icon(Arc<Icon>),
}

impl Image {
    pub fn opacity(&self) -> f64 {
        match *self {
            Image::Circle(ref circle) => circle.opacity,
            Image::RegularShape(ref shape) => shape.opacity,
            Image::Icon(ref icon) => icon.opacity,
        }
    }

    pub fn rotation(&self) -> f64 {
        match *self {
            Image::Circle(_) => 0.,
            Image::RegularShape(ref shape) => shape.rotation,
            Image::Icon(ref icon) => icon.rotation,
        }
    }
}


//------------ Circle --------------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Circle {
    pub radius: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,

    #[serde(default)]
    pub displacement: Vec2,

    #[serde(default = "default_one")]
    pub opacity: f64,
}

impl Default for Circle {
    fn default() -> Self {
        Circle {
            radius: 5.,
            fill: None,
            stroke: None,
            displacement: Vec2::ZERO,
            opacity: 1.,
        }
    }
}


//------------ RegularShape --------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularShape {
    pub points: u32,
    pub radius: f64,

    /// The inner radius of stars and crosses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius2: Option<f64>,

    /// The angle of the shape in radians.
    #[serde(default)]
    pub angle: f64,

    /// The rotation in radians clockwise.
    #[serde(default)]
    pub rotation: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,

    #[serde(default)]
    pub displacement: Vec2,

    #[serde(default = "default_one")]
    pub opacity: f64,
}

impl Default for RegularShape {
    fn default() -> Self {
        RegularShape {
            points: 4,
            radius: 5.,
            radius2: None,
            angle: 0.,
            rotation: 0.,
            fill: None,
            stroke: None,
            displacement: Vec2::ZERO,
            opacity: 1.,
        }
    }
}


//------------ Icon ----------------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Icon {
    pub src: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,

    #[serde(default = "default_one")]
    pub opacity: f64,

    /// The rotation in radians clockwise.
    #[serde(default)]
    pub rotation: f64,

    #[serde(default)]
    pub displacement: Vec2,

    /// The width the icon is drawn with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    /// The size of the sub-image of a sprite.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<[f64; 2]>,

    /// The position of the sub-image of a sprite.
    #[serde(default)]
    pub offset: [f64; 2],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset_origin: Option<IconOrigin>,

    #[serde(default = "default_one")]
    pub scale: f64,
}

impl Icon {
    pub fn new(src: impl Into<String>) -> Self {
        Icon {
            src: src.into(),
            cross_origin: None,
            opacity: 1.,
            rotation: 0.,
            displacement: Vec2::ZERO,
            width: None,
            size: None,
            offset: [0., 0.],
            offset_origin: None,
            scale: 1.,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconOrigin {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}


//------------ Fill ----------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Fill {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<FillColor>,
}

impl Fill {
    pub fn color(color: impl Into<String>) -> Self {
        Fill { color: Some(FillColor::Color(color.into())) }
    }

    /// Returns the color if the fill isn't a pattern.
    pub fn color_str(&self) -> Option<&str> {
        match self.color {
            Some(FillColor::Color(ref color)) => Some(color),
            _ => None
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FillColor {
    Color(String),
    Pattern(Arc<Pattern>),
}


//------------ Stroke --------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stroke {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_cap: Option<LineCap>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_join: Option<LineJoin>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_dash: Option<SmallVec<[f64; 4]>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_dash_offset: Option<f64>,
}


//------------ Text ----------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Text {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Fill>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,

    #[serde(default)]
    pub offset_x: f64,

    #[serde(default)]
    pub offset_y: f64,

    /// The rotation in radians clockwise.
    #[serde(default)]
    pub rotation: f64,

    /// Whether the text may overlap other labels.
    #[serde(default)]
    pub overflow: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    Point,
    Line,
}


//------------ Helpers -------------------------------------------------------

fn default_one() -> f64 {
    1.
}


//============ Tests =========================================================
