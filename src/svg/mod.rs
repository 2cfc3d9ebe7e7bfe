//! Mark shapes as SVG images.
//!
//! Native styles have no notion of most mark shapes. We draw them as small
//! SVG images instead and embed those as base64 data URLs into icon
//! styles. The SVG keeps the well-known name as the id of its element and
//! the colors in its style, so that the mark can be recovered when reading
//! the icon back.
//!
//! Shapes made of lines only are never filled. Their fill color is kept in
//! the `color` attribute of the element.

use std::fmt::Write as _;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use nom::IResult;
use nom::branch::alt;
use nom::bytes::complete::{tag, take_until, take_while1};
use nom::character::complete::{char as tag_char, multispace0, multispace1};
use nom::combinator::opt;
use nom::multi::many0;
use nom::sequence::{delimited, preceded, separated_pair, tuple};
use crate::error::TranslationError;
use crate::eval::number_to_string;

pub mod shapes;


/// The prefix of a base64 encoded SVG data URL.
pub const DATA_URL_PREFIX: &str = "data:image/svg+xml;base64,";


//------------ SvgOptions ----------------------------------------------------

/// The options for drawing a shape.
#[derive(Clone, Debug, PartialEq)]
pub struct SvgOptions {
    pub fill: String,
    pub fill_opacity: Option<f64>,
    pub stroke: String,
    pub stroke_opacity: Option<f64>,
    pub stroke_width: f64,

    /// The width and height of the image in pixels.
    pub dimensions: f64,
}

impl Default for SvgOptions {
    fn default() -> Self {
        SvgOptions {
            fill: "#fff".into(),
            fill_opacity: None,
            stroke: "#000".into(),
            stroke_opacity: None,
            stroke_width: 1.,
            dimensions: 40.,
        }
    }
}


//------------ Generating ----------------------------------------------------

/// Returns whether a well-known name can be drawn as an SVG shape.
pub fn is_shape(name: &str) -> bool {
    shapes::lookup(&shapes::canonical_name(name)).is_some()
}

/// Draws the shape with the given well-known name.
///
/// The element id is the name as given, so aliases survive a round trip.
pub fn shape_svg(
    name: &str, options: &SvgOptions
) -> Result<String, TranslationError> {
    let shape = shapes::lookup(&shapes::canonical_name(name)).ok_or_else(|| {
        TranslationError::new(format!("unknown shape '{}'", name))
    })?;
    let (element, geometry) = shape.element();
    let size = number_to_string(options.dimensions);

    let mut res = format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{0}\" \
         height=\"{0}\" viewBox=\"-12 -12 24 24\">",
        size
    );
    let _ = write!(res, "<{} id=\"{}\" {} ", element, name, geometry);
    if shape.is_filled() {
        let _ = write!(res, "style=\"fill: {}; ", options.fill);
    }
    else {
        let _ = write!(res, "color=\"{}\" style=\"fill: none; ", options.fill);
    }
    if let Some(opacity) = options.fill_opacity {
        let _ = write!(res, "fill-opacity: {}; ", number_to_string(opacity));
    }
    let _ = write!(res, "stroke: {}; ", options.stroke);
    if let Some(opacity) = options.stroke_opacity {
        let _ = write!(res, "stroke-opacity: {}; ", number_to_string(opacity));
    }
    let _ = write!(
        res, "stroke-width: {};\" /></svg>",
        number_to_string(options.stroke_width)
    );
    Ok(res)
}

/// Encodes an SVG document as a data URL.
pub fn encode(svg: &str) -> String {
    format!("{}{}", DATA_URL_PREFIX, STANDARD.encode(svg))
}

/// Decodes an SVG data URL.
///
/// Returns `None` if the source isn't a base64 SVG data URL.
pub fn decode(src: &str) -> Option<String> {
    let data = src.strip_prefix(DATA_URL_PREFIX)?;
    let data = STANDARD.decode(data.trim()).ok()?;
    String::from_utf8(data).ok()
}


//------------ SvgProperties -------------------------------------------------

/// The properties of a shape recovered from its SVG.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SvgProperties {
    /// The id of the shape element. This is the well-known name.
    pub id: String,

    /// The width of the image or zero if unknown.
    pub dimensions: f64,

    pub fill: Option<String>,
    pub fill_opacity: Option<f64>,
    pub stroke: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_width: Option<f64>,
}

impl SvgProperties {
    /// Extracts the properties from an SVG document.
    ///
    /// Only the root element and its first child are looked at.
    pub fn parse(svg: &str) -> Result<Self, TranslationError> {
        let (_, (root, child)) = document(svg).map_err(|_| {
            TranslationError::new("invalid SVG document")
        })?;
        if root.name != "svg" {
            return Err(TranslationError::new("<svg> element not found"))
        }

        let mut res = SvgProperties {
            id: child.attr("id").unwrap_or_default().into(),
            dimensions: root.attr("width").and_then(|width| {
                width.trim().parse::<f64>().ok()
            }).filter(|width| width.is_finite()).unwrap_or(0.),
            .. Default::default()
        };
        let style = child.attr("style").unwrap_or_default();
        for declaration in style.split(';') {
            let (key, value) = match declaration.split_once(':') {
                Some((key, value)) => (key.trim(), value.trim()),
                None => continue
            };
            if value.is_empty() {
                continue
            }
            match key {
                "fill" => {
                    if value != "none" {
                        res.fill = Some(value.into())
                    }
                }
                "fill-opacity" => res.fill_opacity = value.parse().ok(),
                "stroke" => res.stroke = Some(value.into()),
                "stroke-opacity" => res.stroke_opacity = value.parse().ok(),
                "stroke-width" => res.stroke_width = value.parse().ok(),
                _ => { }
            }
        }
        if res.fill.is_none() {
            res.fill = child.attr("color").map(Into::into);
        }
        Ok(res)
    }
}


//------------ Parsing -------------------------------------------------------

struct StartTag<'a> {
    name: &'a str,
    attrs: Vec<(&'a str, &'a str)>,
}

impl<'a> StartTag<'a> {
    fn attr(&self, name: &str) -> Option<&'a str> {
        self.attrs.iter().find(|(key, _)| *key == name).map(|(_, value)| {
            *value
        })
    }
}

fn document(input: &str) -> IResult<&str, (StartTag, StartTag)> {
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(delimited(tag("<?"), take_until("?>"), tag("?>")))(
        input
    )?;
    let (input, _) = many0(preceded(
        multispace0, delimited(tag("<!--"), take_until("-->"), tag("-->"))
    ))(input)?;
    let (input, root) = start_tag(input)?;
    let (input, child) = start_tag(input)?;
    Ok((input, (root, child)))
}

fn start_tag(input: &str) -> IResult<&str, StartTag> {
    let (input, (_, _, name, attrs, _, _)) = tuple((
        multispace0,
        tag_char('<'),
        identifier,
        many0(preceded(multispace1, attribute)),
        multispace0,
        alt((tag("/>"), tag(">"))),
    ))(input)?;
    Ok((input, StartTag { name, attrs }))
}

fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        identifier,
        delimited(multispace0, tag_char('='), multispace0),
        alt((
            delimited(tag_char('"'), take_until("\""), tag_char('"')),
            delimited(tag_char('\''), take_until("'"), tag_char('\'')),
        ))
    )(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|ch: char| {
        ch.is_alphanumeric() || ch == '-' || ch == '_' || ch == ':'
    })(input)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn draw_filled_shape() {
        let svg = shape_svg("square", &SvgOptions {
            fill: "#ff0000".into(),
            fill_opacity: Some(0.5),
            dimensions: 12.,
            .. Default::default()
        }).unwrap();
        assert_eq!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"12\" \
             height=\"12\" viewBox=\"-12 -12 24 24\">\
             <polygon id=\"square\" points=\"-10,-10 10,-10 10,10 -10,10\" \
             style=\"fill: #ff0000; fill-opacity: 0.5; stroke: #000; \
             stroke-width: 1;\" /></svg>"
        );
    }

    #[test]
    fn line_shapes_keep_fill_color() {
        let svg = shape_svg("x", &SvgOptions {
            fill: "#00ff00".into(),
            .. Default::default()
        }).unwrap();
        assert!(svg.contains("<path id=\"x\""));
        assert!(svg.contains("fill: none;"));
        let props = SvgProperties::parse(&svg).unwrap();
        assert_eq!(props.id, "x");
        assert_eq!(props.fill.as_deref(), Some("#00ff00"));
    }

    #[test]
    fn unknown_shape() {
        assert!(shape_svg("blob", &SvgOptions::default()).is_err());
        assert!(!is_shape("ttf://Font#0x41"));
        assert!(is_shape("shape://times"));
    }

    #[test]
    fn properties_round_trip() {
        let options = SvgOptions {
            fill: "#123456".into(),
            fill_opacity: Some(0.25),
            stroke: "#abcdef".into(),
            stroke_opacity: Some(0.75),
            stroke_width: 2.5,
            dimensions: 16.,
        };
        for name in shapes::names() {
            let svg = shape_svg(name, &options).unwrap();
            let props = SvgProperties::parse(&decode(&encode(&svg)).unwrap())
                .unwrap();
            assert_eq!(props.id, name);
            assert_eq!(props.dimensions, 16.);
            assert_eq!(props.fill.as_deref(), Some("#123456"));
            assert_eq!(props.fill_opacity, Some(0.25));
            assert_eq!(props.stroke.as_deref(), Some("#abcdef"));
            assert_eq!(props.stroke_opacity, Some(0.75));
            assert_eq!(props.stroke_width, Some(2.5));
        }
    }

    #[test]
    fn foreign_svg() {
        let props = SvgProperties::parse(
            "<?xml version=\"1.0\"?>\n<svg width='20'>\
             <circle id='dot' r='3' style='fill:red'/></svg>"
        ).unwrap();
        assert_eq!(props.id, "dot");
        assert_eq!(props.dimensions, 20.);
        assert_eq!(props.fill.as_deref(), Some("red"));
        assert!(SvgProperties::parse("<html><body/></html>").is_err());
        assert!(SvgProperties::parse("not svg").is_err());
        assert_eq!(decode("https://example.com/a.svg"), None);
    }
}
