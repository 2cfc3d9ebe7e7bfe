//! Reading native styles.
//!
//! Each native style becomes exactly one symbolizer. Which kind is decided
//! by the parts present: an image makes a point symbolizer, a text a text
//! symbolizer, a fill a fill symbolizer, and a stroke on its own a line
//! symbolizer. Texts written for glyph marks and icons showing one of our
//! own SVG shapes are recognised and read back as marks.

use crate::color::{self, check_opacity, normalize_opacity};
use crate::error::TranslationError;
use crate::font::{is_mark_font, Font, Glyph};
use crate::ol::flat::STYLE_NAME;
use crate::ol::{
    shape, Circle, Fill, Icon, IconOrigin, Image, OlStyle, Placement,
    RegularShape, Stroke, Text,
};
use crate::style::{
    Expression, FillSymbolizer, IconImage, IconSymbolizer, LineCap,
    LineJoin, LineSymbolizer, MarkSymbolizer, Rule, Sprite, Style,
    Symbolizer, TextPlacement, TextSymbolizer,
};
use crate::svg::{self, SvgProperties};


/// The radius of marks read from images without one.
const DEFAULT_RADIUS: f64 = 5.;


//------------ Styles --------------------------------------------------------

/// Reads a list of native styles into a neutral style with a single rule.
///
/// An empty list reads as the engine default circle.
pub fn read_styles(styles: &[OlStyle]) -> Result<Style, TranslationError> {
    let symbolizers = if styles.is_empty() {
        vec![read_symbolizer(&OlStyle::engine_default())?]
    }
    else {
        styles.iter().map(read_symbolizer).collect::<Result<_, _>>()?
    };
    Ok(Style::new(STYLE_NAME, vec![Rule {
        name: Some(format!("{} Rule 0", STYLE_NAME)),
        .. Rule::new(symbolizers)
    }]))
}

/// Reads a single native style into a symbolizer.
pub fn read_symbolizer(
    style: &OlStyle
) -> Result<Symbolizer, TranslationError> {
    if let Some(ref image) = style.image {
        read_image(image)
    }
    else if let Some(ref text) = style.text {
        match text.font {
            Some(ref font) if is_mark_font(font) => read_glyph(text),
            _ => Ok(Symbolizer::Text(read_text(text)))
        }
    }
    else if let Some(ref fill) = style.fill {
        Ok(Symbolizer::Fill(read_fill(fill, style.stroke.as_ref())))
    }
    else if let Some(ref stroke) = style.stroke {
        Ok(Symbolizer::Line(read_line(stroke)))
    }
    else {
        Err(TranslationError::new("cannot determine symbolizer kind"))
    }
}


//------------ Points --------------------------------------------------------

fn read_image(image: &Image) -> Result<Symbolizer, TranslationError> {
    match *image {
        Image::Circle(ref circle) => Ok(Symbolizer::Mark(read_circle(circle))),
        Image::RegularShape(ref shape) => {
            read_regular_shape(shape).map(Symbolizer::Mark)
        }
        Image::Icon(ref icon) => read_icon(icon),
    }
}

fn read_circle(circle: &Circle) -> MarkSymbolizer {
    let (color, fill_opacity) = fill_color(circle.fill.as_ref());
    let (stroke_color, stroke_opacity, stroke_width) = stroke_parts(
        circle.stroke.as_ref()
    );
    MarkSymbolizer {
        color,
        fill_opacity,
        opacity: image_opacity(circle.opacity),
        radius: Some(radius(circle.radius).into()),
        stroke_color,
        stroke_opacity,
        stroke_width,
        offset: offset(circle.displacement.x, circle.displacement.y),
        .. MarkSymbolizer::new("circle")
    }
}

fn read_regular_shape(
    shape: &RegularShape
) -> Result<MarkSymbolizer, TranslationError> {
    let name = shape::well_known_name(shape)?;
    let (color, fill_opacity) = fill_color(shape.fill.as_ref());
    let (stroke_color, stroke_opacity, stroke_width) = stroke_parts(
        shape.stroke.as_ref()
    );
    Ok(MarkSymbolizer {
        color,
        fill_opacity,
        opacity: image_opacity(shape.opacity),
        radius: Some(radius(shape.radius).into()),
        stroke_color,
        stroke_opacity,
        stroke_width,
        rotate: Some(shape.rotation.to_degrees().into()),
        offset: offset(shape.displacement.x, shape.displacement.y),
        .. MarkSymbolizer::new(name)
    })
}

/// Reads an icon.
///
/// Icons showing an SVG shape are read as marks.
fn read_icon(icon: &Icon) -> Result<Symbolizer, TranslationError> {
    let rotate = icon.rotation.to_degrees();
    let rotate = (rotate != 0.).then_some(rotate);
    let opacity = check_opacity(icon.opacity).then_some(icon.opacity);
    let offset = offset(icon.displacement.x, icon.displacement.y);

    let props = svg::decode(&icon.src).and_then(|svg| {
        SvgProperties::parse(&svg).ok()
    });
    if let Some(props) = props {
        return Ok(Symbolizer::Mark(read_svg_mark(
            props, opacity, rotate, offset
        )))
    }

    let image = if let Some(size) = icon.size {
        if let Some(origin) = icon.offset_origin {
            if origin != IconOrigin::TopLeft {
                return Err(TranslationError::new(format!(
                    "sprite offset origin {:?} not supported", origin
                )))
            }
        }
        IconImage::Sprite(Sprite {
            source: icon.src.clone(),
            position: icon.offset,
            size,
        })
    }
    else {
        IconImage::Url(icon.src.clone())
    };
    Ok(Symbolizer::Icon(IconSymbolizer {
        image: Some(image.into()),
        size: literal(icon.width),
        opacity: literal(opacity),
        rotate: literal(rotate),
        offset,
        .. Default::default()
    }))
}

fn read_svg_mark(
    props: SvgProperties,
    opacity: Option<f64>,
    rotate: Option<f64>,
    offset: Option<Expression<[f64; 2]>>,
) -> MarkSymbolizer {
    let fill_opacity = props.fill_opacity.filter(|op| check_opacity(*op))
        .or_else(|| props.fill.as_deref().and_then(color::opacity));
    let stroke_opacity = props.stroke_opacity.filter(|op| check_opacity(*op))
        .or_else(|| props.stroke.as_deref().and_then(color::opacity));
    let radius = props.dimensions / 2.;
    MarkSymbolizer {
        color: literal(props.fill.as_deref().map(hex)),
        fill_opacity: literal(fill_opacity),
        stroke_color: literal(props.stroke.as_deref().map(hex)),
        stroke_opacity: literal(stroke_opacity),
        stroke_width: literal(props.stroke_width.filter(|width| *width != 0.)),
        radius: literal((radius != 0.).then_some(radius)),
        opacity: literal(opacity),
        rotate: literal(rotate),
        offset,
        .. MarkSymbolizer::new(props.id)
    }
}

/// Reads a text written for a glyph mark.
fn read_glyph(text: &Text) -> Result<Symbolizer, TranslationError> {
    let ch = text.text.as_deref().and_then(|text| text.chars().next())
        .unwrap_or('a');
    let font = text.font.as_deref().unwrap_or("10px sans-serif");
    let font = Font::parse(font).ok_or_else(|| {
        TranslationError::new(format!("invalid font '{}'", font))
    })?;
    let family = font.family().ok_or_else(|| {
        TranslationError::new("glyph font without family")
    })?;
    let (color, fill_opacity) = fill_color(text.fill.as_ref());
    let (stroke_color, stroke_opacity, stroke_width) = stroke_parts(
        text.stroke.as_ref()
    );
    Ok(Symbolizer::Mark(MarkSymbolizer {
        color,
        fill_opacity,
        stroke_color,
        stroke_opacity,
        stroke_width,
        radius: Some(radius(font.size).into()),
        rotate: Some(text.rotation.to_degrees().into()),
        offset: offset(text.offset_x, text.offset_y),
        .. MarkSymbolizer::new(Glyph::new(family, ch).to_string())
    }))
}


//------------ Text ----------------------------------------------------------

fn read_text(text: &Text) -> TextSymbolizer {
    let font = text.font.as_deref().and_then(Font::parse);
    let (color, _) = fill_color(text.fill.as_ref());
    let halo_color = text.stroke.as_ref().and_then(|stroke| {
        stroke.color.as_deref()
    }).map(hex);
    TextSymbolizer {
        label: literal(text.text.clone()),
        placement: literal(text.placement.map(|placement| match placement {
            Placement::Point => TextPlacement::Point,
            Placement::Line => TextPlacement::Line,
        })),
        allow_overlap: literal(text.overflow.then_some(true)),
        color,
        size: literal(font.as_ref().map(|font| font.size)),
        font: literal(font.as_ref().map(|font| font.families.clone())),
        font_weight: literal(font.as_ref().map(|font| font.weight)),
        font_style: literal(font.as_ref().map(|font| font.style)),
        offset: Some([text.offset_x, text.offset_y].into()),
        halo_color: literal(halo_color),
        halo_width: literal(text.stroke.as_ref().and_then(|s| s.width)),
        rotate: Some(text.rotation.to_degrees().into()),
        .. Default::default()
    }
}


//------------ Lines and Areas -----------------------------------------------

fn read_line(stroke: &Stroke) -> LineSymbolizer {
    let color = stroke.color.as_deref();
    LineSymbolizer {
        color: literal(color.map(hex)),
        opacity: literal(color.and_then(color::opacity)),
        width: literal(stroke.width),
        cap: Some(stroke.line_cap.unwrap_or(LineCap::Butt).into()),
        join: Some(stroke.line_join.unwrap_or(LineJoin::Miter).into()),
        dasharray: literal(
            stroke.line_dash.as_ref().map(|dash| dash.to_vec())
        ),
        dash_offset: literal(stroke.line_dash_offset),
        .. Default::default()
    }
}

fn read_fill(fill: &Fill, stroke: Option<&Stroke>) -> FillSymbolizer {
    let (color, fill_opacity) = fill_color(Some(fill));
    let outline = stroke.and_then(|stroke| stroke.color.as_deref());
    FillSymbolizer {
        color,
        fill_opacity,
        outline_color: literal(outline.map(hex)),
        outline_opacity: literal(outline.and_then(color::opacity)),
        outline_width: literal(
            stroke.and_then(|stroke| stroke.width).filter(|w| *w != 0.)
        ),
        outline_dasharray: literal(stroke.and_then(|stroke| {
            stroke.line_dash.as_ref().map(|dash| dash.to_vec())
        })),
        .. Default::default()
    }
}


//------------ Helpers -------------------------------------------------------

fn literal<T>(value: Option<T>) -> Option<Expression<T>> {
    value.map(Expression::Literal)
}

/// Converts a color to hex, keeping colors we don't understand.
fn hex(color: &str) -> String {
    match color::hex_color(color) {
        Some(hex) => hex,
        None => color.into()
    }
}

fn fill_color(
    fill: Option<&Fill>
) -> (Option<Expression<String>>, Option<Expression<f64>>) {
    let color = fill.and_then(Fill::color_str);
    (literal(color.map(hex)), literal(color.and_then(color::opacity)))
}

fn stroke_parts(
    stroke: Option<&Stroke>
) -> (
    Option<Expression<String>>, Option<Expression<f64>>,
    Option<Expression<f64>>
) {
    let color = stroke.and_then(|stroke| stroke.color.as_deref());
    (
        literal(color.map(hex)),
        literal(color.and_then(color::opacity)),
        literal(stroke.and_then(|stroke| stroke.width)),
    )
}

/// Returns the opacity of an image unless it is fully opaque.
fn image_opacity(opacity: f64) -> Option<Expression<f64>> {
    let opacity = normalize_opacity(opacity);
    literal((opacity != 1.).then_some(opacity))
}

fn radius(radius: f64) -> f64 {
    if radius != 0. { radius } else { DEFAULT_RADIUS }
}

fn offset(x: f64, y: f64) -> Option<Expression<[f64; 2]>> {
    (x != 0. || y != 0.).then_some(Expression::Literal([x, y]))
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::FRAC_PI_4;
    use std::sync::Arc;
    use serde_json::json;

    fn read(value: serde_json::Value) -> Symbolizer {
        read_symbolizer(&serde_json::from_value(value).unwrap()).unwrap()
    }

    #[test]
    fn read_circle() {
        match read(json!({
            "image": {
                "type": "Circle",
                "radius": 0,
                "fill": {"color": "rgba(255, 0, 0, 0.5)"},
                "stroke": {"color": "rgba(0, 0, 255, 0.25)", "width": 2}
            }
        })) {
            Symbolizer::Mark(mark) => {
                assert_eq!(mark.well_known_name, "circle".to_string().into());
                assert_eq!(mark.radius, Some(5.0.into()));
                assert_eq!(mark.color, Some("#ff0000".to_string().into()));
                assert_eq!(mark.fill_opacity, Some(0.5.into()));
                assert_eq!(
                    mark.stroke_color, Some("#0000ff".to_string().into())
                );
                assert_eq!(mark.stroke_opacity, Some(0.25.into()));
                assert_eq!(mark.opacity, None);
                assert_eq!(mark.offset, None);
            }
            _ => panic!("expected mark")
        }
    }

    #[test]
    fn read_regular_shapes() {
        match read(json!({
            "image": {
                "type": "RegularShape",
                "points": 4,
                "radius": 6,
                "radius2": 0,
                "angle": FRAC_PI_4,
                "rotation": FRAC_PI_4
            }
        })) {
            Symbolizer::Mark(mark) => {
                assert_eq!(mark.well_known_name, "x".to_string().into());
                match mark.rotate {
                    Some(Expression::Literal(rotate)) => {
                        assert!((rotate - 45.).abs() < 1e-9)
                    }
                    _ => panic!("expected rotation")
                }
            }
            _ => panic!("expected mark")
        }
        assert!(read_symbolizer(&serde_json::from_value(json!({
            "image": {"type": "RegularShape", "points": 7, "radius": 6}
        })).unwrap()).is_err());
    }

    #[test]
    fn read_icons() {
        match read(json!({
            "image": {"type": "Icon", "src": "marker.png", "width": 20}
        })) {
            Symbolizer::Icon(icon) => {
                assert_eq!(
                    icon.image,
                    Some(IconImage::Url("marker.png".into()).into())
                );
                assert_eq!(icon.size, Some(20.0.into()));
                assert_eq!(icon.rotate, None);
            }
            _ => panic!("expected icon")
        }
        match read(json!({
            "image": {
                "type": "Icon", "src": "sprites.png",
                "size": [10, 10], "offset": [20, 0]
            }
        })) {
            Symbolizer::Icon(icon) => {
                assert_eq!(
                    icon.image,
                    Some(IconImage::Sprite(Sprite {
                        source: "sprites.png".into(),
                        position: [20., 0.],
                        size: [10., 10.],
                    }).into())
                );
            }
            _ => panic!("expected icon")
        }
        assert!(read_symbolizer(&OlStyle {
            image: Some(Image::Icon(Arc::new(Icon {
                size: Some([10., 10.]),
                offset_origin: Some(IconOrigin::BottomRight),
                .. Icon::new("sprites.png")
            }))),
            .. Default::default()
        }).is_err());
    }

    #[test]
    fn read_text_and_glyph() {
        match read(json!({
            "text": {
                "text": "Hello",
                "font": "bold 12px Arial, sans-serif",
                "fill": {"color": "#000000"},
                "stroke": {"color": "#ffffff", "width": 3},
                "offsetX": 1,
                "placement": "line"
            }
        })) {
            Symbolizer::Text(text) => {
                assert_eq!(text.label, Some("Hello".to_string().into()));
                assert_eq!(text.size, Some(12.0.into()));
                assert_eq!(text.font_weight, Some(
                    crate::style::FontWeight::Bold.into()
                ));
                assert_eq!(text.halo_width, Some(3.0.into()));
                assert_eq!(text.offset, Some([1., 0.].into()));
                assert_eq!(text.placement, Some(TextPlacement::Line.into()));
            }
            _ => panic!("expected text")
        }
        match read(json!({
            "text": {
                "text": "A",
                "font": "Normal 8px 'MyFont', geostyler-mark-symbolizer"
            }
        })) {
            Symbolizer::Mark(mark) => {
                assert_eq!(
                    mark.well_known_name,
                    "ttf://MyFont#0x41".to_string().into()
                );
                assert_eq!(mark.radius, Some(8.0.into()));
            }
            _ => panic!("expected mark")
        }
    }

    #[test]
    fn read_lines_and_fills() {
        match read(json!({"stroke": {"color": "#ff0000", "width": 2}})) {
            Symbolizer::Line(line) => {
                assert_eq!(line.cap, Some(LineCap::Butt.into()));
                assert_eq!(line.join, Some(LineJoin::Miter.into()));
                assert_eq!(line.width, Some(2.0.into()));
            }
            _ => panic!("expected line")
        }
        match read(json!({
            "fill": {"color": "rgba(0, 128, 0, 0.5)"},
            "stroke": {"color": "#000000", "width": 0}
        })) {
            Symbolizer::Fill(fill) => {
                assert_eq!(fill.color, Some("#008000".to_string().into()));
                assert_eq!(fill.fill_opacity, Some(0.5.into()));
                assert_eq!(
                    fill.outline_color, Some("#000000".to_string().into())
                );
                assert_eq!(fill.outline_width, None);
            }
            _ => panic!("expected fill")
        }
        assert!(read_symbolizer(&OlStyle::default()).is_err());
    }

    #[test]
    fn empty_list() {
        let style = read_styles(&[]).unwrap();
        assert_eq!(style.name, "OL Style");
        assert_eq!(style.rules[0].name.as_deref(), Some("OL Style Rule 0"));
        match style.rules[0].symbolizers[0] {
            Symbolizer::Mark(ref mark) => {
                assert_eq!(mark.radius, Some(5.0.into()));
                assert_eq!(mark.stroke_color, Some("#3399CC".to_string().into()));
            }
            _ => panic!("expected mark")
        }
    }

    #[test]
    fn invalid_opacities() {
        let mut style: OlStyle = serde_json::from_value(json!({
            "image": {
                "type": "Circle",
                "radius": 4,
                "opacity": -1.0,
                "fill": {"color": "rgba(0, 0, 0, 5)"},
                "stroke": {"color": "rgba(0, 0, 0, -1)", "width": 1}
            }
        })).unwrap();
        match read_symbolizer(&style).unwrap() {
            Symbolizer::Mark(mark) => {
                assert_eq!(mark.opacity, None);
                assert_eq!(mark.fill_opacity, Some(1.0.into()));
                assert_eq!(mark.stroke_opacity, Some(1.0.into()));
            }
            _ => panic!("expected mark")
        }
        if let Some(Image::Circle(ref mut circle)) = style.image {
            circle.opacity = f64::NAN;
        }
        match read_symbolizer(&style).unwrap() {
            Symbolizer::Mark(mark) => assert_eq!(mark.opacity, None),
            _ => panic!("expected mark")
        }
        if let Some(Image::Circle(ref mut circle)) = style.image {
            circle.opacity = 5.;
        }
        match read_symbolizer(&style).unwrap() {
            Symbolizer::Mark(mark) => assert_eq!(mark.opacity, None),
            _ => panic!("expected mark")
        }

        match read(json!({
            "stroke": {"color": "rgba(255, 0, 0, 7)", "width": 1}
        })) {
            Symbolizer::Line(line) => {
                assert_eq!(line.opacity, Some(1.0.into()))
            }
            _ => panic!("expected line")
        }
        match read(json!({
            "fill": {"color": "rgba(255, 0, 0, -2)"},
            "stroke": {"color": "rgba(0, 0, 255, 3)", "width": 1}
        })) {
            Symbolizer::Fill(fill) => {
                assert_eq!(fill.fill_opacity, Some(1.0.into()));
                assert_eq!(fill.outline_opacity, Some(1.0.into()));
            }
            _ => panic!("expected fill")
        }
    }
}
