//! Writing mark symbolizers.
//!
//! Parametric shapes become icons showing a generated SVG image. Font
//! glyphs become text styles showing the single glyph in a font marked
//! with the sentinel family.

use kurbo::Vec2;
use crate::color::check_opacity;
use crate::error::{Error, EvaluationError, TranslationError};
use crate::eval::{resolve_expression, resolve_opt};
use crate::feature::Feature;
use crate::font::{mark_font, Glyph};
use crate::ol::{Icon, Image, OlStyle, Stroke, Text};
use crate::style::MarkSymbolizer;
use crate::svg::{self, SvgOptions};
use super::{combine_color, Translator};


//------------ ResolvedMark --------------------------------------------------

/// A mark symbolizer with all functions evaluated.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedMark {
    pub well_known_name: String,
    pub radius: Option<f64>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub fill_opacity: Option<f64>,
    pub stroke_color: Option<String>,
    pub stroke_opacity: Option<f64>,
    pub stroke_width: Option<f64>,
    pub rotate: Option<f64>,
    pub offset: Option<[f64; 2]>,
}

impl ResolvedMark {
    pub fn resolve(
        sym: &MarkSymbolizer, feature: Option<&Feature>
    ) -> Result<Self, EvaluationError> {
        Ok(ResolvedMark {
            well_known_name: resolve_expression(
                &sym.well_known_name, feature
            )?,
            radius: resolve_opt(&sym.radius, feature)?,
            color: resolve_opt(&sym.color, feature)?,
            opacity: resolve_opt(&sym.opacity, feature)?,
            fill_opacity: resolve_opt(&sym.fill_opacity, feature)?,
            stroke_color: resolve_opt(&sym.stroke_color, feature)?,
            stroke_opacity: resolve_opt(&sym.stroke_opacity, feature)?,
            stroke_width: resolve_opt(&sym.stroke_width, feature)?,
            rotate: resolve_opt(&sym.rotate, feature)?,
            offset: resolve_opt(&sym.offset, feature)?,
        })
    }

    /// Returns the rotation in radians.
    fn rotation(&self) -> f64 {
        self.rotate.filter(|rotate| rotate.is_finite()).unwrap_or(0.)
            .to_radians()
    }
}


//------------ Translator ----------------------------------------------------

impl Translator {
    pub fn write_mark(
        &self, sym: &MarkSymbolizer, feature: Option<&Feature>
    ) -> Result<OlStyle, Error> {
        let mark = ResolvedMark::resolve(sym, feature)?;
        if svg::is_shape(&mark.well_known_name) {
            self.write_shape_mark(&mark)
        }
        else if let Some(glyph) = Glyph::parse(&mark.well_known_name) {
            self.write_glyph_mark(&mark, &glyph)
        }
        else {
            Err(TranslationError::new(format!(
                "unsupported well-known name '{}'", mark.well_known_name
            )).into())
        }
    }

    fn write_shape_mark(&self, mark: &ResolvedMark) -> Result<OlStyle, Error> {
        let defaults = SvgOptions::default();
        let options = SvgOptions {
            fill: mark.color.clone().unwrap_or(defaults.fill),
            fill_opacity: mark.fill_opacity.filter(|op| check_opacity(*op)),
            stroke: mark.stroke_color.clone().unwrap_or(defaults.stroke),
            stroke_opacity: mark.stroke_opacity.filter(|op| {
                check_opacity(*op)
            }),
            stroke_width: mark.stroke_width.filter(|width| {
                *width != 0. && width.is_finite()
            }).unwrap_or(defaults.stroke_width),
            dimensions: mark.radius.unwrap_or(self.config().mark_radius) * 2.,
        };
        let svg = svg::shape_svg(&mark.well_known_name, &options)?;

        let icon = Icon {
            cross_origin: self.config().cross_origin.clone(),
            opacity: mark.opacity.filter(|op| {
                check_opacity(*op)
            }).unwrap_or(1.),
            rotation: mark.rotation(),
            displacement: mark.offset.map(|[x, y]| Vec2::new(x, y))
                .unwrap_or(Vec2::ZERO),
            .. Icon::new(svg::encode(&svg))
        };
        Ok(self.constructors().style(OlStyle {
            image: Some(Image::Icon(self.constructors().icon(icon))),
            .. Default::default()
        }))
    }

    fn write_glyph_mark(
        &self, mark: &ResolvedMark, glyph: &Glyph
    ) -> Result<OlStyle, Error> {
        let ch = glyph.character().ok_or_else(|| {
            TranslationError::new(format!(
                "invalid character code in '{}'", mark.well_known_name
            ))
        })?;
        let stroke_color = combine_color(
            mark.stroke_color.clone(), mark.stroke_opacity
        );
        let stroke = if stroke_color.is_some() || mark.stroke_width.is_some() {
            Some(self.stroke(Stroke {
                color: stroke_color,
                width: mark.stroke_width,
                .. Default::default()
            }))
        }
        else {
            None
        };
        let [offset_x, offset_y] = mark.offset.unwrap_or([0., 0.]);
        let text = Text {
            text: Some(ch.to_string()),
            font: Some(mark_font(
                &glyph.family,
                mark.radius.unwrap_or(self.config().mark_radius)
            )),
            fill: self.fill(combine_color(
                mark.color.clone(), mark.fill_opacity
            )),
            stroke,
            offset_x,
            offset_y,
            rotation: mark.rotation(),
            .. Default::default()
        };
        Ok(self.constructors().style(OlStyle {
            text: Some(self.constructors().text(text)),
            .. Default::default()
        }))
    }
}


//============ Tests =========================================================
