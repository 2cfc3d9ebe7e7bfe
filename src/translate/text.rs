//! Writing text symbolizers.

use crate::error::{Error, EvaluationError, TranslationError};
use crate::eval::resolve_opt;
use crate::feature::Feature;
use crate::font::Font;
use crate::ol::{OlStyle, Placement, Stroke, Text};
use crate::style::{
    Expression, FontStyle, FontWeight, TextPlacement, TextSymbolizer,
};
use crate::template;
use super::{combine_color, Translator};


//------------ ResolvedText --------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedText {
    /// The label with attribute placeholders filled in.
    pub label: Option<String>,
    pub placement: Option<TextPlacement>,
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub halo_color: Option<String>,
    pub halo_opacity: Option<f64>,
    pub halo_width: Option<f64>,
    pub font: Option<Vec<String>>,
    pub size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub rotate: Option<f64>,
    pub offset: Option<[f64; 2]>,
    pub allow_overlap: Option<bool>,
}

impl ResolvedText {
    pub fn resolve(
        sym: &TextSymbolizer, feature: Option<&Feature>
    ) -> Result<Self, EvaluationError> {
        let label = match sym.label {
            Some(Expression::Literal(ref label)) => {
                if template::is_template(label) {
                    let empty = Feature::new();
                    Some(template::resolve(
                        label, feature.unwrap_or(&empty), ""
                    ))
                }
                else {
                    Some(label.clone())
                }
            }
            ref label => resolve_opt(label, feature)?
        };
        Ok(ResolvedText {
            label,
            placement: resolve_opt(&sym.placement, feature)?,
            color: resolve_opt(&sym.color, feature)?,
            opacity: resolve_opt(&sym.opacity, feature)?,
            halo_color: resolve_opt(&sym.halo_color, feature)?,
            halo_opacity: resolve_opt(&sym.halo_opacity, feature)?,
            halo_width: resolve_opt(&sym.halo_width, feature)?,
            font: resolve_opt(&sym.font, feature)?,
            size: resolve_opt(&sym.size, feature)?,
            font_weight: resolve_opt(&sym.font_weight, feature)?,
            font_style: resolve_opt(&sym.font_style, feature)?,
            rotate: resolve_opt(&sym.rotate, feature)?,
            offset: resolve_opt(&sym.offset, feature)?,
            allow_overlap: resolve_opt(&sym.allow_overlap, feature)?,
        })
    }

    /// Returns the font shorthand for the label.
    fn font(&self, default_size: f64, default_family: &str) -> String {
        let families = match self.font {
            Some(ref font) if !font.is_empty() => font.clone(),
            _ => vec![default_family.into()]
        };
        Font::new(
            self.font_weight.unwrap_or(FontWeight::Normal),
            self.font_style.unwrap_or(FontStyle::Normal),
            self.size.filter(|size| size.is_finite()).unwrap_or(default_size),
            families
        ).to_string()
    }
}


//------------ Translator ----------------------------------------------------

impl Translator {
    pub fn write_text(
        &self, sym: &TextSymbolizer, feature: Option<&Feature>
    ) -> Result<OlStyle, Error> {
        if sym.label.is_none() {
            return Err(
                TranslationError::new("text symbolizer without label").into()
            )
        }
        let resolved = ResolvedText::resolve(sym, feature)?;

        // Line center placement doesn't exist natively.
        let placement = match resolved.placement {
            Some(TextPlacement::Line) | Some(TextPlacement::LineCenter) => {
                Placement::Line
            }
            Some(TextPlacement::Point) | None => Placement::Point,
        };
        let stroke = self.stroke(Stroke {
            color: combine_color(
                resolved.halo_color.clone(),
                resolved.halo_opacity.or(resolved.opacity)
            ),
            width: Some(resolved.halo_width.unwrap_or(0.)),
            .. Default::default()
        });
        let [offset_x, offset_y] = resolved.offset.unwrap_or([0., 0.]);
        let text = Text {
            font: Some(resolved.font(
                self.config().font_size, &self.config().font_family
            )),
            fill: self.fill(combine_color(
                resolved.color.clone(), resolved.opacity
            )),
            stroke: Some(stroke),
            offset_x,
            offset_y,
            rotation: resolved.rotate.filter(|rotate| rotate.is_finite())
                .unwrap_or(0.).to_radians(),
            overflow: resolved.allow_overlap.unwrap_or(false),
            placement: Some(placement),
            text: resolved.label,
        };
        Ok(self.constructors().style(OlStyle {
            text: Some(self.constructors().text(text)),
            .. Default::default()
        }))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use crate::ol::Fill;

    fn text(value: serde_json::Value, feature: Option<&Feature>) -> Text {
        let sym: TextSymbolizer = serde_json::from_value(value).unwrap();
        Translator::default().write_text(&sym, feature).unwrap().text.unwrap()
    }

    #[test]
    fn full_text() {
        let text = text(json!({
            "label": "Main Street",
            "placement": "line-center",
            "color": "#000000",
            "opacity": 0.5,
            "haloColor": "#ffffff",
            "haloWidth": 2,
            "font": ["Arial", "sans-serif"],
            "size": 14,
            "fontWeight": "bold",
            "rotate": 90,
            "offset": [0, 10],
            "allowOverlap": true
        }), None);
        assert_eq!(text.text.as_deref(), Some("Main Street"));
        assert_eq!(text.placement, Some(Placement::Line));
        assert_eq!(
            text.font.as_deref(), Some("bold normal 14px Arial, sans-serif")
        );
        assert_eq!(
            text.fill.as_ref().and_then(Fill::color_str),
            Some("rgba(0, 0, 0, 0.5)")
        );
        let stroke = text.stroke.unwrap();
        assert_eq!(stroke.color.as_deref(), Some("rgba(255, 255, 255, 0.5)"));
        assert_eq!(stroke.width, Some(2.));
        assert_eq!(text.offset_y, 10.);
        assert!(text.overflow);
        assert!((text.rotation - std::f64::consts::FRAC_PI_2).abs() < 1e-9);
    }

    #[test]
    fn halo_opacity_wins() {
        let text = text(json!({
            "label": "x",
            "opacity": 0.5,
            "haloColor": "#ffffff",
            "haloOpacity": 1
        }), None);
        assert_eq!(
            text.stroke.unwrap().color.as_deref(),
            Some("rgba(255, 255, 255, 1)")
        );
    }

    #[test]
    fn templated_label() {
        let feature = Feature::new().with("name", "Berlin").with("pop", 3);
        let text = text(json!({
            "label": "{{name}} ({{pop}}) {{missing}}"
        }), Some(&feature));
        assert_eq!(text.text.as_deref(), Some("Berlin (3) "));
        assert_eq!(text.font.as_deref(), Some("normal normal 10px sans-serif"));
        assert_eq!(text.placement, Some(Placement::Point));
    }

    #[test]
    fn function_label() {
        let feature = Feature::new().with("name", "berlin");
        let text = text(json!({
            "label": {
                "name": "strToUpperCase",
                "args": [{"name": "property", "args": ["name"]}]
            }
        }), Some(&feature));
        assert_eq!(text.text.as_deref(), Some("BERLIN"));
    }

    #[test]
    fn missing_label() {
        assert!(Translator::default().write_text(
            &TextSymbolizer::default(), None
        ).is_err());
    }
}
