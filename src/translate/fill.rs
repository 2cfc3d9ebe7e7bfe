//! Writing fill symbolizers.
//!
//! A fill may carry a graphic fill, a mark or icon repeated across the
//! area. Its pattern is best loaded beforehand via
//! [`Translator::prepare_patterns`]. If it wasn't, the fill is drawn
//! without it while the pattern loads in the background.

use std::f64::consts::FRAC_PI_2;
use smallvec::SmallVec;
use crate::error::{Error, EvaluationError, TranslationError};
use crate::eval::resolve_opt;
use crate::feature::Feature;
use crate::ol::{FillColor, Image, OlStyle, Stroke};
use crate::pattern::PatternSpec;
use crate::style::{FillSymbolizer, Symbolizer};
use crate::svg::{self, shapes, SvgProperties};
use super::{combine_color, Translator};


//------------ ResolvedFill --------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedFill {
    pub color: Option<String>,
    pub fill_opacity: Option<f64>,
    pub outline_color: Option<String>,
    pub outline_opacity: Option<f64>,
    pub outline_width: Option<f64>,
    pub outline_dasharray: Option<Vec<f64>>,
}

impl ResolvedFill {
    pub fn resolve(
        sym: &FillSymbolizer, feature: Option<&Feature>
    ) -> Result<Self, EvaluationError> {
        Ok(ResolvedFill {
            color: resolve_opt(&sym.color, feature)?,
            fill_opacity: resolve_opt(&sym.fill_opacity, feature)?,
            outline_color: resolve_opt(&sym.outline_color, feature)?,
            outline_opacity: resolve_opt(&sym.outline_opacity, feature)?,
            outline_width: resolve_opt(&sym.outline_width, feature)?,
            outline_dasharray: resolve_opt(&sym.outline_dasharray, feature)?,
        })
    }
}


//------------ Translator ----------------------------------------------------

impl Translator {
    pub fn write_fill(
        &self, sym: &FillSymbolizer, feature: Option<&Feature>
    ) -> Result<OlStyle, Error> {
        let resolved = ResolvedFill::resolve(sym, feature)?;
        let mut fill = self.fill(
            combine_color(resolved.color, resolved.fill_opacity)
        );
        let has_outline = resolved.outline_color.is_some()
            || resolved.outline_width.is_some();
        let stroke = if has_outline {
            Some(self.stroke(Stroke {
                color: combine_color(
                    resolved.outline_color, resolved.outline_opacity
                ),
                width: resolved.outline_width,
                line_dash: resolved.outline_dasharray.map(SmallVec::from_vec),
                .. Default::default()
            }))
        }
        else {
            None
        };

        if let Some(ref graphic_fill) = sym.graphic_fill {
            let spec = self.pattern_spec(graphic_fill, feature)?;
            match self.cached_pattern(&spec.key()) {
                Some(pattern) => {
                    let mut res = fill.unwrap_or_default();
                    res.color = Some(FillColor::Pattern(pattern));
                    fill = Some(self.constructors().fill(res));
                }
                None => self.load_pattern(spec)
            }
        }

        Ok(self.constructors().style(OlStyle {
            fill,
            stroke,
            .. Default::default()
        }))
    }

    /// Determines the pattern for a graphic fill.
    pub fn pattern_spec(
        &self, graphic_fill: &Symbolizer, feature: Option<&Feature>
    ) -> Result<PatternSpec, Error> {
        let default_size = self.config().pattern_icon_size;
        match *graphic_fill {
            Symbolizer::Icon(ref sym) => {
                let icon = match self.write_icon(sym, feature)?.image {
                    Some(Image::Icon(icon)) => icon,
                    _ => {
                        return Err(TranslationError::new(
                            "graphic fill icon without image"
                        ).into())
                    }
                };
                let icon_size = match (icon.size, icon.width) {
                    (Some(size), _) => size,
                    (None, Some(width)) => [width, width],
                    (None, None) => [default_size, default_size],
                };
                Ok(PatternSpec {
                    cross_origin: icon.cross_origin.clone(),
                    rotation: icon.rotation,
                    .. PatternSpec::new(icon.src.clone(), icon_size)
                })
            }
            Symbolizer::Mark(ref sym) => {
                let icon = match self.write_mark(sym, feature)?.image {
                    Some(Image::Icon(icon)) => icon,
                    _ => {
                        return Err(TranslationError::new(
                            "graphic fill marks must be shapes"
                        ).into())
                    }
                };
                let mut res = PatternSpec {
                    cross_origin: icon.cross_origin.clone(),
                    rotation: icon.rotation,
                    .. PatternSpec::new(
                        icon.src.clone(), [default_size, default_size]
                    )
                };
                let props = svg::decode(&icon.src).map(|svg| {
                    SvgProperties::parse(&svg)
                }).transpose()?.unwrap_or_default();
                if props.dimensions > 0. {
                    res.icon_size = [props.dimensions, props.dimensions];
                    if shapes::is_line(&props.id) {
                        // Lines that aren't horizontal or vertical are
                        // stretched so they meet in the tile corners.
                        if (icon.rotation / FRAC_PI_2).fract() != 0. {
                            res.scale = icon.rotation.cos().abs()
                                + icon.rotation.sin().abs();
                        }
                    }
                    else {
                        res.spacing = 2.;
                    }
                }
                Ok(res)
            }
            ref other => {
                Err(TranslationError::new(format!(
                    "unsupported graphic fill kind '{}'", other.kind_name()
                )).into())
            }
        }
    }
}


//============ Tests =========================================================
