//! Assembling native styles from neutral styles.
//!
//! A neutral style is written in one of three shapes. Simple styles with
//! a single unconditional rule become a single native style or a list of
//! native styles. Everything else becomes a [`StyleFunction`] that picks
//! and translates the rules for each feature when it is drawn.

use std::sync::Arc;
use crate::error::Error;
use crate::eval::filter::matches;
use crate::eval::resolve_opt;
use crate::feature::Feature;
use crate::ol::{OlStyle, OlStyleLike};
use crate::style::{Rule, Style, Symbolizer};
use crate::translate::Translator;


/// Inches per meter used for converting resolutions into scales.
const INCHES_PER_METER: f64 = 39.37;

/// The resolution of the screen in dots per inch.
///
/// This is the standard pixel size of 0.28 mm.
const DOTS_PER_INCH: f64 = 25.4 / 0.28;


//------------ OutputShape ---------------------------------------------------

/// The shape of the native output for a style.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OutputShape {
    /// A single static style.
    Single,

    /// A list of static styles.
    Array,

    /// A function evaluated per feature.
    Function,
}

impl OutputShape {
    /// Determines the output shape for a style.
    pub fn of(style: &Style) -> Self {
        let rule = match style.rules.as_slice() {
            [rule] => rule,
            _ => return OutputShape::Function
        };
        let dynamic = rule.filter.is_some()
            || rule.has_scale_range()
            || rule.symbolizers.iter().any(|sym| {
                matches!(*sym, Symbolizer::Text(_))
                    || sym.is_templated_icon()
                    || sym.is_hidden()
            })
            || style.has_functions();
        if dynamic {
            OutputShape::Function
        }
        else if rule.symbolizers.len() > 1 {
            OutputShape::Array
        }
        else {
            OutputShape::Single
        }
    }
}


//------------ assemble ------------------------------------------------------

/// Writes a style in the shape it requires.
///
/// Graphic fill patterns should be loaded through the translator before
/// calling this. Missing ones are loaded in the background.
pub fn assemble(
    style: Arc<Style>, translator: Arc<Translator>
) -> Result<OlStyleLike, Error> {
    match OutputShape::of(&style) {
        OutputShape::Single => {
            let symbolizer = style.rules.first().and_then(|rule| {
                rule.symbolizers.first()
            });
            match symbolizer {
                Some(symbolizer) => {
                    translator.write_symbolizer(
                        symbolizer, None
                    ).map(Into::into)
                }
                None => Ok(translator.default_style().into())
            }
        }
        OutputShape::Array => {
            let mut res = Vec::new();
            for rule in &style.rules {
                for symbolizer in &rule.symbolizers {
                    res.push(translator.write_symbolizer(symbolizer, None)?);
                }
            }
            Ok(res.into())
        }
        OutputShape::Function => {
            Ok(OlStyleLike::Function(StyleFunction::new(style, translator)))
        }
    }
}


//------------ StyleFunction -------------------------------------------------

/// A style translated per feature.
///
/// The function keeps the neutral style it was created from so it can be
/// read back unchanged.
#[derive(Clone, Debug)]
pub struct StyleFunction {
    style: Arc<Style>,
    translator: Arc<Translator>,
}

impl StyleFunction {
    pub fn new(style: Arc<Style>, translator: Arc<Translator>) -> Self {
        StyleFunction { style, translator }
    }

    /// Returns the neutral style the function was created from.
    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Returns the map scale for a resolution in map units per pixel.
    pub fn scale(&self, resolution: f64) -> f64 {
        resolution
            * self.translator.config().units.meters_per_unit()
            * INCHES_PER_METER
            * DOTS_PER_INCH
    }

    /// Returns the native styles for drawing a feature.
    ///
    /// All rules that apply contribute their styles in order. Rules whose
    /// filter fails to evaluate are skipped. Any other error aborts.
    pub fn call(
        &self, feature: &Feature, resolution: f64
    ) -> Result<Vec<OlStyle>, Error> {
        let scale = self.scale(resolution);
        let mut res = Vec::new();
        for rule in &self.style.rules {
            if !self.within_scale(rule, feature, scale)? {
                continue
            }
            if let Some(ref filter) = rule.filter {
                match matches(filter, feature) {
                    Ok(true) => { }
                    Ok(false) => continue,
                    Err(err) => {
                        log::debug!(
                            "excluding rule '{}': {}",
                            rule.name.as_deref().unwrap_or_default(), err
                        );
                        continue
                    }
                }
            }
            for symbolizer in &rule.symbolizers {
                let visible = resolve_opt(
                    &symbolizer.visibility().cloned(), Some(feature)
                )?.unwrap_or(true);
                if visible {
                    res.push(
                        self.translator.write_symbolizer(
                            symbolizer, Some(feature)
                        )?
                    );
                }
            }
        }
        Ok(res)
    }

    /// Checks the scale range of a rule.
    ///
    /// The minimum is inclusive and the maximum exclusive.
    fn within_scale(
        &self, rule: &Rule, feature: &Feature, scale: f64
    ) -> Result<bool, Error> {
        let range = match rule.scale_denominator {
            Some(ref range) => range,
            None => return Ok(true)
        };
        if let Some(min) = resolve_opt(&range.min, Some(feature))? {
            if scale < min {
                return Ok(false)
            }
        }
        if let Some(max) = resolve_opt(&range.max, Some(feature))? {
            if scale >= max {
                return Ok(false)
            }
        }
        Ok(true)
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn style(value: serde_json::Value) -> Style {
        serde_json::from_value(value).unwrap()
    }

    fn function(value: serde_json::Value) -> StyleFunction {
        match assemble(
            Arc::new(style(value)), Arc::new(Translator::default())
        ).unwrap() {
            OlStyleLike::Function(func) => func,
            _ => panic!("expected function")
        }
    }

    fn resolution_for(scale: f64) -> f64 {
        scale / (INCHES_PER_METER * DOTS_PER_INCH)
    }

    const LINE: &str = "Line";

    #[test]
    fn output_shapes() {
        let line = json!({"kind": LINE, "color": "#000000"});
        assert_eq!(
            OutputShape::of(&style(json!({
                "name": "", "rules": [{"symbolizers": [line]}]
            }))),
            OutputShape::Single
        );
        assert_eq!(
            OutputShape::of(&style(json!({
                "name": "", "rules": [{"symbolizers": [line, line]}]
            }))),
            OutputShape::Array
        );
        for rule in [
            json!({"filter": ["==", "a", 1], "symbolizers": [line]}),
            json!({"scaleDenominator": {"max": 10}, "symbolizers": [line]}),
            json!({"symbolizers": [{"kind": "Text", "label": "x"}]}),
            json!({"symbolizers": [{"kind": "Icon", "image": "{{a}}.png"}]}),
            json!({"symbolizers": [{
                "kind": LINE,
                "width": {"name": "property", "args": ["w"]}
            }]}),
            json!({"symbolizers": [{"kind": LINE, "visibility": false}]}),
        ] {
            assert_eq!(
                OutputShape::of(&style(json!({"name": "", "rules": [rule]}))),
                OutputShape::Function
            );
        }
        assert_eq!(
            OutputShape::of(&style(json!({
                "name": "",
                "rules": [{"symbolizers": [line]}, {"symbolizers": [line]}]
            }))),
            OutputShape::Function
        );
    }

    #[test]
    fn static_outputs() {
        let translator = Arc::new(Translator::default());
        let single = assemble(Arc::new(style(json!({
            "name": "", "rules": [{"symbolizers": [
                {"kind": LINE, "color": "#ff0000", "width": 2}
            ]}]
        }))), translator.clone()).unwrap();
        assert_eq!(
            single.as_style().and_then(|style| style.stroke.as_ref())
                .and_then(|stroke| stroke.width),
            Some(2.)
        );
        let empty = assemble(Arc::new(style(json!({
            "name": "", "rules": [{"symbolizers": []}]
        }))), translator.clone()).unwrap();
        assert_eq!(empty.as_style(), Some(&OlStyle::engine_default()));
        let array = assemble(Arc::new(style(json!({
            "name": "", "rules": [{"symbolizers": [
                {"kind": "Fill", "color": "#ff0000"},
                {"kind": LINE, "color": "#000000"}
            ]}]
        }))), translator).unwrap();
        assert_eq!(array.as_styles().map(<[OlStyle]>::len), Some(2));
    }

    #[test]
    fn scale_gating() {
        let func = function(json!({
            "name": "",
            "rules": [{
                "scaleDenominator": {"min": 1000, "max": 5000},
                "symbolizers": [{"kind": LINE, "color": "#000000"}]
            }]
        }));
        let feature = Feature::new();
        assert_eq!(
            func.call(&feature, resolution_for(2500.)).unwrap().len(), 1
        );
        assert!(func.call(&feature, resolution_for(500.)).unwrap().is_empty());
        assert!(
            func.call(&feature, resolution_for(6000.)).unwrap().is_empty()
        );

        let rule = &func.style().rules[0];
        assert!(func.within_scale(rule, &feature, 1000.).unwrap());
        assert!(!func.within_scale(rule, &feature, 5000.).unwrap());
    }

    #[test]
    fn rules_are_cumulative() {
        let func = function(json!({
            "name": "",
            "rules": [{
                "filter": ["==", "category", "A"],
                "symbolizers": [{"kind": "Fill", "color": "#ff0000"}]
            }, {
                "filter": [">", "pop", 1000],
                "symbolizers": [{"kind": LINE, "color": "#000000"}]
            }, {
                "filter": {"name": "noSuchFunction", "args": []},
                "symbolizers": [{"kind": LINE, "color": "#00ff00"}]
            }]
        }));
        let both = Feature::new().with("category", "A").with("pop", "5000");
        let styles = func.call(&both, 1.).unwrap();
        assert_eq!(styles.len(), 2);
        assert!(styles[0].fill.is_some());
        assert!(styles[1].stroke.is_some());
        let one = Feature::new().with("category", "B").with("pop", 5000);
        assert_eq!(func.call(&one, 1.).unwrap().len(), 1);
    }

    #[test]
    fn visibility() {
        let func = function(json!({
            "name": "",
            "rules": [{
                "symbolizers": [{
                    "kind": LINE,
                    "visibility": {
                        "name": "greaterThan",
                        "args": [{"name": "property", "args": ["lanes"]}, 1]
                    }
                }, {
                    "kind": "Fill",
                    "visibility": false
                }]
            }]
        }));
        assert_eq!(
            func.call(&Feature::new().with("lanes", 2), 1.).unwrap().len(), 1
        );
        assert!(
            func.call(&Feature::new().with("lanes", 1), 1.).unwrap().is_empty()
        );
    }

    #[test]
    fn translation_errors_abort() {
        let func = function(json!({
            "name": "",
            "rules": [{"symbolizers": [{"kind": "Text"}]}]
        }));
        assert!(func.call(&Feature::new(), 1.).is_err());
    }
}
