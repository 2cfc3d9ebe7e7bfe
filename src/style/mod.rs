//! The neutral style model.
//!
//! A [`Style`] is a named list of [`Rule`]s. Each rule decides via its
//! filter and scale range whether it applies to a feature and carries the
//! symbolizers to draw the feature with. The model follows the JSON layout
//! of GeoStyler styles so styles can be loaded with `serde_json`.

use serde::{Deserialize, Serialize};

pub use self::filter::{ComparisonOperator, Filter, Operand};
pub use self::function::{
    Arg, CaseArm, Expression, Function, FunctionKind, Interpolation,
    InterpolationStop, StepBoundary,
};
pub use self::symbolizer::{
    FillSymbolizer, FontStyle, FontWeight, IconImage, IconSymbolizer,
    LineCap, LineJoin, LineSymbolizer, MarkSymbolizer, RasterSymbolizer,
    Sprite, Symbolizer, TextPlacement, TextSymbolizer,
};

pub mod filter;
pub mod function;
pub mod symbolizer;


//------------ Style ---------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct Style {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl Style {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Style { name: name.into(), rules }
    }

    /// Calls `op` for every function used anywhere in the style.
    pub fn walk_functions(&self, op: &mut impl FnMut(&Function)) {
        self.rules.iter().for_each(|rule| rule.walk_functions(op))
    }

    /// Returns whether the style uses any function.
    pub fn has_functions(&self) -> bool {
        let mut found = false;
        self.walk_functions(&mut |_| found = true);
        found
    }
}


//------------ Rule ----------------------------------------------------------

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Filter>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_denominator: Option<ScaleDenominator>,

    #[serde(default)]
    pub symbolizers: Vec<Symbolizer>,
}

impl Rule {
    pub fn new(symbolizers: Vec<Symbolizer>) -> Self {
        Rule { symbolizers, .. Default::default() }
    }

    /// Returns whether the rule has a scale range with at least one bound.
    pub fn has_scale_range(&self) -> bool {
        self.scale_denominator.as_ref().map(|scale| {
            scale.min.is_some() || scale.max.is_some()
        }).unwrap_or(false)
    }

    pub fn walk_functions(&self, op: &mut impl FnMut(&Function)) {
        if let Some(ref filter) = self.filter {
            filter.walk_functions(op)
        }
        if let Some(ref scale) = self.scale_denominator {
            if let Some(ref min) = scale.min {
                min.walk(op)
            }
            if let Some(ref max) = scale.max {
                max.walk(op)
            }
        }
        self.symbolizers.iter().for_each(|sym| sym.walk_functions(op))
    }
}


//------------ ScaleDenominator ----------------------------------------------

/// The range of map scales a rule applies to.
///
/// The minimum is inclusive, the maximum exclusive.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ScaleDenominator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<Expression<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<Expression<f64>>,
}


//============ Tests =========================================================
