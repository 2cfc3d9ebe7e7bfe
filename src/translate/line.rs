//! Writing line symbolizers.

use smallvec::SmallVec;
use crate::error::{Error, EvaluationError};
use crate::eval::resolve_opt;
use crate::feature::Feature;
use crate::ol::{OlStyle, Stroke};
use crate::style::{LineCap, LineJoin, LineSymbolizer};
use super::{combine_color, Translator};


//------------ ResolvedLine --------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedLine {
    pub color: Option<String>,
    pub opacity: Option<f64>,
    pub width: Option<f64>,
    pub cap: Option<LineCap>,
    pub join: Option<LineJoin>,
    pub dasharray: Option<Vec<f64>>,
    pub dash_offset: Option<f64>,
}

impl ResolvedLine {
    pub fn resolve(
        sym: &LineSymbolizer, feature: Option<&Feature>
    ) -> Result<Self, EvaluationError> {
        Ok(ResolvedLine {
            color: resolve_opt(&sym.color, feature)?,
            opacity: resolve_opt(&sym.opacity, feature)?,
            width: resolve_opt(&sym.width, feature)?,
            cap: resolve_opt(&sym.cap, feature)?,
            join: resolve_opt(&sym.join, feature)?,
            dasharray: resolve_opt(&sym.dasharray, feature)?,
            dash_offset: resolve_opt(&sym.dash_offset, feature)?,
        })
    }
}


//------------ Translator ----------------------------------------------------

impl Translator {
    pub fn write_line(
        &self, sym: &LineSymbolizer, feature: Option<&Feature>
    ) -> Result<OlStyle, Error> {
        let line = ResolvedLine::resolve(sym, feature)?;
        let stroke = self.stroke(Stroke {
            color: combine_color(line.color, line.opacity),
            width: line.width,
            line_cap: line.cap,
            line_join: line.join,
            line_dash: line.dasharray.map(SmallVec::from_vec),
            line_dash_offset: line.dash_offset,
        });
        Ok(self.constructors().style(OlStyle {
            stroke: Some(stroke),
            .. Default::default()
        }))
    }
}


//============ Tests =========================================================
