//! Matching features against filters.

use serde_json::Value;
use crate::error::EvaluationError;
use crate::feature::Feature;
use crate::style::{ComparisonOperator, Filter, Operand};
use super::{evaluate, to_js_string, to_number, truthy};


//------------ matches -------------------------------------------------------

/// Returns whether a feature matches a filter.
///
/// Both sides of a combination are always evaluated, so an error in any
/// sub-filter fails the whole filter.
pub fn matches(
    filter: &Filter, feature: &Feature
) -> Result<bool, EvaluationError> {
    match *filter {
        Filter::Literal(value) => Ok(value),
        Filter::Function(ref func) => {
            evaluate(func, Some(feature)).map(|value| truthy(&value))
        }
        Filter::Comparison { operator, ref lhs, ref rhs } => {
            let lhs = operand(lhs, feature)?;
            let rhs = operand(rhs, feature)?;
            Ok(compare(operator, lhs.as_ref(), rhs.as_ref()))
        }
        Filter::Between { ref lhs, ref lower, ref upper } => {
            let value = operand_number(operand(lhs, feature)?.as_ref());
            let lower = operand_number(operand(lower, feature)?.as_ref());
            let upper = operand_number(operand(upper, feature)?.as_ref());
            Ok(value >= lower && value <= upper)
        }
        Filter::And(ref filters) => {
            let mut res = true;
            for filter in filters {
                res &= matches(filter, feature)?;
            }
            Ok(res)
        }
        Filter::Or(ref filters) => {
            let mut res = false;
            for filter in filters {
                res |= matches(filter, feature)?;
            }
            Ok(res)
        }
        Filter::Not(ref filter) => matches(filter, feature).map(|res| !res),
    }
}

/// Evaluates an operand.
///
/// Returns `None` for attributes the feature doesn't have.
fn operand(
    operand: &Operand, feature: &Feature
) -> Result<Option<Value>, EvaluationError> {
    match *operand {
        Operand::Property(ref name) => Ok(feature.get(name).cloned()),
        Operand::Function(ref func) => evaluate(func, Some(feature)).map(Some),
        Operand::Literal(ref value) => Ok(Some(value.clone())),
    }
}

fn operand_number(operand: Option<&Value>) -> f64 {
    operand.map(to_number).unwrap_or(f64::NAN)
}

/// Converts an operand to a string.
///
/// Missing attributes become `undefined` while null values become `null`.
fn operand_string(operand: Option<&Value>) -> String {
    operand.map(to_js_string).unwrap_or_else(|| "undefined".into())
}

fn compare(
    op: ComparisonOperator, lhs: Option<&Value>, rhs: Option<&Value>
) -> bool {
    use self::ComparisonOperator::*;

    match op {
        Equal => operand_string(lhs) == operand_string(rhs),
        NotEqual => operand_string(lhs) != operand_string(rhs),
        Less => operand_number(lhs) < operand_number(rhs),
        LessOrEqual => operand_number(lhs) <= operand_number(rhs),
        Greater => operand_number(lhs) > operand_number(rhs),
        GreaterOrEqual => operand_number(lhs) >= operand_number(rhs),
        Like => {
            match (lhs, rhs) {
                (
                    Some(Value::String(haystack)),
                    Some(Value::String(needle))
                ) => {
                    needle.len() <= haystack.len()
                        && haystack.contains(needle.as_str())
                }
                _ => false
            }
        }
    }
}


//============ Tests =========================================================
