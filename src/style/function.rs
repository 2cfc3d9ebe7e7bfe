//! Data-driven function expressions.
//!
//! A function is a node `{"name": ..., "args": [...]}`. Its arguments are
//! literal values, nested functions, or one of the special argument forms
//! used by `case`, `interpolate`, and `step`.

use serde::{Deserialize, Serialize};
use serde_json::Value;


//------------ Function ------------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Function {
    pub name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<Arg>,
}

impl Function {
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Function { name: name.into(), args }
    }

    /// A shortcut for the `property` function.
    pub fn property(name: impl Into<String>) -> Self {
        Function::new(
            "property", vec![Arg::Literal(Value::String(name.into()))]
        )
    }

    pub fn kind(&self) -> FunctionKind {
        FunctionKind::of(&self.name)
    }

    /// Calls `op` for this function and every function nested in it.
    pub fn walk(&self, op: &mut impl FnMut(&Function)) {
        op(self);
        for arg in &self.args {
            match *arg {
                Arg::Function(ref func) => func.walk(op),
                Arg::Case(ref arm) => {
                    arm.case.walk(op);
                    arm.value.walk(op);
                }
                Arg::Stop(ref stop) => {
                    stop.stop.walk(op);
                    stop.value.walk(op);
                }
                Arg::Boundary(ref boundary) => {
                    boundary.boundary.walk(op);
                    boundary.value.walk(op);
                }
                Arg::Interpolation(_) | Arg::Literal(_) => { }
            }
        }
    }
}


//------------ Arg -----------------------------------------------------------

/// A function argument.
///
/// The variants are tried in order during deserialization, so an object
/// with a `name` of `linear` or `exponential` is an interpolation mode
/// and never a function.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Arg {
    Interpolation(Interpolation),
    Function(Function),
    Case(CaseArm),
    Stop(InterpolationStop),
    Boundary(StepBoundary),
    Literal(Value),
}

impl From<Function> for Arg {
    fn from(func: Function) -> Self {
        Arg::Function(func)
    }
}

impl From<Value> for Arg {
    fn from(value: Value) -> Self {
        Arg::Literal(value)
    }
}


//------------ CaseArm -------------------------------------------------------

/// One arm of a `case` function.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CaseArm {
    pub case: Expression<bool>,
    pub value: Expression<Value>,
}


//------------ Interpolation -------------------------------------------------

/// The mode of an `interpolate` function.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(tag = "name", rename_all = "lowercase")]
pub enum Interpolation {
    Linear,
    Exponential { base: f64 },
}


//------------ InterpolationStop ---------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct InterpolationStop {
    pub stop: Expression<f64>,
    pub value: Expression<Value>,
}


//------------ StepBoundary --------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StepBoundary {
    pub boundary: Expression<f64>,
    pub value: Expression<Value>,
}


//------------ Expression ----------------------------------------------------

/// A property value that is either a literal or a function.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Expression<T> {
    Function(Function),
    Literal(T),
}

impl<T> Expression<T> {
    pub fn is_function(&self) -> bool {
        matches!(*self, Expression::Function(_))
    }

    pub fn as_literal(&self) -> Option<&T> {
        match *self {
            Expression::Literal(ref value) => Some(value),
            Expression::Function(_) => None,
        }
    }

    pub fn walk(&self, op: &mut impl FnMut(&Function)) {
        if let Expression::Function(ref func) = *self {
            func.walk(op)
        }
    }
}

impl<T> From<T> for Expression<T> {
    fn from(value: T) -> Self {
        Expression::Literal(value)
    }
}


//------------ FunctionKind --------------------------------------------------

/// The type of value a function returns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FunctionKind {
    Number,
    String,
    Boolean,
    Unknown,
}

impl FunctionKind {
    pub fn of(name: &str) -> Self {
        match name {
            "abs" | "acos" | "add" | "asin" | "atan" | "atan2" | "ceil"
            | "cos" | "div" | "exp" | "floor" | "interpolate" | "log"
            | "max" | "min" | "modulo" | "mul" | "pi" | "pow" | "random"
            | "rint" | "round" | "sin" | "sqrt" | "strIndexOf"
            | "strLastIndexOf" | "strLength" | "sub" | "tan" | "toDegrees"
            | "toNumber" | "toRadians" => FunctionKind::Number,

            "numberFormat" | "strAbbreviate" | "strCapitalize" | "strConcat"
            | "strDefaultIfBlank" | "strReplace" | "strStripAccents"
            | "strSubstring" | "strSubstringStart" | "strToLowerCase"
            | "strToString" | "strToUpperCase" | "strTrim"
            => FunctionKind::String,

            "all" | "any" | "between" | "double2bool" | "equalTo"
            | "greaterThan" | "greaterThanOrEqualTo" | "in" | "lessThan"
            | "lessThanOrEqualTo" | "not" | "notEqualTo" | "parseBoolean"
            | "strEndsWith" | "strEqualsIgnoreCase" | "strMatches"
            | "strStartsWith" => FunctionKind::Boolean,

            _ => FunctionKind::Unknown,
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_nested() {
        let func: Function = serde_json::from_value(json!({
            "name": "add",
            "args": [1, {"name": "property", "args": ["pop"]}]
        })).unwrap();
        assert_eq!(func.kind(), FunctionKind::Number);
        assert_eq!(func.args[0], Arg::Literal(json!(1)));
        assert_eq!(func.args[1], Arg::Function(Function::property("pop")));
    }

    #[test]
    fn parse_special_args() {
        let func: Function = serde_json::from_value(json!({
            "name": "interpolate",
            "args": [
                {"name": "exponential", "base": 2},
                {"name": "property", "args": ["x"]},
                {"stop": 0, "value": 1},
                {"stop": 10, "value": 5}
            ]
        })).unwrap();
        assert_eq!(
            func.args[0],
            Arg::Interpolation(Interpolation::Exponential { base: 2. })
        );
        assert!(matches!(func.args[2], Arg::Stop(_)));

        let func: Function = serde_json::from_value(json!({
            "name": "case",
            "args": [
                {"case": true, "value": "a"},
                "b"
            ]
        })).unwrap();
        assert!(matches!(func.args[0], Arg::Case(_)));
        assert_eq!(func.args[1], Arg::Literal(json!("b")));
    }

    #[test]
    fn expression_literal_or_function() {
        let expr: Expression<f64> = serde_json::from_value(json!(4)).unwrap();
        assert_eq!(expr, Expression::Literal(4.));
        let expr: Expression<f64> = serde_json::from_value(
            json!({"name": "pi"})
        ).unwrap();
        assert!(expr.is_function());
    }

    #[test]
    fn walk_finds_nested() {
        let func: Function = serde_json::from_value(json!({
            "name": "case",
            "args": [
                {
                    "case": {"name": "equalTo", "args": [1, 1]},
                    "value": {"name": "strTrim", "args": [" a "]}
                },
                "b"
            ]
        })).unwrap();
        let mut names = Vec::new();
        func.walk(&mut |func| names.push(func.name.clone()));
        assert_eq!(names, ["case", "equalTo", "strTrim"]);
    }
}
