//! Evaluation of function expressions.
//!
//! Functions are evaluated against the attributes of an optional feature.
//! Arguments are always resolved left to right before the function itself
//! is applied, even for functions that would not need all of them.
//!
//! Values are loosely typed. The coercion rules between numbers, strings
//! and booleans follow those of the scripting environment the native
//! styles come from, so that `5` and `"5"` compare equal as strings and
//! `"12"` is a perfectly good number.

use std::cell::Cell;
use std::cmp::Ordering;
use std::collections::hash_map::RandomState;
use std::f64::consts::PI;
use std::hash::BuildHasher;
use icu_normalizer::DecomposingNormalizerBorrowed;
use regex::RegexBuilder;
use serde_json::{Number, Value};
use crate::error::EvaluationError;
use crate::feature::Feature;
use crate::style::{
    Arg, Expression, FontStyle, FontWeight, Function, FunctionKind,
    IconImage, Interpolation, LineCap, LineJoin, TextPlacement,
};

pub use self::filter::matches;

pub mod filter;


//------------ Evaluating functions ------------------------------------------

/// Evaluates a function.
pub fn evaluate(
    func: &Function, feature: Option<&Feature>
) -> Result<Value, EvaluationError> {
    let name = func.name.as_str();
    match name {
        "property" => return property(func, feature),
        "case" => return case(func, feature),
        "interpolate" => return interpolate(func, feature).map(from_f64),
        "step" => return step(func, feature),
        _ => { }
    }

    let args = Arguments::resolve(func, feature)?;
    match name {
        // Functions we don't actually implement.
        "atan2" | "rint" | "numberFormat" | "strAbbreviate" => {
            return Ok(args.values.into_iter().next().unwrap_or(Value::Null))
        }
        "double2bool" => return Ok(Value::Bool(false)),
        _ => { }
    }

    match FunctionKind::of(name) {
        FunctionKind::Number => number_function(args).map(from_f64),
        FunctionKind::String => string_function(args).map(Value::String),
        FunctionKind::Boolean => boolean_function(args).map(Value::Bool),
        FunctionKind::Unknown => Err(EvaluationError::unknown_function(name)),
    }
}

/// Evaluates a function and converts the result to a number.
pub fn evaluate_number(
    func: &Function, feature: Option<&Feature>
) -> Result<f64, EvaluationError> {
    evaluate(func, feature).map(|value| to_number(&value))
}

/// Evaluates a function and converts the result to a string.
pub fn evaluate_string(
    func: &Function, feature: Option<&Feature>
) -> Result<String, EvaluationError> {
    evaluate(func, feature).map(|value| to_js_string(&value))
}

/// Evaluates a function and converts the result to a boolean.
pub fn evaluate_boolean(
    func: &Function, feature: Option<&Feature>
) -> Result<bool, EvaluationError> {
    evaluate(func, feature).map(|value| truthy(&value))
}


//------------ Special forms -------------------------------------------------

fn property(
    func: &Function, feature: Option<&Feature>
) -> Result<Value, EvaluationError> {
    let feature = feature.ok_or_else(|| {
        EvaluationError::no_feature("property")
    })?;
    let name = match func.args.first() {
        Some(Arg::Literal(Value::String(name))) => name.clone(),
        Some(Arg::Function(inner)) => evaluate_string(inner, Some(feature))?,
        Some(_) => {
            return Err(EvaluationError::new(
                "property", "attribute name must be a string"
            ))
        }
        None => return Err(EvaluationError::missing_argument("property", 0))
    };
    Ok(feature.get(&name).cloned().unwrap_or(Value::Null))
}

/// Evaluates `case`.
///
/// The arguments are arms followed by an optional fallback value. Every
/// arm is evaluated before the first matching one is picked.
fn case(
    func: &Function, feature: Option<&Feature>
) -> Result<Value, EvaluationError> {
    let mut arms = Vec::with_capacity(func.args.len());
    let mut fallback = Value::Null;
    let last = func.args.len().saturating_sub(1);
    for (idx, arg) in func.args.iter().enumerate() {
        match *arg {
            Arg::Case(ref arm) => {
                arms.push((
                    resolve_expression(&arm.case, feature)?,
                    resolve_expression(&arm.value, feature)?,
                ));
            }
            ref other if idx == last => {
                fallback = resolve_arg(other, "case", feature)?;
            }
            _ => {
                return Err(EvaluationError::new(
                    "case", format!("argument {} is not a case arm", idx + 1)
                ))
            }
        }
    }
    Ok(arms.into_iter().find(|(matched, _)| *matched).map(|(_, value)| {
        value
    }).unwrap_or(fallback))
}

/// Evaluates `interpolate` over its stops.
///
/// Inputs outside the stop range are clamped to the first or last value.
fn interpolate(
    func: &Function, feature: Option<&Feature>
) -> Result<f64, EvaluationError> {
    let mode = match func.args.first() {
        Some(Arg::Interpolation(mode)) => *mode,
        Some(Arg::Function(mode)) => {
            return Err(EvaluationError::new(
                "interpolate",
                format!("unsupported interpolation '{}'", mode.name)
            ))
        }
        _ => return Err(EvaluationError::missing_argument("interpolate", 0))
    };
    let input = match func.args.get(1) {
        Some(arg) => to_number(&resolve_arg(arg, "interpolate", feature)?),
        None => return Err(EvaluationError::missing_argument("interpolate", 1))
    };
    let mut stops = Vec::new();
    for arg in func.args.iter().skip(2) {
        match *arg {
            Arg::Stop(ref stop) => {
                stops.push((
                    resolve_expression(&stop.stop, feature)?,
                    to_number(&resolve_expression(&stop.value, feature)?),
                ))
            }
            _ => {
                return Err(EvaluationError::new(
                    "interpolate", "expected stop"
                ))
            }
        }
    }
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Err(EvaluationError::new("interpolate", "no stops"))
    };
    if input <= first.0 {
        return Ok(first.1)
    }
    if input >= last.0 {
        return Ok(last.1)
    }
    for window in stops.windows(2) {
        let ((x0, y0), (x1, y1)) = (window[0], window[1]);
        if input >= x0 && input < x1 {
            let t = match mode {
                Interpolation::Linear => (input - x0) / (x1 - x0),
                Interpolation::Exponential { base } => {
                    if (base - 1.).abs() < f64::EPSILON {
                        (input - x0) / (x1 - x0)
                    }
                    else {
                        (base.powf(input - x0) - 1.)
                        / (base.powf(x1 - x0) - 1.)
                    }
                }
            };
            return Ok(y0 + t * (y1 - y0))
        }
    }
    Ok(last.1)
}

/// Evaluates `step`: input, default value, then ascending boundaries.
fn step(
    func: &Function, feature: Option<&Feature>
) -> Result<Value, EvaluationError> {
    let input = match func.args.first() {
        Some(arg) => to_number(&resolve_arg(arg, "step", feature)?),
        None => return Err(EvaluationError::missing_argument("step", 0))
    };
    let mut res = match func.args.get(1) {
        Some(arg) => resolve_arg(arg, "step", feature)?,
        None => return Err(EvaluationError::missing_argument("step", 1))
    };
    let mut boundaries = Vec::new();
    for arg in func.args.iter().skip(2) {
        match *arg {
            Arg::Boundary(ref boundary) => {
                boundaries.push((
                    resolve_expression(&boundary.boundary, feature)?,
                    resolve_expression(&boundary.value, feature)?,
                ))
            }
            _ => {
                return Err(EvaluationError::new("step", "expected boundary"))
            }
        }
    }
    for (boundary, value) in boundaries {
        if input >= boundary {
            res = value
        }
    }
    Ok(res)
}


//------------ Plain functions -----------------------------------------------

/// The resolved arguments of a plain function.
struct Arguments<'a> {
    name: &'a str,
    values: Vec<Value>,
}

impl<'a> Arguments<'a> {
    fn resolve(
        func: &'a Function, feature: Option<&Feature>
    ) -> Result<Self, EvaluationError> {
        let values = func.args.iter().map(|arg| {
            resolve_arg(arg, &func.name, feature)
        }).collect::<Result<_, _>>()?;
        Ok(Arguments { name: &func.name, values })
    }

    fn get(&self, idx: usize) -> Result<&Value, EvaluationError> {
        self.values.get(idx).ok_or_else(|| {
            EvaluationError::missing_argument(self.name, idx)
        })
    }

    fn number(&self, idx: usize) -> Result<f64, EvaluationError> {
        self.get(idx).map(to_number)
    }

    fn string(&self, idx: usize) -> Result<String, EvaluationError> {
        self.get(idx).map(to_js_string)
    }

    fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().map(to_number)
    }
}

fn number_function(args: Arguments) -> Result<f64, EvaluationError> {
    Ok(match args.name {
        "abs" => args.number(0)?.abs(),
        "acos" => args.number(0)?.acos(),
        "add" => args.number(0)? + args.number(1)?,
        "asin" => args.number(0)?.asin(),
        "atan" => args.number(0)?.atan(),
        "ceil" => args.number(0)?.ceil(),
        "cos" => args.number(0)?.cos(),
        "div" => args.number(0)? / args.number(1)?,
        "exp" => args.number(0)?.exp(),
        "floor" => args.number(0)?.floor(),
        "log" => args.number(0)?.ln(),
        "max" => args.numbers().fold(f64::NEG_INFINITY, max_nan),
        "min" => args.numbers().fold(f64::INFINITY, min_nan),
        "modulo" => args.number(0)? % args.number(1)?,
        "mul" => args.number(0)? * args.number(1)?,
        "pi" => PI,
        "pow" => args.number(0)?.powf(args.number(1)?),
        "random" => random(),
        "round" => (args.number(0)? + 0.5).floor(),
        "sin" => args.number(0)?.sin(),
        "sqrt" => args.number(0)?.sqrt(),
        "strIndexOf" => {
            index_of(&args.string(0)?, &args.string(1)?, false)
        }
        "strLastIndexOf" => {
            index_of(&args.string(0)?, &args.string(1)?, true)
        }
        "strLength" => args.string(0)?.chars().count() as f64,
        "sub" => args.number(0)? - args.number(1)?,
        "tan" => args.number(0)?.tan(),
        "toDegrees" => args.number(0)?.to_degrees(),
        "toNumber" => args.number(0)?,
        "toRadians" => args.number(0)?.to_radians(),
        other => return Err(EvaluationError::unknown_function(other))
    })
}

fn string_function(args: Arguments) -> Result<String, EvaluationError> {
    Ok(match args.name {
        "strCapitalize" => capitalize(&args.string(0)?),
        "strConcat" => args.values.iter().map(to_js_string).collect(),
        "strDefaultIfBlank" => {
            let value = args.get(0)?;
            if value.is_null() || to_js_string(value).trim().is_empty() {
                args.string(1)?
            }
            else {
                to_js_string(value)
            }
        }
        "strReplace" => {
            let (src, from, to) = (
                args.string(0)?, args.string(1)?, args.string(2)?
            );
            let all = args.values.get(3).map(truthy).unwrap_or(false);
            if all {
                src.replace(&from, &to)
            }
            else {
                src.replacen(&from, &to, 1)
            }
        }
        "strStripAccents" => strip_accents(&args.string(0)?),
        "strSubstring" => {
            substring(&args.string(0)?, args.number(1)?, Some(args.number(2)?))
        }
        "strSubstringStart" => {
            substring(&args.string(0)?, args.number(1)?, None)
        }
        "strToLowerCase" => args.string(0)?.to_lowercase(),
        "strToString" => args.string(0)?,
        "strToUpperCase" => args.string(0)?.to_uppercase(),
        "strTrim" => args.string(0)?.trim().into(),
        other => return Err(EvaluationError::unknown_function(other))
    })
}

fn boolean_function(args: Arguments) -> Result<bool, EvaluationError> {
    Ok(match args.name {
        "all" => args.values.iter().all(truthy),
        "any" => args.values.iter().any(truthy),
        "between" => {
            let value = args.get(0)?;
            matches!(
                compare(value, args.get(1)?),
                Some(Ordering::Greater | Ordering::Equal)
            ) && matches!(
                compare(value, args.get(2)?),
                Some(Ordering::Less | Ordering::Equal)
            )
        }
        "equalTo" => strict_equals(args.get(0)?, args.get(1)?),
        "greaterThan" => {
            compare(args.get(0)?, args.get(1)?) == Some(Ordering::Greater)
        }
        "greaterThanOrEqualTo" => matches!(
            compare(args.get(0)?, args.get(1)?),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        "in" => {
            let needle = args.get(0)?;
            args.values[1..].iter().any(|item| strict_equals(needle, item))
        }
        "lessThan" => {
            compare(args.get(0)?, args.get(1)?) == Some(Ordering::Less)
        }
        "lessThanOrEqualTo" => matches!(
            compare(args.get(0)?, args.get(1)?),
            Some(Ordering::Less | Ordering::Equal)
        ),
        "not" => !truthy(args.get(0)?),
        "notEqualTo" => !strict_equals(args.get(0)?, args.get(1)?),
        "parseBoolean" => parse_boolean(args.get(0)?),
        "strEndsWith" => args.string(0)?.ends_with(&args.string(1)?),
        "strEqualsIgnoreCase" => {
            args.string(0)?.to_lowercase() == args.string(1)?.to_lowercase()
        }
        "strMatches" => str_matches(&args.string(0)?, &args.string(1)?)?,
        "strStartsWith" => args.string(0)?.starts_with(&args.string(1)?),
        other => return Err(EvaluationError::unknown_function(other))
    })
}


//------------ Helpers for the functions -------------------------------------

fn max_nan(left: f64, right: f64) -> f64 {
    if left.is_nan() || right.is_nan() { f64::NAN } else { left.max(right) }
}

fn min_nan(left: f64, right: f64) -> f64 {
    if left.is_nan() || right.is_nan() { f64::NAN } else { left.min(right) }
}

thread_local! {
    /// The xorshift state behind `random`, seeded per thread.
    static RANDOM: Cell<u64> = Cell::new(
        RandomState::new().hash_one(0u64) | 1
    );
}

/// Returns a uniformly distributed pseudo random number in `[0, 1)`.
///
/// This is xorshift64* and not suitable for anything security related.
fn random() -> f64 {
    RANDOM.with(|state| {
        let mut x = state.get();
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        state.set(x);
        (x.wrapping_mul(0x2545_F491_4F6C_DD1D) >> 11) as f64
            / (1u64 << 53) as f64
    })
}

/// Returns the character index of `needle` in `haystack` or -1.
fn index_of(haystack: &str, needle: &str, last: bool) -> f64 {
    let found = if last {
        haystack.rfind(needle)
    }
    else {
        haystack.find(needle)
    };
    match found {
        Some(idx) => haystack[..idx].chars().count() as f64,
        None => -1.
    }
}

/// Returns the characters between `start` and `end`.
///
/// Like its scripting counterpart, this swaps reversed bounds and clamps
/// them to the string.
fn substring(src: &str, start: f64, end: Option<f64>) -> String {
    let len = src.chars().count();
    let clamp = |value: f64| {
        if value.is_nan() || value < 0. {
            0
        }
        else if value > len as f64 {
            len
        }
        else {
            value as usize
        }
    };
    let start = clamp(start);
    let end = end.map(clamp).unwrap_or(len);
    let (start, end) = if start > end { (end, start) } else { (start, end) };
    src.chars().skip(start).take(end - start).collect()
}

fn capitalize(src: &str) -> String {
    src.split(' ').map(|word| {
        let mut chars = word.chars();
        match chars.next() {
            Some(first) => {
                first.to_uppercase().chain(
                    chars.flat_map(char::to_lowercase)
                ).collect()
            }
            None => String::new()
        }
    }).collect::<Vec<String>>().join(" ")
}

fn strip_accents(src: &str) -> String {
    let decomposed = DecomposingNormalizerBorrowed::new_nfkd().normalize(src);
    decomposed.chars().filter(|ch| {
        !('\u{0300}'..='\u{036f}').contains(ch)
    }).collect()
}

fn parse_boolean(value: &Value) -> bool {
    match *value {
        Value::String(ref value) => {
            !matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "" | "false" | "0" | "no" | "off"
            )
        }
        ref other => truthy(other)
    }
}

/// Tests `value` against a `/pattern/flags` regular expression literal.
fn str_matches(value: &str, pattern: &str) -> Result<bool, EvaluationError> {
    let (pattern, flags) = match split_regex_literal(pattern) {
        Some(parts) => parts,
        None => return Ok(false)
    };
    let regex = RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .build()
        .map_err(|err| EvaluationError::new("strMatches", err.to_string()))?;
    Ok(regex.is_match(value))
}

fn split_regex_literal(src: &str) -> Option<(&str, &str)> {
    let src = src.strip_prefix('/')?;
    let end = src.rfind('/')?;
    let flags = &src[end + 1..];
    if flags.len() > 4 || !flags.chars().all(|ch| "gimy".contains(ch)) {
        return None
    }
    Some((&src[..end], flags))
}


//------------ Resolving arguments and expressions ---------------------------

fn resolve_arg(
    arg: &Arg, name: &str, feature: Option<&Feature>
) -> Result<Value, EvaluationError> {
    match *arg {
        Arg::Literal(ref value) => Ok(value.clone()),
        Arg::Function(ref func) => evaluate(func, feature),
        _ => {
            Err(EvaluationError::new(
                name, "unexpected case arm, stop, or interpolation mode"
            ))
        }
    }
}

/// Resolves an expression into a concrete value.
pub fn resolve_expression<T: FromValue + Clone>(
    expr: &Expression<T>, feature: Option<&Feature>
) -> Result<T, EvaluationError> {
    match *expr {
        Expression::Literal(ref value) => Ok(value.clone()),
        Expression::Function(ref func) => {
            T::from_value(evaluate(func, feature)?).ok_or_else(|| {
                EvaluationError::new(
                    &func.name, "result has the wrong type"
                )
            })
        }
    }
}

/// Resolves an optional expression.
pub fn resolve_opt<T: FromValue + Clone>(
    expr: &Option<Expression<T>>, feature: Option<&Feature>
) -> Result<Option<T>, EvaluationError> {
    match *expr {
        Some(ref expr) => resolve_expression(expr, feature).map(Some),
        None => Ok(None)
    }
}


//------------ FromValue -----------------------------------------------------

/// A type a function result can be converted into.
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Option<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Option<Self> {
        Some(value)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Option<Self> {
        Some(to_number(&value))
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::String(value) => Some(value),
            other => Some(to_js_string(&other))
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Option<Self> {
        Some(truthy(&value))
    }
}

impl FromValue for Vec<f64> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => Some(items.iter().map(to_number).collect()),
            _ => None
        }
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) => {
                Some(items.iter().map(to_js_string).collect())
            }
            Value::String(value) => Some(vec![value]),
            _ => None
        }
    }
}

impl FromValue for [f64; 2] {
    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Array(items) if items.len() == 2 => {
                Some([to_number(&items[0]), to_number(&items[1])])
            }
            _ => None
        }
    }
}

macro_rules! from_value_via_serde {
    ( $( $ty:ty ),* ) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: Value) -> Option<Self> {
                    serde_json::from_value(value).ok()
                }
            }
        )*
    }
}

from_value_via_serde!(
    IconImage, LineCap, LineJoin, TextPlacement, FontWeight, FontStyle
);


//------------ Coercion ------------------------------------------------------

/// Converts a value into a number.
///
/// Null, which is what a missing attribute turns into, is not a number.
pub fn to_number(value: &Value) -> f64 {
    match *value {
        Value::Null => f64::NAN,
        Value::Bool(value) => if value { 1. } else { 0. },
        Value::Number(ref value) => value.as_f64().unwrap_or(f64::NAN),
        Value::String(ref value) => {
            let value = value.trim();
            if value.is_empty() {
                0.
            }
            else {
                value.parse().unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// Converts a value into its string representation.
pub fn to_js_string(value: &Value) -> String {
    match *value {
        Value::Null => "null".into(),
        Value::Bool(value) => value.to_string(),
        Value::Number(ref value) => {
            match value.as_f64() {
                Some(float) if value.is_f64() => number_to_string(float),
                _ => value.to_string()
            }
        }
        Value::String(ref value) => value.clone(),
        Value::Array(ref items) => {
            items.iter().map(|item| {
                if item.is_null() { String::new() } else { to_js_string(item) }
            }).collect::<Vec<_>>().join(",")
        }
        Value::Object(_) => "[object Object]".into(),
    }
}

/// Formats a number the way scripts do, without a trailing `.0`.
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        "NaN".into()
    }
    else if value.is_infinite() {
        if value > 0. { "Infinity".into() } else { "-Infinity".into() }
    }
    else {
        format!("{}", value)
    }
}

/// Returns whether a value counts as true.
pub fn truthy(value: &Value) -> bool {
    match *value {
        Value::Null => false,
        Value::Bool(value) => value,
        Value::Number(ref value) => {
            value.as_f64().map(|value| value != 0. && !value.is_nan())
                .unwrap_or(false)
        }
        Value::String(ref value) => !value.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Converts a number into a value.
///
/// Numbers that JSON can't represent become null.
pub fn from_f64(value: f64) -> Value {
    Number::from_f64(value).map(Value::Number).unwrap_or(Value::Null)
}

/// Compares two values without type coercion, except between numbers.
pub fn strict_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(left), Value::Number(right)) => {
            left.as_f64() == right.as_f64()
        }
        _ => left == right
    }
}

/// Orders two values.
///
/// Two strings compare as strings, everything else as numbers.
pub fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(left), Value::String(right)) => Some(left.cmp(right)),
        _ => to_number(left).partial_cmp(&to_number(right))
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn func(value: Value) -> Function {
        serde_json::from_value(value).unwrap()
    }

    fn eval(value: Value) -> Value {
        evaluate(&func(value), None).unwrap()
    }

    fn eval_with(value: Value, feature: &Feature) -> Value {
        evaluate(&func(value), Some(feature)).unwrap()
    }

    #[test]
    fn property_lookup() {
        let feature = Feature::from_value(json!({"name": "Bonn", "pop": 3}));
        assert_eq!(
            eval_with(json!({"name": "property", "args": ["name"]}), &feature),
            json!("Bonn")
        );
        assert_eq!(
            eval_with(
                json!({"name": "property", "args": [
                    {"name": "strToLowerCase", "args": ["POP"]}
                ]}),
                &feature
            ),
            json!(3)
        );
        assert_eq!(
            eval_with(json!({"name": "property", "args": ["x"]}), &feature),
            Value::Null
        );
        assert!(evaluate(&Function::property("name"), None).is_err());
    }

    #[test]
    fn arithmetic() {
        assert_eq!(eval(json!({"name": "add", "args": [1, 2]})), json!(3.));
        assert_eq!(eval(json!({"name": "sub", "args": [1, "3"]})), json!(-2.));
        assert_eq!(eval(json!({"name": "modulo", "args": [-7, 3]})), json!(-1.));
        assert_eq!(eval(json!({"name": "round", "args": [-2.5]})), json!(-2.));
        assert_eq!(eval(json!({"name": "max", "args": [1, 7, 3]})), json!(7.));
        let degrees = evaluate_number(
            &func(json!({"name": "toDegrees", "args": [{"name": "pi"}]})),
            None
        ).unwrap();
        assert!((degrees - 180.).abs() < 1e-9);
        assert_eq!(eval(json!({"name": "div", "args": [1, 0]})), Value::Null);
        let random = evaluate_number(&func(json!({"name": "random"})), None)
            .unwrap();
        assert!((0. ..1.).contains(&random));
    }

    #[test]
    fn random_is_uniform() {
        let draws: Vec<f64> = (0..10_000).map(|_| random()).collect();
        assert!(draws.iter().all(|x| (0. ..1.).contains(x)));
        let mean = draws.iter().sum::<f64>() / draws.len() as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean {}", mean);
        let low = draws.iter().filter(|x| **x < 0.1).count();
        assert!((800..1200).contains(&low), "{} below 0.1", low);
    }

    #[test]
    fn stubs_return_first_argument() {
        assert_eq!(eval(json!({"name": "atan2", "args": [3, 4]})), json!(3));
        assert_eq!(
            eval(json!({"name": "strAbbreviate", "args": ["abc", 1, 2]})),
            json!("abc")
        );
        assert_eq!(
            eval(json!({"name": "double2bool", "args": [1]})),
            json!(false)
        );
    }

    #[test]
    fn strings() {
        assert_eq!(
            eval(json!({"name": "strSubstring", "args": ["Hello", 4, 1]})),
            json!("ell")
        );
        assert_eq!(
            eval(json!({"name": "strSubstringStart", "args": ["Hello", 3]})),
            json!("lo")
        );
        assert_eq!(
            eval(json!({"name": "strConcat", "args": ["a", 1, true]})),
            json!("a1true")
        );
        assert_eq!(
            eval(json!({"name": "strReplace", "args": ["a-b-c", "-", "+", false]})),
            json!("a+b-c")
        );
        assert_eq!(
            eval(json!({"name": "strReplace", "args": ["a-b-c", "-", "+", true]})),
            json!("a+b+c")
        );
        assert_eq!(
            eval(json!({"name": "strStripAccents", "args": ["Crème Brûlée"]})),
            json!("Creme Brulee")
        );
        assert_eq!(
            eval(json!({"name": "strCapitalize", "args": ["hELLO wORLD"]})),
            json!("Hello World")
        );
        assert_eq!(
            eval(json!({"name": "strDefaultIfBlank", "args": ["  ", "x"]})),
            json!("x")
        );
        assert_eq!(
            eval(json!({"name": "strLastIndexOf", "args": ["abcabc", "b"]})),
            json!(4.)
        );
        assert_eq!(
            eval(json!({"name": "strIndexOf", "args": ["abc", "z"]})),
            json!(-1.)
        );
    }

    #[test]
    fn booleans() {
        assert_eq!(
            eval(json!({"name": "between", "args": [5, 5, 10]})),
            json!(true)
        );
        assert_eq!(
            eval(json!({"name": "between", "args": [10.5, 5, 10]})),
            json!(false)
        );
        assert_eq!(
            eval(json!({"name": "in", "args": [2, 1, 2.0, 3]})),
            json!(true)
        );
        assert_eq!(
            eval(json!({"name": "equalTo", "args": [5, "5"]})),
            json!(false)
        );
        assert_eq!(
            eval(json!({"name": "all", "args": [
                true, {"name": "greaterThan", "args": [2, 1]}
            ]})),
            json!(true)
        );
        assert_eq!(
            eval(json!({"name": "parseBoolean", "args": ["false"]})),
            json!(false)
        );
        assert_eq!(
            eval(json!({"name": "strEqualsIgnoreCase", "args": ["aB", "Ab"]})),
            json!(true)
        );
    }

    #[test]
    fn regex_literals() {
        assert_eq!(
            eval(json!({"name": "strMatches", "args": ["Hello", "/^h.*o$/i"]})),
            json!(true)
        );
        assert_eq!(
            eval(json!({"name": "strMatches", "args": ["Hello", "/^h/"]})),
            json!(false)
        );
        assert_eq!(
            eval(json!({"name": "strMatches", "args": ["Hello", "^H"]})),
            json!(false)
        );
    }

    #[test]
    fn case_arms() {
        let feature = Feature::from_value(json!({"type": "b"}));
        let case = json!({"name": "case", "args": [
            {
                "case": {"name": "equalTo", "args": [
                    {"name": "property", "args": ["type"]}, "a"
                ]},
                "value": "#ff0000"
            },
            {
                "case": {"name": "equalTo", "args": [
                    {"name": "property", "args": ["type"]}, "b"
                ]},
                "value": "#00ff00"
            },
            "#0000ff"
        ]});
        assert_eq!(eval_with(case.clone(), &feature), json!("#00ff00"));
        let feature = Feature::from_value(json!({"type": "c"}));
        assert_eq!(eval_with(case, &feature), json!("#0000ff"));
    }

    #[test]
    fn case_evaluates_every_arm() {
        // The second arm needs a feature even though the first matches.
        let case = func(json!({"name": "case", "args": [
            {"case": true, "value": 1},
            {"case": {"name": "property", "args": ["x"]}, "value": 2},
            3
        ]}));
        assert!(evaluate(&case, None).is_err());
    }

    #[test]
    fn interpolation() {
        let feature = Feature::from_value(json!({"x": 5}));
        assert_eq!(
            eval_with(json!({"name": "interpolate", "args": [
                {"name": "linear"},
                {"name": "property", "args": ["x"]},
                {"stop": 0, "value": 0},
                {"stop": 10, "value": 100}
            ]}), &feature),
            json!(50.)
        );
        assert_eq!(
            eval(json!({"name": "interpolate", "args": [
                {"name": "linear"}, 20,
                {"stop": 0, "value": 0},
                {"stop": 10, "value": 100}
            ]})),
            json!(100.)
        );
        assert_eq!(
            eval(json!({"name": "interpolate", "args": [
                {"name": "exponential", "base": 2}, 1,
                {"stop": 0, "value": 0},
                {"stop": 2, "value": 3}
            ]})),
            json!(1.)
        );
    }

    #[test]
    fn steps() {
        let step = json!({"name": "step", "args": [
            {"name": "property", "args": ["pop"]},
            "small",
            {"boundary": 1000, "value": "medium"},
            {"boundary": 100000, "value": "large"}
        ]});
        let feature = Feature::from_value(json!({"pop": 5000}));
        assert_eq!(eval_with(step.clone(), &feature), json!("medium"));
        let feature = Feature::from_value(json!({"pop": 10}));
        assert_eq!(eval_with(step, &feature), json!("small"));
    }

    #[test]
    fn unknown_function() {
        assert!(evaluate(&func(json!({"name": "frobnicate"})), None).is_err());
    }

    #[test]
    fn coercion() {
        assert_eq!(to_js_string(&json!(5)), "5");
        assert_eq!(to_js_string(&json!(5.0)), "5");
        assert_eq!(to_js_string(&json!(0.25)), "0.25");
        assert_eq!(to_number(&json!(" 12 ")), 12.);
        assert!(to_number(&json!("abc")).is_nan());
        assert!(to_number(&Value::Null).is_nan());
        assert!(truthy(&json!("x")));
        assert!(!truthy(&json!(0)));
        assert_eq!(compare(&json!("10"), &json!(9)), Some(Ordering::Greater));
    }
}
