//! Reading flat styles.
//!
//! Flat styles are the JSON-only flavour of native styles. Properties are
//! kept in a single object with prefixed keys such as `fill-color` or
//! `circle-radius`, and data-driven values are expressed as arrays such as
//! `["get", "name"]`. A flat style can also be an array of flat styles or
//! an array of rules, each of which pairs a filter with styles.
//!
//! Flat styles are only ever read.

use std::convert::TryFrom;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use crate::color;
use crate::error::{Error, TranslationError};
use crate::font::Font;
use crate::style::{Filter, Rule, Style, Symbolizer};


/// The name given to styles read from native styles.
pub const STYLE_NAME: &str = "OL Style";


//------------ FlatStyleLike -------------------------------------------------

pub type FlatStyle = Map<String, Value>;

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(try_from = "Value")]
pub enum FlatStyleLike {
    Style(FlatStyle),
    Styles(Vec<FlatStyle>),
    Rules(Vec<FlatRule>),
}

impl FlatStyleLike {
    /// Converts the flat style into a neutral style.
    pub fn read(&self) -> Result<Style, Error> {
        let rules = match *self {
            FlatStyleLike::Style(ref style) => {
                vec![Rule {
                    name: Some(rule_name(0)),
                    .. Rule::new(symbolizers(style)?)
                }]
            }
            FlatStyleLike::Styles(ref styles) => {
                styles.iter().enumerate().map(|(idx, style)| {
                    Ok(Rule {
                        name: Some(rule_name(idx)),
                        .. Rule::new(symbolizers(style)?)
                    })
                }).collect::<Result<_, Error>>()?
            }
            FlatStyleLike::Rules(ref rules) => {
                rules.iter().enumerate().map(|(idx, rule)| {
                    rule.read(idx)
                }).collect::<Result<_, Error>>()?
            }
        };
        Ok(Style::new(STYLE_NAME, rules))
    }
}

impl TryFrom<Value> for FlatStyleLike {
    type Error = TranslationError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let invalid = || {
            TranslationError::new("not a valid flat style")
        };
        match value {
            Value::Object(style) => {
                if style.contains_key("style") {
                    Err(invalid())
                }
                else {
                    Ok(FlatStyleLike::Style(style))
                }
            }
            Value::Array(items) => {
                let objects = items.into_iter().map(|item| match item {
                    Value::Object(map) => Ok(map),
                    _ => Err(invalid())
                }).collect::<Result<Vec<_>, _>>()?;
                if objects.iter().all(|item| item.contains_key("style")) {
                    objects.into_iter().map(FlatRule::try_from).collect::<
                        Result<_, _>
                    >().map(FlatStyleLike::Rules)
                }
                else if objects.iter().all(|item| {
                    !item.contains_key("style")
                }) {
                    Ok(FlatStyleLike::Styles(objects))
                }
                else {
                    Err(invalid())
                }
            }
            _ => Err(invalid())
        }
    }
}

fn rule_name(idx: usize) -> String {
    format!("{} Rule {}", STYLE_NAME, idx)
}


//------------ FlatRule ------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
pub struct FlatRule {
    pub filter: Option<Value>,
    pub style: Vec<FlatStyle>,

    /// Whether the rule only applies if no previous rule matched.
    ///
    /// The neutral model has no equivalent, so these rules are read as
    /// ordinary rules.
    pub else_: bool,
}

impl FlatRule {
    fn read(&self, idx: usize) -> Result<Rule, Error> {
        let mut res = Vec::new();
        for style in &self.style {
            res.extend(symbolizers(style)?);
        }
        let filter = match self.filter {
            Some(ref filter) => {
                Some(Filter::try_from(convert_filter(filter))?)
            }
            None => None
        };
        Ok(Rule {
            name: Some(rule_name(idx)),
            filter,
            .. Rule::new(res)
        })
    }
}

impl TryFrom<FlatStyle> for FlatRule {
    type Error = TranslationError;

    fn try_from(mut rule: FlatStyle) -> Result<Self, Self::Error> {
        let style = match rule.remove("style") {
            Some(Value::Object(style)) => vec![style],
            Some(Value::Array(items)) => {
                items.into_iter().map(|item| match item {
                    Value::Object(style) => Ok(style),
                    _ => Err(TranslationError::new("invalid flat rule style"))
                }).collect::<Result<_, _>>()?
            }
            _ => return Err(TranslationError::new("invalid flat rule style"))
        };
        Ok(FlatRule {
            filter: rule.remove("filter"),
            style,
            else_: matches!(rule.get("else"), Some(Value::Bool(true))),
        })
    }
}


//------------ Symbolizers ---------------------------------------------------

fn symbolizers(style: &FlatStyle) -> Result<Vec<Symbolizer>, Error> {
    let mut res = Vec::new();
    if has(style, "fill-color") {
        res.push(fill(style)?);
    }
    if has(style, "stroke-color") || has(style, "stroke-width") {
        res.push(line(style)?);
    }
    if has(style, "text-value") {
        res.push(text(style)?);
    }
    if has(style, "icon-src") {
        res.push(icon(style)?);
    }
    if has(style, "circle-radius") {
        res.push(circle(style)?);
    }
    Ok(res)
}

fn fill(style: &FlatStyle) -> Result<Symbolizer, Error> {
    let mut res = Map::new();
    res.insert("kind".into(), "Fill".into());
    let (color, opacity) = color_and_opacity(style.get("fill-color"))?;
    put(&mut res, "color", color);
    put(&mut res, "fillOpacity", opacity);
    finish(res)
}

fn line(style: &FlatStyle) -> Result<Symbolizer, Error> {
    let mut res = Map::new();
    res.insert("kind".into(), "Line".into());
    let (color, opacity) = color_and_opacity(style.get("stroke-color"))?;
    put(&mut res, "color", color);
    put(&mut res, "opacity", opacity);
    for (flat, neutral) in [
        ("stroke-width", "width"),
        ("stroke-line-cap", "cap"),
        ("stroke-line-join", "join"),
        ("stroke-line-dash", "dasharray"),
        ("stroke-line-dash-offset", "dashOffset"),
        ("stroke-miter-limit", "miterLimit"),
        ("stroke-offset", "perpendicularOffset"),
    ] {
        put(&mut res, neutral, style.get(flat).map(expression));
    }
    finish(res)
}

fn text(style: &FlatStyle) -> Result<Symbolizer, Error> {
    let mut res = Map::new();
    res.insert("kind".into(), "Text".into());
    put(&mut res, "label", style.get("text-value").map(expression));

    let (color, opacity) = color_and_opacity(style.get("text-fill-color"))?;
    put(&mut res, "color", color);
    put(&mut res, "opacity", opacity);
    let (color, opacity) = color_and_opacity(style.get("text-stroke-color"))?;
    put(&mut res, "haloColor", color);
    put(&mut res, "haloOpacity", opacity);
    put(&mut res, "haloWidth", style.get("text-stroke-width").map(expression));

    match style.get("text-font") {
        Some(font) if is_expression(font) => {
            put(&mut res, "font", Some(Value::Array(vec![expression(font)])));
        }
        Some(Value::String(font)) => {
            let font = Font::parse(font).ok_or_else(|| {
                TranslationError::new(format!(
                    "could not find font family in '{}'", font
                ))
            })?;
            if let Some(family) = font.family() {
                put(&mut res, "font", Some(json!([family])));
            }
            put(&mut res, "size", Some(json!(font.size)));
            put(&mut res, "fontWeight", Some(json!(font.weight)));
            put(&mut res, "fontStyle", Some(json!(font.style)));
        }
        _ => { }
    }

    // The neutral offset is a pair of numbers, so data-driven offsets are
    // dropped.
    let offset_x = style.get("text-offset-x");
    let offset_y = style.get("text-offset-y");
    if offset_x.is_some() || offset_y.is_some() {
        match (
            offset_x.map_or(Some(0.), Value::as_f64),
            offset_y.map_or(Some(0.), Value::as_f64)
        ) {
            (Some(x), Some(y)) => put(&mut res, "offset", Some(json!([x, y]))),
            _ => log::debug!("dropping data-driven text offset")
        }
    }
    put(&mut res, "rotate", style.get("text-rotation").map(degrees));
    put(&mut res, "placement", style.get("text-placement").map(expression));
    put(&mut res, "maxAngle", style.get("text-max-angle").map(expression));
    put(&mut res, "justify", style.get("text-justify").map(expression));
    put(&mut res, "padding", style.get("text-padding").map(expression));
    finish(res)
}

fn icon(style: &FlatStyle) -> Result<Symbolizer, Error> {
    let mut res = Map::new();
    res.insert("kind".into(), "Icon".into());
    put(&mut res, "image", style.get("icon-src").cloned());
    put(
        &mut res, "offset",
        style.get("icon-offset").filter(|offset| !is_expression(offset))
            .cloned()
    );
    put(&mut res, "opacity", style.get("icon-opacity").map(expression));
    put(&mut res, "rotate", style.get("icon-rotation").map(degrees));
    put(&mut res, "size", style.get("icon-width").map(expression));
    finish(res)
}

fn circle(style: &FlatStyle) -> Result<Symbolizer, Error> {
    let mut res = Map::new();
    res.insert("kind".into(), "Mark".into());
    res.insert("wellKnownName".into(), "circle".into());
    put(&mut res, "radius", style.get("circle-radius").map(expression));
    let (color, opacity) = color_and_opacity(style.get("circle-fill-color"))?;
    put(&mut res, "color", color);
    put(&mut res, "fillOpacity", opacity);
    let (color, opacity) = color_and_opacity(
        style.get("circle-stroke-color")
    )?;
    put(&mut res, "strokeColor", color);
    put(&mut res, "strokeOpacity", opacity);
    put(
        &mut res, "strokeWidth",
        style.get("circle-stroke-width").map(expression)
    );
    finish(res)
}

fn finish(symbolizer: Map<String, Value>) -> Result<Symbolizer, Error> {
    serde_json::from_value(Value::Object(symbolizer)).map_err(|err| {
        TranslationError::new(format!("invalid flat style: {}", err)).into()
    })
}

fn has(style: &FlatStyle, key: &str) -> bool {
    matches!(style.get(key), Some(value) if !value.is_null())
}

fn put(map: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value.filter(|value| !value.is_null()) {
        map.insert(key.into(), value);
    }
}

/// Splits a color into a hex color and an opacity.
fn color_and_opacity(
    value: Option<&Value>
) -> Result<(Option<Value>, Option<Value>), TranslationError> {
    let value = match value {
        Some(value) if !value.is_null() => value,
        _ => return Ok((None, None))
    };
    if is_expression(value) {
        return Ok((Some(expression(value)), None))
    }
    match *value {
        Value::String(ref src) => {
            let hex = color::hex_color(src).ok_or_else(|| {
                TranslationError::new(format!("invalid color '{}'", src))
            })?;
            let hex = match hex.get(..7) {
                Some(short) if hex.len() > 7 => short.to_string(),
                _ => hex
            };
            Ok((Some(hex.into()), color::opacity(src).map(Into::into)))
        }
        Value::Array(ref items) if items.len() == 3 || items.len() == 4 => {
            let mut channels = [0u8; 3];
            for (channel, item) in channels.iter_mut().zip(items) {
                *channel = item.as_f64().ok_or_else(|| {
                    TranslationError::new("invalid color array")
                })?.clamp(0., 255.) as u8;
            }
            let hex = color::Rgba::rgb(
                channels[0], channels[1], channels[2]
            ).to_hex();
            Ok((Some(hex.into()), items.get(3).cloned()))
        }
        _ => Err(TranslationError::new("invalid color value"))
    }
}


//------------ Expressions ---------------------------------------------------

/// Returns the neutral function name for a native expression operator.
fn function_name(op: &str) -> Option<&'static str> {
    Some(match op {
        "get" => "property",
        "*" => "mul",
        "/" => "div",
        "+" => "add",
        "-" => "sub",
        "%" => "modulo",
        "^" => "pow",
        "abs" => "abs",
        "floor" => "floor",
        "round" => "round",
        "ceil" => "ceil",
        "sin" => "sin",
        "cos" => "cos",
        "atan" => "atan",
        "sqrt" => "sqrt",
        "case" => "case",
        "interpolate" => "interpolate",
        "string" => "strDefaultIfBlank",
        "to-string" => "strToString",
        "<" => "lessThan",
        "<=" => "lessThanOrEqualTo",
        ">" => "greaterThan",
        ">=" => "greaterThanOrEqualTo",
        "==" => "equalTo",
        "!=" => "notEqualTo",
        "!" => "not",
        "all" => "all",
        "any" => "any",
        "between" => "between",
        "in" => "in",
        _ => return None
    })
}

/// Returns whether a value is a native expression.
fn is_expression(value: &Value) -> bool {
    match value.as_array().and_then(|items| items.first()) {
        Some(Value::String(op)) => function_name(op).is_some(),
        _ => false
    }
}

/// Converts a native expression into a neutral function.
///
/// Values that aren't expressions are returned unchanged.
fn expression(value: &Value) -> Value {
    let items = match value.as_array() {
        Some(items) if is_expression(value) => items,
        _ => return value.clone()
    };
    let op = items[0].as_str().unwrap_or_default();
    let name = function_name(op).unwrap_or_default();
    let args = &items[1..];
    match name {
        "case" => {
            let (arms, fallback) = match args.split_last() {
                Some((fallback, arms)) if args.len() % 2 == 1 => {
                    (arms, Some(fallback))
                }
                _ => (args, None)
            };
            let mut res: Vec<Value> = arms.chunks(2).map(|arm| {
                json!({
                    "case": expression(&arm[0]),
                    "value": arm.get(1).map(expression).unwrap_or(Value::Null),
                })
            }).collect();
            res.extend(fallback.map(expression));
            json!({"name": name, "args": res})
        }
        "interpolate" => {
            let mode = match args.first().and_then(Value::as_array) {
                Some(mode) => {
                    match mode.first().and_then(Value::as_str) {
                        Some("exponential") => json!({
                            "name": "exponential",
                            "base": mode.get(1).cloned().unwrap_or(json!(1))
                        }),
                        _ => json!({"name": "linear"})
                    }
                }
                None => json!({"name": "linear"})
            };
            let mut res = vec![
                mode, args.get(1).map(expression).unwrap_or(Value::Null)
            ];
            let stops = args.get(2..).unwrap_or_default();
            res.extend(stops.chunks(2).map(|stop| json!({
                "stop": expression(&stop[0]),
                "value": stop.get(1).map(expression).unwrap_or(Value::Null),
            })));
            json!({"name": name, "args": res})
        }
        "strDefaultIfBlank" => {
            json!({
                "name": name,
                "args": args.iter().take(2).map(expression).collect::<Vec<_>>()
            })
        }
        "in" => {
            let mut res = Vec::new();
            res.extend(args.first().map(expression));
            let haystack = match args.get(1) {
                Some(Value::Array(items)) => {
                    match items.first().and_then(Value::as_str) {
                        Some("literal") => {
                            items.get(1).and_then(Value::as_array).cloned()
                                .unwrap_or_default()
                        }
                        _ => items.clone()
                    }
                }
                _ => Vec::new()
            };
            res.extend(haystack);
            json!({"name": name, "args": res})
        }
        "atan" if args.len() == 2 => {
            json!({
                "name": "atan2",
                "args": args.iter().map(expression).collect::<Vec<_>>()
            })
        }
        _ => {
            json!({
                "name": name,
                "args": args.iter().map(expression).collect::<Vec<_>>()
            })
        }
    }
}

/// Converts a rotation in radians into one in degrees.
fn degrees(value: &Value) -> Value {
    match value.as_f64() {
        Some(radians) => json!(radians.to_degrees()),
        None if is_expression(value) => {
            json!({"name": "toDegrees", "args": [expression(value)]})
        }
        None => value.clone()
    }
}


//------------ Filters -------------------------------------------------------

/// Returns the neutral operator for a native filter operator.
fn filter_operator(op: &str) -> Option<&'static str> {
    Some(match op {
        "==" => "==",
        "!=" => "!=",
        "<" => "<",
        "<=" => "<=",
        ">" => ">",
        ">=" => ">=",
        "between" => "<=x<=",
        "all" => "&&",
        "any" => "||",
        "!" => "!",
        _ => return None
    })
}

fn is_comparison(op: &str) -> bool {
    matches!(op, "==" | "!=" | "<" | "<=" | ">" | ">=" | "between")
}

/// Converts a native filter into the JSON form of a neutral filter.
fn convert_filter(value: &Value) -> Value {
    let (op, args) = match value.as_array().and_then(|items| {
        items.split_first()
    }) {
        Some((Value::String(op), args)) => (op.as_str(), args),
        _ => return value.clone()
    };
    let operator = match filter_operator(op) {
        Some(operator) => operator,
        None => return expression(value)
    };
    let mut res = vec![Value::String(operator.into())];
    let mut args = args.iter();
    if let Some(first) = args.next() {
        let property = match first.as_array().map(Vec::as_slice) {
            Some([Value::String(get), Value::String(name)])
                if is_comparison(op) && get == "get" =>
            {
                Value::String(name.clone())
            }
            _ => convert_filter(first)
        };
        res.push(property);
    }
    res.extend(args.map(convert_filter));
    Value::Array(res)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use crate::style::{Expression, Function};

    fn read(value: Value) -> Style {
        FlatStyleLike::try_from(value).unwrap().read().unwrap()
    }

    #[test]
    fn classify() {
        assert!(matches!(
            FlatStyleLike::try_from(json!({"fill-color": "red"})),
            Ok(FlatStyleLike::Style(_))
        ));
        assert!(matches!(
            FlatStyleLike::try_from(json!([{"fill-color": "red"}])),
            Ok(FlatStyleLike::Styles(_))
        ));
        assert!(matches!(
            FlatStyleLike::try_from(json!([
                {"filter": ["==", ["get", "a"], 1], "style": {"fill-color": "red"}}
            ])),
            Ok(FlatStyleLike::Rules(_))
        ));
        assert!(FlatStyleLike::try_from(json!(
            [{"fill-color": "red"}, {"style": {}}]
        )).is_err());
        assert!(FlatStyleLike::try_from(json!("red")).is_err());
    }

    #[test]
    fn read_fill_and_stroke() {
        let style = read(json!({
            "fill-color": "rgba(255, 0, 0, 0.5)",
            "stroke-color": "#0000ff",
            "stroke-width": 2
        }));
        assert_eq!(style.name, "OL Style");
        let rule = &style.rules[0];
        assert_eq!(rule.name.as_deref(), Some("OL Style Rule 0"));
        assert_eq!(rule.symbolizers.len(), 2);
        match rule.symbolizers[0] {
            Symbolizer::Fill(ref fill) => {
                assert_eq!(
                    fill.color, Some(Expression::Literal("#ff0000".into()))
                );
                assert_eq!(fill.fill_opacity, Some(Expression::Literal(0.5)));
            }
            _ => panic!("expected fill")
        }
        match rule.symbolizers[1] {
            Symbolizer::Line(ref line) => {
                assert_eq!(line.width, Some(Expression::Literal(2.)));
            }
            _ => panic!("expected line")
        }
    }

    #[test]
    fn read_expressions() {
        let style = read(json!({
            "circle-radius": ["*", ["get", "size"], 2],
            "circle-fill-color": [
                "case", ["==", ["get", "type"], "a"], "#ff0000", "#0000ff"
            ]
        }));
        match style.rules[0].symbolizers[0] {
            Symbolizer::Mark(ref mark) => {
                assert_eq!(
                    mark.radius,
                    Some(Expression::Function(Function::new("mul", vec![
                        Function::property("size").into(), json!(2).into()
                    ])))
                );
                match mark.color {
                    Some(Expression::Function(ref func)) => {
                        assert_eq!(func.name, "case");
                        assert_eq!(func.args.len(), 2);
                        assert_eq!(func.args[1], json!("#0000ff").into());
                    }
                    _ => panic!("expected case")
                }
            }
            _ => panic!("expected mark")
        }
    }

    #[test]
    fn read_text() {
        let style = read(json!({
            "text-value": ["get", "name"],
            "text-font": "bold 14px 'Open Sans', sans-serif",
            "text-offset-y": 5
        }));
        match style.rules[0].symbolizers[0] {
            Symbolizer::Text(ref text) => {
                assert_eq!(
                    text.font,
                    Some(Expression::Literal(vec!["Open Sans".into()]))
                );
                assert_eq!(text.size, Some(Expression::Literal(14.)));
                assert_eq!(
                    text.offset, Some(Expression::Literal([0., 5.]))
                );
                assert!(text.label.as_ref().unwrap().is_function());
            }
            _ => panic!("expected text")
        }
    }

    #[test]
    fn read_rules() {
        let style = read(json!([
            {
                "filter": ["all",
                    [">", ["get", "pop"], 1000],
                    ["between", ["get", "pop"], 1000, 5000]
                ],
                "style": [{"fill-color": "#ff0000"}, {"stroke-width": 1}]
            },
            {"else": true, "style": {"icon-src": "a.png", "icon-rotation": 0}}
        ]));
        assert_eq!(style.rules.len(), 2);
        let filter = serde_json::to_value(
            style.rules[0].filter.clone().unwrap()
        ).unwrap();
        assert_eq!(
            filter,
            json!(["&&", [">", "pop", 1000], ["<=x<=", "pop", 1000, 5000]])
        );
        assert_eq!(style.rules[0].symbolizers.len(), 2);
        assert_eq!(style.rules[1].name.as_deref(), Some("OL Style Rule 1"));
        assert!(style.rules[1].filter.is_none());
    }

    #[test]
    fn invalid_color() {
        let flat = FlatStyleLike::try_from(
            json!({"fill-color": "definitely-not-a-color"})
        ).unwrap();
        assert!(flat.read().is_err());
    }
}
