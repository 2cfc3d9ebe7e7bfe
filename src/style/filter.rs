//! Rule filters.
//!
//! Filters arrive as nested JSON arrays such as
//! `["&&", [">", "pop", 1000], ["<", "pop", 5000]]`. They are parsed into
//! a typed tree right away so that a malformed filter is rejected when the
//! style is loaded rather than when a feature is drawn.

use std::convert::TryFrom;
use std::fmt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use crate::error::FilterParseError;
use super::function::Function;


//------------ Filter --------------------------------------------------------

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Filter {
    Literal(bool),
    Function(Function),
    Comparison {
        operator: ComparisonOperator,
        lhs: Operand,
        rhs: Operand,
    },
    Between {
        lhs: Operand,
        lower: Operand,
        upper: Operand,
    },
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn comparison(
        operator: ComparisonOperator,
        property: impl Into<String>,
        value: impl Into<Value>
    ) -> Self {
        Filter::Comparison {
            operator,
            lhs: Operand::Property(property.into()),
            rhs: Operand::Literal(value.into()),
        }
    }

    /// Calls `op` for every function used anywhere in the filter.
    pub fn walk_functions(&self, op: &mut impl FnMut(&Function)) {
        match *self {
            Filter::Literal(_) => { }
            Filter::Function(ref func) => func.walk(op),
            Filter::Comparison { ref lhs, ref rhs, .. } => {
                lhs.walk(op);
                rhs.walk(op);
            }
            Filter::Between { ref lhs, ref lower, ref upper } => {
                lhs.walk(op);
                lower.walk(op);
                upper.walk(op);
            }
            Filter::And(ref filters) | Filter::Or(ref filters) => {
                filters.iter().for_each(|filter| filter.walk_functions(op))
            }
            Filter::Not(ref filter) => filter.walk_functions(op),
        }
    }

    fn parse_array(mut items: Vec<Value>) -> Result<Self, FilterParseError> {
        if items.is_empty() {
            return Err(FilterParseError::new("empty filter"))
        }
        let op = match items.remove(0) {
            Value::String(op) => op,
            other => {
                return Err(FilterParseError::new(format!(
                    "expected operator, found {}", other
                )))
            }
        };
        match op.as_str() {
            "&&" | "||" => {
                if items.is_empty() {
                    return Err(FilterParseError::arity(&op, "at least 1", 0))
                }
                let filters = items.into_iter().map(
                    Filter::try_from
                ).collect::<Result<Vec<_>, _>>()?;
                if op == "&&" {
                    Ok(Filter::And(filters))
                }
                else {
                    Ok(Filter::Or(filters))
                }
            }
            "!" => {
                if items.len() != 1 {
                    return Err(FilterParseError::arity(&op, "1", items.len()))
                }
                let inner = items.remove(0);
                Ok(Filter::Not(Box::new(Filter::try_from(inner)?)))
            }
            "<=x<=" => {
                if items.len() != 3 {
                    return Err(FilterParseError::arity(&op, "3", items.len()))
                }
                let mut items = items.into_iter();
                let mut next = || items.next().unwrap_or(Value::Null);
                Ok(Filter::Between {
                    lhs: Operand::parse_lhs(next())?,
                    lower: Operand::parse_rhs(next())?,
                    upper: Operand::parse_rhs(next())?,
                })
            }
            _ => {
                let operator = ComparisonOperator::from_str(
                    &op
                ).ok_or_else(|| {
                    FilterParseError::unknown_operator(&op)
                })?;
                if items.len() != 2 {
                    return Err(FilterParseError::arity(&op, "2", items.len()))
                }
                let mut items = items.into_iter();
                let mut next = || items.next().unwrap_or(Value::Null);
                Ok(Filter::Comparison {
                    operator,
                    lhs: Operand::parse_lhs(next())?,
                    rhs: Operand::parse_rhs(next())?,
                })
            }
        }
    }
}

impl TryFrom<Value> for Filter {
    type Error = FilterParseError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Bool(value) => Ok(Filter::Literal(value)),
            Value::Array(items) => Self::parse_array(items),
            Value::Object(_) => {
                serde_json::from_value(value).map(
                    Filter::Function
                ).map_err(|err| {
                    FilterParseError::new(format!("invalid function: {}", err))
                })
            }
            other => {
                Err(FilterParseError::new(format!(
                    "expected array, boolean, or function, found {}", other
                )))
            }
        }
    }
}

impl From<Filter> for Value {
    fn from(filter: Filter) -> Self {
        match filter {
            Filter::Literal(value) => Value::Bool(value),
            Filter::Function(func) => function_to_value(func),
            Filter::Comparison { operator, lhs, rhs } => {
                Value::Array(vec![
                    Value::String(operator.as_str().into()),
                    lhs.into(), rhs.into()
                ])
            }
            Filter::Between { lhs, lower, upper } => {
                Value::Array(vec![
                    Value::String("<=x<=".into()),
                    lhs.into(), lower.into(), upper.into()
                ])
            }
            Filter::And(filters) => combination("&&", filters),
            Filter::Or(filters) => combination("||", filters),
            Filter::Not(filter) => {
                Value::Array(vec![Value::String("!".into()), (*filter).into()])
            }
        }
    }
}

fn combination(op: &str, filters: Vec<Filter>) -> Value {
    let mut res = vec![Value::String(op.into())];
    res.extend(filters.into_iter().map(Into::into));
    Value::Array(res)
}

fn function_to_value(func: Function) -> Value {
    serde_json::to_value(func).unwrap_or(Value::Null)
}


//------------ Operand -------------------------------------------------------

/// One side of a comparison.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    /// The name of a feature attribute.
    ///
    /// Only the left hand side of a comparison refers to attributes.
    Property(String),

    Function(Function),

    Literal(Value),
}

impl Operand {
    fn parse_lhs(value: Value) -> Result<Self, FilterParseError> {
        match value {
            Value::String(name) => Ok(Operand::Property(name)),
            value => Self::parse_rhs(value)
        }
    }

    fn parse_rhs(value: Value) -> Result<Self, FilterParseError> {
        if value.get("name").is_some() {
            serde_json::from_value(value).map(
                Operand::Function
            ).map_err(|err| {
                FilterParseError::new(format!("invalid function: {}", err))
            })
        }
        else if value.is_array() {
            Err(FilterParseError::new(
                "nested filter used as comparison operand"
            ))
        }
        else {
            Ok(Operand::Literal(value))
        }
    }

    fn walk(&self, op: &mut impl FnMut(&Function)) {
        if let Operand::Function(ref func) = *self {
            func.walk(op)
        }
    }
}

impl From<Operand> for Value {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Property(name) => Value::String(name),
            Operand::Function(func) => function_to_value(func),
            Operand::Literal(value) => value,
        }
    }
}


//------------ ComparisonOperator --------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,

    /// The right hand side is a substring of the left hand side.
    Like,
}

impl ComparisonOperator {
    pub fn from_str(op: &str) -> Option<Self> {
        use self::ComparisonOperator::*;

        match op {
            "==" => Some(Equal),
            "!=" => Some(NotEqual),
            "<" => Some(Less),
            "<=" => Some(LessOrEqual),
            ">" => Some(Greater),
            ">=" => Some(GreaterOrEqual),
            "*=" => Some(Like),
            _ => None
        }
    }

    pub fn as_str(self) -> &'static str {
        use self::ComparisonOperator::*;

        match self {
            Equal => "==",
            NotEqual => "!=",
            Less => "<",
            LessOrEqual => "<=",
            Greater => ">",
            GreaterOrEqual => ">=",
            Like => "*=",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<Filter, FilterParseError> {
        Filter::try_from(value)
    }

    #[test]
    fn parse_comparison() {
        assert_eq!(
            parse(json!(["==", "category", "A"])).unwrap(),
            Filter::comparison(ComparisonOperator::Equal, "category", "A")
        );
    }

    #[test]
    fn parse_combination() {
        let filter = parse(json!(
            ["&&", [">", "pop", "1000"], ["!", ["<", "pop", 5000]]]
        )).unwrap();
        match filter {
            Filter::And(filters) => {
                assert_eq!(filters.len(), 2);
                assert!(matches!(filters[1], Filter::Not(_)));
            }
            _ => panic!("expected and")
        }
    }

    #[test]
    fn parse_function_operand() {
        let filter = parse(json!(
            ["==", {"name": "strToUpperCase", "args": ["a"]}, "A"]
        )).unwrap();
        assert!(matches!(
            filter,
            Filter::Comparison { lhs: Operand::Function(_), .. }
        ));
    }

    #[test]
    fn reject_malformed() {
        assert!(parse(json!(["between", "x"])).is_err());
        assert!(parse(json!(["==", "x"])).is_err());
        assert!(parse(json!(["!", true, false])).is_err());
        assert!(parse(json!(["&&"])).is_err());
        assert!(parse(json!([])).is_err());
        assert!(parse(json!("x")).is_err());
        assert!(
            serde_json::from_value::<Filter>(json!(["~=", "a", 1])).is_err()
        );
    }

    #[test]
    fn serialize_back() {
        let src = json!(["||", ["<=x<=", "x", 1, 5], ["*=", "name", "ab"]]);
        let filter = parse(src.clone()).unwrap();
        assert_eq!(serde_json::to_value(filter).unwrap(), src);
    }
}
