//! Attribute templates.
//!
//! Labels and icon sources may contain placeholders such as `{{name}}` that
//! are replaced by the value of the feature attribute of that name. Names
//! are matched case-insensitively.

use nom::IResult;
use nom::bytes::complete::{tag, take_until};
use nom::sequence::delimited;
use serde_json::Value;
use crate::eval::to_js_string;
use crate::feature::Feature;


//------------ Template ------------------------------------------------------

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Template<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Part<'a> {
    Text(&'a str),
    Placeholder(&'a str),
}

impl<'a> Template<'a> {
    pub fn parse(mut src: &'a str) -> Self {
        let mut parts = Vec::new();
        while !src.is_empty() {
            let start = match src.find("{{") {
                Some(start) => start,
                None => {
                    parts.push(Part::Text(src));
                    break
                }
            };
            if start > 0 {
                parts.push(Part::Text(&src[..start]));
            }
            match placeholder(&src[start..]) {
                Ok((rest, name)) => {
                    parts.push(Part::Placeholder(name));
                    src = rest;
                }
                Err(_) => {
                    parts.push(Part::Text(&src[start..]));
                    break
                }
            }
        }
        Template { parts }
    }

    /// Returns whether there are any placeholders.
    pub fn has_placeholders(&self) -> bool {
        self.placeholders().next().is_some()
    }

    pub fn placeholders(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.parts.iter().filter_map(|part| match *part {
            Part::Placeholder(name) => Some(name),
            Part::Text(_) => None,
        })
    }

    /// Replaces all placeholders with attributes of the feature.
    ///
    /// Placeholders for missing or null attributes are replaced by
    /// `no_value`.
    pub fn resolve(&self, feature: &Feature, no_value: &str) -> String {
        let mut res = String::new();
        for part in &self.parts {
            match *part {
                Part::Text(text) => res.push_str(text),
                Part::Placeholder(name) => {
                    match lookup(feature, name) {
                        Some(value) => res.push_str(&to_js_string(value)),
                        None => res.push_str(no_value),
                    }
                }
            }
        }
        res
    }
}

fn placeholder(input: &str) -> IResult<&str, &str> {
    delimited(tag("{{"), take_until("}}"), tag("}}"))(input)
}

fn lookup<'f>(feature: &'f Feature, name: &str) -> Option<&'f Value> {
    let value = match feature.get(name) {
        Some(value) => Some(value),
        None => {
            let name = name.to_lowercase();
            feature.properties().iter().find(|(key, _)| {
                key.to_lowercase() == name
            }).map(|(_, value)| value)
        }
    };
    value.filter(|value| !value.is_null())
}


//------------ Helper Functions ----------------------------------------------

/// Returns whether a string contains at least one placeholder.
pub fn is_template(src: &str) -> bool {
    Template::parse(src).has_placeholders()
}

/// Resolves a template string against a feature.
pub fn resolve(src: &str, feature: &Feature, no_value: &str) -> String {
    Template::parse(src).resolve(feature, no_value)
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_parts() {
        let template = Template::parse("Size: {{AREA}} km² {{unit");
        assert_eq!(
            template.parts,
            [
                Part::Text("Size: "), Part::Placeholder("AREA"),
                Part::Text(" km² "), Part::Text("{{unit")
            ]
        );
        assert!(!is_template("no placeholders {here}"));
        assert!(is_template("{{a}}"));
    }

    #[test]
    fn resolve_attributes() {
        let feature = Feature::from_value(json!({
            "area_size": 1909, "name": "Köln", "gone": null
        }));
        assert_eq!(
            resolve("Size of {{NAME}} is {{AREA_SIZE}} km²", &feature, ""),
            "Size of Köln is 1909 km²"
        );
        assert_eq!(resolve("{{missing}}!", &feature, "n.v."), "n.v.!");
        assert_eq!(resolve("{{gone}}", &feature, ""), "");
        assert_eq!(
            resolve("icons/{{name}}.png", &feature, ""), "icons/Köln.png"
        );
    }
}
