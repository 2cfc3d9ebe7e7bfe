/// Features are the things a style is applied to.
///
/// For styling, only the attributes of a feature matter, so that is all
/// we keep.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};


//------------ Feature -------------------------------------------------------

/// The attributes of a single feature.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Feature {
    properties: Map<String, Value>,
}

impl Feature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a feature from a JSON value.
    ///
    /// Anything but an object results in a feature without attributes.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(properties) => Feature { properties },
            _ => Feature::default()
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn insert(
        &mut self, name: impl Into<String>, value: impl Into<Value>
    ) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn with(
        mut self, name: impl Into<String>, value: impl Into<Value>
    ) -> Self {
        self.insert(name, value);
        self
    }

    pub fn properties(&self) -> &Map<String, Value> {
        &self.properties
    }
}

impl From<Map<String, Value>> for Feature {
    fn from(properties: Map<String, Value>) -> Self {
        Feature { properties }
    }
}
