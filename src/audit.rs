//! Reporting style content without a native counterpart.
//!
//! Properties and functions are looked up in static tables. Anything not
//! listed is fully supported.

use std::collections::{BTreeMap, HashMap};
use lazy_static::lazy_static;
use serde::Serialize;
use serde_json::Value;
use crate::style::{Function, Style, Symbolizer};


//------------ Support -------------------------------------------------------

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Support {
    None,
    Partial,
}


//------------ PropertySupport -----------------------------------------------

/// The support level of a property or function.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertySupport {
    Level(Support),
    Detailed {
        support: Support,
        info: &'static str,
    }
}

impl PropertySupport {
    const NONE: Self = PropertySupport::Level(Support::None);

    const fn none(info: &'static str) -> Self {
        PropertySupport::Detailed { support: Support::None, info }
    }

    const fn partial(info: &'static str) -> Self {
        PropertySupport::Detailed { support: Support::Partial, info }
    }

    pub fn support(self) -> Support {
        match self {
            PropertySupport::Level(support) => support,
            PropertySupport::Detailed { support, .. } => support,
        }
    }

    pub fn info(self) -> Option<&'static str> {
        match self {
            PropertySupport::Level(_) => None,
            PropertySupport::Detailed { info, .. } => Some(info),
        }
    }
}


//------------ KindSupport ---------------------------------------------------

/// The support of a symbolizer kind.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(untagged)]
pub enum KindSupport {
    /// The kind as a whole.
    Whole(Support),

    /// Individual properties of the kind.
    Properties(BTreeMap<&'static str, PropertySupport>),
}


//------------ UnsupportedProperties -----------------------------------------

/// The unsupported content found in a style.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct UnsupportedProperties {
    #[serde(
        rename = "Symbolizer", skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub symbolizer: BTreeMap<&'static str, KindSupport>,

    #[serde(rename = "Function", skip_serializing_if = "BTreeMap::is_empty")]
    pub function: BTreeMap<&'static str, PropertySupport>,
}

impl UnsupportedProperties {
    pub fn is_empty(&self) -> bool {
        self.symbolizer.is_empty() && self.function.is_empty()
    }

    /// Returns the entry for a property of a symbolizer kind.
    pub fn property(
        &self, kind: &str, property: &str
    ) -> Option<PropertySupport> {
        match self.symbolizer.get(kind) {
            Some(KindSupport::Properties(props)) => {
                props.get(property).copied()
            }
            _ => None
        }
    }

    fn add_symbolizer(&mut self, sym: &Symbolizer) {
        let key = kind_key(sym);
        let table = match SYMBOLIZERS.get(key) {
            Some(table) => table,
            None => return
        };
        let props = match *table {
            KindSupport::Whole(support) => {
                self.symbolizer.insert(key, KindSupport::Whole(support));
                return
            }
            KindSupport::Properties(ref props) => props
        };
        let value = match serde_json::to_value(sym) {
            Ok(Value::Object(value)) => value,
            _ => return
        };
        for name in value.keys() {
            let (name, support) = match props.get_key_value(name.as_str()) {
                Some(item) => item,
                None => continue
            };
            let entry = self.symbolizer.entry(key).or_insert_with(|| {
                KindSupport::Properties(BTreeMap::new())
            });
            if let KindSupport::Properties(ref mut found) = *entry {
                found.insert(name, *support);
            }
        }
    }

    fn add_function(&mut self, func: &Function) {
        if let Some((name, support)) = FUNCTIONS.get_key_value(
            func.name.as_str()
        ) {
            self.function.insert(name, *support);
        }
    }
}


//------------ audit ---------------------------------------------------------

/// Collects everything in a style that can't be translated faithfully.
///
/// Returns `None` if the style is fully supported.
pub fn audit(style: &Style) -> Option<UnsupportedProperties> {
    let mut res = UnsupportedProperties::default();
    for rule in &style.rules {
        for sym in &rule.symbolizers {
            res.add_symbolizer(sym)
        }
    }
    style.walk_functions(&mut |func| res.add_function(func));
    if res.is_empty() {
        None
    }
    else {
        Some(res)
    }
}

fn kind_key(sym: &Symbolizer) -> &'static str {
    match *sym {
        Symbolizer::Mark(_) => "MarkSymbolizer",
        Symbolizer::Icon(_) => "IconSymbolizer",
        Symbolizer::Line(_) => "LineSymbolizer",
        Symbolizer::Fill(_) => "FillSymbolizer",
        Symbolizer::Text(_) => "TextSymbolizer",
        Symbolizer::Raster(_) => "RasterSymbolizer",
    }
}


//------------ The Tables ----------------------------------------------------

macro_rules! properties {
    ( $( $name:expr => $support:expr ),* $(,)? ) => {{
        let mut res = BTreeMap::new();
        $(
            res.insert($name, $support);
        )*
        res
    }}
}

const FIRST_ARG: &str = "Currently returns the first argument";

lazy_static! {
    static ref SYMBOLIZERS: HashMap<&'static str, KindSupport> = {
        use self::PropertySupport as P;

        let mut res = HashMap::new();
        res.insert("MarkSymbolizer", KindSupport::Properties(properties! {
            "avoidEdges" => P::NONE,
            "blur" => P::NONE,
            "offsetAnchor" => P::NONE,
            "pitchAlignment" => P::NONE,
            "pitchScale" => P::NONE,
        }));
        res.insert("FillSymbolizer", KindSupport::Properties(properties! {
            "antialias" => P::NONE,
            "opacity" => P::none("Use fillOpacity instead."),
        }));
        res.insert("IconSymbolizer", KindSupport::Properties(properties! {
            "allowOverlap" => P::NONE,
            "anchor" => P::NONE,
            "avoidEdges" => P::NONE,
            "color" => P::NONE,
            "haloBlur" => P::NONE,
            "haloColor" => P::NONE,
            "haloWidth" => P::NONE,
            "keepUpright" => P::NONE,
            "offsetAnchor" => P::NONE,
            "size" => P::partial("Will set/get the width of the ol Icon."),
            "optional" => P::NONE,
            "padding" => P::NONE,
            "pitchAlignment" => P::NONE,
            "rotationAlignment" => P::NONE,
            "textFit" => P::NONE,
            "textFitPadding" => P::NONE,
        }));
        res.insert("LineSymbolizer", KindSupport::Properties(properties! {
            "blur" => P::NONE,
            "gapWidth" => P::NONE,
            "gradient" => P::NONE,
            "miterLimit" => P::NONE,
            "roundLimit" => P::NONE,
            "spacing" => P::NONE,
            "graphicFill" => P::NONE,
            "graphicStroke" => P::NONE,
            "perpendicularOffset" => P::NONE,
        }));
        res.insert("RasterSymbolizer", KindSupport::Whole(Support::None));
        res.insert("TextSymbolizer", KindSupport::Properties(properties! {
            "anchor" => P::NONE,
            "placement" => P::partial(
                "point and line supported. line-center will be mapped to \
                 line."
            ),
        }));
        res
    };

    static ref FUNCTIONS: BTreeMap<&'static str, PropertySupport> = {
        use self::PropertySupport as P;

        properties! {
            "double2bool" => P::none("Always returns false"),
            "atan2" => P::none(FIRST_ARG),
            "rint" => P::none(FIRST_ARG),
            "numberFormat" => P::none(FIRST_ARG),
            "strAbbreviate" => P::none(FIRST_ARG),
        }
    };
}


//============ Tests =========================================================
