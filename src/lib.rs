//! Translating neutral map styles to and from OpenLayers styles.

pub use self::config::Config;
pub use self::error::{Error, Errors};
pub use self::feature::Feature;
pub use self::ol::{OlStyle, OlStyleLike};
pub use self::parser::{OlStyleParser, ReadOutput, WriteOutput};
pub use self::style::Style;

pub mod assembly;
pub mod audit;
pub mod color;
pub mod config;
pub mod error;
pub mod eval;
pub mod feature;
pub mod font;
pub mod ol;
pub mod parser;
pub mod pattern;
pub mod style;
pub mod svg;
pub mod template;
pub mod translate;
