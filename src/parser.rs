//! The public entry points.
//!
//! An [`OlStyleParser`] reads native styles into neutral styles and writes
//! neutral styles as native styles. Both directions report the content
//! that has no faithful counterpart on the other side.

use std::sync::Arc;
use crate::assembly::assemble;
use crate::audit::{audit, UnsupportedProperties};
use crate::config::Config;
use crate::error::{Errors, TranslationError};
use crate::ol::OlStyleLike;
use crate::style::Style;
use crate::translate::read::read_styles;
use crate::translate::Translator;


/// The warning added when a written style contains unsupported content.
pub const UNSUPPORTED_WARNING: &str =
    "Your style contains unsupportedProperties!";


//------------ ReadOutput ----------------------------------------------------

#[derive(Clone, Debug)]
pub struct ReadOutput {
    pub output: Style,
    pub unsupported_properties: Option<UnsupportedProperties>,
}


//------------ WriteOutput ---------------------------------------------------

#[derive(Clone, Debug)]
pub struct WriteOutput {
    pub output: OlStyleLike,
    pub unsupported_properties: Option<UnsupportedProperties>,
    pub warnings: Vec<String>,
}


//------------ OlStyleParser -------------------------------------------------

#[derive(Clone, Debug)]
pub struct OlStyleParser {
    translator: Arc<Translator>,
}

impl OlStyleParser {
    pub const TITLE: &'static str = "OpenLayers Style Parser";

    pub fn new(config: Config) -> Self {
        Self::with_translator(Arc::new(Translator::new(config)))
    }

    pub fn with_translator(translator: Arc<Translator>) -> Self {
        OlStyleParser { translator }
    }

    pub fn translator(&self) -> &Arc<Translator> {
        &self.translator
    }

    /// Reads a native style.
    ///
    /// Style functions created by [`write_style`][Self::write_style]
    /// return the style they were created from.
    pub async fn read_style(
        &self, style: &OlStyleLike
    ) -> Result<ReadOutput, Errors> {
        let output = match *style {
            OlStyleLike::Style(ref style) => {
                read_styles(std::slice::from_ref(style))?
            }
            OlStyleLike::Styles(ref styles) => read_styles(styles)?,
            OlStyleLike::Function(ref func) => func.style().clone(),
            OlStyleLike::Flat(ref flat) => flat.read()?,
        };
        if output.rules.is_empty() {
            return Err(TranslationError::new("style without rules").into())
        }
        let unsupported_properties = audit(&output);
        Ok(ReadOutput { output, unsupported_properties })
    }

    /// Writes a neutral style as a native style.
    ///
    /// Graphic fill patterns are loaded first. Patterns that fail to load
    /// are reported as warnings and their fills drawn without them.
    pub async fn write_style(
        &self, style: &Style
    ) -> Result<WriteOutput, Errors> {
        let unsupported_properties = audit(style);
        let mut warnings = Vec::new();
        if unsupported_properties.is_some() {
            log::warn!(
                "style '{}' contains unsupported properties", style.name
            );
            warnings.push(UNSUPPORTED_WARNING.into());
        }
        for err in self.translator.prepare_patterns(style).await {
            warnings.push(err.to_string());
        }
        let output = assemble(
            Arc::new(style.clone()), self.translator.clone()
        )?;
        Ok(WriteOutput { output, unsupported_properties, warnings })
    }
}

impl Default for OlStyleParser {
    fn default() -> Self {
        Self::new(Config::default())
    }
}


//============ Tests =========================================================
