//! Errors that can happen while translating styles.
//!
//! Each failure class has its own type. The public entry points collect
//! whatever goes wrong into an [`Errors`] list instead of failing early.

use std::{error, fmt};
use crate::config::ConfigError;


//------------ TranslationError ----------------------------------------------

/// A symbolizer or native style could not be translated.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TranslationError {
    message: String,
}

impl TranslationError {
    pub fn new(message: impl Into<String>) -> Self {
        TranslationError { message: message.into() }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TranslationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "translation failed: {}", self.message)
    }
}

impl error::Error for TranslationError { }


//------------ FilterParseError ----------------------------------------------

/// A filter has a malformed structure.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FilterParseError {
    message: String,
}

impl FilterParseError {
    pub fn new(message: impl Into<String>) -> Self {
        FilterParseError { message: message.into() }
    }

    pub fn unknown_operator(op: &str) -> Self {
        Self::new(format!("unknown filter operator '{}'", op))
    }

    pub fn arity(op: &str, expected: &str, found: usize) -> Self {
        Self::new(format!(
            "operator '{}' expects {} operands, found {}", op, expected, found
        ))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FilterParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot parse filter: {}", self.message)
    }
}

impl error::Error for FilterParseError { }


//------------ EvaluationError -----------------------------------------------

/// Evaluating a function expression failed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EvaluationError {
    function: Option<String>,
    message: String,
}

impl EvaluationError {
    pub fn new(function: &str, message: impl Into<String>) -> Self {
        EvaluationError {
            function: Some(function.into()),
            message: message.into()
        }
    }

    pub fn bare(message: impl Into<String>) -> Self {
        EvaluationError { function: None, message: message.into() }
    }

    pub fn no_feature(function: &str) -> Self {
        Self::new(function, "no feature to evaluate against")
    }

    pub fn unknown_function(function: &str) -> Self {
        Self::new(function, "unknown function")
    }

    pub fn missing_argument(function: &str, idx: usize) -> Self {
        Self::new(function, format!("missing argument {}", idx + 1))
    }

    pub fn function(&self) -> Option<&str> {
        self.function.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EvaluationError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.function {
            Some(ref name) => {
                write!(f, "cannot evaluate '{}': {}", name, self.message)
            }
            None => write!(f, "cannot evaluate: {}", self.message)
        }
    }
}

impl error::Error for EvaluationError { }


//------------ ResourceError -------------------------------------------------

/// An image needed for a pattern could not be loaded.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResourceError {
    src: String,
    message: String,
}

impl ResourceError {
    pub fn new(src: &str, message: impl Into<String>) -> Self {
        ResourceError {
            src: abbreviate(src),
            message: message.into()
        }
    }

    pub fn src(&self) -> &str {
        &self.src
    }
}

impl fmt::Display for ResourceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "cannot load image '{}': {}", self.src, self.message)
    }
}

impl error::Error for ResourceError { }

/// Shortens data URLs so they don't flood error messages.
fn abbreviate(src: &str) -> String {
    const MAX_LEN: usize = 64;

    match src.char_indices().nth(MAX_LEN) {
        Some((idx, _)) => format!("{}...", &src[..idx]),
        None => src.into()
    }
}


//------------ Error ---------------------------------------------------------

/// Any of the errors above.
#[derive(Debug)]
pub enum Error {
    Translation(TranslationError),
    FilterParse(FilterParseError),
    Evaluation(EvaluationError),
    Resource(ResourceError),
    Config(ConfigError),
}

impl From<TranslationError> for Error {
    fn from(err: TranslationError) -> Self {
        Error::Translation(err)
    }
}

impl From<FilterParseError> for Error {
    fn from(err: FilterParseError) -> Self {
        Error::FilterParse(err)
    }
}

impl From<EvaluationError> for Error {
    fn from(err: EvaluationError) -> Self {
        Error::Evaluation(err)
    }
}

impl From<ResourceError> for Error {
    fn from(err: ResourceError) -> Self {
        Error::Resource(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Translation(ref err) => err.fmt(f),
            Error::FilterParse(ref err) => err.fmt(f),
            Error::Evaluation(ref err) => err.fmt(f),
            Error::Resource(ref err) => err.fmt(f),
            Error::Config(ref err) => err.fmt(f),
        }
    }
}

impl error::Error for Error { }


//------------ Errors --------------------------------------------------------

/// A list of errors collected during one call.
#[derive(Debug, Default)]
pub struct Errors {
    errors: Vec<Error>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, error: impl Into<Error>) {
        self.errors.push(error.into())
    }

    pub fn check(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        }
        else {
            Err(self)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Error> + '_ {
        self.errors.iter()
    }
}

macro_rules! errors_from {
    ( $( $err:ty ),* ) => {
        $(
            impl From<$err> for Errors {
                fn from(err: $err) -> Self {
                    Errors { errors: vec![err.into()] }
                }
            }
        )*
    }
}

errors_from!(
    Error, TranslationError, FilterParseError, EvaluationError,
    ResourceError, ConfigError
);

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (idx, err) in self.errors.iter().enumerate() {
            if idx > 0 {
                f.write_str("\n")?;
            }
            err.fmt(f)?;
        }
        Ok(())
    }
}

impl error::Error for Errors { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn collect_errors() {
        let mut errors = Errors::new();
        assert!(Errors::new().check().is_ok());
        errors.add(TranslationError::new("unknown shape"));
        errors.add(EvaluationError::no_feature("property"));
        assert_eq!(errors.len(), 2);
        let errors = errors.check().unwrap_err();
        assert_eq!(
            errors.to_string(),
            "translation failed: unknown shape\n\
             cannot evaluate 'property': no feature to evaluate against"
        );
    }

    #[test]
    fn data_urls_are_shortened() {
        let src = format!("data:image/png;base64,{}", "A".repeat(200));
        let err = ResourceError::new(&src, "broken");
        assert!(err.src().ends_with("..."));
        assert_eq!(err.src().chars().count(), 67);
    }
}
