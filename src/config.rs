//! Configuration of the translator.

use std::{error, fmt, fs, io};
use std::f64::consts::PI;
use std::path::Path;
use serde::{Deserialize, Serialize};

//------------ Config --------------------------------------------------------

/// The translator configuration.
///
/// All values have defaults, so an empty configuration file is valid.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// The radius of marks that don't specify one.
    pub mark_radius: f64,

    /// The cross origin setting given to icons.
    pub cross_origin: Option<String>,

    /// The maximum number of resolved templated icons to keep.
    pub icon_cache_size: usize,

    /// The units of the map projection.
    pub units: Units,

    /// The font size of labels that don't specify one.
    pub font_size: f64,

    /// The font family of labels that don't specify one.
    pub font_family: String,

    /// The size of a graphic fill tile if the image doesn't tell.
    pub pattern_icon_size: f64,
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path.as_ref())?;
        Self::from_toml(&data)
    }

    pub fn from_toml(data: &str) -> Result<Self, ConfigError> {
        toml::from_str(data).map_err(Into::into)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mark_radius: 6.,
            cross_origin: Some("anonymous".into()),
            icon_cache_size: 256,
            units: Units::default(),
            font_size: 10.,
            font_family: "sans-serif".into(),
            pattern_icon_size: 16.,
        }
    }
}


//------------ Units ---------------------------------------------------------

/// The units of a map projection.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Units {
    #[default]
    #[serde(rename = "m")]
    Meters,
    Degrees,
    #[serde(rename = "ft")]
    Feet,
    #[serde(rename = "us-ft")]
    UsFeet,
}

impl Units {
    /// Returns how many meters one unit is.
    pub fn meters_per_unit(self) -> f64 {
        match self {
            Units::Meters => 1.,
            Units::Degrees => 2. * PI * 6370997. / 360.,
            Units::Feet => 0.3048,
            Units::UsFeet => 1200. / 3937.,
        }
    }
}


//------------ ConfigError ---------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Toml(toml::de::Error),
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Toml(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ConfigError::Io(ref err) => {
                write!(f, "cannot read config: {}", err)
            }
            ConfigError::Toml(ref err) => {
                write!(f, "invalid config: {}", err)
            }
        }
    }
}

impl error::Error for ConfigError { }


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn empty_config() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.mark_radius, 6.);
        assert_eq!(config.cross_origin.as_deref(), Some("anonymous"));
        assert_eq!(config.units, Units::Meters);
    }

    #[test]
    fn partial_config() {
        let config = Config::from_toml(
            "mark-radius = 8\nunits = \"degrees\"\nfont-family = \"serif\"\n"
        ).unwrap();
        assert_eq!(config.mark_radius, 8.);
        assert_eq!(config.font_family, "serif");
        assert!(
            (config.units.meters_per_unit() - 111194.87).abs() < 0.01
        );
        assert_eq!(config.icon_cache_size, 256);
    }

    #[test]
    fn invalid_config() {
        assert!(matches!(
            Config::from_toml("units = \"furlongs\""),
            Err(ConfigError::Toml(_))
        ));
    }
}
