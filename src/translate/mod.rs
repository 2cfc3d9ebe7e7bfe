//! Translating symbolizers.
//!
//! The [`Translator`] turns neutral symbolizers into native styles. It is
//! split by symbolizer kind into the submodules. Every kind first resolves
//! its function-valued properties against the feature into a fresh
//! resolved structure and then builds the native parts from that, so a
//! failure never leaves a half-built native style.
//!
//! The translator also owns the caches that live as long as a written
//! style: templated icons resolved per feature and loaded graphic fill
//! patterns. Patterns missing when a fill is drawn are loaded in the
//! background. Subscribers of [`Translator::pattern_updates`] learn when
//! one arrives and can redraw.
//!
//! Reading native styles back doesn't need any state and lives in the
//! `read` submodule.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};
use lru::LruCache;
use tokio::runtime::Handle;
use tokio::sync::watch;
use crate::config::Config;
use crate::error::{Error, ResourceError};
use crate::feature::Feature;
use crate::ol::{
    Circle, DefaultConstructors, Fill, Icon, Image, OlStyle, Stroke,
    StyleConstructors,
};
use crate::pattern::{DefaultImageLoader, ImageLoader, Pattern, PatternSpec};
use crate::style::{Style, Symbolizer};

pub mod fill;
pub mod icon;
pub mod line;
pub mod mark;
pub mod read;
pub mod text;


//------------ Translator ----------------------------------------------------

#[derive(Debug)]
pub struct Translator {
    config: Config,
    constructors: Arc<dyn StyleConstructors>,
    loader: Arc<dyn ImageLoader>,

    /// Icons for templated images keyed by the resolved source.
    icons: Mutex<LruCache<String, Arc<Icon>>>,

    /// Loaded graphic fill patterns keyed by their spec.
    patterns: Arc<Mutex<HashMap<String, Arc<Pattern>>>>,

    /// Keys of patterns loading in the background or failed to load.
    pending: Arc<Mutex<HashSet<String>>>,

    /// Counts the patterns loaded in the background.
    loaded: Arc<watch::Sender<u64>>,
}

impl Translator {
    pub fn new(config: Config) -> Self {
        let capacity = NonZeroUsize::new(config.icon_cache_size).unwrap_or(
            NonZeroUsize::MIN
        );
        Translator {
            config,
            constructors: Arc::new(DefaultConstructors),
            loader: Arc::new(DefaultImageLoader),
            icons: Mutex::new(LruCache::new(capacity)),
            patterns: Default::default(),
            pending: Default::default(),
            loaded: Arc::new(watch::channel(0).0),
        }
    }

    pub fn with_constructors(
        mut self, constructors: Arc<dyn StyleConstructors>
    ) -> Self {
        self.constructors = constructors;
        self
    }

    pub fn with_loader(mut self, loader: Arc<dyn ImageLoader>) -> Self {
        self.loader = loader;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn constructors(&self) -> &dyn StyleConstructors {
        self.constructors.as_ref()
    }

    /// Translates a symbolizer into a native style.
    ///
    /// Function-valued properties are resolved against `feature`. Without
    /// a feature, only functions that don't look at attributes succeed.
    pub fn write_symbolizer(
        &self, symbolizer: &Symbolizer, feature: Option<&Feature>
    ) -> Result<OlStyle, Error> {
        match *symbolizer {
            Symbolizer::Mark(ref sym) => self.write_mark(sym, feature),
            Symbolizer::Icon(ref sym) => self.write_icon(sym, feature),
            Symbolizer::Line(ref sym) => self.write_line(sym, feature),
            Symbolizer::Fill(ref sym) => self.write_fill(sym, feature),
            Symbolizer::Text(ref sym) => self.write_text(sym, feature),
            Symbolizer::Raster(_) => Ok(self.default_style()),
        }
    }

    /// Returns the style the engine would use without any style.
    ///
    /// This is what everything without a native counterpart turns into.
    pub fn default_style(&self) -> OlStyle {
        let default = OlStyle::engine_default();
        let fill = default.fill.map(|fill| self.constructors.fill(fill));
        let stroke = default.stroke.map(|stroke| {
            self.constructors.stroke(stroke)
        });
        let image = match default.image {
            Some(Image::Circle(circle)) => {
                Some(Image::Circle(self.constructors.circle(Circle {
                    fill: fill.clone(),
                    stroke: stroke.clone(),
                    .. circle
                })))
            }
            other => other
        };
        self.constructors.style(OlStyle { image, fill, stroke, text: None })
    }

    /// Loads all graphic fill patterns a style can know up front.
    ///
    /// Patterns that depend on feature attributes can't be loaded and are
    /// skipped. Patterns that fail to load are returned. Their fills will
    /// be drawn without the pattern.
    pub async fn prepare_patterns(
        &self, style: &Style
    ) -> Vec<ResourceError> {
        let mut res = Vec::new();
        for rule in &style.rules {
            for symbolizer in &rule.symbolizers {
                let graphic_fill = match *symbolizer {
                    Symbolizer::Fill(ref fill) => {
                        match fill.graphic_fill {
                            Some(ref graphic_fill) => graphic_fill,
                            None => continue
                        }
                    }
                    _ => continue
                };
                let spec = match self.pattern_spec(graphic_fill, None) {
                    Ok(spec) => spec,
                    Err(err) => {
                        log::debug!("skipping graphic fill: {}", err);
                        continue
                    }
                };
                let key = spec.key();
                if self.cached_pattern(&key).is_some() {
                    continue
                }
                match Pattern::load(&spec, self.loader.as_ref()).await {
                    Ok(pattern) => {
                        self.patterns.lock().unwrap_or_else(
                            PoisonError::into_inner
                        ).insert(key, Arc::new(pattern));
                    }
                    Err(err) => {
                        log::warn!("{}", err);
                        res.push(err)
                    }
                }
            }
        }
        res
    }

    /// Returns a receiver notified whenever a background load finishes.
    ///
    /// Fills drawn before their pattern arrived are drawn without it. A
    /// change on the receiver means that drawing them again will pick the
    /// pattern up.
    pub fn pattern_updates(&self) -> watch::Receiver<u64> {
        self.loaded.subscribe()
    }

    /// Starts loading a missing pattern in the background.
    ///
    /// Every pattern is tried only once. Failures are logged.
    fn load_pattern(&self, spec: PatternSpec) {
        let key = spec.key();
        let fresh = self.pending.lock().unwrap_or_else(
            PoisonError::into_inner
        ).insert(key.clone());
        if !fresh {
            return
        }
        let handle = match Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                log::warn!(
                    "cannot load pattern '{}' outside of a runtime", spec.src
                );
                self.pending.lock().unwrap_or_else(
                    PoisonError::into_inner
                ).remove(&key);
                return
            }
        };
        log::warn!(
            "graphic fill pattern '{}' not loaded, drawing fill without it",
            spec.src
        );
        let loader = self.loader.clone();
        let patterns = self.patterns.clone();
        let loaded = self.loaded.clone();
        handle.spawn(async move {
            match Pattern::load(&spec, loader.as_ref()).await {
                Ok(pattern) => {
                    patterns.lock().unwrap_or_else(
                        PoisonError::into_inner
                    ).insert(key, Arc::new(pattern));
                    loaded.send_modify(|count| *count += 1);
                }
                Err(err) => log::warn!("{}", err)
            }
        });
    }

    fn cached_pattern(&self, key: &str) -> Option<Arc<Pattern>> {
        self.patterns.lock().unwrap_or_else(
            PoisonError::into_inner
        ).get(key).cloned()
    }

    /// Returns a cached icon for a resolved source.
    fn cached_icon(&self, src: &str) -> Option<Arc<Icon>> {
        self.icons.lock().unwrap_or_else(
            PoisonError::into_inner
        ).get(src).cloned()
    }

    fn cache_icon(&self, src: String, icon: Arc<Icon>) {
        self.icons.lock().unwrap_or_else(
            PoisonError::into_inner
        ).put(src, icon);
    }

    fn fill(&self, color: Option<String>) -> Option<Fill> {
        color.map(|color| self.constructors.fill(Fill::color(color)))
    }

    fn stroke(&self, stroke: Stroke) -> Stroke {
        self.constructors.stroke(stroke)
    }
}

impl Default for Translator {
    fn default() -> Self {
        Self::new(Config::default())
    }
}


//------------ Helpers -------------------------------------------------------

/// Combines a color with an opacity if both are present.
///
/// Invalid opacities are normalized to fully opaque. Colors that can't be
/// combined are passed through unchanged.
fn combine_color(
    color: Option<String>, opacity: Option<f64>
) -> Option<String> {
    match (color, opacity) {
        (Some(color), Some(opacity)) => {
            Some(crate::color::rgba_color(&color, opacity).unwrap_or(color))
        }
        (color, _) => color
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;
    use crate::style::RasterSymbolizer;

    #[test]
    fn raster_is_default() {
        let translator = Translator::default();
        let style = translator.write_symbolizer(
            &Symbolizer::Raster(RasterSymbolizer::default()), None
        ).unwrap();
        assert_eq!(style, OlStyle::engine_default());
    }

    #[test]
    fn combine() {
        assert_eq!(
            combine_color(Some("#ff0000".into()), Some(0.5)),
            Some("rgba(255, 0, 0, 0.5)".into())
        );
        assert_eq!(
            combine_color(Some("red".into()), Some(0.5)),
            Some("red".into())
        );
        assert_eq!(
            combine_color(Some("#ff0000".into()), None),
            Some("#ff0000".into())
        );
        assert_eq!(combine_color(None, Some(1.)), None);
        for opacity in [-1., 5., f64::NAN] {
            assert_eq!(
                combine_color(Some("#ff0000".into()), Some(opacity)),
                Some("rgba(255, 0, 0, 1)".into())
            );
        }
    }

    #[tokio::test]
    async fn patterns_are_prepared() {
        let translator = Translator::default();
        let style: Style = serde_json::from_value(json!({
            "name": "Hatched",
            "rules": [{
                "symbolizers": [{
                    "kind": "Fill",
                    "color": "#ffffff",
                    "graphicFill": {
                        "kind": "Mark",
                        "wellKnownName": "shape://slash",
                        "radius": 4
                    }
                }, {
                    "kind": "Fill",
                    "graphicFill": {
                        "kind": "Icon",
                        "image": "https://example.com/{{kind}}.png"
                    }
                }]
            }]
        })).unwrap();
        let failed = translator.prepare_patterns(&style).await;
        assert_eq!(failed.len(), 1);
        assert_eq!(translator.patterns.lock().unwrap().len(), 1);
    }
}
