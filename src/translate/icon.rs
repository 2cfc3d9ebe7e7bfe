//! Writing icon symbolizers.

use std::sync::Arc;
use kurbo::Vec2;
use crate::color::check_opacity;
use crate::error::{Error, EvaluationError, TranslationError};
use crate::eval::resolve_opt;
use crate::feature::Feature;
use crate::ol::{Icon, IconOrigin, Image, OlStyle};
use crate::style::{IconImage, IconSymbolizer};
use crate::template;
use super::Translator;


//------------ ResolvedIcon --------------------------------------------------

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResolvedIcon {
    pub image: Option<IconImage>,
    pub opacity: Option<f64>,
    pub rotate: Option<f64>,
    pub size: Option<f64>,
    pub offset: Option<[f64; 2]>,
}

impl ResolvedIcon {
    pub fn resolve(
        sym: &IconSymbolizer, feature: Option<&Feature>
    ) -> Result<Self, EvaluationError> {
        Ok(ResolvedIcon {
            image: resolve_opt(&sym.image, feature)?,
            opacity: resolve_opt(&sym.opacity, feature)?,
            rotate: resolve_opt(&sym.rotate, feature)?,
            size: resolve_opt(&sym.size, feature)?,
            offset: resolve_opt(&sym.offset, feature)?,
        })
    }
}


//------------ Translator ----------------------------------------------------

impl Translator {
    pub fn write_icon(
        &self, sym: &IconSymbolizer, feature: Option<&Feature>
    ) -> Result<OlStyle, Error> {
        let resolved = ResolvedIcon::resolve(sym, feature)?;
        let image = resolved.image.as_ref().ok_or_else(|| {
            TranslationError::new("icon symbolizer without an image")
        })?;
        let opacity = resolved.opacity.filter(|op| check_opacity(*op))
            .unwrap_or(1.);
        let rotation = resolved.rotate.filter(|rotate| rotate.is_finite())
            .unwrap_or(0.).to_radians();

        let icon = match *image {
            IconImage::Url(ref url) if template::is_template(url) => {
                self.templated_icon(url, &resolved, feature, opacity, rotation)
            }
            _ => {
                let src = image.source().into();
                self.constructors().icon(
                    self.icon(src, &resolved, opacity, rotation)
                )
            }
        };
        Ok(self.constructors().style(OlStyle {
            image: Some(Image::Icon(icon)),
            .. Default::default()
        }))
    }

    /// Returns the icon for an image source with attribute placeholders.
    ///
    /// Icons are cached by the resolved source and only rotation and
    /// opacity are updated on a cache hit.
    fn templated_icon(
        &self,
        url: &str,
        resolved: &ResolvedIcon,
        feature: Option<&Feature>,
        opacity: f64,
        rotation: f64,
    ) -> Arc<Icon> {
        let empty = Feature::new();
        let mut src = template::resolve(url, feature.unwrap_or(&empty), "");
        if src.is_empty() {
            src = url.into();
        }
        if let Some(icon) = self.cached_icon(&src) {
            log::debug!("using cached icon for '{}'", src);
            if icon.opacity == opacity && icon.rotation == rotation {
                return icon
            }
            let icon = Arc::new(Icon {
                opacity, rotation, .. Icon::clone(&icon)
            });
            self.cache_icon(src, icon.clone());
            return icon
        }
        let icon = self.constructors().icon(
            self.icon(src.clone(), resolved, opacity, rotation)
        );
        self.cache_icon(src, icon.clone());
        icon
    }

    fn icon(
        &self,
        src: String,
        resolved: &ResolvedIcon,
        opacity: f64,
        rotation: f64,
    ) -> Icon {
        let (size, offset, offset_origin) = match resolved.image {
            Some(IconImage::Sprite(ref sprite)) => {
                (Some(sprite.size), sprite.position, Some(IconOrigin::TopLeft))
            }
            _ => (None, [0., 0.], None)
        };
        Icon {
            cross_origin: self.config().cross_origin.clone(),
            opacity,
            rotation,
            displacement: resolved.offset.map(|[x, y]| Vec2::new(x, y))
                .unwrap_or(Vec2::ZERO),
            width: resolved.size,
            size,
            offset,
            offset_origin,
            .. Icon::new(src)
        }
    }
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    fn icon_of(style: &OlStyle) -> Arc<Icon> {
        match style.image {
            Some(Image::Icon(ref icon)) => icon.clone(),
            _ => panic!("expected icon")
        }
    }

    #[test]
    fn plain_icon() {
        let sym: IconSymbolizer = serde_json::from_value(json!({
            "image": "marker.png",
            "opacity": 0.5,
            "rotate": 180,
            "size": 32,
            "offset": [4, -4]
        })).unwrap();
        let icon = icon_of(
            &Translator::default().write_icon(&sym, None).unwrap()
        );
        assert_eq!(icon.src, "marker.png");
        assert_eq!(icon.opacity, 0.5);
        assert!((icon.rotation - std::f64::consts::PI).abs() < 1e-9);
        assert_eq!(icon.width, Some(32.));
        assert_eq!(icon.displacement, Vec2::new(4., -4.));
        assert_eq!(icon.size, None);
    }

    #[test]
    fn sprite_icon() {
        let sym: IconSymbolizer = serde_json::from_value(json!({
            "image": {
                "source": "sprites.png",
                "position": [20, 40],
                "size": [10, 12]
            }
        })).unwrap();
        let icon = icon_of(
            &Translator::default().write_icon(&sym, None).unwrap()
        );
        assert_eq!(icon.src, "sprites.png");
        assert_eq!(icon.size, Some([10., 12.]));
        assert_eq!(icon.offset, [20., 40.]);
        assert_eq!(icon.offset_origin, Some(IconOrigin::TopLeft));
    }

    #[test]
    fn templated_icons_are_cached() {
        let translator = Translator::default();
        let sym: IconSymbolizer = serde_json::from_value(json!({
            "image": "icons/{{kind}}.png"
        })).unwrap();
        let bus = Feature::new().with("kind", "bus");
        let first = icon_of(&translator.write_icon(&sym, Some(&bus)).unwrap());
        assert_eq!(first.src, "icons/bus.png");
        let second = icon_of(
            &translator.write_icon(&sym, Some(&bus)).unwrap()
        );
        assert!(Arc::ptr_eq(&first, &second));
        let tram = Feature::new().with("kind", "tram");
        assert_eq!(
            icon_of(&translator.write_icon(&sym, Some(&tram)).unwrap()).src,
            "icons/tram.png"
        );
    }

    #[test]
    fn missing_image() {
        assert!(
            Translator::default().write_icon(
                &IconSymbolizer::default(), None
            ).is_err()
        );
    }
}
