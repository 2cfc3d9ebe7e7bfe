//! Graphic fill patterns.
//!
//! A fill can be drawn with a mark or icon repeated across the area. We
//! don't rasterise anything ourselves. Instead, a [`Pattern`] describes the
//! tile a renderer has to draw: the image, the size of a tile, and where in
//! the tile the image goes.
//!
//! Creating a pattern needs the natural size of its image, so patterns are
//! loaded asynchronously through an [`ImageLoader`] while a style is
//! written. Drawing only ever looks at already loaded patterns.

use std::{fmt, str};
use std::future::Future;
use std::io::Cursor;
use std::pin::Pin;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::ImageReader;
use kurbo::{Affine, Vec2};
use serde::{Deserialize, Serialize};
use crate::error::ResourceError;
use crate::eval::number_to_string;
use crate::svg::{self, SvgProperties};


//------------ PatternSpec ---------------------------------------------------

/// Everything needed to load a pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct PatternSpec {
    /// The source of the image.
    pub src: String,

    pub cross_origin: Option<String>,

    /// The size the image is drawn with.
    pub icon_size: [f64; 2],

    /// The factor between the image size and the tile size.
    pub spacing: f64,

    /// The rotation of the image in radians clockwise.
    pub rotation: f64,

    pub scale: f64,
}

impl PatternSpec {
    pub fn new(src: impl Into<String>, icon_size: [f64; 2]) -> Self {
        PatternSpec {
            src: src.into(),
            cross_origin: None,
            icon_size,
            spacing: 1.,
            rotation: 0.,
            scale: 1.,
        }
    }

    /// Returns the key identifying the pattern in a cache.
    pub fn key(&self) -> String {
        format!(
            "{}|{}x{}|{}|{}|{}",
            self.src,
            number_to_string(self.icon_size[0]),
            number_to_string(self.icon_size[1]),
            number_to_string(self.spacing),
            number_to_string(self.rotation),
            number_to_string(self.scale),
        )
    }

    pub fn tile_size(&self) -> [f64; 2] {
        [self.icon_size[0] * self.spacing, self.icon_size[1] * self.spacing]
    }

    /// Returns the transform placing the image in the tile.
    ///
    /// The image is centered in the tile and rotated around its center.
    pub fn transform(&self) -> Affine {
        let tile = self.tile_size();
        Affine::translate(Vec2::new(tile[0] / 2., tile[1] / 2.))
            * Affine::rotate(self.rotation)
            * Affine::scale(self.scale)
            * Affine::translate(Vec2::new(
                -self.icon_size[0] / 2., -self.icon_size[1] / 2.
            ))
    }
}


//------------ Pattern -------------------------------------------------------

/// A loaded pattern ready to be used as a fill.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    pub src: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_origin: Option<String>,

    /// The size of a single repeated tile.
    pub tile_size: [f64; 2],

    /// The size the image is drawn with.
    pub icon_size: [f64; 2],

    /// The natural size of the image.
    pub image_size: [u32; 2],

    /// The transform from image to tile coordinates.
    pub transform: Affine,
}

impl Pattern {
    pub fn new(spec: &PatternSpec, image: ImageInfo) -> Self {
        Pattern {
            src: spec.src.clone(),
            cross_origin: spec.cross_origin.clone(),
            tile_size: spec.tile_size(),
            icon_size: spec.icon_size,
            image_size: [image.width, image.height],
            transform: spec.transform(),
        }
    }

    pub async fn load(
        spec: &PatternSpec, loader: &dyn ImageLoader
    ) -> Result<Self, ResourceError> {
        let image = loader.load(&spec.src).await?;
        if image.width == 0 || image.height == 0 {
            return Err(ResourceError::new(&spec.src, "image is empty"))
        }
        Ok(Self::new(spec, image))
    }
}


//------------ ImageLoader ---------------------------------------------------

/// The basic information about a loaded image.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
}

pub type ImageFuture<'a> = Pin<Box<
    dyn Future<Output = Result<ImageInfo, ResourceError>> + Send + 'a
>>;

/// Something that can load images.
pub trait ImageLoader: Send + Sync {
    fn load<'a>(&'a self, src: &'a str) -> ImageFuture<'a>;
}

impl fmt::Debug for dyn ImageLoader {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ImageLoader")
    }
}


//------------ DefaultImageLoader --------------------------------------------

/// The image loader used unless something else is configured.
///
/// It understands data URLs and local files. Raster image sizes are read
/// with the `image` crate, SVG images by their `width` attribute.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultImageLoader;

impl ImageLoader for DefaultImageLoader {
    fn load<'a>(&'a self, src: &'a str) -> ImageFuture<'a> {
        Box::pin(async move {
            if let Some(data) = src.strip_prefix("data:") {
                return data_url(src, data)
            }
            let path = src.strip_prefix("file://").unwrap_or(src);
            if path.contains("://") {
                return Err(ResourceError::new(src, "unsupported URL scheme"))
            }
            let data = tokio::fs::read(path).await.map_err(|err| {
                ResourceError::new(src, err.to_string())
            })?;
            sniff(src, &data)
        })
    }
}

fn data_url(src: &str, data: &str) -> Result<ImageInfo, ResourceError> {
    if let Some(svg) = svg::decode(src) {
        return svg_info(src, &svg)
    }
    let (header, payload) = data.split_once(',').ok_or_else(|| {
        ResourceError::new(src, "malformed data URL")
    })?;
    if header.ends_with(";base64") {
        let payload = STANDARD.decode(payload.trim()).map_err(|_| {
            ResourceError::new(src, "invalid base64 data")
        })?;
        sniff(src, &payload)
    }
    else {
        sniff(src, payload.as_bytes())
    }
}

fn sniff(src: &str, data: &[u8]) -> Result<ImageInfo, ResourceError> {
    if let Ok(text) = str::from_utf8(data) {
        if text.contains("<svg") {
            return svg_info(src, text)
        }
    }
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|err| ResourceError::new(src, err.to_string()))?;
    if reader.format().is_none() {
        return Err(ResourceError::new(src, "unsupported image format"))
    }
    let (width, height) = reader.into_dimensions().map_err(|err| {
        ResourceError::new(src, err.to_string())
    })?;
    Ok(ImageInfo { width, height })
}

fn svg_info(src: &str, svg: &str) -> Result<ImageInfo, ResourceError> {
    let props = SvgProperties::parse(svg).map_err(|err| {
        ResourceError::new(src, err.message())
    })?;
    if props.dimensions <= 0. {
        return Err(ResourceError::new(src, "SVG image without a width"))
    }
    let size = props.dimensions.round() as u32;
    Ok(ImageInfo { width: size, height: size })
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use super::*;
    use image::{DynamicImage, ImageFormat, RgbImage};
    use crate::svg::{shape_svg, SvgOptions};

    fn encoded(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
        let mut res = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut res, format)
            .unwrap();
        res.into_inner()
    }

    #[test]
    fn spec_geometry() {
        let spec = PatternSpec {
            spacing: 2.,
            .. PatternSpec::new("a.png", [16., 8.])
        };
        assert_eq!(spec.tile_size(), [32., 16.]);
        let center = spec.transform() * kurbo::Point::new(8., 4.);
        assert!((center.x - 16.).abs() < 1e-9);
        assert!((center.y - 8.).abs() < 1e-9);
        assert_ne!(spec.key(), PatternSpec::new("a.png", [16., 16.]).key());
    }

    #[tokio::test]
    async fn load_svg_data_url() {
        let svg = shape_svg("square", &SvgOptions {
            dimensions: 12., .. Default::default()
        }).unwrap();
        let spec = PatternSpec::new(svg::encode(&svg), [12., 12.]);
        let pattern = Pattern::load(&spec, &DefaultImageLoader).await.unwrap();
        assert_eq!(pattern.image_size, [12, 12]);
        assert_eq!(pattern.tile_size, [12., 12.]);
    }

    #[tokio::test]
    async fn load_png() {
        let url = format!(
            "data:image/png;base64,{}",
            STANDARD.encode(encoded(20, 10, ImageFormat::Png))
        );
        assert_eq!(
            DefaultImageLoader.load(&url).await.unwrap(),
            ImageInfo { width: 20, height: 10 }
        );

        let path = std::env::temp_dir().join("olstyle-pattern-test.png");
        tokio::fs::write(
            &path, encoded(3, 4, ImageFormat::Png)
        ).await.unwrap();
        let src = path.to_string_lossy().into_owned();
        assert_eq!(
            DefaultImageLoader.load(&src).await.unwrap(),
            ImageInfo { width: 3, height: 4 }
        );
        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn load_raster_formats() {
        for (format, mime) in [
            (ImageFormat::Jpeg, "image/jpeg"),
            (ImageFormat::Gif, "image/gif"),
            (ImageFormat::Bmp, "image/bmp"),
        ] {
            let url = format!(
                "data:{};base64,{}",
                mime, STANDARD.encode(encoded(8, 6, format))
            );
            assert_eq!(
                DefaultImageLoader.load(&url).await.unwrap(),
                ImageInfo { width: 8, height: 6 },
                "{}", mime
            );
        }
    }

    #[tokio::test]
    async fn load_failures() {
        let loader = DefaultImageLoader;
        assert!(loader.load("https://example.com/a.png").await.is_err());
        assert!(loader.load("/does/not/exist.png").await.is_err());
        assert!(loader.load("data:text/plain,hello").await.is_err());
    }
}
