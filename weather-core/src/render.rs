//! Render dispatch: plain JSON, the default card, or the pixel-city card.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{Font, Scale};
use std::{
    fmt::Debug,
    fs,
    io::Cursor,
    path::{Path, PathBuf},
};
use thiserror::Error;

use crate::{
    language::CityLanguage,
    model::{ImageSize, ResponsePayload, WeatherJson, WeatherRecord},
    timezone::CanonicalTimezone,
};

pub mod city;
pub mod default_theme;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to load image {}: {source}", .path.display())]
    Asset {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to read font {}: {source}", .path.display())]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a usable font: {}", .0.display())]
    Font(PathBuf),

    #[error("failed to encode PNG: {0}")]
    Encode(#[source] image::ImageError),

    #[error("timezone '{0}' cannot be used for rendering")]
    Timezone(String),

    #[error("render task failed: {0}")]
    Join(String),
}

/// What to produce for a request, with exactly the inputs each output needs.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderTarget {
    PlainJson,
    DefaultImage { language: String, timezone: CanonicalTimezone },
    CityImage { language: CityLanguage, size: ImageSize },
}

#[async_trait]
pub trait Renderer: Send + Sync + Debug {
    /// 440×145 card. Returns PNG bytes.
    async fn render_default(
        &self,
        weather: &WeatherRecord,
        language: &str,
        timezone: &CanonicalTimezone,
    ) -> Result<Vec<u8>, RenderError>;

    /// Pixel-city card in the requested size. Returns PNG bytes.
    async fn render_city(
        &self,
        weather: &WeatherRecord,
        language: CityLanguage,
        size: ImageSize,
    ) -> Result<Vec<u8>, RenderError>;
}

/// Produce the payload for `target`.
pub async fn dispatch(
    renderer: &dyn Renderer,
    weather: &WeatherRecord,
    target: &RenderTarget,
) -> Result<ResponsePayload, RenderError> {
    match target {
        RenderTarget::PlainJson => Ok(ResponsePayload::Json(WeatherJson::from(weather))),
        RenderTarget::DefaultImage { language, timezone } => renderer
            .render_default(weather, language, timezone)
            .await
            .map(|png| ResponsePayload::Png(Bytes::from(png))),
        RenderTarget::CityImage { language, size } => renderer
            .render_city(weather, *language, *size)
            .await
            .map(|png| ResponsePayload::Png(Bytes::from(png))),
    }
}

/// Renders cards from the theme assets under `themes_dir`.
///
/// Drawing is CPU bound and runs on the blocking pool.
#[derive(Debug, Clone)]
pub struct ThemeRenderer {
    themes_dir: PathBuf,
}

impl ThemeRenderer {
    pub fn new(themes_dir: impl Into<PathBuf>) -> Self {
        Self { themes_dir: themes_dir.into() }
    }
}

#[async_trait]
impl Renderer for ThemeRenderer {
    async fn render_default(
        &self,
        weather: &WeatherRecord,
        language: &str,
        timezone: &CanonicalTimezone,
    ) -> Result<Vec<u8>, RenderError> {
        let dir = self.themes_dir.join("default");
        let weather = weather.clone();
        let language = language.to_string();
        let timezone = timezone.as_str();

        tokio::task::spawn_blocking(move || {
            default_theme::render(&dir, &weather, &language, Some(timezone), Utc::now())
        })
        .await
        .map_err(|e| RenderError::Join(e.to_string()))?
    }

    async fn render_city(
        &self,
        weather: &WeatherRecord,
        language: CityLanguage,
        size: ImageSize,
    ) -> Result<Vec<u8>, RenderError> {
        let dir = self.themes_dir.join("pixel-city");
        let weather = weather.clone();

        tokio::task::spawn_blocking(move || city::render(&dir, &weather, language, size))
            .await
            .map_err(|e| RenderError::Join(e.to_string()))?
    }
}

/// Round half up, the way card numbers have always been rounded.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

pub(crate) fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub(crate) fn load_font(path: &Path) -> Result<Font<'static>, RenderError> {
    let data = fs::read(path).map_err(|source| RenderError::FontIo { path: path.to_path_buf(), source })?;
    Font::try_from_vec(data).ok_or_else(|| RenderError::Font(path.to_path_buf()))
}

pub(crate) fn load_image(path: &Path) -> Result<RgbaImage, RenderError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| RenderError::Asset { path: path.to_path_buf(), source })
}

/// Draw `text` with its baseline at `baseline`.
pub(crate) fn draw_baseline_text(
    canvas: &mut RgbaImage,
    color: Rgba<u8>,
    x: i32,
    baseline: i32,
    scale: Scale,
    font: &Font<'_>,
    text: &str,
) {
    let ascent = font.v_metrics(scale).ascent.round() as i32;
    draw_text_mut(canvas, color, x, baseline - ascent, scale, font, text);
}

pub(crate) fn encode_png(canvas: RgbaImage) -> Result<Vec<u8>, RenderError> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .map_err(RenderError::Encode)?;
    Ok(buf.into_inner())
}
