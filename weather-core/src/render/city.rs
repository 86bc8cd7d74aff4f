use image::{
    Rgba, RgbaImage,
    imageops::{FilterType, overlay, resize},
};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};
use std::path::Path;

use super::{RenderError, capitalize, encode_png, load_font, load_image, round_half_up};
use crate::{
    language::CityLanguage,
    model::{ImageSize, WeatherRecord},
};

const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 102]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SHADOW_OFFSETS: [(i32, i32); 4] = [(2, 2), (-2, 2), (2, -2), (-2, -2)];

/// Background artwork for a two-character icon code.
pub fn background_for_icon(icon: &str) -> &'static str {
    match icon {
        "01" => "day",
        "02" | "03" => "day_few_clouds",
        "04" => "broken_clouds",
        "09" => "shower_rain",
        "10" => "day_rain",
        "11" => "thunderstorm",
        "13" => "snow",
        "50" => "mist",
        _ => "day",
    }
}

/// `"fl: 14°C / H: 80% / V: 10 km"` in the card language.
pub fn format_other_info(
    language: CityLanguage,
    feels_like: i64,
    humidity: u8,
    visibility_km: i64,
) -> String {
    let (fl, h, v) = match language {
        CityLanguage::En => ("fl", "H", "V"),
        CityLanguage::Ru => ("ощущ.", "Вл", "Вид"),
    };
    format!("{fl}: {feels_like}°C / {h}: {humidity}% / {v}: {visibility_km} km")
}

/// Font sizes and top offsets for the three lines, per card size.
struct Layout {
    temperature: (f32, i32),
    details: (f32, i32),
    other: (f32, i32),
}

fn layout(size: ImageSize) -> Layout {
    match size {
        ImageSize::Big => Layout { temperature: (128.0, 216), details: (64.0, 357), other: (48.0, 435) },
        ImageSize::Small => Layout { temperature: (64.0, 108), details: (32.0, 178), other: (24.0, 217) },
    }
}

/// Draw `text` horizontally centred on `center_x`, `top` being its upper edge.
fn draw_text_with_shadow(
    canvas: &mut RgbaImage,
    text: &str,
    center_x: i32,
    top: i32,
    font: &Font<'_>,
    px: f32,
) {
    let scale = Scale::uniform(px);
    let (width, _) = text_size(scale, font, text);
    let x = center_x - width / 2;

    for (dx, dy) in SHADOW_OFFSETS {
        draw_text_mut(canvas, SHADOW, x + dx, top + dy, scale, font, text);
    }
    draw_text_mut(canvas, WHITE, x, top, scale, font, text);
}

/// Draw the pixel-city card from the assets in `theme_dir`.
pub fn render(
    theme_dir: &Path,
    weather: &WeatherRecord,
    language: CityLanguage,
    size: ImageSize,
) -> Result<Vec<u8>, RenderError> {
    let poppins = load_font(&theme_dir.join("Poppins-SemiBold.ttf"))?;
    let montserrat = load_font(&theme_dir.join("Montserrat-Medium.ttf"))?;
    let open_sans = load_font(&theme_dir.join("OpenSans-SemiBold.ttf"))?;

    let background_path = theme_dir
        .join("backgrounds")
        .join(size.as_str())
        .join(format!("{}.png", background_for_icon(&weather.icon)));
    let background = load_image(&background_path)?;

    let (width, height) = size.dimensions();
    let mut canvas = RgbaImage::new(width, height);
    overlay(&mut canvas, &resize(&background, width, height, FilterType::Nearest), 0, 0);

    let temperature = format!("{}°C", round_half_up(weather.temperature.temp));
    let details = capitalize(&weather.detailed_status);
    let other = format_other_info(
        language,
        round_half_up(weather.temperature.feels_like),
        weather.humidity,
        round_half_up(f64::from(weather.visibility) / 1000.0),
    );

    let center_x = (width / 2) as i32;
    let layout = layout(size);
    let (px, top) = layout.temperature;
    draw_text_with_shadow(&mut canvas, &temperature, center_x, top, &poppins, px);
    let (px, top) = layout.details;
    draw_text_with_shadow(&mut canvas, &details, center_x, top, &montserrat, px);
    let (px, top) = layout.other;
    draw_text_with_shadow(&mut canvas, &other, center_x, top, &open_sans, px);

    encode_png(canvas)
}
