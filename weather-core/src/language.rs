/// Caller language code → provider language code.
static PROVIDER_LANGUAGES: &[(&str, &str)] = &[
    ("af", "af"),
    ("ar", "ar"),
    ("az", "az"),
    ("bg", "bg"),
    ("ca", "ca"),
    ("cs", "cz"),
    ("cz", "cz"),
    ("da", "da"),
    ("de", "de"),
    ("el", "el"),
    ("en", "en"),
    ("es", "sp"),
    ("sp", "sp"),
    ("fi", "fi"),
    ("fr", "fr"),
    ("he", "he"),
    ("hi", "hi"),
    ("hu", "hu"),
    ("id", "id"),
    ("it", "it"),
    ("ja", "ja"),
    ("ko", "kr"),
    ("kr", "kr"),
    ("lt", "lt"),
    ("lv", "la"),
    ("nl", "nl"),
    ("no", "no"),
    ("pl", "pl"),
    ("pt", "pt"),
    ("ro", "ro"),
    ("ru", "ru"),
    ("sk", "sk"),
    ("sv", "se"),
    ("se", "se"),
    ("th", "th"),
    ("tr", "tr"),
    ("uk", "ua"),
    ("ua", "ua"),
    ("vi", "vi"),
    ("zh", "zh_cn"),
    ("zh_cn", "zh_cn"),
    ("zh_tw", "zh_tw"),
];

/// Look up the provider language for a caller supplied code (case-insensitive).
pub fn provider_language(code: &str) -> Option<&'static str> {
    let key = code.to_lowercase();
    PROVIDER_LANGUAGES.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Languages the pixel-city card has text for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CityLanguage {
    En,
    Ru,
}

impl CityLanguage {
    /// `ru` renders in Russian, every other language in English.
    pub fn from_code(code: &str) -> Self {
        if code.eq_ignore_ascii_case("ru") { CityLanguage::Ru } else { CityLanguage::En }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CityLanguage::En => "en",
            CityLanguage::Ru => "ru",
        }
    }
}
