use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::Path, path::PathBuf};

/// Current-weather endpoint of the OpenWeather API.
pub const DEFAULT_PROVIDER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Response cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Validity window of a cached response, in seconds.
    pub ttl_secs: u64,
    /// Upper bound on the number of cached responses.
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 30 * 60, max_entries: 10_000 }
    }
}

/// Service configuration.
///
/// Example TOML:
/// ```toml
/// listen = "0.0.0.0:3000"
/// token = "..."
/// themes_dir = "public/themes"
///
/// [cache]
/// ttl_secs = 1800
/// max_entries = 10000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listen: String,

    /// Provider credential. Optional on purpose: a missing token is reported
    /// per request, not at startup.
    pub token: Option<String>,

    pub provider_url: String,

    /// Root holding the `default/` and `pixel-city/` theme assets.
    pub themes_dir: PathBuf,

    pub cache: CacheConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            token: None,
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            themes_dir: PathBuf::from("public/themes"),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Load config from `path`, or from the platform config dir when `path` is
    /// `None`, then apply environment overrides.
    ///
    /// A missing file is not an error: defaults are used instead.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        let mut cfg = Self::from_file(&path)?;
        cfg.apply_env(|key| env::var(key).ok());
        Ok(cfg)
    }

    fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Override fields from `TOKEN`, `PORT` and `WEATHER_THEMES_DIR`.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup("TOKEN").filter(|t| !t.trim().is_empty()) {
            self.token = Some(token);
        }

        if let Some(port) = lookup("PORT").and_then(|p| p.trim().parse::<u16>().ok()) {
            let host = self.listen.rsplit_once(':').map_or("0.0.0.0", |(host, _)| host);
            self.listen = format!("{host}:{port}");
        }

        if let Some(dir) = lookup("WEATHER_THEMES_DIR") {
            self.themes_dir = PathBuf::from(dir);
        }
    }

    /// Returns the provider credential, if configured.
    pub fn provider_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-card", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }
}
