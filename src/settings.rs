use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_BORDERS_URL: &str = "https://raw.githubusercontent.com/vasturiano/react-globe.gl/master/example/datasets/ne_110m_admin_0_countries.geojson";

#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub globe: GlobeSettings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub endpoint: String,
    pub text_model: String,
    pub image_model: String,
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "gemini-2.5-flash-image".to_string(),
            timeout_secs: 90,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GlobeSettings {
    pub borders_url: String,
    pub earth_viewer_url: String,
    pub auto_rotate_speed: f32,  // longitude drift of 6°/s per unit
    pub color_scheme: u8,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        Self {
            borders_url: DEFAULT_BORDERS_URL.to_string(),
            earth_viewer_url: "https://earth.google.com/web".to_string(),
            auto_rotate_speed: 0.5,
            color_scheme: 2,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!(path = %path.display(), error = %e, "ignoring malformed settings file");
                Self::default()
            }),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "could not read settings file");
                Self::default()
            }
        }
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("globetrek")
            .join("config.toml")
    }

    /// API key from the settings file, else `GEMINI_API_KEY`, else `API_KEY`
    pub fn api_key(&self) -> Option<String> {
        self.resolve_api_key(|name| std::env::var(name).ok())
    }

    fn resolve_api_key(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.gemini
            .api_key
            .clone()
            .or_else(|| env("GEMINI_API_KEY"))
            .or_else(|| env("API_KEY"))
            .filter(|k| !k.trim().is_empty())
    }
}
