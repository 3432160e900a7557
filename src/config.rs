//! Application configuration
//!
//! Read once at startup from `config.toml`. Every key is optional, a missing
//! file means "all defaults".

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Env var pointing at an explicit config file
pub const CONFIG_PATH_ENV: &str = "DOGVACIONAL_CONFIG";

/// Env var overriding `api_url`
pub const API_URL_ENV: &str = "DOGVACIONAL_API_URL";

/// Fonts tried in order when `font_path` isn't set
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// How the composed PNG is handed off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareMode {
    /// Open with the desktop's default handler
    #[default]
    System,
    /// Put the image on the clipboard
    Clipboard,
}

/// Geometry of the on-screen card, shared by the view and the composer
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    /// Height of the caption band at the bottom of the card
    pub caption_height: u32,
    pub font_size: f32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 360,
            height: 360,
            caption_height: 96,
            font_size: 22.0,
        }
    }
}

/// All runtime settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Endpoint returning a random dog document
    pub api_url: String,
    /// Root for `images/shared_image.png`
    pub cache_dir: Option<PathBuf>,
    /// Authority the shared file reference is scoped to
    pub share_authority: String,
    pub share_mode: ShareMode,
    /// TTF used to draw the caption into shared images
    pub font_path: Option<PathBuf>,
    /// Fallback `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
    pub surface: SurfaceConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: "https://dog.ceo/api/breeds/image/random".to_string(),
            cache_dir: None,
            share_authority: "dogvacional.fileprovider".to_string(),
            share_mode: ShareMode::default(),
            font_path: None,
            log_filter: "dogvacional=info".to_string(),
            surface: SurfaceConfig::default(),
        }
    }
}

impl Config {
    /// Load the config from disk, then apply env overrides.
    ///
    /// Lookup order:
    /// - `$DOGVACIONAL_CONFIG`
    /// - Linux: ~/.config/dogvacional/config.toml
    /// - macOS: ~/Library/Application Support/dogvacional/config.toml
    /// - Windows: %APPDATA%\dogvacional\config.toml
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                config.api_url = url;
            }
        }

        Ok(config)
    }

    /// Parse a config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse config text
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }
        let mut path = dirs::config_dir()?;
        path.push("dogvacional");
        path.push("config.toml");
        Some(path)
    }

    /// Directory the shared image folder lives under
    pub fn cache_root(&self) -> PathBuf {
        if let Some(dir) = &self.cache_dir {
            return dir.clone();
        }
        match dirs::cache_dir() {
            Some(mut path) => {
                path.push("dogvacional");
                path
            }
            None => std::env::temp_dir().join("dogvacional"),
        }
    }

    /// The configured font, or the first common system font that exists
    pub fn resolve_font(&self) -> Option<PathBuf> {
        if let Some(path) = &self.font_path {
            return Some(path.clone());
        }
        FONT_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }
}
