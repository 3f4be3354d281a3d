// ABOUTME: Configuration module for the slideforge application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::errors::{ForgeError, Result};
use crate::export::ExportConfig;
use crate::player::DEFAULT_AUTO_ADVANCE_MS;
use crate::render::RenderConfig;
use crate::template::{BASE_HEIGHT, BASE_WIDTH, is_widescreen};
use log::warn;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const DEFAULT_STORAGE_FILE: &str = ".slideforge/session.json";

/// Global configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    pub browser_path: Option<String>,
    pub storage_path: PathBuf,
    pub generation_endpoint: Option<String>,
    pub generation_api_key: Option<String>,
    pub default_timeout_ms: u64,
    pub settle_delay_ms: u64,
    pub auto_advance_ms: u64,
    pub slide_width: u32,
    pub slide_height: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browser_path: None,
            storage_path: PathBuf::from(DEFAULT_STORAGE_FILE),
            generation_endpoint: None,
            generation_api_key: None,
            default_timeout_ms: 30000, // 30 seconds
            settle_delay_ms: 500,
            auto_advance_ms: DEFAULT_AUTO_ADVANCE_MS,
            slide_width: BASE_WIDTH,
            slide_height: BASE_HEIGHT,
        }
    }
}

fn env_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
            warn!("Ignoring invalid {}={:?}", name, raw);
            default
        }),
        Err(_) => default,
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.trim().is_empty())
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let mut slide_width = env_number("SLIDE_WIDTH", defaults.slide_width);
        let mut slide_height = env_number("SLIDE_HEIGHT", defaults.slide_height);
        if !is_widescreen(slide_width, slide_height) {
            warn!(
                "Ignoring SLIDE_WIDTH/SLIDE_HEIGHT {}x{}: slides need a 16:9 canvas",
                slide_width, slide_height
            );
            slide_width = defaults.slide_width;
            slide_height = defaults.slide_height;
        }
        Self {
            browser_path: env_string("BROWSER_PATH"),
            storage_path: env_string("SLIDEFORGE_STORAGE")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),
            generation_endpoint: env_string("GENERATION_ENDPOINT"),
            generation_api_key: env_string("GENERATION_API_KEY"),
            default_timeout_ms: env_number("DEFAULT_TIMEOUT_MS", defaults.default_timeout_ms),
            settle_delay_ms: env_number("SETTLE_DELAY_MS", defaults.settle_delay_ms),
            auto_advance_ms: env_number("AUTO_ADVANCE_MS", defaults.auto_advance_ms),
            slide_width,
            slide_height,
        }
    }

    /// The generation endpoint as a parsed http(s) URL.
    pub fn generation_url(&self) -> Result<Url> {
        let raw = self.generation_endpoint.as_deref().ok_or_else(|| {
            ForgeError::ConfigError("GENERATION_ENDPOINT is not set".to_string())
        })?;
        let url = Url::parse(raw).map_err(|e| {
            ForgeError::ConfigError(format!("Invalid generation endpoint {}: {}", raw, e))
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ForgeError::ConfigError(format!(
                "Generation endpoint must be http or https, not {}",
                other
            ))),
        }
    }

    pub fn auto_advance(&self) -> Duration {
        Duration::from_millis(self.auto_advance_ms)
    }

    /// Get a render configuration with defaults from this config.
    /// The canvas must be 16:9.
    pub fn get_render_config(
        &self,
        width: Option<u32>,
        height: Option<u32>,
        timeout_ms: Option<u64>,
    ) -> Result<RenderConfig> {
        let width = width.unwrap_or(self.slide_width);
        let height = height.unwrap_or(self.slide_height);
        if !is_widescreen(width, height) {
            return Err(ForgeError::ConfigError(format!(
                "Slide canvas {}x{} is not 16:9",
                width, height
            )));
        }
        Ok(RenderConfig {
            width,
            height,
            settle_delay_ms: self.settle_delay_ms,
            timeout_ms: timeout_ms.unwrap_or(self.default_timeout_ms),
            browser_path: self.browser_path.clone(),
        })
    }

    /// Get an export configuration with defaults
    pub fn get_export_config(&self, settle_delay_ms: Option<u64>) -> ExportConfig {
        ExportConfig {
            settle_delay_ms: settle_delay_ms.unwrap_or(self.settle_delay_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_canvas() {
        let config = Config::default();
        let render = config.get_render_config(None, None, None).unwrap();
        assert_eq!((render.width, render.height), (1280, 720));
        assert_eq!(render.settle_delay_ms, 500);
        assert_eq!(render.timeout_ms, 30000);
        assert_eq!(config.auto_advance(), Duration::from_millis(5000));
    }

    #[test]
    fn overrides_win() {
        let config = Config::default();
        let render = config.get_render_config(Some(640), Some(360), Some(10)).unwrap();
        assert_eq!((render.width, render.height, render.timeout_ms), (640, 360, 10));

        let export = config.get_export_config(Some(0));
        assert_eq!(export.settle_delay_ms, 0);
    }

    #[test]
    fn canvas_must_be_widescreen() {
        let mut config = Config::default();
        assert!(matches!(
            config.get_render_config(Some(1024), Some(768), None),
            Err(ForgeError::ConfigError(_))
        ));

        config.slide_height = 800;
        assert!(config.get_render_config(None, None, None).is_err());
        assert!(config.get_render_config(None, Some(720), None).is_ok());
    }

    #[test]
    fn generation_endpoint_is_validated() {
        let mut config = Config::default();
        assert!(matches!(
            config.generation_url(),
            Err(ForgeError::ConfigError(_))
        ));

        config.generation_endpoint = Some("not a url".to_string());
        assert!(config.generation_url().is_err());

        config.generation_endpoint = Some("ftp://example.com/gen".to_string());
        assert!(config.generation_url().is_err());

        config.generation_endpoint = Some("https://example.com/generate".to_string());
        assert_eq!(
            config.generation_url().unwrap().as_str(),
            "https://example.com/generate"
        );
    }
}
