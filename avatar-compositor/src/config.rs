//! Compositor configuration.

use std::path::PathBuf;

use avatar_core::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use avatar_renderer::{ExportConfig, RasterCacheConfig, RendererConfig};
use serde::{Deserialize, Serialize};

/// Default export file name.
pub const DEFAULT_EXPORT_NAME: &str = "canvas_image.png";

/// Default directory for static assets.
pub const DEFAULT_ASSET_ROOT: &str = "public";

/// Settings for a compositing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositorConfig {
    /// Surface width in pixels.
    pub width: u32,
    /// Surface height in pixels.
    pub height: u32,
    /// Background color (RGBA). Transparent by default.
    pub background: [u8; 4],
    /// File name used when an export does not name one.
    pub default_export_name: String,
    /// Directory that same-origin asset URLs resolve against.
    pub asset_root: PathBuf,
    /// Byte budget of the decoded asset cache.
    pub cache_max_bytes: usize,
    /// Entry limit of the decoded asset cache.
    pub cache_max_entries: usize,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        let cache = RasterCacheConfig::default();
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            background: [0, 0, 0, 0],
            default_export_name: DEFAULT_EXPORT_NAME.to_string(),
            asset_root: PathBuf::from(DEFAULT_ASSET_ROOT),
            cache_max_bytes: cache.max_size_bytes,
            cache_max_entries: cache.max_entries,
        }
    }
}

impl CompositorConfig {
    /// Load from environment variables, falling back to defaults.
    ///
    /// - `AVATAR_CANVAS_WIDTH` / `AVATAR_CANVAS_HEIGHT`: surface size
    /// - `AVATAR_EXPORT_NAME`: default export file name
    /// - `AVATAR_ASSET_ROOT`: static asset directory
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let dimension = |key: &str, fallback: u32| {
            lookup(key)
                .and_then(|v| v.parse::<u32>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(fallback)
        };
        config.width = dimension("AVATAR_CANVAS_WIDTH", config.width);
        config.height = dimension("AVATAR_CANVAS_HEIGHT", config.height);

        if let Some(name) = lookup("AVATAR_EXPORT_NAME").filter(|v| !v.trim().is_empty()) {
            config.default_export_name = name;
        }
        if let Some(root) = lookup("AVATAR_ASSET_ROOT").filter(|v| !v.is_empty()) {
            config.asset_root = PathBuf::from(root);
        }

        config
    }

    /// Renderer settings derived from this configuration.
    #[must_use]
    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            export: ExportConfig {
                background: self.background,
                ..ExportConfig::default()
            },
        }
    }

    /// Asset cache limits derived from this configuration.
    #[must_use]
    pub fn cache_config(&self) -> RasterCacheConfig {
        RasterCacheConfig {
            max_size_bytes: self.cache_max_bytes,
            max_entries: self.cache_max_entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CompositorConfig::default();
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.default_export_name, "canvas_image.png");
        assert_eq!(config.background, [0, 0, 0, 0]);
    }

    #[test]
    fn test_env_overrides() {
        let config = CompositorConfig::from_lookup(lookup(&[
            ("AVATAR_CANVAS_WIDTH", "640"),
            ("AVATAR_CANVAS_HEIGHT", "480"),
            ("AVATAR_EXPORT_NAME", "my_canvas_image.png"),
            ("AVATAR_ASSET_ROOT", "/srv/assets"),
        ]));
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.default_export_name, "my_canvas_image.png");
        assert_eq!(config.asset_root, PathBuf::from("/srv/assets"));
    }

    #[test]
    fn test_invalid_env_values_fall_back() {
        let config = CompositorConfig::from_lookup(lookup(&[
            ("AVATAR_CANVAS_WIDTH", "0"),
            ("AVATAR_CANVAS_HEIGHT", "tall"),
            ("AVATAR_EXPORT_NAME", "  "),
        ]));
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.default_export_name, DEFAULT_EXPORT_NAME);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: CompositorConfig =
            serde_json::from_str(r#"{"width": 256, "background": [255, 255, 255, 255]}"#)
                .expect("parse");
        assert_eq!(config.width, 256);
        assert_eq!(config.height, 500);
        assert_eq!(config.renderer_config().export.background, [255, 255, 255, 255]);
    }
}
