//! Runtime configuration.
//!
//! Loaded from a TOML file; every key is optional.
//!
//! ```toml
//! [swkbd]
//! enabled = true
//! locale = "en_US"
//!
//! [cursor]
//! auto_enable_calls = 10
//! min_frame_interval_ms = 33
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CafeConfig {
    pub swkbd: SwkbdConfig,
    pub cursor: CursorConfig,
}

impl CafeConfig {
    /// Parse a configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }
}

/// Software keyboard settings applied at startup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SwkbdConfig {
    /// Master switch. When off, the keyboard never allocates.
    pub enabled: bool,
    /// `language_COUNTRY` locale, e.g. `en_US`.
    pub locale: Option<String>,
}

impl Default for SwkbdConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locale: None,
        }
    }
}

/// Cursor compositor tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Present calls within one frame after which redraw-on-demand kicks in.
    pub auto_enable_calls: u32,
    /// Minimum time between two extra cursor redraws.
    pub min_frame_interval_ms: u32,
    /// Logical coordinate space the pointer is reported in.
    pub logical_width: f32,
    pub logical_height: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            auto_enable_calls: 10,
            min_frame_interval_ms: 33,
            logical_width: 640.0,
            logical_height: 480.0,
        }
    }
}
