//! Session configuration, parsed from TOML (e.g. `hexmap.toml`).
//!
//! Every field has a default, so an empty file (or no file) yields the
//! standard behavior: EPSG:3857 sources, half a degree of viewport buffer,
//! 150 ms debounce and gray fill for features without a `COLOR_HEX` property.

use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::{HexError, Result}, hex::color::is_hex_rgb, proj::Crs};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexConfig {
    /// CRS of the incoming geometry source (e.g. "EPSG:3857").
    pub source_crs: String,
    /// Margin added on every side of the viewport, in degrees.
    pub buffer_degrees: f64,
    /// Quiet period before a burst of viewport events triggers a recompute.
    pub debounce_ms: u64,
    /// Feature property holding the fill color as `RRGGBB`.
    pub color_property: String,
    /// Fill used when the color property is absent or malformed (`RRGGBB`).
    pub default_color: String,
}

impl Default for HexConfig {
    fn default() -> Self {
        Self {
            source_crs: "EPSG:3857".to_string(),
            buffer_degrees: 0.5,
            debounce_ms: 150,
            color_property: "COLOR_HEX".to_string(),
            default_color: "cccccc".to_string(),
        }
    }
}

impl HexConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)
            .map_err(|e| HexError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        self.source_crs()?;
        if !self.buffer_degrees.is_finite() || self.buffer_degrees < 0.0 {
            return Err(HexError::Config(format!("buffer_degrees must be a non-negative number, got {}", self.buffer_degrees)));
        }
        if !is_hex_rgb(self.default_color.trim_start_matches('#')) {
            return Err(HexError::Config(format!("default_color must be RRGGBB, got {:?}", self.default_color)));
        }
        Ok(())
    }

    #[inline] pub fn source_crs(&self) -> Result<Crs> { self.source_crs.parse() }

    #[inline] pub fn debounce_window(&self) -> Duration { Duration::from_millis(self.debounce_ms) }
}
