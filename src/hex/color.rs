use serde_json::{Map, Value};

use crate::{config::HexConfig, error::{HexError, Result}};

/// Six hex digits, no prefix.
pub(crate) fn is_hex_rgb(s: &str) -> bool {
    s.len() == 6 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// How a feature's fill color is read from its properties.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRule {
    property: String,
    fallback: String, // "#RRGGBB"
}

impl ColorRule {
    /// `fallback` is `RRGGBB` with or without a leading `#`; anything else is rejected.
    pub fn new(property: impl Into<String>, fallback: &str) -> Result<Self> {
        let digits = fallback.trim_start_matches('#');
        if !is_hex_rgb(digits) {
            return Err(HexError::Config(format!("fallback color must be RRGGBB, got {fallback:?}")));
        }
        Ok(Self { property: property.into(), fallback: format!("#{digits}") })
    }

    pub fn from_config(config: &HexConfig) -> Result<Self> {
        Self::new(config.color_property.clone(), &config.default_color)
    }

    #[inline] pub fn fallback(&self) -> &str { &self.fallback }

    /// `#RRGGBB` from the color property, or the fallback when it is absent,
    /// not a string, or not six hex digits.
    pub fn color_of(&self, properties: &Map<String, Value>) -> String {
        properties.get(&self.property)
            .and_then(Value::as_str)
            .map(|s| s.trim().trim_start_matches('#'))
            .filter(|s| is_hex_rgb(s))
            .map_or_else(|| self.fallback.clone(), |s| format!("#{s}"))
    }
}

impl Default for ColorRule {
    fn default() -> Self {
        Self { property: "COLOR_HEX".to_string(), fallback: "#cccccc".to_string() }
    }
}
