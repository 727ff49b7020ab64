// Copyright (C) 2025 Ryan Daum <ryan.daum@gmail.com> This program is free
// software: you can redistribute it and/or modify it under the terms of the GNU
// General Public License as published by the Free Software Foundation, version
// 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Engine configuration.
//!
//! The shell owns where settings come from; the engine only needs a handful
//! of values. They can be built in code or parsed from a TOML fragment:
//!
//! ```toml
//! tab_size = 8
//! wrap = true
//!
//! [glyph]
//! advance = 7
//! line_height = 15
//! ```

use serde::Deserialize;

use crate::error::ConfigError;

/// Font measurements the layout engine works with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlyphConfig {
    /// Advance width of an ordinary glyph, in pixels
    pub advance: u32,
    /// Height of one visual row, in pixels
    pub line_height: u32,
    /// Whether the font is monospaced (wide glyphs then take two advances)
    pub monospaced: bool,
    /// Width reserved for the caret at the end of a row
    pub caret_width: u32,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            advance: 8,
            line_height: 16,
            monospaced: true,
            caret_width: 1,
        }
    }
}

/// Settings for one document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tab stop distance, in space advances
    pub tab_size: usize,
    /// Largest paste accepted, in characters
    pub max_paste_chars: usize,
    /// Maximum undo history length (0 = unlimited)
    pub history_limit: usize,
    /// Soft-wrap lines at the viewport width
    pub wrap: bool,
    pub glyph: GlyphConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tab_size: 4,
            max_paste_chars: 512 * 1024,
            history_limit: 0,
            wrap: false,
            glyph: GlyphConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a TOML fragment. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(source)?;
        config.validate()?;
        tracing::debug!(?config, "loaded engine config");
        Ok(config)
    }

    /// Like [`from_toml_str`](Self::from_toml_str), but a fragment that
    /// fails to parse or validate yields the defaults instead.
    pub fn from_toml_str_or_default(source: &str) -> Self {
        match Self::from_toml_str(source) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(%err, "falling back to default engine config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tab_size == 0 {
            return Err(ConfigError::Invalid {
                key: "tab_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.glyph.advance == 0 {
            return Err(ConfigError::Invalid {
                key: "glyph.advance",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.glyph.line_height == 0 {
            return Err(ConfigError::Invalid {
                key: "glyph.line_height",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
