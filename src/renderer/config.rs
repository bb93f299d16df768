//! Configuration for replaying documents onto a surface

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Line width applied for a `stroke-width` of 1
pub const BASE_LINE_WIDTH: f64 = 0.1;

/// Font size applied for a text placement scale of 1
pub const BASE_FONT_SIZE: f64 = 4.0;

/// Errors that can occur when loading render configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read render config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse render config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Invalid render config: {0}")]
    Invalid(String),
}

/// Configuration options for [`render_with_config`](super::render_with_config)
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Line width multiplied by each path's `stroke-width`
    pub base_line_width: f64,

    /// Font size multiplied by each text's transform scale
    pub base_font_size: f64,

    /// Distance between text lines, as a multiple of the font size
    pub line_spacing: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            base_line_width: BASE_LINE_WIDTH,
            base_font_size: BASE_FONT_SIZE,
            line_spacing: 1.0,
        }
    }
}

/// On-disk layout: a `[render]` table with kebab-case keys
#[derive(Debug, Default, Deserialize)]
struct TomlRenderConfig {
    #[serde(default)]
    render: TomlRenderSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TomlRenderSection {
    line_width: Option<f64>,
    font_size: Option<f64>,
    line_spacing: Option<f64>,
}

impl RenderConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base line width
    pub fn with_base_line_width(mut self, width: f64) -> Self {
        self.base_line_width = width;
        self
    }

    /// Set the base font size
    pub fn with_base_font_size(mut self, size: f64) -> Self {
        self.base_font_size = size;
        self
    }

    /// Set the line spacing factor for multi-line text
    pub fn with_line_spacing(mut self, spacing: f64) -> Self {
        self.line_spacing = spacing;
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load configuration from a TOML string
    ///
    /// Missing keys keep their default values.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlRenderConfig = toml::from_str(content)?;
        let defaults = Self::default();
        let section = parsed.render;

        let config = RenderConfig {
            base_line_width: section.line_width.unwrap_or(defaults.base_line_width),
            base_font_size: section.font_size.unwrap_or(defaults.base_font_size),
            line_spacing: section.line_spacing.unwrap_or(defaults.line_spacing),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("line-width", self.base_line_width),
            ("font-size", self.base_font_size),
            ("line-spacing", self.line_spacing),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}
