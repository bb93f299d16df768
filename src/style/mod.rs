//! Style attributes and the class stylesheet
//!
//! A [`StyleAttributes`] set keeps the raw `property -> value` strings of a
//! declaration list together with the typed values the renderer needs. Every
//! write goes through [`StyleAttributes::set`], so the two views never drift
//! apart.

mod css;
pub mod sheet;

pub use css::{parse_rules, ParsedRules, Rule, SkippedRule};
pub use sheet::{StyleResolver, StyleSheet, StylesheetError};

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::parser::scan;

/// An 8-bit RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Decode `#rrggbb` or the `#rgb` shorthand
    pub fn from_hex(value: &str) -> Result<Self, String> {
        let hex = value.trim().replace('#', "");
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("'{}' is not a hex colour", value));
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).map_err(|e| e.to_string());
        match hex.len() {
            6 => Ok(Rgb::new(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?)),
            3 => {
                let short = |i: usize| byte(&hex[i..i + 1]).map(|v| v * 17);
                Ok(Rgb::new(short(0)?, short(1)?, short(2)?))
            }
            n => Err(format!("expected 3 or 6 hex digits, found {}", n)),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Horizontal alignment of a text line around its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
    End,
}

/// A style value that could not be interpreted.
///
/// The raw value is still stored; only the typed field keeps its previous
/// value.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("ignored {property}: '{value}' ({reason})")]
pub struct StyleWarning {
    pub property: String,
    pub value: String,
    pub reason: String,
}

/// Raw style properties plus their typed interpretation
#[derive(Debug, Clone, PartialEq)]
pub struct StyleAttributes {
    raw: BTreeMap<String, String>,
    stroke: Rgb,
    fill: Rgb,
    has_stroke: bool,
    has_fill: bool,
    stroke_width: f64,
    dash_array: Vec<f64>,
    baseline_shift: f64,
    bold: bool,
    opacity: f64,
    text_anchor: TextAnchor,
    warnings: Vec<StyleWarning>,
}

impl Default for StyleAttributes {
    fn default() -> Self {
        Self {
            raw: BTreeMap::new(),
            stroke: Rgb::BLACK,
            fill: Rgb::BLACK,
            has_stroke: false,
            has_fill: false,
            stroke_width: 1.0,
            dash_array: Vec::new(),
            baseline_shift: 0.0,
            bold: false,
            opacity: 1.0,
            text_anchor: TextAnchor::Start,
            warnings: Vec::new(),
        }
    }
}

impl StyleAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a style from a `prop: value; prop: value` declaration list
    pub fn parse(declarations: &str) -> Self {
        let mut style = Self::new();
        style.append(declarations);
        style
    }

    /// Add every declaration of a `prop: value; ...` list
    pub fn append(&mut self, declarations: &str) {
        for declaration in declarations.split(';') {
            let declaration = declaration.trim();
            if declaration.is_empty() {
                continue;
            }
            match declaration.split_once(':') {
                Some((key, value)) => self.set(key.trim(), value.trim()),
                None => self.warn(declaration, "", "missing ':'".to_string()),
            }
        }
    }

    /// Store a raw property and re-derive its typed field.
    ///
    /// Values that cannot be interpreted leave the typed field untouched and
    /// are recorded in [`StyleAttributes::warnings`].
    pub fn set(&mut self, key: &str, value: &str) {
        self.raw.insert(key.to_string(), value.to_string());
        if let Err(reason) = self.derive(key, value) {
            self.warn(key, value, reason);
        }
    }

    fn derive(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "stroke" => {
                if value == "none" {
                    self.has_stroke = false;
                } else {
                    self.stroke = Rgb::from_hex(value)?;
                    self.has_stroke = true;
                }
            }
            "fill" => {
                if value == "none" {
                    self.has_fill = false;
                } else {
                    self.fill = Rgb::from_hex(value)?;
                    self.has_fill = true;
                }
            }
            "stroke-width" => {
                self.stroke_width = value
                    .replace("px", "")
                    .trim()
                    .parse::<f64>()
                    .map_err(|e| e.to_string())?;
            }
            "stroke-dasharray" => {
                self.dash_array = scan::digit_runs(value).collect();
            }
            "baseline-shift" => {
                self.baseline_shift = scan::integers(value)
                    .next()
                    .ok_or_else(|| "no integer found".to_string())?;
            }
            "font-weight" => {
                self.bold = value == "bold";
            }
            "opacity" => {
                let opacity = value.parse::<f64>().map_err(|e| e.to_string())?;
                self.opacity = opacity.clamp(0.0, 1.0);
            }
            "text-anchor" => {
                self.text_anchor = match value {
                    "start" => TextAnchor::Start,
                    "middle" => TextAnchor::Middle,
                    "end" => TextAnchor::End,
                    other => return Err(format!("unknown anchor '{}'", other)),
                };
            }
            _ => {}
        }
        Ok(())
    }

    fn warn(&mut self, property: &str, value: &str, reason: String) {
        let warning = StyleWarning {
            property: property.to_string(),
            value: value.to_string(),
            reason,
        };
        tracing::warn!(%warning, "style value ignored");
        self.warnings.push(warning);
    }

    /// Raw value of a property
    pub fn get(&self, key: &str) -> Option<&str> {
        self.raw.get(key).map(|s| s.as_str())
    }

    /// True if the property is present with exactly this raw value
    pub fn check(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }

    /// Raw properties in key order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &str)> {
        self.raw.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Merge `other` into `self`; incoming values win property by property
    pub fn extend(&mut self, other: &StyleAttributes) {
        for (key, value) in &other.raw {
            self.set(key, value);
        }
    }

    /// `base` with `overrides` layered on top
    pub fn merge(base: &StyleAttributes, overrides: &StyleAttributes) -> StyleAttributes {
        let mut merged = base.clone();
        merged.extend(overrides);
        merged
    }

    pub fn stroke(&self) -> Rgb {
        self.stroke
    }

    pub fn fill(&self) -> Rgb {
        self.fill
    }

    pub fn has_stroke(&self) -> bool {
        self.has_stroke
    }

    pub fn has_fill(&self) -> bool {
        self.has_fill
    }

    /// Multiplier applied to the renderer's base line width
    pub fn stroke_width(&self) -> f64 {
        self.stroke_width
    }

    pub fn dash_array(&self) -> &[f64] {
        &self.dash_array
    }

    /// The `[dash, gap]` pair, only when exactly two entries were given
    pub fn dash_pattern(&self) -> Option<[f64; 2]> {
        match self.dash_array.as_slice() {
            &[dash, gap] => Some([dash, gap]),
            _ => None,
        }
    }

    /// Baseline shift in percent of the text width
    pub fn baseline_shift(&self) -> f64 {
        self.baseline_shift
    }

    pub fn bold(&self) -> bool {
        self.bold
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn text_anchor(&self) -> TextAnchor {
        self.text_anchor
    }

    pub fn warnings(&self) -> &[StyleWarning] {
        &self.warnings
    }
}
