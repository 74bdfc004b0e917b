//! Text field configuration.
//!
//! A field is pure data: where its centre goes (as ratios of the surface),
//! how large it starts, how wide it may get, and how it looks. All geometry
//! is relative so one layout works for backgrounds of any resolution.

use std::borrow::Cow;
use std::fmt;

use certgen_text::DEFAULT_MIN_RATIO;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 8-bit RGB colour, serialized as `#rrggbb`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const NEUTRAL: Rgb = Rgb(0x33, 0x33, 0x33);
    pub const AMBER: Rgb = Rgb(0xf5, 0x9e, 0x0b);
    pub const GREEN: Rgb = Rgb(0x05, 0x96, 0x69);

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn parse_hex(s: &str) -> Result<Self, ConfigError> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || ConfigError::InvalidColor(s.to_string());
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Rgb::parse_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// What a field holds. The name field also names the output file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldRole {
    Name,
    Institution,
    #[default]
    Custom,
}

impl FieldRole {
    /// Literal drawn when the field is left blank.
    pub fn default_placeholder(self) -> &'static str {
        match self {
            FieldRole::Name => "Your Name",
            FieldRole::Institution => "Your Institution",
            FieldRole::Custom => "",
        }
    }
}

/// Decoration applied to non-blank content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decoration {
    #[default]
    None,
    /// `content` → `(content)`
    Parenthesized,
}

impl Decoration {
    pub fn apply<'a>(self, content: &'a str) -> Cow<'a, str> {
        match self {
            Decoration::None => Cow::Borrowed(content),
            Decoration::Parenthesized => Cow::Owned(format!("({content})")),
        }
    }
}

/// One visible line of text on the certificate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextField {
    #[serde(default)]
    pub role: FieldRole,
    #[serde(default)]
    pub content: String,
    /// Vertical position of the text centre, as a fraction of surface height.
    pub anchor_y_ratio: f32,
    /// Width budget as a fraction of surface width.
    pub max_width_ratio: f32,
    /// Starting font size as a fraction of surface width, at most 1.
    pub base_size_ratio: f32,
    /// Fit floor as a fraction of the base size.
    #[serde(default = "default_min_size_ratio")]
    pub min_size_ratio: f32,
    pub color: Rgb,
    /// CSS-style family chain, used for both measuring and drawing.
    pub font_family: String,
    /// Overrides the role's default placeholder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub decoration: Decoration,
}

fn default_min_size_ratio() -> f32 {
    DEFAULT_MIN_RATIO
}

impl TextField {
    /// A field with the given geometry, empty content, and default look.
    pub fn new(role: FieldRole, anchor_y_ratio: f32, base_size_ratio: f32) -> Self {
        Self {
            role,
            content: String::new(),
            anchor_y_ratio,
            max_width_ratio: 1.0,
            base_size_ratio,
            min_size_ratio: DEFAULT_MIN_RATIO,
            color: Rgb::NEUTRAL,
            font_family: String::from("\"Times New Roman\", serif"),
            placeholder: None,
            decoration: Decoration::None,
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_max_width_ratio(mut self, ratio: f32) -> Self {
        self.max_width_ratio = ratio;
        self
    }

    pub fn with_min_size_ratio(mut self, ratio: f32) -> Self {
        self.min_size_ratio = ratio;
        self
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    pub fn with_decoration(mut self, decoration: Decoration) -> Self {
        self.decoration = decoration;
        self
    }

    /// Content consisting only of whitespace counts as blank.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    pub fn placeholder(&self) -> &str {
        self.placeholder
            .as_deref()
            .unwrap_or_else(|| self.role.default_placeholder())
    }

    /// The string actually drawn.
    ///
    /// Blankness is judged on the raw content, before decoration, so a
    /// blank parenthesized field shows its placeholder rather than `()`.
    pub fn display_text(&self) -> Cow<'_, str> {
        if self.is_blank() {
            Cow::Borrowed(self.placeholder())
        } else {
            self.decoration.apply(&self.content)
        }
    }

    /// Check every ratio against its documented range. `index` is the
    /// field's position, reported in the error.
    pub fn validate(&self, index: usize) -> Result<(), ConfigError> {
        let invalid = |property: &'static str, reason: String| ConfigError::InvalidValue {
            index,
            property,
            reason,
        };

        if !(0.0..=1.0).contains(&self.anchor_y_ratio) {
            return Err(invalid(
                "anchor_y_ratio",
                format!("must be within [0, 1], got {}", self.anchor_y_ratio),
            ));
        }
        if !(self.max_width_ratio > 0.0 && self.max_width_ratio <= 1.0) {
            return Err(invalid(
                "max_width_ratio",
                format!("must be within (0, 1], got {}", self.max_width_ratio),
            ));
        }
        if !(self.base_size_ratio > 0.0 && self.base_size_ratio <= 1.0) {
            return Err(invalid(
                "base_size_ratio",
                format!("must be within (0, 1], got {}", self.base_size_ratio),
            ));
        }
        if !(self.min_size_ratio > 0.0 && self.min_size_ratio <= 1.0) {
            return Err(invalid(
                "min_size_ratio",
                format!("must be within (0, 1], got {}", self.min_size_ratio),
            ));
        }
        if self.font_family.trim().is_empty() {
            return Err(invalid("font_family", "must not be empty".into()));
        }
        Ok(())
    }
}

// ===================================================================
// Tests
// ===================================================================
