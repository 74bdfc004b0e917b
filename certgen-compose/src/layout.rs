//! Ordered field sets.
//!
//! Certificate designs differ only in data (colours, anchors, ratios,
//! whether a field may shrink), so each design is a [`Layout`] rather than
//! a code path. Two presets ship built in; anything else loads from JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::field::{Decoration, FieldRole, Rgb, TextField};

const SERIF_CHAIN: &str = "\"Times New Roman\", serif";

/// An ordered sequence of text fields, drawn first to last.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub fields: Vec<TextField>,
}

impl Layout {
    /// Names accepted by [`Layout::preset`].
    pub const PRESETS: [&'static str; 2] = ["classic", "accent"];

    /// Neutral grey serif text at 44% / 53% height. Neither line shrinks:
    /// the fit floor equals the base size.
    pub fn classic() -> Self {
        Self {
            fields: vec![
                TextField::new(FieldRole::Name, 0.44, 1.0 / 18.0)
                    .with_font_family(SERIF_CHAIN)
                    .with_min_size_ratio(1.0),
                TextField::new(FieldRole::Institution, 0.53, 1.0 / 28.0)
                    .with_font_family(SERIF_CHAIN)
                    .with_min_size_ratio(1.0)
                    .with_decoration(Decoration::Parenthesized),
            ],
        }
    }

    /// Amber name at 52% and green institution at 62%, both shrinking to
    /// fit their width budgets.
    pub fn accent() -> Self {
        Self {
            fields: vec![
                TextField::new(FieldRole::Name, 0.52, 1.0 / 22.5)
                    .with_font_family(SERIF_CHAIN)
                    .with_max_width_ratio(0.7)
                    .with_color(Rgb::AMBER),
                TextField::new(FieldRole::Institution, 0.62, 1.0 / 36.0)
                    .with_font_family(SERIF_CHAIN)
                    .with_max_width_ratio(0.8)
                    .with_color(Rgb::GREEN),
            ],
        }
    }

    pub fn preset(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Ok(Self::classic()),
            "accent" => Ok(Self::accent()),
            _ => Err(ConfigError::UnknownPreset(name.to_string())),
        }
    }

    /// Parse and validate a JSON layout.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let layout: Layout = serde_json::from_str(json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fields
            .iter()
            .enumerate()
            .try_for_each(|(index, field)| field.validate(index))
    }

    /// Set the content of every field with `role`.
    pub fn set_content(&mut self, role: FieldRole, content: &str) {
        for field in self.fields.iter_mut().filter(|f| f.role == role) {
            field.content = content.to_string();
        }
    }

    /// Fill the name and institution fields and hand back the sequence.
    pub fn fill(mut self, name: &str, institution: &str) -> Vec<TextField> {
        self.set_content(FieldRole::Name, name);
        self.set_content(FieldRole::Institution, institution);
        self.fields
    }
}
