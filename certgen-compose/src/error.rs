//! Error types for certificate generation.
//!
//! Every failure is terminal for the call that raised it. The variants are
//! kept distinct so a caller can tell a bad background from an allocation
//! or encoding failure without parsing messages.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for composer operations.
pub type Result<T> = std::result::Result<T, ComposeError>;

/// Why the background could not be acquired.
#[derive(Error, Debug)]
pub enum LoadError {
    /// None of the candidate resources exist.
    #[error("Background not found (tried {tried})")]
    Missing { tried: String },

    #[error("Failed to read background {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The resource exists but holds no bytes.
    #[error("Background {0} is empty")]
    Empty(String),

    #[error("Failed to decode background: {0}")]
    Decode(#[from] image::ImageError),
}

/// Field or layout configuration outside its documented ranges.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for '{property}' on field {index}: {reason}")]
    InvalidValue {
        index: usize,
        property: &'static str,
        reason: String,
    },

    #[error("Invalid colour {0:?}: expected #rrggbb")]
    InvalidColor(String),

    #[error("Unknown layout preset: {0}")]
    UnknownPreset(String),

    #[error("Failed to parse layout: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Errors surfaced by a generation call.
#[derive(Error, Debug)]
pub enum ComposeError {
    /// Background missing or undecodable. No surface was created.
    #[error("Image load failed: {0}")]
    ImageLoad(#[from] LoadError),

    /// A drawing surface of the requested size could not be created.
    #[error("Drawing surface unavailable for {width}x{height}: {reason}")]
    SurfaceUnavailable {
        width: u32,
        height: u32,
        reason: String,
    },

    /// The finished surface could not be serialized.
    #[error("Encoding failed: {0}")]
    Encode(#[source] image::ImageError),

    #[error(transparent)]
    InvalidField(#[from] ConfigError),
}
