//! # certgen-text
//!
//! Text engine for certgen. Measures and rasterizes single lines of text
//! via `cosmic-text`, resolves CSS-style family chains against the system
//! fonts, and picks the font size that fits a width budget.
//!
//! ## Architecture
//!
//! ```text
//! FontRegistry (font-kit discovery)
//!     │ resolve "Times New Roman", serif
//!     ▼
//! TextEngine (cosmic-text FontSystem + SwashCache + width LRU)
//!     │                         │
//!     ▼                         ▼
//! measure(text, px, family)   shape_text(text, style) ──► ShapedText { Vec<GlyphBitmap> }
//!     │
//!     ▼
//! fit(measure, text, base, family, max_width, min_ratio) ──► font size
//! ```
//!
//! - **`engine`**: Shaping, measurement, glyph rasterization.
//! - **`fonts`**: System font registry and CSS-style matching.
//! - **`fit`**: Shrink-to-fit font sizing with a floor.

pub mod engine;
pub mod fit;
pub mod fonts;

// Re-exports for ergonomic use.
pub use engine::{GlyphBitmap, GlyphCoverage, ShapedText, TextEngine, TextStyle};
pub use fit::{fit, fit_floor, MeasureText, DEFAULT_MIN_RATIO};
pub use fonts::{family_chain, FontRegistry, GenericFamily};
