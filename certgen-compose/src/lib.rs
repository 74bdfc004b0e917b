//! # certgen-compose
//!
//! Certificate compositor: draws fitted text fields over a background
//! image and exports the result as PNG.
//!
//! ## Architecture
//!
//! ```text
//!  BackgroundSource (file / memory)
//!       │ async fetch
//!       ▼
//!  acquire() ──► BackgroundImage { width, height }
//!       │
//!       ▼
//!  Composer.plan(fields)        ◀─── certgen_text::fit per field
//!       │
//!       ▼
//!  Surface.draw_cover + draw_text
//!       │
//!       ▼
//!  Surface.encode_png() ──► OutputImage { bytes, filename }
//! ```
//!
//! ## Crate modules
//!
//! - [`background`]: background acquisition and decoding
//! - [`field`]: per-field configuration (anchors, ratios, colour)
//! - [`layout`]: ordered field sets and built-in presets
//! - [`surface`]: RGBA drawing surface and PNG encoding
//! - [`composer`]: the generation sequence
//! - [`output`]: encoded result, filename, sink seam
//! - [`error`]: error taxonomy

pub mod background;
pub mod composer;
pub mod error;
pub mod field;
pub mod layout;
pub mod output;
pub mod surface;

// Re-exports for convenience
pub use background::{acquire, BackgroundImage, BackgroundSource, FileSource, MemorySource};
pub use composer::{Composer, ComposerConfig, PlacedField, DEFAULT_CANVAS};
pub use error::{ComposeError, ConfigError, LoadError, Result};
pub use field::{Decoration, FieldRole, Rgb, TextField};
pub use layout::Layout;
pub use output::{OutputImage, OutputSink, FALLBACK_STEM};
pub use surface::Surface;
