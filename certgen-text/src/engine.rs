//! Shaping, measurement and glyph rasterization on top of `cosmic-text`.
//!
//! The engine owns a `FontSystem` (font database + shaping) and a
//! `SwashCache` (glyph rasterization). Text is always laid out as a single
//! unwrapped line. Shaped output is a list of positioned [`GlyphBitmap`]s
//! in line-local coordinates, origin at the top-left of the line box; the
//! caller decides where on its surface the line goes.
//!
//! ## Family resolution
//!
//! A CSS chain is walked left to right against the faces cosmic-text can
//! draw, including files added through [`TextEngine::load_font_data`]. A
//! generic keyword ends the walk; with a [`FontRegistry`] attached it is
//! pinned to the OS default family for that keyword when that family is
//! installed. Nothing resolving means sans-serif.
//!
//! Widths are cached per `(text, size, family chain)` so the shrink-to-fit
//! loop doesn't reshape strings it has already seen.

use std::collections::HashMap;
use std::num::NonZeroUsize;

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, SwashContent};
use lru::LruCache;

use crate::fit::MeasureText;
use crate::fonts::{family_chain, FontRegistry, GenericFamily};

const WIDTH_CACHE_CAPACITY: usize = 1024;

/// Style specification for a line of text.
#[derive(Clone, Debug)]
pub struct TextStyle {
    /// Em size, px.
    pub font_size: f32,
    /// Line box height in pixels. Equal to `font_size` centres the em box
    /// vertically inside the line.
    pub line_height: f32,
    /// CSS-style font family chain (e.g. `"\"Times New Roman\", serif"`).
    pub family: String,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::sized("sans-serif", 16)
    }
}

impl TextStyle {
    /// A tight single-line style at `font_size_px`.
    pub fn sized(family: &str, font_size_px: u32) -> Self {
        Self {
            font_size: font_size_px as f32,
            line_height: font_size_px as f32,
            family: family.to_string(),
        }
    }
}

/// Pixel data of one rasterized glyph.
#[derive(Clone, Debug, PartialEq)]
pub enum GlyphCoverage {
    /// One coverage byte per pixel; the caller supplies the colour.
    Mask(Vec<u8>),
    /// Four RGBA bytes per pixel (colour glyphs such as emoji).
    Color(Vec<u8>),
}

/// A rasterized glyph positioned in line-local pixel coordinates.
#[derive(Clone, Debug)]
pub struct GlyphBitmap {
    /// Top-left of the bitmap relative to the line box origin.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub coverage: GlyphCoverage,
}

/// Result of shaping one line.
#[derive(Clone, Debug)]
pub struct ShapedText {
    pub glyphs: Vec<GlyphBitmap>,
    /// Advance width of the line.
    pub width: f32,
    /// Height of the line box.
    pub height: f32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct WidthKey {
    text: String,
    size_bits: u32,
    family: String,
}

/// What a chain resolved to, owned so it can outlive the database borrow.
#[derive(Clone, Debug, PartialEq, Eq)]
enum ResolvedFamily {
    Generic(GenericFamily),
    /// Installed family, in the database's casing.
    Named(String),
}

impl ResolvedFamily {
    fn as_family(&self) -> Family<'_> {
        match self {
            Self::Generic(GenericFamily::Serif) => Family::Serif,
            Self::Generic(GenericFamily::SansSerif) => Family::SansSerif,
            Self::Generic(GenericFamily::Monospace) => Family::Monospace,
            Self::Generic(GenericFamily::Cursive) => Family::Cursive,
            Self::Generic(GenericFamily::Fantasy) => Family::Fantasy,
            Self::Named(name) => Family::Name(name.as_str()),
        }
    }
}

/// Shapes and measures single lines. Holds the font database, the glyph
/// rasterizer and a width cache, so keep one engine for many calls.
pub struct TextEngine {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    registry: Option<FontRegistry>,
    /// Chain string → resolution. Cleared when fonts are added.
    resolved: HashMap<String, ResolvedFamily>,
    widths: LruCache<WidthKey, f32>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    /// Create a text engine over the system fonts, without a registry.
    pub fn new() -> Self {
        Self::from_parts(FontSystem::new(), None)
    }

    /// Create a text engine whose generic keywords follow `registry`.
    pub fn with_registry(registry: FontRegistry) -> Self {
        Self::from_parts(FontSystem::new(), Some(registry))
    }

    fn from_parts(font_system: FontSystem, registry: Option<FontRegistry>) -> Self {
        let capacity = NonZeroUsize::new(WIDTH_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            registry,
            resolved: HashMap::new(),
            widths: LruCache::new(capacity),
        }
    }

    /// Register an additional font file (TTF/OTF bytes). Its families become
    /// resolvable by name from the next measurement on.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.font_system.db_mut().load_font_data(data);
        self.resolved.clear();
        self.widths.clear();
    }

    pub fn registry(&self) -> Option<&FontRegistry> {
        self.registry.as_ref()
    }

    /// Number of cached width measurements.
    pub fn cached_widths(&self) -> usize {
        self.widths.len()
    }

    fn resolve_family(&mut self, chain: &str) -> ResolvedFamily {
        if let Some(hit) = self.resolved.get(chain) {
            return hit.clone();
        }
        let resolved = self.walk_chain(chain);
        log::debug!("font chain {:?} -> {:?}", chain, resolved);
        self.resolved.insert(chain.to_string(), resolved.clone());
        resolved
    }

    fn walk_chain(&self, chain: &str) -> ResolvedFamily {
        for entry in family_chain(chain) {
            if let Some(generic) = GenericFamily::parse(&entry.to_ascii_lowercase()) {
                let pinned = self
                    .registry
                    .as_ref()
                    .and_then(|registry| registry.generic_family(generic))
                    .and_then(|name| self.installed_family(name));
                return match pinned {
                    Some(name) => ResolvedFamily::Named(name),
                    None => ResolvedFamily::Generic(generic),
                };
            }
            if let Some(name) = self.installed_family(entry) {
                return ResolvedFamily::Named(name);
            }
        }
        ResolvedFamily::Generic(GenericFamily::SansSerif)
    }

    /// Case-insensitive lookup in the font database.
    fn installed_family(&self, name: &str) -> Option<String> {
        self.font_system
            .db()
            .faces()
            .flat_map(|face| face.families.iter())
            .find(|(family, _)| family.eq_ignore_ascii_case(name))
            .map(|(family, _)| family.clone())
    }

    fn layout_line(&mut self, text: &str, style: &TextStyle) -> Buffer {
        let metrics = Metrics::new(style.font_size, style.line_height);
        let family = self.resolve_family(&style.family);
        let attrs = Attrs::new().family(family.as_family());

        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(&mut self.font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);
        buffer
    }

    /// Width in pixels of `text` laid out on one line with `style`.
    pub fn measure_width(&mut self, text: &str, style: &TextStyle) -> f32 {
        if text.is_empty() {
            return 0.0;
        }

        let key = WidthKey {
            text: text.to_string(),
            size_bits: style.font_size.to_bits(),
            family: style.family.clone(),
        };
        if let Some(width) = self.widths.get(&key) {
            return *width;
        }

        let buffer = self.layout_line(text, style);
        let width = buffer
            .layout_runs()
            .map(|run| line_width(run.glyphs))
            .fold(0.0f32, f32::max);

        self.widths.put(key, width);
        width
    }

    /// Shape and rasterize a single line of text.
    pub fn shape_text(&mut self, text: &str, style: &TextStyle) -> ShapedText {
        let buffer = self.layout_line(text, style);

        let mut glyphs = Vec::new();
        let mut width: f32 = 0.0;
        let mut height: f32 = 0.0;

        for run in buffer.layout_runs() {
            let line_y = run.line_y;
            height = height.max(run.line_top + style.line_height);
            width = width.max(line_width(run.glyphs));

            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((0.0, 0.0), 1.0);

                let Some(image) = self
                    .swash_cache
                    .get_image(&mut self.font_system, physical.cache_key)
                else {
                    continue; // whitespace or missing glyph
                };

                if image.placement.width == 0 || image.placement.height == 0 {
                    continue;
                }

                let coverage = match image.content {
                    SwashContent::Mask => GlyphCoverage::Mask(image.data.clone()),
                    SwashContent::Color => GlyphCoverage::Color(image.data.clone()),
                    // Collapse RGB subpixel coverage to a single channel.
                    SwashContent::SubpixelMask => GlyphCoverage::Mask(
                        image
                            .data
                            .chunks_exact(4)
                            .map(|px| ((px[0] as u16 + px[1] as u16 + px[2] as u16) / 3) as u8)
                            .collect(),
                    ),
                };

                glyphs.push(GlyphBitmap {
                    x: physical.x + image.placement.left,
                    y: line_y as i32 + physical.y - image.placement.top,
                    width: image.placement.width,
                    height: image.placement.height,
                    coverage,
                });
            }
        }

        ShapedText {
            glyphs,
            width,
            height,
        }
    }
}

impl MeasureText for TextEngine {
    fn measure(&mut self, text: &str, font_size_px: u32, family: &str) -> f32 {
        self.measure_width(text, &TextStyle::sized(family, font_size_px))
    }
}

fn line_width(glyphs: &[cosmic_text::LayoutGlyph]) -> f32 {
    glyphs.iter().map(|g| g.x + g.w).fold(0.0f32, f32::max)
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cosmic_text::fontdb;

    /// An engine whose database holds nothing until fonts are loaded.
    fn bare_engine(registry: Option<FontRegistry>) -> TextEngine {
        let db = fontdb::Database::new();
        TextEngine::from_parts(FontSystem::new_with_locale_and_db("en-US".into(), db), registry)
    }

    /// Bytes of some installed font file and the family of its first face.
    fn system_font_file() -> Option<(Vec<u8>, String)> {
        let system = FontSystem::new();
        let found = system.db().faces().find_map(|face| {
            let fontdb::Source::File(path) = &face.source else {
                return None;
            };
            let family = face.families.first()?.0.clone();
            Some((std::fs::read(path).ok()?, family))
        });
        found
    }

    #[test]
    fn test_measure_empty_is_zero() {
        let mut engine = TextEngine::new();
        assert_eq!(engine.measure("", 48, "serif"), 0.0);
        assert_eq!(engine.cached_widths(), 0);
    }

    #[test]
    fn test_measure_grows_with_size() {
        let mut engine = TextEngine::new();
        let small = engine.measure("Certificate", 12, "sans-serif");
        let large = engine.measure("Certificate", 48, "sans-serif");
        assert!(small > 0.0, "expected a positive width, got {small}");
        assert!(large > small, "{large} should exceed {small}");
    }

    #[test]
    fn test_measure_grows_with_length() {
        let mut engine = TextEngine::new();
        let short = engine.measure("Ada", 32, "serif");
        let long = engine.measure("Ada Lovelace of the Analytical Engine", 32, "serif");
        assert!(long > short);
    }

    #[test]
    fn test_measure_is_cached() {
        let mut engine = TextEngine::new();
        let first = engine.measure("Cached", 20, "serif");
        assert_eq!(engine.cached_widths(), 1);
        let second = engine.measure("Cached", 20, "serif");
        assert_eq!(first, second);
        assert_eq!(engine.cached_widths(), 1);
        engine.measure("Cached", 21, "serif");
        assert_eq!(engine.cached_widths(), 2);
    }

    #[test]
    fn test_shape_matches_measure() {
        let mut engine = TextEngine::new();
        let style = TextStyle::sized("\"Times New Roman\", serif", 40);
        let measured = engine.measure_width("Jane Doe", &style);
        let shaped = engine.shape_text("Jane Doe", &style);
        assert_eq!(shaped.width, measured);
        assert!(!shaped.glyphs.is_empty(), "expected glyphs for 'Jane Doe'");
        assert!(shaped.height >= 40.0);
    }

    #[test]
    fn test_shape_empty_string() {
        let mut engine = TextEngine::new();
        let shaped = engine.shape_text("", &TextStyle::default());
        assert!(shaped.glyphs.is_empty());
        assert_eq!(shaped.width, 0.0);
    }

    #[test]
    fn test_glyph_bitmaps_match_dimensions() {
        let mut engine = TextEngine::new();
        let shaped = engine.shape_text("Ag", &TextStyle::sized("sans-serif", 32));
        for glyph in &shaped.glyphs {
            let expected = (glyph.width * glyph.height) as usize;
            match &glyph.coverage {
                GlyphCoverage::Mask(data) => assert_eq!(data.len(), expected),
                GlyphCoverage::Color(data) => assert_eq!(data.len(), expected * 4),
            }
        }
    }

    #[test]
    fn test_missing_family_falls_through_to_generic() {
        let mut engine = bare_engine(None);
        assert_eq!(
            engine.resolve_family("\"Times New Roman\", serif"),
            ResolvedFamily::Generic(GenericFamily::Serif)
        );
        assert_eq!(
            engine.resolve_family("Nowhere Sans, 'Nowhere Serif'"),
            ResolvedFamily::Generic(GenericFamily::SansSerif)
        );
    }

    #[test]
    fn test_generic_pin_needs_an_installed_family() {
        let mut registry = FontRegistry::empty();
        registry.set_generic(GenericFamily::Serif, "Fixture Serif");
        let mut engine = bare_engine(Some(registry));
        assert_eq!(
            engine.resolve_family("serif"),
            ResolvedFamily::Generic(GenericFamily::Serif)
        );
    }

    #[test]
    fn test_loaded_font_resolves_by_name() {
        let Some((data, family)) = system_font_file() else {
            return;
        };
        let mut registry = FontRegistry::empty();
        registry.set_generic(GenericFamily::Serif, "Fixture Serif");
        let mut engine = bare_engine(Some(registry));

        let chain = format!("\"{family}\", serif");
        assert_eq!(
            engine.resolve_family(&chain),
            ResolvedFamily::Generic(GenericFamily::Serif)
        );

        engine.load_font_data(data);
        assert_eq!(engine.resolve_family(&chain), ResolvedFamily::Named(family.clone()));
        assert_eq!(
            engine.resolve_family(&family.to_ascii_lowercase()),
            ResolvedFamily::Named(family.clone())
        );
        assert!(engine.measure("Jane Doe", 32, &chain) > 0.0);
    }

    #[test]
    fn test_registry_pins_generic_to_installed_family() {
        let Some((data, family)) = system_font_file() else {
            return;
        };
        let mut registry = FontRegistry::empty();
        registry.set_generic(GenericFamily::Serif, &family);
        let mut engine = bare_engine(Some(registry));
        engine.load_font_data(data);

        assert_eq!(
            engine.resolve_family("\"Times New Roman\", serif"),
            ResolvedFamily::Named(family)
        );
    }

    #[test]
    fn test_style_default() {
        let style = TextStyle::default();
        assert_eq!((style.font_size, style.line_height), (16.0, 16.0));
        assert_eq!(style.family, "sans-serif");
    }
}
