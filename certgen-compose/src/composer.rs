//! The generation sequence: background → surface → fitted fields → PNG.
//!
//! A [`Composer`] owns the text engine (font discovery is the expensive
//! part, so it is reused across calls) but nothing else survives a call:
//! every [`Composer::compose`] allocates its own surface and drops it after
//! encoding. Calls take `&mut self`, so one composer never runs two
//! generations at once.

use certgen_text::{fit, TextEngine, TextStyle};

use crate::background::{acquire, BackgroundImage, BackgroundSource};
use crate::error::Result;
use crate::field::{Rgb, TextField};
use crate::output::OutputImage;
use crate::surface::Surface;

/// Canvas used when the background reports no usable dimensions.
pub const DEFAULT_CANVAS: (u32, u32) = (1600, 1200);

/// Composer settings.
#[derive(Clone, Debug)]
pub struct ComposerConfig {
    /// Surface size when the background has a zero dimension.
    pub default_canvas: (u32, u32),
    /// Largest surface, in pixels, the composer will allocate.
    pub max_surface_pixels: u64,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            default_canvas: DEFAULT_CANVAS,
            max_surface_pixels: 16_384 * 16_384,
        }
    }
}

/// A field after fitting: what to draw, how big, and where.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedField {
    pub text: String,
    pub base_font_size_px: u32,
    pub font_size_px: u32,
    pub max_width_px: f32,
    /// Centre of the text in surface pixels.
    pub center: (f32, f32),
    pub color: Rgb,
    pub font_family: String,
}

/// Draws text fields over a background and encodes the result.
pub struct Composer {
    engine: TextEngine,
    config: ComposerConfig,
}

impl Default for Composer {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer {
    /// Composer with system fonts and default settings.
    pub fn new() -> Self {
        Self::with_engine(TextEngine::new(), ComposerConfig::default())
    }

    pub fn with_engine(engine: TextEngine, config: ComposerConfig) -> Self {
        Self { engine, config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn engine_mut(&mut self) -> &mut TextEngine {
        &mut self.engine
    }

    /// Surface size for `background`: its natural size, or the default
    /// canvas when a dimension is missing.
    pub fn canvas_size(&self, background: &BackgroundImage) -> (u32, u32) {
        match background.natural_size() {
            Some(size) => size,
            None => {
                log::warn!(
                    "background reports {}x{}; using default canvas {}x{}",
                    background.width(),
                    background.height(),
                    self.config.default_canvas.0,
                    self.config.default_canvas.1,
                );
                self.config.default_canvas
            }
        }
    }

    /// Validate `fields` and fit each one to a `width`×`height` surface.
    pub fn plan(
        &mut self,
        width: u32,
        height: u32,
        fields: &[TextField],
    ) -> Result<Vec<PlacedField>> {
        validate_fields(fields)?;
        Ok(self.place(width, height, fields))
    }

    fn place(&mut self, width: u32, height: u32, fields: &[TextField]) -> Vec<PlacedField> {
        fields
            .iter()
            .map(|field| {
                let text = field.display_text().into_owned();
                let base = (width as f32 * field.base_size_ratio).floor() as u32;
                let max_width = width as f32 * field.max_width_ratio;
                let size = fit(
                    &mut self.engine,
                    &text,
                    base,
                    &field.font_family,
                    max_width,
                    field.min_size_ratio,
                );
                PlacedField {
                    text,
                    base_font_size_px: base,
                    font_size_px: size,
                    max_width_px: max_width,
                    center: (width as f32 / 2.0, height as f32 * field.anchor_y_ratio),
                    color: field.color,
                    font_family: field.font_family.clone(),
                }
            })
            .collect()
    }

    /// Draw `fields` over `background` and encode to PNG.
    pub fn compose(
        &mut self,
        background: &BackgroundImage,
        fields: &[TextField],
    ) -> Result<OutputImage> {
        validate_fields(fields)?;

        let (width, height) = self.canvas_size(background);
        let mut surface = Surface::allocate(width, height, self.config.max_surface_pixels)?;
        surface.draw_cover(background.pixels());

        for placed in self.place(width, height, fields) {
            let style = TextStyle::sized(&placed.font_family, placed.font_size_px);
            let shaped = self.engine.shape_text(&placed.text, &style);
            surface.draw_text(&shaped, placed.center, placed.color);
        }

        let bytes = surface.encode_png()?;
        let filename = OutputImage::filename_for(fields);
        log::info!(
            "composed {} ({}x{}, {} fields, {} bytes)",
            filename,
            width,
            height,
            fields.len(),
            bytes.len()
        );

        Ok(OutputImage {
            bytes,
            width,
            height,
            filename,
        })
    }

    /// Acquire the background from `source`, then [`compose`](Self::compose).
    ///
    /// If acquisition fails nothing is drawn and no output is produced.
    pub async fn generate<S: BackgroundSource>(
        &mut self,
        source: &S,
        fields: &[TextField],
    ) -> Result<OutputImage> {
        let background = acquire(source).await?;
        self.compose(&background, fields)
    }
}

fn validate_fields(fields: &[TextField]) -> Result<()> {
    for (index, field) in fields.iter().enumerate() {
        field.validate(index)?;
    }
    Ok(())
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::MemorySource;
    use crate::error::{ComposeError, ConfigError, LoadError};
    use crate::field::FieldRole;
    use crate::layout::Layout;
    use image::{Rgba, RgbaImage};

    fn name_field(content: &str) -> TextField {
        TextField::new(FieldRole::Name, 0.52, 1.0 / 22.5)
            .with_max_width_ratio(0.7)
            .with_content(content)
    }

    fn plain_background(w: u32, h: u32) -> BackgroundImage {
        BackgroundImage::from_rgba(RgbaImage::from_pixel(w, h, Rgba([250, 245, 230, 255])))
    }

    #[test]
    fn test_short_name_keeps_base_size() {
        let mut composer = Composer::new();
        let placed = composer.plan(1600, 1200, &[name_field("A")]).unwrap();
        assert_eq!(placed[0].base_font_size_px, 71);
        assert_eq!(placed[0].font_size_px, 71);
        assert!((placed[0].max_width_px - 1120.0).abs() < 0.01);
    }

    #[test]
    fn test_long_name_shrinks_within_floor() {
        let mut composer = Composer::new();
        let long = "W".repeat(60);
        let placed = composer.plan(1600, 1200, &[name_field(&long)]).unwrap();
        let size = placed[0].font_size_px;
        assert!(size < 71, "expected shrink, got {size}");
        assert!(size as f32 >= 71.0 * 0.6, "{size} is below the fit floor");
    }

    #[test]
    fn test_anchor_is_centre_of_surface_width() {
        let mut composer = Composer::new();
        let placed = composer.plan(1000, 800, &Layout::classic().fill("Ada", "UCL")).unwrap();
        assert_eq!(placed[0].center, (500.0, 800.0 * 0.44));
        assert_eq!(placed[1].center, (500.0, 800.0 * 0.53));
        assert_eq!(placed[1].text, "(UCL)");
    }

    #[test]
    fn test_blank_fields_plan_placeholders() {
        let mut composer = Composer::new();
        let placed = composer.plan(1600, 1200, &Layout::classic().fill("", "")).unwrap();
        assert_eq!(placed[0].text, "Your Name");
        assert_eq!(placed[1].text, "Your Institution");
    }

    #[test]
    fn test_plan_rejects_invalid_field() {
        let mut composer = Composer::new();
        let bad = name_field("A").with_min_size_ratio(0.0);
        assert!(matches!(
            composer.plan(100, 100, &[bad]),
            Err(ComposeError::InvalidField(ConfigError::InvalidValue {
                property: "min_size_ratio",
                ..
            }))
        ));
    }

    #[test]
    fn test_oversized_base_ratio_is_rejected_before_fitting() {
        let mut composer = Composer::new();
        let huge = TextField::new(FieldRole::Name, 0.5, 1e6)
            .with_min_size_ratio(0.01)
            .with_content("Jane Doe");
        assert!(matches!(
            composer.compose(&plain_background(1600, 1200), &[huge]),
            Err(ComposeError::InvalidField(ConfigError::InvalidValue {
                property: "base_size_ratio",
                ..
            }))
        ));
        assert_eq!(composer.engine_mut().cached_widths(), 0);
    }

    #[test]
    fn test_output_matches_background_resolution() {
        let mut composer = Composer::new();
        let output = composer
            .compose(&plain_background(321, 123), &Layout::accent().fill("Jane", "MIT"))
            .unwrap();
        assert_eq!((output.width, output.height), (321, 123));
        let decoded = image::load_from_memory(&output.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (321, 123));
    }

    #[test]
    fn test_text_changes_pixels() {
        let mut composer = Composer::new();
        let bg = plain_background(400, 300);
        let output = composer.compose(&bg, &Layout::classic().fill("Jane Doe", "")).unwrap();
        let decoded = image::load_from_memory(&output.bytes).unwrap().to_rgba8();
        assert_ne!(&decoded, bg.pixels(), "text should have been drawn");
    }

    #[test]
    fn test_zero_sized_background_uses_default_canvas() {
        let mut composer = Composer::new();
        let bg = BackgroundImage::from_rgba(RgbaImage::new(0, 0));
        assert_eq!(composer.canvas_size(&bg), DEFAULT_CANVAS);
        let output = composer.compose(&bg, &[]).unwrap();
        assert_eq!((output.width, output.height), (1600, 1200));
    }

    #[test]
    fn test_surface_limit_is_reported() {
        let config = ComposerConfig {
            max_surface_pixels: 1_000,
            ..Default::default()
        };
        let mut composer = Composer::with_engine(TextEngine::new(), config);
        assert!(matches!(
            composer.compose(&plain_background(40, 40), &[]),
            Err(ComposeError::SurfaceUnavailable { width: 40, height: 40, .. })
        ));
    }

    #[test]
    fn test_generate_fails_on_undecodable_background() {
        let mut composer = Composer::new();
        let source = MemorySource::new("cert.jpg", b"\xff\xd8\xff garbage".to_vec());
        let fields = Layout::classic().fill("", "");
        let result = pollster::block_on(composer.generate(&source, &fields));
        assert!(matches!(result, Err(ComposeError::ImageLoad(LoadError::Decode(_)))));
    }
}
