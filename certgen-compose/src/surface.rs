//! RGBA drawing surface.
//!
//! Starts fully transparent, like a fresh canvas. The background is
//! copied in with cover semantics, shaped text is alpha-blended on top,
//! and the result encodes losslessly to PNG.

use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use certgen_text::{GlyphCoverage, ShapedText};

use crate::error::{ComposeError, Result};
use crate::field::Rgb;

/// A mutable pixel buffer owned by one generation call.
pub struct Surface {
    pixels: RgbaImage,
}

impl Surface {
    /// Allocate a transparent `width`×`height` surface.
    ///
    /// Fails with [`ComposeError::SurfaceUnavailable`] for zero-sized or
    /// oversized requests and when the allocator refuses the buffer.
    pub fn allocate(width: u32, height: u32, max_pixels: u64) -> Result<Self> {
        let unavailable = |reason: String| ComposeError::SurfaceUnavailable {
            width,
            height,
            reason,
        };

        if width == 0 || height == 0 {
            return Err(unavailable("zero-sized surface".into()));
        }
        let pixel_count = width as u64 * height as u64;
        if pixel_count > max_pixels {
            return Err(unavailable(format!(
                "{pixel_count} pixels exceeds the limit of {max_pixels}"
            )));
        }
        let len = usize::try_from(pixel_count * 4)
            .map_err(|_| unavailable("buffer size overflows usize".into()))?;

        let mut buf: Vec<u8> = Vec::new();
        buf.try_reserve_exact(len)
            .map_err(|e| unavailable(e.to_string()))?;
        buf.resize(len, 0);

        let pixels = RgbaImage::from_raw(width, height, buf)
            .ok_or_else(|| unavailable("buffer does not match dimensions".into()))?;
        Ok(Self { pixels })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Fill the whole surface with `background`, scaling to cover and
    /// cropping the overflow around the centre. Never letterboxes.
    pub fn draw_cover(&mut self, background: &RgbaImage) {
        let (bw, bh) = background.dimensions();
        if bw == 0 || bh == 0 {
            return;
        }
        let (tw, th) = self.pixels.dimensions();

        if (bw, bh) == (tw, th) {
            self.pixels.copy_from_slice(background.as_raw());
            return;
        }

        let scale = f64::max(tw as f64 / bw as f64, th as f64 / bh as f64);
        let scaled_w = ((bw as f64 * scale).ceil() as u32).max(tw);
        let scaled_h = ((bh as f64 * scale).ceil() as u32).max(th);

        let resized = imageops::resize(background, scaled_w, scaled_h, FilterType::Triangle);
        let x_offset = (scaled_w - tw) / 2;
        let y_offset = (scaled_h - th) / 2;
        let cropped = imageops::crop_imm(&resized, x_offset, y_offset, tw, th).to_image();
        self.pixels.copy_from_slice(cropped.as_raw());
    }

    /// Blend a shaped line so that its box is centred on `center`.
    pub fn draw_text(&mut self, shaped: &ShapedText, center: (f32, f32), color: Rgb) {
        let origin_x = (center.0 - shaped.width / 2.0).round() as i32;
        let origin_y = (center.1 - shaped.height / 2.0).round() as i32;

        for glyph in &shaped.glyphs {
            let gx = origin_x + glyph.x;
            let gy = origin_y + glyph.y;

            for row in 0..glyph.height {
                for col in 0..glyph.width {
                    let x = gx + col as i32;
                    let y = gy + row as i32;
                    if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
                        continue;
                    }

                    let idx = (row * glyph.width + col) as usize;
                    let (src, alpha) = match &glyph.coverage {
                        GlyphCoverage::Mask(data) => ([color.0, color.1, color.2], data[idx]),
                        GlyphCoverage::Color(data) => {
                            let px = &data[idx * 4..idx * 4 + 4];
                            ([px[0], px[1], px[2]], px[3])
                        }
                    };
                    if alpha == 0 {
                        continue;
                    }
                    blend_over(self.pixels.get_pixel_mut(x as u32, y as u32), src, alpha);
                }
            }
        }
    }

    /// Serialize to PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut bytes = Vec::new();
        PngEncoder::new(&mut bytes)
            .write_image(
                self.pixels.as_raw(),
                self.width(),
                self.height(),
                ExtendedColorType::Rgba8,
            )
            .map_err(ComposeError::Encode)?;
        Ok(bytes)
    }
}

/// Source-over with straight (non-premultiplied) alpha, in integer math
/// so output is bit-for-bit reproducible.
fn blend_over(dst: &mut Rgba<u8>, src: [u8; 3], alpha: u8) {
    let sa = alpha as u32;
    let da = dst[3] as u32;
    // out_a = sa + da * (1 - sa), scaled by 255.
    let out_a = sa * 255 + da * (255 - sa);
    if out_a == 0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }
    for c in 0..3 {
        let s = src[c] as u32 * sa * 255;
        let d = dst[c] as u32 * da * (255 - sa);
        dst[c] = ((s + d + out_a / 2) / out_a) as u8;
    }
    dst[3] = ((out_a + 127) / 255) as u8;
}

// ===================================================================
// Tests
// ===================================================================
