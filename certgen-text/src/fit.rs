//! Shrink-to-fit font sizing.
//!
//! Starting from a base size, the fitter steps down one pixel at a time
//! until the text fits its width budget or the size reaches the fit floor
//! (`ceil(base * min_ratio)`). Text that still overflows at the floor is
//! returned at the floor: long strings may overflow their budget rather
//! than shrink without bound.

/// Default fit floor as a fraction of the base size.
pub const DEFAULT_MIN_RATIO: f32 = 0.6;

/// Anything that can report the rendered width of a string.
///
/// The `family` passed here must be the same family string later used to
/// draw the text.
pub trait MeasureText {
    fn measure(&mut self, text: &str, font_size_px: u32, family: &str) -> f32;
}

impl<F> MeasureText for F
where
    F: FnMut(&str, u32, &str) -> f32,
{
    fn measure(&mut self, text: &str, font_size_px: u32, family: &str) -> f32 {
        self(text, font_size_px, family)
    }
}

/// Smallest size the fitter will return for `base_font_size_px`.
pub fn fit_floor(base_font_size_px: u32, min_ratio: f32) -> u32 {
    let exact = base_font_size_px as f32 * min_ratio.clamp(0.0, 1.0);
    // 100 * 0.6f32 lands a hair above 60.
    let floor = if (exact - exact.round()).abs() < 1e-3 {
        exact.round()
    } else {
        exact.ceil()
    };
    (floor as u32).min(base_font_size_px)
}

/// Largest size in `[fit_floor, base]` at which `text` fits `max_width_px`,
/// or the floor when no size in range fits.
pub fn fit<M>(
    measure: &mut M,
    text: &str,
    base_font_size_px: u32,
    family: &str,
    max_width_px: f32,
    min_ratio: f32,
) -> u32
where
    M: MeasureText + ?Sized,
{
    if text.is_empty() {
        return base_font_size_px;
    }

    let floor = fit_floor(base_font_size_px, min_ratio);
    let mut size = base_font_size_px;
    let mut width = measure.measure(text, size, family);

    while width > max_width_px && size > floor {
        size -= 1;
        width = measure.measure(text, size, family);
    }

    if size < base_font_size_px {
        log::debug!(
            "fit: {:?} shrunk {}px -> {}px (width {:.1}/{:.1}{})",
            text,
            base_font_size_px,
            size,
            width,
            max_width_px,
            if width > max_width_px { ", floor reached" } else { "" },
        );
    }

    size
}

// ===================================================================
// Tests
// ===================================================================
