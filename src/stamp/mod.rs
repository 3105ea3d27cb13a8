//! Stamp compositing — orientation correction plus text overlay.
//!
//! | Step | Module / function |
//! |---|---|
//! | **Upright layout** | [`crate::orient::oriented_layout`] |
//! | **Orientation pixels** | [`crate::orient::apply_orientation`] |
//! | **Stamp geometry** | [`layout`] (pure calculations) |
//! | **Font** | [`font`] (embedded DejaVu Sans Mono + override) |
//! | **Text layers** | [`text`] (mask, outline, shadow, fill) |
//!
//! The composite order is fixed and load-bearing: the bitmap is corrected
//! to upright *first*, and only then is the stamp measured and placed —
//! the stamp position and size derive from the upright canvas dimensions,
//! not the sensor dimensions. Because orientation is applied by producing
//! a new upright image value (not by mutating a drawing context), the text
//! pass cannot accidentally run in source-rotated coordinates.

pub mod font;
pub mod layout;
pub mod text;

pub use font::{FontError, load_font};

use crate::config::StampAppearance;
use crate::orient::{OrientationCode, apply_orientation, oriented_layout};
use ab_glyph::FontArc;
use image::{DynamicImage, RgbaImage};

/// Correct a decoded bitmap to upright and composite the stamp text onto
/// its bottom-right corner.
///
/// Consumes the bitmap; the returned canvas is the only surviving copy.
pub fn render_stamped(
    bitmap: DynamicImage,
    orientation: OrientationCode,
    stamp_text: &str,
    appearance: &StampAppearance,
    font: &FontArc,
) -> RgbaImage {
    let (w, h) = (bitmap.width(), bitmap.height());
    let layout = oriented_layout(orientation, w, h);

    let mut canvas = apply_orientation(bitmap, orientation).into_rgba8();
    debug_assert_eq!((canvas.width(), canvas.height()), (layout.width, layout.height));

    draw_stamp(&mut canvas, stamp_text, appearance, font);
    canvas
}

/// Draw the stamp onto an already-upright canvas.
pub fn draw_stamp(
    canvas: &mut RgbaImage,
    stamp_text: &str,
    appearance: &StampAppearance,
    font: &FontArc,
) {
    let (cw, ch) = canvas.dimensions();
    let font_px = layout::font_size_px(cw, appearance.size_percent);
    let margin = layout::margin_px(cw, appearance.margin_percent);

    let text_width = text::measure_text(font, stamp_text, font_px as f32);
    let anchor = layout::stamp_anchor(cw, ch, margin, text_width);

    text::draw_stamp_text(
        canvas,
        font,
        stamp_text,
        font_px as f32,
        anchor,
        appearance.color,
        layout::stroke_width(font_px),
        layout::shadow_blur(font_px),
    );
}
