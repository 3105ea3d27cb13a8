//! Stamp text rendering.
//!
//! The stamp is drawn in three layers, bottom to top:
//!
//! 1. **outline** — near-opaque black, dilated from the glyph coverage by
//!    the stroke radius, so the text reads on any background
//! 2. **drop shadow** — translucent black, the glyph coverage blurred
//! 3. **fill** — the configured color
//!
//! The glyphs are rasterized once into a coverage mask; outline and shadow
//! are derived from that mask (dilation and box blur) instead of
//! re-rasterizing per offset. All work happens inside a clipped region
//! around the text, so stamping a 40-megapixel photo touches only the
//! corner that changes.

use super::layout::StampAnchor;
use ab_glyph::{Font, FontArc, Glyph, PxScale, ScaleFont, point};
use image::{GrayImage, Rgba, RgbaImage};

/// Outline layer color: rgba(0, 0, 0, 0.85).
const STROKE_COLOR: Rgba<u8> = Rgba([0, 0, 0, 217]);
/// Shadow layer color: rgba(0, 0, 0, 0.35).
const SHADOW_COLOR: Rgba<u8> = Rgba([0, 0, 0, 89]);

/// Advance width of `text` at `px` pixels, including kerning.
pub fn measure_text(font: &FontArc, text: &str, px: f32) -> f32 {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut width = 0.0;
    let mut last = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = last {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        last = Some(id);
    }
    width
}

/// Draw the three stamp layers onto the canvas.
///
/// `anchor` is the left edge and alphabetic baseline of the text run in
/// canvas coordinates. Text extending past the canvas is clipped.
pub fn draw_stamp_text(
    canvas: &mut RgbaImage,
    font: &FontArc,
    text: &str,
    px: f32,
    anchor: StampAnchor,
    fill: Rgba<u8>,
    stroke_radius: u32,
    shadow_radius: u32,
) {
    let scaled = font.as_scaled(PxScale::from(px));
    let text_width = measure_text(font, text, px);

    // Clip region: the text box padded by everything that can bleed out of
    // it (outline dilation, shadow blur).
    let pad = (stroke_radius + 2 * shadow_radius + 2) as i32;
    let x0 = (anchor.x - pad).max(0);
    let y0 = (anchor.baseline_y - scaled.ascent().ceil() as i32 - pad).max(0);
    let x1 = (anchor.x + text_width.ceil() as i32 + pad).min(canvas.width() as i32);
    let y1 = (anchor.baseline_y - scaled.descent().floor() as i32 + pad).min(canvas.height() as i32);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let (region_w, region_h) = ((x1 - x0) as u32, (y1 - y0) as u32);

    let mask = rasterize_mask(
        font,
        text,
        px,
        point(
            (anchor.x - x0) as f32,
            (anchor.baseline_y - y0) as f32,
        ),
        region_w,
        region_h,
    );
    let outline = dilate_disc(&mask, stroke_radius);
    let shadow = box_blur(&mask, shadow_radius);

    for y in 0..region_h {
        for x in 0..region_w {
            let cx = (x0 as u32) + x;
            let cy = (y0 as u32) + y;
            let px_ref = canvas.get_pixel_mut(cx, cy);

            blend(px_ref, STROKE_COLOR, outline.get_pixel(x, y).0[0]);
            blend(px_ref, SHADOW_COLOR, shadow.get_pixel(x, y).0[0]);
            blend(px_ref, fill, mask.get_pixel(x, y).0[0]);
        }
    }
}

/// Rasterize the glyph run once into a coverage mask.
///
/// `origin` is the pen position (left edge, baseline) in mask coordinates.
fn rasterize_mask(
    font: &FontArc,
    text: &str,
    px: f32,
    origin: ab_glyph::Point,
    width: u32,
    height: u32,
) -> GrayImage {
    let scaled = font.as_scaled(PxScale::from(px));
    let mut mask = GrayImage::new(width, height);

    let mut caret = origin.x;
    let mut last = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = last {
            caret += scaled.kern(prev, id);
        }
        let glyph: Glyph = id.with_scale_and_position(PxScale::from(px), point(caret, origin.y));
        caret += scaled.h_advance(id);
        last = Some(id);

        let Some(outlined) = font.outline_glyph(glyph) else {
            continue; // whitespace
        };
        let bounds = outlined.px_bounds();
        outlined.draw(|gx, gy, coverage| {
            let mx = bounds.min.x as i32 + gx as i32;
            let my = bounds.min.y as i32 + gy as i32;
            if mx >= 0 && my >= 0 && (mx as u32) < width && (my as u32) < height {
                let value = (coverage * 255.0) as u8;
                let pixel = mask.get_pixel_mut(mx as u32, my as u32);
                pixel.0[0] = pixel.0[0].max(value);
            }
        });
    }
    mask
}

/// Morphological dilation with a disc structuring element: each output
/// pixel takes the maximum coverage within `radius` of it.
fn dilate_disc(mask: &GrayImage, radius: u32) -> GrayImage {
    let (w, h) = mask.dimensions();
    let mut out = mask.clone();
    let r = radius as i32;

    for dy in -r..=r {
        for dx in -r..=r {
            if dx == 0 && dy == 0 {
                continue;
            }
            if dx * dx + dy * dy > r * r {
                continue;
            }
            for y in 0..h as i32 {
                let sy = y - dy;
                if sy < 0 || sy >= h as i32 {
                    continue;
                }
                for x in 0..w as i32 {
                    let sx = x - dx;
                    if sx < 0 || sx >= w as i32 {
                        continue;
                    }
                    let v = mask.get_pixel(sx as u32, sy as u32).0[0];
                    let o = out.get_pixel_mut(x as u32, y as u32);
                    if v > o.0[0] {
                        o.0[0] = v;
                    }
                }
            }
        }
    }
    out
}

/// Two-pass separable box blur, applied twice to approximate a gaussian.
fn box_blur(mask: &GrayImage, radius: u32) -> GrayImage {
    if radius == 0 {
        return mask.clone();
    }
    let pass = |src: &GrayImage| {
        let h = blur_axis(src, radius, true);
        blur_axis(&h, radius, false)
    };
    pass(&pass(mask))
}

fn blur_axis(src: &GrayImage, radius: u32, horizontal: bool) -> GrayImage {
    let (w, h) = src.dimensions();
    let mut out = GrayImage::new(w, h);
    let r = radius as i32;
    let window = (2 * r + 1) as u32;

    let (outer, inner) = if horizontal { (h, w) } else { (w, h) };
    for o in 0..outer {
        let mut sum: u32 = 0;
        let get = |i: i32| -> u32 {
            if i < 0 || i >= inner as i32 {
                return 0;
            }
            let (x, y) = if horizontal { (i as u32, o) } else { (o, i as u32) };
            src.get_pixel(x, y).0[0] as u32
        };
        for i in -r..=r {
            sum += get(i);
        }
        for i in 0..inner as i32 {
            let (x, y) = if horizontal { (i as u32, o) } else { (o, i as u32) };
            out.get_pixel_mut(x, y).0[0] = (sum / window) as u8;
            sum += get(i + r + 1);
            sum -= get(i - r);
        }
    }
    out
}

/// Alpha-blend `color` over the pixel at the given coverage, scaling the
/// color's own alpha by the coverage. The canvas stays opaque.
fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, coverage: u8) {
    if coverage == 0 {
        return;
    }
    let alpha = (coverage as u16 * color.0[3] as u16) / 255;
    let inv = 255 - alpha;
    for c in 0..3 {
        pixel.0[c] =
            ((color.0[c] as u16 * alpha + pixel.0[c] as u16 * inv) / 255) as u8;
    }
}
