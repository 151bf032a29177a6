//! Text rasterisation and alpha compositing.
//!
//! Drawing happens in two steps. Glyphs are first rendered into a grayscale
//! coverage mask just large enough for the text, then the mask is composited
//! onto the image with the watermark colour using source-over blending:
//!
//! `out = src * a + dst * (1 - a)` where `a = color.alpha * coverage`

use ab_glyph::{Font, PxScale, ScaleFont};
use image::{GrayImage, ImageBuffer, Luma, Pixel, Primitive, Rgba};
use imageproc::definitions::Clamp;
use imageproc::drawing::{draw_text_mut, text_size};

/// Glyph coverage for a run of text, placed on a target image.
#[derive(Debug, Clone)]
pub struct TextMask {
    /// Per-pixel coverage, 0 = untouched, 255 = fully covered.
    pub coverage: GrayImage,
    /// Target x of the mask's left column. May be negative.
    pub left: i64,
    /// Target y of the mask's top row. May be negative.
    pub top: i64,
}

/// Render `text` into a mask sized to the text's bounding box.
///
/// `(x, baseline_y)` is the left end of the text baseline in target
/// coordinates. The box is padded on every side so overhanging glyphs are kept.
#[must_use]
pub fn coverage_mask(
    font: &impl Font,
    scale: PxScale,
    text: &str,
    x: i32,
    baseline_y: i32,
) -> TextMask {
    if text.is_empty() {
        return TextMask {
            coverage: GrayImage::new(0, 0),
            left: i64::from(x),
            top: i64::from(baseline_y),
        };
    }

    let scaled = font.as_scaled(scale);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let (ascent, line_height, pad) = (
        scaled.ascent().round() as i32,
        (scaled.ascent() - scaled.descent()).ceil().max(0.0) as u32,
        (scale.y / 4.0).ceil().max(1.0) as u32,
    );
    let (advance, _) = text_size(scale, font, text);

    let mut coverage = GrayImage::new(
        advance.saturating_add(pad.saturating_mul(2)),
        line_height.saturating_add(pad.saturating_mul(2)),
    );
    // imageproc positions text by its top edge, one ascent above the baseline.
    let pad_i = i32::try_from(pad).unwrap_or(i32::MAX);
    draw_text_mut(&mut coverage, Luma([u8::MAX]), pad_i, pad_i, scale, font, text);

    TextMask {
        coverage,
        left: i64::from(x) - i64::from(pad),
        top: i64::from(baseline_y) - i64::from(ascent) - i64::from(pad),
    }
}

/// Width in pixels `text` occupies when laid out at `scale`.
#[must_use]
pub fn text_width(font: &impl Font, scale: PxScale, text: &str) -> u32 {
    text_size(scale, font, text).0
}

/// Blend `color` into `canvas` wherever `mask` has coverage.
///
/// Works on any integer pixel whose first three channels are RGB; the 8-bit
/// colour is rescaled to the channel depth, so 16-bit images stay 16-bit. A
/// fourth channel, when present, is treated as straight (non-premultiplied)
/// alpha. Canvas pixels outside the mask are not touched.
pub fn composite<P>(canvas: &mut ImageBuffer<P, Vec<P::Subpixel>>, mask: &TextMask, color: Rgba<u8>)
where
    P: Pixel,
    P::Subpixel: Into<f32> + Clamp<f32>,
{
    if P::CHANNEL_COUNT < 3 {
        return;
    }

    let max: f32 = <P::Subpixel as Primitive>::DEFAULT_MAX_VALUE.into();
    let src = [
        f32::from(color[0]) / 255.0,
        f32::from(color[1]) / 255.0,
        f32::from(color[2]) / 255.0,
    ];
    let color_alpha = f32::from(color[3]) / 255.0;
    let (width, height) = (i64::from(canvas.width()), i64::from(canvas.height()));

    for (mx, my, cov) in mask.coverage.enumerate_pixels() {
        if cov[0] == 0 {
            continue;
        }
        let (cx, cy) = (mask.left + i64::from(mx), mask.top + i64::from(my));
        if !(0..width).contains(&cx) || !(0..height).contains(&cy) {
            continue;
        }
        let src_alpha = color_alpha * f32::from(cov[0]) / 255.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let px = canvas.get_pixel_mut(cx as u32, cy as u32);
        blend_pixel(px.channels_mut(), src, src_alpha, max);
    }
}

/// Source-over on channels normalised to `[0, 1]` by `max`.
fn blend_pixel<S>(channels: &mut [S], src: [f32; 3], src_alpha: f32, max: f32)
where
    S: Copy + Into<f32> + Clamp<f32>,
{
    let inv = 1.0 - src_alpha;
    let norm = |v: S| v.into() / max;
    let store = |v: f32| <S as Clamp<f32>>::clamp((v * max).round());

    if let Some(&dst) = channels.get(3) {
        let dst_alpha = norm(dst);
        let out_alpha = src_alpha + dst_alpha * inv;
        if out_alpha <= f32::EPSILON {
            return;
        }
        for ch in 0..3 {
            let mixed = (src[ch] * src_alpha + norm(channels[ch]) * dst_alpha * inv) / out_alpha;
            channels[ch] = store(mixed);
        }
        channels[3] = store(out_alpha);
    } else {
        for ch in 0..3 {
            channels[ch] = store(src[ch] * src_alpha + norm(channels[ch]) * inv);
        }
    }
}
