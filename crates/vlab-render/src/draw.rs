//! Rasterize an overlay onto an image.

use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{Pixel, Rgba, RgbaImage};
use imageproc::drawing::{draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;

use vlab_models::PixelBox;

use crate::error::{RenderError, RenderResult};
use crate::overlay::{Overlay, OverlayBox};

/// How labels are placed and styled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    /// Font size in pixels
    pub scale: f32,
    /// Offset of the text baseline from the box's top-left corner
    pub offset: (i32, i32),
    /// Opacity of the label background (box color)
    pub background_alpha: f32,
    /// Padding around the text inside the background
    pub padding: i32,
}

impl Default for LabelStyle {
    fn default() -> Self {
        Self {
            scale: 14.0,
            offset: (6, 18),
            background_alpha: 0.5,
            padding: 2,
        }
    }
}

/// Load a TrueType/OpenType font for labels.
pub fn load_font(path: impl AsRef<Path>) -> RenderResult<FontVec> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    FontVec::try_from_vec(bytes)
        .map_err(|e| RenderError::InvalidFont(format!("{}: {}", path.display(), e)))
}

/// Draw every box, and its label when a font is available.
pub fn draw_overlay(image: &mut RgbaImage, overlay: &Overlay, font: Option<&FontVec>, style: &LabelStyle) {
    for item in &overlay.boxes {
        let Some(rect) = to_rect(item) else {
            continue;
        };
        let [r, g, b] = item.color.0;
        draw_hollow_rect_mut(image, rect, Rgba([r, g, b, 255]));

        if let Some(font) = font {
            if !item.label.is_empty() {
                draw_label(image, item, font, style);
            }
        }
    }
}

fn to_rect(item: &OverlayBox) -> Option<Rect> {
    if !item.rect.is_drawable() {
        return None;
    }
    let left = i32::try_from(item.rect.left).ok()?;
    let top = i32::try_from(item.rect.top).ok()?;
    let width = u32::try_from(item.rect.width).ok()?;
    let height = u32::try_from(item.rect.height).ok()?;
    Some(Rect::at(left, top).of_size(width, height))
}

/// Where a label's text and background go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelLayout {
    /// Top-left corner handed to the text rasterizer
    pub text_origin: (i32, i32),
    /// Background as `(x, y, width, height)`
    pub background: (i32, i32, i32, i32),
}

/// Lay out a label `text` = (width, line height) pixels wide and tall so its
/// baseline, `ascent` below the line top, sits at the style offset from the
/// box's top-left corner.
pub fn label_layout(rect: &PixelBox, text: (u32, u32), ascent: u32, style: &LabelStyle) -> LabelLayout {
    let (text_w, line_h) = (to_i32(text.0 as i64), to_i32(text.1 as i64));
    let x = to_i32(rect.left).saturating_add(style.offset.0);
    let baseline = to_i32(rect.top).saturating_add(style.offset.1);
    let y = baseline.saturating_sub(to_i32(ascent as i64));

    LabelLayout {
        text_origin: (x, y),
        background: (
            x.saturating_sub(style.padding),
            y.saturating_sub(style.padding),
            text_w.saturating_add(2 * style.padding),
            line_h.saturating_add(2 * style.padding),
        ),
    }
}

fn to_i32(value: i64) -> i32 {
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Width, line height and ascent of `label` in whole pixels.
fn measure(font: &FontVec, scale: PxScale, label: &str) -> ((u32, u32), u32) {
    let scaled = font.as_scaled(scale);
    let (width, _) = text_size(scale, font, label);
    let line_height = (scaled.ascent() - scaled.descent()).ceil().max(0.0) as u32;
    let ascent = scaled.ascent().round().max(0.0) as u32;
    ((width, line_height), ascent)
}

fn draw_label(image: &mut RgbaImage, item: &OverlayBox, font: &FontVec, style: &LabelStyle) {
    let scale = PxScale::from(style.scale);
    let (text, ascent) = measure(font, scale, &item.label);
    let layout = label_layout(&item.rect, text, ascent, style);

    let [r, g, b] = item.color.0;
    let alpha = (style.background_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
    let (bg_x, bg_y, bg_w, bg_h) = layout.background;
    blend_rect(image, bg_x, bg_y, bg_w, bg_h, Rgba([r, g, b, alpha]));

    let (x, y) = layout.text_origin;
    draw_text_mut(image, Rgba([0, 0, 0, 255]), x, y, scale, font, &item.label);
}

/// Alpha-blend a filled rectangle, clipped to the image.
fn blend_rect(image: &mut RgbaImage, x: i32, y: i32, width: i32, height: i32, color: Rgba<u8>) {
    let x0 = x.max(0) as u32;
    let y0 = y.max(0) as u32;
    let x1 = (x.saturating_add(width)).clamp(0, image.width() as i32) as u32;
    let y1 = (y.saturating_add(height)).clamp(0, image.height() as i32) as u32;

    for py in y0..y1 {
        for px in x0..x1 {
            image.get_pixel_mut(px, py).blend(&color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn overlay_with(rect: PixelBox) -> Overlay {
        Overlay {
            boxes: vec![OverlayBox {
                id: 0,
                rect,
                label: "Cat-0.9".to_string(),
                color: Rgb([255, 0, 0]),
            }],
        }
    }

    #[test]
    fn test_draws_hollow_rectangle() {
        let mut image = RgbaImage::from_pixel(100, 100, WHITE);
        draw_overlay(
            &mut image,
            &overlay_with(PixelBox::new(10, 10, 40, 40)),
            None,
            &LabelStyle::default(),
        );

        let red = Rgba([255, 0, 0, 255]);
        assert_eq!(*image.get_pixel(10, 10), red);
        assert_eq!(*image.get_pixel(10, 30), red);
        assert_eq!(*image.get_pixel(49, 30), red);
        assert_eq!(*image.get_pixel(30, 49), red);
        // Interior and outside untouched.
        assert_eq!(*image.get_pixel(30, 30), WHITE);
        assert_eq!(*image.get_pixel(60, 60), WHITE);
    }

    #[test]
    fn test_skips_empty_boxes() {
        let mut image = RgbaImage::from_pixel(20, 20, WHITE);
        draw_overlay(
            &mut image,
            &overlay_with(PixelBox::new(5, 5, 0, 10)),
            None,
            &LabelStyle::default(),
        );
        assert!(image.pixels().all(|p| *p == WHITE));
    }

    #[test]
    fn test_box_partially_outside_is_clipped() {
        let mut image = RgbaImage::from_pixel(20, 20, WHITE);
        draw_overlay(
            &mut image,
            &overlay_with(PixelBox::new(-5, -5, 15, 15)),
            None,
            &LabelStyle::default(),
        );
        assert_eq!(*image.get_pixel(9, 0), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_blend_rect_half_alpha() {
        let mut image = RgbaImage::from_pixel(4, 4, WHITE);
        blend_rect(&mut image, 1, 1, 2, 2, Rgba([255, 0, 0, 128]));

        let blended = image.get_pixel(1, 1);
        assert_eq!(blended.0[0], 255);
        assert!(blended.0[1] > 100 && blended.0[1] < 160);
        assert_eq!(*image.get_pixel(0, 0), WHITE);
        assert_eq!(*image.get_pixel(3, 3), WHITE);
    }

    #[test]
    fn test_blend_rect_clips() {
        let mut image = RgbaImage::from_pixel(4, 4, WHITE);
        blend_rect(&mut image, -10, -10, 100, 100, Rgba([0, 0, 0, 255]));
        assert!(image.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_load_font_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        assert!(matches!(load_font(&path), Err(RenderError::InvalidFont(_))));
    }

    fn fixture_font() -> FontVec {
        load_font(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/DejaVuSansMono.ttf")).unwrap()
    }

    #[test]
    fn test_label_layout_puts_baseline_at_offset() {
        let layout = label_layout(&PixelBox::new(10, 20, 50, 50), (40, 14), 11, &LabelStyle::default());

        // Baseline at (left + 6, top + 18), line top one ascent above it.
        assert_eq!(layout.text_origin, (16, 27));
        assert_eq!(layout.background, (14, 25, 44, 18));
    }

    #[test]
    fn test_label_layout_custom_style() {
        let style = LabelStyle {
            offset: (0, 10),
            padding: 0,
            ..LabelStyle::default()
        };
        let layout = label_layout(&PixelBox::new(0, 0, 5, 5), (8, 12), 10, &style);
        assert_eq!(layout.text_origin, (0, 0));
        assert_eq!(layout.background, (0, 0, 8, 12));
    }

    #[test]
    fn test_label_layout_saturates_huge_coordinates() {
        let layout = label_layout(
            &PixelBox::new(i64::MAX, i64::MIN, 1, 1),
            (4, 4),
            3,
            &LabelStyle::default(),
        );
        assert_eq!(layout.text_origin.0, i32::MAX);
        // i32::MIN + 18 - 3 - 2
        assert_eq!(layout.background.1, i32::MIN + 13);
    }

    #[test]
    fn test_draws_label_over_half_transparent_background() {
        let font = fixture_font();
        let style = LabelStyle::default();
        let overlay = overlay_with(PixelBox::new(10, 10, 80, 60));
        let (text, ascent) = measure(&font, PxScale::from(style.scale), &overlay.boxes[0].label);
        let layout = label_layout(&overlay.boxes[0].rect, text, ascent, &style);
        assert_eq!(layout.text_origin.1 + ascent as i32, 10 + 18);

        let mut image = RgbaImage::from_pixel(100, 100, WHITE);
        draw_overlay(&mut image, &overlay, Some(&font), &style);

        let (bg_x, bg_y, bg_w, bg_h) = layout.background;
        assert!(bg_y > 10 && bg_y + bg_h < 70);

        // Padding corner: red at half opacity over white.
        let corner = image.get_pixel(bg_x as u32, bg_y as u32);
        assert_eq!(corner.0[0], 255);
        assert!(corner.0[1] > 100 && corner.0[1] < 160, "got {:?}", corner);
        assert_eq!(corner.0[1], corner.0[2]);

        // Just above the background is the untouched box interior.
        assert_eq!(*image.get_pixel(bg_x as u32, (bg_y - 1) as u32), WHITE);

        // Black text lands inside the background.
        let dark = (bg_y..bg_y + bg_h)
            .flat_map(|y| (bg_x..bg_x + bg_w).map(move |x| (x as u32, y as u32)))
            .filter(|&(x, y)| image.get_pixel(x, y).0[0] < 100)
            .count();
        assert!(dark > 0);
        let outside_dark = image
            .enumerate_pixels()
            .filter(|(x, y, p)| {
                let (x, y) = (*x as i32, *y as i32);
                let inside = x >= bg_x && x < bg_x + bg_w && y >= bg_y && y < bg_y + bg_h;
                !inside && p.0[0] < 100
            })
            .count();
        assert_eq!(outside_dark, 0);
    }

    #[test]
    fn test_empty_label_draws_no_background() {
        let font = fixture_font();
        let mut overlay = overlay_with(PixelBox::new(10, 10, 80, 60));
        overlay.boxes[0].label.clear();

        let mut image = RgbaImage::from_pixel(100, 100, WHITE);
        draw_overlay(&mut image, &overlay, Some(&font), &LabelStyle::default());
        assert_eq!(*image.get_pixel(14, 20), WHITE);
    }
}
