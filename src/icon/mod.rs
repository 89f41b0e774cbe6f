//! Procedural rendering of the numbered tray icons.

pub mod glyphs;

use crate::theme::{Color, Palette};
use glyphs::{Font, GLYPH_SPACING};

/// Smallest edge length of a rendered icon, whatever the platform reports.
pub const MIN_ICON_DIM: u32 = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IconSize {
    pub width: u32,
    pub height: u32,
}

/// Derive the icon size from the platform icon metric. The metric is halved
/// because drawing at full native resolution makes the strokes too thin to
/// read once the shell scales the icon down.
pub fn icon_size(metric_width: i32, metric_height: i32) -> IconSize {
    let halve = |v: i32| ((v.max(0) / 2) as u32).max(MIN_ICON_DIM);
    IconSize {
        width: halve(metric_width),
        height: halve(metric_height),
    }
}

pub fn border_thickness(width: u32) -> u32 {
    (width / 16).max(1)
}

/// Offset that centers `text_dim` inside `icon_dim`, rounding up so the text
/// is never cut by truncation.
pub fn text_offset(icon_dim: u32, text_dim: u32) -> i32 {
    let free = icon_dim as i64 - text_dim as i64;
    (free + 1).div_euclid(2) as i32
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        Some(Color::rgba(
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ))
    }

    pub fn fill(&mut self, color: Color) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color.to_array());
        }
    }

    /// Out of range coordinates are ignored.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let i = ((y as u32 * self.width + x as u32) * 4) as usize;
        self.pixels[i..i + 4].copy_from_slice(&color.to_array());
    }

    fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) {
        for dy in 0..h as i32 {
            for dx in 0..w as i32 {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    /// One pixel wide rectangle outline `inset` pixels from the edges.
    fn stroke_inset_rect(&mut self, inset: u32, color: Color) {
        if inset * 2 >= self.width || inset * 2 >= self.height {
            return;
        }
        let left = inset as i32;
        let top = inset as i32;
        let right = (self.width - 1 - inset) as i32;
        let bottom = (self.height - 1 - inset) as i32;
        for x in left..=right {
            self.set_pixel(x, top, color);
            self.set_pixel(x, bottom, color);
        }
        for y in top..=bottom {
            self.set_pixel(left, y, color);
            self.set_pixel(right, y, color);
        }
    }
}

/// Font and integer scale for `text`. The text has to fit the icon and its
/// height lands as close as possible to two thirds of the icon width.
/// Falls back to the small font at scale 1 when nothing fits.
fn pick_font(size: IconSize, text: &str) -> (Font, u32) {
    let target = size.width * 2 / 3;
    let mut best = (Font::Small, 1);
    let mut best_diff = u32::MAX;
    for font in Font::ALL {
        let (text_w, text_h) = font.text_extent(text);
        if text_w == 0 || text_h == 0 {
            continue;
        }
        let max_scale = (size.width / text_w).min(size.height / text_h);
        for scale in 1..=max_scale {
            let diff = (text_h * scale).abs_diff(target);
            if diff < best_diff {
                best = (font, scale);
                best_diff = diff;
            }
        }
    }
    best
}

fn draw_text(
    bitmap: &mut Bitmap,
    text: &str,
    font: Font,
    origin: (i32, i32),
    scale: u32,
    color: Color,
) {
    let (x, y) = origin;
    let mut pen_x = x;
    for ch in text.chars() {
        let Some(rows) = font.glyph(ch) else {
            continue;
        };
        let mut glyph_w = 0;
        for (row_idx, row) in rows.iter().enumerate() {
            glyph_w = row.len() as u32;
            for (col_idx, bit) in row.bytes().enumerate() {
                if bit != b'1' {
                    continue;
                }
                bitmap.fill_rect(
                    pen_x + (col_idx as u32 * scale) as i32,
                    y + (row_idx as u32 * scale) as i32,
                    scale,
                    scale,
                    color,
                );
            }
        }
        pen_x += ((glyph_w + GLYPH_SPACING) * scale) as i32;
    }
}

/// Render the icon for `digit`.
///
/// The default variant is a transparent square with a border in the
/// foreground color; the active variant is a solid foreground block with the
/// digit drawn in the background color.
pub fn render(digit: u32, palette: Palette, active: bool, size: IconSize) -> Bitmap {
    let mut bitmap = Bitmap::new(size.width, size.height);
    let text_color = if active {
        palette.background
    } else {
        palette.foreground
    };

    if active {
        bitmap.fill(palette.foreground);
    } else {
        // Anti-aliased strokes are illegible at this size, so the border is
        // built from nested single pixel rectangles.
        bitmap.fill(Color::TRANSPARENT);
        for inset in 0..border_thickness(size.width) {
            bitmap.stroke_inset_rect(inset, palette.foreground);
        }
    }

    let text = digit.to_string();
    let (font, scale) = pick_font(size, &text);
    let (text_w, text_h) = font.text_extent(&text);
    let x = text_offset(size.width, text_w * scale);
    let y = text_offset(size.height, text_h * scale);
    draw_text(&mut bitmap, &text, font, (x, y), scale, text_color);

    bitmap
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{palette_for, Theme};

    fn count_color(bitmap: &Bitmap, color: Color) -> usize {
        let mut n = 0;
        for y in 0..bitmap.height() {
            for x in 0..bitmap.width() {
                if bitmap.pixel(x, y) == Some(color) {
                    n += 1;
                }
            }
        }
        n
    }

    #[test]
    fn size_is_halved_and_floored() {
        assert_eq!(icon_size(32, 32), IconSize { width: 16, height: 16 });
        assert_eq!(icon_size(64, 48), IconSize { width: 32, height: 24 });
        assert_eq!(icon_size(8, 0), IconSize { width: 16, height: 16 });
        assert_eq!(icon_size(-4, 20), IconSize { width: 16, height: 16 });
    }

    #[test]
    fn thickness_scales_with_width() {
        assert_eq!(border_thickness(16), 1);
        assert_eq!(border_thickness(31), 1);
        assert_eq!(border_thickness(32), 2);
        assert_eq!(border_thickness(48), 3);
    }

    #[test]
    fn offset_rounds_up() {
        assert_eq!(text_offset(16, 5), 6);
        assert_eq!(text_offset(16, 6), 5);
        assert_eq!(text_offset(16, 16), 0);
        assert_eq!(text_offset(16, 19), -1);
    }

    #[test]
    fn default_icon_has_thick_border_and_clear_interior() {
        let palette = palette_for(Theme::Dark);
        let size = IconSize { width: 32, height: 32 };
        let icon = render(4, palette, false, size);

        for inset in 0..2 {
            assert_eq!(icon.pixel(inset, 16), Some(palette.foreground));
            assert_eq!(icon.pixel(31 - inset, 16), Some(palette.foreground));
            assert_eq!(icon.pixel(16, inset), Some(palette.foreground));
            assert_eq!(icon.pixel(16, 31 - inset), Some(palette.foreground));
        }
        assert_eq!(icon.pixel(2, 2), Some(Color::TRANSPARENT));
        assert_eq!(count_color(&icon, palette.background), 0);
    }

    #[test]
    fn active_icon_draws_digit_in_background_color() {
        let palette = palette_for(Theme::Light);
        let size = IconSize { width: 16, height: 16 };
        let icon = render(1, palette, true, size);

        assert_eq!(icon.pixel(0, 0), Some(palette.foreground));
        assert_eq!(icon.pixel(15, 15), Some(palette.foreground));
        assert!(count_color(&icon, palette.background) > 0);
        assert_eq!(count_color(&icon, Color::TRANSPARENT), 0);
    }

    fn inked_rows(bitmap: &Bitmap, color: Color) -> u32 {
        (0..bitmap.height())
            .filter(|&y| (0..bitmap.width()).any(|x| bitmap.pixel(x, y) == Some(color)))
            .count() as u32
    }

    #[test]
    fn two_digit_text_stays_inside_the_icon() {
        for dim in [16, 20, 24, 32, 48] {
            let size = IconSize { width: dim, height: dim };
            for digit in 1..=99u32 {
                let text = digit.to_string();
                let (font, scale) = pick_font(size, &text);
                let (w, h) = font.text_extent(&text);
                assert!(w * scale <= dim && h * scale <= dim, "{digit} at {dim}px");
            }
        }
    }

    #[test]
    fn glyph_height_tracks_two_thirds_of_the_width() {
        let palette = palette_for(Theme::Dark);
        for (dim, expected) in [(16, 11), (20, 14), (24, 14)] {
            let size = IconSize { width: dim, height: dim };
            let icon = render(8, palette, true, size);
            let inked = inked_rows(&icon, palette.background);
            assert_eq!(inked, expected, "digit height at {dim}px");
            assert!(inked.abs_diff(dim * 2 / 3) <= 2);
        }
    }

    #[test]
    fn small_icons_use_the_bold_font() {
        let size = IconSize { width: 16, height: 16 };
        assert_eq!(pick_font(size, "4"), (Font::Large, 1));
        assert_eq!(pick_font(size, "99"), (Font::Large, 1));
    }
}
