//! Bi-level pixel fonts for the indicator digits.
//!
//! Glyphs are drawn with integer scaling only, so every pixel is either fully
//! on or fully off at any icon size. Two cuts are available: a thin 5x7 face
//! and a bold 7x11 face that fills small icons better.

/// Gap between two glyphs, in font pixels.
pub const GLYPH_SPACING: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Small,
    Large,
}

impl Font {
    pub const ALL: [Font; 2] = [Font::Small, Font::Large];

    pub fn height(self) -> u32 {
        match self {
            Font::Small => 7,
            Font::Large => 11,
        }
    }

    pub fn glyph(self, digit: char) -> Option<&'static [&'static str]> {
        match self {
            Font::Small => small_glyph(digit),
            Font::Large => large_glyph(digit),
        }
    }

    pub fn glyph_width(self, digit: char) -> u32 {
        self.glyph(digit)
            .and_then(|rows| rows.first())
            .map(|row| row.len() as u32)
            .unwrap_or(0)
    }

    /// Unscaled extent of `text` in font pixels.
    pub fn text_extent(self, text: &str) -> (u32, u32) {
        let mut width = 0;
        let mut glyphs = 0;
        for ch in text.chars() {
            let w = self.glyph_width(ch);
            if w == 0 {
                continue;
            }
            width += w;
            glyphs += 1;
        }
        if glyphs == 0 {
            return (0, 0);
        }
        (width + GLYPH_SPACING * (glyphs - 1), self.height())
    }
}

fn small_glyph(digit: char) -> Option<&'static [&'static str]> {
    let rows: &'static [&'static str] = match digit {
        '0' => &[
            "01110", "10001", "10011", "10101", "11001", "10001", "01110",
        ],
        '1' => &["010", "110", "010", "010", "010", "010", "111"],
        '2' => &[
            "01110", "10001", "00001", "00010", "00100", "01000", "11111",
        ],
        '3' => &[
            "11111", "00010", "00100", "00010", "00001", "10001", "01110",
        ],
        '4' => &[
            "00010", "00110", "01010", "10010", "11111", "00010", "00010",
        ],
        '5' => &[
            "11111", "10000", "11110", "00001", "00001", "10001", "01110",
        ],
        '6' => &[
            "00110", "01000", "10000", "11110", "10001", "10001", "01110",
        ],
        '7' => &[
            "11111", "00001", "00010", "00100", "01000", "01000", "01000",
        ],
        '8' => &[
            "01110", "10001", "10001", "01110", "10001", "10001", "01110",
        ],
        '9' => &[
            "01110", "10001", "10001", "01111", "00001", "00010", "01100",
        ],
        _ => return None,
    };
    Some(rows)
}

fn large_glyph(digit: char) -> Option<&'static [&'static str]> {
    let rows: &'static [&'static str] = match digit {
        '0' => &[
            "0111110", "1111111", "1100011", "1100011", "1100011", "1100011", "1100011",
            "1100011", "1100011", "1111111", "0111110",
        ],
        '1' => &[
            "0011", "0111", "1111", "0011", "0011", "0011", "0011", "0011", "0011", "0011",
            "0011",
        ],
        '2' => &[
            "0111110", "1111111", "1100011", "0000011", "0000111", "0001110", "0011100",
            "0111000", "1110000", "1111111", "1111111",
        ],
        '3' => &[
            "1111110", "1111111", "0000011", "0000011", "0011110", "0011111", "0000011",
            "0000011", "0000011", "1111111", "1111110",
        ],
        '4' => &[
            "1100011", "1100011", "1100011", "1100011", "1100011", "1111111", "1111111",
            "0000011", "0000011", "0000011", "0000011",
        ],
        '5' => &[
            "1111111", "1111111", "1100000", "1100000", "1111110", "1111111", "0000011",
            "0000011", "0000011", "1111111", "1111110",
        ],
        '6' => &[
            "0111110", "1111111", "1100000", "1100000", "1111110", "1111111", "1100011",
            "1100011", "1100011", "1111111", "0111110",
        ],
        '7' => &[
            "1111111", "1111111", "0000011", "0000110", "0000110", "0001100", "0001100",
            "0011000", "0011000", "0011000", "0011000",
        ],
        '8' => &[
            "0111110", "1111111", "1100011", "1100011", "1111111", "1111111", "1100011",
            "1100011", "1100011", "1111111", "0111110",
        ],
        '9' => &[
            "0111110", "1111111", "1100011", "1100011", "1100011", "1111111", "0111111",
            "0000011", "0000011", "1111111", "0111110",
        ],
        _ => return None,
    };
    Some(rows)
}
