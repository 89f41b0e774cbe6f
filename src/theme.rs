use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Interpret the `SystemUsesLightTheme` registry value.
    pub fn from_light_flag(value: Option<u32>) -> Self {
        match value {
            Some(1) => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);
    pub const WHITE: Color = Color::rgba(255, 255, 255, 255);
    pub const BLACK: Color = Color::rgba(0, 0, 0, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Foreground/background pair used to draw the indicator icons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub foreground: Color,
    pub background: Color,
}

impl Palette {
    pub const fn new(foreground: Color, background: Color) -> Self {
        Self {
            foreground,
            background,
        }
    }
}

pub const DARK_PALETTE: Palette = Palette::new(Color::WHITE, Color::BLACK);
pub const LIGHT_PALETTE: Palette = Palette::new(Color::BLACK, Color::WHITE);

pub fn palette_for(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => DARK_PALETTE,
        Theme::Light => LIGHT_PALETTE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_flag_maps_to_theme() {
        assert_eq!(Theme::from_light_flag(Some(1)), Theme::Light);
        assert_eq!(Theme::from_light_flag(Some(0)), Theme::Dark);
        assert_eq!(Theme::from_light_flag(None), Theme::Dark);
    }

    #[test]
    fn palettes_are_inverted_between_themes() {
        let dark = palette_for(Theme::Dark);
        let light = palette_for(Theme::Light);
        assert_eq!(dark.foreground, light.background);
        assert_eq!(dark.background, light.foreground);
    }
}
