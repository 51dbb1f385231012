//! RGBA colors for glows, bolts, paylines and highlight frames.
//! Configs carry them as CSS-style hex strings (`"#ffd700"`, `"#ffd70080"`).

use serde::{Deserialize, Serialize};

/// Linear RGBA color, components in 0.0 - 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a color from RGBA components (0.0 - 1.0).
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a fully opaque color from RGB components.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create a color from RGBA u8 values (0-255).
    pub fn rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let mut c = hex.chars().map(|ch| ch.to_digit(16).map(|d| (d * 17) as u8));
                Some(Self::rgba8(c.next()??, c.next()??, c.next()??, 255))
            }
            6 => Some(Self::rgba8(byte(&hex[0..2])?, byte(&hex[2..4])?, byte(&hex[4..6])?, 255)),
            8 => Some(Self::rgba8(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbbaa`.
    pub fn to_hex(self) -> String {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}{:02x}", q(self.r), q(self.g), q(self.b), q(self.a))
    }

    /// Same color with alpha replaced.
    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Same color with alpha multiplied by `factor`.
    pub fn fade(self, factor: f32) -> Self {
        Self { a: self.a * factor.clamp(0.0, 1.0), ..self }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const GOLD: Self = Self::rgb(1.0, 0.843, 0.0);
    pub const ELECTRIC_BLUE: Self = Self::rgb(0.49, 0.976, 1.0);
    pub const MAGENTA: Self = Self::rgb(1.0, 0.0, 1.0);
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Color::from_hex(&value).ok_or_else(|| format!("invalid hex color `{}`", value))
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_hex()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_six_digit_hex() {
        let c = Color::from_hex("#ffd700").unwrap();
        assert_eq!(c.r, 1.0);
        assert!((c.g - 0.843).abs() < 0.01);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn parses_short_and_alpha_forms() {
        assert_eq!(Color::from_hex("fff"), Some(Color::WHITE));
        let c = Color::from_hex("#00000080").unwrap();
        assert!((c.a - 0.502).abs() < 0.01);
    }

    #[test]
    fn rejects_garbage() {
        assert!(Color::from_hex("#12").is_none());
        assert!(Color::from_hex("#gggggg").is_none());
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c: Color = serde_json::from_str("\"#ff0000\"").unwrap();
        assert_eq!(c, Color::rgb(1.0, 0.0, 0.0));
        assert_eq!(serde_json::to_string(&c).unwrap(), "\"#ff0000ff\"");
        assert!(serde_json::from_str::<Color>("\"nope\"").is_err());
    }

    #[test]
    fn fade_scales_alpha_only() {
        let c = Color::GOLD.fade(0.5);
        assert_eq!(c.r, Color::GOLD.r);
        assert_eq!(c.a, 0.5);
    }
}
