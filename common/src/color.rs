use std::str::FromStr;

use thiserror::Error;

/// An RGBA color with sRGB-encoded channels in `[0, 1]`.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RgbaColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0} characters")]
    Length(usize),
    #[error("invalid hex digits in {0:?}")]
    Digits(String),
}

impl RgbaColor {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const CYAN: Self = Self::rgb(0.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    /// Opaque color from a `0xRRGGBB` literal.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    /// Converts the sRGB-encoded channels to linear light. Alpha is unchanged.
    pub fn to_linear(self) -> Self {
        fn decode(c: f32) -> f32 {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        Self {
            r: decode(self.r),
            g: decode(self.g),
            b: decode(self.b),
            a: self.a,
        }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn scaled(self, intensity: f32) -> Self {
        Self {
            r: self.r * intensity,
            g: self.g * intensity,
            b: self.b * intensity,
            a: self.a,
        }
    }
}

impl FromStr for RgbaColor {
    type Err = ColorParseError;

    /// Accepts `rrggbb`, `#rrggbb` or `0xrrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .trim()
            .trim_start_matches('#')
            .trim_start_matches("0x")
            .trim_start_matches("0X");
        if digits.len() != 6 {
            return Err(ColorParseError::Length(digits.len()));
        }
        u32::from_str_radix(digits, 16)
            .map(Self::from_hex)
            .map_err(|_| ColorParseError::Digits(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_channels() {
        let c = RgbaColor::from_hex(0xff5500);
        assert_eq!(c.r, 1.0);
        assert!((c.g - 85.0 / 255.0).abs() < 1e-6);
        assert_eq!(c.b, 0.0);
        assert_eq!(c.a, 1.0);
    }

    #[test]
    fn test_parse_variants() {
        let expected = RgbaColor::from_hex(0x00ffff);
        assert_eq!("00ffff".parse::<RgbaColor>(), Ok(expected));
        assert_eq!("#00FFFF".parse::<RgbaColor>(), Ok(expected));
        assert_eq!("0x00ffff".parse::<RgbaColor>(), Ok(expected));
        assert_eq!(expected, RgbaColor::CYAN);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("fff".parse::<RgbaColor>(), Err(ColorParseError::Length(3)));
        assert!(matches!(
            "zzzzzz".parse::<RgbaColor>(),
            Err(ColorParseError::Digits(_))
        ));
    }

    #[test]
    fn test_with_alpha_keeps_channels() {
        let c = RgbaColor::CYAN.with_alpha(0.8);
        assert_eq!((c.r, c.g, c.b, c.a), (0.0, 1.0, 1.0, 0.8));
        assert_eq!(c.to_linear().a, 0.8);
    }

    #[test]
    fn test_to_linear_endpoints() {
        assert_eq!(RgbaColor::BLACK.to_linear(), RgbaColor::BLACK);
        let white = RgbaColor::WHITE.to_linear();
        assert!((white.r - 1.0).abs() < 1e-6);

        let mid = RgbaColor::rgb(0.5, 0.5, 0.5).to_linear();
        assert!((mid.r - 0.2140).abs() < 1e-3);
    }
}
