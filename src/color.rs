//! sRGB to CIE L\*a\*b\* conversion and perceptual distance.
//!
//! Matching happens in Lab (D65) with CIEDE2000 as the distance, so that
//! "closest standard color" tracks what a person would pick by eye rather
//! than raw channel differences.

use palette::color_difference::Ciede2000;
use palette::white_point::D65;
use palette::{IntoColor, Lab, Srgb};

/// A color projected into CIE L\*a\*b\* (D65).
///
/// Only obtainable through [`to_perceptual`].
#[derive(Clone, Copy, Debug)]
pub struct LabColor(Lab<D65, f32>);

impl LabColor {
    pub fn l(&self) -> f32 {
        self.0.l
    }

    pub fn a(&self) -> f32 {
        self.0.a
    }

    pub fn b(&self) -> f32 {
        self.0.b
    }
}

impl PartialEq for LabColor {
    fn eq(&self, other: &Self) -> bool {
        self.0.l == other.0.l && self.0.a == other.0.a && self.0.b == other.0.b
    }
}

/// Convert an 8-bit sRGB triple to Lab.
pub fn to_perceptual(rgb: Srgb<u8>) -> LabColor {
    let lab: Lab<D65, f32> = rgb.into_format::<f32>().into_color();
    LabColor(lab)
}

/// CIEDE2000 color difference between two Lab colors.
#[inline]
pub fn perceptual_distance(a: LabColor, b: LabColor) -> f32 {
    a.0.difference(b.0)
}

/// Parse `#RRGGBB` or `RRGGBB` (any case) into an sRGB triple.
pub fn parse_hex(s: &str) -> Option<Srgb<u8>> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Srgb::new(r, g, b))
}

/// Format as uppercase `#RRGGBB`.
pub fn to_hex(rgb: Srgb<u8>) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.red, rgb.green, rgb.blue)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_perceptual_is_deterministic() {
        let c = Srgb::new(37u8, 150, 201);
        let a = to_perceptual(c);
        let b = to_perceptual(c);
        assert_eq!(a.l().to_bits(), b.l().to_bits());
        assert_eq!(a.a().to_bits(), b.a().to_bits());
        assert_eq!(a.b().to_bits(), b.b().to_bits());
    }

    #[test]
    fn test_black_and_white_lightness() {
        let black = to_perceptual(Srgb::new(0, 0, 0));
        let white = to_perceptual(Srgb::new(255, 255, 255));
        assert!(black.l().abs() < 1e-3);
        assert!((white.l() - 100.0).abs() < 0.1);
    }

    #[test]
    fn test_distance_zero_for_identical() {
        let c = to_perceptual(Srgb::new(200, 10, 90));
        assert_eq!(perceptual_distance(c, c), 0.0);
    }

    #[test]
    fn test_distance_symmetric_and_positive() {
        let a = to_perceptual(Srgb::new(250, 244, 200));
        let b = to_perceptual(Srgb::new(12, 80, 160));
        let ab = perceptual_distance(a, b);
        let ba = perceptual_distance(b, a);
        assert!(ab > 0.0);
        assert!((ab - ba).abs() < 1e-4);
    }

    #[test]
    fn test_distance_orders_by_similarity() {
        let red = to_perceptual(Srgb::new(255, 0, 0));
        let dark_red = to_perceptual(Srgb::new(200, 0, 0));
        let blue = to_perceptual(Srgb::new(0, 0, 255));
        assert!(perceptual_distance(red, dark_red) < perceptual_distance(red, blue));
    }

    #[test]
    fn test_parse_hex_forms() {
        assert_eq!(parse_hex("#FAF4C8"), Some(Srgb::new(0xFA, 0xF4, 0xC8)));
        assert_eq!(parse_hex("faf4c8"), Some(Srgb::new(0xFA, 0xF4, 0xC8)));
        assert_eq!(parse_hex("#FFF"), None);
        assert_eq!(parse_hex("#GG0000"), None);
        assert_eq!(parse_hex("+f0000"), None);
        assert_eq!(parse_hex(""), None);
    }

    #[test]
    fn test_to_hex_uppercase() {
        assert_eq!(to_hex(Srgb::new(0xab, 0x0c, 0xff)), "#AB0CFF");
    }
}
