//! Hex color parsing

use crate::error::{Error, Result};

/// An RGB color parsed from a `#RRGGBB` string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorRgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl ColorRgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0)
    }
}

/// Parse a hex color string into RGB components
///
/// Accepts exactly six hex digits, with or without a leading `#`.
/// Alpha is not part of the color; it comes from the opacity settings.
///
/// ```
/// use pdf_watermark::color::{parse_hex_color, ColorRgb};
///
/// assert_eq!(parse_hex_color("#FF8000").unwrap(), ColorRgb::new(255, 128, 0));
/// assert!(parse_hex_color("#FFF").is_err());
/// ```
pub fn parse_hex_color(input: &str) -> Result<ColorRgb> {
    let hex = input.strip_prefix('#').unwrap_or(input);

    if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidColorFormat(input.to_string()));
    }

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| Error::InvalidColorFormat(input.to_string()))
    };

    Ok(ColorRgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_and_without_hash() {
        assert_eq!(parse_hex_color("#FF8000").unwrap(), ColorRgb::new(255, 128, 0));
        assert_eq!(parse_hex_color("FF8000").unwrap(), ColorRgb::new(255, 128, 0));
        assert_eq!(parse_hex_color("#000000").unwrap(), ColorRgb::black());
        assert_eq!(parse_hex_color("#ffffff").unwrap(), ColorRgb::new(255, 255, 255));
        assert_eq!(parse_hex_color("1a2B3c").unwrap(), ColorRgb::new(0x1a, 0x2b, 0x3c));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "#", "#FFF", "#FF800", "#FF80000", "#GG0000", "FF 800", "##FF8000", "#+F8000"] {
            let result = parse_hex_color(bad);
            assert!(
                matches!(result, Err(Error::InvalidColorFormat(ref s)) if s == bad),
                "expected InvalidColorFormat for {:?}, got {:?}",
                bad,
                result
            );
        }
    }

    #[test]
    fn test_parse_rejects_multibyte_input() {
        // six bytes, but not six hex digits
        assert!(parse_hex_color("ééé").is_err());
    }
}
