//! Sheet background color parsing

use image::Rgba;

use crate::{Error, Result};

/// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional)
///
/// Six-digit colors get alpha 0, so the default background stays
/// transparent whatever the RGB value.
pub fn parse_background(s: &str) -> Result<Rgba<u8>> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    let invalid = || Error::InvalidColor(s.to_string());

    if !matches!(hex.len(), 6 | 8) || !hex.is_ascii() {
        return Err(invalid());
    }

    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
    let alpha = if hex.len() == 8 { channel(6)? } else { 0 };

    Ok(Rgba([channel(0)?, channel(2)?, channel(4)?, alpha]))
}
