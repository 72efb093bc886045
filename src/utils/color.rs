use glam::Vec3;

use crate::errors::{Error, Result};

/// Parses `#rrggbb` (or `rrggbb`) into 0..1 RGB components.
pub fn parse_hex(value: &str) -> Result<Vec3> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return Err(Error::InvalidColor(value.to_string()));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&hex[range], 16).map_err(|_| Error::InvalidColor(value.to_string()))
    };
    let r = channel(0..2)?;
    let g = channel(2..4)?;
    let b = channel(4..6)?;
    Ok(Vec3::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    ))
}

/// Packs `0xRRGGBB` into RGB components.
#[must_use]
pub fn from_rgb_u32(value: u32) -> Vec3 {
    let r = (value >> 16) & 0xff;
    let g = (value >> 8) & 0xff;
    let b = value & 0xff;
    Vec3::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}
