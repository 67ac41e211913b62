// based on https://github.com/benface/bgone/blob/b362931f37252301f0f8dec183b2072f415b9b5f/src/color.rs

use anyhow::{Context, Result};

/// Multiplier to expand hex color shorthand (e.g., F -> FF)
const HEX_SHORTHAND_MULTIPLIER: u8 = 17;

/// RGB color represented as [R, G, B] with values 0-255
pub type Color = [u8; 3];

/// Largest possible distance between two colors, `sqrt(3 * 255^2)`
pub const MAX_COLOR_DISTANCE: f64 = 441.672_955_930_063_7;

/// Parse a hex color string into RGB
/// Supports: "#ff0000", "ff0000", "#f00", "f00"
pub fn parse_hex_color(hex: &str) -> Result<Color> {
  let hex = hex.trim().trim_start_matches('#');

  if !hex.is_ascii() {
    anyhow::bail!("Hex color must be ASCII (got: {})", hex);
  }

  let (r, g, b) = match hex.len() {
    3 => {
      // Expand shorthand: "f00" -> "ff0000"
      let r = u8::from_str_radix(&hex[0..1], 16).context("Invalid red component")?;
      let g = u8::from_str_radix(&hex[1..2], 16).context("Invalid green component")?;
      let b = u8::from_str_radix(&hex[2..3], 16).context("Invalid blue component")?;
      (
        r * HEX_SHORTHAND_MULTIPLIER,
        g * HEX_SHORTHAND_MULTIPLIER,
        b * HEX_SHORTHAND_MULTIPLIER,
      )
    }
    6 => {
      let r = u8::from_str_radix(&hex[0..2], 16).context("Invalid red component")?;
      let g = u8::from_str_radix(&hex[2..4], 16).context("Invalid green component")?;
      let b = u8::from_str_radix(&hex[4..6], 16).context("Invalid blue component")?;
      (r, g, b)
    }
    _ => anyhow::bail!("Hex color must be 3 or 6 characters long (got: {})", hex),
  };

  Ok([r, g, b])
}

/// Parse a hex color, reporting failures as [`crate::Error::InvalidColor`]
pub fn parse_color(hex: &str) -> crate::Result<Color> {
  parse_hex_color(hex).map_err(|e| crate::Error::InvalidColor(format!("{:#}", e)))
}

/// Format a color as a lowercase `#rrggbb` string
pub fn to_hex(color: Color) -> String {
  format!("#{:02x}{:02x}{:02x}", color[0], color[1], color[2])
}

/// Squared Euclidean distance between two colors in RGB space
#[inline]
pub fn distance_squared(a: Color, b: Color) -> u32 {
  a.iter()
    .zip(b.iter())
    .map(|(&x, &y)| {
      let d = x as i32 - y as i32;
      (d * d) as u32
    })
    .sum()
}

/// Euclidean distance between two colors in RGB space
#[inline]
pub fn color_distance(a: Color, b: Color) -> f64 {
  (distance_squared(a, b) as f64).sqrt()
}

/// RGB part of an RGBA channel slice
#[inline]
pub fn rgb_of(pixel: &[u8]) -> Color {
  [pixel[0], pixel[1], pixel[2]]
}
