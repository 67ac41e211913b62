use crate::buffer::{PixelBuffer, CHANNELS};
use crate::color::{color_distance, rgb_of, Color};
use crate::error::{Error, Result};
use rayon::prelude::*;

/// Default color distance under which a pixel counts as background
pub const DEFAULT_THRESHOLD: f64 = 20.0;

/// Outcome of a removal pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemovalStats {
  /// Pixels whose alpha was zeroed
  pub removed: usize,
  /// Pixels in the image
  pub total: usize,
}

/// Check that a threshold is finite and non-negative
pub fn validate_threshold(threshold: f64) -> Result<f64> {
  if threshold.is_finite() && threshold >= 0.0 {
    Ok(threshold)
  } else {
    Err(Error::InvalidThreshold(threshold))
  }
}

/// Whether a color belongs to the background
///
/// Exact matches are always background; anything else must be strictly closer
/// than `threshold`, so a pixel sitting exactly on the threshold is kept.
#[inline]
pub fn is_background(color: Color, background: Color, threshold: f64) -> bool {
  let distance = color_distance(color, background);
  distance == 0.0 || distance < threshold
}

/// Make every pixel close to `background` fully transparent
///
/// Returns a new buffer of the same size. Matching pixels keep their RGB values
/// with alpha set to 0; every other pixel is copied unchanged, including its
/// alpha. The input is never modified.
pub fn remove_background(
  buffer: &PixelBuffer,
  background: Color,
  threshold: f64,
) -> Result<PixelBuffer> {
  remove_background_with_stats(buffer, background, threshold).map(|(out, _)| out)
}

/// Same as [`remove_background`], also reporting how many pixels were cleared
pub fn remove_background_with_stats(
  buffer: &PixelBuffer,
  background: Color,
  threshold: f64,
) -> Result<(PixelBuffer, RemovalStats)> {
  let threshold = validate_threshold(threshold)?;
  Ok(clear_background(buffer, background, threshold))
}

/// Removal pass for a threshold that has already been validated
pub(crate) fn clear_background(
  buffer: &PixelBuffer,
  background: Color,
  threshold: f64,
) -> (PixelBuffer, RemovalStats) {
  let row_len = buffer.width() as usize * CHANNELS;
  let mut output = buffer.clone();

  let removed: usize = output
    .as_raw_mut()
    .par_chunks_mut(row_len)
    .map(|row| {
      let mut cleared = 0;
      for pixel in row.chunks_exact_mut(CHANNELS) {
        if is_background(rgb_of(pixel), background, threshold) {
          pixel[3] = 0;
          cleared += 1;
        }
      }
      cleared
    })
    .sum();

  let stats = RemovalStats {
    removed,
    total: buffer.pixel_count(),
  };

  log::debug!(
    "removed {}/{} pixels within {} of background {:?}",
    stats.removed,
    stats.total,
    threshold,
    background
  );

  (output, stats)
}
