// based on https://github.com/benface/bgone/blob/b362931f37252301f0f8dec183b2072f415b9b5f/src/background.rs

use crate::buffer::PixelBuffer;
use crate::color::Color;
use crate::error::Error;
use std::cmp::Reverse;
use std::collections::HashMap;
use std::str::FromStr;

/// Strategy for estimating the background color of an image.
pub trait BackgroundSampler {
  fn sample(&self, buffer: &PixelBuffer) -> Color;
}

/// Averages the four corner pixels. This is the default estimator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CornerSampler;

impl BackgroundSampler for CornerSampler {
  fn sample(&self, buffer: &PixelBuffer) -> Color {
    estimate_background_color(buffer)
  }
}

/// Configuration for edge-mode background detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeSamplingConfig {
  /// Sample every N pixels on edges
  pub edge_sample_interval: u32,
}

impl Default for EdgeSamplingConfig {
  fn default() -> Self {
    Self {
      edge_sample_interval: 10,
    }
  }
}

/// Picks the most common color among the corners and regularly spaced edge pixels.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeModeSampler {
  pub config: EdgeSamplingConfig,
}

impl EdgeModeSampler {
  pub fn new(config: EdgeSamplingConfig) -> Self {
    Self { config }
  }
}

impl BackgroundSampler for EdgeModeSampler {
  fn sample(&self, buffer: &PixelBuffer) -> Color {
    detect_edge_mode_color(buffer, &self.config)
  }
}

/// Sampler selected by name, as carried in [`crate::RemovalOptions`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SamplerKind {
  #[default]
  Corners,
  EdgeMode(EdgeSamplingConfig),
}

impl BackgroundSampler for SamplerKind {
  fn sample(&self, buffer: &PixelBuffer) -> Color {
    match self {
      SamplerKind::Corners => CornerSampler.sample(buffer),
      SamplerKind::EdgeMode(config) => EdgeModeSampler::new(*config).sample(buffer),
    }
  }
}

impl FromStr for SamplerKind {
  type Err = Error;

  /// Accepts "corners" or "edges"
  fn from_str(name: &str) -> Result<Self, Self::Err> {
    match name.trim().to_ascii_lowercase().as_str() {
      "corners" => Ok(SamplerKind::Corners),
      "edges" => Ok(SamplerKind::EdgeMode(EdgeSamplingConfig::default())),
      other => Err(Error::InvalidSampler(other.to_string())),
    }
  }
}

/// Estimate the background color by averaging the four corner pixels
///
/// Each channel is averaged independently and rounded to the nearest integer,
/// with exact halves rounding up. Alpha is ignored. For a 1x1 image all four
/// corners are the same pixel.
pub fn estimate_background_color(buffer: &PixelBuffer) -> Color {
  let data = buffer.as_raw();
  let mut sums = [0u32; 3];

  for (x, y) in buffer.corners() {
    let i = buffer.index_of(x, y);
    for (sum, &channel) in sums.iter_mut().zip(&data[i..i + 3]) {
      *sum += channel as u32;
    }
  }

  // (sum + 2) / 4 is round-half-up for a four-sample mean
  sums.map(|sum| ((sum + 2) / 4) as u8)
}

/// Detect the background color by sampling image edges and corners
///
/// # Returns
/// The most common RGB color found at image edges and corners. Ties go to the
/// numerically smallest color so the result is deterministic.
pub fn detect_edge_mode_color(buffer: &PixelBuffer, config: &EdgeSamplingConfig) -> Color {
  let (width, height) = buffer.dimensions();
  let step = config.edge_sample_interval.max(1) as usize;

  let mut sample_points: Vec<(u32, u32)> = buffer.corners().to_vec();

  for x in (0..width).step_by(step) {
    sample_points.push((x, 0));
    sample_points.push((x, height - 1));
  }

  for y in (0..height).step_by(step) {
    sample_points.push((0, y));
    sample_points.push((width - 1, y));
  }

  let data = buffer.as_raw();
  let mut color_counts: HashMap<Color, u32> = HashMap::new();

  // Translucent pixels are composited over black to get the effective color
  for (x, y) in sample_points {
    let i = buffer.index_of(x, y);
    let pixel = &data[i..i + 4];
    let alpha = pixel[3] as f64 / 255.0;

    let color = if pixel[3] < 255 {
      [
        (pixel[0] as f64 * alpha).round() as u8,
        (pixel[1] as f64 * alpha).round() as u8,
        (pixel[2] as f64 * alpha).round() as u8,
      ]
    } else {
      [pixel[0], pixel[1], pixel[2]]
    };

    *color_counts.entry(color).or_insert(0) += 1;
  }

  color_counts
    .into_iter()
    .max_by_key(|&(color, count)| (count, Reverse(color)))
    .map(|(color, _)| color)
    .unwrap_or([0, 0, 0])
}
