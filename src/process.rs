// based on https://github.com/benface/bgone/blob/b362931f37252301f0f8dec183b2072f415b9b5f/src/lib.rs

use crate::background::{BackgroundSampler, SamplerKind};
use crate::buffer::{decode_image, encode_png, PixelBuffer, CHANNELS};
use crate::color::{to_hex, Color};
use crate::error::Result;
use crate::remove::{clear_background, validate_threshold, DEFAULT_THRESHOLD};

/// Options for a full decode -> remove -> encode run
#[derive(Debug, Clone)]
pub struct RemovalOptions {
  /// Maximum color distance still treated as background
  pub threshold: f64,
  /// Background color to remove. If not specified, it is estimated with `sampler`.
  pub background: Option<Color>,
  /// How the background is estimated when no color is given (default: corners)
  pub sampler: SamplerKind,
  /// Crop the output to the bounding box of non-transparent pixels
  pub trim: bool,
}

impl Default for RemovalOptions {
  fn default() -> Self {
    Self {
      threshold: DEFAULT_THRESHOLD,
      background: None,
      sampler: SamplerKind::default(),
      trim: false,
    }
  }
}

/// Remove the background from an already decoded buffer
///
/// Uses `options.background` when given, otherwise asks `options.sampler` for an estimate.
pub fn process_buffer(buffer: &PixelBuffer, options: &RemovalOptions) -> Result<PixelBuffer> {
  let threshold = validate_threshold(options.threshold)?;
  Ok(process_validated(buffer, options, threshold))
}

/// Decode an encoded image, remove its background and return PNG bytes
pub fn process_image(input: &[u8], options: &RemovalOptions) -> Result<Vec<u8>> {
  // Fail on a bad threshold before spending time on decoding
  let threshold = validate_threshold(options.threshold)?;
  let buffer = decode_image(input)?;
  log::debug!(
    "decoded {}x{} image for background removal",
    buffer.width(),
    buffer.height()
  );
  encode_png(process_validated(&buffer, options, threshold))
}

fn process_validated(
  buffer: &PixelBuffer,
  options: &RemovalOptions,
  threshold: f64,
) -> PixelBuffer {
  let background = match options.background {
    Some(color) => color,
    None => {
      let estimated = options.sampler.sample(buffer);
      log::debug!(
        "estimated background color {} with {:?}",
        to_hex(estimated),
        options.sampler
      );
      estimated
    }
  };

  let (output, _) = clear_background(buffer, background, threshold);

  if options.trim {
    trim_to_content(&output)
  } else {
    output
  }
}

/// Trim an image by cropping to the bounding box of non-transparent pixels.
///
/// Finds the bounding box of all pixels with alpha > 0 and crops the image
/// to that region. If all pixels are transparent, returns a 1x1 transparent image.
pub fn trim_to_content(buffer: &PixelBuffer) -> PixelBuffer {
  let (width, height) = buffer.dimensions();
  let data = buffer.as_raw();

  let mut min_x = width;
  let mut min_y = height;
  let mut max_x = 0u32;
  let mut max_y = 0u32;

  for y in 0..height {
    for x in 0..width {
      if data[buffer.index_of(x, y) + 3] > 0 {
        min_x = min_x.min(x);
        min_y = min_y.min(y);
        max_x = max_x.max(x);
        max_y = max_y.max(y);
      }
    }
  }

  if max_x < min_x || max_y < min_y {
    return transparent_pixel();
  }

  let new_width = max_x - min_x + 1;
  let new_height = max_y - min_y + 1;

  if new_width == width && new_height == height {
    return buffer.clone();
  }

  let row_len = new_width as usize * CHANNELS;
  let mut trimmed = Vec::with_capacity(row_len * new_height as usize);
  for y in min_y..=max_y {
    let start = buffer.index_of(min_x, y);
    trimmed.extend_from_slice(&data[start..start + row_len]);
  }

  PixelBuffer::new(new_width, new_height, trimmed)
    .unwrap_or_else(|_| unreachable!("cropped rows always fill the bounding box"))
}

fn transparent_pixel() -> PixelBuffer {
  PixelBuffer::from_pixel(1, 1, [0, 0, 0, 0])
    .unwrap_or_else(|_| unreachable!("1x1 buffer is always valid"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::background::EdgeSamplingConfig;
  use crate::Error;

  fn framed(width: u32, height: u32, border: [u8; 4], inner: [u8; 4]) -> PixelBuffer {
    let mut data = Vec::new();
    for y in 0..height {
      for x in 0..width {
        let edge = x == 0 || y == 0 || x == width - 1 || y == height - 1;
        data.extend_from_slice(if edge { &border } else { &inner });
      }
    }
    PixelBuffer::new(width, height, data).unwrap()
  }

  #[test]
  fn removes_estimated_background() {
    let input = framed(3, 3, [0, 0, 0, 255], [200, 10, 10, 255]);
    let output = process_buffer(&input, &RemovalOptions::default()).unwrap();

    assert_eq!(output.transparent_count(), 8);
    assert_eq!(output.pixel(1, 1), Some([200, 10, 10, 255]));
  }

  #[test]
  fn explicit_background_overrides_sampler() {
    let input = framed(3, 3, [0, 0, 0, 255], [200, 10, 10, 255]);
    let options = RemovalOptions {
      background: Some([200, 10, 10]),
      ..Default::default()
    };
    let output = process_buffer(&input, &options).unwrap();

    assert_eq!(output.transparent_count(), 1);
    assert_eq!(output.pixel(1, 1), Some([200, 10, 10, 0]));
  }

  #[test]
  fn edge_sampler_is_selectable_from_options() {
    let input = framed(12, 12, [30, 30, 30, 255], [220, 220, 220, 255]);
    let options = RemovalOptions {
      sampler: SamplerKind::EdgeMode(EdgeSamplingConfig::default()),
      ..Default::default()
    };
    let output = process_buffer(&input, &options).unwrap();
    assert_eq!(output.transparent_count(), 12 * 4 - 4);
  }

  #[test]
  fn trims_to_remaining_content() {
    let input = framed(5, 4, [255, 255, 255, 255], [0, 0, 255, 255]);
    let options = RemovalOptions {
      trim: true,
      ..Default::default()
    };
    let output = process_buffer(&input, &options).unwrap();

    assert_eq!(output.dimensions(), (3, 2));
    assert_eq!(output.transparent_count(), 0);
  }

  #[test]
  fn edge_sampler_ignores_a_stray_corner() {
    // Corner average lands between the colors, so nothing matches exactly
    let mut input = framed(12, 12, [30, 30, 30, 255], [220, 220, 220, 255]);
    let i = input.index_of(0, 0);
    input.as_raw_mut()[i..i + 4].copy_from_slice(&[250, 250, 250, 255]);

    let corners = process_buffer(&input, &RemovalOptions::default()).unwrap();
    let edges = process_buffer(
      &input,
      &RemovalOptions {
        sampler: "edges".parse().unwrap(),
        ..Default::default()
      },
    )
    .unwrap();

    assert_eq!(corners.transparent_count(), 0);
    assert_eq!(edges.transparent_count(), 12 * 4 - 5);
  }

  #[test]
  fn trims_around_a_single_interior_pixel() {
    let mut data = [0u8, 0, 0, 0].repeat(5 * 4);
    let i = (2 * 5 + 3) * 4;
    data[i..i + 4].copy_from_slice(&[1, 2, 3, 255]);
    let input = PixelBuffer::new(5, 4, data).unwrap();

    let output = trim_to_content(&input);
    assert_eq!(output.dimensions(), (1, 1));
    assert_eq!(output.pixel(0, 0), Some([1, 2, 3, 255]));
  }

  #[test]
  fn process_buffer_rejects_invalid_threshold() {
    let input = framed(3, 3, [0, 0, 0, 255], [9, 9, 9, 255]);
    let options = RemovalOptions {
      threshold: f64::NAN,
      ..Default::default()
    };
    let err = process_buffer(&input, &options).unwrap_err();
    assert!(matches!(err, Error::InvalidThreshold(_)));
  }

  #[test]
  fn trimming_fully_transparent_yields_single_pixel() {
    let input = PixelBuffer::from_pixel(6, 6, [9, 9, 9, 0]).unwrap();
    let output = trim_to_content(&input);
    assert_eq!(output.dimensions(), (1, 1));
    assert_eq!(output.pixel(0, 0), Some([0, 0, 0, 0]));
  }

  #[test]
  fn trimming_opaque_image_is_identity() {
    let input = framed(4, 4, [1, 1, 1, 255], [2, 2, 2, 255]);
    assert_eq!(trim_to_content(&input), input);
  }

  #[test]
  fn process_image_round_trips_png() {
    let input = framed(4, 3, [10, 200, 10, 255], [90, 0, 90, 255]);
    let png = encode_png(input).unwrap();

    let output = process_image(&png, &RemovalOptions::default()).unwrap();
    let decoded = decode_image(&output).unwrap();

    assert_eq!(decoded.dimensions(), (4, 3));
    assert_eq!(decoded.transparent_count(), 10);
    assert_eq!(decoded.pixel(1, 1), Some([90, 0, 90, 255]));
  }

  #[test]
  fn process_image_validates_threshold_first() {
    let options = RemovalOptions {
      threshold: -1.0,
      ..Default::default()
    };
    let err = process_image(b"garbage", &options).unwrap_err();
    assert!(matches!(err, Error::InvalidThreshold(_)));
  }
}
