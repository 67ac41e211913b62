use crate::color::{rgb_of, Color};
use crate::error::{Error, Result};
use image::{ImageBuffer, Rgba, RgbaImage};
use std::io::Cursor;

/// Number of channels per pixel (R, G, B, A)
pub const CHANNELS: usize = 4;

/// Row-major RGBA pixel data with 8 bits per channel.
///
/// Dimensions are fixed at construction and always describe `data` exactly,
/// so pixel lookups inside the buffer can never go out of range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
  width: u32,
  height: u32,
  data: Vec<u8>,
}

impl PixelBuffer {
  /// Wrap a channel sequence, checking `data.len() == width * height * 4`.
  ///
  /// Empty images are rejected as well, since there is no corner to sample.
  pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
    let expected = (width as usize)
      .checked_mul(height as usize)
      .and_then(|n| n.checked_mul(CHANNELS));

    match expected {
      Some(len) if len == data.len() && len > 0 => Ok(Self {
        width,
        height,
        data,
      }),
      _ => Err(Error::InvalidDimensions {
        width,
        height,
        len: data.len(),
      }),
    }
  }

  /// Build a buffer filled with a single RGBA value
  pub fn from_pixel(width: u32, height: u32, pixel: [u8; 4]) -> Result<Self> {
    // Size the allocation only after the byte length is known to fit
    let count = (width as usize)
      .checked_mul(height as usize)
      .filter(|n| n.checked_mul(CHANNELS).is_some())
      .ok_or(Error::InvalidDimensions {
        width,
        height,
        len: 0,
      })?;
    Self::new(width, height, pixel.repeat(count))
  }

  pub fn from_rgba_image(img: RgbaImage) -> Result<Self> {
    let (width, height) = img.dimensions();
    Self::new(width, height, img.into_raw())
  }

  pub fn into_rgba_image(self) -> RgbaImage {
    // Length was validated in `new`, so the conversion cannot fail
    ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(self.width, self.height, self.data)
      .unwrap_or_else(|| unreachable!("pixel buffer length out of sync with dimensions"))
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  pub fn dimensions(&self) -> (u32, u32) {
    (self.width, self.height)
  }

  pub fn as_raw(&self) -> &[u8] {
    &self.data
  }

  /// Mutable channel access; the length stays tied to the dimensions
  pub(crate) fn as_raw_mut(&mut self) -> &mut [u8] {
    &mut self.data
  }

  pub fn into_raw(self) -> Vec<u8> {
    self.data
  }

  pub fn pixel_count(&self) -> usize {
    self.data.len() / CHANNELS
  }

  /// Byte offset of the pixel at (x, y)
  #[inline]
  pub fn index_of(&self, x: u32, y: u32) -> usize {
    (y as usize * self.width as usize + x as usize) * CHANNELS
  }

  /// RGBA value at (x, y); `None` outside the image
  pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
    if x >= self.width || y >= self.height {
      return None;
    }
    let i = self.index_of(x, y);
    Some([
      self.data[i],
      self.data[i + 1],
      self.data[i + 2],
      self.data[i + 3],
    ])
  }

  /// RGB value at (x, y); `None` outside the image
  pub fn color_at(&self, x: u32, y: u32) -> Option<Color> {
    self.pixel(x, y).map(|p| rgb_of(&p))
  }

  /// The four corner coordinates: top-left, top-right, bottom-left, bottom-right
  pub fn corners(&self) -> [(u32, u32); 4] {
    let (right, bottom) = (self.width - 1, self.height - 1);
    [(0, 0), (right, 0), (0, bottom), (right, bottom)]
  }

  /// Number of pixels with alpha == 0
  pub fn transparent_count(&self) -> usize {
    self
      .data
      .chunks_exact(CHANNELS)
      .filter(|p| p[3] == 0)
      .count()
  }
}

/// Decode an encoded image (PNG, JPEG, ...) into an RGBA pixel buffer
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer> {
  let img = image::load_from_memory(bytes).map_err(Error::Decode)?;
  PixelBuffer::from_rgba_image(img.to_rgba8())
}

/// Encode a pixel buffer as PNG
pub fn encode_png(buffer: PixelBuffer) -> Result<Vec<u8>> {
  let mut out = Cursor::new(Vec::new());
  buffer
    .into_rgba_image()
    .write_to(&mut out, image::ImageFormat::Png)
    .map_err(Error::Encode)?;
  Ok(out.into_inner())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn rejects_mismatched_length() {
    let err = PixelBuffer::new(2, 2, vec![0; 15]).unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidDimensions {
        width: 2,
        height: 2,
        len: 15
      }
    ));
    assert!(PixelBuffer::new(2, 2, vec![0; 17]).is_err());
  }

  #[test]
  fn rejects_empty_images() {
    assert!(PixelBuffer::new(0, 5, vec![]).is_err());
    assert!(PixelBuffer::new(5, 0, vec![]).is_err());
  }

  #[test]
  fn fill_rejects_sizes_that_overflow() {
    let err = PixelBuffer::from_pixel(u32::MAX, u32::MAX, [0, 0, 0, 0]).unwrap_err();
    assert!(matches!(
      err,
      Error::InvalidDimensions {
        width: u32::MAX,
        height: u32::MAX,
        ..
      }
    ));
    assert!(PixelBuffer::from_pixel(0, 3, [1, 2, 3, 4]).is_err());
    assert_eq!(
      PixelBuffer::from_pixel(2, 1, [1, 2, 3, 4]).unwrap().as_raw(),
      &[1, 2, 3, 4, 1, 2, 3, 4]
    );
  }

  #[test]
  fn reads_row_major_pixels() {
    let data: Vec<u8> = (0..24).collect();
    let buffer = PixelBuffer::new(3, 2, data).unwrap();

    assert_eq!(buffer.index_of(1, 1), 16);
    assert_eq!(buffer.pixel(0, 0), Some([0, 1, 2, 3]));
    assert_eq!(buffer.pixel(2, 0), Some([8, 9, 10, 11]));
    assert_eq!(buffer.color_at(1, 1), Some([16, 17, 18]));
    assert_eq!(buffer.pixel(3, 0), None);
    assert_eq!(buffer.pixel(0, 2), None);
    assert_eq!(buffer.corners(), [(0, 0), (2, 0), (0, 1), (2, 1)]);
  }

  #[test]
  fn png_encoding_preserves_pixels() {
    let buffer = PixelBuffer::new(2, 1, vec![10, 20, 30, 255, 40, 50, 60, 0]).unwrap();
    let png = encode_png(buffer.clone()).unwrap();
    let decoded = decode_image(&png).unwrap();
    assert_eq!(decoded, buffer);
  }

  #[test]
  fn decode_rejects_garbage() {
    let err = decode_image(b"not an image").unwrap_err();
    assert!(matches!(err, Error::Decode(_)));
  }
}
