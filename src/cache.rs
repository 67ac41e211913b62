use crate::background::estimate_background_color;
use crate::buffer::{decode_image, PixelBuffer};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::remove::remove_background;

/// Keeps the decoded source image so threshold changes do not re-decode it.
///
/// Loading a new image invalidates everything; rendering with a different
/// threshold reuses both the pixels and the estimated background.
#[derive(Debug, Default)]
pub struct SourceCache {
  source: Option<PixelBuffer>,
  background: Option<Color>,
}

impl SourceCache {
  pub fn new() -> Self {
    Self::default()
  }

  /// Replace the cached source with an already decoded buffer
  pub fn load(&mut self, buffer: PixelBuffer) {
    log::trace!(
      "caching new {}x{} source image",
      buffer.width(),
      buffer.height()
    );
    self.source = Some(buffer);
    self.background = None;
  }

  /// Decode encoded image bytes and cache the result.
  ///
  /// On decode failure the previous source is left untouched.
  pub fn load_encoded(&mut self, bytes: &[u8]) -> Result<()> {
    let buffer = decode_image(bytes)?;
    self.load(buffer);
    Ok(())
  }

  pub fn clear(&mut self) {
    self.source = None;
    self.background = None;
  }

  pub fn source(&self) -> Option<&PixelBuffer> {
    self.source.as_ref()
  }

  /// Estimated background of the cached source, computed once per load
  pub fn background(&mut self) -> Result<Color> {
    let source = self.source.as_ref().ok_or(Error::NoSource)?;
    match self.background {
      Some(color) => {
        log::trace!("background cache hit");
        Ok(color)
      }
      None => {
        log::trace!("background cache miss");
        let color = estimate_background_color(source);
        self.background = Some(color);
        Ok(color)
      }
    }
  }

  /// Remove the background from the cached source with the given threshold
  pub fn render(&mut self, threshold: f64) -> Result<PixelBuffer> {
    let background = self.background()?;
    let source = self.source.as_ref().ok_or(Error::NoSource)?;
    remove_background(source, background, threshold)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::buffer::encode_png;

  fn gradient() -> PixelBuffer {
    // Corners are all (0, 0, 0); the rest steps away from black
    let data = [
      [0u8, 0, 0, 255],
      [10, 0, 0, 255],
      [0, 0, 0, 255],
      [0, 0, 30, 255],
      [50, 0, 0, 255],
      [0, 0, 70, 255],
      [0, 0, 0, 255],
      [0, 90, 0, 255],
      [0, 0, 0, 255],
    ]
    .concat();
    PixelBuffer::new(3, 3, data).unwrap()
  }

  #[test]
  fn render_without_source_fails() {
    let mut cache = SourceCache::new();
    assert!(matches!(cache.render(20.0), Err(Error::NoSource)));
    assert!(matches!(cache.background(), Err(Error::NoSource)));
  }

  #[test]
  fn rerenders_from_the_same_source() {
    let mut cache = SourceCache::new();
    cache.load(gradient());

    assert_eq!(cache.render(5.0).unwrap().transparent_count(), 4);
    assert_eq!(cache.render(40.0).unwrap().transparent_count(), 6);
    assert_eq!(cache.render(5.0).unwrap().transparent_count(), 4);
    assert_eq!(cache.source(), Some(&gradient()));
  }

  #[test]
  fn loading_invalidates_background() {
    let mut cache = SourceCache::new();
    cache.load(gradient());
    assert_eq!(cache.background().unwrap(), [0, 0, 0]);

    cache.load(PixelBuffer::from_pixel(2, 2, [9, 8, 7, 255]).unwrap());
    assert_eq!(cache.background().unwrap(), [9, 8, 7]);

    cache.clear();
    assert!(cache.source().is_none());
  }

  #[test]
  fn failed_decode_keeps_previous_source() {
    let mut cache = SourceCache::new();
    cache
      .load_encoded(&encode_png(gradient()).unwrap())
      .unwrap();

    assert!(cache.load_encoded(b"nope").is_err());
    assert_eq!(cache.source(), Some(&gradient()));
  }
}
