/// Errors reported by the background removal core and its pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
  /// The declared dimensions do not describe the channel sequence.
  #[error("invalid dimensions: {width}x{height} does not match {len} channel bytes")]
  InvalidDimensions { width: u32, height: u32, len: usize },

  /// Threshold is negative, NaN or infinite.
  #[error("invalid threshold: {0} (must be a finite number >= 0)")]
  InvalidThreshold(f64),

  #[error("invalid color: {0}")]
  InvalidColor(String),

  #[error("unknown background sampler: {0} (expected \"corners\" or \"edges\")")]
  InvalidSampler(String),

  #[error("failed to decode image: {0}")]
  Decode(#[source] image::ImageError),

  #[error("failed to encode image: {0}")]
  Encode(#[source] image::ImageError),

  /// A cached render was requested before any source image was loaded.
  #[error("no source image loaded")]
  NoSource,
}

impl Error {
  /// Whether the error was caused by a bad argument rather than a failed operation
  pub fn is_invalid_argument(&self) -> bool {
    matches!(
      self,
      Error::InvalidDimensions { .. }
        | Error::InvalidThreshold(_)
        | Error::InvalidColor(_)
        | Error::InvalidSampler(_)
        | Error::Decode(_)
    )
  }
}

pub type Result<T> = std::result::Result<T, Error>;
