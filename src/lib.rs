#![deny(clippy::all)]

//! Corner-sampled background removal.
//!
//! The background color is estimated from the four corners of an RGBA buffer
//! and every pixel within a color distance threshold of it gets alpha 0.
//!
//! ```no_run
//! use bgcut::{estimate_background_color, remove_background, PixelBuffer};
//!
//! # fn main() -> bgcut::Result<()> {
//! let input = PixelBuffer::from_pixel(2, 2, [255, 255, 255, 255])?;
//! let background = estimate_background_color(&input);
//! let output = remove_background(&input, background, 10.0)?;
//! assert_eq!(output.transparent_count(), 4);
//! # Ok(())
//! # }
//! ```

pub mod background;
pub mod buffer;
pub mod cache;
pub mod color;
pub mod error;
pub mod process;
pub mod remove;

#[cfg(feature = "node")]
pub mod node;

pub use crate::background::{
  estimate_background_color, BackgroundSampler, CornerSampler, EdgeModeSampler,
  EdgeSamplingConfig, SamplerKind,
};
pub use crate::buffer::{decode_image, encode_png, PixelBuffer};
pub use crate::cache::SourceCache;
pub use crate::color::{color_distance, parse_color, Color};
pub use crate::error::{Error, Result};
pub use crate::process::{process_buffer, process_image, trim_to_content, RemovalOptions};
pub use crate::remove::{
  remove_background, remove_background_with_stats, RemovalStats, DEFAULT_THRESHOLD,
};
