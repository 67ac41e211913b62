use crate::background::{estimate_background_color as estimate_bg, SamplerKind};
use crate::buffer::{decode_image, encode_png, PixelBuffer};
use crate::cache::SourceCache;
use crate::color::{parse_color as parse_hex, Color};
use crate::process::{process_image, trim_to_content, RemovalOptions};
use crate::remove::{remove_background as remove_bg, DEFAULT_THRESHOLD};
use napi::bindgen_prelude::*;
use napi_derive::napi;

#[napi(object)]
pub struct RgbColor {
  pub r: u8,
  pub g: u8,
  pub b: u8,
}

impl From<Color> for RgbColor {
  fn from(color: Color) -> Self {
    RgbColor {
      r: color[0],
      g: color[1],
      b: color[2],
    }
  }
}

impl From<&RgbColor> for Color {
  fn from(color: &RgbColor) -> Self {
    [color.r, color.g, color.b]
  }
}

#[napi(object)]
pub struct RemoveBackgroundOptions {
  /// The input image buffer
  pub input: Buffer,
  /// The background color to remove. If not specified, it is estimated from the corners.
  pub background_color: Option<String>,
  /// Background estimator when no color is given: "corners" (default) or "edges"
  pub sampler: Option<String>,
  /// Maximum color distance still treated as background (default: 20)
  pub threshold: Option<f64>,
  /// Whether to trim the output image to the bounding box of non-transparent pixels
  pub trim: Option<bool>,
}

fn to_napi_error(err: crate::Error) -> Error {
  let status = if err.is_invalid_argument() {
    Status::InvalidArg
  } else {
    Status::GenericFailure
  };
  Error::new(status, err.to_string())
}

fn to_removal_options(options: &RemoveBackgroundOptions) -> Result<RemovalOptions> {
  let background = options
    .background_color
    .as_deref()
    .map(parse_hex)
    .transpose()
    .map_err(to_napi_error)?;

  let sampler = options
    .sampler
    .as_deref()
    .map(str::parse::<SamplerKind>)
    .transpose()
    .map_err(to_napi_error)?
    .unwrap_or_default();

  Ok(RemovalOptions {
    threshold: options.threshold.unwrap_or(DEFAULT_THRESHOLD),
    background,
    sampler,
    trim: options.trim.unwrap_or(false),
  })
}

fn to_pixel_buffer(pixels: &[u8], width: u32, height: u32) -> Result<PixelBuffer> {
  PixelBuffer::new(width, height, pixels.to_vec()).map_err(to_napi_error)
}

pub struct AsyncRemoveBackground {
  input: Vec<u8>,
  options: RemovalOptions,
}

#[napi]
impl Task for AsyncRemoveBackground {
  type Output = Vec<u8>;
  type JsValue = Buffer;

  fn compute(&mut self) -> Result<Self::Output> {
    process_image(&self.input, &self.options).map_err(to_napi_error)
  }

  fn resolve(&mut self, _env: Env, output: Self::Output) -> Result<Self::JsValue> {
    Ok(output.into())
  }
}

#[napi]
/// Remove the background of an encoded image asynchronously
///
/// # Returns
/// A promise that resolves to the processed image buffer (PNG format)
pub fn remove_background(options: RemoveBackgroundOptions) -> Result<AsyncTask<AsyncRemoveBackground>> {
  let removal = to_removal_options(&options)?;
  Ok(AsyncTask::new(AsyncRemoveBackground {
    input: options.input.to_vec(),
    options: removal,
  }))
}

#[napi]
/// Remove the background of an encoded image synchronously
///
/// # Returns
/// The processed image buffer (PNG format)
pub fn remove_background_sync(options: RemoveBackgroundOptions) -> Result<Buffer> {
  let removal = to_removal_options(&options)?;
  let output = process_image(&options.input, &removal).map_err(to_napi_error)?;
  Ok(output.into())
}

#[napi]
/// Estimate the background color of raw RGBA pixels from their four corners
pub fn estimate_background_color(pixels: Buffer, width: u32, height: u32) -> Result<RgbColor> {
  let buffer = to_pixel_buffer(&pixels, width, height)?;
  Ok(estimate_bg(&buffer).into())
}

#[napi]
/// Make raw RGBA pixels close to `background` transparent
///
/// # Returns
/// A new RGBA buffer of the same dimensions; the input is left untouched
pub fn remove_background_pixels(
  pixels: Buffer,
  width: u32,
  height: u32,
  background: RgbColor,
  threshold: f64,
) -> Result<Buffer> {
  let buffer = to_pixel_buffer(&pixels, width, height)?;
  let output =
    remove_bg(&buffer, Color::from(&background), threshold).map_err(to_napi_error)?;
  Ok(output.into_raw().into())
}

#[napi]
/// Parse a hex color string into an RGB color
///
/// Supports formats: "#ff0000", "ff0000", "#f00", "f00"
pub fn parse_color(hex: String) -> Result<RgbColor> {
  parse_hex(&hex).map(RgbColor::from).map_err(to_napi_error)
}

#[napi]
/// Trim an encoded image to the bounding box of non-transparent pixels
///
/// # Returns
/// The trimmed image buffer (PNG format)
pub fn trim_image(input: Buffer) -> Result<Buffer> {
  let buffer = decode_image(&input).map_err(to_napi_error)?;
  let trimmed = encode_png(trim_to_content(&buffer)).map_err(to_napi_error)?;
  Ok(trimmed.into())
}

#[napi]
/// Get the default color distance threshold
pub fn get_default_threshold() -> f64 {
  DEFAULT_THRESHOLD
}

/// Holds a decoded image so the threshold can be tuned without re-decoding
#[napi]
pub struct BackgroundRemovalSession {
  cache: SourceCache,
}

#[napi]
impl BackgroundRemovalSession {
  #[napi(constructor)]
  pub fn new() -> Self {
    Self {
      cache: SourceCache::new(),
    }
  }

  /// Decode and cache a new source image, replacing the previous one
  #[napi]
  pub fn load(&mut self, input: Buffer) -> Result<()> {
    self.cache.load_encoded(&input).map_err(to_napi_error)
  }

  /// Background color estimated for the cached image
  #[napi]
  pub fn background_color(&mut self) -> Result<RgbColor> {
    self
      .cache
      .background()
      .map(RgbColor::from)
      .map_err(to_napi_error)
  }

  /// Render the cached image with `threshold` as PNG
  #[napi]
  pub fn render(&mut self, threshold: f64) -> Result<Buffer> {
    let output = self.cache.render(threshold).map_err(to_napi_error)?;
    Ok(encode_png(output).map_err(to_napi_error)?.into())
  }

  #[napi]
  pub fn clear(&mut self) {
    self.cache.clear();
  }
}

impl Default for BackgroundRemovalSession {
  fn default() -> Self {
    Self::new()
  }
}
