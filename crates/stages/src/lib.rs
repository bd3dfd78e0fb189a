//! Built-in stages for Morphline
//!
//! - image: image fields and handles, `Checkerboard`, `SetFileName`
//! - noise: noise map fields, `NoiseParameters`, `GenerateNoiseMap`, `NoiseToPixels`
//! - png: `ExportPng` and the encoder behind it
//! - presets: complete pipelines assembled from the above

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod image;
pub mod noise;
pub mod png;
pub mod presets;

pub use error::{Error, Result};
pub use image::{Checkerboard, ImageOutputs, Pixel, SetFileName};
pub use noise::{GenerateNoiseMap, NoiseParameters, NoiseToPixels, Simplex};
pub use png::ExportPng;
