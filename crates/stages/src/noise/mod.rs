//! Noise map stages
//!
//! | Stage | In | Out |
//! |-------|----|-----|
//! | `NoiseParameters` | ∅ | Width, Height, Frequency |
//! | `GenerateNoiseMap` | Width, Height, Frequency | Values |
//! | `NoiseToPixels` | Width, Height, Values | PixelsWidth, PixelsHeight, PixelsData |

mod simplex;

pub use simplex::Simplex;

use morph_core::{Field, Result};
use morph_pipeline::{Input, Operation, Output, StageBuilder, StageView};
use tracing::debug;

use crate::error::Error;
use crate::image::{checked_area, ImageOutputs, Pixel};

/// Noise map width in samples
pub const WIDTH: Field<usize> = Field::new("Width");
/// Noise map height in samples
pub const HEIGHT: Field<usize> = Field::new("Height");
/// Sampling step in noise space per map cell
pub const FREQUENCY: Field<f64> = Field::new("Frequency");
/// Row-major samples in `[-1, 1]`
pub const VALUES: Field<Vec<f64>> = Field::new("Values");

/// Sets the noise map dimensions and frequency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseParameters {
    /// Width in samples
    pub width: usize,
    /// Height in samples
    pub height: usize,
    /// Sampling frequency
    pub frequency: f64,
}

impl Operation for NoiseParameters {
    type Handles = (Output<usize>, Output<usize>, Output<f64>);

    fn name(&self) -> &str {
        "NoiseParameters"
    }

    fn declare(&self, stage: &mut StageBuilder) -> Self::Handles {
        (stage.writes(&WIDTH), stage.writes(&HEIGHT), stage.writes(&FREQUENCY))
    }

    fn run(
        &self,
        (width, height, frequency): &Self::Handles,
        view: &mut StageView<'_>,
    ) -> Result<()> {
        view.set(width, self.width)?;
        view.set(height, self.height)?;
        view.set(frequency, self.frequency)
    }
}

/// Fills [`VALUES`] with simplex noise
///
/// The sample for cell `(x, y)` is taken at `(x * frequency, y * frequency)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerateNoiseMap {
    /// Permutation seed
    pub seed: u64,
}

impl GenerateNoiseMap {
    /// Row-major noise map without going through a pipeline
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedDimensions`] if the map size overflows.
    pub fn render(&self, width: usize, height: usize, frequency: f64) -> crate::Result<Vec<f64>> {
        let noise = Simplex::new(self.seed);
        let mut values = Vec::with_capacity(checked_area(width, height)?);
        for y in 0..height {
            for x in 0..width {
                values.push(noise.sample(x as f64 * frequency, y as f64 * frequency));
            }
        }
        Ok(values)
    }
}

/// Handles of [`GenerateNoiseMap`]
#[derive(Debug, Clone, Copy)]
pub struct NoiseMapHandles {
    width: Input<usize>,
    height: Input<usize>,
    frequency: Input<f64>,
    values: Output<Vec<f64>>,
}

impl Operation for GenerateNoiseMap {
    type Handles = NoiseMapHandles;

    fn name(&self) -> &str {
        "GenerateNoiseMap"
    }

    fn declare(&self, stage: &mut StageBuilder) -> NoiseMapHandles {
        NoiseMapHandles {
            width: stage.reads(&WIDTH),
            height: stage.reads(&HEIGHT),
            frequency: stage.reads(&FREQUENCY),
            values: stage.writes(&VALUES),
        }
    }

    fn run(&self, map: &NoiseMapHandles, view: &mut StageView<'_>) -> Result<()> {
        let width = *view.get(&map.width)?;
        let height = *view.get(&map.height)?;
        let frequency = *view.get(&map.frequency)?;
        debug!(width, height, frequency, seed = self.seed, "generating noise map");
        let values = self.render(width, height, frequency)?;
        view.set(&map.values, values)
    }
}

/// Maps noise samples to opaque grayscale pixels
///
/// -1 maps to black and 1 to white.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoiseToPixels;

impl NoiseToPixels {
    /// Grayscale pixel for one sample
    pub fn shade(value: f64) -> Pixel {
        let level = ((value.clamp(-1.0, 1.0) + 1.0) * 0.5 * 255.0).round() as u8;
        [level, level, level, 255]
    }
}

/// Handles of [`NoiseToPixels`]
#[derive(Debug, Clone, Copy)]
pub struct ShadeHandles {
    width: Input<usize>,
    height: Input<usize>,
    values: Input<Vec<f64>>,
    image: ImageOutputs,
}

impl Operation for NoiseToPixels {
    type Handles = ShadeHandles;

    fn name(&self) -> &str {
        "NoiseToPixels"
    }

    fn declare(&self, stage: &mut StageBuilder) -> ShadeHandles {
        ShadeHandles {
            width: stage.reads(&WIDTH),
            height: stage.reads(&HEIGHT),
            values: stage.reads(&VALUES),
            image: ImageOutputs::declare(stage),
        }
    }

    fn run(&self, shade: &ShadeHandles, view: &mut StageView<'_>) -> Result<()> {
        let width = *view.get(&shade.width)?;
        let height = *view.get(&shade.height)?;
        let values = view.get(&shade.values)?;
        if Some(values.len()) != width.checked_mul(height) {
            return Err(Error::InvalidImage {
                width,
                height,
                actual: values.len(),
            }
            .into());
        }
        let pixels: Vec<Pixel> = values.iter().map(|v| Self::shade(*v)).collect();
        shade.image.write(view, width, height, pixels)
    }
}
