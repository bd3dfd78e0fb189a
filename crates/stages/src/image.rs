//! Image fields and generators
//!
//! Images travel through a pipeline as three fields: width, height, and a
//! row-major RGBA buffer of `width * height` pixels.

use std::path::PathBuf;

use morph_core::Field;
use morph_pipeline::{Operation, Output, StageBuilder, StageView};

use crate::error::{Error, Result};

/// RGBA, 8 bits per channel
pub type Pixel = [u8; 4];

/// Destination path of an exported image
pub const FILE_NAME: Field<PathBuf> = Field::new("FileName");
/// Image width in pixels
pub const PIXELS_WIDTH: Field<usize> = Field::new("PixelsWidth");
/// Image height in pixels
pub const PIXELS_HEIGHT: Field<usize> = Field::new("PixelsHeight");
/// Row-major pixel buffer
pub const PIXELS_DATA: Field<Vec<Pixel>> = Field::new("PixelsData");

/// Number of cells in a `width` x `height` grid
///
/// # Errors
///
/// [`Error::UnsupportedDimensions`] if a dimension does not fit in 32 bits
/// or the product overflows.
pub fn checked_area(width: usize, height: usize) -> Result<usize> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(_), Ok(_)) => width
            .checked_mul(height)
            .ok_or(Error::UnsupportedDimensions { width, height }),
        _ => Err(Error::UnsupportedDimensions { width, height }),
    }
}

/// Handles of a stage producing an image
#[derive(Debug, Clone, Copy)]
pub struct ImageOutputs {
    /// [`PIXELS_WIDTH`]
    pub width: Output<usize>,
    /// [`PIXELS_HEIGHT`]
    pub height: Output<usize>,
    /// [`PIXELS_DATA`]
    pub data: Output<Vec<Pixel>>,
}

impl ImageOutputs {
    /// Declare the three image fields as outputs of `stage`
    pub fn declare(stage: &mut StageBuilder) -> Self {
        Self {
            width: stage.writes(&PIXELS_WIDTH),
            height: stage.writes(&PIXELS_HEIGHT),
            data: stage.writes(&PIXELS_DATA),
        }
    }

    /// Write one image
    ///
    /// # Errors
    ///
    /// View errors only; the buffer length is checked by the consumer.
    pub fn write(
        &self,
        view: &mut StageView<'_>,
        width: usize,
        height: usize,
        pixels: Vec<Pixel>,
    ) -> morph_core::Result<()> {
        view.set(&self.width, width)?;
        view.set(&self.height, height)?;
        view.set(&self.data, pixels)
    }
}

/// Red checkerboard whose alternate cells are fully transparent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkerboard {
    /// Width in pixels
    pub width: usize,
    /// Height in pixels
    pub height: usize,
}

impl Checkerboard {
    /// Pixel buffer without going through a pipeline
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedDimensions`] as for [`checked_area`].
    pub fn render(&self) -> Result<Vec<Pixel>> {
        let mut pixels = Vec::with_capacity(checked_area(self.width, self.height)?);
        for y in 0..self.height {
            for x in 0..self.width {
                let alpha = if (x % 2) != (y % 2) { 255 } else { 0 };
                pixels.push([255, 0, 0, alpha]);
            }
        }
        Ok(pixels)
    }
}

impl Operation for Checkerboard {
    type Handles = ImageOutputs;

    fn name(&self) -> &str {
        "Checkerboard"
    }

    fn declare(&self, stage: &mut StageBuilder) -> ImageOutputs {
        ImageOutputs::declare(stage)
    }

    fn run(&self, image: &ImageOutputs, view: &mut StageView<'_>) -> morph_core::Result<()> {
        let pixels = self.render()?;
        image.write(view, self.width, self.height, pixels)
    }
}

/// Sets [`FILE_NAME`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetFileName(pub PathBuf);

impl Operation for SetFileName {
    type Handles = Output<PathBuf>;

    fn name(&self) -> &str {
        "SetFileName"
    }

    fn declare(&self, stage: &mut StageBuilder) -> Output<PathBuf> {
        stage.writes(&FILE_NAME)
    }

    fn run(
        &self,
        file_name: &Output<PathBuf>,
        view: &mut StageView<'_>,
    ) -> morph_core::Result<()> {
        view.set(file_name, self.0.clone())
    }
}
