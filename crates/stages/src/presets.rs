//! Ready-made pipelines built from the stages in this crate

use std::path::PathBuf;

use morph_core::Result;
use morph_pipeline::Pipeline;

use crate::image::{Checkerboard, SetFileName};
use crate::noise::{GenerateNoiseMap, NoiseParameters, NoiseToPixels};
use crate::png::ExportPng;

/// Checkerboard → SetFileName → ExportPng
pub fn checkerboard(width: usize, height: usize, output: impl Into<PathBuf>) -> Result<Pipeline> {
    Pipeline::first_op(Checkerboard { width, height })?
        .then_op(SetFileName(output.into()))?
        .then_op(ExportPng)
}

/// NoiseParameters → GenerateNoiseMap → NoiseToPixels → SetFileName → ExportPng
pub fn noise(
    parameters: NoiseParameters,
    seed: u64,
    output: impl Into<PathBuf>,
) -> Result<Pipeline> {
    Pipeline::first_op(parameters)?
        .then_op(GenerateNoiseMap { seed })?
        .then_op(NoiseToPixels)?
        .then_op(SetFileName(output.into()))?
        .then_op(ExportPng)
}
