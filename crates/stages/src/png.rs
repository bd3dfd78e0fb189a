//! PNG export
//!
//! Minimal encoder for 8-bit RGBA, non-interlaced images. The file is the
//! PNG signature followed by three chunks:
//!
//! ```text
//! ┌──────────┬──────────┬────────────┬────────┐
//! │ Length   │ Type     │ Data       │ CRC32  │
//! │ (4, BE)  │ (4)      │ (Length)   │ (4, BE)│
//! └──────────┴──────────┴────────────┴────────┘
//! ```
//!
//! - IHDR: width, height, bit depth 8, color type 6 (RGBA)
//! - IDAT: zlib stream of scanlines, each prefixed with filter type 0
//! - IEND: empty
//!
//! The CRC covers the type and data fields.

use std::io::Write;
use std::path::{Path, PathBuf};

use crc32fast::Hasher;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use morph_pipeline::{Input, Operation, StageBuilder, StageView};
use tracing::info;

use crate::error::{Error, Result};
use crate::image::{Pixel, FILE_NAME, PIXELS_DATA, PIXELS_HEIGHT, PIXELS_WIDTH};

/// PNG file signature
pub const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

const BIT_DEPTH: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;

/// Encode an RGBA buffer as a PNG file image
///
/// # Errors
///
/// - [`Error::InvalidImage`] if `pixels.len() != width * height`
/// - [`Error::UnsupportedDimensions`] for a zero dimension or one that does
///   not fit in 32 bits
pub fn encode_rgba(width: usize, height: usize, pixels: &[Pixel]) -> Result<Vec<u8>> {
    if Some(pixels.len()) != width.checked_mul(height) {
        return Err(Error::InvalidImage {
            width,
            height,
            actual: pixels.len(),
        });
    }
    let (png_width, png_height) = match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => (w, h),
        _ => return Err(Error::UnsupportedDimensions { width, height }),
    };

    let mut scanlines = Vec::with_capacity(height * (1 + width * 4));
    for row in pixels.chunks_exact(width) {
        scanlines.push(0);
        for pixel in row {
            scanlines.extend_from_slice(pixel);
        }
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&scanlines).map_err(Error::Compress)?;
    let compressed = encoder.finish().map_err(Error::Compress)?;

    let mut header = Vec::with_capacity(13);
    header.extend_from_slice(&png_width.to_be_bytes());
    header.extend_from_slice(&png_height.to_be_bytes());
    header.extend_from_slice(&[BIT_DEPTH, COLOR_TYPE_RGBA, 0, 0, 0]);

    let mut out = Vec::with_capacity(SIGNATURE.len() + compressed.len() + 3 * 12 + 13);
    out.extend_from_slice(&SIGNATURE);
    write_chunk(&mut out, b"IHDR", &header)?;
    write_chunk(&mut out, b"IDAT", &compressed)?;
    write_chunk(&mut out, b"IEND", &[])?;
    Ok(out)
}

fn write_chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) -> Result<()> {
    let len = u32::try_from(data.len()).map_err(|_| {
        Error::Compress(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "chunk exceeds 4 GiB",
        ))
    })?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(kind);
    out.extend_from_slice(data);

    let mut hasher = Hasher::new();
    hasher.update(kind);
    hasher.update(data);
    out.extend_from_slice(&hasher.finalize().to_be_bytes());
    Ok(())
}

/// Encode and write an RGBA buffer to `path`
///
/// # Errors
///
/// Encoding errors as for [`encode_rgba`], or [`Error::Io`].
pub fn write_rgba(path: &Path, width: usize, height: usize, pixels: &[Pixel]) -> Result<usize> {
    let bytes = encode_rgba(width, height, pixels)?;
    std::fs::write(path, &bytes).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(bytes.len())
}

/// Writes the image fields to [`FILE_NAME`] as a PNG
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportPng;

/// Handles of [`ExportPng`]
#[derive(Debug, Clone, Copy)]
pub struct ExportHandles {
    file_name: Input<PathBuf>,
    width: Input<usize>,
    height: Input<usize>,
    data: Input<Vec<Pixel>>,
}

impl Operation for ExportPng {
    type Handles = ExportHandles;

    fn name(&self) -> &str {
        "ExportPng"
    }

    fn declare(&self, stage: &mut StageBuilder) -> ExportHandles {
        ExportHandles {
            file_name: stage.reads(&FILE_NAME),
            width: stage.reads(&PIXELS_WIDTH),
            height: stage.reads(&PIXELS_HEIGHT),
            data: stage.reads(&PIXELS_DATA),
        }
    }

    fn run(&self, export: &ExportHandles, view: &mut StageView<'_>) -> morph_core::Result<()> {
        let path = view.get(&export.file_name)?;
        let width = *view.get(&export.width)?;
        let height = *view.get(&export.height)?;
        let pixels = view.get(&export.data)?;

        let bytes = write_rgba(path, width, height, pixels)?;
        info!(path = %path.display(), width, height, bytes, "exported png");
        Ok(())
    }
}
