use std::sync::Arc;

use fast_image_resize::{self as fir, images::Image as FirImage};
use image::DynamicImage;
use rustdct::{DctPlanner, TransformType2And3};

use crate::domain::{Fingerprint, FINGERPRINT_BITS};
use crate::error::{Error, Result};

/// Resample grid edge. 32×32 keeps enough spatial detail for the 8×8
/// low-frequency block extracted below.
const GRID: usize = 32;

/// Edge of the low-frequency block; BLOCK² == FINGERPRINT_BITS.
const BLOCK: usize = 8;

/// DCT-based fingerprint extractor.
///
/// Fixed convention: the top-left 8×8 coefficient block is taken in
/// raster order with the DC term at index 0. DC is kept in the emitted
/// bits but excluded from the median, which would otherwise track overall
/// brightness instead of structure.
///
/// Holds the planned transform and scratch space so batch callers pay the
/// planning cost once per thread.
pub(crate) struct DctHasher {
    dct: Arc<dyn TransformType2And3<f32>>,
    scratch: Vec<f32>,
}

impl DctHasher {
    pub fn new() -> Self {
        let dct = DctPlanner::<f32>::new().plan_dct2(GRID);
        let scratch_len = dct.get_scratch_len().max(GRID);
        Self {
            dct,
            scratch: vec![0.0; scratch_len],
        }
    }

    pub fn fingerprint(&mut self, pixels: &DynamicImage) -> Result<Fingerprint> {
        let mut grid = resample_luma(pixels)?;
        self.dct_2d(&mut grid);

        let mut block = [0.0f32; FINGERPRINT_BITS];
        for y in 0..BLOCK {
            block[y * BLOCK..(y + 1) * BLOCK]
                .copy_from_slice(&grid[y * GRID..y * GRID + BLOCK]);
        }

        // Median over the 63 AC coefficients only.
        let mut ac = block[1..].to_vec();
        ac.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let median = ac[ac.len() / 2];

        let mut bits = [false; FINGERPRINT_BITS];
        for (bit, &coeff) in bits.iter_mut().zip(block.iter()) {
            *bit = coeff > median;
        }
        Ok(Fingerprint::from_bits(&bits))
    }

    /// Separable in-place 2-D DCT-II: row pass, transpose, column pass
    /// (as a second row pass), transpose back.
    fn dct_2d(&mut self, grid: &mut [f32]) {
        for row in grid.chunks_mut(GRID) {
            self.dct.process_dct2_with_scratch(row, &mut self.scratch);
        }

        let mut transposed = vec![0.0f32; GRID * GRID];
        transpose::transpose(grid, &mut transposed, GRID, GRID);
        grid.copy_from_slice(&transposed);

        for row in grid.chunks_mut(GRID) {
            self.dct.process_dct2_with_scratch(row, &mut self.scratch);
        }

        transpose::transpose(grid, &mut transposed, GRID, GRID);
        grid.copy_from_slice(&transposed);
    }
}

/// Resample to GRID×GRID and convert to BT.601 luma (green weighted
/// highest, blue lowest). Resizing the RGB buffer first means only
/// GRID² pixels go through the luma conversion.
fn resample_luma(pixels: &DynamicImage) -> Result<Vec<f32>> {
    let (width, height) = (pixels.width(), pixels.height());
    if width == 0 || height == 0 {
        return Err(Error::Decode {
            message: format!("source has zero dimension ({width}x{height})"),
        });
    }

    let rgb = pixels.to_rgb8();
    let src = FirImage::from_vec_u8(width, height, rgb.into_raw(), fir::PixelType::U8x3)
        .map_err(|e| Error::Decode {
            message: e.to_string(),
        })?;
    let mut dst = FirImage::new(GRID as u32, GRID as u32, fir::PixelType::U8x3);
    fir::Resizer::new()
        .resize(&src, &mut dst, None)
        .map_err(|e| Error::Decode {
            message: e.to_string(),
        })?;

    let buf = dst.buffer();
    let mut luma = vec![0.0f32; GRID * GRID];
    for (out, px) in luma.iter_mut().zip(buf.chunks_exact(3)) {
        *out = 0.299 * px[0] as f32 + 0.587 * px[1] as f32 + 0.114 * px[2] as f32;
    }
    Ok(luma)
}
