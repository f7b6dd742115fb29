mod dct;

use image::DynamicImage;
use rayon::prelude::*;

use crate::domain::{Fingerprint, SourceImage};
use crate::error::Result;
use dct::DctHasher;

/// Compute the perceptual fingerprint of one decoded image.
///
/// Pure function of pixel content: deterministic, no hidden state. The
/// pipeline is resample → luma → 2-D DCT → 8×8 low-frequency block →
/// median-threshold bits (see `DctHasher` for the exact convention).
/// Fails with `Error::Decode` only when the source cannot be resampled
/// (zero-dimension or rejected buffer); valid non-empty pixels never fail.
pub fn compute_fingerprint(pixels: &DynamicImage) -> Result<Fingerprint> {
    let mut hasher = DctHasher::new();
    hasher.fingerprint(pixels)
}

/// Fingerprint a batch of images in parallel.
///
/// Each invocation reads only its own image and writes only its own slot,
/// so the batch fans out across the rayon pool with no locking. The call
/// returns once every slot is resolved — it is the synchronization
/// barrier before pairwise scoring. Failed images are reported in place
/// (and logged) rather than aborting the batch; results keep the input
/// order.
pub fn fingerprint_batch(sources: &[SourceImage<'_>]) -> Vec<(i64, Result<Fingerprint>)> {
    sources
        .par_iter()
        .map_init(DctHasher::new, |hasher, source| {
            let fingerprint = hasher.fingerprint(source.pixels);
            if let Err(err) = &fingerprint {
                log::warn!("skipping {}: {err}", source.filename);
            }
            (source.id, fingerprint)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn gradient(base: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_fn(64, 64, |x, _| {
            image::Rgb([base + (x * 2) as u8, base + (x * 2) as u8, base])
        }))
    }

    fn checkerboard() -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_fn(64, 64, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                image::Rgb([240, 240, 240])
            } else {
                image::Rgb([15, 15, 15])
            }
        }))
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let img = gradient(40);
        let a = compute_fingerprint(&img).unwrap();
        let b = compute_fingerprint(&img).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_has_fixed_length() {
        let fp = compute_fingerprint(&gradient(40)).unwrap();
        assert_eq!(fp.bits(), crate::domain::FINGERPRINT_BITS);
    }

    #[test]
    fn test_identical_pixels_identical_fingerprint() {
        let a = compute_fingerprint(&gradient(40)).unwrap();
        let b = compute_fingerprint(&gradient(40)).unwrap();
        assert_eq!(a.hamming_distance(&b).unwrap(), 0);
    }

    #[test]
    fn test_different_structure_different_fingerprint() {
        let a = compute_fingerprint(&gradient(40)).unwrap();
        let b = compute_fingerprint(&checkerboard()).unwrap();
        assert!(a.hamming_distance(&b).unwrap() > 0);
    }

    #[test]
    fn test_brightness_shift_stays_close() {
        // A uniform brightness shift only moves the DC coefficient (plus
        // resampler rounding), so the hash should barely move.
        let a = compute_fingerprint(&gradient(40)).unwrap();
        let b = compute_fingerprint(&gradient(56)).unwrap();
        assert!(a.hamming_distance(&b).unwrap() <= 8);
    }

    #[test]
    fn test_zero_size_source_fails() {
        let empty = DynamicImage::new_rgb8(0, 0);
        let err = compute_fingerprint(&empty).unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_batch_keeps_order_and_skips_failures() {
        let good = gradient(40);
        let bad = DynamicImage::new_rgb8(0, 0);
        let other = checkerboard();
        let sources = vec![
            SourceImage {
                id: 10,
                filename: "a.jpg",
                pixels: &good,
            },
            SourceImage {
                id: 11,
                filename: "broken.jpg",
                pixels: &bad,
            },
            SourceImage {
                id: 12,
                filename: "b.jpg",
                pixels: &other,
            },
        ];

        let results = fingerprint_batch(&sources);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0, 10);
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, 11);
        assert!(results[1].1.is_err());
        assert_eq!(results[2].0, 12);
        assert!(results[2].1.is_ok());
    }

    #[test]
    fn test_batch_matches_single_computation() {
        let img = gradient(40);
        let sources = vec![SourceImage {
            id: 1,
            filename: "a.jpg",
            pixels: &img,
        }];
        let batch = fingerprint_batch(&sources);
        let single = compute_fingerprint(&img).unwrap();
        assert_eq!(batch[0].1.as_ref().unwrap(), &single);
    }
}
