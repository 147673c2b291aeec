use crate::errors::{AppError, AppResult};
use image::imageops::FilterType;
use serde::Serialize;

/// Result of comparing two face images. Lower distance = more similar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Verification {
    pub verified: bool,
    pub distance: f64,
}

/// Face-comparison capability.
///
/// Implementations own their model and threshold; callers only see the verdict.
pub trait FaceComparer {
    fn compare(&self, reference: &[u8], candidate: &[u8]) -> AppResult<Verification>;
}

const THUMB_SIDE: u32 = 32;

/// Appearance comparer over normalized grayscale thumbnails.
///
/// Both images are decoded, reduced to a 32x32 luma grid, mean-centered and
/// compared with cosine distance (`1 - cos`, range 0..=2).
#[derive(Debug, Clone)]
pub struct ThumbnailComparer {
    threshold: f64,
}

impl ThumbnailComparer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    fn signature(bytes: &[u8]) -> AppResult<Vec<f64>> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| AppError::Capability(format!("decode failed: {e}")))?;
        let thumb = image::imageops::resize(
            &img.to_luma8(),
            THUMB_SIDE,
            THUMB_SIDE,
            FilterType::Triangle,
        );

        let pixels: Vec<f64> = thumb.pixels().map(|p| f64::from(p.0[0])).collect();
        let mean = pixels.iter().sum::<f64>() / pixels.len() as f64;
        Ok(pixels.into_iter().map(|v| v - mean).collect())
    }
}

impl FaceComparer for ThumbnailComparer {
    fn compare(&self, reference: &[u8], candidate: &[u8]) -> AppResult<Verification> {
        let lhs = Self::signature(reference)?;
        let rhs = Self::signature(candidate)?;

        let similarity = cosine_similarity(&lhs, &rhs)
            .ok_or_else(|| AppError::Capability("image has no contrast".into()))?;
        let distance = 1.0 - similarity;

        Ok(Verification {
            verified: distance <= self.threshold,
            distance,
        })
    }
}

/// `None` when either vector has zero norm.
pub fn cosine_similarity(lhs: &[f64], rhs: &[f64]) -> Option<f64> {
    let mut dot = 0.0;
    let mut norm_lhs = 0.0;
    let mut norm_rhs = 0.0;

    for (l, r) in lhs.iter().zip(rhs.iter()) {
        dot += l * r;
        norm_lhs += l * l;
        norm_rhs += r * r;
    }

    if norm_lhs == 0.0 || norm_rhs == 0.0 {
        return None;
    }
    Some(dot / (norm_lhs.sqrt() * norm_rhs.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use std::io::Cursor;

    fn noisy_png(seed: u32) -> Vec<u8> {
        let mut state = seed;
        let img = RgbImage::from_fn(64, 64, |_, _| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let v = (state >> 24) as u8;
            image::Rgb([v, v, v])
        });
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn identical_images_verify() {
        let cmp = ThumbnailComparer::new(0.30);
        let face = noisy_png(1);
        let v = cmp.compare(&face, &face).unwrap();
        assert!(v.verified);
        assert!(v.distance.abs() < 1e-9);
    }

    #[test]
    fn unrelated_images_do_not_verify() {
        let cmp = ThumbnailComparer::new(0.30);
        let v = cmp.compare(&noisy_png(1), &noisy_png(99)).unwrap();
        assert!(!v.verified, "distance {}", v.distance);
    }

    #[test]
    fn undecodable_bytes_are_a_capability_failure() {
        let cmp = ThumbnailComparer::new(0.30);
        let err = cmp.compare(&[0u8; 2048], &noisy_png(1)).unwrap_err();
        assert!(matches!(err, AppError::Capability(_)));
    }

    #[test]
    fn flat_image_has_no_signature() {
        let flat = RgbImage::from_pixel(16, 16, image::Rgb([128, 128, 128]));
        let mut buf = Cursor::new(Vec::new());
        flat.write_to(&mut buf, ImageFormat::Png).unwrap();

        let cmp = ThumbnailComparer::new(0.30);
        assert!(cmp.compare(&buf.into_inner(), &noisy_png(3)).is_err());
    }
}
