//! Image-decomposition policies that precede a zoom strategy.
//!
//! Grounded on `resampler/image_decomposition/periodic_smooth_policy.h`
//! (declaration only; its `.txx` body is not part of the retrieved source,
//! so the periodic+smooth split below follows spec's description of
//! Moisan's periodic-plus-smooth decomposition directly).

use std::f64::consts::PI;

use freqxform_core::{Image, Result, Size};
use freqxform_dsp::FftWrapper;
use num_complex::Complex;

/// Which decomposition runs ahead of an upsampling/zoom strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decomposition {
    /// Identity: the inner strategy runs directly on the image.
    Regular,
    /// Splits `u = p + s`: `p` (periodic component) feeds the inner
    /// strategy, `s` (smooth component) is handled separately by the
    /// caller (bilinear upsampling, for the resampler).
    PeriodicSmooth,
}

impl Decomposition {
    /// Splits `image` per the policy. `Regular` returns the image untouched
    /// with no smooth component; `PeriodicSmooth` returns `(p, Some(s))`.
    pub fn split(self, image: &Image, fft: &FftWrapper) -> Result<(Image, Option<Image>)> {
        match self {
            Decomposition::Regular => Ok((image.clone(), None)),
            Decomposition::PeriodicSmooth => {
                let (p, s) = periodic_smooth_split(image, fft)?;
                Ok((p, Some(s)))
            }
        }
    }
}

/// Moisan's periodic-plus-smooth decomposition: `u = p + s`, where `s`
/// carries the low-frequency boundary discontinuity and `p = u - s` is
/// periodic at the image's own size.
fn periodic_smooth_split(image: &Image, fft: &FftWrapper) -> Result<(Image, Image)> {
    let size = image.size;
    let rows = size.row;
    let cols = size.col;

    let mut boundary = vec![0.0_f64; size.cell_count().max(0) as usize];
    for c in 0..cols {
        let top = image.get(0, c);
        let bottom = image.get(rows - 1, c);
        boundary[c as usize] += bottom - top;
        boundary[((rows - 1) * cols + c) as usize] += top - bottom;
    }
    for r in 0..rows {
        let left = image.get(r, 0);
        let right = image.get(r, cols - 1);
        boundary[(r * cols) as usize] += right - left;
        boundary[(r * cols + cols - 1) as usize] += left - right;
    }

    let boundary_image = Image::from_buffer(size, boundary)?;
    let boundary_spectrum = fft.forward_2d(&boundary_image)?;
    let half = boundary_spectrum.half_width();

    let mut smooth_spectrum_data = vec![Complex::new(0.0, 0.0); boundary_spectrum.data.len()];
    for k in 0..rows as usize {
        for l in 0..half {
            if k == 0 && l == 0 {
                continue;
            }
            let denom = 2.0 * (2.0 * PI * k as f64 / rows as f64).cos()
                + 2.0 * (2.0 * PI * l as f64 / cols as f64).cos()
                - 4.0;
            smooth_spectrum_data[k * half + l] = boundary_spectrum.data[k * half + l] / denom;
        }
    }

    let smooth_spectrum = freqxform_dsp::Spectrum {
        size,
        data: smooth_spectrum_data,
    };
    let smooth = fft.inverse_2d(&smooth_spectrum)?;

    let periodic_data: Vec<f64> = image
        .data
        .iter()
        .zip(smooth.data.iter())
        .map(|(u, s)| u - s)
        .collect();
    let periodic = Image::from_buffer(size, periodic_data)?;

    Ok((periodic, smooth))
}

/// Bilinear resize to an arbitrary target size, used to upsample the smooth
/// component of a periodic+smooth decomposition.
pub fn bilinear_resize(image: &Image, target: Size) -> Image {
    if target == image.size {
        return image.clone();
    }
    let (src_rows, src_cols) = (image.size.row as f64, image.size.col as f64);
    let (dst_rows, dst_cols) = (target.row as f64, target.col as f64);
    let row_scale = if target.row > 1 {
        (src_rows - 1.0) / (dst_rows - 1.0).max(1.0)
    } else {
        0.0
    };
    let col_scale = if target.col > 1 {
        (src_cols - 1.0) / (dst_cols - 1.0).max(1.0)
    } else {
        0.0
    };

    let mut out = Image::new(target);
    for r in 0..target.row {
        let src_r = (r as f64 * row_scale).clamp(0.0, src_rows - 1.0);
        let r0 = src_r.floor() as i32;
        let r1 = (r0 + 1).min(image.size.row - 1);
        let fr = src_r - r0 as f64;
        for c in 0..target.col {
            let src_c = (c as f64 * col_scale).clamp(0.0, src_cols - 1.0);
            let c0 = src_c.floor() as i32;
            let c1 = (c0 + 1).min(image.size.col - 1);
            let fc = src_c - c0 as f64;

            let v00 = image.get(r0, c0);
            let v01 = image.get(r0, c1);
            let v10 = image.get(r1, c0);
            let v11 = image.get(r1, c1);
            let top = v00 * (1.0 - fc) + v01 * fc;
            let bottom = v10 * (1.0 - fc) + v11 * fc;
            out.set(r, c, top * (1.0 - fr) + bottom * fr);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regular_decomposition_is_identity() {
        let fft = FftWrapper::new();
        let image = Image::from_buffer(Size::new(4, 4), (0..16).map(|v| v as f64).collect()).unwrap();
        let (p, s) = Decomposition::Regular.split(&image, &fft).unwrap();
        assert_eq!(p, image);
        assert!(s.is_none());
    }

    #[test]
    fn periodic_smooth_split_recombines_to_original() {
        let fft = FftWrapper::new();
        let data: Vec<f64> = (0..64).map(|v| ((v * 7) % 13) as f64).collect();
        let image = Image::from_buffer(Size::new(8, 8), data).unwrap();
        let (p, s) = Decomposition::PeriodicSmooth.split(&image, &fft).unwrap();
        let s = s.unwrap();
        for i in 0..image.data.len() {
            assert!((image.data[i] - (p.data[i] + s.data[i])).abs() < 1e-6);
        }
    }

    #[test]
    fn bilinear_resize_preserves_constant_image() {
        let image = Image::from_buffer(Size::new(4, 4), vec![5.0; 16]).unwrap();
        let resized = bilinear_resize(&image, Size::new(8, 8));
        assert!(resized.data.iter().all(|&v| (v - 5.0).abs() < 1e-9));
    }

    #[test]
    fn bilinear_resize_same_size_is_identity() {
        let image = Image::from_buffer(Size::new(3, 3), (0..9).map(|v| v as f64).collect()).unwrap();
        let resized = bilinear_resize(&image, Size::new(3, 3));
        assert_eq!(resized, image);
    }
}
