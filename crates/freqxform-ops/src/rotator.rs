//! Frequency-domain rotation via three-pass shear decomposition:
//! `R(theta) = Sx(a) . Sy(b) . Sx(a)`, `a = tan(theta/2)`, `b = -sin(theta)`.
//!
//! Grounded on `rotation/processor.cc`'s `Processor::Process` for the overall
//! padded-canvas sizing and pass ordering, and `rotation/utils.cc`'s
//! `ComputeNonRotatedHull` for the final crop size. Each shear pass here uses
//! a real-to-half-complex 1D FFT per line (see DESIGN.md: the reference's
//! column pass allocates a full-length complex buffer where the row passes
//! use the half-plane width, an inconsistency not reproduced here — all three
//! passes use the same half-plane real FFT, which is the mathematically
//! consistent form of the shift theorem the shear relies on).

use std::f64::consts::PI;

use freqxform_core::{Image, Point, Result, Size};
use freqxform_dsp::{numerics::compute_fft_freq, FftWrapper};
use num_complex::Complex;

/// Reduces `angle_degrees` modulo 360 into `(-180, 180]`.
pub fn normalize_angle(angle_degrees: f64) -> f64 {
    let mut angle = angle_degrees % 360.0;
    if angle <= -180.0 {
        angle += 360.0;
    } else if angle > 180.0 {
        angle -= 360.0;
    }
    angle
}

/// Size of the smallest axis-aligned rectangle containing `size` rotated by
/// `angle_degrees` about its center.
pub fn non_rotated_hull_size(size: Size, angle_degrees: f64) -> Size {
    let rad = angle_degrees.to_radians();
    let (c, r) = (size.col as f64, size.row as f64);
    let hull_cols = (rad.cos().abs() * c + rad.sin().abs() * r).ceil() as i32;
    let hull_rows = (rad.sin().abs() * c + rad.cos().abs() * r).ceil() as i32;
    Size::new(hull_rows, hull_cols)
}

/// The four corners of `size`, rotated by `angle_degrees` about its center
/// and re-expressed relative to the top-left of the non-rotated hull. Used
/// by the streaming rotator to locate genuine (non-padding) content inside a
/// rotated block before re-gluing it with its neighbors.
pub fn hull_corners(size: Size, angle_degrees: f64) -> [Point; 4] {
    let rad = angle_degrees.to_radians();
    let (cos, sin) = (rad.cos(), rad.sin());
    let (half_c, half_r) = (size.col as f64 / 2.0, size.row as f64 / 2.0);
    let hull = non_rotated_hull_size(size, angle_degrees);
    let (hull_half_c, hull_half_r) = (hull.col as f64 / 2.0, hull.row as f64 / 2.0);

    let corners = [
        (-half_c, -half_r),
        (half_c, -half_r),
        (half_c, half_r),
        (-half_c, half_r),
    ];

    corners.map(|(x, y)| {
        let rx = cos * x - sin * y;
        let ry = sin * x + cos * y;
        Point::new((rx + hull_half_c).round() as i32, (ry + hull_half_r).round() as i32)
    })
}

/// Rotates `image` by `angle_degrees` (signed, clockwise for positive angles
/// over the `(row, col)` image frame) about its center.
pub fn compute(image: &Image, angle_degrees: f64, fft: &FftWrapper) -> Result<Image> {
    let angle_degrees = normalize_angle(angle_degrees);
    if angle_degrees == 0.0 {
        return Ok(image.clone());
    }

    let evened = image.clone().even();
    let canvas_size = padded_canvas_size(evened.size);
    let canvas = center_in_canvas(&evened, canvas_size);

    let angle_rad = angle_degrees.to_radians();
    let a = (angle_rad / 2.0).tan();
    let b = -angle_rad.sin();

    let pass1 = shear_rows(&canvas, a, fft)?;
    let pass2 = shear_cols(&pass1, b, fft)?;
    let pass3 = shear_rows(&pass2, a, fft)?;

    let hull = non_rotated_hull_size(evened.size, angle_degrees);
    Ok(center_crop(&pass3, hull))
}

/// `2x` the image in each dimension when `rows <= cols`, else `3x`.
fn padded_canvas_size(size: Size) -> Size {
    let factor = if size.row <= size.col { 2 } else { 3 };
    size.scale_by(factor)
}

/// Places `image` centered within a zero-filled canvas of `canvas_size`.
fn center_in_canvas(image: &Image, canvas_size: Size) -> Image {
    let row_offset = (canvas_size.row - image.size.row) / 2;
    let col_offset = (canvas_size.col - image.size.col) / 2;
    let mut canvas = Image::new(canvas_size);
    for r in 0..image.size.row {
        for c in 0..image.size.col {
            canvas.set(r + row_offset, c + col_offset, image.get(r, c));
        }
    }
    canvas
}

/// Crops `image` to `target_size`, centered.
fn center_crop(image: &Image, target_size: Size) -> Image {
    let row_offset = (image.size.row - target_size.row) / 2;
    let col_offset = (image.size.col - target_size.col) / 2;
    let mut out = Image::new(target_size);
    for r in 0..target_size.row {
        for c in 0..target_size.col {
            out.set(r, c, image.get(r + row_offset, c + col_offset));
        }
    }
    out
}

/// `Sx(shear)`: shifts each row's content along columns by `shear * (row -
/// center_row)`, via a per-row real FFT and a frequency-domain phase ramp.
fn shear_rows(image: &Image, shear: f64, fft: &FftWrapper) -> Result<Image> {
    let size = image.size;
    let center_row = size.row as f64 / 2.0;
    let freq = compute_fft_freq(size.col, true);

    let mut out = Image::new(size);
    for r in 0..size.row as usize {
        let row = &image.data[r * size.col as usize..(r + 1) * size.col as usize];
        let shift = shear * (r as f64 - center_row);
        let mut spectrum = fft.forward_1d(row)?;
        apply_phase_ramp(&mut spectrum, &freq, shift);
        let shifted_row = fft.inverse_1d(&spectrum, size.col as usize)?;
        out.data[r * size.col as usize..(r + 1) * size.col as usize].copy_from_slice(&shifted_row);
    }
    Ok(out)
}

/// `Sy(shear)`: shifts each column's content along rows by `shear * (col -
/// center_col)`, via a per-column real FFT and a frequency-domain phase
/// ramp.
fn shear_cols(image: &Image, shear: f64, fft: &FftWrapper) -> Result<Image> {
    let size = image.size;
    let center_col = size.col as f64 / 2.0;
    let freq = compute_fft_freq(size.row, true);

    let mut out = Image::new(size);
    let mut column = vec![0.0_f64; size.row as usize];
    for c in 0..size.col as usize {
        for r in 0..size.row as usize {
            column[r] = image.data[r * size.col as usize + c];
        }
        let shift = shear * (c as f64 - center_col);
        let mut spectrum = fft.forward_1d(&column)?;
        apply_phase_ramp(&mut spectrum, &freq, shift);
        let shifted_col = fft.inverse_1d(&spectrum, size.row as usize)?;
        for r in 0..size.row as usize {
            out.data[r * size.col as usize + c] = shifted_col[r];
        }
    }
    Ok(out)
}

/// Multiplies each half-plane bin by `exp(-2*pi*i * freq[k] * shift)`.
fn apply_phase_ramp(spectrum: &mut [Complex<f64>], freq: &[f64], shift: f64) {
    for (bin, &f) in spectrum.iter_mut().zip(freq.iter()) {
        let phase = -2.0 * PI * f * shift;
        *bin *= Complex::new(phase.cos(), phase.sin());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_angle_is_identity() {
        let fft = FftWrapper::new();
        let image = Image::from_buffer(Size::new(8, 8), (0..64).map(|v| v as f64).collect()).unwrap();
        let rotated = compute(&image, 0.0, &fft).unwrap();
        assert_eq!(rotated, image);
    }

    #[test]
    fn normalize_angle_wraps_into_range() {
        assert!((normalize_angle(540.0) - 180.0).abs() < 1e-9);
        assert!((normalize_angle(-540.0) - 180.0).abs() < 1e-9);
        assert!((normalize_angle(10.0) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn non_rotated_hull_matches_bounding_box_formula() {
        let size = Size::new(10, 20);
        let hull = non_rotated_hull_size(size, 90.0);
        // a 90 degree rotation swaps width and height.
        assert_eq!(hull, Size::new(20, 10));
    }

    #[test]
    fn rotation_preserves_total_energy_roughly() {
        let fft = FftWrapper::new();
        let mut image = Image::new(Size::new(16, 16));
        for r in 4..12 {
            for c in 4..12 {
                image.set(r, c, 1.0);
            }
        }
        let rotated = compute(&image, 30.0, &fft).unwrap();
        let original_sum: f64 = image.data.iter().sum();
        let rotated_sum: f64 = rotated.data.iter().sum();
        assert!((original_sum - rotated_sum).abs() / original_sum < 0.2);
    }

    #[test]
    fn ninety_degree_rotation_maps_corner_region_across() {
        let fft = FftWrapper::new();
        let mut image = Image::new(Size::new(16, 16));
        // mark a block in the top-left quadrant.
        for r in 1..4 {
            for c in 1..4 {
                image.set(r, c, 1.0);
            }
        }
        let rotated = compute(&image, 90.0, &fft).unwrap();
        // after a +90 degree rotation the marked energy should have moved
        // away from the original top-left quadrant.
        let mut top_left_sum = 0.0;
        for r in 0..6 {
            for c in 0..6 {
                top_left_sum += rotated.get(r, c).abs();
            }
        }
        let total: f64 = rotated.data.iter().map(|v| v.abs()).sum();
        assert!(top_left_sum < total * 0.5);
    }
}
