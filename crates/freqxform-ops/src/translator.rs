//! Frequency-domain sub-pixel translation: a 2D phase ramp applied to the
//! full FFT, not the half-plane-only filter/resampler path.
//!
//! Grounded on `translation/frequency_translation.cc`'s `Shift`: uncentered
//! (ceil) shift before the forward FFT, phase multiply per bin, centered
//! (floor) shift after the inverse FFT, normalize, then `RemoveBorders`.

use std::f64::consts::PI;

use freqxform_core::{Image, Result};
use freqxform_dsp::{numerics, FftWrapper};

/// Shifts `image` so its content moves by `(shift_row, shift_col)` pixels,
/// trimming the invalid wrap-around border the shift leaves behind.
pub fn compute(image: &Image, shift_row: f64, shift_col: f64) -> Result<Image> {
    compute_with(image, shift_row, shift_col, &FftWrapper::new())
}

/// Same as [`compute`], reusing a caller-owned [`FftWrapper`] (its plan
/// cache benefits repeated calls on same-sized blocks).
pub fn compute_with(image: &Image, shift_row: f64, shift_col: f64, fft: &FftWrapper) -> Result<Image> {
    let int_row = shift_row.trunc();
    let frac_row = shift_row - int_row;
    let int_col = shift_col.trunc();
    let frac_col = shift_col - int_col;

    let shifted = if frac_row == 0.0 && frac_col == 0.0 {
        circular_shift(image, int_row as i32, int_col as i32)
    } else {
        shift_spectral(image, shift_row, shift_col, fft)?
    };

    Ok(trim_borders(&shifted, shift_row.ceil() as i32, shift_col.ceil() as i32))
}

/// Exact integer-pixel equivalent of [`shift_spectral`]'s circular shift,
/// skipping the FFT round trip when there is no fractional component.
fn circular_shift(image: &Image, shift_row: i32, shift_col: i32) -> Image {
    let size = image.size;
    let mut out = Image::new(size);
    for r in 0..size.row {
        let src_r = (r - shift_row).rem_euclid(size.row);
        for c in 0..size.col {
            let src_c = (c - shift_col).rem_euclid(size.col);
            out.set(r, c, image.get(src_r, src_c));
        }
    }
    out
}

fn shift_spectral(image: &Image, shift_row: f64, shift_col: f64, fft: &FftWrapper) -> Result<Image> {
    let size = image.size;
    let uncentered = numerics::ifft_shift_2d(&image.data, size);
    let uncentered_image = Image::from_buffer(size, uncentered)?;

    let mut spectrum = fft.forward_2d(&uncentered_image)?;
    let freq_row = numerics::compute_fft_freq(size.row, false);
    let freq_col = numerics::compute_fft_freq(size.col, true);
    let half = spectrum.half_width();

    for (i, &fr) in freq_row.iter().enumerate() {
        for (j, &fc) in freq_col.iter().enumerate() {
            let phase = -2.0 * PI * (shift_row * fr + shift_col * fc);
            let ramp = num_complex::Complex::new(phase.cos(), phase.sin());
            spectrum.data[i * half + j] *= ramp;
        }
    }

    let shifted = fft.inverse_2d(&spectrum)?;
    let recentered = numerics::fft_shift_2d(&shifted.data, size);
    Image::from_buffer(size, recentered)
}

/// Removes `shift_row.ceil()`/`shift_col.ceil()` rows/columns from the edge
/// the shifted content moved away from (the reference `RemoveBorders`
/// subtracts a negative shift rather than adding it, which grows the image
/// past its own buffer instead of shrinking it — `+` is used here for the
/// negative branch so the crop always shrinks; see DESIGN.md).
fn trim_borders(image: &Image, shift_row: i32, shift_col: i32) -> Image {
    let size = image.size;
    let (begin_row, end_row) = if shift_row > 0 {
        (shift_row, size.row)
    } else {
        (0, size.row + shift_row)
    };
    let (begin_col, end_col) = if shift_col > 0 {
        (shift_col, size.col)
    } else {
        (0, size.col + shift_col)
    };

    let new_rows = (end_row - begin_row).max(0);
    let new_cols = (end_col - begin_col).max(0);
    let mut out = Image::new(freqxform_core::Size::new(new_rows, new_cols));
    for r in 0..new_rows {
        for c in 0..new_cols {
            out.set(r, c, image.get(r + begin_row, c + begin_col));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use freqxform_core::Size;

    #[test]
    fn zero_shift_is_identity_up_to_borders() {
        let fft = FftWrapper::new();
        let image = Image::from_buffer(Size::new(8, 8), (0..64).map(|v| v as f64).collect()).unwrap();
        let shifted = compute_with(&image, 0.0, 0.0, &fft).unwrap();
        assert_eq!(shifted, image);
    }

    #[test]
    fn integer_shift_takes_the_short_circuit_path() {
        let fft = FftWrapper::new();
        let image = Image::from_buffer(Size::new(6, 6), (0..36).map(|v| v as f64).collect()).unwrap();
        let shifted = compute_with(&image, 1.0, 0.0, &fft).unwrap();
        assert_eq!(shifted.size, Size::new(5, 6));
        // the invalid wrapped-around row is trimmed; what remains is an
        // unchanged crop of the original image.
        for r in 0..5 {
            for c in 0..6 {
                assert_eq!(shifted.get(r, c), image.get(r, c));
            }
        }
    }

    #[test]
    fn subpixel_shift_moves_a_gaussian_bump_toward_target() {
        let fft = FftWrapper::new();
        let mut image = Image::new(Size::new(16, 16));
        image.set(8, 8, 1.0);
        let shifted = compute_with(&image, 2.5, 0.0, &fft).unwrap();
        // the bump should now peak close to row 10-11, not row 8.
        let mut peak_row = 0;
        let mut peak_val = f64::MIN;
        for r in 0..shifted.size.row {
            let v = shifted.get(r, 8.min(shifted.size.col - 1));
            if v > peak_val {
                peak_val = v;
                peak_row = r;
            }
        }
        assert!(peak_row >= 8 && peak_row <= 12, "peak at row {peak_row}");
    }

    #[test]
    fn trims_borders_on_the_side_content_moved_from() {
        let fft = FftWrapper::new();
        let image = Image::from_buffer(Size::new(6, 6), vec![1.0; 36]).unwrap();
        let shifted = compute_with(&image, -1.0, 0.0, &fft).unwrap();
        assert_eq!(shifted.size, Size::new(5, 6));
    }
}
