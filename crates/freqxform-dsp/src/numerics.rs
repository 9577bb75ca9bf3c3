//! FFT shift variants, frequency grids and block-size rounding helpers.
//!
//! These mirror the reference numeric routines bit for bit: the naming
//! follows the reference literally ([`fft_shift_2d`] performs a floor shift,
//! [`ifft_shift_2d`] a ceil shift) rather than a particular FFT library's
//! convention, since downstream code depends on that exact pairing.

use freqxform_core::{Point, Size, ZoomRatio};

/// Centered shift: moves the zero-frequency component to
/// `(floor(rows/2), floor(cols/2))`.
pub fn fft_shift_2d(data: &[f64], size: Size) -> Vec<f64> {
    let row_shift = size.row / 2;
    let col_shift = size.col / 2;
    let mut shifted = vec![0.0; data.len()];
    for row in 0..size.row {
        let shifted_row = (row + row_shift).rem_euclid(size.row);
        for col in 0..size.col {
            let shifted_col = (col + col_shift).rem_euclid(size.col);
            shifted[(shifted_col + size.col * shifted_row) as usize] =
                data[(col + size.col * row) as usize];
        }
    }
    shifted
}

/// Inverse of [`fft_shift_2d`]: ceil shift, undoes a centered shift exactly.
pub fn ifft_shift_2d(data: &[f64], size: Size) -> Vec<f64> {
    let row_shift = (size.row as f64 / 2.0).ceil() as i32;
    let col_shift = (size.col as f64 / 2.0).ceil() as i32;
    let mut shifted = vec![0.0; data.len()];
    for row in 0..size.row {
        let shifted_row = (row + row_shift).rem_euclid(size.row);
        for col in 0..size.col {
            let shifted_col = (col + col_shift).rem_euclid(size.col);
            shifted[(shifted_row * size.col + shifted_col) as usize] =
                data[(row * size.col + col) as usize];
        }
    }
    shifted
}

/// Copies a `(row, col)` sub-block of width `cols` and height `rows` from
/// `src` at `src_origin` to `dst` at `dst_origin`, both laid out row-major
/// with stride `size.col`.
#[allow(clippy::too_many_arguments)]
fn copy_block(
    src: &[f64],
    dst: &mut [f64],
    size: Size,
    src_origin: Point,
    dst_origin: Point,
    rows: i32,
    cols: i32,
) {
    let mut src_begin = (src_origin.x + src_origin.y * size.col) as usize;
    let mut dst_begin = (dst_origin.x + dst_origin.y * size.col) as usize;
    for _ in 0..rows {
        dst[dst_begin..dst_begin + cols as usize]
            .copy_from_slice(&src[src_begin..src_begin + cols as usize]);
        src_begin += size.col as usize;
        dst_begin += size.col as usize;
    }
}

/// Un-centers a shift previously centered around `hot_point` rather than the
/// image center, undoing [`fft_shift_2d_uncentered`].
pub fn ifft_shift_2d_uncentered(data: &[f64], size: Size, hot_point: Point) -> Vec<f64> {
    let block4 = Size::new(size.row - hot_point.y, size.col - hot_point.x);
    let block3 = Size::new(block4.row, hot_point.x);
    let block2 = Size::new(hot_point.y, block4.col);
    let block1 = Size::new(hot_point.y, hot_point.x);

    let mut shifted = vec![0.0; data.len()];

    copy_block(
        data,
        &mut shifted,
        size,
        hot_point,
        Point::new(0, 0),
        block4.row,
        block4.col,
    );
    copy_block(
        data,
        &mut shifted,
        size,
        Point::new(0, size.row - block4.row),
        Point::new(block4.col, 0),
        block3.row,
        block3.col,
    );
    copy_block(
        data,
        &mut shifted,
        size,
        Point::new(hot_point.x, 0),
        Point::new(0, block4.row),
        block2.row,
        block2.col,
    );
    copy_block(
        data,
        &mut shifted,
        size,
        Point::new(0, 0),
        Point::new(block4.col, block4.row),
        block1.row,
        block1.col,
    );

    shifted
}

/// Centers data around `hot_point`, the inverse transform of
/// [`ifft_shift_2d_uncentered`].
pub fn fft_shift_2d_uncentered(data: &[f64], size: Size, hot_point: Point) -> Vec<f64> {
    let block4 = Size::new(size.row - hot_point.y, size.col - hot_point.x);
    let block3 = Size::new(block4.row, hot_point.x);
    let block2 = Size::new(hot_point.y, block4.col);
    let block1 = Size::new(hot_point.y, hot_point.x);

    let mut shifted = vec![0.0; data.len()];

    copy_block(
        data,
        &mut shifted,
        size,
        Point::new(0, 0),
        hot_point,
        block4.row,
        block4.col,
    );
    copy_block(
        data,
        &mut shifted,
        size,
        Point::new(block4.col, 0),
        Point::new(0, size.row - block4.row),
        block3.row,
        block3.col,
    );
    copy_block(
        data,
        &mut shifted,
        size,
        Point::new(0, block4.row),
        Point::new(hot_point.x, 0),
        block2.row,
        block2.col,
    );
    copy_block(
        data,
        &mut shifted,
        size,
        Point::new(block4.col, block4.row),
        Point::new(0, 0),
        block1.row,
        block1.col,
    );

    shifted
}

/// Grows `size` to the smallest size, no more than 100x the original in each
/// dimension, for which `(dim + padding) * res_in` is an exact power of two.
/// Falls back to the original size, with a warning, if no such size is found
/// within that bound.
pub fn generate_dyadic_size(size: Size, res_in: i32, padding_size: Size) -> Size {
    let mut h = size.row;
    let mut w = size.col;
    let initial_h = size.row;
    let initial_w = size.col;

    loop {
        let value = ((h + padding_size.row) * res_in) as f64;
        if value.log2().floor() == value.log2().ceil() {
            break;
        }
        h += 1;
        if h > 100 * initial_h {
            tracing::warn!("could not resize block to a dyadic size, using initial size");
            return Size::new(initial_h, initial_w);
        }
    }

    loop {
        let value = (w + padding_size.col) as f64 * res_in as f64;
        if value.log2().floor() == value.log2().ceil() {
            break;
        }
        w += 1;
        if w > 100 * initial_w {
            tracing::warn!("could not resize block to a dyadic size, using initial size");
            return Size::new(initial_h, initial_w);
        }
    }

    Size::new(h, w)
}

/// Grows `size` so that both dimensions, scaled by `zoom_ratio`, land on an
/// exact integer number of output cells, falling back to the original size
/// (with a warning) past the 100x growth bound.
pub fn generate_zoom_compliant_size(size: Size, zoom_ratio: ZoomRatio) -> Size {
    let mut h = size.row;
    let mut w = size.col;
    let initial_h = size.row;
    let initial_w = size.col;
    let input_resolution = zoom_ratio.input_resolution() as f64;
    let output_resolution = zoom_ratio.output_resolution() as f64;

    loop {
        let value = h as f64 * input_resolution / output_resolution;
        if value.floor() == value.ceil() {
            break;
        }
        h += 1;
        if h > 100 * initial_h {
            tracing::warn!(
                ratio = zoom_ratio.ratio(),
                "could not resize block to comply with zoom ratio, output may contain disjoint blocks"
            );
            return Size::new(initial_h, initial_w);
        }
    }

    loop {
        let value = w as f64 * input_resolution / output_resolution;
        if value.floor() == value.ceil() {
            break;
        }
        w += 1;
        if w > 100 * initial_w {
            tracing::warn!(
                ratio = zoom_ratio.ratio(),
                "could not resize block to comply with zoom ratio, output may contain disjoint blocks"
            );
            return Size::new(initial_h, initial_w);
        }
    }

    Size::new(h, w)
}

/// FFT sample frequencies for a DFT of length `n_samples`, matching
/// `numpy.fft.fftfreq`/`rfftfreq` semantics. When `half` is true, only the
/// non-negative half of the spectrum is returned (suitable for the
/// real-to-complex transform's frequency axis); otherwise both halves are
/// returned, negative frequencies last.
pub fn compute_fft_freq(n_samples: i32, half: bool) -> Vec<f64> {
    let n = n_samples as f64;
    let mut freq = Vec::new();

    if n_samples % 2 != 0 {
        for i in 0..(n_samples + 1) / 2 {
            freq.push(i as f64 / n);
        }
        if !half {
            for i in 0..n_samples / 2 {
                freq.push(-((n_samples / 2 - i) as f64) / n);
            }
        }
    } else {
        let half_n = n_samples / 2;
        if half {
            // The real-FFT half-plane has `half_n + 1` bins: the Nyquist
            // bin (`half_n / n`) is its own positive entry here, unlike the
            // full-spectrum case below where it folds into the negative half.
            for i in 0..=half_n {
                freq.push(i as f64 / n);
            }
        } else {
            for i in 0..half_n {
                freq.push(i as f64 / n);
            }
            for i in 0..half_n {
                freq.push(-((half_n - i) as f64) / n);
            }
        }
    }

    freq
}

/// Builds the flattened `(x, y)` coordinate pairs of the half-open
/// rectangle `[x_min, x_max) x [y_min, y_max)`, in row-major scan order.
/// Kept for parity with the reference utility; the three-pass rotator
/// constructs its own per-pass coordinate ranges directly instead of
/// materializing a full meshgrid.
pub fn create_meshgrid(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> (Vec<i32>, Vec<i32>) {
    let mut xx = Vec::new();
    let mut yy = Vec::new();
    for i in x_min..x_max {
        for j in y_min..y_max {
            xx.push(j);
            yy.push(i);
        }
    }
    (xx, yy)
}

pub use freqxform_core::gcd;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_roundtrip_even_size() {
        let size = Size::new(4, 4);
        let data: Vec<f64> = (0..16).map(|v| v as f64).collect();
        let shifted = fft_shift_2d(&data, size);
        let restored = ifft_shift_2d(&shifted, size);
        assert_eq!(restored, data);
    }

    #[test]
    fn shift_roundtrip_odd_size() {
        let size = Size::new(5, 3);
        let data: Vec<f64> = (0..15).map(|v| v as f64).collect();
        let shifted = fft_shift_2d(&data, size);
        let restored = ifft_shift_2d(&shifted, size);
        assert_eq!(restored, data);
    }

    #[test]
    fn uncentered_shift_roundtrip() {
        let size = Size::new(6, 8);
        let hot_point = Point::new(3, 2);
        let data: Vec<f64> = (0..48).map(|v| v as f64).collect();
        let shifted = fft_shift_2d_uncentered(&data, size, hot_point);
        let restored = ifft_shift_2d_uncentered(&shifted, size, hot_point);
        assert_eq!(restored, data);
    }

    #[test]
    fn fft_freq_even_half() {
        let freq = compute_fft_freq(4, true);
        assert_eq!(freq, vec![0.0, 0.25, 0.5]);
    }

    #[test]
    fn fft_freq_even_full() {
        let freq = compute_fft_freq(4, false);
        assert_eq!(freq, vec![0.0, 0.25, -0.5, -0.25]);
    }

    #[test]
    fn fft_freq_odd_full() {
        let freq = compute_fft_freq(5, false);
        assert_eq!(freq, vec![0.0, 0.2, 0.4, -0.4, -0.2]);
    }

    #[test]
    fn dyadic_size_grows_to_power_of_two() {
        let size = generate_dyadic_size(Size::new(5, 5), 1, Size::new(0, 0));
        assert_eq!(size, Size::new(8, 8));
    }

    #[test]
    fn zoom_compliant_size_respects_ratio() {
        let ratio = ZoomRatio::new(3, 2).unwrap();
        let size = generate_zoom_compliant_size(Size::new(5, 5), ratio);
        assert_eq!(size.row % 2, 0);
        assert_eq!(size.col % 2, 0);
    }

    #[test]
    fn meshgrid_enumerates_rectangle() {
        let (xx, yy) = create_meshgrid(0, 2, 0, 3);
        assert_eq!(xx.len(), 6);
        assert_eq!(yy.len(), 6);
        assert_eq!((xx[0], yy[0]), (0, 0));
        assert_eq!((xx[5], yy[5]), (2, 1));
    }
}
