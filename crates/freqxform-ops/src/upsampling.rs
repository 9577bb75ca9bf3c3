//! Spectral upsampling strategies: stretch a `R x (C/2+1)` half-plane
//! spectrum to the `zR x (zC/2+1)` spectrum of the same image zoomed by an
//! integer factor `z`.
//!
//! Grounded on `zero_padding_strategy.cc`'s `ZeroPadFFT` (the zero-padding
//! case is a direct port of its index arithmetic) and on the periodization
//! strategy's general description, generalized rather than literally ported
//! (see DESIGN.md).

use freqxform_dsp::Spectrum;
use freqxform_core::Size;
use num_complex::Complex;

/// Which spectral upsampling algorithm to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsamplingStrategy {
    /// Band-limited interpolation: high frequencies stay zero. Does not
    /// require a filter.
    ZeroPadding,
    /// Periodic tiling of the spectrum: introduces comb aliasing that a
    /// companion filter is expected to remove. Requires a filter.
    Periodization,
}

impl UpsamplingStrategy {
    pub fn requires_filter(self) -> bool {
        matches!(self, UpsamplingStrategy::Periodization)
    }

    pub fn upsample(self, spectrum: &Spectrum, zoom: i32) -> Spectrum {
        match self {
            UpsamplingStrategy::ZeroPadding => zero_pad_upsample(spectrum, zoom),
            UpsamplingStrategy::Periodization => periodization_upsample(spectrum, zoom),
        }
    }
}

/// Zero-pads the half-plane spectrum: the input's top `ceil(R/2)` rows land
/// at the top of the output, the remaining bottom rows land flush against
/// the output's bottom (preserving Hermitian wrap-around symmetry). All
/// other bins, including every column beyond the input's half-width, stay
/// zero.
pub fn zero_pad_upsample(spectrum: &Spectrum, zoom: i32) -> Spectrum {
    if zoom <= 1 {
        return spectrum.clone();
    }

    let rows = spectrum.size.row;
    let half = spectrum.half_width();
    let zoomed_rows = spectrum.size.row * zoom;
    let zoomed_cols = spectrum.size.col * zoom;
    let zoomed_half = (zoomed_cols as usize) / 2 + 1;

    let mut data = vec![Complex::new(0.0, 0.0); zoomed_rows as usize * zoomed_half];
    let half_row_count = (rows as f64 / 2.0).ceil() as i32;

    for row in 0..rows {
        let zoomed_row = if row < half_row_count {
            row
        } else {
            zoomed_rows - (rows - row)
        };
        let src_base = row as usize * half;
        let dst_base = zoomed_row as usize * zoomed_half;
        data[dst_base..dst_base + half].copy_from_slice(&spectrum.data[src_base..src_base + half]);
    }

    Spectrum {
        size: Size::new(zoomed_rows, zoomed_cols),
        data,
    }
}

/// Periodically tiles the spectrum `zoom` times along each axis. The row
/// axis (stored in full, not halved) tiles directly by index modulo `R`;
/// the half-plane column axis reconstructs the implicit negative-frequency
/// half via conjugate symmetry before tiling, since only `[0, C/2]` is
/// stored.
pub fn periodization_upsample(spectrum: &Spectrum, zoom: i32) -> Spectrum {
    if zoom <= 1 {
        return spectrum.clone();
    }

    let rows = spectrum.size.row as usize;
    let cols = spectrum.size.col as usize;
    let half = spectrum.half_width();
    let zoomed_rows = rows * zoom as usize;
    let zoomed_cols = cols * zoom as usize;
    let zoomed_half = zoomed_cols / 2 + 1;
    let nyquist = cols / 2;

    let mut data = vec![Complex::new(0.0, 0.0); zoomed_rows * zoomed_half];
    for zr in 0..zoomed_rows {
        let src_row = zr % rows;
        let row_base = src_row * half;
        for zc in 0..zoomed_half {
            let col_mod = zc % cols;
            let value = if col_mod <= nyquist {
                spectrum.data[row_base + col_mod]
            } else {
                spectrum.data[row_base + (cols - col_mod)].conj()
            };
            data[zr * zoomed_half + zc] = value;
        }
    }

    Spectrum {
        size: Size::new(zoomed_rows as i32, zoomed_cols as i32),
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freqxform_core::Image;
    use freqxform_dsp::FftWrapper;

    #[test]
    fn zero_pad_leaves_high_frequencies_zero() {
        let wrapper = FftWrapper::new();
        let image = Image::from_buffer(Size::new(4, 4), vec![1.0; 16]).unwrap();
        let spectrum = wrapper.forward_2d(&image).unwrap();
        let upsampled = zero_pad_upsample(&spectrum, 2);
        assert_eq!(upsampled.size, Size::new(8, 8));
        // a column strictly inside the newly introduced high-frequency band
        let half = upsampled.half_width();
        assert_eq!(upsampled.data[half - 1], Complex::new(0.0, 0.0));
    }

    #[test]
    fn periodization_preserves_dc_bin() {
        let wrapper = FftWrapper::new();
        let image = Image::from_buffer(Size::new(4, 4), vec![2.0; 16]).unwrap();
        let spectrum = wrapper.forward_2d(&image).unwrap();
        let upsampled = periodization_upsample(&spectrum, 3);
        assert_eq!(upsampled.data[0], spectrum.data[0]);
    }

    #[test]
    fn zoom_of_one_is_identity() {
        let wrapper = FftWrapper::new();
        let image = Image::from_buffer(Size::new(4, 4), vec![3.0; 16]).unwrap();
        let spectrum = wrapper.forward_2d(&image).unwrap();
        let same = zero_pad_upsample(&spectrum, 1);
        assert_eq!(same.data, spectrum.data);
    }
}
