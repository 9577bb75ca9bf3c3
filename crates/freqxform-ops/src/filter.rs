//! Frequency-domain filter: construction, spatial-domain centering,
//! polyphase normalization and the per-image-size FFT cache.
//!
//! Grounded on `filter.h`/`filter.cc`: the three construction paths
//! (`CreateZoomOutFilter`/`CreateZoomInFilter`/`CreateRealZoomFilter`), the
//! `kCacheSize = 10` per-filter FFT cache, and `Process`'s complex multiply.

use std::sync::Arc;

use freqxform_core::{Error, Image, Padding, PaddingKind, Point, Result, Size, ZoomRatio};
use freqxform_dsp::{numerics, FftWrapper, LruCache, Spectrum};

const FILTER_FFT_CACHE_CAPACITY: usize = 10;

/// Sentinel hot point meaning "the filter is already centered".
pub const DEFAULT_HOT_POINT: Point = Point::new(-1, -1);

/// A spatial-domain filter kernel adapted to a zoom ratio, with its own
/// per-image-size FFT cache.
pub struct Filter {
    image: Image,
    padding_size: Size,
    zoom_ratio: ZoomRatio,
    padding_kind: PaddingKind,
    hot_point: Point,
    fft_cache: LruCache<Size, Arc<Spectrum>>,
}

impl Filter {
    /// Builds a filter adapted to `zoom_ratio`.
    ///
    /// `hot_point` must lie in `[-1, cols) x [-1, rows)`; `(-1, -1)` means
    /// the filter is already centered. If `normalize`, the filter's
    /// polyphase sub-filters are normalized first, with `oversampling =
    /// zoom_ratio.input_resolution()`.
    pub fn create(
        image: Image,
        zoom_ratio: ZoomRatio,
        hot_point: Point,
        padding_kind: PaddingKind,
        normalize: bool,
        fft: &FftWrapper,
    ) -> Result<Self> {
        if hot_point.x < -1
            || hot_point.x >= image.size.col
            || hot_point.y < -1
            || hot_point.y >= image.size.row
        {
            return Err(Error::invalid_input(format!(
                "invalid filter hot point ({}, {})",
                hot_point.x, hot_point.y
            )));
        }

        let mut image = image;
        if normalize {
            normalize_filter_image(&mut image, zoom_ratio.input_resolution());
        }

        tracing::info!(rows = image.size.row, cols = image.size.col, "input filter size");

        if zoom_ratio.ratio() <= 1.0 {
            Self::create_zoom_out(image, zoom_ratio, hot_point, padding_kind)
        } else if !zoom_ratio.is_real_zoom() {
            Self::create_zoom_in(image, zoom_ratio, hot_point, padding_kind)
        } else {
            Self::create_real_zoom(image, zoom_ratio, hot_point, padding_kind, fft)
        }
    }

    fn new(
        image: Image,
        padding_size: Size,
        zoom_ratio: ZoomRatio,
        padding_kind: PaddingKind,
        hot_point: Point,
    ) -> Self {
        tracing::info!(
            rows = image.size.row,
            cols = image.size.col,
            padding_row = padding_size.row,
            padding_col = padding_size.col,
            "filter constructed"
        );
        Self {
            image,
            padding_size,
            zoom_ratio,
            padding_kind,
            hot_point,
            fft_cache: LruCache::new(FILTER_FFT_CACHE_CAPACITY),
        }
    }

    fn create_zoom_out(
        mut image: Image,
        zoom_ratio: ZoomRatio,
        hot_point: Point,
        padding_kind: PaddingKind,
    ) -> Result<Self> {
        if hot_point != DEFAULT_HOT_POINT {
            image = center_filter_image(&image, hot_point);
        }
        let padding_row = if image.size.row % 2 == 0 {
            image.size.row / 2
        } else {
            (image.size.row - 1) / 2
        };
        let padding_col = if image.size.col % 2 == 0 {
            image.size.col / 2
        } else {
            (image.size.col - 1) / 2
        };
        Ok(Self::new(
            image,
            Size::new(padding_row, padding_col),
            zoom_ratio,
            padding_kind,
            hot_point,
        ))
    }

    fn create_zoom_in(
        mut image: Image,
        zoom_ratio: ZoomRatio,
        hot_point: Point,
        padding_kind: PaddingKind,
    ) -> Result<Self> {
        if hot_point != DEFAULT_HOT_POINT {
            image = center_filter_image(&image, hot_point);
        }
        let factor = zoom_ratio.output_resolution() as f64 / zoom_ratio.input_resolution() as f64;
        let padding_row = if image.size.row % 2 == 0 {
            (image.size.row as f64 / 2.0 * factor) as i32
        } else {
            ((image.size.row - 1) as f64 / 2.0 * factor) as i32
        };
        let padding_col = if image.size.col % 2 == 0 {
            (image.size.col as f64 / 2.0 * factor) as i32
        } else {
            ((image.size.col - 1) as f64 / 2.0 * factor) as i32
        };
        Ok(Self::new(
            image,
            Size::new(padding_row, padding_col),
            zoom_ratio,
            padding_kind,
            hot_point,
        ))
    }

    fn create_real_zoom(
        mut image: Image,
        zoom_ratio: ZoomRatio,
        hot_point: Point,
        padding_kind: PaddingKind,
        fft: &FftWrapper,
    ) -> Result<Self> {
        if hot_point != DEFAULT_HOT_POINT {
            image = center_filter_image(&image, hot_point);
        }
        image = zoom_filter_to_input_resolution(&image, zoom_ratio, fft)?;

        let factor = 1.0 / zoom_ratio.input_resolution() as f64;
        let padding_row = if image.size.row % 2 == 0 {
            (image.size.row as f64 / 2.0 * factor) as i32
        } else {
            ((image.size.row - 1) as f64 / 2.0 * factor) as i32
        };
        let padding_col = if image.size.col % 2 == 0 {
            (image.size.col as f64 / 2.0 * factor) as i32
        } else {
            ((image.size.col - 1) as f64 / 2.0 * factor) as i32
        };
        Ok(Self::new(
            image,
            Size::new(padding_row, padding_col),
            zoom_ratio,
            padding_kind,
            hot_point,
        ))
    }

    pub fn size(&self) -> Size {
        self.image.size
    }

    pub fn padding_size(&self) -> Size {
        self.padding_size
    }

    pub fn padding_kind(&self) -> PaddingKind {
        self.padding_kind
    }

    pub fn padding(&self) -> Padding {
        Padding::new(
            self.padding_size.row,
            self.padding_size.row,
            self.padding_size.col,
            self.padding_size.col,
            self.padding_kind,
        )
    }

    pub fn hot_point(&self) -> Point {
        self.hot_point
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_loaded()
    }

    /// Applies the filter to an image's half-plane spectrum, fetching (or
    /// building and caching) the filter's own FFT at `image_size` first.
    pub fn process(&self, image_size: Size, mut image_fft: Spectrum, fft: &FftWrapper) -> Result<Spectrum> {
        if !self.is_loaded() {
            return Ok(image_fft);
        }
        if image_size.row < self.image.size.row || image_size.col < self.image.size.col {
            return Err(Error::filter_too_large(
                (self.image.size.row, self.image.size.col),
                (image_size.row, image_size.col),
            ));
        }

        let filter_fft = match self.fft_cache.get(&image_size) {
            Some(cached) => cached,
            None => {
                tracing::trace!(rows = image_size.row, cols = image_size.col, "cache filter fft");
                let built = Arc::new(self.create_filter_fft(image_size, fft)?);
                self.fft_cache.insert(image_size, built.clone());
                built
            }
        };

        tracing::trace!(
            filter_rows = self.image.size.row,
            filter_cols = self.image.size.col,
            image_rows = image_size.row,
            image_cols = image_size.col,
            "apply filter on image fft"
        );
        for (image_bin, filter_bin) in image_fft.data.iter_mut().zip(filter_fft.data.iter()) {
            let real = filter_bin.re * image_bin.re - filter_bin.im * image_bin.im;
            let imag = filter_bin.re * image_bin.im + filter_bin.im * image_bin.re;
            image_bin.re = real;
            image_bin.im = imag;
        }

        Ok(image_fft)
    }

    fn create_filter_fft(&self, image_size: Size, fft: &FftWrapper) -> Result<Spectrum> {
        let mut values = vec![0.0_f64; image_size.cell_count().max(0) as usize];
        let lower_row = image_size.row / 2 - (self.image.size.row - 1) / 2;
        let upper_row = image_size.row / 2 + (self.image.size.row - 1) / 2;
        let lower_col = image_size.col / 2 - (self.image.size.col - 1) / 2;
        let upper_col = image_size.col / 2 + (self.image.size.col - 1) / 2;

        for row in lower_row..=upper_row {
            for col in lower_col..=upper_col {
                values[(row * image_size.col + col) as usize] =
                    self.image.get(row - lower_row, col - lower_col);
            }
        }

        let shifted = numerics::ifft_shift_2d(&values, image_size);
        let padded = Image::from_buffer(image_size, shifted)?;
        fft.forward_2d(&padded)
    }
}

/// Treats the filter as `k x k` interleaved polyphase sub-filters (sub-filter
/// `(i, j)` sampled at `(i + m*k, j + n*k)`) and divides each sample by
/// `k^2 * sum(sub-filter)`.
fn normalize_filter_image(filter_image: &mut Image, oversampling: i32) {
    if oversampling <= 0 {
        return;
    }
    tracing::trace!(oversampling, "normalize zoomed filter");
    let size = filter_image.size;
    for i in 0..oversampling {
        for j in 0..oversampling {
            let mut sum = 0.0;
            let mut row = i;
            while row < size.row {
                let mut col = j;
                while col < size.col {
                    sum += filter_image.get(row, col);
                    col += oversampling;
                }
                row += oversampling;
            }

            let divisor = (oversampling * oversampling) as f64 * sum;
            if divisor == 0.0 {
                continue;
            }
            let mut row = i;
            while row < size.row {
                let mut col = j;
                while col < size.col {
                    let v = filter_image.get(row, col) / divisor;
                    filter_image.set(row, col, v);
                    col += oversampling;
                }
                row += oversampling;
            }
        }
    }
}

/// Brings `hot_point` to the image center: uncentered-ifftshift puts it at
/// the origin, then a centered-fftshift puts it at the midpoint.
fn center_filter_image(filter_image: &Image, hot_point: Point) -> Image {
    tracing::trace!("center filter image");
    let shifted = numerics::ifft_shift_2d_uncentered(&filter_image.data, filter_image.size, hot_point);
    let centered = numerics::fft_shift_2d(&shifted, filter_image.size);
    Image::from_buffer(filter_image.size, centered).expect("shift preserves buffer length")
}

/// Resamples the filter itself to the input resolution ahead of a
/// non-integer ("real") zoom, using the regular decomposition (identity) and
/// zero-padding strategy directly, since that composition is exactly what
/// `Decomposition::Regular` reduces to.
fn zoom_filter_to_input_resolution(
    filter_image: &Image,
    zoom_ratio: ZoomRatio,
    fft: &FftWrapper,
) -> Result<Image> {
    tracing::trace!("zoom filter to input resolution");
    let shifted = numerics::ifft_shift_2d(&filter_image.data, filter_image.size);
    let shifted_image = Image::from_buffer(filter_image.size, shifted)?;

    let spectrum = fft.forward_2d(&shifted_image)?;
    let zoomed_spectrum =
        crate::upsampling::zero_pad_upsample(&spectrum, zoom_ratio.output_resolution());
    let mut zoomed = fft.inverse_2d(&zoomed_spectrum)?;
    // `inverse_2d` normalizes by the zoomed cell count; the reference
    // resampler normalizes by the pre-zoom cell count instead, so rescale.
    let rescale = zoomed.cell_count() as f64 / shifted_image.cell_count() as f64;
    for v in zoomed.data.iter_mut() {
        *v *= rescale;
    }

    let unshifted = numerics::fft_shift_2d(&zoomed.data, zoomed.size);
    let mut unshifted_zoomed = Image::from_buffer(zoomed.size, unshifted)?;
    normalize_filter_image(&mut unshifted_zoomed, zoom_ratio.input_resolution());

    Ok(unshifted_zoomed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unloaded_filter_is_passthrough() {
        let fft = FftWrapper::new();
        let filter = Filter::create(
            Image::new(Size::new(0, 0)),
            ZoomRatio::new(1, 1).unwrap(),
            DEFAULT_HOT_POINT,
            PaddingKind::Mirror,
            false,
            &fft,
        )
        .unwrap();
        assert!(!filter.is_loaded());

        let image = Image::from_buffer(Size::new(4, 4), vec![1.0; 16]).unwrap();
        let spectrum = fft.forward_2d(&image).unwrap();
        let result = filter.process(image.size, spectrum.clone(), &fft).unwrap();
        assert_eq!(result.data, spectrum.data);
    }

    #[test]
    fn rejects_out_of_range_hot_point() {
        let fft = FftWrapper::new();
        let image = Image::new(Size::new(4, 4));
        let err = Filter::create(
            image,
            ZoomRatio::new(1, 1).unwrap(),
            Point::new(10, 10),
            PaddingKind::Mirror,
            false,
            &fft,
        );
        assert!(err.is_err());
    }

    #[test]
    fn dirac_filter_is_identity() {
        let fft = FftWrapper::new();
        let mut dirac = Image::new(Size::new(3, 3));
        dirac.set(1, 1, 1.0);
        let filter = Filter::create(
            dirac,
            ZoomRatio::new(1, 1).unwrap(),
            DEFAULT_HOT_POINT,
            PaddingKind::Mirror,
            false,
            &fft,
        )
        .unwrap();

        let image = Image::from_buffer(Size::new(8, 8), (0..64).map(|v| v as f64).collect()).unwrap();
        let spectrum = fft.forward_2d(&image).unwrap();
        let filtered = filter.process(image.size, spectrum, &fft).unwrap();
        let restored = fft.inverse_2d(&filtered).unwrap();

        for (a, b) in image.data.iter().zip(restored.data.iter()) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn too_large_filter_is_rejected() {
        let fft = FftWrapper::new();
        let big = Image::new(Size::new(32, 32));
        let filter = Filter::create(
            big,
            ZoomRatio::new(1, 1).unwrap(),
            DEFAULT_HOT_POINT,
            PaddingKind::Mirror,
            false,
            &fft,
        )
        .unwrap();

        let small = Image::new(Size::new(8, 8));
        let spectrum = fft.forward_2d(&small).unwrap();
        let err = filter.process(small.size, spectrum, &fft);
        assert!(err.is_err());
    }
}
