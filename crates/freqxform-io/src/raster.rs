//! Raster source/sink traits and geo-reference transform math.
//!
//! The GeoTIFF backend itself is out of scope (spec.md §1); this module
//! specifies only the interfaces the streaming pipeline consumes, grounded
//! on `original_source/src/sirius/gdal/wrapper.h`'s `GeoReference` and the
//! `InputStream`/`OutputStream`/`OutputZoomedStream` read/write contracts,
//! plus `ComputeResampledGeoTransform`/`ComputeShiftedGeoReference` for the
//! affine-transform math.

use freqxform_core::{Error, Result, Size, ZoomRatio};

/// A GDAL-style affine geo-transform (`[origin_x, pixel_width, row_rot,
/// origin_y, col_rot, pixel_height]`) plus an opaque projection string.
///
/// Passed through the pipeline without interpretation; only the resampling/
/// translation math below touches `geo_transform`'s six coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoReference {
    pub geo_transform: [f64; 6],
    pub projection_ref: String,
    pub is_initialized: bool,
}

impl Default for GeoReference {
    fn default() -> Self {
        Self {
            geo_transform: [0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
            projection_ref: String::new(),
            is_initialized: false,
        }
    }
}

impl GeoReference {
    /// Builds an initialized geo-reference from an explicit transform and
    /// projection string.
    pub fn new(geo_transform: [f64; 6], projection_ref: impl Into<String>) -> Self {
        Self {
            geo_transform,
            projection_ref: projection_ref.into(),
            is_initialized: true,
        }
    }
}

/// Computes the geo-reference of a resampled raster: shifts the origin to
/// the center of the input's top-left pixel, scales the pixel size by
/// `output_resolution / input_resolution`, then shifts the origin back to
/// the top-left corner of the (now differently sized) output pixel.
pub fn resampled_geo_reference(input: &GeoReference, zoom_ratio: ZoomRatio) -> GeoReference {
    if !input.is_initialized {
        return input.clone();
    }
    let mut gt = input.geo_transform;
    let factor = zoom_ratio.output_resolution() as f64 / zoom_ratio.input_resolution() as f64;

    gt[0] += 0.5 * gt[1];
    gt[3] += 0.5 * gt[5];

    gt[1] *= factor;
    gt[5] *= factor;

    gt[0] -= 0.5 * gt[1];
    gt[3] -= 0.5 * gt[5];

    GeoReference::new(gt, input.projection_ref.clone())
}

/// Computes the geo-reference of a translated raster: the origin shifts by
/// `(row_shift * pixel_row_size, col_shift * pixel_col_size)`.
pub fn translated_geo_reference(input: &GeoReference, row_shift: f64, col_shift: f64) -> GeoReference {
    if !input.is_initialized {
        return input.clone();
    }
    let mut gt = input.geo_transform;
    if gt[0] != 0.0 && gt[3] != 0.0 {
        gt[0] += row_shift * gt[1];
        gt[3] += col_shift * gt[5];
    }
    GeoReference::new(gt, input.projection_ref.clone())
}

/// The output size of a resampled raster: each dimension scaled by the
/// zoom ratio and rounded up.
pub fn resampled_size(input: Size, zoom_ratio: ZoomRatio) -> Size {
    input.scale_by_f64(zoom_ratio.ratio())
}

/// A single-band raster the pipeline reads tiles from.
///
/// Implementations may back onto a file, a virtual raster, or (for tests)
/// an in-memory buffer. `read` may be called from the single reader thread
/// only; the trait does not need to be `Sync`, but it is `Send` so the
/// pipeline can hand it to that thread.
pub trait RasterSource: Send {
    /// Full raster dimensions.
    fn size(&self) -> Size;

    /// Reads the `h x w` rectangle with its top-left corner at `(row0,
    /// col0)`, row-major. The rectangle must lie entirely within
    /// [`size`](Self::size); out-of-bounds reads return
    /// [`Error::InvalidInput`].
    fn read(&mut self, row0: i32, col0: i32, h: i32, w: i32) -> Result<Vec<f64>>;

    /// This source's geo-reference, if any.
    fn geo_reference(&self) -> GeoReference {
        GeoReference::default()
    }
}

/// A single-band raster the pipeline writes tiles to.
///
/// `create` is called once, before any `write`, to fix the output's final
/// dimensions and geo-reference. Implementations may write tiles in any
/// order — the pipeline guarantees each output pixel is written exactly
/// once.
pub trait RasterSink: Send {
    /// Allocates the output raster.
    fn create(&mut self, size: Size, geo_reference: GeoReference) -> Result<()>;

    /// Writes the `h x w` buffer with its top-left corner at `(row0,
    /// col0)`.
    fn write(&mut self, row0: i32, col0: i32, h: i32, w: i32, buffer: &[f64]) -> Result<()>;
}

/// An in-memory [`RasterSource`]/[`RasterSink`] pair, used by the CLI's
/// flat-raster front-end and by the streaming pipeline's own tests. Not a
/// GeoTIFF backend (out of scope per spec.md §1) — just enough storage to
/// exercise the pipeline without a real file format.
#[derive(Debug, Clone, Default)]
pub struct MemoryRaster {
    pub size: Size,
    pub data: Vec<f64>,
    pub geo_reference: GeoReference,
}

impl MemoryRaster {
    pub fn new(size: Size, data: Vec<f64>) -> Result<Self> {
        if data.len() != size.cell_count() as usize {
            return Err(Error::invalid_input(format!(
                "buffer length {} does not match size {}x{}",
                data.len(),
                size.row,
                size.col
            )));
        }
        Ok(Self {
            size,
            data,
            geo_reference: GeoReference::default(),
        })
    }

    pub fn with_geo_reference(mut self, geo_reference: GeoReference) -> Self {
        self.geo_reference = geo_reference;
        self
    }

    fn check_bounds(&self, row0: i32, col0: i32, h: i32, w: i32) -> Result<()> {
        if row0 < 0 || col0 < 0 || row0 + h > self.size.row || col0 + w > self.size.col {
            return Err(Error::invalid_input(format!(
                "region ({row0},{col0},{h}x{w}) out of bounds for raster {}x{}",
                self.size.row, self.size.col
            )));
        }
        Ok(())
    }
}

impl RasterSource for MemoryRaster {
    fn size(&self) -> Size {
        self.size
    }

    fn read(&mut self, row0: i32, col0: i32, h: i32, w: i32) -> Result<Vec<f64>> {
        self.check_bounds(row0, col0, h, w)?;
        let mut out = Vec::with_capacity((h * w) as usize);
        for r in 0..h {
            let start = ((row0 + r) * self.size.col + col0) as usize;
            out.extend_from_slice(&self.data[start..start + w as usize]);
        }
        Ok(out)
    }

    fn geo_reference(&self) -> GeoReference {
        self.geo_reference.clone()
    }
}

impl RasterSink for MemoryRaster {
    fn create(&mut self, size: Size, geo_reference: GeoReference) -> Result<()> {
        self.size = size;
        self.data = vec![0.0; size.cell_count().max(0) as usize];
        self.geo_reference = geo_reference;
        Ok(())
    }

    fn write(&mut self, row0: i32, col0: i32, h: i32, w: i32, buffer: &[f64]) -> Result<()> {
        self.check_bounds(row0, col0, h, w)?;
        for r in 0..h {
            let start = ((row0 + r) * self.size.col + col0) as usize;
            let src_start = (r * w) as usize;
            self.data[start..start + w as usize]
                .copy_from_slice(&buffer[src_start..src_start + w as usize]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resampled_geo_reference_halves_pixel_size_for_2x_zoom() {
        let input = GeoReference::new([100.0, 2.0, 0.0, 200.0, 0.0, -2.0], "EPSG:4326");
        let zoom = ZoomRatio::new(2, 1).unwrap();
        let out = resampled_geo_reference(&input, zoom);
        assert!((out.geo_transform[1] - 1.0).abs() < 1e-9);
        assert!((out.geo_transform[5] - (-1.0)).abs() < 1e-9);
    }

    #[test]
    fn resampled_geo_reference_is_noop_when_uninitialized() {
        let input = GeoReference::default();
        let out = resampled_geo_reference(&input, ZoomRatio::new(2, 1).unwrap());
        assert!(!out.is_initialized);
    }

    #[test]
    fn translated_geo_reference_shifts_origin() {
        let input = GeoReference::new([100.0, 2.0, 0.0, 200.0, 0.0, -2.0], "EPSG:4326");
        let out = translated_geo_reference(&input, 1.5, -2.0);
        assert!((out.geo_transform[0] - 103.0).abs() < 1e-9);
        assert!((out.geo_transform[3] - 204.0).abs() < 1e-9);
    }

    #[test]
    fn resampled_size_rounds_up() {
        let size = resampled_size(Size::new(5, 5), ZoomRatio::new(3, 2).unwrap());
        assert_eq!(size, Size::new(8, 8));
    }

    #[test]
    fn memory_raster_roundtrips_region() {
        let data: Vec<f64> = (0..16).map(|v| v as f64).collect();
        let mut raster = MemoryRaster::new(Size::new(4, 4), data).unwrap();
        let region = raster.read(1, 1, 2, 2).unwrap();
        assert_eq!(region, vec![5.0, 6.0, 9.0, 10.0]);

        raster.write(0, 0, 2, 2, &[100.0, 101.0, 102.0, 103.0]).unwrap();
        assert_eq!(raster.read(0, 0, 2, 2).unwrap(), vec![100.0, 101.0, 102.0, 103.0]);
    }

    #[test]
    fn memory_raster_rejects_out_of_bounds_read() {
        let mut raster = MemoryRaster::new(Size::new(2, 2), vec![0.0; 4]).unwrap();
        assert!(raster.read(1, 1, 2, 2).is_err());
    }
}
