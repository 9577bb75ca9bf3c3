//! CLI command implementations

pub mod info;
pub mod resample;
pub mod rotate;
pub mod stream;
pub mod translate;

use std::path::Path;

use anyhow::{Context, Result};
use freqxform_core::{Image, Point};
use freqxform_io::{GeoReference, RasterSink, RasterSource};

use crate::flat_raster::{FlatRasterSink, FlatRasterSource};

/// Reads a whole flat-raster file into memory.
pub fn load_image(path: &Path) -> Result<(Image, GeoReference)> {
    let mut source =
        FlatRasterSource::open(path).with_context(|| format!("failed to open: {}", path.display()))?;
    let size = source.size();
    let data = source.read(0, 0, size.row, size.col)?;
    let geo = source.geo_reference();
    Ok((Image::from_buffer(size, data)?, geo))
}

/// Writes a whole image out as a flat-raster file.
pub fn save_image(path: &Path, image: &Image, geo_reference: GeoReference) -> Result<()> {
    let mut sink =
        FlatRasterSink::create_at(path).with_context(|| format!("failed to create: {}", path.display()))?;
    sink.create(image.size, geo_reference)?;
    sink.write(0, 0, image.size.row, image.size.col, &image.data)?;
    Ok(())
}

/// Reads a flat-raster file meant to be used as a filter kernel.
pub fn load_filter_image(path: &Path) -> Result<Image> {
    let (image, _) = load_image(path)?;
    Ok(image)
}

/// Parses `"x,y"` (column, row) into a filter hot point.
pub fn parse_hot_point(s: &str) -> Result<Point> {
    let (x, y) = s
        .split_once(',')
        .with_context(|| format!("invalid hot point '{s}', expected 'x,y'"))?;
    Ok(Point::new(x.trim().parse()?, y.trim().parse()?))
}
