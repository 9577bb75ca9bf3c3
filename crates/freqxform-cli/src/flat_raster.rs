//! A minimal flat-raster file format: an 8-byte `(rows: u32, cols: u32)`
//! little-endian header followed by `rows * cols` little-endian `f64`
//! samples, row-major, single band.
//!
//! A GeoTIFF (or any other real geospatial format) backend is out of scope;
//! this format exists only so the CLI has something to read and write
//! without depending on an external raster library.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use freqxform_core::{Result, Size};
use freqxform_io::{GeoReference, RasterSink, RasterSource};

const HEADER_LEN: u64 = 8;

/// A [`RasterSource`] reading blocks directly from a flat-raster file via
/// seeked reads, so the whole raster never needs to fit in memory at once.
pub struct FlatRasterSource {
    file: File,
    size: Size,
}

impl FlatRasterSource {
    pub fn open(path: &Path) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut header = [0u8; HEADER_LEN as usize];
        file.read_exact(&mut header)?;
        let rows = u32::from_le_bytes(header[0..4].try_into().unwrap()) as i32;
        let cols = u32::from_le_bytes(header[4..8].try_into().unwrap()) as i32;
        Ok(Self {
            file,
            size: Size::new(rows, cols),
        })
    }
}

impl RasterSource for FlatRasterSource {
    fn size(&self) -> Size {
        self.size
    }

    fn read(&mut self, row0: i32, col0: i32, h: i32, w: i32) -> Result<Vec<f64>> {
        let mut out = Vec::with_capacity((h * w) as usize);
        let mut row_buf = vec![0u8; w as usize * 8];
        for r in 0..h {
            let offset = HEADER_LEN + ((row0 + r) as u64 * self.size.col as u64 + col0 as u64) * 8;
            self.file.seek(SeekFrom::Start(offset))?;
            self.file.read_exact(&mut row_buf)?;
            for chunk in row_buf.chunks_exact(8) {
                out.push(f64::from_le_bytes(chunk.try_into().unwrap()));
            }
        }
        Ok(out)
    }
}

/// A [`RasterSink`] writing blocks directly into a flat-raster file.
/// [`RasterSink::create`] preallocates the file (zero-filled) at its final
/// size so writes can land at any offset in any order.
pub struct FlatRasterSink {
    file: File,
    size: Size,
}

impl FlatRasterSink {
    pub fn create_at(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            file,
            size: Size::default(),
        })
    }
}

impl RasterSink for FlatRasterSink {
    fn create(&mut self, size: Size, _geo_reference: GeoReference) -> Result<()> {
        self.size = size;
        let header = [(size.row as u32).to_le_bytes(), (size.col as u32).to_le_bytes()].concat();
        self.file.write_all(&header)?;
        self.file.set_len(HEADER_LEN + size.cell_count().max(0) as u64 * 8)?;
        Ok(())
    }

    fn write(&mut self, row0: i32, col0: i32, h: i32, w: i32, buffer: &[f64]) -> Result<()> {
        for r in 0..h {
            let offset = HEADER_LEN + ((row0 + r) as u64 * self.size.col as u64 + col0 as u64) * 8;
            self.file.seek(SeekFrom::Start(offset))?;
            let src_start = (r * w) as usize;
            for &value in &buffer[src_start..src_start + w as usize] {
                self.file.write_all(&value.to_le_bytes())?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freqxform_core::Image;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_round_trips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raster.bin");

        let size = Size::new(4, 4);
        let image = Image::from_buffer(size, (0..16).map(|v| v as f64).collect()).unwrap();

        let mut sink = FlatRasterSink::create_at(&path).unwrap();
        sink.create(size, GeoReference::default()).unwrap();
        sink.write(0, 0, size.row, size.col, &image.data).unwrap();
        drop(sink);

        let mut source = FlatRasterSource::open(&path).unwrap();
        assert_eq!(source.size(), size);
        let region = source.read(1, 1, 2, 2).unwrap();
        assert_eq!(region, vec![image.get(1, 1), image.get(1, 2), image.get(2, 1), image.get(2, 2)]);
    }
}
