//! [`Image`]: a row-major `f64` raster plus its [`Size`].
//!
//! # Coordinate system
//!
//! Cell `(row, col)` lives at `data[row * size.col + col]`, matching the
//! layout `freqxform-dsp`'s FFT wrapper expects for its row-then-column
//! separable transform.
//!
//! # Dependencies
//!
//! [`crate::size::Size`], [`crate::padding::Padding`].
//!
//! # Used By
//!
//! Every compute entry point in `freqxform-ops` and the block pipeline in
//! `freqxform-io`.

use crate::error::{Error, Result};
use crate::padding::{Padding, PaddingKind};
use crate::size::Size;

/// A row-major single-band raster backed by a flat `Vec<f64>`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Image {
    pub size: Size,
    pub data: Vec<f64>,
}

impl Image {
    /// Allocates a zero-filled image of the given size.
    pub fn new(size: Size) -> Self {
        Self {
            size,
            data: vec![0.0; size.cell_count().max(0) as usize],
        }
    }

    /// Wraps an existing buffer, checking it matches `size`.
    pub fn from_buffer(size: Size, data: Vec<f64>) -> Result<Self> {
        if data.len() != size.cell_count() as usize {
            return Err(Error::invalid_input(format!(
                "buffer length {} does not match size {}x{}",
                data.len(),
                size.row,
                size.col
            )));
        }
        Ok(Self { size, data })
    }

    /// Total number of cells (`row * col`).
    pub const fn cell_count(&self) -> i32 {
        self.size.cell_count()
    }

    /// Reads the value at `(row, col)`. Row and col start at 0.
    #[inline]
    pub fn get(&self, row: i32, col: i32) -> f64 {
        debug_assert!(row < self.size.row && col < self.size.col);
        self.data[(row * self.size.col + col) as usize]
    }

    /// Writes the value at `(row, col)`. Row and col start at 0.
    #[inline]
    pub fn set(&mut self, row: i32, col: i32, val: f64) {
        debug_assert!(row < self.size.row && col < self.size.col);
        self.data[(row * self.size.col + col) as usize] = val;
    }

    /// True when the image's row/col are non-zero and the buffer is large
    /// enough to back them.
    pub fn is_loaded(&self) -> bool {
        self.size.row != 0 && self.size.col != 0 && self.data.len() >= self.cell_count() as usize
    }

    /// Creates a padded image according to `padding.kind`.
    pub fn padded(&self, padding: &Padding) -> Image {
        if padding.is_empty() {
            return self.clone();
        }
        match padding.kind {
            PaddingKind::Zero => self.zero_padded(padding),
            PaddingKind::Mirror => self.mirror_padded(padding),
        }
    }

    /// Pads with zero-filled margins.
    pub fn zero_padded(&self, padding: &Padding) -> Image {
        tracing::trace!(
            rows = self.size.row,
            cols = self.size.col,
            top = padding.top,
            bottom = padding.bottom,
            left = padding.left,
            right = padding.right,
            "zero padding image"
        );
        let row_count = self.size.row + padding.top + padding.bottom;
        let col_count = self.size.col + padding.left + padding.right;
        let mut result = Image::new(Size::new(row_count, col_count));

        let top_offset = col_count * padding.top;
        for row in 0..self.size.row {
            let dst_start = (top_offset + row * col_count + padding.left) as usize;
            let src_start = (row * self.size.col) as usize;
            let src_end = src_start + self.size.col as usize;
            result.data[dst_start..dst_start + self.size.col as usize]
                .copy_from_slice(&self.data[src_start..src_end]);
        }

        result
    }

    /// Pads by mirroring the border rows/cols.
    pub fn mirror_padded(&self, padding: &Padding) -> Image {
        tracing::trace!(
            rows = self.size.row,
            cols = self.size.col,
            top = padding.top,
            bottom = padding.bottom,
            left = padding.left,
            right = padding.right,
            "mirror padding image"
        );
        let row_count = self.size.row + padding.top + padding.bottom;
        let col_count = self.size.col + padding.left + padding.right;
        let mut result = Image::new(Size::new(row_count, col_count));

        // top mirroring
        for i in 0..padding.top {
            let dst_start = (i * col_count + padding.left) as usize;
            let src_start = ((padding.top - 1 - i) * self.size.col) as usize;
            result.data[dst_start..dst_start + self.size.col as usize]
                .copy_from_slice(&self.data[src_start..src_start + self.size.col as usize]);
        }

        // original image
        let top_offset = col_count * padding.top;
        for row in 0..self.size.row {
            let dst_start = (top_offset + row * col_count + padding.left) as usize;
            let src_start = (row * self.size.col) as usize;
            result.data[dst_start..dst_start + self.size.col as usize]
                .copy_from_slice(&self.data[src_start..src_start + self.size.col as usize]);
        }

        // bottom mirroring
        let bottom_offset = row_count * col_count - padding.bottom * col_count;
        let end_data = self.size.col * self.size.row;
        for row in 0..padding.bottom {
            let dst_start = (bottom_offset + padding.left + row * col_count) as usize;
            let src_start = (end_data - (row + 1) * self.size.col) as usize;
            result.data[dst_start..dst_start + self.size.col as usize]
                .copy_from_slice(&self.data[src_start..src_start + self.size.col as usize]);
        }

        // left mirroring
        for row in 0..row_count {
            for col in 0..padding.left {
                result.set(row, col, result.get(row, 2 * padding.left - col - 1));
            }
        }

        // right mirroring
        for row in 0..row_count {
            for col in 0..padding.right {
                result.set(
                    row,
                    self.size.col + padding.left + col,
                    result.get(row, self.size.col + padding.left - col - 1),
                );
            }
        }

        result
    }

    /// Returns an image with even row and column counts, duplicating the
    /// last row/col when either dimension is odd. Consumes `self` and moves
    /// its buffer rather than copying it.
    pub fn even(mut self) -> Image {
        let odd_row = self.size.row % 2 != 0;
        let odd_col = self.size.col % 2 != 0;
        if !odd_row && !odd_col {
            return self;
        }

        let new_row = self.size.row + if odd_row { 1 } else { 0 };
        let new_col = self.size.col + if odd_col { 1 } else { 0 };

        let src = std::mem::take(&mut self.data);
        let mut dst = Vec::with_capacity((new_row * new_col) as usize);

        for row in 0..self.size.row {
            let start = (row * self.size.col) as usize;
            dst.extend_from_slice(&src[start..start + self.size.col as usize]);
            if odd_col {
                let last = *dst.last().unwrap();
                dst.push(last);
            }
        }

        if odd_row {
            let last_row_start = dst.len() - new_col as usize;
            let last_row: Vec<f64> = dst[last_row_start..].to_vec();
            dst.extend_from_slice(&last_row);
        }

        self.size = Size::new(new_row, new_col);
        self.data = dst;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq_image(rows: i32, cols: i32) -> Image {
        let data: Vec<f64> = (0..rows * cols).map(|v| v as f64).collect();
        Image::from_buffer(Size::new(rows, cols), data).unwrap()
    }

    #[test]
    fn new_is_zero_filled_and_loaded() {
        let img = Image::new(Size::new(2, 3));
        assert!(img.is_loaded());
        assert!(img.data.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn from_buffer_rejects_mismatched_length() {
        assert!(Image::from_buffer(Size::new(2, 2), vec![0.0; 3]).is_err());
    }

    #[test]
    fn get_set_roundtrip() {
        let mut img = Image::new(Size::new(2, 2));
        img.set(1, 0, 42.0);
        assert_eq!(img.get(1, 0), 42.0);
    }

    #[test]
    fn zero_padding_surrounds_original_with_zeros() {
        let img = seq_image(2, 2);
        let padded = img.zero_padded(&Padding::new(1, 1, 1, 1, PaddingKind::Zero));
        assert_eq!(padded.size, Size::new(4, 4));
        assert_eq!(padded.get(1, 1), 0.0);
        assert_eq!(padded.get(2, 2), 3.0);
        assert_eq!(padded.get(0, 0), 0.0);
    }

    #[test]
    fn mirror_padding_reflects_borders() {
        let img = seq_image(2, 2);
        let padded = img.mirror_padded(&Padding::new(1, 1, 1, 1, PaddingKind::Mirror));
        assert_eq!(padded.size, Size::new(4, 4));
        // center block is the original image, unchanged
        assert_eq!(padded.get(1, 1), 0.0);
        assert_eq!(padded.get(1, 2), 1.0);
        assert_eq!(padded.get(2, 1), 2.0);
        assert_eq!(padded.get(2, 2), 3.0);
    }

    #[test]
    fn padded_with_empty_padding_clones() {
        let img = seq_image(2, 2);
        let padded = img.padded(&Padding::default());
        assert_eq!(padded, img);
    }

    #[test]
    fn even_is_noop_on_already_even_image() {
        let img = seq_image(2, 4);
        let evened = img.clone().even();
        assert_eq!(evened, img);
    }

    #[test]
    fn even_duplicates_last_row_and_col_when_odd() {
        let img = seq_image(3, 3);
        let evened = img.even();
        assert_eq!(evened.size, Size::new(4, 4));
        // last real col duplicated on each original row
        assert_eq!(evened.get(0, 2), evened.get(0, 3));
        // last real row duplicated
        assert_eq!(evened.get(2, 0), evened.get(3, 0));
    }
}
