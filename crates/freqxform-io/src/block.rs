//! [`StreamBlock`]: a margin-padded raster tile plus its position in the
//! source image.
//!
//! Grounded on `original_source/src/sirius/gdal/stream_block.h`. The
//! reference keeps the block copyable as well as movable; a stream block
//! here only needs to move between the reader, worker and writer threads,
//! so it is move-only the way [`freqxform_core::Image`] already is (no
//! `Clone` derive).

use freqxform_core::{Image, Padding};

/// A tile read from a source raster, carrying enough position/margin
/// bookkeeping to be written back at the right place once transformed.
#[derive(Debug, Default)]
pub struct StreamBlock {
    /// Pixel buffer: the block's own content plus any margin the reader
    /// attached (real neighboring pixels, or synthesized padding at image
    /// edges).
    pub buffer: Image,
    /// Row index of this block's top-left corner in the source raster.
    pub row_idx: i32,
    /// Column index of this block's top-left corner in the source raster.
    pub col_idx: i32,
    /// Margin carried by `buffer` beyond the block's own content, and how
    /// an edge margin (if any) was synthesized.
    pub padding: Padding,
    /// False for a default-constructed sentinel block (e.g. the value
    /// dropped by a failed queue operation); true once a reader has
    /// populated it.
    pub is_initialized: bool,
}

impl StreamBlock {
    /// Builds an initialized block.
    pub fn new(buffer: Image, row_idx: i32, col_idx: i32, padding: Padding) -> Self {
        Self {
            buffer,
            row_idx,
            col_idx,
            padding,
            is_initialized: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use freqxform_core::{PaddingKind, Size};

    #[test]
    fn default_block_is_not_initialized() {
        let block = StreamBlock::default();
        assert!(!block.is_initialized);
        assert_eq!(block.buffer.size, Size::default());
    }

    #[test]
    fn new_block_is_initialized_and_carries_position() {
        let image = Image::new(Size::new(4, 4));
        let block = StreamBlock::new(image, 10, 20, Padding::new(1, 1, 1, 1, PaddingKind::Zero));
        assert!(block.is_initialized);
        assert_eq!((block.row_idx, block.col_idx), (10, 20));
        assert!(!block.padding.is_empty());
    }
}
