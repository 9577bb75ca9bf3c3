//! Block-streaming orchestration: a reader, `N` worker threads and a
//! writer, connected by two [`ConcurrentQueue`]s.
//!
//! Grounded on `original_source/src/sirius/image_streamer.cc`'s
//! `RunMonothreadStream`/`RunMultithreadStream` for the overall shape
//! (reader lambda pushes blocks then deactivates the input queue, `N`
//! worker lambdas loop while the input queue can still be popped, a writer
//! lambda loops while the output queue can still be popped and clears it on
//! a write failure), `input_stream.cc`'s `Read` for the edge-padding-versus-
//! real-overlap margin logic, and `output_zoomed_stream.cc`'s `Write` for
//! scaling a block's output position by the zoom ratio.

use std::sync::Arc;
use std::thread;

use freqxform_core::{Error, Image, Padding, PaddingKind, Result, Size, ZoomRatio};
use freqxform_dsp::{numerics, FftWrapper};
use freqxform_ops::{resampler, rotator, translator, Decomposition, Filter, ResampleParams, UpsamplingStrategy};

use crate::block::StreamBlock;
use crate::queue::ConcurrentQueue;
use crate::raster::{resampled_geo_reference, resampled_size, translated_geo_reference, GeoReference, RasterSink, RasterSource};

/// Which frequency-domain transform the pipeline applies to every block.
///
/// Unlike [`freqxform_ops::ResampleParams`], this owns its filter (behind an
/// `Arc`, since it is shared read-only across worker threads) rather than
/// borrowing one, so an `Operation` can be moved into a [`ImageStreamer`]
/// without tying it to a filter's lifetime.
pub enum Operation {
    Resample {
        zoom_ratio: ZoomRatio,
        filter: Option<Arc<Filter>>,
        decomposition: Decomposition,
        upsampling: Option<UpsamplingStrategy>,
    },
    Translate {
        row_shift: f64,
        col_shift: f64,
    },
    /// Best-effort: each block is rotated independently about its own
    /// center and recentered back into its original footprint, which is
    /// only exact for a block whose margin fully covers the rotation hull.
    /// Adjacent blocks are not guaranteed to agree exactly along their
    /// shared edge (see DESIGN.md).
    Rotate {
        angle_degrees: f64,
    },
}

impl Operation {
    fn output_size(&self, input_size: Size) -> Size {
        match self {
            Operation::Resample { zoom_ratio, .. } => resampled_size(input_size, *zoom_ratio),
            Operation::Translate { .. } | Operation::Rotate { .. } => input_size,
        }
    }

    fn output_geo_reference(&self, input: &GeoReference) -> GeoReference {
        match self {
            Operation::Resample { zoom_ratio, .. } => resampled_geo_reference(input, *zoom_ratio),
            Operation::Translate { row_shift, col_shift } => {
                translated_geo_reference(input, *row_shift, *col_shift)
            }
            Operation::Rotate { .. } => input.clone(),
        }
    }

    /// The margin a reader attaches on each side of a block's own content
    /// before handing it to a worker. Resample and rotate add a symmetric
    /// margin (real neighboring pixels give the frequency transform more
    /// context than the block alone); translate only inflates the trailing
    /// edge, per `translation/input_stream.cc`'s `block_size_` adjustment.
    fn read_margin(&self, config: &StreamConfig) -> Padding {
        match self {
            Operation::Translate { row_shift, col_shift } => Padding::new(
                0,
                row_shift.abs().ceil() as i32,
                0,
                col_shift.abs().ceil() as i32,
                config.padding_kind,
            ),
            Operation::Rotate { angle_degrees } => {
                let hull = rotator::non_rotated_hull_size(config.block_size, *angle_degrees);
                let margin_row = ((hull.row - config.block_size.row) / 2).max(config.margin.row);
                let margin_col = ((hull.col - config.block_size.col) / 2).max(config.margin.col);
                Padding::new(margin_row, margin_row, margin_col, margin_col, config.padding_kind)
            }
            Operation::Resample { .. } => Padding::new(
                config.margin.row,
                config.margin.row,
                config.margin.col,
                config.margin.col,
                config.padding_kind,
            ),
        }
    }

    /// Grows `nominal` to a size better suited to this operation's FFT,
    /// bounded to 100x the original in each dimension (see
    /// `freqxform_dsp::numerics::{generate_dyadic_size,
    /// generate_zoom_compliant_size}`). Rotate and translate don't resize:
    /// neither operation's block-boundary accuracy depends on the block's
    /// FFT length the way an integer or real zoom's does.
    fn resized_block_size(&self, nominal: Size, margin: Size) -> Size {
        match self {
            Operation::Resample { zoom_ratio, .. } => {
                if zoom_ratio.is_real_zoom() {
                    numerics::generate_zoom_compliant_size(nominal, *zoom_ratio)
                } else {
                    numerics::generate_dyadic_size(nominal, zoom_ratio.input_resolution(), margin)
                }
            }
            Operation::Translate { .. } | Operation::Rotate { .. } => nominal,
        }
    }
}

/// Streaming parameters independent of the operation being applied.
#[derive(Debug, Clone, Copy)]
pub struct StreamConfig {
    /// Nominal block content size (the last block in each row/column may be
    /// smaller, clipped to the raster's edge).
    pub block_size: Size,
    /// Symmetric margin requested on each side of a block for operations
    /// that do not override [`Operation::read_margin`].
    pub margin: Size,
    /// How a margin beyond the raster's true edge is synthesized.
    pub padding_kind: PaddingKind,
    /// `0` or `1` runs the monothread path; anything higher spawns that
    /// many worker threads plus a reader and a writer.
    pub worker_count: usize,
    /// If set, [`ImageStreamer::new`] grows `block_size` to a size better
    /// suited to the operation's FFT before the stream starts (see
    /// `Operation::resized_block_size`).
    pub resize_blocks: bool,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            block_size: Size::new(512, 512),
            margin: Size::new(16, 16),
            padding_kind: PaddingKind::Mirror,
            worker_count: 0,
            resize_blocks: true,
        }
    }
}

/// Orchestrates a raster-scan block sweep over a [`RasterSource`], applying
/// `operation` to each block and writing the result to a [`RasterSink`].
pub struct ImageStreamer<'a> {
    operation: &'a Operation,
    config: StreamConfig,
}

impl<'a> ImageStreamer<'a> {
    pub fn new(operation: &'a Operation, config: StreamConfig) -> Self {
        let config = if config.resize_blocks {
            let margin = operation.read_margin(&config);
            let margin_size = Size::new(margin.top + margin.bottom, margin.left + margin.right);
            let block_size = operation.resized_block_size(config.block_size, margin_size);
            StreamConfig { block_size, ..config }
        } else {
            config
        };
        Self { operation, config }
    }

    /// Runs the sweep to completion.
    pub fn stream(
        &self,
        source: &mut (dyn RasterSource + Send),
        sink: &mut (dyn RasterSink + Send),
        fft: &FftWrapper,
    ) -> Result<()> {
        let input_size = source.size();
        let output_size = self.operation.output_size(input_size);
        let geo_reference = self.operation.output_geo_reference(&source.geo_reference());
        sink.create(output_size, geo_reference)?;

        let positions = self.block_positions(input_size);
        tracing::info!(
            blocks = positions.len(),
            workers = self.config.worker_count,
            rows = input_size.row,
            cols = input_size.col,
            "starting image stream"
        );

        if self.config.worker_count <= 1 {
            self.run_monothread(source, sink, &positions, fft)
        } else {
            self.run_multithread(source, sink, &positions, fft)
        }
    }

    fn block_positions(&self, size: Size) -> Vec<(i32, i32)> {
        let mut positions = Vec::new();
        let mut row = 0;
        while row < size.row {
            let mut col = 0;
            while col < size.col {
                positions.push((row, col));
                col += self.config.block_size.col;
            }
            row += self.config.block_size.row;
        }
        positions
    }

    fn run_monothread(
        &self,
        source: &mut (dyn RasterSource + Send),
        sink: &mut (dyn RasterSink + Send),
        positions: &[(i32, i32)],
        fft: &FftWrapper,
    ) -> Result<()> {
        for &(row_idx, col_idx) in positions {
            let block = self.read_block(source, row_idx, col_idx)?;
            let (out_row, out_col, processed) = self.process_block(block, fft)?;
            sink.write(out_row, out_col, processed.size.row, processed.size.col, &processed.data)?;
        }
        Ok(())
    }

    fn run_multithread(
        &self,
        source: &mut (dyn RasterSource + Send),
        sink: &mut (dyn RasterSink + Send),
        positions: &[(i32, i32)],
        fft: &FftWrapper,
    ) -> Result<()> {
        let worker_count = self.config.worker_count;
        let input_queue: ConcurrentQueue<StreamBlock> = ConcurrentQueue::new(worker_count);
        let output_queue: ConcurrentQueue<(i32, i32, Image)> = ConcurrentQueue::new(worker_count);

        let mut first_error: Option<Error> = None;

        thread::scope(|scope| {
            let reader = scope.spawn(|| -> Result<()> {
                for &(row_idx, col_idx) in positions {
                    let block = self.read_block(source, row_idx, col_idx)?;
                    if input_queue.push(block).is_err() {
                        break;
                    }
                }
                input_queue.deactivate();
                Ok(())
            });

            let workers: Vec<_> = (0..worker_count)
                .map(|_| {
                    scope.spawn(|| -> Result<()> {
                        while input_queue.can_pop() {
                            let block = match input_queue.pop() {
                                Ok(block) => block,
                                Err(_) => break,
                            };
                            match self.process_block(block, fft) {
                                Ok((out_row, out_col, processed)) => {
                                    if output_queue.push((out_row, out_col, processed)).is_err() {
                                        break;
                                    }
                                }
                                Err(err) => {
                                    input_queue.deactivate_and_clear();
                                    output_queue.deactivate_and_clear();
                                    return Err(err);
                                }
                            }
                        }
                        Ok(())
                    })
                })
                .collect();

            let writer = scope.spawn(|| -> Result<()> {
                while output_queue.can_pop() {
                    match output_queue.pop() {
                        Ok((out_row, out_col, processed)) => {
                            let write_result = sink.write(
                                out_row,
                                out_col,
                                processed.size.row,
                                processed.size.col,
                                &processed.data,
                            );
                            if let Err(err) = write_result {
                                output_queue.deactivate_and_clear();
                                return Err(err);
                            }
                        }
                        Err(_) => break,
                    }
                }
                Ok(())
            });

            for worker in workers {
                if let Err(err) = worker.join().expect("worker thread panicked") {
                    first_error.get_or_insert(err);
                }
            }
            output_queue.deactivate();

            if let Err(err) = writer.join().expect("writer thread panicked") {
                first_error.get_or_insert(err);
            }
            if let Err(err) = reader.join().expect("reader thread panicked") {
                first_error.get_or_insert(err);
            }
        });

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Reads the block whose own content starts at `(row_idx, col_idx)`,
    /// attaching `self.operation`'s margin on each side: real overlapping
    /// pixels where the raster extends that far, synthesized padding
    /// (`self.config.padding_kind`) only where the margin would fall
    /// outside the raster's true edge.
    fn read_block(&self, source: &mut (dyn RasterSource + Send), row_idx: i32, col_idx: i32) -> Result<StreamBlock> {
        let size = source.size();
        let margin = self.operation.read_margin(&self.config);
        let block_h = self.config.block_size.row.min(size.row - row_idx);
        let block_w = self.config.block_size.col.min(size.col - col_idx);

        let read_row0 = (row_idx - margin.top).max(0);
        let read_col0 = (col_idx - margin.left).max(0);
        let read_row1 = (row_idx + block_h + margin.bottom).min(size.row);
        let read_col1 = (col_idx + block_w + margin.right).min(size.col);

        let read_h = read_row1 - read_row0;
        let read_w = read_col1 - read_col0;
        let data = source.read(read_row0, read_col0, read_h, read_w)?;
        let raw = Image::from_buffer(Size::new(read_h, read_w), data)?;

        let pad_top = (margin.top - (row_idx - read_row0)).max(0);
        let pad_left = (margin.left - (col_idx - read_col0)).max(0);
        let pad_bottom = (margin.bottom - (read_row1 - (row_idx + block_h))).max(0);
        let pad_right = (margin.right - (read_col1 - (col_idx + block_w))).max(0);
        let edge_padding = Padding::new(pad_top, pad_bottom, pad_left, pad_right, margin.kind);

        let buffer = raw.padded(&edge_padding);
        Ok(StreamBlock::new(buffer, row_idx, col_idx, edge_padding))
    }

    /// Transforms one margined block and reports where in the output
    /// raster its (margin-trimmed) result belongs.
    fn process_block(&self, block: StreamBlock, fft: &FftWrapper) -> Result<(i32, i32, Image)> {
        let margin = self.operation.read_margin(&self.config);
        let content_size = Size::new(
            block.buffer.size.row - margin.top - margin.bottom,
            block.buffer.size.col - margin.left - margin.right,
        );

        match self.operation {
            Operation::Resample {
                zoom_ratio,
                filter,
                decomposition,
                upsampling,
            } => {
                let params = ResampleParams {
                    zoom_ratio: *zoom_ratio,
                    filter: filter.as_deref(),
                    decomposition: *decomposition,
                    upsampling: *upsampling,
                };
                let zoomed = resampler::compute(&block.buffer, Padding::default(), &params, fft)?;
                let target = resampled_size(content_size, *zoom_ratio);
                let cropped = crop_or_pad_center(&zoomed, target);

                let in_res = zoom_ratio.input_resolution() as f64;
                let out_res = zoom_ratio.output_resolution() as f64;
                let out_row = (block.row_idx as f64 * out_res / in_res).floor() as i32;
                let out_col = (block.col_idx as f64 * out_res / in_res).floor() as i32;
                Ok((out_row, out_col, cropped))
            }
            Operation::Translate { row_shift, col_shift } => {
                let shifted = translator::compute_with(&block.buffer, *row_shift, *col_shift, fft)?;
                let cropped = crop_or_pad_top_left(&shifted, content_size);
                Ok((block.row_idx, block.col_idx, cropped))
            }
            Operation::Rotate { angle_degrees } => {
                let rotated = rotator::compute(&block.buffer, *angle_degrees, fft)?;
                let cropped = crop_or_pad_center(&rotated, content_size);
                Ok((block.row_idx, block.col_idx, cropped))
            }
        }
    }
}

/// Crops (or zero-pads, if `target` is larger) `image` to `target`, aligned
/// to its top-left corner.
fn crop_or_pad_top_left(image: &Image, target: Size) -> Image {
    let mut out = Image::new(target);
    let rows = target.row.min(image.size.row);
    let cols = target.col.min(image.size.col);
    for r in 0..rows {
        for c in 0..cols {
            out.set(r, c, image.get(r, c));
        }
    }
    out
}

/// Crops (or zero-pads, if `target` is larger) `image` to `target`, aligned
/// to its center.
fn crop_or_pad_center(image: &Image, target: Size) -> Image {
    let mut out = Image::new(target);
    let rows = target.row.min(image.size.row);
    let cols = target.col.min(image.size.col);
    let src_row0 = (image.size.row - rows) / 2;
    let src_col0 = (image.size.col - cols) / 2;
    let dst_row0 = (target.row - rows) / 2;
    let dst_col0 = (target.col - cols) / 2;
    for r in 0..rows {
        for c in 0..cols {
            out.set(dst_row0 + r, dst_col0 + c, image.get(src_row0 + r, src_col0 + c));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::MemoryRaster;
    use freqxform_core::ZoomRatio;

    fn ramp_raster(size: Size) -> MemoryRaster {
        let data: Vec<f64> = (0..size.cell_count()).map(|v| v as f64).collect();
        MemoryRaster::new(size, data).unwrap()
    }

    #[test]
    fn block_positions_cover_the_full_raster_in_raster_scan_order() {
        let operation = Operation::Translate { row_shift: 0.0, col_shift: 0.0 };
        let streamer = ImageStreamer::new(
            &operation,
            StreamConfig {
                block_size: Size::new(4, 4),
                margin: Size::new(1, 1),
                padding_kind: PaddingKind::Mirror,
                worker_count: 0,
                resize_blocks: false,
            },
        );
        let positions = streamer.block_positions(Size::new(10, 6));
        assert_eq!(
            positions,
            vec![(0, 0), (0, 4), (4, 0), (4, 4), (8, 0), (8, 4)]
        );
    }

    #[test]
    fn monothread_identity_translate_round_trips_the_whole_raster() {
        let fft = FftWrapper::new();
        let size = Size::new(12, 12);
        let mut source = ramp_raster(size);
        let mut sink = MemoryRaster::default();
        let operation = Operation::Translate { row_shift: 0.0, col_shift: 0.0 };
        let streamer = ImageStreamer::new(
            &operation,
            StreamConfig {
                block_size: Size::new(6, 6),
                margin: Size::new(2, 2),
                padding_kind: PaddingKind::Mirror,
                worker_count: 0,
                resize_blocks: false,
            },
        );
        streamer.stream(&mut source, &mut sink, &fft).unwrap();

        assert_eq!(sink.size, size);
        for (a, b) in source.data.iter().zip(sink.data.iter()) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn multithread_run_matches_monothread_run() {
        let fft = FftWrapper::new();
        let size = Size::new(16, 16);
        let source_data: Vec<f64> = (0..size.cell_count()).map(|v| (v as f64 * 0.1).sin()).collect();

        let mut mono_source = MemoryRaster::new(size, source_data.clone()).unwrap();
        let mut mono_sink = MemoryRaster::default();
        let operation = Operation::Translate { row_shift: 0.0, col_shift: 0.0 };
        let config = StreamConfig {
            block_size: Size::new(8, 8),
            margin: Size::new(2, 2),
            padding_kind: PaddingKind::Mirror,
            worker_count: 0,
            resize_blocks: false,
        };
        ImageStreamer::new(&operation, config).stream(&mut mono_source, &mut mono_sink, &fft).unwrap();

        let mut multi_source = MemoryRaster::new(size, source_data).unwrap();
        let mut multi_sink = MemoryRaster::default();
        let multi_config = StreamConfig { worker_count: 3, ..config };
        ImageStreamer::new(&operation, multi_config)
            .stream(&mut multi_source, &mut multi_sink, &fft)
            .unwrap();

        assert_eq!(mono_sink.data, multi_sink.data);
    }

    #[test]
    fn resample_stream_scales_output_raster_size() {
        let fft = FftWrapper::new();
        let size = Size::new(8, 8);
        let mut source = ramp_raster(size);
        let mut sink = MemoryRaster::default();
        let operation = Operation::Resample {
            zoom_ratio: ZoomRatio::new(2, 1).unwrap(),
            filter: None,
            decomposition: Decomposition::Regular,
            upsampling: None,
        };
        let streamer = ImageStreamer::new(
            &operation,
            StreamConfig {
                block_size: Size::new(8, 8),
                margin: Size::new(2, 2),
                padding_kind: PaddingKind::Mirror,
                worker_count: 0,
                resize_blocks: false,
            },
        );
        streamer.stream(&mut source, &mut sink, &fft).unwrap();
        assert_eq!(sink.size, Size::new(16, 16));
    }

    #[test]
    fn resize_blocks_grows_block_size_for_an_integer_zoom() {
        let operation = Operation::Resample {
            zoom_ratio: ZoomRatio::new(1, 1).unwrap(),
            filter: None,
            decomposition: Decomposition::Regular,
            upsampling: None,
        };
        let streamer = ImageStreamer::new(
            &operation,
            StreamConfig {
                block_size: Size::new(5, 5),
                margin: Size::new(0, 0),
                padding_kind: PaddingKind::Mirror,
                worker_count: 0,
                resize_blocks: true,
            },
        );
        assert_eq!(streamer.config.block_size, Size::new(8, 8));
    }

    #[test]
    fn resize_blocks_leaves_translate_block_size_untouched() {
        let operation = Operation::Translate { row_shift: 0.5, col_shift: 0.0 };
        let streamer = ImageStreamer::new(
            &operation,
            StreamConfig {
                block_size: Size::new(5, 5),
                margin: Size::new(0, 0),
                padding_kind: PaddingKind::Mirror,
                worker_count: 0,
                resize_blocks: true,
            },
        );
        assert_eq!(streamer.config.block_size, Size::new(5, 5));
    }

    #[test]
    fn crop_or_pad_center_handles_both_shrink_and_grow() {
        let image = Image::from_buffer(Size::new(4, 4), (0..16).map(|v| v as f64).collect()).unwrap();
        let smaller = crop_or_pad_center(&image, Size::new(2, 2));
        assert_eq!(smaller.get(0, 0), image.get(1, 1));

        let larger = crop_or_pad_center(&image, Size::new(6, 6));
        assert_eq!(larger.get(1, 1), image.get(0, 0));
        assert_eq!(larger.get(0, 0), 0.0);
    }
}
