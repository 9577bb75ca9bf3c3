//! Stream command - block-wise transform of a raster too large to hold
//! entirely in memory as a single FFT.

use std::sync::Arc;

use anyhow::Result;
use freqxform_core::{Size, ZoomRatio};
use freqxform_dsp::FftWrapper;
use freqxform_io::{ImageStreamer, Operation, StreamConfig};
use freqxform_ops::{Filter, DEFAULT_HOT_POINT};

use crate::commands::{load_filter_image, parse_hot_point};
use crate::flat_raster::{FlatRasterSink, FlatRasterSource};
use crate::{PaddingKindArg, StreamArgs, StreamOp};

pub fn run(args: StreamArgs, verbose: u8) -> Result<()> {
    let fft = FftWrapper::new();
    let padding_kind = PaddingKindArg::to_padding_kind(args.padding);

    let operation = match &args.op {
        StreamOp::Resample {
            zoom,
            filter,
            hot_point,
            normalize,
            decomposition,
            upsampling,
        } => {
            let zoom_ratio = ZoomRatio::parse(zoom)?;
            let filter = match filter {
                Some(path) => {
                    let hot_point = match hot_point {
                        Some(s) => parse_hot_point(s)?,
                        None => DEFAULT_HOT_POINT,
                    };
                    let filter_image = load_filter_image(path)?;
                    Some(Arc::new(Filter::create(filter_image, zoom_ratio, hot_point, padding_kind, *normalize, &fft)?))
                }
                None => None,
            };
            Operation::Resample {
                zoom_ratio,
                filter,
                decomposition: decomposition.to_decomposition(),
                upsampling: upsampling.map(crate::UpsamplingArg::to_upsampling_strategy),
            }
        }
        StreamOp::Rotate { angle } => Operation::Rotate { angle_degrees: *angle },
        StreamOp::Translate { row_shift, col_shift } => Operation::Translate {
            row_shift: *row_shift,
            col_shift: *col_shift,
        },
    };

    let config = StreamConfig {
        block_size: Size::new(args.block_size, args.block_size),
        margin: Size::new(args.margin, args.margin),
        padding_kind,
        worker_count: args.workers,
        resize_blocks: !args.no_block_resizing,
    };

    let mut source = FlatRasterSource::open(&args.input)?;
    let mut sink = FlatRasterSink::create_at(&args.output)?;

    if verbose > 0 {
        println!(
            "streaming {} -> {} (block {}x{}, margin {}x{}, workers {})",
            args.input.display(),
            args.output.display(),
            args.block_size,
            args.block_size,
            args.margin,
            args.margin,
            args.workers
        );
    }

    ImageStreamer::new(&operation, config).stream(&mut source, &mut sink, &fft)?;

    if verbose > 0 {
        println!("done");
    }
    Ok(())
}
