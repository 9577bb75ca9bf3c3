//! Resample command - frequency-domain zoom by a rational ratio

use anyhow::Result;
use freqxform_core::Padding;
use freqxform_dsp::FftWrapper;
use freqxform_ops::{Filter, ResampleParams, DEFAULT_HOT_POINT};

use crate::commands::{load_filter_image, load_image, parse_hot_point, save_image};
use crate::{PaddingKindArg, ResampleArgs, UpsamplingArg};

pub fn run(args: ResampleArgs, verbose: u8) -> Result<()> {
    let (input, geo) = load_image(&args.input)?;
    if verbose > 0 {
        println!(
            "resampling {} ({} x {}) by {}",
            args.input.display(),
            input.size.row,
            input.size.col,
            args.zoom
        );
    }

    let zoom_ratio = freqxform_core::ZoomRatio::parse(&args.zoom)?;
    let padding_kind = PaddingKindArg::to_padding_kind(args.padding);
    let fft = FftWrapper::new();

    let filter = match &args.filter {
        Some(path) => {
            let hot_point = match &args.hot_point {
                Some(s) => parse_hot_point(s)?,
                None => DEFAULT_HOT_POINT,
            };
            let filter_image = load_filter_image(path)?;
            Some(Filter::create(filter_image, zoom_ratio, hot_point, padding_kind, args.normalize, &fft)?)
        }
        None => None,
    };

    let params = ResampleParams {
        zoom_ratio,
        filter: filter.as_ref(),
        decomposition: args.decomposition.to_decomposition(),
        upsampling: args.upsampling.map(UpsamplingArg::to_upsampling_strategy),
    };

    let image_padding = Padding::new(args.padding_size, args.padding_size, args.padding_size, args.padding_size, padding_kind);
    let output = freqxform_ops::resampler::compute(&input, image_padding, &params, &fft)?;

    let output_geo = freqxform_io::raster::resampled_geo_reference(&geo, zoom_ratio);
    save_image(&args.output, &output, output_geo)?;

    if verbose > 0 {
        println!("wrote {} ({} x {})", args.output.display(), output.size.row, output.size.col);
    }
    Ok(())
}
