//! Translate command - sub-pixel shift via spectral phase ramp

use anyhow::Result;
use freqxform_dsp::FftWrapper;

use crate::commands::{load_image, save_image};
use crate::TranslateArgs;

pub fn run(args: TranslateArgs, verbose: u8) -> Result<()> {
    let (input, geo) = load_image(&args.input)?;
    if verbose > 0 {
        println!(
            "translating {} by (row {}, col {})",
            args.input.display(),
            args.row_shift,
            args.col_shift
        );
    }

    let fft = FftWrapper::new();
    let output = freqxform_ops::translator::compute_with(&input, args.row_shift, args.col_shift, &fft)?;
    let output_geo = freqxform_io::raster::translated_geo_reference(&geo, args.row_shift, args.col_shift);
    save_image(&args.output, &output, output_geo)?;

    if verbose > 0 {
        println!("wrote {}", args.output.display());
    }
    Ok(())
}
