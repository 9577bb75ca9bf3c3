//! Rotate command - arbitrary-angle rotation via three-pass shear

use anyhow::Result;
use freqxform_dsp::FftWrapper;

use crate::commands::{load_image, save_image};
use crate::RotateArgs;

pub fn run(args: RotateArgs, verbose: u8) -> Result<()> {
    let (input, geo) = load_image(&args.input)?;
    if verbose > 0 {
        println!(
            "rotating {} ({} x {}) by {}\u{b0}",
            args.input.display(),
            input.size.row,
            input.size.col,
            args.angle
        );
    }

    let fft = FftWrapper::new();
    let output = freqxform_ops::rotator::compute(&input, args.angle, &fft)?;
    save_image(&args.output, &output, geo)?;

    if verbose > 0 {
        println!("wrote {} ({} x {})", args.output.display(), output.size.row, output.size.col);
    }
    Ok(())
}
