//! Info command - report raster dimensions and geo-reference

use anyhow::Result;

use crate::commands::load_image;
use crate::InfoArgs;

pub fn run(args: InfoArgs, verbose: u8) -> Result<()> {
    let (image, geo) = load_image(&args.input)?;

    println!("{}", args.input.display());
    println!("  size: {} rows x {} cols", image.size.row, image.size.col);

    if geo.is_initialized {
        println!("  geo transform: {:?}", geo.geo_transform);
        println!("  projection: {}", geo.projection_ref);
    } else if verbose > 0 {
        println!("  geo transform: none");
    }

    if args.stats {
        let count = image.data.len() as f64;
        let sum: f64 = image.data.iter().sum();
        let mean = sum / count;
        let min = image.data.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = image.data.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        println!("  min: {min}, max: {max}, mean: {mean}");
    }

    Ok(())
}
