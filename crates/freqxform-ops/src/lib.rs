//! Frequency-domain image operations: resampling (zoom), rotation,
//! translation, filter construction and the image-decomposition/upsampling
//! policies the resampler composes.
//!
//! # Dependencies
//!
//! `freqxform-core` for geometry/image/error types; `freqxform-dsp` for the
//! FFT wrapper, LRU cache and numeric helpers; `rayon` (optional, behind the
//! `parallel` feature) for block-level parallelism in the streaming pipeline.
//!
//! # Used By
//!
//! `freqxform-io`'s streaming pipeline and `freqxform-cli`'s subcommands.

pub mod decomposition;
pub mod filter;
pub mod resampler;
pub mod rotator;
pub mod translator;
pub mod upsampling;

pub use decomposition::Decomposition;
pub use filter::{Filter, DEFAULT_HOT_POINT};
pub use resampler::ResampleParams;
pub use upsampling::UpsamplingStrategy;
