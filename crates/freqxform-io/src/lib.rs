//! Block-streaming I/O: raster source/sink traits, geo-reference transform
//! math, the concurrent queue and block type the streaming pipeline is
//! built from, and the pipeline itself.
//!
//! # Dependencies
//!
//! `freqxform-core` for image/geometry/error types; `freqxform-ops` for the
//! frequency-domain operations each block is run through; `tracing` for
//! pipeline progress instrumentation.
//!
//! # Used By
//!
//! `freqxform-cli`'s `stream` subcommand, and any caller that needs to
//! transform a raster larger than fits comfortably in memory as a single
//! FFT.

pub mod block;
pub mod pipeline;
pub mod queue;
pub mod raster;

pub use block::StreamBlock;
pub use pipeline::{ImageStreamer, Operation, StreamConfig};
pub use queue::ConcurrentQueue;
pub use raster::{GeoReference, MemoryRaster, RasterSink, RasterSource};

/// Re-exports the common types under one `use freqxform_io::prelude::*;`.
pub mod prelude {
    pub use crate::block::StreamBlock;
    pub use crate::pipeline::{ImageStreamer, Operation, StreamConfig};
    pub use crate::queue::ConcurrentQueue;
    pub use crate::raster::{GeoReference, MemoryRaster, RasterSink, RasterSource};
}
