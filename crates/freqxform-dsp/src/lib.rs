//! FFT plan caching, numeric utilities and the generic LRU cache shared by
//! `freqxform-ops`.
//!
//! # Dependencies
//!
//! `freqxform-core` for [`freqxform_core::Image`]/[`freqxform_core::Size`];
//! `rustfft` for the complex column pass; `realfft` for the real-to-complex
//! row pass; `tracing` for instrumentation.
//!
//! # Used By
//!
//! `freqxform-ops`, for every frequency-domain operation.

pub mod fft;
pub mod lru;
pub mod numerics;

pub use fft::{FftWrapper, Spectrum};
pub use lru::LruCache;
