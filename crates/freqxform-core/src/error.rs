//! Error types for frequency-domain image transform operations.
//!
//! # Usage
//!
//! ```rust
//! use freqxform_core::{Error, Result};
//!
//! fn check_hot_point(x: i32, y: i32, width: i32, height: i32) -> Result<()> {
//!     if x < -1 || x >= width || y < -1 || y >= height {
//!         return Err(Error::InvalidInput(format!("hot point ({x}, {y}) out of range")));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Dependencies
//!
//! - [`thiserror`] for the derive-based [`std::error::Error`]/[`std::fmt::Display`] impls.
//!
//! # Used By
//!
//! Every crate in the workspace: `freqxform-dsp` wraps FFT planning failures,
//! `freqxform-ops` reports filter/geometry validation failures, `freqxform-io`
//! reports I/O and queue-lifecycle failures.

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur anywhere in the transform pipeline.
///
/// The taxonomy is intentionally flat: callers that need to distinguish a
/// recoverable condition (e.g. retrying with a smaller block size) from a
/// hard failure should match on the variant rather than parse the message.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied parameter failed validation (bad hot point, zero-size
    /// image, malformed zoom ratio string, and similar).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A filter's spatial support is larger than the image it is being
    /// applied to; the frequency-domain product cannot be formed.
    #[error("filter {filter_rows}x{filter_cols} is too large for image {image_rows}x{image_cols}")]
    FilterTooLarge {
        /// Filter row count.
        filter_rows: i32,
        /// Filter column count.
        filter_cols: i32,
        /// Image row count.
        image_rows: i32,
        /// Image column count.
        image_cols: i32,
    },

    /// A bounded resource (streaming queue, worker pool, FFT plan cache) could
    /// not accept more load.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),

    /// Creating or executing an FFT plan failed.
    #[error("FFT plan failed for size {rows}x{cols}: {reason}")]
    FftPlanFailed {
        /// Plan row count.
        rows: i32,
        /// Plan column count.
        cols: i32,
        /// Underlying reason, if known.
        reason: String,
    },

    /// A concurrent queue was used after it had been deactivated.
    #[error("queue is inactive")]
    QueueInactive,

    /// Wraps [`std::io::Error`] for raster source/sink operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Catch-all for conditions that don't fit another variant.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates an [`Error::InvalidInput`] error.
    #[inline]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Creates an [`Error::FilterTooLarge`] error.
    #[inline]
    pub fn filter_too_large(filter: (i32, i32), image: (i32, i32)) -> Self {
        Self::FilterTooLarge {
            filter_rows: filter.0,
            filter_cols: filter.1,
            image_rows: image.0,
            image_cols: image.1,
        }
    }

    /// Creates an [`Error::ResourceExhausted`] error.
    #[inline]
    pub fn resource_exhausted(msg: impl Into<String>) -> Self {
        Self::ResourceExhausted(msg.into())
    }

    /// Creates an [`Error::FftPlanFailed`] error.
    #[inline]
    pub fn fft_plan_failed(size: (i32, i32), reason: impl Into<String>) -> Self {
        Self::FftPlanFailed {
            rows: size.0,
            cols: size.1,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::Other`] error.
    #[inline]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Returns `true` if this is a validation error on caller input.
    #[inline]
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Returns `true` if this is an I/O error.
    #[inline]
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
