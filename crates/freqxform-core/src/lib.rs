//! Core types shared across the frequency-domain transform workspace:
//! [`Size`]/[`Point`]/[`ZoomRatio`] geometry, [`Padding`], [`Image`], and the
//! workspace-wide [`Error`]/[`Result`] taxonomy.
//!
//! # Dependencies
//!
//! `thiserror` for the error enum. No other crates.
//!
//! # Used By
//!
//! Every other crate in the workspace.

pub mod error;
pub mod image;
pub mod padding;
pub mod size;

pub use error::{Error, Result};
pub use image::Image;
pub use padding::{Padding, PaddingKind};
pub use size::{gcd, Point, Size, ZoomRatio};

/// Re-exports the common types under one `use freqxform_core::prelude::*;`.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::image::Image;
    pub use crate::padding::{Padding, PaddingKind};
    pub use crate::size::{gcd, Point, Size, ZoomRatio};
}
