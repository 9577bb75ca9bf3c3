//! Image margins: [`Padding`] and [`PaddingKind`].
//!
//! # Dependencies
//!
//! None.
//!
//! # Used By
//!
//! [`crate::image::Image::padded`]; `freqxform-ops`'s decomposition and
//! upsampling strategies, which pad images before taking their FFT.

/// How a [`Padding`]'s margins are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaddingKind {
    /// Fill margins with `0`.
    Zero,
    /// Duplicate the border rows/cols in mirror.
    #[default]
    Mirror,
}

/// Margins to add around an image, and how to fill them.
///
/// # Example
///
/// ```rust
/// use freqxform_core::{Padding, PaddingKind};
///
/// let p = Padding::new(1, 1, 2, 2, PaddingKind::Zero);
/// assert!(!p.is_empty());
/// assert!(Padding::default().is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Padding {
    pub top: i32,
    pub bottom: i32,
    pub left: i32,
    pub right: i32,
    pub kind: PaddingKind,
}

impl Padding {
    /// Creates a new padding.
    pub const fn new(top: i32, bottom: i32, left: i32, right: i32, kind: PaddingKind) -> Self {
        Self {
            top,
            bottom,
            left,
            right,
            kind,
        }
    }

    /// True when all four margins are zero (padding is a no-op).
    pub const fn is_empty(&self) -> bool {
        self.top == 0 && self.bottom == 0 && self.left == 0 && self.right == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_padding_is_empty() {
        assert!(Padding::default().is_empty());
    }

    #[test]
    fn non_zero_margin_is_not_empty() {
        let p = Padding::new(0, 0, 1, 0, PaddingKind::Mirror);
        assert!(!p.is_empty());
    }

    #[test]
    fn default_kind_is_mirror() {
        assert_eq!(PaddingKind::default(), PaddingKind::Mirror);
    }
}
