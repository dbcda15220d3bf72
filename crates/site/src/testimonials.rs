//! Testimonial rotator.

use thiserror::Error;

/// Errors from manual testimonial selection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RotatorError {
    #[error("testimonial {index} out of range (have {len})")]
    OutOfRange { index: usize, len: usize },
}

/// Cycles a highlighted index over a fixed list of `len` testimonials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestimonialRotator {
    len: usize,
    current: usize,
}

impl TestimonialRotator {
    /// Create a rotator over `len` testimonials, highlighting the first.
    #[must_use]
    pub const fn new(len: usize) -> Self {
        Self { len, current: 0 }
    }

    /// Number of testimonials.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether there is nothing to rotate.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highlighted index, or `None` when there are no testimonials.
    #[must_use]
    pub const fn current(&self) -> Option<usize> {
        if self.len == 0 {
            None
        } else {
            Some(self.current)
        }
    }

    /// Move to the next testimonial, wrapping at the end.
    ///
    /// Returns the new index; with no testimonials this is a no-op.
    pub const fn advance(&mut self) -> Option<usize> {
        if self.len == 0 {
            return None;
        }
        self.current = (self.current + 1) % self.len;
        Some(self.current)
    }

    /// Highlight testimonial `index` directly.
    ///
    /// # Errors
    ///
    /// Returns [`RotatorError::OutOfRange`] and leaves the index unchanged if
    /// `index >= len`.
    pub const fn select(&mut self, index: usize) -> Result<usize, RotatorError> {
        if index >= self.len {
            return Err(RotatorError::OutOfRange {
                index,
                len: self.len,
            });
        }
        self.current = index;
        Ok(index)
    }
}
