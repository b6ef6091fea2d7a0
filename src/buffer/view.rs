use std::cell::Cell;

use crate::foundation::error::{BufferRole, CompositorError, CompositorResult};

/// Bounds-checked addressing over one buffer's pixel words.
///
/// Every software pixel access goes through [`checked_index`] and then
/// [`load`] / [`store`], so there is exactly one place that decides
/// whether an address is inside the buffer. The declared byte size is
/// checked first; a word whose byte offset fits the declared size but
/// overhangs the actual backing is rejected the same way. Either failure
/// is reported as [`CompositorError::OutOfBounds`] for this view's role.
///
/// [`checked_index`]: BufferView::checked_index
/// [`load`]: BufferView::load
/// [`store`]: BufferView::store
#[derive(Clone, Copy)]
pub struct BufferView<'a> {
    words: &'a [Cell<u32>],
    stride: usize,
    size: u64,
    role: BufferRole,
}

impl<'a> BufferView<'a> {
    pub(crate) fn new(
        words: &'a [Cell<u32>],
        stride: usize,
        size: u64,
        role: BufferRole,
    ) -> Self {
        Self {
            words,
            stride,
            size,
            role,
        }
    }

    /// Pixels per row.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Linear word index of pixel `(x, y)`, verified against the declared
    /// size and the backing length. Negative coordinates are a bounds
    /// violation, not a wrap-around.
    pub fn checked_index(&self, x: i64, y: i64) -> CompositorResult<u64> {
        let index = x + y * self.stride as i64;
        if x < 0 || y < 0 || index < 0 {
            return Err(self.out_of_bounds(index));
        }
        let index = index as u64;
        self.check(index)?;
        Ok(index)
    }

    /// Read the pixel word at `index`.
    pub fn load(&self, index: u64) -> CompositorResult<u32> {
        self.check(index)?;
        Ok(self.words[index as usize].get())
    }

    /// Write the pixel word at `index`.
    pub fn store(&self, index: u64, word: u32) -> CompositorResult<()> {
        self.check(index)?;
        self.words[index as usize].set(word);
        Ok(())
    }

    fn check(&self, index: u64) -> CompositorResult<()> {
        if index.saturating_mul(4) > self.size || index >= self.words.len() as u64 {
            return Err(self.out_of_bounds(index as i64));
        }
        Ok(())
    }

    fn out_of_bounds(&self, index: i64) -> CompositorError {
        CompositorError::OutOfBounds {
            buffer: self.role,
            index,
            size: self.size,
        }
    }
}
