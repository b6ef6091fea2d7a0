use std::cell::Cell;
use std::fmt;

use crate::buffer::view::BufferView;
use crate::foundation::error::{BufferRole, CompositorError, CompositorResult};

/// Accelerator-domain identifier for a buffer's memory region.
///
/// The accelerator addresses buffers in its own namespace; this id and
/// the pixel words of the owning [`BufferDescriptor`] refer to the same
/// memory, but no numeric relationship between them may be assumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct AccelBufferId(pub i32);

const DESCRIPTOR_MAGIC: u32 = u32::from_be_bytes(*b"lbfd");
const DESCRIPTOR_VERSION: u32 = 1;

/// Metadata and pixel storage for one externally allocated display buffer.
///
/// Descriptors are produced by the buffer allocator and consumed here by
/// reference; the compositor validates them before a pass and never
/// assumes exclusive access to the pixel words, which other producers may
/// mutate between or during passes. The declared [`size`](Self::size) is
/// authoritative for bounds checking even when it disagrees with the
/// backing allocation.
pub struct BufferDescriptor {
    magic: u32,
    version: u32,
    stride: u32,
    size: u64,
    accel_id: AccelBufferId,
    words: Vec<Cell<u32>>,
}

impl BufferDescriptor {
    /// Allocate a descriptor backed by `stride * rows` zeroed pixel words,
    /// with a declared size matching the allocation.
    pub fn allocate(stride: u32, rows: u32, accel_id: AccelBufferId) -> Self {
        let words = vec![Cell::new(0); stride as usize * rows as usize];
        Self {
            magic: DESCRIPTOR_MAGIC,
            version: DESCRIPTOR_VERSION,
            stride,
            size: 4 * u64::from(stride) * u64::from(rows),
            accel_id,
            words,
        }
    }

    /// Pixels per row (row pitch).
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Declared addressable byte size.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Identifier of this memory region in the accelerator's namespace.
    pub fn accel_id(&self) -> AccelBufferId {
        self.accel_id
    }

    /// The backing pixel words.
    pub fn words(&self) -> &[Cell<u32>] {
        &self.words
    }

    /// Check the descriptor's internal consistency tag.
    ///
    /// A failure means the caller handed over something that is not a
    /// live descriptor (stale, mistyped, or trampled metadata); the
    /// composition pass must not run against it.
    pub fn validate(&self) -> CompositorResult<()> {
        if self.magic != DESCRIPTOR_MAGIC {
            return Err(CompositorError::invalid_descriptor(format!(
                "bad magic {:#010x}",
                self.magic
            )));
        }
        if self.version != DESCRIPTOR_VERSION {
            return Err(CompositorError::invalid_descriptor(format!(
                "unsupported version {}",
                self.version
            )));
        }
        Ok(())
    }

    /// Bounds-checked view over this buffer for one merge.
    pub fn view(&self, role: BufferRole) -> BufferView<'_> {
        BufferView::new(&self.words, self.stride as usize, self.size, role)
    }

    #[cfg(test)]
    pub(crate) fn corrupt_magic(&mut self) {
        self.magic = 0xdead_beef;
    }
}

impl fmt::Debug for BufferDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferDescriptor")
            .field("stride", &self.stride)
            .field("size", &self.size)
            .field("accel_id", &self.accel_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_declares_matching_size() {
        let buf = BufferDescriptor::allocate(100, 100, AccelBufferId(3));
        assert_eq!(buf.stride(), 100);
        assert_eq!(buf.size(), 40_000);
        assert_eq!(buf.words().len(), 10_000);
        assert_eq!(buf.accel_id(), AccelBufferId(3));
    }

    #[test]
    fn fresh_descriptor_validates() {
        let buf = BufferDescriptor::allocate(16, 16, AccelBufferId(0));
        assert!(buf.validate().is_ok());
    }

    #[test]
    fn corrupted_magic_fails_validation() {
        let mut buf = BufferDescriptor::allocate(16, 16, AccelBufferId(0));
        buf.corrupt_magic();
        let err = buf.validate().unwrap_err();
        assert!(matches!(err, CompositorError::InvalidBufferDescriptor(_)));
        assert!(err.to_string().contains("bad magic"));
    }
}
