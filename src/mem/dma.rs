// SPDX-License-Identifier: MIT OR Apache-2.0

use core::error::Error;
use core::fmt;
use core::ptr::NonNull;

/// A contiguous block of memory reachable by both the normal world (through
/// `virt`) and the secure side (through `phys`).
///
/// The buffer does not free itself: it must be handed back to the
/// [`DmaAllocator`] that produced it.
#[derive(Debug)]
pub struct DmaBuffer {
    virt: NonNull<u8>,
    phys: u64,
    size: usize,
}

// SAFETY: a `DmaBuffer` is the unique owner of its memory; moving it to
// another thread moves that ownership along.
unsafe impl Send for DmaBuffer {}

impl DmaBuffer {
    /// Wrap a freshly allocated block.
    ///
    /// # Safety
    ///
    /// `virt` must point to `size` bytes of writable memory, mapped at
    /// physical address `phys` for the secure side, that stays valid and is
    /// not accessed by anyone else until the buffer is passed to
    /// [`DmaAllocator::free`].
    #[must_use]
    pub const unsafe fn from_raw_parts(virt: NonNull<u8>, phys: u64, size: usize) -> Self {
        Self { virt, phys, size }
    }

    /// Normal-world address of the buffer.
    #[must_use]
    pub const fn virt(&self) -> NonNull<u8> {
        self.virt
    }

    /// Address of the buffer as seen by the secure side.
    #[must_use]
    pub const fn phys(&self) -> u64 {
        self.phys
    }

    /// Size of the buffer in bytes.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// View the buffer as a byte slice.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: guaranteed by the contract of `from_raw_parts`.
        unsafe { core::slice::from_raw_parts(self.virt.as_ptr(), self.size) }
    }

    /// View the buffer as a mutable byte slice.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: guaranteed by the contract of `from_raw_parts`.
        unsafe { core::slice::from_raw_parts_mut(self.virt.as_ptr(), self.size) }
    }
}

/// Source of DMA-coherent memory.
pub trait DmaAllocator {
    /// Allocate at least `size` bytes. The returned buffer may be larger.
    fn alloc(&self, size: usize) -> Result<DmaBuffer, AllocError>;

    /// Return a buffer obtained from [`alloc`](Self::alloc).
    fn free(&self, buffer: DmaBuffer);
}

impl<A: DmaAllocator + ?Sized> DmaAllocator for &A {
    fn alloc(&self, size: usize) -> Result<DmaBuffer, AllocError> {
        (**self).alloc(size)
    }

    fn free(&self, buffer: DmaBuffer) {
        (**self).free(buffer)
    }
}

/// The allocator could not satisfy a request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AllocError;

impl Error for AllocError {}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("DMA memory allocation failed")
    }
}
