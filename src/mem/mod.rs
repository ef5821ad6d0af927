// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory shared with the secure side.
//!
//! The secure application only sees physical addresses, so every byte
//! exchanged with it lives in DMA-coherent memory handed out by an embedder
//! supplied [`DmaAllocator`]. The [`Arena`] owns one such buffer and reuses
//! it for every call.

mod arena;
pub use self::arena::{Arena, Region};

mod dma;
pub use self::dma::{AllocError, DmaAllocator, DmaBuffer};

/// Minimum alignment of any structure handed to the secure side.
pub const DMA_ALIGNMENT: usize = 8;

/// Default allocation granularity of DMA memory.
pub const PAGE_SIZE: usize = 4096;

/// Round `value` up to the next multiple of `align`, which must be a power
/// of two. Returns `None` on overflow.
#[must_use]
pub const fn align_up(value: usize, align: usize) -> Option<usize> {
    debug_assert!(align.is_power_of_two());
    match value.checked_add(align - 1) {
        Some(v) => Some(v & !(align - 1)),
        None => None,
    }
}
