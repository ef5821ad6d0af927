// SPDX-License-Identifier: MIT OR Apache-2.0

use super::{align_up, AllocError, DmaAllocator, DmaBuffer, DMA_ALIGNMENT};
use log::debug;

/// A view into an [`Arena`], starting at a DMA-aligned position.
///
/// Regions are plain coordinates: the bytes themselves are reached through
/// [`Arena::bytes`] and [`Arena::bytes_mut`], so a region never outlives
/// the borrow rules of the arena it was taken from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    offset: usize,
    phys: u64,
    size: usize,
}

impl Region {
    /// Offset of the region from the start of the arena. The normal-world
    /// address of the region is the arena's base address plus this offset.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Address of the region as seen by the secure side.
    #[must_use]
    pub const fn phys(&self) -> u64 {
        self.phys
    }

    /// Bytes available from the start of the region to the end of the arena.
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }
}

/// A growable DMA buffer, reused for every request/response pair.
///
/// The arena never shrinks. When a call needs more room than is available,
/// the old buffer is released and a larger one allocated in its place;
/// the previous contents are lost, so callers lay out their frames only
/// after [`ensure_capacity`](Self::ensure_capacity) returned.
#[derive(Debug)]
pub struct Arena<A: DmaAllocator> {
    allocator: A,
    buffer: Option<DmaBuffer>,
    page_size: usize,
}

impl<A: DmaAllocator> Arena<A> {
    /// Create an arena without any memory attached.
    ///
    /// `page_size` is the allocation granularity; it must be a power of two.
    pub fn empty(allocator: A, page_size: usize) -> Self {
        assert!(page_size.is_power_of_two());
        Self {
            allocator,
            buffer: None,
            page_size,
        }
    }

    /// Create an arena holding at least `size` bytes.
    pub fn new(allocator: A, size: usize, page_size: usize) -> Result<Self, AllocError> {
        let mut arena = Self::empty(allocator, page_size);
        arena.ensure_capacity(size)?;
        Ok(arena)
    }

    /// Number of usable bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.as_ref().map_or(0, DmaBuffer::size)
    }

    /// Make sure the arena holds at least `min_size` bytes.
    ///
    /// Does nothing if it already does. Otherwise the current buffer is
    /// released and replaced by one of `min_size` rounded up to the page
    /// size. If that allocation fails, the arena is left empty.
    pub fn ensure_capacity(&mut self, min_size: usize) -> Result<(), AllocError> {
        let capacity = self.capacity();
        if min_size <= capacity {
            return Ok(());
        }

        let size = align_up(min_size, self.page_size).ok_or(AllocError)?;
        debug!("growing DMA arena from {capacity} to {size} bytes");

        if let Some(old) = self.buffer.take() {
            self.allocator.free(old);
        }

        let buffer = self.allocator.alloc(size)?;
        if buffer.size() < size {
            self.allocator.free(buffer);
            return Err(AllocError);
        }

        self.buffer = Some(buffer);
        Ok(())
    }

    /// Get a view starting at the first DMA-aligned address at or after
    /// `offset` bytes into the arena.
    ///
    /// The view extends to the end of the arena. If the aligned start lies
    /// beyond the end, the view is empty.
    #[must_use]
    pub fn aligned(&self, offset: usize) -> Region {
        let Some(buffer) = &self.buffer else {
            return Region {
                offset,
                phys: 0,
                size: 0,
            };
        };

        let base = buffer.virt().as_ptr() as usize;
        let start = base
            .checked_add(offset)
            .and_then(|addr| align_up(addr, DMA_ALIGNMENT))
            .map_or(usize::MAX, |addr| addr - base);

        Region {
            offset: start,
            phys: buffer.phys().wrapping_add(start as u64),
            size: buffer.size().saturating_sub(start),
        }
    }

    /// The bytes covered by `region`.
    ///
    /// # Panics
    ///
    /// Panics if `region` does not fit the arena, which only happens if it
    /// was taken before the arena was last grown.
    #[must_use]
    pub fn bytes(&self, region: &Region) -> &[u8] {
        if region.size == 0 {
            return &[];
        }
        match &self.buffer {
            Some(buffer) => &buffer.as_slice()[region.offset..][..region.size],
            None => panic!("region taken from a different arena"),
        }
    }

    /// The bytes covered by `region`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if `region` does not fit the arena, which only happens if it
    /// was taken before the arena was last grown.
    pub fn bytes_mut(&mut self, region: &Region) -> &mut [u8] {
        if region.size == 0 {
            return &mut [];
        }
        match &mut self.buffer {
            Some(buffer) => &mut buffer.as_mut_slice()[region.offset..][..region.size],
            None => panic!("region taken from a different arena"),
        }
    }
}

impl<A: DmaAllocator> Drop for Arena<A> {
    fn drop(&mut self) {
        if let Some(buffer) = self.buffer.take() {
            self.allocator.free(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mem::PAGE_SIZE;
    use crate::testing::TestAllocator;

    #[test]
    fn test_initial_capacity_is_page_rounded() {
        let allocator = TestAllocator::new();
        let arena = Arena::new(&allocator, 100, PAGE_SIZE).unwrap();
        assert_eq!(arena.capacity(), PAGE_SIZE);
        assert_eq!(allocator.allocations(), 1);
    }

    #[test]
    fn test_ensure_capacity_is_idempotent() {
        let allocator = TestAllocator::new();
        let mut arena = Arena::new(&allocator, PAGE_SIZE, PAGE_SIZE).unwrap();

        arena.ensure_capacity(10).unwrap();
        arena.ensure_capacity(PAGE_SIZE).unwrap();
        assert_eq!(allocator.allocations(), 1);

        arena.ensure_capacity(PAGE_SIZE + 1).unwrap();
        assert_eq!(allocator.allocations(), 2);
        assert_eq!(allocator.frees(), 1);
        assert_eq!(arena.capacity(), 2 * PAGE_SIZE);

        // Never shrinks.
        arena.ensure_capacity(1).unwrap();
        assert_eq!(arena.capacity(), 2 * PAGE_SIZE);
        assert_eq!(allocator.allocations(), 2);
    }

    #[test]
    fn test_failed_growth_leaves_arena_empty() {
        let allocator = TestAllocator::new();
        let mut arena = Arena::new(&allocator, PAGE_SIZE, PAGE_SIZE).unwrap();

        allocator.fail_next();
        assert_eq!(arena.ensure_capacity(3 * PAGE_SIZE), Err(AllocError));
        assert_eq!(arena.capacity(), 0);
        assert_eq!(arena.aligned(0).size(), 0);

        // The arena recovers on the next successful growth.
        arena.ensure_capacity(PAGE_SIZE).unwrap();
        assert_eq!(arena.capacity(), PAGE_SIZE);
    }

    #[test]
    fn test_aligned_regions() {
        let allocator = TestAllocator::new();
        let arena = Arena::new(&allocator, PAGE_SIZE, PAGE_SIZE).unwrap();
        let base = arena.aligned(0);
        assert_eq!(base.offset(), 0);
        assert_eq!(base.size(), PAGE_SIZE);

        let region = arena.aligned(28);
        assert_eq!(region.offset(), 32);
        assert_eq!(region.phys(), base.phys() + 32);
        assert_eq!(region.size(), PAGE_SIZE - 32);

        let region = arena.aligned(40);
        assert_eq!(region.offset(), 40);

        let region = arena.aligned(PAGE_SIZE + 3);
        assert_eq!(region.size(), 0);
    }

    #[test]
    fn test_drop_frees_buffer() {
        let allocator = TestAllocator::new();
        {
            let mut arena = Arena::new(&allocator, PAGE_SIZE, PAGE_SIZE).unwrap();
            let region = arena.aligned(8);
            arena.bytes_mut(&region)[..4].copy_from_slice(&[1, 2, 3, 4]);
            assert_eq!(&arena.bytes(&region)[..4], &[1, 2, 3, 4]);
        }
        assert_eq!(allocator.allocations(), 1);
        assert_eq!(allocator.frees(), 1);
    }
}
