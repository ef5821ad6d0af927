// SPDX-License-Identifier: MIT OR Apache-2.0

//! Doubles for the embedder-supplied collaborators, used by unit tests.

extern crate std;

use crate::mem::{AllocError, DmaAllocator, DmaBuffer, PAGE_SIZE};
use crate::tee::{ScmCall, ScmDesc, ScmError, ScmResult};
use core::ptr::NonNull;
use core::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::alloc::{alloc_zeroed, dealloc, Layout};

/// Heap-backed allocator whose physical addresses equal virtual ones.
#[derive(Debug, Default)]
pub struct TestAllocator {
    allocations: AtomicUsize,
    frees: AtomicUsize,
    fail_next: AtomicBool,
}

impl TestAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful allocations so far.
    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::SeqCst)
    }

    pub fn frees(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    /// Make the next allocation fail.
    pub fn fail_next(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl DmaAllocator for TestAllocator {
    fn alloc(&self, size: usize) -> Result<DmaBuffer, AllocError> {
        if self.fail_next.swap(false, Ordering::SeqCst) || size == 0 {
            return Err(AllocError);
        }

        let layout = Layout::from_size_align(size, PAGE_SIZE).map_err(|_| AllocError)?;
        let virt = NonNull::new(unsafe { alloc_zeroed(layout) }).ok_or(AllocError)?;
        self.allocations.fetch_add(1, Ordering::SeqCst);

        Ok(unsafe { DmaBuffer::from_raw_parts(virt, virt.as_ptr() as u64, size) })
    }

    fn free(&self, buffer: DmaBuffer) {
        let layout = Layout::from_size_align(buffer.size(), PAGE_SIZE).unwrap();
        unsafe { dealloc(buffer.virt().as_ptr(), layout) };
        self.frees.fetch_add(1, Ordering::SeqCst);
    }
}

/// Secure monitor double answering every call with a closure.
pub struct FnScm<F> {
    f: F,
    calls: AtomicUsize,
}

impl<F> FnScm<F>
where
    F: Fn(&ScmDesc) -> Result<ScmResult, ScmError>,
{
    pub fn new(f: F) -> Self {
        Self {
            f,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl<F> ScmCall for FnScm<F>
where
    F: Fn(&ScmDesc) -> Result<ScmResult, ScmError>,
{
    fn call(&self, desc: &ScmDesc) -> Result<ScmResult, ScmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.f)(desc)
    }
}

/// View `len` bytes at a physical address handed out by [`TestAllocator`].
///
/// # Safety
///
/// The range must lie within a live [`TestAllocator`] buffer.
pub unsafe fn phys_bytes<'a>(phys: u64, len: u64) -> &'a mut [u8] {
    unsafe { core::slice::from_raw_parts_mut(phys as *mut u8, len as usize) }
}
