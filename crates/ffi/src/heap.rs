//! Raw snapshot handles passed across the C boundary.
//!
//! A handle is a pointer to a heap-allocated [`Snapshot`] with the layout of
//! `Box<Snapshot>`, so [`release`] can hand it back to `Box` for dropping.

use std::alloc::{Layout, alloc};

use cascade_core::Snapshot;

/// Moves `snapshot` to the heap and returns its handle.
///
/// Returns null if the allocation fails.
pub(crate) fn allocate(snapshot: Snapshot) -> *mut Snapshot {
    let layout = Layout::new::<Snapshot>();

    // SAFETY: `Snapshot` is not zero-sized, so the layout is non-zero.
    let ptr = unsafe { alloc(layout) }.cast::<Snapshot>();
    if ptr.is_null() {
        return ptr;
    }

    // SAFETY: `ptr` is non-null, aligned, and sized for one `Snapshot`.
    unsafe { ptr.write(snapshot) };
    ptr
}

/// Drops the snapshot behind `handle`. A null handle is ignored.
///
/// # Safety
///
/// `handle` must be null or come from [`allocate`] and not have been
/// released already.
pub(crate) unsafe fn release(handle: *mut Snapshot) {
    if handle.is_null() {
        return;
    }

    // SAFETY: memory from the global allocator with `Layout::new::<Snapshot>()`
    // holding an initialized value is a valid `Box<Snapshot>`.
    drop(unsafe { Box::from_raw(handle) });
}
