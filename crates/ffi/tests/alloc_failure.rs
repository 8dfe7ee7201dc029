use std::{
    alloc::{GlobalAlloc, Layout, System},
    ptr,
    sync::atomic::{AtomicBool, Ordering},
};

use cascade_core::{ControllerState, Snapshot};
use cascade_ffi::{calculate_outputs, initialize, snapshot, with_controller};

const CREATE: i32 = 1;
const DELETE: i32 = 4;

/// Fails the next allocation shaped like a snapshot while armed.
struct FailingAllocator {
    armed: AtomicBool,
}

unsafe impl GlobalAlloc for FailingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if layout == Layout::new::<Snapshot>() && self.armed.swap(false, Ordering::SeqCst) {
            return ptr::null_mut();
        }
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static ALLOCATOR: FailingAllocator = FailingAllocator {
    armed: AtomicBool::new(false),
};

fn live_state() -> ControllerState {
    with_controller(|controller| *controller.state())
}

#[test]
fn create_returns_null_when_allocation_fails() {
    initialize();

    let inputs = [1.0, 4.0, 0.0];
    let mut outputs = [0.0];
    unsafe { calculate_outputs(outputs.as_mut_ptr(), inputs.as_ptr(), 0.0, 1e-5) };
    let live = live_state();
    assert_ne!(live, ControllerState::ZERO);

    ALLOCATOR.armed.store(true, Ordering::SeqCst);
    let handle = unsafe { snapshot(CREATE, ptr::null_mut()) };
    ALLOCATOR.armed.store(false, Ordering::SeqCst);

    assert!(handle.is_null());
    assert_eq!(live_state(), live);

    // The next create succeeds once memory is available again.
    let handle = unsafe { snapshot(CREATE, ptr::null_mut()) };
    assert!(!handle.is_null());
    assert!(unsafe { snapshot(DELETE, handle) }.is_null());
}
