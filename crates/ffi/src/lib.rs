//! C ABI plug-in for the Cascade dual-loop PI controller.
//!
//! A host simulator loads the compiled `cdylib` and drives one process-wide
//! [`Controller`] through four C-linkage symbols:
//!
//! ```c
//! void initialize(void);
//! void calculate_outputs(double* outputs, double* inputs, double time, double time_step);
//! void terminate(void);
//! void* snapshot(snapshot_mode mode, void* snapshot);
//! ```
//!
//! `inputs` holds `{clock, measured_voltage, measured_current}` and
//! `outputs[0]` receives the duty cycle.
//! Snapshot modes are `CREATE = 1`, `UPDATE = 2`, `LOAD = 3`, `DELETE = 4`.
//!
//! Misuse the layer can detect is logged through `tracing` and answered with
//! a null handle or no write, never with undefined behavior: unknown modes,
//! null handles for `UPDATE`/`LOAD`, and null buffers.
//! Dangling or foreign non-null handles are still the host's responsibility.

mod heap;

use std::{
    ffi::{c_int, c_void},
    ptr,
    sync::{Mutex, MutexGuard, PoisonError},
};

use cascade_core::{Config, Controller, Measurements, SIGNAL_COUNT, Snapshot, SnapshotMode};
use tracing::{debug, error};
use uom::si::{f64::Time, time::second};

static CONTROLLER: Mutex<Controller> = Mutex::new(Controller::new(Config::DEFAULT));

fn controller() -> MutexGuard<'static, Controller> {
    CONTROLLER.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs `f` against the controller the exported symbols drive.
///
/// Lets Rust code embedding this crate inspect or prepare the live
/// controller between host calls.
pub fn with_controller<R>(f: impl FnOnce(&mut Controller) -> R) -> R {
    f(&mut controller())
}

/// Resets the controller state to zero.
#[unsafe(no_mangle)]
pub extern "C" fn initialize() {
    controller().initialize();
}

/// Processes one host sample and writes the duty cycle to `outputs[0]`.
///
/// A null `outputs` or `inputs` is logged and nothing is written.
///
/// # Safety
///
/// `inputs` must point to at least three readable `f64` values and
/// `outputs` to at least one writable `f64`.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn calculate_outputs(
    outputs: *mut f64,
    inputs: *const f64,
    time: f64,
    time_step: f64,
) {
    if outputs.is_null() || inputs.is_null() {
        error!(
            outputs_null = outputs.is_null(),
            inputs_null = inputs.is_null(),
            "calculate_outputs called with a null buffer"
        );
        return;
    }

    // SAFETY: the caller guarantees `SIGNAL_COUNT` readable values, and
    // `[f64; N]` has the alignment of `f64`.
    let signals = unsafe { inputs.cast::<[f64; SIGNAL_COUNT]>().read() };
    let measurements = Measurements::from(signals);

    let duty_cycle = controller().step(
        measurements,
        Time::new::<second>(time),
        Time::new::<second>(time_step),
    );

    // SAFETY: the caller guarantees one writable value.
    unsafe { outputs.write(duty_cycle) };
}

/// Ends the run. The controller state is left unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn terminate() {
    controller().terminate();
}

/// Creates, updates, loads, or deletes a snapshot of the controller state.
///
/// - `CREATE`: returns a new handle, or null if allocation fails.
/// - `UPDATE`: copies the live state into `handle` and returns it.
/// - `LOAD`: copies `handle` into the live state and returns it.
/// - `DELETE`: releases `handle` and returns null.
///
/// An unknown mode, or a null handle with `UPDATE`/`LOAD`, is logged and
/// returns null without touching any state.
///
/// # Safety
///
/// A non-null `handle` must come from a `CREATE` call on this library and
/// must not have been deleted.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn snapshot(mode: c_int, handle: *mut c_void) -> *mut c_void {
    let mode = match SnapshotMode::try_from(i32::from(mode)) {
        Ok(mode) => mode,
        Err(err) => {
            error!(%err, "snapshot request rejected");
            return ptr::null_mut();
        }
    };

    let handle = handle.cast::<Snapshot>();

    match mode {
        SnapshotMode::Create => {
            let created = heap::allocate(controller().snapshot());
            if created.is_null() {
                error!("snapshot allocation failed");
            }
            created.cast()
        }
        SnapshotMode::Update => {
            // SAFETY: non-null handles are live snapshots per the contract above.
            let Some(target) = (unsafe { handle.as_mut() }) else {
                error!("snapshot update requested with a null handle");
                return ptr::null_mut();
            };
            controller().update_snapshot(target);
            handle.cast()
        }
        SnapshotMode::Load => {
            // SAFETY: non-null handles are live snapshots per the contract above.
            let Some(source) = (unsafe { handle.as_ref() }) else {
                error!("snapshot load requested with a null handle");
                return ptr::null_mut();
            };
            controller().restore(source);
            handle.cast()
        }
        SnapshotMode::Delete => {
            // SAFETY: non-null handles came from `CREATE` and are deleted once.
            unsafe { heap::release(handle) };
            debug!("snapshot deleted");
            ptr::null_mut()
        }
    }
}
