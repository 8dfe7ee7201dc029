//! A discrete dual-loop PI controller for power-converter simulation.
//!
//! An outer voltage loop produces a current setpoint, and an inner current
//! loop turns that setpoint into a switching command scaled as a duty cycle.
//! Updates happen only on samples where the host's gating clock is active;
//! every other sample holds the last output.
//!
//! - [`Controller`]: owns the state and runs the host lifecycle
//! - [`DualLoopLaw`]: the pure update rule, as a [`Component`]
//! - [`Snapshot`]: an independent copy of the state for checkpoint/rollback
//! - [`Config`]: the loop gains, limits, reference, and duty scaling
//!
//! # Features
//!
//! - `serde` (default): `Serialize`/`Deserialize` for [`Config`],
//!   [`ControllerState`], and [`Snapshot`].

mod component;
mod config;
mod controller;
mod law;
mod measurements;
mod pi;
mod snapshot;
mod state;

pub use component::Component;
pub use config::{Config, ConfigError, DutyScale};
pub use controller::Controller;
pub use law::{DualLoopLaw, LawInput};
pub use measurements::{Gate, InputError, Measurements, SIGNAL_COUNT};
pub use pi::{Limits, PiGains, PiLoop};
pub use snapshot::{Snapshot, SnapshotMode, SnapshotModeError};
pub use state::ControllerState;
