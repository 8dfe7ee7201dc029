use tracing::{debug, trace};
use uom::si::{f64::Time, time::second};

use crate::{
    Component,
    config::Config,
    law::{DualLoopLaw, LawInput},
    measurements::Measurements,
    snapshot::Snapshot,
    state::ControllerState,
};

/// A dual-loop PI controller that owns its state.
///
/// The lifecycle mirrors the host's: [`initialize`] once, [`step`] once per
/// sample, [`snapshot`]/[`update_snapshot`]/[`restore`] between steps as
/// needed, and [`terminate`] at the end.
///
/// # Example
///
/// ```
/// use cascade_core::{Controller, Gate, Measurements};
/// use uom::si::{
///     electric_current::ampere,
///     electric_potential::volt,
///     f64::{ElectricCurrent, ElectricPotential, Time},
///     time::microsecond,
/// };
///
/// let mut controller = Controller::default();
/// controller.initialize();
///
/// let sample = Measurements::new(
///     Gate::Active,
///     ElectricPotential::new::<volt>(4.0),
///     ElectricCurrent::new::<ampere>(0.0),
/// );
/// let dt = Time::new::<microsecond>(10.0);
///
/// let checkpoint = controller.snapshot();
/// let duty = controller.step(sample, Time::default(), dt);
/// assert!(duty > 0.0);
///
/// controller.restore(&checkpoint);
/// assert_eq!(controller.state().duty_cycle, 0.0);
/// ```
///
/// [`initialize`]: Controller::initialize
/// [`step`]: Controller::step
/// [`snapshot`]: Controller::snapshot
/// [`update_snapshot`]: Controller::update_snapshot
/// [`restore`]: Controller::restore
/// [`terminate`]: Controller::terminate
#[derive(Debug, Clone, PartialEq)]
pub struct Controller {
    law: DualLoopLaw,
    state: ControllerState,
}

impl Controller {
    /// Creates a controller with zero state.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self {
            law: DualLoopLaw::new(config),
            state: ControllerState::ZERO,
        }
    }

    /// Resets every state field to zero.
    pub fn initialize(&mut self) {
        self.state = ControllerState::ZERO;
        debug!("controller initialized");
    }

    /// Processes one host sample and returns the duty cycle.
    ///
    /// On a held sample the previous duty cycle is returned and nothing
    /// changes.
    /// `time` and `time_step` do not enter the control law; updates are
    /// driven only by the gate.
    pub fn step(&mut self, measurements: Measurements, time: Time, time_step: Time) -> f64 {
        let Ok(next) = self.law.call(LawInput {
            state: self.state,
            measurements,
        });

        if measurements.gate.is_active() {
            trace!(
                time = time.get::<second>(),
                time_step = time_step.get::<second>(),
                current_setpoint = next.current_setpoint,
                switch_voltage = next.switch_voltage,
                duty_cycle = next.duty_cycle,
                "control update"
            );
        }

        self.state = next;
        self.state.duty_cycle
    }

    /// Ends the run. The state is left as is.
    pub fn terminate(&mut self) {
        debug!(duty_cycle = self.state.duty_cycle, "controller terminated");
    }

    /// Returns the live state.
    #[must_use]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Returns the controller's config.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.law.config()
    }

    /// Captures the live state in a new, independent snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        debug!("snapshot created");
        Snapshot::from(self.state)
    }

    /// Overwrites `snapshot` with the live state.
    pub fn update_snapshot(&self, snapshot: &mut Snapshot) {
        snapshot.overwrite(self.state);
        debug!("snapshot updated");
    }

    /// Overwrites the live state with `snapshot`, which is left unchanged.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.state = *snapshot.state();
        debug!(duty_cycle = self.state.duty_cycle, "snapshot loaded");
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(Config::DEFAULT)
    }
}
