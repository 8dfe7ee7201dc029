use std::convert::Infallible;

use uom::si::{electric_current::ampere, electric_potential::volt};

use crate::{
    Component,
    config::Config,
    measurements::{Gate, Measurements},
    state::ControllerState,
};

/// Input to the [`DualLoopLaw`]: the state before the sample plus the
/// sampled signals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LawInput {
    pub state: ControllerState,
    pub measurements: Measurements,
}

/// Cascaded voltage/current PI control law.
///
/// On an active sample:
///
/// 1. `e_v = V_ref - V_measured`
/// 2. The voltage loop advances the current setpoint from `e_v` and the
///    previous voltage error, clamped to the voltage-loop limits.
/// 3. `e_i = I_setpoint - I_measured`
/// 4. The current loop advances the switching command from `e_i` and the
///    previous current error, clamped to the current-loop limits.
/// 5. The command is scaled into the duty cycle.
///
/// On a held sample the state is returned unchanged.
///
/// # Example
///
/// ```
/// use cascade_core::{
///     Component, Config, ControllerState, DualLoopLaw, Gate, LawInput, Measurements,
/// };
/// use uom::si::{
///     electric_current::ampere,
///     electric_potential::volt,
///     f64::{ElectricCurrent, ElectricPotential},
/// };
///
/// let law = DualLoopLaw::new(Config::DEFAULT);
/// let input = LawInput {
///     state: ControllerState::ZERO,
///     measurements: Measurements::new(
///         Gate::Active,
///         ElectricPotential::new::<volt>(5.0),
///         ElectricCurrent::new::<ampere>(0.0),
///     ),
/// };
///
/// // On reference with no current: nothing moves.
/// let next = law.call(input).unwrap();
/// assert_eq!(next, ControllerState::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualLoopLaw {
    config: Config,
}

impl DualLoopLaw {
    /// Creates the law for the given config.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Returns the law's config.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl Default for DualLoopLaw {
    fn default() -> Self {
        Self::new(Config::DEFAULT)
    }
}

impl Component for DualLoopLaw {
    type Input = LawInput;
    type Output = ControllerState;
    type Error = Infallible;

    fn call(&self, input: Self::Input) -> Result<Self::Output, Self::Error> {
        let LawInput {
            state,
            measurements,
        } = input;

        if measurements.gate == Gate::Hold {
            return Ok(state);
        }

        let voltage_measured = measurements.voltage.get::<volt>();
        let current_measured = measurements.current.get::<ampere>();

        // Voltage loop
        let voltage_error = self.config.reference_volts() - voltage_measured;
        let current_setpoint = self.config.voltage_loop().update(
            state.current_setpoint,
            voltage_error,
            state.voltage_error_prev,
        );

        // Current loop
        let current_error = current_setpoint - current_measured;
        let switch_voltage = self.config.current_loop().update(
            state.switch_voltage,
            current_error,
            state.current_error_prev,
        );

        Ok(ControllerState {
            duty_cycle: self.config.duty_scale().apply(switch_voltage),
            voltage_error_prev: voltage_error,
            current_setpoint,
            current_error_prev: current_error,
            switch_voltage,
        })
    }
}
