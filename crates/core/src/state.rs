/// Persistent state of the dual-loop controller.
///
/// Every field is zero after initialization and changes only on an active
/// sample.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerState {
    /// Last computed duty cycle, held between active samples.
    pub duty_cycle: f64,
    /// Voltage-loop error at the previous active sample.
    pub voltage_error_prev: f64,
    /// Current-loop setpoint produced by the voltage loop.
    pub current_setpoint: f64,
    /// Current-loop error at the previous active sample.
    pub current_error_prev: f64,
    /// Switching-voltage command produced by the current loop.
    pub switch_voltage: f64,
}

impl ControllerState {
    /// The initialized state.
    pub const ZERO: Self = Self {
        duty_cycle: 0.0,
        voltage_error_prev: 0.0,
        current_setpoint: 0.0,
        current_error_prev: 0.0,
        switch_voltage: 0.0,
    };
}
