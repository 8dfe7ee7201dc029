use thiserror::Error;
use uom::si::{
    electric_current::ampere,
    electric_potential::volt,
    f64::{ElectricCurrent, ElectricPotential},
};

/// Number of host signals consumed per sample: clock, voltage, current.
pub const SIGNAL_COUNT: usize = 3;

/// Errors that can occur when decoding host signals.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    #[error("expected at least 3 input signals, got {got}")]
    TooFewSignals { got: usize },
}

/// Whether a sample is a control-update instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Keep the previous outputs.
    Hold,
    /// Run one control update.
    Active,
}

impl Gate {
    /// Decodes a raw clock signal.
    ///
    /// Only an exact `1.0` is [`Gate::Active`]; every other value, NaN
    /// included, holds.
    #[must_use]
    pub fn from_signal(clock: f64) -> Self {
        if clock == 1.0 {
            Gate::Active
        } else {
            Gate::Hold
        }
    }

    /// Returns `true` if the sample runs a control update.
    #[must_use]
    pub fn is_active(self) -> bool {
        self == Gate::Active
    }
}

/// Signals sampled by the host at one simulation instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurements {
    pub gate: Gate,
    pub voltage: ElectricPotential,
    pub current: ElectricCurrent,
}

impl Measurements {
    /// Creates measurements from SI quantities.
    #[must_use]
    pub fn new(gate: Gate, voltage: ElectricPotential, current: ElectricCurrent) -> Self {
        Self {
            gate,
            voltage,
            current,
        }
    }

    /// Decodes the host's `{clock, volts, amps}` input order.
    ///
    /// Signals past the third are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::TooFewSignals`] if fewer than three signals are
    /// supplied.
    pub fn from_signals(signals: &[f64]) -> Result<Self, InputError> {
        let [clock, volts, amps, ..] = *signals else {
            return Err(InputError::TooFewSignals { got: signals.len() });
        };

        Ok(Self::from([clock, volts, amps]))
    }

    /// Returns `self` with the given gate, keeping other fields unchanged.
    #[must_use]
    pub fn with_gate(self, gate: Gate) -> Self {
        Self { gate, ..self }
    }
}

impl From<[f64; SIGNAL_COUNT]> for Measurements {
    /// Decodes exactly one host sample in `{clock, volts, amps}` order.
    fn from([clock, volts, amps]: [f64; SIGNAL_COUNT]) -> Self {
        Self {
            gate: Gate::from_signal(clock),
            voltage: ElectricPotential::new::<volt>(volts),
            current: ElectricCurrent::new::<ampere>(amps),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn only_exact_one_is_active() {
        assert_eq!(Gate::from_signal(1.0), Gate::Active);

        for clock in [0.0, -1.0, 0.5, 0.999_999_999, 1.000_000_001, 2.0, f64::NAN] {
            assert_eq!(Gate::from_signal(clock), Gate::Hold, "clock = {clock}");
        }
    }

    #[test]
    fn decodes_host_order() {
        let m = Measurements::from_signals(&[1.0, 4.5, -0.25]).unwrap();

        assert!(m.gate.is_active());
        assert_relative_eq!(m.voltage.get::<volt>(), 4.5);
        assert_relative_eq!(m.current.get::<ampere>(), -0.25);
    }

    #[test]
    fn ignores_extra_signals() {
        let m = Measurements::from_signals(&[0.0, 1.0, 2.0, 99.0]).unwrap();
        assert_eq!(m.gate, Gate::Hold);
        assert_relative_eq!(m.current.get::<ampere>(), 2.0);
    }

    #[test]
    fn array_matches_slice_decoding() {
        let signals = [1.0, 4.5, -0.25];
        assert_eq!(
            Measurements::from(signals),
            Measurements::from_signals(&signals).unwrap()
        );
    }

    #[test]
    fn with_gate_only_replaces_gate() {
        let active = Measurements::from([1.0, 4.8, 0.3]);
        let held = active.with_gate(Gate::Hold);

        assert_eq!(held.gate, Gate::Hold);
        assert_eq!(held.voltage, active.voltage);
        assert_eq!(held.current, active.current);
        assert_eq!(held.with_gate(Gate::Active), active);
    }

    #[test]
    fn rejects_short_input() {
        assert_eq!(
            Measurements::from_signals(&[1.0, 5.0]),
            Err(InputError::TooFewSignals { got: 2 })
        );
        assert_eq!(
            Measurements::from_signals(&[]),
            Err(InputError::TooFewSignals { got: 0 })
        );
    }
}
