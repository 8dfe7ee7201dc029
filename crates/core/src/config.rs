use thiserror::Error;
use uom::si::{electric_potential::volt, f64::ElectricPotential};

use crate::pi::{Limits, PiGains, PiLoop};

/// Errors that can occur when validating a controller config.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    #[error("gains must be finite")]
    Gains,

    #[error("limits must be finite with min <= max")]
    Limits,

    #[error("duty scale must be finite with a positive command span")]
    DutyScale,

    #[error("reference voltage must be finite")]
    Reference,
}

/// Maps the current-loop command onto the duty-cycle output range.
///
/// The duty cycle is `command * full_scale / command_span`, evaluated left
/// to right.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawDutyScale"))]
pub struct DutyScale {
    full_scale: f64,
    command_span: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawDutyScale {
    full_scale: f64,
    command_span: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawDutyScale> for DutyScale {
    type Error = ConfigError;

    fn try_from(raw: RawDutyScale) -> Result<Self, Self::Error> {
        Self::new(raw.full_scale, raw.command_span)
    }
}

impl DutyScale {
    /// Creates a new duty scale.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DutyScale`] if either value is non-finite or
    /// `command_span` is not positive.
    pub fn new(full_scale: f64, command_span: f64) -> Result<Self, ConfigError> {
        if !full_scale.is_finite() || !command_span.is_finite() || command_span <= 0.0 {
            return Err(ConfigError::DutyScale);
        }

        Ok(Self {
            full_scale,
            command_span,
        })
    }

    /// Returns the duty cycle produced by the given command.
    #[must_use]
    pub fn apply(&self, command: f64) -> f64 {
        command * self.full_scale / self.command_span
    }

    /// Returns the duty cycle produced by a full-span command.
    #[must_use]
    pub fn full_scale(&self) -> f64 {
        self.full_scale
    }

    /// Returns the command value that maps to full scale.
    #[must_use]
    pub fn command_span(&self) -> f64 {
        self.command_span
    }
}

/// Configuration for the dual-loop controller.
///
/// The outer loop regulates the measured voltage to the reference and
/// produces a current setpoint.
/// The inner loop regulates the measured current to that setpoint and
/// produces the switching command, which is scaled into a duty cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawConfig"))]
pub struct Config {
    reference_volts: f64,
    voltage_loop: PiLoop,
    current_loop: PiLoop,
    duty_scale: DutyScale,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawConfig {
    reference_volts: f64,
    voltage_loop: PiLoop,
    current_loop: PiLoop,
    duty_scale: DutyScale,
}

#[cfg(feature = "serde")]
impl TryFrom<RawConfig> for Config {
    type Error = ConfigError;

    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        Self::new(
            ElectricPotential::new::<volt>(raw.reference_volts),
            raw.voltage_loop,
            raw.current_loop,
            raw.duty_scale,
        )
    }
}

impl Config {
    /// The parameter set the host model runs with.
    ///
    /// - Reference: 5 V.
    /// - Voltage loop: `0.4894 * Δe + 0.0174 * e`, setpoint clamped to ±20.
    /// - Current loop: `3.0588 * Δe + 0.2251 * e`, command clamped to [0, 10].
    /// - Duty cycle: `command * 300 / 10`.
    pub const DEFAULT: Self = Self {
        reference_volts: 5.0,
        voltage_loop: PiLoop::from_parts(
            PiGains::from_parts(0.4894, 0.0174),
            Limits::from_parts(-20.0, 20.0),
        ),
        current_loop: PiLoop::from_parts(
            PiGains::from_parts(3.0588, 0.2251),
            Limits::from_parts(0.0, 10.0),
        ),
        duty_scale: DutyScale {
            full_scale: 300.0,
            command_span: 10.0,
        },
    };

    /// Creates a new config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Reference`] if the reference voltage is not finite.
    pub fn new(
        reference: ElectricPotential,
        voltage_loop: PiLoop,
        current_loop: PiLoop,
        duty_scale: DutyScale,
    ) -> Result<Self, ConfigError> {
        let reference_volts = reference.get::<volt>();
        if !reference_volts.is_finite() {
            return Err(ConfigError::Reference);
        }

        Ok(Self {
            reference_volts,
            voltage_loop,
            current_loop,
            duty_scale,
        })
    }

    /// Returns the voltage reference.
    #[must_use]
    pub fn reference(&self) -> ElectricPotential {
        ElectricPotential::new::<volt>(self.reference_volts)
    }

    /// Returns the voltage reference in volts.
    #[must_use]
    pub fn reference_volts(&self) -> f64 {
        self.reference_volts
    }

    /// Returns the outer (voltage) loop.
    #[must_use]
    pub fn voltage_loop(&self) -> &PiLoop {
        &self.voltage_loop
    }

    /// Returns the inner (current) loop.
    #[must_use]
    pub fn current_loop(&self) -> &PiLoop {
        &self.current_loop
    }

    /// Returns the duty-cycle scaling.
    #[must_use]
    pub fn duty_scale(&self) -> &DutyScale {
        &self.duty_scale
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn default_matches_host_constants() {
        let config = Config::default();

        assert_eq!(config.reference_volts(), 5.0);
        assert_eq!(config.voltage_loop().gains().proportional(), 0.4894);
        assert_eq!(config.voltage_loop().gains().integral(), 0.0174);
        assert_eq!(config.voltage_loop().limits().min(), -20.0);
        assert_eq!(config.voltage_loop().limits().max(), 20.0);
        assert_eq!(config.current_loop().gains().proportional(), 3.0588);
        assert_eq!(config.current_loop().gains().integral(), 0.2251);
        assert_eq!(config.current_loop().limits().min(), 0.0);
        assert_eq!(config.current_loop().limits().max(), 10.0);
        assert_relative_eq!(config.duty_scale().apply(10.0), 300.0);
    }

    #[test]
    fn duty_scale_rejects_bad_span() {
        assert_eq!(DutyScale::new(300.0, 0.0), Err(ConfigError::DutyScale));
        assert_eq!(DutyScale::new(300.0, -1.0), Err(ConfigError::DutyScale));
        assert_eq!(DutyScale::new(f64::NAN, 10.0), Err(ConfigError::DutyScale));
        assert_eq!(
            DutyScale::new(300.0, f64::INFINITY),
            Err(ConfigError::DutyScale)
        );
    }

    #[test]
    fn duty_scale_evaluates_multiply_then_divide() {
        let scale = DutyScale::new(300.0, 10.0).unwrap();
        let command = 1.664_280_52;

        assert_eq!(scale.apply(command), command * 300.0 / 10.0);
    }

    #[test]
    fn rejects_non_finite_reference() {
        let result = Config::new(
            ElectricPotential::new::<volt>(f64::NAN),
            *Config::DEFAULT.voltage_loop(),
            *Config::DEFAULT.current_loop(),
            *Config::DEFAULT.duty_scale(),
        );

        assert_eq!(result, Err(ConfigError::Reference));
    }

    #[test]
    fn reference_round_trips_through_uom() {
        let config = Config::default();
        assert_relative_eq!(config.reference().get::<volt>(), 5.0);
    }

    #[cfg(feature = "serde")]
    mod toml_config {
        use super::*;

        const HOST_TOML: &str = r#"
            reference_volts = 5.0

            [voltage_loop.gains]
            proportional = 0.4894
            integral = 0.0174

            [voltage_loop.limits]
            min = -20.0
            max = 20.0

            [current_loop.gains]
            proportional = 3.0588
            integral = 0.2251

            [current_loop.limits]
            min = 0.0
            max = 10.0

            [duty_scale]
            full_scale = 300.0
            command_span = 10.0
        "#;

        #[test]
        fn parses_host_parameters_from_toml() {
            let config: Config = toml::from_str(HOST_TOML).unwrap();
            assert_eq!(config, Config::DEFAULT);
        }

        #[test]
        fn default_survives_toml_round_trip() {
            let text = toml::to_string(&Config::DEFAULT).unwrap();
            let config: Config = toml::from_str(&text).unwrap();
            assert_eq!(config, Config::DEFAULT);
        }

        #[test]
        fn deserialization_validates_limits() {
            let text = HOST_TOML.replace("min = -20.0", "min = 30.0");
            let result: Result<Config, _> = toml::from_str(&text);

            let err = result.unwrap_err();
            assert!(err.to_string().contains("min <= max"));
        }

        #[test]
        fn deserialization_validates_duty_scale() {
            let text = HOST_TOML.replace("command_span = 10.0", "command_span = 0.0");
            let result: Result<Config, _> = toml::from_str(&text);

            assert!(result.is_err());
        }
    }
}
