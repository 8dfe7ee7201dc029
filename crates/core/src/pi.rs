//! Discrete PI compensator in incremental (Tustin) form.
//!
//! Each active sample advances the loop output by
//!
//! ```text
//! u[n] = clamp(u[n-1] + kp * (e[n] - e[n-1]) + ki * e[n], min, max)
//! ```
//!
//! The terms are summed left to right; reordering them changes rounding.
//! Saturation is a plain clamp with no further anti-windup.

use crate::config::ConfigError;

/// Incremental PI coefficients.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawPiGains"))]
pub struct PiGains {
    proportional: f64,
    integral: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawPiGains {
    proportional: f64,
    integral: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawPiGains> for PiGains {
    type Error = ConfigError;

    fn try_from(raw: RawPiGains) -> Result<Self, Self::Error> {
        Self::new(raw.proportional, raw.integral)
    }
}

impl PiGains {
    /// Creates new gains.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Gains`] if either gain is non-finite.
    pub fn new(proportional: f64, integral: f64) -> Result<Self, ConfigError> {
        if !proportional.is_finite() || !integral.is_finite() {
            return Err(ConfigError::Gains);
        }

        Ok(Self {
            proportional,
            integral,
        })
    }

    /// Known-good constants only.
    pub(crate) const fn from_parts(proportional: f64, integral: f64) -> Self {
        Self {
            proportional,
            integral,
        }
    }

    /// Returns the coefficient applied to the error increment.
    #[must_use]
    pub fn proportional(&self) -> f64 {
        self.proportional
    }

    /// Returns the coefficient applied to the current error.
    #[must_use]
    pub fn integral(&self) -> f64 {
        self.integral
    }
}

/// Closed saturation interval for a loop output.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawLimits"))]
pub struct Limits {
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawLimits {
    min: f64,
    max: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawLimits> for Limits {
    type Error = ConfigError;

    fn try_from(raw: RawLimits) -> Result<Self, Self::Error> {
        Self::new(raw.min, raw.max)
    }
}

impl Limits {
    /// Creates new limits.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Limits`] if either bound is non-finite or
    /// `min > max`.
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        if !min.is_finite() || !max.is_finite() || min > max {
            return Err(ConfigError::Limits);
        }

        Ok(Self { min, max })
    }

    pub(crate) const fn from_parts(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns the lower bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Returns the upper bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Saturates `value` to `[min, max]`.
    ///
    /// The upper bound is checked first, then the lower bound.
    /// A NaN passes through unchanged.
    #[must_use]
    pub fn saturate(&self, value: f64) -> f64 {
        let value = if value > self.max { self.max } else { value };
        if value < self.min { self.min } else { value }
    }

    /// Returns `true` if `value` lies within the limits.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// One PI loop: gains plus output saturation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PiLoop {
    gains: PiGains,
    limits: Limits,
}

impl PiLoop {
    /// Creates a loop from validated gains and limits.
    #[must_use]
    pub fn new(gains: PiGains, limits: Limits) -> Self {
        Self { gains, limits }
    }

    pub(crate) const fn from_parts(gains: PiGains, limits: Limits) -> Self {
        Self { gains, limits }
    }

    /// Returns the loop gains.
    #[must_use]
    pub fn gains(&self) -> &PiGains {
        &self.gains
    }

    /// Returns the output limits.
    #[must_use]
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Advances the loop output by one sample.
    ///
    /// # Parameters
    ///
    /// - `output`: Loop output after the previous active sample.
    /// - `error`: Error at this sample.
    /// - `error_prev`: Error at the previous active sample.
    ///
    /// # Returns
    ///
    /// The saturated loop output for this sample.
    #[must_use]
    pub fn update(&self, output: f64, error: f64, error_prev: f64) -> f64 {
        let unclamped = output
            + self.gains.proportional * (error - error_prev)
            + self.gains.integral * error;
        self.limits.saturate(unclamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn test_loop() -> PiLoop {
        PiLoop::new(
            PiGains::new(0.5, 0.1).unwrap(),
            Limits::new(-1.0, 1.0).unwrap(),
        )
    }

    #[test]
    fn zero_error_holds_output() {
        let pi = test_loop();
        assert_eq!(pi.update(0.3, 0.0, 0.0), 0.3);
    }

    #[test]
    fn step_error_applies_both_terms() {
        let pi = test_loop();

        // 0.0 + 0.5 * (0.4 - 0.0) + 0.1 * 0.4
        assert_relative_eq!(pi.update(0.0, 0.4, 0.0), 0.24, epsilon = 1e-12);

        // Constant error only integrates.
        assert_relative_eq!(pi.update(0.24, 0.4, 0.4), 0.28, epsilon = 1e-12);
    }

    #[test]
    fn falling_error_pulls_output_back() {
        let pi = test_loop();
        assert_relative_eq!(pi.update(0.5, 0.0, 0.4), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn output_saturates_at_both_limits() {
        let pi = test_loop();
        assert_eq!(pi.update(0.9, 10.0, 0.0), 1.0);
        assert_eq!(pi.update(-0.9, -10.0, 0.0), -1.0);
    }

    #[test]
    fn saturate_is_identity_inside_limits() {
        let limits = Limits::new(0.0, 10.0).unwrap();
        assert_eq!(limits.saturate(0.0), 0.0);
        assert_eq!(limits.saturate(4.2), 4.2);
        assert_eq!(limits.saturate(10.0), 10.0);
        assert_eq!(limits.saturate(10.5), 10.0);
        assert_eq!(limits.saturate(-0.5), 0.0);
        assert!(limits.saturate(f64::NAN).is_nan());
    }

    #[test]
    fn degenerate_limits_pin_output() {
        let limits = Limits::new(2.0, 2.0).unwrap();
        assert_eq!(limits.saturate(-7.0), 2.0);
        assert_eq!(limits.saturate(7.0), 2.0);
    }

    #[test]
    fn rejects_invalid_limits() {
        assert_eq!(Limits::new(1.0, -1.0), Err(ConfigError::Limits));
        assert_eq!(Limits::new(f64::NAN, 1.0), Err(ConfigError::Limits));
        assert_eq!(
            Limits::new(0.0, f64::INFINITY),
            Err(ConfigError::Limits)
        );
    }

    #[test]
    fn rejects_non_finite_gains() {
        assert_eq!(PiGains::new(f64::NAN, 0.1), Err(ConfigError::Gains));
        assert_eq!(PiGains::new(0.5, f64::NEG_INFINITY), Err(ConfigError::Gains));
    }
}
