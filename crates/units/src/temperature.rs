use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

const CELSIUS_OFFSET: f64 = 273.15;

/// A physical temperature quantity using f64 precision.
///
/// The `Temperature` struct represents temperature with Kelvin as the base unit.
/// Every rate model works with absolute temperature, so Kelvin is what the
/// accessors hand out; Celsius is offered for input convenience.
///
/// # Examples
///
/// ```rust
/// use units::Temperature;
///
/// let ambient = Temperature::from_celsius(20.0);
/// assert!((ambient.to_kelvin() - 293.15).abs() < 1e-12);
///
/// let freezing = Temperature::water_freezing();
/// assert!(freezing < ambient);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct Temperature(f64); // Base unit: Kelvin

impl Temperature {
    /// Creates a new `Temperature` from a value in Kelvin.
    pub fn from_kelvin(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Temperature` from a value in Celsius.
    ///
    /// Converts Celsius to Kelvin: K = °C + 273.15
    pub fn from_celsius(value: f64) -> Self {
        Self(value + CELSIUS_OFFSET)
    }

    /// Returns the temperature value in Kelvin.
    pub fn to_kelvin(&self) -> f64 {
        self.0
    }

    /// Converts the temperature to Celsius.
    pub fn to_celsius(&self) -> f64 {
        self.0 - CELSIUS_OFFSET
    }

    /// Water freezing point at 1 atm (273.15 K / 0°C).
    pub fn water_freezing() -> Self {
        Self::from_kelvin(CELSIUS_OFFSET)
    }

    /// Water boiling point at 1 atm (373.15 K / 100°C).
    pub fn water_boiling() -> Self {
        Self::from_kelvin(CELSIUS_OFFSET + 100.0)
    }
}

impl Add for Temperature {
    type Output = Temperature;

    fn add(self, rhs: Temperature) -> Temperature {
        Temperature(self.0 + rhs.0)
    }
}

impl Sub for Temperature {
    type Output = Temperature;

    fn sub(self, rhs: Temperature) -> Temperature {
        Temperature(self.0 - rhs.0)
    }
}

impl Mul<f64> for Temperature {
    type Output = Temperature;

    fn mul(self, rhs: f64) -> Temperature {
        Temperature(self.0 * rhs)
    }
}

impl Div<f64> for Temperature {
    type Output = Temperature;

    fn div(self, rhs: f64) -> Temperature {
        Temperature(self.0 / rhs)
    }
}
