use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

pub const MICRON_TO_M: f64 = 1e-6;
pub const NANOMETER_TO_M: f64 = 1e-9;
pub const CM_TO_M: f64 = 1e-2;

/// A physical length quantity using f64 precision.
///
/// The `Length` struct represents length values with meters as the base unit.
/// Droplet diameters are usually quoted in microns or nanometers, so both
/// have dedicated constructors.
///
/// # Examples
///
/// ```rust
/// use units::Length;
///
/// let fog_droplet = Length::from_microns(10.0);
/// let cluster = Length::from_nanometers(1.5);
///
/// let meters = fog_droplet.to_m();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Length(f64); // Base unit: m

impl Length {
    /// Creates a zero length value
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `Length` from a value in meters.
    pub fn from_m(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Length` from a value in centimeters.
    pub fn from_cm(value: f64) -> Self {
        Self(value * CM_TO_M)
    }

    /// Creates a new `Length` from a value in microns.
    pub fn from_microns(value: f64) -> Self {
        Self(value * MICRON_TO_M)
    }

    /// Creates a new `Length` from a value in nanometers.
    pub fn from_nanometers(value: f64) -> Self {
        Self(value * NANOMETER_TO_M)
    }

    /// Returns the length in meters.
    pub fn to_m(&self) -> f64 {
        self.0
    }

    /// Converts the length to centimeters.
    pub fn to_cm(&self) -> f64 {
        self.0 / CM_TO_M
    }

    /// Converts the length to microns.
    pub fn to_microns(&self) -> f64 {
        self.0 / MICRON_TO_M
    }

    /// Converts the length to nanometers.
    pub fn to_nanometers(&self) -> f64 {
        self.0 / NANOMETER_TO_M
    }

    /// Returns the minimum of two lengths.
    pub fn min(self, other: Self) -> Self {
        if self.0 < other.0 {
            self
        } else {
            other
        }
    }

    /// Returns the maximum of two lengths.
    pub fn max(self, other: Self) -> Self {
        if self.0 > other.0 {
            self
        } else {
            other
        }
    }

    /// Clamp between two bounds.
    pub fn clamp(self, lower: Self, upper: Self) -> Self {
        self.max(lower).min(upper)
    }

    /// Raise to integer power (returns dimensionless f64 for dimensional consistency)
    pub fn powi(&self, n: i32) -> f64 {
        self.0.powi(n)
    }

    /// Power function
    pub fn powf(&self, n: f64) -> f64 {
        self.0.powf(n)
    }
}

impl Add for Length {
    type Output = Length;

    fn add(self, rhs: Length) -> Length {
        Length(self.0 + rhs.0)
    }
}

impl Sub for Length {
    type Output = Length;

    fn sub(self, rhs: Length) -> Length {
        Length(self.0 - rhs.0)
    }
}

impl Mul<f64> for Length {
    type Output = Length;

    fn mul(self, rhs: f64) -> Length {
        Length(self.0 * rhs)
    }
}

impl Div<f64> for Length {
    type Output = Length;

    fn div(self, rhs: f64) -> Length {
        Length(self.0 / rhs)
    }
}

/// Division of Length by Length returns a dimensionless ratio
impl Div for Length {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}

/// Allow f64 * Length (commutative multiplication)
impl Mul<Length> for f64 {
    type Output = Length;

    fn mul(self, rhs: Length) -> Length {
        rhs * self
    }
}
