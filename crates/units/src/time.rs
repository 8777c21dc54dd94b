use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

pub(crate) const MILLISECONDS_PER_SECOND: f64 = 1_000.0;
pub(crate) const MICROSECONDS_PER_SECOND: f64 = 1_000_000.0;

/// A physical time quantity using f64 precision.
///
/// The `Time` struct represents time with seconds as the base unit. Flow
/// solver steps are typically micro- to milliseconds.
///
/// # Examples
///
/// ```rust
/// use units::Time;
///
/// let dt = Time::from_milliseconds(0.5);
/// assert!((dt.to_seconds() - 5e-4).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Time(f64); // Base unit: seconds

impl Time {
    /// Creates a zero time value
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `Time` from a value in seconds.
    pub fn from_seconds(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Time` from a value in milliseconds.
    pub fn from_milliseconds(value: f64) -> Self {
        Self(value / MILLISECONDS_PER_SECOND)
    }

    /// Creates a new `Time` from a value in microseconds.
    pub fn from_microseconds(value: f64) -> Self {
        Self(value / MICROSECONDS_PER_SECOND)
    }

    /// Returns the time in seconds.
    pub fn to_seconds(&self) -> f64 {
        self.0
    }

    /// Converts the time to milliseconds.
    pub fn to_milliseconds(&self) -> f64 {
        self.0 * MILLISECONDS_PER_SECOND
    }

    /// Converts the time to microseconds.
    pub fn to_microseconds(&self) -> f64 {
        self.0 * MICROSECONDS_PER_SECOND
    }
}

impl Add for Time {
    type Output = Time;

    fn add(self, rhs: Time) -> Time {
        Time(self.0 + rhs.0)
    }
}

impl Sub for Time {
    type Output = Time;

    fn sub(self, rhs: Time) -> Time {
        Time(self.0 - rhs.0)
    }
}

impl Mul<f64> for Time {
    type Output = Time;

    fn mul(self, rhs: f64) -> Time {
        Time(self.0 * rhs)
    }
}

impl Div<f64> for Time {
    type Output = Time;

    fn div(self, rhs: f64) -> Time {
        Time(self.0 / rhs)
    }
}

/// Division of Time by Time returns a dimensionless ratio
impl Div for Time {
    type Output = f64;

    fn div(self, rhs: Self) -> f64 {
        self.0 / rhs.0
    }
}
