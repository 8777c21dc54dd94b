use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Mul, Sub};

use crate::{Density, Length};

/// A physical mass quantity using f64 precision.
///
/// The `Mass` struct represents mass values with kilograms as the base unit.
/// Single droplet masses span many decades (10⁻²⁵ kg for a nucleated
/// cluster, 10⁻¹² kg for a drizzle drop), so the sphere conversions below
/// are the usual way in and out.
///
/// # Examples
///
/// ```rust
/// use units::{Density, Length, Mass};
///
/// let water = Density::from_kg_per_m3(1000.0);
/// let droplet = Mass::of_sphere(Length::from_microns(10.0), water);
///
/// let diameter = droplet.sphere_diameter(water);
/// assert!((diameter.to_microns() - 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Mass(f64); // Base unit: kg

impl Mass {
    /// Creates a zero mass value
    pub fn zero() -> Self {
        Self(0.0)
    }

    /// Creates a new `Mass` from a value in kilograms.
    pub fn from_kg(value: f64) -> Self {
        Self(value)
    }

    /// Creates a new `Mass` from a value in grams.
    pub fn from_grams(value: f64) -> Self {
        Self(value * 1e-3)
    }

    /// Mass of a sphere of the given diameter and density.
    ///
    /// m = (π/6) ρ d³
    pub fn of_sphere(diameter: Length, density: Density) -> Self {
        Self(std::f64::consts::PI / 6.0 * density.to_kg_per_m3() * diameter.powi(3))
    }

    /// Returns the mass in kilograms.
    pub fn to_kg(&self) -> f64 {
        self.0
    }

    /// Converts the mass to grams.
    pub fn to_grams(&self) -> f64 {
        self.0 * 1e3
    }

    /// Diameter of a sphere with this mass and the given density.
    ///
    /// d = (6 m / (π ρ))^(1/3)
    pub fn sphere_diameter(&self, density: Density) -> Length {
        Length::from_m((6.0 * self.0 / (std::f64::consts::PI * density.to_kg_per_m3())).cbrt())
    }
}

impl Add for Mass {
    type Output = Mass;

    fn add(self, rhs: Mass) -> Mass {
        Mass(self.0 + rhs.0)
    }
}

impl Sub for Mass {
    type Output = Mass;

    fn sub(self, rhs: Mass) -> Mass {
        Mass(self.0 - rhs.0)
    }
}

impl Mul<f64> for Mass {
    type Output = Mass;

    fn mul(self, rhs: f64) -> Mass {
        Mass(self.0 * rhs)
    }
}

impl Div<f64> for Mass {
    type Output = Mass;

    fn div(self, rhs: f64) -> Mass {
        Mass(self.0 / rhs)
    }
}

/// Allow f64 * Mass (commutative multiplication)
impl Mul<Mass> for f64 {
    type Output = Mass;

    fn mul(self, rhs: Mass) -> Mass {
        rhs * self
    }
}
