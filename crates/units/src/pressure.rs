/// One standard atmosphere in Pa
pub const STANDARD_ATMOSPHERE_PA: f64 = 101_325.0;

/// Pressure in Pa (N/m²)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Pressure(pub f64);

impl Pressure {
    pub fn from_pascals(value: f64) -> Self {
        Self(value)
    }

    pub fn from_bar(value: f64) -> Self {
        Self(value * 1e5)
    }

    pub fn standard_atmosphere() -> Self {
        Self(STANDARD_ATMOSPHERE_PA)
    }

    pub fn to_pascals(&self) -> f64 {
        self.0
    }

    pub fn to_bar(&self) -> f64 {
        self.0 * 1e-5
    }
}
