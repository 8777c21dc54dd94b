/// Dynamic viscosity in Pa·s
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct Viscosity(pub f64);

impl Viscosity {
    pub fn from_pascal_seconds(value: f64) -> Self {
        Self(value)
    }

    /// Centipoise (1 cP = 10⁻³ Pa·s)
    pub fn from_centipoise(value: f64) -> Self {
        Self(value * 1e-3)
    }

    pub fn to_pascal_seconds(&self) -> f64 {
        self.0
    }
}
