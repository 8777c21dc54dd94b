//! Rate models for the three droplet processes.
//!
//! Each process has one strategy selected at setup from configuration:
//!
//! - [`NucleationModel`]: birth of new droplets from supersaturated vapor
//! - [`CondensationModel`]: growth and evaporation of existing droplets
//! - [`CoalescenceModel`]: merging of droplet pairs
//!
//! All rate evaluations are pure functions of one cell's [`CellState`] and
//! return a fresh result with an `active` flag; nothing is cached between
//! cells or steps.
//!
//! [`CellState`]: crate::thermo::CellState

mod coalescence;
mod condensation;
mod nucleation;

#[cfg(test)]
mod condensation_test;
#[cfg(test)]
mod nucleation_test;

pub use coalescence::{CoalescenceModel, CoalescenceResult, KernelTerm};
pub use condensation::{
    exponential_relaxation, CondensationModel, CondensationResult, Convection, DiffusivityMode,
    MaxwellCondensation, TransitionRegime,
};
pub use nucleation::{ClassicalNucleation, NucleationModel, NucleationResult};

use crate::constants::{PI, R_GAS, SMALL};
use crate::thermo::{CellState, SpeciesProperties};

/// Setup-time data every rate model may need besides the cell state.
#[derive(Debug, Clone, Copy)]
pub struct ModelContext<'a> {
    pub species: &'a [SpeciesProperties],
    /// Molar mass of the non-condensing carrier gas (kg/mol)
    pub carrier_molar_mass: f64,
}

impl ModelContext<'_> {
    /// Mean free path of the carrier gas (m).
    ///
    /// λ = (μ/ρ) √(π W / (2 R T))
    pub fn gas_mean_free_path(&self, state: &CellState) -> f64 {
        let mu = state.gas_viscosity.to_pascal_seconds();
        let rho = state.gas_density.to_kg_per_m3().max(SMALL);
        let t = state.temperature.to_kelvin().max(SMALL);
        (mu / rho) * (PI * self.carrier_molar_mass / (2.0 * R_GAS * t)).sqrt()
    }

    /// Molar mass of the gas phase from its mole fractions (kg/mol).
    pub fn gas_molar_mass(&self, state: &CellState) -> f64 {
        let x = state.vapor_mole_fractions(self.species, self.carrier_molar_mass);
        let vapor_x: f64 = x.iter().sum();
        let vapor_w: f64 = x
            .iter()
            .zip(self.species)
            .map(|(xk, s)| xk * s.molar_mass)
            .sum();
        vapor_w + (1.0 - vapor_x).max(0.0) * self.carrier_molar_mass
    }
}
