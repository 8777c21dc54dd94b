//! Species definitions and the per-cell thermodynamic state.
//!
//! Property correlations (saturation pressure, diffusivity, densities,
//! surface tension) live outside this crate. A [`ThermoProvider`] hands the
//! engine one [`CellState`] per cell with those values already evaluated.

use serde::{Deserialize, Serialize};
use units::{Density, Pressure, Temperature, Viscosity};

use crate::constants::{N_A, SMALL};
use crate::error::{SectionalError, SectionalResult};

/// Constant properties of one phase-changing species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesProperties {
    pub name: String,
    /// Molar mass (kg/mol)
    pub molar_mass: f64,
    /// Enthalpy of vaporization (J/kg)
    #[serde(default)]
    pub latent_heat: f64,
}

impl SpeciesProperties {
    pub fn new(name: impl Into<String>, molar_mass: f64, latent_heat: f64) -> Self {
        Self {
            name: name.into(),
            molar_mass,
            latent_heat,
        }
    }

    /// Mass of one molecule (kg).
    pub fn molecular_mass(&self) -> f64 {
        self.molar_mass / N_A
    }
}

/// Local state of one cell, as seen by the rate models.
///
/// Per-species vectors are indexed like the configured species list.
#[derive(Debug, Clone)]
pub struct CellState {
    pub pressure: Pressure,
    pub temperature: Temperature,
    /// Carrier-gas density
    pub gas_density: Density,
    pub gas_viscosity: Viscosity,
    /// Density of the gas-droplet mixture
    pub mixture_density: Density,
    /// Droplet-gas slip speed (m/s), used by convective corrections
    pub slip_speed: f64,
    /// Vapor mass fraction Y_k (per unit mixture mass)
    pub vapor: Vec<f64>,
    /// Droplet-phase mass fraction Z_k (per unit mixture mass)
    pub droplet: Vec<f64>,
    /// Saturation vapor pressure (Pa)
    pub saturation_pressure: Vec<f64>,
    /// Vapor diffusivity in the carrier gas (m²/s)
    pub diffusivity: Vec<f64>,
    /// Liquid density of the pure species (kg/m³)
    pub liquid_density: Vec<f64>,
    /// Surface tension of the pure species (N/m)
    pub surface_tension: Vec<f64>,
}

impl CellState {
    pub fn n_species(&self) -> usize {
        self.vapor.len()
    }

    /// Check that every per-species vector has `n_species` finite entries.
    pub fn validate(&self, n_species: usize) -> SectionalResult<()> {
        let fields: [(&'static str, &[f64]); 6] = [
            ("vapor", &self.vapor),
            ("droplet", &self.droplet),
            ("saturation_pressure", &self.saturation_pressure),
            ("diffusivity", &self.diffusivity),
            ("liquid_density", &self.liquid_density),
            ("surface_tension", &self.surface_tension),
        ];

        for (name, values) in fields {
            if values.len() != n_species {
                return Err(SectionalError::size_mismatch(name, n_species, values.len()));
            }
            if let Some(species) = values.iter().position(|v| !v.is_finite()) {
                return Err(SectionalError::MissingSpeciesProperty {
                    species,
                    property: name,
                });
            }
        }
        Ok(())
    }

    /// Total droplet-phase mass fraction Σ Z_k.
    pub fn droplet_mass_fraction(&self) -> f64 {
        self.droplet.iter().sum()
    }

    /// Total vapor mass fraction Σ Y_k.
    pub fn vapor_mass_fraction(&self) -> f64 {
        self.vapor.iter().sum()
    }

    /// Droplet-phase density from ideal mixing of the liquid species
    /// (1/ρ = Σ w_k/ρ_k with w_k = Z_k / Σ Z).
    ///
    /// Falls back to the arithmetic mean of the pure liquids when the cell
    /// holds no droplets.
    pub fn droplet_density(&self) -> Density {
        let total = self.droplet_mass_fraction();
        if total <= SMALL {
            let n = self.liquid_density.len().max(1) as f64;
            return Density::from_kg_per_m3(self.liquid_density.iter().sum::<f64>() / n);
        }

        let specific_volume: f64 = self
            .droplet
            .iter()
            .zip(&self.liquid_density)
            .map(|(z, rho)| (z.max(0.0) / total) / rho.max(SMALL))
            .sum();
        Density::from_kg_per_m3(1.0 / specific_volume.max(SMALL))
    }

    /// Gas-phase mole fractions of the vapors.
    ///
    /// The carrier gas takes whatever mass is not vapor or droplet.
    pub fn vapor_mole_fractions(
        &self,
        species: &[SpeciesProperties],
        carrier_molar_mass: f64,
    ) -> Vec<f64> {
        let carrier =
            (1.0 - self.vapor_mass_fraction() - self.droplet_mass_fraction()).max(0.0);
        let moles: Vec<f64> = self
            .vapor
            .iter()
            .zip(species)
            .map(|(y, s)| y.max(0.0) / s.molar_mass)
            .collect();
        let total = moles.iter().sum::<f64>() + carrier / carrier_molar_mass;

        moles.iter().map(|n| n / total.max(SMALL)).collect()
    }

    /// Vapor partial pressures (Pa).
    pub fn partial_pressures(
        &self,
        species: &[SpeciesProperties],
        carrier_molar_mass: f64,
    ) -> Vec<f64> {
        let p = self.pressure.to_pascals();
        self.vapor_mole_fractions(species, carrier_molar_mass)
            .into_iter()
            .map(|x| x * p)
            .collect()
    }

    /// Saturation ratios S_k = p_v,k / p_sat,k.
    pub fn saturation_ratios(
        &self,
        species: &[SpeciesProperties],
        carrier_molar_mass: f64,
    ) -> Vec<f64> {
        self.partial_pressures(species, carrier_molar_mass)
            .into_iter()
            .zip(&self.saturation_pressure)
            .map(|(pv, psat)| pv / psat.max(SMALL))
            .collect()
    }
}

/// Supplies per-cell thermodynamic state to the engine.
///
/// Implemented by the host flow solver. Must be `Sync`: the internal step
/// queries cells from several worker threads.
pub trait ThermoProvider: Sync {
    fn n_cells(&self) -> usize;

    /// Evaluate the state of `cell`.
    fn cell_state(&self, cell: usize) -> CellState;
}

/// A provider backed by a precomputed list of cell states.
impl ThermoProvider for [CellState] {
    fn n_cells(&self) -> usize {
        self.len()
    }

    fn cell_state(&self, cell: usize) -> CellState {
        self[cell].clone()
    }
}

impl ThermoProvider for Vec<CellState> {
    fn n_cells(&self) -> usize {
        self.len()
    }

    fn cell_state(&self, cell: usize) -> CellState {
        self[cell].clone()
    }
}
