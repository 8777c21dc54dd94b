//! Shared fixtures for unit tests: humid air near room temperature.

use units::{Density, Pressure, Temperature, Viscosity};

use crate::config::{DiameterBounds, RescaleSettings, SectionalConfig, Submodels};
use crate::models::ModelContext;
use crate::sections::{InitialDistribution, SectionalGrid};
use crate::thermo::{CellState, SpeciesProperties};

pub(crate) const AIR_MOLAR_MASS: f64 = 0.028965;

pub(crate) fn water() -> SpeciesProperties {
    SpeciesProperties::new("water", 0.018015, 2.454e6)
}

pub(crate) fn ethanol() -> SpeciesProperties {
    SpeciesProperties::new("ethanol", 0.046068, 0.919e6)
}

pub(crate) fn context(species: &[SpeciesProperties]) -> ModelContext<'_> {
    ModelContext {
        species,
        carrier_molar_mass: AIR_MOLAR_MASS,
    }
}

fn air(n_species: usize) -> CellState {
    CellState {
        pressure: Pressure::standard_atmosphere(),
        temperature: Temperature::from_kelvin(293.15),
        gas_density: Density::from_kg_per_m3(1.204),
        gas_viscosity: Viscosity::from_pascal_seconds(1.81e-5),
        mixture_density: Density::from_kg_per_m3(1.204),
        slip_speed: 0.0,
        vapor: vec![0.0; n_species],
        droplet: vec![0.0; n_species],
        saturation_pressure: vec![0.0; n_species],
        diffusivity: vec![0.0; n_species],
        liquid_density: vec![0.0; n_species],
        surface_tension: vec![0.0; n_species],
    }
}

/// Air with water vapor and water droplets at 20 °C and 1 atm.
pub(crate) fn humid_air(vapor: f64, droplet: f64) -> CellState {
    CellState {
        vapor: vec![vapor],
        droplet: vec![droplet],
        saturation_pressure: vec![2339.0],
        diffusivity: vec![2.5e-5],
        liquid_density: vec![998.2],
        surface_tension: vec![0.0728],
        ..air(1)
    }
}

/// Air with water and ethanol at 20 °C and 1 atm.
pub(crate) fn water_ethanol_air(vapor: [f64; 2], droplet: [f64; 2]) -> CellState {
    CellState {
        vapor: vapor.to_vec(),
        droplet: droplet.to_vec(),
        saturation_pressure: vec![2339.0, 5870.0],
        diffusivity: vec![2.5e-5, 1.19e-5],
        liquid_density: vec![998.2, 789.0],
        surface_tension: vec![0.0728, 0.0223],
        ..air(2)
    }
}

/// Water-in-air configuration with wide diameter bounds.
pub(crate) fn config(grid: SectionalGrid, submodels: Submodels) -> SectionalConfig {
    SectionalConfig {
        grid,
        submodels,
        diameter: DiameterBounds {
            min: 1e-10,
            max: 1.0,
        },
        rescale: RescaleSettings::default(),
        numerical_diffusion: 0.0,
        species: vec![water()],
        carrier_molar_mass: AIR_MOLAR_MASS,
        liquid_density: 998.2,
        initial: InitialDistribution::Empty,
    }
}

/// Logarithmic grid covering 0.3 nm to 60 µm water droplets.
pub(crate) fn droplet_grid() -> SectionalGrid {
    SectionalGrid::Logarithmic {
        y_min: 1e-26,
        y_max: 1e-10,
        n: 40,
    }
}
