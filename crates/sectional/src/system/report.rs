//! Per-step results handed back to the host.

use std::ops::AddAssign;

/// Mass (per unit mixture mass, summed over cells) the sections failed to
/// represent.
///
/// Positive values are mass the sections lost relative to the species mass
/// fractions, negative values mass they gained.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DomainDefect {
    /// From sizes clipped at either end of the grid
    pub clipped: f64,
    /// From droplets shrunk below the smallest size
    pub evaporated: f64,
}

impl DomainDefect {
    pub fn total(&self) -> f64 {
        self.clipped + self.evaporated
    }

    pub fn is_zero(&self) -> bool {
        self.clipped == 0.0 && self.evaporated == 0.0
    }
}

impl AddAssign for DomainDefect {
    fn add_assign(&mut self, other: Self) {
        self.clipped += other.clipped;
        self.evaporated += other.evaporated;
    }
}

/// Outcome of the mass-consistency rescale.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RescaleReport {
    /// Largest |Σ x M - Σ Z| / Σ Z over all cells
    pub max_relative_difference: f64,
    /// Cells whose difference exceeded the tolerance
    pub cells_over_tolerance: usize,
    /// Cells whose sections were actually scaled
    pub cells_rescaled: usize,
    /// Cells with droplet mass but empty sections, which cannot be scaled
    pub unrepresented_cells: usize,
}

/// Summary of one internal step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepReport {
    pub nucleating_cells: usize,
    pub condensing_cells: usize,
    pub coalescing_cells: usize,
    /// Cells where the nucleation composition solve hit its iteration cap
    pub unconverged_cells: usize,
    pub domain_defect: DomainDefect,
    pub rescale: Option<RescaleReport>,
}

/// Per-cell fields produced by the internal step.
///
/// Per-species fields are indexed `[species][cell]`.
#[derive(Debug, Clone, Default)]
pub struct StepOutputs {
    /// Vapor to droplet mass transfer (kg/kg/s), positive for condensation
    pub mass_transfer: Vec<Vec<f64>>,
    /// Latent heat released into the mixture (W/kg)
    pub heat_source: Vec<f64>,
    /// Nucleation rate (1/m³/s)
    pub nucleation_rate: Vec<f64>,
    /// Net condensation rate of all species (kg/kg/s)
    pub condensation_rate: Vec<f64>,
    /// Vapor mass fractions after the step
    pub vapor: Vec<Vec<f64>>,
    /// Droplet-phase mass fractions after the step
    pub droplet: Vec<Vec<f64>>,
}

impl StepOutputs {
    pub(crate) fn new(n_species: usize, n_cells: usize) -> Self {
        Self {
            mass_transfer: vec![vec![0.0; n_cells]; n_species],
            heat_source: vec![0.0; n_cells],
            nucleation_rate: vec![0.0; n_cells],
            condensation_rate: vec![0.0; n_cells],
            vapor: vec![vec![0.0; n_cells]; n_species],
            droplet: vec![vec![0.0; n_cells]; n_species],
        }
    }

    /// Droplet-phase mass fraction Σ Z_k of one cell after the step.
    pub fn droplet_mass_fraction(&self, cell: usize) -> f64 {
        self.droplet.iter().map(|z| z[cell]).sum()
    }
}
