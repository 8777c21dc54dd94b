//! A single size class.

use units::{Density, Length, Mass};

/// One discretized size class and the per-cell fields it owns.
///
/// `values` holds the droplet number per kilogram of mixture in every mesh
/// cell. `diffusivity` (per cell) and `flux` (per face) are filled during the
/// spatial step and handed to the transport layer.
#[derive(Debug, Clone)]
pub struct Section {
    index: usize,

    /// Representative droplet mass (kg)
    x: f64,

    /// Lower bin edge (kg)
    y_lower: f64,

    /// Upper bin edge (kg)
    y_upper: f64,

    /// Number per unit mixture mass (1/kg), one entry per cell
    values: Vec<f64>,

    /// Effective diffusivity (m²/s), one entry per cell
    diffusivity: Vec<f64>,

    /// Section face flux used by the last spatial step, one entry per face
    flux: Vec<f64>,
}

impl Section {
    /// Create an empty section spanning `[y_lower, y_upper)`.
    pub fn new(index: usize, x: f64, y_lower: f64, y_upper: f64, n_cells: usize) -> Self {
        debug_assert!(y_lower < x && x < y_upper);
        Self {
            index,
            x,
            y_lower,
            y_upper,
            values: vec![0.0; n_cells],
            diffusivity: vec![0.0; n_cells],
            flux: Vec::new(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Representative droplet mass (kg).
    pub fn size(&self) -> f64 {
        self.x
    }

    pub fn lower_edge(&self) -> f64 {
        self.y_lower
    }

    pub fn upper_edge(&self) -> f64 {
        self.y_upper
    }

    /// Whether `s` lies in `[y_lower, y_upper)`.
    pub fn contains(&self, s: f64) -> bool {
        s >= self.y_lower && s < self.y_upper
    }

    /// Diameter of a droplet of representative mass at the given liquid density.
    pub fn diameter(&self, liquid_density: Density) -> Length {
        Mass::from_kg(self.x).sphere_diameter(liquid_density)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Droplet-phase mass per unit mixture mass carried by this section in `cell`.
    pub fn mass_fraction(&self, cell: usize) -> f64 {
        self.x * self.values[cell]
    }

    pub fn diffusivity(&self) -> &[f64] {
        &self.diffusivity
    }

    pub fn diffusivity_mut(&mut self) -> &mut [f64] {
        &mut self.diffusivity
    }

    pub fn flux(&self) -> &[f64] {
        &self.flux
    }

    pub(crate) fn set_flux(&mut self, flux: Vec<f64>) {
        self.flux = flux;
    }

    /// Values, face flux and diffusivity borrowed together for a transport solve.
    pub(crate) fn transport_fields(&mut self) -> (&mut [f64], &[f64], &[f64]) {
        (&mut self.values, &self.flux, &self.diffusivity)
    }
}
