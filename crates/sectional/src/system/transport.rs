//! Collaborators of the spatial step.
//!
//! The engine does not discretize transport itself. For every section it
//! assembles a face flux (bulk flux plus the section's relative drift plus a
//! common correction) and a cell diffusivity, then hands the section field
//! to the host's [`TransportSolver`].
//!
//! The correction keeps the droplet mass carried by all sections equal to
//! the droplet-phase mass flux the host transports for the species:
//!
//! ```text
//! φ_corr = (φ_Z - Σ_i x_i M_i,f φ_i) / Σ_i x_i M_i,f
//! ```

use crate::error::SectionalResult;
use crate::sections::Section;

/// The host's finite-volume transport layer.
pub trait TransportSolver {
    /// Number of mesh faces (length of every face field).
    fn n_faces(&self) -> usize;

    /// Interpolate a cell field to the faces.
    fn interpolate_to_faces(&self, field: &[f64]) -> Vec<f64>;

    /// Advance one section's field by `dt` seconds in place.
    ///
    /// # Arguments
    ///
    /// * `section` - Section index, for the solver's own bookkeeping
    /// * `field` - Number per unit mixture mass, one entry per cell
    /// * `face_flux` - Mass flux through each face (kg/s)
    /// * `diffusivity` - Effective diffusivity per cell (m²/s)
    /// * `dt` - Step size (s)
    fn solve_section(
        &mut self,
        section: usize,
        field: &mut [f64],
        face_flux: &[f64],
        diffusivity: &[f64],
        dt: f64,
    ) -> SectionalResult<()>;
}

/// Relative motion of droplets with respect to the carrier flow.
pub trait DriftFlux {
    /// Face flux of `section` relative to the bulk flux (inertial plus
    /// Brownian drift), one entry per face.
    fn relative_flux(&self, section: &Section, n_faces: usize) -> Vec<f64>;
}

/// No relative drift: every section moves with the bulk flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDrift;

impl DriftFlux for NoDrift {
    fn relative_flux(&self, _section: &Section, n_faces: usize) -> Vec<f64> {
        vec![0.0; n_faces]
    }
}

/// Host fields consumed by the spatial step.
#[derive(Debug, Clone, Copy)]
pub struct SpatialInputs<'a> {
    /// Mixture mass flux through each face (kg/s)
    pub bulk_flux: &'a [f64],
    /// Droplet-phase mass flux Σ_k Z_k through each face (kg/s)
    pub droplet_mass_flux: &'a [f64],
    /// Turbulent plus molecular diffusivity per cell (m²/s)
    pub effective_diffusivity: &'a [f64],
}
