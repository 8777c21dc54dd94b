//! Operator-split driver of the population balance.
//!
//! # Step Order
//!
//! Each time step runs three stages over every mesh cell:
//!
//! 1. **Spatial step**: every section is transported by the host with the
//!    bulk flux, its relative drift, and a correction flux that keeps the
//!    sections consistent with the transported droplet-phase mass
//! 2. **Internal step**: nucleation, condensation and coalescence update each
//!    cell independently (in parallel)
//! 3. **Rescale**: the sections of every cell are scaled so that Σ x_i M_i
//!    equals the droplet-phase mass fraction Σ_k Z_k
//!
//! The system owns its grid, interpolator, pair table and rate models; cells
//! borrow them read-only during the internal step.

mod diagnostics;
mod internal;
mod report;
mod transport;


pub use report::{DomainDefect, RescaleReport, StepOutputs, StepReport};
pub use transport::{DriftFlux, NoDrift, SpatialInputs, TransportSolver};

use rayon::prelude::*;
use units::{Density, Time};

use crate::config::{DiameterBounds, RescaleSettings, SectionalConfig};
use crate::constants::{SMALL, ZERO_MASS};
use crate::error::{SectionalError, SectionalResult};
use crate::models::{CoalescenceModel, CondensationModel, ModelContext, NucleationModel};
use crate::sections::{
    CoalescencePairTable, InitialDistribution, MomentPreservingInterpolator, SectionalDistribution,
};
use crate::thermo::{SpeciesProperties, ThermoProvider};
use internal::{CellOutcome, CellStepper};

/// Sectional population-balance engine for one mesh.
#[derive(Debug, Clone)]
pub struct PopulationBalanceSystem {
    distribution: SectionalDistribution,
    interpolator: MomentPreservingInterpolator,
    pairs: CoalescencePairTable,

    species: Vec<SpeciesProperties>,
    carrier_molar_mass: f64,

    nucleation: NucleationModel,
    condensation: CondensationModel,
    coalescence: CoalescenceModel,

    initial: InitialDistribution,
    diameter_bounds: DiameterBounds,
    rescale: RescaleSettings,
    numerical_diffusion: f64,

    /// Droplet density per cell from the last internal step (kg/m³)
    droplet_density: Vec<f64>,
    outputs: StepOutputs,
    domain_defect: DomainDefect,
}

impl PopulationBalanceSystem {
    /// Build the grid, interpolator and pair table for `n_cells` cells.
    ///
    /// # Errors
    /// Any invalid configuration, including `sizeDistributionType = "none"`.
    pub fn from_config(config: &SectionalConfig, n_cells: usize) -> SectionalResult<Self> {
        config.validate()?;
        if !config.is_enabled() {
            return Err(SectionalError::config(
                "population balance requested with sizeDistributionType = \"none\"",
            ));
        }

        let distribution = SectionalDistribution::new(config.grid.clone(), n_cells)?;
        let interpolator = MomentPreservingInterpolator::new(&distribution);
        let pairs = CoalescencePairTable::build(&distribution, &interpolator);

        log::debug!(
            "population balance: {} sections, {} cells, {} species",
            distribution.len(),
            n_cells,
            config.n_species()
        );

        Ok(Self {
            distribution,
            interpolator,
            pairs,
            species: config.species.clone(),
            carrier_molar_mass: config.carrier_molar_mass,
            nucleation: config.submodels.nucleation.clone(),
            condensation: config.submodels.condensation.clone(),
            coalescence: config.submodels.coalescence.clone(),
            initial: config.initial.clone(),
            diameter_bounds: config.diameter,
            rescale: config.rescale,
            numerical_diffusion: config.numerical_diffusion,
            droplet_density: vec![config.liquid_density; n_cells],
            outputs: StepOutputs::new(config.n_species(), n_cells),
            domain_defect: DomainDefect::default(),
        })
    }

    pub fn distribution(&self) -> &SectionalDistribution {
        &self.distribution
    }

    /// Mutable access for hosts that restart from stored section fields.
    pub fn distribution_mut(&mut self) -> &mut SectionalDistribution {
        &mut self.distribution
    }

    pub fn interpolator(&self) -> &MomentPreservingInterpolator {
        &self.interpolator
    }

    pub fn pairs(&self) -> &CoalescencePairTable {
        &self.pairs
    }

    pub fn species(&self) -> &[SpeciesProperties] {
        &self.species
    }

    pub fn n_cells(&self) -> usize {
        self.distribution.n_cells()
    }

    pub fn n_sections(&self) -> usize {
        self.distribution.len()
    }

    /// Fields produced by the last internal step.
    pub fn outputs(&self) -> &StepOutputs {
        &self.outputs
    }

    /// Domain defect accumulated over the whole run.
    pub fn domain_defect(&self) -> DomainDefect {
        self.domain_defect
    }

    fn context(&self) -> ModelContext<'_> {
        ModelContext {
            species: &self.species,
            carrier_molar_mass: self.carrier_molar_mass,
        }
    }

    /// Fill every cell from the configured initial distribution.
    ///
    /// # Arguments
    ///
    /// * `droplet_mass_fraction` - Σ_k Z_k per cell
    ///
    /// Returns the mass that fell outside the grid, summed over cells.
    pub fn initialize(&mut self, droplet_mass_fraction: &[f64]) -> SectionalResult<f64> {
        let n_cells = self.n_cells();
        if droplet_mass_fraction.len() != n_cells {
            return Err(SectionalError::size_mismatch(
                "droplet_mass_fraction",
                n_cells,
                droplet_mass_fraction.len(),
            ));
        }

        let mut defect = 0.0;
        for (cell, &z) in droplet_mass_fraction.iter().enumerate() {
            let density = Density::from_kg_per_m3(self.droplet_density[cell]);
            let (values, cell_defect) =
                self.initial.section_values(&self.interpolator, z, density)?;
            self.distribution.scatter(cell, &values);
            defect += cell_defect;
        }
        Ok(defect)
    }

    /// Run the per-cell source terms for one step.
    ///
    /// Cells are independent and processed in parallel; results are written
    /// back after all cells finish.
    ///
    /// # Errors
    /// A cell state with missing or mis-sized species data, or a nucleated
    /// cluster heavier than the upper grid bound.
    pub fn internal_step<T>(&mut self, thermo: &T, dt: Time) -> SectionalResult<StepReport>
    where
        T: ThermoProvider + ?Sized,
    {
        let n_cells = self.n_cells();
        if thermo.n_cells() != n_cells {
            return Err(SectionalError::size_mismatch("thermo cells", n_cells, thermo.n_cells()));
        }
        let dt = dt.to_seconds();
        let n_sections = self.n_sections();

        let outcomes: Vec<CellOutcome> = {
            let stepper = CellStepper {
                ctx: self.context(),
                nucleation: &self.nucleation,
                condensation: &self.condensation,
                coalescence: &self.coalescence,
                interpolator: &self.interpolator,
                pairs: &self.pairs,
                y_min: self.distribution.y_min(),
                y_max: self.distribution.y_max(),
            };
            let distribution = &self.distribution;

            (0..n_cells)
                .into_par_iter()
                .map(|cell| {
                    let mut values = vec![0.0; n_sections];
                    distribution.gather(cell, &mut values);
                    stepper.step(cell, thermo.cell_state(cell), values, dt)
                })
                .collect::<SectionalResult<Vec<_>>>()?
        };

        let mut report = StepReport::default();
        for (cell, outcome) in outcomes.into_iter().enumerate() {
            self.distribution.scatter(cell, &outcome.values);
            self.droplet_density[cell] = outcome.droplet_density;

            for k in 0..self.species.len() {
                self.outputs.mass_transfer[k][cell] = outcome.mass_transfer[k];
                self.outputs.vapor[k][cell] = outcome.vapor[k];
                self.outputs.droplet[k][cell] = outcome.droplet[k];
            }
            self.outputs.heat_source[cell] = outcome.heat_source;
            self.outputs.nucleation_rate[cell] = outcome.nucleation_rate;
            self.outputs.condensation_rate[cell] = outcome.condensation_rate;

            report.nucleating_cells += usize::from(outcome.nucleated);
            report.condensing_cells += usize::from(outcome.condensed);
            report.coalescing_cells += usize::from(outcome.coalesced);
            report.unconverged_cells += usize::from(!outcome.converged);
            report.domain_defect += outcome.defect;
        }

        if report.domain_defect.clipped.abs() > ZERO_MASS {
            log::warn!(
                "domain defect this step: {:.3e} clipped at grid bounds, {:.3e} evaporated",
                report.domain_defect.clipped,
                report.domain_defect.evaporated
            );
        } else if report.domain_defect.evaporated != 0.0 {
            log::debug!(
                "{:.3e} droplet mass evaporated below the smallest size",
                report.domain_defect.evaporated
            );
        }
        self.domain_defect += report.domain_defect;

        Ok(report)
    }

    /// Scale the sections of every cell so Σ x_i M_i matches `target`
    /// (the droplet-phase mass fraction Σ_k Z_k per cell).
    pub fn rescale(&mut self, target: &[f64]) -> SectionalResult<RescaleReport> {
        let n_cells = self.n_cells();
        if target.len() != n_cells {
            return Err(SectionalError::size_mismatch("rescale target", n_cells, target.len()));
        }

        let tolerance = self.rescale.tolerance;
        let distribution = &self.distribution;

        // (factor, relative difference, unrepresented)
        let factors: Vec<(f64, f64, bool)> = (0..n_cells)
            .into_par_iter()
            .map(|cell| {
                let held = distribution.mass_fraction(cell);
                let wanted = target[cell].max(0.0);
                if held <= SMALL {
                    return (1.0, 0.0, wanted > ZERO_MASS);
                }
                let difference = (held - wanted).abs() / wanted.max(held);
                (wanted / held, difference, false)
            })
            .collect();

        let mut report = RescaleReport::default();
        for &(factor, difference, unrepresented) in &factors {
            report.max_relative_difference = report.max_relative_difference.max(difference);
            report.cells_over_tolerance += usize::from(difference > tolerance);
            report.unrepresented_cells += usize::from(unrepresented);
            report.cells_rescaled += usize::from(needs_scaling(factor));
        }

        for section in self.distribution.sections_mut() {
            section
                .values_mut()
                .par_iter_mut()
                .zip(&factors)
                .filter(|(_, (factor, _, _))| needs_scaling(*factor))
                .for_each(|(value, (factor, _, _))| *value *= factor);
        }

        if report.cells_over_tolerance > 0 {
            log::warn!(
                "section mass differs from droplet mass fraction by up to {:.3e} in {} cells; rescaled",
                report.max_relative_difference,
                report.cells_over_tolerance
            );
        }
        if report.unrepresented_cells > 0 {
            log::debug!(
                "{} cells hold droplet mass with empty sections",
                report.unrepresented_cells
            );
        }

        Ok(report)
    }

    /// Transport every section through the mesh.
    ///
    /// # Errors
    /// Face or cell fields of the wrong length, or a failed section solve.
    pub fn spatial_step<S, D>(
        &mut self,
        transport: &mut S,
        drift: &D,
        inputs: &SpatialInputs,
        dt: Time,
    ) -> SectionalResult<()>
    where
        S: TransportSolver + ?Sized,
        D: DriftFlux + ?Sized,
    {
        let n_faces = transport.n_faces();
        let n_cells = self.n_cells();
        if inputs.bulk_flux.len() != n_faces {
            return Err(SectionalError::size_mismatch("bulk_flux", n_faces, inputs.bulk_flux.len()));
        }
        if inputs.droplet_mass_flux.len() != n_faces {
            return Err(SectionalError::size_mismatch(
                "droplet_mass_flux",
                n_faces,
                inputs.droplet_mass_flux.len(),
            ));
        }
        if inputs.effective_diffusivity.len() != n_cells {
            return Err(SectionalError::size_mismatch(
                "effective_diffusivity",
                n_cells,
                inputs.effective_diffusivity.len(),
            ));
        }

        // Section face fluxes before correction, and the mass they carry
        let mut fluxes = Vec::with_capacity(self.n_sections());
        let mut carried = vec![0.0; n_faces];
        let mut face_mass = vec![0.0; n_faces];
        for section in self.distribution.sections() {
            let drift_flux = drift.relative_flux(section, n_faces);
            if drift_flux.len() != n_faces {
                return Err(SectionalError::size_mismatch(
                    "relative_flux",
                    n_faces,
                    drift_flux.len(),
                ));
            }
            let face_values = transport.interpolate_to_faces(section.values());
            if face_values.len() != n_faces {
                return Err(SectionalError::size_mismatch(
                    "interpolate_to_faces",
                    n_faces,
                    face_values.len(),
                ));
            }

            let flux: Vec<f64> = inputs
                .bulk_flux
                .iter()
                .zip(&drift_flux)
                .map(|(bulk, rel)| bulk + rel)
                .collect();
            for f in 0..n_faces {
                let mass = section.size() * face_values[f];
                face_mass[f] += mass;
                carried[f] += mass * flux[f];
            }
            fluxes.push(flux);
        }

        let correction: Vec<f64> = (0..n_faces)
            .map(|f| {
                if face_mass[f] > SMALL {
                    (inputs.droplet_mass_flux[f] - carried[f]) / face_mass[f]
                } else {
                    0.0
                }
            })
            .collect();

        let dt = dt.to_seconds();
        let numerical_diffusion = self.numerical_diffusion;
        for (section, mut flux) in self.distribution.sections_mut().iter_mut().zip(fluxes) {
            flux.iter_mut().zip(&correction).for_each(|(phi, c)| *phi += c);
            section.set_flux(flux);
            section
                .diffusivity_mut()
                .iter_mut()
                .zip(inputs.effective_diffusivity)
                .for_each(|(d, eff)| *d = eff + numerical_diffusion);

            let index = section.index();
            let (values, flux, diffusivity) = section.transport_fields();
            transport.solve_section(index, values, flux, diffusivity, dt)?;

            // Transport can undershoot near steep fronts
            values.iter_mut().for_each(|m| *m = m.max(0.0));
        }

        Ok(())
    }

    /// One full step: spatial, internal, then rescale against the droplet
    /// mass fractions the internal step produced.
    pub fn step<T, S, D>(
        &mut self,
        thermo: &T,
        transport: &mut S,
        drift: &D,
        inputs: &SpatialInputs,
        dt: Time,
    ) -> SectionalResult<StepReport>
    where
        T: ThermoProvider + ?Sized,
        S: TransportSolver + ?Sized,
        D: DriftFlux + ?Sized,
    {
        self.spatial_step(transport, drift, inputs, dt)?;
        self.internal_step_with_rescale(thermo, dt)
    }

    /// Internal step followed by the rescale, for hosts that transport the
    /// sections themselves.
    pub fn internal_step_with_rescale<T>(&mut self, thermo: &T, dt: Time) -> SectionalResult<StepReport>
    where
        T: ThermoProvider + ?Sized,
    {
        let mut report = self.internal_step(thermo, dt)?;
        if self.rescale.enabled {
            let target: Vec<f64> = (0..self.n_cells())
                .map(|cell| self.outputs.droplet_mass_fraction(cell))
                .collect();
            report.rescale = Some(self.rescale(&target)?);
        }
        Ok(report)
    }
}

/// Factors this close to one are left alone so a second rescale is a no-op.
fn needs_scaling(factor: f64) -> bool {
    (factor - 1.0).abs() > 64.0 * f64::EPSILON
}
