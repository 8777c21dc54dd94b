//! Zero-dimensional update of one cell.
//!
//! The three processes run in a fixed order on a private copy of the cell's
//! section values and species mass fractions:
//!
//! 1. nucleation deposits new clusters at the critical size
//! 2. condensation relaxes every species toward equilibrium and shifts each
//!    section's droplets to a new size
//! 3. coalescence walks the pair table and moves number from parents to
//!    products
//!
//! Nothing here touches shared state, so cells can be stepped on any thread.

use crate::constants::{PI, SMALL};
use crate::error::{SectionalError, SectionalResult};
use crate::models::{
    exponential_relaxation, CoalescenceModel, CondensationModel, ModelContext, NucleationModel,
};
use crate::sections::{CoalescencePairTable, MomentPreservingInterpolator};
use crate::system::DomainDefect;
use crate::thermo::CellState;

/// Read-only view of everything a cell update needs.
pub(crate) struct CellStepper<'a> {
    pub ctx: ModelContext<'a>,
    pub nucleation: &'a NucleationModel,
    pub condensation: &'a CondensationModel,
    pub coalescence: &'a CoalescenceModel,
    pub interpolator: &'a MomentPreservingInterpolator,
    pub pairs: &'a CoalescencePairTable,
    /// Lower and upper grid bounds (kg)
    pub y_min: f64,
    pub y_max: f64,
}

/// Everything one cell update produced.
#[derive(Debug, Clone)]
pub(crate) struct CellOutcome {
    pub values: Vec<f64>,
    pub vapor: Vec<f64>,
    pub droplet: Vec<f64>,
    pub mass_transfer: Vec<f64>,
    pub heat_source: f64,
    pub nucleation_rate: f64,
    pub condensation_rate: f64,
    pub droplet_density: f64,
    pub defect: DomainDefect,
    pub nucleated: bool,
    pub condensed: bool,
    pub coalesced: bool,
    pub converged: bool,
}

impl CellOutcome {
    fn new(n_species: usize) -> Self {
        Self {
            values: Vec::new(),
            vapor: Vec::new(),
            droplet: Vec::new(),
            mass_transfer: vec![0.0; n_species],
            heat_source: 0.0,
            nucleation_rate: 0.0,
            condensation_rate: 0.0,
            droplet_density: 0.0,
            defect: DomainDefect::default(),
            nucleated: false,
            condensed: false,
            coalesced: false,
            converged: true,
        }
    }
}

/// Diameter of a droplet of each representative mass.
pub(crate) fn section_diameters(x: &[f64], density: f64) -> Vec<f64> {
    let rho = density.max(SMALL);
    x.iter().map(|m| (6.0 * m / (PI * rho)).cbrt()).collect()
}

impl CellStepper<'_> {
    /// Advance one cell by `dt` seconds.
    pub fn step(
        &self,
        cell: usize,
        mut state: CellState,
        mut values: Vec<f64>,
        dt: f64,
    ) -> SectionalResult<CellOutcome> {
        let n_species = self.ctx.species.len();
        state.validate(n_species)?;

        let mut outcome = CellOutcome::new(n_species);

        self.nucleate(cell, &mut state, &mut values, dt, &mut outcome)?;
        self.condense(&mut state, &mut values, dt, &mut outcome);
        self.coalesce(&state, &mut values, dt, &mut outcome);

        outcome.heat_source = outcome
            .mass_transfer
            .iter()
            .zip(self.ctx.species)
            .map(|(rate, species)| rate * species.latent_heat)
            .sum();
        outcome.droplet_density = state.droplet_density().to_kg_per_m3();
        outcome.values = values;
        outcome.vapor = state.vapor;
        outcome.droplet = state.droplet;
        Ok(outcome)
    }

    fn nucleate(
        &self,
        cell: usize,
        state: &mut CellState,
        values: &mut [f64],
        dt: f64,
        outcome: &mut CellOutcome,
    ) -> SectionalResult<()> {
        if !self.nucleation.is_enabled() {
            return Ok(());
        }

        let result = self.nucleation.rate(state, &self.ctx);
        outcome.converged = result.converged;
        if !result.active {
            return Ok(());
        }
        if result.size > self.y_max {
            return Err(SectionalError::NucleationOutOfRange {
                cell,
                size: result.size,
                max: self.y_max,
            });
        }

        let rho_mix = state.mixture_density.to_kg_per_m3().max(SMALL);
        let mut number = result.rate * dt / rho_mix;
        let mut mass = number * result.size;
        if mass <= 0.0 || !mass.is_finite() {
            return Ok(());
        }

        // New clusters cannot take more of a species than the vapor holds
        let limit = result
            .composition
            .iter()
            .zip(&state.vapor)
            .filter(|(c, _)| **c > 0.0)
            .map(|(c, y)| y.max(0.0) / (mass * c))
            .fold(1.0, f64::min);
        if limit < 1.0 {
            log::trace!("cell {}: nucleation limited to {:.3} of its rate by vapor", cell, limit);
            number *= limit;
            mass *= limit;
        }
        if number <= 0.0 {
            return Ok(());
        }

        outcome.defect.clipped += self.interpolator.add_to_m(result.size, number, values);
        for (k, c) in result.composition.iter().enumerate() {
            let dm = mass * c;
            state.vapor[k] -= dm;
            state.droplet[k] += dm;
            outcome.mass_transfer[k] += dm / dt;
        }
        outcome.nucleation_rate = number * rho_mix / dt;
        outcome.nucleated = true;
        Ok(())
    }

    fn condense(
        &self,
        state: &mut CellState,
        values: &mut [f64],
        dt: f64,
        outcome: &mut CellOutcome,
    ) {
        if !self.condensation.is_enabled() {
            return;
        }

        let x = self.interpolator.sizes();
        let diameters = section_diameters(x, state.droplet_density().to_kg_per_m3());
        let number: f64 = values.iter().map(|m| m.max(0.0)).sum();
        let md: f64 = values
            .iter()
            .zip(&diameters)
            .map(|(m, d)| m.max(0.0) * d)
            .sum();
        if md <= SMALL || number <= SMALL {
            return;
        }

        let result = self.condensation.rate(state, &self.ctx, md / number);
        if !result.active {
            return;
        }

        let mut total_change = 0.0;
        for k in 0..state.n_species() {
            let y = state.vapor[k].max(0.0);
            let z = state.droplet[k].max(0.0);
            let z_new = exponential_relaxation(result.source[k], result.sink[k], y, z, md, dt)
                .clamp(0.0, y + z);
            let dz = z_new - z;

            state.vapor[k] = y - dz;
            state.droplet[k] = z_new;
            outcome.mass_transfer[k] += dz / dt;
            total_change += dz;
        }
        outcome.condensation_rate = total_change / dt;
        outcome.condensed = true;
        if total_change == 0.0 {
            return;
        }

        // Diffusion-limited growth is linear in diameter
        let old = values.to_vec();
        values.iter_mut().for_each(|m| *m = 0.0);
        for (i, &m) in old.iter().enumerate() {
            if m <= 0.0 {
                continue;
            }
            let s = x[i] + total_change * diameters[i] / md;
            if s <= 0.0 || s < self.y_min {
                outcome.defect.evaporated += m * s;
                continue;
            }
            outcome.defect.clipped += self.interpolator.add_to_m(s, m, values);
        }
    }

    fn coalesce(&self, state: &CellState, values: &mut [f64], dt: f64, outcome: &mut CellOutcome) {
        if !self.coalescence.is_enabled() || self.pairs.is_empty() {
            return;
        }

        let x = self.interpolator.sizes();
        let rho_d = state.droplet_density().to_kg_per_m3();
        let diameters = section_diameters(x, rho_d);
        let number: f64 = values.iter().map(|m| m.max(0.0)).sum();
        if number <= SMALL {
            return;
        }
        let d_mean = values
            .iter()
            .zip(&diameters)
            .map(|(m, d)| m.max(0.0) * d)
            .sum::<f64>()
            / number;

        let kernel = self.coalescence.rate(state, &self.ctx, rho_d, d_mean);
        if !kernel.active {
            return;
        }
        let rho_mix = state.mixture_density.to_kg_per_m3().max(SMALL);

        // Collision counts use start-of-step numbers so products formed in
        // this sweep do not collide again before the next step
        let start = values.to_vec();
        let pairs = self.pairs.pairs();
        let mut loss = vec![0.0; start.len()];
        let collisions: Vec<f64> = pairs
            .iter()
            .map(|pair| {
                let (i, j) = (pair.i, pair.j);
                let (m_i, m_j) = (start[i], start[j]);
                if m_i <= 0.0 || m_j <= 0.0 {
                    return 0.0;
                }
                let rate = rho_mix * kernel.kernel(diameters[i], diameters[j]) * m_i * m_j * dt;
                let f = if i == j { 0.5 * rate } else { rate };
                if f <= 0.0 || !f.is_finite() {
                    return 0.0;
                }
                loss[i] += f;
                loss[j] += f;
                f
            })
            .collect();

        // A section never loses more droplets than it started with
        let limit: Vec<f64> = start
            .iter()
            .zip(&loss)
            .map(|(m, l)| if *l > *m { m / l } else { 1.0 })
            .collect();

        for (pair, &raw) in pairs.iter().zip(&collisions) {
            if raw <= 0.0 {
                continue;
            }
            let (i, j) = (pair.i, pair.j);
            let f = raw * limit[i].min(limit[j]);

            values[i] = (values[i] - f).max(0.0);
            values[j] = (values[j] - f).max(0.0);
            self.interpolator.deposit(&pair.split, f, values);
            outcome.defect.clipped += f * pair.mass_defect;
            outcome.coalesced = true;
        }
    }
}
