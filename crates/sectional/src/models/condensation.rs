//! Condensation onto and evaporation from existing droplets.
//!
//! # Physics
//!
//! Diffusion-limited (Maxwell) growth of a droplet of diameter `d`:
//!
//! ```text
//! dm_k/dt = 2π d ρ_g D_k β(Kn) (Sh/2) (Y_k - Y_s,k)
//! ```
//!
//! `β` corrects for the transition regime (Fuchs-Sutugin), `Sh` for
//! convection around the droplet, and the surface mass fraction `Y_s,k`
//! carries the Kelvin effect. The per-droplet coefficient is linearized as
//!
//! ```text
//! dZ_k/dt = (Σ M_i d_i) × (source_k × Y_k - sink_k × Z_k)
//! ```
//!
//! with `sink_k = source_k × Y_s,k / Σ Z`, so the droplet composition
//! scales the surface vapor pressure. With `Y_k + Z_k` fixed over a step the
//! equation integrates exactly (see [`exponential_relaxation`]).
//!
//! # Variants
//!
//! - **None**: no phase change
//! - **Maxwell**: the growth law above with selectable corrections
//! - **Prescribed**: constant coefficients for every species
//!
//! # References
//!
//! - Maxwell (1877) - Diffusion-limited evaporation
//! - Fuchs & Sutugin (1971) - Transition-regime mass transfer
//! - Ranz & Marshall (1952) - Evaporation from drops

use serde::{Deserialize, Serialize};

use super::ModelContext;
use crate::constants::{PI, R_GAS, SMALL, ZERO_MASS};
use crate::error::{SectionalError, SectionalResult};
use crate::thermo::CellState;

const GRAVITY: f64 = 9.81;

/// Linearized mass-transfer coefficients for one cell.
///
/// Units are kg/(m·s) per droplet per unit diameter, per species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CondensationResult {
    pub active: bool,
    pub source: Vec<f64>,
    pub sink: Vec<f64>,
}

impl CondensationResult {
    pub fn inactive(n_species: usize) -> Self {
        Self {
            active: false,
            source: vec![0.0; n_species],
            sink: vec![0.0; n_species],
        }
    }
}

/// Transition-regime correction of the diffusive flux.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransitionRegime {
    /// Pure continuum diffusion (β = 1)
    Continuum,
    #[default]
    FuchsSutugin,
}

/// Sherwood-number correction for convection around the droplet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Convection {
    /// Stagnant surroundings (Sh = 2)
    #[default]
    None,
    /// Ranz-Marshall with the droplet slip Reynolds number
    Forced,
    /// Buoyancy-driven, from the vapor-induced density difference
    Natural,
}

/// Which diffusivity each species sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiffusivityMode {
    #[default]
    Species,
    /// Vapor-mole-fraction weighted mean of all species
    MixtureMean,
}

/// Options of the Maxwell growth law.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxwellCondensation {
    #[serde(default)]
    pub transition: TransitionRegime,
    #[serde(default = "default_kelvin")]
    pub kelvin: bool,
    #[serde(default)]
    pub convection: Convection,
    #[serde(default)]
    pub diffusivity: DiffusivityMode,
    /// Mass accommodation coefficient
    #[serde(default = "default_accommodation")]
    pub accommodation: f64,
}

fn default_kelvin() -> bool {
    true
}

fn default_accommodation() -> f64 {
    1.0
}

impl Default for MaxwellCondensation {
    fn default() -> Self {
        Self {
            transition: TransitionRegime::default(),
            kelvin: default_kelvin(),
            convection: Convection::default(),
            diffusivity: DiffusivityMode::default(),
            accommodation: default_accommodation(),
        }
    }
}

/// Condensation strategy selected by `submodels.condensation.type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CondensationModel {
    #[default]
    None,
    Maxwell(MaxwellCondensation),
    Prescribed { source: f64, sink: f64 },
}

impl CondensationModel {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn validate(&self) -> SectionalResult<()> {
        match self {
            Self::None => Ok(()),
            Self::Maxwell(options) => {
                if !options.accommodation.is_finite()
                    || options.accommodation <= 0.0
                    || options.accommodation > 1.0
                {
                    return Err(SectionalError::config(
                        "condensation accommodation must lie in (0, 1]",
                    ));
                }
                Ok(())
            }
            Self::Prescribed { source, sink } => {
                if !source.is_finite() || !sink.is_finite() || *source < 0.0 || *sink < 0.0 {
                    return Err(SectionalError::config(
                        "prescribed condensation source and sink must be non-negative",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Evaluate the transfer coefficients in one cell.
    ///
    /// # Arguments
    ///
    /// * `state` - Local thermodynamic state
    /// * `ctx` - Species and carrier-gas data
    /// * `diameter` - Representative droplet diameter of the cell (m)
    pub fn rate(&self, state: &CellState, ctx: &ModelContext, diameter: f64) -> CondensationResult {
        let n = state.n_species();
        if state.droplet_mass_fraction() <= ZERO_MASS {
            return CondensationResult::inactive(n);
        }

        match self {
            Self::None => CondensationResult::inactive(n),
            Self::Prescribed { source, sink } => CondensationResult {
                active: true,
                source: vec![source.max(0.0); n],
                sink: vec![sink.max(0.0); n],
            },
            Self::Maxwell(options) => maxwell_rate(options, state, ctx, diameter),
        }
    }
}

fn maxwell_rate(
    options: &MaxwellCondensation,
    state: &CellState,
    ctx: &ModelContext,
    diameter: f64,
) -> CondensationResult {
    let n = state.n_species();
    let d = diameter.max(SMALL);
    let t = state.temperature.to_kelvin();
    let p = state.pressure.to_pascals().max(SMALL);
    let rho_g = state.gas_density.to_kg_per_m3().max(SMALL);
    let mu = state.gas_viscosity.to_pascal_seconds().max(SMALL);
    let z_total = state.droplet_mass_fraction();

    let gas_molar_mass = ctx.gas_molar_mass(state);
    let mole_fraction = state.vapor_mole_fractions(ctx.species, ctx.carrier_molar_mass);
    let mixture_mean = mean_diffusivity(&mole_fraction, &state.diffusivity);

    let mut result = CondensationResult::inactive(n);
    result.active = true;

    for k in 0..n {
        let molar_mass = ctx.species[k].molar_mass;
        let diffusivity = match options.diffusivity {
            DiffusivityMode::Species => state.diffusivity[k],
            DiffusivityMode::MixtureMean => mixture_mean,
        }
        .max(SMALL);

        let correction = match options.transition {
            TransitionRegime::Continuum => 1.0,
            TransitionRegime::FuchsSutugin => {
                let mean_speed = (8.0 * R_GAS * t / (PI * molar_mass)).sqrt();
                let mean_free_path = 3.0 * diffusivity / mean_speed.max(SMALL);
                fuchs_sutugin(2.0 * mean_free_path / d, options.accommodation)
            }
        };

        let kelvin = if options.kelvin {
            let rho_l = state.liquid_density[k].max(SMALL);
            (4.0 * state.surface_tension[k] * molar_mass / (rho_l * R_GAS * t * d)).exp()
        } else {
            1.0
        };
        let surface_fraction = state.saturation_pressure[k] / p * kelvin;
        let surface_vapor = (surface_fraction * molar_mass / gas_molar_mass.max(SMALL)
            * (1.0 - z_total))
            .max(0.0);

        let schmidt = mu / (rho_g * diffusivity);
        let sherwood = match options.convection {
            Convection::None => 2.0,
            Convection::Forced => {
                let reynolds = rho_g * state.slip_speed.abs() * d / mu;
                ranz_marshall(reynolds, schmidt)
            }
            Convection::Natural => {
                let buoyancy = (surface_fraction - mole_fraction[k]).abs()
                    * (1.0 - molar_mass / gas_molar_mass.max(SMALL)).abs();
                let nu = mu / rho_g;
                let grashof = GRAVITY * d.powi(3) * buoyancy / (nu * nu);
                2.0 + 0.6 * grashof.powf(0.25) * schmidt.cbrt()
            }
        };

        let coefficient = PI * rho_g * diffusivity * correction * sherwood;
        let coefficient = if coefficient.is_finite() { coefficient.max(0.0) } else { 0.0 };
        let sink = coefficient * surface_vapor / z_total;

        result.source[k] = coefficient;
        result.sink[k] = if sink.is_finite() { sink.max(0.0) } else { 0.0 };
    }

    result
}

fn mean_diffusivity(mole_fraction: &[f64], diffusivity: &[f64]) -> f64 {
    let total: f64 = mole_fraction.iter().sum();
    if total > SMALL {
        mole_fraction
            .iter()
            .zip(diffusivity)
            .map(|(x, d)| x * d)
            .sum::<f64>()
            / total
    } else if diffusivity.is_empty() {
        0.0
    } else {
        diffusivity.iter().sum::<f64>() / diffusivity.len() as f64
    }
}

/// Fuchs-Sutugin transition-regime correction.
///
/// β = (1 + Kn) / (1 + (4/(3α) + 0.377) Kn + 4/(3α) Kn²)
///
/// Tends to 1 in the continuum limit and to the kinetic flux for Kn → ∞.
pub(crate) fn fuchs_sutugin(knudsen: f64, accommodation: f64) -> f64 {
    let kn = knudsen.max(0.0);
    let a = 4.0 / (3.0 * accommodation);
    (1.0 + kn) / (1.0 + (a + 0.377) * kn + a * kn * kn)
}

/// Ranz-Marshall Sherwood number, Sh = 2 + 0.6 Re^½ Sc^⅓.
pub(crate) fn ranz_marshall(reynolds: f64, schmidt: f64) -> f64 {
    2.0 + 0.6 * reynolds.max(0.0).sqrt() * schmidt.max(0.0).cbrt()
}

/// Exact solution of dZ/dt = md × (source × Y - sink × Z) over one step,
/// holding the species total Y + Z fixed.
///
/// # Arguments
///
/// * `source`, `sink` - Linearized coefficients of the species
/// * `y`, `z` - Vapor and droplet mass fractions at the start of the step
/// * `md` - Aggregate Σ M_i d_i of the cell
/// * `dt` - Step size (s)
///
/// Returns the droplet mass fraction at the end of the step.
pub fn exponential_relaxation(source: f64, sink: f64, y: f64, z: f64, md: f64, dt: f64) -> f64 {
    let b = source + sink;
    let rate = b * md * dt;
    if b <= SMALL || rate <= 0.0 {
        return z;
    }

    let equilibrium = (y + z) * source / b;
    equilibrium + (z - equilibrium) * (-rate).exp()
}
