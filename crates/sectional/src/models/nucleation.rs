//! Homogeneous nucleation of new droplets from supersaturated vapor.
//!
//! # Physics
//!
//! Classical nucleation theory generalized to several condensing species.
//! The critical cluster is in equilibrium with the vapor of every species,
//! which fixes its liquid mole fractions `x_k` through a single scalar `β`:
//!
//! ```text
//! x_k = S_k × exp(-β v_k)        Σ_k x_k = 1
//! ```
//!
//! where `S_k` is the saturation ratio and `v_k` the molecular volume. The
//! Kelvin relation then gives the critical radius and barrier:
//!
//! ```text
//! r* = 2σ / (β k T)
//! ΔG* = (4π/3) σ r*²
//! n*  = (4π/3) r*³ / Σ x_k v_k
//! ```
//!
//! and the steady-state rate
//!
//! ```text
//! J = R_eff × Z × N_1 exp(-ΔG*/kT)
//! Z = √(ΔG* / (3π kT n*²))
//! ```
//!
//! with `R_eff` the composition-weighted monomer attachment rate (kinetic
//! impingement in series with vapor diffusion) and `N_1` the total vapor
//! number density.
//!
//! # Variants
//!
//! - **None**: no nucleation
//! - **Classical**: the multi-species theory above
//! - **Fixed**: a prescribed rate and cluster size, for verification runs
//!
//! # References
//!
//! - Becker & Döring (1935) - Kinetic treatment of nucleation
//! - Reiss (1950) - Binary nucleation
//! - Wilemski (1984) - Composition of the critical nucleus

use serde::{Deserialize, Serialize};

use super::ModelContext;
use crate::constants::{K_B, PI, SMALL};
use crate::error::{SectionalError, SectionalResult};
use crate::thermo::CellState;

/// Outcome of a nucleation evaluation in one cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NucleationResult {
    pub active: bool,
    /// Nucleation rate (new droplets per m³ per s)
    pub rate: f64,
    /// Mass of one critical cluster (kg)
    pub size: f64,
    /// Diameter of one critical cluster (m)
    pub diameter: f64,
    /// Mass fraction of each species in the cluster (sums to 1)
    pub composition: Vec<f64>,
    /// Newton iterations spent on the cluster composition
    pub iterations: usize,
    pub converged: bool,
}

impl NucleationResult {
    pub fn inactive(n_species: usize) -> Self {
        Self {
            composition: vec![0.0; n_species],
            converged: true,
            ..Default::default()
        }
    }
}

/// Numeric settings of classical nucleation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassicalNucleation {
    /// Nucleation is off unless max S_k > 1 + saturationTolerance
    #[serde(default = "default_saturation_tolerance")]
    pub saturation_tolerance: f64,
    /// Iteration cap of the composition solve
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Residual tolerance of the composition solve
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Newton step relaxation factor in (0, 1]
    #[serde(default = "default_relaxation")]
    pub relaxation: f64,
}

fn default_saturation_tolerance() -> f64 {
    1e-3
}

fn default_max_iterations() -> usize {
    50
}

fn default_tolerance() -> f64 {
    1e-10
}

fn default_relaxation() -> f64 {
    1.0
}

impl Default for ClassicalNucleation {
    fn default() -> Self {
        Self {
            saturation_tolerance: default_saturation_tolerance(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            relaxation: default_relaxation(),
        }
    }
}

/// Nucleation strategy selected by `submodels.nucleation.type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NucleationModel {
    #[default]
    None,
    Classical(ClassicalNucleation),
    Fixed {
        /// New droplets per m³ per s
        rate: f64,
        /// Cluster mass (kg)
        size: f64,
        /// Cluster mass fractions; empty means proportional to the vapor
        #[serde(default)]
        composition: Vec<f64>,
    },
}

impl NucleationModel {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn validate(&self, n_species: usize) -> SectionalResult<()> {
        match self {
            Self::None => Ok(()),
            Self::Classical(params) => {
                if !params.saturation_tolerance.is_finite() || params.saturation_tolerance < 0.0 {
                    return Err(SectionalError::config(
                        "nucleation saturationTolerance must be non-negative",
                    ));
                }
                if params.max_iterations == 0 {
                    return Err(SectionalError::config(
                        "nucleation maxIterations must be at least 1",
                    ));
                }
                if !params.tolerance.is_finite() || params.tolerance <= 0.0 {
                    return Err(SectionalError::config("nucleation tolerance must be positive"));
                }
                if !params.relaxation.is_finite()
                    || params.relaxation <= 0.0
                    || params.relaxation > 1.0
                {
                    return Err(SectionalError::config(
                        "nucleation relaxation must lie in (0, 1]",
                    ));
                }
                Ok(())
            }
            Self::Fixed {
                rate,
                size,
                composition,
            } => {
                if !rate.is_finite() || *rate < 0.0 {
                    return Err(SectionalError::config("fixed nucleation rate must be non-negative"));
                }
                if !size.is_finite() || *size <= 0.0 {
                    return Err(SectionalError::config("fixed nucleation size must be positive"));
                }
                if !composition.is_empty() {
                    if composition.len() != n_species {
                        return Err(SectionalError::size_mismatch(
                            "nucleation composition",
                            n_species,
                            composition.len(),
                        ));
                    }
                    if composition.iter().any(|c| !c.is_finite() || *c < 0.0)
                        || composition.iter().sum::<f64>() <= 0.0
                    {
                        return Err(SectionalError::config(
                            "fixed nucleation composition must be non-negative with a positive sum",
                        ));
                    }
                }
                Ok(())
            }
        }
    }

    /// Evaluate the nucleation rate in one cell.
    pub fn rate(&self, state: &CellState, ctx: &ModelContext) -> NucleationResult {
        match self {
            Self::None => NucleationResult::inactive(state.n_species()),
            Self::Classical(params) => classical_rate(params, state, ctx),
            Self::Fixed {
                rate,
                size,
                composition,
            } => fixed_rate(*rate, *size, composition, state),
        }
    }
}

fn fixed_rate(rate: f64, size: f64, composition: &[f64], state: &CellState) -> NucleationResult {
    let n = state.n_species();
    if rate <= 0.0 || size <= 0.0 {
        return NucleationResult::inactive(n);
    }

    let weights: Vec<f64> = if composition.is_empty() {
        state.vapor.iter().map(|y| y.max(0.0)).collect()
    } else {
        composition.to_vec()
    };
    let total: f64 = weights.iter().sum();
    let composition = if total > SMALL {
        weights.iter().map(|w| w / total).collect()
    } else {
        vec![1.0 / n.max(1) as f64; n]
    };

    let density = state.droplet_density().to_kg_per_m3().max(SMALL);
    let diameter = (6.0 * size / (PI * density)).cbrt();

    NucleationResult {
        active: true,
        rate,
        size,
        diameter,
        composition,
        iterations: 0,
        converged: true,
    }
}

fn classical_rate(
    params: &ClassicalNucleation,
    state: &CellState,
    ctx: &ModelContext,
) -> NucleationResult {
    let n = state.n_species();
    let saturation = state.saturation_ratios(ctx.species, ctx.carrier_molar_mass);

    let Some((reference, s_max)) = saturation
        .iter()
        .copied()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(&b.1))
    else {
        return NucleationResult::inactive(n);
    };
    if s_max <= 1.0 + params.saturation_tolerance {
        return NucleationResult::inactive(n);
    }

    let kt = K_B * state.temperature.to_kelvin();
    let molecular_mass: Vec<f64> = ctx.species.iter().map(|s| s.molecular_mass()).collect();
    let molecular_volume: Vec<f64> = molecular_mass
        .iter()
        .zip(&state.liquid_density)
        .map(|(m, rho)| m / rho.max(SMALL))
        .collect();

    // Reduced volumes relative to the most supersaturated species keep β near ln S.
    let v_ref = molecular_volume[reference].max(SMALL);
    let gamma: Vec<f64> = molecular_volume.iter().map(|v| v / v_ref).collect();

    let solve = solve_composition(params, &saturation, &gamma, s_max.ln());
    if !solve.converged {
        log::warn!(
            "nucleation composition did not converge after {} iterations (residual {:.3e})",
            solve.iterations,
            solve.residual
        );
    }

    let mut x: Vec<f64> = saturation
        .iter()
        .zip(&gamma)
        .map(|(s, g)| (s * (-solve.beta * g).exp()).max(0.0))
        .collect();
    let x_sum: f64 = x.iter().sum();
    if x_sum <= SMALL {
        return NucleationResult::inactive(n);
    }
    x.iter_mut().for_each(|xk| *xk /= x_sum);

    let sigma: f64 = x.iter().zip(&state.surface_tension).map(|(a, b)| a * b).sum();
    let v_mix: f64 = x.iter().zip(&molecular_volume).map(|(a, b)| a * b).sum();
    let m_mix: f64 = x.iter().zip(&molecular_mass).map(|(a, b)| a * b).sum();

    let beta = solve.beta / v_ref;
    let radius = 2.0 * sigma / (beta * kt).max(SMALL);
    let n_star = (4.0 / 3.0 * PI * radius.powi(3) / v_mix.max(SMALL)).max(1.0);
    let barrier = 4.0 / 3.0 * PI * sigma * radius * radius;
    let zeldovich = (barrier / (3.0 * PI * kt * n_star * n_star)).sqrt();

    let partial_pressure = state.partial_pressures(ctx.species, ctx.carrier_molar_mass);
    let number_density: Vec<f64> = partial_pressure.iter().map(|p| p / kt).collect();
    let monomers: f64 = number_density.iter().sum();

    // Attachment resistance of a mixed cluster: 1/R_eff = Σ x_k² / R_k
    let mut resistance = 0.0;
    for k in 0..n {
        if x[k] <= 0.0 {
            continue;
        }
        let kinetic = 4.0 * PI * radius * radius * partial_pressure[k]
            / (2.0 * PI * molecular_mass[k] * kt).sqrt();
        let diffusive = 4.0 * PI * radius * state.diffusivity[k] * number_density[k];
        let growth = kinetic * diffusive / (kinetic + diffusive).max(SMALL);
        resistance += x[k] * x[k] / growth.max(SMALL);
    }
    let growth_rate = if resistance > 0.0 { 1.0 / resistance } else { 0.0 };

    let rate = growth_rate * zeldovich * monomers * (-barrier / kt).exp();
    let rate = if rate.is_finite() { rate.max(0.0) } else { 0.0 };

    let size = n_star * m_mix;
    let composition = x
        .iter()
        .zip(&molecular_mass)
        .map(|(xk, m)| xk * m / m_mix.max(SMALL))
        .collect();

    NucleationResult {
        active: rate > 0.0,
        rate,
        size,
        diameter: 2.0 * radius,
        composition,
        iterations: solve.iterations,
        converged: solve.converged,
    }
}

struct CompositionSolve {
    beta: f64,
    residual: f64,
    iterations: usize,
    converged: bool,
}

/// Damped Newton iteration on f(β) = Σ S_k exp(-β γ_k) - 1.
///
/// f is convex and decreasing in β, so starting from β₀ = ln S_max, where
/// f(β₀) ≥ 0, plain Newton steps approach the root monotonically from below.
fn solve_composition(
    params: &ClassicalNucleation,
    saturation: &[f64],
    gamma: &[f64],
    beta0: f64,
) -> CompositionSolve {
    let residual = |beta: f64| -> (f64, f64) {
        let mut f = -1.0;
        let mut df = 0.0;
        for (s, g) in saturation.iter().zip(gamma) {
            let term = s.max(0.0) * (-beta * g).exp();
            f += term;
            df -= g * term;
        }
        (f, df)
    };

    let mut beta = beta0.max(SMALL);
    let (mut f, mut df) = residual(beta);

    for iteration in 1..=params.max_iterations {
        if f.abs() < params.tolerance {
            return CompositionSolve {
                beta,
                residual: f,
                iterations: iteration - 1,
                converged: true,
            };
        }
        if df.abs() <= SMALL {
            break;
        }

        let mut step = -params.relaxation * f / df;
        while beta + step <= 0.0 {
            step *= 0.5;
        }
        beta += step;
        (f, df) = residual(beta);
    }

    CompositionSolve {
        beta,
        residual: f,
        iterations: params.max_iterations,
        converged: f.abs() < params.tolerance,
    }
}
