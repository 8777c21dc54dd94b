//! Droplet-droplet coalescence kernels.
//!
//! # Physics
//!
//! Every kernel is written as a short sum of power laws in the two
//! diameters,
//!
//! ```text
//! β(d_i, d_j) = Σ_l w_l (d_i^p_l d_j^q_l + d_i^q_l d_j^p_l)
//! ```
//!
//! so the system can evaluate any bin pair from a handful of numbers. The
//! Brownian kernels in both regimes take this form:
//!
//! ```text
//! continuum:        β = (2kT/3μ) (2 + d_i/d_j + d_j/d_i)
//! free molecular:   β ≈ ½√(6kT/ρ_l) (d_i + d_j)² (d_i^-3/2 + d_j^-3/2)
//! ```
//!
//! # Variants
//!
//! - **None**: no coalescence
//! - **Constant**: size-independent kernel
//! - **BrownianContinuum**: Stokes-Einstein diffusion, optional Cunningham slip
//! - **BrownianFreeMolecular**: ballistic collisions
//! - **Blended**: two kernels mixed so that at the representative diameter
//!   the result is the harmonic mean of both
//!
//! # References
//!
//! - Smoluchowski (1917) - Continuum coagulation kernel
//! - Fuchs (1964) - Mechanics of Aerosols
//! - Seinfeld & Pandis (2016) - Atmospheric Chemistry and Physics, ch. 13

use serde::{Deserialize, Serialize};

use super::ModelContext;
use crate::constants::{K_B, SMALL};
use crate::error::{SectionalError, SectionalResult};
use crate::thermo::CellState;

/// One power-law term `w (d_i^p d_j^q + d_i^q d_j^p)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelTerm {
    pub weight: f64,
    pub p: f64,
    pub q: f64,
}

impl KernelTerm {
    pub fn new(weight: f64, p: f64, q: f64) -> Self {
        Self { weight, p, q }
    }

    pub fn evaluate(&self, d_i: f64, d_j: f64) -> f64 {
        self.weight * (d_i.powf(self.p) * d_j.powf(self.q) + d_i.powf(self.q) * d_j.powf(self.p))
    }

    fn scaled(self, factor: f64) -> Self {
        Self {
            weight: self.weight * factor,
            ..self
        }
    }
}

/// Coalescence kernel for one cell.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoalescenceResult {
    pub active: bool,
    pub terms: Vec<KernelTerm>,
}

impl CoalescenceResult {
    pub fn inactive() -> Self {
        Self::default()
    }

    fn from_terms(terms: Vec<KernelTerm>) -> Self {
        Self {
            active: !terms.is_empty(),
            terms,
        }
    }

    /// Collision kernel between droplets of diameters `d_i` and `d_j` (m³/s).
    pub fn kernel(&self, d_i: f64, d_j: f64) -> f64 {
        if !self.active {
            return 0.0;
        }
        let d_i = d_i.max(SMALL);
        let d_j = d_j.max(SMALL);
        self.terms.iter().map(|t| t.evaluate(d_i, d_j)).sum::<f64>().max(0.0)
    }
}

/// Coalescence strategy selected by `submodels.coalescence.type`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CoalescenceModel {
    #[default]
    None,
    Constant {
        /// Kernel value (m³/s)
        rate: f64,
    },
    BrownianContinuum {
        /// Apply the Cunningham correction at the representative diameter
        #[serde(default, rename = "slipCorrection")]
        slip_correction: bool,
    },
    BrownianFreeMolecular,
    Blended {
        #[serde(rename = "smallKnudsen")]
        small_knudsen: Box<CoalescenceModel>,
        #[serde(rename = "largeKnudsen")]
        large_knudsen: Box<CoalescenceModel>,
    },
}

impl CoalescenceModel {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    pub fn validate(&self) -> SectionalResult<()> {
        match self {
            Self::Constant { rate } if !rate.is_finite() || *rate < 0.0 => Err(
                SectionalError::config("constant coalescence rate must be non-negative"),
            ),
            Self::Blended {
                small_knudsen,
                large_knudsen,
            } => {
                for inner in [small_knudsen.as_ref(), large_knudsen.as_ref()] {
                    match inner {
                        Self::None | Self::Blended { .. } => {
                            return Err(SectionalError::config(
                                "blended coalescence needs two non-blended kernels",
                            ))
                        }
                        other => other.validate()?,
                    }
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Build the kernel for one cell.
    ///
    /// # Arguments
    ///
    /// * `state` - Local thermodynamic state
    /// * `ctx` - Species and carrier-gas data
    /// * `liquid_density` - Droplet density (kg/m³)
    /// * `diameter` - Representative droplet diameter (m)
    pub fn rate(
        &self,
        state: &CellState,
        ctx: &ModelContext,
        liquid_density: f64,
        diameter: f64,
    ) -> CoalescenceResult {
        match self {
            Self::None => CoalescenceResult::inactive(),
            Self::Constant { rate } => {
                if *rate > 0.0 {
                    CoalescenceResult::from_terms(vec![KernelTerm::new(0.5 * rate, 0.0, 0.0)])
                } else {
                    CoalescenceResult::inactive()
                }
            }
            Self::BrownianContinuum { slip_correction } => {
                let kt = K_B * state.temperature.to_kelvin();
                let mu = state.gas_viscosity.to_pascal_seconds().max(SMALL);
                let mut c = 2.0 * kt / (3.0 * mu);
                if *slip_correction {
                    let knudsen = 2.0 * ctx.gas_mean_free_path(state) / diameter.max(SMALL);
                    c *= cunningham(knudsen);
                }
                CoalescenceResult::from_terms(vec![
                    KernelTerm::new(c, 0.0, 0.0),
                    KernelTerm::new(c, 1.0, -1.0),
                ])
            }
            Self::BrownianFreeMolecular => {
                let kt = K_B * state.temperature.to_kelvin();
                let k = 0.5 * (6.0 * kt / liquid_density.max(SMALL)).sqrt();
                CoalescenceResult::from_terms(vec![
                    KernelTerm::new(k, 0.5, 0.0),
                    KernelTerm::new(k, 2.0, -1.5),
                    KernelTerm::new(2.0 * k, 1.0, -0.5),
                ])
            }
            Self::Blended {
                small_knudsen,
                large_knudsen,
            } => {
                let small = small_knudsen.rate(state, ctx, liquid_density, diameter);
                let large = large_knudsen.rate(state, ctx, liquid_density, diameter);
                blend(small, large, diameter)
            }
        }
    }
}

/// Mix two kernels with weight φ so that at `diameter` the result equals the
/// harmonic mean of the two.
fn blend(small: CoalescenceResult, large: CoalescenceResult, diameter: f64) -> CoalescenceResult {
    match (small.active, large.active) {
        (false, false) => return CoalescenceResult::inactive(),
        (true, false) => return small,
        (false, true) => return large,
        (true, true) => {}
    }

    let a = small.kernel(diameter, diameter);
    let b = large.kernel(diameter, diameter);
    let phi = blend_weight(a, b);

    let terms = small
        .terms
        .into_iter()
        .map(|t| t.scaled(phi))
        .chain(large.terms.into_iter().map(|t| t.scaled(1.0 - phi)))
        .filter(|t| t.weight != 0.0)
        .collect();
    CoalescenceResult::from_terms(terms)
}

/// φ with φa + (1-φ)b = 2ab/(a+b).
pub(crate) fn blend_weight(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale <= SMALL || (a - b).abs() <= 1e-12 * scale {
        return 0.5;
    }
    let harmonic = 2.0 * a * b / (a + b);
    ((harmonic - b) / (a - b)).clamp(0.0, 1.0)
}

/// Cunningham slip correction, Cc = 1 + Kn (1.257 + 0.4 e^(-1.1/Kn)).
pub(crate) fn cunningham(knudsen: f64) -> f64 {
    if knudsen <= 0.0 {
        return 1.0;
    }
    1.0 + knudsen * (1.257 + 0.4 * (-1.1 / knudsen).exp())
}
