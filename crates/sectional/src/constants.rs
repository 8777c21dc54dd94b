//! Physical constants in SI units.

pub use std::f64::consts::PI;

/// Boltzmann constant (J/K)
pub const K_B: f64 = 1.380_649e-23;

/// Avogadro constant (1/mol)
pub const N_A: f64 = 6.022_140_76e23;

/// Universal gas constant (J/(mol·K))
pub const R_GAS: f64 = K_B * N_A;

/// Floor for denominators built from masses, volume fractions and number
/// densities.
pub(crate) const SMALL: f64 = 1e-30;

/// Droplet-phase mass fraction below which a cell holds no droplets.
pub(crate) const ZERO_MASS: f64 = 1e-20;
