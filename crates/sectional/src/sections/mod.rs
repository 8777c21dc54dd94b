//! Sectional representation of the droplet-size distribution.
//!
//! The continuous droplet-mass coordinate is cut into `P` contiguous bins
//! ("sections"). Each section carries the droplet number per unit mixture
//! mass in every cell; the representative mass `x_i` of the bin converts
//! number to droplet-phase mass.
//!
//! - [`SectionalGrid`]: grid-generation strategies (linear, logarithmic,
//!   geometric, explicit list)
//! - [`SectionalDistribution`]: the ordered sections plus size lookup
//! - [`MomentPreservingInterpolator`]: two-moment redistribution of
//!   off-grid sizes
//! - [`CoalescencePairTable`]: precomputed coalescence products
//! - [`InitialDistribution`]: initial population shapes

mod coalescence_pairs;
mod distribution;
mod grid;
mod initial;
mod interpolator;
mod section;

#[cfg(test)]
mod grid_test;

pub use coalescence_pairs::{CoalescencePair, CoalescencePairTable};
pub use distribution::SectionalDistribution;
pub use grid::{GridLayout, SectionalGrid};
pub use initial::InitialDistribution;
pub use interpolator::{MomentPreservingInterpolator, Placement, Split};
pub use section::Section;
