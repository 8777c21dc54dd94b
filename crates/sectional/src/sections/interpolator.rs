//! Two-moment redistribution onto neighbouring sections.
//!
//! Droplets appear at sizes that are not grid points: nucleated clusters,
//! droplets grown or shrunk by condensation, coalescence products. A
//! quantity `q` at size `s` is split between the two sections whose
//! representative sizes bracket `s` so that both the quantity and its first
//! size moment are kept:
//!
//! ```text
//! w_k + w_{k+1}                 = 1
//! w_k x_k + w_{k+1} x_{k+1}     = s
//! ```
//!
//! Outside `[x_0, x_{P-1}]` the whole quantity goes to the end section and the
//! first moment is not preserved; the difference is reported back as a
//! mass defect so callers can account for it.

use nalgebra::{Matrix2, Vector2};

use crate::sections::distribution::search_lower;
use crate::sections::SectionalDistribution;

/// Where a size landed relative to the representative sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// s < x_0: everything to section 0
    Below,
    /// x_0 <= s < x_{P-1}: split between two neighbours
    Inside,
    /// s >= x_{P-1}: everything to the last section
    Above,
}

/// Interpolation weights for one size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    /// Section receiving `lower_weight`
    pub lower: usize,
    /// Neighbour receiving `upper_weight`; `None` when clipped to an end
    pub upper: Option<usize>,
    pub lower_weight: f64,
    pub upper_weight: f64,
    pub placement: Placement,
}

impl Split {
    /// First moment carried by the split per unit quantity: Σ w x.
    pub fn represented_size(&self, x: &[f64]) -> f64 {
        let upper = self.upper.map_or(0.0, |k| self.upper_weight * x[k]);
        self.lower_weight * x[self.lower] + upper
    }
}

/// Moment-preserving interpolator over a fixed set of representative sizes.
///
/// Holds its own copy of the sizes so it can be shared read-only between
/// worker threads while the distribution's fields are being written.
#[derive(Debug, Clone)]
pub struct MomentPreservingInterpolator {
    x: Vec<f64>,
}

impl MomentPreservingInterpolator {
    pub fn new(distribution: &SectionalDistribution) -> Self {
        Self::from_sizes(distribution.sizes().to_vec())
    }

    /// Build directly from strictly increasing representative sizes.
    pub fn from_sizes(x: Vec<f64>) -> Self {
        debug_assert!(!x.is_empty());
        Self { x }
    }

    pub fn sizes(&self) -> &[f64] {
        &self.x
    }

    fn x_min(&self) -> f64 {
        self.x[0]
    }

    fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Resolve the target sections and weights for size `s`.
    pub fn split(&self, s: f64) -> Split {
        let last = self.x.len() - 1;

        if s < self.x_min() {
            return Split {
                lower: 0,
                upper: None,
                lower_weight: 1.0,
                upper_weight: 0.0,
                placement: Placement::Below,
            };
        }
        if s >= self.x_max() {
            return Split {
                lower: last,
                upper: None,
                lower_weight: 1.0,
                upper_weight: 0.0,
                placement: Placement::Above,
            };
        }

        // x_0 <= s < x_{P-1}, so k exists and k + 1 <= P - 1
        let k = search_lower(&self.x, s).unwrap_or(0).min(last - 1);
        let (lower_weight, upper_weight) = self.weights(k, s);

        Split {
            lower: k,
            upper: Some(k + 1),
            lower_weight,
            upper_weight,
            placement: Placement::Inside,
        }
    }

    /// Solve the 2×2 moment system for support points `x_k`, `x_{k+1}`.
    ///
    /// The second row is scaled by `1/x_{k+1}` to keep the matrix well
    /// conditioned for droplet masses many decades below one.
    fn weights(&self, k: usize, s: f64) -> (f64, f64) {
        let x_lo = self.x[k];
        let x_hi = self.x[k + 1];

        let scale = if x_hi != 0.0 { x_hi } else { 1.0 };
        let a = Matrix2::new(1.0, 1.0, x_lo / scale, x_hi / scale);
        let b = Vector2::new(1.0, s / scale);

        let w = a
            .lu()
            .solve(&b)
            .map(|w| (w[0], w[1]))
            .unwrap_or_else(|| {
                let upper = (s - x_lo) / (x_hi - x_lo);
                (1.0 - upper, upper)
            });

        // Round-off can push a weight a hair outside [0, 1]
        let upper = w.1.clamp(0.0, 1.0);
        (1.0 - upper, upper)
    }

    /// Add quantity `q` produced at size `s` to one cell's section values.
    ///
    /// Returns the first-moment defect `q (s - Σ w x)`: zero for sizes
    /// inside `[x_0, x_{P-1})`, the mass that could not be represented
    /// otherwise (positive when mass is lost, negative when created).
    pub fn add_to_m(&self, s: f64, q: f64, cell: &mut [f64]) -> f64 {
        let split = self.split(s);
        self.deposit(&split, q, cell);
        match split.placement {
            Placement::Inside => 0.0,
            Placement::Below | Placement::Above => q * (s - split.represented_size(&self.x)),
        }
    }

    /// Add `q` to a cell using precomputed weights.
    pub fn deposit(&self, split: &Split, q: f64, cell: &mut [f64]) {
        cell[split.lower] += split.lower_weight * q;
        if let Some(k) = split.upper {
            cell[k] += split.upper_weight * q;
        }
    }
}
