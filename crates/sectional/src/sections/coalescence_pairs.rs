//! Precomputed coalescence outcomes for every unordered section pair.
//!
//! Two droplets from sections `i <= j` merge into one droplet of mass
//! `x_i + x_j`. Where that product lands on the grid depends only on the
//! grid, so the target sections and weights are resolved once and shared
//! read-only by every cell.

use crate::sections::{MomentPreservingInterpolator, Placement, SectionalDistribution, Split};

/// Outcome of merging one droplet from section `i` with one from `j`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoalescencePair {
    pub i: usize,
    pub j: usize,
    /// Product mass x_i + x_j (kg)
    pub size: f64,
    /// Target sections and weights for the product
    pub split: Split,
    /// Mass per collision the split cannot represent (kg); non-zero only when
    /// the product lies between x_{P-1} and the upper grid bound.
    pub mass_defect: f64,
}

impl CoalescencePair {
    /// Lower target section k.
    pub fn target(&self) -> usize {
        self.split.lower
    }

    /// Sum of the product weights.
    pub fn weight_sum(&self) -> f64 {
        self.split.lower_weight + self.split.upper.map_or(0.0, |_| self.split.upper_weight)
    }
}

/// Flat table of [`CoalescencePair`]s in `(i, j)` row-major order.
#[derive(Debug, Clone)]
pub struct CoalescencePairTable {
    pairs: Vec<CoalescencePair>,
    n_sections: usize,
    dropped: usize,
}

impl CoalescencePairTable {
    /// Resolve all `P(P+1)/2` pairs, dropping products heavier than the
    /// upper grid bound.
    ///
    /// Dropped collisions cannot be represented and are ignored during the
    /// internal step. The table must be rebuilt whenever the grid changes.
    pub fn build(
        distribution: &SectionalDistribution,
        interpolator: &MomentPreservingInterpolator,
    ) -> Self {
        let x = distribution.sizes();
        let n = x.len();
        let upper_bound = distribution.y_max();

        let mut pairs = Vec::with_capacity(n * (n + 1) / 2);
        let mut dropped = 0;

        for i in 0..n {
            for j in i..n {
                let size = x[i] + x[j];
                if size > upper_bound {
                    dropped += 1;
                    continue;
                }

                let split = interpolator.split(size);
                let mass_defect = match split.placement {
                    Placement::Inside => 0.0,
                    Placement::Below | Placement::Above => size - split.represented_size(x),
                };

                pairs.push(CoalescencePair {
                    i,
                    j,
                    size,
                    split,
                    mass_defect,
                });
            }
        }

        log::debug!(
            "coalescence pair table: {} pairs kept, {} dropped beyond {:e} kg",
            pairs.len(),
            dropped,
            upper_bound
        );

        Self {
            pairs,
            n_sections: n,
            dropped,
        }
    }

    pub fn pairs(&self) -> &[CoalescencePair] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Number of pairs whose product exceeded the grid.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn n_sections(&self) -> usize {
        self.n_sections
    }

    /// Look up the pair `(i, j)` regardless of argument order.
    pub fn get(&self, i: usize, j: usize) -> Option<&CoalescencePair> {
        let (i, j) = if i <= j { (i, j) } else { (j, i) };
        // Pairs are stored in (i, j) order with j >= i, so binary search works
        self.pairs
            .binary_search_by(|p| (p.i, p.j).cmp(&(i, j)))
            .ok()
            .map(|idx| &self.pairs[idx])
    }
}
