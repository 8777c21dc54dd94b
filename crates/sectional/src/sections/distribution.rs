//! Ordered collection of sections over the mesh.

use crate::error::{SectionalError, SectionalResult};
use crate::sections::{GridLayout, Section, SectionalGrid};

/// The sectional representation of the droplet population.
///
/// Owns `P` [`Section`]s in increasing size order together with the grid
/// they were generated from. Lookup by physical size goes through
/// [`search`](Self::search) (bin edges) or
/// [`search_lower`](Self::search_lower) (representative sizes).
#[derive(Debug, Clone)]
pub struct SectionalDistribution {
    sections: Vec<Section>,

    /// Strategy the layout came from
    grid: SectionalGrid,

    /// Representative sizes, cached contiguously for lookups (kg)
    x: Vec<f64>,

    /// Bin edges, length P + 1 (kg)
    y: Vec<f64>,

    n_cells: usize,
}

impl SectionalDistribution {
    /// Generate the grid and allocate empty sections for `n_cells` cells.
    pub fn new(grid: SectionalGrid, n_cells: usize) -> SectionalResult<Self> {
        let layout = grid.generate()?;
        Self::from_layout(grid, layout, n_cells)
    }

    /// Build from an already generated layout.
    pub fn from_layout(
        grid: SectionalGrid,
        layout: GridLayout,
        n_cells: usize,
    ) -> SectionalResult<Self> {
        layout.validate()?;
        if n_cells == 0 {
            return Err(SectionalError::config("mesh must contain at least one cell"));
        }

        let sections = layout
            .x
            .iter()
            .enumerate()
            .map(|(i, &x)| Section::new(i, x, layout.y[i], layout.y[i + 1], n_cells))
            .collect();

        Ok(Self {
            sections,
            grid,
            x: layout.x,
            y: layout.y,
            n_cells,
        })
    }

    /// Number of sections P.
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    pub fn grid(&self) -> &SectionalGrid {
        &self.grid
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn sections_mut(&mut self) -> &mut [Section] {
        &mut self.sections
    }

    pub fn section(&self, i: usize) -> &Section {
        &self.sections[i]
    }

    /// Representative sizes x_i.
    pub fn sizes(&self) -> &[f64] {
        &self.x
    }

    /// Bin edges y_i.
    pub fn edges(&self) -> &[f64] {
        &self.y
    }

    /// Smallest representative size x_0.
    pub fn x_min(&self) -> f64 {
        self.x[0]
    }

    /// Largest representative size x_{P-1}.
    pub fn x_max(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    /// Lower grid bound y_0.
    pub fn y_min(&self) -> f64 {
        self.y[0]
    }

    /// Upper grid bound y_P.
    pub fn y_max(&self) -> f64 {
        self.y[self.y.len() - 1]
    }

    /// Index of the bin whose edges bracket `s` (`y_i <= s < y_{i+1}`).
    ///
    /// Returns `None` outside `[y_0, y_P)`.
    pub fn search(&self, s: f64) -> Option<usize> {
        if s < self.y_min() || s >= self.y_max() || s.is_nan() {
            return None;
        }
        // Number of edges <= s, minus one
        Some(self.y.partition_point(|&edge| edge <= s) - 1)
    }

    /// Index of the largest representative size not exceeding `s`.
    ///
    /// Returns `None` when `s < x_0`.
    pub fn search_lower(&self, s: f64) -> Option<usize> {
        search_lower(&self.x, s)
    }

    /// Copy the section values of one cell into `out` (length P).
    pub fn gather(&self, cell: usize, out: &mut [f64]) {
        for (value, section) in out.iter_mut().zip(&self.sections) {
            *value = section.values()[cell];
        }
    }

    /// Write one cell's section values back.
    pub fn scatter(&mut self, cell: usize, values: &[f64]) {
        for (section, &value) in self.sections.iter_mut().zip(values) {
            section.values_mut()[cell] = value;
        }
    }

    /// Total droplet number per unit mixture mass in `cell`.
    pub fn total_number(&self, cell: usize) -> f64 {
        self.sections.iter().map(|s| s.values()[cell]).sum()
    }

    /// Droplet-phase mass fraction in `cell`: Σ x_i M_i.
    pub fn mass_fraction(&self, cell: usize) -> f64 {
        self.sections.iter().map(|s| s.mass_fraction(cell)).sum()
    }

    /// k-th moment of the mass coordinate in `cell`: Σ x_iᵏ M_i.
    pub fn moment(&self, cell: usize, k: f64) -> f64 {
        self.sections
            .iter()
            .map(|s| s.size().powf(k) * s.values()[cell])
            .sum()
    }
}

/// Largest index `i` with `x[i] <= s`, or `None` below `x[0]`.
pub(crate) fn search_lower(x: &[f64], s: f64) -> Option<usize> {
    if s.is_nan() {
        return None;
    }
    x.partition_point(|&xi| xi <= s).checked_sub(1)
}
