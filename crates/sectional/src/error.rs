//! Error types for the sectional engine.
//!
//! Setup problems (malformed grids, missing species data, inconsistent array
//! lengths) are returned as [`SectionalError`] before any time stepping
//! starts. Per-cell numerical trouble is clamped locally and never shows up
//! here; the one runtime error is a nucleated cluster that the grid cannot
//! hold.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type SectionalResult<T> = Result<T, SectionalError>;

#[derive(Error, Debug)]
pub enum SectionalError {
    /// Grid parameters that cannot produce strictly increasing edges.
    #[error("invalid sectional grid: {message}")]
    InvalidGrid { message: String },

    /// Inconsistent or out-of-range configuration value.
    #[error("configuration error: {message}")]
    Config { message: String },

    /// A per-species property required by a rate model is absent.
    #[error("missing property `{property}` for species {species}")]
    MissingSpeciesProperty {
        species: usize,
        property: &'static str,
    },

    /// Array length disagrees with the section or species count.
    #[error("size mismatch for {name}: expected {expected}, got {actual}")]
    SizeMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Critical cluster heavier than the largest representable droplet.
    #[error("nucleated cluster mass {size:e} kg in cell {cell} exceeds grid upper bound {max:e} kg")]
    NucleationOutOfRange { cell: usize, size: f64, max: f64 },

    /// The external transport layer refused a section solve.
    #[error("transport solve failed for section {section}: {message}")]
    Transport { section: usize, message: String },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SectionalError {
    pub fn grid(message: impl Into<String>) -> Self {
        Self::InvalidGrid {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }
}
