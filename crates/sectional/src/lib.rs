//! Sectional population balance for droplet aerosols.
//!
//! Tracks the droplet-size distribution of a gas-droplet mixture as a set of
//! discrete mass classes ("sections") in every cell of a host mesh, and
//! advances it through nucleation, condensation/evaporation and coalescence
//! while keeping the section mass consistent with the droplet-phase species
//! mass fractions.
//!
//! # Architecture
//!
//! - [`sections`]: grid generation, section storage, moment-preserving
//!   redistribution and the coalescence pair table
//! - [`models`]: nucleation, condensation and coalescence rate models
//! - [`system`]: the operator-split driver and its diagnostics
//! - [`thermo`]: species data and the per-cell state supplied by the host
//! - [`config`]: serde/TOML configuration
//!
//! The host owns the mesh, the flow solution and all property correlations.
//! It supplies per-cell state through [`ThermoProvider`] and transports
//! sections through [`TransportSolver`].
//!
//! # Example
//!
//! ```no_run
//! use sectional::{PopulationBalanceSystem, SectionalConfig};
//! use units::Time;
//!
//! # fn run(states: Vec<sectional::CellState>) -> sectional::SectionalResult<()> {
//! let config = SectionalConfig::from_toml_str(
//!     r#"
//!     sizeDistributionType = "logarithmic"
//!     yMin = 1e-26
//!     yMax = 1e-10
//!     N = 40
//!
//!     [[species]]
//!     name = "water"
//!     molarMass = 0.018015
//!
//!     [submodels.condensation]
//!     type = "maxwell"
//!     "#,
//! )?;
//!
//! let mut system = PopulationBalanceSystem::from_config(&config, states.len())?;
//! let report = system.internal_step_with_rescale(&states, Time::from_milliseconds(1.0))?;
//! println!("{} cells condensing", report.condensing_cells);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod sections;
pub mod system;
pub mod thermo;

#[cfg(test)]
mod testing;

pub use config::{DiameterBounds, RescaleSettings, SectionalConfig, Submodels};
pub use error::{SectionalError, SectionalResult};
pub use models::{
    CoalescenceModel, CoalescenceResult, CondensationModel, CondensationResult, ModelContext,
    NucleationModel, NucleationResult,
};
pub use sections::{
    CoalescencePairTable, InitialDistribution, MomentPreservingInterpolator, Section,
    SectionalDistribution, SectionalGrid,
};
pub use system::{
    DomainDefect, DriftFlux, NoDrift, PopulationBalanceSystem, RescaleReport, SpatialInputs,
    StepOutputs, StepReport, TransportSolver,
};
pub use thermo::{CellState, SpeciesProperties, ThermoProvider};
