//! Run configuration.
//!
//! Read once at setup. Keys follow the camelCase names of the host's
//! dictionaries:
//!
//! ```toml
//! sizeDistributionType = "logarithmic"
//! yMin = 1e-21
//! yMax = 1e-12
//! N = 40
//! carrierMolarMass = 0.028965
//!
//! [[species]]
//! name = "water"
//! molarMass = 0.018015
//! latentHeat = 2.454e6
//!
//! [submodels.nucleation]
//! type = "classical"
//!
//! [submodels.coalescence]
//! type = "blended"
//! smallKnudsen = { type = "brownianContinuum" }
//! largeKnudsen = { type = "brownianFreeMolecular" }
//!
//! [diameter]
//! min = 1e-9
//! max = 1e-4
//! ```

use serde::{Deserialize, Serialize};
use units::Length;

use crate::error::{SectionalError, SectionalResult};
use crate::models::{CoalescenceModel, CondensationModel, NucleationModel};
use crate::sections::{InitialDistribution, SectionalGrid};
use crate::thermo::SpeciesProperties;

/// Full configuration of the population-balance engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionalConfig {
    /// Grid strategy and its parameters, keyed by `sizeDistributionType`
    #[serde(flatten)]
    pub grid: SectionalGrid,

    #[serde(default)]
    pub submodels: Submodels,

    #[serde(default)]
    pub diameter: DiameterBounds,

    #[serde(default)]
    pub rescale: RescaleSettings,

    /// Extra diffusivity added to every section in the spatial step (m²/s)
    #[serde(default)]
    pub numerical_diffusion: f64,

    /// Phase-changing species, in the order of the per-species cell fields
    pub species: Vec<SpeciesProperties>,

    /// Molar mass of the carrier gas (kg/mol)
    #[serde(default = "default_carrier_molar_mass")]
    pub carrier_molar_mass: f64,

    /// Droplet density used before the first internal step (kg/m³)
    #[serde(default = "default_liquid_density")]
    pub liquid_density: f64,

    #[serde(default)]
    pub initial: InitialDistribution,
}

fn default_carrier_molar_mass() -> f64 {
    0.028965
}

fn default_liquid_density() -> f64 {
    1000.0
}

/// One rate model per process.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Submodels {
    #[serde(default)]
    pub nucleation: NucleationModel,
    #[serde(default)]
    pub condensation: CondensationModel,
    #[serde(default)]
    pub coalescence: CoalescenceModel,
}

/// Clipping bounds for diameter diagnostics (m).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiameterBounds {
    #[serde(default = "default_min_diameter")]
    pub min: f64,
    #[serde(default = "default_max_diameter")]
    pub max: f64,
}

fn default_min_diameter() -> f64 {
    1e-9
}

fn default_max_diameter() -> f64 {
    1e-3
}

impl Default for DiameterBounds {
    fn default() -> Self {
        Self {
            min: default_min_diameter(),
            max: default_max_diameter(),
        }
    }
}

impl DiameterBounds {
    pub fn clip(&self, diameter: Length) -> Length {
        let lower = Length::from_m(self.min);
        if diameter.to_m().is_nan() {
            return lower;
        }
        diameter.clamp(lower, Length::from_m(self.max))
    }
}

/// Mass-consistency rescale after each internal step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RescaleSettings {
    #[serde(default = "default_rescale_enabled")]
    pub enabled: bool,
    /// Relative difference above which a mismatch is logged
    #[serde(default = "default_rescale_tolerance")]
    pub tolerance: f64,
}

fn default_rescale_enabled() -> bool {
    true
}

fn default_rescale_tolerance() -> f64 {
    1e-3
}

impl Default for RescaleSettings {
    fn default() -> Self {
        Self {
            enabled: default_rescale_enabled(),
            tolerance: default_rescale_tolerance(),
        }
    }
}

impl SectionalConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SectionalResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Whether a sectional representation is configured at all.
    pub fn is_enabled(&self) -> bool {
        self.grid.is_enabled()
    }

    pub fn n_species(&self) -> usize {
        self.species.len()
    }

    /// Check everything that can be checked without generating the grid.
    pub fn validate(&self) -> SectionalResult<()> {
        if self.species.is_empty() {
            return Err(SectionalError::config("at least one species is required"));
        }
        for (index, species) in self.species.iter().enumerate() {
            if !species.molar_mass.is_finite() || species.molar_mass <= 0.0 {
                return Err(SectionalError::MissingSpeciesProperty {
                    species: index,
                    property: "molarMass",
                });
            }
            if !species.latent_heat.is_finite() {
                return Err(SectionalError::MissingSpeciesProperty {
                    species: index,
                    property: "latentHeat",
                });
            }
        }
        if !self.carrier_molar_mass.is_finite() || self.carrier_molar_mass <= 0.0 {
            return Err(SectionalError::config("carrierMolarMass must be positive"));
        }
        if !self.liquid_density.is_finite() || self.liquid_density <= 0.0 {
            return Err(SectionalError::config("liquidDensity must be positive"));
        }

        let DiameterBounds { min, max } = self.diameter;
        if !min.is_finite() || !max.is_finite() || min <= 0.0 || min >= max {
            return Err(SectionalError::config(format!(
                "diameter bounds must satisfy 0 < min < max, got [{:e}, {:e}]",
                min, max
            )));
        }
        if !self.rescale.tolerance.is_finite() || self.rescale.tolerance < 0.0 {
            return Err(SectionalError::config("rescale tolerance must be non-negative"));
        }
        if !self.numerical_diffusion.is_finite() || self.numerical_diffusion < 0.0 {
            return Err(SectionalError::config("numericalDiffusion must be non-negative"));
        }

        self.submodels.nucleation.validate(self.n_species())?;
        self.submodels.condensation.validate()?;
        self.submodels.coalescence.validate()?;
        self.initial.validate()
    }
}
