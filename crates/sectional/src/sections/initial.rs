//! Initial droplet populations.
//!
//! Seeds a cell's sections from an analytical size distribution carrying a
//! given droplet-phase mass fraction. Sizes are deposited through the
//! moment-preserving interpolator, so number and mass are both kept as long
//! as the distribution fits inside the grid.
//!
//! # Variants
//!
//! - **Empty**: no droplets
//! - **Monodisperse**: every droplet has the same diameter
//! - **LogNormal**: number distribution log-normal in diameter, given by its
//!   count median diameter and geometric standard deviation

use serde::{Deserialize, Serialize};
use units::{Density, Length, Mass};

use crate::constants::SMALL;
use crate::error::{SectionalError, SectionalResult};
use crate::sections::MomentPreservingInterpolator;

/// Nodes used to discretize a log-normal distribution
const LOG_NORMAL_NODES: usize = 64;

/// Half-width of the sampled range in units of ln σ_g
const LOG_NORMAL_SPAN: f64 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum InitialDistribution {
    #[default]
    Empty,

    Monodisperse {
        /// Droplet diameter (m)
        diameter: f64,
    },

    LogNormal {
        /// Count median diameter (m)
        #[serde(rename = "medianDiameter")]
        median_diameter: f64,
        /// Geometric standard deviation σ_g (> 1)
        #[serde(rename = "geometricStdDev")]
        geometric_std_dev: f64,
    },
}

impl InitialDistribution {
    /// Check the distribution parameters.
    pub fn validate(&self) -> SectionalResult<()> {
        match self {
            Self::Empty => Ok(()),
            Self::Monodisperse { diameter } => {
                if *diameter <= 0.0 {
                    return Err(SectionalError::config(format!(
                        "monodisperse diameter must be positive, got {:e}",
                        diameter
                    )));
                }
                Ok(())
            }
            Self::LogNormal {
                median_diameter,
                geometric_std_dev,
            } => {
                if *median_diameter <= 0.0 {
                    return Err(SectionalError::config("log-normal median diameter must be positive"));
                }
                if *geometric_std_dev < 1.0 {
                    return Err(SectionalError::config(format!(
                        "geometric standard deviation must be >= 1, got {}",
                        geometric_std_dev
                    )));
                }
                Ok(())
            }
        }
    }

    /// Section values for one cell holding droplet-phase mass fraction
    /// `mass_fraction` of liquid density `liquid_density`.
    ///
    /// Returns the values together with the mass defect of any part of the
    /// distribution that fell outside the grid.
    pub fn section_values(
        &self,
        interpolator: &MomentPreservingInterpolator,
        mass_fraction: f64,
        liquid_density: Density,
    ) -> SectionalResult<(Vec<f64>, f64)> {
        self.validate()?;

        let mut values = vec![0.0; interpolator.sizes().len()];
        if mass_fraction <= 0.0 {
            return Ok((values, 0.0));
        }

        let nodes = match self {
            Self::Empty => return Ok((values, 0.0)),
            Self::Monodisperse { diameter } => vec![(*diameter, 1.0)],
            Self::LogNormal {
                median_diameter,
                geometric_std_dev,
            } => log_normal_nodes(*median_diameter, *geometric_std_dev),
        };

        // (droplet mass, number fraction)
        let masses: Vec<(f64, f64)> = nodes
            .iter()
            .map(|&(d, w)| (Mass::of_sphere(Length::from_m(d), liquid_density).to_kg(), w))
            .collect();

        let mean_mass: f64 = masses.iter().map(|(m, w)| m * w).sum();
        let total_number = mass_fraction / mean_mass.max(SMALL);

        let defect = masses
            .iter()
            .map(|&(m, w)| interpolator.add_to_m(m, total_number * w, &mut values))
            .sum();

        Ok((values, defect))
    }
}

/// Diameters and normalized number weights sampling a log-normal.
fn log_normal_nodes(median: f64, sigma_g: f64) -> Vec<(f64, f64)> {
    let ln_sigma = sigma_g.ln();
    if ln_sigma < 1e-12 {
        return vec![(median, 1.0)];
    }

    let lo = median.ln() - LOG_NORMAL_SPAN * ln_sigma;
    let step = 2.0 * LOG_NORMAL_SPAN * ln_sigma / (LOG_NORMAL_NODES - 1) as f64;

    let raw: Vec<(f64, f64)> = (0..LOG_NORMAL_NODES)
        .map(|k| {
            let ln_d = lo + k as f64 * step;
            let z = (ln_d - median.ln()) / ln_sigma;
            (ln_d.exp(), (-0.5 * z * z).exp())
        })
        .collect();

    let norm: f64 = raw.iter().map(|(_, w)| w).sum();
    raw.into_iter().map(|(d, w)| (d, w / norm)).collect()
}
