//! Sectional grid generation.
//!
//! Partitions the droplet-mass coordinate into contiguous bins. Every
//! strategy yields strictly increasing edges `y_0 < … < y_P` and one
//! representative size `x_i` inside each open bin `(y_i, y_{i+1})`.
//!
//! # Strategies
//!
//! - **Linear**: equal-width bins, representative size at the bin centre
//! - **Logarithmic**: equal-ratio bins, representative size at the
//!   geometric centre
//! - **Geometric**: bin widths grow by a constant factor `r = q^(1/(N-1))`,
//!   so the last bin is `q` times wider than the first
//! - **List**: sizes and edges supplied verbatim

use serde::{Deserialize, Serialize};

use crate::error::{SectionalError, SectionalResult};

/// Grid-generation strategy, selected by `sizeDistributionType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sizeDistributionType", rename_all = "camelCase")]
pub enum SectionalGrid {
    /// No sectional representation; the population balance is switched off.
    None,

    /// Equal-width bins: y_i = yMin + iΔy
    Linear {
        #[serde(rename = "yMin")]
        y_min: f64,
        #[serde(rename = "yMax")]
        y_max: f64,
        #[serde(rename = "N")]
        n: usize,
    },

    /// Equal-ratio bins: y_i = yMin aⁱ with a = (yMax/yMin)^(1/N)
    Logarithmic {
        #[serde(rename = "yMin")]
        y_min: f64,
        #[serde(rename = "yMax")]
        y_max: f64,
        #[serde(rename = "N")]
        n: usize,
    },

    /// Bin widths in geometric progression, last/first width ratio `q`.
    Geometric {
        #[serde(rename = "yMin")]
        y_min: f64,
        #[serde(rename = "yMax")]
        y_max: f64,
        #[serde(rename = "N")]
        n: usize,
        q: f64,
    },

    /// Explicit representative sizes and edges (`y.len() == x.len() + 1`).
    List { x: Vec<f64>, y: Vec<f64> },
}

/// Representative sizes and bin edges produced by a [`SectionalGrid`].
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Representative size of each section (kg), length P
    pub x: Vec<f64>,
    /// Bin edges (kg), length P + 1
    pub y: Vec<f64>,
}

impl GridLayout {
    /// Number of sections.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Check the ordering invariants shared by every strategy.
    pub fn validate(&self) -> SectionalResult<()> {
        if self.x.is_empty() {
            return Err(SectionalError::grid("grid needs at least one section"));
        }
        if self.y.len() != self.x.len() + 1 {
            return Err(SectionalError::size_mismatch(
                "grid edges",
                self.x.len() + 1,
                self.y.len(),
            ));
        }
        if self.y.iter().any(|v| !v.is_finite()) || self.x.iter().any(|v| !v.is_finite()) {
            return Err(SectionalError::grid("grid contains non-finite values"));
        }
        if let Some(i) = self.y.windows(2).position(|e| e[0] >= e[1]) {
            return Err(SectionalError::grid(format!(
                "edges must be strictly increasing (y[{}] = {:e} >= y[{}] = {:e})",
                i,
                self.y[i],
                i + 1,
                self.y[i + 1]
            )));
        }
        for (i, &x) in self.x.iter().enumerate() {
            if x <= self.y[i] || x >= self.y[i + 1] {
                return Err(SectionalError::grid(format!(
                    "representative size x[{}] = {:e} outside ({:e}, {:e})",
                    i,
                    x,
                    self.y[i],
                    self.y[i + 1]
                )));
            }
        }
        Ok(())
    }
}

impl SectionalGrid {
    /// Whether this strategy produces sections at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// Generate sizes and edges.
    ///
    /// # Errors
    /// `N < 1`, `yMin >= yMax`, negative bounds, non-positive bounds for the
    /// logarithmic and geometric cases, non-positive `q`, or a malformed
    /// explicit list.
    pub fn generate(&self) -> SectionalResult<GridLayout> {
        let layout = match self {
            Self::None => {
                return Err(SectionalError::config(
                    "sizeDistributionType is `none`; no sections to generate",
                ))
            }
            Self::Linear { y_min, y_max, n } => {
                check_bounds(*y_min, *y_max, *n)?;
                if *y_min < 0.0 {
                    return Err(SectionalError::grid("linear grid needs yMin >= 0"));
                }
                linear(*y_min, *y_max, *n)
            }
            Self::Logarithmic { y_min, y_max, n } => {
                check_bounds(*y_min, *y_max, *n)?;
                check_positive(*y_min)?;
                logarithmic(*y_min, *y_max, *n)
            }
            Self::Geometric { y_min, y_max, n, q } => {
                check_bounds(*y_min, *y_max, *n)?;
                check_positive(*y_min)?;
                if !q.is_finite() || *q <= 0.0 {
                    return Err(SectionalError::grid(format!(
                        "geometric ratio q must be positive, got {}",
                        q
                    )));
                }
                geometric(*y_min, *y_max, *n, *q)
            }
            Self::List { x, y } => {
                if x.is_empty() {
                    return Err(SectionalError::grid("explicit list needs at least one size"));
                }
                if y.len() != x.len() + 1 {
                    return Err(SectionalError::size_mismatch("y", x.len() + 1, y.len()));
                }
                GridLayout {
                    x: x.clone(),
                    y: y.clone(),
                }
            }
        };

        layout.validate()?;
        log::debug!(
            "generated {} sections spanning [{:e}, {:e}] kg",
            layout.len(),
            layout.y[0],
            layout.y[layout.len()]
        );
        Ok(layout)
    }
}

fn check_bounds(y_min: f64, y_max: f64, n: usize) -> SectionalResult<()> {
    if n < 1 {
        return Err(SectionalError::grid("need at least 1 bin (N >= 1)"));
    }
    if y_min.is_nan() || y_max.is_nan() || y_min >= y_max {
        return Err(SectionalError::grid(format!(
            "yMin ({:e}) must be less than yMax ({:e})",
            y_min, y_max
        )));
    }
    Ok(())
}

fn check_positive(y_min: f64) -> SectionalResult<()> {
    if y_min <= 0.0 {
        return Err(SectionalError::grid(format!(
            "yMin must be positive for ratio-based grids, got {:e}",
            y_min
        )));
    }
    Ok(())
}

fn linear(y_min: f64, y_max: f64, n: usize) -> GridLayout {
    let dy = (y_max - y_min) / n as f64;

    let mut y: Vec<f64> = (0..=n).map(|i| y_min + i as f64 * dy).collect();
    // Pin the last edge so round-off never leaves it short of yMax
    y[n] = y_max;
    let x = (0..n).map(|i| y_min + (i as f64 + 0.5) * dy).collect();

    GridLayout { x, y }
}

fn logarithmic(y_min: f64, y_max: f64, n: usize) -> GridLayout {
    let a = (y_max / y_min).powf(1.0 / n as f64);

    let mut y: Vec<f64> = (0..=n).map(|i| y_min * a.powi(i as i32)).collect();
    y[n] = y_max;
    let x = (0..n).map(|i| y_min * a.powf(i as f64 + 0.5)).collect();

    GridLayout { x, y }
}

fn geometric(y_min: f64, y_max: f64, n: usize, q: f64) -> GridLayout {
    let r = if n > 1 { q.powf(1.0 / (n - 1) as f64) } else { 1.0 };

    // First width from the finite geometric series of widths
    let first_width = if (r - 1.0).abs() < 1e-12 {
        (y_max - y_min) / n as f64
    } else {
        (y_max - y_min) * (r - 1.0) / (r.powi(n as i32) - 1.0)
    };

    let mut y = Vec::with_capacity(n + 1);
    y.push(y_min);
    if n > 1 {
        y.push(y_min + first_width);
    }
    // y_i = y_{i-1}(1 + r) - r y_{i-2}
    for i in 2..n {
        let next = y[i - 1] * (1.0 + r) - r * y[i - 2];
        y.push(next);
    }
    y.push(y_max);

    let x = (0..n).map(|i| (y[i + 1] + r * y[i]) / (r + 1.0)).collect();

    GridLayout { x, y }
}
