//! Integration tests for the population-balance driver.
//!
//! These run configured systems through whole steps and check the
//! bookkeeping between sections and species mass fractions.

use approx::assert_relative_eq;
use units::{Density, Pressure, Temperature, Time, Viscosity};

use sectional::sections::Section;
use sectional::{
    CellState, DriftFlux, NoDrift, PopulationBalanceSystem, SectionalConfig, SectionalResult,
    SpatialInputs, TransportSolver,
};

const WATER: &str = r#"
[[species]]
name = "water"
molarMass = 0.018015
latentHeat = 2.454e6
"#;

fn config(body: &str) -> SectionalConfig {
    SectionalConfig::from_toml_str(&format!("{}\n{}", body, WATER)).unwrap()
}

/// Humid air at 20 °C, 1 atm.
fn humid_air(vapor: f64, droplet: f64) -> CellState {
    CellState {
        pressure: Pressure::standard_atmosphere(),
        temperature: Temperature::from_kelvin(293.15),
        gas_density: Density::from_kg_per_m3(1.204),
        gas_viscosity: Viscosity::from_pascal_seconds(1.81e-5),
        mixture_density: Density::from_kg_per_m3(1.204),
        slip_speed: 0.0,
        vapor: vec![vapor],
        droplet: vec![droplet],
        saturation_pressure: vec![2339.0],
        diffusivity: vec![2.5e-5],
        liquid_density: vec![998.2],
        surface_tension: vec![0.0728],
    }
}

fn scatter(system: &mut PopulationBalanceSystem, cell: usize, values: &[f64]) {
    system.distribution_mut().scatter(cell, values);
}

fn values(system: &PopulationBalanceSystem, cell: usize) -> Vec<f64> {
    let mut out = vec![0.0; system.n_sections()];
    system.distribution().gather(cell, &mut out);
    out
}

// =============================================================================
// Condensation in a single cell
// =============================================================================

#[test]
fn supersaturated_cell_grows_droplets() {
    let cfg = config(
        r#"
        sizeDistributionType = "linear"
        yMin = 0.0
        yMax = 10.0
        N = 10

        [submodels.condensation]
        type = "prescribed"
        source = 1.0
        sink = 0.0
        "#,
    );
    let mut system = PopulationBalanceSystem::from_config(&cfg, 1).unwrap();

    // 1e-3 droplets per kg in the five lightest sections
    let mut initial = vec![0.0; 10];
    initial[..5].iter_mut().for_each(|m| *m = 1e-3);
    scatter(&mut system, 0, &initial);
    let z0 = system.droplet_mass_fraction(0);
    assert_relative_eq!(z0, 0.0125, max_relative = 1e-12);

    let states = vec![humid_air(0.01, z0)];
    let dt = Time::from_seconds(1.0);
    let report = system.internal_step(&states, dt).unwrap();

    let z1 = system.droplet_mass_fraction(0);
    assert!(z1 > z0, "droplet mass should grow: {} -> {}", z0, z1);
    assert!(values(&system, 0).iter().all(|&m| m >= 0.0));
    assert_eq!(report.condensing_cells, 1);
    assert!(report.domain_defect.is_zero());

    // Section mass, species mass fraction and transfer rate all agree
    let outputs = system.outputs();
    let transfer = outputs.mass_transfer[0][0];
    assert_relative_eq!(transfer * dt.to_seconds(), z1 - z0, max_relative = 1e-9);
    assert_relative_eq!(outputs.droplet[0][0], z1, max_relative = 1e-9);
    assert_relative_eq!(outputs.vapor[0][0] + outputs.droplet[0][0], 0.01 + z0, max_relative = 1e-12);
    assert_relative_eq!(outputs.heat_source[0], transfer * 2.454e6, max_relative = 1e-12);

    // Growth conserves number
    assert_relative_eq!(system.total_number(0), 5e-3, max_relative = 1e-12);
}

#[test]
fn rescale_after_step_is_idempotent() {
    let cfg = config(
        r#"
        sizeDistributionType = "linear"
        yMin = 0.0
        yMax = 10.0
        N = 10

        [submodels.condensation]
        type = "prescribed"
        source = 1.0
        sink = 0.0
        "#,
    );
    let mut system = PopulationBalanceSystem::from_config(&cfg, 1).unwrap();
    let mut initial = vec![0.0; 10];
    initial[..3].iter_mut().for_each(|m| *m = 2e-3);
    scatter(&mut system, 0, &initial);
    let z0 = system.droplet_mass_fraction(0);

    let states = vec![humid_air(0.01, z0)];
    let report = system
        .internal_step_with_rescale(&states, Time::from_seconds(1.0))
        .unwrap();

    let rescale = report.rescale.unwrap();
    assert!(rescale.max_relative_difference < 1e-9);
    assert_eq!(rescale.cells_over_tolerance, 0);

    let target = [system.outputs().droplet_mass_fraction(0)];
    let before = values(&system, 0);
    let second = system.rescale(&target).unwrap();
    assert_eq!(values(&system, 0), before);
    assert_eq!(second.cells_rescaled, 0);
}

// =============================================================================
// Coalescence
// =============================================================================

#[test]
fn coalescence_conserves_mass_and_reduces_number() {
    let cfg = config(
        r#"
        sizeDistributionType = "linear"
        yMin = 0.0
        yMax = 10.0
        N = 10

        [submodels.coalescence]
        type = "constant"
        rate = 10.0
        "#,
    );
    let mut system = PopulationBalanceSystem::from_config(&cfg, 2).unwrap();

    let mut initial = vec![0.0; 10];
    initial[0] = 4e-3;
    initial[1] = 2e-3;
    scatter(&mut system, 0, &initial);
    scatter(&mut system, 1, &initial);

    let mass_before = system.droplet_mass_fraction(0);
    let number_before = system.total_number(0);
    let states = vec![humid_air(0.01, mass_before); 2];

    let report = system.internal_step(&states, Time::from_seconds(1.0)).unwrap();

    assert_eq!(report.coalescing_cells, 2);
    assert!(report.domain_defect.is_zero());

    for cell in 0..2 {
        assert_relative_eq!(system.droplet_mass_fraction(cell), mass_before, max_relative = 1e-12);
        assert!(system.total_number(cell) < number_before);

        // One collision of x = 0.5 and 1.5 droplets reaches at most 3.0,
        // so nothing lands above section 3 within a single step
        let after = values(&system, cell);
        assert!(after.iter().all(|&m| m >= 0.0));
        assert!(after[2] > 0.0);
        assert!(after[4..].iter().all(|&m| m == 0.0));
    }
    assert_eq!(values(&system, 0), values(&system, 1));
    assert_eq!(system.outputs().mass_transfer[0][0], 0.0);
}

#[test]
fn realistic_condensation_books_no_domain_defect() {
    let cfg = config(
        r#"
        sizeDistributionType = "logarithmic"
        yMin = 1e-26
        yMax = 1e-10
        N = 40

        [submodels.condensation]
        type = "maxwell"

        [initial]
        type = "logNormal"
        medianDiameter = 1e-6
        geometricStdDev = 1.4
        "#,
    );
    let n_cells = 8;
    let mut system = PopulationBalanceSystem::from_config(&cfg, n_cells).unwrap();
    let z: Vec<f64> = (0..n_cells).map(|c| 1e-4 * (1.0 + c as f64)).collect();
    system.initialize(&z).unwrap();

    // Growth over many steps keeps every size well inside the grid, so
    // round-off in the redistribution must never show up as a defect
    let mut states: Vec<CellState> = z.iter().map(|&zc| humid_air(0.015, zc)).collect();
    for _ in 0..20 {
        let report = system
            .internal_step_with_rescale(&states, Time::from_milliseconds(1.0))
            .unwrap();
        assert_eq!(report.condensing_cells, n_cells);
        assert!(report.domain_defect.is_zero());

        for (cell, state) in states.iter_mut().enumerate() {
            state.vapor[0] = system.outputs().vapor[0][cell];
            state.droplet[0] = system.outputs().droplet[0][cell];
        }
    }
    assert!(system.domain_defect().is_zero());
}

// =============================================================================
// Nucleation
// =============================================================================

#[test]
fn fixed_nucleation_seeds_empty_cells() {
    let cfg = config(
        r#"
        sizeDistributionType = "logarithmic"
        yMin = 1e-26
        yMax = 1e-10
        N = 40

        [submodels.nucleation]
        type = "fixed"
        rate = 1e12
        size = 1e-24
        "#,
    );
    let mut system = PopulationBalanceSystem::from_config(&cfg, 1).unwrap();
    let states = vec![humid_air(0.01, 0.0)];
    let dt = Time::from_milliseconds(1.0);

    let report = system.internal_step_with_rescale(&states, dt).unwrap();

    assert_eq!(report.nucleating_cells, 1);
    let expected_number = 1e12 * 1e-3 / 1.204;
    assert_relative_eq!(system.total_number(0), expected_number, max_relative = 1e-10);
    assert_relative_eq!(
        system.droplet_mass_fraction(0),
        expected_number * 1e-24,
        max_relative = 1e-10
    );
    assert_relative_eq!(
        system.outputs().nucleation_rate[0],
        1e12,
        max_relative = 1e-10
    );
}

// =============================================================================
// Spatial transport
// =============================================================================

/// Closed row of unit-mass cells; one interior face between neighbours,
/// explicit first-order upwind update.
struct UpwindRow {
    n_cells: usize,
}

impl TransportSolver for UpwindRow {
    fn n_faces(&self) -> usize {
        self.n_cells - 1
    }

    fn interpolate_to_faces(&self, field: &[f64]) -> Vec<f64> {
        field.windows(2).map(|w| 0.5 * (w[0] + w[1])).collect()
    }

    fn solve_section(
        &mut self,
        _section: usize,
        field: &mut [f64],
        face_flux: &[f64],
        _diffusivity: &[f64],
        dt: f64,
    ) -> SectionalResult<()> {
        let old = field.to_vec();
        for (f, &phi) in face_flux.iter().enumerate() {
            let upwind = if phi >= 0.0 { old[f] } else { old[f + 1] };
            let transfer = phi * upwind * dt;
            field[f] -= transfer;
            field[f + 1] += transfer;
        }
        Ok(())
    }
}

/// Heavier sections drift faster along the row.
struct Settling;

impl DriftFlux for Settling {
    fn relative_flux(&self, section: &Section, n_faces: usize) -> Vec<f64> {
        vec![0.02 * section.size(); n_faces]
    }
}

#[test]
fn spatial_step_conserves_mass_and_matches_droplet_flux() {
    let cfg = config(
        r#"
        sizeDistributionType = "linear"
        yMin = 0.0
        yMax = 10.0
        N = 10
        numericalDiffusion = 1e-5
        "#,
    );
    let n_cells = 4;
    let mut system = PopulationBalanceSystem::from_config(&cfg, n_cells).unwrap();
    for cell in 0..n_cells {
        let row: Vec<f64> = (0..10).map(|i| 1e-3 * (1 + cell + i) as f64).collect();
        scatter(&mut system, cell, &row);
    }
    let mut mesh = UpwindRow { n_cells };

    let total_before: f64 = (0..n_cells).map(|c| system.droplet_mass_fraction(c)).sum();
    let bulk_flux = vec![0.1; n_cells - 1];
    let droplet_mass_flux = vec![0.05; n_cells - 1];
    let diffusivity = vec![2e-5; n_cells];
    let inputs = SpatialInputs {
        bulk_flux: &bulk_flux,
        droplet_mass_flux: &droplet_mass_flux,
        effective_diffusivity: &diffusivity,
    };

    // Face mass per section, before the solve moves anything
    let face_values: Vec<Vec<f64>> = system
        .distribution()
        .sections()
        .iter()
        .map(|s| mesh.interpolate_to_faces(s.values()))
        .collect();

    system
        .spatial_step(&mut mesh, &Settling, &inputs, Time::from_seconds(0.1))
        .unwrap();

    for f in 0..n_cells - 1 {
        let carried: f64 = system
            .distribution()
            .sections()
            .iter()
            .zip(&face_values)
            .map(|(s, faces)| s.size() * faces[f] * s.flux()[f])
            .sum();
        assert_relative_eq!(carried, 0.05, max_relative = 1e-10);
    }
    for section in system.distribution().sections() {
        assert!(section.values().iter().all(|&m| m >= 0.0));
        for &d in section.diffusivity() {
            assert_relative_eq!(d, 2e-5 + 1e-5, max_relative = 1e-12);
        }
    }

    let total_after: f64 = (0..n_cells).map(|c| system.droplet_mass_fraction(c)).sum();
    assert_relative_eq!(total_after, total_before, max_relative = 1e-12);
}

#[test]
fn full_step_without_drift() {
    let cfg = config(
        r#"
        sizeDistributionType = "logarithmic"
        yMin = 1e-26
        yMax = 1e-10
        N = 40

        [submodels.condensation]
        type = "maxwell"

        [initial]
        type = "monodisperse"
        diameter = 2e-6
        "#,
    );
    let n_cells = 3;
    let mut system = PopulationBalanceSystem::from_config(&cfg, n_cells).unwrap();
    let z0 = 1e-4;
    let defect = system.initialize(&vec![z0; n_cells]).unwrap();
    assert!(defect.abs() < 1e-15);

    let mut mesh = UpwindRow { n_cells };
    let bulk_flux = vec![0.0; n_cells - 1];
    let droplet_mass_flux = vec![0.0; n_cells - 1];
    let diffusivity = vec![0.0; n_cells];
    let inputs = SpatialInputs {
        bulk_flux: &bulk_flux,
        droplet_mass_flux: &droplet_mass_flux,
        effective_diffusivity: &diffusivity,
    };

    // 1.5 % vapor is well above saturation at 20 °C
    let states = vec![humid_air(0.015, z0); n_cells];
    let report = system
        .step(&states, &mut mesh, &NoDrift, &inputs, Time::from_milliseconds(1.0))
        .unwrap();

    assert_eq!(report.condensing_cells, n_cells);
    for cell in 0..n_cells {
        assert!(system.droplet_mass_fraction(cell) > z0);
        assert!(system.outputs().mass_transfer[0][cell] > 0.0);
        assert!(system.mean_diameter(cell, 1.0, 0.0).to_m() > 1.9e-6);
    }
}
