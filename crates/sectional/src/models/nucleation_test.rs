//! Tests for nucleation rate models.

use approx::assert_relative_eq;

use crate::constants::{K_B, PI};
use crate::models::{ClassicalNucleation, NucleationModel};
use crate::testing::{context, ethanol, humid_air, water, water_ethanol_air, AIR_MOLAR_MASS};

fn classical() -> NucleationModel {
    NucleationModel::Classical(ClassicalNucleation::default())
}

// =============================================================================
// Activation
// =============================================================================

#[test]
fn none_is_never_active() {
    let species = vec![water()];
    let state = humid_air(0.075, 0.0);

    let result = NucleationModel::None.rate(&state, &context(&species));

    assert!(!result.active);
    assert_eq!(result.rate, 0.0);
    assert_eq!(result.composition.len(), 1);
}

#[test]
fn classical_inactive_when_subsaturated() {
    let species = vec![water()];
    let state = humid_air(0.005, 0.0);

    let result = classical().rate(&state, &context(&species));

    assert!(!result.active);
    assert_eq!(result.rate, 0.0);
}

#[test]
fn classical_inactive_within_saturation_tolerance() {
    let species = vec![water()];
    // S just above 1 but below 1 + tolerance
    let mut state = humid_air(0.0146, 0.0);
    let s = state.saturation_ratios(&species, AIR_MOLAR_MASS)[0];
    state.saturation_pressure[0] *= s / 1.0005;

    let result = classical().rate(&state, &context(&species));

    assert!(!result.active);
}

// =============================================================================
// Single species
// =============================================================================

#[test]
fn single_species_cluster_follows_kelvin_equation() {
    let species = vec![water()];
    let state = humid_air(0.075, 0.0);
    let s = state.saturation_ratios(&species, AIR_MOLAR_MASS)[0];
    assert!(s > 4.0);

    let result = classical().rate(&state, &context(&species));

    assert!(result.active);
    assert!(result.converged);
    assert!(result.rate > 0.0 && result.rate.is_finite());

    let kt = K_B * 293.15;
    let v = species[0].molecular_mass() / 998.2;
    let radius = 2.0 * 0.0728 * v / (kt * s.ln());
    assert_relative_eq!(result.diameter, 2.0 * radius, max_relative = 1e-9);

    let n_star = 4.0 / 3.0 * PI * radius.powi(3) / v;
    assert_relative_eq!(
        result.size,
        n_star * species[0].molecular_mass(),
        max_relative = 1e-9
    );
    assert_relative_eq!(result.composition[0], 1.0, epsilon = 1e-12);
}

#[test]
fn rate_increases_with_supersaturation() {
    let species = vec![water()];

    let low = classical().rate(&humid_air(0.06, 0.0), &context(&species));
    let high = classical().rate(&humid_air(0.08, 0.0), &context(&species));

    assert!(high.rate > low.rate);
    assert!(high.diameter < low.diameter);
}

// =============================================================================
// Binary mixtures
// =============================================================================

#[test]
fn binary_composition_sums_to_one() {
    let species = vec![water(), ethanol()];
    let state = water_ethanol_air([0.05, 0.15], [0.0, 0.0]);

    let result = classical().rate(&state, &context(&species));

    assert!(result.converged);
    assert_relative_eq!(result.composition.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
    assert!(result.composition.iter().all(|c| *c > 0.0));
}

#[test]
fn iteration_cap_keeps_last_iterate() {
    let species = vec![water(), ethanol()];
    let state = water_ethanol_air([0.05, 0.15], [0.0, 0.0]);
    let model = NucleationModel::Classical(ClassicalNucleation {
        max_iterations: 1,
        ..Default::default()
    });

    let result = model.rate(&state, &context(&species));

    assert!(!result.converged);
    assert_eq!(result.iterations, 1);
    assert!(result.rate.is_finite());
    assert!(result.size > 0.0);
}

// =============================================================================
// Fixed
// =============================================================================

#[test]
fn fixed_composition_defaults_to_vapor_split() {
    let species = vec![water(), ethanol()];
    let state = water_ethanol_air([0.01, 0.03], [0.0, 0.0]);
    let model = NucleationModel::Fixed {
        rate: 1e12,
        size: 1e-21,
        composition: Vec::new(),
    };

    let result = model.rate(&state, &context(&species));

    assert!(result.active);
    assert_eq!(result.rate, 1e12);
    assert_relative_eq!(result.composition[0], 0.25, epsilon = 1e-12);
    assert_relative_eq!(result.composition[1], 0.75, epsilon = 1e-12);
}

#[test]
fn fixed_validation_checks_composition_length() {
    let model = NucleationModel::Fixed {
        rate: 1.0,
        size: 1e-21,
        composition: vec![1.0],
    };

    assert!(model.validate(1).is_ok());
    assert!(model.validate(2).is_err());
}

#[test]
fn classical_validation_rejects_bad_relaxation() {
    let model = NucleationModel::Classical(ClassicalNucleation {
        relaxation: 0.0,
        ..Default::default()
    });

    assert!(model.validate(1).is_err());
}
