//! Tests for condensation rate models.

use approx::assert_relative_eq;

use crate::models::condensation::{fuchs_sutugin, ranz_marshall};
use crate::models::{
    exponential_relaxation, CondensationModel, Convection, DiffusivityMode, MaxwellCondensation,
    TransitionRegime,
};
use crate::testing::{context, ethanol, humid_air, water, water_ethanol_air};

const DIAMETER: f64 = 2e-6;

fn maxwell(options: MaxwellCondensation) -> CondensationModel {
    CondensationModel::Maxwell(options)
}

// =============================================================================
// Exponential relaxation
// =============================================================================

#[test]
fn relaxation_matches_closed_form() {
    let z = exponential_relaxation(2.0, 1.0, 0.5, 0.1, 1.0, 1.0);

    // a = (Y + Z) source = 1.2, b = 3
    let expected = 0.4 + (0.1 - 0.4) * (-3.0_f64).exp();
    assert_relative_eq!(z, expected, epsilon = 1e-15);
}

#[test]
fn relaxation_zero_step_is_identity() {
    assert_eq!(exponential_relaxation(2.0, 1.0, 0.5, 0.1, 1.0, 0.0), 0.1);
    assert_eq!(exponential_relaxation(0.0, 0.0, 0.5, 0.1, 1.0, 1.0), 0.1);
}

#[test]
fn relaxation_approaches_equilibrium() {
    let z = exponential_relaxation(2.0, 1.0, 0.5, 0.1, 1.0, 100.0);
    assert_relative_eq!(z, 0.4, epsilon = 1e-12);
}

#[test]
fn relaxation_stays_within_species_total() {
    for dt in [1e-6, 1e-3, 1.0, 1e3] {
        let z = exponential_relaxation(5.0, 0.0, 0.02, 0.01, 1e3, dt);
        assert!(z >= 0.01 && z <= 0.03 + 1e-15);
    }
}

// =============================================================================
// Activation
// =============================================================================

#[test]
fn inactive_without_droplets() {
    let species = vec![water()];
    let state = humid_air(0.02, 0.0);

    let prescribed = CondensationModel::Prescribed {
        source: 1.0,
        sink: 1.0,
    };
    let result = prescribed.rate(&state, &context(&species), DIAMETER);

    assert!(!result.active);
    assert_eq!(result.source, vec![0.0]);
}

#[test]
fn prescribed_applies_to_every_species() {
    let species = vec![water(), ethanol()];
    let state = water_ethanol_air([0.01, 0.01], [1e-4, 1e-4]);
    let model = CondensationModel::Prescribed {
        source: 2.0,
        sink: 0.5,
    };

    let result = model.rate(&state, &context(&species), DIAMETER);

    assert!(result.active);
    assert_eq!(result.source, vec![2.0, 2.0]);
    assert_eq!(result.sink, vec![0.5, 0.5]);
}

// =============================================================================
// Maxwell growth law
// =============================================================================

#[test]
fn supersaturated_vapor_condenses() {
    let species = vec![water()];
    let state = humid_air(0.03, 1e-4);

    let result = maxwell(MaxwellCondensation::default()).rate(&state, &context(&species), DIAMETER);

    assert!(result.active);
    assert!(result.source[0] > 0.0);
    assert!(result.source[0] * state.vapor[0] > result.sink[0] * state.droplet[0]);
}

#[test]
fn subsaturated_vapor_evaporates() {
    let species = vec![water()];
    let state = humid_air(0.002, 1e-4);

    let result = maxwell(MaxwellCondensation::default()).rate(&state, &context(&species), DIAMETER);

    assert!(result.source[0] * state.vapor[0] < result.sink[0] * state.droplet[0]);
}

#[test]
fn coefficients_are_non_negative() {
    let species = vec![water(), ethanol()];
    let state = water_ethanol_air([0.0, 0.05], [1e-3, 0.0]);

    for convection in [Convection::None, Convection::Forced, Convection::Natural] {
        let model = maxwell(MaxwellCondensation {
            convection,
            ..Default::default()
        });
        let result = model.rate(&state, &context(&species), DIAMETER);
        assert!(result.source.iter().chain(&result.sink).all(|c| *c >= 0.0 && c.is_finite()));
    }
}

#[test]
fn kelvin_effect_raises_sink() {
    let species = vec![water()];
    let state = humid_air(0.015, 1e-4);
    let small = 2e-8;

    let flat = maxwell(MaxwellCondensation {
        kelvin: false,
        ..Default::default()
    })
    .rate(&state, &context(&species), small);
    let curved = maxwell(MaxwellCondensation::default()).rate(&state, &context(&species), small);

    assert!(curved.sink[0] > flat.sink[0]);
    assert_relative_eq!(curved.source[0], flat.source[0], max_relative = 1e-12);
}

#[test]
fn continuum_limit_matches_maxwell_coefficient() {
    let species = vec![water()];
    let state = humid_air(0.015, 1e-4);
    let model = maxwell(MaxwellCondensation {
        transition: TransitionRegime::Continuum,
        ..Default::default()
    });

    let result = model.rate(&state, &context(&species), DIAMETER);

    // 2π ρ_g D (Sh/2) with Sh = 2
    let expected = 2.0 * std::f64::consts::PI * 1.204 * 2.5e-5;
    assert_relative_eq!(result.source[0], expected, max_relative = 1e-12);
}

#[test]
fn forced_convection_enhances_transfer() {
    let species = vec![water()];
    let mut state = humid_air(0.015, 1e-4);
    state.slip_speed = 0.5;

    let still = maxwell(MaxwellCondensation::default()).rate(&state, &context(&species), 50e-6);
    let forced = maxwell(MaxwellCondensation {
        convection: Convection::Forced,
        ..Default::default()
    })
    .rate(&state, &context(&species), 50e-6);

    assert!(forced.source[0] > still.source[0]);
}

#[test]
fn mixture_mean_diffusivity_for_single_species_is_unchanged() {
    let species = vec![water()];
    let state = humid_air(0.015, 1e-4);

    let per_species = maxwell(MaxwellCondensation::default()).rate(&state, &context(&species), DIAMETER);
    let mean = maxwell(MaxwellCondensation {
        diffusivity: DiffusivityMode::MixtureMean,
        ..Default::default()
    })
    .rate(&state, &context(&species), DIAMETER);

    assert_relative_eq!(per_species.source[0], mean.source[0], max_relative = 1e-12);
}

// =============================================================================
// Correlations
// =============================================================================

#[test]
fn fuchs_sutugin_limits() {
    assert_relative_eq!(fuchs_sutugin(0.0, 1.0), 1.0);
    assert!(fuchs_sutugin(1.0, 1.0) < fuchs_sutugin(0.1, 1.0));

    // Free-molecular limit: β → 3α / (4 Kn)
    let kn = 1e6;
    assert_relative_eq!(fuchs_sutugin(kn, 1.0), 0.75 / kn, max_relative = 1e-5);
}

#[test]
fn ranz_marshall_without_flow_is_two() {
    assert_eq!(ranz_marshall(0.0, 0.6), 2.0);
    assert!(ranz_marshall(10.0, 0.6) > 2.0);
}

#[test]
fn validation_rejects_negative_prescribed_coefficients() {
    let model = CondensationModel::Prescribed {
        source: -1.0,
        sink: 0.0,
    };
    assert!(model.validate().is_err());
    assert!(CondensationModel::None.validate().is_ok());
}
