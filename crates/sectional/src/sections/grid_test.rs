//! Tests for sectional grid generation.

use approx::assert_relative_eq;

use crate::error::SectionalError;
use crate::sections::{GridLayout, SectionalGrid};

fn assert_grid_invariants(layout: &GridLayout) {
    assert_eq!(layout.y.len(), layout.x.len() + 1);
    for w in layout.y.windows(2) {
        assert!(w[0] < w[1], "edges not increasing: {} >= {}", w[0], w[1]);
    }
    for (i, &x) in layout.x.iter().enumerate() {
        assert!(
            x > layout.y[i] && x < layout.y[i + 1],
            "x[{}] = {} outside ({}, {})",
            i,
            x,
            layout.y[i],
            layout.y[i + 1]
        );
    }
}

// =============================================================================
// Linear
// =============================================================================

#[test]
fn linear_grid_has_equal_widths() {
    let grid = SectionalGrid::Linear {
        y_min: 0.0,
        y_max: 10.0,
        n: 10,
    };

    let layout = grid.generate().unwrap();

    assert_eq!(layout.len(), 10);
    assert_grid_invariants(&layout);
    for (i, &x) in layout.x.iter().enumerate() {
        assert_relative_eq!(x, i as f64 + 0.5, epsilon = 1e-12);
    }
    assert_eq!(layout.y[10], 10.0);
}

#[test]
fn linear_grid_rejects_negative_lower_bound() {
    let grid = SectionalGrid::Linear {
        y_min: -1.0,
        y_max: 10.0,
        n: 10,
    };

    assert!(matches!(grid.generate(), Err(SectionalError::InvalidGrid { .. })));
}

// =============================================================================
// Logarithmic
// =============================================================================

#[test]
fn logarithmic_grid_has_constant_ratio() {
    let grid = SectionalGrid::Logarithmic {
        y_min: 1e-21,
        y_max: 1e-9,
        n: 24,
    };

    let layout = grid.generate().unwrap();

    assert_grid_invariants(&layout);
    let ratio = layout.y[1] / layout.y[0];
    assert_relative_eq!(ratio, 10f64.sqrt(), max_relative = 1e-10);
    for w in layout.y.windows(2) {
        assert_relative_eq!(w[1] / w[0], ratio, max_relative = 1e-9);
    }
    for (i, &x) in layout.x.iter().enumerate() {
        assert_relative_eq!(x, (layout.y[i] * layout.y[i + 1]).sqrt(), max_relative = 1e-10);
    }
}

#[test]
fn logarithmic_grid_rejects_zero_lower_bound() {
    let grid = SectionalGrid::Logarithmic {
        y_min: 0.0,
        y_max: 1.0,
        n: 5,
    };

    assert!(grid.generate().is_err());
}

// =============================================================================
// Geometric
// =============================================================================

#[test]
fn geometric_grid_widths_grow_by_ratio() {
    let grid = SectionalGrid::Geometric {
        y_min: 1.0,
        y_max: 100.0,
        n: 8,
        q: 20.0,
    };

    let layout = grid.generate().unwrap();

    assert_grid_invariants(&layout);
    assert_eq!(layout.y[0], 1.0);
    assert_eq!(layout.y[8], 100.0);

    let widths: Vec<f64> = layout.y.windows(2).map(|w| w[1] - w[0]).collect();
    assert_relative_eq!(widths[7] / widths[0], 20.0, max_relative = 1e-8);
}

#[test]
fn geometric_grid_with_unit_ratio_is_linear() {
    let grid = SectionalGrid::Geometric {
        y_min: 2.0,
        y_max: 12.0,
        n: 5,
        q: 1.0,
    };

    let layout = grid.generate().unwrap();

    assert_grid_invariants(&layout);
    for w in layout.y.windows(2) {
        assert_relative_eq!(w[1] - w[0], 2.0, epsilon = 1e-12);
    }
}

#[test]
fn geometric_grid_rejects_non_positive_ratio() {
    let grid = SectionalGrid::Geometric {
        y_min: 1.0,
        y_max: 2.0,
        n: 4,
        q: 0.0,
    };

    assert!(grid.generate().is_err());
}

// =============================================================================
// List
// =============================================================================

#[test]
fn list_grid_is_taken_verbatim() {
    let grid = SectionalGrid::List {
        x: vec![1.0, 3.0, 7.0],
        y: vec![0.0, 2.0, 5.0, 10.0],
    };

    let layout = grid.generate().unwrap();

    assert_eq!(layout.x, vec![1.0, 3.0, 7.0]);
    assert_eq!(layout.y, vec![0.0, 2.0, 5.0, 10.0]);
}

#[test]
fn list_grid_rejects_bad_lengths_and_order() {
    let short = SectionalGrid::List {
        x: vec![1.0, 3.0],
        y: vec![0.0, 2.0],
    };
    let unordered = SectionalGrid::List {
        x: vec![1.0, 3.0],
        y: vec![0.0, 4.0, 2.0],
    };
    let outside = SectionalGrid::List {
        x: vec![1.0, 5.0],
        y: vec![0.0, 2.0, 4.0],
    };

    assert!(short.generate().is_err());
    assert!(unordered.generate().is_err());
    assert!(outside.generate().is_err());
}

// =============================================================================
// Shared checks
// =============================================================================

#[test]
fn zero_sections_is_an_error() {
    let grid = SectionalGrid::Linear {
        y_min: 0.0,
        y_max: 1.0,
        n: 0,
    };

    assert!(grid.generate().is_err());
}

#[test]
fn inverted_bounds_are_an_error() {
    let grid = SectionalGrid::Logarithmic {
        y_min: 1.0,
        y_max: 1.0,
        n: 3,
    };

    assert!(grid.generate().is_err());
}

#[test]
fn none_is_disabled_and_cannot_generate() {
    assert!(!SectionalGrid::None.is_enabled());
    assert!(SectionalGrid::None.generate().is_err());
}
