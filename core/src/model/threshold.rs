use log::debug;

use crate::dashboard_interface::observed::ObservedSeries;
use crate::math::quadratic::{QuadraticHelper, QuadraticSolution};
use crate::model::integrator::seed_compartments;
use crate::prelude::{SimResult, SimulationParameters};

/// Fallback suppression base when the configured value is effectively zero,
/// so the solver never scales zero.
const SUPPRESSION_FLOOR: f64 = 0.05;
/// Fallback correction base under the same condition.
const CORRECTION_FLOOR: f64 = 0.5;
const COEFFICIENT_EPSILON: f64 = 1e-12;

fn round_display(value: f64) -> f64 {
    (value * 1_000.0).round() / 1_000.0
}

/// Finds the scale factor `k > 0` that brings the controlled-reproduction
/// indicator to exactly one when both the suppression and correction
/// intensities are multiplied by it, then returns the parameters with those
/// two channels rescaled. The correction efficiency is a structural
/// property of the channel and is never touched.
///
/// Substituting `v*k` and `u_g*k` into the indicator yields the quadratic
/// `(v*rho*u_g)*k^2 + (v*alpha)*k - beta*s0*alpha = 0`. The larger real
/// root wins when it is finite and positive; otherwise the parameters are
/// returned unchanged rather than regressed into an invalid state.
pub fn solve_for_rc_one(
    params: &SimulationParameters,
    observed: &ObservedSeries,
) -> SimResult<SimulationParameters> {
    params.validate()?;

    let seed = seed_compartments(params, observed);
    let susceptible_fraction = seed.susceptible / params.population;

    let controls = &params.controls;
    let suppression_base = if controls.suppression.abs() < COEFFICIENT_EPSILON {
        SUPPRESSION_FLOOR
    } else {
        controls.suppression
    };
    let correction_base = if controls.correction.abs() < COEFFICIENT_EPSILON {
        CORRECTION_FLOOR
    } else {
        controls.correction
    };

    let a = suppression_base * controls.correction_efficiency * correction_base;
    let b = suppression_base * params.alpha;
    let c = -(params.beta * susceptible_fraction * params.alpha);

    let candidate = match QuadraticHelper::roots(a, b, c, COEFFICIENT_EPSILON) {
        QuadraticSolution::Linear(root) => Some(root),
        QuadraticSolution::Pair { larger, .. } => Some(larger),
        QuadraticSolution::None => None,
    };
    let Some(scale) = candidate.filter(|k| k.is_finite() && *k > 0.0) else {
        debug!("no positive scale factor for the current configuration, controls unchanged");
        return Ok(params.clone());
    };

    let mut solved = params.clone();
    solved.controls.suppression = round_display(suppression_base * scale);
    solved.controls.correction = round_display(correction_base * scale);
    debug!(
        "rescaled controls by {:.4}: suppression {}, correction {}",
        scale, solved.controls.suppression, solved.controls.correction
    );
    Ok(solved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard_interface::observed::ObservedPoint;
    use crate::model::reproduction::estimate_rc;
    use crate::prelude::InterventionControls;

    fn observed_day_zero(value: f64) -> ObservedSeries {
        ObservedSeries::new(vec![ObservedPoint { day: 0, value }]).unwrap()
    }

    #[test]
    fn solved_controls_bring_the_indicator_to_one() {
        let params = SimulationParameters {
            population: 1_000_000.0,
            beta: 2.0,
            alpha: 1.0,
            controls: InterventionControls {
                prevention: 0.0,
                correction: 1.0,
                suppression: 0.3,
                correction_efficiency: 0.5,
            },
            ..Default::default()
        };
        let data = observed_day_zero(1_000.0);
        let solved = solve_for_rc_one(&params, &data).unwrap();
        let rc = estimate_rc(&solved, &data).unwrap();
        // Tolerance covers the 3-decimal display rounding of the controls.
        assert!((rc - 1.0).abs() < 5e-3, "rc = {}", rc);
    }

    #[test]
    fn zero_bases_are_floored_before_scaling() {
        let params = SimulationParameters {
            population: 1_000_000.0,
            beta: 2.0,
            alpha: 1.0,
            controls: InterventionControls {
                prevention: 0.0,
                correction: 0.0,
                suppression: 0.0,
                correction_efficiency: 0.5,
            },
            ..Default::default()
        };
        let data = observed_day_zero(1_000.0);
        let solved = solve_for_rc_one(&params, &data).unwrap();
        assert!(solved.controls.suppression > 0.0);
        assert!(solved.controls.correction > 0.0);
        let rc = estimate_rc(&solved, &data).unwrap();
        assert!((rc - 1.0).abs() < 5e-3, "rc = {}", rc);
    }

    #[test]
    fn unsolvable_configuration_leaves_parameters_unchanged() {
        // beta = 0 makes the constant term vanish; the only non-negative
        // root is zero, which is not a usable scale factor.
        let params = SimulationParameters {
            beta: 0.0,
            ..Default::default()
        };
        let data = observed_day_zero(1_000.0);
        let solved = solve_for_rc_one(&params, &data).unwrap();
        assert_eq!(solved, params);
    }

    #[test]
    fn linear_fallback_applies_when_correction_pressure_vanishes() {
        // correction_efficiency = 0 collapses the quadratic to B*k + C = 0.
        let params = SimulationParameters {
            population: 1_000_000.0,
            beta: 2.0,
            alpha: 1.0,
            controls: InterventionControls {
                prevention: 0.0,
                correction: 1.0,
                suppression: 0.4,
                correction_efficiency: 0.0,
            },
            ..Default::default()
        };
        let data = observed_day_zero(1_000.0);
        let solved = solve_for_rc_one(&params, &data).unwrap();
        let rc = estimate_rc(&solved, &data).unwrap();
        assert!((rc - 1.0).abs() < 5e-3, "rc = {}", rc);
    }

    #[test]
    fn efficiency_is_never_altered() {
        let params = SimulationParameters::default();
        let data = observed_day_zero(5_000.0);
        let solved = solve_for_rc_one(&params, &data).unwrap();
        assert_eq!(
            solved.controls.correction_efficiency,
            params.controls.correction_efficiency
        );
        assert_eq!(solved.population, params.population);
        assert_eq!(solved.beta, params.beta);
    }
}
