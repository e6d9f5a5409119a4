use log::debug;
use ndarray::Array1;

use crate::dashboard_interface::observed::ObservedSeries;
use crate::math::stats::SeriesStats;
use crate::prelude::{SimResult, SimulationParameters};

/// Background disengagement of exposed individuals, per step, independent
/// of any control channel.
const EXPOSED_LEAK_RATE: f64 = 0.05;

/// Full trajectory of one simulation run: four equal-length compartment
/// series indexed by discrete step. Recomputed from scratch on every run,
/// never updated incrementally.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub susceptible: Array1<f64>,
    pub exposed: Array1<f64>,
    pub infected: Array1<f64>,
    pub recovered: Array1<f64>,
    /// Step width the arrays were produced with, in days.
    pub step: f64,
}

impl SimulationState {
    pub fn steps(&self) -> usize {
        self.infected.len()
    }

    /// First occurrence of the infected maximum, as `(sim day, value)`.
    pub fn infected_peak(&self) -> (f64, f64) {
        match SeriesStats::peak(self.infected.as_slice().unwrap_or(&[])) {
            Some((index, value)) => (index as f64 * self.step, value),
            None => (0.0, 0.0),
        }
    }
}

/// Initial compartment values shared by the integrator, the reproduction
/// estimator, and the threshold solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SeedCompartments {
    pub susceptible: f64,
    pub exposed: f64,
    pub infected: f64,
    pub recovered: f64,
}

/// Seeds the run from the day-0 observation. The infected start is floored
/// at one so a missing or zero observation never produces a degenerate
/// zero-spreader run.
pub(crate) fn seed_compartments(
    params: &SimulationParameters,
    observed: &ObservedSeries,
) -> SeedCompartments {
    let infected = observed.value_on(0).unwrap_or(1.0).max(1.0);
    let exposed = 2.0 * infected;
    let recovered = 0.0;
    let susceptible = (params.population - exposed - infected - recovered).max(0.0);
    SeedCompartments {
        susceptible,
        exposed,
        infected,
        recovered,
    }
}

/// Advances the delayed compartmental model over the full horizon with a
/// fixed-step explicit Euler scheme.
///
/// The delay is an index lag: before `lag_steps` steps of history exist the
/// lagged terms read the initial condition, which treats pre-history as
/// constant. Every compartment is clamped at zero after each step; the raw
/// update equations can overshoot negative under large steps or aggressive
/// controls and a negative count must never reach the dashboard.
pub fn integrate(
    params: &SimulationParameters,
    observed: &ObservedSeries,
) -> SimResult<SimulationState> {
    params.validate()?;

    let last_observed = observed.last_day().map_or(0.0, f64::from);
    let span = params.horizon.max(last_observed);
    let steps = (span / params.step).floor() as usize + 1;
    let lag_steps = (params.delay / params.step).floor() as usize;

    let mut susceptible = Array1::zeros(steps);
    let mut exposed = Array1::zeros(steps);
    let mut infected = Array1::zeros(steps);
    let mut recovered = Array1::zeros(steps);

    let seed = seed_compartments(params, observed);
    susceptible[0] = seed.susceptible;
    exposed[0] = seed.exposed;
    infected[0] = seed.infected;
    recovered[0] = seed.recovered;

    let controls = &params.controls;
    for i in 0..steps.saturating_sub(1) {
        let t = i as f64 * params.step;

        let (susceptible_lag, infected_lag) = if i >= lag_steps {
            (susceptible[i - lag_steps], infected[i - lag_steps])
        } else {
            (susceptible[0], infected[0])
        };

        let active = t >= params.intervention_start;
        let prevention = if active { controls.prevention } else { 0.0 };
        let correction = if active { controls.correction } else { 0.0 };
        let suppression = if active { controls.suppression } else { 0.0 };

        let infection = params.beta * susceptible_lag * infected_lag / params.population;
        let incubation = params.alpha * exposed[i];
        // Nonlinear self-limiting attrition: scales with the infected and
        // the already-disengaged mass, not a plain linear recovery.
        let attrition =
            params.gamma * infected[i] * (infected[i] + recovered[i]) / params.population;
        let control_s = prevention * susceptible[i];
        let control_e = controls.correction_efficiency * correction * exposed[i];
        let control_i = suppression * infected[i];
        let leak = EXPOSED_LEAK_RATE * exposed[i];

        let d_susceptible = -infection - control_s;
        let d_exposed = infection - incubation - control_e - leak;
        let d_infected = incubation - attrition - control_i;
        let d_recovered = attrition + control_i + control_s + control_e;

        susceptible[i + 1] = (susceptible[i] + d_susceptible * params.step).max(0.0);
        exposed[i + 1] = (exposed[i] + d_exposed * params.step).max(0.0);
        infected[i + 1] = (infected[i] + d_infected * params.step).max(0.0);
        recovered[i + 1] = (recovered[i] + d_recovered * params.step).max(0.0);
    }

    let state = SimulationState {
        susceptible,
        exposed,
        infected,
        recovered,
        step: params.step,
    };
    let (peak_day, peak_value) = state.infected_peak();
    debug!(
        "integrated {} steps, infected peak {:.0} on day {:.2}",
        steps, peak_value, peak_day
    );
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard_interface::observed::ObservedPoint;
    use crate::prelude::InterventionControls;

    fn observed(points: &[(u32, f64)]) -> ObservedSeries {
        ObservedSeries::new(
            points
                .iter()
                .map(|&(day, value)| ObservedPoint { day, value })
                .collect(),
        )
        .unwrap()
    }

    fn uncontrolled(params: &mut SimulationParameters) {
        params.controls = InterventionControls {
            prevention: 0.0,
            correction: 0.0,
            suppression: 0.0,
            correction_efficiency: 0.5,
        };
    }

    #[test]
    fn seeding_follows_day_zero_observation() {
        let params = SimulationParameters::default();
        let seed = seed_compartments(&params, &observed(&[(0, 5_000.0)]));
        assert_eq!(seed.infected, 5_000.0);
        assert_eq!(seed.exposed, 10_000.0);
        assert_eq!(seed.recovered, 0.0);
        assert_eq!(seed.susceptible, params.population - 15_000.0);
    }

    #[test]
    fn seeding_without_observations_floors_at_one_spreader() {
        let params = SimulationParameters::default();
        let seed = seed_compartments(&params, &ObservedSeries::default());
        assert_eq!(seed.infected, 1.0);
        assert_eq!(seed.exposed, 2.0);
    }

    #[test]
    fn zero_day_zero_observation_floors_at_one_spreader() {
        let params = SimulationParameters::default();
        let seed = seed_compartments(&params, &observed(&[(0, 0.0)]));
        assert_eq!(seed.infected, 1.0);
    }

    #[test]
    fn first_euler_step_matches_hand_computation() {
        let mut params = SimulationParameters {
            population: 1_000_000.0,
            delay: 0.0,
            step: 0.5,
            horizon: 1.0,
            beta: 0.4,
            alpha: 0.2,
            gamma: 0.1,
            intervention_start: 0.0,
            ..Default::default()
        };
        uncontrolled(&mut params);
        let state = integrate(&params, &observed(&[(0, 1_000.0)])).unwrap();

        // infection = 0.4 * 997000 * 1000 / 1e6 = 398.8
        // incubation = 0.2 * 2000 = 400, attrition = 0.1 * 1000 * 1000 / 1e6 = 0.1
        // leak = 0.05 * 2000 = 100
        assert!((state.susceptible[1] - 996_800.6).abs() < 1e-9);
        assert!((state.exposed[1] - 1_949.4).abs() < 1e-9);
        assert!((state.infected[1] - 1_199.95).abs() < 1e-9);
        assert!((state.recovered[1] - 0.05).abs() < 1e-9);
    }

    #[test]
    fn compartments_stay_non_negative_under_aggressive_controls() {
        let params = SimulationParameters {
            population: 100_000.0,
            delay: 0.5,
            step: 0.5,
            horizon: 20.0,
            beta: 8.0,
            alpha: 3.0,
            gamma: 80.0,
            intervention_start: 1.0,
            controls: InterventionControls {
                prevention: 4.0,
                correction: 4.0,
                suppression: 6.0,
                correction_efficiency: 1.0,
            },
        };
        let state = integrate(&params, &observed(&[(0, 20_000.0)])).unwrap();
        for i in 0..state.steps() {
            assert!(state.susceptible[i] >= 0.0);
            assert!(state.exposed[i] >= 0.0);
            assert!(state.infected[i] >= 0.0);
            assert!(state.recovered[i] >= 0.0);
        }
    }

    #[test]
    fn mass_is_conserved_up_to_the_exposed_leak() {
        let mut params = SimulationParameters {
            population: 1_000_000.0,
            delay: 0.0,
            step: 0.1,
            horizon: 5.0,
            beta: 0.5,
            alpha: 0.3,
            gamma: 0.2,
            intervention_start: 0.0,
            ..Default::default()
        };
        uncontrolled(&mut params);
        let state = integrate(&params, &observed(&[(0, 5_000.0)])).unwrap();
        for i in 0..state.steps() - 1 {
            let total_now =
                state.susceptible[i] + state.exposed[i] + state.infected[i] + state.recovered[i];
            let total_next = state.susceptible[i + 1]
                + state.exposed[i + 1]
                + state.infected[i + 1]
                + state.recovered[i + 1];
            let leak = EXPOSED_LEAK_RATE * state.exposed[i] * params.step;
            assert!((total_next - (total_now - leak)).abs() < 1e-6);
        }
    }

    #[test]
    fn sub_step_delay_behaves_as_no_delay() {
        let base = SimulationParameters {
            delay: 0.0,
            ..Default::default()
        };
        let shifted = SimulationParameters {
            delay: 0.04,
            ..base.clone()
        };
        let data = observed(&[(0, 5_000.0), (1, 30_000.0)]);
        assert_eq!(
            integrate(&base, &data).unwrap(),
            integrate(&shifted, &data).unwrap()
        );
    }

    #[test]
    fn delay_longer_than_horizon_keeps_lag_at_initial_condition() {
        let params = SimulationParameters {
            delay: 500.0,
            ..Default::default()
        };
        let state = integrate(&params, &observed(&[(0, 5_000.0)])).unwrap();
        assert!(state.infected.iter().all(|value| value.is_finite()));
    }

    #[test]
    fn reruns_are_bit_identical() {
        let params = SimulationParameters::default();
        let data = observed(&[(0, 5_000.0), (1, 30_000.0), (2, 150_000.0)]);
        let first = integrate(&params, &data).unwrap();
        let second = integrate(&params, &data).unwrap();
        assert_eq!(first, second);

        let chart_first = crate::dashboard_interface::ChartSeries::build(&first, &params, &data);
        let chart_second = crate::dashboard_interface::ChartSeries::build(&second, &params, &data);
        assert_eq!(chart_first, chart_second);
    }

    #[test]
    fn invalid_population_is_rejected_before_integration() {
        let params = SimulationParameters {
            population: -5.0,
            ..Default::default()
        };
        assert!(integrate(&params, &ObservedSeries::default()).is_err());
    }

    #[test]
    fn reference_outbreak_scenario_terminates_cleanly() {
        let params = SimulationParameters {
            population: 2_000_000.0,
            delay: 1.0,
            step: 0.05,
            horizon: 30.0,
            beta: 2.0,
            alpha: 1.0,
            gamma: 0.5,
            intervention_start: 10.0,
            controls: InterventionControls {
                prevention: 0.1,
                correction: 0.0,
                suppression: 0.2,
                correction_efficiency: 0.7,
            },
        };
        let data = observed(&[(0, 5_000.0), (1, 30_000.0), (2, 150_000.0)]);
        let state = integrate(&params, &data).unwrap();
        assert_eq!(state.steps(), 601);
        assert_eq!(state.infected[0].round(), 5_000.0);
        for i in 0..state.steps() {
            assert!(state.susceptible[i] >= 0.0);
            assert!(state.exposed[i] >= 0.0);
            assert!(state.infected[i] >= 0.0);
            assert!(state.recovered[i] >= 0.0);
        }

        let chart = crate::dashboard_interface::ChartSeries::build(&state, &params, &data);
        assert_eq!(chart.len(), 31);
        assert_eq!(chart.points[0].infected, 5_000.0);
    }
}
