use serde::{Deserialize, Serialize};

use crate::dashboard_interface::observed::ObservedSeries;
use crate::model::integrator::SimulationState;
use crate::prelude::SimulationParameters;

/// One dashboard sample: the four compartments rounded to whole counts,
/// plus the observed value for the day when one exists.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    pub day: u32,
    pub susceptible: f64,
    pub exposed: f64,
    pub infected: f64,
    pub recovered: f64,
    pub observed: Option<f64>,
}

/// Day-indexed view of a simulation run, one point per integer day from 0
/// through `max(horizon, last observed day)`. Derived output, recomputed on
/// every run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ChartSeries {
    pub points: Vec<ChartPoint>,
}

impl ChartSeries {
    pub fn build(
        state: &SimulationState,
        params: &SimulationParameters,
        observed: &ObservedSeries,
    ) -> Self {
        let last_observed = observed.last_day().unwrap_or(0);
        let max_day = params.horizon.max(f64::from(last_observed)).floor() as u32;
        let last_index = state.steps().saturating_sub(1);

        let mut points = Vec::with_capacity(max_day as usize + 1);
        for day in 0..=max_day {
            let index = ((f64::from(day) / state.step).floor() as usize).min(last_index);
            points.push(ChartPoint {
                day,
                susceptible: state.susceptible[index].round(),
                exposed: state.exposed[index].round(),
                infected: state.infected[index].round(),
                recovered: state.recovered[index].round(),
                observed: observed.value_on(day),
            });
        }
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
