use crate::workflow::config::ScenarioConfig;
use anyhow::Context;
use rshieldcore::dashboard_interface::ChartSeries;
use rshieldcore::model::{auto_fit, estimate_rc, integrate, solve_for_rc_one, FitJob};
use rshieldcore::prelude::SimulationParameters;

/// Everything one simulation pass produces for display: the day-indexed
/// chart, the controlled-reproduction indicator, and the peak comparison
/// between the simulated and observed curves.
pub struct SimulationReport {
    pub chart: ChartSeries,
    pub rc: f64,
    pub peak_sim_day: f64,
    pub peak_sim_value: f64,
    pub peak_real_day: u32,
    pub peak_real_value: f64,
    pub final_infected: f64,
    pub final_recovered: f64,
}

#[derive(Clone)]
pub struct Runner {
    config: ScenarioConfig,
}

impl Runner {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    /// One full pass: integrate, sample the chart, estimate the indicator,
    /// extract the peaks.
    pub fn execute(&self) -> anyhow::Result<SimulationReport> {
        let params = self.config.parameters();
        let observed = self.config.observed_series()?;

        let state = integrate(&params, &observed).context("integrating scenario")?;
        let chart = ChartSeries::build(&state, &params, &observed);
        let rc = estimate_rc(&params, &observed).context("estimating reproduction indicator")?;
        let (peak_sim_day, peak_sim_value) = state.infected_peak();
        let (peak_real_day, peak_real_value) = observed.peak().unwrap_or((0, 0.0));
        let last = chart.points.last();

        Ok(SimulationReport {
            rc,
            peak_sim_day,
            peak_sim_value,
            peak_real_day,
            peak_real_value,
            final_infected: last.map_or(0.0, |point| point.infected),
            final_recovered: last.map_or(0.0, |point| point.recovered),
            chart,
        })
    }

    /// Rescales the suppression and correction channels so the indicator
    /// lands on one.
    pub fn solve_rc(&self) -> anyhow::Result<SimulationParameters> {
        let observed = self.config.observed_series()?;
        solve_for_rc_one(&self.config.parameters(), &observed)
            .context("solving for the control threshold")
    }

    /// Runs the grid search on a background worker and waits for it.
    pub fn fit(&self) -> anyhow::Result<SimulationParameters> {
        let observed = self.config.observed_series()?;
        let job = FitJob::spawn(self.config.parameters(), observed);
        job.join().context("running parameter grid search")
    }

    /// Synchronous grid search, for callers already off the interactive
    /// path.
    pub fn fit_blocking(&self) -> anyhow::Result<SimulationParameters> {
        let observed = self.config.observed_series()?;
        auto_fit(&self.config.parameters(), &observed).context("running parameter grid search")
    }
}
