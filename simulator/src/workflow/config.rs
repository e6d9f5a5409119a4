use anyhow::Context;
use rshieldcore::dashboard_interface::{ObservedPoint, ObservedSeries};
use rshieldcore::prelude::SimulationParameters;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One full dashboard scenario: the model parameters plus the observed
/// daily interest values they are compared against.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub params: SimulationParameters,
    #[serde(default = "default_observed")]
    pub observed: Vec<ObservedPoint>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            params: SimulationParameters::default(),
            observed: default_observed(),
        }
    }
}

/// Reference eight-day outbreak used when no scenario file is supplied.
fn default_observed() -> Vec<ObservedPoint> {
    [
        (0, 5_000.0),
        (1, 30_000.0),
        (2, 150_000.0),
        (3, 450_000.0),
        (4, 600_000.0),
        (5, 350_000.0),
        (6, 120_000.0),
        (7, 50_000.0),
    ]
    .into_iter()
    .map(|(day, value)| ObservedPoint { day, value })
    .collect()
}

impl ScenarioConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading scenario config {}", path_ref.display()))?;
        let config: ScenarioConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing scenario config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn parameters(&self) -> SimulationParameters {
        self.params.clone()
    }

    pub fn observed_series(&self) -> anyhow::Result<ObservedSeries> {
        ObservedSeries::new(self.observed.clone()).context("building observed series")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_scenario_carries_the_reference_outbreak() {
        let config = ScenarioConfig::default();
        assert_eq!(config.observed.len(), 8);
        let series = config.observed_series().unwrap();
        assert_eq!(series.peak(), Some((4, 600_000.0)));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"observed:\n  - day: 0\n    value: 4000.0\n  - day: 1\n    value: 9000.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let config = ScenarioConfig::load(&path).unwrap();
        assert_eq!(config.observed.len(), 2);
        assert_eq!(config.params, SimulationParameters::default());
    }

    #[test]
    fn config_load_reads_nested_parameters() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"params:\n  population: 500000.0\n  delay: 0.5\n  step: 0.1\n  horizon: 10.0\n  beta: 3.0\n  alpha: 1.0\n  gamma: 2.0\n  intervention_start: 3.0\n  controls:\n    prevention: 0.2\n    correction: 0.3\n    suppression: 0.4\n    correction_efficiency: 0.6\nobserved:\n  - day: 0\n    value: 1000.0\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let config = ScenarioConfig::load(&path).unwrap();
        assert_eq!(config.params.population, 500_000.0);
        assert_eq!(config.params.controls.suppression, 0.4);
    }

    #[test]
    fn duplicate_observed_days_fail_series_construction() {
        let config = ScenarioConfig {
            observed: vec![
                ObservedPoint { day: 1, value: 5.0 },
                ObservedPoint { day: 1, value: 6.0 },
            ],
            ..Default::default()
        };
        assert!(config.observed_series().is_err());
    }
}
