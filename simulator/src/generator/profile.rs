use crate::generator::template::interest_envelope;
use anyhow::Context;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rshieldcore::dashboard_interface::{ObservedPoint, ObservedSeries};
use serde::{Deserialize, Serialize};

/// Configuration for generating a synthetic observed outbreak.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutbreakConfig {
    pub days: u32,
    pub peak_day: u32,
    pub peak_value: f64,
    pub width: f64,
    /// Relative jitter applied to each day, 0 disables it.
    pub noise: f64,
    pub seed: u64,
}

impl Default for OutbreakConfig {
    fn default() -> Self {
        Self {
            days: 7,
            peak_day: 4,
            peak_value: 600_000.0,
            width: 1.5,
            noise: 0.05,
            seed: 0,
        }
    }
}

impl OutbreakConfig {
    pub fn build(&self) -> anyhow::Result<ObservedSeries> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points = Vec::with_capacity(self.days as usize + 1);
        for day in 0..=self.days {
            let envelope = interest_envelope(f64::from(day), f64::from(self.peak_day), self.width);
            let jitter = if self.noise > 0.0 {
                rng.gen_range(-self.noise..self.noise)
            } else {
                0.0
            };
            let value = (self.peak_value * envelope * (1.0 + jitter)).max(0.0);
            points.push(ObservedPoint {
                day,
                value: value.round(),
            });
        }
        ObservedSeries::new(points).context("building synthetic observed series")
    }
}

pub fn build_observed_series(days: u32, seed: u64) -> anyhow::Result<ObservedSeries> {
    OutbreakConfig {
        days,
        seed,
        ..Default::default()
    }
    .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_builds_one_point_per_day() {
        let series = build_observed_series(7, 0).unwrap();
        assert_eq!(series.len(), 8);
        assert_eq!(series.last_day(), Some(7));
    }

    #[test]
    fn generator_is_deterministic_per_seed() {
        let first = build_observed_series(7, 13).unwrap();
        let second = build_observed_series(7, 13).unwrap();
        assert_eq!(first, second);
        let other_seed = build_observed_series(7, 14).unwrap();
        assert_ne!(first, other_seed);
    }

    #[test]
    fn generated_peak_lands_on_the_configured_day() {
        let config = OutbreakConfig {
            days: 10,
            peak_day: 6,
            ..Default::default()
        };
        let series = config.build().unwrap();
        let (day, value) = series.peak().unwrap();
        assert_eq!(day, 6);
        assert!(value > 0.0);
    }

    #[test]
    fn zero_noise_produces_the_pure_envelope() {
        let config = OutbreakConfig {
            noise: 0.0,
            ..Default::default()
        };
        let series = config.build().unwrap();
        assert_eq!(series.value_on(4), Some(600_000.0));
    }
}
