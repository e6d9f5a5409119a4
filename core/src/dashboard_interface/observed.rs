use serde::{Deserialize, Serialize};

use crate::prelude::{SimError, SimResult};

/// One measured interest value for a single day, as entered or imported in
/// the dashboard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ObservedPoint {
    pub day: u32,
    pub value: f64,
}

/// Day-ordered series of observed interest values. Days are unique and
/// values non-negative; the constructor enforces both so downstream code
/// never re-checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservedSeries {
    points: Vec<ObservedPoint>,
}

impl ObservedSeries {
    pub fn new(mut points: Vec<ObservedPoint>) -> SimResult<Self> {
        points.sort_by_key(|point| point.day);
        for pair in points.windows(2) {
            if pair[0].day == pair[1].day {
                return Err(SimError::InvalidObservation(format!(
                    "duplicate entry for day {}",
                    pair[0].day
                )));
            }
        }
        for point in &points {
            if !(point.value >= 0.0) {
                return Err(SimError::InvalidObservation(format!(
                    "day {} has invalid value {}",
                    point.day, point.value
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[ObservedPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn value_on(&self, day: u32) -> Option<f64> {
        self.points
            .iter()
            .find(|point| point.day == day)
            .map(|point| point.value)
    }

    pub fn last_day(&self) -> Option<u32> {
        self.points.last().map(|point| point.day)
    }

    /// First occurrence of the maximum value, as `(day, value)`.
    pub fn peak(&self) -> Option<(u32, f64)> {
        let mut best: Option<(u32, f64)> = None;
        for point in &self.points {
            match best {
                Some((_, value)) if point.value <= value => {}
                _ => best = Some((point.day, point.value)),
            }
        }
        best
    }
}
