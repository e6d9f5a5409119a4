use serde::{Deserialize, Serialize};

/// Intensities of the three intervention channels plus the efficiency of
/// the correction channel. All are dormant before the configured
/// intervention start time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct InterventionControls {
    /// Prevention acting on the susceptible pool (education, deterrence).
    pub prevention: f64,
    /// Correction acting on the exposed pool (counter-narrative).
    pub correction: f64,
    /// Suppression acting on the active-spreader pool (blocking, takedown).
    pub suppression: f64,
    /// Fraction of the correction intensity that actually converts exposed
    /// individuals. Structural property of the channel, never auto-tuned.
    pub correction_efficiency: f64,
}

impl Default for InterventionControls {
    fn default() -> Self {
        Self {
            prevention: 0.5,
            correction: 0.5,
            suppression: 0.8,
            correction_efficiency: 0.7,
        }
    }
}

/// Full configuration for one simulation run. Treated as an immutable value
/// object: callers replace it wholesale instead of mutating fields mid-run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationParameters {
    /// Total addressable audience N.
    pub population: f64,
    /// Time lag applied to the influence terms, in days.
    pub delay: f64,
    /// Fixed integration step, in days.
    pub step: f64,
    /// Simulated duration, in days.
    pub horizon: f64,
    /// Natural transmission rate.
    pub beta: f64,
    /// Exposed-to-spreader conversion rate.
    pub alpha: f64,
    /// Attrition rate of active spreaders.
    pub gamma: f64,
    /// Simulation time at which the controls activate.
    pub intervention_start: f64,
    pub controls: InterventionControls,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            population: 10_000_000.0,
            delay: 1.0,
            step: 0.05,
            horizon: 7.0,
            beta: 10.0,
            alpha: 1.2,
            gamma: 50.0,
            intervention_start: 4.0,
            controls: InterventionControls::default(),
        }
    }
}

impl SimulationParameters {
    /// Rejects configurations the integrator cannot handle. Non-positive
    /// population or step would make the flow terms undefined, so both are
    /// hard errors rather than values to coerce.
    pub fn validate(&self) -> SimResult<()> {
        if !(self.population > 0.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "population must be positive, got {}",
                self.population
            )));
        }
        if !(self.step > 0.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "integration step must be positive, got {}",
                self.step
            )));
        }
        if !(self.horizon > 0.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "horizon must be positive, got {}",
                self.horizon
            )));
        }
        if !(self.delay >= 0.0) {
            return Err(SimError::InvalidConfiguration(format!(
                "delay must be non-negative, got {}",
                self.delay
            )));
        }
        if !self.intervention_start.is_finite() {
            return Err(SimError::InvalidConfiguration(
                "intervention start must be finite".into(),
            ));
        }
        let rates = [
            ("beta", self.beta),
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("prevention", self.controls.prevention),
            ("correction", self.controls.correction),
            ("suppression", self.controls.suppression),
            ("correction efficiency", self.controls.correction_efficiency),
        ];
        for (name, value) in rates {
            if !(value >= 0.0) {
                return Err(SimError::InvalidConfiguration(format!(
                    "{} must be non-negative, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

/// Common error type for the simulation core.
#[derive(thiserror::Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("invalid observation: {0}")]
    InvalidObservation(String),
    #[error("internal failure: {0}")]
    Internal(String),
}

pub type SimResult<T> = Result<T, SimError>;
