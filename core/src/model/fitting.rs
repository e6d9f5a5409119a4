use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use log::{debug, info};
use serde::Serialize;
use tokio::sync::watch;

use crate::dashboard_interface::observed::ObservedSeries;
use crate::model::integrator::integrate;
use crate::prelude::{SimError, SimResult, SimulationParameters};

/// Population candidates as multiples of the observed peak value.
const POPULATION_MULTIPLES: [f64; 4] = [1.5, 3.0, 5.0, 10.0];
const BETA_CANDIDATES: [f64; 5] = [0.5, 1.0, 2.0, 4.0, 8.0];
const ALPHA_CANDIDATES: [f64; 4] = [0.5, 1.0, 1.5, 2.0];
const GAMMA_CANDIDATES: [f64; 5] = [0.1, 0.5, 1.0, 5.0, 20.0];

/// Below this many observations the search has nothing to anchor on and is
/// a no-op rather than an error.
const MIN_OBSERVED_POINTS: usize = 3;

/// Missing the peak day costs an order of magnitude more than missing the
/// peak height: timing the outbreak matters most.
const DAY_WEIGHT: f64 = 1_000.0;
const MAGNITUDE_WEIGHT: f64 = 100.0;

/// Progress snapshot for a running grid search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FitProgress {
    pub evaluated: usize,
    pub total: usize,
}

/// Cooperative cancellation flag checked between grid candidates.
#[derive(Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

fn candidate_error(sim_day: f64, sim_value: f64, real_day: f64, real_value: f64) -> f64 {
    DAY_WEIGHT * (sim_day - real_day).abs()
        + MAGNITUDE_WEIGHT * (sim_value - real_value).abs() / real_value
}

/// Exhaustive grid search over population, transmission, conversion, and
/// attrition candidates, scored against the observed peak timing and
/// magnitude. The grid is fixed and finite, so identical inputs always
/// select the identical combination.
pub fn auto_fit(
    params: &SimulationParameters,
    observed: &ObservedSeries,
) -> SimResult<SimulationParameters> {
    auto_fit_with(params, observed, &CancelToken::new(), None)
}

/// [`auto_fit`] with cooperative cancellation and progress reporting. A
/// cancelled search abandons its partial result and returns the input
/// parameters untouched.
pub fn auto_fit_with(
    params: &SimulationParameters,
    observed: &ObservedSeries,
    cancel: &CancelToken,
    progress: Option<&watch::Sender<FitProgress>>,
) -> SimResult<SimulationParameters> {
    if observed.len() < MIN_OBSERVED_POINTS {
        debug!(
            "grid search skipped: {} observed points, need {}",
            observed.len(),
            MIN_OBSERVED_POINTS
        );
        return Ok(params.clone());
    }
    let (peak_real_day, peak_real_value) = observed
        .peak()
        .ok_or_else(|| SimError::Internal("peak missing from non-empty series".into()))?;
    if peak_real_value <= 0.0 {
        debug!("grid search skipped: observed peak is zero");
        return Ok(params.clone());
    }
    let peak_real_day = f64::from(peak_real_day);

    let total = POPULATION_MULTIPLES.len()
        * BETA_CANDIDATES.len()
        * ALPHA_CANDIDATES.len()
        * GAMMA_CANDIDATES.len();
    let mut evaluated = 0usize;
    let mut best: Option<(f64, SimulationParameters)> = None;

    for &multiple in &POPULATION_MULTIPLES {
        for &beta in &BETA_CANDIDATES {
            for &alpha in &ALPHA_CANDIDATES {
                for &gamma in &GAMMA_CANDIDATES {
                    if cancel.is_cancelled() {
                        info!("grid search cancelled after {} candidates", evaluated);
                        return Ok(params.clone());
                    }

                    let mut trial = params.clone();
                    trial.population = peak_real_value * multiple;
                    trial.beta = beta;
                    trial.alpha = alpha;
                    trial.gamma = gamma;

                    let state = integrate(&trial, observed)?;
                    let (peak_sim_day, peak_sim_value) = state.infected_peak();
                    let error = candidate_error(
                        peak_sim_day,
                        peak_sim_value,
                        peak_real_day,
                        peak_real_value,
                    );

                    evaluated += 1;
                    if let Some(sender) = progress {
                        let _ = sender.send(FitProgress { evaluated, total });
                    }

                    if best.as_ref().map_or(true, |(least, _)| error < *least) {
                        best = Some((error, trial));
                    }
                }
            }
        }
    }

    let (least, mut fitted) = best
        .ok_or_else(|| SimError::Internal("empty candidate grid".into()))?;
    fitted.population = fitted.population.round();
    info!(
        "grid search evaluated {} candidates, best error {:.3}",
        evaluated, least
    );
    Ok(fitted)
}

/// Grid search running on a dedicated worker thread, so an interactive
/// caller stays responsive while the candidate grid is evaluated.
pub struct FitJob {
    handle: thread::JoinHandle<SimResult<SimulationParameters>>,
    cancel: CancelToken,
    progress: watch::Receiver<FitProgress>,
}

impl FitJob {
    pub fn spawn(params: SimulationParameters, observed: ObservedSeries) -> Self {
        let cancel = CancelToken::new();
        let (sender, receiver) = watch::channel(FitProgress::default());
        let token = cancel.clone();
        let handle =
            thread::spawn(move || auto_fit_with(&params, &observed, &token, Some(&sender)));
        Self {
            handle,
            cancel,
            progress: receiver,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn progress(&self) -> FitProgress {
        *self.progress.borrow()
    }

    pub fn join(self) -> SimResult<SimulationParameters> {
        self.handle
            .join()
            .map_err(|_| SimError::Internal("fit worker panicked".into()))?
    }
}
