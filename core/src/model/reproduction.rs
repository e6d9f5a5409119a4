use crate::dashboard_interface::observed::ObservedSeries;
use crate::model::integrator::seed_compartments;
use crate::prelude::{SimResult, SimulationParameters};

/// Computes the controlled-reproduction indicator for the current
/// parameters and the initial susceptible fraction.
///
/// A value at or below one means the spread is contained under the active
/// controls; above one signals outbreak risk. A zero denominator (no
/// suppression, or no conversion pressure) is reported as `0.0`: the
/// indicator is undefined there and "no threshold pressure" is the agreed
/// reading, not an error.
pub fn estimate_rc(params: &SimulationParameters, observed: &ObservedSeries) -> SimResult<f64> {
    params.validate()?;

    let seed = seed_compartments(params, observed);
    let susceptible_fraction = seed.susceptible / params.population;

    let controls = &params.controls;
    let denominator = (params.alpha + controls.correction_efficiency * controls.correction)
        * controls.suppression;
    if denominator == 0.0 {
        return Ok(0.0);
    }

    Ok(params.beta * susceptible_fraction * params.alpha / denominator)
}
